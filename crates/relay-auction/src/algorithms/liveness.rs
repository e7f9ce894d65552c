//! # Liveness Monitor
//!
//! Hands the active slot to whoever is actually keeping the relay current
//! when the winner falls behind.

use crate::domain::{Address, CurrentRound};

/// A winner reassignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SnapRecord {
    /// Slot that changed hands.
    pub slot_start: u64,
    /// Operator that was replaced.
    pub old_winner: Option<Address>,
    /// Operator now in charge.
    pub new_winner: Address,
    /// Ancestor-height gap that triggered the snap.
    pub gap: u64,
}

/// Snap the active slot to `caller` if the relay went stale under the
/// current winner.
///
/// `height` is the height of the ancestor `caller` is building on and
/// `previous_height` the height of the ancestor seen by the previous
/// check. A snap needs the ancestor inside the active slot, a caller other
/// than the winner, and a gap of at least `snap_threshold`.
pub fn check_liveness(
    round: &mut CurrentRound,
    caller: Address,
    height: u64,
    previous_height: Option<u64>,
    slot_length: u64,
    snap_threshold: u64,
) -> Option<SnapRecord> {
    if !round.contains(height, slot_length) || round.is_winner(&caller) {
        return None;
    }

    let gap = height.saturating_sub(previous_height?);
    if gap < snap_threshold {
        return None;
    }

    let old_winner = round.winner.replace(caller);
    Some(SnapRecord {
        slot_start: round.start_height,
        old_winner,
        new_winner: caller,
        gap,
    })
}

//! # Domain Invariants
//!
//! Business rules checked before the auction state is touched.

use super::entities::CurrentRound;
use super::errors::{Address, AuctionError};
use super::value_objects::{is_slot_aligned, Bid};

/// Invariant: slots start on a slot boundary.
pub fn invariant_slot_aligned(slot: u64, slot_length: u64) -> Result<(), AuctionError> {
    if !is_slot_aligned(slot, slot_length) {
        return Err(AuctionError::UnalignedSlot { slot, slot_length });
    }
    Ok(())
}

/// Invariant: only future slots accept bids.
pub fn invariant_bidding_open(slot: u64, round: &CurrentRound) -> Result<(), AuctionError> {
    if slot <= round.start_height {
        return Err(AuctionError::BiddingClosed {
            slot,
            current_start: round.start_height,
        });
    }
    Ok(())
}

/// Invariant: only current or past slots release deposits.
pub fn invariant_bidding_closed(slot: u64, round: &CurrentRound) -> Result<(), AuctionError> {
    if slot > round.start_height {
        return Err(AuctionError::SlotNotClosed {
            slot,
            current_start: round.start_height,
        });
    }
    Ok(())
}

/// Invariant: positive bids only rise, non-positive bids only fall.
pub fn invariant_bid_monotonic(previous: Bid, next: Bid) -> Result<(), AuctionError> {
    let previous = previous.to_signed();
    let amount = next.to_signed();
    if amount > 0 {
        if amount <= previous {
            return Err(AuctionError::CanNotBetLower { previous, amount });
        }
    } else if amount >= previous {
        return Err(AuctionError::CanNotBetHigher { previous, amount });
    }
    Ok(())
}

/// Invariant: admin operations require the stored admin identity.
pub fn invariant_admin(caller: &Address, admin: &Address) -> Result<(), AuctionError> {
    if caller != admin {
        return Err(AuctionError::Unauthorized);
    }
    Ok(())
}

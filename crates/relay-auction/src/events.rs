//! # Auction Notifications
//!
//! Events emitted by the auction once a call has fully succeeded.

use crate::domain::Address;
use serde::{Deserialize, Serialize};

/// Notification produced by the auction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuctionEvent {
    /// A new round became active.
    NewRound {
        /// Start height of the new slot.
        slot_start: u64,
        /// Operator of the new slot.
        winner: Option<Address>,
        /// Best bid that won the slot.
        winning_amount: i128,
    },
    /// A bid was accepted.
    Bid {
        /// Slot bid on.
        slot_start: u64,
        /// Bidder.
        bidder: Address,
        /// Stored amount.
        amount: i128,
    },
    /// The active slot changed hands.
    Snap {
        /// Active slot.
        slot_start: u64,
        /// Replaced operator.
        old_winner: Option<Address>,
        /// New operator.
        new_winner: Address,
    },
}

impl AuctionEvent {
    /// Slot the event refers to.
    pub fn slot_start(&self) -> u64 {
        match self {
            Self::NewRound { slot_start, .. }
            | Self::Bid { slot_start, .. }
            | Self::Snap { slot_start, .. } => *slot_start,
        }
    }

    /// Short name for logs and indexing.
    pub fn topic(&self) -> &'static str {
        match self {
            Self::NewRound { .. } => "new_round",
            Self::Bid { .. } => "bid",
            Self::Snap { .. } => "snap",
        }
    }
}

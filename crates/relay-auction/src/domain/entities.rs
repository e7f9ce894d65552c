//! # Domain Entities
//!
//! Mutable auction state: the active round, the per-slot bid book and the
//! aggregate owned by the service.

use super::errors::{Address, Digest, TokenAmount};
use super::value_objects::Bid;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The slot currently being operated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentRound {
    /// Operator of the slot, if any.
    pub winner: Option<Address>,
    /// First height of the slot.
    pub start_height: u64,
}

impl CurrentRound {
    /// New round without a winner.
    pub fn new(start_height: u64) -> Self {
        Self {
            winner: None,
            start_height,
        }
    }

    /// First height past the slot.
    pub fn end_height(&self, slot_length: u64) -> u64 {
        self.start_height.saturating_add(slot_length)
    }

    /// True if `height` lies inside the slot.
    pub fn contains(&self, height: u64, slot_length: u64) -> bool {
        self.start_height <= height && height < self.end_height(slot_length)
    }

    /// True once `height` has crossed the slot end.
    pub fn is_due(&self, height: u64, slot_length: u64) -> bool {
        self.end_height(slot_length) <= height
    }

    /// True if `who` operates this slot.
    pub fn is_winner(&self, who: &Address) -> bool {
        self.winner.as_ref() == Some(who)
    }
}

/// Most extreme standing bid of a slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestBid {
    /// Holder of the best bid.
    pub bidder: Option<Address>,
    /// The bid itself.
    pub bid: Bid,
}

impl BestBid {
    /// Wire amount of the best bid.
    pub fn amount(&self) -> i128 {
        self.bid.to_signed()
    }

    /// True if `candidate` takes over the record.
    ///
    /// Non-negative candidates must beat the best upwards, negative ones
    /// downwards. Both directions share this single record.
    pub fn is_superseded_by(&self, candidate: Bid) -> bool {
        let best = self.amount();
        let amount = candidate.to_signed();
        (amount >= 0 && amount > best) || (amount < 0 && amount < best)
    }
}

/// Per-slot record of every participant's bid and the slot's best bid.
#[derive(Clone, Debug, Default)]
pub struct BidBook {
    bids: HashMap<(u64, Address), Bid>,
    best: HashMap<u64, BestBid>,
}

impl BidBook {
    /// Empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored bid of `bidder` on `slot`.
    pub fn bid_of(&self, slot: u64, bidder: &Address) -> Bid {
        self.bids.get(&(slot, *bidder)).copied().unwrap_or_default()
    }

    /// Store a bid; an empty bid removes the entry.
    pub fn set_bid(&mut self, slot: u64, bidder: Address, bid: Bid) {
        if bid == Bid::Empty {
            self.bids.remove(&(slot, bidder));
        } else {
            self.bids.insert((slot, bidder), bid);
        }
    }

    /// Best bid of `slot`.
    pub fn best(&self, slot: u64) -> BestBid {
        self.best.get(&slot).copied().unwrap_or_default()
    }

    /// Replace the best bid of `slot`.
    pub fn set_best(&mut self, slot: u64, best: BestBid) {
        self.best.insert(slot, best);
    }

    /// Slots with at least one stored bid.
    pub fn slots(&self) -> Vec<u64> {
        let mut slots: Vec<u64> = self.bids.keys().map(|(slot, _)| *slot).collect();
        slots.sort_unstable();
        slots.dedup();
        slots
    }

    /// Number of stored bids.
    pub fn len(&self) -> usize {
        self.bids.len()
    }

    /// True if no bid is stored.
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty()
    }
}

/// Everything the auction owns. Cloned as a checkpoint at the start of each
/// mutating call.
#[derive(Clone, Debug)]
pub struct AuctionState {
    /// Active slot.
    pub round: CurrentRound,
    /// Bids per slot.
    pub book: BidBook,
    /// Ancestor digest seen by the last liveness check.
    pub last_ancestor: Option<Digest>,
    /// Reward paid to each round winner.
    pub reward_amount: TokenAmount,
    /// Identity allowed to run admin operations.
    pub admin: Address,
}

impl AuctionState {
    /// Fresh state starting at `start_height`.
    pub fn new(start_height: u64, reward_amount: TokenAmount, admin: Address) -> Self {
        Self {
            round: CurrentRound::new(start_height),
            book: BidBook::new(),
            last_ancestor: None,
            reward_amount,
            admin,
        }
    }
}

//! # Bid Ledger Logic
//!
//! Placing, revising and withdrawing bids on future slots.

use crate::domain::{
    invariant_bid_monotonic, invariant_bidding_closed, invariant_bidding_open,
    invariant_slot_aligned, Address, AuctionError, BestBid, Bid, BidBook, CurrentRound,
    TokenAmount,
};

/// Outcome of an accepted bid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BidReceipt {
    /// Slot bid on.
    pub slot: u64,
    /// Bidder.
    pub bidder: Address,
    /// Bid replaced by this one.
    pub previous: Bid,
    /// Newly stored bid.
    pub bid: Bid,
    /// Deposit still to be pulled from the bidder.
    pub deposit_due: TokenAmount,
    /// True if the bid became the slot's best bid.
    pub became_best: bool,
}

impl BidReceipt {
    /// Custodied deposit abandoned by turning a positive bid non-positive.
    pub fn forfeited(&self) -> TokenAmount {
        if self.bid.is_deposit() {
            0
        } else {
            self.previous.deposit()
        }
    }
}

/// Record a bid of `amount` by `bidder` on `slot`.
///
/// Only the top-up over an existing positive bid is due; a non-positive
/// bid pulls nothing.
pub fn place_bid(
    book: &mut BidBook,
    round: &CurrentRound,
    slot_length: u64,
    bidder: Address,
    slot: u64,
    amount: i128,
) -> Result<BidReceipt, AuctionError> {
    invariant_slot_aligned(slot, slot_length)?;
    invariant_bidding_open(slot, round)?;

    let previous = book.bid_of(slot, &bidder);
    let bid = Bid::from_signed(amount);
    invariant_bid_monotonic(previous, bid)?;

    let deposit_due = if bid.is_deposit() {
        bid.deposit().saturating_sub(previous.deposit())
    } else {
        0
    };

    book.set_bid(slot, bidder, bid);

    let became_best = book.best(slot).is_superseded_by(bid);
    if became_best {
        book.set_best(
            slot,
            BestBid {
                bidder: Some(bidder),
                bid,
            },
        );
    }

    Ok(BidReceipt {
        slot,
        bidder,
        previous,
        bid,
        deposit_due,
        became_best,
    })
}

/// Release the deposit `bidder` holds on a closed `slot`.
///
/// Returns the amount to send back from custody.
pub fn withdraw_bid(
    book: &mut BidBook,
    round: &CurrentRound,
    slot_length: u64,
    bidder: Address,
    slot: u64,
) -> Result<TokenAmount, AuctionError> {
    invariant_slot_aligned(slot, slot_length)?;
    invariant_bidding_closed(slot, round)?;

    let stored = book.bid_of(slot, &bidder);
    if !stored.is_deposit() {
        return Err(AuctionError::NothingToWithdraw { slot });
    }

    book.set_bid(slot, bidder, Bid::Empty);
    Ok(stored.deposit())
}

//! # Round State Machine
//!
//! Rolls the active slot forward once observed height crosses its end and
//! plans the reward, settlement and burn that go with the transition.

use crate::config::AuctionConfig;
use crate::domain::{slot_start_for, Address, AuctionState, BestBid, Bid, CurrentRound, TokenAmount};

/// Plain token movement out of the auction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transfer {
    /// Recipient.
    pub to: Address,
    /// Amount.
    pub amount: TokenAmount,
}

/// Settlement of a closed round's best bid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Payout {
    /// Half of the winning deposit goes to the operator.
    Transfer(Transfer),
    /// The subsidy is minted to the operator, capped per round.
    Mint(Transfer),
}

/// Everything a round transition changed or still has to pay out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundSettlement {
    /// Round that ended.
    pub closed: CurrentRound,
    /// Best bid of the ended round.
    pub closed_best: BestBid,
    /// Round now active.
    pub opened: CurrentRound,
    /// Best bid of the new round.
    pub winning_bid: Bid,
    /// Fixed reward for the ended round's operator.
    pub reward: Option<Transfer>,
    /// Settlement of the ended round's best bid.
    pub payout: Option<Payout>,
    /// Custody burned on behalf of the new round.
    pub burn: TokenAmount,
}

impl RoundSettlement {
    /// Slots jumped over without being awarded.
    pub fn skipped_slots(&self, slot_length: u64) -> u64 {
        (self.opened.start_height - self.closed.start_height) / slot_length - 1
    }
}

/// Advance the round if `height` lies past the active slot.
///
/// Returns `None` when the height does not cross the slot end, which makes
/// repeated calls with the same height harmless. All state changes are
/// applied before returning; the transfers in the settlement are left to
/// the caller.
pub fn advance_round(
    state: &mut AuctionState,
    height: u64,
    config: &AuctionConfig,
) -> Option<RoundSettlement> {
    let slot_length = config.slot_length;
    if !state.round.is_due(height, slot_length) {
        return None;
    }

    let closed = state.round;
    let closed_best = state.book.best(closed.start_height);

    let reward = closed
        .winner
        .filter(|_| state.reward_amount > 0)
        .map(|to| Transfer {
            to,
            amount: state.reward_amount,
        });
    let payout = closed
        .winner
        .and_then(|to| settle(to, closed_best.bid, config.max_mint));

    let opened_start = slot_start_for(height, slot_length);
    let opened_best = state.book.best(opened_start);
    state.round = CurrentRound {
        winner: opened_best.bidder,
        start_height: opened_start,
    };

    let mut burn = 0;
    if let Some(winner) = opened_best.bidder {
        state.book.set_bid(opened_start, winner, Bid::Empty);
        burn = opened_best.bid.deposit() / 2;
    }

    Some(RoundSettlement {
        closed,
        closed_best,
        opened: state.round,
        winning_bid: opened_best.bid,
        reward,
        payout,
        burn,
    })
}

fn settle(to: Address, bid: Bid, max_mint: TokenAmount) -> Option<Payout> {
    match bid {
        Bid::Deposit(amount) if amount / 2 > 0 => Some(Payout::Transfer(Transfer {
            to,
            amount: amount / 2,
        })),
        Bid::Subsidy(amount) if amount.min(max_mint) > 0 => Some(Payout::Mint(Transfer {
            to,
            amount: amount.min(max_mint),
        })),
        _ => None,
    }
}

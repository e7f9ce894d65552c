//! # Inbound Ports
//!
//! API exposed by the relay auction.

use crate::algorithms::RoundSettlement;
use crate::domain::{
    Address, AuctionError, BestBid, CurrentRound, Digest, PermitSignature, RawHeader, SweepTarget,
    TokenAmount,
};
use async_trait::async_trait;

/// Relay auction API - inbound port.
///
/// Every mutating call is atomic: on error no state change and no
/// notification survives, and a round settlement is paid only by a call
/// that succeeds.
#[async_trait]
pub trait RelayAuctionApi: Send + Sync {
    /// Bid `amount` on a future `slot`. Positive pays to win, negative asks
    /// for a subsidy.
    async fn bid(&mut self, caller: Address, slot: u64, amount: i128) -> Result<(), AuctionError>;

    /// Authorize the auction via a signed permit, then bid.
    async fn bid_with_permit(
        &mut self,
        caller: Address,
        slot: u64,
        amount: i128,
        deadline: u64,
        signature: PermitSignature,
    ) -> Result<(), AuctionError>;

    /// Reclaim the deposit held for a closed slot.
    async fn withdraw_bid(&mut self, caller: Address, slot: u64)
        -> Result<TokenAmount, AuctionError>;

    /// Advance the round to the relay's best-known height.
    async fn update_round(&mut self) -> Result<Option<RoundSettlement>, AuctionError>;

    /// Append headers on top of `anchor`.
    async fn add_headers(
        &mut self,
        caller: Address,
        anchor: &RawHeader,
        headers: &[RawHeader],
    ) -> Result<(), AuctionError>;

    /// Append headers that open a new difficulty period.
    async fn add_headers_with_retarget(
        &mut self,
        caller: Address,
        old_period_start: &RawHeader,
        old_period_end: &RawHeader,
        headers: &[RawHeader],
    ) -> Result<(), AuctionError>;

    /// Move the relay's best tip.
    async fn mark_new_heaviest(
        &mut self,
        caller: Address,
        ancestor: Digest,
        current_best: &RawHeader,
        new_best: &RawHeader,
        limit: u64,
    ) -> Result<(), AuctionError>;

    /// Change the per-round reward (admin only).
    async fn set_reward_amount(
        &mut self,
        caller: Address,
        amount: TokenAmount,
    ) -> Result<(), AuctionError>;

    /// Send the auction's whole balance on `target` to the admin (admin only).
    async fn sweep(
        &mut self,
        caller: Address,
        target: SweepTarget,
    ) -> Result<TokenAmount, AuctionError>;

    /// Hand the admin role to `new_admin` (admin only).
    async fn transfer_ownership(
        &mut self,
        caller: Address,
        new_admin: Address,
    ) -> Result<(), AuctionError>;

    /// Active round.
    fn current_round(&self) -> CurrentRound;

    /// Best bid of `slot`.
    fn best_bid(&self, slot: u64) -> BestBid;

    /// Wire amount `bidder` holds on `slot`.
    fn bid_of(&self, slot: u64, bidder: Address) -> i128;
}

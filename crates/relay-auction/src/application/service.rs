//! # Relay Auction Service
//!
//! Owns the auction state and drives the relay and both ledgers.
//!
//! ## Call discipline
//!
//! - Calls are serialized through `&mut self`.
//! - State changes happen before any ledger call.
//! - Balances are checked before the first value movement, and round
//!   settlements are paid only after the relay accepted the submission.
//! - A failed call restores the state captured at its start and drops the
//!   notifications it produced.

use crate::algorithms::{self, BidReceipt, Payout, RoundSettlement, SnapRecord};
use crate::config::AuctionConfig;
use crate::domain::{
    invariant_admin, slot_start_for, Address, AuctionError, AuctionState, BestBid, CurrentRound,
    Digest, LedgerError, PermitSignature, RawHeader, SweepTarget, TokenAmount,
};
use crate::events::AuctionEvent;
use crate::ports::{
    AuctionEventSink, DepositLedger, HeaderRelay, RelayAuctionApi, RewardLedger,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Collaborators of the auction.
pub struct AuctionPorts<R, W, D, E> {
    /// Header relay.
    pub relay: Arc<R>,
    /// Reward ledger, acting as the auction.
    pub reward: Arc<W>,
    /// Deposit ledger, acting as the auction.
    pub deposit: Arc<D>,
    /// Notification sink.
    pub events: Arc<E>,
    /// The auction's own account on both ledgers.
    pub account: Address,
}

/// Statistics for the auction service.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AuctionStats {
    /// Accepted bids.
    pub bids_accepted: u64,
    /// Successful withdrawals.
    pub withdrawals: u64,
    /// Round transitions.
    pub rounds_advanced: u64,
    /// Winner reassignments.
    pub snaps: u64,
    /// Rewards paid.
    pub total_rewarded: TokenAmount,
    /// Deposit halves paid to operators.
    pub total_paid_out: TokenAmount,
    /// Subsidies minted.
    pub total_minted: TokenAmount,
    /// Custody burned.
    pub total_burned: TokenAmount,
    /// Calls that failed and were rolled back.
    pub failed_calls: u64,
}

struct Checkpoint {
    state: AuctionState,
    stats: AuctionStats,
}

/// The relay auction.
pub struct RelayAuctionService<R, W, D, E>
where
    R: HeaderRelay,
    W: RewardLedger,
    D: DepositLedger,
    E: AuctionEventSink,
{
    config: AuctionConfig,
    ports: AuctionPorts<R, W, D, E>,
    state: AuctionState,
    /// Notifications of the call in progress.
    pending: Vec<AuctionEvent>,
    stats: AuctionStats,
}

impl<R, W, D, E> RelayAuctionService<R, W, D, E>
where
    R: HeaderRelay,
    W: RewardLedger,
    D: DepositLedger,
    E: AuctionEventSink,
{
    /// Create the auction with the round starting at the slot containing
    /// `start_height`.
    pub fn new(
        config: AuctionConfig,
        ports: AuctionPorts<R, W, D, E>,
        admin: Address,
        start_height: u64,
    ) -> Result<Self, AuctionError> {
        config.validate()?;
        let start = slot_start_for(start_height, config.slot_length);
        info!(start, admin = %hex::encode(admin), "[auction] service created");
        Ok(Self {
            state: AuctionState::new(start, config.reward_amount, admin),
            config,
            ports,
            pending: Vec::new(),
            stats: AuctionStats::default(),
        })
    }

    /// Create the auction starting at the relay's best-known height.
    pub async fn connect(
        config: AuctionConfig,
        ports: AuctionPorts<R, W, D, E>,
        admin: Address,
    ) -> Result<Self, AuctionError> {
        let best = ports.relay.best_known_digest().await?;
        let height = ports.relay.height_of(best).await?;
        Self::new(config, ports, admin, height)
    }

    /// Configuration in use.
    pub fn config(&self) -> &AuctionConfig {
        &self.config
    }

    /// Service statistics.
    pub fn stats(&self) -> &AuctionStats {
        &self.stats
    }

    /// Ancestor digest seen by the last liveness check.
    pub fn last_ancestor(&self) -> Option<Digest> {
        self.state.last_ancestor
    }

    /// Reward paid to each round winner.
    pub fn reward_amount(&self) -> TokenAmount {
        self.state.reward_amount
    }

    /// Current admin.
    pub fn admin(&self) -> Address {
        self.state.admin
    }

    /// The auction's ledger account.
    pub fn account(&self) -> Address {
        self.ports.account
    }

    // =========================================================================
    // Call bookkeeping
    // =========================================================================

    fn begin(&mut self) -> Checkpoint {
        self.pending.clear();
        Checkpoint {
            state: self.state.clone(),
            stats: self.stats.clone(),
        }
    }

    fn finish<T>(
        &mut self,
        checkpoint: Checkpoint,
        result: Result<T, AuctionError>,
    ) -> Result<T, AuctionError> {
        match result {
            Ok(value) => {
                for event in self.pending.drain(..) {
                    self.ports.events.publish(event);
                }
                Ok(value)
            }
            Err(e) => {
                warn!(error = %e, "[auction] call failed, state restored");
                self.state = checkpoint.state;
                self.stats = checkpoint.stats;
                self.stats.failed_calls += 1;
                self.pending.clear();
                Err(e)
            }
        }
    }

    // =========================================================================
    // Operations
    // =========================================================================

    fn record_bid(
        &mut self,
        caller: Address,
        slot: u64,
        amount: i128,
    ) -> Result<BidReceipt, AuctionError> {
        let receipt = algorithms::place_bid(
            &mut self.state.book,
            &self.state.round,
            self.config.slot_length,
            caller,
            slot,
            amount,
        )?;
        self.pending.push(AuctionEvent::Bid {
            slot_start: slot,
            bidder: caller,
            amount,
        });
        Ok(receipt)
    }

    async fn collect_deposit(&mut self, receipt: BidReceipt) -> Result<(), AuctionError> {
        if receipt.deposit_due > 0 {
            self.ports
                .deposit
                .transfer_from(receipt.bidder, self.ports.account, receipt.deposit_due)
                .await?;
        }

        self.stats.bids_accepted += 1;
        info!(
            slot = receipt.slot,
            amount = receipt.bid.to_signed(),
            deposit = receipt.deposit_due,
            best = receipt.became_best,
            "[auction] bid accepted"
        );
        if receipt.forfeited() > 0 {
            debug!(
                slot = receipt.slot,
                forfeited = receipt.forfeited(),
                "[auction] deposit left in custody"
            );
        }
        Ok(())
    }

    /// Bid after granting the auction a permit. The permit goes out only
    /// once the bid is valid and the caller can cover the deposit.
    async fn permit_and_bid(
        &mut self,
        caller: Address,
        slot: u64,
        amount: i128,
        deadline: u64,
        signature: PermitSignature,
    ) -> Result<(), AuctionError> {
        let receipt = self.record_bid(caller, slot, amount)?;
        if receipt.deposit_due > 0 {
            let available = self.ports.deposit.balance_of(caller).await?;
            if available < receipt.deposit_due {
                return Err(LedgerError::InsufficientBalance {
                    required: receipt.deposit_due,
                    available,
                }
                .into());
            }
        }

        let account = self.ports.account;
        self.ports
            .deposit
            .permit(caller, account, TokenAmount::MAX, deadline, &signature)
            .await?;
        self.collect_deposit(receipt).await
    }

    async fn take_deposit(&mut self, caller: Address, slot: u64) -> Result<TokenAmount, AuctionError> {
        let amount = algorithms::withdraw_bid(
            &mut self.state.book,
            &self.state.round,
            self.config.slot_length,
            caller,
            slot,
        )?;
        self.ports.deposit.transfer(caller, amount).await?;
        self.stats.withdrawals += 1;
        info!(slot, amount, "[auction] deposit withdrawn");
        Ok(amount)
    }

    /// Liveness check followed by a possible round advance. The returned
    /// settlement has been checked against both ledgers but not paid.
    async fn check_round(
        &mut self,
        caller: Address,
        ancestor: Digest,
    ) -> Result<Option<RoundSettlement>, AuctionError> {
        let slot_length = self.config.slot_length;
        let height = self.ports.relay.height_of(ancestor).await?;

        let round = self.state.round;
        let previous_height = match self.state.last_ancestor {
            Some(previous) if round.contains(height, slot_length) && !round.is_winner(&caller) => {
                Some(self.ports.relay.height_of(previous).await?)
            }
            _ => None,
        };

        if let Some(snap) = algorithms::check_liveness(
            &mut self.state.round,
            caller,
            height,
            previous_height,
            slot_length,
            self.config.snap_threshold,
        ) {
            self.record_snap(snap);
        }

        self.state.last_ancestor = Some(ancestor);
        let settlement = self.advance(height);
        if let Some(settlement) = &settlement {
            self.ensure_payable(settlement).await?;
        }
        Ok(settlement)
    }

    fn record_snap(&mut self, snap: SnapRecord) {
        info!(
            slot = snap.slot_start,
            gap = snap.gap,
            new_winner = %hex::encode(snap.new_winner),
            "[auction] slot snapped"
        );
        self.stats.snaps += 1;
        self.pending.push(AuctionEvent::Snap {
            slot_start: snap.slot_start,
            old_winner: snap.old_winner,
            new_winner: snap.new_winner,
        });
    }

    /// Move the round forward; ledger effects are left to [`Self::pay_out`].
    fn advance(&mut self, height: u64) -> Option<RoundSettlement> {
        let settlement = algorithms::advance_round(&mut self.state, height, &self.config)?;

        self.pending.push(AuctionEvent::NewRound {
            slot_start: settlement.opened.start_height,
            winner: settlement.opened.winner,
            winning_amount: settlement.winning_bid.to_signed(),
        });
        self.stats.rounds_advanced += 1;
        info!(
            height,
            closed = settlement.closed.start_height,
            opened = settlement.opened.start_height,
            skipped = settlement.skipped_slots(self.config.slot_length),
            "[auction] round advanced"
        );
        Some(settlement)
    }

    /// Both pools must cover the settlement before anything moves.
    async fn ensure_payable(&self, settlement: &RoundSettlement) -> Result<(), AuctionError> {
        let account = self.ports.account;

        if let Some(reward) = settlement.reward {
            if self.ports.reward.balance_of(account).await? < reward.amount {
                return Err(AuctionError::RewardTransferRejected);
            }
        }

        let payout = match settlement.payout {
            Some(Payout::Transfer(payout)) => payout.amount,
            _ => 0,
        };
        let required = payout
            .checked_add(settlement.burn)
            .ok_or(LedgerError::Overflow)?;
        if required > 0 {
            let available = self.ports.deposit.balance_of(account).await?;
            if available < required {
                return Err(LedgerError::InsufficientBalance {
                    required,
                    available,
                }
                .into());
            }
        }
        Ok(())
    }

    /// Ledger effects of a settlement, the last interactions of a call.
    ///
    /// The mint is the only movement [`Self::ensure_payable`] cannot
    /// vouch for, so it goes first.
    async fn pay_out(&mut self, settlement: Option<&RoundSettlement>) -> Result<(), AuctionError> {
        let Some(settlement) = settlement else {
            return Ok(());
        };

        match settlement.payout {
            Some(Payout::Mint(payout)) => {
                self.ports.deposit.mint(payout.to, payout.amount).await?;
                self.stats.total_minted += payout.amount;
            }
            Some(Payout::Transfer(payout)) => {
                self.ports.deposit.transfer(payout.to, payout.amount).await?;
                self.stats.total_paid_out += payout.amount;
            }
            None => {}
        }

        if settlement.burn > 0 {
            self.ports.deposit.burn(settlement.burn).await?;
            self.stats.total_burned += settlement.burn;
        }

        if let Some(reward) = settlement.reward {
            if !self.ports.reward.transfer(reward.to, reward.amount).await? {
                return Err(AuctionError::RewardTransferRejected);
            }
            self.stats.total_rewarded += reward.amount;
        }
        Ok(())
    }

    async fn sweep_balance(&mut self, target: SweepTarget) -> Result<TokenAmount, AuctionError> {
        let admin = self.state.admin;
        let account = self.ports.account;
        let amount = match target {
            SweepTarget::Reward => self.ports.reward.balance_of(account).await?,
            SweepTarget::Deposit => self.ports.deposit.balance_of(account).await?,
        };
        if amount == 0 {
            return Ok(0);
        }
        match target {
            SweepTarget::Reward => {
                if !self.ports.reward.transfer(admin, amount).await? {
                    return Err(AuctionError::RewardTransferRejected);
                }
            }
            SweepTarget::Deposit => self.ports.deposit.transfer(admin, amount).await?,
        }
        info!(?target, amount, "[auction] balance swept");
        Ok(amount)
    }
}

fn accepted(ok: bool) -> Result<(), AuctionError> {
    if ok {
        Ok(())
    } else {
        Err(AuctionError::RelayRejected)
    }
}

#[async_trait]
impl<R, W, D, E> RelayAuctionApi for RelayAuctionService<R, W, D, E>
where
    R: HeaderRelay,
    W: RewardLedger,
    D: DepositLedger,
    E: AuctionEventSink,
{
    #[instrument(skip_all, fields(caller = %hex::encode(caller), slot = slot, amount = amount))]
    async fn bid(&mut self, caller: Address, slot: u64, amount: i128) -> Result<(), AuctionError> {
        let checkpoint = self.begin();
        let result = match self.record_bid(caller, slot, amount) {
            Ok(receipt) => self.collect_deposit(receipt).await,
            Err(e) => Err(e),
        };
        self.finish(checkpoint, result)
    }

    #[instrument(skip_all, fields(caller = %hex::encode(caller), slot = slot, amount = amount))]
    async fn bid_with_permit(
        &mut self,
        caller: Address,
        slot: u64,
        amount: i128,
        deadline: u64,
        signature: PermitSignature,
    ) -> Result<(), AuctionError> {
        let checkpoint = self.begin();
        let result = self
            .permit_and_bid(caller, slot, amount, deadline, signature)
            .await;
        self.finish(checkpoint, result)
    }

    #[instrument(skip_all, fields(caller = %hex::encode(caller), slot = slot))]
    async fn withdraw_bid(
        &mut self,
        caller: Address,
        slot: u64,
    ) -> Result<TokenAmount, AuctionError> {
        let checkpoint = self.begin();
        let result = self.take_deposit(caller, slot).await;
        self.finish(checkpoint, result)
    }

    #[instrument(skip_all)]
    async fn update_round(&mut self) -> Result<Option<RoundSettlement>, AuctionError> {
        let checkpoint = self.begin();
        let result = async {
            let best = self.ports.relay.best_known_digest().await?;
            let height = self.ports.relay.height_of(best).await?;
            let settlement = self.advance(height);
            if let Some(settlement) = &settlement {
                self.ensure_payable(settlement).await?;
            }
            self.pay_out(settlement.as_ref()).await?;
            Ok::<_, AuctionError>(settlement)
        }
        .await;
        self.finish(checkpoint, result)
    }

    #[instrument(skip_all, fields(caller = %hex::encode(caller), count = headers.len()))]
    async fn add_headers(
        &mut self,
        caller: Address,
        anchor: &RawHeader,
        headers: &[RawHeader],
    ) -> Result<(), AuctionError> {
        let checkpoint = self.begin();
        let result = async {
            let settlement = self.check_round(caller, anchor.digest()).await?;
            accepted(self.ports.relay.add_headers(anchor, headers).await?)?;
            self.pay_out(settlement.as_ref()).await
        }
        .await;
        self.finish(checkpoint, result)
    }

    #[instrument(skip_all, fields(caller = %hex::encode(caller), count = headers.len()))]
    async fn add_headers_with_retarget(
        &mut self,
        caller: Address,
        old_period_start: &RawHeader,
        old_period_end: &RawHeader,
        headers: &[RawHeader],
    ) -> Result<(), AuctionError> {
        let checkpoint = self.begin();
        let result = async {
            let settlement = self.check_round(caller, old_period_end.digest()).await?;
            accepted(
                self.ports
                    .relay
                    .add_headers_with_retarget(old_period_start, old_period_end, headers)
                    .await?,
            )?;
            self.pay_out(settlement.as_ref()).await
        }
        .await;
        self.finish(checkpoint, result)
    }

    #[instrument(skip_all, fields(caller = %hex::encode(caller), limit = limit))]
    async fn mark_new_heaviest(
        &mut self,
        caller: Address,
        ancestor: Digest,
        current_best: &RawHeader,
        new_best: &RawHeader,
        limit: u64,
    ) -> Result<(), AuctionError> {
        let checkpoint = self.begin();
        let result = async {
            let settlement = self.check_round(caller, ancestor).await?;
            accepted(
                self.ports
                    .relay
                    .mark_new_heaviest(ancestor, current_best, new_best, limit)
                    .await?,
            )?;
            self.pay_out(settlement.as_ref()).await
        }
        .await;
        self.finish(checkpoint, result)
    }

    #[instrument(skip_all, fields(caller = %hex::encode(caller), amount = amount))]
    async fn set_reward_amount(
        &mut self,
        caller: Address,
        amount: TokenAmount,
    ) -> Result<(), AuctionError> {
        let checkpoint = self.begin();
        let result = invariant_admin(&caller, &self.state.admin).map(|()| {
            self.state.reward_amount = amount;
            info!(amount, "[auction] reward amount updated");
        });
        self.finish(checkpoint, result)
    }

    #[instrument(skip_all, fields(caller = %hex::encode(caller), target = ?target))]
    async fn sweep(
        &mut self,
        caller: Address,
        target: SweepTarget,
    ) -> Result<TokenAmount, AuctionError> {
        let checkpoint = self.begin();
        let result = match invariant_admin(&caller, &self.state.admin) {
            Ok(()) => self.sweep_balance(target).await,
            Err(e) => Err(e),
        };
        self.finish(checkpoint, result)
    }

    #[instrument(skip_all, fields(caller = %hex::encode(caller)))]
    async fn transfer_ownership(
        &mut self,
        caller: Address,
        new_admin: Address,
    ) -> Result<(), AuctionError> {
        let checkpoint = self.begin();
        let result = invariant_admin(&caller, &self.state.admin).map(|()| {
            self.state.admin = new_admin;
            info!(new_admin = %hex::encode(new_admin), "[auction] ownership transferred");
        });
        self.finish(checkpoint, result)
    }

    fn current_round(&self) -> CurrentRound {
        self.state.round
    }

    fn best_bid(&self, slot: u64) -> BestBid {
        self.state.book.best(slot)
    }

    fn bid_of(&self, slot: u64, bidder: Address) -> i128 {
        self.state.book.bid_of(slot, &bidder).to_signed()
    }
}

//! # Outbound Ports
//!
//! Traits for the header relay, the token ledgers and the notification
//! sink the auction depends on.

use crate::domain::{
    Address, Digest, LedgerError, PermitSignature, RawHeader, RelayError, TokenAmount,
};
use crate::events::AuctionEvent;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Header relay - outbound port.
#[async_trait]
pub trait HeaderRelay: Send + Sync {
    /// Digest of the heaviest known header.
    async fn best_known_digest(&self) -> Result<Digest, RelayError>;

    /// Height of a known header.
    async fn height_of(&self, digest: Digest) -> Result<u64, RelayError>;

    /// True if `ancestor` is within `limit` blocks below `descendant`.
    async fn is_ancestor(
        &self,
        ancestor: Digest,
        descendant: Digest,
        limit: u64,
    ) -> Result<bool, RelayError>;

    /// Append `headers` on top of `anchor`.
    async fn add_headers(
        &self,
        anchor: &RawHeader,
        headers: &[RawHeader],
    ) -> Result<bool, RelayError>;

    /// Append `headers` that start a new difficulty period.
    async fn add_headers_with_retarget(
        &self,
        old_period_start: &RawHeader,
        old_period_end: &RawHeader,
        headers: &[RawHeader],
    ) -> Result<bool, RelayError>;

    /// Replace the best tip with `new_best`.
    async fn mark_new_heaviest(
        &self,
        ancestor: Digest,
        current_best: &RawHeader,
        new_best: &RawHeader,
        limit: u64,
    ) -> Result<bool, RelayError>;
}

/// Reward ledger - outbound port, bound to the auction's account.
#[async_trait]
pub trait RewardLedger: Send + Sync {
    /// Transfer from the auction to `to`. `false` means the ledger refused.
    async fn transfer(&self, to: Address, amount: TokenAmount) -> Result<bool, LedgerError>;

    /// Balance of `owner`.
    async fn balance_of(&self, owner: Address) -> Result<TokenAmount, LedgerError>;
}

/// Auction-deposit ledger - outbound port, bound to the auction's account.
#[async_trait]
pub trait DepositLedger: Send + Sync {
    /// Pull `amount` from `from` into `to` using the auction's allowance.
    async fn transfer_from(
        &self,
        from: Address,
        to: Address,
        amount: TokenAmount,
    ) -> Result<(), LedgerError>;

    /// Transfer from the auction to `to`.
    async fn transfer(&self, to: Address, amount: TokenAmount) -> Result<(), LedgerError>;

    /// Mint new supply to `to`. The auction must be the ledger's minter.
    async fn mint(&self, to: Address, amount: TokenAmount) -> Result<(), LedgerError>;

    /// Burn from the auction's balance.
    async fn burn(&self, amount: TokenAmount) -> Result<(), LedgerError>;

    /// Approve `spender` for `value` on behalf of `owner` via signature.
    async fn permit(
        &self,
        owner: Address,
        spender: Address,
        value: TokenAmount,
        deadline: u64,
        signature: &PermitSignature,
    ) -> Result<(), LedgerError>;

    /// Balance of `owner`.
    async fn balance_of(&self, owner: Address) -> Result<TokenAmount, LedgerError>;
}

/// Notification sink - outbound port.
pub trait AuctionEventSink: Send + Sync {
    /// Publish one notification.
    fn publish(&self, event: AuctionEvent);
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Relay call recorded by [`MockHeaderRelay`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RelaySubmission {
    /// `add_headers`.
    AddHeaders {
        /// Anchor digest
        anchor: Digest,
        /// Headers supplied
        count: usize,
    },
    /// `add_headers_with_retarget`.
    AddHeadersWithRetarget {
        /// Old period end digest
        old_period_end: Digest,
        /// Headers supplied
        count: usize,
    },
    /// `mark_new_heaviest`.
    MarkNewHeaviest {
        /// Ancestor digest
        ancestor: Digest,
        /// Proposed tip
        new_best: Digest,
    },
}

#[derive(Default)]
struct MockRelayState {
    heights: HashMap<Digest, u64>,
    best: Option<Digest>,
    reject: bool,
    unavailable: bool,
    submissions: Vec<RelaySubmission>,
}

/// Mock relay with directly assigned heights.
///
/// Digests are registered with [`MockHeaderRelay::insert`]; submissions are
/// accepted (or refused with [`MockHeaderRelay::set_reject`]) without
/// looking at the headers.
#[derive(Default)]
pub struct MockHeaderRelay {
    state: RwLock<MockRelayState>,
}

impl MockHeaderRelay {
    /// Empty mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `digest` at `height`.
    pub fn insert(&self, digest: Digest, height: u64) {
        self.state.write().heights.insert(digest, height);
    }

    /// Register `digest` at `height` and make it the best tip.
    pub fn set_best(&self, digest: Digest, height: u64) {
        let mut state = self.state.write();
        state.heights.insert(digest, height);
        state.best = Some(digest);
    }

    /// Answer submissions with `false`.
    pub fn set_reject(&self, reject: bool) {
        self.state.write().reject = reject;
    }

    /// Fail every call.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.write().unavailable = unavailable;
    }

    /// Submissions received so far.
    pub fn submissions(&self) -> Vec<RelaySubmission> {
        self.state.read().submissions.clone()
    }

    fn check_available(&self) -> Result<(), RelayError> {
        if self.state.read().unavailable {
            return Err(RelayError::Unavailable("mock failure".to_string()));
        }
        Ok(())
    }

    fn record(&self, submission: RelaySubmission) -> Result<bool, RelayError> {
        self.check_available()?;
        let mut state = self.state.write();
        state.submissions.push(submission);
        Ok(!state.reject)
    }
}

#[async_trait]
impl HeaderRelay for MockHeaderRelay {
    async fn best_known_digest(&self) -> Result<Digest, RelayError> {
        self.check_available()?;
        self.state
            .read()
            .best
            .ok_or_else(|| RelayError::Unavailable("no best tip".to_string()))
    }

    async fn height_of(&self, digest: Digest) -> Result<u64, RelayError> {
        self.check_available()?;
        self.state
            .read()
            .heights
            .get(&digest)
            .copied()
            .ok_or(RelayError::UnknownDigest(digest))
    }

    async fn is_ancestor(
        &self,
        ancestor: Digest,
        descendant: Digest,
        limit: u64,
    ) -> Result<bool, RelayError> {
        let low = self.height_of(ancestor).await?;
        let high = self.height_of(descendant).await?;
        Ok(low <= high && high - low <= limit)
    }

    async fn add_headers(
        &self,
        anchor: &RawHeader,
        headers: &[RawHeader],
    ) -> Result<bool, RelayError> {
        self.record(RelaySubmission::AddHeaders {
            anchor: anchor.digest(),
            count: headers.len(),
        })
    }

    async fn add_headers_with_retarget(
        &self,
        _old_period_start: &RawHeader,
        old_period_end: &RawHeader,
        headers: &[RawHeader],
    ) -> Result<bool, RelayError> {
        self.record(RelaySubmission::AddHeadersWithRetarget {
            old_period_end: old_period_end.digest(),
            count: headers.len(),
        })
    }

    async fn mark_new_heaviest(
        &self,
        ancestor: Digest,
        _current_best: &RawHeader,
        new_best: &RawHeader,
        _limit: u64,
    ) -> Result<bool, RelayError> {
        self.record(RelaySubmission::MarkNewHeaviest {
            ancestor,
            new_best: new_best.digest(),
        })
    }
}

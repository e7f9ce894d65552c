//! # Domain Errors
//!
//! Error types for the relay auction and the collaborators it drives.

use thiserror::Error;

/// Account identifier (20-byte).
pub type Address = [u8; 20];

/// Block digest of the tracked chain (32-byte double-SHA256).
pub type Digest = [u8; 32];

/// Token amount on either ledger.
pub type TokenAmount = u128;

/// Errors raised by the auction service.
#[derive(Debug, Error)]
pub enum AuctionError {
    /// Slot height is not a multiple of the slot length.
    #[error("slot {slot} is not aligned to the slot length {slot_length}")]
    UnalignedSlot {
        /// Offending slot height
        slot: u64,
        /// Configured slot length
        slot_length: u64,
    },

    /// Bids are only accepted for slots after the current round.
    #[error("bidding closed for slot {slot}: current round started at {current_start}")]
    BiddingClosed {
        /// Requested slot
        slot: u64,
        /// Start height of the current round
        current_start: u64,
    },

    /// A positive bid must exceed the caller's previous bid.
    #[error("can not bet lower: {amount} does not exceed {previous}")]
    CanNotBetLower {
        /// Previously stored bid
        previous: i128,
        /// Rejected bid
        amount: i128,
    },

    /// A non-positive bid must undercut the caller's previous bid.
    #[error("can not bet higher: {amount} does not undercut {previous}")]
    CanNotBetHigher {
        /// Previously stored bid
        previous: i128,
        /// Rejected bid
        amount: i128,
    },

    /// Withdrawals wait until the slot is current or past.
    #[error("slot {slot} is still open for bidding (current round started at {current_start})")]
    SlotNotClosed {
        /// Requested slot
        slot: u64,
        /// Start height of the current round
        current_start: u64,
    },

    /// No positive deposit is held for this bidder and slot.
    #[error("nothing to withdraw for slot {slot}")]
    NothingToWithdraw {
        /// Requested slot
        slot: u64,
    },

    /// Caller is not the auction admin.
    #[error("unauthorized: caller is not the admin")]
    Unauthorized,

    /// Reward ledger refused the round reward.
    #[error("reward transfer rejected")]
    RewardTransferRejected,

    /// Relay refused the forwarded header submission.
    #[error("relay rejected the submission")]
    RelayRejected,

    /// Relay collaborator failure.
    #[error("relay error: {0}")]
    Relay(#[from] RelayError),

    /// Ledger collaborator failure.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Invalid configuration.
    #[error("config error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl AuctionError {
    /// True when the caller's request itself was invalid, as opposed to a
    /// collaborator failing underneath it.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::UnalignedSlot { .. }
                | Self::BiddingClosed { .. }
                | Self::CanNotBetLower { .. }
                | Self::CanNotBetHigher { .. }
                | Self::SlotNotClosed { .. }
                | Self::NothingToWithdraw { .. }
                | Self::Unauthorized
                | Self::Ledger(
                    LedgerError::InsufficientBalance { .. }
                        | LedgerError::InsufficientAllowance { .. }
                        | LedgerError::PermitExpired { .. }
                        | LedgerError::InvalidSignature(_)
                )
        )
    }
}

/// Errors raised by a header relay.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Digest not known to the relay.
    #[error("unknown digest {}", hex::encode(.0))]
    UnknownDigest(Digest),

    /// Header batch was empty.
    #[error("no headers supplied")]
    EmptyHeaders,

    /// A header does not extend its predecessor.
    #[error("header {index} does not link to its predecessor")]
    BrokenChain {
        /// Position within the submitted batch
        index: usize,
    },

    /// Retarget pair is not one difficulty period apart.
    #[error("retarget pair spans {actual} blocks, expected {expected}")]
    InvalidRetargetPeriod {
        /// Observed span between period start and end
        actual: u64,
        /// Required span
        expected: u64,
    },

    /// Supplied current best does not match the relay's best tip.
    #[error("current best {} is not the relay's best tip", hex::encode(.0))]
    NotBestTip(Digest),

    /// Ancestor not found within the search limit.
    #[error("{} is not an ancestor within {limit} blocks", hex::encode(.ancestor))]
    NotAncestor {
        /// Claimed ancestor
        ancestor: Digest,
        /// Search limit
        limit: u64,
    },

    /// Candidate tip is not heavier than the current one.
    #[error("new best at height {candidate} is not heavier than {current}")]
    NotHeavier {
        /// Height of the current tip
        current: u64,
        /// Height of the candidate tip
        candidate: u64,
    },

    /// Backend unavailable.
    #[error("relay unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised by a token ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Balance too low.
    #[error("insufficient balance: need {required}, have {available}")]
    InsufficientBalance {
        /// Amount requested
        required: TokenAmount,
        /// Amount held
        available: TokenAmount,
    },

    /// Allowance too low.
    #[error("insufficient allowance: need {required}, approved {available}")]
    InsufficientAllowance {
        /// Amount requested
        required: TokenAmount,
        /// Amount approved
        available: TokenAmount,
    },

    /// Permit deadline has passed.
    #[error("permit expired: deadline {deadline}, now {now}")]
    PermitExpired {
        /// Signed deadline
        deadline: u64,
        /// Ledger clock
        now: u64,
    },

    /// Permit signature malformed or signed by someone else.
    #[error("invalid permit signature: {0}")]
    InvalidSignature(String),

    /// Caller may not mint.
    #[error("caller is not the minter")]
    NotMinter,

    /// Supply arithmetic overflowed.
    #[error("amount overflow")]
    Overflow,

    /// Backend unavailable.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

//! # Relay Auction
//!
//! Slot auction that keeps a cross-chain header relay funded and live.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Operators bid for exclusive rights over fixed-length slots of the
//! tracked chain and are paid for keeping the relay current:
//! - Positive bids pay a deposit to win a slot
//! - Negative bids ask for a minted subsidy to take it
//! - An idle winner loses the slot to whoever actually relays ("snap")
//!
//! ## Round Economics
//!
//! | Event | Effect |
//! |-------|--------|
//! | Slot opens with a deposit winner | Half the deposit is burned |
//! | Slot closes with a winner | Fixed reward paid |
//! | Slot closes, deposit best bid | Other half paid to the winner |
//! | Slot closes, subsidy best bid | Subsidy minted, capped per round |
//!
//! ## Module Structure
//!
//! ```text
//! relay-auction/
//! ├── domain/          # Bid, CurrentRound, BidBook, errors, invariants
//! ├── algorithms/      # Bidding, round transitions, liveness
//! ├── ports/           # RelayAuctionApi, HeaderRelay, ledgers, event sink
//! ├── adapters/        # In-memory relay and ledgers, broadcast sink
//! ├── application/     # RelayAuctionService
//! ├── config.rs        # AuctionConfig (TOML + env)
//! └── events.rs        # AuctionEvent
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod events;
pub mod ports;

// Re-exports
pub use adapters::{
    address_of, chain_on, keccak256, recover_signer, sign_digest, BroadcastEventSink,
    InMemoryHeaderRelay, InMemoryTokenLedger, TokenAccount, RETARGET_PERIOD,
};
pub use algorithms::{
    advance_round, check_liveness, place_bid, withdraw_bid, BidReceipt, Payout, RoundSettlement,
    SnapRecord, Transfer,
};
pub use application::{AuctionPorts, AuctionStats, RelayAuctionService};
pub use config::{AuctionConfig, ConfigError};
pub use domain::{
    slot_start_for, Address, AuctionError, AuctionState, BestBid, Bid, BidBook, CurrentRound,
    Digest, LedgerError, PermitSignature, RawHeader, RelayError, SweepTarget, TokenAmount,
    DEFAULT_MAX_MINT, DEFAULT_REWARD_AMOUNT, SLOT_LENGTH, SNAP_THRESHOLD, TOKEN_UNIT,
};
pub use events::AuctionEvent;
pub use ports::{
    AuctionEventSink, DepositLedger, HeaderRelay, MockHeaderRelay, RelayAuctionApi,
    RelaySubmission, RewardLedger,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

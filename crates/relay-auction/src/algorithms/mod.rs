//! # Algorithms
//!
//! Pure auction logic. Each function mutates the state it is handed and
//! returns a plan of the value transfers the caller must still perform.

pub mod bidding;
pub mod liveness;
pub mod rounds;

pub use bidding::{place_bid, withdraw_bid, BidReceipt};
pub use liveness::{check_liveness, SnapRecord};
pub use rounds::{advance_round, Payout, RoundSettlement, Transfer};

//! # Integration Scenarios
//!
//! End-to-end runs of the auction against the in-memory relay and ledgers.

pub mod admin;
pub mod bidding;
pub mod liveness;
pub mod rounds;

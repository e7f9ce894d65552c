//! # Application Layer
//!
//! The auction service wiring the algorithms to the ports.

pub mod service;

pub use service::{AuctionPorts, AuctionStats, RelayAuctionService};

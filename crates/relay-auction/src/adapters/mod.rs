//! # Adapters
//!
//! Reference implementations of the outbound ports, used by tests and
//! local simulations.

pub mod event_sink;
pub mod header_relay;
pub mod permit;
pub mod token_ledger;

pub use event_sink::BroadcastEventSink;
pub use header_relay::{chain_on, InMemoryHeaderRelay, RETARGET_PERIOD};
pub use permit::{address_of, domain_separator, keccak256, permit_digest, recover_signer, sign_digest};
pub use token_ledger::{InMemoryTokenLedger, TokenAccount};

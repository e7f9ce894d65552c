//! # Ports Layer
//!
//! Inbound API of the auction and the collaborators it drives.

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;

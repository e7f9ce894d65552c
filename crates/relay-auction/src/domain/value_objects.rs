//! # Domain Value Objects
//!
//! Immutable value types: bids, permit signatures, raw relay headers and
//! the auction's fixed parameters.

use super::errors::{Digest, TokenAmount};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use sha2::{Digest as _, Sha256};

/// Blocks of the tracked chain covered by one slot.
pub const SLOT_LENGTH: u64 = 144;

/// Ancestor-height gap at which an idle winner may be snapped.
pub const SNAP_THRESHOLD: u64 = 4;

/// One whole token (18 decimals).
pub const TOKEN_UNIT: TokenAmount = 1_000_000_000_000_000_000;

/// Default cap on the subsidy minted for one round.
pub const DEFAULT_MAX_MINT: TokenAmount = 1_000 * TOKEN_UNIT;

/// Default reward paid to every round winner.
pub const DEFAULT_REWARD_AMOUNT: TokenAmount = TOKEN_UNIT;

/// Serialized header size on the tracked chain.
pub const HEADER_LENGTH: usize = 80;

/// Start height of the slot containing `height`.
pub fn slot_start_for(height: u64, slot_length: u64) -> u64 {
    height / slot_length * slot_length
}

/// True if `slot` is a slot boundary.
pub fn is_slot_aligned(slot: u64, slot_length: u64) -> bool {
    slot % slot_length == 0
}

/// A participant's standing offer for one slot.
///
/// On the wire a bid is a signed integer: positive pays to win, negative
/// asks to be paid. Inside the auction the two directions are kept apart so
/// the custody side (deposits) cannot be confused with the mint side
/// (subsidies). Build values with [`Bid::from_signed`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bid {
    /// No active offer.
    #[default]
    Empty,
    /// Pays this much into custody to win the slot.
    Deposit(TokenAmount),
    /// Takes the slot in exchange for this much newly minted supply.
    Subsidy(TokenAmount),
}

impl Bid {
    /// Decode a wire amount.
    pub fn from_signed(amount: i128) -> Self {
        match amount {
            0 => Self::Empty,
            a if a > 0 => Self::Deposit(a.unsigned_abs()),
            a => Self::Subsidy(a.unsigned_abs()),
        }
    }

    /// Encode as a wire amount.
    pub fn to_signed(self) -> i128 {
        match self {
            Self::Empty => 0,
            Self::Deposit(amount) => i128::try_from(amount).unwrap_or(i128::MAX),
            Self::Subsidy(amount) => 0i128.checked_sub_unsigned(amount).unwrap_or(i128::MIN),
        }
    }

    /// Tokens the auction holds in custody for this bid.
    pub fn deposit(self) -> TokenAmount {
        match self {
            Self::Deposit(amount) => amount,
            _ => 0,
        }
    }

    /// Tokens the bidder asks to be minted.
    pub fn subsidy(self) -> TokenAmount {
        match self {
            Self::Subsidy(amount) => amount,
            _ => 0,
        }
    }

    /// True for a strictly positive bid.
    pub fn is_deposit(self) -> bool {
        matches!(self, Self::Deposit(amount) if amount > 0)
    }
}

impl From<i128> for Bid {
    fn from(amount: i128) -> Self {
        Self::from_signed(amount)
    }
}

/// secp256k1 signature over a permit digest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermitSignature {
    /// Recovery byte (0/1 or 27/28).
    pub v: u8,
    /// R component.
    pub r: [u8; 32],
    /// S component.
    pub s: [u8; 32],
}

impl PermitSignature {
    /// Compact `r || s` encoding.
    pub fn compact(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&self.r);
        out[32..].copy_from_slice(&self.s);
        out
    }
}

/// Serialized 80-byte header of the tracked chain.
#[serde_as]
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawHeader(#[serde_as(as = "Bytes")] pub [u8; HEADER_LENGTH]);

impl RawHeader {
    /// Assemble a header from its fields.
    pub fn from_parts(
        version: u32,
        parent: Digest,
        merkle_root: Digest,
        timestamp: u32,
        bits: u32,
        nonce: u32,
    ) -> Self {
        let mut bytes = [0u8; HEADER_LENGTH];
        bytes[0..4].copy_from_slice(&version.to_le_bytes());
        bytes[4..36].copy_from_slice(&parent);
        bytes[36..68].copy_from_slice(&merkle_root);
        bytes[68..72].copy_from_slice(&timestamp.to_le_bytes());
        bytes[72..76].copy_from_slice(&bits.to_le_bytes());
        bytes[76..80].copy_from_slice(&nonce.to_le_bytes());
        Self(bytes)
    }

    /// Double-SHA256 of the serialized header.
    pub fn digest(&self) -> Digest {
        let first = Sha256::digest(self.0);
        Sha256::digest(first).into()
    }

    /// Digest of the parent header.
    pub fn parent(&self) -> Digest {
        let mut parent = [0u8; 32];
        parent.copy_from_slice(&self.0[4..36]);
        parent
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; HEADER_LENGTH] {
        &self.0
    }
}

impl std::fmt::Debug for RawHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("RawHeader")
            .field(&hex::encode(self.digest()))
            .finish()
    }
}

/// Ledger whose auction-held balance an admin sweep collects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SweepTarget {
    /// The reward ledger.
    Reward,
    /// The auction-deposit ledger.
    Deposit,
}

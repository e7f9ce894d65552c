//! # Permit Signatures
//!
//! EIP-2612 style approvals: a keccak256 digest over the approval fields,
//! signed with secp256k1 and checked by public-key recovery.

use crate::domain::{Address, Digest, LedgerError, PermitSignature, TokenAmount};
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use sha3::{Digest as _, Keccak256};

const PERMIT_TYPE: &[u8] =
    b"Permit(address owner,address spender,uint256 value,uint256 nonce,uint256 deadline)";
const DOMAIN_TYPE: &[u8] = b"EIP712Domain(string name,string version)";

/// Keccak-256 hash.
pub fn keccak256(data: &[u8]) -> Digest {
    Keccak256::digest(data).into()
}

/// Domain separator of a ledger called `name`.
pub fn domain_separator(name: &str) -> Digest {
    let mut buf = Vec::with_capacity(96);
    buf.extend_from_slice(&keccak256(DOMAIN_TYPE));
    buf.extend_from_slice(&keccak256(name.as_bytes()));
    buf.extend_from_slice(&keccak256(b"1"));
    keccak256(&buf)
}

/// Digest an owner signs to approve `spender` for `value`.
pub fn permit_digest(
    domain: &Digest,
    owner: &Address,
    spender: &Address,
    value: TokenAmount,
    nonce: u64,
    deadline: u64,
) -> Digest {
    let mut fields = Vec::with_capacity(192);
    fields.extend_from_slice(&keccak256(PERMIT_TYPE));
    fields.extend_from_slice(&word_address(owner));
    fields.extend_from_slice(&word_address(spender));
    fields.extend_from_slice(&word_u128(value));
    fields.extend_from_slice(&word_u128(nonce.into()));
    fields.extend_from_slice(&word_u128(deadline.into()));
    let struct_hash = keccak256(&fields);

    let mut buf = Vec::with_capacity(66);
    buf.extend_from_slice(&[0x19, 0x01]);
    buf.extend_from_slice(domain);
    buf.extend_from_slice(&struct_hash);
    keccak256(&buf)
}

/// Address controlled by a public key: the last 20 bytes of the keccak256
/// of the uncompressed point without its prefix.
pub fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

/// Recover the address that signed `digest`.
pub fn recover_signer(digest: &Digest, signature: &PermitSignature) -> Result<Address, LedgerError> {
    let recovery_id = parse_recovery_id(signature.v)?;
    let sig = Signature::from_slice(&signature.compact())
        .map_err(|e| LedgerError::InvalidSignature(e.to_string()))?;
    let key = VerifyingKey::recover_from_prehash(digest, &sig, recovery_id)
        .map_err(|e| LedgerError::InvalidSignature(e.to_string()))?;
    Ok(address_of(&key))
}

/// Sign `digest` with `key`, producing `v` in the 27/28 convention.
pub fn sign_digest(key: &SigningKey, digest: &Digest) -> Result<PermitSignature, LedgerError> {
    let (sig, recid) = key
        .sign_prehash_recoverable(digest)
        .map_err(|e| LedgerError::InvalidSignature(e.to_string()))?;
    let bytes = sig.to_bytes();
    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&bytes[..32]);
    s.copy_from_slice(&bytes[32..]);
    Ok(PermitSignature {
        v: recid.to_byte() + 27,
        r,
        s,
    })
}

fn parse_recovery_id(v: u8) -> Result<RecoveryId, LedgerError> {
    let id = match v {
        0 | 27 => 0,
        1 | 28 => 1,
        other => {
            return Err(LedgerError::InvalidSignature(format!(
                "bad recovery byte {other}"
            )))
        }
    };
    RecoveryId::try_from(id).map_err(|e| LedgerError::InvalidSignature(e.to_string()))
}

fn word_address(address: &Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address);
    word
}

fn word_u128(value: u128) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

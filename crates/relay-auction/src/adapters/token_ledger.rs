//! # In-Memory Token Ledger
//!
//! Fungible token with balances, allowances, a single minter and signed
//! permits. [`TokenAccount`] binds a caller identity to the shared ledger
//! and implements the auction's ledger ports.

use super::permit::{domain_separator, permit_digest, recover_signer};
use crate::domain::{Address, Digest, LedgerError, PermitSignature, TokenAmount};
use crate::ports::{DepositLedger, RewardLedger};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Default)]
struct LedgerState {
    balances: HashMap<Address, TokenAmount>,
    allowances: HashMap<(Address, Address), TokenAmount>,
    nonces: HashMap<Address, u64>,
    total_supply: TokenAmount,
    minter: Option<Address>,
    now: u64,
}

impl LedgerState {
    fn balance(&self, owner: &Address) -> TokenAmount {
        self.balances.get(owner).copied().unwrap_or(0)
    }

    fn debited(&self, owner: &Address, amount: TokenAmount) -> Result<TokenAmount, LedgerError> {
        let available = self.balance(owner);
        available
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                required: amount,
                available,
            })
    }

    fn credited(&self, owner: &Address, amount: TokenAmount) -> Result<TokenAmount, LedgerError> {
        self.balance(owner)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)
    }

    /// Both sides are checked before either balance changes.
    fn move_tokens(
        &mut self,
        from: &Address,
        to: &Address,
        amount: TokenAmount,
    ) -> Result<(), LedgerError> {
        let from_balance = self.debited(from, amount)?;
        if from == to {
            return Ok(());
        }
        let to_balance = self.credited(to, amount)?;
        self.balances.insert(*from, from_balance);
        self.balances.insert(*to, to_balance);
        Ok(())
    }

    fn create(&mut self, to: &Address, amount: TokenAmount) -> Result<(), LedgerError> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        let balance = self.credited(to, amount)?;
        self.total_supply = supply;
        self.balances.insert(*to, balance);
        Ok(())
    }

    fn destroy(&mut self, from: &Address, amount: TokenAmount) -> Result<(), LedgerError> {
        let balance = self.debited(from, amount)?;
        self.balances.insert(*from, balance);
        self.total_supply = self.total_supply.saturating_sub(amount);
        Ok(())
    }
}

/// Shared token ledger.
pub struct InMemoryTokenLedger {
    name: String,
    domain: Digest,
    state: RwLock<LedgerState>,
}

impl InMemoryTokenLedger {
    /// Create an empty ledger.
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        let name = name.into();
        Arc::new(Self {
            domain: domain_separator(&name),
            name,
            state: RwLock::new(LedgerState::default()),
        })
    }

    /// Handle acting as `owner`.
    pub fn account(self: &Arc<Self>, owner: Address) -> TokenAccount {
        TokenAccount {
            ledger: Arc::clone(self),
            owner,
        }
    }

    /// Ledger name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Grant the mint capability.
    pub fn set_minter(&self, minter: Address) {
        self.state.write().minter = Some(minter);
    }

    /// Create supply out of thin air for `to` (genesis allocation).
    pub fn fund(&self, to: Address, amount: TokenAmount) -> Result<(), LedgerError> {
        self.state.write().create(&to, amount)
    }

    /// Balance of `owner`.
    pub fn balance(&self, owner: &Address) -> TokenAmount {
        self.state.read().balance(owner)
    }

    /// Allowance `owner` granted `spender`.
    pub fn allowance(&self, owner: &Address, spender: &Address) -> TokenAmount {
        self.state
            .read()
            .allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    /// Total supply.
    pub fn total_supply(&self) -> TokenAmount {
        self.state.read().total_supply
    }

    /// Next permit nonce of `owner`.
    pub fn nonce(&self, owner: &Address) -> u64 {
        self.state.read().nonces.get(owner).copied().unwrap_or(0)
    }

    /// Set the ledger clock (seconds).
    pub fn set_time(&self, now: u64) {
        self.state.write().now = now;
    }

    /// Current ledger clock.
    pub fn now(&self) -> u64 {
        self.state.read().now
    }

    /// Digest `owner` must sign to permit `spender` at the current nonce.
    pub fn permit_digest(
        &self,
        owner: &Address,
        spender: &Address,
        value: TokenAmount,
        deadline: u64,
    ) -> Digest {
        permit_digest(
            &self.domain,
            owner,
            spender,
            value,
            self.nonce(owner),
            deadline,
        )
    }
}

/// Caller-bound handle on an [`InMemoryTokenLedger`].
#[derive(Clone)]
pub struct TokenAccount {
    ledger: Arc<InMemoryTokenLedger>,
    owner: Address,
}

impl TokenAccount {
    /// Identity this handle acts as.
    pub fn address(&self) -> Address {
        self.owner
    }

    /// Underlying ledger.
    pub fn ledger(&self) -> &Arc<InMemoryTokenLedger> {
        &self.ledger
    }

    /// Approve `spender` for `amount`.
    pub fn approve(&self, spender: Address, amount: TokenAmount) {
        self.ledger
            .state
            .write()
            .allowances
            .insert((self.owner, spender), amount);
    }

    fn send(&self, to: Address, amount: TokenAmount) -> Result<(), LedgerError> {
        self.ledger
            .state
            .write()
            .move_tokens(&self.owner, &to, amount)?;
        debug!(ledger = %self.ledger.name, to = %hex::encode(to), amount, "[auction] transfer");
        Ok(())
    }
}

#[async_trait]
impl RewardLedger for TokenAccount {
    async fn transfer(&self, to: Address, amount: TokenAmount) -> Result<bool, LedgerError> {
        match self.send(to, amount) {
            Ok(()) => Ok(true),
            Err(LedgerError::InsufficientBalance { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn balance_of(&self, owner: Address) -> Result<TokenAmount, LedgerError> {
        Ok(self.ledger.balance(&owner))
    }
}

#[async_trait]
impl DepositLedger for TokenAccount {
    async fn transfer_from(
        &self,
        from: Address,
        to: Address,
        amount: TokenAmount,
    ) -> Result<(), LedgerError> {
        let mut state = self.ledger.state.write();
        let key = (from, self.owner);
        let allowance = state.allowances.get(&key).copied().unwrap_or(0);
        if allowance < amount {
            return Err(LedgerError::InsufficientAllowance {
                required: amount,
                available: allowance,
            });
        }
        state.move_tokens(&from, &to, amount)?;
        if allowance != TokenAmount::MAX {
            state.allowances.insert(key, allowance - amount);
        }
        Ok(())
    }

    async fn transfer(&self, to: Address, amount: TokenAmount) -> Result<(), LedgerError> {
        self.send(to, amount)
    }

    async fn mint(&self, to: Address, amount: TokenAmount) -> Result<(), LedgerError> {
        let mut state = self.ledger.state.write();
        if state.minter != Some(self.owner) {
            return Err(LedgerError::NotMinter);
        }
        state.create(&to, amount)?;
        info!(ledger = %self.ledger.name, to = %hex::encode(to), amount, "[auction] minted");
        Ok(())
    }

    async fn burn(&self, amount: TokenAmount) -> Result<(), LedgerError> {
        let mut state = self.ledger.state.write();
        state.destroy(&self.owner, amount)?;
        info!(ledger = %self.ledger.name, amount, "[auction] burned");
        Ok(())
    }

    async fn permit(
        &self,
        owner: Address,
        spender: Address,
        value: TokenAmount,
        deadline: u64,
        signature: &PermitSignature,
    ) -> Result<(), LedgerError> {
        let mut state = self.ledger.state.write();
        if state.now > deadline {
            return Err(LedgerError::PermitExpired {
                deadline,
                now: state.now,
            });
        }

        let nonce = state.nonces.get(&owner).copied().unwrap_or(0);
        let digest = permit_digest(&self.ledger.domain, &owner, &spender, value, nonce, deadline);
        let signer = recover_signer(&digest, signature)?;
        if signer != owner {
            return Err(LedgerError::InvalidSignature(format!(
                "signed by {}, expected {}",
                hex::encode(signer),
                hex::encode(owner)
            )));
        }

        state.nonces.insert(owner, nonce + 1);
        state.allowances.insert((owner, spender), value);
        debug!(ledger = %self.ledger.name, owner = %hex::encode(owner), "[auction] permit accepted");
        Ok(())
    }

    async fn balance_of(&self, owner: Address) -> Result<TokenAmount, LedgerError> {
        Ok(self.ledger.balance(&owner))
    }
}

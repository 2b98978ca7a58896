//! Player wallet with a single coin currency.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Economy error types.
#[derive(Debug, Error)]
pub enum EconomyError {
    /// Insufficient funds
    #[error("insufficient funds: need {needed}, have {have}")]
    InsufficientFunds {
        /// Amount needed
        needed: u64,
        /// Amount available
        have: u64,
    },
}

/// Result type for economy operations.
pub type EconomyResult<T> = Result<T, EconomyError>;

/// A wallet holding the player's coins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Wallet {
    balance: u64,
}

impl Wallet {
    /// Creates a new wallet with a starting balance.
    #[must_use]
    pub const fn new(initial_coins: u64) -> Self {
        Self {
            balance: initial_coins,
        }
    }

    /// Creates an empty wallet.
    #[must_use]
    pub const fn empty() -> Self {
        Self { balance: 0 }
    }

    /// Returns the current balance.
    #[must_use]
    pub const fn balance(&self) -> u64 {
        self.balance
    }

    /// Checks whether the wallet can cover an amount.
    #[must_use]
    pub const fn can_afford(&self, amount: u64) -> bool {
        self.balance >= amount
    }

    /// Adds coins to the wallet.
    pub fn earn(&mut self, amount: u64) {
        self.balance = self.balance.saturating_add(amount);
    }

    /// Removes coins from the wallet.
    ///
    /// Fails before deducting anything if the balance is short.
    pub fn spend(&mut self, amount: u64) -> EconomyResult<()> {
        if self.balance < amount {
            return Err(EconomyError::InsufficientFunds {
                needed: amount,
                have: self.balance,
            });
        }
        self.balance -= amount;
        Ok(())
    }
}

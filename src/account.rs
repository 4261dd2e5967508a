use serde::Serialize;
use thiserror::Error;

use crate::ids::{AccountNo, IdentityAllocator};

/// Minor currency units.
pub type Amount = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountEventKind {
    Deposited,
    Withdrawn,
}

/// Validated balance change. Only produced by [`Account::handle_deposit`] and
/// [`Account::handle_withdrawal`], so applying one never breaks the balance
/// invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountEvent {
    account_no: AccountNo,
    amount: Amount,
    kind: AccountEventKind,
}

impl AccountEvent {
    pub fn account_no(&self) -> AccountNo {
        self.account_no
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn kind(&self) -> AccountEventKind {
        self.kind
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    #[error("Amount must be positive, got {amount}")]
    InvalidAmount { amount: Amount },
    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: Amount, available: Amount },
    #[error("Depositing {amount} would overflow the account balance")]
    BalanceOverflow { amount: Amount },
}

/// Read-only snapshot of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccountDetails {
    pub account_no: AccountNo,
    pub balance: Amount,
    pub total_deposited: Amount,
    pub total_withdrawn: Amount,
}

/// Balance holder. `balance == total_deposited - total_withdrawn` and
/// `balance >= 0` hold after every operation.
#[derive(Debug, PartialEq, Eq)]
pub struct Account {
    account_no: AccountNo,
    balance: Amount,
    total_deposited: Amount,
    total_withdrawn: Amount,
}

impl Account {
    /// Empty account under a freshly allocated number.
    pub fn open(ids: &IdentityAllocator) -> Self {
        Self::with_number(ids.allocate_account_no())
    }

    pub(crate) fn with_number(account_no: AccountNo) -> Self {
        Self {
            account_no,
            balance: 0,
            total_deposited: 0,
            total_withdrawn: 0,
        }
    }

    pub fn account_no(&self) -> AccountNo {
        self.account_no
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub fn total_deposited(&self) -> Amount {
        self.total_deposited
    }

    pub fn total_withdrawn(&self) -> Amount {
        self.total_withdrawn
    }

    pub fn details(&self) -> AccountDetails {
        AccountDetails {
            account_no: self.account_no,
            balance: self.balance,
            total_deposited: self.total_deposited,
            total_withdrawn: self.total_withdrawn,
        }
    }

    pub fn deposit(&mut self, amount: Amount) -> Result<(), AccountError> {
        let event = self.handle_deposit(amount)?;
        self.apply(&event);
        Ok(())
    }

    pub fn withdraw(&mut self, amount: Amount) -> Result<(), AccountError> {
        let event = self.handle_withdrawal(amount)?;
        self.apply(&event);
        Ok(())
    }

    pub fn handle_deposit(&self, amount: Amount) -> Result<AccountEvent, AccountError> {
        if amount <= 0 {
            return Err(AccountError::InvalidAmount { amount });
        }
        // total_deposited >= balance, so checking it covers the balance too
        if self.total_deposited.checked_add(amount).is_none() {
            return Err(AccountError::BalanceOverflow { amount });
        }
        Ok(AccountEvent {
            account_no: self.account_no,
            amount,
            kind: AccountEventKind::Deposited,
        })
    }

    pub fn handle_withdrawal(&self, amount: Amount) -> Result<AccountEvent, AccountError> {
        if amount <= 0 {
            return Err(AccountError::InvalidAmount { amount });
        }
        if amount > self.balance {
            return Err(AccountError::InsufficientFunds {
                requested: amount,
                available: self.balance,
            });
        }
        Ok(AccountEvent {
            account_no: self.account_no,
            amount,
            kind: AccountEventKind::Withdrawn,
        })
    }

    pub(crate) fn apply(&mut self, event: &AccountEvent) {
        debug_assert_eq!(event.account_no, self.account_no);
        match event.kind {
            AccountEventKind::Deposited => {
                self.balance += event.amount;
                self.total_deposited += event.amount;
            }
            AccountEventKind::Withdrawn => {
                self.balance -= event.amount;
                self.total_withdrawn += event.amount;
            }
        }
    }
}

use std::fmt;

use thiserror::Error;
use tracing::debug;

use crate::{
    account::Account,
    ids::{AccountNo, CustomerId, IdentityAllocator},
    listing::{AccountSummary, Listing},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CustomerError {
    #[error("Account {0} not found")]
    AccountNotFound(AccountNo),
}

/// Shared-secret credential. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Pin(String);

impl Pin {
    pub fn matches(&self, candidate: &str) -> bool {
        self.0 == candidate
    }
}

impl From<&str> for Pin {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for Pin {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Debug for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Pin(****)")
    }
}

#[derive(Debug)]
pub struct Customer {
    customer_id: CustomerId,
    name: String,
    pin: Option<Pin>,
    // insertion ordered; numbers are unique since the allocator never repeats
    accounts: Vec<Account>,
    ids: IdentityAllocator,
}

impl Customer {
    /// New customer with a fresh id, no accounts and no PIN. Accounts opened
    /// later draw their numbers from `ids`.
    pub fn new(name: impl Into<String>, ids: &IdentityAllocator) -> Self {
        Self {
            customer_id: ids.allocate_customer_id(),
            name: name.into(),
            pin: None,
            accounts: Vec::new(),
            ids: ids.clone(),
        }
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_pin(&mut self, pin: impl Into<Pin>) {
        self.pin = Some(pin.into());
    }

    pub fn has_pin(&self) -> bool {
        self.pin.is_some()
    }

    /// Exact match against the stored PIN. Always false while no PIN is set.
    pub fn verify_pin(&self, candidate: &str) -> bool {
        self.pin.as_ref().is_some_and(|pin| pin.matches(candidate))
    }

    pub fn add_account(&mut self) -> &mut Account {
        let account = Account::open(&self.ids);
        debug!(
            customer_id = self.customer_id,
            account_no = account.account_no(),
            "account opened"
        );
        let idx = self.accounts.len();
        self.accounts.push(account);
        &mut self.accounts[idx]
    }

    pub fn get_account(&self, account_no: AccountNo) -> Result<&Account, CustomerError> {
        self.accounts
            .iter()
            .find(|acc| acc.account_no() == account_no)
            .ok_or(CustomerError::AccountNotFound(account_no))
    }

    pub fn get_account_mut(
        &mut self,
        account_no: AccountNo,
    ) -> Result<&mut Account, CustomerError> {
        self.accounts
            .iter_mut()
            .find(|acc| acc.account_no() == account_no)
            .ok_or(CustomerError::AccountNotFound(account_no))
    }

    pub fn owns(&self, account_no: AccountNo) -> bool {
        self.accounts.iter().any(|acc| acc.account_no() == account_no)
    }

    /// Returns the removed account, or `None` when this customer has no such
    /// account. The number stays issued either way.
    pub fn remove_account(&mut self, account_no: AccountNo) -> Option<Account> {
        let idx = self
            .accounts
            .iter()
            .position(|acc| acc.account_no() == account_no);
        match idx {
            Some(idx) => {
                debug!(customer_id = self.customer_id, account_no, "account closed");
                Some(self.accounts.remove(idx))
            }
            None => {
                debug!(
                    customer_id = self.customer_id,
                    account_no, "account to close not found"
                );
                None
            }
        }
    }

    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.iter()
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    pub fn accounts_summary(&self) -> Listing<AccountSummary> {
        self.accounts
            .iter()
            .enumerate()
            .map(|(idx, acc)| AccountSummary {
                position: idx + 1,
                account_no: acc.account_no(),
                balance: acc.balance(),
            })
            .collect()
    }
}

use std::collections::HashMap;

use thiserror::Error;

use crate::{
    bank::{Bank, BankError},
    ids::{AccountNo, CustomerId},
};

use super::script_parser::{ScriptOp, ScriptRow};

/// Problems with the script itself, as opposed to rejected ledger operations.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Malformed row: {0}")]
    Malformed(#[from] csv::Error),
    #[error("Field `{field}` is required for {op:?}")]
    MissingField { op: ScriptOp, field: &'static str },
    #[error("Customer alias `{0}` is already taken")]
    DuplicateCustomer(String),
    #[error("Account alias `{0}` is already taken")]
    DuplicateAccount(String),
    #[error("Unknown customer alias `{0}`")]
    UnknownCustomer(String),
    #[error("Unknown account alias `{0}`")]
    UnknownAccount(String),
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Script(#[from] ScriptError),
    #[error(transparent)]
    Ledger(#[from] BankError),
}

fn required<T>(value: Option<T>, op: ScriptOp, field: &'static str) -> Result<T, ScriptError> {
    value.ok_or(ScriptError::MissingField { op, field })
}

/// Applies script rows to a [`Bank`], translating aliases to allocated ids.
///
/// Aliases outlive the entities they name, so acting on a closed account or a
/// removed customer reaches the bank and is rejected there.
pub struct ScriptRunner {
    pub bank: Bank,
    customers: HashMap<String, CustomerId>,
    accounts: HashMap<String, AccountNo>,
}

impl ScriptRunner {
    pub fn new(bank: Bank) -> Self {
        Self {
            bank,
            customers: HashMap::new(),
            accounts: HashMap::new(),
        }
    }

    pub fn customer_id(&self, alias: &str) -> Option<CustomerId> {
        self.customers.get(alias).copied()
    }

    pub fn account_no(&self, alias: &str) -> Option<AccountNo> {
        self.accounts.get(alias).copied()
    }

    fn resolve_customer(
        &self,
        alias: Option<&str>,
        op: ScriptOp,
    ) -> Result<CustomerId, ScriptError> {
        let alias = required(alias, op, "customer")?;
        self.customer_id(alias)
            .ok_or_else(|| ScriptError::UnknownCustomer(alias.to_owned()))
    }

    fn resolve_account(
        &self,
        alias: Option<&str>,
        op: ScriptOp,
        field: &'static str,
    ) -> Result<AccountNo, ScriptError> {
        let alias = required(alias, op, field)?;
        self.account_no(alias)
            .ok_or_else(|| ScriptError::UnknownAccount(alias.to_owned()))
    }

    pub fn execute(&mut self, row: ScriptRow) -> Result<(), DriverError> {
        let op = row.op;
        match op {
            ScriptOp::Customer => {
                let alias = required(row.customer, op, "customer")?;
                let pin = required(row.pin, op, "pin")?;
                if self.customers.contains_key(&alias) {
                    return Err(ScriptError::DuplicateCustomer(alias).into());
                }
                let customer_id = self.bank.add_customer(alias.clone(), pin).customer_id();
                self.customers.insert(alias, customer_id);
            }
            ScriptOp::Open => {
                let customer_id = self.resolve_customer(row.customer.as_deref(), op)?;
                let alias = required(row.account, op, "account")?;
                if self.accounts.contains_key(&alias) {
                    return Err(ScriptError::DuplicateAccount(alias).into());
                }
                let account_no = self.bank.add_account(customer_id)?.account_no();
                self.accounts.insert(alias, account_no);
            }
            ScriptOp::Deposit => {
                let account_no = self.resolve_account(row.account.as_deref(), op, "account")?;
                let amount = required(row.amount, op, "amount")?;
                self.bank
                    .get_account_mut(account_no)?
                    .deposit(amount)
                    .map_err(BankError::from)?;
            }
            ScriptOp::Withdraw => {
                let account_no = self.resolve_account(row.account.as_deref(), op, "account")?;
                let amount = required(row.amount, op, "amount")?;
                self.bank
                    .get_account_mut(account_no)?
                    .withdraw(amount)
                    .map_err(BankError::from)?;
            }
            ScriptOp::Transfer => {
                let sender = self.resolve_account(row.account.as_deref(), op, "account")?;
                let recipient = self.resolve_account(row.target.as_deref(), op, "target")?;
                let amount = required(row.amount, op, "amount")?;
                let pin = required(row.pin, op, "pin")?;
                self.bank.transfer(sender, recipient, amount, &pin)?;
            }
            ScriptOp::Close => {
                let account_no = self.resolve_account(row.account.as_deref(), op, "account")?;
                let owner = self.bank.find_customer_by_account(account_no)?.customer_id();
                self.bank
                    .get_customer_mut(owner)?
                    .remove_account(account_no)
                    .ok_or(BankError::AccountNotFound(account_no))?;
            }
            ScriptOp::Remove => {
                let customer_id = self.resolve_customer(row.customer.as_deref(), op)?;
                self.bank
                    .remove_customer(customer_id)
                    .ok_or(BankError::CustomerNotFound(customer_id))?;
            }
        }
        Ok(())
    }
}

use thiserror::Error;
use tracing::debug;

use crate::{
    account::{Account, AccountError, Amount},
    customer::{Customer, CustomerError, Pin},
    ids::{AccountNo, CustomerId, IdentityAllocator},
    listing::{CustomerSummary, Listing},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BankError {
    #[error("Customer {0} not found")]
    CustomerNotFound(CustomerId),
    #[error("Account {0} not found")]
    AccountNotFound(AccountNo),
    #[error("Invalid PIN")]
    InvalidPin,
    #[error(transparent)]
    Account(#[from] AccountError),
}

impl From<CustomerError> for BankError {
    fn from(err: CustomerError) -> Self {
        match err {
            CustomerError::AccountNotFound(account_no) => BankError::AccountNotFound(account_no),
        }
    }
}

/// Owns every customer (and through them every account) of one simulated bank,
/// along with the identifier namespace they are numbered from.
#[derive(Debug)]
pub struct Bank {
    name: String,
    pin: Option<Pin>,
    ids: IdentityAllocator,
    customers: Vec<Customer>,
}

impl Bank {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_allocator(name, IdentityAllocator::new())
    }

    pub fn with_allocator(name: impl Into<String>, ids: IdentityAllocator) -> Self {
        Self {
            name: name.into(),
            pin: None,
            ids,
            customers: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn allocator(&self) -> &IdentityAllocator {
        &self.ids
    }

    /// Bank-level PIN. Transfers are authorized by the sender's own PIN and
    /// never consult this one.
    pub fn set_pin(&mut self, pin: impl Into<Pin>) {
        self.pin = Some(pin.into());
    }

    pub fn verify_pin(&self, candidate: &str) -> bool {
        self.pin.as_ref().is_some_and(|pin| pin.matches(candidate))
    }

    pub fn add_customer(&mut self, name: impl Into<String>, pin: impl Into<Pin>) -> &mut Customer {
        let mut customer = Customer::new(name, &self.ids);
        customer.set_pin(pin);
        debug!(
            customer_id = customer.customer_id(),
            name = customer.name(),
            "customer added"
        );
        let idx = self.customers.len();
        self.customers.push(customer);
        &mut self.customers[idx]
    }

    pub fn get_customer(&self, customer_id: CustomerId) -> Result<&Customer, BankError> {
        self.customers
            .iter()
            .find(|c| c.customer_id() == customer_id)
            .ok_or(BankError::CustomerNotFound(customer_id))
    }

    pub fn get_customer_mut(&mut self, customer_id: CustomerId) -> Result<&mut Customer, BankError> {
        self.customers
            .iter_mut()
            .find(|c| c.customer_id() == customer_id)
            .ok_or(BankError::CustomerNotFound(customer_id))
    }

    /// Removes the customer together with all of their accounts. `None` when
    /// no such customer exists.
    pub fn remove_customer(&mut self, customer_id: CustomerId) -> Option<Customer> {
        let idx = self
            .customers
            .iter()
            .position(|c| c.customer_id() == customer_id);
        match idx {
            Some(idx) => {
                let customer = self.customers.remove(idx);
                debug!(
                    customer_id,
                    discarded_accounts = customer.account_count(),
                    "customer removed"
                );
                Some(customer)
            }
            None => {
                debug!(customer_id, "customer to remove not found");
                None
            }
        }
    }

    pub fn add_account(&mut self, customer_id: CustomerId) -> Result<&mut Account, BankError> {
        Ok(self.get_customer_mut(customer_id)?.add_account())
    }

    pub fn customers(&self) -> impl Iterator<Item = &Customer> {
        self.customers.iter()
    }

    pub fn list_customers(&self) -> Listing<CustomerSummary> {
        self.customers
            .iter()
            .enumerate()
            .map(|(idx, c)| CustomerSummary {
                position: idx + 1,
                customer_id: c.customer_id(),
                name: c.name().to_owned(),
                accounts: c.account_count(),
            })
            .collect()
    }

    /// Linear search for the customer holding `account_no`.
    pub fn find_customer_by_account(&self, account_no: AccountNo) -> Result<&Customer, BankError> {
        self.customers
            .iter()
            .find(|c| c.owns(account_no))
            .ok_or(BankError::AccountNotFound(account_no))
    }

    pub fn get_account(&self, account_no: AccountNo) -> Result<&Account, BankError> {
        Ok(self
            .find_customer_by_account(account_no)?
            .get_account(account_no)?)
    }

    pub fn get_account_mut(&mut self, account_no: AccountNo) -> Result<&mut Account, BankError> {
        self.customers
            .iter_mut()
            .find_map(|c| c.get_account_mut(account_no).ok())
            .ok_or(BankError::AccountNotFound(account_no))
    }

    /// Moves `amount` from `sender` to `recipient`, authorized by the PIN of
    /// the customer owning `sender`.
    ///
    /// Every check runs before anything is mutated, so on error both accounts
    /// are untouched. `sender == recipient` is allowed: the balance stays the
    /// same while both counters grow by `amount`.
    pub fn transfer(
        &mut self,
        sender: AccountNo,
        recipient: AccountNo,
        amount: Amount,
        pin: &str,
    ) -> Result<(), BankError> {
        if amount <= 0 {
            return Err(AccountError::InvalidAmount { amount }.into());
        }
        let owner = self.find_customer_by_account(sender)?;
        let withdrawal = owner.get_account(sender)?.handle_withdrawal(amount)?;
        if !owner.verify_pin(pin) {
            return Err(BankError::InvalidPin);
        }
        let deposit = self.get_account(recipient)?.handle_deposit(amount)?;

        self.get_account_mut(sender)?.apply(&withdrawal);
        self.get_account_mut(recipient)?.apply(&deposit);
        debug!(sender, recipient, amount, "transfer applied");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::ids::IdClass;

    use super::*;

    fn bank() -> Bank {
        Bank::with_allocator("X", IdentityAllocator::with_seed(2024))
    }

    /// Alice with 500 on A1, Bob with an empty A2.
    fn funded_pair(bank: &mut Bank) -> (AccountNo, AccountNo) {
        let alice = bank.add_customer("Alice", "1111");
        let a1 = alice.add_account();
        a1.deposit(500).unwrap();
        let a1 = a1.account_no();
        let a2 = bank.add_customer("Bob", "2222").add_account().account_no();
        (a1, a2)
    }

    fn balances(bank: &Bank, a: AccountNo, b: AccountNo) -> (Amount, Amount) {
        (
            bank.get_account(a).unwrap().balance(),
            bank.get_account(b).unwrap().balance(),
        )
    }

    #[test]
    fn transfer_with_correct_and_wrong_pin() {
        let mut bank = bank();
        let (a1, a2) = funded_pair(&mut bank);

        bank.transfer(a1, a2, 200, "1111").unwrap();
        assert_eq!(balances(&bank, a1, a2), (300, 200));

        let err = bank.transfer(a1, a2, 200, "9999").unwrap_err();
        assert_eq!(err, BankError::InvalidPin);
        assert_eq!(balances(&bank, a1, a2), (300, 200));

        // the recipient's PIN does not authorize the sender's account
        let err = bank.transfer(a1, a2, 1, "2222").unwrap_err();
        assert_eq!(err, BankError::InvalidPin);
    }

    #[test]
    fn transfer_validation_failures_change_nothing() {
        let mut bank = bank();
        let (a1, a2) = funded_pair(&mut bank);

        assert_eq!(
            bank.transfer(a1, a2, 0, "1111").unwrap_err(),
            BankError::Account(AccountError::InvalidAmount { amount: 0 })
        );
        assert_eq!(
            bank.transfer(a1, a2, 501, "1111").unwrap_err(),
            BankError::Account(AccountError::InsufficientFunds {
                requested: 501,
                available: 500
            })
        );
        let unknown = 1;
        assert_eq!(
            bank.transfer(unknown, a2, 10, "1111").unwrap_err(),
            BankError::AccountNotFound(unknown)
        );
        assert_eq!(
            bank.transfer(a1, unknown, 10, "1111").unwrap_err(),
            BankError::AccountNotFound(unknown)
        );
        assert_eq!(balances(&bank, a1, a2), (500, 0));
        assert_eq!(bank.get_account(a1).unwrap().total_withdrawn(), 0);
    }

    #[test]
    fn invalid_amount_wins_over_unknown_sender() {
        let mut bank = bank();
        assert_eq!(
            bank.transfer(1, 2, -5, "").unwrap_err(),
            BankError::Account(AccountError::InvalidAmount { amount: -5 })
        );
    }

    #[test]
    fn transfer_of_whole_balance_succeeds() {
        let mut bank = bank();
        let (a1, a2) = funded_pair(&mut bank);
        bank.transfer(a1, a2, 500, "1111").unwrap();
        assert_eq!(balances(&bank, a1, a2), (0, 500));
    }

    #[test]
    fn self_transfer_bumps_both_counters() {
        let mut bank = bank();
        let (a1, _) = funded_pair(&mut bank);
        bank.transfer(a1, a1, 200, "1111").unwrap();
        let details = bank.get_account(a1).unwrap().details();
        assert_eq!(details.balance, 500);
        assert_eq!(details.total_deposited, 700);
        assert_eq!(details.total_withdrawn, 200);
    }

    #[test]
    fn transfer_between_accounts_of_one_customer() {
        let mut bank = bank();
        let alice = bank.add_customer("Alice", "1111");
        let alice_id = alice.customer_id();
        let from = alice.add_account();
        from.deposit(40).unwrap();
        let from = from.account_no();
        let to = bank.add_account(alice_id).unwrap().account_no();

        bank.transfer(from, to, 15, "1111").unwrap();
        assert_eq!(balances(&bank, from, to), (25, 15));
    }

    #[test]
    fn customer_lifecycle() {
        let mut bank = bank();
        assert_eq!(bank.name(), "X");
        assert_eq!(bank.list_customers(), Listing::Empty);

        let alice = bank.add_customer("Alice", "1111").customer_id();
        let bob = bank.add_customer("Bob", "2222").customer_id();
        assert_ne!(alice, bob);
        assert!(bank.get_customer(alice).unwrap().verify_pin("1111"));
        bank.add_account(bob).unwrap();

        let listing = bank.list_customers();
        assert_eq!(listing.len(), 2);
        assert_eq!(listing.entries()[0].name, "Alice");
        assert_eq!(listing.entries()[1].position, 2);
        assert_eq!(listing.entries()[1].accounts, 1);

        let removed = bank.remove_customer(bob).unwrap();
        assert_eq!(removed.name(), "Bob");
        assert!(bank.remove_customer(bob).is_none());
        assert_eq!(
            bank.get_customer(bob).unwrap_err(),
            BankError::CustomerNotFound(bob)
        );
        assert_eq!(
            bank.add_account(bob).unwrap_err(),
            BankError::CustomerNotFound(bob)
        );
        assert_eq!(bank.list_customers().len(), 1);
    }

    #[test]
    fn removing_customer_discards_accounts() {
        let mut bank = bank();
        let (a1, a2) = funded_pair(&mut bank);
        let alice = bank.find_customer_by_account(a1).unwrap().customer_id();
        bank.remove_customer(alice).unwrap();

        assert_eq!(
            bank.find_customer_by_account(a1).unwrap_err(),
            BankError::AccountNotFound(a1)
        );
        bank.get_account_mut(a2).unwrap().deposit(5).unwrap();
        assert_eq!(
            bank.transfer(a2, a1, 1, "2222").unwrap_err(),
            BankError::AccountNotFound(a1)
        );
        assert_eq!(bank.get_account(a2).unwrap().balance(), 5);
        assert!(bank.allocator().is_issued(IdClass::AccountNo, a1));
    }

    #[test]
    fn bank_pin_is_separate_from_customer_pins() {
        let mut bank = bank();
        assert!(!bank.verify_pin("0000"));
        bank.set_pin("0000");
        assert!(bank.verify_pin("0000"));

        let (a1, a2) = funded_pair(&mut bank);
        assert_eq!(
            bank.transfer(a1, a2, 10, "0000").unwrap_err(),
            BankError::InvalidPin
        );
    }

    #[test]
    fn banks_have_independent_namespaces() {
        let mut first = Bank::with_allocator("A", IdentityAllocator::with_seed(1));
        let mut second = Bank::with_allocator("B", IdentityAllocator::with_seed(1));
        let c1 = first.add_customer("Ann", "1").customer_id();
        let c2 = second.add_customer("Ben", "2").customer_id();
        // same seed, separate issued sets
        assert_eq!(c1, c2);
        assert_eq!(second.allocator().issued_count(IdClass::CustomerId), 1);
    }
}

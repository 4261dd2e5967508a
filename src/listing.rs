use serde::Serialize;

use crate::{
    account::Amount,
    ids::{AccountNo, CustomerId},
};

/// Ordered listing that distinguishes "nothing to show" from a list of entries,
/// so callers never have to special-case an empty `Vec`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing<T> {
    Empty,
    Entries(Vec<T>),
}

impl<T> Listing<T> {
    pub fn is_empty(&self) -> bool {
        matches!(self, Listing::Empty)
    }

    pub fn len(&self) -> usize {
        match self {
            Listing::Empty => 0,
            Listing::Entries(entries) => entries.len(),
        }
    }

    pub fn entries(&self) -> &[T] {
        match self {
            Listing::Empty => &[],
            Listing::Entries(entries) => entries,
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Empty => Vec::new(),
            Listing::Entries(entries) => entries,
        }
    }
}

impl<T> FromIterator<T> for Listing<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let entries: Vec<T> = iter.into_iter().collect();
        if entries.is_empty() {
            Listing::Empty
        } else {
            Listing::Entries(entries)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccountSummary {
    /// 1-based.
    pub position: usize,
    pub account_no: AccountNo,
    pub balance: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerSummary {
    /// 1-based.
    pub position: usize,
    pub customer_id: CustomerId,
    pub name: String,
    pub accounts: usize,
}

use std::io::Write;

use csv::Writer;
use serde::Serialize;

use crate::{
    account::Amount,
    bank::Bank,
    ids::{AccountNo, CustomerId},
};

#[derive(Debug, Serialize)]
pub struct AccountRow {
    pub customer_id: CustomerId,
    pub customer: String,
    pub account_no: AccountNo,
    pub balance: Amount,
    pub total_deposited: Amount,
    pub total_withdrawn: Amount,
}

/// Every account of the bank, customers and accounts in insertion order.
pub fn account_rows(bank: &Bank) -> impl Iterator<Item = AccountRow> + '_ {
    bank.customers().flat_map(|customer| {
        customer.accounts().map(move |acc| {
            let details = acc.details();
            AccountRow {
                customer_id: customer.customer_id(),
                customer: customer.name().to_owned(),
                account_no: details.account_no,
                balance: details.balance,
                total_deposited: details.total_deposited,
                total_withdrawn: details.total_withdrawn,
            }
        })
    })
}

pub fn print_accounts<W>(
    output: &mut W,
    accounts: impl Iterator<Item = AccountRow>,
) -> anyhow::Result<()>
where
    W: Write,
{
    let mut writer = Writer::from_writer(output);
    for acc in accounts {
        if let Err(err) = writer.serialize(acc) {
            anyhow::bail!("Failed to write to CSV: {err}")
        }
    }
    if let Err(err) = writer.flush() {
        anyhow::bail!("Failed to flush CSV writer: {err}")
    }
    Ok(())
}

//! Batch front end over the ledger: reads a CSV script of operations, applies
//! it to a fresh [`Bank`] and prints the resulting accounts as CSV.

use std::io::{Read, Write};

use anyhow::Result;
use report_printer::{account_rows, print_accounts};
use runner::ScriptRunner;
use script_parser::CsvScriptParser;

use crate::{bank::Bank, ids::IdentityAllocator};

pub mod report_printer;
pub mod runner;
pub mod script_parser;

pub use runner::{DriverError, ScriptError};

pub const DEFAULT_BANK_NAME: &str = "Ledger Bank";

pub struct Service<'w, R, W: 'w> {
    pub input: R,
    pub output: &'w mut W,
    /// Fixed allocator seed for reproducible account numbers.
    pub seed: Option<u64>,
    pub error_printer: Box<dyn FnMut(u64, DriverError)>,
}

impl<'w, R, W> Service<'w, R, W>
where
    R: Read,
    W: Write + 'w,
{
    pub fn run(mut self) -> Result<()> {
        let ids = match self.seed {
            Some(seed) => IdentityAllocator::with_seed(seed),
            None => IdentityAllocator::new(),
        };
        let mut runner = ScriptRunner::new(Bank::with_allocator(DEFAULT_BANK_NAME, ids));

        for (line, row) in CsvScriptParser::new(self.input) {
            let result = row
                .map_err(|err| DriverError::from(ScriptError::from(err)))
                .and_then(|row| runner.execute(row));
            if let Err(err) = result {
                (self.error_printer)(line, err);
            }
        }

        print_accounts(self.output, account_rows(&runner.bank))
    }
}

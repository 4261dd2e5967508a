use std::io::Read;

use csv::{Reader, StringRecord, Trim};
use serde::Deserialize;

use crate::account::Amount;

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScriptOp {
    Customer,
    Open,
    Deposit,
    Withdraw,
    Transfer,
    Close,
    Remove,
}

/// One script line. `customer`, `account` and `target` are aliases chosen by
/// the script author, not allocated ids.
#[derive(Debug, Deserialize)]
pub struct ScriptRow {
    pub op: ScriptOp,
    pub customer: Option<String>,
    pub account: Option<String>,
    pub target: Option<String>,
    pub amount: Option<Amount>,
    pub pin: Option<String>,
}

/// Reads script rows in CSV format, yielding each with the line it came from.
pub struct CsvScriptParser<R> {
    reader: Reader<R>,
    headers: Option<StringRecord>,
    record: StringRecord,
    done: bool,
}

impl<R> CsvScriptParser<R>
where
    R: Read,
{
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(source);

        Self {
            reader,
            headers: None,
            record: StringRecord::new(),
            done: false,
        }
    }
}

impl<R> Iterator for CsvScriptParser<R>
where
    R: Read,
{
    type Item = (u64, Result<ScriptRow, csv::Error>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.headers.is_none() {
            match self.reader.headers() {
                Ok(headers) => self.headers = Some(headers.clone()),
                Err(err) => {
                    self.done = true;
                    return Some((1, Err(err)));
                }
            }
        }
        match self.reader.read_record(&mut self.record) {
            Ok(false) => {
                self.done = true;
                None
            }
            Ok(true) => {
                let line = self.record.position().map_or(0, |pos| pos.line());
                Some((line, self.record.deserialize(self.headers.as_ref())))
            }
            Err(err) => {
                // io failures repeat forever, anything else is local to the row
                self.done = err.is_io_error();
                let line = err.position().map_or(0, |pos| pos.line());
                Some((line, Err(err)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_carry_their_line_numbers() {
        let script = "op,customer,account,target,amount,pin\n\
                      customer, Alice ,,,,1111\n\
                      deposit,,a1,,500,\n";
        let rows: Vec<_> = CsvScriptParser::new(script.as_bytes()).collect();
        assert_eq!(rows.len(), 2);

        let (line, row) = &rows[0];
        let row = row.as_ref().unwrap();
        assert_eq!(*line, 2);
        assert_eq!(row.op, ScriptOp::Customer);
        assert_eq!(row.customer.as_deref(), Some("Alice"));
        assert_eq!(row.account, None);
        assert_eq!(row.pin.as_deref(), Some("1111"));

        let (line, row) = &rows[1];
        let row = row.as_ref().unwrap();
        assert_eq!(*line, 3);
        assert_eq!(row.op, ScriptOp::Deposit);
        assert_eq!(row.amount, Some(500));
    }

    #[test]
    fn malformed_row_does_not_stop_parsing() {
        let script = "op,customer,account,target,amount,pin\n\
                      explode,,,,,\n\
                      deposit,,a1,,ten,\n\
                      withdraw,,a1,,5,\n";
        let rows: Vec<_> = CsvScriptParser::new(script.as_bytes()).collect();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].1.is_err());
        assert!(rows[1].1.is_err());
        assert_eq!(rows[2].0, 4);
        assert_eq!(rows[2].1.as_ref().unwrap().op, ScriptOp::Withdraw);
    }

    #[test]
    fn short_rows_leave_missing_fields_empty() {
        let script = "op,customer,account,target,amount,pin\nremove,Bob\n";
        let rows: Vec<_> = CsvScriptParser::new(script.as_bytes()).collect();
        let row = rows[0].1.as_ref().unwrap();
        assert_eq!(row.op, ScriptOp::Remove);
        assert_eq!(row.customer.as_deref(), Some("Bob"));
        assert_eq!(row.pin, None);
    }
}

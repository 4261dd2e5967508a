use std::fs::File;

use anyhow::{Context, Result};
use bank_ledger::driver::{DriverError, Service};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let filename = args
        .next()
        .context("Expected a script file name as the first argument")?;
    let seed = args
        .next()
        .map(|seed| {
            seed.parse::<u64>()
                .with_context(|| format!("Invalid seed `{seed}`"))
        })
        .transpose()?;
    let file = File::open(&filename).with_context(|| format!("Failed to open `{filename}`"))?;

    let service = Service {
        input: file,
        output: &mut std::io::stdout(),
        seed,
        error_printer: Box::new(|line, err| match err {
            DriverError::Script(err) => eprintln!("Error at line {line}: {err}"),
            DriverError::Ledger(err) => tracing::warn!(line, %err, "operation rejected"),
        }),
    };
    service.run()
}

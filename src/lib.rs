/// Unique account numbers and customer ids, drawn at random from bounded
/// ranges and never reissued.
pub mod ids;

/// Balance holder. Changes are validated into events first and applied after,
/// so a rejected operation never touches state.
pub mod account;

/// Account owner, holder of the PIN that authorizes transfers.
pub mod customer;

/// Owner of all customers, and the transfer protocol between accounts.
pub mod bank;

pub mod listing;

/// CSV batch driver used by the binary and the integration tests.
pub mod driver;

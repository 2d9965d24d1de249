//! Atlas Custody Ledger
//!
//! Per-client, per-asset holdings with a custody-type state machine.
//! Holdings are created once per (client, asset) pair, never deleted, and
//! mutated only under per-holding serialization: quantity changes go
//! through `credit`/`debit`, custody arrangement changes through
//! `migrate`, and bilateral OTC settlement through `transfer`.

mod error;
mod ledger;

pub use error::{Error, Result};
pub use ledger::CustodyLedger;

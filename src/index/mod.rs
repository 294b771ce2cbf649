//!
//! Address balances built from scan events.
//!
//! `BalanceIndex` is a `ScanListener`; pass it to a scan and query it
//! afterwards, or while the scan is stepped block by block.
//!

mod balance;
mod utxo;

pub use balance::{BalanceIndex, BalanceRecord};
pub use utxo::UnspentSet;

//!
//! Block by block iteration over a ledger file.
//!
//! ## Decoding modes
//! - Blocks inside the region of interest (`ScanRange`) are fully decoded,
//!   every transaction is read and hashed, and events for consumed inputs
//!   and created outputs go to the `ScanListener`.
//! - Other blocks are read header-only. The declared record size moves
//!   the cursor to the next record, so both modes stay aligned.
//!
//! ## Error handling
//! - The first malformed record stops the iteration with its error.
//!   There is no resynchronization on the next magic.
//! - A zero magic is taken as preallocated padding at the file end.
//!

mod config;
mod iter_block;
mod scan;
mod util;

pub use config::{ScanConfig, ScanRange};
pub use iter_block::{BlockIter, ScanState};
pub use scan::{scan, ScanSummary};
pub use util::Progress;

//!
//! # Introduction
//!
//! This library decodes the raw ledger files (`blkNNNNN.dat`) block by
//! block, and indexes address balances along the way.
//!
//! It decodes all transactions, hashes them over their exact bytes,
//! recognises pay-to-address and pay-to-public-key scripts, and
//! connects spends to the outputs seen earlier in the scan to figure
//! out who sent what.
//!
//! Blocks outside the range of interest are read header-only, so a
//! scan can reach a late block without decoding every transaction
//! before it.
//!
//! ## Caveat
//!
//! Only the legacy transaction layout is decoded, and only the
//! pay-to-address and pay-to-public-key templates resolve to an address.
//!
//! # Example
//!
//! ```rust
//! use ledger_explorer::{BalanceIndex, LedgerDB, ScanConfig, ScanRange};
//! use std::path::Path;
//!
//! let path = Path::new("/Users/me/blocks/blk00000.dat");
//! let db = LedgerDB::new(path, ScanConfig::default()).unwrap();
//!
//! // dump the 170th block
//! println!("{}", db.dump_block(170).unwrap());
//!
//! // balances over the whole file
//! let mut index = BalanceIndex::new();
//! db.scan(ScanRange::all(), &mut index).unwrap();
//! println!("{}", index.balance_of("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa").unwrap());
//! ```
//!

pub(crate) mod api;
pub mod index;
pub mod iter;
pub mod parser;

#[doc(inline)]
pub use crate::api::*;

//!
//! This module defines how to parse the binary ledger file into the block structs defined in proto.
//!

/// read blocks and transactions from ledger files
pub mod blk_file;

/// define binary file readers
pub mod reader;

/// decode scripts and recognise the pay-to-address and pay-to-public-key templates
pub mod script;

/// content hashes and public key hashes
pub mod hash;

/// checksummed base-58 addresses
pub mod address;

/// callbacks of a scan
pub mod events;

/// various formats of ledger data representation
pub mod proto;

/// error handling
pub mod errors;

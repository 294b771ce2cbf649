//!
//! ## Block Types
//!
//! There are two variants of block types.
//! - FBlock: `full_proto::FBlock`, the decoded record with hashes,
//!   script types and addresses attached.
//! - SBlock: `simple_proto::SBlock`, a display form for dumping,
//!   with hashes as hex, scripts as tokens and values in fixed point.
//!
//! `SBlock` is built from `FBlock` through `From`.
//!

/// decoded blocks and transactions with hashes, script types, addresses
pub mod full_proto;

/// display form of blocks and transactions, for dumps
pub mod simple_proto;

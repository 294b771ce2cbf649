//!
//! Crates APIs, essential structs, functions, methods are all here!
//!
//! To quickly understand how to use this crate, have a look at the
//! documentation for `ledger_explorer::LedgerDB`!!.
//!
//! # Example
//!
//! ```rust
//! use ledger_explorer::{LedgerDB, ScanConfig};
//! use std::path::Path;
//!
//! let path = Path::new("/Users/me/blocks/blk00000.dat");
//!
//! // mainnet magic, stop at trailing padding
//! let db = LedgerDB::new(path, ScanConfig::default()).unwrap();
//!
//! // accept any record magic
//! let config = ScanConfig { magic: None, ..ScanConfig::default() };
//! let db = LedgerDB::new(path, config).unwrap();
//! ```
//!

use crate::parser::address::{self, PUBKEY_ADDRESS_VERSION};
use crate::parser::blk_file::BlkFile;
use crate::parser::script::evaluate_script;
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
// re-exports
pub use crate::index::{BalanceIndex, BalanceRecord, UnspentSet};
pub use crate::iter::{BlockIter, Progress, ScanConfig, ScanRange, ScanState, ScanSummary};
pub use crate::parser::address::AddressHash;
pub use crate::parser::errors::{OpError, OpErrorKind, OpResult};
pub use crate::parser::events::ScanListener;
pub use crate::parser::proto::full_proto::{FBlock, FBlockHeader, FTransaction, FTxIn, FTxOut};
pub use crate::parser::proto::simple_proto::{SBlock, SOutPoint, STransaction, STxIn, STxOut};
pub use crate::parser::script::{lookup_address_from_script, ScriptInfo, ScriptType, Token};
pub use bitcoin::hashes::hex::{FromHex, ToHex};
pub use bitcoin::{BlockHash, OutPoint, Script, Txid};

///
/// Decode a hex script public key and look for an address in it.
///
#[inline]
pub fn parse_script(script_pub_key: &str) -> OpResult<ScriptInfo> {
    let script = Vec::<u8>::from_hex(script_pub_key)?;
    Ok(evaluate_script(&script))
}

///
/// Text form of an address hash, with the pay-to-address version byte.
///
#[inline]
pub fn address_to_text(hash: &AddressHash) -> String {
    address::encode(PUBKEY_ADDRESS_VERSION, hash)
}

///
/// Address hash of a text address.
///
/// Fails with `OpErrorKind::InvalidAddress` on non base-58 text,
/// a wrong payload length, or a checksum mismatch.
///
#[inline]
pub fn text_to_address(text: &str) -> OpResult<AddressHash> {
    let (_version, hash) = address::decode(text)?;
    Ok(hash)
}

///
/// This is the main struct of this crate!! Click and read the doc.
///
/// All queries start from initializing `LedgerDB` on one ledger file.
/// Every query is a fresh sequential pass over the file, blocks
/// outside the query being read header-only.
///
pub struct LedgerDB {
    pub blk_file: BlkFile,
    pub config: ScanConfig,
}

impl LedgerDB {
    ///
    /// Open a ledger file (`blkNNNNN.dat`).
    ///
    /// # Example
    ///
    /// ```rust
    /// use ledger_explorer::{LedgerDB, ScanConfig};
    /// use std::path::Path;
    ///
    /// let path = Path::new("/Users/me/blocks/blk00000.dat");
    /// let db = LedgerDB::new(path, ScanConfig::default()).unwrap();
    /// ```
    pub fn new(p: &Path, config: ScanConfig) -> OpResult<LedgerDB> {
        if !p.exists() {
            return Err(OpError::from("ledger file does not exist"));
        }
        Ok(LedgerDB {
            blk_file: BlkFile::new(p)?,
            config,
        })
    }

    ///
    /// Scan the file, feeding `listener` with every block read and
    /// the transactions of the blocks inside `range`.
    ///
    /// On a malformed record the scan stops with its error, and
    /// `listener` keeps what it collected up to there.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ledger_explorer::{FTransaction, LedgerDB, ScanConfig, ScanListener, ScanRange};
    /// use std::path::Path;
    ///
    /// struct CountTx(usize);
    ///
    /// impl ScanListener for CountTx {
    ///     fn on_transaction(&mut self, _tx: &FTransaction) {
    ///         self.0 += 1;
    ///     }
    /// }
    ///
    /// let db = LedgerDB::new(Path::new("blk00000.dat"), ScanConfig::default()).unwrap();
    /// let mut count = CountTx(0);
    /// let summary = db.scan(ScanRange::between(100, 200), &mut count).unwrap();
    /// assert_eq!(summary.transactions, count.0 as u64);
    /// ```
    ///
    pub fn scan<L: ScanListener + ?Sized>(
        &self,
        range: ScanRange,
        listener: &mut L,
    ) -> OpResult<ScanSummary> {
        crate::iter::scan(self.blk_file.reader()?, range, self.config.clone(), listener)
    }

    ///
    /// Iterate through blocks, one decoded block per `next()`.
    ///
    /// The iterator yields the first error it meets and stops.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ledger_explorer::{LedgerDB, ScanConfig, ScanRange};
    /// use std::path::Path;
    ///
    /// let db = LedgerDB::new(Path::new("blk00000.dat"), ScanConfig::default()).unwrap();
    ///
    /// // headers of every block
    /// for block in db.iter_block(ScanRange::headers()).unwrap() {
    ///     let block = block.unwrap();
    ///     println!("{} {}", block.header.block_hash, block.header.difficulty());
    /// }
    /// ```
    ///
    pub fn iter_block(&self, range: ScanRange) -> OpResult<BlockIter<BufReader<File>>> {
        Ok(BlockIter::new(
            self.blk_file.reader()?,
            range,
            self.config.clone(),
        ))
    }

    ///
    /// Get the block at `index` in file order (in different formats (FBlock, SBlock)).
    ///
    /// # Example
    /// ```rust
    /// use ledger_explorer::{FBlock, LedgerDB, SBlock, ScanConfig};
    /// use std::path::Path;
    ///
    /// let db = LedgerDB::new(Path::new("blk00000.dat"), ScanConfig::default()).unwrap();
    ///
    /// let block: FBlock = db.get_block(170).unwrap();
    /// let block: SBlock = db.get_block(170).unwrap();
    /// ```
    ///
    pub fn get_block<T: From<FBlock>>(&self, index: u32) -> OpResult<T> {
        let mut blocks = self.iter_block(ScanRange::only(index))?;
        let mut last = None;
        for block in &mut blocks {
            last = Some(block?);
        }
        match last {
            // the scan ends right after `index` if the file reaches it
            Some(block) if blocks.index() > index => Ok(block.into()),
            _ => Err(OpError::from(
                format!("block index {} not found", index).as_str(),
            )),
        }
    }

    ///
    /// Pretty JSON of the block at `index`, in the `SBlock` format.
    ///
    pub fn dump_block(&self, index: u32) -> OpResult<String> {
        let block: SBlock = self.get_block(index)?;
        to_pretty_json(&block)
    }

    ///
    /// Search the file for a transaction, fully decoding blocks until found.
    ///
    pub fn find_transaction(&self, txid: &Txid) -> OpResult<Option<FTransaction>> {
        for block in self.iter_block(ScanRange::all())? {
            let block = block?;
            if let Some(tx) = block.txdata.into_iter().find(|tx| &tx.txid == txid) {
                return Ok(Some(tx));
            }
        }
        Ok(None)
    }

    ///
    /// Pretty JSON of a transaction, in the `STransaction` format.
    ///
    pub fn dump_transaction(&self, txid: &Txid) -> OpResult<String> {
        match self.find_transaction(txid)? {
            Some(tx) => to_pretty_json(&STransaction::from(tx)),
            None => Err(OpError::from(
                format!("transaction {} not found", txid).as_str(),
            )),
        }
    }

    ///
    /// Balances of every address over the blocks in `range`.
    ///
    /// Spends of outputs created before `range.start` stay unresolved.
    ///
    pub fn build_balance_index(&self, range: ScanRange) -> OpResult<BalanceIndex> {
        let mut index = BalanceIndex::new();
        self.scan(range, &mut index)?;
        Ok(index)
    }
}

fn to_pretty_json<T: Serialize>(value: &T) -> OpResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

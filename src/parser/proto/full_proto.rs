//!
//! Decoded ledger records, with hashes, script types and addresses attached
//!
use crate::parser::address::AddressHash;
use crate::parser::script::{evaluate_script, ScriptType};
use bitcoin::{BlockHash, OutPoint, Script, TxMerkleNode, Txid};
use serde::{Deserialize, Serialize};

/// output index of a coinbase input
pub const COINBASE_VOUT: u32 = 0xFFFF_FFFF;

///
/// A block record.
///
/// `txdata` is empty when the block was decoded header-only;
/// `n_tx` always carries the declared transaction count.
/// `full` tells the two modes apart, also for blocks without transactions.
///
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct FBlock {
    pub header: FBlockHeader,
    /// declared byte size of the record after the size field
    pub size: u32,
    /// file offset of the 80-byte header
    pub offset: u64,
    pub n_tx: u64,
    /// transactions were decoded
    pub full: bool,
    pub txdata: Vec<FTransaction>,
}

impl FBlock {
    /// where the next record starts
    #[inline]
    pub fn end_offset(&self) -> u64 {
        self.offset + self.size as u64
    }

    #[inline]
    pub fn is_header_only(&self) -> bool {
        !self.full
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct FBlockHeader {
    pub version: u32,
    pub block_hash: BlockHash,
    pub prev_blockhash: BlockHash,
    pub merkle_root: TxMerkleNode,
    pub time: u32,
    pub bits: u32,
    pub nonce: u32,
}

impl FBlockHeader {
    ///
    /// Difficulty encoded by `bits`, relative to the minimum
    /// target `0x1d00ffff`.
    ///
    pub fn difficulty(&self) -> f64 {
        let mantissa = (self.bits & 0x00ff_ffff) as f64;
        let exponent = (self.bits >> 24) as i32;
        0xffff as f64 / mantissa * 256f64.powi(0x1d - exponent)
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct FTransaction {
    pub txid: Txid,
    pub version: u32,
    /// List of inputs
    pub input: Vec<FTxIn>,
    /// List of outputs
    pub output: Vec<FTxOut>,
    pub lock_time: u32,
    /// bytes covered by `txid`
    pub size: u64,
    pub offset: u64,
}

impl FTransaction {
    pub fn is_coinbase(&self) -> bool {
        self.input.len() == 1 && self.input[0].is_coinbase()
    }
}

///
/// For a coinbase input `script_sig` holds the free-form coinbase bytes.
///
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct FTxIn {
    pub previous_output: OutPoint,
    pub script_sig: Script,
    pub sequence: u32,
}

impl FTxIn {
    #[inline]
    pub fn is_coinbase(&self) -> bool {
        self.previous_output.vout == COINBASE_VOUT
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct FTxOut {
    pub value: u64,
    pub script_pubkey: Script,
    pub script_type: ScriptType,
    pub address: Option<AddressHash>,
}

impl FTxOut {
    pub fn parse(value: u64, script: Vec<u8>) -> FTxOut {
        let eval = evaluate_script(&script);
        FTxOut {
            value,
            script_pubkey: Script::from(script),
            script_type: eval.pattern,
            address: eval.address,
        }
    }
}

use crate::parser::proto::full_proto::{FBlock, FTransaction, FTxIn, FTxOut};
use crate::parser::script::evaluate_script;
use bitcoin_hashes::hex::ToHex;
use serde::{Deserialize, Serialize};

/// base units per coin
pub const COIN: u64 = 100_000_000;

///
/// Fixed point rendering of a base-unit value, 8 fractional digits.
///
/// `5000000000` becomes `"50.00000000"`.
///
pub fn format_value(value: u64) -> String {
    format!("{}.{:08}", value / COIN, value % COIN)
}

///
/// Block in a `simple` format, for dumping.
///
/// Every hash is rendered as display hex, scripts as tokens,
/// values in fixed point. `prev_block` and `mrkl_root` are
/// reversed like `hash`, not left in stored byte order.
///
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct SBlock {
    pub hash: String,
    pub ver: u32,
    pub prev_block: String,
    pub mrkl_root: String,
    #[serde(rename = "ts")]
    pub time: u32,
    pub bits: u32,
    pub nonce: u32,
    pub n_tx: u64,
    pub size: u32,
    pub tx: Vec<STransaction>,
}

impl From<FBlock> for SBlock {
    fn from(block: FBlock) -> SBlock {
        let header = block.header;
        SBlock {
            hash: header.block_hash.to_string(),
            ver: header.version,
            prev_block: header.prev_blockhash.to_string(),
            mrkl_root: header.merkle_root.to_string(),
            time: header.time,
            bits: header.bits,
            nonce: header.nonce,
            n_tx: block.n_tx,
            size: block.size,
            tx: block.txdata.into_iter().map(|x| x.into()).collect(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct STransaction {
    pub hash: String,
    pub ver: u32,
    pub vin_sz: usize,
    pub vout_sz: usize,
    pub lock_time: u32,
    pub size: u64,
    #[serde(rename = "in")]
    pub input: Vec<STxIn>,
    #[serde(rename = "out")]
    pub output: Vec<STxOut>,
}

impl From<FTransaction> for STransaction {
    fn from(tx: FTransaction) -> STransaction {
        STransaction {
            hash: tx.txid.to_string(),
            ver: tx.version,
            vin_sz: tx.input.len(),
            vout_sz: tx.output.len(),
            lock_time: tx.lock_time,
            size: tx.size,
            input: tx.input.into_iter().map(|x| x.into()).collect(),
            output: tx.output.into_iter().map(|x| x.into()).collect(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct SOutPoint {
    pub hash: String,
    pub n: u32,
}

/// Exactly one of `coinbase` and `script_sig` is set.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct STxIn {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coinbase: Option<String>,
    #[serde(rename = "scriptSig", skip_serializing_if = "Option::is_none")]
    pub script_sig: Option<String>,
    pub prev_out: SOutPoint,
}

impl From<FTxIn> for STxIn {
    fn from(tx_in: FTxIn) -> STxIn {
        let script = tx_in.script_sig.as_bytes().to_hex();
        let (coinbase, script_sig) = if tx_in.is_coinbase() {
            (Some(script), None)
        } else {
            (None, Some(script))
        };
        STxIn {
            coinbase,
            script_sig,
            prev_out: SOutPoint {
                hash: tx_in.previous_output.txid.to_string(),
                n: tx_in.previous_output.vout,
            },
        }
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct STxOut {
    pub value: String,
    #[serde(rename = "scriptPubKey")]
    pub script_pub_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl From<FTxOut> for STxOut {
    fn from(out: FTxOut) -> STxOut {
        STxOut {
            value: format_value(out.value),
            script_pub_key: evaluate_script(out.script_pubkey.as_bytes()).asm(),
            address: out.address.map(|a| a.to_string()),
        }
    }
}

use crate::parser::errors::{OpError, OpErrorKind, OpResult};
use crate::parser::events::ScanListener;
use crate::parser::hash;
use crate::parser::proto::full_proto::{FBlock, FBlockHeader, FTransaction, FTxIn, FTxOut};
use crate::parser::reader::RecordReader;
use bitcoin::hashes::Hash;
use bitcoin::{BlockHash, OutPoint, Script, TxMerkleNode, Txid};
use std::fs::{self, File};
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};

/// record separator of mainnet ledger files, `f9beb4d9` on disk
pub const MAINNET_MAGIC: u32 = 0xD9B4_BEF9;

pub const HEADER_SIZE: u64 = 80;

/// Holds all necessary data about a raw ledger file
#[derive(Debug, Clone)]
pub struct BlkFile {
    path: PathBuf,
}

impl BlkFile {
    pub(crate) fn new(path: &Path) -> OpResult<BlkFile> {
        let metadata = fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(OpError::from(
                format!("{} is not a ledger file", path.display()).as_str(),
            ));
        }
        Ok(BlkFile {
            path: path.to_path_buf(),
        })
    }

    pub(crate) fn reader(&self) -> OpResult<RecordReader<BufReader<File>>> {
        RecordReader::open(&self.path)
    }
}

///
/// Read the magic and declared size in front of a block.
///
pub fn read_record_prefix<R: Read + Seek>(reader: &mut RecordReader<R>) -> OpResult<(u32, u32)> {
    let magic = reader.read_u32()?;
    let size = reader.read_u32()?;
    Ok((magic, size))
}

///
/// Decode the block record at the cursor, prefix included.
///
/// The magic is not checked here; the scan driver does that.
///
pub fn decode_block<R, L>(
    reader: &mut RecordReader<R>,
    index: u32,
    full: bool,
    listener: &mut L,
) -> OpResult<FBlock>
where
    R: Read + Seek,
    L: ScanListener + ?Sized,
{
    let (_magic, size) = read_record_prefix(reader)?;
    decode_block_record(reader, size, index, full, listener)
}

///
/// Decode a block whose prefix has been read, `size` being the
/// declared record size.
///
/// Both paths leave the cursor at header start + `size`:
/// - header-only reads the header and the transaction count, then seeks
///   over the transactions.
/// - full decodes every transaction from an in-memory copy of the record
///   and requires the decoding to end exactly at the declared size.
///
pub fn decode_block_record<R, L>(
    reader: &mut RecordReader<R>,
    size: u32,
    index: u32,
    full: bool,
    listener: &mut L,
) -> OpResult<FBlock>
where
    R: Read + Seek,
    L: ScanListener + ?Sized,
{
    let offset = reader.offset();
    let end = offset + size as u64;
    if (size as u64) < HEADER_SIZE + 1 {
        return Err(OpError::corrupt(
            offset,
            &format!("declared size {} cannot hold a header", size),
        ));
    }
    if reader.remaining() < size as u64 {
        return Err(OpError::truncated(offset, size as u64, reader.remaining()));
    }

    if !full {
        let (header, n_tx) = read_header(reader)?;
        if reader.offset() > end {
            return Err(OpError::corrupt(
                reader.offset(),
                "transaction count runs past the declared size",
            ));
        }
        listener.on_block_header(index, &header);
        reader.seek_to(end)?;
        return Ok(FBlock {
            header,
            size,
            offset,
            n_tx,
            full: false,
            txdata: Vec::new(),
        });
    }

    let bytes = reader.read_u8_vec(size as u64)?;
    let mut body = RecordReader::with_base(bytes, offset);
    let (header, n_tx) = read_header(&mut body).map_err(overrun_to_corrupt)?;
    listener.on_block_header(index, &header);
    let mut txdata = Vec::new();
    for _ in 0..n_tx {
        let tx = decode_transaction(&mut body, listener).map_err(overrun_to_corrupt)?;
        txdata.push(tx);
    }
    if !body.is_eof() {
        return Err(OpError::corrupt(
            body.offset(),
            &format!("{} bytes left after the last transaction", body.remaining()),
        ));
    }
    Ok(FBlock {
        header,
        size,
        offset,
        n_tx,
        full: true,
        txdata,
    })
}

///
/// Decode one transaction at the cursor.
///
/// The txid is the double digest of exactly the bytes just read, replayed
/// from the reader rather than re-serialized. Spend and output events are
/// emitted once the txid is known, before returning.
///
pub fn decode_transaction<R, L>(
    reader: &mut RecordReader<R>,
    listener: &mut L,
) -> OpResult<FTransaction>
where
    R: Read + Seek,
    L: ScanListener + ?Sized,
{
    let start = reader.offset();
    let version = reader.read_u32()?;

    let n_in = reader.read_varint()?;
    let mut input = Vec::new();
    for _ in 0..n_in {
        let prev_txid = Txid::from_inner(reader.read_u256()?);
        let vout = reader.read_u32()?;
        let script_sig = Script::from(reader.read_var_bytes()?);
        let sequence = reader.read_u32()?;
        input.push(FTxIn {
            previous_output: OutPoint::new(prev_txid, vout),
            script_sig,
            sequence,
        });
    }

    let n_out = reader.read_varint()?;
    let mut output = Vec::new();
    for _ in 0..n_out {
        let value = reader.read_u64()?;
        let script = reader.read_var_bytes()?;
        output.push(FTxOut::parse(value, script));
    }

    let lock_time = reader.read_u32()?;
    let size = reader.offset() - start;
    let raw = reader.replay(start)?;

    let tx = FTransaction {
        txid: hash::txid(&raw),
        version,
        input,
        output,
        lock_time,
        size,
        offset: start,
    };

    listener.on_transaction(&tx);
    for tx_in in tx.input.iter().filter(|i| !i.is_coinbase()) {
        listener.on_input_consumed(&tx_in.previous_output);
    }
    for (n, tx_out) in tx.output.iter().enumerate() {
        listener.on_output_created(&OutPoint::new(tx.txid, n as u32), tx_out);
    }
    Ok(tx)
}

///
/// The 80-byte header and the transaction count after it.
/// The block hash covers the header bytes only.
///
fn read_header<R: Read + Seek>(reader: &mut RecordReader<R>) -> OpResult<(FBlockHeader, u64)> {
    let start = reader.offset();
    let raw = reader.read_u8_vec(HEADER_SIZE)?;
    let block_hash = hash::block_hash(&raw);

    let mut fields = RecordReader::with_base(raw, start);
    let header = FBlockHeader {
        version: fields.read_u32()?,
        block_hash,
        prev_blockhash: BlockHash::from_inner(fields.read_u256()?),
        merkle_root: TxMerkleNode::from_inner(fields.read_u256()?),
        time: fields.read_u32()?,
        bits: fields.read_u32()?,
        nonce: fields.read_u32()?,
    };
    let n_tx = reader.read_varint()?;
    Ok((header, n_tx))
}

/// Running out of record bytes means the declared size is wrong.
fn overrun_to_corrupt(err: OpError) -> OpError {
    let at = match err.kind() {
        OpErrorKind::TruncatedInput(at) => Some(*at),
        _ => None,
    };
    match at {
        Some(at) => OpError::corrupt(at, "record content runs past its declared size"),
        None => err,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::script::ScriptType;
    use bitcoin::hashes::hex::FromHex;

    const GENESIS_BLOCK: &str = "0100000000000000000000000000000000000000000000000000000000000000000000003ba3edfd7a7b12b27ac72c3e67768f617fc81bc3888a51323a9fb8aa4b1e5e4a29ab5f49ffff001d1dac2b7c0101000000010000000000000000000000000000000000000000000000000000000000000000ffffffff4d04ffff001d0104455468652054696d65732030332f4a616e2f32303039204368616e63656c6c6f72206f6e206272696e6b206f66207365636f6e64206261696c6f757420666f722062616e6b73ffffffff0100f2052a01000000434104678afdb0fe5548271967f1a67130b7105cd6a828e03909a67962e0ea1f61deb649f6bc3f4cef38c4f35504e51ec112de5c384df7ba0b8d578a4c702b6bf11d5fac00000000";

    fn record(body: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&MAINNET_MAGIC.to_le_bytes());
        bytes.extend_from_slice(&(body.len() as u32).to_le_bytes());
        bytes.extend_from_slice(body);
        bytes
    }

    fn genesis_record() -> Vec<u8> {
        record(&Vec::<u8>::from_hex(GENESIS_BLOCK).unwrap())
    }

    #[derive(Default)]
    struct Events(Vec<String>);

    impl ScanListener for Events {
        fn on_block_header(&mut self, index: u32, _header: &FBlockHeader) {
            self.0.push(format!("header {}", index));
        }
        fn on_transaction(&mut self, tx: &FTransaction) {
            self.0.push(format!("tx {}", tx.txid));
        }
        fn on_input_consumed(&mut self, outpoint: &OutPoint) {
            self.0.push(format!("in {}", outpoint));
        }
        fn on_output_created(&mut self, outpoint: &OutPoint, output: &FTxOut) {
            self.0.push(format!("out {} {}", outpoint, output.value));
        }
    }

    #[test]
    fn test_decode_genesis() {
        let mut reader = RecordReader::from_bytes(genesis_record());
        let mut events = Events::default();
        let block = decode_block(&mut reader, 0, true, &mut events).unwrap();

        assert_eq!(
            block.header.block_hash.to_string(),
            "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f"
        );
        assert_eq!(block.header.time, 1231006505);
        assert_eq!(block.header.bits, 0x1d00ffff);
        assert_eq!(block.header.nonce, 2083236893);
        assert_eq!(block.size, 285);
        assert_eq!(block.offset, 8);
        assert_eq!(block.n_tx, 1);

        let tx = &block.txdata[0];
        assert_eq!(
            tx.txid.to_string(),
            "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b"
        );
        // merkle root of a single transaction block is its txid
        assert_eq!(block.header.merkle_root.to_string(), tx.txid.to_string());
        assert!(tx.is_coinbase());
        assert_eq!(tx.size, 204);
        assert_eq!(tx.output[0].value, 5_000_000_000);
        assert_eq!(tx.output[0].script_type, ScriptType::Pay2PublicKey);
        assert_eq!(
            tx.output[0].address.unwrap().to_string(),
            "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa"
        );

        // coinbase input produces no spend event
        assert_eq!(
            events.0,
            vec![
                "header 0".to_string(),
                format!("tx {}", tx.txid),
                format!("out {}:0 5000000000", tx.txid),
            ]
        );
        assert!(reader.is_eof());
    }

    #[test]
    fn test_header_only_ends_where_full_ends() {
        let mut bytes = genesis_record();
        bytes.extend(genesis_record());

        let mut skip = RecordReader::from_bytes(bytes.clone());
        let skipped = decode_block(&mut skip, 0, false, &mut ()).unwrap();
        let mut full = RecordReader::from_bytes(bytes);
        let decoded = decode_block(&mut full, 0, true, &mut ()).unwrap();

        assert_eq!(skip.offset(), full.offset());
        assert_eq!(skip.offset(), decoded.end_offset());
        assert_eq!(skipped.header, decoded.header);
        assert!(skipped.txdata.is_empty());
        assert!(skipped.is_header_only());
        assert!(!decoded.is_header_only());
        assert_eq!(skipped.n_tx, 1);

        // and the second block decodes from there in either mode
        let second = decode_block(&mut skip, 1, true, &mut ()).unwrap();
        assert_eq!(second.header, decoded.header);
        assert_eq!(second.txdata[0].txid, decoded.txdata[0].txid);
        assert_eq!(second.offset, decoded.end_offset() + 8);
        assert_eq!(
            second.txdata[0].offset - decoded.txdata[0].offset,
            second.offset - decoded.offset
        );
        assert!(skip.is_eof());
    }

    #[test]
    fn test_block_without_transactions() {
        let genesis = Vec::<u8>::from_hex(GENESIS_BLOCK).unwrap();
        let mut body = genesis[..80].to_vec();
        body.push(0);
        let bytes = record(&body);
        assert_eq!(bytes.len(), 8 + 81);

        let mut reader = RecordReader::from_bytes(bytes.clone());
        let decoded = decode_block(&mut reader, 0, true, &mut ()).unwrap();
        assert_eq!(decoded.n_tx, 0);
        assert!(decoded.txdata.is_empty());
        assert!(decoded.full);
        assert!(!decoded.is_header_only());
        assert!(reader.is_eof());

        let mut reader = RecordReader::from_bytes(bytes);
        let skipped = decode_block(&mut reader, 0, false, &mut ()).unwrap();
        assert!(!skipped.full);
        assert!(skipped.is_header_only());
        assert_eq!(skipped.header, decoded.header);
        assert!(reader.is_eof());
    }

    #[test]
    fn test_declared_size_too_large() {
        let mut body = Vec::<u8>::from_hex(GENESIS_BLOCK).unwrap();
        body.extend_from_slice(&[0u8; 3]);
        let mut reader = RecordReader::from_bytes(record(&body));
        let err = decode_block(&mut reader, 0, true, &mut ()).unwrap_err();
        match err.kind() {
            OpErrorKind::CorruptRecord(offset) => assert_eq!(*offset, 8 + 285),
            other => panic!("unexpected error {:?}", other),
        }
        // header-only trusts the declared size
        let mut reader = RecordReader::from_bytes(record(&body));
        assert!(decode_block(&mut reader, 0, false, &mut ()).is_ok());
    }

    #[test]
    fn test_declared_size_too_small() {
        let body = Vec::<u8>::from_hex(GENESIS_BLOCK).unwrap();
        let mut bytes = record(&body[..body.len() - 2]);
        bytes.extend_from_slice(&body[body.len() - 2..]);
        let mut reader = RecordReader::from_bytes(bytes);
        let err = decode_block(&mut reader, 0, true, &mut ()).unwrap_err();
        assert!(matches!(err.kind(), OpErrorKind::CorruptRecord(_)));
    }

    #[test]
    fn test_record_past_end_of_file() {
        let bytes = genesis_record();
        let mut reader = RecordReader::from_bytes(bytes[..200].to_vec());
        let err = decode_block(&mut reader, 0, false, &mut ()).unwrap_err();
        match err.kind() {
            OpErrorKind::TruncatedInput(offset) => assert_eq!(*offset, 8),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_spend_events_follow_input_order() {
        // one input spending 11..11:3, one output of 7 to an unknown script
        let prev = [0x11u8; 32];
        let mut tx = Vec::new();
        tx.extend_from_slice(&1u32.to_le_bytes());
        tx.push(1);
        tx.extend_from_slice(&prev);
        tx.extend_from_slice(&3u32.to_le_bytes());
        tx.extend_from_slice(&[2, 0xaa, 0xbb]);
        tx.extend_from_slice(&0xffff_ffffu32.to_le_bytes());
        tx.push(1);
        tx.extend_from_slice(&7u64.to_le_bytes());
        tx.extend_from_slice(&[1, 0x51]);
        tx.extend_from_slice(&0u32.to_le_bytes());

        let mut reader = RecordReader::from_bytes(tx.clone());
        let mut events = Events::default();
        let decoded = decode_transaction(&mut reader, &mut events).unwrap();
        assert_eq!(decoded.size, tx.len() as u64);
        assert_eq!(decoded.txid, hash::txid(&tx));
        assert_eq!(decoded.output[0].address, None);
        let spent = OutPoint::new(Txid::from_inner(prev), 3);
        assert_eq!(
            events.0,
            vec![
                format!("tx {}", decoded.txid),
                format!("in {}", spent),
                format!("out {}:0 7", decoded.txid),
            ]
        );
    }
}

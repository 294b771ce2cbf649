use crate::iter::config::{ScanConfig, ScanRange};
use crate::iter::iter_block::BlockIter;
use crate::parser::errors::OpResult;
use crate::parser::events::ScanListener;
use crate::parser::reader::RecordReader;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::io::{Read, Seek};

///
/// What a finished scan went through.
///
#[derive(Serialize, Deserialize, Clone, Default, PartialEq, Eq, Debug)]
pub struct ScanSummary {
    /// blocks read, in either mode
    pub blocks: u32,
    /// blocks whose transactions were decoded
    pub full_blocks: u32,
    /// transactions decoded
    pub transactions: u64,
    pub last_index: Option<u32>,
    /// offset where reading stopped
    pub end_offset: u64,
}

///
/// Run a scan over `reader` to its end, feeding `listener`.
///
/// On a malformed record the scan halts with that error; the listener
/// keeps whatever it collected from the blocks before it.
///
pub fn scan<R, L>(
    reader: RecordReader<R>,
    range: ScanRange,
    config: ScanConfig,
    listener: &mut L,
) -> OpResult<ScanSummary>
where
    R: Read + Seek,
    L: ScanListener + ?Sized,
{
    info!(
        "Start scanning {} bytes, blocks from {} to {}",
        reader.len(),
        range.start,
        range
            .stop
            .map(|s| s.to_string())
            .unwrap_or_else(|| String::from("end")),
    );
    let mut blocks = BlockIter::new(reader, range, config);
    let mut summary = ScanSummary::default();
    while let Some(block) = blocks.step(listener) {
        match block {
            Ok(block) => {
                let index = blocks.index() - 1;
                summary.blocks += 1;
                summary.last_index = Some(index);
                if range.is_full(index) {
                    summary.full_blocks += 1;
                    summary.transactions += block.txdata.len() as u64;
                }
            }
            Err(e) => {
                warn!("Scan halted after {} blocks: {}", summary.blocks, e);
                return Err(e);
            }
        }
    }
    summary.end_offset = blocks.offset();
    info!(
        "Scan finished: {} blocks, {} fully decoded, {} transactions",
        summary.blocks, summary.full_blocks, summary.transactions
    );
    Ok(summary)
}

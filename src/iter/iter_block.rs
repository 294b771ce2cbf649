use crate::iter::config::{ScanConfig, ScanRange};
use crate::iter::util::{Progress, ProgressTimer};
use crate::parser::blk_file::{decode_block_record, read_record_prefix};
use crate::parser::errors::{OpError, OpResult};
use crate::parser::events::ScanListener;
use crate::parser::proto::full_proto::FBlock;
use crate::parser::reader::RecordReader;
use log::debug;
use std::io::{Read, Seek};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ScanState {
    /// before the first fully decoded block
    Scanning,
    /// fully decoding blocks
    Collecting,
    Done,
}

///
/// Walks the records of a ledger file one block per step.
///
/// Blocks outside the region of interest are read header-only,
/// which still moves the cursor by the declared record size.
/// The walk ends at end of file, at trailing padding, after the
/// `stop` block, or at the first error, after which it yields nothing.
///
pub struct BlockIter<R> {
    reader: RecordReader<R>,
    range: ScanRange,
    config: ScanConfig,
    state: ScanState,
    index: u32,
    /// last block read successfully
    last: Option<u32>,
    timer: ProgressTimer,
}

impl<R: Read + Seek> BlockIter<R> {
    pub fn new(reader: RecordReader<R>, range: ScanRange, config: ScanConfig) -> Self {
        let timer = ProgressTimer::new(config.progress_interval);
        let state = if range.is_full(0) {
            ScanState::Collecting
        } else {
            ScanState::Scanning
        };
        BlockIter {
            reader,
            range,
            config,
            state,
            index: 0,
            last: None,
            timer,
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// index of the block the next step reads
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn offset(&self) -> u64 {
        self.reader.offset()
    }

    ///
    /// Read the next block, feeding `listener` on the way.
    ///
    /// Returns `None` once the scan is over.
    ///
    pub fn step<L: ScanListener + ?Sized>(&mut self, listener: &mut L) -> Option<OpResult<FBlock>> {
        if self.state == ScanState::Done {
            return None;
        }
        if self.reader.is_eof() {
            self.finish(listener);
            return None;
        }

        let offset = self.reader.offset();
        let (magic, size) = match read_record_prefix(&mut self.reader) {
            Ok(prefix) => prefix,
            Err(e) => return Some(self.fail(e, listener)),
        };
        if magic == 0 && self.config.stop_at_padding {
            debug!("zero padding at offset {}, end of records", offset);
            self.finish(listener);
            return None;
        }
        if let Some(expected) = self.config.magic {
            if magic != expected {
                let err = OpError::corrupt(
                    offset,
                    &format!("unexpected magic {:08x}, expected {:08x}", magic, expected),
                );
                return Some(self.fail(err, listener));
            }
        }

        let index = self.index;
        let full = self.range.is_full(index);
        if full {
            self.state = ScanState::Collecting;
        }
        let block = match decode_block_record(&mut self.reader, size, index, full, listener) {
            Ok(block) => block,
            Err(e) => return Some(self.fail(e, listener)),
        };
        listener.on_block(index, &block);
        self.last = Some(index);

        let done = self.range.is_last(index) || self.reader.is_eof();
        if done {
            self.state = ScanState::Done;
        }
        self.report(listener, done);
        self.index += 1;
        Some(Ok(block))
    }

    fn finish<L: ScanListener + ?Sized>(&mut self, listener: &mut L) {
        self.state = ScanState::Done;
        self.report(listener, true);
    }

    fn fail<L: ScanListener + ?Sized>(&mut self, err: OpError, listener: &mut L) -> OpResult<FBlock> {
        self.finish(listener);
        Err(err)
    }

    fn report<L: ScanListener + ?Sized>(&mut self, listener: &mut L, done: bool) {
        if !self.timer.tick(done) {
            return;
        }
        let progress = Progress {
            block: self.last,
            offset: self.reader.offset(),
            len: self.reader.len(),
            elapsed: self.timer.elapsed(),
            done,
        };
        debug!(
            "{} blocks read, {:.2}% of the file read",
            progress.block.map_or(0, |b| b + 1),
            progress.percent()
        );
        listener.on_progress(&progress);
    }
}

impl<R: Read + Seek> Iterator for BlockIter<R> {
    type Item = OpResult<FBlock>;

    fn next(&mut self) -> Option<Self::Item> {
        self.step(&mut ())
    }
}

use crate::iter::Progress;
use crate::parser::proto::full_proto::{FBlock, FBlockHeader, FTransaction, FTxOut};
use bitcoin::OutPoint;

///
/// Receives what a scan decodes, in file order.
///
/// For a fully decoded block the order is:
/// `on_block_header`, then per transaction `on_transaction` followed by
/// `on_input_consumed` for each non-coinbase input and
/// `on_output_created` for each output, then `on_block`.
/// Header-only blocks produce `on_block_header` and `on_block` only.
///
/// Every method defaults to doing nothing.
///
pub trait ScanListener {
    fn on_block_header(&mut self, _index: u32, _header: &FBlockHeader) {}

    fn on_transaction(&mut self, _tx: &FTransaction) {}

    fn on_input_consumed(&mut self, _outpoint: &OutPoint) {}

    fn on_output_created(&mut self, _outpoint: &OutPoint, _output: &FTxOut) {}

    fn on_block(&mut self, _index: u32, _block: &FBlock) {}

    fn on_progress(&mut self, _progress: &Progress) {}
}

/// listens to nothing
impl ScanListener for () {}

impl<L: ScanListener + ?Sized> ScanListener for &mut L {
    fn on_block_header(&mut self, index: u32, header: &FBlockHeader) {
        (**self).on_block_header(index, header)
    }

    fn on_transaction(&mut self, tx: &FTransaction) {
        (**self).on_transaction(tx)
    }

    fn on_input_consumed(&mut self, outpoint: &OutPoint) {
        (**self).on_input_consumed(outpoint)
    }

    fn on_output_created(&mut self, outpoint: &OutPoint, output: &FTxOut) {
        (**self).on_output_created(outpoint, output)
    }

    fn on_block(&mut self, index: u32, block: &FBlock) {
        (**self).on_block(index, block)
    }

    fn on_progress(&mut self, progress: &Progress) {
        (**self).on_progress(progress)
    }
}

/// Feed two listeners from one scan, the first one first.
impl<A: ScanListener, B: ScanListener> ScanListener for (A, B) {
    fn on_block_header(&mut self, index: u32, header: &FBlockHeader) {
        self.0.on_block_header(index, header);
        self.1.on_block_header(index, header);
    }

    fn on_transaction(&mut self, tx: &FTransaction) {
        self.0.on_transaction(tx);
        self.1.on_transaction(tx);
    }

    fn on_input_consumed(&mut self, outpoint: &OutPoint) {
        self.0.on_input_consumed(outpoint);
        self.1.on_input_consumed(outpoint);
    }

    fn on_output_created(&mut self, outpoint: &OutPoint, output: &FTxOut) {
        self.0.on_output_created(outpoint, output);
        self.1.on_output_created(outpoint, output);
    }

    fn on_block(&mut self, index: u32, block: &FBlock) {
        self.0.on_block(index, block);
        self.1.on_block(index, block);
    }

    fn on_progress(&mut self, progress: &Progress) {
        self.0.on_progress(progress);
        self.1.on_progress(progress);
    }
}

use crate::index::utxo::UnspentSet;
use crate::parser::address::AddressHash;
use crate::parser::errors::OpResult;
use crate::parser::events::ScanListener;
use crate::parser::proto::full_proto::FTxOut;
use crate::parser::proto::simple_proto::format_value;
use ahash::AHashSet;
use bitcoin::OutPoint;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// Totals of one address over the events seen so far.
///
#[derive(Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct BalanceRecord {
    pub received: u64,
    pub sent: u64,
    /// resolved receive and spend events
    pub event_count: u64,
}

impl BalanceRecord {
    /// received minus sent
    #[inline]
    pub fn balance(&self) -> u64 {
        self.received.saturating_sub(self.sent)
    }
}

///
/// Per-address received / sent totals, fed by scan events.
///
/// Outputs paying a recognised address enter the unspent set and count as
/// received. A consumed input whose outpoint is in the set counts as sent
/// by the owner of that output. Spends of outputs never seen (the scan
/// started later, or the script had no address) are left unresolved.
///
/// # Example
///
/// ```rust
/// use ledger_explorer::{BalanceIndex, LedgerDB, ScanConfig, ScanRange};
/// use std::path::Path;
///
/// let db = LedgerDB::new(Path::new("blk00000.dat"), ScanConfig::default()).unwrap();
/// let mut index = BalanceIndex::new();
/// db.scan(ScanRange::all(), &mut index).unwrap();
/// for (address, record) in index.iter() {
///     println!("{} {}", address, record.balance());
/// }
/// ```
///
#[derive(Default, Debug)]
pub struct BalanceIndex {
    unspent: UnspentSet,
    records: BTreeMap<AddressHash, BalanceRecord>,
    watched: AHashSet<AddressHash>,
}

impl BalanceIndex {
    pub fn new() -> Self {
        BalanceIndex::default()
    }

    ///
    /// Log every movement of `address` at `info` level,
    /// with its balance after the movement.
    ///
    pub fn watch(&mut self, address: AddressHash) {
        self.watched.insert(address);
    }

    pub fn get(&self, address: &AddressHash) -> Option<&BalanceRecord> {
        self.records.get(address)
    }

    /// zero for addresses never seen
    pub fn balance(&self, address: &AddressHash) -> u64 {
        self.records.get(address).map(|r| r.balance()).unwrap_or(0)
    }

    ///
    /// Same as `balance`, for a text address.
    ///
    pub fn balance_of(&self, address: &str) -> OpResult<u64> {
        let address: AddressHash = address.parse()?;
        Ok(self.balance(&address))
    }

    /// records ordered by address hash
    pub fn iter(&self) -> impl Iterator<Item = (&AddressHash, &BalanceRecord)> {
        self.records.iter()
    }

    /// number of addresses seen
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn unspent_len(&self) -> usize {
        self.unspent.len()
    }

    pub fn contains_unspent(&self, outpoint: &OutPoint) -> bool {
        self.unspent.contains(outpoint)
    }

    pub fn receive(&mut self, outpoint: OutPoint, address: AddressHash, value: u64) {
        if !self.unspent.insert(outpoint, address, value) {
            warn!("Output {} seen twice, keeping the first one", outpoint);
        }
        let record = self.records.entry(address).or_default();
        record.received = record.received.saturating_add(value);
        record.event_count = record.event_count.saturating_add(1);
        let balance = record.balance();
        self.log_movement("->", &address, value, balance);
    }

    ///
    /// Resolve a spend against the unspent set.
    ///
    /// Returns the owner and value, or `None` if unresolved.
    ///
    pub fn spend(&mut self, outpoint: &OutPoint) -> Option<(AddressHash, u64)> {
        let (address, value) = self.unspent.spend(outpoint)?;
        let record = self.records.entry(address).or_default();
        record.sent = record.sent.saturating_add(value);
        record.event_count = record.event_count.saturating_add(1);
        let balance = record.balance();
        self.log_movement("<-", &address, value, balance);
        Some((address, value))
    }

    fn log_movement(&self, direction: &str, address: &AddressHash, value: u64, balance: u64) {
        if self.watched.contains(address) {
            info!(
                "{} {} {} balance: {}",
                direction,
                format_value(value),
                address,
                format_value(balance)
            );
        }
    }
}

impl ScanListener for BalanceIndex {
    fn on_input_consumed(&mut self, outpoint: &OutPoint) {
        self.spend(outpoint);
    }

    fn on_output_created(&mut self, outpoint: &OutPoint, output: &FTxOut) {
        if let Some(address) = output.address {
            self.receive(*outpoint, address, output.value);
        }
    }
}

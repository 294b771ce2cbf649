use crate::parser::address::AddressHash;
use ahash::AHashMap;
use bitcoin::OutPoint;

///
/// Outputs with a known owner that have not been seen spent.
///
/// An outpoint is inserted at most once and removed at most once.
///
#[derive(Default, Debug)]
pub struct UnspentSet {
    inner: AHashMap<OutPoint, (AddressHash, u64)>,
}

impl UnspentSet {
    pub fn new() -> Self {
        UnspentSet::default()
    }

    ///
    /// Add an unspent output.
    ///
    /// Returns `false` and keeps the existing entry if `outpoint`
    /// is already present.
    ///
    pub fn insert(&mut self, outpoint: OutPoint, owner: AddressHash, value: u64) -> bool {
        if self.inner.contains_key(&outpoint) {
            return false;
        }
        self.inner.insert(outpoint, (owner, value));
        true
    }

    /// take the output out of the set, if it was there
    pub fn spend(&mut self, outpoint: &OutPoint) -> Option<(AddressHash, u64)> {
        self.inner.remove(outpoint)
    }

    pub fn get(&self, outpoint: &OutPoint) -> Option<&(AddressHash, u64)> {
        self.inner.get(outpoint)
    }

    pub fn contains(&self, outpoint: &OutPoint) -> bool {
        self.inner.contains_key(outpoint)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

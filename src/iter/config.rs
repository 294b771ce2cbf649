use crate::parser::blk_file::MAINNET_MAGIC;
use serde::{Deserialize, Serialize};
use std::time::Duration;

///
/// Options of a scan, independent of which blocks are wanted.
///
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct ScanConfig {
    /// expected record magic, `None` accepts any
    pub magic: Option<u32>,
    /// treat a zero magic as preallocated padding and end the scan there
    pub stop_at_padding: bool,
    /// minimum time between two progress reports
    pub progress_interval: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            magic: Some(MAINNET_MAGIC),
            stop_at_padding: true,
            progress_interval: Duration::from_secs(1),
        }
    }
}

///
/// The region of interest of a scan.
///
/// Block `i` is fully decoded iff `start <= i <= stop` and
/// (`full_scan` or `i == stop`); every other block is read header-only.
/// A bounded scan ends right after block `stop`.
///
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub struct ScanRange {
    pub start: u32,
    pub stop: Option<u32>,
    pub full_scan: bool,
}

impl ScanRange {
    /// every block, fully decoded
    pub fn all() -> Self {
        ScanRange {
            start: 0,
            stop: None,
            full_scan: true,
        }
    }

    /// every block header, no transactions
    pub fn headers() -> Self {
        ScanRange {
            start: 0,
            stop: None,
            full_scan: false,
        }
    }

    /// only block `index` fully decoded, the scan ends there
    pub fn only(index: u32) -> Self {
        ScanRange {
            start: index,
            stop: Some(index),
            full_scan: false,
        }
    }

    /// blocks `start..=stop` fully decoded
    pub fn between(start: u32, stop: u32) -> Self {
        ScanRange {
            start,
            stop: Some(stop),
            full_scan: true,
        }
    }

    /// blocks from `start` to the end of the file fully decoded
    pub fn starting_at(start: u32) -> Self {
        ScanRange {
            start,
            stop: None,
            full_scan: true,
        }
    }

    #[inline]
    pub fn is_full(&self, index: u32) -> bool {
        self.start <= index
            && self.stop.map_or(true, |stop| index <= stop)
            && (self.full_scan || self.stop == Some(index))
    }

    #[inline]
    pub fn is_last(&self, index: u32) -> bool {
        self.stop == Some(index)
    }
}

impl Default for ScanRange {
    fn default() -> Self {
        ScanRange::all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_decoding_policy() {
        let range = ScanRange::only(3);
        let full: Vec<u32> = (0..6).filter(|i| range.is_full(*i)).collect();
        assert_eq!(full, vec![3]);
        assert!(range.is_last(3));

        let range = ScanRange::between(2, 4);
        let full: Vec<u32> = (0..6).filter(|i| range.is_full(*i)).collect();
        assert_eq!(full, vec![2, 3, 4]);
        assert!(!range.is_full(5));
        assert!(!range.is_full(1));

        let range = ScanRange::starting_at(4);
        let full: Vec<u32> = (0..6).filter(|i| range.is_full(*i)).collect();
        assert_eq!(full, vec![4, 5]);
        assert!(!range.is_last(5));

        assert!(!ScanRange::headers().is_full(0));
    }

    #[test]
    fn test_default_config() {
        let config = ScanConfig::default();
        assert_eq!(config.magic, Some(0xD9B4_BEF9));
        assert!(config.stop_at_padding);
        let json = serde_json::to_string(&config).unwrap();
        let back: ScanConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}

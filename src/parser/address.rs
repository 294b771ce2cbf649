use crate::parser::errors::{OpError, OpErrorKind, OpResult};
use crate::parser::hash::digest;
use bitcoin::util::base58;
use bitcoin_hashes::hex::ToHex;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// version byte of pay-to-public-key-hash addresses
pub const PUBKEY_ADDRESS_VERSION: u8 = 0x00;

const CHECKSUM_LEN: usize = 4;
const PAYLOAD_LEN: usize = 1 + 20 + CHECKSUM_LEN;

///
/// 20-byte public key hash, the key of the balance index.
///
/// Displays as a checksummed base-58 address with version byte 0.
///
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct AddressHash([u8; 20]);

impl AddressHash {
    #[inline]
    pub fn from_inner(hash: [u8; 20]) -> Self {
        AddressHash(hash)
    }

    /// `None` unless the slice is exactly 20 bytes.
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        if slice.len() != 20 {
            return None;
        }
        let mut hash = [0u8; 20];
        hash.copy_from_slice(slice);
        Some(AddressHash(hash))
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    #[inline]
    pub fn into_inner(self) -> [u8; 20] {
        self.0
    }
}

impl fmt::Display for AddressHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode(PUBKEY_ADDRESS_VERSION, self))
    }
}

impl fmt::Debug for AddressHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AddressHash({})", self.0.to_hex())
    }
}

impl FromStr for AddressHash {
    type Err = OpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (_version, hash) = decode(s)?;
        Ok(hash)
    }
}

impl Serialize for AddressHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AddressHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        AddressHash::from_str(&text).map_err(de::Error::custom)
    }
}

///
/// base58(version ‖ hash ‖ checksum), where the checksum is the first
/// four bytes of the double digest of version ‖ hash.
///
/// Leading zero bytes come out as leading `1`s.
///
pub fn encode(version: u8, hash: &AddressHash) -> String {
    let mut payload = Vec::with_capacity(PAYLOAD_LEN);
    payload.push(version);
    payload.extend_from_slice(hash.as_bytes());
    let checksum = digest(&payload);
    payload.extend_from_slice(&checksum[..CHECKSUM_LEN]);
    base58::encode_slice(&payload)
}

/// Inverse of `encode`; fails with `InvalidAddress`.
pub fn decode(text: &str) -> OpResult<(u8, AddressHash)> {
    let payload = base58::from(text)?;
    if payload.len() != PAYLOAD_LEN {
        return Err(OpError::new(OpErrorKind::InvalidAddress).join_msg(&format!(
            "payload of {} bytes, expected {}",
            payload.len(),
            PAYLOAD_LEN
        )));
    }
    let (body, checksum) = payload.split_at(PAYLOAD_LEN - CHECKSUM_LEN);
    if digest(body)[..CHECKSUM_LEN] != *checksum {
        return Err(OpError::new(OpErrorKind::InvalidAddress).join_msg("checksum mismatch"));
    }
    match AddressHash::from_slice(&body[1..]) {
        Some(hash) => Ok((body[0], hash)),
        None => Err(OpError::new(OpErrorKind::InvalidAddress)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin::hashes::hex::FromHex;

    const ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

    fn hash_from_hex(s: &str) -> AddressHash {
        AddressHash::from_slice(&Vec::<u8>::from_hex(s).unwrap()).unwrap()
    }

    #[test]
    fn test_known_addresses() {
        let genesis = hash_from_hex("62e907b15cbf27d5425399ebf6f0fb50ebb88f18");
        assert_eq!(genesis.to_string(), "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa");
        assert_eq!(
            "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa"
                .parse::<AddressHash>()
                .unwrap(),
            genesis
        );
        assert_eq!(
            encode(0, &AddressHash::default()),
            "1111111111111111111114oLvT2"
        );
        assert_eq!(
            encode(5, &AddressHash::default()),
            "31h1vYVSYuKP6AhS86fbRdMw9XHieotbST"
        );
    }

    #[test]
    fn test_round_trip() {
        let hashes = [
            AddressHash::default(),
            AddressHash::from_inner([0x11; 20]),
            AddressHash::from_inner([0xff; 20]),
            hash_from_hex("12ab8dc588ca9d5787dde7eb29569da63c3a238c"),
        ];
        for version in [0u8, 1, 5, 0x6f, 0xff].iter() {
            for hash in hashes.iter() {
                let text = encode(*version, hash);
                assert_eq!(decode(&text).unwrap(), (*version, *hash));
            }
        }
    }

    #[test]
    fn test_single_char_change_is_rejected() {
        let text = "12ZEw5Hcv1hTb6YUQJ69y1V7uhcoDz92PH";
        assert!(decode(text).is_ok());
        for (i, c) in text.char_indices() {
            let replacement = ALPHABET.chars().find(|r| *r != c).unwrap();
            let mut flipped = String::with_capacity(text.len());
            flipped.push_str(&text[..i]);
            flipped.push(replacement);
            flipped.push_str(&text[i + 1..]);
            let err = decode(&flipped).unwrap_err();
            assert!(matches!(err.kind(), OpErrorKind::InvalidAddress), "{}", flipped);
        }
    }

    #[test]
    fn test_not_base58() {
        assert!(matches!(
            decode("0OIl").unwrap_err().kind(),
            OpErrorKind::InvalidAddress
        ));
        assert!(decode("").is_err());
    }

    #[test]
    fn test_serde_as_text() {
        let hash = hash_from_hex("62e907b15cbf27d5425399ebf6f0fb50ebb88f18");
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, "\"1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa\"");
        let back: AddressHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }
}

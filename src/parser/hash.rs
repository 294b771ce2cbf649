use bitcoin::{BlockHash, Txid};
use bitcoin_hashes::hex::ToHex;
use bitcoin_hashes::{hash160, sha256d, Hash};

/// Two rounds of SHA-256, in storage byte order.
#[inline]
pub fn digest(bytes: &[u8]) -> [u8; 32] {
    sha256d::Hash::hash(bytes).into_inner()
}

///
/// Hex of a stored digest with the byte order reversed.
///
/// Digests are stored little-endian in the ledger and displayed big-endian,
/// which is why a block hash shows its leading zeros first.
///
pub fn display_hash(digest: &[u8]) -> String {
    let mut reversed = digest.to_vec();
    reversed.reverse();
    reversed.to_hex()
}

/// RIPEMD-160 of SHA-256, for deriving an address hash from a public key.
#[inline]
pub fn pubkey_hash(bytes: &[u8]) -> [u8; 20] {
    hash160::Hash::hash(bytes).into_inner()
}

#[inline]
pub fn block_hash(header: &[u8]) -> BlockHash {
    BlockHash::from_inner(digest(header))
}

#[inline]
pub fn txid(raw_tx: &[u8]) -> Txid {
    Txid::from_inner(digest(raw_tx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin::hashes::hex::FromHex;

    // mainnet genesis header
    const GENESIS_HEADER: &str = "0100000000000000000000000000000000000000000000000000000000000000000000003ba3edfd7a7b12b27ac72c3e67768f617fc81bc3888a51323a9fb8aa4b1e5e4a29ab5f49ffff001d1dac2b7c";

    #[test]
    fn test_genesis_block_hash() {
        let header = Vec::<u8>::from_hex(GENESIS_HEADER).unwrap();
        assert_eq!(header.len(), 80);
        assert_eq!(
            display_hash(&digest(&header)),
            "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f"
        );
        // typed hash displays the same way
        assert_eq!(
            block_hash(&header).to_string(),
            "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f"
        );
    }

    #[test]
    fn test_display_hash_reverses() {
        let mut d = [0u8; 32];
        d[0] = 0xab;
        d[31] = 0x01;
        let shown = display_hash(&d);
        assert!(shown.starts_with("01"));
        assert!(shown.ends_with("ab"));
    }

    #[test]
    fn test_pubkey_hash() {
        // genesis coinbase public key
        let pk = Vec::<u8>::from_hex("04678afdb0fe5548271967f1a67130b7105cd6a828e03909a67962e0ea1f61deb649f6bc3f4cef38c4f35504e51ec112de5c384df7ba0b8d578a4c702b6bf11d5f").unwrap();
        assert_eq!(
            pubkey_hash(&pk).to_hex(),
            "62e907b15cbf27d5425399ebf6f0fb50ebb88f18"
        );
    }

    #[test]
    fn test_digest_is_deterministic() {
        assert_eq!(digest(b"ledger"), digest(b"ledger"));
        assert_ne!(digest(b"ledger"), digest(b"ledgeR"));
    }
}

//! Address and digest encoding for the Algorand ledger.
//!
//! An address is the base32 (no padding) encoding of the 32-byte ed25519
//! public key followed by the last 4 bytes of its SHA-512/256 digest, which
//! gives a 58-character string. Transaction ids are the base32 encoding of
//! `SHA-512/256("TX" || canonical msgpack)`.

use std::fmt;
use std::str::FromStr;

use data_encoding::BASE32_NOPAD;
use sha2::{Digest, Sha512_256};
use thiserror::Error;

/// Length of an encoded address.
pub const ADDRESS_LEN: usize = 58;

/// Domain separation prefix for transaction ids and signatures.
pub const TX_PREFIX: &[u8] = b"TX";

const PUBLIC_KEY_LEN: usize = 32;
const CHECKSUM_LEN: usize = 4;

/// Compute the SHA-512/256 digest used throughout the ledger.
pub fn sha512_256(data: &[u8]) -> [u8; 32] {
    Sha512_256::digest(data).into()
}

/// Errors produced while parsing an address string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address must be {ADDRESS_LEN} characters, got {0}")]
    InvalidLength(usize),

    #[error("address is not valid base32")]
    InvalidEncoding,

    #[error("address checksum does not match")]
    ChecksumMismatch,
}

/// A ledger account address (the account's ed25519 public key).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; PUBLIC_KEY_LEN]);

impl Address {
    /// The all-zero address.
    pub const ZERO: Address = Address([0; PUBLIC_KEY_LEN]);

    /// Wrap a raw public key.
    pub fn from_public_key(public_key: [u8; PUBLIC_KEY_LEN]) -> Self {
        Self(public_key)
    }

    /// Raw public key bytes.
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.0
    }

    fn checksum(&self) -> [u8; CHECKSUM_LEN] {
        let digest = sha512_256(&self.0);
        let mut checksum = [0; CHECKSUM_LEN];
        checksum.copy_from_slice(&digest[digest.len() - CHECKSUM_LEN..]);
        checksum
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != ADDRESS_LEN {
            return Err(AddressError::InvalidLength(s.len()));
        }

        let decoded = BASE32_NOPAD
            .decode(s.as_bytes())
            .map_err(|_| AddressError::InvalidEncoding)?;
        if decoded.len() != PUBLIC_KEY_LEN + CHECKSUM_LEN {
            return Err(AddressError::InvalidEncoding);
        }

        let mut public_key = [0; PUBLIC_KEY_LEN];
        public_key.copy_from_slice(&decoded[..PUBLIC_KEY_LEN]);
        let address = Address(public_key);

        if address.checksum() != decoded[PUBLIC_KEY_LEN..] {
            return Err(AddressError::ChecksumMismatch);
        }
        Ok(address)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut bytes = [0; PUBLIC_KEY_LEN + CHECKSUM_LEN];
        bytes[..PUBLIC_KEY_LEN].copy_from_slice(&self.0);
        bytes[PUBLIC_KEY_LEN..].copy_from_slice(&self.checksum());
        f.write_str(&BASE32_NOPAD.encode(&bytes))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

/// Compute the transaction id of a canonically encoded transaction body.
pub fn transaction_id(encoded_txn: &[u8]) -> String {
    let mut prefixed = Vec::with_capacity(TX_PREFIX.len() + encoded_txn.len());
    prefixed.extend_from_slice(TX_PREFIX);
    prefixed.extend_from_slice(encoded_txn);
    BASE32_NOPAD.encode(&sha512_256(&prefixed))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZERO_ADDRESS: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAY5HFKQ";

    #[test]
    fn test_zero_address_encoding() {
        assert_eq!(Address::ZERO.to_string(), ZERO_ADDRESS);
        assert_eq!(ZERO_ADDRESS.parse::<Address>().unwrap(), Address::ZERO);
    }

    #[test]
    fn test_roundtrip_arbitrary_key() {
        let address = Address::from_public_key([7; 32]);
        let encoded = address.to_string();
        assert_eq!(encoded.len(), ADDRESS_LEN);
        assert_eq!(encoded.parse::<Address>().unwrap(), address);
    }

    #[test]
    fn test_rejects_bad_checksum() {
        let mut encoded = Address::from_public_key([7; 32]).to_string();
        // Flip a character inside the public-key portion.
        let replacement = if encoded.starts_with('A') { "B" } else { "A" };
        encoded.replace_range(0..1, replacement);
        assert_eq!(
            encoded.parse::<Address>().unwrap_err(),
            AddressError::ChecksumMismatch
        );
    }

    #[test]
    fn test_rejects_wrong_length_and_alphabet() {
        assert_eq!(
            "ABC".parse::<Address>().unwrap_err(),
            AddressError::InvalidLength(3)
        );
        let lowercase = ZERO_ADDRESS.to_lowercase();
        assert_eq!(
            lowercase.parse::<Address>().unwrap_err(),
            AddressError::InvalidEncoding
        );
    }

    #[test]
    fn test_transaction_id_shape() {
        let id = transaction_id(b"payload");
        assert_eq!(id.len(), 52);
        assert_ne!(id, transaction_id(b"other payload"));
    }
}

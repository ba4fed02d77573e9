//! 25-word recovery phrases.
//!
//! The 32-byte ed25519 seed is split into little-endian 11-bit groups, each
//! indexing the BIP-39 English word list (24 words). A 25th checksum word is
//! the first 11-bit group of the seed's SHA-512/256 digest.

use bip39::Language;
use thiserror::Error;

use crate::blockchain::encoding::sha512_256;

/// Number of words in a recovery phrase.
pub const MNEMONIC_WORDS: usize = 25;

const KEY_LEN: usize = 32;
const BITS_PER_WORD: u32 = 11;
const WORD_MASK: u32 = (1 << BITS_PER_WORD) - 1;

/// Why a phrase could not be turned into a key.
///
/// Variants never carry the offending words: phrases are secret material.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MnemonicError {
    #[error("expected {MNEMONIC_WORDS} words, got {0}")]
    WrongLength(usize),

    #[error("word {0} is not in the word list")]
    UnknownWord(usize),

    #[error("checksum word does not match")]
    InvalidChecksum,
}

/// Encode a 32-byte seed as a 25-word phrase.
pub fn from_key(key: &[u8; KEY_LEN]) -> String {
    let words = Language::English.word_list();
    let mut phrase: Vec<&str> = to_11_bit(key)
        .into_iter()
        .map(|index| words[index as usize])
        .collect();
    phrase.push(checksum_word(key));
    phrase.join(" ")
}

/// Decode a 25-word phrase back into its 32-byte seed.
///
/// Words are matched case-insensitively and may be separated by any
/// whitespace.
pub fn to_key(phrase: &str) -> Result<[u8; KEY_LEN], MnemonicError> {
    let words: Vec<String> = phrase.split_whitespace().map(str::to_lowercase).collect();
    if words.len() != MNEMONIC_WORDS {
        return Err(MnemonicError::WrongLength(words.len()));
    }

    let (checksum, body) = words.split_last().ok_or(MnemonicError::WrongLength(0))?;
    let mut indices = Vec::with_capacity(body.len());
    for (position, word) in body.iter().enumerate() {
        let index = Language::English
            .find_word(word)
            .ok_or(MnemonicError::UnknownWord(position + 1))?;
        indices.push(u32::from(index));
    }

    // 24 words carry 264 bits: the seed plus 8 zero padding bits.
    let bytes = from_11_bit(&indices);
    if bytes.len() != KEY_LEN + 1 || bytes[KEY_LEN] != 0 {
        return Err(MnemonicError::InvalidChecksum);
    }

    let mut key = [0; KEY_LEN];
    key.copy_from_slice(&bytes[..KEY_LEN]);
    if checksum_word(&key) != checksum.as_str() {
        return Err(MnemonicError::InvalidChecksum);
    }
    Ok(key)
}

fn checksum_word(key: &[u8; KEY_LEN]) -> &'static str {
    let digest = sha512_256(key);
    let index = to_11_bit(&digest[..2])[0];
    Language::English.word_list()[index as usize]
}

fn to_11_bit(data: &[u8]) -> Vec<u32> {
    let mut buffer: u32 = 0;
    let mut bits = 0;
    let mut out = Vec::with_capacity(data.len() * 8 / BITS_PER_WORD as usize + 1);
    for byte in data {
        buffer |= u32::from(*byte) << bits;
        bits += 8;
        if bits >= BITS_PER_WORD {
            out.push(buffer & WORD_MASK);
            buffer >>= BITS_PER_WORD;
            bits -= BITS_PER_WORD;
        }
    }
    if bits != 0 {
        out.push(buffer & WORD_MASK);
    }
    out
}

fn from_11_bit(indices: &[u32]) -> Vec<u8> {
    let mut buffer: u32 = 0;
    let mut bits = 0;
    let mut out = Vec::with_capacity(indices.len() * BITS_PER_WORD as usize / 8 + 1);
    for index in indices {
        buffer |= index << bits;
        bits += BITS_PER_WORD;
        while bits >= 8 {
            out.push((buffer & 0xff) as u8);
            buffer >>= 8;
            bits -= 8;
        }
    }
    if bits != 0 {
        out.push((buffer & 0xff) as u8);
    }
    out
}

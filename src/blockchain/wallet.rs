//! Credential derivation and validation.
//!
//! # Security
//! - Recovery phrases arrive per request and are dropped with it
//! - Phrase buffers are zeroized on drop; ed25519 keys zeroize themselves
//! - Keys and phrases are never logged or serialized
//! - `Debug` output is redacted

use std::fmt;

use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::blockchain::encoding::Address;
use crate::blockchain::mnemonic::{self, MnemonicError};

/// A recovery phrase that could not be turned into a key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid credential: {0}")]
pub struct InvalidCredential(#[from] pub MnemonicError);

/// Derive the signing key encoded by a recovery phrase.
pub fn derive(recovery_phrase: &str) -> Result<SigningKey, InvalidCredential> {
    let seed = Zeroizing::new(mnemonic::to_key(recovery_phrase)?);
    Ok(SigningKey::from_bytes(&seed))
}

/// Public address of a signing key.
pub fn address_from_key(key: &SigningKey) -> Address {
    Address::from_public_key(key.verifying_key().to_bytes())
}

/// Whether `key` controls `claimed_address`.
///
/// This is an exact comparison of the encoded address strings, so a
/// malformed claim simply does not match.
pub fn matches(key: &SigningKey, claimed_address: &str) -> bool {
    address_from_key(key).to_string() == claimed_address
}

/// A caller's identity for the duration of one request.
pub struct Credential {
    recovery_phrase: Zeroizing<String>,
    signing_key: SigningKey,
    address: Address,
}

impl Credential {
    /// Derive a credential from a caller-supplied recovery phrase.
    pub fn derive(recovery_phrase: &str) -> Result<Self, InvalidCredential> {
        let signing_key = derive(recovery_phrase)?;
        Ok(Self {
            recovery_phrase: Zeroizing::new(recovery_phrase.to_string()),
            address: address_from_key(&signing_key),
            signing_key,
        })
    }

    /// Generate a fresh account from the OS random number generator.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        let seed = Zeroizing::new(signing_key.to_bytes());
        Self {
            recovery_phrase: Zeroizing::new(mnemonic::from_key(&seed)),
            address: address_from_key(&signing_key),
            signing_key,
        }
    }

    /// The address this credential controls.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// The normalized 25-word phrase for a generated credential, or the
    /// caller's phrase as given for a derived one.
    pub fn recovery_phrase(&self) -> &str {
        &self.recovery_phrase
    }

    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    /// Whether this credential controls `claimed_address`.
    pub fn matches(&self, claimed_address: &str) -> bool {
        matches(&self.signing_key, claimed_address)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("address", &self.address)
            .field("recovery_phrase", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::mnemonic::MNEMONIC_WORDS;

    #[test]
    fn test_generate_roundtrips_through_phrase() {
        let generated = Credential::generate();
        assert_eq!(
            generated.recovery_phrase().split(' ').count(),
            MNEMONIC_WORDS
        );

        let derived = Credential::derive(generated.recovery_phrase()).unwrap();
        assert_eq!(derived.address(), generated.address());
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let phrase = mnemonic::from_key(&[3u8; 32]);
        let a = derive(&phrase).unwrap();
        let b = derive(&phrase).unwrap();
        assert_eq!(address_from_key(&a), address_from_key(&b));
    }

    #[test]
    fn test_matches_own_address_only() {
        let phrase = mnemonic::from_key(&[3u8; 32]);
        let key = derive(&phrase).unwrap();
        let own = address_from_key(&key).to_string();
        let other = Credential::generate().address().to_string();

        assert!(matches(&key, &own));
        assert!(!matches(&key, &other));
        assert!(!matches(&key, &own.to_lowercase()));
        assert!(!matches(&key, ""));
    }

    #[test]
    fn test_malformed_phrase_is_invalid_credential() {
        let err = Credential::derive("only three words").unwrap_err();
        assert_eq!(err, InvalidCredential(MnemonicError::WrongLength(3)));
    }

    #[test]
    fn test_debug_is_redacted() {
        let credential = Credential::generate();
        let debug = format!("{credential:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains(credential.recovery_phrase()));
    }
}

pub mod scheme;

pub use scheme::{CommitmentScheme, MoveCommitmentScheme, MoveOpening};

use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// SHA-256 of a player's raw secret. The raw secret never enters the
/// engine; players hash it locally and the hash doubles as the reveal
/// credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SecretHash([u8; 32]);

impl SecretHash {
    pub fn from_secret(secret: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(secret);
        Self(hasher.finalize().into())
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// A stored move commitment: SHA-256 over the move tag, the committing
/// address, and the hashed secret. Binding the address prevents replay
/// of the same commitment by another party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Commitment([u8; 32]);

impl Commitment {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Display for SecretHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

macro_rules! hex_string_conversions {
    ($ty:ident) => {
        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                hex::encode(value.0)
            }
        }

        impl TryFrom<String> for $ty {
            type Error = hex::FromHexError;

            fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
                let bytes = hex::decode(&value)?;
                let bytes: [u8; 32] = bytes
                    .try_into()
                    .map_err(|_| hex::FromHexError::InvalidStringLength)?;
                Ok(Self(bytes))
            }
        }
    };
}

hex_string_conversions!(Commitment);
hex_string_conversions!(SecretHash);

/// Random 32-byte secret for a fresh commitment.
pub fn generate_secret() -> Vec<u8> {
    let mut secret = vec![0u8; 32];
    rand::thread_rng().fill_bytes(&mut secret);
    secret
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Move;
    use crate::ledger::Address;

    fn alice() -> Address {
        Address::from("alice")
    }

    #[test]
    fn commitment_verifies_with_original_opening() {
        let secret_hash = SecretHash::from_secret(b"hunter2");
        let opening = MoveOpening::new(Move::Rock, alice(), secret_hash);
        let commitment = MoveCommitmentScheme::commit(&opening);

        assert!(MoveCommitmentScheme::verify(&commitment, &opening));
    }

    #[test]
    fn any_changed_component_fails_verification() {
        let secret_hash = SecretHash::from_secret(b"hunter2");
        let opening = MoveOpening::new(Move::Rock, alice(), secret_hash);
        let commitment = MoveCommitmentScheme::commit(&opening);

        let wrong_move = MoveOpening::new(Move::Paper, alice(), secret_hash);
        assert!(!MoveCommitmentScheme::verify(&commitment, &wrong_move));

        let wrong_address = MoveOpening::new(Move::Rock, Address::from("mallory"), secret_hash);
        assert!(!MoveCommitmentScheme::verify(&commitment, &wrong_address));

        let wrong_secret =
            MoveOpening::new(Move::Rock, alice(), SecretHash::from_secret(b"hunter3"));
        assert!(!MoveCommitmentScheme::verify(&commitment, &wrong_secret));
    }

    #[test]
    fn distinct_secrets_give_distinct_commitments() {
        let a = MoveOpening::new(Move::Rock, alice(), SecretHash::from_secret(&generate_secret()));
        let b = MoveOpening::new(Move::Rock, alice(), SecretHash::from_secret(&generate_secret()));
        assert_ne!(MoveCommitmentScheme::commit(&a), MoveCommitmentScheme::commit(&b));
    }

    #[test]
    fn commitment_serializes_as_hex() {
        let secret_hash = SecretHash::from_secret(b"hunter2");
        let opening = MoveOpening::new(Move::Scissors, alice(), secret_hash);
        let commitment = MoveCommitmentScheme::commit(&opening);

        let json = serde_json::to_string(&commitment).unwrap();
        assert_eq!(json.len(), 66); // 64 hex chars + quotes
        let parsed: Commitment = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, commitment);
    }
}

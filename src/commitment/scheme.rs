use super::{Commitment, SecretHash};
use crate::game::Move;
use crate::ledger::Address;
use sha2::{Digest, Sha256};

/// Trait for commitment schemes
pub trait CommitmentScheme {
    type Opening;
    type Commitment;

    fn commit(opening: &Self::Opening) -> Self::Commitment;
    fn verify(commitment: &Self::Commitment, opening: &Self::Opening) -> bool;
}

/// Everything a reveal discloses: the move, the address it was bound
/// to, and the hashed secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOpening {
    pub mv: Move,
    pub mover: Address,
    pub secret_hash: SecretHash,
}

impl MoveOpening {
    pub fn new(mv: Move, mover: Address, secret_hash: SecretHash) -> Self {
        Self {
            mv,
            mover,
            secret_hash,
        }
    }
}

/// `commitment = SHA-256(move_tag || address || SHA-256(secret))`.
///
/// Hashing the secret separately means the commitment binds move and
/// address without the raw secret ever leaving the player's machine.
pub struct MoveCommitmentScheme;

impl CommitmentScheme for MoveCommitmentScheme {
    type Opening = MoveOpening;
    type Commitment = Commitment;

    fn commit(opening: &Self::Opening) -> Self::Commitment {
        let mut hasher = Sha256::new();
        hasher.update([opening.mv.tag()]);
        hasher.update(opening.mover.as_bytes());
        hasher.update(opening.secret_hash.as_bytes());
        Commitment::from_bytes(hasher.finalize().into())
    }

    fn verify(commitment: &Self::Commitment, opening: &Self::Opening) -> bool {
        Self::commit(opening) == *commitment
    }
}

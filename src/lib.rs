//! Commit-reveal rock-paper-scissors wagering engine.
//!
//! Two untrusting parties stake matching wagers from an internal credit
//! ledger, commit to hidden moves, and reveal them under a deadline.
//! The engine escrows stakes, verifies reveals against the stored
//! commitments, applies the win rule, and settles funds exactly once,
//! including when one or both parties walk away.

pub mod commitment;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod game;
pub mod ledger;

pub use commitment::{Commitment, CommitmentScheme, MoveCommitmentScheme, MoveOpening, SecretHash};
pub use config::EngineConfig;
pub use engine::GameEngine;
pub use error::{EngineError, Result};
pub use events::GameUpdate;
pub use game::{Game, Move, Role, Status, Winner};
pub use ledger::{Address, Ledger};

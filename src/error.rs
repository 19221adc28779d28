use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Insufficient funds: need {need}, have {available}")]
    InsufficientFunds { need: u64, available: u64 },

    #[error("Contract is paused")]
    ContractPaused,

    #[error("Wager {wager} is below the minimum of {minimum}")]
    BelowMinimumWager { wager: u64, minimum: u64 },

    #[error("Game not found: {0}")]
    GameNotFound(u64),

    #[error("Game is not open")]
    GameNotOpen,

    #[error("Game is no longer active")]
    GameNotActive,

    #[error("Only the game creator may do this")]
    NotCreator,

    #[error("Creator cannot join their own game")]
    CannotJoinOwnGame,

    #[error("Caller is not authorized")]
    Unauthorized,

    #[error("Reveal does not match the stored commitment")]
    InvalidReveal,

    #[error("Move already revealed")]
    AlreadyRevealed,

    #[error("Reveal deadline has not been reached")]
    DeadlineNotReached,

    #[error("Amount must be greater than zero")]
    InvalidAmount,

    #[error("Deposit would overflow the ledger")]
    BalanceOverflow,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EngineError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn insufficient_funds(need: u64, available: u64) -> Self {
        Self::InsufficientFunds { need, available }
    }
}

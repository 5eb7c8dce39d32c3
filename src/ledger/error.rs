use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// Persisted data exists but cannot be parsed. Never treated as a first run.
    #[error("Corrupt ledger data at {location}: {reason}")]
    CorruptData { location: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Fjall error: {0}")]
    Fjall(#[from] fjall::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LedgerError {
    pub fn corrupt(location: impl Into<String>, reason: impl ToString) -> Self {
        LedgerError::CorruptData {
            location: location.into(),
            reason: reason.to_string(),
        }
    }

    pub fn is_corrupt_data(&self) -> bool {
        matches!(self, LedgerError::CorruptData { .. })
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;

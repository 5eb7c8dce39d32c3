use super::models::Config;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Inactivity threshold must be positive")]
    InvalidInactivityThreshold,

    #[error("recent_limit must be positive")]
    InvalidRecentLimit,

    #[error("recent_limit ({limit}) exceeds ledger capacity ({capacity})")]
    RecentLimitExceedsCapacity { limit: usize, capacity: usize },

    #[error("Ledger path must not be empty for the {backend} backend")]
    MissingLedgerPath { backend: String },
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_ledger(config)?;
    validate_query(config)?;
    Ok(())
}

/// Persistent backends need somewhere to write
fn validate_ledger(config: &Config) -> Result<(), ValidationError> {
    if config.ledger.backend.is_persistent() && config.ledger.path.as_os_str().is_empty() {
        return Err(ValidationError::MissingLedgerPath {
            backend: format!("{:?}", config.ledger.backend).to_lowercase(),
        });
    }

    Ok(())
}

/// Query defaults must be usable against the configured ledger
fn validate_query(config: &Config) -> Result<(), ValidationError> {
    if config.query.inactivity_threshold.as_secs() == 0 {
        return Err(ValidationError::InvalidInactivityThreshold);
    }

    if config.query.recent_limit == 0 {
        return Err(ValidationError::InvalidRecentLimit);
    }

    let capacity = config.ledger.capacity.get();
    if config.query.recent_limit > capacity {
        return Err(ValidationError::RecentLimitExceedsCapacity {
            limit: config.query.recent_limit,
            capacity,
        });
    }

    Ok(())
}

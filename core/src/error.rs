use thiserror::Error;

#[derive(Error, Debug)]
pub enum PetError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid config: {reason}")]
    InvalidConfig { reason: String },

    #[error("Corrupt value for key '{key}': {value:?}")]
    CorruptValue { key: String, value: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type PetResult<T> = Result<T, PetError>;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckInError {
    #[error("Invalid value '{value}' for setting {name}")]
    InvalidSetting { name: String, value: String },

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

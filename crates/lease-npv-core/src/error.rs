use thiserror::Error;

#[derive(Debug, Error)]
pub enum LeaseNpvError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Arithmetic overflow in {context}")]
    Overflow { context: String },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("No exchange rate for currency {0}")]
    UnknownCurrency(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for LeaseNpvError {
    fn from(e: serde_json::Error) -> Self {
        LeaseNpvError::SerializationError(e.to_string())
    }
}

impl From<chrono::ParseError> for LeaseNpvError {
    fn from(e: chrono::ParseError) -> Self {
        LeaseNpvError::DateError(e.to_string())
    }
}

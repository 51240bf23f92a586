use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Payment provider error: {0}")]
    Provider(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Checkout session not found: {0}")]
    NotFound(String),
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("GoCardless API error: {0}")]
    GoCardless(String),

    #[error("Google Sheets API error: {0}")]
    Sheets(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Secrets lookup error: {0}")]
    SecretsLookup(String),

    #[error("Secrets validation error: {0}")]
    SecretsValidation(String),

    #[error("Data error: {0}")]
    Data(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

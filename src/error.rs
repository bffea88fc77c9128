use thiserror::Error;

pub use anyhow::Context;

use crate::model::TickerSymbol;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn message<T: Into<String>>(msg: T) -> Self {
        AppError::Message(msg.into())
    }
}

/// Synchronous failures raised by ticker-list maintenance.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("ticker `{0}` is already registered")]
    DuplicateKey(TickerSymbol),
    #[error("ticker `{0}` is not registered")]
    NotFound(TickerSymbol),
    #[error("invalid ticker symbol `{0}`")]
    InvalidSymbol(String),
    #[error("ticker store failure: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(err: impl std::fmt::Display) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// Opaque failure surfaced by a market-data provider.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ProviderError(pub String);

impl ProviderError {
    pub fn new(msg: impl Into<String>) -> Self {
        ProviderError(msg.into())
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError(err.to_string())
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError(err.to_string())
    }
}

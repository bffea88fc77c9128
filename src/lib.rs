pub mod app;
pub mod batch;
pub mod config;
pub mod error;
pub mod fetch;
pub mod metrics;
pub mod model;
pub mod records;

pub use error::{AppError, ProviderError, Result, StoreError};

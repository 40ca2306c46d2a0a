//! Error types for the reference store

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("transport exhausted for {path} after {attempts} attempts ({elapsed_ms}ms): {last_error}")]
    TransportExhausted {
        path: String,
        attempts: u32,
        elapsed_ms: u64,
        last_error: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("fetch gate unavailable: {0}")]
    Gate(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

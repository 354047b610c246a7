//! Error types for Tally

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid monthly target: {0} (must be a positive amount)")]
    InvalidTarget(f64),

    #[error("Oracle unavailable: {0}")]
    OracleUnavailable(String),

    #[error(transparent)]
    Interpretation(#[from] InterpretationError),
}

/// Why a statement could not be turned into an expense
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InterpretationError {
    /// The oracle judged the text as not describing an expense
    #[error("The text does not describe an expense")]
    NotAnExpense,

    /// The oracle replied with something that is not a usable expense payload
    #[error("Could not understand the oracle response: {reason}")]
    MalformedOracleOutput { reason: String, raw: String },

    /// Network failure, timeout or error status from the oracle
    #[error("The language service is unavailable: {0}")]
    OracleUnavailable(String),
}

impl InterpretationError {
    /// Raw oracle text for diagnostics, when there is one
    pub fn raw_output(&self) -> Option<&str> {
        match self {
            Self::MalformedOracleOutput { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

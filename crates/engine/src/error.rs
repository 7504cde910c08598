//! The module contains the errors the engine can return.
//!
//! The settlement and analytics computations never fail: anomalous records
//! degrade to a zero contribution and are counted in
//! [`LedgerDiagnostics`](crate::LedgerDiagnostics). These errors are only
//! produced at the boundaries:
//!
//! - decoding a [`Snapshot`](crate::Snapshot) ([`InvalidSnapshot`]),
//! - parsing a currency or a period ([`UnsupportedCurrency`], [`InvalidPeriod`]),
//! - building an [`Engine`](crate::Engine) ([`InvalidSetting`]),
//! - the opt-in upstream validation ([`InvalidAmount`], [`MalformedSplit`],
//!   [`UnknownMember`]).
//!
//!  [`InvalidSnapshot`]: EngineError::InvalidSnapshot
//!  [`UnsupportedCurrency`]: EngineError::UnsupportedCurrency
//!  [`InvalidPeriod`]: EngineError::InvalidPeriod
//!  [`InvalidSetting`]: EngineError::InvalidSetting
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`MalformedSplit`]: EngineError::MalformedSplit
//!  [`UnknownMember`]: EngineError::UnknownMember
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Malformed split: {0}")]
    MalformedSplit(String),
    #[error("\"{0}\" member not found!")]
    UnknownMember(String),
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),
    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),
    #[error("Invalid setting: {0}")]
    InvalidSetting(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidSnapshot(err.to_string())
    }
}

use thiserror::Error;

/// Errors returned when assembling or analyzing a transaction.
///
/// Every error is terminal for the call that produced it. Nothing here is retried internally;
/// callers may try again after correcting their inputs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The request itself is malformed: no UTXOs, a zero amount, an unparsable address or a
    /// change output with nowhere to go.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The inputs cannot cover the requested outputs plus the estimated fee.
    #[error("Insufficient funds. Missing {missing} sats.")]
    InsufficientFunds {
        /// The missing amount in satoshis.
        missing: u64,
    },

    /// A transaction or record handed to us could not be decoded.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl Error {
    pub(crate) fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    pub(crate) fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }
}

/// Result type used throughout this crate.
pub type Result<T> = core::result::Result<T, Error>;

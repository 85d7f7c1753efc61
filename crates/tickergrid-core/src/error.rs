use thiserror::Error;

/// Validation and contract errors exposed by `tickergrid-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter: '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("price range start must not exceed end")]
    InvalidPriceRange,

    #[error("status {status} is outside the supported error status set")]
    UnsupportedStatus { status: u16 },
    #[error("trace id cannot be empty")]
    EmptyTraceId,
    #[error("problem title cannot be empty")]
    EmptyTitle,
    #[error("violation field name cannot be empty")]
    EmptyFieldName,
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

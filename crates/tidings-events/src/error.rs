//! Error primitives for event payload parsing.

use std::fmt::{self, Display, Formatter};

/// Error raised when an info hash string cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InfoHashError {
    /// Input length does not match a v1 (40 hex chars) or v2 (64 hex chars) hash.
    InvalidLength {
        /// Number of characters supplied.
        length: usize,
    },
    /// Input contained a character outside `[0-9a-fA-F]`.
    InvalidDigit {
        /// Byte offset of the offending character.
        position: usize,
    },
}

impl InfoHashError {
    /// Machine-friendly reason used in structured logs.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::InvalidLength { .. } => "invalid_length",
            Self::InvalidDigit { .. } => "invalid_digit",
        }
    }
}

impl Display for InfoHashError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("invalid info hash")
    }
}

impl std::error::Error for InfoHashError {}

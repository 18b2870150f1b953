//! Error types for the lead intake pipeline.
//!
//! [`Error`] captures every way a submission can fail between the form and
//! the redirect. Its variants are internal detail: the HTTP boundary logs them
//! and renders only the [`Notice`] returned by [`Error::notice`].
//!
//! ## Error Cases
//! - `InvalidSubmission`: a required field was missing or the phone number
//!   could not be normalized. Nothing was written.
//! - `LockTimeout`: the sequence lock could not be acquired within its bound.
//!   Nothing was written.
//! - `CounterStore` / `CorruptCounter`: the sequence counter could not be read,
//!   parsed, or persisted.
//! - `SheetStore`: the record could not be appended. The counter has already
//!   advanced, so the reserved identifier is burned.

use core::time::Duration;

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Unified error type for a single lead submission.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A required field was empty after normalization.
    #[error("Invalid submission: {reason}")]
    InvalidSubmission { reason: &'static str },

    /// The sequence lock stayed contended for the whole bounded wait.
    #[error("Timed out after {waited:?} waiting for the sequence lock")]
    LockTimeout { waited: Duration },

    /// The counter store failed to read or persist the sequence.
    #[error("Counter store error: {0}")]
    CounterStore(#[source] StoreError),

    /// The counter store holds something that is not a sequence number.
    #[error("Counter `{key}` holds {value:?}, which is not a sequence number")]
    CorruptCounter { key: &'static str, value: String },

    /// The sheet store failed while appending the lead record.
    #[error("Sheet store error: {0}")]
    SheetStore(#[source] StoreError),
}

impl Error {
    /// Returns `true` when the submission itself was rejected, as opposed to
    /// an internal failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidSubmission { .. })
    }

    /// The user-facing notice for this error. Never carries internal detail.
    pub fn notice(&self) -> Notice {
        if self.is_validation() {
            Notice::MissingFields
        } else {
            Notice::TryAgain
        }
    }
}

/// Fixed, user-facing failure messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notice {
    /// The name or phone number was missing or malformed.
    MissingFields,
    /// Anything else went wrong.
    TryAgain,
}

impl Notice {
    pub const fn message(self) -> &'static str {
        match self {
            Self::MissingFields => "Please enter your name and WhatsApp number.",
            Self::TryAgain => "Something went wrong. Please try again.",
        }
    }
}

/// Errors raised by counter and sheet store implementations.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum StoreError {
    /// Underlying filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be encoded or decoded.
    #[error("Encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// The sheet name cannot be mapped to a storage location.
    #[error("Invalid sheet name: {name:?}")]
    InvalidSheetName { name: String },

    /// The backend refused or could not serve the request.
    #[error("Store unavailable: {reason}")]
    Unavailable { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_map_to_missing_fields_notice() {
        let err = Error::InvalidSubmission {
            reason: "name is required",
        };
        assert!(err.is_validation());
        assert_eq!(err.notice(), Notice::MissingFields);
    }

    #[test]
    fn internal_errors_never_leak_detail() {
        let err = Error::SheetStore(StoreError::Unavailable {
            reason: "spreadsheet 1O5A is gone".to_string(),
        });
        assert!(!err.is_validation());
        assert_eq!(err.notice(), Notice::TryAgain);
        assert!(!err.notice().message().contains("1O5A"));
    }
}

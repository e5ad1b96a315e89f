//! Error types.
//!
//! Protocol-level failures (a vendor error envelope, a "not found" marker,
//! an unparsable body) all surface as a [`ResponseError`] so callers can
//! read `.message` and `.response` without caring which shape triggered it.
//! An unrecognised size-limit sentence is a separate, non-fatal
//! [`MalformedConstraintSentence`].

use thiserror::Error;

/// Which failure shape produced a [`ResponseError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseErrorKind {
    /// Explicit `<Error>` envelope, at the root or under a `<Package>`.
    Vendor { number: Option<String> },
    /// The tracking number is unknown to the vendor.
    NotFound,
    /// The body is not UTF-8 or not well-formed XML.
    Malformed,
    /// Well-formed XML whose root element is not a known response.
    UnknownRoot,
    /// First-class service requested without a usable mail type.
    InvalidMailType,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ResponseError {
    pub kind: ResponseErrorKind,
    pub message: String,
    /// Raw response body the error was derived from.
    pub response: String,
}

impl ResponseError {
    pub fn new(kind: ResponseErrorKind, message: impl Into<String>, response: impl Into<String>) -> Self {
        Self { kind, message: message.into(), response: response.into() }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ResponseErrorKind::NotFound
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no size-limit grammar matched sentence: {sentence:?}")]
pub struct MalformedConstraintSentence {
    pub sentence: String,
}

/// Top-level error for callers that mix response parsing with their own I/O.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Response(#[from] ResponseError),

    #[error(transparent)]
    Constraint(#[from] MalformedConstraintSentence),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_error_shapes_fold_into_error() {
        let response: Error =
            ResponseError::new(ResponseErrorKind::NotFound, "There is no record of that mail item.", "<x/>").into();
        assert_eq!(response.to_string(), "There is no record of that mail item.");

        let sentence: Error = MalformedConstraintSentence { sentence: "n/a".to_string() }.into();
        assert_eq!(sentence.to_string(), "no size-limit grammar matched sentence: \"n/a\"");
    }
}

//! Error types for domwalk operations.
//!
//! Navigation itself never fails: a missing parent, child, sibling or
//! ancestor is reported as `None`. These errors cover the text inputs
//! around it (selectors, navigation paths, documents read by the CLI).

use thiserror::Error;

/// Errors that can occur while parsing selectors or paths, or loading input.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Invalid navigation path: {0}")]
    InvalidPath(String),

    #[error("No element matches `{0}`")]
    NoMatch(String),
}

pub type Result<T> = std::result::Result<T, Error>;

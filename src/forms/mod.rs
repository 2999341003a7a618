//! Form definitions backing list screens.

use thiserror::Error;
use validator::ValidationErrors;

pub mod list;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("malformed query string: {0}")]
    Query(String),

    #[error("unknown filter: {0}")]
    UnknownFilter(String),

    #[error("invalid value: {0}")]
    TypeConstraint(String),
}

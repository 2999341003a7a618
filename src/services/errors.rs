use thiserror::Error;

/// Failure raised by a custom parameter mapper.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("parameter mapping failed: {0}")]
pub struct ParamMapperError(pub String);

/// Programming errors in a list configuration. They are logged and degrade
/// to a no-op; none of them is meant to reach the user.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ControllerError {
    #[error("unknown filter: {0}")]
    UnknownFilter(String),

    #[error("filter declared twice: {0}")]
    DuplicateFilter(String),

    #[error("invalid value: {0}")]
    TypeConstraint(String),

    #[error(transparent)]
    ParamMapper(#[from] ParamMapperError),
}

pub type ControllerResult<T> = Result<T, ControllerError>;

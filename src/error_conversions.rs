//! Error conversion glue.
//!
//! The domain layer must not depend on service or form error types, so the
//! conversions from value-object failures live here.

use crate::domain::types::TypeConstraintError;
use crate::forms::FormError;
use crate::services::errors::ControllerError;

impl From<TypeConstraintError> for ControllerError {
    fn from(val: TypeConstraintError) -> Self {
        ControllerError::TypeConstraint(val.to_string())
    }
}

impl From<TypeConstraintError> for FormError {
    fn from(val: TypeConstraintError) -> Self {
        FormError::TypeConstraint(val.to_string())
    }
}

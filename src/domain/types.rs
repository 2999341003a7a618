//! Strongly-typed value objects used by the list state.
//!
//! These wrappers enforce basic invariants (non-zero page size, non-empty
//! identifiers) so that once a value reaches the controller it can be treated
//! as trusted.
use std::fmt::{Display, Formatter};
use std::ops::Deref;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when attempting to construct a constrained value object.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// Page size must hold at least one row.
    #[error("page size must be greater than zero")]
    ZeroPageSize,
    /// Provided string contained no non-whitespace characters.
    #[error("value cannot be empty")]
    EmptyString,
}

/// Macro to generate trimmed, non-empty string newtypes.
macro_rules! name_newtype {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Trims the input and rejects empty values.
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                let value = value.into();
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Err(TypeConstraintError::EmptyString);
                }
                Ok(Self(trimmed.to_string()))
            }

            /// Borrow the value as a `&str`.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Convert into the owned inner `String`.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Deref for $name {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

name_newtype!(FilterName, "Name of a filter, unique within one controller.");
name_newtype!(
    EntityName,
    "Name of the business entity a list shows, used as the registry key prefix."
);

/// Number of rows requested per page.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "usize", into = "usize")]
pub struct PageSize(usize);

impl PageSize {
    /// Creates a page size ensuring it is greater than zero.
    pub fn new(value: usize) -> Result<Self, TypeConstraintError> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(TypeConstraintError::ZeroPageSize)
        }
    }

    /// Returns the raw `usize` backing this page size.
    pub const fn get(self) -> usize {
        self.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self(crate::DEFAULT_PAGE_SIZE)
    }
}

impl Display for PageSize {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<usize> for PageSize {
    type Error = TypeConstraintError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PageSize> for usize {
    fn from(value: PageSize) -> Self {
        value.0
    }
}

/// Current value of a filter widget.
///
/// An empty string or an empty list is the cleared state and never reaches
/// the query parameters.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum FilterValue {
    Single(String),
    Multi(Vec<String>),
}

impl FilterValue {
    /// Returns `true` when the value carries nothing to filter by.
    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::Single(value) => value.trim().is_empty(),
            FilterValue::Multi(values) => values.iter().all(|v| v.trim().is_empty()),
        }
    }

    /// Reshapes the value for a single-select widget, keeping the first
    /// selected entry of a list.
    pub fn into_single(self) -> Self {
        match self {
            FilterValue::Single(value) => FilterValue::Single(value.trim().to_string()),
            FilterValue::Multi(values) => FilterValue::Single(
                values
                    .into_iter()
                    .map(|v| v.trim().to_string())
                    .find(|v| !v.is_empty())
                    .unwrap_or_default(),
            ),
        }
    }

    /// Reshapes the value for a multi-select widget, dropping blank and
    /// repeated entries while keeping selection order.
    pub fn into_multi(self) -> Self {
        let values = match self {
            FilterValue::Single(value) => vec![value],
            FilterValue::Multi(values) => values,
        };
        let mut normalized: Vec<String> = Vec::with_capacity(values.len());
        for value in values {
            let value = value.trim().to_string();
            if !value.is_empty() && !normalized.contains(&value) {
                normalized.push(value);
            }
        }
        FilterValue::Multi(normalized)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Single(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Single(value)
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(values: Vec<String>) -> Self {
        FilterValue::Multi(values)
    }
}

impl From<Vec<&str>> for FilterValue {
    fn from(values: Vec<&str>) -> Self {
        FilterValue::Multi(values.into_iter().map(str::to_string).collect())
    }
}

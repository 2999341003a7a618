use serde::{Deserialize, Serialize};

use crate::domain::types::{FilterName, FilterValue, TypeConstraintError};

/// One selectable entry of a filter widget.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
}

impl FilterOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Declares a filter widget and how its value reaches the query parameters.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilterDescriptor {
    pub name: FilterName,
    pub label: String,
    /// Options in display order.
    pub options: Vec<FilterOption>,
    pub multi: bool,
}

impl FilterDescriptor {
    /// Single-select filter.
    pub fn single(
        name: impl Into<String>,
        label: impl Into<String>,
        options: Vec<FilterOption>,
    ) -> Result<Self, TypeConstraintError> {
        Ok(Self {
            name: FilterName::new(name)?,
            label: label.into(),
            options,
            multi: false,
        })
    }

    /// Multi-select filter.
    pub fn multi(
        name: impl Into<String>,
        label: impl Into<String>,
        options: Vec<FilterOption>,
    ) -> Result<Self, TypeConstraintError> {
        Ok(Self {
            multi: true,
            ..Self::single(name, label, options)?
        })
    }

    /// Brings a raw widget value into the shape this filter stores.
    pub fn normalize(&self, value: FilterValue) -> FilterValue {
        if self.multi {
            value.into_multi()
        } else {
            value.into_single()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_filter(multi: bool) -> FilterDescriptor {
        let options = vec![
            FilterOption::new("ACTIVE", "Active"),
            FilterOption::new("BLOCKED", "Blocked"),
        ];
        if multi {
            FilterDescriptor::multi("status", "Status", options).unwrap()
        } else {
            FilterDescriptor::single("status", "Status", options).unwrap()
        }
    }

    #[test]
    fn normalize_follows_widget_kind() {
        assert_eq!(
            status_filter(true).normalize(FilterValue::from("ACTIVE")),
            FilterValue::Multi(vec!["ACTIVE".to_string()])
        );
        assert_eq!(
            status_filter(false).normalize(FilterValue::from(vec!["BLOCKED", "ACTIVE"])),
            FilterValue::Single("BLOCKED".to_string())
        );
    }

    #[test]
    fn blank_name_is_rejected() {
        assert!(FilterDescriptor::single(" ", "Status", vec![]).is_err());
    }
}

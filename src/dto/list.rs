//! Snapshot of a list screen shaped for templates.

use serde::Serialize;

use crate::domain::filter::FilterDescriptor;
use crate::domain::query_params::QueryParams;
use crate::domain::types::FilterValue;
use crate::dto::actions::RenderedAction;
use crate::pagination::PageStrip;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FilterOptionView {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Filter widget with its current selection.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FilterView {
    pub name: String,
    pub label: String,
    pub multi: bool,
    pub options: Vec<FilterOptionView>,
}

impl FilterView {
    pub fn new(descriptor: &FilterDescriptor, value: Option<&FilterValue>) -> Self {
        let selected = |option: &str| match value {
            Some(FilterValue::Single(value)) => value == option,
            Some(FilterValue::Multi(values)) => values.iter().any(|value| value == option),
            None => false,
        };
        Self {
            name: descriptor.name.to_string(),
            label: descriptor.label.clone(),
            multi: descriptor.multi,
            options: descriptor
                .options
                .iter()
                .map(|option| FilterOptionView {
                    value: option.value.clone(),
                    label: option.label.clone(),
                    selected: selected(&option.value),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RowView<'a, T> {
    pub row: &'a T,
    pub actions: Vec<RenderedAction>,
}

/// Everything a list template renders.
#[derive(Debug, Serialize)]
pub struct ListView<'a, T> {
    pub rows: Vec<RowView<'a, T>>,
    pub total_elements: usize,
    pub strip: PageStrip,
    pub page_size: usize,
    pub page_sizes: &'a [usize],
    /// Raw text of the search field, possibly not yet committed.
    pub search_input: &'a str,
    pub filters: Vec<FilterView>,
    pub params: Option<&'a QueryParams>,
    pub is_loading: bool,
    pub is_error: bool,
    pub error: Option<String>,
}

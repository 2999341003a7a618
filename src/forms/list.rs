//! List options carried in a URL query string.
//!
//! A screen mounted from a link such as
//! `?page=2&size=20&key=abc&status=ACTIVE&status=BLOCKED` restores its
//! controller from these options; the same shape is written back when the
//! state changes. Pages are zero-based, as on the wire.

use std::collections::BTreeMap;

use serde::Deserialize;
use validator::Validate;

use crate::domain::filter::FilterDescriptor;
use crate::domain::list_state::ListQueryState;
use crate::domain::types::{FilterName, FilterValue, PageSize};
use crate::forms::FormError;

#[derive(Deserialize)]
struct PagingFields {
    #[serde(default)]
    page: Option<usize>,
    #[serde(default)]
    size: Option<usize>,
}

#[derive(Debug, Default, Validate, PartialEq, Eq)]
/// Raw list options parsed from a query string.
pub struct ListOptionsForm {
    #[validate(range(max = 100000))]
    pub page: Option<usize>,
    #[validate(range(min = 1, max = 1000))]
    pub size: Option<usize>,
    #[validate(length(max = 256))]
    pub search: String,
    /// Every other key, with repeated keys collected in order.
    pub filters: BTreeMap<String, Vec<String>>,
}

/// Validated options a controller starts from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListOptions {
    pub page: usize,
    pub size: PageSize,
    pub search: String,
    pub filters: Vec<(FilterName, FilterValue)>,
}

impl ListOptionsForm {
    /// Parses a query string, with or without the leading `?`.
    pub fn parse(query: &str, search_key: &str) -> Result<Self, FormError> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let paging: PagingFields =
            serde_html_form::from_str(query).map_err(|err| FormError::Query(err.to_string()))?;
        let mut values: BTreeMap<String, Vec<String>> =
            serde_html_form::from_str(query).map_err(|err| FormError::Query(err.to_string()))?;
        values.remove("page");
        values.remove("size");
        let search = values
            .remove(search_key)
            .and_then(|terms| terms.into_iter().next())
            .unwrap_or_default();

        let form = Self {
            page: paging.page,
            size: paging.size,
            search,
            filters: values,
        };
        Ok(form)
    }

    /// Validates the form against the filters a list declares.
    pub fn into_options(
        self,
        filters: &[FilterDescriptor],
        default_size: PageSize,
    ) -> Result<ListOptions, FormError> {
        self.validate()?;
        let size = match self.size {
            Some(size) => PageSize::new(size)?,
            None => default_size,
        };

        let mut values = Vec::with_capacity(self.filters.len());
        for (name, raw) in self.filters {
            let descriptor = filters
                .iter()
                .find(|filter| filter.name.as_str() == name)
                .ok_or(FormError::UnknownFilter(name))?;
            let value = descriptor.normalize(FilterValue::Multi(raw));
            if !value.is_empty() {
                values.push((descriptor.name.clone(), value));
            }
        }

        Ok(ListOptions {
            page: self.page.unwrap_or(0),
            size,
            search: self.search.trim().to_string(),
            filters: values,
        })
    }
}

/// Serializes committed list state back into a query string.
pub fn encode_state(state: &ListQueryState, search_key: &str) -> Result<String, FormError> {
    let mut pairs: Vec<(&str, String)> = vec![
        ("page", state.page().to_string()),
        ("size", state.size().to_string()),
    ];
    if !state.search().is_empty() {
        pairs.push((search_key, state.search().to_string()));
    }
    for (name, value) in state.active_filters() {
        match value {
            FilterValue::Single(value) => pairs.push((name.as_str(), value.clone())),
            FilterValue::Multi(values) => {
                pairs.extend(values.iter().map(|value| (name.as_str(), value.clone())))
            }
        }
    }
    serde_html_form::to_string(&pairs).map_err(|err| FormError::Query(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::filter::FilterOption;

    fn filters() -> Vec<FilterDescriptor> {
        vec![
            FilterDescriptor::multi(
                "status",
                "Status",
                vec![
                    FilterOption::new("ACTIVE", "Active"),
                    FilterOption::new("BLOCKED", "Blocked"),
                ],
            )
            .unwrap(),
            FilterDescriptor::single("role", "Role", vec![FilterOption::new("ADMIN", "Admin")])
                .unwrap(),
        ]
    }

    #[test]
    fn parses_repeated_keys_into_multi_filters() {
        let form =
            ListOptionsForm::parse("?page=2&size=20&key=abc&status=ACTIVE&status=BLOCKED", "key")
                .unwrap();

        assert_eq!(form.page, Some(2));
        assert_eq!(form.size, Some(20));
        assert_eq!(form.search, "abc");
        assert_eq!(
            form.filters.get("status"),
            Some(&vec!["ACTIVE".to_string(), "BLOCKED".to_string()])
        );
    }

    #[test]
    fn options_are_normalized_per_filter() {
        let options = ListOptionsForm::parse("role=ADMIN&status=ACTIVE&status=", "key")
            .unwrap()
            .into_options(&filters(), PageSize::default())
            .unwrap();

        assert_eq!(options.page, 0);
        assert_eq!(options.size, PageSize::default());
        assert_eq!(
            options.filters,
            vec![
                (FilterName::new("role").unwrap(), FilterValue::from("ADMIN")),
                (
                    FilterName::new("status").unwrap(),
                    FilterValue::from(vec!["ACTIVE"])
                ),
            ]
        );
    }

    #[test]
    fn unknown_filter_is_rejected() {
        let result = ListOptionsForm::parse("colour=red", "key")
            .unwrap()
            .into_options(&filters(), PageSize::default());
        assert!(matches!(result, Err(FormError::UnknownFilter(name)) if name == "colour"));
    }

    #[test]
    fn out_of_range_size_is_rejected() {
        let result = ListOptionsForm::parse("size=0", "key")
            .unwrap()
            .into_options(&filters(), PageSize::default());
        assert!(matches!(result, Err(FormError::Validation(_))));
    }

    #[test]
    fn page_beyond_bound_is_rejected() {
        let form = ListOptionsForm::parse("page=18446744073709551615", "key").unwrap();
        let result = form.into_options(&filters(), PageSize::default());
        assert!(matches!(result, Err(FormError::Validation(_))));
    }

    #[test]
    fn malformed_number_is_a_query_error() {
        assert!(matches!(
            ListOptionsForm::parse("page=two", "key"),
            Err(FormError::Query(_))
        ));
    }

    #[test]
    fn encoded_state_parses_back() {
        let mut state = ListQueryState::new(0, PageSize::new(20).unwrap());
        state.set_search("a b");
        state.set_filter(
            FilterName::new("status").unwrap(),
            FilterValue::from(vec!["ACTIVE", "BLOCKED"]),
        );
        state.set_page(3);

        let query = encode_state(&state, "q").unwrap();
        assert_eq!(query, "page=3&size=20&q=a+b&status=ACTIVE&status=BLOCKED");

        let form = ListOptionsForm::parse(&query, "q").unwrap();
        assert_eq!(form.search, "a b");
        assert_eq!(form.page, Some(3));
    }
}

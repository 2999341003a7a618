//! Search, filter and pagination controller shared by every list screen.
//!
//! The controller is the single writer of a [`ListQueryState`]. Setters
//! stage a change on a copy of the state, the injected [`ParamMapper`] turns
//! it into [`QueryParams`], and only then is the change kept and handed to
//! the [`QueryBinding`], which decides whether a fetch is needed. Search text is committed only after a quiet period; the host
//! drives that timer by calling [`ListController::poll`].

use std::collections::HashSet;
use std::time::Instant;

use serde_json::Value;

use crate::domain::filter::FilterDescriptor;
use crate::domain::list_state::ListQueryState;
use crate::domain::page::PageResult;
use crate::domain::query_params::QueryParams;
use crate::domain::types::{EntityName, FilterName, FilterValue, PageSize};
use crate::forms::list::ListOptions;
use crate::models::config::ListSettings;
use crate::repository::errors::{QueryResult, RemoteError};
use crate::repository::registry::QueryRegistry;
use crate::repository::{FetchTicket, QueryCapability};
use crate::services::errors::{ControllerError, ControllerResult, ParamMapperError};
use crate::services::query_binding::{QueryBinding, Resolution};

/// Turns list state into the parameters of the bound query.
pub trait ParamMapper {
    fn map(&self, state: &ListQueryState) -> Result<QueryParams, ParamMapperError>;
}

impl<F> ParamMapper for F
where
    F: Fn(&ListQueryState) -> Result<QueryParams, ParamMapperError>,
{
    fn map(&self, state: &ListQueryState) -> Result<QueryParams, ParamMapperError> {
        self(state)
    }
}

/// Emits `page`, `size`, the search term under `search_key` and every
/// non-empty filter under its own name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DefaultParamMapper {
    pub search_key: String,
}

impl DefaultParamMapper {
    pub fn new(search_key: impl Into<String>) -> Self {
        Self {
            search_key: search_key.into(),
        }
    }
}

impl Default for DefaultParamMapper {
    fn default() -> Self {
        Self::new(crate::DEFAULT_SEARCH_KEY)
    }
}

impl ParamMapper for DefaultParamMapper {
    fn map(&self, state: &ListQueryState) -> Result<QueryParams, ParamMapperError> {
        let mut params = QueryParams::new()
            .with("page", state.page())
            .with("size", state.size().get());
        if !state.search().is_empty() {
            params.insert(self.search_key.clone(), state.search());
        }
        for (name, value) in state.active_filters() {
            let value = match value {
                FilterValue::Single(value) => Value::from(value.as_str()),
                FilterValue::Multi(values) => Value::from(values.clone()),
            };
            params.insert(name.as_str(), value);
        }
        Ok(params)
    }
}

/// Configures a [`ListController`].
pub struct ListControllerBuilder<Q: QueryCapability> {
    entity: EntityName,
    capability: Q,
    registry: QueryRegistry,
    filters: Vec<FilterDescriptor>,
    mapper: Option<Box<dyn ParamMapper>>,
    settings: ListSettings,
    page: usize,
    size: Option<usize>,
    options: Option<ListOptions>,
    enabled: bool,
}

impl<Q: QueryCapability> ListControllerBuilder<Q> {
    pub fn filters(mut self, filters: Vec<FilterDescriptor>) -> Self {
        self.filters = filters;
        self
    }

    pub fn filter(mut self, filter: FilterDescriptor) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn mapper(mut self, mapper: impl ParamMapper + 'static) -> Self {
        self.mapper = Some(Box::new(mapper));
        self
    }

    pub fn settings(mut self, settings: ListSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn registry(mut self, registry: QueryRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn initial_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    pub fn page_size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    /// Starts from options restored from a URL query string.
    pub fn options(mut self, options: ListOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Gate for queries that depend on an identifier not yet available.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Validates the configuration and issues the initial fetch.
    pub fn build(self) -> ControllerResult<ListController<Q>> {
        let mut seen = HashSet::new();
        for filter in &self.filters {
            if !seen.insert(filter.name.clone()) {
                log::warn!("Filter {} declared twice for {}", filter.name, self.entity);
                return Err(ControllerError::DuplicateFilter(filter.name.to_string()));
            }
        }

        let size = self.size.unwrap_or(self.settings.default_page_size);
        let mut state = ListQueryState::new(self.page, PageSize::new(size)?);
        let mut search_input = String::new();

        if let Some(options) = self.options {
            state.set_size(options.size);
            state.set_search(&options.search);
            search_input = options.search;
            for (name, value) in options.filters {
                let filter = self
                    .filters
                    .iter()
                    .find(|filter| filter.name == name)
                    .ok_or_else(|| ControllerError::UnknownFilter(name.to_string()))?;
                state.set_filter(name, filter.normalize(value));
            }
            state.set_page(options.page);
        }

        let mapper: Box<dyn ParamMapper> = match self.mapper {
            Some(mapper) => mapper,
            None => Box::new(DefaultParamMapper::new(self.settings.search_key.clone())),
        };

        let mut binding = QueryBinding::new(self.entity, self.capability, self.registry);
        binding.set_enabled(self.enabled);

        let mut controller = ListController {
            filters: self.filters,
            mapper,
            settings: self.settings,
            state,
            search_input,
            search_deadline: None,
            committed: None,
            binding,
        };
        controller.update(|_| true);
        Ok(controller)
    }
}

pub struct ListController<Q: QueryCapability> {
    filters: Vec<FilterDescriptor>,
    mapper: Box<dyn ParamMapper>,
    settings: ListSettings,
    state: ListQueryState,
    /// Text shown in the search field, ahead of the committed term.
    search_input: String,
    search_deadline: Option<Instant>,
    committed: Option<QueryParams>,
    binding: QueryBinding<Q>,
}

impl<Q: QueryCapability> ListController<Q> {
    pub fn builder(entity: EntityName, capability: Q) -> ListControllerBuilder<Q> {
        ListControllerBuilder {
            entity,
            capability,
            registry: QueryRegistry::new(),
            filters: Vec::new(),
            mapper: None,
            settings: ListSettings::default(),
            page: 0,
            size: None,
            options: None,
            enabled: true,
        }
    }

    /// Updates the search field. The term reaches the query once no further
    /// edit happens within the debounce window.
    pub fn set_search(&mut self, text: impl Into<String>, now: Instant) {
        self.search_input = text.into();
        let debounce = self.settings.debounce();
        if debounce.is_zero() {
            self.commit_search();
        } else {
            self.search_deadline = Some(now + debounce);
        }
    }

    /// Commits the pending search term right away (submit key).
    pub fn flush_search(&mut self) -> bool {
        self.commit_search()
    }

    /// Fires a due debounce. Returns `true` when the committed parameters
    /// changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.search_deadline {
            Some(deadline) if deadline <= now => self.commit_search(),
            _ => false,
        }
    }

    /// When the host should call [`ListController::poll`] next.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.search_deadline
    }

    fn commit_search(&mut self) -> bool {
        self.search_deadline = None;
        let term = self.search_input.clone();
        let changed = self.update(|state| state.set_search(&term));
        if changed {
            log::debug!(
                "Committed search {:?} for {}",
                self.state.search(),
                self.binding.entity()
            );
        }
        changed
    }

    /// Sets a declared filter; unknown names leave the state untouched.
    pub fn set_filter_value(
        &mut self,
        name: &str,
        value: impl Into<FilterValue>,
    ) -> ControllerResult<()> {
        let filter = self.find_filter(name)?;
        let name = filter.name.clone();
        let value = filter.normalize(value.into());
        self.update(|state| state.set_filter(name, value));
        Ok(())
    }

    pub fn clear_filter(&mut self, name: &str) -> ControllerResult<()> {
        self.set_filter_value(name, FilterValue::Multi(Vec::new()))
    }

    pub fn clear_filters(&mut self) {
        self.update(ListQueryState::clear_filters);
    }

    fn find_filter(&self, name: &str) -> ControllerResult<&FilterDescriptor> {
        self.filters
            .iter()
            .find(|filter| filter.name.as_str() == name.trim())
            .ok_or_else(|| {
                log::warn!(
                    "Ignoring value for undeclared filter {name:?} on {}",
                    self.binding.entity()
                );
                ControllerError::UnknownFilter(name.to_string())
            })
    }

    /// Moves to a zero-based page. Negative input clamps to the first page.
    /// Input past the end clamps to the last page once a settled result is
    /// known; while a fetch is loading the shown result may belong to other
    /// parameters, so the page is taken as given.
    pub fn set_page(&mut self, page: i64) {
        let mut page = usize::try_from(page).unwrap_or(0);
        if let Some(last_page) = self.settled_last_page() {
            page = page.min(last_page);
        }
        self.update(|state| state.set_page(page));
    }

    fn settled_last_page(&self) -> Option<usize> {
        if self.binding.is_loading() {
            return None;
        }
        self.binding.data().map(|data| data.last_page().unwrap_or(0))
    }

    pub fn next_page(&mut self) {
        let page = self.state.page().saturating_add(1);
        self.set_page(i64::try_from(page).unwrap_or(i64::MAX));
    }

    pub fn previous_page(&mut self) {
        let page = self.state.page().saturating_sub(1);
        self.set_page(i64::try_from(page).unwrap_or(0));
    }

    /// Changes the page size and returns to the first page.
    pub fn set_size(&mut self, size: usize) -> ControllerResult<()> {
        let size = PageSize::new(size).map_err(|err| {
            log::warn!("Rejected page size {size} for {}", self.binding.entity());
            ControllerError::from(err)
        })?;
        self.update(|state| state.set_size(size));
        Ok(())
    }

    pub fn set_enabled(&mut self, enabled: bool) -> Option<FetchTicket> {
        self.binding.set_enabled(enabled)
    }

    /// User-initiated retry of the current query.
    pub fn refetch(&mut self) -> Option<FetchTicket> {
        self.binding.refetch()
    }

    /// Refetches when the registry invalidated the current query.
    pub fn sync(&mut self) -> Option<FetchTicket> {
        self.binding.sync()
    }

    /// Delivers a pending fetch result.
    pub fn resolve(
        &mut self,
        ticket: FetchTicket,
        result: QueryResult<PageResult<Q::Row>>,
    ) -> Resolution {
        self.binding.resolve(ticket, result)
    }

    /// Applies `change` to a copy of the state and maps it. The state is
    /// replaced only when the mapper succeeds; a failing mapper leaves both
    /// the state and the previous parameters untouched. Returns `true` when
    /// the parameters handed to the binding changed.
    fn update(&mut self, change: impl FnOnce(&mut ListQueryState) -> bool) -> bool {
        let mut next = self.state.clone();
        if !change(&mut next) {
            return false;
        }
        let params = match self.mapper.map(&next) {
            Ok(params) => params,
            Err(err) => {
                log::error!(
                    "Keeping previous query for {}: {err}",
                    self.binding.entity()
                );
                return false;
            }
        };
        self.state = next;
        if self.committed.as_ref() == Some(&params) {
            return false;
        }
        self.committed = Some(params.clone());
        self.binding.bind(params);
        true
    }

    pub fn state(&self) -> &ListQueryState {
        &self.state
    }

    pub fn settings(&self) -> &ListSettings {
        &self.settings
    }

    pub fn entity(&self) -> &EntityName {
        self.binding.entity()
    }

    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    pub fn filters(&self) -> &[FilterDescriptor] {
        &self.filters
    }

    pub fn filter_value(&self, name: &str) -> Option<&FilterValue> {
        let name = FilterName::new(name).ok()?;
        self.state.filter(&name)
    }

    /// Parameters derived from the latest committed state.
    pub fn params(&self) -> Option<&QueryParams> {
        self.committed.as_ref()
    }

    pub fn binding(&self) -> &QueryBinding<Q> {
        &self.binding
    }

    pub fn rows(&self) -> &[Q::Row] {
        self.binding.rows()
    }

    pub fn data(&self) -> Option<&PageResult<Q::Row>> {
        self.binding.data()
    }

    pub fn is_loading(&self) -> bool {
        self.binding.is_loading()
    }

    pub fn is_error(&self) -> bool {
        self.binding.is_error()
    }

    pub fn error(&self) -> Option<&RemoteError> {
        self.binding.error()
    }
}

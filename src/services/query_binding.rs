//! Binds committed query parameters to a query capability.
//!
//! The binding issues a fetch whenever the parameters change by value and
//! keeps the latest result with its loading/error flags. Every fetch gets a
//! new generation; a result is applied only when its ticket carries the
//! latest generation, so a slow response for superseded parameters never
//! overwrites a newer one. Previous data stay visible while the next fetch is
//! in flight.

use crate::domain::page::PageResult;
use crate::domain::query_params::QueryParams;
use crate::domain::types::EntityName;
use crate::repository::errors::{QueryResult, RemoteError};
use crate::repository::registry::{Epoch, QueryKey, QueryRegistry};
use crate::repository::{FetchOutcome, FetchRequest, FetchTicket, QueryCapability};

/// What happened to a delivered fetch result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    /// Superseded by a newer fetch, or the binding was disabled meanwhile.
    Stale,
}

pub struct QueryBinding<Q: QueryCapability> {
    capability: Q,
    entity: EntityName,
    registry: QueryRegistry,
    enabled: bool,
    /// Parameters the caller wants shown.
    desired: Option<QueryParams>,
    /// Parameters of the latest issued fetch and the invalidation counters
    /// seen at that moment.
    issued: Option<(QueryKey, QueryParams, Epoch)>,
    generation: u64,
    in_flight: Option<FetchTicket>,
    data: Option<PageResult<Q::Row>>,
    error: Option<RemoteError>,
}

impl<Q: QueryCapability> QueryBinding<Q> {
    pub fn new(entity: EntityName, capability: Q, registry: QueryRegistry) -> Self {
        Self {
            capability,
            entity,
            registry,
            enabled: true,
            desired: None,
            issued: None,
            generation: 0,
            in_flight: None,
            data: None,
            error: None,
        }
    }

    /// Requests the given parameters. Nothing is issued when they equal the
    /// parameters of the latest fetch or while the binding is disabled.
    pub fn bind(&mut self, params: QueryParams) -> Option<FetchTicket> {
        let unchanged = self
            .issued
            .as_ref()
            .is_some_and(|(_, issued, _)| *issued == params);
        self.desired = Some(params);
        if unchanged || !self.enabled {
            return None;
        }
        self.issue()
    }

    /// Opens or closes the gate for dependent queries.
    pub fn set_enabled(&mut self, enabled: bool) -> Option<FetchTicket> {
        if self.enabled == enabled {
            return None;
        }
        self.enabled = enabled;
        if enabled {
            return self.issue();
        }
        // Whatever is in flight belongs to the closed gate.
        self.generation += 1;
        self.in_flight = None;
        self.issued = None;
        None
    }

    /// Re-issues the current parameters regardless of equality.
    pub fn refetch(&mut self) -> Option<FetchTicket> {
        if !self.enabled {
            return None;
        }
        self.issue()
    }

    /// Refetches once when the registry reports the current query stale.
    pub fn sync(&mut self) -> Option<FetchTicket> {
        let (key, _, seen) = self.issued.as_ref()?;
        if self.registry.epoch(key) == *seen {
            return None;
        }
        log::debug!("Query {key} was invalidated, refetching");
        self.refetch()
    }

    /// Delivers the result of a pending fetch.
    pub fn resolve(
        &mut self,
        ticket: FetchTicket,
        result: QueryResult<PageResult<Q::Row>>,
    ) -> Resolution {
        if self.in_flight != Some(ticket) {
            log::debug!(
                "Discarding stale result for {} (generation {}, latest {})",
                self.entity,
                ticket.generation(),
                self.generation
            );
            return Resolution::Stale;
        }
        self.in_flight = None;
        match result {
            Ok(page) => {
                self.data = Some(page);
                self.error = None;
            }
            Err(err) => {
                log::error!("Failed to load {}: {err}", self.entity);
                self.error = Some(err);
            }
        }
        Resolution::Applied
    }

    fn issue(&mut self) -> Option<FetchTicket> {
        let params = self.desired.clone()?;
        self.generation += 1;
        let ticket = FetchTicket::new(self.generation);
        let key = QueryKey::new(&self.entity, &params);
        let epoch = self.registry.epoch(&key);
        log::debug!("Fetching {key} (generation {})", self.generation);

        self.issued = Some((key, params.clone(), epoch));
        self.in_flight = Some(ticket);

        match self.capability.fetch(FetchRequest { ticket, params }) {
            FetchOutcome::Ready(result) => {
                self.resolve(ticket, result);
            }
            FetchOutcome::Pending => {}
        }
        Some(ticket)
    }

    pub fn entity(&self) -> &EntityName {
        &self.entity
    }

    pub fn capability(&self) -> &Q {
        &self.capability
    }

    /// Handle to the registry this binding observes.
    pub fn registry(&self) -> &QueryRegistry {
        &self.registry
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Latest successful page; `None` while disabled.
    pub fn data(&self) -> Option<&PageResult<Q::Row>> {
        if self.enabled { self.data.as_ref() } else { None }
    }

    pub fn rows(&self) -> &[Q::Row] {
        self.data().map(|page| page.content.as_slice()).unwrap_or(&[])
    }

    pub fn is_loading(&self) -> bool {
        self.enabled && self.in_flight.is_some()
    }

    pub fn is_error(&self) -> bool {
        self.enabled && self.error.is_some()
    }

    pub fn error(&self) -> Option<&RemoteError> {
        if self.enabled { self.error.as_ref() } else { None }
    }

    /// Parameters of the latest issued fetch.
    pub fn issued_params(&self) -> Option<&QueryParams> {
        self.issued.as_ref().map(|(_, params, _)| params)
    }

    pub fn key(&self) -> Option<&QueryKey> {
        self.issued.as_ref().map(|(key, _, _)| key)
    }

    pub fn in_flight(&self) -> Option<FetchTicket> {
        self.in_flight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::memory::DeferredQuery;
    use crate::repository::mock::MockQuery;
    use serde_json::json;

    fn users() -> EntityName {
        EntityName::new("users").unwrap()
    }

    fn params(page: u64) -> QueryParams {
        QueryParams::new().with("page", page).with("size", 10)
    }

    fn page_of(names: &[&str]) -> PageResult<String> {
        PageResult::new(
            names.iter().map(|n| n.to_string()).collect(),
            names.len(),
            1,
        )
    }

    fn deferred() -> QueryBinding<DeferredQuery<String>> {
        QueryBinding::new(users(), DeferredQuery::new(), QueryRegistry::new())
    }

    #[test]
    fn equal_params_do_not_refetch() {
        let mut binding = deferred();
        assert!(binding.bind(params(0)).is_some());
        assert!(binding.bind(params(0)).is_none());
        assert_eq!(binding.capability().request_count(), 1);
    }

    #[test]
    fn late_response_for_superseded_params_is_discarded() {
        let mut binding = deferred();
        let first = binding.bind(params(0)).unwrap();
        let second = binding.bind(params(1)).unwrap();

        assert_eq!(
            binding.resolve(second, Ok(page_of(&["second"]))),
            Resolution::Applied
        );
        assert_eq!(
            binding.resolve(first, Ok(page_of(&["first"]))),
            Resolution::Stale
        );
        assert_eq!(binding.rows(), ["second".to_string()]);
        assert!(!binding.is_loading());
    }

    #[test]
    fn previous_rows_stay_visible_while_loading() {
        let mut binding = deferred();
        let first = binding.bind(params(0)).unwrap();
        binding.resolve(first, Ok(page_of(&["a", "b"])));

        binding.bind(params(1));

        assert!(binding.is_loading());
        assert_eq!(binding.rows().len(), 2);
    }

    #[test]
    fn failure_flips_error_without_retry() {
        let mut binding = deferred();
        let ticket = binding.bind(params(0)).unwrap();

        binding.resolve(ticket, Err(RemoteError::ServerError("boom".into())));

        assert!(binding.is_error());
        assert_eq!(
            binding.error(),
            Some(&RemoteError::ServerError("boom".into()))
        );
        assert_eq!(binding.capability().request_count(), 1);

        let retry = binding.refetch().unwrap();
        binding.resolve(retry, Ok(page_of(&["a"])));
        assert!(!binding.is_error());
    }

    #[test]
    fn disabled_binding_issues_nothing_and_shows_nothing() {
        let mut binding = deferred();
        binding.set_enabled(false);

        assert!(binding.bind(params(0)).is_none());
        assert!(!binding.is_loading());
        assert!(binding.rows().is_empty());
        assert_eq!(binding.capability().request_count(), 0);

        let ticket = binding.set_enabled(true).unwrap();
        assert_eq!(
            binding.capability().last_request().unwrap().params,
            params(0)
        );
        assert_eq!(binding.in_flight(), Some(ticket));
    }

    #[test]
    fn disabling_discards_in_flight_result() {
        let mut binding = deferred();
        let ticket = binding.bind(params(0)).unwrap();
        binding.set_enabled(false);

        assert_eq!(binding.resolve(ticket, Ok(page_of(&["x"]))), Resolution::Stale);
    }

    #[test]
    fn registry_invalidation_triggers_one_refetch() {
        let registry = QueryRegistry::new();
        let mut binding = QueryBinding::new(users(), DeferredQuery::<String>::new(), registry.clone());
        binding.bind(params(0));
        assert!(binding.sync().is_none());

        registry.invalidate(&users());

        assert!(binding.sync().is_some());
        assert!(binding.sync().is_none());
        assert_eq!(binding.capability().request_count(), 2);
    }

    #[test]
    fn synchronous_capability_resolves_immediately() {
        let mut query = MockQuery::new();
        query
            .expect_fetch()
            .times(1)
            .returning(|_| FetchOutcome::Ready(Ok(PageResult::new(vec![json!({"id": 1})], 1, 1))));
        let mut binding = QueryBinding::new(users(), query, QueryRegistry::new());

        binding.bind(params(0));

        assert!(!binding.is_loading());
        assert_eq!(binding.rows(), [json!({"id": 1})]);
    }
}

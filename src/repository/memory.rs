//! In-process capabilities backed by plain vectors.
//!
//! Used by the demo binary and by tests that need deterministic control over
//! when a request completes.

use std::cell::{Cell, RefCell};

use serde_json::Value;

use crate::DEFAULT_SEARCH_KEY;
use crate::domain::page::PageResult;
use crate::repository::errors::{MutationResult, RemoteError};
use crate::repository::{
    FetchOutcome, FetchRequest, MutationCapability, MutationOutcome, MutationTicket,
    QueryCapability,
};

type SearchFn<T> = Box<dyn Fn(&T, &str) -> bool>;
type FieldFn<T> = Box<dyn Fn(&T, &str) -> Option<String>>;

/// Answers every fetch immediately by searching, filtering and slicing a
/// vector of rows.
///
/// Any parameter other than `page`, `size` and the search key is treated as
/// a filter: a row passes when its field value equals the parameter (or is
/// one of the values, for arrays).
pub struct InMemoryQuery<T> {
    rows: RefCell<Vec<T>>,
    search_key: String,
    matches_search: SearchFn<T>,
    field: FieldFn<T>,
    requests: RefCell<Vec<FetchRequest>>,
    failure: RefCell<Option<RemoteError>>,
}

impl<T: Clone> InMemoryQuery<T> {
    pub fn new<S, F>(rows: Vec<T>, matches_search: S, field: F) -> Self
    where
        S: Fn(&T, &str) -> bool + 'static,
        F: Fn(&T, &str) -> Option<String> + 'static,
    {
        Self {
            rows: RefCell::new(rows),
            search_key: DEFAULT_SEARCH_KEY.to_string(),
            matches_search: Box::new(matches_search),
            field: Box::new(field),
            requests: RefCell::new(Vec::new()),
            failure: RefCell::new(None),
        }
    }

    #[must_use]
    pub fn search_key(mut self, key: impl Into<String>) -> Self {
        self.search_key = key.into();
        self
    }

    /// Applies a change to the stored rows, as a server-side write would.
    pub fn update_rows(&self, change: impl FnOnce(&mut Vec<T>)) {
        change(&mut self.rows.borrow_mut());
    }

    /// Makes the next fetch fail with the given error.
    pub fn fail_next(&self, err: RemoteError) {
        self.failure.replace(Some(err));
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.borrow().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    fn passes_filters(&self, row: &T, request: &FetchRequest) -> bool {
        request
            .params
            .iter()
            .filter(|(key, _)| !matches!(key.as_str(), "page" | "size") && **key != self.search_key)
            .all(|(key, expected)| {
                let actual = (self.field)(row, key.as_str());
                match (actual, expected) {
                    (Some(actual), Value::String(expected)) => actual == *expected,
                    (Some(actual), Value::Array(expected)) => {
                        expected.iter().any(|value| value.as_str() == Some(actual.as_str()))
                    }
                    (Some(actual), other) => actual == other.to_string(),
                    (None, _) => false,
                }
            })
    }
}

impl<T: Clone> QueryCapability for InMemoryQuery<T> {
    type Row = T;

    fn fetch(&self, request: FetchRequest) -> FetchOutcome<T> {
        self.requests.borrow_mut().push(request.clone());

        if let Some(err) = self.failure.borrow_mut().take() {
            return FetchOutcome::Ready(Err(err));
        }

        let page = request.params.page().unwrap_or(0) as usize;
        let size = request.params.size().unwrap_or(crate::DEFAULT_PAGE_SIZE as u64) as usize;
        let search = request
            .params
            .str_value(&self.search_key)
            .map(str::to_lowercase)
            .unwrap_or_default();

        let rows = self.rows.borrow();
        let matching: Vec<&T> = rows
            .iter()
            .filter(|row| search.is_empty() || (self.matches_search)(*row, &search))
            .filter(|row| self.passes_filters(*row, &request))
            .collect();

        let total = matching.len();
        let content = matching
            .into_iter()
            .skip(page.saturating_mul(size))
            .take(size)
            .cloned()
            .collect();

        FetchOutcome::Ready(Ok(PageResult::from_slice(content, total, size)))
    }
}

/// Leaves every fetch pending so tests decide completion order.
pub struct DeferredQuery<T> {
    requests: RefCell<Vec<FetchRequest>>,
    _row: std::marker::PhantomData<T>,
}

impl<T> DeferredQuery<T> {
    pub fn new() -> Self {
        Self {
            requests: RefCell::new(Vec::new()),
            _row: std::marker::PhantomData,
        }
    }

    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.borrow().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn last_request(&self) -> Option<FetchRequest> {
        self.requests.borrow().last().cloned()
    }
}

impl<T> Default for DeferredQuery<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> QueryCapability for DeferredQuery<T> {
    type Row = T;

    fn fetch(&self, request: FetchRequest) -> FetchOutcome<T> {
        self.requests.borrow_mut().push(request);
        FetchOutcome::Pending
    }
}

/// Mutation applied synchronously through a closure.
pub struct FnMutation<V> {
    apply: Box<dyn Fn(V) -> MutationResult<()>>,
    calls: Cell<usize>,
}

impl<V> FnMutation<V> {
    pub fn new(apply: impl Fn(V) -> MutationResult<()> + 'static) -> Self {
        Self {
            apply: Box::new(apply),
            calls: Cell::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl<V> MutationCapability for FnMutation<V> {
    type Variables = V;

    fn mutate(&self, _ticket: MutationTicket, variables: V) -> MutationOutcome {
        self.calls.set(self.calls.get() + 1);
        MutationOutcome::Ready((self.apply)(variables))
    }
}

/// Records dispatched mutations and leaves them pending.
pub struct DeferredMutation<V> {
    dispatched: RefCell<Vec<(MutationTicket, V)>>,
}

impl<V: Clone> DeferredMutation<V> {
    pub fn new() -> Self {
        Self {
            dispatched: RefCell::new(Vec::new()),
        }
    }

    pub fn dispatched(&self) -> Vec<(MutationTicket, V)> {
        self.dispatched.borrow().clone()
    }

    pub fn calls(&self) -> usize {
        self.dispatched.borrow().len()
    }
}

impl<V: Clone> Default for DeferredMutation<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> MutationCapability for DeferredMutation<V> {
    type Variables = V;

    fn mutate(&self, ticket: MutationTicket, variables: V) -> MutationOutcome {
        self.dispatched.borrow_mut().push((ticket, variables));
        MutationOutcome::Pending
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::query_params::QueryParams;
    use crate::repository::FetchTicket;

    #[derive(Clone, Debug, PartialEq)]
    struct Section {
        name: String,
        kind: String,
    }

    fn sections() -> InMemoryQuery<Section> {
        let rows = (0..25)
            .map(|i| Section {
                name: format!("Section {i}"),
                kind: if i % 2 == 0 { "LOCAL" } else { "REGIONAL" }.to_string(),
            })
            .collect();
        InMemoryQuery::new(
            rows,
            |row: &Section, term| row.name.to_lowercase().contains(term),
            |row: &Section, field| match field {
                "kind" => Some(row.kind.clone()),
                _ => None,
            },
        )
    }

    fn request(params: QueryParams) -> FetchRequest {
        FetchRequest {
            ticket: FetchTicket::new(1),
            params,
        }
    }

    fn ready(outcome: FetchOutcome<Section>) -> PageResult<Section> {
        match outcome {
            FetchOutcome::Ready(Ok(page)) => page,
            other => panic!("expected a ready page, got {other:?}"),
        }
    }

    #[test]
    fn slices_pages() {
        let query = sections();
        let page = ready(query.fetch(request(QueryParams::new().with("page", 2).with("size", 10))));
        assert_eq!(page.content.len(), 5);
        assert_eq!(page.total_elements, 25);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.content[0].name, "Section 20");
    }

    #[test]
    fn applies_search_and_filters() {
        let query = sections();
        let page = ready(query.fetch(request(
            QueryParams::new()
                .with("page", 0)
                .with("size", 10)
                .with("key", "section 1")
                .with("kind", json!(["REGIONAL"])),
        )));
        let names: Vec<_> = page.content.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Section 1", "Section 11", "Section 13", "Section 15", "Section 17", "Section 19"]
        );
    }

    #[test]
    fn fail_next_fails_once() {
        let query = sections();
        query.fail_next(RemoteError::ServerError("boom".to_string()));
        assert!(matches!(
            query.fetch(request(QueryParams::new())),
            FetchOutcome::Ready(Err(RemoteError::ServerError(_)))
        ));
        assert!(matches!(
            query.fetch(request(QueryParams::new())),
            FetchOutcome::Ready(Ok(_))
        ));
        assert_eq!(query.request_count(), 2);
    }

    #[test]
    fn deferred_mutation_records_variables() {
        let mutation = DeferredMutation::<u32>::new();
        assert_eq!(
            mutation.mutate(MutationTicket::new(4), 9),
            MutationOutcome::Pending
        );
        assert_eq!(mutation.dispatched(), vec![(MutationTicket::new(4), 9)]);
    }
}

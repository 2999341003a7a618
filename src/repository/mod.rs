//! Seams to the remote API.
//!
//! List screens never talk to HTTP directly: they go through a
//! [`QueryCapability`] for paged reads and [`MutationCapability`] for writes.
//! Both may answer synchronously ([`FetchOutcome::Ready`]) or leave the
//! request pending and have the host deliver the result later.

use std::rc::Rc;

use crate::domain::page::PageResult;
use crate::domain::query_params::QueryParams;
use crate::repository::errors::{MutationResult, QueryResult};

pub mod errors;
pub mod memory;
#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;
pub mod registry;

/// Generation number identifying one issued fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub const fn new(generation: u64) -> Self {
        Self(generation)
    }

    pub const fn generation(self) -> u64 {
        self.0
    }
}

/// One fetch issued by a query binding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchRequest {
    pub ticket: FetchTicket,
    pub params: QueryParams,
}

#[derive(Debug, PartialEq, Eq)]
pub enum FetchOutcome<T> {
    Ready(QueryResult<PageResult<T>>),
    Pending,
}

/// Paged search over one business entity.
pub trait QueryCapability {
    type Row;

    fn fetch(&self, request: FetchRequest) -> FetchOutcome<Self::Row>;
}

/// Identifies one dispatched mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MutationTicket(u64);

impl MutationTicket {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn id(self) -> u64 {
        self.0
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum MutationOutcome {
    Ready(MutationResult<()>),
    Pending,
}

/// Write operation (create, update, delete, status change).
pub trait MutationCapability {
    type Variables;

    fn mutate(&self, ticket: MutationTicket, variables: Self::Variables) -> MutationOutcome;
}

impl<Q: QueryCapability + ?Sized> QueryCapability for Rc<Q> {
    type Row = Q::Row;

    fn fetch(&self, request: FetchRequest) -> FetchOutcome<Self::Row> {
        (**self).fetch(request)
    }
}

impl<M: MutationCapability + ?Sized> MutationCapability for Rc<M> {
    type Variables = M::Variables;

    fn mutate(&self, ticket: MutationTicket, variables: Self::Variables) -> MutationOutcome {
        (**self).mutate(ticket, variables)
    }
}

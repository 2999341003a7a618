//! Invalidation-by-key for list queries.
//!
//! The registry does not cache results. It only counts invalidations per
//! entity and per exact query key; a binding snapshots the counters when it
//! issues a fetch and refetches once they move.
//!
//! One registry is created by the host and its handle is cloned into every
//! list that should observe the same invalidations. Handles are not `Send`:
//! all lists live on the UI thread.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

use crate::domain::query_params::QueryParams;
use crate::domain::types::EntityName;

/// Entity name plus the serialized parameters of one query.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    entity: EntityName,
    params: String,
}

impl QueryKey {
    pub fn new(entity: &EntityName, params: &QueryParams) -> Self {
        Self {
            entity: entity.clone(),
            params: params.fingerprint(),
        }
    }

    pub fn entity(&self) -> &EntityName {
        &self.entity
    }

    pub fn fingerprint(&self) -> &str {
        &self.params
    }
}

impl Display for QueryKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.entity, self.params)
    }
}

/// Invalidation counters observed for one key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Epoch {
    pub entity: u64,
    pub key: u64,
}

#[derive(Debug, Default)]
struct RegistryState {
    entities: HashMap<EntityName, u64>,
    keys: HashMap<QueryKey, u64>,
}

/// Shared handle to the invalidation counters.
#[derive(Clone, Debug, Default)]
pub struct QueryRegistry {
    state: Rc<RefCell<RegistryState>>,
}

impl QueryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks every query of the entity stale, whatever its parameters.
    pub fn invalidate(&self, entity: &EntityName) -> u64 {
        let mut state = self.state.borrow_mut();
        let epoch = state.entities.entry(entity.clone()).or_default();
        *epoch += 1;
        log::debug!("Invalidated queries of {entity} (epoch {epoch})");
        *epoch
    }

    /// Marks one exact query stale.
    pub fn invalidate_key(&self, key: &QueryKey) -> u64 {
        let mut state = self.state.borrow_mut();
        let epoch = state.keys.entry(key.clone()).or_default();
        *epoch += 1;
        log::debug!("Invalidated query {key} (epoch {epoch})");
        *epoch
    }

    pub fn epoch(&self, key: &QueryKey) -> Epoch {
        let state = self.state.borrow();
        Epoch {
            entity: state.entities.get(key.entity()).copied().unwrap_or_default(),
            key: state.keys.get(key).copied().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(entity: &str, page: u64) -> QueryKey {
        QueryKey::new(
            &EntityName::new(entity).unwrap(),
            &QueryParams::new().with("page", page),
        )
    }

    #[test]
    fn entity_invalidation_touches_every_key_of_the_entity() {
        let registry = QueryRegistry::new();
        let first = key("users", 0);
        let second = key("users", 1);
        let other = key("documents", 0);

        registry.invalidate(first.entity());

        assert_eq!(registry.epoch(&first).entity, 1);
        assert_eq!(registry.epoch(&second).entity, 1);
        assert_eq!(registry.epoch(&other), Epoch::default());
    }

    #[test]
    fn key_invalidation_is_exact() {
        let registry = QueryRegistry::new();
        let first = key("users", 0);
        let second = key("users", 1);

        registry.invalidate_key(&first);

        assert_eq!(registry.epoch(&first).key, 1);
        assert_eq!(registry.epoch(&second).key, 0);
    }

    #[test]
    fn cloned_handles_share_counters() {
        let registry = QueryRegistry::new();
        let handle = registry.clone();
        let users = key("users", 0);

        handle.invalidate(users.entity());

        assert_eq!(registry.epoch(&users).entity, 1);
    }

    #[test]
    fn key_display_composes_entity_and_params() {
        assert_eq!(key("users", 2).to_string(), r#"users{"page":2}"#);
    }
}

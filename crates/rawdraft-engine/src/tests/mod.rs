//! Shared fixtures for unit tests.

use crate::entity::{EntityData, EntityKey, EntityRegistry, EntityStore};
use crate::error::EntityError;
use crate::raw::RawContentState;

/// Parse a `json!` literal into a raw content state.
pub fn raw(value: serde_json::Value) -> RawContentState {
    RawContentState::from_value(value).expect("test fixture should parse")
}

/// Registry that records every `create` call before delegating to a real store.
#[derive(Debug, Default)]
pub struct RecordingRegistry {
    pub store: EntityStore,
    pub calls: Vec<(String, String, EntityData)>,
}

impl EntityRegistry for RecordingRegistry {
    fn create(
        &mut self,
        entity_type: &str,
        mutability: &str,
        data: EntityData,
    ) -> Result<EntityKey, EntityError> {
        self.calls
            .push((entity_type.to_string(), mutability.to_string(), data.clone()));
        self.store.create(entity_type, mutability, data)
    }
}

/// Registry that accepts a fixed number of entities and then fails.
#[derive(Debug, Default)]
pub struct FailingRegistry {
    pub store: EntityStore,
    remaining: usize,
}

impl FailingRegistry {
    pub fn after(successes: usize) -> Self {
        Self {
            store: EntityStore::new(),
            remaining: successes,
        }
    }
}

impl EntityRegistry for FailingRegistry {
    fn create(
        &mut self,
        entity_type: &str,
        mutability: &str,
        data: EntityData,
    ) -> Result<EntityKey, EntityError> {
        if self.remaining == 0 {
            return Err(EntityError::UnsupportedMutability(mutability.to_string()));
        }
        self.remaining -= 1;
        self.store.create(entity_type, mutability, data)
    }
}

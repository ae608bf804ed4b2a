//! Entity metadata and the registry that owns it.
//!
//! Entities (links, mentions, embeds) live once in a registry and blocks refer to
//! them by [`EntityKey`]. The registry is an explicit object handed to the
//! converter, so each document (or test) can own an isolated instance.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::EnumString;

use crate::error::EntityError;

/// Free-form entity payload, e.g. `{"url": "http://x"}`.
pub type EntityData = serde_json::Map<String, serde_json::Value>;

/// Registry-local entity identifier, displayed as decimal text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityKey(u64);

impl EntityKey {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the text covered by an entity may be edited.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Mutability {
    /// Text may be edited freely; the entity stays attached.
    Mutable,
    /// Any edit removes the entity from the whole range.
    Immutable,
    /// Edits remove the affected segment only.
    Segmented,
}

impl Mutability {
    /// Parse from the serialized label.
    pub fn parse(s: &str) -> Result<Self, EntityError> {
        <Self as FromStr>::from_str(s).map_err(|_| EntityError::UnsupportedMutability(s.to_string()))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mutability::Mutable => "MUTABLE",
            Mutability::Immutable => "IMMUTABLE",
            Mutability::Segmented => "SEGMENTED",
        }
    }
}

impl fmt::Display for Mutability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityInstance {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub mutability: Mutability,
    pub data: EntityData,
}

impl EntityInstance {
    pub fn new(entity_type: impl Into<String>, mutability: Mutability, data: EntityData) -> Self {
        Self {
            entity_type: entity_type.into(),
            mutability,
            data,
        }
    }
}

/// Write side of an entity registry, as used during conversion.
pub trait EntityRegistry {
    /// Register a new entity and return its fresh key.
    ///
    /// Labels arrive unvalidated from the raw input; implementations reject what
    /// they cannot store.
    fn create(
        &mut self,
        entity_type: &str,
        mutability: &str,
        data: EntityData,
    ) -> Result<EntityKey, EntityError>;
}

impl<R: EntityRegistry + ?Sized> EntityRegistry for &mut R {
    fn create(
        &mut self,
        entity_type: &str,
        mutability: &str,
        data: EntityData,
    ) -> Result<EntityKey, EntityError> {
        (**self).create(entity_type, mutability, data)
    }
}

/// In-memory entity registry. Keys are minted from 1 upwards and never reused.
#[derive(Debug, Default, Clone)]
pub struct EntityStore {
    instances: BTreeMap<EntityKey, EntityInstance>,
    last_key: u64,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an already validated instance under a fresh key.
    pub fn add(&mut self, instance: EntityInstance) -> EntityKey {
        self.last_key += 1;
        let key = EntityKey(self.last_key);
        self.instances.insert(key, instance);
        key
    }

    pub fn get(&self, key: EntityKey) -> Result<&EntityInstance, EntityError> {
        self.instances.get(&key).ok_or(EntityError::NotFound(key))
    }

    /// Shallow-merge `data` into the entity's existing data, overwriting shared keys.
    pub fn merge_data(
        &mut self,
        key: EntityKey,
        data: EntityData,
    ) -> Result<&EntityInstance, EntityError> {
        let instance = self
            .instances
            .get_mut(&key)
            .ok_or(EntityError::NotFound(key))?;
        instance.data.extend(data);
        Ok(instance)
    }

    /// Replace the entity's data wholesale.
    pub fn replace_data(
        &mut self,
        key: EntityKey,
        data: EntityData,
    ) -> Result<&EntityInstance, EntityError> {
        let instance = self
            .instances
            .get_mut(&key)
            .ok_or(EntityError::NotFound(key))?;
        instance.data = data;
        Ok(instance)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityKey, &EntityInstance)> {
        self.instances.iter().map(|(key, instance)| (*key, instance))
    }
}

impl EntityRegistry for EntityStore {
    fn create(
        &mut self,
        entity_type: &str,
        mutability: &str,
        data: EntityData,
    ) -> Result<EntityKey, EntityError> {
        if entity_type.is_empty() {
            return Err(EntityError::EmptyType);
        }
        let mutability = Mutability::parse(mutability)?;
        Ok(self.add(EntityInstance::new(entity_type, mutability, data)))
    }
}

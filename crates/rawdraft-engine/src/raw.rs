//! Typed schema for the raw serialized content state.
//!
//! Optional fields may be absent or `null`. Unknown fields are ignored. A field
//! present with the wrong JSON type is a [`ParseError`], never silently defaulted.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::entity::EntityData;
use crate::error::ParseError;

/// A serialized document: ordered blocks plus the entities they reference.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawContentState {
    pub blocks: Vec<RawBlock>,
    pub entity_map: BTreeMap<String, RawEntity>,
}

impl RawContentState {
    pub fn from_json_str(json: &str) -> Result<Self, ParseError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, ParseError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, ParseError> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ParseError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Read and parse a raw content file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ParseError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_slice(&bytes)
    }
}

/// An entity as stored in the raw entity map.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawEntity {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub mutability: String,
    #[serde(default)]
    pub data: Option<EntityData>,
}

/// A block as stored in the raw content state, before defaulting.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBlock {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: String,
    #[serde(default)]
    pub depth: Option<usize>,
    #[serde(default)]
    pub inline_style_ranges: Option<Vec<StyleRange>>,
    #[serde(default)]
    pub entity_ranges: Option<Vec<EntityRange>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StyleRange {
    pub offset: usize,
    pub length: usize,
    pub style: String,
}

/// An entity range whose key still refers to the raw entity map.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EntityRange {
    pub offset: usize,
    pub length: usize,
    pub key: StorageKey,
}

/// Key of an entry in the raw entity map.
///
/// Serializers emit range keys either as strings or as integers while the map
/// itself is always keyed by strings, so both spellings normalize to text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(from = "StorageKeyRepr")]
pub struct StorageKey(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum StorageKeyRepr {
    Text(String),
    Index(u64),
}

impl From<StorageKeyRepr> for StorageKey {
    fn from(repr: StorageKeyRepr) -> Self {
        match repr {
            StorageKeyRepr::Text(s) => StorageKey(s),
            StorageKeyRepr::Index(n) => StorageKey(n.to_string()),
        }
    }
}

impl StorageKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StorageKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

use std::collections::BTreeSet;

use serde::Serialize;

use crate::entity::EntityKey;
use crate::error::DecodeError;

/// Set of inline style labels active on one character (e.g. `BOLD`, `ITALIC`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct StyleSet(BTreeSet<String>);

impl StyleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, style: impl Into<String>) -> bool {
        self.0.insert(style.into())
    }

    pub fn contains(&self, style: &str) -> bool {
        self.0.contains(style)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for StyleSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Decoded metadata for a single character of block text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CharacterMetadata {
    pub style: StyleSet,
    pub entity: Option<EntityKey>,
}

impl CharacterMetadata {
    pub fn new(style: StyleSet, entity: Option<EntityKey>) -> Self {
        Self { style, entity }
    }
}

/// Zip per-character styles and entities into the annotation sequence.
pub fn build_annotations(
    styles: Vec<StyleSet>,
    entities: Vec<Option<EntityKey>>,
) -> Result<Vec<CharacterMetadata>, DecodeError> {
    if styles.len() != entities.len() {
        return Err(DecodeError::LengthMismatch {
            styles: styles.len(),
            entities: entities.len(),
        });
    }

    Ok(styles
        .into_iter()
        .zip(entities)
        .map(|(style, entity)| CharacterMetadata::new(style, entity))
        .collect())
}

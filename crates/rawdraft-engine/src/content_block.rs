use std::fmt;
use std::ops::Range;

use serde::Serialize;

use crate::annotation::{CharacterMetadata, StyleSet};
use crate::entity::EntityKey;

/// Document-unique block identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct BlockKey(String);

impl BlockKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A maximal run of consecutive characters carrying the same entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntityRun {
    pub start: usize,
    pub end: usize,
    pub key: EntityKey,
}

/// Immutable unit of document structure: text plus one annotation per character.
///
/// Character offsets used by the accessors count `char`s, matching the
/// annotation sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentBlock {
    key: BlockKey,
    #[serde(rename = "type")]
    block_type: String,
    text: String,
    depth: usize,
    characters: Vec<CharacterMetadata>,
}

impl ContentBlock {
    pub fn new(
        key: BlockKey,
        block_type: impl Into<String>,
        text: impl Into<String>,
        depth: usize,
        characters: Vec<CharacterMetadata>,
    ) -> Self {
        let text = text.into();
        debug_assert_eq!(
            text.chars().count(),
            characters.len(),
            "annotation sequence must align with text"
        );
        Self {
            key,
            block_type: block_type.into(),
            text,
            depth,
            characters,
        }
    }

    pub fn key(&self) -> &BlockKey {
        &self.key
    }

    pub fn block_type(&self) -> &str {
        &self.block_type
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn characters(&self) -> &[CharacterMetadata] {
        &self.characters
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    pub fn inline_style_at(&self, offset: usize) -> Option<&StyleSet> {
        self.characters.get(offset).map(|c| &c.style)
    }

    pub fn entity_at(&self, offset: usize) -> Option<EntityKey> {
        self.characters.get(offset).and_then(|c| c.entity)
    }

    pub fn find_entity_ranges(&self) -> Vec<EntityRun> {
        let mut runs: Vec<EntityRun> = Vec::new();
        for (offset, c) in self.characters.iter().enumerate() {
            let Some(key) = c.entity else { continue };
            match runs.last_mut() {
                Some(run) if run.key == key && run.end == offset => run.end += 1,
                _ => runs.push(EntityRun {
                    start: offset,
                    end: offset + 1,
                    key,
                }),
            }
        }
        runs
    }

    /// Character ranges on which `style` is active.
    pub fn find_style_ranges(&self, style: &str) -> Vec<Range<usize>> {
        let mut ranges: Vec<Range<usize>> = Vec::new();
        for (offset, c) in self.characters.iter().enumerate() {
            if !c.style.contains(style) {
                continue;
            }
            match ranges.last_mut() {
                Some(range) if range.end == offset => range.end += 1,
                _ => ranges.push(offset..offset + 1),
            }
        }
        ranges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn meta(styles: &[&str], entity: Option<u64>) -> CharacterMetadata {
        CharacterMetadata::new(
            styles.iter().copied().collect(),
            entity.map(EntityKey::new),
        )
    }

    fn sample() -> ContentBlock {
        ContentBlock::new(
            BlockKey::new("abc"),
            "unstyled",
            "hello",
            1,
            vec![
                meta(&["BOLD"], Some(1)),
                meta(&["BOLD"], Some(1)),
                meta(&[], Some(2)),
                meta(&["BOLD"], None),
                meta(&[], Some(1)),
            ],
        )
    }

    #[test]
    fn test_accessors() {
        let block = sample();

        assert_eq!(block.key().as_str(), "abc");
        assert_eq!(block.block_type(), "unstyled");
        assert_eq!(block.text(), "hello");
        assert_eq!(block.depth(), 1);
        assert_eq!(block.len(), 5);
        assert!(!block.is_empty());
    }

    #[test]
    fn test_lookup_by_offset() {
        let block = sample();

        assert!(block.inline_style_at(0).unwrap().contains("BOLD"));
        assert_eq!(block.entity_at(2), Some(EntityKey::new(2)));
        assert_eq!(block.entity_at(3), None);
        assert_eq!(block.entity_at(99), None);
        assert_eq!(block.inline_style_at(99), None);
    }

    #[test]
    fn test_find_entity_ranges_splits_runs() {
        let block = sample();

        assert_eq!(
            block.find_entity_ranges(),
            vec![
                EntityRun {
                    start: 0,
                    end: 2,
                    key: EntityKey::new(1)
                },
                EntityRun {
                    start: 2,
                    end: 3,
                    key: EntityKey::new(2)
                },
                EntityRun {
                    start: 4,
                    end: 5,
                    key: EntityKey::new(1)
                },
            ]
        );
    }

    #[test]
    fn test_find_style_ranges() {
        let block = sample();

        assert_eq!(block.find_style_ranges("BOLD"), vec![0..2, 3..4]);
        assert!(block.find_style_ranges("ITALIC").is_empty());
    }
}

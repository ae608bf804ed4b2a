//! # Raw → block conversion
//!
//! The conversion runs in two passes:
//!
//! - **Entity remapping**: every `(storage key, entity)` pair of the raw entity
//!   map is registered once, producing an [`EntityKeyMap`]. Entities that look
//!   identical under different storage keys stay distinct.
//! - **Block assembly**: each raw block is first normalized into a fully
//!   populated [`NormalizedBlock`], then its entity ranges are filtered against
//!   and rewritten through the key map, and finally both range lists are decoded
//!   into the block's annotation sequence.
//!
//! Entity ranges that reference a storage key missing from the entity map are
//! dropped. Any registry or decode failure aborts the whole conversion; entities
//! registered before the failure remain in the registry.

use std::collections::{BTreeMap, HashMap};

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::annotation::build_annotations;
use crate::block_key::BlockKeyGenerator;
use crate::content_block::{BlockKey, ContentBlock};
use crate::decode::{LocalEntityRange, OverlapPolicy, decode_entity_ranges, decode_inline_style_ranges};
use crate::entity::{EntityKey, EntityRegistry};
use crate::error::{ConvertError, EntityError};
use crate::raw::{EntityRange, RawBlock, RawContentState, RawEntity, StorageKey, StyleRange};

/// Tunables for a conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertOptions {
    pub entity_overlap: OverlapPolicy,
}

/// Mapping from raw storage keys to freshly registered entity keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityKeyMap(HashMap<StorageKey, EntityKey>);

impl EntityKeyMap {
    pub fn get(&self, key: &StorageKey) -> Option<EntityKey> {
        self.0.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StorageKey, EntityKey)> {
        self.0.iter().map(|(storage, key)| (storage, *key))
    }
}

/// Register every raw entity and record where each storage key now lives.
pub fn remap_entities<R: EntityRegistry + ?Sized>(
    entity_map: BTreeMap<String, RawEntity>,
    registry: &mut R,
) -> Result<EntityKeyMap, EntityError> {
    let mut map = HashMap::with_capacity(entity_map.len());
    for (storage_key, entity) in entity_map {
        let key = registry.create(
            &entity.entity_type,
            &entity.mutability,
            entity.data.unwrap_or_default(),
        )?;
        trace!("entity {storage_key} registered as {key}");
        map.insert(StorageKey::new(storage_key), key);
    }
    Ok(EntityKeyMap(map))
}

/// A raw block with every default applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedBlock {
    pub key: BlockKey,
    pub block_type: String,
    pub text: String,
    pub depth: usize,
    pub inline_style_ranges: Vec<StyleRange>,
    pub entity_ranges: Vec<EntityRange>,
}

/// Fill in missing fields. An empty key counts as missing.
pub fn normalize_block<G: BlockKeyGenerator + ?Sized>(block: RawBlock, keys: &mut G) -> NormalizedBlock {
    let key = match block.key {
        Some(key) if !key.is_empty() => BlockKey::new(key),
        _ => keys.generate(),
    };

    NormalizedBlock {
        key,
        block_type: block.block_type,
        text: block.text,
        depth: block.depth.unwrap_or(0),
        inline_style_ranges: block.inline_style_ranges.unwrap_or_default(),
        entity_ranges: block.entity_ranges.unwrap_or_default(),
    }
}

/// Keep the ranges whose storage key was registered, rewriting them to registry keys.
///
/// Offsets, lengths and relative order are preserved.
pub fn rewrite_entity_ranges(
    block_key: &BlockKey,
    ranges: &[EntityRange],
    key_map: &EntityKeyMap,
) -> Vec<LocalEntityRange> {
    ranges
        .iter()
        .filter_map(|range| match key_map.get(&range.key) {
            Some(key) => Some(LocalEntityRange {
                offset: range.offset,
                length: range.length,
                key,
            }),
            None => {
                debug!(
                    "block {block_key}: dropping range at {} referencing unknown entity {}",
                    range.offset, range.key
                );
                None
            }
        })
        .collect()
}

/// Decode one normalized block into its record.
pub fn assemble_block(
    block: NormalizedBlock,
    key_map: &EntityKeyMap,
    options: ConvertOptions,
) -> Result<ContentBlock, ConvertError> {
    let decode_failed = |source| ConvertError::Decode {
        block_key: block.key.clone(),
        source,
    };

    let styles =
        decode_inline_style_ranges(&block.text, &block.inline_style_ranges).map_err(decode_failed)?;
    let entity_ranges = rewrite_entity_ranges(&block.key, &block.entity_ranges, key_map);
    let entities = decode_entity_ranges(&block.text, &entity_ranges, options.entity_overlap)
        .map_err(decode_failed)?;
    let characters = build_annotations(styles, entities).map_err(decode_failed)?;

    trace!(
        "block {} assembled: {} chars, {} entity ranges",
        block.key,
        characters.len(),
        entity_ranges.len()
    );

    Ok(ContentBlock::new(
        block.key,
        block.block_type,
        block.text,
        block.depth,
        characters,
    ))
}

/// Converts raw content states using a registry and key generator it holds.
pub struct Converter<R, G> {
    registry: R,
    keys: G,
    options: ConvertOptions,
}

impl<R: EntityRegistry, G: BlockKeyGenerator> Converter<R, G> {
    pub fn new(registry: R, keys: G) -> Self {
        Self {
            registry,
            keys,
            options: ConvertOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ConvertOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> ConvertOptions {
        self.options
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn into_parts(self) -> (R, G) {
        (self.registry, self.keys)
    }

    /// Convert a raw content state into ordered block records.
    ///
    /// Caller-supplied block keys are reserved with the generator before any key
    /// is generated.
    pub fn convert(&mut self, raw: RawContentState) -> Result<Vec<ContentBlock>, ConvertError> {
        let RawContentState { blocks, entity_map } = raw;
        debug!(
            "converting {} blocks referencing {} entities",
            blocks.len(),
            entity_map.len()
        );

        let key_map = remap_entities(entity_map, &mut self.registry)?;

        for key in blocks.iter().filter_map(|b| b.key.as_deref()) {
            if !key.is_empty() {
                self.keys.reserve(key);
            }
        }

        let options = self.options;
        blocks
            .into_iter()
            .map(|block| assemble_block(normalize_block(block, &mut self.keys), &key_map, options))
            .collect()
    }
}

/// Convert with default options.
pub fn convert_from_raw<R, G>(
    raw: RawContentState,
    registry: &mut R,
    keys: &mut G,
) -> Result<Vec<ContentBlock>, ConvertError>
where
    R: EntityRegistry + ?Sized,
    G: BlockKeyGenerator + ?Sized,
{
    Converter::new(registry, keys).convert(raw)
}

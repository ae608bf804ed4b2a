//! # rawdraft engine
//!
//! Turns a raw, serialized rich-text document (blocks plus a shared entity map)
//! into the immutable [`ContentBlock`] records an editor works with.
//!
//! ## Pipeline
//!
//! 1. **Parse**: [`RawContentState`] is deserialized from JSON. Field-type
//!    mismatches fail fast; optional fields default.
//! 2. **Remap entities**: every entry of the entity map is registered exactly once
//!    with an [`EntityRegistry`], yielding a storage-key to local-key table.
//! 3. **Assemble blocks**: each raw block is normalized (key, depth, range lists),
//!    its entity ranges are filtered and rewritten, the style and entity ranges are
//!    decoded per character, and the result is frozen into a [`ContentBlock`].
//!
//! ## Usage Pattern
//!
//! ```rust
//! use rawdraft_engine::{EntityStore, RandomKeyGenerator, RawContentState, convert_from_raw};
//!
//! let raw = RawContentState::from_json_str(
//!     r#"{"blocks":[{"type":"unstyled","text":"hi"}],"entityMap":{}}"#,
//! )
//! .unwrap();
//! let mut registry = EntityStore::new();
//! let mut keys = RandomKeyGenerator::new();
//!
//! let blocks = convert_from_raw(raw, &mut registry, &mut keys).unwrap();
//! assert_eq!(blocks[0].text(), "hi");
//! ```

pub mod annotation;
pub mod block_key;
pub mod content_block;
pub mod convert;
pub mod decode;
pub mod entity;
pub mod error;
pub mod raw;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use annotation::{CharacterMetadata, StyleSet, build_annotations};
pub use block_key::{BlockKeyGenerator, RandomKeyGenerator, SequentialKeyGenerator};
pub use content_block::{BlockKey, ContentBlock, EntityRun};
pub use convert::{
    ConvertOptions, Converter, EntityKeyMap, NormalizedBlock, assemble_block, convert_from_raw,
    normalize_block, remap_entities, rewrite_entity_ranges,
};
pub use decode::{LocalEntityRange, OverlapPolicy, decode_entity_ranges, decode_inline_style_ranges};
pub use entity::{EntityData, EntityInstance, EntityKey, EntityRegistry, EntityStore, Mutability};
pub use error::{ConvertError, DecodeError, EntityError, ParseError};
pub use raw::{EntityRange, RawBlock, RawContentState, RawEntity, StorageKey, StyleRange};

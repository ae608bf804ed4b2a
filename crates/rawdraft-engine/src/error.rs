use std::path::PathBuf;

use crate::content_block::BlockKey;
use crate::entity::EntityKey;

/// Failure to read a raw content state into the typed schema.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Invalid raw content: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to read raw content from {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Failure reported by an entity registry.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EntityError {
    #[error("Entity type must not be empty")]
    EmptyType,
    #[error("Unsupported entity mutability: {0}")]
    UnsupportedMutability(String),
    #[error("Unknown entity key: {0}")]
    NotFound(EntityKey),
}

/// Failure while expanding ranges into per-character assignments.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Range at offset {offset} with length {length} exceeds text of {text_len} characters")]
    RangeOutOfBounds {
        offset: usize,
        length: usize,
        text_len: usize,
    },
    #[error("Entity ranges overlap at character {offset}")]
    OverlappingEntities { offset: usize },
    #[error("Style sequence has {styles} entries but entity sequence has {entities}")]
    LengthMismatch { styles: usize, entities: usize },
}

/// Failure of a whole conversion. Registry insertions made before the failure stay in place.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("Entity registration failed: {0}")]
    Entity(#[from] EntityError),
    #[error("Block {block_key}: {source}")]
    Decode {
        block_key: BlockKey,
        source: DecodeError,
    },
}

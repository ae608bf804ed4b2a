use anyhow::Result;
use rawdraft_config::{BlockKeyStyle, ConversionConfig};
use rawdraft_engine::{
    BlockKeyGenerator, ContentBlock, Converter, EntityKey, EntityStore, RandomKeyGenerator,
    RawContentState, SequentialKeyGenerator,
};
use std::path::Path;

/// A converted document together with the registry holding its entities.
pub struct LoadedDocument {
    pub blocks: Vec<ContentBlock>,
    pub registry: EntityStore,
}

impl LoadedDocument {
    pub fn load(path: &Path, settings: ConversionConfig) -> Result<Self> {
        let raw = RawContentState::from_path(path)?;
        Self::from_raw(raw, settings)
    }

    pub fn from_raw(raw: RawContentState, settings: ConversionConfig) -> Result<Self> {
        let mut keys: Box<dyn BlockKeyGenerator> = match settings.block_keys {
            BlockKeyStyle::Random => Box::new(RandomKeyGenerator::new()),
            BlockKeyStyle::Sequential => Box::new(SequentialKeyGenerator::new()),
        };

        let mut converter =
            Converter::new(EntityStore::new(), keys.as_mut()).with_options(settings.options());
        let blocks = converter.convert(raw)?;
        let (registry, _) = converter.into_parts();

        log::info!(
            "Converted {} blocks with {} entities",
            blocks.len(),
            registry.len()
        );
        Ok(Self { blocks, registry })
    }

    fn entity_label(&self, key: EntityKey) -> String {
        match self.registry.get(key) {
            Ok(instance) => format!("{}#{key}", instance.entity_type),
            Err(_) => format!("?#{key}"),
        }
    }

    /// One summary line per block, followed by the registry size.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .blocks
            .iter()
            .map(|block| {
                let entities = block
                    .find_entity_ranges()
                    .iter()
                    .map(|run| format!("{}..{}={}", run.start, run.end, self.entity_label(run.key)))
                    .collect::<Vec<_>>();
                let mut line = format!(
                    "[{}] {} (depth {}): {}",
                    block.key(),
                    block.block_type(),
                    block.depth(),
                    block.text()
                );
                if !entities.is_empty() {
                    line.push_str(&format!("  {{{}}}", entities.join(", ")));
                }
                line
            })
            .collect();
        lines.push(format!("{} entities registered", self.registry.len()));
        lines
    }

    /// Per-character annotation listing for one block.
    pub fn annotation_lines(&self, block: &ContentBlock) -> Vec<String> {
        let mut lines = vec![
            format!("{} [{}] depth {}", block.block_type(), block.key(), block.depth()),
            block.text().to_string(),
            String::new(),
        ];

        for (offset, (ch, meta)) in block.text().chars().zip(block.characters()).enumerate() {
            let styles = meta.style.iter().collect::<Vec<_>>().join(",");
            let entity = meta
                .entity
                .map(|key| self.entity_label(key))
                .unwrap_or_else(|| "-".to_string());
            lines.push(format!("{offset:>4} {ch:?} [{styles}] {entity}"));
        }

        lines
    }
}

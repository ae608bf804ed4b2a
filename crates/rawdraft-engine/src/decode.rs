//! Expansion of offset/length ranges into per-character assignments.
//!
//! Offsets and lengths count Unicode scalar values (`char`s) of the block text.
//! Every returned vector has exactly one entry per character.

use serde::{Deserialize, Serialize};

use crate::annotation::StyleSet;
use crate::entity::EntityKey;
use crate::error::DecodeError;
use crate::raw::StyleRange;

/// An entity range whose key has been rewritten to a registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalEntityRange {
    pub offset: usize,
    pub length: usize,
    pub key: EntityKey,
}

/// Which entity a character keeps when several entity ranges cover it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlapPolicy {
    /// The earliest range in input order keeps the character.
    FirstWins,
    /// Each range overwrites what earlier ranges assigned.
    #[default]
    LastWins,
    /// Overlapping entity ranges fail the decode.
    Reject,
}

fn checked_span(
    offset: usize,
    length: usize,
    text_len: usize,
) -> Result<std::ops::Range<usize>, DecodeError> {
    match offset.checked_add(length) {
        Some(end) if end <= text_len => Ok(offset..end),
        _ => Err(DecodeError::RangeOutOfBounds {
            offset,
            length,
            text_len,
        }),
    }
}

/// Expand style ranges into the set of styles active on each character.
///
/// Styles from overlapping ranges accumulate.
pub fn decode_inline_style_ranges(
    text: &str,
    ranges: &[StyleRange],
) -> Result<Vec<StyleSet>, DecodeError> {
    let text_len = text.chars().count();
    let mut styles = vec![StyleSet::new(); text_len];

    for range in ranges {
        for slot in &mut styles[checked_span(range.offset, range.length, text_len)?] {
            slot.insert(range.style.as_str());
        }
    }

    Ok(styles)
}

/// Expand entity ranges into the entity (if any) on each character.
pub fn decode_entity_ranges(
    text: &str,
    ranges: &[LocalEntityRange],
    policy: OverlapPolicy,
) -> Result<Vec<Option<EntityKey>>, DecodeError> {
    let text_len = text.chars().count();
    let mut entities: Vec<Option<EntityKey>> = vec![None; text_len];

    for range in ranges {
        let span = checked_span(range.offset, range.length, text_len)?;
        let start = span.start;
        for (i, slot) in entities[span].iter_mut().enumerate() {
            match (policy, slot.is_some()) {
                (OverlapPolicy::Reject, true) => {
                    return Err(DecodeError::OverlappingEntities { offset: start + i });
                }
                (OverlapPolicy::FirstWins, true) => {}
                _ => *slot = Some(range.key),
            }
        }
    }

    Ok(entities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn style(offset: usize, length: usize, style: &str) -> StyleRange {
        StyleRange {
            offset,
            length,
            style: style.to_string(),
        }
    }

    fn entity(offset: usize, length: usize, key: u64) -> LocalEntityRange {
        LocalEntityRange {
            offset,
            length,
            key: EntityKey::new(key),
        }
    }

    fn set(labels: &[&str]) -> StyleSet {
        labels.iter().copied().collect()
    }

    #[test]
    fn test_styles_without_ranges_are_empty() {
        let styles = decode_inline_style_ranges("abc", &[]).unwrap();

        assert_eq!(styles, vec![StyleSet::new(); 3]);
    }

    #[test]
    fn test_styles_accumulate_on_overlap() {
        let styles =
            decode_inline_style_ranges("abcd", &[style(0, 3, "BOLD"), style(2, 2, "ITALIC")])
                .unwrap();

        assert_eq!(
            styles,
            vec![
                set(&["BOLD"]),
                set(&["BOLD"]),
                set(&["BOLD", "ITALIC"]),
                set(&["ITALIC"]),
            ]
        );
    }

    #[test]
    fn test_styles_count_chars_not_bytes() {
        let styles = decode_inline_style_ranges("héllo", &[style(1, 4, "CODE")]).unwrap();

        assert_eq!(styles.len(), 5);
        assert!(styles[0].is_empty());
        assert!(styles[4].contains("CODE"));
    }

    #[test]
    fn test_zero_length_range_is_noop() {
        let styles = decode_inline_style_ranges("ab", &[style(2, 0, "BOLD")]).unwrap();

        assert_eq!(styles, vec![StyleSet::new(); 2]);
    }

    #[rstest]
    #[case(0, 4)]
    #[case(3, 1)]
    #[case(usize::MAX, 2)]
    fn test_style_range_out_of_bounds(#[case] offset: usize, #[case] length: usize) {
        let result = decode_inline_style_ranges("abc", &[style(offset, length, "BOLD")]);

        assert_eq!(
            result,
            Err(DecodeError::RangeOutOfBounds {
                offset,
                length,
                text_len: 3
            })
        );
    }

    #[test]
    fn test_entities_fill_range() {
        let entities = decode_entity_ranges("abcd", &[entity(1, 2, 5)], OverlapPolicy::LastWins)
            .unwrap();

        let k = Some(EntityKey::new(5));
        assert_eq!(entities, vec![None, k, k, None]);
    }

    #[rstest]
    #[case(OverlapPolicy::LastWins, [Some(1), Some(2), Some(2), Some(2)])]
    #[case(OverlapPolicy::FirstWins, [Some(1), Some(1), Some(1), Some(2)])]
    fn test_entity_overlap_policy(#[case] policy: OverlapPolicy, #[case] expected: [Option<u64>; 4]) {
        let entities =
            decode_entity_ranges("abcd", &[entity(0, 3, 1), entity(1, 3, 2)], policy).unwrap();

        let expected: Vec<_> = expected.into_iter().map(|k| k.map(EntityKey::new)).collect();
        assert_eq!(entities, expected);
    }

    #[test]
    fn test_entity_overlap_rejected() {
        let result = decode_entity_ranges(
            "abcd",
            &[entity(0, 3, 1), entity(2, 2, 2)],
            OverlapPolicy::Reject,
        );

        assert_eq!(result, Err(DecodeError::OverlappingEntities { offset: 2 }));
    }

    #[test]
    fn test_adjacent_entities_do_not_overlap() {
        let entities = decode_entity_ranges(
            "abcd",
            &[entity(0, 2, 1), entity(2, 2, 2)],
            OverlapPolicy::Reject,
        )
        .unwrap();

        assert_eq!(entities[1], Some(EntityKey::new(1)));
        assert_eq!(entities[2], Some(EntityKey::new(2)));
    }

    #[test]
    fn test_entity_range_out_of_bounds() {
        let result = decode_entity_ranges("ab", &[entity(1, 2, 1)], OverlapPolicy::LastWins);

        assert_eq!(
            result,
            Err(DecodeError::RangeOutOfBounds {
                offset: 1,
                length: 2,
                text_len: 2
            })
        );
    }

    #[test]
    fn test_empty_text() {
        assert!(decode_inline_style_ranges("", &[]).unwrap().is_empty());
        assert!(
            decode_entity_ranges("", &[], OverlapPolicy::LastWins)
                .unwrap()
                .is_empty()
        );
    }
}

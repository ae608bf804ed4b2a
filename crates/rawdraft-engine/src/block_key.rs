//! Block key generation.
//!
//! Generators remember every key they hand out or are told about via
//! [`BlockKeyGenerator::reserve`], so keys drawn from one generator never repeat.

use std::collections::HashSet;

use crate::content_block::BlockKey;

/// Random keys are drawn below this bound and rendered in base 32.
const KEY_SPACE: u128 = 1 << 24;

pub trait BlockKeyGenerator {
    /// Return a key not previously generated or reserved.
    fn generate(&mut self) -> BlockKey;

    /// Mark a caller-supplied key as taken.
    fn reserve(&mut self, _key: &str) {}
}

impl<G: BlockKeyGenerator + ?Sized> BlockKeyGenerator for &mut G {
    fn generate(&mut self) -> BlockKey {
        (**self).generate()
    }

    fn reserve(&mut self, key: &str) {
        (**self).reserve(key)
    }
}

/// Short random keys such as `"3fa1k"`.
///
/// Purely numeric keys are never produced so a key cannot be mistaken for an index.
#[derive(Debug, Default)]
pub struct RandomKeyGenerator {
    seen: HashSet<String>,
}

impl RandomKeyGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlockKeyGenerator for RandomKeyGenerator {
    fn generate(&mut self) -> BlockKey {
        loop {
            let key = to_base32(uuid::Uuid::new_v4().as_u128() % KEY_SPACE);
            if key.bytes().all(|b| b.is_ascii_digit()) || self.seen.contains(&key) {
                continue;
            }
            self.seen.insert(key.clone());
            return BlockKey::new(key);
        }
    }

    fn reserve(&mut self, key: &str) {
        self.seen.insert(key.to_string());
    }
}

fn to_base32(mut n: u128) -> String {
    let mut digits = Vec::new();
    loop {
        // n % 32 always fits a base-32 digit
        digits.push(char::from_digit((n % 32) as u32, 32).unwrap_or('0'));
        n /= 32;
        if n == 0 {
            break;
        }
    }
    digits.iter().rev().collect()
}

/// Deterministic keys `b0`, `b1`, ... for reproducible output.
#[derive(Debug, Default)]
pub struct SequentialKeyGenerator {
    next: usize,
    reserved: HashSet<String>,
}

impl SequentialKeyGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlockKeyGenerator for SequentialKeyGenerator {
    fn generate(&mut self) -> BlockKey {
        loop {
            let key = format!("b{}", self.next);
            self.next += 1;
            if self.reserved.insert(key.clone()) {
                return BlockKey::new(key);
            }
        }
    }

    fn reserve(&mut self, key: &str) {
        self.reserved.insert(key.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(0, "0")]
    #[case(31, "v")]
    #[case(32, "10")]
    #[case((1 << 24) - 1, "fvvvv")]
    fn test_to_base32(#[case] n: u128, #[case] expected: &str) {
        assert_eq!(to_base32(n), expected);
    }

    #[test]
    fn test_random_keys_are_unique_and_short() {
        let mut keys = RandomKeyGenerator::new();

        let generated: HashSet<BlockKey> = (0..1000).map(|_| keys.generate()).collect();

        assert_eq!(generated.len(), 1000);
        for key in &generated {
            assert!(!key.as_str().is_empty());
            assert!(key.as_str().len() <= 5);
            assert!(!key.as_str().bytes().all(|b| b.is_ascii_digit()));
        }
    }

    #[test]
    fn test_sequential_keys() {
        let mut keys = SequentialKeyGenerator::new();

        assert_eq!(keys.generate().as_str(), "b0");
        assert_eq!(keys.generate().as_str(), "b1");
    }

    #[test]
    fn test_sequential_skips_reserved() {
        let mut keys = SequentialKeyGenerator::new();
        keys.reserve("b0");
        keys.reserve("b2");

        assert_eq!(keys.generate().as_str(), "b1");
        assert_eq!(keys.generate().as_str(), "b3");
    }
}

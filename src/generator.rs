//! Random password generation.
//!
//! Passwords are drawn from the visible ASCII range `!` (0x21) through
//! `~` (0x7E) with a length picked uniformly from a configured range.

use rand::Rng;

use crate::errors::{PassHeroError, Result};

/// Smallest minimum length a generator may be configured with.
pub const ABSOLUTE_MIN_CHARS: usize = 15;

/// Largest maximum length a generator may be configured with.
pub const ABSOLUTE_MAX_CHARS: usize = 100;

/// First printable, non-space ASCII character.
const ASCII_MIN: u8 = b'!';

/// Last printable ASCII character.
const ASCII_MAX: u8 = b'~';

/// Generates printable ASCII passwords of random length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordGenerator {
    min_length: usize,
    max_length: usize,
}

impl PasswordGenerator {
    /// Build a generator producing passwords of `min_length..=max_length`
    /// characters.
    ///
    /// Requires `ABSOLUTE_MIN_CHARS <= min_length < max_length <= ABSOLUTE_MAX_CHARS`.
    pub fn new(min_length: usize, max_length: usize) -> Result<Self> {
        if min_length >= max_length {
            return Err(PassHeroError::InvalidConfiguration(format!(
                "min_length ({min_length}) must be less than max_length ({max_length})"
            )));
        }
        if min_length < ABSOLUTE_MIN_CHARS {
            return Err(PassHeroError::InvalidConfiguration(format!(
                "min_length must be at least {ABSOLUTE_MIN_CHARS} (got {min_length})"
            )));
        }
        if max_length > ABSOLUTE_MAX_CHARS {
            return Err(PassHeroError::InvalidConfiguration(format!(
                "max_length must be at most {ABSOLUTE_MAX_CHARS} (got {max_length})"
            )));
        }

        Ok(Self {
            min_length,
            max_length,
        })
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Generate a fresh password.
    ///
    /// `rand::rng()` is a ChaCha-based CSPRNG seeded from the OS.
    pub fn generate(&self) -> String {
        let mut rng = rand::rng();
        let length = rng.random_range(self.min_length..=self.max_length);

        (0..length)
            .map(|_| char::from(rng.random_range(ASCII_MIN..=ASCII_MAX)))
            .collect()
    }
}

impl Default for PasswordGenerator {
    /// 20 to 30 characters.
    fn default() -> Self {
        Self {
            min_length: 20,
            max_length: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn assert_well_formed(password: &str, min: usize, max: usize) {
        assert!(
            (min..=max).contains(&password.len()),
            "length {} outside {min}..={max}",
            password.len()
        );
        assert!(password.bytes().all(|b| (0x21..=0x7E).contains(&b)));
    }

    #[test]
    fn default_bounds() {
        let generator = PasswordGenerator::default();
        assert_eq!(generator.min_length(), 20);
        assert_eq!(generator.max_length(), 30);
        for _ in 0..500 {
            assert_well_formed(&generator.generate(), 20, 30);
        }
    }

    #[test]
    fn all_valid_bounds_respected() {
        for (min, max) in [(15, 16), (15, 100), (50, 51), (99, 100), (30, 60)] {
            let generator = PasswordGenerator::new(min, max).unwrap();
            for _ in 0..200 {
                assert_well_formed(&generator.generate(), min, max);
            }
        }
    }

    #[test]
    fn both_length_extremes_are_reachable() {
        let generator = PasswordGenerator::new(15, 16).unwrap();
        let lengths: HashSet<usize> = (0..500).map(|_| generator.generate().len()).collect();
        assert_eq!(lengths, HashSet::from([15, 16]));
    }

    #[test]
    fn covers_the_character_range() {
        let generator = PasswordGenerator::new(90, 100).unwrap();
        let seen: HashSet<u8> = (0..200)
            .flat_map(|_| generator.generate().into_bytes())
            .collect();
        // 94 symbols, ~19k draws: every one should show up.
        assert_eq!(seen.len(), 94);
        assert!(seen.contains(&b'!'));
        assert!(seen.contains(&b'~'));
        assert!(!seen.contains(&b' '));
    }

    #[test]
    fn outputs_differ() {
        let generator = PasswordGenerator::default();
        assert_ne!(generator.generate(), generator.generate());
    }

    #[test]
    fn rejects_invalid_bounds() {
        for (min, max) in [(14, 30), (20, 101), (30, 30), (40, 20), (0, 0)] {
            assert!(
                matches!(
                    PasswordGenerator::new(min, max),
                    Err(PassHeroError::InvalidConfiguration(_))
                ),
                "({min}, {max}) should be rejected"
            );
        }
    }
}

//! Random string generation.
//!
//! Characters are drawn from the OS CSPRNG. Printable strings are
//! alphanumeric strings with one to three positions overwritten by a
//! special character.

use rand::rngs::OsRng;
use rand::Rng;

use crate::config::GeneratorConfig;

/// Hard cap on any generated string, whatever the caller asks for.
pub const MAX_ALLOWED_LENGTH: usize = 100;

#[derive(Debug, Clone)]
pub struct Generator {
    alphabet: Vec<u8>,
    special_chars: Vec<u8>,
    random_lengths: (usize, usize),
    bounds: (usize, usize),
}

impl Generator {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            alphabet: config.alphabet.as_bytes().to_vec(),
            special_chars: config.special_chars.as_bytes().to_vec(),
            random_lengths: (config.random_min_length, config.random_max_length),
            bounds: (config.min_length, config.max_length),
        }
    }

    /// Resolve a requested length: random when absent, then clamped to bounds.
    pub fn length(&self, requested: Option<i64>) -> usize {
        let (min, max) = self.bounds;
        match requested {
            Some(n) if n < min as i64 => min,
            Some(n) if n > max as i64 => max,
            Some(n) => n as usize,
            None => {
                let (lo, hi) = self.random_lengths;
                OsRng.gen_range(lo..=hi).clamp(min, max)
            }
        }
    }

    pub fn alphanumeric(&self, length: usize) -> String {
        let length = length.min(MAX_ALLOWED_LENGTH);
        if self.alphabet.is_empty() {
            return String::new();
        }
        (0..length)
            .map(|_| self.alphabet[OsRng.gen_range(0..self.alphabet.len())] as char)
            .collect()
    }

    pub fn printable(&self, length: usize) -> String {
        let length = length.min(MAX_ALLOWED_LENGTH);
        let mut chars = self.alphanumeric(length).into_bytes();
        if chars.is_empty() || self.special_chars.is_empty() {
            return String::from_utf8_lossy(&chars).into_owned();
        }

        let mut replacements = OsRng.gen_range(1..=3);
        if replacements >= length {
            replacements = 1;
        }
        for _ in 0..replacements {
            let pos = OsRng.gen_range(0..length);
            chars[pos] = self.special_chars[OsRng.gen_range(0..self.special_chars.len())];
        }
        String::from_utf8_lossy(&chars).into_owned()
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new(&GeneratorConfig::default())
    }
}

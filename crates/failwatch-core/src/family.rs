//! Family key extraction
//!
//! A job identifier looks like `<prefix><family>_<run>`. The prefix has a
//! fixed character length; the run suffix is whatever follows the last `_`.

use crate::error::{Malformed, TriageError, TriageResult};
use crate::types::{FamilyKey, DEFAULT_PREFIX_LEN};

/// Derives family keys from raw job identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FamilyKeyExtractor {
    prefix_len: usize,
}

impl FamilyKeyExtractor {
    /// Create extractor stripping `prefix_len` leading characters
    #[inline]
    #[must_use]
    pub fn new(prefix_len: usize) -> Self {
        Self { prefix_len }
    }

    /// Configured prefix length
    #[inline]
    #[must_use]
    pub fn prefix_len(&self) -> usize {
        self.prefix_len
    }

    /// Extract the family key
    ///
    /// # Errors
    /// - `Malformed::ShorterThanPrefix` if the identifier is shorter than the prefix
    /// - `Malformed::MissingRunSuffix` if no `_` follows the prefix
    /// - `Malformed::EmptyFamily` if nothing sits between prefix and suffix
    pub fn extract(&self, job_identifier: &str) -> TriageResult<FamilyKey> {
        let remainder = strip_chars(job_identifier, self.prefix_len).ok_or_else(|| {
            TriageError::malformed_job(
                job_identifier,
                Malformed::ShorterThanPrefix {
                    prefix_len: self.prefix_len,
                },
            )
        })?;

        let cut = remainder
            .rfind('_')
            .ok_or_else(|| TriageError::malformed_job(job_identifier, Malformed::MissingRunSuffix))?;

        let key = &remainder[..cut];
        if key.is_empty() {
            return Err(TriageError::malformed_job(
                job_identifier,
                Malformed::EmptyFamily,
            ));
        }

        Ok(FamilyKey::new(key))
    }
}

impl Default for FamilyKeyExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX_LEN)
    }
}

/// Drop the first `n` characters, or `None` if there are fewer than `n`
fn strip_chars(s: &str, n: usize) -> Option<&str> {
    match s.char_indices().nth(n) {
        Some((offset, _)) => Some(&s[offset..]),
        None if s.chars().count() == n => Some(""),
        None => None,
    }
}

//! Per-family failure accumulation
//!
//! Events are folded one at a time in source order. Ordering inside an
//! accumulator is observable in reports:
//! - run numbers: most recently seen first
//! - reasons: first seen first

use crate::error::TriageResult;
use crate::family::FamilyKeyExtractor;
use crate::reference::run_number;
use crate::types::{FailureEvent, FamilyKey, RunNumber};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::VecDeque;

/// Accumulators keyed by family, in first-seen family order
pub type FamilyAccumulators = IndexMap<FamilyKey, Accumulator>;

/// Accumulated failures of one family
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Accumulator {
    run_numbers: VecDeque<RunNumber>,
    reasons: IndexMap<String, usize>,
}

impl Accumulator {
    /// Create empty accumulator
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one confirmed failure
    ///
    /// Empty descriptions add the run number but no reason.
    pub fn record(&mut self, run: RunNumber, description: &str) {
        if !self.run_numbers.contains(&run) {
            self.run_numbers.push_front(run);
        }

        if description.is_empty() {
            return;
        }

        *self.reasons.entry(description.to_string()).or_insert(0) += 1;
    }

    /// Distinct run numbers, most recent first
    #[inline]
    pub fn run_numbers(&self) -> impl ExactSizeIterator<Item = &RunNumber> + '_ {
        self.run_numbers.iter()
    }

    /// Number of distinct failing runs
    #[inline]
    #[must_use]
    pub fn number_of_fails(&self) -> usize {
        self.run_numbers.len()
    }

    /// Distinct reasons, first seen first
    #[inline]
    pub fn reasons(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.reasons.keys().map(String::as_str)
    }

    /// Reasons with their occurrence counts, first seen first
    #[inline]
    pub fn reason_counts(&self) -> impl ExactSizeIterator<Item = (&str, usize)> + '_ {
        self.reasons.iter().map(|(reason, count)| (reason.as_str(), *count))
    }

    /// Occurrences of one reason
    #[inline]
    #[must_use]
    pub fn reason_count(&self, reason: &str) -> Option<usize> {
        self.reasons.get(reason).copied()
    }

    /// Number of distinct reasons
    #[inline]
    #[must_use]
    pub fn distinct_reasons(&self) -> usize {
        self.reasons.len()
    }

    /// Sum of all reason counts
    #[inline]
    #[must_use]
    pub fn total_reason_count(&self) -> usize {
        self.reasons.values().sum()
    }
}

/// Folds confirmed failures into per-family accumulators
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    extractor: FamilyKeyExtractor,
    families: FamilyAccumulators,
}

impl Aggregator {
    /// Create aggregator using the given key extractor
    #[inline]
    #[must_use]
    pub fn new(extractor: FamilyKeyExtractor) -> Self {
        Self {
            extractor,
            families: FamilyAccumulators::new(),
        }
    }

    /// Fold one confirmed failure into its family's accumulator
    ///
    /// Both the family key and run number are derived before anything is
    /// touched, so a malformed event leaves the accumulators unchanged.
    ///
    /// # Errors
    /// Returns `TriageError` if the job identifier or run location is malformed
    pub fn ingest(&mut self, event: &FailureEvent) -> TriageResult<FamilyKey> {
        let family = self.extractor.extract(&event.job_identifier)?;
        let run = run_number(&event.run_location)?;

        self.families
            .entry(family.clone())
            .or_default()
            .record(run, &event.description);

        Ok(family)
    }

    /// Accumulator of one family
    #[inline]
    #[must_use]
    pub fn get(&self, family: &FamilyKey) -> Option<&Accumulator> {
        self.families.get(family)
    }

    /// All accumulators, first-seen family order
    #[inline]
    #[must_use]
    pub fn families(&self) -> &FamilyAccumulators {
        &self.families
    }

    /// Consume the aggregator, yielding its accumulators
    #[inline]
    #[must_use]
    pub fn into_families(self) -> FamilyAccumulators {
        self.families
    }
}

//! Reference index and cross-reference filter
//!
//! The telemetry source is noisy (aborted and re-run jobs show up as
//! failures). The reference source is the arbiter: an event counts only
//! when its run location is recorded there as FAIL.

use crate::error::{Malformed, TriageError, TriageResult};
use crate::types::{FailureEvent, ReferenceRecord, RunNumber, RunResult};
use std::collections::HashMap;

/// Outcome of looking an event up in the reference index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// Recorded as FAIL
    Confirmed,
    /// Recorded with some other result
    Contradicted,
    /// Not recorded at all
    Missing,
}

impl Verdict {
    /// Check if the event survives the filter
    #[inline]
    #[must_use]
    pub fn is_confirmed(self) -> bool {
        matches!(self, Self::Confirmed)
    }
}

/// Lookup from run location to authoritative result
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    results: HashMap<String, RunResult>,
}

impl ReferenceIndex {
    /// Create empty index
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build index from records; later duplicates overwrite earlier ones
    #[must_use]
    pub fn build(records: impl IntoIterator<Item = ReferenceRecord>) -> Self {
        let mut index = Self::new();
        for record in records {
            index.insert(record);
        }
        index
    }

    /// Insert a record, returning the result it replaced
    #[inline]
    pub fn insert(&mut self, record: ReferenceRecord) -> Option<RunResult> {
        self.results.insert(record.location, record.result)
    }

    /// Result recorded for a location
    #[inline]
    #[must_use]
    pub fn get(&self, location: &str) -> Option<&RunResult> {
        self.results.get(location)
    }

    /// Number of distinct locations
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Check if index is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Classify an event against the index
    #[must_use]
    pub fn verdict(&self, event: &FailureEvent) -> Verdict {
        match self.get(&event.run_location) {
            Some(result) if result.is_fail() => Verdict::Confirmed,
            Some(_) => Verdict::Contradicted,
            None => Verdict::Missing,
        }
    }

    /// Check if an event is a confirmed failure
    #[inline]
    #[must_use]
    pub fn is_confirmed_failure(&self, event: &FailureEvent) -> bool {
        self.verdict(event).is_confirmed()
    }
}

impl FromIterator<ReferenceRecord> for ReferenceIndex {
    fn from_iter<I: IntoIterator<Item = ReferenceRecord>>(iter: I) -> Self {
        Self::build(iter)
    }
}

/// Run number embedded in a run location
///
/// The run number is the second-to-last `/`-separated component, so both
/// `.../job/x/104/` and `.../job/x/104/console` yield `104`.
///
/// # Errors
/// - `Malformed::TooFewSegments` if the location has no `/`
/// - `Malformed::EmptyRunNumber` if the second-to-last component is empty
pub fn run_number(location: &str) -> TriageResult<RunNumber> {
    let mut segments = location.rsplit('/');
    let _last = segments.next();

    let number = segments
        .next()
        .ok_or_else(|| TriageError::malformed_location(location, Malformed::TooFewSegments))?;

    if number.is_empty() {
        return Err(TriageError::malformed_location(
            location,
            Malformed::EmptyRunNumber,
        ));
    }

    Ok(RunNumber::new(number))
}

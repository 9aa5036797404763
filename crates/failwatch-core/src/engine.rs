//! Engine: one pass from raw batches to reports
//!
//! Runs the filter, aggregation and formatting stages over fully
//! materialized inputs:
//!
//! ```text
//! events ──┐
//!          ├─ ReferenceIndex::verdict ─ Aggregator::ingest ─ ReportFormatter ─ reports
//! records ─┘
//! ```

use crate::aggregate::{Aggregator, FamilyAccumulators};
use crate::family::FamilyKeyExtractor;
use crate::reference::{ReferenceIndex, Verdict};
use crate::report::{FailureReport, ReportFormatter};
use crate::types::{EngineConfig, FailureEvent, ReferenceRecord};
use serde::{Deserialize, Serialize};

/// Counters for one pass over a batch
///
/// `total == confirmed + unconfirmed + malformed` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    /// Events seen
    pub total: usize,
    /// Events folded into an accumulator
    pub confirmed: usize,
    /// Events dropped by the reference filter
    pub unconfirmed: usize,
    /// Confirmed events skipped because of a malformed identifier or location
    pub malformed: usize,
}

impl ScanStats {
    /// Count events rejected before they reached the engine
    ///
    /// Unreadable source documents are malformed events that never decoded.
    pub fn record_unreadable(&mut self, count: usize) {
        self.total += count;
        self.malformed += count;
    }
}

/// Result of one engine pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanOutcome {
    /// One report per family, first-seen family order
    pub reports: Vec<FailureReport>,
    /// Batch counters
    pub stats: ScanStats,
}

/// Failure cross-reference and aggregation engine
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
    extractor: FamilyKeyExtractor,
    formatter: ReportFormatter,
}

impl Engine {
    /// Create engine from configuration
    #[inline]
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            extractor: FamilyKeyExtractor::new(config.prefix_len),
            formatter: ReportFormatter::new(config.max_displayed_reasons),
        }
    }

    /// Get configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run a full pass: index references, filter, aggregate, render
    pub fn run(
        &self,
        events: &[FailureEvent],
        references: impl IntoIterator<Item = ReferenceRecord>,
    ) -> ScanOutcome {
        let index = ReferenceIndex::build(references);
        tracing::debug!("Reference index holds {} locations", index.len());

        let (families, stats) = self.aggregate(events, &index);
        let reports = self.render(&families);

        tracing::info!(
            "Scanned {} events: {} confirmed, {} unconfirmed, {} malformed; {} families",
            stats.total,
            stats.confirmed,
            stats.unconfirmed,
            stats.malformed,
            reports.len()
        );

        ScanOutcome { reports, stats }
    }

    /// Filter events against the index and fold the survivors
    ///
    /// Events are processed strictly in input order.
    #[must_use]
    pub fn aggregate(
        &self,
        events: &[FailureEvent],
        index: &ReferenceIndex,
    ) -> (FamilyAccumulators, ScanStats) {
        let mut aggregator = Aggregator::new(self.extractor);
        let mut stats = ScanStats {
            total: events.len(),
            ..ScanStats::default()
        };

        for event in events {
            match index.verdict(event) {
                Verdict::Confirmed => {}
                verdict => {
                    tracing::debug!(
                        location = %event.run_location,
                        ?verdict,
                        "Dropping unconfirmed failure"
                    );
                    stats.unconfirmed += 1;
                    continue;
                }
            }

            match aggregator.ingest(event) {
                Ok(family) => {
                    tracing::debug!(%family, location = %event.run_location, "Recorded failure");
                    stats.confirmed += 1;
                }
                Err(e) => {
                    tracing::warn!("Skipping event: {}", e);
                    stats.malformed += 1;
                }
            }
        }

        (aggregator.into_families(), stats)
    }

    /// Render one report per accumulated family
    #[must_use]
    pub fn render(&self, families: &FamilyAccumulators) -> Vec<FailureReport> {
        families
            .iter()
            .map(|(family, accumulator)| {
                debug_assert!(accumulator.number_of_fails() > 0, "{family} has no runs");
                self.formatter.format(family, accumulator)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_uses_config() {
        let engine = Engine::new(EngineConfig::new().with_prefix_len(0));
        assert_eq!(engine.config().prefix_len, 0);

        let url = "https://ci/job/suite/5/";
        let outcome = engine.run(
            &[FailureEvent::new("Suite_5", url, "Boom")],
            [ReferenceRecord::new(url, "FAIL")],
        );
        assert_eq!(outcome.reports.len(), 1);
        assert_eq!(outcome.reports[0].family.as_str(), "Suite");
    }

    #[test]
    fn unreadable_events_count_as_malformed() {
        let url = "https://ci/job/suite/5/";
        let mut outcome = Engine::default().run(
            &[FailureEvent::new("InsightsSuite_5", url, "Boom")],
            [ReferenceRecord::new(url, "FAIL")],
        );
        outcome.stats.record_unreadable(2);

        assert_eq!(outcome.stats.total, 3);
        assert_eq!(outcome.stats.malformed, 2);
        assert_eq!(
            outcome.stats.total,
            outcome.stats.confirmed + outcome.stats.unconfirmed + outcome.stats.malformed
        );
    }

    #[test]
    fn every_rendered_family_has_runs() {
        let url = "https://ci/job/suite/5/";
        let engine = Engine::default();
        let index = ReferenceIndex::build([ReferenceRecord::new(url, "FAIL")]);
        let (families, _) = engine.aggregate(&[FailureEvent::new("InsightsSuite_5", url, "")], &index);

        let reports = engine.render(&families);

        assert_eq!(reports.len(), families.len());
        assert!(reports[0].description.starts_with("Runs failing : 5"));
    }

    #[test]
    fn empty_batch_produces_nothing() {
        let outcome = Engine::default().run(&[], Vec::new());
        assert!(outcome.reports.is_empty());
        assert_eq!(outcome.stats, ScanStats::default());
    }
}

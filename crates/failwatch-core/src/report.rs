//! Report rendering
//!
//! Turns one family's accumulator into a ticket-ready summary line and a
//! description block. The summary lists at most a fixed number of reasons;
//! the description lists every reason with its count.

use crate::aggregate::Accumulator;
use crate::types::{FamilyKey, RunNumber, DEFAULT_MAX_DISPLAYED_REASONS};
use serde::{Deserialize, Serialize};

/// Rendered report for one family
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReport {
    /// Family the report covers
    pub family: FamilyKey,
    /// One-line summary
    pub summary: String,
    /// Run list followed by per-reason counts
    pub description: String,
}

/// Renders accumulators into reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportFormatter {
    max_displayed_reasons: usize,
}

impl ReportFormatter {
    /// Create formatter showing at most `max_displayed_reasons` in summaries
    #[inline]
    #[must_use]
    pub fn new(max_displayed_reasons: usize) -> Self {
        Self {
            max_displayed_reasons,
        }
    }

    /// Render a family's report
    #[must_use]
    pub fn format(&self, family: &FamilyKey, accumulator: &Accumulator) -> FailureReport {
        FailureReport {
            family: family.clone(),
            summary: self.summary(family, accumulator),
            description: description(accumulator),
        }
    }

    fn summary(&self, family: &FamilyKey, accumulator: &Accumulator) -> String {
        let fails = accumulator.number_of_fails();
        let shown: Vec<&str> = accumulator
            .reasons()
            .take(self.max_displayed_reasons)
            .collect();
        let hidden = accumulator.distinct_reasons().saturating_sub(shown.len());

        let suffix = if hidden > 0 {
            format!(
                "and {hidden} more {}",
                pluralize(hidden, "parameter", "parameters")
            )
        } else {
            String::new()
        };

        format!(
            "{family}: {fails} {} failing due to {} {suffix} going out of bounds",
            pluralize(fails, "run", "runs"),
            shown.join(","),
        )
    }
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DISPLAYED_REASONS)
    }
}

fn description(accumulator: &Accumulator) -> String {
    let runs: Vec<&str> = accumulator.run_numbers().map(RunNumber::as_str).collect();

    let mut lines = Vec::with_capacity(1 + accumulator.distinct_reasons());
    lines.push(format!("Runs failing : {}", runs.join(",")));
    lines.extend(accumulator.reason_counts().map(|(reason, count)| {
        format!(
            "{reason} failed in {count} {}",
            pluralize(count, "run", "runs")
        )
    }));

    lines.join("\n")
}

/// Pick singular form for exactly one, plural otherwise
#[inline]
#[must_use]
pub fn pluralize<'a>(count: usize, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 {
        singular
    } else {
        plural
    }
}

//! Report filing
//!
//! Files one ticket per report through a [`TicketSink`] with bounded
//! concurrency. A failure for one family never stops the others, and results
//! come back in report order regardless of completion order.

use crate::directory::AssigneeDirectory;
use crate::error::TicketError;
use crate::jira::{TicketReceipt, TicketSink};
use failwatch_core::{FailureReport, FamilyKey};
use futures::stream::{self, StreamExt};

/// Ticket filed for a family
#[derive(Debug)]
pub struct FiledTicket {
    /// Family the ticket covers
    pub family: FamilyKey,
    /// Tracker receipt
    pub receipt: TicketReceipt,
}

/// Family whose ticket could not be filed
#[derive(Debug)]
pub struct FilingFailure {
    /// Family the ticket was for
    pub family: FamilyKey,
    /// Why it failed
    pub error: TicketError,
}

/// Outcome of filing a batch of reports
#[derive(Debug, Default)]
pub struct FilingSummary {
    /// Successfully filed, report order
    pub filed: Vec<FiledTicket>,
    /// Failed, report order
    pub failed: Vec<FilingFailure>,
}

impl FilingSummary {
    /// Check if every report was filed
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// File every report, at most `concurrency` at a time
pub async fn file_reports(
    reports: &[FailureReport],
    directory: &AssigneeDirectory,
    sink: &dyn TicketSink,
    concurrency: usize,
) -> FilingSummary {
    let results: Vec<_> = stream::iter(reports.iter().map(|report| {
        let assignee = directory.lookup(&report.family);
        if assignee.is_none() {
            tracing::warn!(
                "No assignee for service {}; filing unassigned",
                AssigneeDirectory::service_name(&report.family)
            );
        }
        async move { (report, sink.file(report, assignee).await) }
    }))
    .buffered(concurrency.max(1))
    .collect()
    .await;

    let mut summary = FilingSummary::default();
    for (report, result) in results {
        match result {
            Ok(receipt) => summary.filed.push(FiledTicket {
                family: report.family.clone(),
                receipt,
            }),
            Err(error) => {
                tracing::error!("Filing ticket for {} failed: {}", report.family, error);
                summary.failed.push(FilingFailure {
                    family: report.family.clone(),
                    error,
                });
            }
        }
    }

    tracing::info!(
        "Filed {} tickets, {} failed",
        summary.filed.len(),
        summary.failed.len()
    );
    summary
}

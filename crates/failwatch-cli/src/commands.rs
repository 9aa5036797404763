//! Subcommand implementations
//!
//! Each command returns data; printing and exit codes are decided in `main`.

use anyhow::{Context, Result};
use failwatch_core::{Engine, FailureEvent, ReferenceRecord, ScanOutcome};
use failwatch_sources::{
    decode_documents, fetch_batch, file_reports, AssigneeDirectory, Decoded, EventDoc,
    FailureSource, FilingSummary, JiraClient, JiraConfig, ReferenceDoc, TicketSink,
};
use serde_json::Value;
use std::fmt::Write;
use std::path::Path;

/// Fetch from the search backend and run the engine
///
/// Unreadable event documents are counted as malformed.
///
/// # Errors
/// Fails if either query fails
pub async fn scan(engine: &Engine, source: &dyn FailureSource) -> Result<ScanOutcome> {
    let batch = fetch_batch(source)
        .await
        .context("failed to fetch telemetry from the search backend")?;
    let mut outcome = engine.run(&batch.events, batch.references);
    outcome.stats.record_unreadable(batch.skipped_events);
    Ok(outcome)
}

/// Run the engine over local JSON dumps
///
/// Both files hold JSON arrays of the documents the search backend returns.
///
/// # Errors
/// Fails if either file cannot be read or parsed
pub async fn replay(
    engine: &Engine,
    events_path: &Path,
    references_path: &Path,
) -> Result<ScanOutcome> {
    let events = load_dump::<EventDoc>(events_path, "event")
        .await?
        .map(FailureEvent::from);
    let references = load_dump::<ReferenceDoc>(references_path, "reference")
        .await?
        .map(ReferenceRecord::from);

    let mut outcome = engine.run(&events.items, references.items);
    outcome.stats.record_unreadable(events.skipped);
    Ok(outcome)
}

async fn load_dump<T: serde::de::DeserializeOwned>(path: &Path, kind: &str) -> Result<Decoded<T>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let documents: Vec<Value> =
        serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(decode_documents(documents, kind))
}

/// File one ticket per report
///
/// # Errors
/// Fails if the tracker client or the assignee directory cannot be set up;
/// per-report failures are returned in the summary instead
pub async fn file(
    outcome: &ScanOutcome,
    jira: &JiraConfig,
    assignees_path: &Path,
    concurrency: usize,
) -> Result<FilingSummary> {
    let directory = load_directory(assignees_path).await?;
    let client = JiraClient::new(jira.clone()).context("failed to build tracker client")?;
    Ok(file_with(outcome, &directory, &client, concurrency).await)
}

/// Render what `file` would do, touching only the assignee directory
///
/// # Errors
/// Fails if the assignee directory cannot be loaded
pub async fn dry_run(outcome: &ScanOutcome, assignees_path: &Path) -> Result<String> {
    let directory = load_directory(assignees_path).await?;
    Ok(render_dry_run(outcome, &directory))
}

async fn load_directory(path: &Path) -> Result<AssigneeDirectory> {
    AssigneeDirectory::load(path)
        .await
        .context("failed to load assignee directory")
}

/// File one ticket per report through any sink
pub async fn file_with(
    outcome: &ScanOutcome,
    directory: &AssigneeDirectory,
    sink: &dyn TicketSink,
    concurrency: usize,
) -> FilingSummary {
    if outcome.reports.is_empty() {
        tracing::info!("No confirmed failures; nothing to file");
        return FilingSummary::default();
    }
    file_reports(&outcome.reports, directory, sink, concurrency).await
}

/// Human-readable rendering of an engine pass
#[must_use]
pub fn render_text(outcome: &ScanOutcome) -> String {
    let mut out = String::new();
    for report in &outcome.reports {
        let _ = writeln!(out, "{}", report.summary);
        for line in report.description.lines() {
            let _ = writeln!(out, "    {line}");
        }
        out.push('\n');
    }
    let stats = &outcome.stats;
    let _ = writeln!(
        out,
        "{} reports from {} events ({} confirmed, {} unconfirmed, {} malformed)",
        outcome.reports.len(),
        stats.total,
        stats.confirmed,
        stats.unconfirmed,
        stats.malformed
    );
    out
}

/// JSON rendering of an engine pass
///
/// # Errors
/// Fails only if serialization fails
pub fn render_json(outcome: &ScanOutcome) -> Result<String> {
    serde_json::to_string_pretty(outcome).context("failed to serialize scan outcome")
}

/// What a dry run would file, one line per report
#[must_use]
pub fn render_dry_run(outcome: &ScanOutcome, directory: &AssigneeDirectory) -> String {
    let mut out = String::new();
    for report in &outcome.reports {
        let assignee = directory.lookup(&report.family).unwrap_or("(unassigned)");
        let _ = writeln!(out, "would file [{assignee}] {}", report.summary);
    }
    out
}

/// Outcome of a filing pass, one line per report
#[must_use]
pub fn render_filing(summary: &FilingSummary) -> String {
    let mut out = String::new();
    for ticket in &summary.filed {
        let _ = writeln!(out, "filed {} -> {}", ticket.family, ticket.receipt.key);
    }
    for failure in &summary.failed {
        let _ = writeln!(out, "failed {}: {}", failure.family, failure.error);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use failwatch_core::{FailureReport, FamilyKey, ScanStats};
    use failwatch_sources::AssigneeEntry;
    use pretty_assertions::assert_eq;

    fn outcome() -> ScanOutcome {
        ScanOutcome {
            reports: vec![FailureReport {
                family: FamilyKey::new("AuthSuite"),
                summary: "AuthSuite: 1 run failing due to login_timeout  going out of bounds"
                    .to_string(),
                description: "Runs failing : 101\nlogin_timeout failed in 1 run".to_string(),
            }],
            stats: ScanStats {
                total: 3,
                confirmed: 1,
                unconfirmed: 2,
                malformed: 0,
            },
        }
    }

    #[test]
    fn text_indents_description() {
        assert_eq!(
            render_text(&outcome()),
            "AuthSuite: 1 run failing due to login_timeout  going out of bounds\n\
             \x20   Runs failing : 101\n\
             \x20   login_timeout failed in 1 run\n\
             \n\
             1 reports from 3 events (1 confirmed, 2 unconfirmed, 0 malformed)\n"
        );
    }

    #[test]
    fn json_has_reports_and_stats() {
        let value: serde_json::Value =
            serde_json::from_str(&render_json(&outcome()).unwrap()).unwrap();
        assert_eq!(value["reports"][0]["family"], "AuthSuite");
        assert_eq!(value["stats"]["unconfirmed"], 2);
    }

    #[test]
    fn dry_run_shows_assignee() {
        let directory = AssigneeDirectory::new(vec![AssigneeEntry {
            service: "InsightsAuthSuite_runner".to_string(),
            assignee: "alice".to_string(),
        }]);
        assert_eq!(
            render_dry_run(&outcome(), &directory),
            "would file [alice] AuthSuite: 1 run failing due to login_timeout  going out of bounds\n"
        );
        assert!(render_dry_run(&outcome(), &AssigneeDirectory::default()).contains("(unassigned)"));
    }
}

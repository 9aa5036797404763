//! Testing utilities for failwatch workspace
//!
//! Shared fixtures for telemetry events and reference records.

#![allow(missing_docs)]

use failwatch_core::{FailureEvent, ReferenceRecord, RunResult};

/// Job identifier with the default eight-character prefix
pub fn job_name(family: &str, run: &str) -> String {
    format!("Insights{family}_{run}")
}

/// Run location whose run number is `run`
pub fn build_url(family: &str, run: &str) -> String {
    format!("https://ci.example.com/job/{family}/{run}/")
}

pub fn failure_event(family: &str, run: &str, description: &str) -> FailureEvent {
    FailureEvent::new(job_name(family, run), build_url(family, run), description)
}

pub fn fail_reference(family: &str, run: &str) -> ReferenceRecord {
    ReferenceRecord::new(build_url(family, run), RunResult::Fail)
}

pub fn pass_reference(family: &str, run: &str) -> ReferenceRecord {
    ReferenceRecord::new(build_url(family, run), RunResult::Pass)
}

/// Three confirmed `AuthSuite` failures over runs 101 and 102
pub fn auth_suite_events() -> (Vec<FailureEvent>, Vec<ReferenceRecord>) {
    let events = vec![
        failure_event("AuthSuite", "101", "login_timeout"),
        failure_event("AuthSuite", "102", "login_timeout"),
        failure_event("AuthSuite", "102", "token_expired"),
    ];
    let references = vec![
        fail_reference("AuthSuite", "101"),
        fail_reference("AuthSuite", "102"),
    ];
    (events, references)
}

/// Confirmed failures for `family`, one per run, all with the same reason
pub fn confirmed_runs(
    family: &str,
    runs: &[&str],
    description: &str,
) -> (Vec<FailureEvent>, Vec<ReferenceRecord>) {
    let events = runs
        .iter()
        .map(|run| failure_event(family, run, description))
        .collect();
    let references = runs.iter().map(|run| fail_reference(family, run)).collect();
    (events, references)
}

//! failwatch Core - failure cross-reference and aggregation engine
//!
//! Takes a window of CI failure telemetry and:
//! - Extracts a stable family key from each job identifier
//! - Drops failures the reference source does not record as FAIL
//! - Accumulates distinct run numbers and ranked reasons per family
//! - Renders one bounded, pluralized report per family
//!
//! # Example
//!
//! ```rust
//! use failwatch_core::{Engine, EngineConfig, FailureEvent, ReferenceRecord};
//!
//! let url = "https://ci.example.com/job/auth/102/";
//! let events = vec![FailureEvent::new("InsightsAuthSuite_102", url, "TimeoutError")];
//! let references = vec![ReferenceRecord::new(url, "FAIL")];
//!
//! let outcome = Engine::new(EngineConfig::new()).run(&events, references);
//! assert_eq!(outcome.reports[0].family.as_str(), "AuthSuite");
//! ```

#![warn(unreachable_pub)]

// Core modules
pub mod aggregate;
pub mod engine;
pub mod error;
pub mod family;
pub mod reference;
pub mod report;
pub mod types;

// Re-exports for convenience
pub use aggregate::{Accumulator, Aggregator, FamilyAccumulators};
pub use engine::{Engine, ScanOutcome, ScanStats};
pub use error::{Malformed, TriageError, TriageResult};
pub use family::FamilyKeyExtractor;
pub use reference::{run_number, ReferenceIndex, Verdict};
pub use report::{pluralize, FailureReport, ReportFormatter};
pub use types::{
    EngineConfig, FailureEvent, FamilyKey, ReferenceRecord, RunNumber, RunResult,
    DEFAULT_MAX_DISPLAYED_REASONS, DEFAULT_PREFIX_LEN,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the engine
    pub use crate::{
        Engine, EngineConfig, FailureEvent, FailureReport, FamilyKey, ReferenceRecord,
        ScanOutcome, ScanStats,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

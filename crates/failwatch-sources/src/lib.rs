//! failwatch Sources - external collaborators of the engine
//!
//! The engine itself never performs I/O. This crate holds the adapters
//! around it:
//! - **Search backend**: failed telemetry events and reference records
//! - **Ticket tracker**: issue creation, sprint assignment, estimation
//! - **Assignee directory**: family owner lookup from a static file
//!
//! # Example
//!
//! ```rust,ignore
//! use failwatch_core::Engine;
//! use failwatch_sources::{fetch_batch, file_reports, SearchClient, SearchConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let search = SearchClient::new(SearchConfig::new(events_url, references_url))?;
//! let batch = fetch_batch(&search).await?;
//! let outcome = Engine::default().run(&batch.events, batch.references);
//! let summary = file_reports(&outcome.reports, &directory, &jira, 1).await;
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod config;
pub mod directory;
pub mod error;
pub mod filing;
pub mod jira;
pub mod search;
pub mod wire;

// Re-exports for convenience
pub use config::{JiraConfig, SearchConfig};
pub use directory::{AssigneeDirectory, AssigneeEntry};
pub use error::{DirectoryError, SourceError, SourceResult, TicketError, TicketResult};
pub use filing::{file_reports, FiledTicket, FilingFailure, FilingSummary};
pub use jira::{IssueKey, JiraClient, TicketReceipt, TicketSink};
pub use search::{fetch_batch, Batch, FailureSource, SearchClient};
pub use wire::{decode_documents, Decoded, EventDoc, ReferenceDoc};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

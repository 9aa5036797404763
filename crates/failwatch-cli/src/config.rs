//! Environment configuration
//!
//! Everything the binary needs from its environment is read here once and
//! turned into the plain config structs the clients take.

use failwatch_sources::config::DEFAULT_LOOKBACK_DAYS;
use failwatch_sources::{JiraConfig, SearchConfig};
use std::path::PathBuf;

/// Default location of the assignee directory
pub const DEFAULT_ASSIGNEES_PATH: &str = "assignees.json";

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Required variable is unset or empty
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    /// Variable is set but unusable
    #[error("invalid value {value:?} for {name}: {reason}")]
    Invalid {
        /// Variable name
        name: &'static str,
        /// Raw value
        value: String,
        /// What is wrong with it
        reason: String,
    },
}

/// Resolved binary configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Search backend settings
    pub search: SearchConfig,
    /// Assignee directory file
    pub assignees_path: PathBuf,
    /// Tracker settings, only resolved when tickets are actually filed
    pub jira: Option<JiraConfig>,
}

impl AppConfig {
    /// Read configuration from the process environment
    ///
    /// A `.env` file in the working directory is loaded first; variables
    /// already set in the environment take precedence over it.
    ///
    /// # Errors
    /// Returns `ConfigError` if a required variable is missing or invalid
    pub fn from_env(with_tracker: bool) -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|name| std::env::var(name).ok(), with_tracker)
    }

    /// Read configuration through an arbitrary variable lookup
    ///
    /// # Errors
    /// Returns `ConfigError` if a required variable is missing or invalid
    pub fn from_lookup<F>(lookup: F, with_tracker: bool) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);

        let mut search = SearchConfig::new(vars.required("ES_URL")?, vars.required("ES_REFERENCE_URL")?)
            .with_lookback_days(vars.parsed("LOOKBACK_DAYS")?.unwrap_or(DEFAULT_LOOKBACK_DAYS));
        if let Some(field) = vars.optional("REFERENCE_DATE_FIELD") {
            search = search.with_reference_date_field(field);
        }

        let assignees_path = vars
            .optional("ASSIGNEES_PATH")
            .map_or_else(|| PathBuf::from(DEFAULT_ASSIGNEES_PATH), PathBuf::from);

        let jira = if with_tracker {
            let board_id = vars
                .parsed("JIRA_PROJECT_BOARD_ID")?
                .ok_or(ConfigError::Missing("JIRA_PROJECT_BOARD_ID"))?;
            Some(JiraConfig::new(
                vars.required("JIRA_URL")?,
                vars.required("JIRA_TOKEN")?,
                vars.required("JIRA_PROJECT_KEY")?,
                board_id,
                vars.required("JIRA_USER_DOMAIN")?,
            ))
        } else {
            None
        };

        Ok(Self {
            search,
            assignees_path,
            jira,
        })
    }
}

struct Vars<F>(F);

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    fn optional(&self, name: &str) -> Option<String> {
        (self.0)(name).filter(|value| !value.trim().is_empty())
    }

    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.optional(name).ok_or(ConfigError::Missing(name))
    }

    fn parsed<T>(&self, name: &'static str) -> Result<Option<T>, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        let Some(value) = self.optional(name) else {
            return Ok(None);
        };
        let parsed = value.trim().parse::<T>();
        parsed.map(Some).map_err(|e| ConfigError::Invalid {
            name,
            value,
            reason: e.to_string(),
        })
    }
}

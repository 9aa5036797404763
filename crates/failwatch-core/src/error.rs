//! Error types for the aggregation engine
//!
//! Every error here is a per-event data-integrity problem: the engine
//! reports it, skips the offending event and keeps folding the batch.

/// Main engine error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TriageError {
    /// Job identifier cannot yield a family key
    #[error("malformed job identifier '{identifier}': {reason}")]
    MalformedJobIdentifier {
        /// The raw identifier as received
        identifier: String,
        /// What is wrong with it
        reason: Malformed,
    },

    /// Run location cannot yield a run number
    #[error("malformed run location '{location}': {reason}")]
    MalformedRunLocation {
        /// The raw location as received
        location: String,
        /// What is wrong with it
        reason: Malformed,
    },
}

impl TriageError {
    /// Create malformed job identifier error
    #[inline]
    pub fn malformed_job(identifier: impl Into<String>, reason: Malformed) -> Self {
        Self::MalformedJobIdentifier {
            identifier: identifier.into(),
            reason,
        }
    }

    /// Create malformed run location error
    #[inline]
    pub fn malformed_location(location: impl Into<String>, reason: Malformed) -> Self {
        Self::MalformedRunLocation {
            location: location.into(),
            reason,
        }
    }

    /// Shape violation reported for this event
    #[inline]
    #[must_use]
    pub fn reason(&self) -> Malformed {
        match self {
            Self::MalformedJobIdentifier { reason, .. }
            | Self::MalformedRunLocation { reason, .. } => *reason,
        }
    }
}

/// Shape violations in raw identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum Malformed {
    /// Identifier is shorter than the fixed prefix
    #[error("shorter than the {prefix_len}-character prefix")]
    ShorterThanPrefix {
        /// Configured prefix length
        prefix_len: usize,
    },

    /// No `_` after the prefix, so no run suffix to strip
    #[error("no '_'-delimited run suffix after the prefix")]
    MissingRunSuffix,

    /// Nothing left between prefix and run suffix
    #[error("family key is empty")]
    EmptyFamily,

    /// Path has fewer than two components
    #[error("fewer than two path components")]
    TooFewSegments,

    /// Second-to-last path component is empty
    #[error("run number segment is empty")]
    EmptyRunNumber,
}

/// Result type alias for engine operations
pub type TriageResult<T> = Result<T, TriageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_job_display() {
        let err = TriageError::malformed_job("abc", Malformed::ShorterThanPrefix { prefix_len: 8 });
        assert_eq!(
            err.to_string(),
            "malformed job identifier 'abc': shorter than the 8-character prefix"
        );
    }

    #[test]
    fn malformed_location_display() {
        let err = TriageError::malformed_location("nope", Malformed::TooFewSegments);
        assert!(err.to_string().contains("fewer than two path components"));
        assert_eq!(err.reason(), Malformed::TooFewSegments);
    }
}

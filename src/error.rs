use thiserror::Error;

/// Failure taxonomy shared by the loader, the scrapers and the report layer.
///
/// Every variant names the source it came from plus the offending
/// column/value, so a caller can diagnose without re-running the pipeline.
/// There are no retries anywhere; a failed call is final.
#[derive(Debug, Error)]
pub enum SebraError {
    /// The file or network source could not be reached at all.
    #[error("source unavailable: {source_id}: {reason}")]
    SourceUnavailable { source_id: String, reason: String },

    /// An expected column is absent, duplicated, or carries the wrong shape.
    #[error("schema mismatch in {source_id}: column '{column}': {reason}")]
    SchemaMismatch {
        source_id: String,
        column: String,
        reason: String,
    },

    /// A date or numeric field could not be parsed.
    #[error("parse failure in {source_id}: value '{value}': {reason}")]
    ParseFailure {
        source_id: String,
        value: String,
        reason: String,
    },

    /// A scrape completed but produced no usable rows.
    #[error("empty result from {source_id}: {reason}")]
    EmptyResult { source_id: String, reason: String },
}

impl SebraError {
    pub fn unavailable(source_id: impl Into<String>, reason: impl ToString) -> Self {
        SebraError::SourceUnavailable {
            source_id: source_id.into(),
            reason: reason.to_string(),
        }
    }

    pub fn schema(
        source_id: impl Into<String>,
        column: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        SebraError::SchemaMismatch {
            source_id: source_id.into(),
            column: column.into(),
            reason: reason.to_string(),
        }
    }

    pub fn parse(
        source_id: impl Into<String>,
        value: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        SebraError::ParseFailure {
            source_id: source_id.into(),
            value: value.into(),
            reason: reason.to_string(),
        }
    }

    pub fn empty(source_id: impl Into<String>, reason: impl ToString) -> Self {
        SebraError::EmptyResult {
            source_id: source_id.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SebraError>;

use thiserror::Error;

use crate::{
    cache::{CacheError, StoreError},
    domain::{error::DomainError, template::TemplateError},
    infra::error::InfraError,
};

/// Failures that abort a build. Nothing is written once any of these occurs.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("setup failed ({resource}): {source}")]
    Setup {
        resource: &'static str,
        #[source]
        source: SetupSource,
    },
    #[error("malformed template: {0}")]
    MalformedTemplate(#[from] TemplateError),
    #[error("malformed entry at index {index}: {source}")]
    MalformedEntry {
        /// Zero-based position in the input sequence.
        index: usize,
        #[source]
        source: DomainError,
    },
    #[error("cache store failed on entry at index {index}: {source}")]
    StoreIo {
        index: usize,
        #[source]
        source: CacheError,
    },
    #[error("failed to write output document: {0}")]
    Output(#[source] InfraError),
}

#[derive(Debug, Error)]
pub enum SetupSource {
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl BuildError {
    pub fn setup(resource: &'static str, source: impl Into<SetupSource>) -> Self {
        Self::Setup {
            resource,
            source: source.into(),
        }
    }

    pub fn malformed_entry(index: usize, source: DomainError) -> Self {
        Self::MalformedEntry { index, source }
    }

    /// Attribute a cache failure to the entry being processed.
    pub fn from_cache(index: usize, error: CacheError) -> Self {
        match error {
            CacheError::Render(source) => Self::MalformedEntry { index, source },
            other => Self::StoreIo {
                index,
                source: other,
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_errors_report_their_index() {
        let error = BuildError::malformed_entry(2, DomainError::empty_field("title"));
        assert_eq!(
            error.to_string(),
            "malformed entry at index 2: required field `title` is empty"
        );
    }

    #[test]
    fn render_failures_are_classified_as_malformed_entries() {
        let error = BuildError::from_cache(
            0,
            CacheError::Render(DomainError::invalid_date("date", "bogus")),
        );
        assert!(matches!(error, BuildError::MalformedEntry { index: 0, .. }));
    }
}

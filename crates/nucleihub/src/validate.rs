use std::path::Path;

/// Verdict of the external template validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    Valid,
    Invalid,
}

/// The validator could not be run at all.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("failed to run validator `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Other(String),
}

/// Checks a single template file before it is written to the output tree.
#[async_trait::async_trait]
pub trait TemplateValidator: Send + Sync {
    async fn validate(&self, path: &Path) -> Result<Validity, ValidationError>;
}

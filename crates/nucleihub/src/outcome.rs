use std::fmt;
use std::path::PathBuf;

/// The step of a fetch job that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    RemoveExisting,
    Clone,
    Download,
    Unzip,
    DeleteArchive,
}

/// One line of progress for a fetched source.
///
/// Purely informational: outcomes are printed and then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Cloned { url: String, dir: PathBuf },
    Downloaded { url: String, dir: PathBuf },
    Unzipped { url: String, dir: PathBuf },
    DeletedArchive { path: PathBuf },
    NotFound { url: String },
    /// `target` is the URL, or the path for filesystem stages.
    Failed {
        stage: Stage,
        target: String,
        message: String,
    },
    ExtractFailed { entry: String, message: String },
    Unsupported { url: String },
}

impl FetchOutcome {
    pub fn failed(stage: Stage, target: impl Into<String>, message: impl ToString) -> Self {
        Self::Failed {
            stage,
            target: target.into(),
            message: message.to_string(),
        }
    }

    /// True for outcomes that mean the source was not (fully) fetched.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. }
                | Self::Failed { .. }
                | Self::ExtractFailed { .. }
                | Self::Unsupported { .. }
        )
    }
}

impl fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cloned { url, dir } => write!(f, "[CLONED] {url} into {}", dir.display()),
            Self::Downloaded { url, dir } => {
                write!(f, "[DOWNLOADED] {url} into {}", dir.display())
            }
            Self::Unzipped { url, dir } => write!(f, "[UNZIPPED] {url} into {}", dir.display()),
            Self::DeletedArchive { path } => write!(f, "[DELETED] {}", path.display()),
            Self::NotFound { url } => write!(f, "[NOT FOUND] {url}"),
            Self::Failed {
                stage,
                target,
                message,
            } => match stage {
                Stage::RemoveExisting => {
                    write!(f, "Failed to remove existing directory {target}: {message}")
                }
                Stage::Clone => write!(f, "Error cloning repository {target}: {message}"),
                Stage::Download => write!(f, "Error downloading file {target}: {message}"),
                Stage::Unzip => write!(f, "Error unzipping file {target}: {message}"),
                Stage::DeleteArchive => {
                    write!(f, "Failed to delete .zip file {target}: {message}")
                }
            },
            Self::ExtractFailed { entry, message } => {
                write!(f, "Failed to extract {entry}: {message}")
            }
            Self::Unsupported { url } => write!(f, "Unsupported URL format: {url}"),
        }
    }
}

/// Everything that happened to one source URL, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchReport {
    pub url: String,
    pub outcomes: Vec<FetchOutcome>,
}

impl FetchReport {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            outcomes: Vec::new(),
        }
    }

    pub fn push(&mut self, outcome: FetchOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn is_success(&self) -> bool {
        !self.outcomes.iter().any(FetchOutcome::is_failure)
    }
}

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Errors that can occur while fetching a single source.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("repository not found: {0}")]
    NotFound(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("received non-success response: HTTP {status}")]
    Status { status: u16 },

    #[error("{0}")]
    Clone(String),

    #[error("extraction error: {0}")]
    Extraction(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single archive entry that could not be extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFailure {
    pub entry: String,
    pub message: String,
}

/// Result of extracting one archive. Entry failures do not fail the archive.
#[derive(Debug, Clone, Default)]
pub struct ExtractReport {
    pub extracted: Vec<PathBuf>,
    pub failures: Vec<EntryFailure>,
}

/// Clones a remote repository into a directory.
#[async_trait::async_trait]
pub trait RepoCloner: Send + Sync {
    /// Clone `url` into `dest`. A `depth` of 0 clones the full history.
    async fn clone_repo(&self, url: &str, dest: &Path, depth: u32) -> Result<(), FetchError>;
}

/// Downloads a single remote file.
#[async_trait::async_trait]
pub trait FileDownloader: Send + Sync {
    /// Stream `url` into the file at `dest`, creating its parent directory.
    /// Returns the number of bytes written.
    async fn download(&self, url: &str, dest: &Path) -> Result<u64, FetchError>;
}

/// Unpacks a downloaded archive.
#[async_trait::async_trait]
pub trait ArchiveExtractor: Send + Sync {
    /// Extract every entry of `archive` under `dest`.
    ///
    /// Returns `Err` only when the archive itself cannot be opened.
    async fn extract(&self, archive: &Path, dest: &Path) -> Result<ExtractReport, FetchError>;
}

/// The collaborators a fetch job dispatches to.
#[derive(Clone)]
pub struct FetchBackends {
    pub cloner: Arc<dyn RepoCloner>,
    pub downloader: Arc<dyn FileDownloader>,
    pub extractor: Arc<dyn ArchiveExtractor>,
}

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::fetch::{
    ArchiveExtractor, EntryFailure, ExtractReport, FetchBackends, FetchError, FileDownloader,
    RepoCloner,
};
use crate::validate::{TemplateValidator, ValidationError, Validity};

/// Bundle fakes into the backends a `Fetcher` expects.
pub fn backends(
    cloner: Arc<FakeCloner>,
    downloader: Arc<FakeDownloader>,
    extractor: Arc<FakeExtractor>,
) -> FetchBackends {
    FetchBackends {
        cloner,
        downloader,
        extractor,
    }
}

/// Write `content` to `path`, creating parent directories.
pub fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

/// Tracks how many calls are running at once.
#[derive(Default)]
struct InFlight {
    current: AtomicUsize,
    max: AtomicUsize,
}

impl InFlight {
    fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.max.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Cloner that creates the destination directory instead of running git.
#[derive(Default)]
pub struct FakeCloner {
    missing: HashSet<String>,
    delay: Option<Duration>,
    calls: Mutex<Vec<(String, PathBuf, u32)>>,
    in_flight: InFlight,
}

impl FakeCloner {
    /// Report these URLs as missing repositories.
    pub fn missing(urls: &[&str]) -> Self {
        Self {
            missing: urls.iter().map(|u| (*u).to_owned()).collect(),
            ..Self::default()
        }
    }

    /// Hold every clone for `delay` so concurrent calls overlap.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<(String, PathBuf, u32)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.in_flight.max.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl RepoCloner for FakeCloner {
    async fn clone_repo(&self, url: &str, dest: &Path, depth: u32) -> Result<(), FetchError> {
        self.in_flight.enter();
        self.calls
            .lock()
            .unwrap()
            .push((url.to_owned(), dest.to_path_buf(), depth));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let result = if self.missing.contains(url) {
            Err(FetchError::NotFound(url.to_owned()))
        } else {
            std::fs::create_dir_all(dest).map_err(FetchError::from)
        };
        self.in_flight.leave();
        result
    }
}

/// Downloader that writes the URL itself as the file body.
#[derive(Default)]
pub struct FakeDownloader {
    failing: HashSet<String>,
    calls: Mutex<Vec<(String, PathBuf)>>,
}

impl FakeDownloader {
    /// Answer these URLs with HTTP 404.
    pub fn failing(urls: &[&str]) -> Self {
        Self {
            failing: urls.iter().map(|u| (*u).to_owned()).collect(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<(String, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl FileDownloader for FakeDownloader {
    async fn download(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_owned(), dest.to_path_buf()));

        if self.failing.contains(url) {
            return Err(FetchError::Status { status: 404 });
        }
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(dest, url)?;
        Ok(url.len() as u64)
    }
}

/// Extractor that records calls and reports scripted entry failures.
#[derive(Default)]
pub struct FakeExtractor {
    failures: Vec<String>,
    calls: Mutex<Vec<(PathBuf, PathBuf)>>,
}

impl FakeExtractor {
    pub fn with_failures(entries: &[&str]) -> Self {
        Self {
            failures: entries.iter().map(|e| (*e).to_owned()).collect(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<(PathBuf, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ArchiveExtractor for FakeExtractor {
    async fn extract(&self, archive: &Path, dest: &Path) -> Result<ExtractReport, FetchError> {
        self.calls
            .lock()
            .unwrap()
            .push((archive.to_path_buf(), dest.to_path_buf()));

        Ok(ExtractReport {
            extracted: Vec::new(),
            failures: self
                .failures
                .iter()
                .map(|entry| EntryFailure {
                    entry: entry.clone(),
                    message: "scripted failure".into(),
                })
                .collect(),
        })
    }
}

/// Validator with a fixed verdict per path. Unlisted paths are valid.
#[derive(Default)]
pub struct ScriptedValidator {
    reject_all: bool,
    rejected: HashSet<PathBuf>,
    erroring: HashSet<PathBuf>,
}

impl ScriptedValidator {
    pub fn rejecting_all() -> Self {
        Self {
            reject_all: true,
            ..Self::default()
        }
    }

    pub fn rejecting(paths: &[PathBuf]) -> Self {
        Self {
            rejected: paths.iter().cloned().collect(),
            ..Self::default()
        }
    }

    pub fn erroring(paths: &[PathBuf]) -> Self {
        Self {
            erroring: paths.iter().cloned().collect(),
            ..Self::default()
        }
    }
}

#[async_trait::async_trait]
impl TemplateValidator for ScriptedValidator {
    async fn validate(&self, path: &Path) -> Result<Validity, ValidationError> {
        if self.erroring.contains(path) {
            return Err(ValidationError::Other(format!(
                "validator crashed on {}",
                path.display()
            )));
        }
        if self.reject_all || self.rejected.contains(path) {
            Ok(Validity::Invalid)
        } else {
            Ok(Validity::Valid)
        }
    }
}

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::fetch::{FetchBackends, FetchError};
use crate::outcome::{FetchOutcome, FetchReport, Stage};
use crate::source::{SourceDescriptor, SourceKind};

/// Settings for one `download` run.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub output_root: PathBuf,
    /// Maximum number of sources fetched at once. Values below 1 act as 1.
    pub concurrency: usize,
    /// Shallow-clone depth; 0 clones the full history.
    pub clone_depth: u32,
    /// Keep `.zip` files after extracting them.
    pub keep_archive: bool,
}

/// Totals for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchSummary {
    pub total: usize,
    pub failed: usize,
}

/// Fetches many sources with bounded concurrency.
pub struct Fetcher {
    config: FetchConfig,
    backends: FetchBackends,
}

impl Fetcher {
    pub fn new(config: FetchConfig, backends: FetchBackends) -> Self {
        Self { config, backends }
    }

    /// Fetch every URL, handing each report to `on_report` as its job ends.
    ///
    /// At most `concurrency` jobs run at once. Reports arrive in completion
    /// order. Every job is awaited before this returns; a failing source
    /// never stops the others.
    pub async fn run<F>(&self, urls: Vec<String>, mut on_report: F) -> FetchSummary
    where
        F: FnMut(&FetchReport),
    {
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let mut jobs = JoinSet::new();
        let mut summary = FetchSummary::default();

        for url in urls {
            let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                break;
            };

            let job = FetchJob {
                config: self.config.clone(),
                backends: self.backends.clone(),
            };
            jobs.spawn(async move {
                let report = job.process(url).await;
                drop(permit);
                report
            });

            while let Some(done) = jobs.try_join_next() {
                record(done, &mut summary, &mut on_report);
            }
        }

        while let Some(done) = jobs.join_next().await {
            record(done, &mut summary, &mut on_report);
        }

        summary
    }
}

fn record<F>(
    done: Result<FetchReport, tokio::task::JoinError>,
    summary: &mut FetchSummary,
    on_report: &mut F,
) where
    F: FnMut(&FetchReport),
{
    summary.total += 1;
    match done {
        Ok(report) => {
            if !report.is_success() {
                summary.failed += 1;
            }
            on_report(&report);
        }
        Err(e) => {
            summary.failed += 1;
            tracing::error!("fetch job aborted: {e}");
        }
    }
}

struct FetchJob {
    config: FetchConfig,
    backends: FetchBackends,
}

impl FetchJob {
    async fn process(&self, url: String) -> FetchReport {
        let descriptor = SourceDescriptor::classify(&url, &self.config.output_root);
        let mut report = FetchReport::new(url.clone());

        if descriptor.kind == SourceKind::Unsupported {
            tracing::debug!(%url, "no fetch action for URL suffix");
            report.push(FetchOutcome::Unsupported { url });
            return report;
        }

        if let Some(dir) = &descriptor.target_dir
            && let Err(e) = remove_existing(dir).await
        {
            report.push(FetchOutcome::failed(
                Stage::RemoveExisting,
                dir.display().to_string(),
                e,
            ));
            return report;
        }

        let dir = descriptor.destination(&self.config.output_root);
        match descriptor.kind {
            SourceKind::GitRepo => self.clone_repo(&url, &dir, &mut report).await,
            SourceKind::RawFile => {
                self.download(&descriptor, &dir, &mut report).await;
            }
            SourceKind::Archive => self.download_archive(&descriptor, &dir, &mut report).await,
            SourceKind::Unsupported => {}
        }

        report
    }

    async fn clone_repo(&self, url: &str, dir: &Path, report: &mut FetchReport) {
        tracing::debug!(%url, dir = %dir.display(), depth = self.config.clone_depth, "cloning");
        match self
            .backends
            .cloner
            .clone_repo(url, dir, self.config.clone_depth)
            .await
        {
            Ok(()) => report.push(FetchOutcome::Cloned {
                url: url.to_owned(),
                dir: dir.to_path_buf(),
            }),
            Err(FetchError::NotFound(_)) => report.push(FetchOutcome::NotFound {
                url: url.to_owned(),
            }),
            Err(e) => report.push(FetchOutcome::failed(Stage::Clone, url, e)),
        }
    }

    /// Returns the downloaded file's path on success.
    async fn download(
        &self,
        descriptor: &SourceDescriptor,
        dir: &Path,
        report: &mut FetchReport,
    ) -> Option<PathBuf> {
        let file = dir.join(descriptor.file_name());
        match self.backends.downloader.download(&descriptor.url, &file).await {
            Ok(bytes) => {
                tracing::debug!(url = %descriptor.url, bytes, "download complete");
                report.push(FetchOutcome::Downloaded {
                    url: descriptor.url.clone(),
                    dir: dir.to_path_buf(),
                });
                Some(file)
            }
            Err(e) => {
                report.push(FetchOutcome::failed(Stage::Download, &descriptor.url, e));
                None
            }
        }
    }

    async fn download_archive(
        &self,
        descriptor: &SourceDescriptor,
        dir: &Path,
        report: &mut FetchReport,
    ) {
        let Some(archive) = self.download(descriptor, dir, report).await else {
            return;
        };

        match self.backends.extractor.extract(&archive, dir).await {
            Ok(extracted) => {
                tracing::debug!(
                    url = %descriptor.url,
                    entries = extracted.extracted.len(),
                    failures = extracted.failures.len(),
                    "archive extracted"
                );
                for failure in extracted.failures {
                    report.push(FetchOutcome::ExtractFailed {
                        entry: failure.entry,
                        message: failure.message,
                    });
                }
                report.push(FetchOutcome::Unzipped {
                    url: descriptor.url.clone(),
                    dir: dir.to_path_buf(),
                });
            }
            Err(e) => report.push(FetchOutcome::failed(Stage::Unzip, &descriptor.url, e)),
        }

        if self.config.keep_archive {
            return;
        }
        match tokio::fs::remove_file(&archive).await {
            Ok(()) => report.push(FetchOutcome::DeletedArchive { path: archive }),
            Err(e) => report.push(FetchOutcome::failed(
                Stage::DeleteArchive,
                archive.display().to_string(),
                e,
            )),
        }
    }
}

/// Remove a previous fetch of the same source so every run starts clean.
async fn remove_existing(dir: &Path) -> std::io::Result<()> {
    if !tokio::fs::try_exists(dir).await? {
        return Ok(());
    }
    tracing::info!(dir = %dir.display(), "directory already exists, removing it");
    tokio::fs::remove_dir_all(dir).await
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::test_support::{FakeCloner, FakeDownloader, FakeExtractor, backends};

    fn config(root: &Path) -> FetchConfig {
        FetchConfig {
            output_root: root.to_path_buf(),
            concurrency: 4,
            clone_depth: 1,
            keep_archive: false,
        }
    }

    async fn run_collect(fetcher: &Fetcher, urls: &[&str]) -> (Vec<FetchReport>, FetchSummary) {
        let mut reports = Vec::new();
        let summary = fetcher
            .run(urls.iter().map(|u| (*u).to_owned()).collect(), |r| {
                reports.push(r.clone())
            })
            .await;
        (reports, summary)
    }

    #[tokio::test]
    async fn git_url_is_cloned_into_owner_repo_dir() {
        let root = tempfile::tempdir().unwrap();
        let cloner = Arc::new(FakeCloner::default());
        let fetcher = Fetcher::new(
            config(root.path()),
            backends(cloner.clone(), Arc::new(FakeDownloader::default()), Arc::new(FakeExtractor::default())),
        );

        let (reports, summary) = run_collect(&fetcher, &["https://github.com/a/b.git"]).await;

        assert_eq!(summary, FetchSummary { total: 1, failed: 0 });
        let dir = root.path().join("a-b");
        assert_eq!(
            reports[0].outcomes,
            vec![FetchOutcome::Cloned {
                url: "https://github.com/a/b.git".into(),
                dir: dir.clone(),
            }]
        );
        assert_eq!(cloner.calls(), vec![("https://github.com/a/b.git".to_owned(), dir, 1)]);
    }

    #[tokio::test]
    async fn missing_repository_reports_not_found() {
        let root = tempfile::tempdir().unwrap();
        let cloner = Arc::new(FakeCloner::missing(&["https://github.com/a/gone.git"]));
        let fetcher = Fetcher::new(
            config(root.path()),
            backends(cloner, Arc::new(FakeDownloader::default()), Arc::new(FakeExtractor::default())),
        );

        let (reports, summary) = run_collect(&fetcher, &["https://github.com/a/gone.git"]).await;

        assert_eq!(summary.failed, 1);
        assert_eq!(
            reports[0].outcomes,
            vec![FetchOutcome::NotFound {
                url: "https://github.com/a/gone.git".into()
            }]
        );
    }

    #[tokio::test]
    async fn unsupported_url_touches_nothing() {
        let root = tempfile::tempdir().unwrap();
        let existing = root.path().join("a-b");
        std::fs::create_dir_all(&existing).unwrap();

        let cloner = Arc::new(FakeCloner::default());
        let downloader = Arc::new(FakeDownloader::default());
        let fetcher = Fetcher::new(
            config(root.path()),
            backends(cloner.clone(), downloader.clone(), Arc::new(FakeExtractor::default())),
        );

        let (reports, _) = run_collect(&fetcher, &["https://github.com/a/b/blob/main/README.md"]).await;

        assert!(matches!(reports[0].outcomes[0], FetchOutcome::Unsupported { .. }));
        assert!(cloner.calls().is_empty());
        assert!(downloader.calls().is_empty());
        assert!(existing.exists());
    }

    #[tokio::test]
    async fn existing_target_is_removed_before_fetch() {
        let root = tempfile::tempdir().unwrap();
        let stale = root.path().join("a-b").join("stale.yaml");
        std::fs::create_dir_all(stale.parent().unwrap()).unwrap();
        std::fs::write(&stale, "old").unwrap();

        let downloader = Arc::new(FakeDownloader::default());
        let fetcher = Fetcher::new(
            config(root.path()),
            backends(Arc::new(FakeCloner::default()), downloader, Arc::new(FakeExtractor::default())),
        );

        run_collect(&fetcher, &["https://raw.githubusercontent.com/a/b/main/new.yaml"]).await;

        assert!(!stale.exists());
        assert!(root.path().join("a-b/new.yaml").exists());
    }

    #[tokio::test]
    async fn archive_is_downloaded_extracted_and_deleted() {
        let root = tempfile::tempdir().unwrap();
        let extractor = Arc::new(FakeExtractor::default());
        let fetcher = Fetcher::new(
            config(root.path()),
            backends(Arc::new(FakeCloner::default()), Arc::new(FakeDownloader::default()), extractor.clone()),
        );
        let url = "https://github.com/a/b/archive/refs/heads/main.zip";

        let (reports, _) = run_collect(&fetcher, &[url]).await;

        let dir = root.path().join("a-b");
        let archive = dir.join("main.zip");
        assert_eq!(
            reports[0].outcomes,
            vec![
                FetchOutcome::Downloaded { url: url.into(), dir: dir.clone() },
                FetchOutcome::Unzipped { url: url.into(), dir: dir.clone() },
                FetchOutcome::DeletedArchive { path: archive.clone() },
            ]
        );
        assert_eq!(extractor.calls(), vec![(archive.clone(), dir)]);
        assert!(!archive.exists());
    }

    #[tokio::test]
    async fn keep_archive_leaves_zip_in_place() {
        let root = tempfile::tempdir().unwrap();
        let mut cfg = config(root.path());
        cfg.keep_archive = true;
        let fetcher = Fetcher::new(
            cfg,
            backends(Arc::new(FakeCloner::default()), Arc::new(FakeDownloader::default()), Arc::new(FakeExtractor::default())),
        );

        let (reports, _) =
            run_collect(&fetcher, &["https://github.com/a/b/archive/refs/heads/main.zip"]).await;

        assert_eq!(reports[0].outcomes.len(), 2);
        assert!(root.path().join("a-b/main.zip").exists());
    }

    #[tokio::test]
    async fn failed_download_skips_extraction() {
        let root = tempfile::tempdir().unwrap();
        let url = "https://github.com/a/b/archive/refs/heads/main.zip";
        let extractor = Arc::new(FakeExtractor::default());
        let fetcher = Fetcher::new(
            config(root.path()),
            backends(
                Arc::new(FakeCloner::default()),
                Arc::new(FakeDownloader::failing(&[url])),
                extractor.clone(),
            ),
        );

        let (reports, summary) = run_collect(&fetcher, &[url]).await;

        assert_eq!(summary.failed, 1);
        assert_eq!(reports[0].outcomes.len(), 1);
        assert!(matches!(
            reports[0].outcomes[0],
            FetchOutcome::Failed { stage: Stage::Download, .. }
        ));
        assert!(extractor.calls().is_empty());
    }

    #[tokio::test]
    async fn entry_failures_are_reported_alongside_unzip() {
        let root = tempfile::tempdir().unwrap();
        let extractor = Arc::new(FakeExtractor::with_failures(&["bad/entry.yaml"]));
        let fetcher = Fetcher::new(
            config(root.path()),
            backends(Arc::new(FakeCloner::default()), Arc::new(FakeDownloader::default()), extractor),
        );

        let (reports, summary) =
            run_collect(&fetcher, &["https://github.com/a/b/archive/refs/heads/main.zip"]).await;

        assert_eq!(summary.failed, 1);
        assert!(reports[0].outcomes.iter().any(|o| matches!(o, FetchOutcome::ExtractFailed { entry, .. } if entry == "bad/entry.yaml")));
        assert!(reports[0].outcomes.iter().any(|o| matches!(o, FetchOutcome::Unzipped { .. })));
    }

    #[tokio::test]
    async fn in_flight_jobs_never_exceed_concurrency() {
        let root = tempfile::tempdir().unwrap();
        let cloner = Arc::new(FakeCloner::with_delay(Duration::from_millis(20)));
        let mut cfg = config(root.path());
        cfg.concurrency = 3;
        let fetcher = Fetcher::new(
            cfg,
            backends(cloner.clone(), Arc::new(FakeDownloader::default()), Arc::new(FakeExtractor::default())),
        );

        let urls: Vec<String> = (0..12)
            .map(|i| format!("https://github.com/owner/repo{i}.git"))
            .collect();
        let url_refs: Vec<&str> = urls.iter().map(String::as_str).collect();
        let (reports, summary) = run_collect(&fetcher, &url_refs).await;

        assert_eq!(reports.len(), 12);
        assert_eq!(summary, FetchSummary { total: 12, failed: 0 });
        assert!(cloner.max_in_flight() <= 3);
        assert!(cloner.max_in_flight() >= 1);
    }

    #[tokio::test]
    async fn zero_concurrency_still_makes_progress() {
        let root = tempfile::tempdir().unwrap();
        let mut cfg = config(root.path());
        cfg.concurrency = 0;
        let cloner = Arc::new(FakeCloner::default());
        let fetcher = Fetcher::new(
            cfg,
            backends(cloner.clone(), Arc::new(FakeDownloader::default()), Arc::new(FakeExtractor::default())),
        );

        let (reports, _) =
            run_collect(&fetcher, &["https://github.com/a/b.git", "https://github.com/a/c.git"]).await;

        assert_eq!(reports.len(), 2);
        assert_eq!(cloner.max_in_flight(), 1);
    }

    #[tokio::test]
    async fn rerun_yields_same_tree() {
        let root = tempfile::tempdir().unwrap();
        let fetcher = Fetcher::new(
            config(root.path()),
            backends(Arc::new(FakeCloner::default()), Arc::new(FakeDownloader::default()), Arc::new(FakeExtractor::default())),
        );
        let urls = ["https://raw.githubusercontent.com/a/b/main/x.yaml"];

        run_collect(&fetcher, &urls).await;
        let first: Vec<_> = std::fs::read_dir(root.path().join("a-b"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        run_collect(&fetcher, &urls).await;
        let second: Vec<_> = std::fs::read_dir(root.path().join("a-b"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();

        assert_eq!(first, second);
    }
}

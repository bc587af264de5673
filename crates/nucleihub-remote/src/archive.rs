use std::fs;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use nucleihub::{ArchiveExtractor, EntryFailure, ExtractReport, FetchError};
use tokio::task::JoinSet;
use zip::ZipArchive;

type SharedArchive = ZipArchive<Cursor<Arc<[u8]>>>;

/// Extracts zip archives, one blocking task per entry.
///
/// All entries of an archive are extracted at once; the number of tasks is
/// bounded by the entry count only, not by the fetch concurrency limit.
pub struct ZipExtractor;

#[async_trait::async_trait]
impl ArchiveExtractor for ZipExtractor {
    async fn extract(&self, archive: &Path, dest: &Path) -> Result<ExtractReport, FetchError> {
        let bytes: Arc<[u8]> = tokio::fs::read(archive).await?.into();
        let zip = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| FetchError::Extraction(format!("failed to open archive: {e}")))?;

        tokio::fs::create_dir_all(dest).await?;

        let mut tasks = JoinSet::new();
        for index in 0..zip.len() {
            let mut zip = zip.clone();
            let dest = dest.to_path_buf();
            tasks.spawn_blocking(move || extract_entry(&mut zip, index, &dest));
        }

        let mut report = ExtractReport::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(path)) => report.extracted.push(path),
                Ok(Err(failure)) => {
                    tracing::warn!(
                        entry = %failure.entry,
                        "failed to extract entry: {}",
                        failure.message
                    );
                    report.failures.push(failure);
                }
                Err(e) => report.failures.push(EntryFailure {
                    entry: archive.display().to_string(),
                    message: format!("extraction task failed: {e}"),
                }),
            }
        }
        report.extracted.sort();

        Ok(report)
    }
}

fn extract_entry(zip: &mut SharedArchive, index: usize, dest: &Path) -> Result<PathBuf, EntryFailure> {
    let mut entry = zip.by_index(index).map_err(|e| EntryFailure {
        entry: format!("#{index}"),
        message: e.to_string(),
    })?;

    let name = entry.name().to_owned();
    let fail = |message: String| EntryFailure {
        entry: name.clone(),
        message,
    };

    let relative = entry
        .enclosed_name()
        .ok_or_else(|| fail("entry path escapes the destination".into()))?;
    let target = dest.join(relative);

    if entry.is_dir() {
        fs::create_dir_all(&target).map_err(|e| fail(e.to_string()))?;
        return Ok(target);
    }

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| fail(e.to_string()))?;
    }
    let mut out = fs::File::create(&target).map_err(|e| fail(e.to_string()))?;
    io::copy(&mut entry, &mut out).map_err(|e| fail(e.to_string()))?;

    if let Some(mode) = entry.unix_mode() {
        apply_mode(&target, mode).map_err(|e| fail(e.to_string()))?;
    }

    Ok(target)
}

#[cfg(unix)]
fn apply_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(mode & 0o7777))
}

#[cfg(not(unix))]
fn apply_mode(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use walkdir::WalkDir;

use crate::template::{TEMPLATE_EXTENSION, logical_name, numbered_name};
use crate::validate::{TemplateValidator, Validity};

/// Settings for one `duplicate` run.
#[derive(Debug, Clone)]
pub struct DedupConfig {
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    /// Keep only the largest candidate of each group.
    pub large_content: bool,
    /// Write candidates without running the external validator.
    pub skip_validation: bool,
}

/// Errors that stop a deduplication run before any group is resolved.
#[derive(Debug, thiserror::Error)]
pub enum DedupError {
    #[error("cannot read input directory {}: {source}", .path.display())]
    InputRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("input path {} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("directory walk did not finish: {0}")]
    Walk(#[from] tokio::task::JoinError),
}

/// What happened to one candidate file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DedupEvent {
    Saved { source: PathBuf, dest: PathBuf },
    InvalidSkipped { path: PathBuf },
    Failed { path: PathBuf, message: String },
}

impl fmt::Display for DedupEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Saved { dest, .. } => write!(f, "Saved template to {}", dest.display()),
            Self::InvalidSkipped { path } => {
                write!(f, "Invalid template skipped: {}", path.display())
            }
            Self::Failed { path, message } => {
                write!(f, "Error processing template {}: {message}", path.display())
            }
        }
    }
}

/// Totals for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DedupSummary {
    pub groups: usize,
    pub saved: usize,
    pub invalid: usize,
    pub failed: usize,
    /// Saves that replaced a file written earlier in the same run.
    pub overwritten: usize,
}

impl DedupSummary {
    fn record(&mut self, event: &DedupEvent) {
        match event {
            DedupEvent::Saved { .. } => self.saved += 1,
            DedupEvent::InvalidSkipped { .. } => self.invalid += 1,
            DedupEvent::Failed { .. } => self.failed += 1,
        }
    }
}

/// Template paths keyed by logical name.
///
/// Both the names and each group's paths iterate in lexicographic order,
/// so resolution does not depend on filesystem enumeration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateGroups {
    groups: BTreeMap<String, Vec<PathBuf>>,
}

impl TemplateGroups {
    /// Walk `input_root` and group every `.yaml` regular file in it.
    ///
    /// Symlinks are not followed. Unreadable entries below the root are
    /// logged and skipped.
    pub fn collect(input_root: &Path) -> Result<Self, DedupError> {
        let root = std::path::absolute(input_root).map_err(|source| DedupError::InputRoot {
            path: input_root.to_path_buf(),
            source,
        })?;
        let meta = std::fs::metadata(&root).map_err(|source| DedupError::InputRoot {
            path: root.clone(),
            source,
        })?;
        if !meta.is_dir() {
            return Err(DedupError::NotADirectory(root));
        }

        let mut groups = Self::default();
        for entry in WalkDir::new(&root).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("skipping unreadable entry: {e}");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if entry
                .path()
                .extension()
                .is_none_or(|ext| ext != TEMPLATE_EXTENSION)
            {
                continue;
            }
            groups.insert(entry.into_path());
        }

        tracing::debug!(
            root = %root.display(),
            groups = groups.len(),
            "collected templates"
        );
        Ok(groups)
    }

    /// Add a path under the logical name of its file name.
    pub fn insert(&mut self, path: PathBuf) {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            tracing::warn!(path = %path.display(), "skipping non UTF-8 file name");
            return;
        };
        let candidates = self.groups.entry(logical_name(file_name)).or_default();
        let at = candidates.partition_point(|p| p < &path);
        candidates.insert(at, path);
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, logical: &str) -> Option<&[PathBuf]> {
        self.groups.get(logical).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PathBuf])> {
        self.groups
            .iter()
            .map(|(name, paths)| (name.as_str(), paths.as_slice()))
    }
}

/// Resolves template groups into the output directory.
pub struct Deduplicator {
    config: DedupConfig,
    validator: Arc<dyn TemplateValidator>,
}

impl Deduplicator {
    pub fn new(config: DedupConfig, validator: Arc<dyn TemplateValidator>) -> Self {
        Self { config, validator }
    }

    /// Walk the input tree and resolve every group, reporting each event.
    ///
    /// Only a missing or unreadable input root fails the run. Every other
    /// error is reported for its candidate and the run continues.
    pub async fn run<F>(&self, mut on_event: F) -> Result<DedupSummary, DedupError>
    where
        F: FnMut(&DedupEvent),
    {
        let input_root = self.config.input_root.clone();
        let groups =
            tokio::task::spawn_blocking(move || TemplateGroups::collect(&input_root)).await??;
        Ok(self.resolve(&groups, &mut on_event).await)
    }

    /// Resolve already-collected groups.
    pub async fn resolve<F>(&self, groups: &TemplateGroups, on_event: &mut F) -> DedupSummary
    where
        F: FnMut(&DedupEvent),
    {
        let mut summary = DedupSummary {
            groups: groups.len(),
            ..DedupSummary::default()
        };
        let mut written = HashSet::new();
        let mut emit = |event: DedupEvent| {
            if let DedupEvent::Saved { source, dest } = &event
                && !written.insert(dest.clone())
            {
                tracing::warn!(
                    source = %source.display(),
                    dest = %dest.display(),
                    "output name already used in this run, overwriting"
                );
                summary.overwritten += 1;
            }
            summary.record(&event);
            on_event(&event);
        };

        for (logical, candidates) in groups.iter() {
            if self.config.large_content {
                self.resolve_largest(logical, candidates, &mut emit).await;
            } else {
                self.resolve_all(logical, candidates, &mut emit).await;
            }
        }

        summary
    }

    /// The first candidate written takes the logical name; every later one
    /// is kept as `<stem>_<index>.yaml`.
    async fn resolve_all(
        &self,
        logical: &str,
        candidates: &[PathBuf],
        emit: &mut impl FnMut(DedupEvent),
    ) {
        let mut canonical_written = false;

        for (index, path) in candidates.iter().enumerate() {
            if !self.accept(path, emit).await {
                continue;
            }
            let name = if canonical_written {
                numbered_name(logical, index)
            } else {
                logical.to_owned()
            };
            let event = self.write(path, &name).await;
            if matches!(event, DedupEvent::Saved { .. }) {
                canonical_written = true;
            }
            emit(event);
        }
    }

    /// Only the strictly largest candidate is written; ties keep the first.
    async fn resolve_largest(
        &self,
        logical: &str,
        candidates: &[PathBuf],
        emit: &mut impl FnMut(DedupEvent),
    ) {
        let mut largest: Option<(&PathBuf, u64)> = None;

        for path in candidates {
            match tokio::fs::metadata(path).await {
                Ok(meta) => {
                    let size = meta.len();
                    if largest.is_none_or(|(_, best)| size > best) {
                        largest = Some((path, size));
                    }
                }
                Err(e) => emit(DedupEvent::Failed {
                    path: path.clone(),
                    message: format!("failed to read file info: {e}"),
                }),
            }
        }

        let Some((path, size)) = largest else {
            return;
        };
        tracing::debug!(logical, path = %path.display(), size, "largest candidate selected");

        if self.accept(path, emit).await {
            emit(self.write(path, logical).await);
        }
    }

    async fn accept(&self, path: &Path, emit: &mut impl FnMut(DedupEvent)) -> bool {
        if self.config.skip_validation {
            return true;
        }
        match self.validator.validate(path).await {
            Ok(Validity::Valid) => true,
            Ok(Validity::Invalid) => {
                emit(DedupEvent::InvalidSkipped {
                    path: path.to_path_buf(),
                });
                false
            }
            Err(e) => {
                emit(DedupEvent::Failed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                });
                false
            }
        }
    }

    async fn write(&self, source: &Path, name: &str) -> DedupEvent {
        let dest = self.config.output_root.join(name);
        match copy_verbatim(source, &self.config.output_root, &dest).await {
            Ok(()) => DedupEvent::Saved {
                source: source.to_path_buf(),
                dest,
            },
            Err(e) => DedupEvent::Failed {
                path: source.to_path_buf(),
                message: e.to_string(),
            },
        }
    }
}

async fn copy_verbatim(source: &Path, output_root: &Path, dest: &Path) -> std::io::Result<()> {
    let content = tokio::fs::read(source).await?;
    tokio::fs::create_dir_all(output_root).await?;
    tokio::fs::write(dest, content).await
}

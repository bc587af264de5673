use std::path::{Path, PathBuf};

/// How a source URL is fetched. Decided by the URL suffix alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// `.git`: cloned with git.
    GitRepo,
    /// `.yaml`: downloaded as a single file.
    RawFile,
    /// `.zip`: downloaded and extracted.
    Archive,
    /// Anything else. Nothing is fetched.
    Unsupported,
}

impl SourceKind {
    pub fn from_url(url: &str) -> Self {
        if url.ends_with(".git") {
            Self::GitRepo
        } else if url.ends_with(".zip") {
            Self::Archive
        } else if url.ends_with(".yaml") {
            Self::RawFile
        } else {
            Self::Unsupported
        }
    }
}

/// A host whose URLs carry `owner/repo` as their first two path segments.
struct KnownHost {
    prefix: &'static str,
    min_segments: usize,
    strip_git_suffix: bool,
}

const KNOWN_HOSTS: &[KnownHost] = &[
    KnownHost {
        prefix: "https://github.com/",
        min_segments: 2,
        strip_git_suffix: true,
    },
    KnownHost {
        prefix: "https://raw.githubusercontent.com/",
        min_segments: 3,
        strip_git_suffix: false,
    },
    KnownHost {
        prefix: "https://gist.githubusercontent.com/",
        min_segments: 3,
        strip_git_suffix: false,
    },
];

/// A source URL with the attributes derived from it.
///
/// Nothing here outlives a run; every field is recomputed from the URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDescriptor {
    pub url: String,
    pub kind: SourceKind,
    pub owner: Option<String>,
    pub repo: Option<String>,
    /// `output-root/{owner}-{repo}` for recognized hosts.
    pub target_dir: Option<PathBuf>,
}

impl SourceDescriptor {
    /// Classify `url` against the known hosts. The first matching host wins.
    pub fn classify(url: &str, output_root: &Path) -> Self {
        let kind = SourceKind::from_url(url);

        let owner_repo = KNOWN_HOSTS.iter().find_map(|host| {
            let rest = url.strip_prefix(host.prefix)?;
            let parts: Vec<&str> = rest.split('/').collect();
            if parts.len() < host.min_segments {
                return None;
            }
            let owner = parts[0];
            let repo = if host.strip_git_suffix {
                parts[1].strip_suffix(".git").unwrap_or(parts[1])
            } else {
                parts[1]
            };
            if owner.is_empty() || repo.is_empty() {
                return None;
            }
            Some((owner.to_owned(), repo.to_owned()))
        });

        match owner_repo {
            Some((owner, repo)) => Self {
                url: url.to_owned(),
                kind,
                target_dir: Some(output_root.join(format!("{owner}-{repo}"))),
                owner: Some(owner),
                repo: Some(repo),
            },
            None => Self {
                url: url.to_owned(),
                kind,
                owner: None,
                repo: None,
                target_dir: None,
            },
        }
    }

    /// Last path segment of the URL, used as the downloaded file name.
    pub fn file_name(&self) -> &str {
        self.url.rsplit('/').next().unwrap_or(&self.url)
    }

    /// Where the fetch writes.
    ///
    /// Unrecognized hosts have no target directory: downloads land in the
    /// output root and clones in a directory named after the repository.
    pub fn destination(&self, output_root: &Path) -> PathBuf {
        if let Some(dir) = &self.target_dir {
            return dir.clone();
        }
        match self.kind {
            SourceKind::GitRepo => {
                let name = self.file_name();
                output_root.join(name.strip_suffix(".git").unwrap_or(name))
            }
            _ => output_root.to_path_buf(),
        }
    }
}

use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;

use nucleihub::{FetchError, RepoCloner};
use tokio::process::Command;

/// Messages git prints when the remote repository does not exist.
///
/// GitHub answers anonymous clones of missing repositories with a
/// credential prompt, which fails once terminal prompts are disabled.
const MISSING_REPOSITORY_MARKERS: &[&str] = &["Repository not found", "could not read Username"];

/// Clones repositories by running the `git` binary.
pub struct GitCli {
    program: OsString,
}

impl GitCli {
    pub fn new() -> Self {
        Self::with_program("git")
    }

    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

/// Arguments for `git clone`. Depth 0 clones the full history.
pub fn clone_args(url: &str, dest: &Path, depth: u32) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["clone".into(), url.into(), dest.as_os_str().to_owned()];
    if depth > 0 {
        args.push("--depth".into());
        args.push(depth.to_string().into());
    }
    args
}

fn is_missing_repository(stderr: &str) -> bool {
    MISSING_REPOSITORY_MARKERS
        .iter()
        .any(|marker| stderr.contains(marker))
}

#[async_trait::async_trait]
impl RepoCloner for GitCli {
    async fn clone_repo(&self, url: &str, dest: &Path, depth: u32) -> Result<(), FetchError> {
        let output = Command::new(&self.program)
            .args(clone_args(url, dest, depth))
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                FetchError::Clone(format!(
                    "failed to run {}: {e}",
                    self.program.to_string_lossy()
                ))
            })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if is_missing_repository(&stderr) {
            return Err(FetchError::NotFound(url.to_owned()));
        }

        let message = stderr.trim();
        Err(FetchError::Clone(if message.is_empty() {
            format!("git exited with {}", output.status)
        } else {
            message.to_owned()
        }))
    }
}

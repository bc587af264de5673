use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const REPOSITORY: &str = env!("CARGO_PKG_REPOSITORY");

/// Top-level application configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub download: DownloadConfig,
    pub duplicate: DuplicateConfig,
    pub update: UpdateConfig,
}

/// Defaults for `nucleihub download`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DownloadConfig {
    pub output_directory: PathBuf,
    pub parallel: u32,
    pub depth: u32,
    pub keep_zip: bool,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            output_directory: default_download_root(),
            parallel: 10,
            depth: 1,
            keep_zip: false,
        }
    }
}

/// Defaults for `nucleihub duplicate`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DuplicateConfig {
    pub input_directory: PathBuf,
    pub output_directory: PathBuf,
    pub validator: ValidatorConfig,
}

impl Default for DuplicateConfig {
    fn default() -> Self {
        Self {
            input_directory: default_download_root(),
            output_directory: PathBuf::from("~/nucleihub-templates"),
            validator: ValidatorConfig::default(),
        }
    }
}

/// External program that checks a template. The template path is appended
/// to `args`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ValidatorConfig {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            program: "nuclei".into(),
            args: vec!["-validate".into(), "-t".into()],
        }
    }
}

/// Where `--update` looks for new releases and how it installs them.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct UpdateConfig {
    pub manifest_url: String,
    /// Program followed by its arguments.
    pub install: Vec<String>,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            manifest_url: default_manifest_url(),
            install: vec![
                "cargo".into(),
                "install".into(),
                "--git".into(),
                REPOSITORY.into(),
                "nucleihub-cli".into(),
                "--locked".into(),
            ],
        }
    }
}

fn default_download_root() -> PathBuf {
    PathBuf::from("~/nucleihub-downloaded-repos")
}

fn default_manifest_url() -> String {
    let path = REPOSITORY.trim_start_matches("https://github.com/");
    format!("https://raw.githubusercontent.com/{path}/refs/heads/main/Cargo.toml")
}

/// Config file path: `~/.config/nucleihub/config.toml`
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("nucleihub").join("config.toml"))
}

/// Load config from `explicit` or the default location, falling back to
/// defaults if the file is missing or malformed.
pub fn load_config(explicit: Option<&Path>) -> AppConfig {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => config_path(),
    };

    if let Some(path) = path {
        match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str::<AppConfig>(&contents) {
                Ok(config) => return config,
                Err(e) => tracing::warn!(
                    "failed to parse config at {}, using defaults: {e}",
                    path.display()
                ),
            },
            Err(e) if explicit.is_some() => tracing::warn!(
                "failed to read config at {}, using defaults: {e}",
                path.display()
            ),
            Err(_) => {}
        }
    }

    AppConfig::default()
}

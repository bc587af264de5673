use nucleihub::UpdateError;

use crate::USER_AGENT;

/// Read the published version out of a Cargo manifest.
///
/// Workspace manifests carry it under `[workspace.package]`, single crates
/// under `[package]`.
pub fn manifest_version(text: &str) -> Option<String> {
    let manifest: toml::Table = text.parse().ok()?;

    let from = |table: Option<&toml::Value>| {
        table
            .and_then(|t| t.get("version"))
            .and_then(|v| v.as_str())
            .map(str::to_owned)
    };

    let workspace_package = manifest.get("workspace").and_then(|w| w.get("package"));
    from(workspace_package).or_else(|| from(manifest.get("package")))
}

/// Looks up the latest released version from the upstream manifest.
pub struct ReleaseClient {
    client: reqwest::Client,
}

impl ReleaseClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub async fn latest_version(&self, manifest_url: &str) -> Result<String, UpdateError> {
        let response = self
            .client
            .get(manifest_url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .map_err(|e| UpdateError::Network(format!("failed to fetch latest version: {e}")))?;

        if !response.status().is_success() {
            return Err(UpdateError::Status {
                status: response.status().as_u16(),
                url: manifest_url.to_owned(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| UpdateError::Network(format!("failed to read response body: {e}")))?;

        manifest_version(&text).ok_or_else(|| UpdateError::VersionNotFound(manifest_url.to_owned()))
    }
}

impl Default for ReleaseClient {
    fn default() -> Self {
        Self::new()
    }
}

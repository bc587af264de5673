use std::path::Path;
use std::process::Stdio;

use nucleihub::{TemplateValidator, ValidationError, Validity};
use tokio::process::Command;

use crate::config::ValidatorConfig;

/// Validates templates by running the scanner with the template path
/// appended to its arguments. Exit status 0 means valid.
pub struct ScannerValidator {
    program: String,
    args: Vec<String>,
}

impl ScannerValidator {
    pub fn new(config: &ValidatorConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
        }
    }
}

#[async_trait::async_trait]
impl TemplateValidator for ScannerValidator {
    async fn validate(&self, path: &Path) -> Result<Validity, ValidationError> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|source| ValidationError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        tracing::debug!(path = %path.display(), %status, "validator finished");

        Ok(if status.success() {
            Validity::Valid
        } else {
            Validity::Invalid
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator(program: &str, args: &[&str]) -> ScannerValidator {
        ScannerValidator::new(&ValidatorConfig {
            program: program.into(),
            args: args.iter().map(|a| (*a).to_owned()).collect(),
        })
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn zero_exit_is_valid() {
        let result = validator("true", &[]).validate(Path::new("a.yaml")).await;
        assert_eq!(result.unwrap(), Validity::Valid);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_invalid() {
        let result = validator("false", &[]).validate(Path::new("a.yaml")).await;
        assert_eq!(result.unwrap(), Validity::Invalid);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn template_path_is_the_last_argument() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("present.yaml");
        std::fs::write(&present, "id: present\n").unwrap();
        let checker = validator("test", &["-f"]);

        assert_eq!(checker.validate(&present).await.unwrap(), Validity::Valid);
        assert_eq!(
            checker
                .validate(&dir.path().join("absent.yaml"))
                .await
                .unwrap(),
            Validity::Invalid
        );
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let result = validator("/nonexistent/nucleihub-test-scanner", &["-validate", "-t"])
            .validate(Path::new("a.yaml"))
            .await;

        assert!(matches!(result, Err(ValidationError::Spawn { .. })));
    }
}

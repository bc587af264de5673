use std::path::{Path, PathBuf};

/// Expand a leading `~/` or `$HOME` to the user's home directory.
///
/// Paths without either prefix, and every path when the home directory is
/// unknown, are returned unchanged.
pub fn expand_home(path: &Path) -> PathBuf {
    expand_with(path, dirs::home_dir())
}

fn expand_with(path: &Path, home: Option<PathBuf>) -> PathBuf {
    let (Some(raw), Some(home)) = (path.to_str(), home) else {
        return path.to_path_buf();
    };

    let rest = if raw == "~" {
        Some("")
    } else if let Some(rest) = raw.strip_prefix("~/") {
        Some(rest)
    } else {
        raw.strip_prefix("$HOME")
    };

    match rest.map(|r| r.trim_start_matches('/')) {
        Some("") => home,
        Some(rest) => home.join(rest),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn home() -> Option<PathBuf> {
        Some(PathBuf::from("/home/tester"))
    }

    #[test]
    fn tilde_prefix_expands() {
        assert_eq!(
            expand_with(Path::new("~/nucleihub-templates"), home()),
            PathBuf::from("/home/tester/nucleihub-templates")
        );
    }

    #[test]
    fn home_variable_expands() {
        assert_eq!(
            expand_with(Path::new("$HOME/repos"), home()),
            PathBuf::from("/home/tester/repos")
        );
        assert_eq!(expand_with(Path::new("$HOME"), home()), PathBuf::from("/home/tester"));
    }

    #[test]
    fn bare_tilde_is_home() {
        assert_eq!(expand_with(Path::new("~"), home()), PathBuf::from("/home/tester"));
    }

    #[test]
    fn other_paths_unchanged() {
        assert_eq!(expand_with(Path::new("/tmp/x"), home()), PathBuf::from("/tmp/x"));
        assert_eq!(expand_with(Path::new("rel/~/x"), home()), PathBuf::from("rel/~/x"));
        assert_eq!(expand_with(Path::new("~other/x"), home()), PathBuf::from("~other/x"));
    }

    #[test]
    fn unknown_home_leaves_path() {
        assert_eq!(expand_with(Path::new("~/x"), None), PathBuf::from("~/x"));
    }
}

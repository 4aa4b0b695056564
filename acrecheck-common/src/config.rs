//! Configuration file resolution
//!
//! Resolution priority for every acrecheck service:
//! 1. Explicit path in the service's environment variable
//! 2. Per-user config file (`~/.config/acrecheck/<service>.toml`)
//! 3. Compiled defaults (each service supplies its own `Default`)

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use std::path::PathBuf;

/// Locate the config file for a service, if one exists.
///
/// Checks the given environment variable first, then the platform config
/// directory. Returns `None` when neither yields an existing file, which
/// callers treat as "use compiled defaults".
pub fn resolve_config_path(env_var_name: &str, file_name: &str) -> Option<PathBuf> {
    if let Ok(path) = std::env::var(env_var_name) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
        tracing::warn!(
            "{} points at {} which does not exist; falling back",
            env_var_name,
            path.display()
        );
    }

    let user_config = dirs::config_dir().map(|d| d.join("acrecheck").join(file_name));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    None
}

/// Load and deserialize a TOML config file.
///
/// # Errors
/// Returns `Error::Config` when the file cannot be read or does not parse.
pub fn load_toml<T: DeserializeOwned>(path: &PathBuf) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("cannot parse {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Write;

    #[derive(Debug, Deserialize)]
    struct TestConfig {
        name: String,
        timeout_seconds: u64,
    }

    #[test]
    fn test_load_toml_parses_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("svc.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "name = \"gis\"\ntimeout_seconds = 15").unwrap();

        let config: TestConfig = load_toml(&path).unwrap();
        assert_eq!(config.name, "gis");
        assert_eq!(config.timeout_seconds, 15);
    }

    #[test]
    fn test_load_toml_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("svc.toml");
        std::fs::write(&path, "not = [valid").unwrap();

        let result: Result<TestConfig> = load_toml(&path);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_load_toml_read_failure_is_config_error() {
        let path = PathBuf::from("/no/such/dir/svc.toml");
        let result: Result<TestConfig> = load_toml(&path);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_missing_config_resolves_to_none() {
        let path = resolve_config_path("ACRECHECK_TEST_NO_SUCH_VAR", "no-such-service.toml");
        assert!(path.is_none());
    }
}

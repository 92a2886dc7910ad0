use super::Config;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Find config file in order of priority:
/// 1. Explicit --config flag path
/// 2. ./dockup.toml (current directory)
/// 3. ~/.config/dockup/dockup.toml
/// 4. ~/.dockup.toml
///
/// Returns `None` when no file exists; the built-in defaults apply then.
pub fn find_config_file(explicit_path: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit_path {
        if path.exists() {
            return Ok(Some(path.to_path_buf()));
        }
        anyhow::bail!("Config file not found: {}", path.display());
    }

    let cwd_config = PathBuf::from("./dockup.toml");
    if cwd_config.exists() {
        return Ok(Some(cwd_config));
    }

    if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join("dockup/dockup.toml");
        if config_path.exists() {
            return Ok(Some(config_path));
        }
    }

    if let Some(home_dir) = dirs::home_dir() {
        let home_config = home_dir.join(".dockup.toml");
        if home_config.exists() {
            return Ok(Some(home_config));
        }
    }

    Ok(None)
}

/// Load and parse config file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML config: {}", path.display()))?;

    Ok(config)
}

/// Load config with automatic discovery, falling back to defaults
pub fn load_config_auto(explicit_path: Option<&Path>) -> Result<(Option<PathBuf>, Config)> {
    match find_config_file(explicit_path)? {
        Some(path) => {
            let config = load_config(&path)?;
            log::info!("Loaded config from: {}", path.display());
            Ok((Some(path), config))
        }
        None => {
            log::debug!("No config file found, using built-in defaults");
            Ok((None, Config::default()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");

        let err = find_config_file(Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn loads_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[repository]\narchitecture = \"arm64\"").unwrap();

        let (path, config) = load_config_auto(Some(file.path())).unwrap();
        assert_eq!(path.as_deref(), Some(file.path()));
        assert_eq!(config.repository.architecture.as_deref(), Some("arm64"));
    }

    #[test]
    fn parse_errors_name_the_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[settings\nrequire_root = true").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse TOML config"));
    }
}

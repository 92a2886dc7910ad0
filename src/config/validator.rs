use super::{Config, PackagesConfig, RepositoryConfig};
use anyhow::Result;
use std::path::Path;

/// Validate config for correctness
pub fn validate_config(config: &Config) -> Result<()> {
    validate_packages(&config.packages)?;
    validate_repository(&config.repository)?;
    Ok(())
}

fn validate_packages(packages: &PackagesConfig) -> Result<()> {
    for (section, list) in [
        ("prerequisites", &packages.prerequisites),
        ("docker", &packages.docker),
    ] {
        if list.is_empty() {
            anyhow::bail!("packages.{} must not be empty", section);
        }
        for name in list {
            if !is_package_name(name) {
                anyhow::bail!("Invalid package name in packages.{}: '{}'", section, name);
            }
        }
    }
    Ok(())
}

fn validate_repository(repo: &RepositoryConfig) -> Result<()> {
    if !repo.url.starts_with("https://") || repo.url.len() <= "https://".len() {
        anyhow::bail!("repository.url must be an https:// URL, got '{}'", repo.url);
    }
    if repo.url.chars().any(char::is_whitespace) {
        anyhow::bail!("repository.url must not contain whitespace");
    }

    if !is_token(&repo.channel) {
        anyhow::bail!("repository.channel must be a single word, got '{}'", repo.channel);
    }
    if let Some(arch) = &repo.architecture {
        if !is_token(arch) {
            anyhow::bail!("repository.architecture must be a single word, got '{}'", arch);
        }
    }
    if let Some(codename) = &repo.codename {
        if !is_token(codename) {
            anyhow::bail!("repository.codename must be a single word, got '{}'", codename);
        }
    }

    for (field, path) in [
        ("keyring_dir", &repo.keyring_dir),
        ("keyring", &repo.keyring),
        ("source_list", &repo.source_list),
    ] {
        require_absolute(field, path)?;
    }

    if repo.keyring.parent() != Some(repo.keyring_dir.as_path()) {
        anyhow::bail!(
            "repository.keyring ({}) must be directly inside repository.keyring_dir ({})",
            repo.keyring.display(),
            repo.keyring_dir.display()
        );
    }

    Ok(())
}

fn require_absolute(field: &str, path: &Path) -> Result<()> {
    if !path.is_absolute() {
        anyhow::bail!("repository.{} must be an absolute path, got '{}'", field, path.display());
    }
    if path.to_string_lossy().chars().any(char::is_whitespace) {
        anyhow::bail!("repository.{} must not contain whitespace", field);
    }
    Ok(())
}

/// Debian policy: lowercase alphanumerics plus `+ - .`, at least two
/// characters, starting with an alphanumeric
fn is_package_name(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_ok = chars
        .next()
        .map_or(false, |c| c.is_ascii_lowercase() || c.is_ascii_digit());

    starts_ok
        && name.len() >= 2
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || "+-.".contains(c))
}

fn is_token(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_.".contains(c))
}

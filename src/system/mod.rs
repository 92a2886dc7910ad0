use crate::config::RepositoryConfig;
use crate::runner::{Command, Runner};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub const OS_RELEASE: &str = "/etc/os-release";

const ARCH_PLACEHOLDER: &str = "$(dpkg --print-architecture)";
const CODENAME_PLACEHOLDER: &str = "$(lsb_release -cs)";

/// Facts about the target host needed to register the repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostFacts {
    pub architecture: String,
    pub codename: String,
}

/// Resolve host facts from config overrides, probing the host for the rest.
///
/// With `tolerate_missing` a failed probe yields a shell-style placeholder
/// instead of an error, so a plan can be displayed on any machine.
pub fn resolve_host_facts(
    repo: &RepositoryConfig,
    runner: &mut dyn Runner,
    tolerate_missing: bool,
) -> Result<HostFacts> {
    let architecture = match &repo.architecture {
        Some(arch) => arch.clone(),
        None => fallback(probe_architecture(runner), ARCH_PLACEHOLDER, tolerate_missing)?,
    };

    let codename = match &repo.codename {
        Some(codename) => codename.clone(),
        None => fallback(
            probe_codename(runner, Path::new(OS_RELEASE)),
            CODENAME_PLACEHOLDER,
            tolerate_missing,
        )?,
    };

    log::debug!("Host facts: arch={} codename={}", architecture, codename);

    Ok(HostFacts {
        architecture,
        codename,
    })
}

fn fallback(probed: Result<String>, placeholder: &str, tolerate_missing: bool) -> Result<String> {
    match probed {
        Ok(value) => Ok(value),
        Err(e) if tolerate_missing => {
            log::warn!("{:#}; showing {} instead", e, placeholder);
            Ok(placeholder.to_string())
        }
        Err(e) => Err(e),
    }
}

/// Package architecture as dpkg names it (amd64, arm64, ...)
pub fn probe_architecture(runner: &mut dyn Runner) -> Result<String> {
    let arch = runner
        .query(&Command::new("dpkg").arg("--print-architecture"))
        .context("Could not determine package architecture (set repository.architecture)")?;

    if arch.is_empty() {
        anyhow::bail!("dpkg reported an empty architecture (set repository.architecture)");
    }
    Ok(arch)
}

/// Distribution codename from os-release, or lsb_release when that has none
pub fn probe_codename(runner: &mut dyn Runner, os_release: &Path) -> Result<String> {
    match fs::read_to_string(os_release) {
        Ok(content) => {
            if let Some(codename) = parse_os_release_codename(&content) {
                return Ok(codename);
            }
            log::debug!("{} has no VERSION_CODENAME", os_release.display());
        }
        Err(e) => log::debug!("Could not read {}: {}", os_release.display(), e),
    }

    let codename = runner
        .query(&Command::new("lsb_release").arg("-cs"))
        .context("Could not determine distribution codename (set repository.codename)")?;

    if codename.is_empty() {
        anyhow::bail!("lsb_release reported an empty codename (set repository.codename)");
    }
    Ok(codename)
}

/// Extract `VERSION_CODENAME` from os-release content
pub fn parse_os_release_codename(content: &str) -> Option<String> {
    content
        .lines()
        .filter_map(|line| line.trim().strip_prefix("VERSION_CODENAME="))
        .map(|value| value.trim().trim_matches(|c| c == '"' || c == '\'').to_string())
        .find(|value| !value.is_empty())
}

/// Whether the effective user is root
pub fn is_root(runner: &mut dyn Runner) -> Result<bool> {
    let uid = runner
        .query(&Command::new("id").arg("-u"))
        .context("Failed to determine effective user id")?;
    Ok(uid == "0")
}

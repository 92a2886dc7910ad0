use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,

    #[serde(default)]
    pub repository: RepositoryConfig,

    #[serde(default)]
    pub packages: PackagesConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Refuse to run unless the effective user is root
    #[serde(default = "default_true")]
    pub require_root: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            require_root: default_true(),
        }
    }
}

/// Where Docker's apt repository lives and where its files land on disk
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RepositoryConfig {
    pub url: String,
    pub channel: String,
    pub keyring_dir: PathBuf,
    pub keyring: PathBuf,
    pub source_list: PathBuf,

    /// Overrides `dpkg --print-architecture`
    pub architecture: Option<String>,

    /// Overrides the codename read from /etc/os-release
    pub codename: Option<String>,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            url: "https://download.docker.com/linux/debian".to_string(),
            channel: "stable".to_string(),
            keyring_dir: PathBuf::from("/etc/apt/keyrings"),
            keyring: PathBuf::from("/etc/apt/keyrings/docker.gpg"),
            source_list: PathBuf::from("/etc/apt/sources.list.d/docker.list"),
            architecture: None,
            codename: None,
        }
    }
}

impl RepositoryConfig {
    /// URL of the ASCII-armored signing key
    pub fn key_url(&self) -> String {
        format!("{}/gpg", self.url.trim_end_matches('/'))
    }

    /// The single line written to the apt source list
    pub fn source_line(&self, architecture: &str, codename: &str) -> String {
        format!(
            "deb [arch={} signed-by={}] {} {} {}",
            architecture,
            self.keyring.display(),
            self.url.trim_end_matches('/'),
            codename,
            self.channel
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackagesConfig {
    /// Installed before the repository is registered
    #[serde(default = "default_prerequisites")]
    pub prerequisites: Vec<String>,

    /// Installed from the Docker repository
    #[serde(default = "default_docker_packages")]
    pub docker: Vec<String>,
}

fn default_prerequisites() -> Vec<String> {
    ["ca-certificates", "curl", "gnupg", "lsb-release"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_docker_packages() -> Vec<String> {
    [
        "docker-ce",
        "docker-ce-cli",
        "containerd.io",
        "docker-buildx-plugin",
        "docker-compose-plugin",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for PackagesConfig {
    fn default() -> Self {
        Self {
            prerequisites: default_prerequisites(),
            docker: default_docker_packages(),
        }
    }
}

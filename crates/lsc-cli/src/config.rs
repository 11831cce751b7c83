use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use lsc_core::Policy;
use serde::Deserialize;

use crate::error::CliError;

pub const CONFIG_NAME: &str = ".linode-ssh-config.toml";
pub const SSH_CONFIG_PATH: &str = ".ssh/config";

const API_KEY_ENV: &str = "LINODE_API_KEY";

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    linode: LinodeSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct LinodeSection {
    api_key: Option<String>,
    /// Display groups to include; empty means all.
    #[serde(default)]
    display_group: Vec<String>,
    /// Only consider running Linodes.
    #[serde(default)]
    running: bool,
    user: Option<String>,
    identity_file: Option<String>,
}

/// Resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub policy: Policy,
}

impl Settings {
    /// Read the settings file. `LINODE_API_KEY` overrides the file's key.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let content = fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                CliError::ConfigNotFound(path.to_path_buf())
            } else {
                CliError::ConfigRead {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        Self::parse(path, &content, env::var(API_KEY_ENV).ok())
    }

    fn parse(path: &Path, content: &str, env_api_key: Option<String>) -> Result<Self, CliError> {
        let file: SettingsFile = toml::from_str(content).map_err(|source| CliError::ConfigInvalid {
            path: path.to_path_buf(),
            source,
        })?;
        let section = file.linode;

        let api_key = env_api_key
            .filter(|k| !k.is_empty())
            .or(section.api_key)
            .filter(|k| !k.is_empty())
            .ok_or(CliError::MissingApiKey)?;

        let policy = Policy::new(section.display_group, section.running)
            .with_user(section.user)
            .with_identity_file(section.identity_file);

        Ok(Self { api_key, policy })
    }
}

fn home_dir() -> Result<PathBuf, CliError> {
    dirs::home_dir().ok_or(CliError::NoHomeDir)
}

/// `~/.linode-ssh-config.toml`
pub fn default_config_path() -> Result<PathBuf, CliError> {
    Ok(home_dir()?.join(CONFIG_NAME))
}

/// `~/.ssh/config`
pub fn default_ssh_config_path() -> Result<PathBuf, CliError> {
    Ok(home_dir()?.join(SSH_CONFIG_PATH))
}

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("no config file found at: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("failed to read config file {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", path.display())]
    ConfigInvalid {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("no api key configured (set api-key under [linode] or LINODE_API_KEY)")]
    MissingApiKey,

    #[error("cannot determine home directory")]
    NoHomeDir,

    #[error("{0}")]
    Inventory(#[from] lsc_core::Error),

    #[error("{0}")]
    SshConfig(#[from] lsc_ssh::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

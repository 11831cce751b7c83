//! Managed block inside an SSH client config file.
//!
//! Generated host entries live between two marker lines. Everything outside
//! the markers belongs to the user and is carried over untouched on every
//! run; everything inside is thrown away and regenerated.

pub mod extract;
pub mod merge;
pub mod render;

use std::path::PathBuf;

pub use extract::{strip_generated, user_content};
pub use merge::{SshConfigFile, Update, backup_path, update};
pub use render::{RenderedBlock, render_block};

pub const START_MARKER: &str = "##### START GENERATED LINODE-SSH-CONFIG #####";
pub const END_MARKER: &str = "##### END GENERATED LINODE-SSH-CONFIG #####";

/// Appended to the target path to name the pre-write backup.
pub const BACKUP_SUFFIX: &str = ".linode-ssh-config.bak";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to back up to {}: {source}", path.display())]
    Backup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to render host entries: {0}")]
    Render(#[from] std::fmt::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

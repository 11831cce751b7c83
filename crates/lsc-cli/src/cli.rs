use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use lsc_core::Policy;

/// Generate SSH host entries for your Linodes.
#[derive(Debug, Parser)]
#[command(name = "linode-ssh-config", version)]
pub struct Cli {
    /// Settings file (default: ~/.linode-ssh-config.toml).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// SSH config to merge into (default: ~/.ssh/config).
    #[arg(long, global = true, value_name = "PATH")]
    pub ssh_config: Option<PathBuf>,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(flatten)]
    pub policy: PolicyArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Print the merged SSH config to stdout (default)
    Render,

    /// Back up the SSH config and rewrite its generated block
    Update,

    /// List machines by display group
    List,
}

/// Overrides for the settings file's selection and rendering options.
#[derive(Debug, Clone, Default, Args)]
pub struct PolicyArgs {
    /// Only include this display group (repeatable; replaces configured groups).
    #[arg(long = "group", global = true, value_name = "TAG")]
    pub groups: Vec<String>,

    /// Only include running machines.
    #[arg(long, global = true)]
    pub running: bool,

    /// SSH login user.
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// SSH identity file.
    #[arg(long, global = true, value_name = "PATH")]
    pub identity_file: Option<String>,
}

impl PolicyArgs {
    pub fn apply(&self, policy: Policy) -> Policy {
        let groups = if self.groups.is_empty() {
            policy.groups().to_vec()
        } else {
            self.groups.clone()
        };
        let user = self
            .user
            .clone()
            .or_else(|| policy.user().map(String::from));
        let identity_file = self
            .identity_file
            .clone()
            .or_else(|| policy.identity_file().map(String::from));

        Policy::new(groups, policy.running_only() || self.running)
            .with_user(user)
            .with_identity_file(identity_file)
    }
}

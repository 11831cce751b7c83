pub mod directory;
pub mod linode;
pub mod policy;
pub mod types;

use std::collections::HashMap;

use async_trait::async_trait;

pub use directory::Directory;
pub use policy::{Policy, eligible};
pub use types::{Address, Machine, MachineId};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("linode provider error: {0}")]
    Linode(#[from] linode_api::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Source of machine inventory.
///
/// Implementations return complete lists; paging and batching stay behind
/// this trait.
#[async_trait]
pub trait MachineSource: Send + Sync {
    /// Every machine visible to the credential.
    async fn fetch_machines(&self) -> Result<Vec<Machine>>;

    /// Addresses for the given machines, keyed by owner.
    async fn fetch_addresses(&self, ids: &[MachineId]) -> Result<HashMap<MachineId, Vec<Address>>>;
}

/// Fetch machines and their addresses, then build the grouped directory.
pub async fn fetch_directory(source: &dyn MachineSource) -> Result<Directory> {
    let machines = source.fetch_machines().await?;
    let ids: Vec<MachineId> = machines.iter().map(|m| m.id).collect();
    let addresses = source.fetch_addresses(&ids).await?;

    tracing::info!(
        machines = machines.len(),
        with_addresses = addresses.len(),
        "inventory fetched"
    );

    Ok(Directory::build(machines, addresses))
}

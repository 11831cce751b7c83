use std::collections::HashMap;

use async_trait::async_trait;
use tracing::info;

use crate::types::{Address, Machine, MachineId};
use crate::{MachineSource, Result};

/// Linode inventory source.
///
/// Delegates to `linode_api::LinodeClient` for all HTTP calls.
pub struct LinodeSource {
    client: linode_api::LinodeClient,
}

impl LinodeSource {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: linode_api::LinodeClient::new(api_key),
        }
    }

    fn to_machine(linode: linode_api::Linode) -> Machine {
        Machine {
            id: MachineId(linode.id),
            running: linode.is_running(),
            label: linode.label,
            group: linode.display_group,
            ram_mb: linode.total_ram,
            addresses: Vec::new(),
        }
    }

    fn group_ips(ips: Vec<linode_api::LinodeIp>) -> HashMap<MachineId, Vec<Address>> {
        let mut by_machine: HashMap<MachineId, Vec<Address>> = HashMap::new();
        for ip in ips {
            let machine_id = MachineId(ip.linode_id);
            let public = ip.is_public();
            by_machine
                .entry(machine_id)
                .or_default()
                .push(Address::new(machine_id, ip.address, public));
        }
        by_machine
    }
}

#[async_trait]
impl MachineSource for LinodeSource {
    async fn fetch_machines(&self) -> Result<Vec<Machine>> {
        let linodes = self.client.list_linodes().await?;
        info!(count = linodes.len(), "linode: listed machines");
        Ok(linodes.into_iter().map(Self::to_machine).collect())
    }

    async fn fetch_addresses(&self, ids: &[MachineId]) -> Result<HashMap<MachineId, Vec<Address>>> {
        let raw_ids: Vec<i64> = ids.iter().map(|id| id.0).collect();
        let ips = self.client.list_ips(&raw_ids).await?;
        info!(count = ips.len(), "linode: listed addresses");
        Ok(Self::group_ips(ips))
    }
}

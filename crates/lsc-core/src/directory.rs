use std::collections::{BTreeMap, HashMap};

use crate::policy::Policy;
use crate::types::{Address, Machine, MachineId};

/// Machines grouped by display group.
///
/// Groups iterate in ascending tag order (the ungrouped tag `""` first).
/// Within a group machines are ordered by label, and each machine's
/// addresses list public ones first. Both sorts are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
    groups: BTreeMap<String, Vec<Machine>>,
}

impl Directory {
    /// Attach addresses to their machines, then group and sort.
    pub fn build(machines: Vec<Machine>, mut addresses: HashMap<MachineId, Vec<Address>>) -> Self {
        let mut groups: BTreeMap<String, Vec<Machine>> = BTreeMap::new();

        for mut machine in machines {
            if let Some(mut ips) = addresses.remove(&machine.id) {
                ips.sort_by_key(|a| !a.public);
                machine.addresses = ips;
            }
            groups.entry(machine.group.clone()).or_default().push(machine);
        }

        for members in groups.values_mut() {
            members.sort_by(|a, b| a.label.cmp(&b.label));
        }

        Self { groups }
    }

    /// Ordered `(tag, machines)` pairs.
    pub fn groups(&self) -> impl Iterator<Item = (&str, &[Machine])> {
        self.groups
            .iter()
            .map(|(tag, machines)| (tag.as_str(), machines.as_slice()))
    }

    pub fn group(&self, tag: &str) -> Option<&[Machine]> {
        self.groups.get(tag).map(Vec::as_slice)
    }

    pub fn machines(&self) -> impl Iterator<Item = &Machine> {
        self.groups.values().flatten()
    }

    /// Total number of machines across all groups.
    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy holding only the machines the policy accepts. Groups left
    /// without machines are dropped.
    pub fn filtered(&self, policy: &Policy) -> Self {
        let groups = self
            .groups
            .iter()
            .filter(|(tag, _)| policy.accepts_group(tag))
            .filter_map(|(tag, machines)| {
                let kept: Vec<Machine> = machines
                    .iter()
                    .filter(|m| policy.is_eligible(m))
                    .cloned()
                    .collect();
                (!kept.is_empty()).then(|| (tag.clone(), kept))
            })
            .collect();

        Self { groups }
    }
}

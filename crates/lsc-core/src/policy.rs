use std::collections::HashSet;

use crate::types::Machine;

/// User-chosen selection and rendering options.
///
/// An empty group list matches every group. The lookup set is derived once
/// here, so the policy is read-only after construction.
#[derive(Debug, Clone, Default)]
pub struct Policy {
    groups: Vec<String>,
    group_lookup: HashSet<String>,
    running_only: bool,
    user: Option<String>,
    identity_file: Option<String>,
}

impl Policy {
    pub fn new(groups: Vec<String>, running_only: bool) -> Self {
        let group_lookup = groups.iter().cloned().collect();
        Self {
            groups,
            group_lookup,
            running_only,
            user: None,
            identity_file: None,
        }
    }

    /// SSH login user. Empty strings count as unset.
    pub fn with_user(mut self, user: Option<String>) -> Self {
        self.user = user.filter(|u| !u.is_empty());
        self
    }

    /// SSH identity file path. Empty strings count as unset.
    pub fn with_identity_file(mut self, identity_file: Option<String>) -> Self {
        self.identity_file = identity_file.filter(|p| !p.is_empty());
        self
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn running_only(&self) -> bool {
        self.running_only
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn identity_file(&self) -> Option<&str> {
        self.identity_file.as_deref()
    }

    pub fn accepts_group(&self, group: &str) -> bool {
        self.groups.is_empty() || self.group_lookup.contains(group)
    }

    fn accepts_running(&self, running: bool) -> bool {
        !self.running_only || running
    }

    pub fn is_eligible(&self, machine: &Machine) -> bool {
        self.accepts_running(machine.running) && self.accepts_group(&machine.group)
    }
}

/// Whether `machine` should be rendered under `policy`.
pub fn eligible(machine: &Machine, policy: &Policy) -> bool {
    policy.is_eligible(machine)
}

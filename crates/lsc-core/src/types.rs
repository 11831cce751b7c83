use std::fmt;

/// Provider-assigned machine identifier (the Linode ID).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MachineId(pub i64);

impl fmt::Display for MachineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An IP address attached to a machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub machine_id: MachineId,
    pub ip: String,
    pub public: bool,
}

impl Address {
    pub fn new(machine_id: MachineId, ip: impl Into<String>, public: bool) -> Self {
        Self {
            machine_id,
            ip: ip.into(),
            public,
        }
    }
}

/// A virtual machine as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Machine {
    pub id: MachineId,
    pub label: String,
    /// Display group; empty means ungrouped.
    pub group: String,
    pub running: bool,
    pub ram_mb: u32,
    /// Public addresses first once the machine sits in a `Directory`.
    pub addresses: Vec<Address>,
}

impl Machine {
    pub fn new(id: i64, label: impl Into<String>, group: impl Into<String>, running: bool) -> Self {
        Self {
            id: MachineId(id),
            label: label.into(),
            group: group.into(),
            running,
            ram_mb: 0,
            addresses: Vec::new(),
        }
    }

    pub fn with_ram_mb(mut self, ram_mb: u32) -> Self {
        self.ram_mb = ram_mb;
        self
    }

    /// First public address, if any.
    pub fn public_address(&self) -> Option<&str> {
        self.addresses
            .iter()
            .find(|a| a.public)
            .map(|a| a.ip.as_str())
    }

    /// First private address, if any.
    pub fn private_address(&self) -> Option<&str> {
        self.addresses
            .iter()
            .find(|a| !a.public)
            .map(|a| a.ip.as_str())
    }
}

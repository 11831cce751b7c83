use std::fmt::Write;

use lsc_core::{Directory, Machine, Policy};
use tracing::debug;

use crate::{END_MARKER, Result, START_MARKER};

const INDENT: &str = "        ";

/// The generated section, markers included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBlock {
    pub text: String,
    /// Number of `Host` stanzas in `text`.
    pub hosts: usize,
}

/// One `Host` stanza. Directives are written in insertion order.
struct HostEntry<'a> {
    host: &'a str,
    directives: Vec<(&'static str, String)>,
}

impl<'a> HostEntry<'a> {
    /// `None` when the machine has no public address to connect to.
    fn for_machine(machine: &'a Machine, policy: &Policy) -> Option<Self> {
        let hostname = machine.public_address()?;

        let mut directives = vec![
            (
                "#",
                format!(
                    "{} | Linode ID {} | {}m Ram",
                    machine.group, machine.id, machine.ram_mb
                ),
            ),
            ("Hostname", hostname.to_string()),
        ];
        if let Some(user) = policy.user() {
            directives.push(("User", user.to_string()));
        }
        if let Some(identity_file) = policy.identity_file() {
            directives.push(("IdentityFile", identity_file.to_string()));
        }

        Some(Self {
            host: &machine.label,
            directives,
        })
    }

    /// Stanzas end with a truly empty line, not an indented blank one.
    fn write_to(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, "Host {}", self.host)?;
        for (key, value) in &self.directives {
            writeln!(out, "{INDENT}{key} {value}")?;
        }
        writeln!(out)
    }
}

/// Render every eligible machine with a public address, group by group.
pub fn render_block(directory: &Directory, policy: &Policy) -> Result<RenderedBlock> {
    let mut text = String::new();
    let mut hosts = 0;

    write!(text, "{START_MARKER}\n\n")?;

    for (group, machines) in directory.groups() {
        if !policy.accepts_group(group) {
            continue;
        }
        if !group.is_empty() {
            write!(text, "## {group}\n\n")?;
        }

        for machine in machines.iter().filter(|m| policy.is_eligible(m)) {
            match HostEntry::for_machine(machine, policy) {
                Some(entry) => {
                    entry.write_to(&mut text)?;
                    hosts += 1;
                }
                None => debug!(label = %machine.label, id = %machine.id, "no public address, skipping"),
            }
        }
    }

    writeln!(text, "{END_MARKER}")?;

    Ok(RenderedBlock { text, hosts })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use lsc_core::{Address, MachineId};

    use super::*;

    fn directory(machines: Vec<Machine>, addresses: &[(i64, &str, bool)]) -> Directory {
        let mut by_id: HashMap<MachineId, Vec<Address>> = HashMap::new();
        for &(id, ip, public) in addresses {
            by_id
                .entry(MachineId(id))
                .or_default()
                .push(Address::new(MachineId(id), ip, public));
        }
        Directory::build(machines, by_id)
    }

    #[test]
    fn running_filter_scenario() {
        let dir = directory(
            vec![
                Machine::new(1, "web", "prod", true).with_ram_mb(1024),
                Machine::new(2, "db", "prod", false).with_ram_mb(4096),
            ],
            &[(1, "203.0.113.5", true)],
        );
        let policy = Policy::new(Vec::new(), true);

        let block = render_block(&dir, &policy).unwrap();
        let expected = format!(
            "{START_MARKER}\n\
             \n\
             ## prod\n\
             \n\
             Host web\n        \
             # prod | Linode ID 1 | 1024m Ram\n        \
             Hostname 203.0.113.5\n\
             \n\
             {END_MARKER}\n"
        );
        assert_eq!(block.text, expected);
        assert_eq!(block.hosts, 1);
        assert!(!block.text.contains("Host db"));
    }

    #[test]
    fn stanza_separator_is_an_empty_line() {
        let dir = directory(
            vec![
                Machine::new(1, "a", "prod", true),
                Machine::new(2, "b", "prod", true),
            ],
            &[(1, "203.0.113.1", true), (2, "203.0.113.2", true)],
        );

        let text = render_block(&dir, &Policy::default()).unwrap().text;
        assert!(text.contains("Hostname 203.0.113.1\n\nHost b\n"));
        assert!(text.contains("Hostname 203.0.113.2\n\n"));
        assert!(!text.contains(&format!("{INDENT}\n")));
    }

    #[test]
    fn user_and_identity_file_follow_hostname() {
        let dir = directory(
            vec![Machine::new(5, "app", "", true).with_ram_mb(2048)],
            &[(5, "192.168.0.5", false), (5, "198.51.100.7", true)],
        );
        let policy = Policy::default()
            .with_user(Some("deploy".into()))
            .with_identity_file(Some("~/.ssh/deploy".into()));

        let block = render_block(&dir, &policy).unwrap();
        let expected = format!(
            "{START_MARKER}\n\
             \n\
             Host app\n        \
             #  | Linode ID 5 | 2048m Ram\n        \
             Hostname 198.51.100.7\n        \
             User deploy\n        \
             IdentityFile ~/.ssh/deploy\n\
             \n\
             {END_MARKER}\n"
        );
        assert_eq!(block.text, expected);
    }

    #[test]
    fn machine_with_only_private_addresses_is_skipped() {
        let dir = directory(
            vec![
                Machine::new(1, "internal", "prod", true),
                Machine::new(2, "edge", "prod", true),
            ],
            &[(1, "192.168.0.1", false), (2, "203.0.113.2", true)],
        );

        let block = render_block(&dir, &Policy::default()).unwrap();
        assert_eq!(block.hosts, 1);
        assert!(block.text.contains("Host edge\n"));
        assert!(!block.text.contains("Host internal"));
    }

    #[test]
    fn groups_outside_policy_are_not_rendered() {
        let dir = directory(
            vec![
                Machine::new(1, "a", "prod", true),
                Machine::new(2, "b", "dev", true),
            ],
            &[(1, "203.0.113.1", true), (2, "203.0.113.2", true)],
        );
        let policy = Policy::new(vec!["prod".into()], false);

        let block = render_block(&dir, &policy).unwrap();
        assert!(block.text.contains("## prod\n"));
        assert!(!block.text.contains("## dev"));
        assert!(!block.text.contains("Host b"));
        assert_eq!(block.hosts, 1);
    }

    #[test]
    fn accepted_group_header_is_written_even_when_empty() {
        let dir = directory(vec![Machine::new(1, "off", "prod", false)], &[]);
        let policy = Policy::new(Vec::new(), true);

        let block = render_block(&dir, &policy).unwrap();
        assert_eq!(
            block.text,
            format!("{START_MARKER}\n\n## prod\n\n{END_MARKER}\n")
        );
        assert_eq!(block.hosts, 0);
    }

    #[test]
    fn stanzas_follow_directory_order() {
        let dir = directory(
            vec![
                Machine::new(1, "zeta", "b", true),
                Machine::new(2, "alpha", "b", true),
                Machine::new(3, "mid", "a", true),
            ],
            &[
                (1, "203.0.113.1", true),
                (2, "203.0.113.2", true),
                (3, "203.0.113.3", true),
            ],
        );

        let text = render_block(&dir, &Policy::default()).unwrap().text;
        let positions: Vec<usize> = ["## a", "Host mid", "## b", "Host alpha", "Host zeta"]
            .iter()
            .map(|needle| text.find(needle).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn empty_directory_renders_bare_markers() {
        let block = render_block(&Directory::default(), &Policy::default()).unwrap();
        assert_eq!(block.text, format!("{START_MARKER}\n\n{END_MARKER}\n"));
        assert_eq!(block.hosts, 0);
    }
}

use std::io::{self, Write};

use colored::Colorize;
use lsc_core::Directory;

/// Human-readable listing: each group with its machines and addresses.
pub fn write_listing<W: Write>(out: &mut W, directory: &Directory) -> io::Result<()> {
    if directory.is_empty() {
        return writeln!(out, "no machines matched");
    }

    for (group, machines) in directory.groups() {
        let name = if group.is_empty() { "(ungrouped)" } else { group };
        writeln!(out, "{}\t[{}]\n", name.green(), machines.len())?;

        for machine in machines {
            let label = if machine.running {
                machine.label.magenta()
            } else {
                machine.label.blue()
            };
            writeln!(
                out,
                " * {:<25}\tRunning={}, Ram={}, LinodeId={}",
                label, machine.running, machine.ram_mb, machine.id
            )?;
            for address in &machine.addresses {
                let kind = if address.public { "Public" } else { "Private" };
                writeln!(out, "   {:<15}\t{kind}", address.ip)?;
            }
            writeln!(out)?;
        }
    }

    Ok(())
}

use std::ffi::OsString;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use lsc_core::{Directory, Policy};
use tracing::info;

use crate::extract::user_content;
use crate::render::render_block;
use crate::{BACKUP_SUFFIX, Error, Result};

/// Outcome of a successful [`update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    pub path: PathBuf,
    /// Set when a previous file existed and was copied aside.
    pub backup: Option<PathBuf>,
    pub hosts: usize,
}

/// `path` with the backup suffix appended to its file name.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

/// User content of `path` followed by a freshly rendered block.
pub fn render(path: &Path, directory: &Directory, policy: &Policy) -> Result<Vec<u8>> {
    render_counted(path, directory, policy).map(|(bytes, _)| bytes)
}

fn render_counted(path: &Path, directory: &Directory, policy: &Policy) -> Result<(Vec<u8>, usize)> {
    let mut bytes = user_content(path)?;
    let block = render_block(directory, policy)?;
    let hosts = block.hosts;
    bytes.extend_from_slice(block.text.as_bytes());
    Ok((bytes, hosts))
}

/// Back up the existing file, then overwrite it with the merged content.
///
/// The target is not touched unless the backup succeeded or there was
/// nothing to back up. An existing backup is overwritten.
pub fn update(path: &Path, directory: &Directory, policy: &Policy) -> Result<Update> {
    let backup = if path.exists() {
        let backup = backup_path(path);
        copy_synced(path, &backup)?;
        info!(from = %path.display(), to = %backup.display(), "backed up ssh config");
        Some(backup)
    } else {
        None
    };

    let (contents, hosts) = render_counted(path, directory, policy)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| Error::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, &contents).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })?;

    info!(path = %path.display(), hosts, "wrote ssh config");

    Ok(Update {
        path: path.to_path_buf(),
        backup,
        hosts,
    })
}

fn copy_synced(from: &Path, to: &Path) -> Result<()> {
    let mut src = File::open(from).map_err(|source| Error::Read {
        path: from.to_path_buf(),
        source,
    })?;
    let backup_err = |source| Error::Backup {
        path: to.to_path_buf(),
        source,
    };
    let mut dst = File::create(to).map_err(backup_err)?;
    io::copy(&mut src, &mut dst).map_err(backup_err)?;
    // File::create keeps the mode of an existing backup.
    let permissions = src.metadata().map_err(backup_err)?.permissions();
    dst.set_permissions(permissions).map_err(backup_err)?;
    dst.sync_all().map_err(backup_err)
}

/// An SSH client config file with a managed block.
#[derive(Debug, Clone)]
pub struct SshConfigFile {
    path: PathBuf,
}

impl SshConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> PathBuf {
        backup_path(&self.path)
    }

    pub fn render(&self, directory: &Directory, policy: &Policy) -> Result<Vec<u8>> {
        render(&self.path, directory, policy)
    }

    pub fn update(&self, directory: &Directory, policy: &Policy) -> Result<Update> {
        update(&self.path, directory, policy)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use lsc_core::{Address, Machine, MachineId};
    use tempfile::TempDir;

    use super::*;
    use crate::{END_MARKER, START_MARKER};

    fn tmp() -> TempDir {
        tempfile::tempdir().unwrap()
    }

    fn sample_directory() -> Directory {
        let mut addresses = HashMap::new();
        addresses.insert(
            MachineId(1),
            vec![Address::new(MachineId(1), "203.0.113.5", true)],
        );
        addresses.insert(
            MachineId(2),
            vec![Address::new(MachineId(2), "203.0.113.6", true)],
        );
        Directory::build(
            vec![
                Machine::new(1, "web", "prod", true).with_ram_mb(1024),
                Machine::new(2, "db", "prod", true).with_ram_mb(4096),
            ],
            addresses,
        )
    }

    #[test]
    fn backup_path_appends_suffix() {
        assert_eq!(
            backup_path(Path::new("/home/u/.ssh/config")),
            PathBuf::from("/home/u/.ssh/config.linode-ssh-config.bak")
        );
    }

    #[test]
    fn render_appends_block_to_user_content() {
        let dir = tmp();
        let path = dir.path().join("config");
        fs::write(&path, format!("Host mine\n{START_MARKER}\nHost stale\n{END_MARKER}\n")).unwrap();

        let out = String::from_utf8(render(&path, &sample_directory(), &Policy::default()).unwrap()).unwrap();
        assert!(out.starts_with(&format!("Host mine\n{START_MARKER}\n\n## prod\n\n")));
        assert!(out.ends_with(&format!("{END_MARKER}\n")));
        assert!(!out.contains("stale"));
        // Render does not touch the file.
        assert!(fs::read_to_string(&path).unwrap().contains("stale"));
    }

    #[test]
    fn update_without_existing_file_writes_and_skips_backup() {
        let dir = tmp();
        let path = dir.path().join(".ssh").join("config");

        let result = update(&path, &sample_directory(), &Policy::default()).unwrap();
        assert_eq!(result.hosts, 2);
        assert_eq!(result.backup, None);
        assert!(!backup_path(&path).exists());

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with(START_MARKER));
        assert!(written.contains("Host db\n"));
        assert!(written.contains("Host web\n"));
    }

    #[test]
    fn update_backs_up_previous_content_verbatim() {
        let dir = tmp();
        let path = dir.path().join("config");
        let original = "Host keep\n    User me\n";
        fs::write(&path, original).unwrap();

        let result = update(&path, &sample_directory(), &Policy::default()).unwrap();
        assert_eq!(result.backup.as_deref(), Some(backup_path(&path).as_path()));
        assert_eq!(fs::read_to_string(backup_path(&path)).unwrap(), original);

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("Host keep\n    User me\n"));
        assert!(written.contains(START_MARKER));
    }

    #[cfg(unix)]
    #[test]
    fn backup_keeps_config_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tmp();
        let path = dir.path().join("config");
        fs::write(&path, "Host keep\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).unwrap();
        // A stale, world-readable backup must not keep its mode.
        fs::write(backup_path(&path), "old\n").unwrap();
        fs::set_permissions(backup_path(&path), fs::Permissions::from_mode(0o644)).unwrap();

        update(&path, &sample_directory(), &Policy::default()).unwrap();

        let mode = fs::metadata(backup_path(&path)).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(fs::read_to_string(backup_path(&path)).unwrap(), "Host keep\n");
    }

    #[test]
    fn update_twice_is_idempotent() {
        let dir = tmp();
        let file = SshConfigFile::new(dir.path().join("config"));
        fs::write(file.path(), "Host keep\n\n").unwrap();

        let directory = sample_directory();
        let policy = Policy::default().with_user(Some("ops".into()));

        file.update(&directory, &policy).unwrap();
        let first = fs::read(file.path()).unwrap();

        file.update(&directory, &policy).unwrap();
        let second = fs::read(file.path()).unwrap();

        assert_eq!(first, second);
        assert_eq!(fs::read(file.backup_path()).unwrap(), first);
    }

    #[test]
    fn update_shrinks_file_when_block_shrinks() {
        let dir = tmp();
        let file = SshConfigFile::new(dir.path().join("config"));

        file.update(&sample_directory(), &Policy::default()).unwrap();
        let result = file
            .update(&Directory::default(), &Policy::default())
            .unwrap();

        assert_eq!(result.hosts, 0);
        assert_eq!(
            fs::read_to_string(file.path()).unwrap(),
            format!("{START_MARKER}\n\n{END_MARKER}\n")
        );
    }

    #[test]
    fn failed_backup_leaves_target_untouched() {
        let dir = tmp();
        let path = dir.path().join("config");
        let original = "Host precious\n";
        fs::write(&path, original).unwrap();
        // A directory where the backup file should go makes File::create fail.
        fs::create_dir(backup_path(&path)).unwrap();

        let err = update(&path, &sample_directory(), &Policy::default()).unwrap_err();
        assert!(matches!(err, Error::Backup { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
    }
}

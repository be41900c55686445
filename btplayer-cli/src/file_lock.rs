use anyhow::{Context, bail};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Per-user lock that keeps two instances from following sessions at once.
///
/// Both would suspend and resume the same audio engine. The lock file holds
/// the owner's pid and is released when the value is dropped.
#[derive(Debug)]
pub struct SessionLock {
    _file: File,
    path: PathBuf,
}

impl SessionLock {
    /// Takes the lock in the runtime dir, falling back to the local data dir
    /// and then the temp dir.
    pub fn acquire() -> anyhow::Result<Self> {
        let dir = dirs::runtime_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(std::env::temp_dir);
        Self::acquire_at(dir.join("btplayer.lock"))
    }

    pub fn acquire_at(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        // Not truncated on open: a running owner's pid must survive a failed attempt.
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .with_context(|| format!("Failed to open lock file {}", path.display()))?;

        if file.try_lock_exclusive().is_err() {
            match read_owner(&mut file) {
                Some(pid) => bail!("Another btplayer instance (pid {pid}) is already following a session"),
                None => bail!("Another btplayer instance is already following a session"),
            }
        }

        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        writeln!(file, "{}", std::process::id())?;
        file.flush()?;

        log::debug!("Holding session lock {}", path.display());
        Ok(Self { _file: file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn read_owner(file: &mut File) -> Option<u32> {
    let mut contents = String::new();
    file.seek(SeekFrom::Start(0)).ok()?;
    file.read_to_string(&mut contents).ok()?;
    contents.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lock_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("btplayer-{name}-{}.lock", std::process::id()))
    }

    #[test]
    fn second_holder_is_refused_with_owner_pid() {
        let path = lock_path("refused");
        let lock = SessionLock::acquire_at(&path).unwrap();

        let err = SessionLock::acquire_at(&path).unwrap_err().to_string();
        assert!(err.contains(&std::process::id().to_string()), "{err}");

        drop(lock);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn lock_is_released_on_drop() {
        let path = lock_path("released");
        drop(SessionLock::acquire_at(&path).unwrap());

        let lock = SessionLock::acquire_at(&path).unwrap();
        assert_eq!(lock.path(), path.as_path());
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.trim(), std::process::id().to_string());

        drop(lock);
        let _ = std::fs::remove_file(&path);
    }
}

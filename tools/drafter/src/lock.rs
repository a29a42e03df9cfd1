//! Cross-process single-writer lock.
//!
//! Two processes submitting with the same signer race on its nonce, so only one run may hold the
//! lock file at a time. The file is removed when the guard drops.

use std::{
    fs::{self, OpenOptions},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};

pub struct RunLockFile {
    path: PathBuf,
}

impl RunLockFile {
    pub fn acquire(path: &Path) -> Result<Self> {
        let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                return Err(anyhow!(
                    "another run holds {} (remove it if no run is in flight)",
                    path.display()
                ));
            }
            Err(err) => {
                return Err(err).with_context(|| format!("failed creating {}", path.display()))
            }
        };
        writeln!(file, "{}", std::process::id())
            .with_context(|| format!("failed writing {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }
}

impl Drop for RunLockFile {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %err, "failed removing lock file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::scratch_dir;

    #[test]
    fn test_second_acquire_fails_until_released() {
        let dir = scratch_dir("lock");
        let path = dir.join("run.lock");

        let first = RunLockFile::acquire(&path).unwrap();
        assert!(RunLockFile::acquire(&path).is_err());

        drop(first);
        assert!(!path.exists());
        assert!(RunLockFile::acquire(&path).is_ok());
    }
}

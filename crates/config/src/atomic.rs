// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Atomic JSON file writes with rolling backups.
//!
//! Write path: serialize to `<file>.tmp`, fsync, rename over the
//! target. Before the rename the previous contents rotate into
//! `<file>.backup`, `<file>.backup.1`, … up to `BACKUP_RETENTION`.
//! Read-modify-write cycles take an advisory lock on `<file>.lock` so
//! concurrent editors (daemon + CLI) serialize.

use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// How many rotated backups to keep.
pub const BACKUP_RETENTION: usize = 5;

/// Read and decode a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigError::not_found(path, "file does not exist"));
        }
        Err(e) => return Err(ConfigError::from_io(e, path)),
    };
    serde_json::from_slice(&bytes)
        .map_err(|e| ConfigError::parse_one(format!("{}: {e}", path.display())))
}

/// Atomically replace `path` with the serialization of `value`.
pub fn atomic_write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ConfigError> {
    let payload = serde_json::to_vec_pretty(value)
        .map_err(|e| ConfigError::Invariant(format!("serialize {}: {e}", path.display())))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::from_io(e, parent))?;
    }

    rotate_backups(path)?;

    let tmp = tmp_path(path);
    let mut file = File::create(&tmp).map_err(|e| ConfigError::from_io(e, &tmp))?;
    file.write_all(&payload).map_err(|e| ConfigError::from_io(e, &tmp))?;
    file.write_all(b"\n").map_err(|e| ConfigError::from_io(e, &tmp))?;
    file.sync_all().map_err(|e| ConfigError::from_io(e, &tmp))?;
    drop(file);

    std::fs::rename(&tmp, path).map_err(|e| ConfigError::from_io(e, path))?;
    Ok(())
}

/// Run a read-modify-write cycle under the file's advisory lock.
///
/// `update` receives the current value (or `None` when the file does
/// not exist) and returns the value to persist. The lock is held for
/// the whole cycle and released on return.
pub fn locked_update<T, F>(path: &Path, update: F) -> Result<T, ConfigError>
where
    T: Serialize + DeserializeOwned + Clone,
    F: FnOnce(Option<T>) -> T,
{
    let lock_path = lock_path(path);
    if let Some(parent) = lock_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::from_io(e, parent))?;
    }
    let lock_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&lock_path)
        .map_err(|e| ConfigError::from_io(e, &lock_path))?;
    lock_file.lock_exclusive().map_err(|_| ConfigError::Busy(path.to_path_buf()))?;

    let current = match read_json::<T>(path) {
        Ok(value) => Some(value),
        Err(ConfigError::NotFound { .. }) => None,
        Err(e) => {
            let _ = fs2::FileExt::unlock(&lock_file);
            return Err(e);
        }
    };

    let next = update(current);
    let result = atomic_write_json(path, &next);
    let _ = fs2::FileExt::unlock(&lock_file);
    result.map(|()| next)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(".tmp");
    PathBuf::from(os)
}

fn lock_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(".lock");
    PathBuf::from(os)
}

fn backup_path(path: &Path, index: usize) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    if index == 0 {
        os.push(".backup");
    } else {
        os.push(format!(".backup.{index}"));
    }
    PathBuf::from(os)
}

/// Shift `.backup.N` → `.backup.N+1`, dropping the oldest, then copy
/// the current file into `.backup`.
fn rotate_backups(path: &Path) -> Result<(), ConfigError> {
    if !path.exists() {
        return Ok(());
    }

    let oldest = backup_path(path, BACKUP_RETENTION - 1);
    if oldest.exists() {
        std::fs::remove_file(&oldest).map_err(|e| ConfigError::from_io(e, &oldest))?;
    }
    for i in (0..BACKUP_RETENTION - 1).rev() {
        let from = backup_path(path, i);
        if from.exists() {
            let to = backup_path(path, i + 1);
            std::fs::rename(&from, &to).map_err(|e| ConfigError::from_io(e, &to))?;
        }
    }
    std::fs::copy(path, backup_path(path, 0)).map_err(|e| ConfigError::from_io(e, path))?;
    Ok(())
}

#[cfg(test)]
#[path = "atomic_tests.rs"]
mod atomic_tests;

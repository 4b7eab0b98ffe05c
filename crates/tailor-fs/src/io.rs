//! Atomic I/O operations with file locking

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::time::Duration;

use backoff::ExponentialBackoffBuilder;
use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

/// Retry policy for the final rename of an atomic write.
///
/// Renames can fail transiently when another process (an editor, a virus
/// scanner, a concurrent reader on Windows) briefly holds the target open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RobustnessConfig {
    /// First delay between rename attempts
    pub initial_interval: Duration,
    /// Total time budget for rename retries; zero disables retrying
    pub max_elapsed: Duration,
}

impl Default for RobustnessConfig {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(10),
            max_elapsed: Duration::from_millis(500),
        }
    }
}

impl RobustnessConfig {
    /// A policy that never retries.
    pub fn no_retry() -> Self {
        Self {
            initial_interval: Duration::from_millis(1),
            max_elapsed: Duration::ZERO,
        }
    }
}

/// Write content atomically to a file with locking.
///
/// The content lands in a temp file next to the target, is synced, and is
/// then renamed over the target, so readers see either the old or the new
/// file and never a partial one. An exclusive advisory lock on a sibling
/// `.lock` file is held for the duration of the write.
pub fn write_atomic(path: &NormalizedPath, content: &[u8], robustness: RobustnessConfig) -> Result<()> {
    let native_path = path.to_native();

    if let Some(parent) = native_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let lock = acquire_lock(path)?;

    let temp_path = path
        .sibling(&format!(".{}.{}.tmp", path.file_name().unwrap_or("file"), std::process::id()))
        .to_native();

    let result = (|| -> Result<()> {
        let mut temp_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| Error::io(&temp_path, e))?;
        temp_file
            .write_all(content)
            .map_err(|e| Error::io(&temp_path, e))?;
        temp_file.sync_all().map_err(|e| Error::io(&temp_path, e))?;
        drop(temp_file);

        rename_with_retry(&temp_path, &native_path, robustness)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }

    FileExt::unlock(&lock).map_err(|_| Error::LockFailed {
        path: native_path.clone(),
    })?;

    result
}

fn acquire_lock(path: &NormalizedPath) -> Result<File> {
    let lock_path = path
        .sibling(&format!(".{}.lock", path.file_name().unwrap_or("file")))
        .to_native();
    let lock = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&lock_path)
        .map_err(|e| Error::io(&lock_path, e))?;
    lock.lock_exclusive().map_err(|_| Error::LockFailed {
        path: path.to_native(),
    })?;
    Ok(lock)
}

fn rename_with_retry(
    from: &std::path::Path,
    to: &std::path::Path,
    robustness: RobustnessConfig,
) -> Result<()> {
    let policy = ExponentialBackoffBuilder::new()
        .with_initial_interval(robustness.initial_interval)
        .with_max_elapsed_time(Some(robustness.max_elapsed))
        .build();

    backoff::retry(policy, || {
        fs::rename(from, to).map_err(|e| match e.kind() {
            ErrorKind::PermissionDenied | ErrorKind::WouldBlock => {
                tracing::debug!(path = %to.display(), "rename blocked, retrying");
                backoff::Error::transient(e)
            }
            _ => backoff::Error::permanent(e),
        })
    })
    .map_err(|e| {
        let source = match e {
            backoff::Error::Permanent(err) => err,
            backoff::Error::Transient { err, .. } => err,
        };
        Error::io(to, source)
    })
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Read text content from a file, returning `None` if it does not exist.
pub fn read_text_if_exists(path: &NormalizedPath) -> Result<Option<String>> {
    let native_path = path.to_native();
    match fs::read_to_string(&native_path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io(&native_path, e)),
    }
}

/// Write text content to a file atomically with the default retry policy.
pub fn write_text(path: &NormalizedPath, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes(), RobustnessConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_and_lock_files_live_next_to_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = NormalizedPath::new(dir.path().join("log.json"));

        write_text(&path, "[]").unwrap();

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().to_string())
            .filter(|n| n.ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty(), "temp files left: {:?}", leftovers);
        assert!(dir.path().join(".log.json.lock").exists());
    }

    #[test]
    fn read_text_if_exists_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = NormalizedPath::new(dir.path().join("absent.json"));
        assert!(read_text_if_exists(&path).unwrap().is_none());
    }
}

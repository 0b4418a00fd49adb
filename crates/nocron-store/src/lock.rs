//! Exclusive record locks.
//!
//! Each record has a sibling `.lock` file. The lock is an advisory `flock`
//! held for the duration of the closure and dropped on every exit path,
//! including early returns and panics.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use nocron_protocols::StoreError;

/// Run `f` while holding an exclusive lock on `lock_path`.
pub(crate) fn with_exclusive_lock<T>(
    lock_path: &Path,
    f: impl FnOnce() -> Result<T, StoreError>,
) -> Result<T, StoreError> {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path)?;

    #[cfg(unix)]
    let _guard = {
        use nix::fcntl::{Flock, FlockArg};
        Flock::lock(file, FlockArg::LockExclusive).map_err(|(_, errno)| {
            StoreError::Lock(format!("{}: {}", lock_path.display(), errno))
        })?
    };
    #[cfg(not(unix))]
    let _guard = file;

    f()
}

/// Replace `path` with `contents` so readers see the old or the new record,
/// never a torn one. Callers hold the record lock.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    let tmp = path.with_extension("tmp");
    {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(contents)?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_lock_released_after_error() {
        let dir = TempDir::new().unwrap();
        let lock = dir.path().join("stats.lock");

        let failed: Result<(), StoreError> =
            with_exclusive_lock(&lock, || Err(StoreError::Lock("boom".into())));
        assert!(failed.is_err());

        // Would block forever if the first guard leaked.
        let value = with_exclusive_lock(&lock, || Ok(7)).unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn test_lock_serializes_threads() {
        let dir = TempDir::new().unwrap();
        let lock = dir.path().join("counter.lock");
        let data = dir.path().join("counter");
        fs::write(&data, "0").unwrap();
        let inside = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let lock = lock.clone();
                let data = data.clone();
                let inside = inside.clone();
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        with_exclusive_lock(&lock, || {
                            assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0);
                            let n: u64 = fs::read_to_string(&data)?.parse().unwrap();
                            write_atomic(&data, (n + 1).to_string().as_bytes())?;
                            inside.fetch_sub(1, Ordering::SeqCst);
                            Ok(())
                        })
                        .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(fs::read_to_string(&data).unwrap(), "200");
    }

    #[test]
    fn test_write_atomic_replaces_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("task.json");
        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert!(!path.with_extension("tmp").exists());
    }
}

//! Named, time-boxed mutual-exclusion lock.
//!
//! One lock file per name at `<home>/.sheetsync/locks/<name>.json`,
//! created with `O_CREAT|O_EXCL` semantics so exactly one acquirer wins.
//! The payload records the owner token and an expiry; a file whose expiry
//! has passed is crashed-holder debris and may be replaced. The TTL is a
//! safety net — release normally happens through [`LockGuard`]'s `Drop`,
//! on every exit path.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{io_err, EngineError};

/// On-disk lock payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LockFile {
    owner: String,
    acquired_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

/// A named TTL lock rooted at one home directory.
#[derive(Debug, Clone)]
pub struct SyncLock {
    home: PathBuf,
    name: String,
    ttl: Duration,
}

/// Holding this guard means the lock is held; dropping it releases the
/// lock file, provided the recorded owner is still us.
#[derive(Debug)]
pub struct LockGuard {
    path: PathBuf,
    owner: String,
    released: bool,
}

impl SyncLock {
    pub fn new(home: impl Into<PathBuf>, name: impl Into<String>, ttl: Duration) -> Self {
        Self {
            home: home.into(),
            name: name.into(),
            ttl,
        }
    }

    /// `<home>/.sheetsync/locks/<name>.json` — pure, no I/O.
    pub fn path(&self) -> PathBuf {
        self.home
            .join(".sheetsync")
            .join("locks")
            .join(format!("{}.json", self.name))
    }

    /// Try to take the lock. `Ok(None)` means a live holder exists — the
    /// expected steady state under an overlapping run, not an error.
    ///
    /// An existing file whose `expires_at` has passed is removed and the
    /// acquisition retried once; losing that retry race is again `Ok(None)`.
    pub fn acquire(&self) -> Result<Option<LockGuard>, EngineError> {
        match self.try_create() {
            Ok(guard) => Ok(Some(guard)),
            Err(CreateFailure::Held) => {
                if self.remove_if_expired()? {
                    match self.try_create() {
                        Ok(guard) => Ok(Some(guard)),
                        Err(CreateFailure::Held) => Ok(None),
                        Err(CreateFailure::Other(err)) => Err(err),
                    }
                } else {
                    Ok(None)
                }
            }
            Err(CreateFailure::Other(err)) => Err(err),
        }
    }

    fn try_create(&self) -> Result<LockGuard, CreateFailure> {
        let path = self.path();
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| CreateFailure::Other(io_err(dir, e)))?;
        }

        let now = Utc::now();
        let ttl = chrono::Duration::from_std(self.ttl).unwrap_or(chrono::Duration::seconds(300));
        let payload = LockFile {
            owner: owner_token(&self.name, now),
            acquired_at: now,
            expires_at: now + ttl,
        };

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                return Err(CreateFailure::Held);
            }
            Err(err) => return Err(CreateFailure::Other(io_err(&path, err))),
        };

        let json = serde_json::to_string_pretty(&payload)
            .map_err(|e| CreateFailure::Other(EngineError::Json(e)))?;
        file.write_all(json.as_bytes())
            .map_err(|e| CreateFailure::Other(io_err(&path, e)))?;

        Ok(LockGuard {
            path,
            owner: payload.owner,
            released: false,
        })
    }

    /// Remove the lock file if its holder's TTL has lapsed. Returns whether
    /// a removal happened. An unreadable or malformed file counts as
    /// expired — a half-written file cannot belong to a live holder that
    /// finished its atomic create.
    fn remove_if_expired(&self) -> Result<bool, EngineError> {
        let path = self.path();
        let expired = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<LockFile>(&contents) {
                Ok(lock) => lock.expires_at <= Utc::now(),
                Err(_) => true,
            },
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(true),
            Err(err) => return Err(io_err(&path, err)),
        };

        if !expired {
            return Ok(false);
        }

        tracing::warn!(
            "removing expired sync lock at {} (holder presumed crashed)",
            path.display()
        );
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(true),
            Err(err) => Err(io_err(&path, err)),
        }
    }
}

impl LockGuard {
    /// Release explicitly. `Drop` does the same; this form surfaces errors.
    pub fn release(mut self) -> Result<(), EngineError> {
        self.release_inner()
    }

    fn release_inner(&mut self) -> Result<(), EngineError> {
        if self.released {
            return Ok(());
        }
        self.released = true;

        // Only delete a file we still own — after a TTL steal the path may
        // hold someone else's lock.
        let ours = match std::fs::read_to_string(&self.path) {
            Ok(contents) => serde_json::from_str::<LockFile>(&contents)
                .map(|lock| lock.owner == self.owner)
                .unwrap_or(false),
            Err(err) if err.kind() == ErrorKind::NotFound => false,
            Err(err) => return Err(io_err(&self.path, err)),
        };

        if ours {
            match std::fs::remove_file(&self.path) {
                Ok(()) => {}
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => return Err(io_err(&self.path, err)),
            }
        }
        Ok(())
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(err) = self.release_inner() {
            tracing::error!("failed to release sync lock: {err}");
        }
    }
}

enum CreateFailure {
    Held,
    Other(EngineError),
}

/// Opaque owner token: hex SHA-256 over hostname, pid, and acquire time.
fn owner_token(name: &str, at: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    hasher.update(std::process::id().to_le_bytes());
    hasher.update(
        at.timestamp_nanos_opt()
            .unwrap_or_else(|| at.timestamp())
            .to_le_bytes(),
    );
    if let Ok(host) = std::env::var("HOSTNAME") {
        hasher.update(host.as_bytes());
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn lock(home: &Path, ttl_secs: u64) -> SyncLock {
        SyncLock::new(home, "sheet-sync", Duration::from_secs(ttl_secs))
    }

    #[test]
    fn acquire_then_conflict() {
        let home = TempDir::new().expect("home");
        let lock_a = lock(home.path(), 300);
        let guard = lock_a.acquire().expect("acquire").expect("should win");

        let lock_b = lock(home.path(), 300);
        assert!(
            lock_b.acquire().expect("acquire").is_none(),
            "second acquirer must be turned away"
        );
        drop(guard);
    }

    #[test]
    fn drop_releases_the_lock() {
        let home = TempDir::new().expect("home");
        let sync_lock = lock(home.path(), 300);
        {
            let _guard = sync_lock.acquire().expect("acquire").expect("win");
            assert!(sync_lock.path().exists());
        }
        assert!(!sync_lock.path().exists(), "drop must remove the lock file");
        assert!(
            sync_lock.acquire().expect("acquire").is_some(),
            "lock must be reacquirable after release"
        );
    }

    #[test]
    fn expired_lock_is_stolen() {
        let home = TempDir::new().expect("home");
        let short = lock(home.path(), 0);
        let stale = short.acquire().expect("acquire").expect("win");
        std::mem::forget(stale); // crashed holder: no Drop, file left behind

        let fresh = lock(home.path(), 300);
        let guard = fresh
            .acquire()
            .expect("acquire")
            .expect("expired lock must be replaceable");
        drop(guard);
    }

    #[test]
    fn live_lock_is_not_stolen() {
        let home = TempDir::new().expect("home");
        let holder = lock(home.path(), 300);
        let guard = holder.acquire().expect("acquire").expect("win");

        let challenger = lock(home.path(), 300);
        assert!(challenger.acquire().expect("acquire").is_none());
        drop(guard);
    }

    #[test]
    fn release_after_steal_leaves_new_owner_intact() {
        let home = TempDir::new().expect("home");
        let short = lock(home.path(), 0);
        let stale_guard = short.acquire().expect("acquire").expect("win");

        // TTL already lapsed; a second runner steals the lock.
        let fresh = lock(home.path(), 300);
        let _current = fresh.acquire().expect("acquire").expect("steal");

        // The original holder finally exits; its release must not remove
        // the new owner's file.
        drop(stale_guard);
        assert!(fresh.path().exists(), "new owner's lock must survive");
    }

    #[test]
    fn malformed_lock_file_counts_as_expired() {
        let home = TempDir::new().expect("home");
        let sync_lock = lock(home.path(), 300);
        let path = sync_lock.path();
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(&path, "not json").expect("write");

        assert!(
            sync_lock.acquire().expect("acquire").is_some(),
            "garbage lock file must not wedge the engine"
        );
    }
}

use fd_lock::RwLock;
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::errors::OrchestratorError;

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Advisory lock serializing load→transform→save across processes.
///
/// The lock lives in a sibling file rather than on the state document itself,
/// because saving renames a new inode over the document.
#[derive(Debug, Clone)]
pub struct StateLock {
    path: PathBuf,
    timeout: Duration,
}

impl StateLock {
    pub fn new(path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            path: path.into(),
            timeout,
        }
    }

    /// Lock file next to `state_path`, named `.<file name>.lock`.
    pub fn beside(state_path: &Path, timeout: Duration) -> Self {
        let file_name = state_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "orchestrator-state".to_string());
        let lock_path = state_path.with_file_name(format!(".{file_name}.lock"));
        Self::new(lock_path, timeout)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` while holding the exclusive lock.
    ///
    /// The guard is dropped on every exit path, including when `f` fails.
    pub fn with_exclusive<T, F>(&self, f: F) -> Result<T, OrchestratorError>
    where
        F: FnOnce() -> Result<T, OrchestratorError>,
    {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.path)
            .map_err(|e| OrchestratorError::io("open lock file", &self.path, e))?;
        let mut lock = RwLock::new(file);

        let started = Instant::now();
        let mut contended = false;
        loop {
            match lock.try_write() {
                Ok(_guard) => {
                    debug!(lock = %self.path.display(), waited_ms = started.elapsed().as_millis() as u64, "Acquired state lock");
                    return f();
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    if !contended {
                        warn!(lock = %self.path.display(), "State lock held by another invocation, waiting");
                        contended = true;
                    }
                    if started.elapsed() >= self.timeout {
                        return Err(OrchestratorError::LockTimeout {
                            path: self.path.clone(),
                            waited_ms: started.elapsed().as_millis() as u64,
                        });
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(e) => return Err(OrchestratorError::io("acquire lock", &self.path, e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    #[test]
    fn test_lock_path_is_hidden_sibling() {
        let lock = StateLock::beside(Path::new("/work/orchestrator-state.json"), Duration::ZERO);
        assert_eq!(lock.path(), Path::new("/work/.orchestrator-state.json.lock"));

        let relative = StateLock::beside(Path::new("state.yaml"), Duration::ZERO);
        assert_eq!(relative.path(), Path::new(".state.yaml.lock"));
    }

    #[test]
    fn test_with_exclusive_returns_closure_result() {
        let temp_dir = TempDir::new().unwrap();
        let lock = StateLock::beside(&temp_dir.path().join("state.yaml"), Duration::from_millis(100));

        let value = lock.with_exclusive(|| Ok(42)).unwrap();
        assert_eq!(value, 42);

        let err = lock
            .with_exclusive(|| -> Result<(), _> { Err(OrchestratorError::EmptyReportFile) })
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::EmptyReportFile));

        // Released after the failing closure, so it can be taken again.
        assert!(lock.with_exclusive(|| Ok(())).is_ok());
    }

    #[test]
    fn test_contended_lock_times_out() {
        let temp_dir = TempDir::new().unwrap();
        let lock = StateLock::beside(&temp_dir.path().join("state.yaml"), Duration::from_millis(60));

        let holder = File::create(lock.path()).unwrap();
        let mut held = RwLock::new(holder);
        let _guard = held.try_write().unwrap();

        let mut ran = false;
        let result = lock.with_exclusive(|| {
            ran = true;
            Ok(())
        });

        assert!(matches!(result, Err(OrchestratorError::LockTimeout { .. })));
        assert!(!ran);
    }
}

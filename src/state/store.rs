use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use serde_yaml::{Mapping, Value};
use tracing::{debug, info};

#[cfg(test)]
use mockall::automock;

use super::types::WorkflowState;
use crate::errors::OrchestratorError;

/// Durable storage for the workflow state document.
///
/// `save` replaces the stored document entirely; callers merge in memory
/// before saving. Implementations keep the key order of the document they
/// replace.
#[cfg_attr(test, automock)]
pub trait StateStore {
    /// Whether a state document is present, without parsing it.
    fn exists(&self) -> bool;

    fn load(&self) -> Result<WorkflowState, OrchestratorError>;

    fn save(&self, state: &WorkflowState) -> Result<(), OrchestratorError>;

    /// Location used in error messages and logs.
    fn location(&self) -> PathBuf;
}

/// YAML state document on the local filesystem.
///
/// JSON documents load as well since YAML is a superset of JSON; they are
/// rewritten as YAML on the next save.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse a state document, validating it against the schema.
    pub fn parse(path: &Path, contents: &str) -> Result<WorkflowState, OrchestratorError> {
        let corrupt = |reason: String| OrchestratorError::CorruptState {
            path: path.to_path_buf(),
            reason,
        };

        let state: WorkflowState = serde_yaml::from_str(contents).map_err(|e| corrupt(e.to_string()))?;
        state.validate().map_err(corrupt)?;
        Ok(state)
    }

    /// Serialize `state`, following the key order of `layout` (the document
    /// being replaced) where one is given. Keys `layout` lacks are appended.
    pub fn render(path: &Path, state: &WorkflowState, layout: Option<&Mapping>) -> Result<String, OrchestratorError> {
        let invalid = |e: serde_yaml::Error| {
            OrchestratorError::io("serialize", path, std::io::Error::new(ErrorKind::InvalidData, e))
        };

        let value = serde_yaml::to_value(state).map_err(invalid)?;
        let value = match (layout, value) {
            (Some(layout), Value::Mapping(rendered)) => Value::Mapping(arrange(layout, &rendered)),
            (_, value) => value,
        };
        serde_yaml::to_string(&value).map_err(invalid)
    }

    /// Top-level mapping of the current document, if it still parses.
    fn current_layout(&self) -> Option<Mapping> {
        let contents = fs::read_to_string(&self.path).ok()?;
        serde_yaml::from_str(&contents).ok()
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

/// Reorder `rendered` to follow `layout`, recursing into nested mappings.
/// Keys missing from `rendered` are dropped; keys new to `layout` go last.
fn arrange(layout: &Mapping, rendered: &Mapping) -> Mapping {
    let mut arranged = Mapping::with_capacity(rendered.len());
    for (key, previous) in layout {
        let Some(value) = rendered.get(key) else {
            continue;
        };
        let value = match (previous, value) {
            (Value::Mapping(previous), Value::Mapping(current)) => Value::Mapping(arrange(previous, current)),
            _ => value.clone(),
        };
        arranged.insert(key.clone(), value);
    }
    for (key, value) in rendered {
        if !arranged.contains_key(key) {
            arranged.insert(key.clone(), value.clone());
        }
    }
    arranged
}

impl StateStore for FileStateStore {
    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn load(&self) -> Result<WorkflowState, OrchestratorError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(OrchestratorError::NotFound {
                    path: self.path.clone(),
                })
            }
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                return Err(OrchestratorError::CorruptState {
                    path: self.path.clone(),
                    reason: format!("not valid UTF-8: {e}"),
                })
            }
            Err(e) => return Err(OrchestratorError::io("load", &self.path, e)),
        };

        let state = Self::parse(&self.path, &contents)?;
        debug!(
            path = %self.path.display(),
            current_wave = state.current_wave,
            "Loaded workflow state"
        );
        Ok(state)
    }

    fn save(&self, state: &WorkflowState) -> Result<(), OrchestratorError> {
        let layout = self.current_layout();
        let rendered = Self::render(&self.path, state, layout.as_ref())?;

        // Temp file in the same directory so persist() is a same-filesystem rename.
        let dir = self.parent_dir();
        let mut temp = tempfile::NamedTempFile::new_in(&dir)
            .map_err(|e| OrchestratorError::io("create temp file for", &self.path, e))?;
        temp.as_file_mut()
            .write_all(rendered.as_bytes())
            .map_err(|e| OrchestratorError::io("write", &self.path, e))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| OrchestratorError::io("sync", &self.path, e))?;
        // The temp file is created 0600; keep the mode of the file it replaces.
        if let Ok(metadata) = fs::metadata(&self.path) {
            temp.as_file()
                .set_permissions(metadata.permissions())
                .map_err(|e| OrchestratorError::io("copy permissions to", &self.path, e))?;
        }
        temp.persist(&self.path)
            .map_err(|e| OrchestratorError::io("rename into place", &self.path, e.error))?;

        info!(
            path = %self.path.display(),
            current_wave = state.current_wave,
            bytes = rendered.len(),
            "Saved workflow state"
        );
        Ok(())
    }

    fn location(&self) -> PathBuf {
        self.path.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::types::{ReviewStatus, WorkflowState};
    use tempfile::TempDir;

    const SAMPLE: &str = "\
current_wave: 1
state_machine:
  current_state: WAVE_REVIEW
  next_state: ''
  next_action: ''
current_review:
  status: PENDING
  completed_at: null
project: idpbuilder
";

    fn store_with(temp_dir: &TempDir, contents: &str) -> FileStateStore {
        let path = temp_dir.path().join("orchestrator-state.json");
        fs::write(&path, contents).unwrap();
        FileStateStore::new(path)
    }

    #[test]
    fn test_load_missing_file_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStateStore::new(temp_dir.path().join("absent.yaml"));

        assert!(!store.exists());
        assert!(matches!(store.load(), Err(OrchestratorError::NotFound { .. })));
    }

    #[test]
    fn test_load_parses_typed_fields() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_with(&temp_dir, SAMPLE);

        let state = store.load().unwrap();
        assert_eq!(state.current_wave, 1);
        assert_eq!(state.state_machine.current_state, "WAVE_REVIEW");
        assert_eq!(
            state.current_review.as_ref().map(|r| r.status),
            Some(ReviewStatus::Pending)
        );
    }

    #[test]
    fn test_load_accepts_json_documents() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_with(
            &temp_dir,
            r#"{"current_wave": 3, "state_machine": {"current_state": "WAVE_REVIEW", "next_state": "", "next_action": ""}}"#,
        );

        let state = store.load().unwrap();
        assert_eq!(state.current_wave, 3);
        assert!(state.current_review.is_none());
    }

    #[test]
    fn test_load_rejects_malformed_documents() {
        let cases = [
            "current_wave: [unterminated",
            "just a string",
            "current_wave: 1\n",
            "current_wave: 0\nstate_machine: {current_state: A, next_state: '', next_action: ''}\n",
            "current_wave: 1\nstate_machine: {current_state: A, next_state: '', next_action: ''}\ncurrent_review: {status: DONE}\n",
            "current_wave: 1\nstate_machine: {current_state: A, next_state: '', next_action: ''}\nwave_review: {report_file: r.json, decision: approve, reviewed_at: yesterday}\n",
        ];

        for contents in cases {
            let temp_dir = TempDir::new().unwrap();
            let store = store_with(&temp_dir, contents);
            assert!(
                matches!(store.load(), Err(OrchestratorError::CorruptState { .. })),
                "expected CorruptState for {contents:?}"
            );
        }
    }

    #[test]
    fn test_save_round_trip_is_stable() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_with(&temp_dir, SAMPLE);

        let state = store.load().unwrap();
        store.save(&state).unwrap();
        let first = fs::read_to_string(store.path()).unwrap();

        let reloaded = store.load().unwrap();
        assert_eq!(reloaded, state);

        store.save(&reloaded).unwrap();
        let second = fs::read_to_string(store.path()).unwrap();
        assert_eq!(first, second);

        let wave = first.find("current_wave").unwrap();
        let machine = first.find("state_machine").unwrap();
        let project = first.find("project").unwrap();
        assert!(wave < machine && machine < project);
    }

    #[test]
    fn test_save_keeps_existing_key_order() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_with(
            &temp_dir,
            "\
project: idpbuilder
current_review:
  completed_at: null
  status: PENDING
state_machine:
  next_action: ''
  current_state: WAVE_REVIEW
  next_state: ''
current_wave: 1
",
        );

        let mut state = store.load().unwrap();
        state.state_machine.next_state = "WAVE_START".to_string();
        state.extra.insert("efforts".into(), serde_yaml::to_value(3).unwrap());
        store.save(&state).unwrap();

        let text = fs::read_to_string(store.path()).unwrap();
        assert_eq!(
            text,
            "\
project: idpbuilder
current_review:
  completed_at: null
  status: PENDING
state_machine:
  next_action: ''
  current_state: WAVE_REVIEW
  next_state: WAVE_START
current_wave: 1
efforts: 3
"
        );
        assert_eq!(store.load().unwrap(), state);
    }

    #[cfg(unix)]
    #[test]
    fn test_save_keeps_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let store = store_with(&temp_dir, SAMPLE);
        fs::set_permissions(store.path(), fs::Permissions::from_mode(0o644)).unwrap();

        store.save(&store.load().unwrap()).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[test]
    fn test_save_leaves_no_temp_files_behind() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStateStore::new(temp_dir.path().join("state.yaml"));

        store.save(&WorkflowState::at_wave(2, "WAVE_START")).unwrap();

        let entries: Vec<_> = fs::read_dir(temp_dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(store.load().unwrap().current_wave, 2);
    }

    #[test]
    fn test_save_into_missing_directory_is_io_failure() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStateStore::new(temp_dir.path().join("missing").join("state.yaml"));

        let result = store.save(&WorkflowState::at_wave(1, "WAVE_REVIEW"));
        assert!(matches!(result, Err(OrchestratorError::IoFailure { .. })));
        assert!(!store.exists());
    }
}

//! Saving and restoring per-dataset workspaces.

use serde::{Deserialize, Serialize};
use shared::Drawing;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::{EngineError, EngineResult};

/// What survives a dataset switch: the drawings and where playback stood.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkspaceSnapshot {
    #[serde(default)]
    pub drawings: Vec<Drawing>,
    #[serde(default)]
    pub playback_cursor: Option<usize>,
}

/// Storage for workspace snapshots keyed by dataset id.
pub trait WorkspacePersistence: Send + Sync {
    /// `Ok(None)` when nothing was saved for the dataset yet.
    fn load(&self, dataset_id: &str) -> EngineResult<Option<WorkspaceSnapshot>>;
    fn save(&self, dataset_id: &str, snapshot: &WorkspaceSnapshot) -> EngineResult<()>;
}

#[derive(Debug, Default)]
pub struct InMemoryPersistence {
    entries: Mutex<HashMap<String, WorkspaceSnapshot>>,
}

impl InMemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WorkspacePersistence for InMemoryPersistence {
    fn load(&self, dataset_id: &str) -> EngineResult<Option<WorkspaceSnapshot>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| EngineError::PersistenceError("workspace map lock poisoned".to_string()))?;
        Ok(entries.get(dataset_id).cloned())
    }

    fn save(&self, dataset_id: &str, snapshot: &WorkspaceSnapshot) -> EngineResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| EngineError::PersistenceError("workspace map lock poisoned".to_string()))?;
        entries.insert(dataset_id.to_string(), snapshot.clone());
        Ok(())
    }
}

/// One pretty-printed JSON file per dataset inside `dir`.
#[derive(Debug, Clone)]
pub struct JsonFilePersistence {
    dir: PathBuf,
}

impl JsonFilePersistence {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, dataset_id: &str) -> PathBuf {
        let stem: String = dataset_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.workspace.json", stem))
    }
}

impl WorkspacePersistence for JsonFilePersistence {
    fn load(&self, dataset_id: &str) -> EngineResult<Option<WorkspaceSnapshot>> {
        let path = self.path_for(dataset_id);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let snapshot = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            EngineError::PersistenceError(format!("corrupt workspace file {}: {}", path.display(), e))
        })?;
        tracing::debug!(dataset = dataset_id, path = %path.display(), "Workspace loaded");
        Ok(Some(snapshot))
    }

    fn save(&self, dataset_id: &str, snapshot: &WorkspaceSnapshot) -> EngineResult<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(dataset_id);
        let tmp = path.with_extension("json.tmp");
        let mut writer = BufWriter::new(File::create(&tmp)?);
        serde_json::to_writer_pretty(&mut writer, snapshot)?;
        writer.flush()?;
        fs::rename(&tmp, &path)?;
        tracing::debug!(dataset = dataset_id, drawings = snapshot.drawings.len(), "Workspace saved");
        Ok(())
    }
}

//! JSON-file project record store.
//!
//! One `<id>.json` per project under the records directory. Writes go to a
//! temporary sibling and are renamed into place, so readers in other
//! processes never observe a half-written record. Updates within this
//! process are serialized by a mutex.

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Mutex,
};

use tracing::{debug, warn};

use qaforge_core::{
    application::{ApplicationError, ports::ProjectStore},
    domain::{GeneratedProject, ProjectId},
    error::{ForgeError, ForgeResult},
};

pub struct JsonFileProjectStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileProjectStore {
    /// Open (and create if needed) the records directory.
    pub fn open(dir: impl Into<PathBuf>) -> ForgeResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| store_error(&dir, e))?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, id: ProjectId) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    fn read(&self, id: ProjectId) -> ForgeResult<Option<GeneratedProject>> {
        read_record(&self.record_path(id))
    }

    fn write(&self, project: &GeneratedProject) -> ForgeResult<()> {
        let path = self.record_path(project.id());
        let tmp = self.dir.join(format!(".{}.json.tmp", project.id()));
        let bytes = serde_json::to_vec_pretty(project).map_err(|e| store_error(&path, e))?;
        fs::write(&tmp, bytes).map_err(|e| store_error(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            store_error(&path, e)
        })
    }
}

impl ProjectStore for JsonFileProjectStore {
    fn insert(&self, project: GeneratedProject) -> ForgeResult<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| ApplicationError::StoreLockError)?;
        self.write(&project)?;
        debug!(project_id = %project.id(), "Record stored");
        Ok(())
    }

    fn get(&self, id: ProjectId) -> ForgeResult<Option<GeneratedProject>> {
        self.read(id)
    }

    fn update(
        &self,
        id: ProjectId,
        change: &mut dyn FnMut(&mut GeneratedProject) -> ForgeResult<()>,
    ) -> ForgeResult<Option<GeneratedProject>> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| ApplicationError::StoreLockError)?;
        let Some(mut project) = self.read(id)? else {
            return Ok(None);
        };
        change(&mut project)?;
        self.write(&project)?;
        Ok(Some(project))
    }

    fn remove(&self, id: ProjectId) -> ForgeResult<Option<GeneratedProject>> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| ApplicationError::StoreLockError)?;
        let existing = self.read(id)?;
        let path = self.record_path(id);
        match fs::remove_file(&path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(store_error(&path, e)),
            _ => Ok(existing),
        }
    }

    fn list(&self) -> ForgeResult<Vec<GeneratedProject>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| store_error(&self.dir, e))?;
        let mut projects = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| store_error(&self.dir, e))?.path();
            let is_record = path.extension().is_some_and(|ext| ext == "json")
                && !path
                    .file_name()
                    .is_some_and(|n| n.to_string_lossy().starts_with('.'));
            if !is_record {
                continue;
            }
            match read_record(&path) {
                Ok(Some(project)) => projects.push(project),
                Ok(None) => {}
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable record"),
            }
        }
        Ok(projects)
    }
}

fn read_record(path: &Path) -> ForgeResult<Option<GeneratedProject>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(store_error(path, e)),
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| store_error(path, e))
}

fn store_error(path: &Path, e: impl std::fmt::Display) -> ForgeError {
    ApplicationError::StoreError {
        reason: format!("{}: {e}", path.display()),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use qaforge_core::domain::{Configuration, PackId, ProjectStatus};
    use tempfile::TempDir;

    fn project() -> GeneratedProject {
        let config: Configuration = serde_json::from_str(
            r#"{"testingType":"Web","tool":"Selenium","language":"Java","testRunner":"JUnit","scenarios":["Login"]}"#,
        )
        .unwrap();
        GeneratedProject::new(
            config,
            PackId::new("selenium-java-junit5").unwrap(),
            Utc::now(),
            Duration::hours(2),
        )
        .unwrap()
    }

    #[test]
    fn records_survive_reopening() {
        let tmp = TempDir::new().unwrap();
        let p = project();
        let id = p.id();

        JsonFileProjectStore::open(tmp.path()).unwrap().insert(p.clone()).unwrap();
        let reopened = JsonFileProjectStore::open(tmp.path()).unwrap();

        assert_eq!(reopened.get(id).unwrap(), Some(p));
        assert_eq!(reopened.list().unwrap().len(), 1);
    }

    #[test]
    fn update_persists_changes() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileProjectStore::open(tmp.path()).unwrap();
        let p = project();
        let id = p.id();
        store.insert(p).unwrap();

        store
            .update(id, &mut |p| {
                p.start()?;
                p.advance(40);
                Ok(())
            })
            .unwrap();

        let stored = store.get(id).unwrap().unwrap();
        assert_eq!(stored.status(), ProjectStatus::Generating);
        assert_eq!(stored.progress(), 40);
    }

    #[test]
    fn corrupt_records_are_skipped_in_listing() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileProjectStore::open(tmp.path()).unwrap();
        store.insert(project()).unwrap();
        fs::write(tmp.path().join("garbage.json"), b"{not json").unwrap();

        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn remove_deletes_the_file() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileProjectStore::open(tmp.path()).unwrap();
        let p = project();
        let id = p.id();
        store.insert(p).unwrap();

        assert!(store.remove(id).unwrap().is_some());
        assert!(!tmp.path().join(format!("{id}.json")).exists());
        assert!(store.remove(id).unwrap().is_none());
    }
}

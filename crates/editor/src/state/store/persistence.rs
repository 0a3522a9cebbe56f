//! Project payload and autosave

use std::path::{Path, PathBuf};

use shared::{parse_entities, serialize_entities, EntityRecord};
use thiserror::Error;

use super::EntityStore;
use crate::events::EditorEvent;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("malformed project payload: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("cannot serialize project: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("project file: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of loading a payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub loaded: usize,
    /// Ids of records that could not be restored
    pub skipped: Vec<String>,
}

/// Trailing numeric part of an id: `entity_12` → 12
pub fn id_suffix(id: &str) -> Option<u64> {
    let digits = id.len() - id.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    id[id.len() - digits..].parse().ok()
}

impl EntityStore {
    pub fn to_record(&self, id: &str) -> Option<EntityRecord> {
        let entity = self.entities.get(id)?;
        Some(EntityRecord {
            id: entity.id.clone(),
            type_name: entity.type_name.clone(),
            params: entity.params.clone(),
            transform: self.graph.transform(entity.node).cloned().unwrap_or_default(),
            parent: self.parent_entity(id).map(str::to_string),
        })
    }

    /// Records in insertion order
    pub fn to_records(&self) -> Vec<EntityRecord> {
        self.order.iter().filter_map(|id| self.to_record(id)).collect()
    }

    pub fn serialize_state(&self) -> Result<String, PersistenceError> {
        serialize_entities(&self.to_records()).map_err(PersistenceError::Serialize)
    }

    /// Replace every entity with the ones in `text`.
    ///
    /// Existing entities are removed first without a history entry. A
    /// malformed payload leaves the store empty. Records of unregistered
    /// types are skipped. The id counter continues after the highest
    /// numeric suffix found.
    pub fn deserialize_state(&mut self, text: &str) -> Result<LoadReport, PersistenceError> {
        self.delete_all_entities();
        let records = parse_entities(text)?;
        let report = self.load_records(&records);
        self.next_id = Self::next_id_after(&records);
        tracing::info!(
            "loaded {} entities ({} skipped)",
            report.loaded,
            report.skipped.len()
        );
        Ok(report)
    }

    /// History restore path: same as loading, but the id counter never
    /// moves backwards so undone ids are not handed out twice.
    pub(crate) fn restore_records(&mut self, records: &[EntityRecord]) -> LoadReport {
        let report = self.load_records(records);
        self.next_id = self.next_id.max(Self::next_id_after(records));
        report
    }

    pub(crate) fn notify_scene_updated(&mut self) {
        self.emit(EditorEvent::SceneUpdated);
    }

    /// Suffixes at `u64::MAX` have no successor and do not move the counter;
    /// `allocate_id` skips ids that are already taken.
    fn next_id_after(records: &[EntityRecord]) -> u64 {
        records
            .iter()
            .filter_map(|r| {
                let n = id_suffix(&r.id)?;
                let next = n.checked_add(1);
                if next.is_none() {
                    tracing::warn!("'{}': id suffix out of range for the id counter", r.id);
                }
                next
            })
            .max()
            .unwrap_or(1)
    }

    fn load_records(&mut self, records: &[EntityRecord]) -> LoadReport {
        let mut report = LoadReport::default();
        for record in records {
            if !self.registry.has(&record.type_name) {
                tracing::warn!(
                    "skipping '{}': type '{}' is not registered",
                    record.id,
                    record.type_name
                );
                report.skipped.push(record.id.clone());
                continue;
            }
            match self.add_entity(&record.type_name, None, Some(record)) {
                Some(_) => report.loaded += 1,
                None => report.skipped.push(record.id.clone()),
            }
        }

        // Parents may appear after their children in the payload
        for record in records {
            let Some(parent) = record.parent.as_deref() else {
                continue;
            };
            let nodes = (
                self.entities.get(&record.id).map(|e| e.node),
                self.entities.get(parent).map(|e| e.node),
            );
            match nodes {
                (Some(child), Some(parent_node)) => {
                    self.graph.attach(parent_node, child);
                }
                (Some(_), None) => {
                    tracing::warn!("'{}': parent '{}' missing, kept at root", record.id, parent)
                }
                _ => {}
            }
        }
        report
    }

    fn autosave_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "scene-editor", "scene-editor")
            .map(|dirs| dirs.data_dir().join("autosave.json"))
    }

    /// Save the project to the platform data dir
    pub fn autosave(&self) {
        if let Some(path) = Self::autosave_path() {
            if let Err(e) = self.save_to_path(&path) {
                tracing::warn!("autosave failed: {}", e);
            }
        }
    }

    /// Restore the autosaved project, if one exists
    pub fn load_autosave(&mut self) -> Option<LoadReport> {
        let path = Self::autosave_path()?;
        if !path.exists() {
            return None;
        }
        match self.load_from_path(&path) {
            Ok(report) => Some(report),
            Err(e) => {
                tracing::warn!("autosave at {} unreadable: {}", path.display(), e);
                None
            }
        }
    }

    pub fn has_autosave() -> bool {
        Self::autosave_path().map(|p| p.exists()).unwrap_or(false)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), PersistenceError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.serialize_state()?)?;
        Ok(())
    }

    pub fn load_from_path(&mut self, path: &Path) -> Result<LoadReport, PersistenceError> {
        let text = std::fs::read_to_string(path)?;
        self.deserialize_state(&text)
    }
}

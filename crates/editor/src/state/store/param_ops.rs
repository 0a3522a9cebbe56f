//! Inspector edits

use shared::{ParamError, ParamValue};
use thiserror::Error;

use super::EntityStore;
use crate::events::EditorEvent;

#[derive(Debug, Error)]
pub enum EditError {
    #[error("unknown entity '{0}'")]
    UnknownEntity(String),
    #[error(transparent)]
    Param(#[from] ParamError),
    #[error("rebuild of '{0}' failed")]
    RebuildFailed(String),
}

impl EntityStore {
    /// Validate, store and rebuild. Numbers outside the schema range are
    /// clamped. When the rebuild fails the previous value is put back.
    pub fn set_param(&mut self, id: &str, name: &str, value: ParamValue) -> Result<(), EditError> {
        let entity = self
            .entities
            .get(id)
            .ok_or_else(|| EditError::UnknownEntity(id.to_string()))?;
        let descriptor = self
            .registry
            .get(&entity.type_name)
            .ok_or_else(|| EditError::UnknownEntity(id.to_string()))?;
        let value = descriptor.schema.validate(name, &value)?;

        if entity.params.get(name) == Some(&value) {
            return Ok(());
        }
        self.apply_param(id, name, value)
    }

    /// Inspector text input. Number fields accept expressions over the
    /// entity's other numeric params, e.g. `height * 2`.
    pub fn set_param_from_text(&mut self, id: &str, name: &str, text: &str) -> Result<(), EditError> {
        let entity = self
            .entities
            .get(id)
            .ok_or_else(|| EditError::UnknownEntity(id.to_string()))?;
        let descriptor = self
            .registry
            .get(&entity.type_name)
            .ok_or_else(|| EditError::UnknownEntity(id.to_string()))?;
        let def = descriptor
            .schema
            .get(name)
            .ok_or_else(|| ParamError::UnknownParam(name.to_string()))?;
        let value = def.spec.parse_input(name, text, &entity.params)?;

        if entity.params.get(name) == Some(&value) {
            return Ok(());
        }
        self.apply_param(id, name, value)
    }

    fn apply_param(&mut self, id: &str, name: &str, value: ParamValue) -> Result<(), EditError> {
        let previous = self
            .entities
            .get_mut(id)
            .and_then(|e| e.params.insert(name.to_string(), value));

        if !self.rebuild_entity(id) {
            if let (Some(entity), Some(previous)) = (self.entities.get_mut(id), previous) {
                entity.params.insert(name.to_string(), previous);
            }
            return Err(EditError::RebuildFailed(id.to_string()));
        }

        self.emit(EditorEvent::HistoryPushDebounced(format!("Edit {}", name)));
        Ok(())
    }
}

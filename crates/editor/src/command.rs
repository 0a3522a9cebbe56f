//! JSON command protocol for agents and the headless CLI.

use serde::{Deserialize, Serialize};
use shared::{ParamValue, Transform};

use crate::build::preset_keys;
use crate::harness::TestHarness;

/// A command the agent can execute.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum AgentCommand {
    /// List registered entity types with their schemas and presets.
    ListTypes,
    /// Add an entity with default params, optionally applying a preset.
    AddEntity {
        #[serde(rename = "type")]
        type_name: String,
        #[serde(default)]
        preset: Option<String>,
    },
    /// Set one parameter to a typed value.
    SetParam {
        id: String,
        name: String,
        value: ParamValue,
    },
    /// Set one parameter from inspector text (numbers accept expressions).
    SetParamText {
        id: String,
        name: String,
        text: String,
    },
    /// Regenerate an entity from its current params.
    Rebuild { id: String },
    /// Delete an entity.
    Delete { id: String },
    /// Delete every entity.
    DeleteAll,
    /// Duplicate an entity.
    Duplicate { id: String },
    /// Select an entity, or clear the selection with `null`.
    Select {
        #[serde(default)]
        id: Option<String>,
    },
    /// Move an entity.
    SetTransform { id: String, transform: Transform },
    /// Undo the last history entry.
    Undo,
    /// Redo the last undone entry.
    Redo,
    /// List entities, selection and history.
    Inspect,
    /// Export the project payload.
    ExportProject,
    /// Replace the scene with a project payload.
    ImportProject { project_json: String },
    /// Export the visual scene graph.
    ExportSceneGraph,
}

/// Response from executing a command.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl CommandResponse {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
            data: None,
        }
    }

    fn ok_with_data(data: serde_json::Value) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
        }
    }

    fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(msg.into()),
            data: None,
        }
    }
}

fn unknown(id: &str) -> CommandResponse {
    CommandResponse::err(format!("unknown entity '{id}'"))
}

/// Execute a single command on the harness.
pub fn execute_command(harness: &mut TestHarness, cmd: AgentCommand) -> CommandResponse {
    match cmd {
        AgentCommand::ListTypes => {
            let types: Vec<serde_json::Value> = harness
                .state
                .store
                .registry()
                .values()
                .map(|d| {
                    serde_json::json!({
                        "type": d.type_name,
                        "label": d.label,
                        "params": d.schema.iter().collect::<Vec<_>>(),
                        "presets": preset_keys(&d.type_name),
                    })
                })
                .collect();
            CommandResponse::ok_with_data(serde_json::json!({ "types": types }))
        }

        AgentCommand::AddEntity { type_name, preset } => {
            match harness.add_preset(&type_name, preset.as_deref()) {
                Some(id) => CommandResponse::ok_with_data(serde_json::json!({ "id": id })),
                None => CommandResponse::err(format!("could not add entity of type '{type_name}'")),
            }
        }

        AgentCommand::SetParam { id, name, value } => match harness.set_param(&id, &name, value) {
            Ok(()) => CommandResponse::ok_with_data(
                serde_json::json!({ "value": harness.param(&id, &name) }),
            ),
            Err(e) => CommandResponse::err(e.to_string()),
        },

        AgentCommand::SetParamText { id, name, text } => {
            match harness.set_param_text(&id, &name, &text) {
                Ok(()) => CommandResponse::ok_with_data(
                    serde_json::json!({ "value": harness.param(&id, &name) }),
                ),
                Err(e) => CommandResponse::err(e.to_string()),
            }
        }

        AgentCommand::Rebuild { id } => {
            if harness.entity(&id).is_none() {
                return unknown(&id);
            }
            if harness.rebuild(&id) {
                CommandResponse::ok()
            } else {
                CommandResponse::err(format!("rebuild of '{id}' failed"))
            }
        }

        AgentCommand::Delete { id } => {
            if harness.delete(&id) {
                CommandResponse::ok()
            } else {
                unknown(&id)
            }
        }

        AgentCommand::DeleteAll => {
            let count = harness.entity_count();
            harness.delete_all();
            CommandResponse::ok_with_data(serde_json::json!({ "removed": count }))
        }

        AgentCommand::Duplicate { id } => match harness.duplicate(&id) {
            Some(copy) => CommandResponse::ok_with_data(serde_json::json!({ "id": copy })),
            None => unknown(&id),
        },

        AgentCommand::Select { id } => {
            if let Some(id) = id.as_deref() {
                if harness.entity(id).is_none() {
                    return unknown(id);
                }
            }
            let changed = harness.select(id.as_deref());
            CommandResponse::ok_with_data(serde_json::json!({ "changed": changed }))
        }

        AgentCommand::SetTransform { id, transform } => {
            if harness.entity(&id).is_none() {
                return unknown(&id);
            }
            let changed = harness.set_transform(&id, transform);
            CommandResponse::ok_with_data(serde_json::json!({ "changed": changed }))
        }

        AgentCommand::Undo => {
            let success = harness.undo();
            CommandResponse::ok_with_data(serde_json::json!({ "undone": success }))
        }

        AgentCommand::Redo => {
            let success = harness.redo();
            CommandResponse::ok_with_data(serde_json::json!({ "redone": success }))
        }

        AgentCommand::Inspect => {
            let store = &harness.state.store;
            let entities: Vec<serde_json::Value> = store
                .to_records()
                .into_iter()
                .map(|r| {
                    serde_json::json!({
                        "name": store.entity_display_name(&r.id),
                        "record": r,
                    })
                })
                .collect();
            CommandResponse::ok_with_data(serde_json::json!({
                "entity_count": entities.len(),
                "entities": entities,
                "selected": store.selected_id(),
                "history": harness.history_labels(),
                "can_redo": harness.state.history.can_redo(),
            }))
        }

        AgentCommand::ExportProject => match harness.export_project_json() {
            Ok(json) => CommandResponse::ok_with_data(serde_json::json!({ "project_json": json })),
            Err(e) => CommandResponse::err(e.to_string()),
        },

        AgentCommand::ImportProject { project_json } => {
            match harness.load_project_json(&project_json) {
                Ok(report) => CommandResponse::ok_with_data(serde_json::json!({
                    "loaded": report.loaded,
                    "skipped": report.skipped,
                })),
                Err(e) => CommandResponse::err(e.to_string()),
            }
        }

        AgentCommand::ExportSceneGraph => CommandResponse::ok_with_data(
            serde_json::json!({ "nodes": harness.export_scene_graph() }),
        ),
    }
}

/// Parse and execute a single JSON command string.
pub fn execute_json(harness: &mut TestHarness, json: &str) -> Result<CommandResponse, String> {
    let cmd: AgentCommand =
        serde_json::from_str(json).map_err(|e| format!("Invalid command JSON: {e}"))?;
    Ok(execute_command(harness, cmd))
}

/// Parse and execute multiple JSON commands (array).
pub fn execute_json_batch(
    harness: &mut TestHarness,
    json: &str,
) -> Result<Vec<CommandResponse>, String> {
    let cmds: Vec<AgentCommand> =
        serde_json::from_str(json).map_err(|e| format!("Invalid commands JSON: {e}"))?;
    Ok(cmds
        .into_iter()
        .map(|cmd| execute_command(harness, cmd))
        .collect())
}

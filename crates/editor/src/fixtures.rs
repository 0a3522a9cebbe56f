//! Factory functions for test data.
//!
//! `stub_registry` provides deterministic entity types whose builders are
//! trivial, so store and history tests do not depend on the built-in types.

use shared::*;

use crate::registry::{BuildError, TypeRegistry};

// ── Stub types ──────────────────────────────────────────────────

/// Schema of the `block` stub: a single box
pub fn block_schema() -> ParamSchema {
    ParamSchema::new()
        .number("size", "Size", 1.0, 0.1, 10.0, 0.1)
        .boolean("hollow", "Hollow", false)
        .choice("finish", "Finish", "matte", &["matte", "gloss"])
        .text("tag", "Tag", "")
}

fn build_block(params: &ParamRecord) -> Result<SceneNodeData, BuildError> {
    let size = params
        .get("size")
        .and_then(ParamValue::as_number)
        .ok_or_else(|| BuildError::MissingParam("size".into()))?;
    let hollow = params
        .get("hollow")
        .and_then(ParamValue::as_bool)
        .unwrap_or(false);

    let mut root = SceneNodeData::group("Block").with_child(SceneNodeData::mesh(
        "body",
        GeometryDesc::Box {
            width: size,
            height: size,
            depth: size,
        },
        MaterialDesc::solid([200, 200, 200]),
    ));
    if hollow {
        root.push(SceneNodeData::mesh(
            "cavity",
            GeometryDesc::Sphere {
                radius: size / 3.0,
                segments: 8,
            },
            MaterialDesc::translucent([20, 20, 20], 0.5),
        ));
    }
    Ok(root)
}

/// Schema of the `fragile` stub, whose builder fails when `broken` is set
pub fn fragile_schema() -> ParamSchema {
    ParamSchema::new()
        .boolean("broken", "Broken", false)
        .number("width", "Width", 2.0, 0.0, 5.0, 0.5)
}

fn build_fragile(params: &ParamRecord) -> Result<SceneNodeData, BuildError> {
    if params.get("broken").and_then(ParamValue::as_bool) == Some(true) {
        return Err(BuildError::Invalid("fragile entity is broken".into()));
    }
    let width = params
        .get("width")
        .and_then(ParamValue::as_number)
        .unwrap_or(1.0);
    Ok(SceneNodeData::mesh(
        "Fragile",
        GeometryDesc::Plane {
            width,
            height: width,
        },
        MaterialDesc::solid([255, 0, 0]),
    ))
}

/// Registry with the `block` and `fragile` stub types
pub fn stub_registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    let _ = registry.register("block", "Block", block_schema(), build_block);
    let _ = registry.register("fragile", "Fragile", fragile_schema(), build_fragile);
    registry
}

// ── Records ─────────────────────────────────────────────────────

/// Persisted record with default params for the given stub type
pub fn record(id: &str, type_name: &str) -> EntityRecord {
    let params = stub_registry()
        .default_params(type_name)
        .unwrap_or_default();
    EntityRecord {
        id: id.to_string(),
        type_name: type_name.to_string(),
        params,
        transform: Transform::new(),
        parent: None,
    }
}

/// Record placed at a position
pub fn record_at(id: &str, type_name: &str, pos: [f64; 3]) -> EntityRecord {
    EntityRecord {
        transform: Transform::from_position(pos[0], pos[1], pos[2]),
        ..record(id, type_name)
    }
}

/// Project payload for a list of records
pub fn payload(records: &[EntityRecord]) -> serde_json::Result<String> {
    serialize_entities(records)
}

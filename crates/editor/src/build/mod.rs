//! Built-in entity types.
//!
//! Every builder is a pure function from a full parameter record to a
//! detached node tree. Geometry is only described here; the renderer turns
//! the descriptors into buffers.

mod door;
mod presets;
mod primitives;
mod tower;
mod truss;
mod window;

pub use presets::{preset_keys, preset_overrides};

use shared::{MaterialDesc, ParamRecord, ParamSchema, SceneNodeData};

use crate::registry::{BuildError, TypeRegistry};

pub const STONE: [u8; 3] = [158, 150, 140];
pub const WOOD: [u8; 3] = [133, 94, 66];
pub const METAL: [u8; 3] = [96, 104, 112];
pub const ROOF: [u8; 3] = [150, 60, 45];
pub const GLASS: [u8; 3] = [170, 210, 235];

/// Register tower, door, window, truss and the primitives
pub fn register_builtin_types(registry: &mut TypeRegistry) {
    let types: [(&str, &str, ParamSchema, BuilderFn); 7] = [
        ("tower", "Tower", tower::schema(), tower::build),
        ("door", "Door", door::schema(), door::build),
        ("window", "Window", window::schema(), window::build),
        ("truss", "Truss", truss::schema(), truss::build),
        ("box", "Box", primitives::box_schema(), primitives::build_box),
        (
            "cylinder",
            "Cylinder",
            primitives::cylinder_schema(),
            primitives::build_cylinder,
        ),
        (
            "sphere",
            "Sphere",
            primitives::sphere_schema(),
            primitives::build_sphere,
        ),
    ];

    for (type_name, label, schema, builder) in types {
        if let Err(e) = registry.register(type_name, label, schema, builder) {
            tracing::warn!("built-in type '{}' not registered: {}", type_name, e);
        }
    }
}

type BuilderFn = fn(&ParamRecord) -> Result<SceneNodeData, BuildError>;

// ── Parameter access for builders ────────────────────────────

pub fn number(params: &ParamRecord, name: &str) -> Result<f64, BuildError> {
    let value = params
        .get(name)
        .ok_or_else(|| BuildError::MissingParam(name.to_string()))?;
    value.as_number().ok_or_else(|| BuildError::WrongKind {
        name: name.to_string(),
        expected: "number",
    })
}

/// Number parameter rounded to a non-negative count
pub fn count(params: &ParamRecord, name: &str) -> Result<u32, BuildError> {
    Ok(number(params, name)?.round().max(0.0) as u32)
}

pub fn flag(params: &ParamRecord, name: &str) -> Result<bool, BuildError> {
    let value = params
        .get(name)
        .ok_or_else(|| BuildError::MissingParam(name.to_string()))?;
    value.as_bool().ok_or_else(|| BuildError::WrongKind {
        name: name.to_string(),
        expected: "boolean",
    })
}

pub fn text<'a>(params: &'a ParamRecord, name: &str) -> Result<&'a str, BuildError> {
    let value = params
        .get(name)
        .ok_or_else(|| BuildError::MissingParam(name.to_string()))?;
    value.as_text().ok_or_else(|| BuildError::WrongKind {
        name: name.to_string(),
        expected: "text",
    })
}

/// Parse `#rrggbb` (or `rrggbb`) into a solid material
pub fn hex_material(hex: &str) -> Result<MaterialDesc, BuildError> {
    let digits = hex.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(BuildError::Invalid(format!("invalid color '{}'", hex)));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&digits[i..i + 2], 16)
            .map_err(|_| BuildError::Invalid(format!("invalid color '{}'", hex)))
    };
    Ok(MaterialDesc::solid([channel(0)?, channel(2)?, channel(4)?]))
}

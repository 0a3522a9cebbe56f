//! Named parameter overrides applied at creation time

use shared::ParamValue;

/// Preset keys available for a type, in menu order
pub fn preset_keys(type_name: &str) -> &'static [&'static str] {
    match type_name {
        "tower" => &["keep", "spire"],
        "door" => &["double", "garage"],
        "window" => &["picture", "casement"],
        "truss" => &["bridge", "roof"],
        "box" => &["cube", "slab"],
        _ => &[],
    }
}

/// Overrides for `(type, preset)`; `None` when the pair is unknown
pub fn preset_overrides(type_name: &str, preset: &str) -> Option<Vec<(&'static str, ParamValue)>> {
    use ParamValue::{Bool, Number, Text};

    let overrides = match (type_name, preset) {
        ("tower", "keep") => vec![
            ("floors", Number(5.0)),
            ("width", Number(8.0)),
            ("roof", Text("flat".into())),
            ("battlements", Bool(true)),
        ],
        ("tower", "spire") => vec![
            ("floors", Number(4.0)),
            ("width", Number(3.0)),
            ("roof", Text("pyramid".into())),
        ],
        ("door", "double") => vec![("width", Number(1.8))],
        ("door", "garage") => vec![
            ("width", Number(2.5)),
            ("height", Number(2.2)),
            ("style", Text("flush".into())),
            ("frame", Bool(false)),
        ],
        ("window", "picture") => vec![
            ("width", Number(2.4)),
            ("panes_x", Number(1.0)),
            ("panes_y", Number(1.0)),
        ],
        ("window", "casement") => vec![("panes_x", Number(2.0)), ("panes_y", Number(3.0))],
        ("truss", "bridge") => vec![
            ("length", Number(24.0)),
            ("height", Number(3.0)),
            ("segments", Number(12.0)),
            ("pattern", Text("pratt".into())),
        ],
        ("truss", "roof") => vec![
            ("length", Number(8.0)),
            ("height", Number(1.5)),
            ("pattern", Text("howe".into())),
        ],
        ("box", "cube") => vec![
            ("width", Number(1.0)),
            ("height", Number(1.0)),
            ("depth", Number(1.0)),
        ],
        ("box", "slab") => vec![
            ("width", Number(4.0)),
            ("height", Number(0.2)),
            ("depth", Number(4.0)),
        ],
        _ => return None,
    };
    Some(overrides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TypeRegistry;

    #[test]
    fn test_unknown_preset() {
        assert!(preset_overrides("tower", "castle").is_none());
        assert!(preset_overrides("sphere", "keep").is_none());
        assert!(preset_keys("sphere").is_empty());
    }

    #[test]
    fn test_every_preset_is_valid_for_its_schema() {
        let registry = TypeRegistry::with_builtin_types();
        for d in registry.values() {
            for key in preset_keys(&d.type_name) {
                let overrides = preset_overrides(&d.type_name, key)
                    .unwrap_or_else(|| panic!("{}/{} listed but missing", d.type_name, key));
                let mut params = d.default_params();
                for (name, value) in overrides {
                    let v = d.schema.validate(name, &value).unwrap();
                    assert_eq!(v, value, "{}/{}: {} clamped", d.type_name, key, name);
                    params.insert(name.to_string(), v);
                }
                d.build(&params).unwrap();
            }
        }
    }
}

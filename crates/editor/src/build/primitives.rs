//! Primitive entity types: box, cylinder, sphere

use shared::{GeometryDesc, ParamRecord, ParamSchema, SceneNodeData};

use super::{count, hex_material, number, text};
use crate::registry::BuildError;

pub const DEFAULT_SEGMENTS: f64 = 32.0;

pub fn box_schema() -> ParamSchema {
    ParamSchema::new()
        .number("width", "Width", 1.0, 0.01, 100.0, 0.1)
        .number("height", "Height", 1.0, 0.01, 100.0, 0.1)
        .number("depth", "Depth", 1.0, 0.01, 100.0, 0.1)
        .text("color", "Color", "#b4b4b4")
}

pub fn build_box(params: &ParamRecord) -> Result<SceneNodeData, BuildError> {
    let width = number(params, "width")?;
    let height = number(params, "height")?;
    let depth = number(params, "depth")?;
    let material = hex_material(text(params, "color")?)?;

    // Origin at the base so the box sits on the ground plane
    Ok(SceneNodeData::group("Box").with_child(
        SceneNodeData::mesh(
            "box",
            GeometryDesc::Box {
                width,
                height,
                depth,
            },
            material,
        )
        .at(0.0, height / 2.0, 0.0),
    ))
}

pub fn cylinder_schema() -> ParamSchema {
    ParamSchema::new()
        .number("radius_top", "Top radius", 0.5, 0.0, 50.0, 0.05)
        .number("radius_bottom", "Bottom radius", 0.5, 0.0, 50.0, 0.05)
        .number("height", "Height", 1.0, 0.01, 100.0, 0.1)
        .number("segments", "Segments", DEFAULT_SEGMENTS, 3.0, 128.0, 1.0)
        .text("color", "Color", "#b4b4b4")
}

pub fn build_cylinder(params: &ParamRecord) -> Result<SceneNodeData, BuildError> {
    let radius_top = number(params, "radius_top")?;
    let radius_bottom = number(params, "radius_bottom")?;
    if radius_top <= 0.0 && radius_bottom <= 0.0 {
        return Err(BuildError::Invalid(
            "cylinder needs at least one non-zero radius".to_string(),
        ));
    }
    let height = number(params, "height")?;
    let material = hex_material(text(params, "color")?)?;

    Ok(SceneNodeData::group("Cylinder").with_child(
        SceneNodeData::mesh(
            "cylinder",
            GeometryDesc::Cylinder {
                radius_top,
                radius_bottom,
                height,
                segments: count(params, "segments")?,
            },
            material,
        )
        .at(0.0, height / 2.0, 0.0),
    ))
}

pub fn sphere_schema() -> ParamSchema {
    ParamSchema::new()
        .number("radius", "Radius", 0.5, 0.01, 50.0, 0.05)
        .number("segments", "Segments", DEFAULT_SEGMENTS, 3.0, 128.0, 1.0)
        .text("color", "Color", "#b4b4b4")
}

pub fn build_sphere(params: &ParamRecord) -> Result<SceneNodeData, BuildError> {
    let radius = number(params, "radius")?;
    let material = hex_material(text(params, "color")?)?;

    Ok(SceneNodeData::group("Sphere").with_child(
        SceneNodeData::mesh(
            "sphere",
            GeometryDesc::Sphere {
                radius,
                segments: count(params, "segments")?,
            },
            material,
        )
        .at(0.0, radius, 0.0),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{NodeKindDesc, ParamValue};

    #[test]
    fn test_box_sits_on_ground() {
        let mut p = box_schema().defaults();
        p.insert("height".into(), ParamValue::Number(4.0));
        let tree = build_box(&p).unwrap();
        assert_eq!(tree.children[0].transform.position, [0.0, 2.0, 0.0]);
    }

    #[test]
    fn test_box_bad_color_fails() {
        let mut p = box_schema().defaults();
        p.insert("color".into(), ParamValue::Text("purple".into()));
        assert!(matches!(build_box(&p), Err(BuildError::Invalid(_))));
    }

    #[test]
    fn test_cylinder_as_cone() {
        let mut p = cylinder_schema().defaults();
        p.insert("radius_top".into(), ParamValue::Number(0.0));
        let tree = build_cylinder(&p).unwrap();
        match &tree.children[0].kind {
            NodeKindDesc::Mesh {
                geometry: GeometryDesc::Cylinder { radius_top, segments, .. },
                ..
            } => {
                assert_eq!(*radius_top, 0.0);
                assert_eq!(*segments, 32);
            }
            other => panic!("unexpected node {:?}", other),
        }
    }

    #[test]
    fn test_cylinder_zero_radii_fails() {
        let mut p = cylinder_schema().defaults();
        p.insert("radius_top".into(), ParamValue::Number(0.0));
        p.insert("radius_bottom".into(), ParamValue::Number(0.0));
        assert!(build_cylinder(&p).is_err());
    }

    #[test]
    fn test_sphere_missing_param() {
        let mut p = sphere_schema().defaults();
        p.remove("radius");
        assert_eq!(
            build_sphere(&p),
            Err(BuildError::MissingParam("radius".into()))
        );
    }
}

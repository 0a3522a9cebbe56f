//! Door: leaf, optional frame, handle

use std::f64::consts::FRAC_PI_2;

use shared::{GeometryDesc, MaterialDesc, ParamRecord, ParamSchema, SceneNodeData};

use super::{flag, number, text, GLASS, METAL, WOOD};
use crate::registry::BuildError;

const FRAME_WIDTH: f64 = 0.08;

pub fn schema() -> ParamSchema {
    ParamSchema::new()
        .number("width", "Width", 0.9, 0.4, 3.0, 0.05)
        .number("height", "Height", 2.1, 1.5, 4.0, 0.05)
        .number("thickness", "Thickness", 0.05, 0.02, 0.2, 0.01)
        .boolean("frame", "Frame", true)
        .choice("style", "Style", "panel", &["panel", "flush", "glazed"])
        .choice("handle_side", "Handle side", "right", &["left", "right"])
}

pub fn build(params: &ParamRecord) -> Result<SceneNodeData, BuildError> {
    let width = number(params, "width")?;
    let height = number(params, "height")?;
    let thickness = number(params, "thickness")?;
    let wood = MaterialDesc::solid(WOOD);

    let mut door = SceneNodeData::group("Door");

    let mut leaf = SceneNodeData::mesh(
        "leaf",
        GeometryDesc::Box {
            width,
            height,
            depth: thickness,
        },
        wood.clone(),
    )
    .at(0.0, height / 2.0, 0.0);

    match text(params, "style")? {
        "flush" => {}
        "panel" => {
            // Two raised panels on the front face
            for (i, y) in [-0.22, 0.22].into_iter().enumerate() {
                leaf.push(
                    SceneNodeData::mesh(
                        format!("panel_{}", i),
                        GeometryDesc::Box {
                            width: width * 0.7,
                            height: height * 0.35,
                            depth: thickness * 0.3,
                        },
                        wood.clone(),
                    )
                    .at(0.0, height * y, thickness * 0.6),
                );
            }
        }
        "glazed" => {
            leaf.push(
                SceneNodeData::mesh(
                    "glass",
                    GeometryDesc::Plane {
                        width: width * 0.6,
                        height: height * 0.4,
                    },
                    MaterialDesc::translucent(GLASS, 0.4),
                )
                .at(0.0, height * 0.2, thickness * 0.51),
            );
        }
        other => return Err(BuildError::Invalid(format!("unknown door style '{}'", other))),
    }
    door.push(leaf);

    if flag(params, "frame")? {
        let post = |name: &str, x: f64| {
            SceneNodeData::mesh(
                name,
                GeometryDesc::Box {
                    width: FRAME_WIDTH,
                    height: height + FRAME_WIDTH,
                    depth: thickness * 2.0,
                },
                wood.clone(),
            )
            .at(x, (height + FRAME_WIDTH) / 2.0, 0.0)
        };
        let half = (width + FRAME_WIDTH) / 2.0;
        door.push(post("frame_left", -half));
        door.push(post("frame_right", half));
        door.push(
            SceneNodeData::mesh(
                "frame_top",
                GeometryDesc::Box {
                    width: width + FRAME_WIDTH * 2.0,
                    height: FRAME_WIDTH,
                    depth: thickness * 2.0,
                },
                wood.clone(),
            )
            .at(0.0, height + FRAME_WIDTH / 2.0, 0.0),
        );
    }

    let side = match text(params, "handle_side")? {
        "left" => -1.0,
        "right" => 1.0,
        other => return Err(BuildError::Invalid(format!("unknown handle side '{}'", other))),
    };
    door.push(
        SceneNodeData::mesh(
            "handle",
            GeometryDesc::Cylinder {
                radius_top: 0.02,
                radius_bottom: 0.02,
                height: thickness * 3.0,
                segments: 12,
            },
            MaterialDesc::solid(METAL),
        )
        .rotated(FRAC_PI_2, 0.0, 0.0)
        .at(side * (width / 2.0 - 0.08), 1.0_f64.min(height * 0.5), 0.0),
    );

    Ok(door)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ParamValue;

    fn find<'a>(tree: &'a SceneNodeData, name: &str) -> Option<&'a SceneNodeData> {
        if tree.name == name {
            return Some(tree);
        }
        tree.children.iter().find_map(|c| find(c, name))
    }

    #[test]
    fn test_default_door() {
        let tree = build(&schema().defaults()).unwrap();
        assert!(find(&tree, "frame_top").is_some());
        assert!(find(&tree, "panel_1").is_some());
        let handle = find(&tree, "handle").unwrap();
        assert!(handle.transform.position[0] > 0.0);
    }

    #[test]
    fn test_no_frame_and_left_handle() {
        let mut p = schema().defaults();
        p.insert("frame".into(), ParamValue::Bool(false));
        p.insert("handle_side".into(), ParamValue::Text("left".into()));
        let tree = build(&p).unwrap();
        assert!(find(&tree, "frame_left").is_none());
        assert!(find(&tree, "handle").unwrap().transform.position[0] < 0.0);
    }

    #[test]
    fn test_glazed_has_glass() {
        let mut p = schema().defaults();
        p.insert("style".into(), ParamValue::Text("glazed".into()));
        let tree = build(&p).unwrap();
        assert!(find(&tree, "glass").is_some());
        assert!(find(&tree, "panel_0").is_none());
    }
}

//! Tower: stacked floors, optional battlements and a roof

use std::f64::consts::{FRAC_PI_4, TAU};

use shared::{GeometryDesc, MaterialDesc, ParamRecord, ParamSchema, SceneNodeData};

use super::{count, flag, number, text, ROOF, STONE};
use crate::registry::BuildError;

pub fn schema() -> ParamSchema {
    ParamSchema::new()
        .number("floors", "Floors", 3.0, 1.0, 20.0, 1.0)
        .number("floor_height", "Floor height", 3.0, 0.5, 10.0, 0.1)
        .number("width", "Width", 4.0, 1.0, 20.0, 0.1)
        .choice("roof", "Roof", "pyramid", &["flat", "pyramid", "dome"])
        .boolean("battlements", "Battlements", false)
        .number("merlons", "Merlons per side", 4.0, 2.0, 12.0, 1.0)
}

pub fn build(params: &ParamRecord) -> Result<SceneNodeData, BuildError> {
    let floors = count(params, "floors")?.max(1);
    let floor_height = number(params, "floor_height")?;
    let width = number(params, "width")?;
    let stone = MaterialDesc::solid(STONE);

    let mut tower = SceneNodeData::group("Tower");

    for i in 0..floors {
        // Each floor is slightly narrower than the one below
        let w = width * (1.0 - 0.03 * f64::from(i));
        tower.push(
            SceneNodeData::mesh(
                format!("floor_{}", i),
                GeometryDesc::Box {
                    width: w,
                    height: floor_height,
                    depth: w,
                },
                stone.clone(),
            )
            .at(0.0, floor_height * (f64::from(i) + 0.5), 0.0),
        );
    }

    let top = floor_height * f64::from(floors);
    let top_width = width * (1.0 - 0.03 * f64::from(floors - 1));

    if flag(params, "battlements")? {
        tower.push(battlements(top, top_width, count(params, "merlons")?, &stone));
    }

    let roof = match text(params, "roof")? {
        "flat" => None,
        "pyramid" => Some(
            SceneNodeData::mesh(
                "roof",
                GeometryDesc::Cylinder {
                    radius_top: 0.0,
                    radius_bottom: top_width * 0.75,
                    height: top_width * 0.75,
                    segments: 4,
                },
                MaterialDesc::solid(ROOF),
            )
            // Square pyramid: rotate the 4-segment cone to align with the walls
            .rotated(0.0, FRAC_PI_4, 0.0)
            .at(0.0, top + top_width * 0.375, 0.0),
        ),
        "dome" => Some(
            SceneNodeData::mesh(
                "roof",
                GeometryDesc::Sphere {
                    radius: top_width * 0.5,
                    segments: 24,
                },
                MaterialDesc::solid(ROOF),
            )
            .at(0.0, top, 0.0),
        ),
        other => return Err(BuildError::Invalid(format!("unknown roof '{}'", other))),
    };
    if let Some(roof) = roof {
        tower.push(roof);
    }

    Ok(tower)
}

fn battlements(top: f64, width: f64, per_side: u32, material: &MaterialDesc) -> SceneNodeData {
    let merlon = width / (f64::from(per_side) * 2.0);
    let half = width / 2.0 - merlon / 2.0;
    let mut group = SceneNodeData::group("battlements").at(0.0, top, 0.0);

    for side in 0..4 {
        let angle = TAU * f64::from(side) / 4.0;
        let (sin, cos) = angle.sin_cos();
        for i in 0..per_side {
            // Offset along the side, centered
            let t = (f64::from(i) + 0.5) / f64::from(per_side) * width - width / 2.0;
            let (x, z) = (cos * half - sin * t, sin * half + cos * t);
            group.push(
                SceneNodeData::mesh(
                    format!("merlon_{}_{}", side, i),
                    GeometryDesc::Box {
                        width: merlon,
                        height: merlon,
                        depth: merlon,
                    },
                    material.clone(),
                )
                .rotated(0.0, -angle, 0.0)
                .at(x, merlon / 2.0, z),
            );
        }
    }

    group
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ParamValue;

    fn params() -> ParamRecord {
        schema().defaults()
    }

    fn child_named<'a>(tree: &'a SceneNodeData, name: &str) -> Option<&'a SceneNodeData> {
        tree.children.iter().find(|c| c.name == name)
    }

    #[test]
    fn test_floor_count() {
        let mut p = params();
        p.insert("floors".into(), ParamValue::Number(5.0));
        p.insert("roof".into(), ParamValue::Text("flat".into()));
        let tree = build(&p).unwrap();
        assert_eq!(tree.children.len(), 5);
        assert_eq!(tree.mesh_count(), 5);
    }

    #[test]
    fn test_floors_are_stacked() {
        let tree = build(&params()).unwrap();
        let f0 = child_named(&tree, "floor_0").unwrap();
        let f2 = child_named(&tree, "floor_2").unwrap();
        assert_eq!(f0.transform.position[1], 1.5);
        assert_eq!(f2.transform.position[1], 7.5);
    }

    #[test]
    fn test_roof_styles() {
        for (style, has_roof) in [("flat", false), ("pyramid", true), ("dome", true)] {
            let mut p = params();
            p.insert("roof".into(), ParamValue::Text(style.into()));
            let tree = build(&p).unwrap();
            assert_eq!(child_named(&tree, "roof").is_some(), has_roof, "{style}");
        }
    }

    #[test]
    fn test_battlements() {
        let mut p = params();
        p.insert("battlements".into(), ParamValue::Bool(true));
        p.insert("merlons".into(), ParamValue::Number(3.0));
        let tree = build(&p).unwrap();
        let b = child_named(&tree, "battlements").unwrap();
        assert_eq!(b.children.len(), 12);
    }

    #[test]
    fn test_unknown_roof_fails() {
        let mut p = params();
        p.insert("roof".into(), ParamValue::Text("onion".into()));
        assert!(build(&p).is_err());
    }
}

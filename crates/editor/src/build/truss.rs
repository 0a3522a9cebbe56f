//! Planar truss: two chords, verticals and diagonals in the XY plane

use shared::{GeometryDesc, MaterialDesc, ParamRecord, ParamSchema, SceneNodeData};

use super::{count, number, text, METAL};
use crate::registry::BuildError;

pub fn schema() -> ParamSchema {
    ParamSchema::new()
        .number("length", "Length", 6.0, 1.0, 60.0, 0.1)
        .number("height", "Height", 1.0, 0.2, 8.0, 0.05)
        .number("segments", "Segments", 6.0, 1.0, 40.0, 1.0)
        .number("member_size", "Member size", 0.08, 0.02, 0.5, 0.01)
        .choice("pattern", "Pattern", "warren", &["warren", "pratt", "howe"])
}

pub fn build(params: &ParamRecord) -> Result<SceneNodeData, BuildError> {
    let length = number(params, "length")?;
    let height = number(params, "height")?;
    let segments = count(params, "segments")?.max(1);
    let size = number(params, "member_size")?;
    let pattern = text(params, "pattern")?;
    if !matches!(pattern, "warren" | "pratt" | "howe") {
        return Err(BuildError::Invalid(format!("unknown truss pattern '{}'", pattern)));
    }

    let metal = MaterialDesc::solid(METAL);
    let step = length / f64::from(segments);
    let x0 = -length / 2.0;

    // A member is a box stretched between two points in the XY plane
    let member = |name: String, (ax, ay): (f64, f64), (bx, by): (f64, f64)| {
        let (dx, dy) = (bx - ax, by - ay);
        SceneNodeData::mesh(
            name,
            GeometryDesc::Box {
                width: dx.hypot(dy),
                height: size,
                depth: size,
            },
            metal.clone(),
        )
        .rotated(0.0, 0.0, dy.atan2(dx))
        .at((ax + bx) / 2.0, (ay + by) / 2.0, 0.0)
    };

    let mut truss = SceneNodeData::group("Truss");
    truss.push(member("bottom_chord".into(), (x0, 0.0), (-x0, 0.0)));
    truss.push(member("top_chord".into(), (x0, height), (-x0, height)));

    for i in 0..segments {
        let left = x0 + step * f64::from(i);
        let right = left + step;

        if pattern != "warren" || i == 0 {
            truss.push(member(format!("vertical_{}", i), (left, 0.0), (left, height)));
        }

        let (a, b) = match pattern {
            // Alternating diagonals
            "warren" if i % 2 == 0 => ((left, 0.0), (right, height)),
            "warren" => ((left, height), (right, 0.0)),
            // Diagonals slope toward the center (pratt) or away from it (howe)
            _ => {
                let left_half = right <= 0.0;
                let toward_center = (pattern == "pratt") == left_half;
                if toward_center {
                    ((left, 0.0), (right, height))
                } else {
                    ((left, height), (right, 0.0))
                }
            }
        };
        truss.push(member(format!("diagonal_{}", i), a, b));
    }
    truss.push(member(
        format!("vertical_{}", segments),
        (-x0, 0.0),
        (-x0, height),
    ));

    Ok(truss)
}

use shared::{GeometryDesc, MaterialDesc, ParamRecord, ParamSchema, SceneNodeData};

use super::{count, flag, number, GLASS, WOOD};
use crate::registry::BuildError;

pub fn schema() -> ParamSchema {
    ParamSchema::new()
        .number("width", "Width", 1.2, 0.2, 6.0, 0.05)
        .number("height", "Height", 1.4, 0.2, 6.0, 0.05)
        .number("frame_thickness", "Frame thickness", 0.06, 0.01, 0.3, 0.01)
        .number("panes_x", "Panes across", 2.0, 1.0, 8.0, 1.0)
        .number("panes_y", "Panes down", 2.0, 1.0, 8.0, 1.0)
        .boolean("sill", "Sill", true)
        .number("glass_opacity", "Glass opacity", 0.35, 0.0, 1.0, 0.05)
}

pub fn build(params: &ParamRecord) -> Result<SceneNodeData, BuildError> {
    let width = number(params, "width")?;
    let height = number(params, "height")?;
    let frame = number(params, "frame_thickness")?;
    let panes_x = count(params, "panes_x")?.max(1);
    let panes_y = count(params, "panes_y")?.max(1);
    if frame * 2.0 >= width.min(height) {
        return Err(BuildError::Invalid(
            "frame is thicker than the window opening".to_string(),
        ));
    }

    let wood = MaterialDesc::solid(WOOD);
    let bar = |name: String, w: f64, h: f64, x: f64, y: f64| {
        SceneNodeData::mesh(
            name,
            GeometryDesc::Box {
                width: w,
                height: h,
                depth: frame,
            },
            wood.clone(),
        )
        .at(x, y, 0.0)
    };

    let mut window = SceneNodeData::group("Window");

    // Outer frame
    window.push(bar("frame_bottom".into(), width, frame, 0.0, frame / 2.0));
    window.push(bar("frame_top".into(), width, frame, 0.0, height - frame / 2.0));
    window.push(bar("frame_left".into(), frame, height, -(width - frame) / 2.0, height / 2.0));
    window.push(bar("frame_right".into(), frame, height, (width - frame) / 2.0, height / 2.0));

    // Mullions and transoms split the opening into panes
    let inner_w = width - frame * 2.0;
    let inner_h = height - frame * 2.0;
    for i in 1..panes_x {
        let x = -inner_w / 2.0 + inner_w * f64::from(i) / f64::from(panes_x);
        window.push(bar(format!("mullion_{}", i), frame * 0.5, inner_h, x, height / 2.0));
    }
    for j in 1..panes_y {
        let y = frame + inner_h * f64::from(j) / f64::from(panes_y);
        window.push(bar(format!("transom_{}", j), inner_w, frame * 0.5, 0.0, y));
    }

    let opacity = number(params, "glass_opacity")? as f32;
    window.push(
        SceneNodeData::mesh(
            "glass",
            GeometryDesc::Plane {
                width: inner_w,
                height: inner_h,
            },
            MaterialDesc::translucent(GLASS, opacity),
        )
        .at(0.0, height / 2.0, 0.0),
    );

    if flag(params, "sill")? {
        window.push(
            SceneNodeData::mesh(
                "sill",
                GeometryDesc::Box {
                    width: width + frame * 2.0,
                    height: frame * 0.6,
                    depth: frame * 3.0,
                },
                wood.clone(),
            )
            .at(0.0, -frame * 0.3, frame),
        );
    }

    Ok(window)
}

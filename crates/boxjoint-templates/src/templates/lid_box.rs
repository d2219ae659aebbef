//! Open box plus a separately jointed lid shell that slides over it.
//!
//! The lid is its own shell with its own edge pairs. Its panel names carry
//! a `LID_` prefix and its base plays the top, `LID_TOP`.

use boxjoint_core::{Warning, Warnings};
use boxjoint_joinery::{run_rules, validate_joints, Cutout, EdgePairRegistry, RuleFn};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::TemplateBuild;
use crate::error::GenerateResult;
use crate::params::Resolved;
use crate::shell::{assemble_all, BoxShell};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LidBoxParams {
    pub inner_w: f64,
    pub inner_d: f64,
    pub inner_h: f64,
    /// Emit the lid shell.
    pub lid: bool,
    pub lid_height: f64,
    /// Gap between the box walls and the lid walls, per side.
    pub lid_clearance: f64,
    pub thumb_notch_radius: f64,
    pub thumb_notch_depth: f64,
}

impl Default for LidBoxParams {
    fn default() -> Self {
        Self {
            inner_w: 70.0,
            inner_d: 95.0,
            inner_h: 120.0,
            lid: true,
            lid_height: 25.0,
            lid_clearance: 0.4,
            thumb_notch_radius: 10.0,
            thumb_notch_depth: 8.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LidCheck {
    pub lid: bool,
    pub lid_clearance: f64,
    pub kerf: f64,
}

pub const RULES: [RuleFn<LidCheck>; 1] = [lid_clearance_above_kerf];

pub fn lid_clearance_above_kerf(ctx: &LidCheck) -> Warnings {
    Warnings::when(ctx.lid && ctx.lid_clearance < ctx.kerf, || {
        Warning::warn(
            "LID_CLEARANCE_TIGHT",
            format!(
                "Lid clearance {:.2} mm is below the {:.2} mm kerf; the lid may not fit",
                ctx.lid_clearance, ctx.kerf
            ),
            "Increase lid_clearance",
        )
    })
}

pub fn build(params: &Resolved<LidBoxParams>) -> GenerateResult<TemplateBuild> {
    let p = &params.template;
    let t = params.fabrication.thickness;
    let joint = params.fabrication.joint_params();

    let outer_w = p.inner_w + 2.0 * t;
    let outer_d = p.inner_d + 2.0 * t;
    let wall_h = p.inner_h + t;

    let mut registry = EdgePairRegistry::new(joint.clone());
    let specs = BoxShell::new(outer_w, outer_d, wall_h)
        .register(&mut registry)?
        .build()?;
    let mut panels = assemble_all(&specs, &registry)?;
    let mut warnings = validate_joints(registry.params(), registry.pairs());

    let lid_w = outer_w + 2.0 * p.lid_clearance + 2.0 * t;
    let lid_d = outer_d + 2.0 * p.lid_clearance + 2.0 * t;
    if p.lid {
        let mut lid_registry = EdgePairRegistry::new(joint);
        let mut lid = BoxShell::new(lid_w, lid_d, p.lid_height)
            .named("LID_", "TOP")
            .register(&mut lid_registry)?;
        if p.thumb_notch_radius > 0.0 {
            lid.front = lid.front.cutout(Cutout::thumb_notch(
                lid_w,
                0.0,
                p.thumb_notch_radius,
                p.thumb_notch_depth,
            ));
        }
        let lid_specs = lid.build()?;
        panels.extend(assemble_all(&lid_specs, &lid_registry)?);
        warnings = warnings
            .concat(validate_joints(lid_registry.params(), lid_registry.pairs()))
            .dedup();
    }

    let check = LidCheck {
        lid: p.lid,
        lid_clearance: p.lid_clearance,
        kerf: params.fabrication.kerf,
    };
    let warnings = warnings.concat(run_rules(&check, &RULES));

    let derived = json!({
        "outer_w": outer_w,
        "outer_d": outer_d,
        "wall_h": wall_h,
        "lid_outer_w": if p.lid { Some(lid_w) } else { None },
        "lid_outer_d": if p.lid { Some(lid_d) } else { None },
        "lid_height": p.lid_height,
    });
    Ok(TemplateBuild::new(panels, warnings, derived))
}

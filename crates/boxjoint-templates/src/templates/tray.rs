//! Open-front tray: jointed base and walls with a lowered front lip.

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
pub struct TrayParams {
    pub inner_w: f64,
    pub inner_d: f64,
    pub inner_h: f64,
    /// Height of the front lip panel.
    pub front_h: f64,
    pub scoop: bool,
    pub scoop_r: f64,
    pub scoop_depth: f64,
}

impl Default for TrayParams {
    fn default() -> Self {
        Self {
            inner_w: 135.0,
            inner_d: 90.0,
            inner_h: 80.0,
            front_h: 30.0,
            scoop: true,
            scoop_r: 22.0,
            scoop_depth: 16.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TrayCheck {
    pub inner_h: f64,
    pub front_h: f64,
}

pub const RULES: [RuleFn<TrayCheck>; 1] = [front_lower_than_walls];

pub fn front_lower_than_walls(ctx: &TrayCheck) -> Warnings {
    Warnings::when(ctx.front_h >= ctx.inner_h, || {
        Warning::warn(
            "TRAY_FRONT_TOO_TALL",
            "Front height is close to or above side height; tray may not be 'open front'",
            "Reduce front_h",
        )
    })
}

/// Scoop notch opening at the lip's rim, kept clear of the bottom joint.
fn scoop_notch(outer_w: f64, front_h: f64, thickness: f64, p: &TrayParams) -> Option<Cutout> {
    let total = p.scoop_depth.min(front_h - thickness - 2.0);
    let radius = p.scoop_r.min(outer_w * 0.25).min(total);
    if !(radius > 0.0) {
        return None;
    }
    Some(Cutout::thumb_notch(outer_w, 0.0, radius, total - radius))
}

pub fn build(params: &Resolved<TrayParams>) -> GenerateResult<TemplateBuild> {
    let p = &params.template;
    let t = params.fabrication.thickness;
    let outer_w = p.inner_w + 2.0 * t;
    let outer_d = p.inner_d + 2.0 * t;
    let wall_h = p.inner_h + t;

    let mut registry = EdgePairRegistry::new(params.fabrication.joint_params());
    let shell = BoxShell::new(outer_w, outer_d, wall_h).lowered_front(p.front_h)?;
    let front_h = shell.front_height();
    let mut specs = shell.register(&mut registry)?;

    let scoop = if p.scoop {
        scoop_notch(outer_w, front_h, t, p)
    } else {
        None
    };
    if let Some(notch) = scoop.clone() {
        specs.front = specs.front.cutout(notch);
    }

    let specs = specs.build()?;
    let panels = assemble_all(&specs, &registry)?;

    let check = TrayCheck {
        inner_h: p.inner_h,
        front_h: p.front_h,
    };
    let warnings = validate_joints(registry.params(), registry.pairs())
        .concat(run_rules(&check, &RULES));

    let derived = json!({
        "outer_w": outer_w,
        "outer_d": outer_d,
        "wall_h": wall_h,
        "front_h": front_h,
        "scoop": scoop,
    });
    Ok(TemplateBuild::new(panels, warnings, derived))
}

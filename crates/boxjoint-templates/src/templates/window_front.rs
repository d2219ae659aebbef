//! Closed box whose front panel carries a display window.

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
pub struct WindowFrontParams {
    pub inner_w: f64,
    pub inner_d: f64,
    pub inner_h: f64,
    /// Frame left around the window, measured from the front's outer edge.
    pub window_margin: f64,
    pub window_corner_r: f64,
}

impl Default for WindowFrontParams {
    fn default() -> Self {
        Self {
            inner_w: 135.0,
            inner_d: 90.0,
            inner_h: 80.0,
            window_margin: 12.0,
            window_corner_r: 8.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WindowCheck {
    pub thickness: f64,
    pub margin: f64,
    pub front_w: f64,
    pub front_h: f64,
}

pub const RULES: [RuleFn<WindowCheck>; 2] = [margin_clears_joints, window_has_area];

pub fn margin_clears_joints(ctx: &WindowCheck) -> Warnings {
    Warnings::when(ctx.margin < 2.0 * ctx.thickness, || {
        Warning::warn(
            "WIN_MARGIN_TIGHT",
            format!(
                "Window margin {:.1} mm cuts into the {:.1} mm finger joints",
                ctx.margin, ctx.thickness
            ),
            "Increase window_margin to at least twice the thickness",
        )
    })
}

pub fn window_has_area(ctx: &WindowCheck) -> Warnings {
    let too_small = ctx.front_w - 2.0 * ctx.margin <= 1.0 || ctx.front_h - 2.0 * ctx.margin <= 1.0;
    Warnings::when(too_small, || {
        Warning::warn(
            "WIN_TOO_SMALL",
            "Window margin leaves almost no window; it is drawn at 1 mm",
            "Reduce window_margin or enlarge the box",
        )
    })
}

pub fn build(params: &Resolved<WindowFrontParams>) -> GenerateResult<TemplateBuild> {
    let p = &params.template;
    let t = params.fabrication.thickness;

    let outer_w = p.inner_w + 2.0 * t;
    let outer_d = p.inner_d + 2.0 * t;
    let wall_h = p.inner_h + 2.0 * t;

    let mut registry = EdgePairRegistry::new(params.fabrication.joint_params());
    let mut specs = BoxShell::new(outer_w, outer_d, wall_h)
        .with_top()
        .register(&mut registry)?;

    let window = Cutout::window(outer_w, wall_h, p.window_margin, p.window_corner_r);
    specs.front = specs.front.cutout(window.clone());

    let specs = specs.build()?;
    let panels = assemble_all(&specs, &registry)?;

    let check = WindowCheck {
        thickness: t,
        margin: p.window_margin,
        front_w: outer_w,
        front_h: wall_h,
    };
    let warnings = validate_joints(registry.params(), registry.pairs())
        .concat(run_rules(&check, &RULES));

    let derived = json!({
        "outer_w": outer_w,
        "outer_d": outer_d,
        "wall_h": wall_h,
        "window": window,
    });
    Ok(TemplateBuild::new(panels, warnings, derived))
}

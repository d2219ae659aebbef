//! Open box with a dispensing slot and a thumb notch in the front wall.

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
pub struct DispenserParams {
    pub inner_w: f64,
    pub inner_d: f64,
    pub inner_h: f64,
    pub slot_width: f64,
    pub slot_height: f64,
    /// Distance from the bottom of the front panel to the bottom of the slot.
    pub slot_y_from_bottom: f64,
    pub thumb_notch_radius: f64,
    pub thumb_notch_depth: f64,
}

impl Default for DispenserParams {
    fn default() -> Self {
        Self {
            inner_w: 70.0,
            inner_d: 95.0,
            inner_h: 120.0,
            slot_width: 60.0,
            slot_height: 18.0,
            slot_y_from_bottom: 35.0,
            thumb_notch_radius: 10.0,
            thumb_notch_depth: 8.0,
        }
    }
}

/// Slot rectangle on the front panel, panel-local.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SlotPlacement {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub clamped: bool,
}

/// Fits the requested slot inside a `front_w` x `front_h` front panel.
///
/// The slot keeps `2 * thickness` clear of the side joints and of the bottom
/// joint, and at least `thickness` below the rim.
pub fn place_slot(front_w: f64, front_h: f64, thickness: f64, p: &DispenserParams) -> SlotPlacement {
    let t = thickness;
    let w = p.slot_width.min(front_w - 4.0 * t).max(0.0);
    let h = p.slot_height.min(front_h - 3.0 * t).max(0.0);
    let wanted_y = front_h - p.slot_y_from_bottom - h;
    let y = wanted_y.min(front_h - 2.0 * t - h).max(t);
    let clamped = w < p.slot_width || h < p.slot_height || (y - wanted_y).abs() > 1e-9;
    SlotPlacement {
        x: (front_w - w) / 2.0,
        y,
        w,
        h,
        clamped,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DispenserCheck {
    pub slot: SlotPlacement,
}

pub const RULES: [RuleFn<DispenserCheck>; 2] = [slot_not_clamped, slot_has_area];

pub fn slot_not_clamped(ctx: &DispenserCheck) -> Warnings {
    let slot = ctx.slot;
    Warnings::when(slot.clamped, || {
        Warning::info(
            "DISP_SLOT_CLAMPED",
            format!(
                "Dispensing slot reduced to {:.1} x {:.1} mm at y {:.1} to fit the front panel",
                slot.w, slot.h, slot.y
            ),
            "Reduce slot_width/slot_height or enlarge the box",
        )
    })
}

pub fn slot_has_area(ctx: &DispenserCheck) -> Warnings {
    Warnings::when(!(ctx.slot.w > 0.0 && ctx.slot.h > 0.0), || {
        Warning::error(
            "DISP_NO_SLOT",
            "The front panel is too small for any dispensing slot",
            "Enlarge inner_w and inner_h",
        )
    })
}

pub fn build(params: &Resolved<DispenserParams>) -> GenerateResult<TemplateBuild> {
    let p = &params.template;
    let t = params.fabrication.thickness;

    let outer_w = p.inner_w + 2.0 * t;
    let outer_d = p.inner_d + 2.0 * t;
    let wall_h = p.inner_h + t;

    let mut registry = EdgePairRegistry::new(params.fabrication.joint_params());
    let mut specs = BoxShell::new(outer_w, outer_d, wall_h).register(&mut registry)?;

    let slot = place_slot(outer_w, wall_h, t, p);
    if slot.w > 0.0 && slot.h > 0.0 {
        specs.front = specs.front.cutout(Cutout::rect(slot.x, slot.y, slot.w, slot.h));
    }
    if p.thumb_notch_radius > 0.0 {
        specs.front = specs.front.cutout(Cutout::thumb_notch(
            outer_w,
            0.0,
            p.thumb_notch_radius,
            p.thumb_notch_depth,
        ));
    }

    let specs = specs.build()?;
    let panels = assemble_all(&specs, &registry)?;

    let check = DispenserCheck { slot };
    let warnings = validate_joints(registry.params(), registry.pairs())
        .concat(run_rules(&check, &RULES));

    let derived = json!({
        "outer_w": outer_w,
        "outer_d": outer_d,
        "wall_h": wall_h,
        "slot": slot,
    });
    Ok(TemplateBuild::new(panels, warnings, derived))
}

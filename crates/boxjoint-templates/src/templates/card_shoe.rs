//! Front-draw card shoe.
//!
//! An open-top box sized to a card stack. The front wall carries a draw
//! slot just above the base, a retention lip above the slot and a viewing
//! window above the lip. Loose ramp parts tilt the stack towards the slot
//! and optional stabiliser feet widen the footprint.

use boxjoint_core::{Point, Warning, Warnings};
use boxjoint_joinery::{run_rules, validate_joints, Cutout, EdgePairRegistry, RuleFn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::{plain_panel, TemplateBuild};
use crate::error::{GenerateError, GenerateResult};
use crate::params::Resolved;
use crate::shell::{assemble_all, BoxShell};

/// Height of the front strip between the draw slot and the window, in mm.
pub const LIP_H: f64 = 10.0;

/// Windows shorter than this are left out, in mm.
pub const MIN_WINDOW_H: f64 = 8.0;

const WINDOW_R: f64 = 6.0;
const RAMP_BLOCK_D: f64 = 25.0;
const STABILISER_D: f64 = 14.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardShoeParams {
    pub card_w: f64,
    pub card_h: f64,
    pub card_t: f64,
    pub capacity: u32,
    pub ramp_angle_deg: f64,
    pub stabilisers: bool,
}

impl Default for CardShoeParams {
    fn default() -> Self {
        Self {
            card_w: 63.0,
            card_h: 88.0,
            card_t: 0.35,
            capacity: 60,
            ramp_angle_deg: 12.0,
            stabilisers: true,
        }
    }
}

/// Dimensions derived from the card stack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShoeDims {
    pub inner_w: f64,
    pub inner_d: f64,
    pub inner_h: f64,
    pub outer_w: f64,
    pub outer_d: f64,
    pub wall_h: f64,
    pub slot_w: f64,
    pub slot_h: f64,
    pub ramp_rise: f64,
}

impl ShoeDims {
    pub fn new(p: &CardShoeParams, thickness: f64) -> Self {
        let inner_w = p.card_w + 2.0;
        let inner_d = p.card_h + 1.5;
        let inner_h = f64::from(p.capacity) * p.card_t + 10.0;
        let ramp_rise = (inner_d * p.ramp_angle_deg.to_radians().tan())
            .min(0.6 * inner_h)
            .max(8.0);
        Self {
            inner_w,
            inner_d,
            inner_h,
            outer_w: inner_w + 2.0 * thickness,
            outer_d: inner_d + 2.0 * thickness,
            wall_h: inner_h + thickness,
            slot_w: 0.85 * p.card_w,
            slot_h: (p.card_t + 0.6).clamp(1.0, 2.0),
            ramp_rise,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CardShoeCheck {
    pub card_t: f64,
    pub slot_h: f64,
    pub inner_w: f64,
    pub inner_h: f64,
    pub stabilisers: bool,
    pub window: bool,
}

pub const RULES: [RuleFn<CardShoeCheck>; 4] =
    [slot_not_too_small, slot_not_too_tall, not_tippy, window_present];

pub fn slot_not_too_small(ctx: &CardShoeCheck) -> Warnings {
    Warnings::when(ctx.slot_h < ctx.card_t + 0.3, || {
        Warning::error(
            "CS_SLOT_TOO_SMALL",
            format!(
                "Draw slot height {:.2}mm is too small for card thickness {:.2}mm (jam risk)",
                ctx.slot_h, ctx.card_t
            ),
            "Verify the card thickness input",
        )
    })
}

pub fn slot_not_too_tall(ctx: &CardShoeCheck) -> Warnings {
    Warnings::when(ctx.slot_h > ctx.card_t + 2.5, || {
        Warning::warn(
            "CS_SLOT_TOO_TALL",
            format!(
                "Draw slot height {:.2}mm is much larger than card thickness {:.2}mm (multi-card risk)",
                ctx.slot_h, ctx.card_t
            ),
            "Verify the card thickness input",
        )
    })
}

pub fn not_tippy(ctx: &CardShoeCheck) -> Warnings {
    let ratio = ctx.inner_h / ctx.inner_w.max(1e-6);
    Warnings::when(ratio > 2.0 && !ctx.stabilisers, || {
        Warning::warn(
            "CS_TIPPY",
            format!("Box is tall relative to width (H/W ~ {ratio:.2}); may tip during pulling"),
            "Enable stabilisers or increase base width",
        )
    })
}

pub fn window_present(ctx: &CardShoeCheck) -> Warnings {
    Warnings::when(!ctx.window, || {
        Warning::info(
            "CS_NO_WINDOW",
            "Front wall is too short for a viewing window above the retention lip",
            "Increase capacity for a taller shoe",
        )
    })
}

/// Front cutouts: the draw slot and, room permitting, the window.
fn front_cutouts(d: &ShoeDims, thickness: f64) -> (Cutout, Option<Cutout>) {
    let slot_y = d.wall_h - 2.0 * thickness - d.slot_h;
    let slot = Cutout::rect((d.outer_w - d.slot_w) / 2.0, slot_y, d.slot_w, d.slot_h);

    let margin_x = ((d.outer_w - d.slot_w) / 2.0 - 4.0).max(8.0);
    let win_w = d.outer_w - 2.0 * margin_x;
    let win_bottom = slot_y - LIP_H;
    let win_top = (win_bottom - (0.45 * d.inner_h).clamp(30.0, 70.0)).max(2.0 * thickness);
    let win_h = win_bottom - win_top;

    let window = (win_h >= MIN_WINDOW_H && win_w > 0.0)
        .then(|| Cutout::rounded_rect(margin_x, win_top, win_w, win_h, WINDOW_R));
    (slot, window)
}

pub fn build(params: &Resolved<CardShoeParams>) -> GenerateResult<TemplateBuild> {
    let p = &params.template;
    let t = params.fabrication.thickness;
    for (name, value) in [("card_w", p.card_w), ("card_h", p.card_h), ("card_t", p.card_t)] {
        if !(value > 0.0) {
            return Err(GenerateError::invalid(name, "must be > 0"));
        }
    }

    let d = ShoeDims::new(p, t);

    let mut registry = EdgePairRegistry::new(params.fabrication.joint_params());
    let mut specs = BoxShell::new(d.outer_w, d.outer_d, d.wall_h).register(&mut registry)?;

    let (slot, window) = front_cutouts(&d, t);
    specs.front = specs
        .front
        .cutout(slot)
        .cutouts(window.clone())
        .label("DRAW", Point::new(d.outer_w / 2.0, d.wall_h - 2.0 * t - d.slot_h - LIP_H / 2.0));

    let specs = specs.build()?;
    let mut panels = assemble_all(&specs, &registry)?;

    panels.push(plain_panel("RAMP_PLATE", d.inner_w, d.inner_d)?);
    for i in 1..=2 {
        panels.push(plain_panel(&format!("RAMP_BLOCK_{i}"), RAMP_BLOCK_D, d.ramp_rise)?);
    }
    panels.push(plain_panel("RAMP_BACK_BAR", d.inner_w, d.ramp_rise.min(12.0))?);
    if p.stabilisers {
        for i in 1..=2 {
            panels.push(plain_panel(&format!("STABILISER_{i}"), 0.8 * d.outer_w, STABILISER_D)?);
        }
    }
    debug!("Card shoe for {} cards: {} panels", p.capacity, panels.len());

    let check = CardShoeCheck {
        card_t: p.card_t,
        slot_h: d.slot_h,
        inner_w: d.inner_w,
        inner_h: d.inner_h,
        stabilisers: p.stabilisers,
        window: window.is_some(),
    };
    let warnings = validate_joints(registry.params(), registry.pairs())
        .concat(run_rules(&check, &RULES));

    let derived = json!({
        "dims": d,
        "lip_h": LIP_H,
        "window": window,
    });
    Ok(TemplateBuild::new(panels, warnings, derived))
}

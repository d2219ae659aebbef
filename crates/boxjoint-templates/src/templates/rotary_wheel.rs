//! Rotary pocket wheel for flowing solids, built from screwed plates.
//!
//! Not a jointed box: every part is a free outline. The pocket wheel
//! sizing in [`PocketWheel`] is shared with the layered candy machine.

use std::f64::consts::TAU;

use boxjoint_core::{JointResult, Point, Warning, Warnings};
use boxjoint_joinery::{circle_outline, run_rules, Cutout, Panel, RuleFn};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{free_panel, rect_outline, TemplateBuild};
use crate::error::{GenerateError, GenerateResult};
use crate::params::Resolved;

/// Segments used for round outlines.
pub const CIRCLE_SEGMENTS: usize = 96;

/// Pocket ring inset from the rim, as a fraction of the pocket diameter.
const POCKET_INSET: f64 = 0.85;

/// How a pocket wheel is sized from its pocket diameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelSizing {
    /// Circumference factor applied to the pocket diameter.
    pub spread: f64,
    /// Lower bound on the divisor of the spread circumference.
    pub pitch_floor: f64,
    pub min_count: u32,
    pub min_radius: f64,
    /// Rim radius over the radius the pockets alone would need.
    pub fill: f64,
}

pub const ROTARY_SIZING: WheelSizing = WheelSizing {
    spread: 1.5,
    pitch_floor: 6.0,
    min_count: 6,
    min_radius: 30.0,
    fill: 1.35,
};

pub const CANDY_SIZING: WheelSizing = WheelSizing {
    spread: 1.6,
    pitch_floor: 10.0,
    min_count: 8,
    min_radius: 28.0,
    fill: 1.25,
};

/// A round wheel with an even number of circular pockets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PocketWheel {
    pub pocket_d: f64,
    pub count: u32,
    pub radius: f64,
}

impl PocketWheel {
    pub fn sized(pocket_d: f64, sizing: WheelSizing) -> Self {
        let raw = (TAU * pocket_d * sizing.spread / pocket_d.max(sizing.pitch_floor)).round();
        let mut count = if raw.is_finite() && raw > 0.0 {
            (raw as u32).max(sizing.min_count)
        } else {
            sizing.min_count
        };
        if count % 2 == 1 {
            count += 1;
        }
        let radius = (f64::from(count) * pocket_d / TAU * sizing.fill).max(sizing.min_radius);
        Self {
            pocket_d,
            count,
            radius,
        }
    }

    /// Rim material between neighbouring pockets.
    pub fn wall_between(&self) -> f64 {
        TAU * self.radius / f64::from(self.count) - self.pocket_d
    }

    /// Pocket holes around the ring, centred on `(cx, cy)`.
    pub fn pockets(&self, cx: f64, cy: f64) -> Vec<Cutout> {
        if !(self.pocket_d > 0.0) {
            return Vec::new();
        }
        let ring = self.radius - POCKET_INSET * self.pocket_d;
        (0..self.count)
            .map(|i| {
                let a = TAU * f64::from(i) / f64::from(self.count);
                Cutout::circle(cx + ring * a.cos(), cy + ring * a.sin(), self.pocket_d / 2.0)
            })
            .collect()
    }

    /// The wheel part with its axle hole.
    pub fn panel(&self, axle_d: f64) -> JointResult<Panel> {
        let r = self.radius;
        let mut cutouts = vec![Cutout::circle(r, r, axle_d / 2.0)];
        cutouts.extend(self.pockets(r, r));
        free_panel(
            "WHEEL",
            circle_outline(r, r, r, CIRCLE_SEGMENTS),
            cutouts,
            Point::new(r, r),
        )
    }
}

/// A disc of radius `r` with concentric `holes`, positioned at the origin.
pub fn disc(name: &str, r: f64, holes: &[f64]) -> JointResult<Panel> {
    let cutouts = holes.iter().map(|h| Cutout::circle(r, r, *h)).collect();
    free_panel(name, circle_outline(r, r, r, CIRCLE_SEGMENTS), cutouts, Point::new(r, r))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotaryWheelParams {
    /// Largest piece the wheel has to carry, in mm.
    pub max_piece: f64,
    /// Adds safety margin for irregular pieces.
    pub irregular: bool,
    pub axle_d: f64,
}

impl Default for RotaryWheelParams {
    fn default() -> Self {
        Self {
            max_piece: 18.0,
            irregular: false,
            axle_d: 3.2,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RotaryCheck {
    pub max_piece: f64,
    pub chute_w: f64,
    pub wheel: PocketWheel,
}

pub const RULES: [RuleFn<RotaryCheck>; 2] = [chute_wide_enough, pocket_walls_thick];

/// Rejects piece sizes no pocket can be cut for.
pub(crate) fn require_piece_size(max_piece: f64) -> GenerateResult<()> {
    if max_piece > 0.0 && max_piece.is_finite() {
        Ok(())
    } else {
        Err(GenerateError::invalid(
            "max_piece",
            format!("must be a positive length, got {max_piece}"),
        ))
    }
}

pub fn chute_wide_enough(ctx: &RotaryCheck) -> Warnings {
    Warnings::when(ctx.chute_w <= ctx.max_piece, || {
        Warning::error(
            "RW_CHUTE_TOO_NARROW",
            format!(
                "Chute width {:.2}mm is <= max piece {:.2}mm (bridging)",
                ctx.chute_w, ctx.max_piece
            ),
            "Increase chute width or reduce max_piece",
        )
    })
}

pub fn pocket_walls_thick(ctx: &RotaryCheck) -> Warnings {
    let wall = ctx.wheel.wall_between();
    Warnings::when(wall < 2.0, || {
        Warning::error(
            "RW_POCKET_WALL_TOO_THIN",
            format!("Wall between pockets ~{wall:.2}mm (<2.0mm)"),
            "Increase wheel diameter or reduce pocket count",
        )
    })
}

pub fn build(params: &Resolved<RotaryWheelParams>) -> GenerateResult<TemplateBuild> {
    let p = &params.template;
    require_piece_size(p.max_piece)?;
    let axle_r = p.axle_d / 2.0;

    let pocket_d = p.max_piece + if p.irregular { 2.0 } else { 1.0 };
    let wheel = PocketWheel::sized(pocket_d, ROTARY_SIZING);
    let chute_w = pocket_d + 2.0;
    let chute_h = (0.8 * pocket_d).max(10.0);

    let ring_outer_r = wheel.radius + pocket_d + 6.0;
    let ring_inner_r = wheel.radius + 2.0;
    let plate = 2.0 * ring_outer_r + 10.0;
    let c = plate / 2.0;

    let mut panels = vec![free_panel(
        "BASE_PLATE",
        rect_outline(plate, plate),
        vec![
            Cutout::circle(c, c, axle_r),
            Cutout::rounded_rect(c - chute_w / 2.0, plate - chute_h - 6.0, chute_w, chute_h, 2.0),
        ],
        Point::new(c, c),
    )?];
    panels.push(wheel.panel(p.axle_d)?);
    for name in ["SPACER_RING_1", "SPACER_RING_2"] {
        panels.push(disc(name, ring_outer_r, &[ring_inner_r, axle_r])?);
    }
    panels.push(free_panel(
        "TOP_PLATE",
        rect_outline(plate, plate),
        vec![Cutout::circle(c, c, ring_inner_r), Cutout::circle(c, c, axle_r)],
        Point::new(c, c),
    )?);
    panels.push(disc("KNOB", (2.5 * p.axle_d).max(12.0), &[axle_r])?);

    let check = RotaryCheck {
        max_piece: p.max_piece,
        chute_w,
        wheel,
    };
    let warnings = run_rules(&check, &RULES);

    let derived = json!({
        "pocket_d": pocket_d,
        "pocket_count": wheel.count,
        "wheel_d": 2.0 * wheel.radius,
        "wall_between": wheel.wall_between(),
        "chute_w": chute_w,
        "plate_w": plate,
    });
    Ok(TemplateBuild::new(panels, warnings, derived))
}

//! Layered rotary candy machine.
//!
//! Sandwich construction held together with screws: a front acrylic, hopper
//! spacer layers, wheel spacer layers and a back plate, plus the pocket
//! wheel, a knob and optional feet. `depth_layers_total` counts the spacer
//! layers only; `wheel_layers` of them form the wheel chamber.

use boxjoint_core::{Point, Warning, Warnings};
use boxjoint_joinery::{run_rules, Cutout, RuleFn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::rotary_wheel::{disc, PocketWheel, CANDY_SIZING};
use super::{free_panel, plain_panel, rect_outline, TemplateBuild};
use crate::error::{GenerateError, GenerateResult};
use crate::params::Resolved;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandyMachineParams {
    pub max_piece: f64,
    pub irregular: bool,
    pub hopper_h: f64,
    pub depth_layers_total: u32,
    pub wheel_layers: u32,
    pub screw_d: f64,
    pub screw_margin: f64,
    pub axle_d: f64,
    pub add_feet: bool,
}

impl Default for CandyMachineParams {
    fn default() -> Self {
        Self {
            max_piece: 18.0,
            irregular: false,
            hopper_h: 120.0,
            depth_layers_total: 8,
            wheel_layers: 3,
            screw_d: 3.0,
            screw_margin: 10.0,
            axle_d: 6.0,
            add_feet: false,
        }
    }
}

/// Plate geometry derived from the payload and the screw pattern.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlateLayout {
    pub wheel: PocketWheel,
    pub plate_w: f64,
    pub plate_h: f64,
    pub cx: f64,
    pub cy: f64,
    pub side_wall: f64,
    pub cavity_r: f64,
    pub hopper_h_cut: f64,
    pub feed_w: f64,
    pub feed_h: f64,
    pub chute_w: f64,
    pub chute_h: f64,
    pub chute_bottom_margin: f64,
}

impl PlateLayout {
    pub fn new(p: &CandyMachineParams, fit_clearance: f64) -> Self {
        let pocket_d = p.max_piece + if p.irregular { 2.0 } else { 1.0 };
        let wheel = PocketWheel::sized(pocket_d, CANDY_SIZING);

        let side_wall = (p.screw_margin + p.screw_d).max(10.0);
        let cavity_r = wheel.radius + (fit_clearance + 0.6).max(2.0);
        let chute_bottom_margin = (p.screw_margin + p.screw_d + 4.0).max(14.0);
        let wheel_top_y = side_wall + (0.2 * p.hopper_h).max(12.0);
        let cy = wheel_top_y + cavity_r;

        let plate_w = (2.0 * cavity_r + 2.0 * side_wall).max(140.0);
        let plate_h = (cy + cavity_r + chute_bottom_margin)
            .max(2.0 * wheel.radius + p.hopper_h + 2.0 * side_wall);
        let hopper_h_cut = p
            .hopper_h
            .min(plate_h - 2.0 * side_wall - 0.6 * cavity_r)
            .max(40.0);

        Self {
            wheel,
            plate_w,
            plate_h,
            cx: plate_w / 2.0,
            cy,
            side_wall,
            cavity_r,
            hopper_h_cut,
            feed_w: (0.85 * pocket_d).max(1.2 * p.max_piece),
            feed_h: (0.9 * pocket_d).max(10.0),
            chute_w: pocket_d + if p.irregular { 3.0 } else { 2.0 },
            chute_h: (1.1 * pocket_d).max(12.0),
            chute_bottom_margin,
        }
    }

    fn pocket_d(&self) -> f64 {
        self.wheel.pocket_d
    }

    /// Channel from the hopper down into the wheel cavity.
    pub fn feed_window(&self) -> Cutout {
        let y = self.side_wall + self.hopper_h_cut - 0.6 * self.feed_h;
        Cutout::rounded_rect(self.cx - self.feed_w / 2.0, y, self.feed_w, self.feed_h, 3.0)
    }

    /// Window from the bottom of the wheel cavity into the chute.
    pub fn exit_window(&self) -> (Cutout, f64, f64) {
        let w = self.chute_w.max(0.9 * self.pocket_d());
        let h = (0.8 * self.pocket_d()).max(10.0);
        let y = self.cy + self.cavity_r - 0.4 * h;
        (Cutout::rounded_rect(self.cx - w / 2.0, y, w, h, 3.0), y, h)
    }

    pub fn chute(&self) -> Cutout {
        let (_, exit_y, exit_h) = self.exit_window();
        let y = (exit_y + 0.7 * exit_h).min(self.plate_h - self.chute_bottom_margin - self.chute_h);
        Cutout::rounded_rect(self.cx - self.chute_w / 2.0, y, self.chute_w, self.chute_h, 3.0)
    }

    /// Dispensing opening in the front acrylic.
    pub fn opening(&self) -> Cutout {
        let w = (self.chute_w + 6.0).max(24.0);
        let h = (0.8 * self.chute_h).max(14.0);
        let y = self.plate_h - self.chute_bottom_margin - h;
        Cutout::rounded_rect(self.cx - w / 2.0, y, w, h, 3.0)
    }

    pub fn hopper(&self) -> Cutout {
        Cutout::rounded_rect(
            self.side_wall,
            self.side_wall,
            self.plate_w - 2.0 * self.side_wall,
            self.hopper_h_cut,
            6.0,
        )
    }

    pub fn screw_holes(&self, margin: f64, screw_d: f64) -> Vec<Cutout> {
        let r = (screw_d / 2.0).max(0.6);
        let (w, h) = (self.plate_w, self.plate_h);
        [
            (margin, margin),
            (w - margin, margin),
            (margin, h - margin),
            (w - margin, h - margin),
        ]
        .into_iter()
        .map(|(x, y)| Cutout::circle(x, y, r))
        .collect()
    }

    pub fn axle(&self, r: f64) -> Cutout {
        Cutout::circle(self.cx, self.cy, r)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CandyCheck {
    pub max_piece: f64,
    pub hopper_h: f64,
    pub depth_layers_total: u32,
    pub wheel_layers: u32,
    pub screw_margin: f64,
    pub layout: PlateLayout,
}

impl CandyCheck {
    pub fn hopper_layers(&self) -> u32 {
        self.depth_layers_total.saturating_sub(self.wheel_layers)
    }
}

pub const RULES: [RuleFn<CandyCheck>; 10] = [
    piece_positive,
    hopper_tall_enough,
    enough_layers,
    enough_wheel_layers,
    layer_split_valid,
    chute_wide_enough,
    pocket_walls_thick,
    screw_margin_not_small,
    screw_margin_not_large,
    has_hopper_layers,
];

pub fn piece_positive(ctx: &CandyCheck) -> Warnings {
    Warnings::when(!(ctx.max_piece > 0.0), || {
        Warning::error("CM_MAX_PIECE_INVALID", "max_piece must be > 0", "Increase max_piece")
    })
}

pub fn hopper_tall_enough(ctx: &CandyCheck) -> Warnings {
    Warnings::when(ctx.hopper_h < 40.0, || {
        Warning::warn(
            "CM_HOPPER_LOW",
            "Hopper height is quite small; capacity may be low",
            "Increase hopper_h",
        )
    })
}

pub fn enough_layers(ctx: &CandyCheck) -> Warnings {
    Warnings::when(ctx.depth_layers_total < 2, || {
        Warning::error(
            "CM_LAYERS_TOO_FEW",
            "depth_layers_total must be >= 2",
            "Set depth_layers_total to 8 (typical for 3mm boards)",
        )
    })
}

pub fn enough_wheel_layers(ctx: &CandyCheck) -> Warnings {
    Warnings::when(ctx.wheel_layers < 1, || {
        Warning::error(
            "CM_WHEEL_LAYERS_TOO_FEW",
            "wheel_layers must be >= 1",
            "Set wheel_layers to 3 (typical)",
        )
    })
}

pub fn layer_split_valid(ctx: &CandyCheck) -> Warnings {
    Warnings::when(
        ctx.depth_layers_total >= 2 && ctx.wheel_layers >= ctx.depth_layers_total,
        || {
            Warning::error(
                "CM_LAYER_SPLIT_INVALID",
                "wheel_layers must be less than depth_layers_total",
                "Leave at least one hopper spacer layer",
            )
        },
    )
}

pub fn chute_wide_enough(ctx: &CandyCheck) -> Warnings {
    let chute_w = ctx.layout.chute_w;
    Warnings::when(chute_w <= 1.1 * ctx.max_piece, || {
        Warning::error(
            "CM_CHUTE_TOO_NARROW",
            format!(
                "Chute width {:.2}mm is too close to max piece {:.2}mm (bridging risk)",
                chute_w, ctx.max_piece
            ),
            "Tick irregular for more safety margin or reduce max_piece",
        )
    })
}

pub fn pocket_walls_thick(ctx: &CandyCheck) -> Warnings {
    let wall = ctx.layout.wheel.wall_between();
    Warnings::when(wall < 2.0, || {
        Warning::error(
            "CM_POCKET_WALL_TOO_THIN",
            format!("Wall between pockets ~{wall:.2}mm (<2.0mm)"),
            "Reduce pocket count (increase wheel diameter) or reduce max_piece",
        )
    })
}

pub fn screw_margin_not_small(ctx: &CandyCheck) -> Warnings {
    Warnings::when(ctx.screw_margin < 6.0, || {
        Warning::warn(
            "CM_SCREW_MARGIN_SMALL",
            "Screw margin is small; holes may be too close to edge",
            "Increase screw_margin to ~10-12mm",
        )
    })
}

pub fn screw_margin_not_large(ctx: &CandyCheck) -> Warnings {
    let limit = ctx.layout.plate_w.min(ctx.layout.plate_h) / 3.0;
    Warnings::when(ctx.screw_margin > limit, || {
        Warning::warn(
            "CM_SCREW_MARGIN_LARGE",
            "Screw margin is large; plates may be oversized",
            "Reduce screw_margin",
        )
    })
}

pub fn has_hopper_layers(ctx: &CandyCheck) -> Warnings {
    Warnings::when(ctx.hopper_layers() == 0, || {
        Warning::error(
            "CM_NO_HOPPER_LAYERS",
            "No hopper spacer layers were generated",
            "Increase depth_layers_total or reduce wheel_layers",
        )
    })
}

pub fn build(params: &Resolved<CandyMachineParams>) -> GenerateResult<TemplateBuild> {
    let p = &params.template;
    // Down to -1 the pocket still has a diameter; the rules report it.
    if !(p.max_piece.is_finite() && p.max_piece > -1.0) {
        return Err(GenerateError::invalid(
            "max_piece",
            format!("leaves no pocket to cut, got {}", p.max_piece),
        ));
    }
    let layout = PlateLayout::new(p, params.fabrication.fit_clearance);
    let check = CandyCheck {
        max_piece: p.max_piece,
        hopper_h: p.hopper_h,
        depth_layers_total: p.depth_layers_total,
        wheel_layers: p.wheel_layers,
        screw_margin: p.screw_margin,
        layout,
    };

    let axle_r = p.axle_d / 2.0;
    let screws = layout.screw_holes(p.screw_margin, p.screw_d);
    let plate = |name: &str, extra: Vec<Cutout>| {
        let mut cutouts = screws.clone();
        cutouts.extend(extra);
        free_panel(
            name,
            rect_outline(layout.plate_w, layout.plate_h),
            cutouts,
            Point::new(layout.cx, layout.plate_h * 0.55),
        )
    };

    let mut panels = vec![
        plate("FRONT_ACRYLIC", vec![layout.axle(axle_r), layout.opening()])?,
        plate("BACK_PLATE", vec![layout.axle(axle_r)])?,
    ];
    for i in 1..=check.hopper_layers() {
        panels.push(plate(
            &format!("HOPPER_SPACER_{i}"),
            vec![layout.axle(axle_r + 0.6), layout.hopper()],
        )?);
    }
    for i in 1..=p.wheel_layers {
        panels.push(plate(
            &format!("WHEEL_SPACER_{i}"),
            vec![
                layout.axle(axle_r + 0.8),
                Cutout::circle(layout.cx, layout.cy, layout.cavity_r),
                layout.feed_window(),
                layout.exit_window().0,
                layout.chute(),
            ],
        )?);
    }
    panels.push(layout.wheel.panel(p.axle_d)?);
    panels.push(disc("KNOB", (2.2 * p.axle_d).max(14.0), &[axle_r])?);
    if p.add_feet {
        let foot_w = (0.28 * layout.plate_w).max(30.0);
        for i in 1..=2 {
            panels.push(plain_panel(&format!("FOOT_{i}"), foot_w, 12.0)?);
        }
    }
    debug!(
        "Candy machine: {:.1} x {:.1} mm plates, {} hopper and {} wheel layers",
        layout.plate_w,
        layout.plate_h,
        check.hopper_layers(),
        p.wheel_layers
    );

    let warnings = run_rules(&check, &RULES);
    let derived = json!({
        "pocket_d": layout.wheel.pocket_d,
        "pocket_count": layout.wheel.count,
        "wheel_d": 2.0 * layout.wheel.radius,
        "chute_w": layout.chute_w,
        "plate_w": layout.plate_w,
        "plate_h": layout.plate_h,
        "hopper_layers": check.hopper_layers(),
    });
    Ok(TemplateBuild::new(panels, warnings, derived))
}

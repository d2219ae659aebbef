//! Divider rack: an open-front tray whose base carries slots for keyed
//! divider panels.
//!
//! `divider_count` is the number of compartments, so `divider_count - 1`
//! dividers stand in as many base slots. When the slots cannot be placed
//! the rack is emitted without slots and without dividers.

use boxjoint_core::{Point, Warning, Warnings};
use boxjoint_joinery::{run_rules, validate_joints, Cutout, EdgePairRegistry, Panel, RuleFn};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{free_panel, TemplateBuild};
use crate::error::GenerateResult;
use crate::params::Resolved;
use crate::shell::{assemble_all, BoxShell};

/// Clear width kept between the outer slots and the side walls, in mm.
pub const SLOT_EDGE_MARGIN: f64 = 10.0;

/// Slot inset from the front and back walls, in mm.
pub const SLOT_END_INSET: f64 = 6.0;

/// Drawn width of a divider slot so that it ends near `t + clearance`.
pub fn drawn_slot_width(thickness: f64, clearance: f64, kerf: f64) -> f64 {
    (thickness + clearance - kerf).max(0.2)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DividerRackParams {
    pub inner_w: f64,
    pub inner_d: f64,
    pub inner_h: f64,
    pub divider_count: u32,
    /// Front panel height; `0.6 * inner_h + thickness` when unset.
    pub front_h: Option<f64>,
}

impl Default for DividerRackParams {
    fn default() -> Self {
        Self {
            inner_w: 135.0,
            inner_d: 90.0,
            inner_h: 80.0,
            divider_count: 3,
            front_h: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DividerCheck {
    pub thickness: f64,
    pub divider_count: u32,
    pub usable_w: f64,
    pub slot_w: f64,
    pub slot_len: f64,
}

impl DividerCheck {
    pub fn slots_fit(&self) -> bool {
        self.divider_count >= 2
            && self.usable_w > f64::from(self.divider_count - 1) * self.slot_w
            && self.slot_len > 0.0
    }
}

pub const RULES: [RuleFn<DividerCheck>; 4] =
    [enough_compartments, slots_fit_width, slots_fit_depth, slot_fit_loose];

pub fn enough_compartments(ctx: &DividerCheck) -> Warnings {
    Warnings::when(ctx.divider_count < 2, || {
        Warning::error(
            "DIV_TOO_FEW",
            "divider_count must be >= 2",
            "Increase divider_count",
        )
    })
}

pub fn slots_fit_width(ctx: &DividerCheck) -> Warnings {
    let needed = f64::from(ctx.divider_count.saturating_sub(1)) * ctx.slot_w;
    Warnings::when(ctx.divider_count >= 2 && ctx.usable_w <= needed, || {
        Warning::error(
            "DIV_TOO_TIGHT",
            format!(
                "Not enough width for divider slots: {:.1} mm usable, {:.1} mm of slots",
                ctx.usable_w, needed
            ),
            "Reduce divider_count or increase inner_w",
        )
    })
}

pub fn slots_fit_depth(ctx: &DividerCheck) -> Warnings {
    Warnings::when(ctx.slot_len <= 0.0, || {
        Warning::error(
            "DIV_TOO_SHALLOW",
            format!(
                "Inner depth leaves no room for divider slots (slot length {:.1} mm)",
                ctx.slot_len
            ),
            "Increase inner_d",
        )
    })
}

pub fn slot_fit_loose(ctx: &DividerCheck) -> Warnings {
    Warnings::when(ctx.slot_w > ctx.thickness + 0.5, || {
        Warning::info(
            "DIV_SLOT_LOOSE",
            format!(
                "Drawn divider slot {:.2} mm is much wider than the {:.2} mm material",
                ctx.slot_w, ctx.thickness
            ),
            "Dividers will be loose; glue them or reduce fit_clearance",
        )
    })
}

/// Divider plate with a key tab along its bottom edge.
fn divider_panel(name: &str, width: f64, height: f64, key_len: f64, key_depth: f64) -> GenerateResult<Panel> {
    let x0 = (width - key_len) / 2.0;
    let x1 = x0 + key_len;
    let outline = vec![
        Point::new(0.0, 0.0),
        Point::new(width, 0.0),
        Point::new(width, height),
        Point::new(x1, height),
        Point::new(x1, height + key_depth),
        Point::new(x0, height + key_depth),
        Point::new(x0, height),
        Point::new(0.0, height),
    ];
    Ok(free_panel(
        name,
        outline,
        Vec::new(),
        Point::new(width / 2.0, height / 2.0),
    )?)
}

pub fn build(params: &Resolved<DividerRackParams>) -> GenerateResult<TemplateBuild> {
    let p = &params.template;
    let fab = &params.fabrication;
    let t = fab.thickness;

    let outer_w = p.inner_w + 2.0 * t;
    let outer_d = p.inner_d + 2.0 * t;
    let wall_h = p.inner_h + t;
    let front_h = p.front_h.unwrap_or(0.6 * p.inner_h + t);

    let check = DividerCheck {
        thickness: t,
        divider_count: p.divider_count,
        usable_w: p.inner_w - 2.0 * SLOT_EDGE_MARGIN,
        slot_w: drawn_slot_width(t, fab.fit_clearance, fab.kerf),
        slot_len: p.inner_d - 2.0 * SLOT_END_INSET,
    };

    let mut registry = EdgePairRegistry::new(fab.joint_params());
    let mut specs = BoxShell::new(outer_w, outer_d, wall_h)
        .lowered_front(front_h)?
        .register(&mut registry)?;

    let slots_fit = check.slots_fit();
    let mut slot_xs = Vec::new();
    if slots_fit {
        let pitch = check.usable_w / f64::from(p.divider_count);
        for i in 1..p.divider_count {
            let x = t + SLOT_EDGE_MARGIN + f64::from(i) * pitch - check.slot_w / 2.0;
            slot_xs.push(x);
            specs.base = specs.base.cutout(Cutout::rect(
                x,
                t + SLOT_END_INSET,
                check.slot_w,
                check.slot_len,
            ));
        }
    }

    let specs = specs.build()?;
    let mut panels = assemble_all(&specs, &registry)?;

    if slots_fit {
        let div_w = p.inner_d;
        let div_h = p.inner_h - 2.0;
        for i in 1..p.divider_count {
            panels.push(divider_panel(
                &format!("DIVIDER_{i}"),
                div_w,
                div_h,
                check.slot_len,
                t,
            )?);
        }
    }

    let warnings = validate_joints(registry.params(), registry.pairs())
        .concat(run_rules(&check, &RULES));

    let derived = json!({
        "outer_w": outer_w,
        "outer_d": outer_d,
        "wall_h": wall_h,
        "front_h": front_h,
        "drawn_slot_w": check.slot_w,
        "slot_len": check.slot_len,
        "slot_x": slot_xs,
        "dividers": if slots_fit { p.divider_count - 1 } else { 0 },
    });
    Ok(TemplateBuild::new(panels, warnings, derived))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamMap;
    use serde_json::Value;

    fn build_with(value: Value) -> TemplateBuild {
        let map = match value {
            Value::Object(m) => m,
            _ => ParamMap::new(),
        };
        build(&Resolved::from_map(&map).unwrap()).unwrap()
    }

    fn slot_count(built: &TemplateBuild) -> usize {
        built.panels[0].cutouts.len()
    }

    fn divider_count(built: &TemplateBuild) -> usize {
        built
            .panels
            .iter()
            .filter(|p| p.name.starts_with("DIVIDER_"))
            .count()
    }

    #[test]
    fn test_default_rack() {
        let built = build_with(json!({}));
        assert_eq!(slot_count(&built), 2);
        assert_eq!(divider_count(&built), 2);
        assert!(!built.warnings.has_errors(), "{:?}", built.warnings);
    }

    #[test]
    fn test_too_few_is_gated() {
        let built = build_with(json!({"divider_count": 1}));
        assert!(built.warnings.contains_code("DIV_TOO_FEW"));
        assert_eq!(slot_count(&built), 0);
        assert_eq!(divider_count(&built), 0);
    }

    #[test]
    fn test_too_tight_is_gated() {
        let built = build_with(json!({"inner_w": 30.0, "divider_count": 6}));
        assert!(built.warnings.contains_code("DIV_TOO_TIGHT"));
        assert!(built.warnings.has_errors());
        assert_eq!(slot_count(&built), 0);
        assert_eq!(divider_count(&built), 0);
    }

    #[test]
    fn test_loose_slot_is_info() {
        let built = build_with(json!({"fit_clearance": 1.0, "kerf": 0.1}));
        let loose: Vec<_> = built
            .warnings
            .iter()
            .filter(|w| w.code == "DIV_SLOT_LOOSE")
            .collect();
        assert_eq!(loose.len(), 1);
        assert_eq!(loose[0].severity, boxjoint_core::Severity::Info);
    }

    #[test]
    fn test_divider_key_fits_slot() {
        let panel = divider_panel("DIVIDER_1", 90.0, 78.0, 78.0, 3.0).unwrap();
        let bbox = panel.bbox().unwrap();
        assert_eq!(bbox.width(), 90.0);
        assert_eq!(bbox.height(), 81.0);
    }
}

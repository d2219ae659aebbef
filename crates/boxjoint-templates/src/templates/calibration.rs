//! Fit calibration: pairs of mating test strips across a clearance sweep.
//!
//! Each item is an `A` strip and a `B` strip whose top edges form one joint
//! at that item's clearance. The strips are laid out side by side, one item
//! per row, and engraved with the drawn slot and the expected final slot.

use boxjoint_core::{Point, Warning, Warnings};
use boxjoint_joinery::{
    assemble, run_rules, validate_joints, EdgeFamily, EdgeKey, EdgePairRegistry, JointDepths,
    RectPanelBuilder, RuleFn, Side,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::TemplateBuild;
use crate::error::GenerateResult;
use crate::params::{LayoutParams, Resolved};

/// Strips always carry at least this many fingers.
pub const MIN_CALIBRATION_FINGERS: u32 = 7;

/// Named presets for quick classroom fit tests.
pub const STUDENT_PRESETS: [(&str, f64); 3] = [("tight", 0.0), ("normal", 0.1), ("loose", 0.2)];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationSet {
    /// Only the clearance sweep.
    #[default]
    Full,
    /// The named student presets, then the sweep.
    Student,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationParams {
    pub clearances: Vec<f64>,
    pub calibration_set: CalibrationSet,
    pub strip_length: f64,
    pub strip_height: f64,
}

impl Default for CalibrationParams {
    fn default() -> Self {
        Self {
            clearances: vec![-0.10, -0.05, 0.0, 0.05, 0.10, 0.15, 0.20],
            calibration_set: CalibrationSet::Full,
            strip_length: 90.0,
            strip_height: 25.0,
        }
    }
}

impl CalibrationParams {
    /// Labelled clearances in emission order.
    pub fn items(&self) -> Vec<(String, f64)> {
        let presets = match self.calibration_set {
            CalibrationSet::Full => &[][..],
            CalibrationSet::Student => &STUDENT_PRESETS[..],
        };
        presets
            .iter()
            .map(|(name, c)| (name.to_string(), *c))
            .chain(self.clearances.iter().map(|c| (format!("clr {c:+.2}"), *c)))
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CalibrationCheck {
    pub items: usize,
}

pub const RULES: [RuleFn<CalibrationCheck>; 1] = [sweep_not_empty];

pub fn sweep_not_empty(ctx: &CalibrationCheck) -> Warnings {
    Warnings::when(ctx.items == 0, || {
        Warning::error(
            "CAL_NO_CLEARANCES",
            "No clearance values to test",
            "Provide at least one value in clearances",
        )
    })
}

/// Row width that fits exactly one `A`/`B` pair per row.
fn pair_row_width(layout: &LayoutParams, strip_length: f64) -> f64 {
    2.0 * layout.margin + 2.0 * strip_length + layout.gap + 0.5
}

pub fn build(params: &Resolved<CalibrationParams>) -> GenerateResult<TemplateBuild> {
    let p = &params.template;
    let fab = &params.fabrication;
    let (len, h) = (p.strip_length, p.strip_height);
    let centre = Point::new(len / 2.0, h / 2.0);
    let items = p.items();

    let mut panels = Vec::with_capacity(items.len() * 2);
    let mut warnings = Warnings::none();
    let mut rows = Vec::with_capacity(items.len());

    for (i, (label, clearance)) in items.iter().enumerate() {
        let mut joint = fab
            .joint_params()
            .with_min_fingers(fab.min_fingers.max(MIN_CALIBRATION_FINGERS));
        joint.clearance = *clearance;
        let depths = JointDepths::drawn(joint.thickness, joint.kerf, *clearance);
        let final_slot = joint.thickness + clearance;

        let a_name = format!("CAL_A_{}", i + 1);
        let b_name = format!("CAL_B_{}", i + 1);
        let mut registry = EdgePairRegistry::new(joint);
        let mate = registry.register(
            EdgeFamily::Outer,
            EdgeKey::new(&a_name, "top"),
            len,
            EdgeKey::new(&b_name, "top"),
            len,
        )?;

        let a = RectPanelBuilder::new(&a_name, len, h)
            .joint(Side::Top, mate.a)
            .label(
                format!(
                    "A {label} | drawn slot {:.2} | final slot ~ {:.2}",
                    depths.slot, final_slot
                ),
                centre,
            )
            .build()?;
        let b = RectPanelBuilder::new(&b_name, len, h)
            .joint(Side::Top, mate.b)
            .label(format!("B {label} | tab {:.2}", depths.tab), centre)
            .build()?;
        let specs = [a, b];
        registry.verify_bindings(&specs)?;
        for spec in &specs {
            panels.push(assemble(spec, &registry)?);
        }

        let count = registry.pairs().first().map_or(0, |pair| pair.plan.count);
        debug!("Calibration item {label}: clearance {clearance:+.2}, {count} fingers");
        warnings = warnings.concat(validate_joints(registry.params(), registry.pairs()));
        rows.push(json!({
            "label": label,
            "clearance": clearance,
            "drawn_slot": depths.slot,
            "final_slot": final_slot,
            "fingers": count,
        }));
    }

    let check = CalibrationCheck { items: items.len() };
    let warnings = warnings.dedup().concat(run_rules(&check, &RULES));

    let layout = LayoutParams {
        max_row_width: pair_row_width(&params.layout, len),
        ..params.layout.clone()
    };
    let derived = json!({
        "strip_length": len,
        "strip_height": h,
        "items": rows,
    });
    let mut built = TemplateBuild::new(panels, warnings, derived);
    built.layout = Some(layout);
    Ok(built)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamMap;
    use boxjoint_joinery::pack;
    use serde_json::Value;

    fn build_with(value: Value) -> TemplateBuild {
        let map = match value {
            Value::Object(m) => m,
            _ => ParamMap::new(),
        };
        build(&Resolved::from_map(&map).unwrap()).unwrap()
    }

    #[test]
    fn test_default_sweep() {
        let built = build_with(json!({}));
        assert_eq!(built.panels.len(), 14);
        assert_eq!(built.panels[0].name, "CAL_A_1");
        assert_eq!(built.panels[1].name, "CAL_B_1");
        assert_eq!(
            built.panels[0].labels[0].text,
            "A clr -0.10 | drawn slot 2.70 | final slot ~ 2.90"
        );
        assert_eq!(built.panels[1].labels[0].text, "B clr -0.10 | tab 3.00");
        assert!(!built.warnings.has_errors(), "{:?}", built.warnings);
    }

    #[test]
    fn test_student_presets_come_first() {
        let p = CalibrationParams {
            calibration_set: CalibrationSet::Student,
            clearances: vec![0.3],
            ..CalibrationParams::default()
        };
        let labels: Vec<_> = p.items().into_iter().map(|(l, _)| l).collect();
        assert_eq!(labels, ["tight", "normal", "loose", "clr +0.30"]);
    }

    #[test]
    fn test_empty_sweep_is_an_error() {
        let built = build_with(json!({"clearances": []}));
        assert!(built.panels.is_empty());
        assert!(built.warnings.contains_code("CAL_NO_CLEARANCES"));
    }

    #[test]
    fn test_min_fingers_floor() {
        let built = build_with(json!({"clearances": [0.1]}));
        assert_eq!(built.derived["items"][0]["fingers"], 9);
    }

    #[test]
    fn test_one_pair_per_row() {
        let built = build_with(json!({"clearances": [0.0, 0.1]}));
        let layout = built.layout.clone().unwrap();
        let packed = pack(&built.panels, layout.gap, layout.max_row_width, layout.margin);
        let p = &packed.placements;
        assert_eq!(p[0].position.y, p[1].position.y);
        assert!(p[2].position.y > p[1].position.y);
        assert_eq!(p[2].position.y, p[3].position.y);
    }
}

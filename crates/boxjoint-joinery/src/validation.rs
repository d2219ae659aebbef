//! Fabrication feasibility checks.
//!
//! Every rule is a pure function from a context to [`Warnings`]. The core
//! joint rules run over a [`JointCheck`]; templates register their own rules
//! against their own context types and combine the results with
//! [`Warnings::concat`].

use boxjoint_core::{Warning, Warnings};

use crate::joint::JointDepths;
use crate::params::JointParams;
use crate::registry::EdgePair;

/// A pluggable design rule.
pub type RuleFn<C> = fn(&C) -> Warnings;

/// Runs `rules` in order against `ctx` and concatenates their findings.
pub fn run_rules<C>(ctx: &C, rules: &[RuleFn<C>]) -> Warnings {
    rules.iter().map(|rule| rule(ctx)).collect()
}

/// Context for the core joint rules.
#[derive(Debug, Clone, Copy)]
pub struct JointCheck<'a> {
    pub params: &'a JointParams,
    pub pairs: &'a [EdgePair],
}

/// Pitch below which tabs are considered too small to cut cleanly, in mm.
pub const MIN_COMFORTABLE_PITCH: f64 = 6.0;

/// Depth at or below which a tab or slot no longer holds, in mm.
pub const MIN_USEFUL_DEPTH: f64 = 0.1;

/// The core joint rules in reporting order.
pub fn core_rules<'a>() -> [RuleFn<JointCheck<'a>>; 10] {
    [
        thickness_positive as RuleFn<JointCheck<'a>>,
        kerf_non_negative as RuleFn<JointCheck<'a>>,
        kerf_below_thickness as RuleFn<JointCheck<'a>>,
        clearance_reasonable as RuleFn<JointCheck<'a>>,
        slot_depth_usable as RuleFn<JointCheck<'a>>,
        tab_depth_usable as RuleFn<JointCheck<'a>>,
        pairs_have_fingers as RuleFn<JointCheck<'a>>,
        pitch_comfortable as RuleFn<JointCheck<'a>>,
        pitch_vs_thickness as RuleFn<JointCheck<'a>>,
        explicit_count_parity as RuleFn<JointCheck<'a>>,
    ]
}

/// Checks joint parameters and every edge pair.
pub fn validate_joints(params: &JointParams, pairs: &[EdgePair]) -> Warnings {
    let ctx = JointCheck { params, pairs };
    run_rules(&ctx, &core_rules())
}

pub fn thickness_positive(ctx: &JointCheck<'_>) -> Warnings {
    Warnings::when(ctx.params.thickness <= 0.0, || {
        Warning::error(
            "THICKNESS_NONPOSITIVE",
            "Thickness must be > 0",
            "Set thickness to the measured material thickness in mm",
        )
    })
}

pub fn kerf_non_negative(ctx: &JointCheck<'_>) -> Warnings {
    Warnings::when(ctx.params.kerf < 0.0, || {
        Warning::error(
            "KERF_NEGATIVE",
            "Kerf should be >= 0",
            "Set kerf to the measured beam width (typically 0.1-0.3 mm)",
        )
    })
}

pub fn kerf_below_thickness(ctx: &JointCheck<'_>) -> Warnings {
    Warnings::when(ctx.params.kerf >= ctx.params.thickness, || {
        Warning::warn(
            "KERF_GE_THICKNESS",
            "Kerf is greater than or equal to thickness (check units)",
            "Both values are millimetres; re-measure kerf and thickness",
        )
    })
}

pub fn clearance_reasonable(ctx: &JointCheck<'_>) -> Warnings {
    let limit = (0.6 * ctx.params.thickness).max(1.0);
    Warnings::when(ctx.params.clearance.abs() > limit, || {
        Warning::warn(
            "CLEARANCE_LARGE",
            format!(
                "Joint clearance {:.2} mm is large relative to thickness (limit {:.2} mm)",
                ctx.params.clearance, limit
            ),
            "Use the calibration template to find a clearance between -0.1 and 0.2 mm",
        )
    })
}

pub fn slot_depth_usable(ctx: &JointCheck<'_>) -> Warnings {
    let p = ctx.params;
    let slot = JointDepths::raw_slot(p.thickness, p.kerf, p.clearance);
    Warnings::when(slot <= MIN_USEFUL_DEPTH, || {
        Warning::error(
            "SLOT_DEPTH_TINY",
            format!("Computed drawn slot depth {slot:.3} mm is near zero; joint may not work"),
            "Reduce kerf or increase clearance",
        )
    })
}

pub fn tab_depth_usable(ctx: &JointCheck<'_>) -> Warnings {
    let tab = JointDepths::drawn(ctx.params.thickness, ctx.params.kerf, ctx.params.clearance).tab;
    Warnings::when(tab <= MIN_USEFUL_DEPTH, || {
        Warning::error(
            "TAB_DEPTH_TINY",
            format!("Computed tab depth {tab:.3} mm is near zero; joint may not work"),
            "Increase thickness",
        )
    })
}

pub fn pairs_have_fingers(ctx: &JointCheck<'_>) -> Warnings {
    ctx.pairs
        .iter()
        .filter(|pair| pair.plan.count == 0)
        .map(|pair| {
            Warning::error(
                "PAIR_NO_FINGERS",
                format!("Edge pair {pair} has no fingers"),
                "Check that both panels have a positive dimension along this edge",
            )
        })
        .collect()
}

pub fn pitch_comfortable(ctx: &JointCheck<'_>) -> Warnings {
    ctx.pairs
        .iter()
        .filter_map(|pair| pair.plan.pitch().map(|pitch| (pair, pitch)))
        .filter(|(_, pitch)| *pitch < MIN_COMFORTABLE_PITCH)
        .map(|(pair, pitch)| {
            Warning::warn(
                "PITCH_TOO_SMALL",
                format!("Edge pair {pair}: tabs are very small (pitch {pitch:.1}mm)"),
                "Increase finger_w or lower the explicit finger count",
            )
        })
        .collect()
}

pub fn pitch_vs_thickness(ctx: &JointCheck<'_>) -> Warnings {
    let limit = 1.2 * ctx.params.thickness;
    ctx.pairs
        .iter()
        .filter_map(|pair| pair.plan.pitch().map(|pitch| (pair, pitch)))
        .filter(|(_, pitch)| *pitch < limit)
        .map(|(pair, pitch)| {
            Warning::warn(
                "PITCH_NEAR_THICKNESS",
                format!("Edge pair {pair}: pitch {pitch:.1}mm is close to thickness (may be fragile)"),
                "Use fingers at least 1.2x the material thickness",
            )
        })
        .collect()
}

/// An explicit even count breaks the mirror symmetry that lets mates
/// walked in opposite directions interlock.
pub fn explicit_count_parity(ctx: &JointCheck<'_>) -> Warnings {
    ctx.pairs
        .iter()
        .filter(|pair| pair.plan.count > 0 && pair.plan.count % 2 == 0)
        .map(|pair| {
            Warning::warn(
                "FINGER_COUNT_EVEN",
                format!(
                    "Edge pair {pair} uses an even finger count ({}); mates cut in opposite directions will not line up",
                    pair.plan.count
                ),
                "Use an odd explicit finger count",
            )
        })
        .collect()
}

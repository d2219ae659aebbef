//! Mechanism templates.
//!
//! Each template reads its own parameter group, builds panels (through
//! [`crate::shell::BoxShell`] when jointed) and runs its design rules.

pub mod calibration;
pub mod candy_machine;
pub mod card_shoe;
pub mod dispenser;
pub mod divider_rack;
pub mod lid_box;
pub mod rotary_wheel;
pub mod tray;
pub mod window_front;

use boxjoint_core::{JointResult, Point, Warnings};
use boxjoint_joinery::{Cutout, Label, Panel};
use serde_json::Value;

use crate::params::LayoutParams;

/// What a template hands back to the generator.
#[derive(Debug, Clone)]
pub struct TemplateBuild {
    pub panels: Vec<Panel>,
    pub warnings: Warnings,
    /// Derived dimensions recorded in the metadata.
    pub derived: Value,
    /// Replaces the requested sheet layout when set.
    pub layout: Option<LayoutParams>,
}

impl TemplateBuild {
    pub fn new(panels: Vec<Panel>, warnings: Warnings, derived: Value) -> Self {
        Self {
            panels,
            warnings,
            derived,
            layout: None,
        }
    }
}

/// Clockwise `w` x `h` rectangle from the origin.
pub(crate) fn rect_outline(w: f64, h: f64) -> Vec<Point> {
    vec![
        Point::new(0.0, 0.0),
        Point::new(w, 0.0),
        Point::new(w, h),
        Point::new(0.0, h),
    ]
}

/// A free-standing panel labelled with its own name at `label_at`.
pub(crate) fn free_panel(
    name: &str,
    outline: Vec<Point>,
    cutouts: Vec<Cutout>,
    label_at: Point,
) -> JointResult<Panel> {
    Panel::from_outline(name, outline, cutouts, vec![Label::new(name, label_at)])
}

/// A plain rectangular panel labelled at its centre.
pub(crate) fn plain_panel(name: &str, w: f64, h: f64) -> JointResult<Panel> {
    free_panel(name, rect_outline(w, h), Vec::new(), Point::new(w / 2.0, h / 2.0))
}

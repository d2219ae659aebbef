//! Joint parameters shared by every pair in one generation request.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::joint::JointDepths;

/// Which kind of mating edge a pair joins.
///
/// The family selects the explicit finger-count override and the target
/// finger width used when planning the pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeFamily {
    /// Base (or lid top) to wall.
    Outer,
    /// Wall to wall at a vertical corner.
    Vertical,
}

impl fmt::Display for EdgeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeFamily::Outer => write!(f, "outer"),
            EdgeFamily::Vertical => write!(f, "vertical"),
        }
    }
}

/// Target finger width when none is given: `max(10, 3 * thickness)`.
pub fn default_finger_width(thickness: f64) -> f64 {
    (3.0 * thickness).max(10.0)
}

/// Fabrication and planning parameters. Immutable once a registry is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointParams {
    /// Material thickness in mm.
    pub thickness: f64,
    /// Target finger width in mm.
    pub finger_width: f64,
    /// Finger width for wall-to-wall corners; falls back to `finger_width`.
    pub vertical_finger_width: Option<f64>,
    pub min_fingers: u32,
    /// Laser kerf in mm.
    pub kerf: f64,
    /// Designed slack between tab and slot after cutting, in mm.
    pub clearance: f64,
    pub finger_count_outer: Option<u32>,
    pub finger_count_vertical: Option<u32>,
}

impl Default for JointParams {
    fn default() -> Self {
        Self::new(3.0, 0.2, 0.15)
    }
}

impl JointParams {
    pub fn new(thickness: f64, kerf: f64, clearance: f64) -> Self {
        Self {
            thickness,
            finger_width: default_finger_width(thickness),
            vertical_finger_width: None,
            min_fingers: 3,
            kerf,
            clearance,
            finger_count_outer: None,
            finger_count_vertical: None,
        }
    }

    pub fn with_finger_width(mut self, finger_width: f64) -> Self {
        self.finger_width = finger_width;
        self
    }

    pub fn with_vertical_finger_width(mut self, finger_width: Option<f64>) -> Self {
        self.vertical_finger_width = finger_width;
        self
    }

    pub fn with_min_fingers(mut self, min_fingers: u32) -> Self {
        self.min_fingers = min_fingers;
        self
    }

    pub fn with_explicit_counts(mut self, outer: Option<u32>, vertical: Option<u32>) -> Self {
        self.finger_count_outer = outer;
        self.finger_count_vertical = vertical;
        self
    }

    pub fn finger_width_for(&self, family: EdgeFamily) -> f64 {
        match family {
            EdgeFamily::Outer => self.finger_width,
            EdgeFamily::Vertical => self.vertical_finger_width.unwrap_or(self.finger_width),
        }
    }

    pub fn explicit_count_for(&self, family: EdgeFamily) -> Option<u32> {
        match family {
            EdgeFamily::Outer => self.finger_count_outer,
            EdgeFamily::Vertical => self.finger_count_vertical,
        }
    }

    /// Drawn tab and slot depths for these parameters.
    pub fn depths(&self) -> JointDepths {
        JointDepths::drawn(self.thickness, self.kerf, self.clearance)
    }
}

//! Finger planning.
//!
//! Turns an edge length and a target finger width into a finger count and an
//! exact partition of the length into segment widths. Kerf and clearance do
//! not influence the partition; they only change the drawn depths.

use boxjoint_core::{JointError, JointResult};
use serde::{Deserialize, Serialize};

use crate::registry::MateSide;

/// Smallest target finger width the planner divides by.
pub const MIN_TARGET_WIDTH: f64 = 1e-6;

/// Upper bound on the number of segments a single edge may carry.
pub const MAX_FINGERS: u32 = 10_000;

/// Finger layout shared by both edges of a mating pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FingerPlan {
    pub length: f64,
    pub count: u32,
    /// Segment widths in edge order; sums to `length`.
    pub widths: Vec<f64>,
    /// Whether side A's first segment is a tab.
    pub start_with_tab: bool,
}

impl FingerPlan {
    /// Plan for a non-positive length: no segments, never rendered.
    pub fn empty(length: f64) -> Self {
        Self {
            length,
            count: 0,
            widths: Vec::new(),
            start_with_tab: true,
        }
    }

    /// Nominal pitch, `length / count`, or `None` for an empty plan.
    pub fn pitch(&self) -> Option<f64> {
        (self.count > 0).then(|| self.length / self.count as f64)
    }

    /// Tab/slot mask for one side of the pair; `true` marks a tab.
    ///
    /// Side B's mask is the element-wise complement of side A's.
    pub fn tab_mask(&self, side: MateSide) -> Vec<bool> {
        (0..self.count as usize)
            .map(|i| {
                let tab_on_a = (i % 2 == 0) == self.start_with_tab;
                match side {
                    MateSide::A => tab_on_a,
                    MateSide::B => !tab_on_a,
                }
            })
            .collect()
    }
}

/// Computes the finger count for an edge.
///
/// An explicit count is used verbatim. Otherwise the count is
/// `max(min_fingers, floor(length / target))`, bumped to the next odd number.
pub fn finger_count(
    length: f64,
    target_finger_width: f64,
    min_fingers: u32,
    explicit_count: Option<u32>,
) -> JointResult<u32> {
    if let Some(n) = explicit_count {
        if n < 1 {
            return Err(JointError::InvalidJoint(
                "explicit finger count must be >= 1".to_string(),
            ));
        }
    }
    if !length.is_finite() {
        return Err(JointError::InvalidJoint(format!(
            "edge length must be finite, got {length}"
        )));
    }
    if length <= 0.0 {
        return Ok(0);
    }

    let n = match explicit_count {
        Some(n) => n,
        None => {
            let target = if target_finger_width.is_finite() {
                target_finger_width.max(MIN_TARGET_WIDTH)
            } else {
                MIN_TARGET_WIDTH
            };
            let fitted = (length / target).floor();
            if fitted > MAX_FINGERS as f64 {
                return Err(JointError::InvalidJoint(format!(
                    "{fitted} fingers on a {length} mm edge exceeds the limit of {MAX_FINGERS}"
                )));
            }
            let n = (fitted as u32).max(min_fingers);
            if n % 2 == 0 {
                n + 1
            } else {
                n
            }
        }
    };

    if n > MAX_FINGERS {
        return Err(JointError::InvalidJoint(format!(
            "finger count {n} exceeds the limit of {MAX_FINGERS}"
        )));
    }
    Ok(n)
}

/// Plans one edge pair: count plus uniform-pitch widths with the rounding
/// remainder folded into the last segment.
pub fn plan(
    length: f64,
    target_finger_width: f64,
    min_fingers: u32,
    explicit_count: Option<u32>,
) -> JointResult<FingerPlan> {
    let count = finger_count(length, target_finger_width, min_fingers, explicit_count)?;
    if count == 0 {
        return Ok(FingerPlan::empty(length));
    }

    let pitch = length / count as f64;
    let mut widths = vec![pitch; count as usize];
    let head: f64 = widths[..widths.len() - 1].iter().sum();
    if let Some(last) = widths.last_mut() {
        *last = (length - head).max(0.0);
    }

    Ok(FingerPlan {
        length,
        count,
        widths,
        start_with_tab: true,
    })
}

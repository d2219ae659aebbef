//! Joint geometry: one side of a finger joint as a Manhattan polyline.

use boxjoint_core::{JointError, JointResult, Point, EPSILON};
use serde::{Deserialize, Serialize};

use crate::planner::FingerPlan;

/// Floor applied to the drawn slot depth so a slot never vanishes.
pub const SLOT_DEPTH_FLOOR: f64 = 0.01;

/// Drawn depths for tabs and slots.
///
/// Tabs stay at nominal thickness. Slots are drawn at
/// `thickness + clearance - kerf` so that after the beam removes the kerf the
/// slot ends up at `thickness + clearance`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointDepths {
    pub tab: f64,
    pub slot: f64,
}

impl JointDepths {
    pub fn drawn(thickness: f64, kerf: f64, clearance: f64) -> Self {
        Self {
            tab: thickness,
            slot: (thickness + clearance - kerf).max(SLOT_DEPTH_FLOOR),
        }
    }

    /// Slot depth unclamped, used by feasibility checks.
    pub fn raw_slot(thickness: f64, kerf: f64, clearance: f64) -> f64 {
        thickness + clearance - kerf
    }
}

/// Outward normal of an edge direction for clockwise outlines in y-down
/// coordinates: `(dy, -dx)`.
pub fn outward_normal_for(dir: Point) -> Point {
    Point::new(dir.y, -dir.x)
}

fn check_frame(dir: Point, normal: Point) -> JointResult<()> {
    if !dir.is_axis_unit() {
        return Err(JointError::GeometryPrecondition(format!(
            "direction ({}, {}) is not an axis-aligned unit vector",
            dir.x, dir.y
        )));
    }
    if !normal.is_axis_unit() {
        return Err(JointError::GeometryPrecondition(format!(
            "normal ({}, {}) is not an axis-aligned unit vector",
            normal.x, normal.y
        )));
    }
    if dir.dot(normal).abs() > EPSILON {
        return Err(JointError::GeometryPrecondition(
            "direction and normal are not perpendicular".to_string(),
        ));
    }
    Ok(())
}

/// Renders one side of a joint.
///
/// Returns the points after `start`; the last point is exactly
/// `start + dir * plan.length`. Every segment contributes its offset start
/// corner, its offset end corner and its baseline end point. Tabs offset by
/// `+normal * depths.tab`, slots by `-normal * depths.slot`. `invert` swaps
/// tabs and slots (side B of a pair).
pub fn render_edge(
    start: Point,
    dir: Point,
    normal: Point,
    plan: &FingerPlan,
    depths: JointDepths,
    invert: bool,
) -> JointResult<Vec<Point>> {
    check_frame(dir, normal)?;

    if plan.length <= 0.0 {
        return Ok(Vec::new());
    }
    if plan.count == 0 {
        return Err(JointError::InvalidJoint(format!(
            "plan for a {} mm edge has no fingers",
            plan.length
        )));
    }
    if plan.widths.len() != plan.count as usize {
        return Err(JointError::InvalidJoint(format!(
            "plan has {} widths for {} fingers",
            plan.widths.len(),
            plan.count
        )));
    }

    let end = start + dir * plan.length;
    let last = plan.widths.len() - 1;
    let mut points = Vec::with_capacity(plan.widths.len() * 3);
    let mut cursor = start;
    let mut travelled = 0.0;

    for (i, width) in plan.widths.iter().enumerate() {
        let tab_on_a = (i % 2 == 0) == plan.start_with_tab;
        let is_tab = tab_on_a != invert;
        let offset = if is_tab {
            normal * depths.tab
        } else {
            -normal * depths.slot
        };

        travelled += width;
        let next = if i == last {
            end
        } else {
            start + dir * travelled
        };

        points.push(cursor + offset);
        points.push(next + offset);
        points.push(next);
        cursor = next;
    }

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::plan;

    #[test]
    fn test_drawn_depths() {
        let d = JointDepths::drawn(3.0, 0.2, 0.2);
        assert_eq!(d.tab, 3.0);
        assert!((d.slot - 3.0).abs() < 1e-12);

        let d = JointDepths::drawn(3.0, 5.0, 0.0);
        assert_eq!(d.slot, SLOT_DEPTH_FLOOR);
    }

    #[test]
    fn test_outward_normals() {
        assert_eq!(outward_normal_for(Point::new(1.0, 0.0)), Point::new(0.0, -1.0));
        assert_eq!(outward_normal_for(Point::new(0.0, 1.0)), Point::new(1.0, -0.0));
        assert_eq!(outward_normal_for(Point::new(-1.0, 0.0)), Point::new(0.0, 1.0));
        assert_eq!(outward_normal_for(Point::new(0.0, -1.0)), Point::new(-1.0, 0.0));
    }

    #[test]
    fn test_render_three_fingers() {
        let p = plan(30.0, 10.0, 3, None).unwrap();
        let d = JointDepths { tab: 3.0, slot: 2.0 };
        let pts = render_edge(
            Point::ORIGIN,
            Point::new(1.0, 0.0),
            Point::new(0.0, -1.0),
            &p,
            d,
            false,
        )
        .unwrap();

        assert_eq!(pts.len(), 9);
        assert_eq!(pts[0], Point::new(0.0, -3.0));
        assert_eq!(pts[1], Point::new(10.0, -3.0));
        assert_eq!(pts[2], Point::new(10.0, 0.0));
        assert_eq!(pts[3], Point::new(10.0, 2.0));
        assert_eq!(pts[8], Point::new(30.0, 0.0));
    }

    #[test]
    fn test_inverted_starts_with_slot() {
        let p = plan(30.0, 10.0, 3, None).unwrap();
        let d = JointDepths { tab: 3.0, slot: 2.0 };
        let pts = render_edge(
            Point::ORIGIN,
            Point::new(1.0, 0.0),
            Point::new(0.0, -1.0),
            &p,
            d,
            true,
        )
        .unwrap();
        assert_eq!(pts[0], Point::new(0.0, 2.0));
    }

    #[test]
    fn test_rejects_diagonal_direction() {
        let p = plan(30.0, 10.0, 3, None).unwrap();
        let d = JointDepths { tab: 3.0, slot: 2.0 };
        let err = render_edge(
            Point::ORIGIN,
            Point::new(0.6, 0.8),
            Point::new(0.8, -0.6),
            &p,
            d,
            false,
        )
        .unwrap_err();
        assert!(matches!(err, JointError::GeometryPrecondition(_)));

        let err = render_edge(
            Point::ORIGIN,
            Point::new(1.0, 0.0),
            Point::new(1.0, 0.0),
            &p,
            d,
            false,
        )
        .unwrap_err();
        assert!(matches!(err, JointError::GeometryPrecondition(_)));
    }

    #[test]
    fn test_zero_length_is_empty() {
        let p = FingerPlan::empty(0.0);
        let d = JointDepths { tab: 3.0, slot: 2.0 };
        let pts = render_edge(
            Point::ORIGIN,
            Point::new(1.0, 0.0),
            Point::new(0.0, -1.0),
            &p,
            d,
            false,
        )
        .unwrap();
        assert!(pts.is_empty());
    }

    #[test]
    fn test_zero_count_with_length_is_error() {
        let p = FingerPlan {
            length: 10.0,
            count: 0,
            widths: Vec::new(),
            start_with_tab: true,
        };
        let d = JointDepths { tab: 3.0, slot: 2.0 };
        let err = render_edge(
            Point::ORIGIN,
            Point::new(1.0, 0.0),
            Point::new(0.0, -1.0),
            &p,
            d,
            false,
        )
        .unwrap_err();
        assert!(matches!(err, JointError::InvalidJoint(_)));
    }
}

//! Panel assembly: stitches a panel's edges into one closed outline.

use boxjoint_core::{proper_crossing, signed_area, JointError, JointResult, Point, EPSILON};
use tracing::debug;

use crate::joint::{outward_normal_for, render_edge};
use crate::panel::{Panel, PanelSpec};
use crate::registry::{EdgePairRegistry, LENGTH_TOLERANCE};

/// Smallest absolute outline area accepted, in mm².
pub const MIN_PANEL_AREA: f64 = 1e-6;

/// Renders `spec` into a [`Panel`] using the pair plans held by `registry`.
///
/// Plain edges contribute their end point; jointed edges contribute the
/// joint profile for their side of the pair.
pub fn assemble(spec: &PanelSpec, registry: &EdgePairRegistry) -> JointResult<Panel> {
    let first = spec.edges.first().ok_or_else(|| JointError::DegeneratePanel {
        panel: spec.name.clone(),
        reason: "panel has no edges".to_string(),
    })?;

    let mut points = vec![first.start];
    for edge in &spec.edges {
        match edge.joint {
            None => points.push(edge.start + edge.dir * edge.length),
            Some(joint) => {
                let pair = registry.get(joint.pair)?;
                if (edge.length - pair.length()).abs() > LENGTH_TOLERANCE {
                    return Err(JointError::TopologyMismatch(format!(
                        "{}.{} is {} mm but pair {} is {} mm",
                        spec.name,
                        edge.name,
                        edge.length,
                        pair.id,
                        pair.length()
                    )));
                }
                let profile = render_edge(
                    edge.start,
                    edge.dir,
                    outward_normal_for(edge.dir),
                    &pair.plan,
                    registry.depths(),
                    joint.inverted(),
                )?;
                points.extend(profile);
            }
        }
    }

    let outline = finish_outline(&spec.name, points)?;
    debug!(
        "Assembled panel {} ({} edges, {} outline points)",
        spec.name,
        spec.edges.len(),
        outline.len()
    );

    Ok(Panel {
        name: spec.name.clone(),
        outline,
        cutouts: spec.cutouts.clone(),
        labels: spec.labels.clone(),
    })
}

/// Cleans a raw ring and checks it is a usable outline.
///
/// Consecutive duplicates and a trailing copy of the first point are
/// dropped, collinear and back-tracking vertices are removed, and the small
/// loops formed where two slot runs meet at a corner are cut back to their
/// crossing point.
pub(crate) fn finish_outline(name: &str, points: Vec<Point>) -> JointResult<Vec<Point>> {
    let mut outline = collapse_duplicates(points);
    outline = drop_collinear(outline);
    outline = resolve_corner_loops(outline);
    outline = drop_collinear(outline);
    outline = collapse_duplicates(outline);

    if outline.len() < 4 {
        return Err(JointError::DegeneratePanel {
            panel: name.to_string(),
            reason: format!("outline has {} points", outline.len()),
        });
    }
    let area = signed_area(&outline);
    if !(area.abs() > MIN_PANEL_AREA) {
        return Err(JointError::DegeneratePanel {
            panel: name.to_string(),
            reason: format!("outline area is {area}"),
        });
    }
    Ok(outline)
}

fn collapse_duplicates(points: Vec<Point>) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for p in points {
        if out.last().is_some_and(|last| last.approx_eq(p, EPSILON)) {
            continue;
        }
        out.push(p);
    }
    while out.len() > 1 && out[out.len() - 1].approx_eq(out[0], EPSILON) {
        out.pop();
    }
    out
}

fn turn(prev: Point, cur: Point, next: Point) -> f64 {
    let u = cur - prev;
    let v = next - cur;
    u.x * v.y - u.y * v.x
}

fn drop_collinear(mut points: Vec<Point>) -> Vec<Point> {
    loop {
        let n = points.len();
        if n < 3 {
            return points;
        }
        let straight = (0..n).find(|&i| {
            turn(points[(i + n - 1) % n], points[i], points[(i + 1) % n]).abs() <= EPSILON
        });
        match straight {
            Some(i) => {
                points.remove(i);
            }
            None => return points,
        }
    }
}

/// Replaces a three-vertex loop between segments `i` and `i + 3` with their
/// crossing point, repeating until no such loop remains.
fn resolve_corner_loops(mut points: Vec<Point>) -> Vec<Point> {
    let mut budget = points.len();
    while budget > 0 && points.len() >= 6 {
        budget -= 1;
        let n = points.len();
        let hit = (0..n).find_map(|i| {
            proper_crossing(
                points[i],
                points[(i + 1) % n],
                points[(i + 3) % n],
                points[(i + 4) % n],
            )
            .map(|c| (i, c))
        });
        let Some((i, crossing)) = hit else {
            break;
        };

        let keep = (i + 1) % n;
        let skip = [(i + 2) % n, (i + 3) % n];
        points = points
            .iter()
            .enumerate()
            .filter(|(k, _)| !skip.contains(k))
            .map(|(k, p)| if k == keep { crossing } else { *p })
            .collect();
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::{RectPanelBuilder, Side};
    use crate::params::{EdgeFamily, JointParams};
    use crate::registry::EdgeKey;
    use boxjoint_core::is_simple;

    #[test]
    fn test_plain_rectangle() {
        let registry = EdgePairRegistry::new(JointParams::default());
        let spec = RectPanelBuilder::new("PLATE", 50.0, 20.0).build().unwrap();
        let panel = assemble(&spec, &registry).unwrap();
        assert_eq!(
            panel.outline,
            vec![
                Point::new(0.0, 0.0),
                Point::new(50.0, 0.0),
                Point::new(50.0, 20.0),
                Point::new(0.0, 20.0),
            ]
        );
        assert!((signed_area(&panel.outline) - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_slot_slot_corner_is_resolved() {
        let mut registry = EdgePairRegistry::new(JointParams::default());
        let top = registry
            .register(EdgeFamily::Outer, EdgeKey::new("X", "top"), 60.0, EdgeKey::new("P", "top"), 60.0)
            .unwrap();
        let right = registry
            .register(EdgeFamily::Outer, EdgeKey::new("X", "right"), 40.0, EdgeKey::new("P", "right"), 40.0)
            .unwrap();
        let spec = RectPanelBuilder::new("P", 60.0, 40.0)
            .joint(Side::Top, top.b)
            .joint(Side::Right, right.b)
            .build()
            .unwrap();

        let panel = assemble(&spec, &registry).unwrap();
        assert!(is_simple(&panel.outline));
        let slot = registry.depths().slot;
        assert!(panel
            .outline
            .iter()
            .any(|p| p.approx_eq(Point::new(60.0 - slot, slot), 1e-9)));
    }

    #[test]
    fn test_plain_to_slot_spike_removed() {
        let mut registry = EdgePairRegistry::new(JointParams::default());
        let right = registry
            .register(EdgeFamily::Vertical, EdgeKey::new("X", "left"), 40.0, EdgeKey::new("P", "right"), 40.0)
            .unwrap();
        let spec = RectPanelBuilder::new("P", 60.0, 40.0)
            .joint(Side::Right, right.b)
            .build()
            .unwrap();
        let panel = assemble(&spec, &registry).unwrap();
        assert!(is_simple(&panel.outline));
        assert!(!panel.outline.contains(&Point::new(60.0, 0.0)));
    }

    #[test]
    fn test_degenerate_panel() {
        let registry = EdgePairRegistry::new(JointParams::default());
        let spec = RectPanelBuilder::new("FLAT", 50.0, 0.0).build().unwrap();
        let err = assemble(&spec, &registry).unwrap_err();
        assert!(matches!(err, JointError::DegeneratePanel { .. }));
    }
}

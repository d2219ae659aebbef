//! Optional kerf compensation by polygon offsetting.
//!
//! The default [`NoOffset`] leaves geometry as drawn. With the `kerf-offset`
//! feature, [`CavalierOffset`] offsets polygons with `cavalier_contours`.

use boxjoint_core::Point;

/// Offsets a closed polygon by `delta` mm; positive grows, negative shrinks.
///
/// Returns `None` when the capability is unavailable or the offset
/// collapses the polygon; callers then keep the drawn geometry.
pub trait OutlineOffset {
    fn offset(&self, polygon: &[Point], delta: f64) -> Option<Vec<Point>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoOffset;

impl OutlineOffset for NoOffset {
    fn offset(&self, _polygon: &[Point], _delta: f64) -> Option<Vec<Point>> {
        None
    }
}

/// The offsetter used when kerf offsetting is requested.
pub fn default_offsetter() -> Box<dyn OutlineOffset> {
    #[cfg(feature = "kerf-offset")]
    {
        Box::new(CavalierOffset)
    }
    #[cfg(not(feature = "kerf-offset"))]
    {
        Box::new(NoOffset)
    }
}

#[cfg(feature = "kerf-offset")]
pub use cavalier::CavalierOffset;

#[cfg(feature = "kerf-offset")]
mod cavalier {
    use super::OutlineOffset;
    use boxjoint_core::{signed_area, Point};
    use cavalier_contours::polyline::{PlineSource, PlineSourceMut, PlineVertex, Polyline};
    use std::panic;
    use tracing::warn;

    /// Polygon offsetting backed by `cavalier_contours`.
    ///
    /// Arc vertices produced at convex corners are kept as their chord end
    /// points.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct CavalierOffset;

    impl OutlineOffset for CavalierOffset {
        fn offset(&self, polygon: &[Point], delta: f64) -> Option<Vec<Point>> {
            if polygon.len() < 3 || delta == 0.0 {
                return None;
            }

            // cavalier offsets positive values to the left of travel; make
            // the ring counter-clockwise in its own frame so that is inward.
            let mut ring = polygon.to_vec();
            if signed_area(&ring) < 0.0 {
                ring.reverse();
            }

            let mut pline: Polyline<f64> = Polyline::new();
            for p in &ring {
                pline.add_vertex(PlineVertex::new(p.x, p.y, 0.0));
            }
            pline.set_is_closed(true);
            if pline.vertex_count() < 3 {
                return None;
            }

            let result = panic::catch_unwind(panic::AssertUnwindSafe(|| pline.parallel_offset(-delta)));
            let offsets = match result {
                Ok(offsets) => offsets,
                Err(_) => {
                    warn!("Panic during parallel offset of a {}-point polygon", polygon.len());
                    return None;
                }
            };

            offsets
                .into_iter()
                .map(|pl| {
                    pl.vertex_data
                        .iter()
                        .map(|v| Point::new(v.x, v.y))
                        .collect::<Vec<_>>()
                })
                .filter(|pts| pts.len() >= 3)
                .max_by(|a, b| signed_area(a).abs().total_cmp(&signed_area(b).abs()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_offset_keeps_geometry() {
        let square = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        assert!(NoOffset.offset(&square, 0.1).is_none());
    }

    #[cfg(feature = "kerf-offset")]
    #[test]
    fn test_cavalier_grows_and_shrinks() {
        use boxjoint_core::signed_area;

        let square = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        let grown = CavalierOffset.offset(&square, 0.5).unwrap();
        let shrunk = CavalierOffset.offset(&square, -0.5).unwrap();
        assert!(signed_area(&grown).abs() > 100.0);
        assert!((signed_area(&shrunk).abs() - 81.0).abs() < 1e-6);
    }
}

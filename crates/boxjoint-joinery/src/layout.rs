//! Shelf packing of panels onto a sheet.
//!
//! Panels are placed left to right in input order; a row wraps when the next
//! panel would cross `max_row_width - margin`. No reordering, no rotation.
//! The sheet is never wider than `max_row_width` plus the widest panel.

use boxjoint_core::Point;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::panel::Panel;

/// Where one panel lands on the sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub index: usize,
    pub name: String,
    /// Sheet position of the panel's bounding-box minimum corner.
    pub position: Point,
    pub width: f64,
    pub height: f64,
    /// Offset to add to panel-local coordinates.
    pub translation: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub placements: Vec<Placement>,
    pub total_width: f64,
    pub total_height: f64,
}

#[derive(Clone, Copy, Debug)]
struct ShelfCursor {
    x: f64,
    y: f64,
    row_height: f64,
    margin: f64,
    gap: f64,
}

impl ShelfCursor {
    fn new(margin: f64, gap: f64) -> Self {
        Self {
            x: margin,
            y: margin,
            row_height: 0.0,
            margin,
            gap,
        }
    }

    fn place(&mut self, width: f64, height: f64) -> Point {
        let position = Point::new(self.x, self.y);
        self.x += width + self.gap;
        self.row_height = self.row_height.max(height);
        position
    }

    fn next_row(&mut self) {
        self.y += self.row_height + self.gap;
        self.x = self.margin;
        self.row_height = 0.0;
    }
}

/// Packs `panels` into rows no wider than `max_row_width`.
///
/// A panel wider than the row still gets a row of its own. The margin is
/// clamped to half of `max_row_width`.
pub fn pack(panels: &[Panel], gap: f64, max_row_width: f64, margin: f64) -> Layout {
    let margin = margin.min(max_row_width / 2.0).max(0.0);
    let mut cursor = ShelfCursor::new(margin, gap);
    let mut placements = Vec::with_capacity(panels.len());
    let mut right = margin;
    let mut bottom = margin;
    let mut row_open = false;

    for (index, panel) in panels.iter().enumerate() {
        let (min, width, height) = match panel.bbox() {
            Some(b) => (Point::new(b.min_x, b.min_y), b.width(), b.height()),
            None => (Point::ORIGIN, 0.0, 0.0),
        };

        if row_open && cursor.x + width > max_row_width - margin {
            cursor.next_row();
        }
        let position = cursor.place(width, height);
        row_open = true;

        right = right.max(position.x + width);
        bottom = bottom.max(cursor.y + cursor.row_height);

        placements.push(Placement {
            index,
            name: panel.name.clone(),
            position,
            width,
            height,
            translation: position - min,
        });
    }

    let layout = Layout {
        placements,
        total_width: right + margin,
        total_height: bottom + margin,
    };
    debug!(
        "Packed {} panels into {:.1} x {:.1} mm",
        layout.placements.len(),
        layout.total_width,
        layout.total_height
    );
    layout
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(name: &str, w: f64, h: f64) -> Panel {
        Panel::from_outline(
            name,
            vec![
                Point::new(0.0, 0.0),
                Point::new(w, 0.0),
                Point::new(w, h),
                Point::new(0.0, h),
            ],
            Vec::new(),
            Vec::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_wraps_rows() {
        let panels = [rect("A", 100.0, 50.0), rect("B", 100.0, 30.0), rect("C", 100.0, 20.0)];
        let layout = pack(&panels, 10.0, 240.0, 10.0);

        assert_eq!(layout.placements[0].position, Point::new(10.0, 10.0));
        assert_eq!(layout.placements[1].position, Point::new(120.0, 10.0));
        // 230 + 100 > 240 - 10
        assert_eq!(layout.placements[2].position, Point::new(10.0, 70.0));
        assert_eq!(layout.total_width, 230.0);
        assert_eq!(layout.total_height, 100.0);
    }

    #[test]
    fn test_oversized_panel_gets_own_row() {
        let panels = [rect("WIDE", 500.0, 10.0), rect("B", 20.0, 10.0)];
        let layout = pack(&panels, 5.0, 100.0, 5.0);
        assert_eq!(layout.placements[0].position, Point::new(5.0, 5.0));
        assert_eq!(layout.placements[1].position, Point::new(5.0, 20.0));
    }

    #[test]
    fn test_translation_compensates_protrusion() {
        let panel = Panel::from_outline(
            "TABBED",
            vec![
                Point::new(-3.0, -3.0),
                Point::new(20.0, -3.0),
                Point::new(20.0, 10.0),
                Point::new(-3.0, 10.0),
            ],
            Vec::new(),
            Vec::new(),
        )
        .unwrap();
        let layout = pack(&[panel], 12.0, 340.0, 10.0);
        let p = &layout.placements[0];
        assert_eq!(p.translation, Point::new(13.0, 13.0));
        assert_eq!(p.width, 23.0);
    }

    #[test]
    fn test_wide_margin_is_clamped() {
        let panels = [rect("A", 100.0, 10.0), rect("B", 100.0, 10.0)];
        let layout = pack(&panels, 12.0, 340.0, 200.0);
        assert_eq!(layout.placements[0].position, Point::new(170.0, 170.0));
        assert_eq!(layout.placements[1].position, Point::new(170.0, 192.0));
        assert_eq!(layout.total_width, 440.0);
        assert!(layout.total_width <= 340.0 + 100.0 + 12.0);
    }

    #[test]
    fn test_empty() {
        let layout = pack(&[], 12.0, 340.0, 10.0);
        assert!(layout.placements.is_empty());
        assert_eq!(layout.total_width, 20.0);
        assert_eq!(layout.total_height, 20.0);
    }
}

//! Panel specifications and rendered panels.
//!
//! A [`PanelSpec`] describes a panel boundary as an ordered list of edges in
//! the panel's local frame (origin top-left, y down, clockwise). Rectangular
//! panels are built with [`RectPanelBuilder`]; each side may be split into
//! several runs so that only part of a side carries a joint.

use boxjoint_core::{format_mm, BoundingBox, JointError, JointResult, Point};
use serde::{Deserialize, Serialize};

use crate::assembler::finish_outline;
use crate::registry::JointRef;

/// One side of a rectangular panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    pub fn name(&self) -> &'static str {
        match self {
            Side::Top => "top",
            Side::Right => "right",
            Side::Bottom => "bottom",
            Side::Left => "left",
        }
    }

    /// Edge name of run `index` when the side is split into several runs.
    pub fn run_name(&self, index: usize) -> String {
        format!("{}.{}", self.name(), index)
    }

    /// Start corner, direction and length of this side on a `w` x `h`
    /// rectangle walked clockwise from the top-left corner.
    pub fn frame(&self, width: f64, height: f64) -> (Point, Point, f64) {
        match self {
            Side::Top => (Point::new(0.0, 0.0), Point::new(1.0, 0.0), width),
            Side::Right => (Point::new(width, 0.0), Point::new(0.0, 1.0), height),
            Side::Bottom => (Point::new(width, height), Point::new(-1.0, 0.0), width),
            Side::Left => (Point::new(0.0, height), Point::new(0.0, -1.0), height),
        }
    }

    fn index(&self) -> usize {
        match self {
            Side::Top => 0,
            Side::Right => 1,
            Side::Bottom => 2,
            Side::Left => 3,
        }
    }
}

/// A straight portion of a side, optionally bound to a joint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeRun {
    pub length: f64,
    pub joint: Option<JointRef>,
}

impl EdgeRun {
    pub fn plain(length: f64) -> Self {
        Self {
            length,
            joint: None,
        }
    }

    pub fn jointed(length: f64, joint: JointRef) -> Self {
        Self {
            length,
            joint: Some(joint),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelEdge {
    pub name: String,
    pub start: Point,
    /// Axis-aligned unit direction.
    pub dir: Point,
    pub length: f64,
    pub joint: Option<JointRef>,
}

/// Closed interior (or edge-touching) cut in panel-local coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Cutout {
    Polygon {
        points: Vec<Point>,
    },
    Rect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
    },
    RoundedRect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        r: f64,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
    },
    /// U-shaped finger notch hanging down from `y_top`, centred on `cx`.
    ThumbNotch {
        cx: f64,
        y_top: f64,
        radius: f64,
        depth: f64,
    },
}

impl Cutout {
    pub fn rect(x: f64, y: f64, w: f64, h: f64) -> Self {
        Cutout::Rect { x, y, w, h }
    }

    pub fn rounded_rect(x: f64, y: f64, w: f64, h: f64, r: f64) -> Self {
        Cutout::RoundedRect { x, y, w, h, r }
    }

    pub fn circle(cx: f64, cy: f64, r: f64) -> Self {
        Cutout::Circle { cx, cy, r }
    }

    /// Thumb notch centred on a panel of width `panel_width`.
    pub fn thumb_notch(panel_width: f64, y_top: f64, radius: f64, depth: f64) -> Self {
        Cutout::ThumbNotch {
            cx: panel_width / 2.0,
            y_top,
            radius,
            depth,
        }
    }

    /// Window inset by `margin` on every side of a `w` x `h` area. Corners
    /// are rounded when `corner_r > 0`.
    pub fn window(w: f64, h: f64, margin: f64, corner_r: f64) -> Self {
        let ww = (w - 2.0 * margin).max(1.0);
        let hh = (h - 2.0 * margin).max(1.0);
        if corner_r <= 0.0 {
            Cutout::rect(margin, margin, ww, hh)
        } else {
            Cutout::RoundedRect {
                x: margin,
                y: margin,
                w: ww,
                h: hh,
                r: corner_r,
            }
        }
    }

    /// Polygonal form of straight-sided cutouts; `None` for curved ones.
    pub fn polygon(&self) -> Option<Vec<Point>> {
        match self {
            Cutout::Polygon { points } => Some(points.clone()),
            Cutout::Rect { x, y, w, h } => Some(vec![
                Point::new(*x, *y),
                Point::new(x + w, *y),
                Point::new(x + w, y + h),
                Point::new(*x, y + h),
            ]),
            Cutout::RoundedRect { r, .. } if *r <= 0.0 => self.as_rect().polygon(),
            _ => None,
        }
    }

    fn as_rect(&self) -> Cutout {
        match self {
            Cutout::RoundedRect { x, y, w, h, .. } => Cutout::rect(*x, *y, *w, *h),
            other => other.clone(),
        }
    }

    /// SVG path data in panel-local millimetres.
    pub fn path_data(&self) -> String {
        let f = format_mm;
        match self {
            Cutout::Polygon { points } => polyline_path(points, true),
            Cutout::Rect { .. } => self.polygon().map(|p| polyline_path(&p, true)).unwrap_or_default(),
            Cutout::RoundedRect { x, y, w, h, r } => {
                let r = r.min(w / 2.0).min(h / 2.0).max(0.0);
                if r <= 0.0 {
                    return Cutout::rect(*x, *y, *w, *h).path_data();
                }
                let (x, y, w, h) = (*x, *y, *w, *h);
                format!(
                    "M {} {} L {} {} A {r} {r} 0 0 1 {} {} L {} {} A {r} {r} 0 0 1 {} {} \
                     L {} {} A {r} {r} 0 0 1 {} {} L {} {} A {r} {r} 0 0 1 {} {} Z",
                    f(x + r), f(y),
                    f(x + w - r), f(y),
                    f(x + w), f(y + r),
                    f(x + w), f(y + h - r),
                    f(x + w - r), f(y + h),
                    f(x + r), f(y + h),
                    f(x), f(y + h - r),
                    f(x), f(y + r),
                    f(x + r), f(y),
                    r = f(r),
                )
            }
            Cutout::Circle { cx, cy, r } => format!(
                "M {} {} A {r} {r} 0 1 0 {} {} A {r} {r} 0 1 0 {} {} Z",
                f(cx + r),
                f(*cy),
                f(cx - r),
                f(*cy),
                f(cx + r),
                f(*cy),
                r = f(*r),
            ),
            Cutout::ThumbNotch {
                cx,
                y_top,
                radius,
                depth,
            } => format!(
                "M {} {} L {} {} A {r} {r} 0 0 0 {} {} L {} {} Z",
                f(cx - radius),
                f(*y_top),
                f(cx - radius),
                f(y_top + depth),
                f(cx + radius),
                f(y_top + depth),
                f(cx + radius),
                f(*y_top),
                r = f(*radius),
            ),
        }
    }
}

/// `M x y L x y ...` path data, closed with `Z` when `close` is set.
pub fn polyline_path(points: &[Point], close: bool) -> String {
    let mut parts = Vec::with_capacity(points.len() + 1);
    for (i, p) in points.iter().enumerate() {
        let cmd = if i == 0 { "M" } else { "L" };
        parts.push(format!("{} {} {}", cmd, format_mm(p.x), format_mm(p.y)));
    }
    if close && !points.is_empty() {
        parts.push("Z".to_string());
    }
    parts.join(" ")
}

/// Engraved text anchored at a panel-local point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub text: String,
    pub at: Point,
}

impl Label {
    pub fn new(text: impl Into<String>, at: Point) -> Self {
        Self {
            text: text.into(),
            at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelSpec {
    pub name: String,
    pub width: f64,
    pub height: f64,
    pub edges: Vec<PanelEdge>,
    pub cutouts: Vec<Cutout>,
    pub labels: Vec<Label>,
}

impl PanelSpec {
    pub fn edge(&self, name: &str) -> Option<&PanelEdge> {
        self.edges.iter().find(|e| e.name == name)
    }

    pub fn is_jointed(&self) -> bool {
        self.edges.iter().any(|e| e.joint.is_some())
    }
}

/// Builds the spec of a rectangular panel.
#[derive(Debug, Clone)]
pub struct RectPanelBuilder {
    name: String,
    width: f64,
    height: f64,
    sides: [Option<Vec<EdgeRun>>; 4],
    cutouts: Vec<Cutout>,
    labels: Vec<Label>,
}

impl RectPanelBuilder {
    pub fn new(name: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            sides: [None, None, None, None],
            cutouts: Vec::new(),
            labels: Vec::new(),
        }
    }

    /// Binds a whole side to one joint.
    pub fn joint(mut self, side: Side, joint: JointRef) -> Self {
        let (_, _, length) = side.frame(self.width, self.height);
        self.sides[side.index()] = Some(vec![EdgeRun::jointed(length, joint)]);
        self
    }

    /// Splits a side into runs, walked in the side's direction.
    pub fn runs(mut self, side: Side, runs: Vec<EdgeRun>) -> Self {
        self.sides[side.index()] = Some(runs);
        self
    }

    pub fn cutout(mut self, cutout: Cutout) -> Self {
        self.cutouts.push(cutout);
        self
    }

    pub fn cutouts(mut self, cutouts: impl IntoIterator<Item = Cutout>) -> Self {
        self.cutouts.extend(cutouts);
        self
    }

    pub fn label(mut self, text: impl Into<String>, at: Point) -> Self {
        self.labels.push(Label::new(text, at));
        self
    }

    /// Labels the panel with its own name at its centre.
    pub fn name_label(self) -> Self {
        let text = self.name.clone();
        let at = Point::new(self.width / 2.0, self.height / 2.0);
        self.label(text, at)
    }

    pub fn build(self) -> JointResult<PanelSpec> {
        let mut edges = Vec::new();
        for side in Side::ALL {
            let (start, dir, length) = side.frame(self.width, self.height);
            let runs = self.sides[side.index()]
                .clone()
                .unwrap_or_else(|| vec![EdgeRun::plain(length)]);

            if runs.iter().any(|r| !(r.length >= 0.0)) {
                return Err(JointError::InvalidJoint(format!(
                    "{}.{} has a negative run length",
                    self.name,
                    side.name()
                )));
            }
            let total: f64 = runs.iter().map(|r| r.length).sum();
            if (total - length).abs() > 1e-9 {
                return Err(JointError::TopologyMismatch(format!(
                    "{}.{} runs sum to {} but the side is {} long",
                    self.name,
                    side.name(),
                    total,
                    length
                )));
            }

            let count = runs.len();
            let mut cursor = start;
            for (i, run) in runs.into_iter().enumerate() {
                let name = if count == 1 {
                    side.name().to_string()
                } else {
                    side.run_name(i)
                };
                edges.push(PanelEdge {
                    name,
                    start: cursor,
                    dir,
                    length: run.length,
                    joint: run.joint,
                });
                cursor = cursor + dir * run.length;
            }
        }

        Ok(PanelSpec {
            name: self.name,
            width: self.width,
            height: self.height,
            edges,
            cutouts: self.cutouts,
            labels: self.labels,
        })
    }
}

/// A rendered panel: closed outline (implicitly closing, first point not
/// repeated), cutouts and labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    pub name: String,
    pub outline: Vec<Point>,
    pub cutouts: Vec<Cutout>,
    pub labels: Vec<Label>,
}

impl Panel {
    /// Wraps a free-form outline (plates, wheels, strips) with the same
    /// clean-up and non-degeneracy check applied to assembled panels.
    pub fn from_outline(
        name: impl Into<String>,
        outline: Vec<Point>,
        cutouts: Vec<Cutout>,
        labels: Vec<Label>,
    ) -> JointResult<Self> {
        let name = name.into();
        let outline = finish_outline(&name, outline)?;
        Ok(Self {
            name,
            outline,
            cutouts,
            labels,
        })
    }

    pub fn bbox(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(&self.outline)
    }

    pub fn outline_path(&self) -> String {
        polyline_path(&self.outline, true)
    }
}

/// Closed polygon approximating a circle of radius `r` centred on `(cx, cy)`.
pub fn circle_outline(cx: f64, cy: f64, r: f64, segments: usize) -> Vec<Point> {
    let segments = segments.max(3);
    (0..segments)
        .map(|i| {
            let a = std::f64::consts::TAU * i as f64 / segments as f64;
            Point::new(cx + r * a.cos(), cy + r * a.sin())
        })
        .collect()
}

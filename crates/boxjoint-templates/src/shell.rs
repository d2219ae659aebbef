//! Finger-jointed box shells.
//!
//! A shell is a base panel with four walls and an optional top. Every
//! jointed edge is registered as an edge pair; the base (and top) take
//! side A of their pairs, the walls side B. Corner pairs run from the
//! back and front walls (side A) into the side walls (side B).
//!
//! With a lowered front, only the bottom run of each side wall's front
//! edge is jointed and the rest of that edge stays plain.

use boxjoint_core::{JointError, JointResult};
use boxjoint_joinery::{
    assemble, EdgeFamily, EdgeKey, EdgePairRegistry, EdgeRun, Mate, Panel, PanelSpec,
    RectPanelBuilder, Side,
};
use tracing::debug;

use crate::error::{GenerateError, GenerateResult};

/// Front wall height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Front {
    Full,
    Lowered(f64),
}

#[derive(Debug, Clone)]
pub struct BoxShell {
    outer_w: f64,
    outer_d: f64,
    wall_h: f64,
    front: Front,
    top: bool,
    prefix: String,
    base: String,
}

/// Unbuilt panel specs of a registered shell, open for cutouts.
#[derive(Debug, Clone)]
pub struct ShellPanels {
    pub base: RectPanelBuilder,
    pub left: RectPanelBuilder,
    pub right: RectPanelBuilder,
    pub back: RectPanelBuilder,
    pub front: RectPanelBuilder,
    pub top: Option<RectPanelBuilder>,
}

impl ShellPanels {
    /// Builds the specs in output order: base, left, right, back, front, top.
    pub fn build(self) -> JointResult<Vec<PanelSpec>> {
        let mut specs = vec![
            self.base.build()?,
            self.left.build()?,
            self.right.build()?,
            self.back.build()?,
            self.front.build()?,
        ];
        if let Some(top) = self.top {
            specs.push(top.build()?);
        }
        Ok(specs)
    }
}

impl BoxShell {
    /// A shell of outer width `outer_w`, outer depth `outer_d` and wall
    /// height `wall_h`, with a full-height front and no top.
    pub fn new(outer_w: f64, outer_d: f64, wall_h: f64) -> Self {
        Self {
            outer_w,
            outer_d,
            wall_h,
            front: Front::Full,
            top: false,
            prefix: String::new(),
            base: "BOTTOM".to_string(),
        }
    }

    /// Lowers the front wall to `front_h`. Heights at or above the wall
    /// height leave the front full.
    pub fn lowered_front(mut self, front_h: f64) -> GenerateResult<Self> {
        if !(front_h > 0.0 && front_h.is_finite()) {
            return Err(GenerateError::invalid(
                "front_h",
                format!("must be a positive length, got {front_h}"),
            ));
        }
        self.front = Front::Lowered(front_h);
        Ok(self)
    }

    pub fn with_top(mut self) -> Self {
        self.top = true;
        self
    }

    /// Prefixes every panel name and renames the base panel, e.g. a lid
    /// shell is `("LID_", "TOP")`.
    pub fn named(mut self, prefix: &str, base: &str) -> Self {
        self.prefix = prefix.to_string();
        self.base = base.to_string();
        self
    }

    pub fn front_height(&self) -> f64 {
        match self.front {
            Front::Full => self.wall_h,
            Front::Lowered(h) => h.min(self.wall_h),
        }
    }

    fn is_lowered(&self) -> bool {
        self.front_height() < self.wall_h
    }

    fn name(&self, role: &str) -> String {
        format!("{}{}", self.prefix, role)
    }

    /// Registers every edge pair of the shell and returns its panel specs.
    pub fn register(&self, registry: &mut EdgePairRegistry) -> JointResult<ShellPanels> {
        let (w, d, h) = (self.outer_w, self.outer_d, self.wall_h);
        let fh = self.front_height();
        let lowered = self.is_lowered();

        if !(fh > 0.0) {
            return Err(JointError::InvalidJoint(format!(
                "front height {fh} must be > 0"
            )));
        }
        if self.top && lowered {
            return Err(JointError::TopologyMismatch(
                "a jointed top needs a full-height front".to_string(),
            ));
        }

        let base = self.name(&self.base);
        let back = self.name("BACK");
        let front = self.name("FRONT");
        let left = self.name("LEFT");
        let right = self.name("RIGHT");
        let top = self.name("TOP");

        let left_front_edge = if lowered {
            Side::Left.run_name(0)
        } else {
            Side::Left.name().to_string()
        };
        let right_front_edge = if lowered {
            Side::Right.run_name(1)
        } else {
            Side::Right.name().to_string()
        };

        let base_back = mate(registry, EdgeFamily::Outer, (&base, "top"), (&back, "bottom"), w)?;
        let base_front = mate(registry, EdgeFamily::Outer, (&base, "bottom"), (&front, "bottom"), w)?;
        let base_left = mate(registry, EdgeFamily::Outer, (&base, "left"), (&left, "bottom"), d)?;
        let base_right = mate(registry, EdgeFamily::Outer, (&base, "right"), (&right, "bottom"), d)?;

        let back_left = mate(registry, EdgeFamily::Vertical, (&back, "left"), (&left, "right"), h)?;
        let back_right = mate(registry, EdgeFamily::Vertical, (&back, "right"), (&right, "left"), h)?;
        let front_left = mate(
            registry,
            EdgeFamily::Vertical,
            (&front, "left"),
            (&left, &left_front_edge),
            fh,
        )?;
        let front_right = mate(
            registry,
            EdgeFamily::Vertical,
            (&front, "right"),
            (&right, &right_front_edge),
            fh,
        )?;

        let mut panels = ShellPanels {
            base: RectPanelBuilder::new(&base, w, d)
                .joint(Side::Top, base_back.a)
                .joint(Side::Bottom, base_front.a)
                .joint(Side::Left, base_left.a)
                .joint(Side::Right, base_right.a)
                .name_label(),
            back: RectPanelBuilder::new(&back, w, h)
                .joint(Side::Bottom, base_back.b)
                .joint(Side::Left, back_left.a)
                .joint(Side::Right, back_right.a)
                .name_label(),
            front: RectPanelBuilder::new(&front, w, fh)
                .joint(Side::Bottom, base_front.b)
                .joint(Side::Left, front_left.a)
                .joint(Side::Right, front_right.a)
                .name_label(),
            left: RectPanelBuilder::new(&left, d, h)
                .joint(Side::Bottom, base_left.b)
                .joint(Side::Right, back_left.b)
                .name_label(),
            right: RectPanelBuilder::new(&right, d, h)
                .joint(Side::Bottom, base_right.b)
                .joint(Side::Left, back_right.b)
                .name_label(),
            top: None,
        };

        // Side walls are walked upwards on their left side and downwards on
        // their right side, so the jointed run comes first on the left.
        if lowered {
            panels.left = panels.left.runs(
                Side::Left,
                vec![EdgeRun::jointed(fh, front_left.b), EdgeRun::plain(h - fh)],
            );
            panels.right = panels.right.runs(
                Side::Right,
                vec![EdgeRun::plain(h - fh), EdgeRun::jointed(fh, front_right.b)],
            );
        } else {
            panels.left = panels.left.joint(Side::Left, front_left.b);
            panels.right = panels.right.joint(Side::Right, front_right.b);
        }

        if self.top {
            let top_back = mate(registry, EdgeFamily::Outer, (&top, "top"), (&back, "top"), w)?;
            let top_front = mate(registry, EdgeFamily::Outer, (&top, "bottom"), (&front, "top"), w)?;
            let top_left = mate(registry, EdgeFamily::Outer, (&top, "left"), (&left, "top"), d)?;
            let top_right = mate(registry, EdgeFamily::Outer, (&top, "right"), (&right, "top"), d)?;

            panels.back = panels.back.joint(Side::Top, top_back.b);
            panels.front = panels.front.joint(Side::Top, top_front.b);
            panels.left = panels.left.joint(Side::Top, top_left.b);
            panels.right = panels.right.joint(Side::Top, top_right.b);
            panels.top = Some(
                RectPanelBuilder::new(&top, w, d)
                    .joint(Side::Top, top_back.a)
                    .joint(Side::Bottom, top_front.a)
                    .joint(Side::Left, top_left.a)
                    .joint(Side::Right, top_right.a)
                    .name_label(),
            );
        }

        debug!(
            "Registered shell {}{}: {:.2} x {:.2} x {:.2} mm, front {:.2} mm, top {}",
            self.prefix, self.base, w, d, h, fh, self.top
        );
        Ok(panels)
    }
}

fn mate(
    registry: &mut EdgePairRegistry,
    family: EdgeFamily,
    a: (&str, &str),
    b: (&str, &str),
    length: f64,
) -> JointResult<Mate> {
    registry.register(
        family,
        EdgeKey::new(a.0, a.1),
        length,
        EdgeKey::new(b.0, b.1),
        length,
    )
}

/// Verifies every binding, then assembles each spec in order.
pub fn assemble_all(specs: &[PanelSpec], registry: &EdgePairRegistry) -> JointResult<Vec<Panel>> {
    registry.verify_bindings(specs)?;
    specs.iter().map(|spec| assemble(spec, registry)).collect()
}

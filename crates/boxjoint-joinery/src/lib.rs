//! # BoxJoint Joinery
//!
//! The joint-geometry core of BoxJoint. Turns mating panel edges into
//! deterministic, complementary finger-joint profiles and lays finished
//! panels out on a sheet.
//!
//! ## Components
//!
//! - **Finger Planner**: edge length and target finger width to an odd finger
//!   count and an exact width partition
//! - **Joint Geometry**: one side of a joint as a Manhattan polyline, with
//!   kerf and clearance applied to the drawn depths
//! - **Edge Pair Registry**: one shared plan per mating pair, complementary
//!   side handles, binding verification
//! - **Panel Assembler**: stitches plain and jointed edges into a closed,
//!   simple outline
//! - **Validation**: pluggable fabrication-feasibility rules
//! - **Layout**: deterministic shelf packing
//! - **Offset**: optional kerf compensation (`kerf-offset` feature)

pub mod assembler;
pub mod joint;
pub mod layout;
pub mod offset;
pub mod panel;
pub mod params;
pub mod planner;
pub mod registry;
pub mod validation;

pub use assembler::{assemble, MIN_PANEL_AREA};
pub use joint::{outward_normal_for, render_edge, JointDepths, SLOT_DEPTH_FLOOR};
pub use layout::{pack, Layout, Placement};
#[cfg(feature = "kerf-offset")]
pub use offset::CavalierOffset;
pub use offset::{default_offsetter, NoOffset, OutlineOffset};
pub use panel::{
    circle_outline, polyline_path, Cutout, EdgeRun, Label, Panel, PanelEdge, PanelSpec,
    RectPanelBuilder, Side,
};
pub use params::{default_finger_width, EdgeFamily, JointParams};
pub use planner::{finger_count, plan, FingerPlan};
pub use registry::{EdgeKey, EdgePair, EdgePairRegistry, JointRef, Mate, MateSide, PairId};
pub use validation::{run_rules, validate_joints, JointCheck, RuleFn};

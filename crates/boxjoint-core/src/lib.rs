//! # BoxJoint Core
//!
//! Core types shared by every BoxJoint crate:
//!
//! - **Geometry**: millimetre `Point`s, bounding boxes and polygon helpers
//! - **Warnings**: the severity-tagged design-rule channel
//! - **Errors**: fatal construction errors raised by the joint engine

pub mod error;
pub mod geometry;
pub mod warning;

pub use error::{JointError, JointResult};
pub use geometry::{format_mm, is_simple, proper_crossing, signed_area, BoundingBox, Point, EPSILON};
pub use warning::{Severity, Warning, Warnings};

//! # BoxJoint Templates
//!
//! Mechanism templates on top of the joinery engine, the flat parameter
//! model and the SVG writer.
//!
//! ## Components
//!
//! - **Parameters**: fabrication, layout and render groups read from one
//!   JSON object, plus one group per template
//! - **Box shells**: base, walls and optional top registered as edge pairs
//! - **Templates**: trays, divider racks, windowed boxes, card shoes,
//!   dispensers, lidded boxes, pocket wheels, candy machines and fit
//!   calibration strips
//! - **SVG**: `CUT` and `ENGRAVE` groups, holding tabs, metadata comment
//! - **Generation**: [`generate`] ties the pieces together

pub mod error;
pub mod generate;
pub mod params;
pub mod shell;
pub mod svg;
pub mod template;
pub mod templates;

pub use error::{GenerateError, GenerateResult};
pub use generate::{generate, generate_by_id, GenerationOutput, JOINT_RULE};
pub use params::{FabricationParams, LayoutParams, ParamMap, RenderParams, Resolved};
pub use shell::{assemble_all, BoxShell, Front, ShellPanels};
pub use svg::{holding_tab_path, SvgWriter};
pub use template::Template;
pub use templates::TemplateBuild;

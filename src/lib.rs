//! # BoxJoint
//!
//! Finger-jointed box and mechanism generator for laser cutting.
//!
//! ## Architecture
//!
//! BoxJoint is organized into the following crates:
//!
//! 1. **boxjoint-core** - Geometry primitives, findings and joint errors
//! 2. **boxjoint-joinery** - Finger planning, edge pairing, panel assembly and packing
//! 3. **boxjoint-templates** - Parameter model, mechanism templates and SVG output
//! 4. **boxjoint-settings** - Persisted generation defaults
//!
//! This crate holds the command line front end and logging setup.

pub mod cli;

pub use boxjoint_core::{Severity, Warning, Warnings};
pub use boxjoint_settings::{Settings, SettingsError};
pub use boxjoint_templates::{generate, generate_by_id, GenerationOutput, ParamMap, Template};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Version with build date, shown by `--version`.
pub const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_DATE"), ")");

/// Initialize logging to stderr.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. Stdout is left
/// free for documents.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

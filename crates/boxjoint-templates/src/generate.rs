//! Generation entrypoint.
//!
//! Resolves parameters, runs the template, packs the panels and renders
//! the document. Generation is pure: nothing is written to disk, and
//! design-rule findings are returned rather than raised.

use std::collections::BTreeMap;
use std::slice;

use boxjoint_core::{Warning, Warnings};
use boxjoint_joinery::{default_offsetter, pack, JointDepths};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::error::GenerateResult;
use crate::params::{LayoutParams, ParamMap, Resolved};
use crate::svg::SvgWriter;
use crate::template::Template;
use crate::templates::{
    calibration, candy_machine, card_shoe, dispenser, divider_rack, lid_box, rotary_wheel, tray,
    window_front, TemplateBuild,
};

/// Fit rule recorded in the metadata of jointed templates.
pub const JOINT_RULE: &str =
    "drawn_slot = thickness + clearance - kerf (expected final slot ~ thickness + clearance)";

/// Result of one generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOutput {
    /// The complete SVG document.
    pub document: String,
    pub warnings: Warnings,
    pub metadata: Value,
    /// Extra documents keyed by file name, e.g. one per panel.
    pub auxiliary_files: BTreeMap<String, String>,
}

impl GenerationOutput {
    /// True when a finding should block export.
    pub fn has_errors(&self) -> bool {
        self.warnings.has_errors()
    }
}

type BuildFn<T> = fn(&Resolved<T>) -> GenerateResult<TemplateBuild>;

/// Generates `template` from a flat parameter map.
pub fn generate(template: Template, params: &ParamMap) -> GenerateResult<GenerationOutput> {
    match template {
        Template::TrayOpenFront => run(template, params, tray::build),
        Template::DividerRack => run(template, params, divider_rack::build),
        Template::WindowFront => run(template, params, window_front::build),
        Template::CardShoe => run(template, params, card_shoe::build),
        Template::DispenserSlotFront => run(template, params, dispenser::build),
        Template::BoxWithLid => run(template, params, lid_box::build),
        Template::RotaryWheel => run(template, params, rotary_wheel::build),
        Template::CandyMachineRotaryLayered => {
            run(template, params, candy_machine::build)
        }
        Template::Calibration => run(template, params, calibration::build),
    }
}

/// Like [`generate`], with the template given by its id.
pub fn generate_by_id(id: &str, params: &ParamMap) -> GenerateResult<GenerationOutput> {
    generate(id.parse()?, params)
}

fn run<T>(template: Template, map: &ParamMap, build: BuildFn<T>) -> GenerateResult<GenerationOutput>
where
    T: DeserializeOwned + Serialize,
{
    let params = Resolved::<T>::from_map(map)?;
    let built = build(&params)?;

    let offset_unavailable = params.render.offset_kerf && !cfg!(feature = "kerf-offset");
    let warnings = built.warnings.concat(Warnings::when(offset_unavailable, || {
        Warning::info(
            "KERF_OFFSET_UNAVAILABLE",
            "Kerf offsetting was requested but is not built in; geometry is drawn uncompensated",
            "Build with the kerf-offset feature",
        )
    }));

    let sheet = built.layout.clone().unwrap_or_else(|| params.layout.clone());
    let layout = pack(&built.panels, sheet.gap, sheet.max_row_width, sheet.margin);
    let metadata = metadata(template, map, &params, &sheet, &built.derived, &warnings)?;

    let offsetter = default_offsetter();
    let writer = SvgWriter::new(&params.render, params.fabrication.kerf, offsetter.as_ref());
    let document = writer.document(&built.panels, &layout, &metadata)?;

    let mut auxiliary_files = BTreeMap::new();
    if params.render.per_panel {
        for panel in &built.panels {
            let single = pack(slice::from_ref(panel), sheet.gap, f64::INFINITY, sheet.margin);
            let meta = json!({ "template": template.id(), "panel": panel.name });
            let doc = writer.document(slice::from_ref(panel), &single, &meta)?;
            debug!("Per-panel document for {} ({} bytes)", panel.name, doc.len());
            auxiliary_files.insert(format!("{}.svg", panel.name), doc);
        }
    }

    info!(
        "Generated {}: {} panels on {:.1} x {:.1} mm, {} findings ({} errors)",
        template,
        built.panels.len(),
        layout.total_width,
        layout.total_height,
        warnings.len(),
        warnings.errors().count()
    );

    Ok(GenerationOutput {
        document,
        warnings,
        metadata,
        auxiliary_files,
    })
}

fn metadata<T: Serialize>(
    template: Template,
    map: &ParamMap,
    params: &Resolved<T>,
    sheet: &LayoutParams,
    derived: &Value,
    warnings: &Warnings,
) -> GenerateResult<Value> {
    let fab = &params.fabrication;
    let depths = JointDepths::drawn(fab.thickness, fab.kerf, fab.fit_clearance);
    let mut fabrication = serde_json::to_value(fab)?;
    if let Value::Object(fields) = &mut fabrication {
        fields.insert("finger_w".to_string(), json!(fab.finger_width()));
        fields.insert("drawn_tab_depth".to_string(), json!(depths.tab));
        fields.insert("drawn_slot_depth".to_string(), json!(depths.slot));
    }

    let mut meta = json!({
        "template": template.id(),
        "version": env!("CARGO_PKG_VERSION"),
        "inputs": Value::Object(map.clone()),
        "fabrication": fabrication,
        "layout": sheet,
        "render": params.render,
        "params": serde_json::to_value(&params.template)?,
        "derived": derived,
        "warnings": warnings,
    });
    if template.is_jointed() {
        if let Value::Object(fields) = &mut meta {
            fields.insert("joint_rule".to_string(), json!(JOINT_RULE));
        }
    }
    Ok(meta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerateError;

    fn map(value: Value) -> ParamMap {
        match value {
            Value::Object(m) => m,
            _ => ParamMap::new(),
        }
    }

    #[test]
    fn test_generate_default_tray() {
        let out = generate(Template::TrayOpenFront, &ParamMap::new()).unwrap();
        assert!(out.document.starts_with("<?xml"));
        assert!(out.document.contains(r#"<g id="CUT""#));
        assert!(out.document.contains(r#"<g id="FRONT""#));
        assert!(!out.has_errors());
        assert_eq!(out.metadata["template"], "tray_open_front");
        assert_eq!(out.metadata["joint_rule"], JOINT_RULE);
        assert_eq!(out.metadata["fabrication"]["finger_w"], 10.0);
        assert!(out.auxiliary_files.is_empty());
    }

    #[test]
    fn test_unknown_id_is_rejected() {
        let err = generate_by_id("shoebox", &ParamMap::new()).unwrap_err();
        assert!(matches!(err, GenerateError::UnknownTemplate(_)));
    }

    #[test]
    fn test_wrong_type_is_invalid_parameter() {
        let err = generate(Template::TrayOpenFront, &map(json!({"inner_w": "wide"}))).unwrap_err();
        assert!(matches!(err, GenerateError::InvalidParameter { name, .. } if name == "inner_w"));
    }

    #[test]
    fn test_error_findings_still_produce_a_document() {
        let out = generate(Template::DividerRack, &map(json!({"divider_count": 1}))).unwrap();
        assert!(out.has_errors());
        assert!(out.document.ends_with("</svg>\n"));
        assert!(out.metadata["warnings"]
            .as_array()
            .is_some_and(|w| w.iter().any(|w| w["code"] == "DIV_TOO_FEW")));
    }

    #[test]
    fn test_non_jointed_templates_have_no_joint_rule() {
        let out = generate(Template::RotaryWheel, &ParamMap::new()).unwrap();
        assert!(out.metadata.get("joint_rule").is_none());
    }

    #[test]
    fn test_per_panel_files() {
        let out = generate(Template::WindowFront, &map(json!({"per_panel": true}))).unwrap();
        let names: Vec<_> = out.auxiliary_files.keys().map(String::as_str).collect();
        assert_eq!(
            names,
            ["BACK.svg", "BOTTOM.svg", "FRONT.svg", "LEFT.svg", "RIGHT.svg", "TOP.svg"]
        );
        assert!(out.auxiliary_files["FRONT.svg"].contains(r#"<g id="FRONT""#));
    }

    #[cfg(not(feature = "kerf-offset"))]
    #[test]
    fn test_offset_request_without_backend() {
        let out = generate(Template::WindowFront, &map(json!({"offset_kerf": true}))).unwrap();
        assert!(out.warnings.contains_code("KERF_OFFSET_UNAVAILABLE"));
        assert!(!out.has_errors());
    }
}

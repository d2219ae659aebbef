//! End-to-end generation tests over every template.

use boxjoint_core::{is_simple, signed_area};
use boxjoint_templates::{generate, generate_by_id, GenerateError, ParamMap, Template};
use serde_json::{json, Value};

fn map(value: Value) -> ParamMap {
    match value {
        Value::Object(m) => m,
        _ => ParamMap::new(),
    }
}

fn meta_of(document: &str) -> Value {
    let start = document.find("<!-- meta: ").unwrap() + "<!-- meta: ".len();
    let end = document[start..].find(" -->").unwrap() + start;
    serde_json::from_str(&document[start..end]).unwrap()
}

#[test]
fn every_default_document_parses() {
    for template in Template::ALL {
        let out = generate(template, &ParamMap::new()).unwrap();
        let tree = usvg::Tree::from_str(&out.document, &usvg::Options::default());
        assert!(tree.is_ok(), "{template}: {:?}", tree.err());
        assert!(out.document.contains(r#"<g id="CUT""#), "{template}");
        assert_eq!(out.metadata["template"], template.id());
    }
}

#[test]
fn defaults_place_panels_and_boxes_pass_their_rules() {
    for template in Template::ALL {
        let out = generate(template, &ParamMap::new()).unwrap();
        let placed = out.document.matches(r#"transform="translate("#).count();
        assert!(placed > 0, "{template} produced no panels");
    }

    let ids = ["tray_open_front", "window_front", "box_with_lid", "card_shoe"];
    for id in ids {
        let out = generate_by_id(id, &ParamMap::new()).unwrap();
        assert!(!out.has_errors(), "{id}: {:?}", out.warnings);
    }
}

#[test]
fn embedded_metadata_matches_returned_metadata() {
    let out = generate(
        Template::DispenserSlotFront,
        &map(json!({"thickness": 4.0, "note": "a -- b"})),
    )
    .unwrap();
    let embedded = meta_of(&out.document);
    assert_eq!(embedded["template"], "dispenser_slot_front");
    assert_eq!(embedded["fabrication"]["thickness"], 4.0);
    assert_eq!(embedded["derived"], out.metadata["derived"]);
    assert!(!out.document.contains("a -- b"));
}

#[test]
fn inputs_are_recorded_verbatim() {
    let inputs = map(json!({"inner_w": 150.0, "labels": false}));
    let out = generate(Template::TrayOpenFront, &inputs).unwrap();
    assert_eq!(out.metadata["inputs"], Value::Object(inputs));
    assert!(!out.document.contains("ENGRAVE"));
}

/// Subpaths of an `M`/`L` path as point lists.
fn subpaths(d: &str) -> Vec<Vec<(f64, f64)>> {
    let mut out: Vec<Vec<(f64, f64)>> = Vec::new();
    let mut tokens = d.split_whitespace();
    while let Some(cmd) = tokens.next() {
        let x: f64 = tokens.next().unwrap().parse().unwrap();
        let y: f64 = tokens.next().unwrap().parse().unwrap();
        match cmd {
            "M" => out.push(vec![(x, y)]),
            "L" => out.last_mut().unwrap().push((x, y)),
            other => panic!("unexpected command {other}"),
        }
    }
    out
}

/// Outline path data of panel `name` in `document`.
fn outline_of<'a>(document: &'a str, name: &str) -> &'a str {
    let group = document.find(&format!(r#"<g id="{name}""#)).unwrap();
    let start = document[group..].find(r#"<path d=""#).unwrap() + group + r#"<path d=""#.len();
    let end = document[start..].find('"').unwrap() + start;
    &document[start..end]
}

/// Bridges left between consecutive subpaths: (length, midpoint).
fn bridges(d: &str) -> Vec<(f64, (f64, f64))> {
    subpaths(d)
        .windows(2)
        .map(|pair| {
            let (x0, y0) = *pair[0].last().unwrap();
            let (x1, y1) = pair[1][0];
            let length = (x1 - x0).abs() + (y1 - y0).abs();
            (length, ((x0 + x1) / 2.0, (y0 + y1) / 2.0))
        })
        .collect()
}

#[test]
fn holding_tabs_bridge_the_middle_of_every_long_edge() {
    let out = generate(
        Template::CandyMachineRotaryLayered,
        &map(json!({"holding_tabs": true, "tab_width": 2.0})),
    )
    .unwrap();
    let w = out.metadata["derived"]["plate_w"].as_f64().unwrap();
    let h = out.metadata["derived"]["plate_h"].as_f64().unwrap();

    let gaps = bridges(outline_of(&out.document, "BACK_PLATE"));
    assert_eq!(gaps.len(), 4);
    let expected_mids = [(w / 2.0, 0.0), (w, h / 2.0), (w / 2.0, h), (0.0, h / 2.0)];
    for ((length, mid), want) in gaps.iter().zip(expected_mids) {
        assert!((length - 2.0).abs() < 1e-3, "gap {length}");
        assert!((mid.0 - want.0).abs() < 1e-3 && (mid.1 - want.1).abs() < 1e-3, "{mid:?}");
    }
}

#[test]
fn holding_tabs_leave_short_edges_whole() {
    // 2 * 69.9 + 0.5 > 140, so only the tall sides are bridged.
    let out = generate(
        Template::CandyMachineRotaryLayered,
        &map(json!({"holding_tabs": true, "tab_width": 69.9})),
    )
    .unwrap();
    let w = out.metadata["derived"]["plate_w"].as_f64().unwrap();
    let h = out.metadata["derived"]["plate_h"].as_f64().unwrap();
    assert_eq!(w, 140.0);
    assert!(h > 2.0 * 69.9 + 0.5);

    let gaps = bridges(outline_of(&out.document, "BACK_PLATE"));
    assert_eq!(gaps.len(), 2);
    for (length, mid) in gaps {
        assert!((length - 69.9).abs() < 1e-3, "gap {length}");
        assert!((mid.1 - h / 2.0).abs() < 1e-3);
    }
}

#[test]
fn divider_errors_drop_the_dividers() {
    let ok = generate(Template::DividerRack, &ParamMap::new()).unwrap();
    assert!(ok.document.contains(r#"<g id="DIVIDER_1""#));

    let bad = generate(Template::DividerRack, &map(json!({"divider_count": 60}))).unwrap();
    assert!(bad.has_errors());
    assert!(!bad.document.contains("DIVIDER_"));
}

#[test]
fn zero_front_height_is_a_parameter_error() {
    for id in ["tray_open_front", "divider_rack"] {
        let err = generate_by_id(id, &map(json!({"front_h": 0.0}))).unwrap_err();
        assert!(
            matches!(&err, GenerateError::InvalidParameter { name, .. } if name == "front_h"),
            "{id}: {err:?}"
        );
    }
}

#[test]
fn per_panel_documents_parse() {
    let out = generate(Template::BoxWithLid, &map(json!({"per_panel": true}))).unwrap();
    assert!(out.auxiliary_files.contains_key("LID_TOP.svg"));
    for (name, doc) in &out.auxiliary_files {
        assert!(
            usvg::Tree::from_str(doc, &usvg::Options::default()).is_ok(),
            "{name}"
        );
    }
}

#[test]
fn every_default_panel_is_a_simple_polygon() {
    use boxjoint_templates::templates::{
        calibration, candy_machine, card_shoe, dispenser, divider_rack, lid_box, rotary_wheel,
        tray, window_front,
    };
    use boxjoint_templates::Resolved;

    let empty = ParamMap::new();
    let panels = [
        tray::build(&Resolved::from_map(&empty).unwrap()).unwrap().panels,
        divider_rack::build(&Resolved::from_map(&empty).unwrap()).unwrap().panels,
        window_front::build(&Resolved::from_map(&empty).unwrap()).unwrap().panels,
        card_shoe::build(&Resolved::from_map(&empty).unwrap()).unwrap().panels,
        dispenser::build(&Resolved::from_map(&empty).unwrap()).unwrap().panels,
        lid_box::build(&Resolved::from_map(&empty).unwrap()).unwrap().panels,
        rotary_wheel::build(&Resolved::from_map(&empty).unwrap()).unwrap().panels,
        candy_machine::build(&Resolved::from_map(&empty).unwrap()).unwrap().panels,
        calibration::build(&Resolved::from_map(&empty).unwrap()).unwrap().panels,
    ]
    .concat();
    assert!(!panels.is_empty());
    for panel in &panels {
        assert!(panel.outline.len() >= 4, "{}", panel.name);
        assert!(is_simple(&panel.outline), "{} self-intersects", panel.name);
        assert!(signed_area(&panel.outline).abs() > 1.0, "{}", panel.name);
    }
}

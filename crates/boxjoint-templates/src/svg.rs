//! SVG document writer.
//!
//! Coordinates are millimetres; the document declares its size in `mm` and
//! a matching viewBox so one user unit is one millimetre. Cut geometry goes
//! in the `CUT` group, engraved labels in the `ENGRAVE` group.

use boxjoint_core::{format_mm, Point, EPSILON};
use boxjoint_joinery::{polyline_path, Cutout, Layout, OutlineOffset, Panel};
use serde_json::Value;

use crate::error::GenerateResult;
use crate::params::RenderParams;

/// Edges at most this much longer than two tab widths are cut in full.
pub const TAB_EDGE_SLACK: f64 = 0.5;

const LABEL_FONT_SIZE: f64 = 4.0;

/// Escapes `s` for text content, and also quotes when `attribute` is set.
fn escape_into(out: &mut String, s: &str, attribute: bool) {
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

fn escape(s: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(s.len());
    escape_into(&mut out, s, attribute);
    out
}

/// Serialises `meta` for an XML comment. The result never contains `--`.
pub fn meta_comment(meta: &Value) -> GenerateResult<String> {
    let mut text = serde_json::to_string(meta)?;
    while text.contains("--") {
        text = text.replace("--", "- -");
    }
    Ok(text)
}

/// Path data for a closed polygon with a holding-tab gap centred on every
/// edge longer than `2 * tab_width + TAB_EDGE_SLACK`.
///
/// The result is an open path. Polygons with a non-axis-aligned edge, and a
/// non-positive `tab_width`, fall back to the closed path.
pub fn holding_tab_path(points: &[Point], tab_width: f64) -> String {
    if points.len() < 3 {
        return String::new();
    }
    if !(tab_width > 0.0) {
        return polyline_path(points, true);
    }

    let f = format_mm;
    let mut cmds = vec![format!("M {} {}", f(points[0].x), f(points[0].y))];
    let ring = points.iter().zip(points.iter().cycle().skip(1));
    for (&p0, &p1) in ring {
        let delta = p1 - p0;
        if delta.x.abs() > EPSILON && delta.y.abs() > EPSILON {
            return polyline_path(points, true);
        }
        let length = delta.x.abs() + delta.y.abs();
        if length <= EPSILON {
            continue;
        }
        if length > 2.0 * tab_width + TAB_EDGE_SLACK {
            let dir = delta * (1.0 / length);
            let cut_end = p0 + dir * (length / 2.0 - tab_width / 2.0);
            let resume = p0 + dir * (length / 2.0 + tab_width / 2.0);
            cmds.push(format!("L {} {}", f(cut_end.x), f(cut_end.y)));
            cmds.push(format!("M {} {}", f(resume.x), f(resume.y)));
        }
        cmds.push(format!("L {} {}", f(p1.x), f(p1.y)));
    }
    cmds.join(" ")
}

/// Writes panels into one document.
pub struct SvgWriter<'a> {
    render: &'a RenderParams,
    kerf: f64,
    offsetter: &'a dyn OutlineOffset,
}

impl<'a> SvgWriter<'a> {
    pub fn new(render: &'a RenderParams, kerf: f64, offsetter: &'a dyn OutlineOffset) -> Self {
        Self {
            render,
            kerf,
            offsetter,
        }
    }

    fn offset(&self, polygon: Vec<Point>, delta: f64) -> Vec<Point> {
        if !self.render.offset_kerf || self.kerf == 0.0 {
            return polygon;
        }
        self.offsetter.offset(&polygon, delta).unwrap_or(polygon)
    }

    fn polygon_path(&self, polygon: &[Point]) -> String {
        if self.render.holding_tabs {
            holding_tab_path(polygon, self.render.tab_width)
        } else {
            polyline_path(polygon, true)
        }
    }

    fn cutout_path(&self, cutout: &Cutout) -> String {
        match cutout.polygon() {
            Some(points) => self.polygon_path(&self.offset(points, -self.kerf / 2.0)),
            None => cutout.path_data(),
        }
    }

    fn write_panel(&self, out: &mut String, panel: &Panel, at: Point) {
        let outline = self.offset(panel.outline.clone(), self.kerf / 2.0);
        out.push_str(&format!(
            r#"    <g id="{}" transform="translate({},{})">"#,
            escape(&panel.name, true),
            format_mm(at.x),
            format_mm(at.y)
        ));
        out.push('\n');
        out.push_str(&format!(r#"      <path d="{}"/>"#, self.polygon_path(&outline)));
        out.push('\n');
        for cutout in &panel.cutouts {
            out.push_str(&format!(r#"      <path d="{}"/>"#, self.cutout_path(cutout)));
            out.push('\n');
        }
        out.push_str("    </g>\n");
    }

    /// Renders `panels` at the positions in `layout`.
    pub fn document(&self, panels: &[Panel], layout: &Layout, meta: &Value) -> GenerateResult<String> {
        let (w, h) = (format_mm(layout.total_width), format_mm(layout.total_height));
        let mut out = String::new();
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        out.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}mm" height="{h}mm" viewBox="0 0 {w} {h}">"#
        ));
        out.push('\n');
        out.push_str(&format!(
            "  <desc>Generated by boxjoint {}</desc>\n",
            env!("CARGO_PKG_VERSION")
        ));
        out.push_str(&format!("  <!-- meta: {} -->\n", meta_comment(meta)?));

        out.push_str(&format!(
            r#"  <g id="CUT" fill="none" stroke="red" stroke-width="{}">"#,
            format_mm(self.render.stroke_mm)
        ));
        out.push('\n');
        for placement in &layout.placements {
            if let Some(panel) = panels.get(placement.index) {
                self.write_panel(&mut out, panel, placement.translation);
            }
        }
        out.push_str("  </g>\n");

        if self.render.labels {
            out.push_str(&format!(
                r#"  <g id="ENGRAVE" fill="black" font-family="Arial" font-size="{}" text-anchor="middle" dominant-baseline="middle">"#,
                format_mm(LABEL_FONT_SIZE)
            ));
            out.push('\n');
            for placement in &layout.placements {
                let Some(panel) = panels.get(placement.index) else {
                    continue;
                };
                for label in &panel.labels {
                    let at = label.at + placement.translation;
                    out.push_str(&format!(
                        r#"    <text x="{}" y="{}">"#,
                        format_mm(at.x),
                        format_mm(at.y)
                    ));
                    escape_into(&mut out, &label.text, false);
                    out.push_str("</text>\n");
                }
            }
            out.push_str("  </g>\n");
        }

        out.push_str("</svg>\n");
        Ok(out)
    }
}

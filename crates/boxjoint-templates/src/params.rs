//! Generation parameters.
//!
//! A request carries one flat JSON object. Each parameter group is read
//! from that same object with `#[serde(default)]`, so unknown keys are
//! ignored and missing keys take their documented defaults.

use boxjoint_joinery::{default_finger_width, JointParams};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GenerateError, GenerateResult};

/// Named numeric and boolean fields of a generation request.
pub type ParamMap = serde_json::Map<String, Value>;

/// Material and joint parameters shared by every template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FabricationParams {
    /// Material thickness in mm.
    pub thickness: f64,
    /// Laser kerf in mm.
    pub kerf: f64,
    /// Designed slack between tab and slot after cutting, in mm.
    pub fit_clearance: f64,
    /// Target finger width; `max(10, 3 * thickness)` when unset.
    pub finger_w: Option<f64>,
    /// Finger width for wall-to-wall corners; `finger_w` when unset.
    pub vertical_finger_w: Option<f64>,
    pub min_fingers: u32,
    pub finger_count_outer: Option<u32>,
    pub finger_count_vertical: Option<u32>,
}

impl Default for FabricationParams {
    fn default() -> Self {
        Self {
            thickness: 3.0,
            kerf: 0.2,
            fit_clearance: 0.15,
            finger_w: None,
            vertical_finger_w: None,
            min_fingers: 3,
            finger_count_outer: None,
            finger_count_vertical: None,
        }
    }
}

impl FabricationParams {
    pub fn finger_width(&self) -> f64 {
        self.finger_w
            .unwrap_or_else(|| default_finger_width(self.thickness))
    }

    pub fn joint_params(&self) -> JointParams {
        JointParams::new(self.thickness, self.kerf, self.fit_clearance)
            .with_finger_width(self.finger_width())
            .with_vertical_finger_width(self.vertical_finger_w)
            .with_min_fingers(self.min_fingers)
            .with_explicit_counts(self.finger_count_outer, self.finger_count_vertical)
    }
}

/// Sheet layout parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutParams {
    pub max_row_width: f64,
    pub gap: f64,
    pub margin: f64,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            max_row_width: 340.0,
            gap: 12.0,
            margin: 10.0,
        }
    }
}

impl LayoutParams {
    fn validate(&self) -> GenerateResult<()> {
        if !(self.max_row_width > 0.0) {
            return Err(GenerateError::invalid("max_row_width", "must be > 0"));
        }
        if self.gap < 0.0 {
            return Err(GenerateError::invalid("gap", "must be >= 0"));
        }
        if self.margin < 0.0 {
            return Err(GenerateError::invalid("margin", "must be >= 0"));
        }
        Ok(())
    }
}

/// Output document options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderParams {
    pub stroke_mm: f64,
    pub labels: bool,
    pub holding_tabs: bool,
    /// Width of each holding-tab bridge in mm.
    pub tab_width: f64,
    /// Grow outlines and shrink cutouts by half the kerf.
    pub offset_kerf: bool,
    /// Also emit one standalone document per panel.
    pub per_panel: bool,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            stroke_mm: 0.2,
            labels: true,
            holding_tabs: false,
            tab_width: 2.0,
            offset_kerf: false,
            per_panel: false,
        }
    }
}

impl RenderParams {
    fn validate(&self) -> GenerateResult<()> {
        if !(self.stroke_mm > 0.0) {
            return Err(GenerateError::invalid("stroke_mm", "must be > 0"));
        }
        if self.tab_width < 0.0 {
            return Err(GenerateError::invalid("tab_width", "must be >= 0"));
        }
        Ok(())
    }
}

/// Every parameter group of one request, with the template's own group.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    pub fabrication: FabricationParams,
    pub layout: LayoutParams,
    pub render: RenderParams,
    pub template: T,
}

impl<T: DeserializeOwned> Resolved<T> {
    pub fn from_map(map: &ParamMap) -> GenerateResult<Self> {
        let resolved = Self {
            fabrication: read_group(map)?,
            layout: read_group(map)?,
            render: read_group(map)?,
            template: read_group(map)?,
        };
        resolved.layout.validate()?;
        resolved.render.validate()?;
        Ok(resolved)
    }
}

/// Reads one parameter group out of the request map.
///
/// A type mismatch is reported against the offending key.
pub fn read_group<T: DeserializeOwned>(map: &ParamMap) -> GenerateResult<T> {
    serde_json::from_value(Value::Object(map.clone())).map_err(|err| {
        let name = offending_key::<T>(map).unwrap_or_else(|| "parameters".to_string());
        GenerateError::invalid(name, err.to_string())
    })
}

fn offending_key<T: DeserializeOwned>(map: &ParamMap) -> Option<String> {
    map.iter()
        .find(|(key, value)| {
            let mut single = ParamMap::new();
            single.insert((*key).clone(), (*value).clone());
            serde_json::from_value::<T>(Value::Object(single)).is_err()
        })
        .map(|(key, _)| key.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> ParamMap {
        match value {
            Value::Object(m) => m,
            _ => ParamMap::new(),
        }
    }

    #[test]
    fn test_defaults_from_empty_map() {
        let fab: FabricationParams = read_group(&ParamMap::new()).unwrap();
        assert_eq!(fab, FabricationParams::default());
        assert_eq!(fab.finger_width(), 10.0);

        let layout: LayoutParams = read_group(&ParamMap::new()).unwrap();
        assert_eq!(layout.max_row_width, 340.0);
    }

    #[test]
    fn test_unknown_keys_ignored_and_ints_accepted() {
        let m = map(json!({"thickness": 4, "no_such_key": "x", "finger_count_outer": 7}));
        let fab: FabricationParams = read_group(&m).unwrap();
        assert_eq!(fab.thickness, 4.0);
        assert_eq!(fab.finger_width(), 12.0);
        assert_eq!(fab.finger_count_outer, Some(7));
        assert_eq!(fab.joint_params().explicit_count_for(boxjoint_joinery::EdgeFamily::Outer), Some(7));
    }

    #[test]
    fn test_wrong_type_names_the_key() {
        let m = map(json!({"kerf": "wide", "thickness": 3.0}));
        let err = read_group::<FabricationParams>(&m).unwrap_err();
        match err {
            GenerateError::InvalidParameter { name, .. } => assert_eq!(name, "kerf"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_layout_and_render_validation() {
        let m = map(json!({"gap": -1.0}));
        assert!(matches!(
            Resolved::<LayoutParams>::from_map(&m),
            Err(GenerateError::InvalidParameter { .. })
        ));
        let m = map(json!({"stroke_mm": 0.0}));
        assert!(matches!(
            Resolved::<LayoutParams>::from_map(&m),
            Err(GenerateError::InvalidParameter { .. })
        ));
    }
}

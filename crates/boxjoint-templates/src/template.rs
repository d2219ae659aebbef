//! The closed set of mechanism templates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GenerateError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Template {
    TrayOpenFront,
    DividerRack,
    WindowFront,
    CardShoe,
    DispenserSlotFront,
    BoxWithLid,
    RotaryWheel,
    CandyMachineRotaryLayered,
    Calibration,
}

impl Template {
    pub const ALL: [Template; 9] = [
        Template::TrayOpenFront,
        Template::DividerRack,
        Template::WindowFront,
        Template::CardShoe,
        Template::DispenserSlotFront,
        Template::BoxWithLid,
        Template::RotaryWheel,
        Template::CandyMachineRotaryLayered,
        Template::Calibration,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Template::TrayOpenFront => "tray_open_front",
            Template::DividerRack => "divider_rack",
            Template::WindowFront => "window_front",
            Template::CardShoe => "card_shoe",
            Template::DispenserSlotFront => "dispenser_slot_front",
            Template::BoxWithLid => "box_with_lid",
            Template::RotaryWheel => "rotary_wheel",
            Template::CandyMachineRotaryLayered => "candy_machine_rotary_layered",
            Template::Calibration => "calibration",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Template::TrayOpenFront => "Jointed tray with a lowered front lip and optional scoop notch",
            Template::DividerRack => "Tray with base slots and keyed divider panels",
            Template::WindowFront => "Closed box with a windowed front and a jointed top",
            Template::CardShoe => "Card shoe with draw slot, window, ramp and stabilisers",
            Template::DispenserSlotFront => "Box with a dispensing slot and thumb notch on the front",
            Template::BoxWithLid => "Open box plus a separately jointed lid shell",
            Template::RotaryWheel => "Pocket wheel for flowing solids, screwed plates",
            Template::CandyMachineRotaryLayered => "Layered sandwich candy machine with a pocket wheel",
            Template::Calibration => "Mating test strips across a clearance sweep",
        }
    }

    /// True when the template builds a finger-jointed shell.
    pub fn is_jointed(&self) -> bool {
        match self {
            Template::TrayOpenFront
            | Template::DividerRack
            | Template::WindowFront
            | Template::CardShoe
            | Template::DispenserSlotFront
            | Template::BoxWithLid
            | Template::Calibration => true,
            Template::RotaryWheel | Template::CandyMachineRotaryLayered => false,
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Template {
    type Err = GenerateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim();
        if id.is_empty() {
            return Err(GenerateError::MissingParameter("template".to_string()));
        }
        Template::ALL
            .into_iter()
            .find(|t| t.id() == id)
            .ok_or_else(|| GenerateError::UnknownTemplate(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_round_trip() {
        for t in Template::ALL {
            assert_eq!(t.id().parse::<Template>().unwrap(), t);
            assert_eq!(t.to_string(), t.id());
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.id()));
            assert_eq!(serde_json::from_str::<Template>(&json).unwrap(), t);
        }
    }

    #[test]
    fn test_unknown_and_empty_ids() {
        assert!(matches!(
            "tray".parse::<Template>(),
            Err(GenerateError::UnknownTemplate(id)) if id == "tray"
        ));
        assert!(matches!(
            "  ".parse::<Template>(),
            Err(GenerateError::MissingParameter(_))
        ));
    }
}

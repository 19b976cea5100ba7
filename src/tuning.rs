//! Data-driven field tuning
//!
//! Balance values for the orb row. The defaults reproduce the classic
//! field; any subset can be overridden at startup via a `?tuning=<json>`
//! URL parameter.

use serde::{Deserialize, Serialize};

use crate::sim::FieldConfig;
use crate::{consts, unpack_color};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub orb_count: usize,
    pub orb_radius: f32,
    pub speed_increment: f32,
    /// Halt duration in ticks; `None` derives one full row crossing
    pub wait_ticks: Option<u32>,
    /// Palette as 0xRRGGBB values
    pub palette: Vec<u32>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            orb_count: consts::NUM_ORBS,
            orb_radius: consts::ORB_RADIUS,
            speed_increment: consts::SPEED_INCREMENT,
            wait_ticks: None,
            palette: consts::PALETTE.to_vec(),
        }
    }
}

impl Tuning {
    /// Width of the packed orb row; the field edges sit at ± half of it.
    pub fn row_span(&self) -> f32 {
        self.orb_count as f32 * 2.0 * self.orb_radius
    }

    /// Ticks an orb stays halted: the override, or the time a free orb
    /// takes to cross the full row.
    pub fn wait_duration(&self) -> u32 {
        self.wait_ticks
            .unwrap_or_else(|| (self.row_span() / self.speed_increment).ceil() as u32)
    }

    /// Lower the tuning into the validated configuration the sim consumes.
    pub fn field_config(&self) -> FieldConfig {
        let half = self.row_span() / 2.0;
        FieldConfig {
            orb_count: self.orb_count,
            orb_radius: self.orb_radius,
            speed_increment: self.speed_increment,
            left_edge: -half,
            right_edge: half,
            wait_ticks: self.wait_duration(),
            palette_len: self.palette.len(),
        }
    }

    /// Display color for a color state.
    pub fn color(&self, state: usize) -> [f32; 3] {
        unpack_color(self.palette[state % self.palette.len()])
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_derivation() {
        let tuning = Tuning::default();
        assert_eq!(tuning.row_span(), 40.0);
        let config = tuning.field_config();
        assert_eq!(config.left_edge, -20.0);
        assert_eq!(config.right_edge, 20.0);
        // 40 / 0.15 rounds up to a whole tick count
        assert_eq!(config.wait_ticks, 267);
        assert_eq!(config.palette_len, 2);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_partial_json_override() {
        let tuning = Tuning::from_json(r#"{"orb_count": 4, "wait_ticks": 30}"#).unwrap();
        assert_eq!(tuning.orb_count, 4);
        assert_eq!(tuning.wait_duration(), 30);
        // Untouched fields keep their defaults
        assert_eq!(tuning.speed_increment, consts::SPEED_INCREMENT);
        assert_eq!(tuning.palette, consts::PALETTE.to_vec());
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(Tuning::from_json("{orbs!}").is_err());
    }

    #[test]
    fn test_palette_colors_wrap() {
        let tuning = Tuning::default();
        assert_eq!(tuning.color(0), tuning.color(2));
        let [r, g, b] = tuning.color(1);
        assert_eq!((r, g, b), (0.0, 1.0, 0.0));
    }
}

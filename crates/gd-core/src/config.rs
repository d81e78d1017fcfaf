//! Grid configuration.

use serde::Deserialize;

/// Tunable constants of the grid and the undo history.
///
/// The defaults describe the stock layout builder: a horizontal unit is 2%
/// of the container width (50 columns) and a vertical unit is 20 pixels.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Fraction of the container width that makes up one horizontal unit.
    /// Default: **0.02**.
    pub horizontal_unit_ratio: f64,

    /// Pixel height of one vertical unit. Default: **20**.
    pub vertical_unit_px: i32,

    /// Maximum number of commands kept for undo. Default: **100**.
    pub history_depth: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            horizontal_unit_ratio: 0.02,
            vertical_unit_px: 20,
            history_depth: 100,
        }
    }
}

impl GridConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    /// Returns a message if the JSON is malformed or a value is out of range.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let config: GridConfig =
            serde_json::from_str(json).map_err(|e| format!("invalid grid config: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        if !(self.horizontal_unit_ratio.is_finite() && self.horizontal_unit_ratio > 0.0) {
            return Err(format!(
                "horizontal_unit_ratio must be positive, got {}",
                self.horizontal_unit_ratio
            ));
        }
        if self.vertical_unit_px <= 0 {
            return Err(format!(
                "vertical_unit_px must be positive, got {}",
                self.vertical_unit_px
            ));
        }
        Ok(())
    }
}

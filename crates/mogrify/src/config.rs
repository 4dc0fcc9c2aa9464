//! Mogrifier configuration: reserved style names, selection keys, and toggles

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MogrifyError, Result};
use crate::name_map::NameMapConfig;

/// Standard family used by `[VENT ...]` and `[ENERGY ...]` toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StandardFamily {
    Vent,
    Energy,
}

impl StandardFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vent => "VENT",
            Self::Energy => "ENERGY",
        }
    }

    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "VENT" => Some(Self::Vent),
            "ENERGY" => Some(Self::Energy),
            _ => None,
        }
    }
}

/// A standards toggle: `[FAMILY code]` removes its section when `selection_key` is set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardToggle {
    pub family: StandardFamily,
    pub code: String,
    pub selection_key: String,
}

impl StandardToggle {
    pub fn new(family: StandardFamily, code: impl Into<String>, selection_key: impl Into<String>) -> Self {
        Self { family, code: code.into(), selection_key: selection_key.into() }
    }
}

/// Settings that tie the engine to a particular source-document catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MogrifyConfig {
    /// Character style marking annotation runs
    pub annotation_style: String,
    /// Paragraph style of info boxes
    pub info_box_style: String,
    /// Paragraph style of list items inside info boxes
    pub info_box_list_style: String,
    /// Paragraph style of instruction boxes
    pub instruction_box_style: String,
    /// Selection key that enables info box removal
    pub remove_info_boxes_key: String,
    /// Reserved key for unit selection
    pub units_key: String,
    /// Sentinel selecting the first UNITS alternative
    pub si_sentinel: String,
    /// Sentinel selecting the second UNITS alternative
    pub ip_sentinel: String,
    /// Standards toggles
    pub standards: Vec<StandardToggle>,
    /// Name map CSV layout
    pub name_map: NameMapConfig,
}

impl Default for MogrifyConfig {
    fn default() -> Self {
        Self {
            annotation_style: "Toggle".to_string(),
            info_box_style: "Info. box".to_string(),
            info_box_list_style: "InfoboxList".to_string(),
            instruction_box_style: "Instr. box".to_string(),
            remove_info_boxes_key: "DEL_INFO_BOX".to_string(),
            units_key: "UNITS".to_string(),
            si_sentinel: "SI".to_string(),
            ip_sentinel: "IP".to_string(),
            standards: vec![
                StandardToggle::new(StandardFamily::Energy, "901", "DEL_ENERGY_ASHRAE"),
                StandardToggle::new(StandardFamily::Energy, "T24", "DEL_ENERGY_TITLE24"),
                StandardToggle::new(StandardFamily::Vent, "621", "DEL_VENTILATION_ASHRAE"),
                StandardToggle::new(StandardFamily::Vent, "T24", "DEL_VENTILATION_TITLE24"),
            ],
            name_map: NameMapConfig::default(),
        }
    }
}

impl MogrifyConfig {
    /// Load a configuration from JSON; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(MogrifyError::FileNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn with_annotation_style(mut self, style: impl Into<String>) -> Self {
        self.annotation_style = style.into();
        self
    }

    /// Paragraph styles that open an info-box region
    pub fn box_styles(&self) -> [&str; 3] {
        [
            self.info_box_style.as_str(),
            self.info_box_list_style.as_str(),
            self.instruction_box_style.as_str(),
        ]
    }

    /// Whether a paragraph style opens an info-box region
    pub fn is_box_style(&self, style: &str) -> bool {
        self.box_styles().contains(&style)
    }

    /// Find the toggle for a family and code
    pub fn standard(&self, family: StandardFamily, code: &str) -> Option<&StandardToggle> {
        self.standards
            .iter()
            .find(|t| t.family == family && t.code == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MogrifyConfig::default();
        assert_eq!(config.annotation_style, "Toggle");
        assert!(config.is_box_style("Info. box"));
        assert!(config.is_box_style("InfoboxList"));
        assert!(config.is_box_style("Instr. box"));
        assert!(!config.is_box_style("Heading 1"));
        assert_eq!(
            config.standard(StandardFamily::Vent, "621").map(|t| t.selection_key.as_str()),
            Some("DEL_VENTILATION_ASHRAE")
        );
        assert!(config.standard(StandardFamily::Vent, "901").is_none());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = MogrifyConfig::from_json_str(
            r#"{"annotation_style": "Marker", "standards": [{"family": "VENT", "code": "X", "selection_key": "K"}]}"#,
        )
        .unwrap();
        assert_eq!(config.annotation_style, "Marker");
        assert_eq!(config.units_key, "UNITS");
        assert_eq!(config.standards.len(), 1);
        assert_eq!(config.name_map.short_id_header, "Short ID");
    }
}

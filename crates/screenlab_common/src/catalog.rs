//! Item catalog - the symbolic tokens a simulated bag can contain.
//!
//! Items are purely presentational tokens with a stable name; there is no
//! image or sensor data behind them. The default sets match the study
//! protocol: eleven everyday safe items, six prohibited items.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::StudyError;

/// One bag item: a display glyph plus a stable machine name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Glyph rendered in the bag view
    pub glyph: String,
    /// Stable lowercase name (never shown to participants)
    pub name: String,
}

impl Item {
    pub fn new(glyph: &str, name: &str) -> Self {
        Self {
            glyph: glyph.to_string(),
            name: name.to_string(),
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.glyph)
    }
}

/// The safe and threat item pools trials are sampled from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemCatalog {
    /// Items sampled without replacement for the bag body
    #[serde(default = "default_safe_items")]
    pub safe: Vec<Item>,
    /// Items one of which may be inserted as the hidden threat
    #[serde(default = "default_threat_items")]
    pub threat: Vec<Item>,
}

impl Default for ItemCatalog {
    fn default() -> Self {
        Self {
            safe: default_safe_items(),
            threat: default_threat_items(),
        }
    }
}

impl ItemCatalog {
    /// Check the catalog can support bags of up to `max_sample` safe items.
    pub fn validate(&self, max_sample: usize) -> Result<(), StudyError> {
        if self.safe.len() < max_sample {
            return Err(StudyError::Configuration(format!(
                "safe catalog has {} items but bags need up to {}",
                self.safe.len(),
                max_sample
            )));
        }
        if self.threat.is_empty() {
            return Err(StudyError::Configuration(
                "threat catalog is empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_safe_items() -> Vec<Item> {
    vec![
        Item::new("👕", "shirt"),
        Item::new("👖", "trousers"),
        Item::new("👗", "dress"),
        Item::new("👟", "sneaker"),
        Item::new("🎩", "hat"),
        Item::new("💻", "laptop"),
        Item::new("📷", "camera"),
        Item::new("📚", "books"),
        Item::new("🧸", "teddy-bear"),
        Item::new("🥪", "sandwich"),
        Item::new("🕶️", "sunglasses"),
    ]
}

fn default_threat_items() -> Vec<Item> {
    vec![
        Item::new("🔫", "handgun"),
        Item::new("🔪", "knife"),
        Item::new("💣", "bomb"),
        Item::new("🧨", "dynamite"),
        Item::new("🩸", "biohazard"),
        Item::new("☠️", "poison"),
    ]
}

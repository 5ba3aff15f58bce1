//! User preferences stored next to the collection.

use chess::PieceColor;
use serde::{Deserialize, Serialize};

use super::PersistenceError;
use crate::side::BySide;

pub const DEFAULT_ANALYSIS_DEPTH: u32 = 18;
pub const DEFAULT_ANALYSIS_LINES: u32 = 3;

/// Filters forwarded to the statistics service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StatsFilters {
    pub speeds: Vec<String>,
    pub ratings: Vec<u32>,
}

impl Default for StatsFilters {
    fn default() -> Self {
        Self {
            speeds: vec!["blitz".to_string(), "rapid".to_string(), "classical".to_string()],
            ratings: vec![1800, 2000, 2200, 2500],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub analysis_depth: u32,
    pub analysis_lines: u32,
    pub stats_filters: StatsFilters,
    /// Board orientation per repertoire side.
    #[serde(with = "orientation")]
    pub orientation: BySide<PieceColor>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            analysis_depth: DEFAULT_ANALYSIS_DEPTH,
            analysis_lines: DEFAULT_ANALYSIS_LINES,
            stats_filters: StatsFilters::default(),
            orientation: BySide::new(PieceColor::White, PieceColor::Black),
        }
    }
}

impl Settings {
    /// Decode leniently: missing fields take their defaults, and anything
    /// unreadable yields the defaults.
    pub fn decode(payload: &str) -> Self {
        match serde_json::from_str(payload) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Discarding stored settings: {}", e);
                Self::default()
            }
        }
    }

    pub fn encode(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Orientation is stored as `{"white": "white", "black": "black"}`.
mod orientation {
    use chess::PieceColor;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::side::BySide;

    #[derive(Serialize, Deserialize)]
    struct Names {
        white: String,
        black: String,
    }

    pub fn serialize<S: Serializer>(value: &BySide<PieceColor>, s: S) -> Result<S::Ok, S::Error> {
        Names {
            white: value.white.to_string(),
            black: value.black.to_string(),
        }
        .serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<BySide<PieceColor>, D::Error> {
        let names = Names::deserialize(d)?;
        Ok(BySide::new(
            names.white.parse().map_err(D::Error::custom)?,
            names.black.parse().map_err(D::Error::custom)?,
        ))
    }
}

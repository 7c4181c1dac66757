pub mod city;
pub mod war;

use serde::Serialize;

pub use city::{parse_city, parse_city_with, CityResult, Encounter, Settlement, ShopLevels};
pub use war::{parse_war, parse_war_with, WarEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EncounterKind {
    Invasion,
    War,
}

/// Similarity needed to map free text onto a city, tier or faction key.
pub(crate) const CANONICAL_THRESHOLD: f64 = 0.5;

//! Structured data from OCR text of New World settlement and war screens.
//!
//! Recognized text goes in, typed results come out. Parsing never fails:
//! anything that cannot be located reads as `None` (or NaN for the upgrade
//! count). Only loading external locale resources can return an error.

pub mod dictionary;
pub mod error;
pub mod locale;
pub mod parsers;
pub mod screen;
pub mod similarity;
pub mod text;

#[cfg(feature = "python")]
mod python;

pub use dictionary::{init_vocabulary, vocabulary, City, Faction, SettlementTier, Vocabulary};
pub use error::LocaleError;
pub use locale::{Locale, LocaleKey, LocaleTable};
pub use parsers::{
    CityResult, Encounter, EncounterKind, Settlement, ShopLevels, WarEntry,
    parse_city as parse_settlement_screen, parse_war as parse_war_screen,
};
pub use screen::{ScreenKind, ScreenKindError, ScreenResult, parse_screen, parse_screens};

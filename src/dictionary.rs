//! Candidate sets and phrase patterns assembled from the locale tables.
//!
//! A [`Vocabulary`] is built once from every loaded locale and is read-only
//! afterwards. The process-wide instance lives in a `OnceLock`; it is filled
//! with the compiled-in tables on first use unless [`init_vocabulary`] ran
//! first with tables from a resource directory.

use std::path::Path;
use std::sync::OnceLock;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{LocaleError, Result};
use crate::locale::{self, LocaleKey, LocaleTable};
use crate::similarity::{self, detect_closest_name};

/// Global vocabulary instance (built once, reused)
static VOCABULARY: OnceLock<Vocabulary> = OnceLock::new();

/// The phrases of one concept across every locale. Only used for scoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateSet(Vec<String>);

impl CandidateSet {
    pub fn phrases(&self) -> &[String] {
        &self.0
    }

    pub fn is_similar(&self, text: &str, threshold: f64) -> bool {
        similarity::is_similar_to_any(text, &self.0, threshold)
    }
}

/// Substring match against any of a fixed list of literal phrases.
#[derive(Debug, Clone)]
pub struct PhrasePattern {
    regex: Regex,
}

impl PhrasePattern {
    fn compile(phrases: &[String], case_insensitive: bool) -> Result<Self> {
        let alternation = phrases
            .iter()
            .map(|phrase| format!("({})", regex::escape(phrase)))
            .collect::<Vec<_>>()
            .join("|");
        let regex = RegexBuilder::new(&alternation)
            .case_insensitive(case_insensitive)
            .build()?;
        Ok(Self { regex })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

macro_rules! canonical_keys {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $key:ident,)+ }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        $(#[$meta])*
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            pub fn locale_key(self) -> LocaleKey {
                match self {
                    $($name::$variant => LocaleKey::$key,)+
                }
            }
        }
    };
}

canonical_keys! {
    /// Settlements known to the parsers.
    City {
        FirstLight => CitiesFirstLight,
        CutlassKeys => CitiesCutlassKeys,
        Reekwater => CitiesReekwater,
        Windsward => CitiesWindsward,
        MonarchsBluffs => CitiesMonarchsBluffs,
        Everfall => CitiesEverfall,
        Queensport => CitiesQueensport,
        RestlessShore => CitiesRestlessShore,
        WeaversFen => CitiesWeaversFen,
        Brightwood => CitiesBrightwood,
        Mourningdale => CitiesMourningdale,
        Edengrove => CitiesEdengrove,
        GreatCleave => CitiesGreatCleave,
        ShatteredMountain => CitiesShatteredMountain,
    }
}

canonical_keys! {
    /// Development rank of a settlement.
    #[serde(rename_all = "lowercase")]
    SettlementTier {
        Hamlet => SettlementHamlet,
        Village => SettlementVillage,
        Town => SettlementTown,
        City => SettlementCity,
        Capital => SettlementCapital,
    }
}

canonical_keys! {
    Faction {
        Syndicate => FactionName1,
        Marauders => FactionName2,
        Covenant => FactionName3,
    }
}

/// Every candidate set and phrase pattern the parsers use.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    pub(crate) settlement_label: PhrasePattern,
    pub(crate) any_tier: PhrasePattern,
    pub(crate) any_city: PhrasePattern,
    pub(crate) war_banner: PhrasePattern,
    pub(crate) invasion_banner: PhrasePattern,
    pub(crate) combatant_label: PhrasePattern,
    pub(crate) invasion_attacker: PhrasePattern,
    pub(crate) shop_header: PhrasePattern,
    pub(crate) governed_by: PhrasePattern,
    pub(crate) controlled_by: PhrasePattern,
    pub(crate) invasion_start: PhrasePattern,
    pub(crate) war_start: PhrasePattern,
    pub(crate) crafting: CandidateSet,
    pub(crate) refining: CandidateSet,
    pub(crate) taxes: CandidateSet,
    pub(crate) tier_word: CandidateSet,
    tiers: Vec<(SettlementTier, Vec<String>)>,
    cities: Vec<(City, Vec<String>)>,
    factions: Vec<(Faction, Vec<String>)>,
}

impl Vocabulary {
    /// Assembles candidate sets from `tables`. Each set lists, locale by
    /// locale, the phrase of every requested key.
    pub fn from_locales(tables: &[LocaleTable]) -> Result<Self> {
        if tables.is_empty() {
            return Err(LocaleError::NoLocales);
        }

        let phrases = |keys: &[LocaleKey]| -> Vec<String> {
            tables
                .iter()
                .flat_map(|table| keys.iter().map(move |key| table.get(*key).to_string()))
                .collect()
        };
        let pattern = |keys: &[LocaleKey]| PhrasePattern::compile(&phrases(keys), true);

        let city_keys: Vec<LocaleKey> = City::ALL.iter().map(|c| c.locale_key()).collect();
        let tier_keys = [
            LocaleKey::SettlementCapital,
            LocaleKey::SettlementCity,
            LocaleKey::SettlementHamlet,
            LocaleKey::SettlementTown,
            LocaleKey::SettlementVillage,
        ];

        Ok(Self {
            settlement_label: PhrasePattern::compile(&phrases(&[LocaleKey::Township]), false)?,
            any_tier: pattern(&tier_keys)?,
            any_city: pattern(&city_keys)?,
            war_banner: pattern(&[
                LocaleKey::EncounterUpcomingWar,
                LocaleKey::EncounterOngoingWar,
            ])?,
            invasion_banner: pattern(&[
                LocaleKey::EncounterUpcomingInvasion,
                LocaleKey::EncounterOngoingInvasion,
            ])?,
            combatant_label: pattern(&[LocaleKey::AttackerLabel, LocaleKey::DefenderLabel])?,
            invasion_attacker: pattern(&[LocaleKey::InvasionAttacker])?,
            shop_header: pattern(&[LocaleKey::Crafting, LocaleKey::Refining, LocaleKey::Taxes])?,
            governed_by: pattern(&[LocaleKey::GovernedBy])?,
            controlled_by: pattern(&[LocaleKey::ControlledBy])?,
            invasion_start: pattern(&[LocaleKey::InvasionTime])?,
            war_start: pattern(&[LocaleKey::WarTime])?,
            crafting: CandidateSet(phrases(&[LocaleKey::Crafting])),
            refining: CandidateSet(phrases(&[LocaleKey::Refining])),
            taxes: CandidateSet(phrases(&[LocaleKey::Taxes])),
            tier_word: CandidateSet(phrases(&[LocaleKey::Tier])),
            tiers: SettlementTier::ALL
                .iter()
                .map(|t| (*t, phrases(&[t.locale_key()])))
                .collect(),
            cities: City::ALL
                .iter()
                .map(|c| (*c, phrases(&[c.locale_key()])))
                .collect(),
            factions: Faction::ALL
                .iter()
                .map(|f| (*f, phrases(&[f.locale_key()])))
                .collect(),
        })
    }

    /// Vocabulary over the compiled-in German and English tables.
    pub fn builtin() -> Result<Self> {
        Self::from_locales(&locale::builtin_tables())
    }

    pub fn to_settlement_name(&self, text: &str, threshold: f64) -> Option<City> {
        detect_closest_name(text, &self.cities, threshold)
    }

    pub fn to_settlement_tier(&self, text: &str, threshold: f64) -> Option<SettlementTier> {
        detect_closest_name(text, &self.tiers, threshold)
    }

    pub fn to_faction_name(&self, text: &str, threshold: f64) -> Option<Faction> {
        detect_closest_name(text, &self.factions, threshold)
    }

    /// Whether `text` resembles the generic "tier" word of any locale.
    pub fn is_tier_label(&self, text: &str, threshold: f64) -> bool {
        self.tier_word.is_similar(text, threshold)
    }
}

/// Process-wide vocabulary, built from the compiled-in tables on first use.
pub fn vocabulary() -> &'static Vocabulary {
    VOCABULARY.get_or_init(|| {
        let vocab = Vocabulary::builtin()
            .unwrap_or_else(|e| panic!("built-in locale tables are invalid: {e}"));
        tracing::debug!("vocabulary initialized from built-in locale tables");
        vocab
    })
}

/// Initialize the process-wide vocabulary from a locale resource directory.
///
/// Returns `Ok(false)` if a vocabulary was already installed; the existing
/// one stays in place.
pub fn init_vocabulary(dir: &Path) -> Result<bool> {
    let vocab = Vocabulary::from_locales(&locale::load_locale_dir(dir)?)?;

    match VOCABULARY.set(vocab) {
        Ok(()) => {
            tracing::info!("vocabulary initialized from {}", dir.display());
            Ok(true)
        }
        Err(_) => {
            tracing::warn!("vocabulary already initialized, ignoring {}", dir.display());
            Ok(false)
        }
    }
}

/// Check if the process-wide vocabulary is in place
pub fn vocabulary_loaded() -> bool {
    VOCABULARY.get().is_some()
}

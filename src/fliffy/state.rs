//! Fliffy Collector game state definitions.

use serde::{Deserialize, Serialize};

use super::catalog::Catalog;

/// Rarity tiers, ordered from most to least common.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    /// All rarities in ascending order.
    pub const ALL: [Rarity; 5] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
    ];

    /// Position in [`Rarity::ALL`].
    pub fn index(self) -> usize {
        match self {
            Rarity::Common => 0,
            Rarity::Uncommon => 1,
            Rarity::Rare => 2,
            Rarity::Epic => 3,
            Rarity::Legendary => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Uncommon => "Uncommon",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
        }
    }

    /// Income multiplier contributed by a trait of this rarity.
    pub fn multiplier(self) -> f64 {
        match self {
            Rarity::Common => 1.0,
            Rarity::Uncommon => 3.0,
            Rarity::Rare => 10.0,
            Rarity::Epic => 40.0,
            Rarity::Legendary => 200.0,
        }
    }
}

/// Rarity tag lookup shared by colors and patterns.
pub trait Tagged {
    fn rarity(&self) -> Rarity;
}

/// A fur color option.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FliffyColor {
    pub name: String,
    pub hex: String,
    pub rarity: Rarity,
}

/// A fur pattern option.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FliffyPattern {
    pub name: String,
    pub id: String,
    pub rarity: Rarity,
}

impl Tagged for FliffyColor {
    fn rarity(&self) -> Rarity {
        self.rarity
    }
}

impl Tagged for FliffyPattern {
    fn rarity(&self) -> Rarity {
        self.rarity
    }
}

/// A collectible creature.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fliffy {
    pub id: String,
    pub color: FliffyColor,
    pub pattern: FliffyPattern,
    pub rarity: Rarity,
    /// Fliff Bucks per second.
    pub income: f64,
}

impl Fliffy {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.pattern.name, self.color.name)
    }
}

/// Regular upgrades, bought with Fliff Bucks and reset on rebirth.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UpgradeKind {
    IncomeMultiplier,
    HuntCostReduction,
    RareFliffyChance,
}

impl UpgradeKind {
    /// Persisted identifier.
    pub fn id(self) -> &'static str {
        match self {
            UpgradeKind::IncomeMultiplier => "INCOME_MULTIPLIER",
            UpgradeKind::HuntCostReduction => "HUNT_COST_REDUCTION",
            UpgradeKind::RareFliffyChance => "RARE_FLIFFY_CHANCE",
        }
    }
}

/// Rebirth upgrades, bought with Fluff Points and kept across rebirths.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RebirthUpgradeKind {
    PermanentIncomeBoost,
    StartingFliffBucks,
    FluffPointGain,
}

impl RebirthUpgradeKind {
    /// Persisted identifier.
    pub fn id(self) -> &'static str {
        match self {
            RebirthUpgradeKind::PermanentIncomeBoost => "PERMANENT_INCOME_BOOST",
            RebirthUpgradeKind::StartingFliffBucks => "STARTING_FLIFF_BUCKS",
            RebirthUpgradeKind::FluffPointGain => "FLUFF_POINT_GAIN",
        }
    }
}

/// A levelled upgrade with a geometric cost curve.
#[derive(Clone, Debug, PartialEq)]
pub struct Upgrade<K> {
    pub id: K,
    pub name: &'static str,
    pub description: &'static str,
    pub base_cost: f64,
    pub cost_multiplier: f64,
    pub level: u32,
    pub max_level: u32,
}

impl<K> Upgrade<K> {
    /// Cost of the next level.
    pub fn cost(&self) -> f64 {
        self.base_cost * self.cost_multiplier.powi(self.level as i32)
    }

    pub fn is_maxed(&self) -> bool {
        self.level >= self.max_level
    }
}

/// A hunting ground.
#[derive(Clone, Debug, PartialEq)]
pub struct Location {
    pub id: &'static str,
    pub name: &'static str,
    pub cost: f64,
    /// Base draw probability per rarity, indexed by [`Rarity::index`].
    /// Hand-authored; not required to sum to 1.
    pub rarity_chances: [f64; 5],
}

impl Location {
    pub fn base_chance(&self, rarity: Rarity) -> f64 {
        self.rarity_chances[rarity.index()]
    }
}

/// A collectible offered on the market.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeListing {
    pub listing_id: String,
    pub fliffy: Fliffy,
    pub price: f64,
}

/// The trade-listing pool. Front of the list is shown first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Market {
    pub listings: Vec<TradeListing>,
}

impl Market {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Authoritative player progress.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerState {
    /// Primary currency.
    pub fliff_bucks: f64,
    /// Prestige currency.
    pub fluff_points: u64,
    pub rebirth_count: u32,
    pub collected_fliffys: Vec<Fliffy>,
    pub upgrades: Vec<Upgrade<UpgradeKind>>,
    pub rebirth_upgrades: Vec<Upgrade<RebirthUpgradeKind>>,
    /// Location ids. Always contains the default location.
    pub unlocked_locations: Vec<String>,
}

impl PlayerState {
    /// Fresh game with every level at zero.
    pub fn new(catalog: &Catalog) -> Self {
        Self {
            fliff_bucks: 0.0,
            fluff_points: 0,
            rebirth_count: 0,
            collected_fliffys: Vec::new(),
            upgrades: catalog.upgrades.clone(),
            rebirth_upgrades: catalog.rebirth_upgrades.clone(),
            unlocked_locations: vec![catalog.default_location.to_string()],
        }
    }

    pub fn upgrade_level(&self, kind: UpgradeKind) -> u32 {
        self.upgrades
            .iter()
            .find(|u| u.id == kind)
            .map_or(0, |u| u.level)
    }

    pub fn rebirth_upgrade_level(&self, kind: RebirthUpgradeKind) -> u32 {
        self.rebirth_upgrades
            .iter()
            .find(|u| u.id == kind)
            .map_or(0, |u| u.level)
    }

    pub fn is_unlocked(&self, location_id: &str) -> bool {
        self.unlocked_locations.iter().any(|id| id == location_id)
    }

    pub fn find_fliffy(&self, fliffy_id: &str) -> Option<&Fliffy> {
        self.collected_fliffys.iter().find(|f| f.id == fliffy_id)
    }

    /// Highest rarity currently owned.
    pub fn best_rarity(&self) -> Option<Rarity> {
        self.collected_fliffys.iter().map(|f| f.rarity).max()
    }
}

/// Log entry for the message panel.
#[derive(Clone, Debug)]
pub struct LogEntry {
    pub text: String,
    pub is_important: bool,
}

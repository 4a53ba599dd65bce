//! Static game configuration, built once at startup and shared by reference.

use super::state::{
    FliffyColor, FliffyPattern, Location, Rarity, RebirthUpgradeKind, Upgrade, UpgradeKind,
};

/// Location every player starts with and returns to on rebirth.
pub const DEFAULT_LOCATION: &str = "meadow";

/// (name, hex, rarity)
const COLORS: &[(&str, &str, Rarity)] = &[
    ("Cotton", "#F5F5F5", Rarity::Common),
    ("Sandy", "#E8D8B0", Rarity::Common),
    ("Pebble", "#B0B0B0", Rarity::Common),
    ("Mint", "#98FF98", Rarity::Uncommon),
    ("Sky", "#87CEEB", Rarity::Uncommon),
    ("Peach", "#FFDAB9", Rarity::Uncommon),
    ("Lavender", "#B57EDC", Rarity::Rare),
    ("Coral", "#FF7F50", Rarity::Rare),
    ("Rose Gold", "#E0BFB8", Rarity::Epic),
    ("Midnight", "#191970", Rarity::Epic),
    ("Prismatic", "#FF00FF", Rarity::Legendary),
];

/// (name, id, rarity)
const PATTERNS: &[(&str, &str, Rarity)] = &[
    ("Solid", "solid", Rarity::Common),
    ("Spotted", "spotted", Rarity::Uncommon),
    ("Striped", "striped", Rarity::Rare),
    ("Swirl", "swirl", Rarity::Epic),
    ("Stardust", "stardust", Rarity::Legendary),
];

/// All static tables the engine reads.
#[derive(Clone, Debug)]
pub struct Catalog {
    pub colors: Vec<FliffyColor>,
    pub patterns: Vec<FliffyPattern>,
    pub locations: Vec<Location>,
    /// Level-0 templates.
    pub upgrades: Vec<Upgrade<UpgradeKind>>,
    /// Level-0 templates.
    pub rebirth_upgrades: Vec<Upgrade<RebirthUpgradeKind>>,
    pub default_location: &'static str,
}

impl Catalog {
    /// The shipped game balance.
    pub fn builtin() -> Self {
        Self {
            colors: COLORS
                .iter()
                .map(|&(name, hex, rarity)| FliffyColor {
                    name: name.into(),
                    hex: hex.into(),
                    rarity,
                })
                .collect(),
            patterns: PATTERNS
                .iter()
                .map(|&(name, id, rarity)| FliffyPattern {
                    name: name.into(),
                    id: id.into(),
                    rarity,
                })
                .collect(),
            locations: create_locations(),
            upgrades: create_upgrades(),
            rebirth_upgrades: create_rebirth_upgrades(),
            default_location: DEFAULT_LOCATION,
        }
    }

    pub fn location(&self, id: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.id == id)
    }
}

fn create_locations() -> Vec<Location> {
    // Chances are [Common, Uncommon, Rare, Epic, Legendary].
    vec![
        Location {
            id: DEFAULT_LOCATION,
            name: "Sunny Meadow",
            cost: 10.0,
            rarity_chances: [0.70, 0.25, 0.05, 0.0, 0.0],
        },
        Location {
            id: "forest",
            name: "Whispering Forest",
            cost: 500.0,
            rarity_chances: [0.50, 0.32, 0.15, 0.03, 0.0],
        },
        Location {
            id: "caves",
            name: "Crystal Caves",
            cost: 5_000.0,
            rarity_chances: [0.30, 0.35, 0.25, 0.09, 0.01],
        },
        Location {
            id: "peaks",
            name: "Cloud Peaks",
            cost: 75_000.0,
            rarity_chances: [0.15, 0.30, 0.33, 0.18, 0.04],
        },
        Location {
            id: "crater",
            name: "Starfall Crater",
            cost: 1_000_000.0,
            rarity_chances: [0.05, 0.20, 0.35, 0.28, 0.12],
        },
    ]
}

fn create_upgrades() -> Vec<Upgrade<UpgradeKind>> {
    vec![
        Upgrade {
            id: UpgradeKind::IncomeMultiplier,
            name: "Cozy Nests",
            description: "+10% Fliffy income per level",
            base_cost: 100.0,
            cost_multiplier: 1.5,
            level: 0,
            max_level: 50,
        },
        Upgrade {
            id: UpgradeKind::HuntCostReduction,
            name: "Bargain Nets",
            description: "-5% hunting cost per level",
            base_cost: 250.0,
            cost_multiplier: 1.8,
            level: 0,
            max_level: 10,
        },
        Upgrade {
            id: UpgradeKind::RareFliffyChance,
            name: "Lucky Charms",
            description: "Better odds of finding rare Fliffys",
            base_cost: 1_000.0,
            cost_multiplier: 2.0,
            level: 0,
            max_level: 20,
        },
    ]
}

fn create_rebirth_upgrades() -> Vec<Upgrade<RebirthUpgradeKind>> {
    vec![
        Upgrade {
            id: RebirthUpgradeKind::PermanentIncomeBoost,
            name: "Eternal Fluff",
            description: "+25% income per level, kept forever",
            base_cost: 1.0,
            cost_multiplier: 1.5,
            level: 0,
            max_level: 20,
        },
        Upgrade {
            id: RebirthUpgradeKind::StartingFliffBucks,
            name: "Nest Egg",
            description: "Start each rebirth with +100 Fliff Bucks per level",
            base_cost: 1.0,
            cost_multiplier: 1.2,
            level: 0,
            max_level: 50,
        },
        Upgrade {
            id: RebirthUpgradeKind::FluffPointGain,
            name: "Fluff Magnet",
            description: "+10% Fluff Points from rebirths per level",
            base_cost: 3.0,
            cost_multiplier: 1.75,
            level: 0,
            max_level: 10,
        },
    ]
}

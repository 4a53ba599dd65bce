//! Action processor: pure functions over the game state.
//!
//! Every action checks all of its preconditions before touching anything, so a
//! rejected action leaves the state exactly as it was.

use thiserror::Error;

use super::catalog::Catalog;
use super::economy;
use super::random::{generate_fliffy, RandomSource};
use super::state::{
    Fliffy, Location, Market, PlayerState, Rarity, RebirthUpgradeKind, TradeListing, UpgradeKind,
};

/// Game ticks per real-time second.
pub const TICKS_PER_SECOND: u32 = 10;

/// Per-level hunt luck. Non-Common tiers get a quarter of it, Common loses all of it.
const RARE_CHANCE_PER_LEVEL: f64 = 0.005;

/// Fliff Bucks granted per Nest Egg level after a rebirth.
const STARTING_BUCKS_PER_LEVEL: f64 = 100.0;

/// Why an action was refused. The state is untouched in every case.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("unknown hunting location")]
    UnknownLocation,
    #[error("upgrade not found")]
    UnknownUpgrade,
    #[error("already at max level")]
    MaxLevel,
    #[error("not enough Fliff Bucks")]
    InsufficientBucks,
    #[error("not enough Fluff Points")]
    InsufficientPoints,
    #[error("rebirth requirements not met")]
    RebirthLocked,
    #[error("price must be positive")]
    InvalidPrice,
    #[error("that Fliffy is not in your collection")]
    NotOwned,
    #[error("listing no longer available")]
    UnknownListing,
}

/// Accrue income for `delta_ticks` ticks.
pub fn tick(state: &mut PlayerState, delta_ticks: u32) {
    if delta_ticks == 0 {
        return;
    }
    let seconds = delta_ticks as f64 / TICKS_PER_SECOND as f64;
    state.fliff_bucks += economy::income_per_second(state) * seconds;
}

/// Resolve a hunt's rarity from one uniform `roll`.
///
/// Walks Legendary → Common accumulating boosted chances and returns the
/// first tier whose running sum exceeds `roll`. Tables are not normalised;
/// when the sum never exceeds the roll the result is Common.
pub fn roll_hunt_rarity(location: &Location, rare_chance_level: u32, roll: f64) -> Rarity {
    let boost = rare_chance_level as f64 * RARE_CHANCE_PER_LEVEL;
    let mut cumulative = 0.0;
    for rarity in Rarity::ALL.iter().rev() {
        let tier_boost = if *rarity == Rarity::Common {
            -boost
        } else {
            boost / 4.0
        };
        cumulative += (location.base_chance(*rarity) * (1.0 + tier_boost)).max(0.0);
        if roll < cumulative {
            return *rarity;
        }
    }
    Rarity::Common
}

/// Pay for a hunt and catch a Fliffy. Returns the catch.
pub fn hunt(
    state: &mut PlayerState,
    catalog: &Catalog,
    location_id: &str,
    rng: &mut dyn RandomSource,
) -> Result<Fliffy, Rejection> {
    let location = catalog
        .location(location_id)
        .ok_or(Rejection::UnknownLocation)?;
    let cost = economy::hunt_cost(location, state);
    if state.fliff_bucks < cost {
        return Err(Rejection::InsufficientBucks);
    }

    state.fliff_bucks -= cost;
    if !state.is_unlocked(location_id) {
        state.unlocked_locations.push(location_id.to_string());
    }

    let rarity = roll_hunt_rarity(
        location,
        state.upgrade_level(UpgradeKind::RareFliffyChance),
        rng.next_f64(),
    );
    let fliffy = generate_fliffy(catalog, rng, Some(rarity));
    state.collected_fliffys.push(fliffy.clone());
    log::debug!("hunt at {} caught {} ({})", location_id, fliffy.id, rarity.name());
    Ok(fliffy)
}

/// Buy one level of a regular upgrade. Returns the new level.
pub fn buy_upgrade(state: &mut PlayerState, kind: UpgradeKind) -> Result<u32, Rejection> {
    let bucks = state.fliff_bucks;
    let upgrade = state
        .upgrades
        .iter_mut()
        .find(|u| u.id == kind)
        .ok_or(Rejection::UnknownUpgrade)?;
    if upgrade.is_maxed() {
        return Err(Rejection::MaxLevel);
    }
    let cost = upgrade.cost();
    if bucks < cost {
        return Err(Rejection::InsufficientBucks);
    }

    upgrade.level += 1;
    let level = upgrade.level;
    state.fliff_bucks -= cost;
    Ok(level)
}

/// Buy one level of a rebirth upgrade. Returns the new level.
///
/// Fluff Points are whole; a fractional cost is charged rounded up, which an
/// affordable purchase can always cover.
pub fn buy_rebirth_upgrade(
    state: &mut PlayerState,
    kind: RebirthUpgradeKind,
) -> Result<u32, Rejection> {
    let points = state.fluff_points;
    let upgrade = state
        .rebirth_upgrades
        .iter_mut()
        .find(|u| u.id == kind)
        .ok_or(Rejection::UnknownUpgrade)?;
    if upgrade.is_maxed() {
        return Err(Rejection::MaxLevel);
    }
    let cost = upgrade.cost();
    if (points as f64) < cost {
        return Err(Rejection::InsufficientPoints);
    }

    upgrade.level += 1;
    let level = upgrade.level;
    state.fluff_points = points.saturating_sub(cost.ceil() as u64);
    Ok(level)
}

/// Reset the run for Fluff Points. Returns the points earned.
pub fn rebirth(state: &mut PlayerState, catalog: &Catalog) -> Result<u64, Rejection> {
    let checks = economy::rebirth_checks(state);
    if !checks.can_rebirth {
        return Err(Rejection::RebirthLocked);
    }

    state.fluff_points += checks.points_to_gain;
    state.rebirth_count += 1;
    state.fliff_bucks = state.rebirth_upgrade_level(RebirthUpgradeKind::StartingFliffBucks) as f64
        * STARTING_BUCKS_PER_LEVEL;
    state.collected_fliffys.clear();
    for upgrade in &mut state.upgrades {
        upgrade.level = 0;
    }
    state.unlocked_locations = vec![catalog.default_location.to_string()];

    log::info!(
        "rebirth #{} for {} Fluff Points",
        state.rebirth_count,
        checks.points_to_gain
    );
    Ok(checks.points_to_gain)
}

/// Move an owned Fliffy onto the market. Returns the new listing id.
pub fn list_for_sale(
    state: &mut PlayerState,
    market: &mut Market,
    fliffy_id: &str,
    price: f64,
    rng: &mut dyn RandomSource,
) -> Result<String, Rejection> {
    // Also rejects NaN.
    if !(price > 0.0) {
        return Err(Rejection::InvalidPrice);
    }
    let idx = state
        .collected_fliffys
        .iter()
        .position(|f| f.id == fliffy_id)
        .ok_or(Rejection::NotOwned)?;

    let fliffy = state.collected_fliffys.remove(idx);
    let listing_id = rng.next_id();
    market.listings.insert(
        0,
        TradeListing {
            listing_id: listing_id.clone(),
            fliffy,
            price,
        },
    );
    Ok(listing_id)
}

/// Buy a listing into the collection. Returns the purchased Fliffy.
pub fn buy_listing(
    state: &mut PlayerState,
    market: &mut Market,
    listing_id: &str,
) -> Result<Fliffy, Rejection> {
    let idx = market
        .listings
        .iter()
        .position(|l| l.listing_id == listing_id)
        .ok_or(Rejection::UnknownListing)?;
    if state.fliff_bucks < market.listings[idx].price {
        return Err(Rejection::InsufficientBucks);
    }

    let listing = market.listings.remove(idx);
    state.fliff_bucks -= listing.price;
    state.collected_fliffys.push(listing.fliffy.clone());
    Ok(listing.fliffy)
}

/// Apply a minigame result. A loss never takes the balance below zero.
/// Returns the signed change actually applied.
pub fn resolve_minigame(state: &mut PlayerState, won: bool, amount: f64) -> f64 {
    let before = state.fliff_bucks;
    if won {
        state.fliff_bucks += amount.max(0.0);
    } else {
        state.fliff_bucks = (state.fliff_bucks - amount.max(0.0)).max(0.0);
    }
    state.fliff_bucks - before
}

/// Compact number display: `999.00`, `1.50K`, `2.25M`, `3.00B`, `4.10T`.
pub fn format_number(n: f64) -> String {
    if n < 0.0 {
        return format!("-{}", format_number(-n));
    }
    if n < 1e3 {
        format!("{:.2}", n)
    } else if n < 1e6 {
        format!("{:.2}K", n / 1e3)
    } else if n < 1e9 {
        format!("{:.2}M", n / 1e6)
    } else if n < 1e12 {
        format!("{:.2}B", n / 1e9)
    } else {
        format!("{:.2}T", n / 1e12)
    }
}

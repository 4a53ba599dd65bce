//! Derived quantities. Everything here is a pure read of the state.

use super::state::{
    Location, PlayerState, Rarity, RebirthUpgradeKind, Upgrade, UpgradeKind,
};

/// Fliff Bucks needed for the first rebirth.
pub const BASE_REBIRTH_REQUIREMENT: f64 = 1_000_000.0;

/// Requirement growth per completed rebirth.
pub const REBIRTH_REQUIREMENT_GROWTH: f64 = 100.0;

/// Minimum owned rarity per rebirth cycle; the last entry repeats.
const REQUIRED_RARITIES: [Rarity; 3] = [Rarity::Rare, Rarity::Epic, Rarity::Legendary];

/// Seconds of income paid out by a minigame win.
pub const MINIGAME_REWARD_SECONDS: f64 = 60.0;

/// Multiplier from permanent rebirth upgrades.
pub fn permanent_income_multiplier(state: &PlayerState) -> f64 {
    1.0 + state.rebirth_upgrade_level(RebirthUpgradeKind::PermanentIncomeBoost) as f64 * 0.25
}

/// Fliff Bucks per second from the whole collection.
pub fn income_per_second(state: &PlayerState) -> f64 {
    let base: f64 = state.collected_fliffys.iter().map(|f| f.income).sum();
    let upgrade_mult = 1.0 + state.upgrade_level(UpgradeKind::IncomeMultiplier) as f64 * 0.1;
    base * upgrade_mult * permanent_income_multiplier(state)
}

/// Price of one hunt after the cost-reduction upgrade.
pub fn hunt_cost(location: &Location, state: &PlayerState) -> f64 {
    let reduction = state.upgrade_level(UpgradeKind::HuntCostReduction) as f64 * 0.05;
    location.cost * (1.0 - reduction)
}

/// Fluff Points a rebirth at `fliff_bucks` would pay out.
pub fn rebirth_points_to_gain(
    fliff_bucks: f64,
    rebirth_upgrades: &[Upgrade<RebirthUpgradeKind>],
) -> u64 {
    let points = (fliff_bucks + 1.0).log10().powi(2).floor();
    let level = rebirth_upgrades
        .iter()
        .find(|u| u.id == RebirthUpgradeKind::FluffPointGain)
        .map_or(0, |u| u.level);
    let multiplier = 1.0 + level as f64 * 0.1;
    (points * multiplier).floor().max(0.0) as u64
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RebirthRequirements {
    pub fliff_bucks: f64,
    pub rarity: Rarity,
}

pub fn rebirth_requirements(rebirth_count: u32) -> RebirthRequirements {
    let idx = (rebirth_count as usize).min(REQUIRED_RARITIES.len() - 1);
    RebirthRequirements {
        fliff_bucks: BASE_REBIRTH_REQUIREMENT
            * REBIRTH_REQUIREMENT_GROWTH.powi(rebirth_count.min(i32::MAX as u32) as i32),
        rarity: REQUIRED_RARITIES[idx],
    }
}

/// Individual rebirth gates, for the confirmation view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RebirthChecks {
    pub requirements: RebirthRequirements,
    pub has_enough_bucks: bool,
    pub has_required_rarity: bool,
    pub points_to_gain: u64,
    pub can_rebirth: bool,
}

pub fn rebirth_checks(state: &PlayerState) -> RebirthChecks {
    let requirements = rebirth_requirements(state.rebirth_count);
    let has_enough_bucks = state.fliff_bucks >= requirements.fliff_bucks;
    let has_required_rarity = state
        .collected_fliffys
        .iter()
        .any(|f| f.rarity >= requirements.rarity);
    let points_to_gain = rebirth_points_to_gain(state.fliff_bucks, &state.rebirth_upgrades);
    RebirthChecks {
        requirements,
        has_enough_bucks,
        has_required_rarity,
        points_to_gain,
        can_rebirth: has_enough_bucks && has_required_rarity && points_to_gain > 0,
    }
}

pub fn can_rebirth(state: &PlayerState) -> bool {
    rebirth_checks(state).can_rebirth
}

/// Prize for winning the minigame at the current income.
pub fn minigame_reward(state: &PlayerState) -> f64 {
    income_per_second(state) * MINIGAME_REWARD_SECONDS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fliffy::catalog::Catalog;
    use crate::fliffy::state::Fliffy;
    use proptest::prelude::*;

    fn fliffy(rarity: Rarity, income: f64) -> Fliffy {
        let catalog = Catalog::builtin();
        Fliffy {
            id: format!("{:?}-{}", rarity, income),
            color: catalog.colors[0].clone(),
            pattern: catalog.patterns[0].clone(),
            rarity,
            income,
        }
    }

    fn set_level(state: &mut PlayerState, kind: UpgradeKind, level: u32) {
        state.upgrades.iter_mut().find(|u| u.id == kind).unwrap().level = level;
    }

    fn set_rebirth_level(state: &mut PlayerState, kind: RebirthUpgradeKind, level: u32) {
        state
            .rebirth_upgrades
            .iter_mut()
            .find(|u| u.id == kind)
            .unwrap()
            .level = level;
    }

    #[test]
    fn income_sums_collection() {
        let mut state = PlayerState::new(&Catalog::builtin());
        state.collected_fliffys.push(fliffy(Rarity::Common, 1.5));
        state.collected_fliffys.push(fliffy(Rarity::Rare, 12.0));
        assert!((income_per_second(&state) - 13.5).abs() < 1e-9);
    }

    #[test]
    fn income_applies_both_multipliers() {
        let mut state = PlayerState::new(&Catalog::builtin());
        state.collected_fliffys.push(fliffy(Rarity::Common, 10.0));
        set_level(&mut state, UpgradeKind::IncomeMultiplier, 5);
        set_rebirth_level(&mut state, RebirthUpgradeKind::PermanentIncomeBoost, 2);
        // 10 * 1.5 * 1.5
        assert!((income_per_second(&state) - 22.5).abs() < 1e-9);
    }

    #[test]
    fn empty_collection_earns_nothing() {
        let state = PlayerState::new(&Catalog::builtin());
        assert_eq!(income_per_second(&state), 0.0);
        assert_eq!(minigame_reward(&state), 0.0);
    }

    #[test]
    fn hunt_cost_reduced_five_percent_per_level() {
        let catalog = Catalog::builtin();
        let mut state = PlayerState::new(&catalog);
        let forest = catalog.location("forest").unwrap();
        assert!((hunt_cost(forest, &state) - 500.0).abs() < 1e-9);
        set_level(&mut state, UpgradeKind::HuntCostReduction, 4);
        assert!((hunt_cost(forest, &state) - 400.0).abs() < 1e-9);
    }

    #[test]
    fn rebirth_points_from_log_squared() {
        let catalog = Catalog::builtin();
        // log10(1e6 + 1)² ≈ 36.0000017 → 36
        assert_eq!(rebirth_points_to_gain(1_000_000.0, &catalog.rebirth_upgrades), 36);
        assert_eq!(rebirth_points_to_gain(0.0, &catalog.rebirth_upgrades), 0);
        // log10(10)² = 1
        assert_eq!(rebirth_points_to_gain(9.0, &catalog.rebirth_upgrades), 1);
    }

    #[test]
    fn rebirth_points_scale_with_gain_upgrade() {
        let mut state = PlayerState::new(&Catalog::builtin());
        set_rebirth_level(&mut state, RebirthUpgradeKind::FluffPointGain, 5);
        // 36 * 1.5 = 54
        assert_eq!(rebirth_points_to_gain(1_000_000.0, &state.rebirth_upgrades), 54);
    }

    #[test]
    fn requirements_escalate_per_cycle() {
        assert_eq!(
            rebirth_requirements(0),
            RebirthRequirements { fliff_bucks: 1e6, rarity: Rarity::Rare }
        );
        assert_eq!(
            rebirth_requirements(1),
            RebirthRequirements { fliff_bucks: 1e8, rarity: Rarity::Epic }
        );
        assert_eq!(rebirth_requirements(2).rarity, Rarity::Legendary);
        assert_eq!(rebirth_requirements(7).rarity, Rarity::Legendary);
        assert!((rebirth_requirements(3).fliff_bucks - 1e12).abs() < 1.0);
    }

    #[test]
    fn one_buck_short_blocks_rebirth() {
        let mut state = PlayerState::new(&Catalog::builtin());
        state.collected_fliffys.push(fliffy(Rarity::Legendary, 1.0));
        state.fliff_bucks = 999_999.0;
        let checks = rebirth_checks(&state);
        assert!(!checks.has_enough_bucks);
        assert!(checks.has_required_rarity);
        assert!(!checks.can_rebirth);
    }

    #[test]
    fn rarity_gate_accepts_higher_tiers() {
        let mut state = PlayerState::new(&Catalog::builtin());
        state.fliff_bucks = 2_000_000.0;
        state.collected_fliffys.push(fliffy(Rarity::Uncommon, 1.0));
        assert!(!can_rebirth(&state));
        state.collected_fliffys.push(fliffy(Rarity::Epic, 1.0));
        assert!(can_rebirth(&state));
    }

    proptest! {
        #[test]
        fn prop_rebirth_points_monotonic(a in 0.0f64..1e15, b in 0.0f64..1e15) {
            let catalog = Catalog::builtin();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(
                rebirth_points_to_gain(lo, &catalog.rebirth_upgrades)
                    <= rebirth_points_to_gain(hi, &catalog.rebirth_upgrades)
            );
        }

        #[test]
        fn prop_hunt_cost_never_negative(level in 0u32..=10, idx in 0usize..5) {
            let catalog = Catalog::builtin();
            let mut state = PlayerState::new(&catalog);
            set_level(&mut state, UpgradeKind::HuntCostReduction, level);
            prop_assert!(hunt_cost(&catalog.locations[idx], &state) >= 0.0);
        }
    }
}

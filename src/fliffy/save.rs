//! Save snapshots, offline catch-up and browser storage.
//!
//! The stored record is a flat camelCase JSON object. Every field is optional
//! on load: missing values fall back to a fresh game, unknown upgrade ids are
//! ignored and levels are clamped to the catalog's caps.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use super::catalog::Catalog;
use super::economy;
use super::state::{Fliffy, PlayerState, Upgrade};

/// localStorage key.
pub const SAVE_KEY: &str = "fliffyCollectorSave";

/// Offline earnings at or below this are applied silently.
const OFFLINE_REPORT_THRESHOLD: f64 = 1.0;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save data is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("save data has no numeric fliffBucks")]
    MissingCurrency,
    #[error("could not serialise save: {0}")]
    Serialize(serde_json::Error),
    #[error("browser storage is unavailable")]
    StorageUnavailable,
    #[error("could not write save: {0}")]
    Write(String),
}

/// Persisted form of [`PlayerState`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Snapshot {
    pub fliff_bucks: f64,
    #[serde(deserialize_with = "whole_number")]
    pub fluff_points: u64,
    #[serde(deserialize_with = "whole_number")]
    pub rebirth_count: u64,
    pub collected_fliffys: Vec<Fliffy>,
    pub unlocked_locations: Vec<String>,
    pub upgrade_levels: BTreeMap<String, u32>,
    pub rebirth_upgrade_levels: BTreeMap<String, u32>,
    /// Epoch milliseconds.
    pub last_save_time: Option<f64>,
}

/// Accepts any JSON number; negatives clamp to 0, fractions are dropped.
fn whole_number<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    let v = f64::deserialize(d)?;
    Ok(if v.is_finite() { v.max(0.0).floor() as u64 } else { 0 })
}

/// Result of restoring a snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedGame {
    /// State with offline earnings already credited.
    pub state: PlayerState,
    /// Offline earnings worth telling the player about.
    pub offline_earnings: Option<f64>,
}

/// Income accrued over `elapsed_secs` of absence. Never negative.
pub fn offline_earnings(state: &PlayerState, elapsed_secs: f64) -> f64 {
    if !(elapsed_secs > 0.0) {
        return 0.0;
    }
    (economy::income_per_second(state) * elapsed_secs).max(0.0)
}

pub fn snapshot(state: &PlayerState, now_ms: f64) -> Snapshot {
    Snapshot {
        fliff_bucks: state.fliff_bucks,
        fluff_points: state.fluff_points,
        rebirth_count: state.rebirth_count as u64,
        collected_fliffys: state.collected_fliffys.clone(),
        unlocked_locations: state.unlocked_locations.clone(),
        upgrade_levels: state
            .upgrades
            .iter()
            .map(|u| (u.id.id().to_string(), u.level))
            .collect(),
        rebirth_upgrade_levels: state
            .rebirth_upgrades
            .iter()
            .map(|u| (u.id.id().to_string(), u.level))
            .collect(),
        last_save_time: Some(now_ms),
    }
}

/// Serialised snapshot, ready for storage.
pub fn encode(state: &PlayerState, now_ms: f64) -> Result<String, SaveError> {
    serde_json::to_string(&snapshot(state, now_ms)).map_err(SaveError::Serialize)
}

fn merge_levels<K>(
    templates: &[Upgrade<K>],
    levels: &BTreeMap<String, u32>,
    id: impl Fn(&K) -> &'static str,
) -> Vec<Upgrade<K>>
where
    K: Clone,
{
    templates
        .iter()
        .map(|t| {
            let mut u = t.clone();
            u.level = levels
                .get(id(&t.id))
                .copied()
                .unwrap_or(0)
                .min(t.max_level);
            u
        })
        .collect()
}

/// Rebuild a session from a snapshot taken at `lastSaveTime`.
pub fn restore(snapshot: Snapshot, catalog: &Catalog, now_ms: f64) -> LoadedGame {
    let mut unlocked = snapshot.unlocked_locations;
    if !unlocked.iter().any(|id| id == catalog.default_location) {
        unlocked.insert(0, catalog.default_location.to_string());
    }

    let mut state = PlayerState {
        fliff_bucks: if snapshot.fliff_bucks.is_finite() {
            snapshot.fliff_bucks
        } else {
            0.0
        },
        fluff_points: snapshot.fluff_points,
        rebirth_count: snapshot.rebirth_count.min(u32::MAX as u64) as u32,
        collected_fliffys: snapshot.collected_fliffys,
        upgrades: merge_levels(&catalog.upgrades, &snapshot.upgrade_levels, |k| k.id()),
        rebirth_upgrades: merge_levels(
            &catalog.rebirth_upgrades,
            &snapshot.rebirth_upgrade_levels,
            |k| k.id(),
        ),
        unlocked_locations: unlocked,
    };

    let last_save = snapshot.last_save_time.unwrap_or(now_ms);
    let earned = offline_earnings(&state, (now_ms - last_save) / 1000.0);
    state.fliff_bucks += earned;

    LoadedGame {
        state,
        offline_earnings: (earned > OFFLINE_REPORT_THRESHOLD).then_some(earned),
    }
}

/// Parse and restore a stored record.
pub fn load(raw: &str, catalog: &Catalog, now_ms: f64) -> Result<LoadedGame, SaveError> {
    let snapshot: Snapshot = serde_json::from_str(raw)?;
    Ok(restore(snapshot, catalog, now_ms))
}

/// Check pasted save text before it replaces the stored record.
pub fn validate_import(raw: &str) -> Result<Snapshot, SaveError> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    if !value.get("fliffBucks").is_some_and(|v| v.is_number()) {
        return Err(SaveError::MissingCurrency);
    }
    Ok(serde_json::from_value(value)?)
}

// ── Storage ────────────────────────────────────────────────────

/// Where the single save record lives.
pub trait SaveStore {
    fn read(&self) -> Option<String>;
    fn write(&mut self, raw: &str) -> Result<(), SaveError>;
    fn remove(&mut self);
}

/// Serialise `state` into `store`.
pub fn save(store: &mut dyn SaveStore, state: &PlayerState, now_ms: f64) -> Result<(), SaveError> {
    let raw = encode(state, now_ms)?;
    store.write(&raw)
}

/// Validate `raw` and store it verbatim. The existing record survives a rejection.
pub fn import_raw(store: &mut dyn SaveStore, raw: &str) -> Result<Snapshot, SaveError> {
    let snapshot = validate_import(raw)?;
    store.write(raw)?;
    Ok(snapshot)
}

/// The stored record exactly as written.
pub fn export_raw(store: &dyn SaveStore) -> Option<String> {
    store.read()
}

/// In-memory store for hosts without browser storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    raw: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SaveStore for MemoryStore {
    fn read(&self) -> Option<String> {
        self.raw.clone()
    }

    fn write(&mut self, raw: &str) -> Result<(), SaveError> {
        self.raw = Some(raw.to_string());
        Ok(())
    }

    fn remove(&mut self) {
        self.raw = None;
    }
}

/// `window.localStorage` under [`SAVE_KEY`].
#[cfg(target_arch = "wasm32")]
pub struct LocalStorage;

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }
}

#[cfg(target_arch = "wasm32")]
impl SaveStore for LocalStorage {
    fn read(&self) -> Option<String> {
        Self::storage()?.get_item(SAVE_KEY).ok()?
    }

    fn write(&mut self, raw: &str) -> Result<(), SaveError> {
        let storage = Self::storage().ok_or(SaveError::StorageUnavailable)?;
        storage
            .set_item(SAVE_KEY, raw)
            .map_err(|e| SaveError::Write(format!("{e:?}")))
    }

    fn remove(&mut self) {
        if let Some(storage) = Self::storage() {
            let _ = storage.remove_item(SAVE_KEY);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fliffy::random::{generate_fliffy, RngSource, ScriptedSource};
    use crate::fliffy::state::{Rarity, RebirthUpgradeKind, UpgradeKind};
    use proptest::prelude::*;

    fn played_state(catalog: &Catalog) -> PlayerState {
        let mut rng = RngSource::seeded(11);
        let mut state = PlayerState::new(catalog);
        state.fliff_bucks = 12_345.678_9;
        state.fluff_points = 42;
        state.rebirth_count = 2;
        for _ in 0..5 {
            state.collected_fliffys.push(generate_fliffy(catalog, &mut rng, None));
        }
        state.upgrades[0].level = 7;
        state.upgrades[2].level = 3;
        state.rebirth_upgrades[1].level = 4;
        state.unlocked_locations.push("forest".into());
        state
    }

    #[test]
    fn snapshot_uses_wire_names() {
        let catalog = Catalog::builtin();
        let raw = encode(&played_state(&catalog), 1_000.0).unwrap();
        for key in [
            "\"fliffBucks\"",
            "\"fluffPoints\"",
            "\"rebirthCount\"",
            "\"collectedFliffys\"",
            "\"unlockedLocations\"",
            "\"upgradeLevels\"",
            "\"rebirthUpgradeLevels\"",
            "\"lastSaveTime\"",
            "\"INCOME_MULTIPLIER\":7",
            "\"STARTING_FLIFF_BUCKS\":4",
        ] {
            assert!(raw.contains(key), "missing {key} in {raw}");
        }
    }

    #[test]
    fn save_then_load_at_same_instant_is_identity() {
        let catalog = Catalog::builtin();
        let state = played_state(&catalog);
        let raw = encode(&state, 5_000.0).unwrap();
        let loaded = load(&raw, &catalog, 5_000.0).unwrap();
        assert_eq!(loaded.state, state);
        assert_eq!(loaded.offline_earnings, None);
    }

    #[test]
    fn offline_earnings_credited_and_reported() {
        let catalog = Catalog::builtin();
        let mut state = PlayerState::new(&catalog);
        let mut rng = ScriptedSource::new(&[0.0]);
        state.collected_fliffys.push(generate_fliffy(&catalog, &mut rng, Some(Rarity::Common)));
        let raw = encode(&state, 0.0).unwrap();

        // 1 per second for 60 seconds
        let loaded = load(&raw, &catalog, 60_000.0).unwrap();
        assert!((loaded.state.fliff_bucks - 60.0).abs() < 1e-9);
        assert!((loaded.offline_earnings.unwrap() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn small_offline_earnings_not_reported() {
        let catalog = Catalog::builtin();
        let mut state = PlayerState::new(&catalog);
        let mut rng = ScriptedSource::new(&[0.0]);
        state.collected_fliffys.push(generate_fliffy(&catalog, &mut rng, Some(Rarity::Common)));
        let raw = encode(&state, 0.0).unwrap();

        let loaded = load(&raw, &catalog, 500.0).unwrap();
        assert!((loaded.state.fliff_bucks - 0.5).abs() < 1e-9);
        assert_eq!(loaded.offline_earnings, None);
    }

    #[test]
    fn clock_going_backwards_earns_nothing() {
        let catalog = Catalog::builtin();
        let mut state = played_state(&catalog);
        state.fliff_bucks = 10.0;
        let raw = encode(&state, 100_000.0).unwrap();
        let loaded = load(&raw, &catalog, 0.0).unwrap();
        assert_eq!(loaded.state.fliff_bucks, 10.0);
        assert_eq!(offline_earnings(&state, -5.0), 0.0);
    }

    #[test]
    fn empty_object_loads_fresh_game() {
        let catalog = Catalog::builtin();
        let loaded = load("{}", &catalog, 1_000.0).unwrap();
        assert_eq!(loaded.state, PlayerState::new(&catalog));
        assert_eq!(loaded.offline_earnings, None);
    }

    #[test]
    fn levels_merge_with_catalog() {
        let catalog = Catalog::builtin();
        let raw = r#"{
            "fliffBucks": 5,
            "upgradeLevels": { "HUNT_COST_REDUCTION": 99, "SOMETHING_ELSE": 3 },
            "rebirthUpgradeLevels": { "FLUFF_POINT_GAIN": 2 }
        }"#;
        let state = load(raw, &catalog, 0.0).unwrap().state;
        assert_eq!(state.upgrade_level(UpgradeKind::IncomeMultiplier), 0);
        // clamped to max level 10
        assert_eq!(state.upgrade_level(UpgradeKind::HuntCostReduction), 10);
        assert_eq!(state.upgrades.len(), catalog.upgrades.len());
        assert_eq!(state.rebirth_upgrade_level(RebirthUpgradeKind::FluffPointGain), 2);
    }

    #[test]
    fn default_location_always_unlocked() {
        let catalog = Catalog::builtin();
        let raw = r#"{ "fliffBucks": 0, "unlockedLocations": ["caves"] }"#;
        let state = load(raw, &catalog, 0.0).unwrap().state;
        assert!(state.is_unlocked("meadow"));
        assert!(state.is_unlocked("caves"));
    }

    #[test]
    fn fractional_fluff_points_floored() {
        let catalog = Catalog::builtin();
        let raw = r#"{ "fliffBucks": 0, "fluffPoints": 12.7, "rebirthCount": 1 }"#;
        let state = load(raw, &catalog, 0.0).unwrap().state;
        assert_eq!(state.fluff_points, 12);
        assert_eq!(state.rebirth_count, 1);
    }

    #[test]
    fn import_requires_numeric_currency() {
        assert!(matches!(validate_import("not json"), Err(SaveError::Parse(_))));
        assert!(matches!(
            validate_import(r#"{"fliffBucks":"lots"}"#),
            Err(SaveError::MissingCurrency)
        ));
        assert!(matches!(
            validate_import(r#"{"fluffPoints":3}"#),
            Err(SaveError::MissingCurrency)
        ));
        assert!(matches!(validate_import("[1,2]"), Err(SaveError::MissingCurrency)));
        assert!(validate_import(r#"{"fliffBucks":3.5}"#).is_ok());
    }

    #[test]
    fn import_rejects_malformed_collection() {
        let raw = r#"{"fliffBucks":1,"collectedFliffys":[{"id":7}]}"#;
        assert!(matches!(validate_import(raw), Err(SaveError::Parse(_))));
    }

    #[test]
    fn rejected_import_keeps_stored_record() {
        let catalog = Catalog::builtin();
        let mut store = MemoryStore::new();
        save(&mut store, &played_state(&catalog), 0.0).unwrap();
        let before = export_raw(&store);

        assert!(import_raw(&mut store, r#"{"fliffBucks":null}"#).is_err());
        assert_eq!(export_raw(&store), before);
    }

    #[test]
    fn accepted_import_stored_verbatim() {
        let mut store = MemoryStore::new();
        let raw = r#"{"fliffBucks": 250, "fluffPoints": 1}"#;
        let snapshot = import_raw(&mut store, raw).unwrap();
        assert_eq!(snapshot.fliff_bucks, 250.0);
        assert_eq!(export_raw(&store).as_deref(), Some(raw));
    }

    #[test]
    fn wipe_removes_record() {
        let mut store = MemoryStore::new();
        store.write("{}").unwrap();
        store.remove();
        assert_eq!(export_raw(&store), None);
    }

    proptest! {
        #[test]
        fn prop_offline_earnings_monotonic(a in 0.0f64..1e7, b in 0.0f64..1e7, seed in any::<u64>()) {
            let catalog = Catalog::builtin();
            let mut rng = RngSource::seeded(seed);
            let mut state = PlayerState::new(&catalog);
            state.collected_fliffys.push(generate_fliffy(&catalog, &mut rng, None));
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(offline_earnings(&state, lo) <= offline_earnings(&state, hi));
        }

        #[test]
        fn prop_roundtrip_preserves_state(seed in any::<u64>(), bucks in 0.0f64..1e12, points in 0u64..1_000_000) {
            let catalog = Catalog::builtin();
            let mut rng = RngSource::seeded(seed);
            let mut state = PlayerState::new(&catalog);
            state.fliff_bucks = bucks;
            state.fluff_points = points;
            for _ in 0..3 {
                state.collected_fliffys.push(generate_fliffy(&catalog, &mut rng, None));
            }
            let raw = encode(&state, 42.0).unwrap();
            let loaded = load(&raw, &catalog, 42.0).unwrap();
            prop_assert_eq!(loaded.state, state);
        }
    }
}

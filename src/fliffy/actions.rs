//! Semantic action IDs for Fliffy Collector click targets.
//!
//! Registered during render and dispatched via `InputEvent::Click`.

// ── Tab navigation ──────────────────────────────────────────────
pub const TAB_COLLECTION: u16 = 10;
pub const TAB_HUNT: u16 = 11;
pub const TAB_UPGRADES: u16 = 12;
pub const TAB_MARKET: u16 = 13;
pub const TAB_REBIRTH: u16 = 14;

// ── Hunting (base + location index) ─────────────────────────────
pub const HUNT_BASE: u16 = 100;

// ── Upgrades (base + upgrade index) ─────────────────────────────
pub const BUY_UPGRADE_BASE: u16 = 200;
pub const BUY_REBIRTH_UPGRADE_BASE: u16 = 250;

// ── Collection: pick a Fliffy to sell (base + collection index) ─
pub const SELECT_FLIFFY_BASE: u16 = 1000;
pub const COLLECTION_SCROLL_UP: u16 = 300;
pub const COLLECTION_SCROLL_DOWN: u16 = 301;

/// Click id for the Fliffy at `index` in the collection, if one fits.
pub fn select_fliffy_action(index: usize) -> Option<u16> {
    u16::try_from(index)
        .ok()
        .and_then(|i| SELECT_FLIFFY_BASE.checked_add(i))
}

// ── Market: buy a listing (base + listing index) ────────────────
pub const BUY_LISTING_BASE: u16 = 400;

// ── Rebirth ─────────────────────────────────────────────────────
pub const OPEN_REBIRTH: u16 = 500;
pub const CONFIRM_REBIRTH: u16 = 501;

// ── Overlays ────────────────────────────────────────────────────
pub const CLOSE_OVERLAY: u16 = 600;
pub const SELL_CONFIRM: u16 = 601;
pub const SELL_PRICE_DIGIT_BASE: u16 = 610;
pub const SELL_PRICE_BACKSPACE: u16 = 620;

// ── Minigame ────────────────────────────────────────────────────
pub const START_MINIGAME: u16 = 700;
pub const MINIGAME_UP: u16 = 701;
pub const MINIGAME_DOWN: u16 = 702;
pub const MINIGAME_LEFT: u16 = 703;
pub const MINIGAME_RIGHT: u16 = 704;

// ── Settings ────────────────────────────────────────────────────
pub const OPEN_SETTINGS: u16 = 800;
pub const MANUAL_SAVE: u16 = 801;
pub const EXPORT_SAVE: u16 = 802;
pub const IMPORT_SAVE: u16 = 803;
pub const WIPE_SAVE: u16 = 804;

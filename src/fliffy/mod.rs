//! Fliffy Collector: catch fluffy creatures, earn from them and trade them.
//!
//! [`FliffyGame`] owns the whole session: player state, market, overlays and
//! the periodic jobs. Input arrives as [`InputEvent`]s; anything that needs the
//! browser (clipboard, prompt, confirm) is handed back as a [`HostRequest`].

pub mod actions;
pub mod catalog;
pub mod economy;
pub mod logic;
pub mod market;
pub mod minigame;
pub mod random;
pub mod render;
pub mod save;
pub mod state;

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::Frame;

use crate::input::{ClickState, InputEvent, KEY_BACKSPACE, KEY_ENTER, KEY_ESC};
use crate::time::Interval;

use actions::*;
use catalog::Catalog;
use logic::format_number;
use minigame::{Direction, Minigame, MinigameOutcome};
use random::RandomSource;
use save::SaveStore;
use state::{Fliffy, LogEntry, Market, PlayerState, RebirthUpgradeKind, UpgradeKind};

/// Autosave period: 5s.
pub const AUTOSAVE_INTERVAL: u64 = 50;
/// Market simulator period: 20s.
pub const MARKET_INTERVAL: u64 = 200;
/// First minigame offer: 30s.
pub const MINIGAME_FIRST_DELAY: u64 = 300;
/// Later minigame offers: 3 minutes.
pub const MINIGAME_INTERVAL: u64 = 1_800;

const LOG_CAPACITY: usize = 50;
const MAX_PRICE_DIGITS: usize = 12;
/// Collection rows shown per page.
pub const COLLECTION_PAGE: usize = 9;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tab {
    Collection,
    Hunt,
    Upgrades,
    Market,
    Rebirth,
}

/// Modal views drawn over the tabs. Only one is open at a time.
#[derive(Clone, Debug)]
pub enum Overlay {
    Caught(Fliffy),
    Sell {
        fliffy_id: String,
        price_input: String,
    },
    RebirthConfirm,
    /// Offline earnings credited on load.
    Welcome(f64),
    Minigame(Minigame),
    Settings,
}

impl Overlay {
    /// Whether a minigame offer should wait for this overlay to close.
    pub fn blocks_minigame(&self) -> bool {
        !matches!(self, Overlay::Settings)
    }
}

/// Work the game needs the browser host to do.
#[derive(Clone, Debug, PartialEq)]
pub enum HostRequest {
    /// Put the exported save on the clipboard.
    CopyToClipboard(String),
    /// Ask for save text, then call [`FliffyGame::import_save`].
    PromptImport,
    /// Ask for confirmation, then call [`FliffyGame::wipe_save`].
    ConfirmWipe,
}

pub struct FliffyGame {
    pub catalog: Catalog,
    pub state: PlayerState,
    pub market: Market,
    pub tab: Tab,
    pub overlay: Option<Overlay>,
    pub log: Vec<LogEntry>,
    pub minigame_available: bool,
    /// First collection row shown.
    pub collection_scroll: usize,
    ticks: u64,
    autosave: Interval,
    market_timer: Interval,
    minigame_timer: Interval,
    rng: Box<dyn RandomSource>,
    store: Box<dyn SaveStore>,
    host_request: Option<HostRequest>,
}

impl FliffyGame {
    /// Start a session from whatever `store` holds.
    pub fn new(store: Box<dyn SaveStore>, mut rng: Box<dyn RandomSource>, now_ms: f64) -> Self {
        let catalog = Catalog::builtin();
        let market = market::seed_market(&catalog, rng.as_mut());
        let mut game = Self {
            state: PlayerState::new(&catalog),
            catalog,
            market,
            tab: Tab::Collection,
            overlay: None,
            log: Vec::new(),
            minigame_available: false,
            collection_scroll: 0,
            ticks: 0,
            autosave: Interval::every(AUTOSAVE_INTERVAL),
            market_timer: Interval::every(MARKET_INTERVAL),
            minigame_timer: Interval::starting_at(MINIGAME_FIRST_DELAY, MINIGAME_INTERVAL),
            rng,
            store,
            host_request: None,
        };

        match game.store.read() {
            Some(raw) => match save::load(&raw, &game.catalog, now_ms) {
                Ok(loaded) => {
                    game.apply_loaded(loaded);
                    game.add_log("Welcome back!", false);
                }
                Err(e) => {
                    log::warn!("ignoring unreadable save: {e}");
                    game.add_log("Save data could not be read. Starting fresh.", true);
                }
            },
            None => game.add_log("Welcome to Fliffy Collector! Go hunting to catch your first Fliffy.", true),
        }
        game
    }

    fn apply_loaded(&mut self, loaded: save::LoadedGame) {
        self.state = loaded.state;
        self.overlay = loaded.offline_earnings.map(Overlay::Welcome);
        self.collection_scroll = 0;
        if let Some(earned) = loaded.offline_earnings {
            log::info!("credited {earned} offline Fliff Bucks");
        }
    }

    pub fn add_log(&mut self, text: &str, is_important: bool) {
        self.log.push(LogEntry {
            text: text.to_string(),
            is_important,
        });
        if self.log.len() > LOG_CAPACITY {
            self.log.remove(0);
        }
    }

    /// Pending browser work, if any. Cleared on read.
    pub fn take_host_request(&mut self) -> Option<HostRequest> {
        self.host_request.take()
    }

    // ── Periodic jobs ──────────────────────────────────────────

    /// Advance `delta_ticks` ticks. `now_ms` is wall-clock epoch time for saves.
    pub fn tick(&mut self, delta_ticks: u32, now_ms: f64) {
        for _ in 0..delta_ticks {
            self.ticks += 1;
            logic::tick(&mut self.state, 1);

            if self.autosave.due(self.ticks) {
                self.save_quietly(now_ms);
            }
            if self.market_timer.due(self.ticks) {
                market::market_tick(&mut self.market, &self.catalog, self.rng.as_mut());
            }
            if self.minigame_timer.due(self.ticks) && !self.overlay_blocks_minigame() {
                self.minigame_available = true;
            }
        }

        let outcome = match &mut self.overlay {
            Some(Overlay::Minigame(game)) => game.tick(delta_ticks),
            _ => None,
        };
        if let Some(outcome) = outcome {
            self.overlay = None;
            self.settle_minigame(outcome);
        }
    }

    fn settle_minigame(&mut self, outcome: MinigameOutcome) {
        let applied = logic::resolve_minigame(&mut self.state, outcome.won, outcome.amount);
        if outcome.won {
            self.add_log(&format!("Minigame won! +{}!", format_number(applied)), true);
        } else {
            self.add_log(&format!("Minigame lost! -{}.", format_number(-applied)), false);
        }
    }

    fn overlay_blocks_minigame(&self) -> bool {
        self.overlay.as_ref().is_some_and(Overlay::blocks_minigame)
    }

    // ── Persistence ────────────────────────────────────────────

    /// Autosave and teardown path: failures are logged, never surfaced.
    pub fn save_quietly(&mut self, now_ms: f64) {
        if let Err(e) = save::save(self.store.as_mut(), &self.state, now_ms) {
            log::warn!("autosave failed: {e}");
        }
    }

    fn manual_save(&mut self, now_ms: f64) {
        match save::save(self.store.as_mut(), &self.state, now_ms) {
            Ok(()) => self.add_log("Game Saved!", false),
            Err(e) => {
                log::warn!("manual save failed: {e}");
                self.add_log("Save failed!", true);
            }
        }
    }

    fn export_save(&mut self) {
        match save::export_raw(self.store.as_ref()) {
            Some(raw) => self.host_request = Some(HostRequest::CopyToClipboard(raw)),
            None => self.add_log("No save data found to export.", true),
        }
    }

    /// Replace the stored record with `raw` and reload from it.
    pub fn import_save(&mut self, raw: &str, now_ms: f64) {
        match save::import_raw(self.store.as_mut(), raw) {
            Ok(snapshot) => {
                let loaded = save::restore(snapshot, &self.catalog, now_ms);
                self.restart_session();
                self.apply_loaded(loaded);
                self.add_log("Save imported successfully!", true);
            }
            Err(e) => {
                log::warn!("rejected import: {e}");
                self.add_log("Invalid save data!", true);
            }
        }
    }

    /// Drop the stored record and start over.
    pub fn wipe_save(&mut self) {
        self.store.remove();
        self.state = PlayerState::new(&self.catalog);
        self.restart_session();
        self.log.clear();
        self.add_log("Save data wiped!", true);
    }

    /// Fresh market, view and schedule, as on a page load.
    fn restart_session(&mut self) {
        self.market = market::seed_market(&self.catalog, self.rng.as_mut());
        self.overlay = None;
        self.minigame_available = false;
        self.collection_scroll = 0;
        self.tab = Tab::Collection;
        self.ticks = 0;
        self.autosave = Interval::every(AUTOSAVE_INTERVAL);
        self.market_timer = Interval::every(MARKET_INTERVAL);
        self.minigame_timer = Interval::starting_at(MINIGAME_FIRST_DELAY, MINIGAME_INTERVAL);
    }

    // ── Actions ────────────────────────────────────────────────

    fn hunt(&mut self, idx: usize) -> bool {
        let Some(location) = self.catalog.locations.get(idx) else {
            return false;
        };
        let location_id = location.id;
        match logic::hunt(&mut self.state, &self.catalog, location_id, self.rng.as_mut()) {
            Ok(fliffy) => {
                self.add_log(
                    &format!("Caught a {} {}!", fliffy.rarity.name(), fliffy.display_name()),
                    fliffy.rarity >= state::Rarity::Rare,
                );
                self.overlay = Some(Overlay::Caught(fliffy));
            }
            Err(e) => self.add_log(&e.to_string(), false),
        }
        true
    }

    fn buy_upgrade(&mut self, idx: usize) -> bool {
        let Some(kind) = self.state.upgrades.get(idx).map(|u| u.id) else {
            return false;
        };
        match logic::buy_upgrade(&mut self.state, kind) {
            Ok(level) => self.add_log(&format!("{} is now level {}.", upgrade_name(&self.state, kind), level), false),
            Err(e) => self.add_log(&e.to_string(), false),
        }
        true
    }

    fn buy_rebirth_upgrade(&mut self, idx: usize) -> bool {
        let Some(kind) = self.state.rebirth_upgrades.get(idx).map(|u| u.id) else {
            return false;
        };
        match logic::buy_rebirth_upgrade(&mut self.state, kind) {
            Ok(level) => self.add_log(
                &format!("{} is now level {}.", rebirth_upgrade_name(&self.state, kind), level),
                false,
            ),
            Err(e) => self.add_log(&e.to_string(), false),
        }
        true
    }

    fn open_sell(&mut self, idx: usize) -> bool {
        let Some(fliffy) = self.state.collected_fliffys.get(idx) else {
            return false;
        };
        self.overlay = Some(Overlay::Sell {
            fliffy_id: fliffy.id.clone(),
            price_input: String::new(),
        });
        true
    }

    fn confirm_sell(&mut self) -> bool {
        let Some(Overlay::Sell {
            fliffy_id,
            price_input,
        }) = &self.overlay
        else {
            return false;
        };
        let price = price_input.parse::<u64>().map_or(0.0, |p| p as f64);
        let fliffy_id = fliffy_id.clone();
        match logic::list_for_sale(
            &mut self.state,
            &mut self.market,
            &fliffy_id,
            price,
            self.rng.as_mut(),
        ) {
            Ok(_) => {
                self.overlay = None;
                self.clamp_collection_scroll();
                self.add_log(&format!("Listed for {} Fliff Bucks.", format_number(price)), false);
            }
            Err(e) => self.add_log(&e.to_string(), false),
        }
        true
    }

    fn buy_listing(&mut self, idx: usize) -> bool {
        let Some(listing_id) = self.market.listings.get(idx).map(|l| l.listing_id.clone()) else {
            return false;
        };
        match logic::buy_listing(&mut self.state, &mut self.market, &listing_id) {
            Ok(fliffy) => self.add_log(&format!("Bought a {}!", fliffy.display_name()), false),
            Err(e) => self.add_log(&e.to_string(), false),
        }
        true
    }

    fn confirm_rebirth(&mut self) -> bool {
        match logic::rebirth(&mut self.state, &self.catalog) {
            Ok(points) => {
                self.overlay = None;
                self.collection_scroll = 0;
                self.add_log(
                    &format!(
                        "Rebirth #{} complete! +{} Fluff Points.",
                        self.state.rebirth_count, points
                    ),
                    true,
                );
            }
            Err(e) => self.add_log(&e.to_string(), false),
        }
        true
    }

    fn start_minigame(&mut self) -> bool {
        if !self.minigame_available || self.overlay.is_some() {
            return false;
        }
        self.minigame_available = false;
        let reward = economy::minigame_reward(&self.state);
        self.overlay = Some(Overlay::Minigame(Minigame::new(reward, self.rng.as_mut())));
        true
    }

    fn scroll_collection(&mut self, down: bool) -> bool {
        if down {
            self.collection_scroll += COLLECTION_PAGE;
            self.clamp_collection_scroll();
        } else {
            self.collection_scroll = self.collection_scroll.saturating_sub(COLLECTION_PAGE);
        }
        true
    }

    fn clamp_collection_scroll(&mut self) {
        let len = self.state.collected_fliffys.len();
        let last_page = len.saturating_sub(1) / COLLECTION_PAGE * COLLECTION_PAGE;
        self.collection_scroll = self.collection_scroll.min(last_page);
    }

    /// Digit or row selection within the current tab.
    fn select(&mut self, idx: usize) -> bool {
        match self.tab {
            Tab::Collection => self.open_sell(self.collection_scroll + idx),
            Tab::Hunt => self.hunt(idx),
            Tab::Upgrades => self.buy_upgrade(idx),
            Tab::Market => self.buy_listing(idx),
            Tab::Rebirth => self.buy_rebirth_upgrade(idx),
        }
    }

    fn switch_tab(&mut self, tab: Tab) -> bool {
        self.tab = tab;
        true
    }

    // ── Input ──────────────────────────────────────────────────

    fn step_minigame(&mut self, dir: Direction) -> bool {
        match &mut self.overlay {
            Some(Overlay::Minigame(game)) => {
                game.step(dir);
                true
            }
            _ => false,
        }
    }

    fn handle_overlay_key(&mut self, key: char, now_ms: f64) -> bool {
        let Some(overlay) = &self.overlay else {
            return false;
        };
        match overlay {
            Overlay::Minigame(_) => match key {
                'w' => self.step_minigame(Direction::Up),
                's' => self.step_minigame(Direction::Down),
                'a' => self.step_minigame(Direction::Left),
                'd' => self.step_minigame(Direction::Right),
                KEY_ESC | 'q' => self.close_overlay(),
                _ => false,
            },
            Overlay::Sell { .. } => match key {
                '0'..='9' | KEY_BACKSPACE => self.edit_price(key),
                KEY_ENTER => self.confirm_sell(),
                KEY_ESC => self.close_overlay(),
                _ => false,
            },
            Overlay::RebirthConfirm => match key {
                KEY_ENTER | 'y' => self.confirm_rebirth(),
                KEY_ESC | 'n' => self.close_overlay(),
                _ => false,
            },
            Overlay::Caught(_) | Overlay::Welcome(_) => match key {
                KEY_ENTER | KEY_ESC | ' ' => self.close_overlay(),
                _ => false,
            },
            Overlay::Settings => match key {
                's' => {
                    self.manual_save(now_ms);
                    self.close_overlay()
                }
                'e' => {
                    self.export_save();
                    self.close_overlay()
                }
                'i' => {
                    self.host_request = Some(HostRequest::PromptImport);
                    self.close_overlay()
                }
                'w' => {
                    self.host_request = Some(HostRequest::ConfirmWipe);
                    self.close_overlay()
                }
                KEY_ESC | 'o' => self.close_overlay(),
                _ => false,
            },
        }
    }

    fn edit_price(&mut self, key: char) -> bool {
        let Some(Overlay::Sell { price_input, .. }) = &mut self.overlay else {
            return false;
        };
        if key == KEY_BACKSPACE {
            price_input.pop();
        } else if price_input.len() < MAX_PRICE_DIGITS {
            price_input.push(key);
        }
        true
    }

    /// Closing a decided minigame still pays it out. Only a round in play is abandoned.
    fn close_overlay(&mut self) -> bool {
        let decided = match &self.overlay {
            Some(Overlay::Minigame(game)) => game.decided_outcome(),
            _ => None,
        };
        self.overlay = None;
        if let Some(outcome) = decided {
            self.settle_minigame(outcome);
        }
        true
    }

    fn handle_key(&mut self, key: char, now_ms: f64) -> bool {
        if self.overlay.is_some() {
            return self.handle_overlay_key(key, now_ms);
        }
        match key {
            'c' => self.switch_tab(Tab::Collection),
            'h' => self.switch_tab(Tab::Hunt),
            'u' => self.switch_tab(Tab::Upgrades),
            'm' => self.switch_tab(Tab::Market),
            'r' => self.switch_tab(Tab::Rebirth),
            'o' => {
                self.overlay = Some(Overlay::Settings);
                true
            }
            'g' => self.start_minigame(),
            'b' if self.tab == Tab::Rebirth => {
                self.overlay = Some(Overlay::RebirthConfirm);
                true
            }
            'n' if self.tab == Tab::Collection => self.scroll_collection(true),
            'p' if self.tab == Tab::Collection => self.scroll_collection(false),
            '1'..='9' => self.select((key as u8 - b'1') as usize),
            _ => false,
        }
    }

    fn handle_click(&mut self, action_id: u16, now_ms: f64) -> bool {
        // Overlay controls share ids with their key bindings.
        match action_id {
            CLOSE_OVERLAY => return self.close_overlay(),
            SELL_CONFIRM => return self.handle_overlay_key(KEY_ENTER, now_ms),
            SELL_PRICE_BACKSPACE => return self.handle_overlay_key(KEY_BACKSPACE, now_ms),
            id if (SELL_PRICE_DIGIT_BASE..SELL_PRICE_DIGIT_BASE + 10).contains(&id) => {
                let digit = char::from(b'0' + (id - SELL_PRICE_DIGIT_BASE) as u8);
                return self.handle_overlay_key(digit, now_ms);
            }
            CONFIRM_REBIRTH => return self.handle_overlay_key('y', now_ms),
            MINIGAME_UP => return self.handle_overlay_key('w', now_ms),
            MINIGAME_DOWN => return self.handle_overlay_key('s', now_ms),
            MINIGAME_LEFT => return self.handle_overlay_key('a', now_ms),
            MINIGAME_RIGHT => return self.handle_overlay_key('d', now_ms),
            MANUAL_SAVE => return self.handle_overlay_key('s', now_ms),
            EXPORT_SAVE => return self.handle_overlay_key('e', now_ms),
            IMPORT_SAVE => return self.handle_overlay_key('i', now_ms),
            WIPE_SAVE => return self.handle_overlay_key('w', now_ms),
            _ => {}
        }
        if self.overlay.is_some() {
            return false;
        }

        match action_id {
            TAB_COLLECTION => self.switch_tab(Tab::Collection),
            TAB_HUNT => self.switch_tab(Tab::Hunt),
            TAB_UPGRADES => self.switch_tab(Tab::Upgrades),
            TAB_MARKET => self.switch_tab(Tab::Market),
            TAB_REBIRTH => self.switch_tab(Tab::Rebirth),
            OPEN_SETTINGS => self.handle_key('o', now_ms),
            START_MINIGAME => self.start_minigame(),
            OPEN_REBIRTH => self.handle_key('b', now_ms),
            COLLECTION_SCROLL_UP => self.scroll_collection(false),
            COLLECTION_SCROLL_DOWN => self.scroll_collection(true),
            id if id >= SELECT_FLIFFY_BASE => self.open_sell((id - SELECT_FLIFFY_BASE) as usize),
            id if (HUNT_BASE..BUY_UPGRADE_BASE).contains(&id) => self.hunt((id - HUNT_BASE) as usize),
            id if (BUY_UPGRADE_BASE..BUY_REBIRTH_UPGRADE_BASE).contains(&id) => {
                self.buy_upgrade((id - BUY_UPGRADE_BASE) as usize)
            }
            id if (BUY_REBIRTH_UPGRADE_BASE..COLLECTION_SCROLL_UP).contains(&id) => {
                self.buy_rebirth_upgrade((id - BUY_REBIRTH_UPGRADE_BASE) as usize)
            }
            id if (BUY_LISTING_BASE..OPEN_REBIRTH).contains(&id) => {
                self.buy_listing((id - BUY_LISTING_BASE) as usize)
            }
            _ => false,
        }
    }

    /// Dispatch one input event. Returns true if it was consumed.
    pub fn handle_input(&mut self, event: &InputEvent, now_ms: f64) -> bool {
        match event {
            InputEvent::Key(c) => self.handle_key(*c, now_ms),
            InputEvent::Click(id) => self.handle_click(*id, now_ms),
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
        render::render(self, f, area, click_state);
    }
}

fn upgrade_name(state: &PlayerState, kind: UpgradeKind) -> &'static str {
    state
        .upgrades
        .iter()
        .find(|u| u.id == kind)
        .map_or("Upgrade", |u| u.name)
}

fn rebirth_upgrade_name(state: &PlayerState, kind: RebirthUpgradeKind) -> &'static str {
    state
        .rebirth_upgrades
        .iter()
        .find(|u| u.id == kind)
        .map_or("Upgrade", |u| u.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fliffy::random::{RngSource, ScriptedSource};
    use crate::fliffy::save::MemoryStore;
    use crate::fliffy::minigame::{MinigameStatus, Pos};
    use crate::fliffy::state::Rarity;

    fn new_game() -> FliffyGame {
        FliffyGame::new(
            Box::new(MemoryStore::new()),
            Box::new(RngSource::seeded(1)),
            0.0,
        )
    }

    fn key(game: &mut FliffyGame, c: char) -> bool {
        game.handle_input(&InputEvent::Key(c), 0.0)
    }

    fn give_fliffy(game: &mut FliffyGame, rarity: Rarity) {
        let mut rng = ScriptedSource::new(&[0.0]);
        let mut f = random::generate_fliffy(&game.catalog, &mut rng, Some(rarity));
        f.id = format!("owned-{}", game.state.collected_fliffys.len());
        game.state.collected_fliffys.push(f);
    }

    #[test]
    fn new_session_seeds_market() {
        let game = new_game();
        assert_eq!(game.market.listings.len(), market::INITIAL_MARKET_LISTINGS);
        assert_eq!(game.state, PlayerState::new(&game.catalog));
        assert!(game.overlay.is_none());
    }

    #[test]
    fn session_resumes_from_store_with_welcome() {
        let catalog = Catalog::builtin();
        let mut state = PlayerState::new(&catalog);
        let mut rng = ScriptedSource::new(&[0.0]);
        state
            .collected_fliffys
            .push(random::generate_fliffy(&catalog, &mut rng, Some(Rarity::Common)));
        let mut store = MemoryStore::new();
        save::save(&mut store, &state, 0.0).unwrap();

        let game = FliffyGame::new(Box::new(store), Box::new(RngSource::seeded(2)), 120_000.0);
        assert!((game.state.fliff_bucks - 120.0).abs() < 1e-9);
        assert!(matches!(game.overlay, Some(Overlay::Welcome(v)) if (v - 120.0).abs() < 1e-9));
    }

    #[test]
    fn corrupt_store_starts_fresh() {
        let mut store = MemoryStore::new();
        store.write("{broken").unwrap();
        let game = FliffyGame::new(Box::new(store), Box::new(RngSource::seeded(2)), 0.0);
        assert_eq!(game.state, PlayerState::new(&game.catalog));
    }

    #[test]
    fn tick_accrues_and_autosaves() {
        let mut game = new_game();
        give_fliffy(&mut game, Rarity::Common);
        game.tick(49, 1_000.0);
        assert!(game.store.read().is_none());
        game.tick(1, 1_000.0);
        let raw = game.store.read().unwrap();
        assert!(raw.contains("\"lastSaveTime\":1000.0"));
        assert!((game.state.fliff_bucks - 5.0).abs() < 1e-9);
    }

    #[test]
    fn market_grows_every_twenty_seconds() {
        let mut game = new_game();
        game.tick(199, 0.0);
        assert_eq!(game.market.listings.len(), 8);
        game.tick(1, 0.0);
        assert_eq!(game.market.listings.len(), 9);
    }

    #[test]
    fn minigame_offered_after_thirty_seconds() {
        let mut game = new_game();
        game.tick(299, 0.0);
        assert!(!game.minigame_available);
        game.tick(1, 0.0);
        assert!(game.minigame_available);
    }

    #[test]
    fn minigame_offer_waits_for_blocking_overlay() {
        let mut game = new_game();
        game.overlay = Some(Overlay::RebirthConfirm);
        game.tick(300, 0.0);
        assert!(!game.minigame_available);
        game.overlay = Some(Overlay::Settings);
        game.tick(1_800, 0.0);
        assert!(game.minigame_available);
    }

    #[test]
    fn starting_minigame_consumes_offer() {
        let mut game = new_game();
        game.minigame_available = true;
        assert!(key(&mut game, 'g'));
        assert!(!game.minigame_available);
        assert!(matches!(game.overlay, Some(Overlay::Minigame(_))));
        // Abandoning resolves nothing
        let before = game.state.clone();
        assert!(key(&mut game, KEY_ESC));
        assert!(game.overlay.is_none());
        assert_eq!(game.state, before);
    }

    #[test]
    fn closing_a_lost_round_still_charges_penalty() {
        let mut game = new_game();
        game.state.fliff_bucks = 100.0;
        game.minigame_available = true;
        key(&mut game, 'g');
        game.tick(minigame::TIME_LIMIT_SECS * logic::TICKS_PER_SECOND, 0.0);
        match &game.overlay {
            Some(Overlay::Minigame(m)) => assert_eq!(m.status, MinigameStatus::Lost),
            other => panic!("unexpected overlay {other:?}"),
        }

        assert!(key(&mut game, KEY_ESC));
        assert!(game.overlay.is_none());
        assert!((game.state.fliff_bucks - 70.0).abs() < 1e-9);
        // Paid once only
        game.tick(100, 0.0);
        assert!((game.state.fliff_bucks - 70.0).abs() < 1e-9);
    }

    #[test]
    fn closing_a_won_round_by_click_pays_reward() {
        let mut rng = ScriptedSource::new(&[0.0]);
        let mut round = Minigame::new(500.0, &mut rng);
        round.fliffy = Pos::new(0, 0);
        round.house = Pos::new(1, 0);
        round.obstacles.clear();
        let mut game = new_game();
        game.overlay = Some(Overlay::Minigame(round));

        key(&mut game, 'd');
        assert!(game.handle_input(&InputEvent::Click(CLOSE_OVERLAY), 0.0));
        assert!(game.overlay.is_none());
        assert!((game.state.fliff_bucks - 500.0).abs() < 1e-9);
    }

    #[test]
    fn minigame_loss_applies_penalty() {
        let mut game = new_game();
        game.state.fliff_bucks = 100.0;
        game.minigame_available = true;
        key(&mut game, 'g');
        let ticks = minigame::TIME_LIMIT_SECS * logic::TICKS_PER_SECOND + 20;
        game.tick(ticks, 0.0);
        assert!(game.overlay.is_none());
        assert!((game.state.fliff_bucks - 70.0).abs() < 1e-9);
    }

    #[test]
    fn minigame_not_startable_without_offer() {
        let mut game = new_game();
        assert!(!key(&mut game, 'g'));
        assert!(game.overlay.is_none());
    }

    #[test]
    fn hunt_via_keys_shows_catch() {
        let mut game = new_game();
        game.state.fliff_bucks = 10.0;
        key(&mut game, 'h');
        assert_eq!(game.tab, Tab::Hunt);
        key(&mut game, '1');
        assert_eq!(game.state.collected_fliffys.len(), 1);
        assert!(matches!(game.overlay, Some(Overlay::Caught(_))));
        key(&mut game, KEY_ENTER);
        assert!(game.overlay.is_none());
    }

    #[test]
    fn hunt_via_click() {
        let mut game = new_game();
        game.state.fliff_bucks = 500.0;
        assert!(game.handle_input(&InputEvent::Click(HUNT_BASE + 1), 0.0));
        assert_eq!(game.state.collected_fliffys.len(), 1);
        assert!(game.state.is_unlocked("forest"));
    }

    #[test]
    fn sell_flow_lists_at_typed_price() {
        let mut game = new_game();
        give_fliffy(&mut game, Rarity::Common);
        key(&mut game, 'c');
        key(&mut game, '1');
        for c in ['1', '0', '0'] {
            key(&mut game, c);
        }
        key(&mut game, KEY_ENTER);
        assert!(game.overlay.is_none());
        assert!(game.state.collected_fliffys.is_empty());
        assert_eq!(game.market.listings[0].price, 100.0);
        assert_eq!(game.market.listings[0].fliffy.id, "owned-0");
    }

    #[test]
    fn sell_with_empty_price_is_rejected() {
        let mut game = new_game();
        give_fliffy(&mut game, Rarity::Common);
        key(&mut game, '1');
        key(&mut game, KEY_ENTER);
        assert!(matches!(game.overlay, Some(Overlay::Sell { .. })));
        assert_eq!(game.state.collected_fliffys.len(), 1);
    }

    #[test]
    fn sell_price_editable_by_click() {
        let mut game = new_game();
        give_fliffy(&mut game, Rarity::Common);
        game.handle_input(&InputEvent::Click(SELECT_FLIFFY_BASE), 0.0);
        game.handle_input(&InputEvent::Click(SELL_PRICE_DIGIT_BASE + 4), 0.0);
        game.handle_input(&InputEvent::Click(SELL_PRICE_DIGIT_BASE + 2), 0.0);
        game.handle_input(&InputEvent::Click(SELL_PRICE_BACKSPACE), 0.0);
        match &game.overlay {
            Some(Overlay::Sell { price_input, .. }) => assert_eq!(price_input, "4"),
            other => panic!("unexpected overlay {other:?}"),
        }
    }

    #[test]
    fn buy_listing_via_click() {
        let mut game = new_game();
        let price = game.market.listings[2].price;
        game.state.fliff_bucks = price;
        game.handle_input(&InputEvent::Click(BUY_LISTING_BASE + 2), 0.0);
        assert_eq!(game.state.collected_fliffys.len(), 1);
        assert_eq!(game.market.listings.len(), 7);
        assert!(game.state.fliff_bucks.abs() < 1e-9);
    }

    #[test]
    fn rebirth_needs_confirmation() {
        let mut game = new_game();
        give_fliffy(&mut game, Rarity::Rare);
        game.state.fliff_bucks = 2_000_000.0;
        key(&mut game, 'r');
        key(&mut game, 'b');
        assert!(matches!(game.overlay, Some(Overlay::RebirthConfirm)));
        key(&mut game, 'n');
        assert_eq!(game.state.rebirth_count, 0);

        key(&mut game, 'b');
        key(&mut game, 'y');
        assert_eq!(game.state.rebirth_count, 1);
        assert!(game.state.collected_fliffys.is_empty());
        assert!(game.overlay.is_none());
    }

    #[test]
    fn upgrade_keys_follow_tab() {
        let mut game = new_game();
        game.state.fliff_bucks = 100.0;
        game.state.fluff_points = 1;
        key(&mut game, 'u');
        key(&mut game, '1');
        assert_eq!(game.state.upgrade_level(UpgradeKind::IncomeMultiplier), 1);
        key(&mut game, 'r');
        key(&mut game, '1');
        assert_eq!(
            game.state.rebirth_upgrade_level(RebirthUpgradeKind::PermanentIncomeBoost),
            1
        );
    }

    #[test]
    fn export_requests_clipboard() {
        let mut game = new_game();
        key(&mut game, 'o');
        key(&mut game, 'e');
        assert_eq!(game.take_host_request(), None);

        game.save_quietly(0.0);
        key(&mut game, 'o');
        key(&mut game, 'e');
        match game.take_host_request() {
            Some(HostRequest::CopyToClipboard(raw)) => assert!(raw.contains("fliffBucks")),
            other => panic!("unexpected request {other:?}"),
        }
        assert_eq!(game.take_host_request(), None);
    }

    #[test]
    fn import_replaces_session() {
        let mut game = new_game();
        key(&mut game, 'o');
        key(&mut game, 'i');
        assert_eq!(game.take_host_request(), Some(HostRequest::PromptImport));

        game.import_save(r#"{"fliffBucks": 777, "rebirthCount": 3}"#, 0.0);
        assert_eq!(game.state.fliff_bucks, 777.0);
        assert_eq!(game.state.rebirth_count, 3);
    }

    #[test]
    fn import_restarts_market_and_schedule() {
        let mut game = new_game();
        game.tick(1_000, 0.0);
        assert!(game.minigame_available);
        assert!(game.market.listings.len() > market::INITIAL_MARKET_LISTINGS);
        game.tab = Tab::Market;

        game.import_save(r#"{"fliffBucks": 10}"#, 0.0);
        assert_eq!(game.market.listings.len(), market::INITIAL_MARKET_LISTINGS);
        assert!(!game.minigame_available);
        assert_eq!(game.tab, Tab::Collection);
        game.tick(MINIGAME_FIRST_DELAY as u32 - 1, 0.0);
        assert!(!game.minigame_available);
        game.tick(1, 0.0);
        assert!(game.minigame_available);
    }

    #[test]
    fn bad_import_keeps_session_and_store() {
        let mut game = new_game();
        game.state.fliff_bucks = 5.0;
        game.save_quietly(0.0);
        let stored = game.store.read();
        game.import_save("nope", 0.0);
        assert_eq!(game.state.fliff_bucks, 5.0);
        assert_eq!(game.store.read(), stored);
    }

    #[test]
    fn wipe_resets_everything() {
        let mut game = new_game();
        give_fliffy(&mut game, Rarity::Epic);
        game.state.fliff_bucks = 1e6;
        game.save_quietly(0.0);
        key(&mut game, 'o');
        key(&mut game, 'w');
        assert_eq!(game.take_host_request(), Some(HostRequest::ConfirmWipe));
        game.wipe_save();
        assert!(game.store.read().is_none());
        assert_eq!(game.state, PlayerState::new(&game.catalog));
    }

    #[test]
    fn collection_paging_clamped() {
        let mut game = new_game();
        for _ in 0..12 {
            give_fliffy(&mut game, Rarity::Common);
        }
        key(&mut game, 'n');
        assert_eq!(game.collection_scroll, 9);
        key(&mut game, 'n');
        assert_eq!(game.collection_scroll, 9);
        key(&mut game, '2');
        match &game.overlay {
            Some(Overlay::Sell { fliffy_id, .. }) => assert_eq!(fliffy_id, "owned-10"),
            other => panic!("unexpected overlay {other:?}"),
        }
        key(&mut game, KEY_ESC);
        key(&mut game, 'p');
        assert_eq!(game.collection_scroll, 0);
    }

    #[test]
    fn log_capped() {
        let mut game = new_game();
        for i in 0..60 {
            game.add_log(&format!("entry {i}"), false);
        }
        assert_eq!(game.log.len(), 50);
        assert_eq!(game.log.last().unwrap().text, "entry 59");
    }
}

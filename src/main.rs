mod fliffy;
mod input;
mod logger;
mod time;
mod widgets;

use std::{cell::RefCell, io, rc::Rc};

use js_sys::{Function, Reflect};
use ratzilla::event::{KeyCode, MouseButton, MouseEventKind};
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};

use fliffy::logic::TICKS_PER_SECOND;
use fliffy::random::RngSource;
use fliffy::save::SaveStore;
use fliffy::{FliffyGame, HostRequest};
use input::{
    pixel_x_to_col, pixel_y_to_row, ClickState, InputEvent, KEY_BACKSPACE, KEY_ENTER, KEY_ESC,
};
use time::GameTime;

/// Wall-clock epoch milliseconds, used for save timestamps.
fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// Monotonic frame clock.
fn performance_now() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map_or_else(now_ms, |p| p.now())
}

#[cfg(target_arch = "wasm32")]
fn save_store() -> Box<dyn SaveStore> {
    Box::new(fliffy::save::LocalStorage)
}

#[cfg(not(target_arch = "wasm32"))]
fn save_store() -> Box<dyn SaveStore> {
    Box::new(fliffy::save::MemoryStore::new())
}

/// Map a browser key to the game's key alphabet. Arrows steer like WASD.
fn key_to_char(code: KeyCode) -> Option<char> {
    match code {
        KeyCode::Char(c) => Some(c.to_ascii_lowercase()),
        KeyCode::Esc => Some(KEY_ESC),
        KeyCode::Enter => Some(KEY_ENTER),
        KeyCode::Backspace => Some(KEY_BACKSPACE),
        KeyCode::Up => Some('w'),
        KeyCode::Down => Some('s'),
        KeyCode::Left => Some('a'),
        KeyCode::Right => Some('d'),
        _ => None,
    }
}

/// Locate the grid container and convert a click position to a cell.
fn dom_pixel_to_cell(mouse_x: u32, mouse_y: u32, cs: &ClickState) -> Option<(u16, u16)> {
    let document = web_sys::window()?.document()?;

    // DomBackend renders into a <div> directly under <body>.
    let grid = document.query_selector("body > div").ok()??;
    let rect = grid.get_bounding_client_rect();

    let col = pixel_x_to_col(mouse_x as f64 - rect.left(), rect.width(), cs.terminal_cols)?;
    let row = pixel_y_to_row(mouse_y as f64 - rect.top(), rect.height(), cs.terminal_rows)?;
    Some((col, row))
}

fn copy_to_clipboard(window: &web_sys::Window, text: &str) -> Result<(), JsValue> {
    let navigator = Reflect::get(window, &JsValue::from_str("navigator"))?;
    let clipboard = Reflect::get(&navigator, &JsValue::from_str("clipboard"))?;
    let write_text: Function =
        Reflect::get(&clipboard, &JsValue::from_str("writeText"))?.dyn_into()?;
    write_text.call1(&clipboard, &JsValue::from_str(text))?;
    Ok(())
}

/// Carry out whatever browser work the last input asked for.
fn serve_host_request(game: &mut FliffyGame) {
    let Some(request) = game.take_host_request() else {
        return;
    };
    let Some(window) = web_sys::window() else {
        log::warn!("no window for {request:?}");
        return;
    };

    match request {
        HostRequest::CopyToClipboard(raw) => match copy_to_clipboard(&window, &raw) {
            Ok(()) => game.add_log("Save data copied to clipboard!", false),
            Err(e) => {
                log::warn!("clipboard unavailable: {e:?}");
                game.add_log("Clipboard unavailable. Copy your save from here:", true);
                game.add_log(&raw, false);
            }
        },
        HostRequest::PromptImport => match window.prompt_with_message("Paste your save data:") {
            Ok(Some(text)) if !text.trim().is_empty() => game.import_save(text.trim(), now_ms()),
            Ok(_) => {}
            Err(e) => log::warn!("import prompt failed: {e:?}"),
        },
        HostRequest::ConfirmWipe => {
            let confirmed = window
                .confirm_with_message("Wipe all progress? This cannot be undone.")
                .unwrap_or(false);
            if confirmed {
                game.wipe_save();
            }
        }
    }
}

/// Save once more when the tab closes.
fn save_on_unload(game: Rc<RefCell<FliffyGame>>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let on_unload = Closure::<dyn FnMut()>::new(move || {
        if let Ok(mut g) = game.try_borrow_mut() {
            g.save_quietly(now_ms());
        }
    });
    if let Err(e) =
        window.add_event_listener_with_callback("beforeunload", on_unload.as_ref().unchecked_ref())
    {
        log::warn!("could not register unload save: {e:?}");
    }
    // Lives for the whole page.
    on_unload.forget();
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();
    if let Err(e) = logger::init(logger::level_for(cfg!(debug_assertions))) {
        web_sys::console::warn_1(&format!("logger already set: {e}").into());
    }

    let game = Rc::new(RefCell::new(FliffyGame::new(
        save_store(),
        Box::new(RngSource::from_entropy()),
        now_ms(),
    )));
    let click_state = Rc::new(RefCell::new(ClickState::new()));
    save_on_unload(game.clone());

    let backend = DomBackend::new()?;
    let terminal = Terminal::new(backend)?;

    // Mouse/touch click handler
    terminal.on_mouse_event({
        let game = game.clone();
        let click_state = click_state.clone();
        move |mouse_event| {
            if mouse_event.event != MouseEventKind::Pressed
                || mouse_event.button != MouseButton::Left
            {
                return;
            }

            let action = {
                let cs = click_state.borrow();
                if cs.terminal_rows == 0 || cs.terminal_cols == 0 {
                    return;
                }
                dom_pixel_to_cell(mouse_event.x, mouse_event.y, &cs)
                    .and_then(|(col, row)| cs.hit_test(col, row))
            };

            if let Some(action_id) = action {
                log::debug!("click action {action_id}");
                let mut g = game.borrow_mut();
                g.handle_input(&InputEvent::Click(action_id), now_ms());
                serve_host_request(&mut g);
            }
        }
    });

    // Keyboard handler
    terminal.on_key_event({
        let game = game.clone();
        move |key_event| {
            if let Some(c) = key_to_char(key_event.code) {
                let mut g = game.borrow_mut();
                g.handle_input(&InputEvent::Key(c), now_ms());
                serve_host_request(&mut g);
            }
        }
    });

    terminal.draw_web({
        let clock = RefCell::new(GameTime::new(TICKS_PER_SECOND));
        move |f| {
            let ticks = clock.borrow_mut().update(performance_now());
            let mut g = game.borrow_mut();
            if ticks > 0 {
                g.tick(ticks, now_ms());
            }

            let area = f.area();
            click_state.borrow_mut().reset(area.width, area.height);
            g.render(f, area, &click_state);
        }
    });

    Ok(())
}

//! Fliffy Collector rendering (read-only from the session).

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratzilla::ratatui::Frame;

use crate::input::{is_narrow_layout, ClickState};
use crate::widgets::{ClickableList, TabBar};

use super::actions::*;
use super::economy;
use super::logic::format_number;
use super::minigame::{Minigame, MinigameStatus, Pos, GRID_SIZE};
use super::state::{Fliffy, Rarity, Upgrade};
use super::{FliffyGame, Overlay, Tab, COLLECTION_PAGE};

pub fn render(
    game: &FliffyGame,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let mut cs = click_state.borrow_mut();
    let is_narrow = is_narrow_layout(area.width);
    let borders = if is_narrow {
        Borders::TOP | Borders::BOTTOM
    } else {
        Borders::ALL
    };

    // Log panel on the right when wide enough
    let (main_area, side_log) = if area.width >= 80 {
        let h_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
            .split(area);
        (h_chunks[0], Some(h_chunks[1]))
    } else {
        (area, None)
    };

    let header_height = if game.minigame_available { 6 } else { 5 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(header_height),
            Constraint::Length(3), // tab bar
            Constraint::Min(6),    // tab content
            Constraint::Length(if side_log.is_some() { 0 } else { 6 }),
        ])
        .split(main_area);

    render_header(game, f, chunks[0], borders, &mut cs);
    render_tab_bar(game, f, chunks[1], borders, is_narrow, &mut cs);
    match game.tab {
        Tab::Collection => render_collection(game, f, chunks[2], borders, &mut cs),
        Tab::Hunt => render_hunt(game, f, chunks[2], borders, &mut cs),
        Tab::Upgrades => render_upgrades(game, f, chunks[2], borders, is_narrow, &mut cs),
        Tab::Market => render_market(game, f, chunks[2], borders, &mut cs),
        Tab::Rebirth => render_rebirth(game, f, chunks[2], borders, is_narrow, &mut cs),
    }
    match side_log {
        Some(log_area) => render_log(game, f, log_area, Borders::ALL),
        None => render_log(game, f, chunks[3], borders),
    }

    // Drawn last so its targets sit on top.
    if let Some(overlay) = &game.overlay {
        render_overlay(game, overlay, f, area, &mut cs);
    }
}

pub fn rarity_color(rarity: Rarity) -> Color {
    match rarity {
        Rarity::Common => Color::White,
        Rarity::Uncommon => Color::Green,
        Rarity::Rare => Color::Cyan,
        Rarity::Epic => Color::Magenta,
        Rarity::Legendary => Color::Yellow,
    }
}

/// `[k] label` with the key highlighted.
fn button(key: &str, label: impl Into<String>, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!(" [{}] ", key),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::styled(label.into(), Style::default().fg(color)),
    ])
}

/// Selection key for row `i`; rows past the ninth are click-only.
fn row_key(i: usize) -> String {
    if i < 9 {
        format!(" [{}] ", i + 1)
    } else {
        "     ".to_string()
    }
}

fn fliffy_spans(fliffy: &Fliffy) -> Vec<Span<'static>> {
    let color = rarity_color(fliffy.rarity);
    vec![
        Span::styled(
            format!("{:<9} ", fliffy.rarity.name()),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(fliffy.display_name(), Style::default().fg(color)),
        Span::styled(
            format!("  +{}/s", format_number(fliffy.income)),
            Style::default().fg(Color::DarkGray),
        ),
    ]
}

fn panel(title: String, color: Color, borders: Borders) -> Block<'static> {
    Block::default()
        .borders(borders)
        .border_style(Style::default().fg(color))
        .title(Span::styled(
            title,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
}

fn top_offset(borders: Borders) -> u16 {
    u16::from(borders.contains(Borders::TOP))
}

fn bottom_offset(borders: Borders) -> u16 {
    u16::from(borders.contains(Borders::BOTTOM))
}

/// Register targets, then draw the list inside `block`.
fn draw_list(
    cl: ClickableList<'static>,
    block: Block<'static>,
    borders: Borders,
    f: &mut Frame,
    area: Rect,
    cs: &mut ClickState,
) {
    cl.register_targets(area, cs, top_offset(borders), bottom_offset(borders));
    f.render_widget(Paragraph::new(cl.into_lines()).block(block), area);
}

// ── Header ─────────────────────────────────────────────────────

fn render_header(
    game: &FliffyGame,
    f: &mut Frame,
    area: Rect,
    borders: Borders,
    cs: &mut ClickState,
) {
    let state = &game.state;
    let mut cl = ClickableList::new();
    cl.push(Line::from(vec![
        Span::styled(" Fliff Bucks: ", Style::default().fg(Color::Gray)),
        Span::styled(
            format_number(state.fliff_bucks.floor()),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  (+{}/s)", format_number(economy::income_per_second(state))),
            Style::default().fg(Color::DarkGray),
        ),
    ]));
    let mut progress = vec![
        Span::styled(" Fluff Points: ", Style::default().fg(Color::Gray)),
        Span::styled(
            state.fluff_points.to_string(),
            Style::default().fg(Color::Magenta),
        ),
        Span::styled(
            format!(
                "  Rebirths: {}  Fliffys: {}",
                state.rebirth_count,
                state.collected_fliffys.len()
            ),
            Style::default().fg(Color::Gray),
        ),
    ];
    if let Some(best) = state.best_rarity() {
        progress.push(Span::styled(
            format!("  Best: {}", best.name()),
            Style::default().fg(rarity_color(best)),
        ));
    }
    cl.push(Line::from(progress));
    cl.push_clickable(button("o", "Settings", Color::Gray), OPEN_SETTINGS);
    if game.minigame_available {
        cl.push_clickable(
            button("g", "A Fliffy is lost! Play the minigame", Color::LightGreen),
            START_MINIGAME,
        );
    }

    draw_list(cl, panel(" Fliffy Collector ".into(), Color::Cyan, borders), borders, f, area, cs);
}

fn render_tab_bar(
    game: &FliffyGame,
    f: &mut Frame,
    area: Rect,
    borders: Borders,
    is_narrow: bool,
    cs: &mut ClickState,
) {
    let tab_style = |tab: Tab, color: Color| -> Style {
        if game.tab == tab {
            Style::default()
                .fg(Color::Black)
                .bg(color)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(color)
        }
    };

    let can_rebirth = economy::can_rebirth(&game.state);
    let rebirth_color = if can_rebirth { Color::LightYellow } else { Color::Blue };
    let labels: [&str; 5] = if is_narrow {
        ["Coll", "Hunt", "Upg", "Mkt", "Reb"]
    } else {
        ["Collection", "Hunt", "Upgrades", "Market", "Rebirth"]
    };
    let rebirth_label = if can_rebirth {
        format!("{} !", labels[4])
    } else {
        labels[4].to_string()
    };

    TabBar::new("│")
        .tab(labels[0], tab_style(Tab::Collection, Color::Green), TAB_COLLECTION)
        .tab(labels[1], tab_style(Tab::Hunt, Color::LightRed), TAB_HUNT)
        .tab(labels[2], tab_style(Tab::Upgrades, Color::Magenta), TAB_UPGRADES)
        .tab(labels[3], tab_style(Tab::Market, Color::Cyan), TAB_MARKET)
        .tab(rebirth_label, tab_style(Tab::Rebirth, rebirth_color), TAB_REBIRTH)
        .block(Block::default().borders(borders).border_style(Style::default().fg(Color::DarkGray)))
        .render(f, area, cs);
}

// ── Tabs ───────────────────────────────────────────────────────

fn render_collection(
    game: &FliffyGame,
    f: &mut Frame,
    area: Rect,
    borders: Borders,
    cs: &mut ClickState,
) {
    let owned = &game.state.collected_fliffys;
    let mut cl = ClickableList::new();

    if owned.is_empty() {
        cl.push(Line::from(Span::styled(
            " No Fliffys yet. Go hunting!",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let start = game.collection_scroll.min(owned.len());
    let end = (start + COLLECTION_PAGE).min(owned.len());
    for (i, fliffy) in owned[start..end].iter().enumerate() {
        let mut spans = vec![Span::styled(
            row_key(i),
            Style::default().fg(Color::Yellow),
        )];
        spans.extend(fliffy_spans(fliffy));
        match select_fliffy_action(start + i) {
            Some(action) => cl.push_clickable(Line::from(spans), action),
            None => cl.push(Line::from(spans)),
        }
    }

    if owned.len() > COLLECTION_PAGE {
        let pages = owned.len().div_ceil(COLLECTION_PAGE);
        cl.push(Line::from(Span::styled(
            format!(" Page {}/{}", start / COLLECTION_PAGE + 1, pages),
            Style::default().fg(Color::DarkGray),
        )));
        if start > 0 {
            cl.push_clickable(button("p", "Previous page", Color::Gray), COLLECTION_SCROLL_UP);
        }
        if end < owned.len() {
            cl.push_clickable(button("n", "Next page", Color::Gray), COLLECTION_SCROLL_DOWN);
        }
    } else if !owned.is_empty() {
        cl.push(Line::from(Span::styled(
            " Pick a Fliffy to sell it on the market.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let title = format!(" Collection ({}) ", owned.len());
    draw_list(cl, panel(title, Color::Green, borders), borders, f, area, cs);
}

fn render_hunt(
    game: &FliffyGame,
    f: &mut Frame,
    area: Rect,
    borders: Borders,
    cs: &mut ClickState,
) {
    let state = &game.state;
    let mut cl = ClickableList::new();

    for (i, location) in game.catalog.locations.iter().enumerate() {
        let cost = economy::hunt_cost(location, state);
        let unlocked = state.is_unlocked(location.id);
        let affordable = state.fliff_bucks >= cost;
        let verb = if unlocked { "Hunt" } else { "Unlock" };
        let name_color = match (unlocked, affordable) {
            (_, false) => Color::DarkGray,
            (true, true) => Color::White,
            (false, true) => Color::LightRed,
        };

        cl.push_clickable(
            Line::from(vec![
                Span::styled(row_key(i), Style::default().fg(Color::Yellow)),
                Span::styled(format!("{:<18}", location.name), Style::default().fg(name_color)),
                Span::styled(
                    format!("{} {}", verb, format_number(cost)),
                    Style::default().fg(if affordable { Color::Yellow } else { Color::DarkGray }),
                ),
            ]),
            HUNT_BASE + i as u16,
        );
    }

    draw_list(cl, panel(" Hunt ".into(), Color::LightRed, borders), borders, f, area, cs);
}

fn upgrade_line<K>(i: usize, upgrade: &Upgrade<K>, affordable: bool, unit: &str) -> Line<'static> {
    let cost = if upgrade.is_maxed() {
        "MAX".to_string()
    } else {
        format!("{} {}", format_number(upgrade.cost()), unit)
    };
    let color = if upgrade.is_maxed() {
        Color::Green
    } else if affordable {
        Color::White
    } else {
        Color::DarkGray
    };
    Line::from(vec![
        Span::styled(row_key(i), Style::default().fg(Color::Yellow)),
        Span::styled(format!("{:<14}", upgrade.name), Style::default().fg(color)),
        Span::styled(
            format!("Lv {}/{}  ", upgrade.level, upgrade.max_level),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(cost, Style::default().fg(color)),
    ])
}

fn description_line(text: &'static str) -> Line<'static> {
    Line::from(Span::styled(
        format!("      {}", text),
        Style::default().fg(Color::DarkGray),
    ))
}

fn render_upgrades(
    game: &FliffyGame,
    f: &mut Frame,
    area: Rect,
    borders: Borders,
    is_narrow: bool,
    cs: &mut ClickState,
) {
    let mut cl = ClickableList::new();
    for (i, upgrade) in game.state.upgrades.iter().enumerate() {
        let affordable = game.state.fliff_bucks >= upgrade.cost();
        cl.push_clickable(upgrade_line(i, upgrade, affordable, "FB"), BUY_UPGRADE_BASE + i as u16);
        if !is_narrow {
            cl.push(description_line(upgrade.description));
        }
    }
    draw_list(cl, panel(" Upgrades ".into(), Color::Magenta, borders), borders, f, area, cs);
}

fn render_market(
    game: &FliffyGame,
    f: &mut Frame,
    area: Rect,
    borders: Borders,
    cs: &mut ClickState,
) {
    let mut cl = ClickableList::new();
    if game.market.listings.is_empty() {
        cl.push(Line::from(Span::styled(
            " The market is quiet. Check back soon.",
            Style::default().fg(Color::DarkGray),
        )));
    }
    for (i, listing) in game.market.listings.iter().enumerate() {
        let affordable = game.state.fliff_bucks >= listing.price;
        let mut spans = vec![Span::styled(row_key(i), Style::default().fg(Color::Yellow))];
        spans.push(price_span(listing.price, affordable));
        spans.extend(fliffy_spans(&listing.fliffy));
        cl.push_clickable(Line::from(spans), BUY_LISTING_BASE + i as u16);
    }
    let title = format!(" Market ({}) ", game.market.listings.len());
    draw_list(cl, panel(title, Color::Cyan, borders), borders, f, area, cs);
}

fn price_span(price: f64, affordable: bool) -> Span<'static> {
    Span::styled(
        format!("{:>8} ", format_number(price)),
        Style::default().fg(if affordable { Color::Yellow } else { Color::DarkGray }),
    )
}

fn render_rebirth(
    game: &FliffyGame,
    f: &mut Frame,
    area: Rect,
    borders: Borders,
    is_narrow: bool,
    cs: &mut ClickState,
) {
    let state = &game.state;
    let checks = economy::rebirth_checks(state);
    let mut cl = ClickableList::new();

    cl.push(Line::from(vec![
        Span::styled(" Next rebirth: ", Style::default().fg(Color::Gray)),
        Span::styled(
            format!(
                "{} FB and a {}+ Fliffy",
                format_number(checks.requirements.fliff_bucks),
                checks.requirements.rarity.name()
            ),
            Style::default().fg(Color::White),
        ),
    ]));
    let rebirth_color = if checks.can_rebirth { Color::LightYellow } else { Color::DarkGray };
    cl.push_clickable(
        button(
            "b",
            format!("Rebirth for {} Fluff Points", checks.points_to_gain),
            rebirth_color,
        ),
        OPEN_REBIRTH,
    );
    cl.push(Line::from(""));

    for (i, upgrade) in state.rebirth_upgrades.iter().enumerate() {
        let affordable = (state.fluff_points as f64) >= upgrade.cost();
        cl.push_clickable(
            upgrade_line(i, upgrade, affordable, "FP"),
            BUY_REBIRTH_UPGRADE_BASE + i as u16,
        );
        if !is_narrow {
            cl.push(description_line(upgrade.description));
        }
    }

    draw_list(cl, panel(" Rebirth ".into(), Color::Blue, borders), borders, f, area, cs);
}

fn render_log(game: &FliffyGame, f: &mut Frame, area: Rect, borders: Borders) {
    if area.height == 0 {
        return;
    }
    let max_lines = area.height.saturating_sub(2) as usize;
    let start = game.log.len().saturating_sub(max_lines);
    let lines: Vec<Line> = game.log[start..]
        .iter()
        .map(|entry| {
            let style = if entry.is_important {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Line::from(Span::styled(format!(" > {}", entry.text), style))
        })
        .collect();

    let widget = Paragraph::new(lines)
        .block(panel(" Log ".into(), Color::DarkGray, borders))
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}

// ── Overlays ───────────────────────────────────────────────────

/// Centered dialog area, clamped to the screen.
fn dialog_area(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect::new(
        area.x + (area.width - w) / 2,
        area.y + (area.height - h) / 2,
        w,
        h,
    )
}

fn render_overlay(
    game: &FliffyGame,
    overlay: &Overlay,
    f: &mut Frame,
    area: Rect,
    cs: &mut ClickState,
) {
    match overlay {
        Overlay::Caught(fliffy) => render_caught(fliffy, f, area, cs),
        Overlay::Sell {
            fliffy_id,
            price_input,
        } => render_sell(game, fliffy_id, price_input, f, area, cs),
        Overlay::RebirthConfirm => render_rebirth_confirm(game, f, area, cs),
        Overlay::Welcome(earned) => render_welcome(*earned, f, area, cs),
        Overlay::Minigame(minigame) => render_minigame(minigame, f, area, cs),
        Overlay::Settings => render_settings(f, area, cs),
    }
}

/// Clear the dialog area, register targets and draw the list in a bordered box.
fn draw_dialog(
    cl: ClickableList<'static>,
    title: &str,
    color: Color,
    f: &mut Frame,
    dialog: Rect,
    cs: &mut ClickState,
) {
    f.render_widget(Clear, dialog);
    draw_list(
        cl,
        panel(format!(" {} ", title), color, Borders::ALL),
        Borders::ALL,
        f,
        dialog,
        cs,
    );
}

fn render_caught(fliffy: &Fliffy, f: &mut Frame, area: Rect, cs: &mut ClickState) {
    let color = rarity_color(fliffy.rarity);
    let mut cl = ClickableList::new();
    cl.push(Line::from(""));
    cl.push(Line::from(Span::styled(
        format!(" You caught a {} Fliffy!", fliffy.rarity.name()),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )));
    cl.push(Line::from(Span::styled(
        format!(" {}", fliffy.display_name()),
        Style::default().fg(color),
    )));
    cl.push(Line::from(Span::styled(
        format!(" Income: +{}/s", format_number(fliffy.income)),
        Style::default().fg(Color::Gray),
    )));
    cl.push(Line::from(""));
    cl.push_clickable(button("Enter", "Nice!", Color::White), CLOSE_OVERLAY);

    draw_dialog(cl, "Caught!", color, f, dialog_area(area, 42, 8), cs);
}

fn render_sell(
    game: &FliffyGame,
    fliffy_id: &str,
    price_input: &str,
    f: &mut Frame,
    area: Rect,
    cs: &mut ClickState,
) {
    let dialog = dialog_area(area, 44, 11);
    let mut cl = ClickableList::new();
    match game.state.find_fliffy(fliffy_id) {
        Some(fliffy) => cl.push(Line::from(fliffy_spans(fliffy))),
        None => cl.push(Line::from(" (gone)")),
    }
    cl.push(Line::from(""));
    cl.push(Line::from(vec![
        Span::styled(" Price: ", Style::default().fg(Color::Gray)),
        Span::styled(
            format!("{}_", price_input),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" Fliff Bucks", Style::default().fg(Color::Gray)),
    ]));
    // Row 3 is left empty for the keypad.
    cl.push(Line::from(""));
    cl.push(Line::from(""));
    cl.push_clickable(button("Enter", "List for sale", Color::LightGreen), SELL_CONFIRM);
    cl.push_clickable(button("Esc", "Cancel", Color::Gray), CLOSE_OVERLAY);

    draw_dialog(cl, "Sell Fliffy", Color::Cyan, f, dialog, cs);

    let keypad_row = Rect::new(dialog.x + 1, dialog.y + 1 + 3, dialog.width.saturating_sub(2), 1);
    let key_style = Style::default().fg(Color::Black).bg(Color::Gray);
    let mut keypad = TabBar::new(" ");
    for digit in (1..=9).chain(std::iter::once(0)) {
        keypad = keypad.tab(digit.to_string(), key_style, SELL_PRICE_DIGIT_BASE + digit);
    }
    keypad
        .tab("⌫", key_style, SELL_PRICE_BACKSPACE)
        .render(f, keypad_row, cs);
}

fn check_mark(ok: bool) -> Span<'static> {
    if ok {
        Span::styled(" ✔ ", Style::default().fg(Color::Green))
    } else {
        Span::styled(" ✘ ", Style::default().fg(Color::Red))
    }
}

fn render_rebirth_confirm(game: &FliffyGame, f: &mut Frame, area: Rect, cs: &mut ClickState) {
    let checks = economy::rebirth_checks(&game.state);
    let mut cl = ClickableList::new();
    cl.push(Line::from(Span::styled(
        " Requirements:",
        Style::default().fg(Color::Gray),
    )));
    cl.push(Line::from(vec![
        check_mark(checks.has_enough_bucks),
        Span::raw(format!(
            "{} Fliff Bucks",
            format_number(checks.requirements.fliff_bucks)
        )),
    ]));
    cl.push(Line::from(vec![
        check_mark(checks.has_required_rarity),
        Span::raw(format!(
            "A {} or better Fliffy",
            checks.requirements.rarity.name()
        )),
    ]));
    cl.push(Line::from(""));
    cl.push(Line::from(vec![
        Span::styled(" You will gain: ", Style::default().fg(Color::Green)),
        Span::styled(
            format!("{} Fluff Points", checks.points_to_gain),
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        ),
    ]));
    cl.push(Line::from(Span::styled(
        " Resets Fliff Bucks, Fliffys, upgrades and locations.",
        Style::default().fg(Color::Red),
    )));
    cl.push(Line::from(""));
    let confirm_color = if checks.can_rebirth { Color::LightGreen } else { Color::DarkGray };
    cl.push_clickable(button("y", "Rebirth", confirm_color), CONFIRM_REBIRTH);
    cl.push_clickable(button("n", "Cancel", Color::Gray), CLOSE_OVERLAY);

    let title = format!("Rebirth #{}", game.state.rebirth_count + 1);
    draw_dialog(cl, &title, Color::Yellow, f, dialog_area(area, 58, 11), cs);
}

fn render_welcome(earned: f64, f: &mut Frame, area: Rect, cs: &mut ClickState) {
    let mut cl = ClickableList::new();
    cl.push(Line::from(""));
    cl.push(Line::from(" While you were away, your Fliffys earned"));
    cl.push(Line::from(Span::styled(
        format!(" {} Fliff Bucks", format_number(earned)),
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    )));
    cl.push(Line::from(""));
    cl.push_clickable(button("Enter", "Continue", Color::White), CLOSE_OVERLAY);

    draw_dialog(cl, "Welcome Back!", Color::Cyan, f, dialog_area(area, 46, 7), cs);
}

fn minigame_cell(minigame: &Minigame, pos: Pos) -> Span<'static> {
    if pos == minigame.fliffy {
        Span::styled("@ ", Style::default().fg(Color::LightYellow).add_modifier(Modifier::BOLD))
    } else if pos == minigame.house {
        Span::styled("⌂ ", Style::default().fg(Color::LightGreen))
    } else if minigame.is_obstacle(pos) {
        Span::styled("█ ", Style::default().fg(Color::DarkGray))
    } else {
        Span::styled("· ", Style::default().fg(Color::Gray))
    }
}

fn render_minigame(minigame: &Minigame, f: &mut Frame, area: Rect, cs: &mut ClickState) {
    let dialog = dialog_area(area, 36, 17);
    let mut cl = ClickableList::new();

    let status = match minigame.status {
        MinigameStatus::Playing => Span::styled(
            format!(" Guide the Fliffy home! {}s", minigame.seconds_left()),
            Style::default().fg(Color::White),
        ),
        MinigameStatus::Won => Span::styled(
            format!(" Home safe! +{}", format_number(minigame.reward)),
            Style::default().fg(Color::LightGreen).add_modifier(Modifier::BOLD),
        ),
        MinigameStatus::Lost => Span::styled(
            " Out of time!",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
    };
    cl.push(Line::from(status));

    for y in 0..GRID_SIZE {
        let mut spans = vec![Span::raw("   ")];
        spans.extend((0..GRID_SIZE).map(|x| minigame_cell(minigame, Pos::new(x, y))));
        cl.push(Line::from(spans));
    }
    // Arrow row is drawn over this blank line.
    cl.push(Line::from(""));
    if minigame.status == MinigameStatus::Playing {
        cl.push_clickable(button("Esc", "Give up", Color::Gray), CLOSE_OVERLAY);
    }

    draw_dialog(cl, "Minigame", Color::LightGreen, f, dialog, cs);

    let arrow_row = Rect::new(
        dialog.x + 1,
        dialog.y + 1 + 1 + GRID_SIZE as u16,
        dialog.width.saturating_sub(2),
        1,
    );
    let arrow_style = Style::default().fg(Color::Black).bg(Color::LightGreen);
    TabBar::new("  ")
        .tab("←", arrow_style, MINIGAME_LEFT)
        .tab("↑", arrow_style, MINIGAME_UP)
        .tab("↓", arrow_style, MINIGAME_DOWN)
        .tab("→", arrow_style, MINIGAME_RIGHT)
        .render(f, arrow_row, cs);
}

fn render_settings(f: &mut Frame, area: Rect, cs: &mut ClickState) {
    let mut cl = ClickableList::new();
    cl.push_clickable(button("s", "Save now", Color::White), MANUAL_SAVE);
    cl.push_clickable(button("e", "Export save to clipboard", Color::White), EXPORT_SAVE);
    cl.push_clickable(button("i", "Import save", Color::White), IMPORT_SAVE);
    cl.push_clickable(button("w", "Wipe save", Color::Red), WIPE_SAVE);
    cl.push(Line::from(""));
    cl.push_clickable(button("Esc", "Close", Color::Gray), CLOSE_OVERLAY);

    draw_dialog(cl, "Settings", Color::Gray, f, dialog_area(area, 36, 8), cs);
}

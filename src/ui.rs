use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};
use tui_dispatch::{EventKind, EventOutcome, RenderContext};

use crate::action::Action;
use crate::battle::{BattleSide, BattleState, MenuLevel, ROOT_ACTIONS};
use crate::map::Tile;
use crate::roster::{Portrait, VisualEffect};
use crate::state::{AppState, Direction as MoveDir, GameMode};

const BG_BASE: Color = Color::Rgb(22, 30, 22);
const BG_PANEL: Color = Color::Rgb(32, 50, 36);
const BG_PANEL_ALT: Color = Color::Rgb(26, 42, 30);
const BG_HEADER: Color = Color::Rgb(24, 40, 30);
const TEXT_MAIN: Color = Color::Rgb(224, 232, 208);
const TEXT_DIM: Color = Color::Rgb(164, 178, 152);
const ACCENT_GREEN: Color = Color::Rgb(110, 200, 118);
const ACCENT_GOLD: Color = Color::Rgb(220, 192, 116);
const ACCENT_RED: Color = Color::Rgb(218, 96, 92);
const HIGHLIGHT_TEXT: Color = Color::Rgb(18, 26, 18);
const BORDER_ACCENT: Color = Color::Rgb(70, 96, 78);

const MAP_TILES_V: u16 = 9;

const TILE_GRASS: Color = Color::Rgb(36, 108, 56);
const TILE_PATH: Color = Color::Rgb(150, 128, 76);
const TILE_THICKET: Color = Color::Rgb(24, 78, 40);
const TILE_TREE: Color = Color::Rgb(40, 58, 40);
const TILE_WATER: Color = Color::Rgb(48, 88, 144);

fn tile_style(tile: Tile, seed: u32) -> (char, Color, Color) {
    let variant = seed % 3;
    match tile {
        Tile::Grass => (if variant == 0 { '\'' } else { ' ' }, TILE_GRASS, adjust(TILE_GRASS, 14)),
        Tile::Path => (if variant == 0 { '.' } else { ' ' }, TILE_PATH, adjust(TILE_PATH, 12)),
        Tile::Thicket => ('"', TILE_THICKET, adjust(TILE_THICKET, 26)),
        Tile::Tree => ('^', TILE_TREE, adjust(TILE_TREE, 24)),
        Tile::Water => (if variant == 2 { '~' } else { ' ' }, TILE_WATER, adjust(TILE_WATER, 18)),
    }
}

fn adjust(color: Color, delta: i16) -> Color {
    match color {
        Color::Rgb(r, g, b) => {
            let clamp = |v: i16| v.clamp(0, 255) as u8;
            Color::Rgb(
                clamp(r as i16 + delta),
                clamp(g as i16 + delta),
                clamp(b as i16 + delta),
            )
        }
        other => other,
    }
}

fn tile_seed(x: u16, y: u16) -> u32 {
    let mut n = u32::from(x);
    n = n
        .wrapping_mul(374761393)
        .wrapping_add(u32::from(y).wrapping_mul(668265263));
    n ^= n >> 13;
    n.wrapping_mul(1274126177)
}

pub fn render(frame: &mut Frame, area: Rect, state: &AppState, _ctx: RenderContext) {
    frame.render_widget(Block::default().style(Style::default().bg(BG_BASE)), area);
    match state.mode {
        GameMode::MainMenu => render_main_menu(frame, area, state),
        GameMode::Overworld => {
            render_overworld(frame, area, state);
            if let Some(level) = state.encounter.fade_level() {
                dim_area(frame, area, level);
            }
        }
        GameMode::Battle => render_battle(frame, area, state),
    }
}

pub fn handle_event(event: &EventKind, state: &AppState) -> EventOutcome<Action> {
    match event {
        EventKind::Resize(width, height) => {
            EventOutcome::action(Action::UiTerminalResize(*width, *height)).with_render()
        }
        EventKind::Key(key) => handle_key(*key, state),
        _ => EventOutcome::ignored(),
    }
}

fn handle_key(key: KeyEvent, state: &AppState) -> EventOutcome<Action> {
    match state.mode {
        GameMode::MainMenu => handle_menu_key(key, state),
        GameMode::Overworld => handle_overworld_key(key, state),
        GameMode::Battle => handle_battle_key(key, state),
    }
}

fn handle_menu_key(key: KeyEvent, state: &AppState) -> EventOutcome<Action> {
    let Some(menu) = state.menu.as_ref() else {
        return EventOutcome::ignored();
    };
    let last = MENU_ENTRIES.len() - 1;
    match key.code {
        KeyCode::Up | KeyCode::Char('w') => {
            let next = if menu.selected == 0 { last } else { menu.selected - 1 };
            EventOutcome::action(Action::MenuSelect(next))
        }
        KeyCode::Down | KeyCode::Char('s') => {
            let next = if menu.selected >= last { 0 } else { menu.selected + 1 };
            EventOutcome::action(Action::MenuSelect(next))
        }
        KeyCode::Enter | KeyCode::Char('z') | KeyCode::Char('Z') => {
            if menu.selected == last {
                return EventOutcome::action(Action::Quit);
            }
            EventOutcome::action(Action::MenuConfirm)
        }
        _ => EventOutcome::ignored(),
    }
}

fn handle_overworld_key(key: KeyEvent, state: &AppState) -> EventOutcome<Action> {
    if state.encounter.input_locked() {
        return EventOutcome::ignored();
    }
    let action = match key.code {
        KeyCode::Up | KeyCode::Char('w') => Some(Action::Move(MoveDir::Up)),
        KeyCode::Down | KeyCode::Char('s') => Some(Action::Move(MoveDir::Down)),
        KeyCode::Left | KeyCode::Char('a') => Some(Action::Move(MoveDir::Left)),
        KeyCode::Right | KeyCode::Char('d') => Some(Action::Move(MoveDir::Right)),
        KeyCode::Esc => Some(Action::Init),
        _ => None,
    };
    EventOutcome::from(action)
}

fn handle_battle_key(key: KeyEvent, state: &AppState) -> EventOutcome<Action> {
    let Some(battle) = state.battle.as_ref() else {
        return EventOutcome::ignored();
    };
    // The selector only listens while the menu phase is active; timed phases
    // run on their own.
    if !battle.menu_open() {
        return EventOutcome::ignored();
    }
    let action = match key.code {
        KeyCode::Up | KeyCode::Char('w') => Some(Action::BattleMenuPrev),
        KeyCode::Down | KeyCode::Char('s') => Some(Action::BattleMenuNext),
        KeyCode::Enter | KeyCode::Char('z') | KeyCode::Char('Z') => Some(Action::BattleConfirm),
        KeyCode::Esc => Some(Action::BattleCancel),
        _ => None,
    };
    EventOutcome::from(action)
}

const MENU_ENTRIES: [&str; 2] = ["NEW GAME", "QUIT"];

fn render_main_menu(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = panel_block(" BRAMBLE ", BG_PANEL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(menu) = state.menu.as_ref() else {
        return;
    };

    let content_height = 10;
    let content_width = 34;
    let x = inner.x + (inner.width.saturating_sub(content_width)) / 2;
    let y = inner.y + (inner.height.saturating_sub(content_height)) / 2;
    let content_area = Rect::new(
        x,
        y,
        content_width.min(inner.width),
        content_height.min(inner.height),
    );

    let mut lines = vec![
        Line::from(Span::styled(
            "BRAMBLE",
            Style::default()
                .fg(ACCENT_GREEN)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "A trail-and-thicket adventure",
            Style::default().fg(TEXT_DIM),
        )),
        Line::from(""),
    ];
    for (idx, label) in MENU_ENTRIES.iter().enumerate() {
        lines.push(menu_line(label, idx == menu.selected));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Arrows/WASD: Navigate  |  Z/Enter: Select",
        Style::default().fg(TEXT_DIM),
    )));

    let paragraph = Paragraph::new(Text::from(lines))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, content_area);
}

fn render_overworld(frame: &mut Frame, area: Rect, state: &AppState) {
    if area.width < 30 || area.height < 14 {
        let warning = Paragraph::new("Terminal too small - expand window.")
            .style(Style::default().fg(TEXT_DIM))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(warning, area);
        return;
    }

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(4),
        ])
        .split(area);

    render_overworld_header(frame, layout[0], state);
    render_map(frame, layout[1], state);
    render_overworld_status(frame, layout[2], state);
}

fn render_overworld_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = panel_block(" TRAIL ", BG_HEADER);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let line = Line::from(vec![
        Span::styled(
            state.map.name.clone(),
            Style::default()
                .fg(ACCENT_GREEN)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("Steps {}", state.player.steps),
            Style::default().fg(TEXT_DIM),
        ),
    ]);
    frame.render_widget(Paragraph::new(Text::from(vec![line])), inner);
}

fn render_map(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = panel_block(state.map.name.as_str(), BG_PANEL_ALT);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.width < 8 || inner.height < 4 {
        return;
    }

    let rows_per_tile = (inner.height / MAP_TILES_V).max(1);
    let cols_per_tile = (rows_per_tile * 2).max(2);

    let view_tiles_h = (inner.width / cols_per_tile).min(state.map.width);
    let view_tiles_v = (inner.height / rows_per_tile).min(state.map.height);
    if view_tiles_h == 0 || view_tiles_v == 0 {
        return;
    }

    let origin_x = inner.x + (inner.width - view_tiles_h * cols_per_tile) / 2;
    let origin_y = inner.y + (inner.height - view_tiles_v * rows_per_tile) / 2;
    let (start_x, start_y) = map_viewport(state, view_tiles_h, view_tiles_v);
    let buf = frame.buffer_mut();

    for tile_row in 0..view_tiles_v {
        for tile_col in 0..view_tiles_h {
            let map_x = start_x + tile_col;
            let map_y = start_y + tile_row;
            let seed = tile_seed(map_x, map_y);
            let (pattern, bg, fg) = tile_style(state.map.tile(map_x, map_y), seed);

            for dy in 0..rows_per_tile {
                for dx in 0..cols_per_tile {
                    let x = origin_x + tile_col * cols_per_tile + dx;
                    let y = origin_y + tile_row * rows_per_tile + dy;
                    if let Some(cell) = buf.cell_mut((x, y)) {
                        let ch = if (seed >> ((dx + dy) % 31)) % 5 == 0 { pattern } else { ' ' };
                        cell.set_bg(bg).set_fg(fg).set_char(ch);
                    }
                }
            }
        }
    }

    // Companion first so the player stays on top when they overlap.
    let (cx, cy) = state.companion.tile();
    draw_marker(buf, origin_x, origin_y, start_x, start_y, view_tiles_h, view_tiles_v, cols_per_tile, rows_per_tile, cx, cy, '&', ACCENT_GOLD);
    draw_marker(buf, origin_x, origin_y, start_x, start_y, view_tiles_h, view_tiles_v, cols_per_tile, rows_per_tile, state.player.x, state.player.y, '@', TEXT_MAIN);
}

#[allow(clippy::too_many_arguments)]
fn draw_marker(
    buf: &mut ratatui::buffer::Buffer,
    origin_x: u16,
    origin_y: u16,
    start_x: u16,
    start_y: u16,
    view_tiles_h: u16,
    view_tiles_v: u16,
    cols_per_tile: u16,
    rows_per_tile: u16,
    map_x: u16,
    map_y: u16,
    marker: char,
    color: Color,
) {
    if map_x < start_x || map_y < start_y {
        return;
    }
    let col = map_x - start_x;
    let row = map_y - start_y;
    if col >= view_tiles_h || row >= view_tiles_v {
        return;
    }
    let x = origin_x + col * cols_per_tile + cols_per_tile / 2;
    let y = origin_y + row * rows_per_tile + rows_per_tile / 2;
    if let Some(cell) = buf.cell_mut((x, y)) {
        cell.set_char(marker);
        cell.set_style(Style::default().fg(color).add_modifier(Modifier::BOLD));
    }
}

fn map_viewport(state: &AppState, view_cols: u16, view_rows: u16) -> (u16, u16) {
    let max_x = state.map.width.saturating_sub(view_cols);
    let max_y = state.map.height.saturating_sub(view_rows);
    let start_x = state.player.x.saturating_sub(view_cols / 2).min(max_x);
    let start_y = state.player.y.saturating_sub(view_rows / 2).min(max_y);
    (start_x, start_y)
}

fn render_overworld_status(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = panel_block("STATUS", BG_PANEL_ALT);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let message = state.message.as_deref().unwrap_or("The trail winds east.");
    let lines = vec![
        Line::from(Span::styled(message, Style::default().fg(TEXT_MAIN))),
        Line::from(Span::styled(
            "Arrows/WASD move  |  Esc menu",
            Style::default().fg(TEXT_DIM),
        )),
    ];
    frame.render_widget(
        Paragraph::new(Text::from(lines)).wrap(Wrap { trim: true }),
        inner,
    );
}

fn render_battle(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(battle) = state.battle.as_ref() else {
        return;
    };

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(40),
            Constraint::Length(8),
        ])
        .split(area);

    render_combatant_panel(frame, layout[0], battle, BattleSide::Enemy);
    render_combatant_panel(frame, layout[1], battle, BattleSide::Player);
    render_command_box(frame, layout[2], battle);
}

fn render_combatant_panel(frame: &mut Frame, area: Rect, battle: &BattleState, side: BattleSide) {
    let combatant = match side {
        BattleSide::Enemy => &battle.enemy,
        BattleSide::Player => &battle.player,
    };
    let level = match side {
        BattleSide::Enemy => battle.enemy_level,
        BattleSide::Player => crate::battle::PLAYER_LEVEL,
    };
    let title = match side {
        BattleSide::Enemy => format!(" WILD {} ", combatant.name),
        BattleSide::Player => format!(" {} ", combatant.name),
    };
    let block = panel_block(title.as_str(), BG_PANEL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(26), Constraint::Min(12)])
        .split(inner);

    let stats = vec![
        hp_line(combatant.health.current(), combatant.health.max()),
        Line::from(Span::styled(
            format!("Lv {}", level),
            Style::default().fg(TEXT_DIM),
        )),
    ];
    frame.render_widget(Paragraph::new(Text::from(stats)), layout[0]);

    render_portrait(frame, layout[1], combatant.portrait, battle.active_flash(side));
}

fn render_portrait(
    frame: &mut Frame,
    area: Rect,
    portrait: Portrait,
    flash: Option<&crate::battle::EffectFlash>,
) {
    let art = portrait_art(portrait);
    let style = match flash.map(|f| f.effect) {
        Some(VisualEffect::Blink) => Style::default().fg(ACCENT_RED).add_modifier(Modifier::BOLD),
        Some(VisualEffect::Flash) => Style::default().fg(TEXT_MAIN).add_modifier(Modifier::RAPID_BLINK),
        Some(VisualEffect::Glow) => Style::default().fg(ACCENT_GOLD).add_modifier(Modifier::BOLD),
        Some(VisualEffect::Shrink) => Style::default().fg(TEXT_DIM),
        Some(VisualEffect::Spin) => Style::default().fg(ACCENT_GREEN).add_modifier(Modifier::ITALIC),
        Some(VisualEffect::Dissolve) => Style::default().fg(TEXT_DIM).add_modifier(Modifier::DIM),
        None => Style::default().fg(TEXT_MAIN),
    };
    let dissolving = matches!(flash.map(|f| f.effect), Some(VisualEffect::Dissolve));

    let lines: Vec<Line> = art
        .iter()
        .map(|row| {
            let rendered = if dissolving {
                row.chars()
                    .map(|ch| if ch == ' ' { ' ' } else { '░' })
                    .collect::<String>()
            } else {
                (*row).to_string()
            };
            Line::from(Span::styled(rendered, style))
        })
        .collect();
    let paragraph = Paragraph::new(Text::from(lines)).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn portrait_art(portrait: Portrait) -> &'static [&'static str] {
    match portrait {
        Portrait::Wren => &["   __", "  (o>", "  //\\", "  V_/_"],
        Portrait::Moss => &[" [####]", " |o  o|", " | __ |", " /|  |\\"],
        Portrait::ThornShade => &[" \\ /\\ /", " {o--o}", " /|\\/|\\", "  v  v"],
        Portrait::MireLurker => &["  ~~~~", " (o  o)", " ~\\~~/~"],
    }
}

fn render_command_box(frame: &mut Frame, area: Rect, battle: &BattleState) {
    let block = panel_block("COMMAND", BG_PANEL_ALT);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(24), Constraint::Length(20)])
        .split(inner);

    let mut text_lines: Vec<Line> = battle
        .message
        .lines()
        .map(|line| Line::from(line.to_string()))
        .collect();
    if !battle.menu_open() {
        text_lines.push(Line::from(Span::styled(
            "...",
            Style::default().fg(TEXT_DIM),
        )));
    }
    frame.render_widget(
        Paragraph::new(Text::from(text_lines))
            .style(Style::default().fg(TEXT_MAIN))
            .wrap(Wrap { trim: true }),
        layout[0],
    );

    if battle.menu_open() {
        let lines: Vec<Line> = match &battle.menu.level {
            MenuLevel::Root => ROOT_ACTIONS
                .iter()
                .enumerate()
                .map(|(idx, action)| menu_line(action.label(), idx == battle.menu.selected))
                .collect(),
            MenuLevel::Sub { items, .. } => items
                .iter()
                .enumerate()
                .map(|(idx, item)| menu_line(item, idx == battle.menu.selected))
                .collect(),
        };
        frame.render_widget(Paragraph::new(Text::from(lines)), layout[1]);
    }
}

fn hp_line(current: u16, max: u16) -> Line<'static> {
    let width: usize = 12;
    let ratio = if max == 0 {
        0.0
    } else {
        f32::from(current) / f32::from(max)
    };
    let filled = ((ratio * width as f32).round() as usize).min(width);
    let empty = width.saturating_sub(filled);
    let color = if ratio > 0.5 {
        ACCENT_GREEN
    } else if ratio > 0.2 {
        ACCENT_GOLD
    } else {
        ACCENT_RED
    };
    Line::from(vec![
        Span::raw("HP "),
        Span::styled(
            "█".repeat(filled),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled("░".repeat(empty), Style::default().fg(TEXT_DIM)),
        Span::raw(format!(" {}/{}", current, max)),
    ])
}

fn panel_block<'a, T>(title: T, bg: Color) -> Block<'a>
where
    T: Into<ratatui::widgets::block::Title<'a>>,
{
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(title)
        .style(Style::default().bg(bg).fg(TEXT_MAIN))
        .border_style(Style::default().fg(BORDER_ACCENT))
}

fn menu_line(label: &str, selected: bool) -> Line<'static> {
    if selected {
        Line::from(vec![
            Span::styled("► ", Style::default().fg(ACCENT_GREEN)),
            Span::styled(
                label.to_string(),
                Style::default()
                    .fg(HIGHLIGHT_TEXT)
                    .bg(ACCENT_GREEN)
                    .add_modifier(Modifier::BOLD),
            ),
        ])
    } else {
        Line::from(vec![
            Span::raw("  "),
            Span::styled(label.to_string(), Style::default().fg(TEXT_MAIN)),
        ])
    }
}

/// Darkens every cell in the area; `level` 0 is untouched, 1 is near black.
fn dim_area(frame: &mut Frame, area: Rect, level: f32) {
    let keep = (1.0 - level.clamp(0.0, 1.0) * 0.85).max(0.1);
    let buf = frame.buffer_mut();
    for y in area.y..area.y + area.height {
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, y)) {
                if let Color::Rgb(r, g, b) = cell.bg {
                    cell.bg = scale_rgb(r, g, b, keep);
                }
                if let Color::Rgb(r, g, b) = cell.fg {
                    cell.fg = scale_rgb(r, g, b, keep);
                }
            }
        }
    }
}

fn scale_rgb(r: u8, g: u8, b: u8, keep: f32) -> Color {
    Color::Rgb(
        (f32::from(r) * keep) as u8,
        (f32::from(g) * keep) as u8,
        (f32::from(b) * keep) as u8,
    )
}

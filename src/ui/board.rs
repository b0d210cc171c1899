use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, BorderType, Borders, Paragraph, Widget, Wrap},
};

use crate::app::{App, GRID_COLUMNS};
use crate::matching::{MatchingSession, Phase, PickOutcome, Turn};
use crate::ui::{bold, fit, frame_layout, render_header, render_legend};

/// How a single tile should look right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileLook {
    Idle,
    Selected,
    Matched,
    /// Part of a pick that is being shown as correct
    Hit,
    /// Part of a pick that is being shown as wrong
    Miss,
}

pub fn tile_look(game: &MatchingSession, pos: usize) -> TileLook {
    let feedback = match game.turn() {
        Some(Turn::ShowingFeedback(outcome)) if game.is_selected(pos) => Some(outcome),
        _ => None,
    };
    match feedback {
        Some(PickOutcome::Match) => TileLook::Hit,
        Some(PickOutcome::Mismatch) => TileLook::Miss,
        None if game.is_matched(pos) => TileLook::Matched,
        None if game.is_selected(pos) => TileLook::Selected,
        None => TileLook::Idle,
    }
}

/// Pure presenter: style for a tile given its look and whether the cursor is on it
pub fn tile_style(look: TileLook, under_cursor: bool) -> Style {
    let style = match look {
        TileLook::Idle => Style::default(),
        TileLook::Selected => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        TileLook::Matched => Style::default().fg(Color::Green).add_modifier(Modifier::DIM),
        TileLook::Hit => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        TileLook::Miss => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    };
    if under_cursor {
        style.add_modifier(Modifier::REVERSED)
    } else {
        style
    }
}

fn status_line(app: &App, game: &MatchingSession) -> String {
    let pairs = game.pairs().len();
    let found = game.matched().len() / 2;
    match game.phase() {
        Phase::Loading => "Loading pairs…".to_string(),
        Phase::Playing => format!(
            "{}  ·  {found}/{pairs} matched  ·  {}s",
            app.title(),
            game.elapsed_secs()
        ),
        Phase::Done => format!(
            "{}  ·  all {pairs} pairs matched in {}s",
            app.title(),
            game.elapsed_secs()
        ),
    }
}

pub fn render(app: &App, game: &MatchingSession, area: Rect, buf: &mut Buffer) {
    let [header, body, legend] = frame_layout(area);
    render_header(status_line(app, game), header, buf);

    let tiles = game.items();
    if !tiles.is_empty() {
        let rows = tiles.len().div_ceil(GRID_COLUMNS);
        let row_areas = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Ratio(1, rows as u32); rows])
            .split(body);

        for (row, row_area) in row_areas.iter().enumerate() {
            let cells = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(vec![Constraint::Ratio(1, GRID_COLUMNS as u32); GRID_COLUMNS])
                .split(*row_area);

            for (col, cell) in cells.iter().enumerate() {
                let pos = row * GRID_COLUMNS + col;
                let Some(tile) = tiles.get(pos) else {
                    continue;
                };
                let style = tile_style(tile_look(game, pos), pos == app.cursor());
                let width = cell.width.saturating_sub(2) as usize;
                let block = Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(style);
                Paragraph::new(fit(&tile.text, width * cell.height.saturating_sub(2).max(1) as usize))
                    .style(style)
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true })
                    .block(block)
                    .render(*cell, buf);
            }
        }
    }

    let help = if game.is_done() {
        "(r)estart / (n)ew document / (esc)ape"
    } else {
        "←↑↓→ move / (enter) pick / (r)estart / (n)ew document / (esc)ape"
    };
    render_legend(help, legend, buf);
    if game.is_done() {
        let banner = Rect {
            y: legend.y.saturating_sub(1),
            height: 1.min(legend.y),
            ..legend
        };
        Paragraph::new("Well done!")
            .style(bold().fg(Color::Green))
            .alignment(Alignment::Center)
            .render(banner, buf);
    }
}

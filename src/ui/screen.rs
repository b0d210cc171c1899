use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
};

use crate::app::{App, AppState};
use crate::schema::ArtifactKind;
use crate::session::Session;
use crate::ui::{board, cards, dim, frame_layout, render_header, render_legend};

/// A UI Screen boundary: renders one [`AppState`]
pub trait Screen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer);
}

/// Document path input and artifact kind picker
pub struct UploadScreen;

impl Screen for UploadScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let [header, body, legend] = frame_layout(area);
        render_header("studyforge".to_string(), header, buf);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(body);

        let path = if app.form.path.is_empty() {
            Span::styled("path to a PDF", dim())
        } else {
            Span::raw(app.form.path.clone())
        };
        Paragraph::new(Line::from(vec![path, Span::styled("▏", dim())]))
            .block(Block::default().borders(Borders::ALL).title(" Document "))
            .render(rows[0], buf);

        let kinds: Vec<Span> = ArtifactKind::ALL
            .iter()
            .flat_map(|kind| {
                let style = if *kind == app.form.kind {
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD | Modifier::REVERSED)
                } else {
                    dim()
                };
                [Span::styled(format!(" {kind} "), style), Span::raw("  ")]
            })
            .collect();
        Paragraph::new(Line::from(kinds))
            .alignment(Alignment::Center)
            .render(rows[2], buf);

        render_legend("(tab) kind / (enter) generate / (esc)ape", legend, buf);
    }
}

/// Progress while the model streams items back
pub struct GeneratingScreen;

impl Screen for GeneratingScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let [header, body, legend] = frame_layout(area);
        render_header(
            format!("Generating {} from {}", app.form.kind, app.title()),
            header,
            buf,
        );

        let expected = app.form.kind.expected_len();
        let streamed = app.streamed().min(expected);
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3), Constraint::Min(0)])
            .split(body);
        Gauge::default()
            .block(Block::default().borders(Borders::ALL))
            .gauge_style(Style::default().fg(Color::Magenta))
            .ratio(streamed as f64 / expected as f64)
            .label(format!("{streamed}/{expected} items"))
            .render(rows[1], buf);

        render_legend("(n)ew document / (esc)ape", legend, buf);
    }
}

pub struct FailedScreen;

impl Screen for FailedScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let [header, body, legend] = frame_layout(area);
        render_header("Generation failed".to_string(), header, buf);

        Paragraph::new(app.last_error().unwrap_or("unknown error").to_string())
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL))
            .render(body, buf);

        render_legend("(r)etry / (n)ew document / (esc)ape", legend, buf);
    }
}

/// Delegates to the renderer for the active session kind
pub struct PracticeScreen;

impl Screen for PracticeScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        match app.session() {
            Some(Session::Matching(game)) => board::render(app, game, area, buf),
            Some(Session::Flashcards(session)) => cards::render_flashcards(app, session, area, buf),
            Some(Session::Quiz(quiz)) => cards::render_quiz(app, quiz, area, buf),
            None => {}
        }
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: AppState) -> Box<dyn Screen> {
    match state {
        AppState::Upload => Box::new(UploadScreen),
        AppState::Generating => Box::new(GeneratingScreen),
        AppState::Failed => Box::new(FailedScreen),
        AppState::Practice => Box::new(PracticeScreen),
    }
}

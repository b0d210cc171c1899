use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget, Wrap},
};

use crate::app::App;
use crate::flashcards::FlashcardSession;
use crate::quiz::QuizSession;
use crate::schema::AnswerKey;
use crate::ui::{bold, dim, frame_layout, render_header, render_legend};

pub fn render_flashcards(app: &App, session: &FlashcardSession, area: Rect, buf: &mut Buffer) {
    let [header, body, legend] = frame_layout(area);
    let tally = session.tally();
    render_header(
        format!(
            "{}  ·  card {}/{}  ·  {} known  ·  {} learning",
            app.title(),
            (session.index() + 1).min(session.cards().len()),
            session.cards().len(),
            tally.known,
            tally.learning
        ),
        header,
        buf,
    );

    if session.is_done() {
        let summary = vec![
            Line::from(Span::styled("Deck complete", bold().fg(Color::Green))),
            Line::from(""),
            Line::from(format!(
                "{} known, {} still learning ({}%)",
                tally.known,
                tally.learning,
                session.progress_percent()
            )),
        ];
        Paragraph::new(summary)
            .alignment(Alignment::Center)
            .render(body, buf);
        render_legend("(r)estart / (n)ew document / (esc)ape", legend, buf);
        return;
    }

    if let Some(card) = session.current() {
        let (label, text, color) = if session.is_flipped() {
            ("Definition", card.definition.as_str(), Color::Yellow)
        } else {
            ("Term", card.term.as_str(), Color::Cyan)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(color))
            .title(format!(" {label} "));
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(7), Constraint::Min(0)])
            .split(body);
        Paragraph::new(text.to_string())
            .style(bold())
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block)
            .render(rows[1], buf);
    }

    render_legend(
        "(space) flip / (k)nown / (l)earning / (s)huffle / (r)estart / (n)ew document / (esc)ape",
        legend,
        buf,
    );
}

fn option_line(quiz: &QuizSession, key: AnswerKey, text: &str) -> Line<'static> {
    let chosen = quiz.current_answer() == Some(key);
    let correct = quiz.current().map(|q| q.answer) == Some(key);

    let style = match (quiz.is_submitted(), chosen, correct) {
        (true, _, true) => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        (true, true, false) => Style::default().fg(Color::Red).add_modifier(Modifier::CROSSED_OUT),
        (false, true, _) => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        _ => Style::default(),
    };
    let marker = if chosen { "●" } else { "○" };
    Line::from(vec![
        Span::styled(format!("{marker} {}) ", key.letter()), style),
        Span::styled(text.to_string(), style),
    ])
}

pub fn render_quiz(app: &App, quiz: &QuizSession, area: Rect, buf: &mut Buffer) {
    let [header, body, legend] = frame_layout(area);
    let title = match quiz.score() {
        Some(score) => format!(
            "{}  ·  score {}/{} ({}%)",
            app.title(),
            score.correct,
            score.total,
            score.percent
        ),
        None => format!(
            "{}  ·  question {}/{}  ·  {} answered",
            app.title(),
            quiz.index() + 1,
            quiz.questions().len(),
            quiz.answered_count()
        ),
    };
    render_header(title, header, buf);

    if let Some(question) = quiz.current() {
        let mut lines = vec![
            Line::from(Span::styled(question.question.clone(), bold())),
            Line::from(""),
        ];
        for (idx, option) in question.options.iter().enumerate() {
            if let Some(key) = AnswerKey::from_index(idx) {
                lines.push(option_line(quiz, key, option));
            }
        }
        if !quiz.is_submitted() && quiz.all_answered() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("All answered, press enter to submit", dim())));
        }
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL))
            .render(body, buf);
    }

    let help = if quiz.is_submitted() {
        "←→ review / (r)etake / (n)ew document / (esc)ape"
    } else {
        "(a-d) answer / ←→ question / (enter) submit / (r)estart / (n)ew document / (esc)ape"
    };
    render_legend(help, legend, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Question;

    fn quiz() -> QuizSession {
        QuizSession::new(vec![
            Question {
                question: "Capital of France?".into(),
                options: vec!["Paris".into(), "Rome".into(), "Oslo".into(), "Bern".into()],
                answer: AnswerKey::A,
            };
            4
        ])
    }

    fn modifiers(line: &Line) -> Modifier {
        line.spans[0].style.add_modifier
    }

    #[test]
    fn submitted_quiz_marks_wrong_choice() {
        let mut q = quiz();
        for _ in 0..4 {
            q.choose(AnswerKey::B);
            q.next();
        }
        assert!(q.submit());

        let wrong = option_line(&q, AnswerKey::B, "Rome");
        let right = option_line(&q, AnswerKey::A, "Paris");
        assert!(modifiers(&wrong).contains(Modifier::CROSSED_OUT));
        assert_eq!(right.spans[0].style.fg, Some(Color::Green));
    }

    #[test]
    fn unsubmitted_quiz_hides_the_answer() {
        let mut q = quiz();
        q.choose(AnswerKey::C);

        assert_eq!(option_line(&q, AnswerKey::A, "Paris").spans[0].style, Style::default());
        assert!(option_line(&q, AnswerKey::C, "Oslo").spans[0]
            .content
            .starts_with('●'));
    }
}

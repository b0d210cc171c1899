//! Application shell: the upload form, the generation lifecycle and the
//! practice screen for whichever session is active.

use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{debug, info, warn};

use crate::flashcards::Outcome;
use crate::generate::{
    spawn_generation, CancelToken, Document, GenerationEvent, GenerationRequest, Generator,
};
use crate::error::GenerationError;
use crate::runtime::AppEvent;
use crate::schema::{write_artifact, AnswerKey, Artifact, ArtifactKind};
use crate::session::Session;

/// Tiles per row on the matching board
pub const GRID_COLUMNS: usize = 4;

/// Builds the inference backend when a generation starts
pub type GeneratorFactory = Box<dyn Fn() -> Result<Arc<dyn Generator>, GenerationError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Upload,
    Generating,
    Failed,
    Practice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadForm {
    pub path: String,
    pub kind: ArtifactKind,
}

pub struct App {
    pub state: AppState,
    pub form: UploadForm,
    session: Option<Session>,
    factory: GeneratorFactory,
    tx: Sender<AppEvent>,
    generation_id: u64,
    cancel: Option<CancelToken>,
    streamed: usize,
    last_error: Option<String>,
    title: String,
    cursor: usize,
    save_path: Option<PathBuf>,
}

impl App {
    pub fn new(factory: GeneratorFactory, tx: Sender<AppEvent>, kind: ArtifactKind) -> Self {
        Self {
            state: AppState::Upload,
            form: UploadForm {
                path: String::new(),
                kind,
            },
            session: None,
            factory,
            tx,
            generation_id: 0,
            cancel: None,
            streamed: 0,
            last_error: None,
            title: String::new(),
            cursor: 0,
            save_path: None,
        }
    }

    pub fn with_document(mut self, path: impl Into<String>) -> Self {
        self.form.path = path.into();
        self
    }

    /// Write every successfully generated artifact to `path`
    pub fn with_save_path(mut self, path: Option<PathBuf>) -> Self {
        self.save_path = path;
        self
    }

    pub fn on_event(&mut self, event: AppEvent) -> Flow {
        match event {
            AppEvent::Key(key) => self.on_key(key),
            AppEvent::Generation { id, event } => {
                self.on_generation(id, event);
                Flow::Continue
            }
            AppEvent::Tick | AppEvent::Resize => Flow::Continue,
        }
    }

    pub fn on_tick(&mut self, dt: Duration) {
        if let Some(session) = self.session.as_mut() {
            session.on_tick(dt);
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Flow {
        let ctrl_c =
            key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c');
        if key.code == KeyCode::Esc || ctrl_c {
            self.shutdown();
            return Flow::Quit;
        }

        match self.state {
            AppState::Upload => match key.code {
                KeyCode::Char(c) => self.form.path.push(c),
                KeyCode::Backspace => {
                    self.form.path.pop();
                }
                KeyCode::Tab => self.form.kind = self.form.kind.next(),
                KeyCode::Enter => self.start_generation(),
                _ => {}
            },
            AppState::Generating => {
                if key.code == KeyCode::Char('n') {
                    self.try_another();
                }
            }
            AppState::Failed => match key.code {
                KeyCode::Char('r') => self.start_generation(),
                KeyCode::Char('n') => self.try_another(),
                _ => {}
            },
            AppState::Practice => match key.code {
                KeyCode::Char('r') => self.restart(),
                KeyCode::Char('n') => self.try_another(),
                _ => self.on_practice_key(key.code),
            },
        }
        Flow::Continue
    }

    fn on_practice_key(&mut self, code: KeyCode) {
        let cursor = self.cursor;
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match session {
            Session::Flashcards(cards) => match code {
                KeyCode::Char(' ') | KeyCode::Enter => cards.flip(),
                KeyCode::Char('k') => {
                    cards.mark_and_advance(Outcome::Known);
                }
                KeyCode::Char('l') => {
                    cards.mark_and_advance(Outcome::Learning);
                }
                KeyCode::Char('s') => cards.shuffle(),
                _ => {}
            },
            Session::Quiz(quiz) => match code {
                KeyCode::Left => {
                    quiz.previous();
                }
                KeyCode::Right => {
                    quiz.next();
                }
                KeyCode::Enter => {
                    if !quiz.submit() {
                        debug!("quiz submit refused, {} answered", quiz.answered_count());
                    }
                }
                KeyCode::Char(c) => {
                    if let Some(answer) = answer_for(c) {
                        quiz.choose(answer);
                    }
                }
                _ => {}
            },
            Session::Matching(game) => {
                let len = game.items().len();
                match code {
                    KeyCode::Left if cursor > 0 => self.cursor -= 1,
                    KeyCode::Right if cursor + 1 < len => self.cursor += 1,
                    KeyCode::Up if cursor >= GRID_COLUMNS => self.cursor -= GRID_COLUMNS,
                    KeyCode::Down if cursor + GRID_COLUMNS < len => self.cursor += GRID_COLUMNS,
                    KeyCode::Enter | KeyCode::Char(' ') => {
                        game.select(cursor);
                    }
                    _ => {}
                }
            }
        }
    }

    /// Read the document in the form and start a new generation request.
    /// Any earlier request is cancelled first.
    pub fn start_generation(&mut self) {
        self.cancel_generation();
        self.streamed = 0;
        self.last_error = None;

        let path = self.form.path.trim().to_string();
        let document = match Document::from_path(&path) {
            Ok(document) => document,
            Err(e) => return self.fail(e),
        };
        let generator = match (self.factory)() {
            Ok(generator) => generator,
            Err(e) => return self.fail(e),
        };

        self.generation_id += 1;
        let cancel = CancelToken::new();
        self.title = document.title().to_string();
        info!(
            "generation {} started: {} from {:?}",
            self.generation_id, self.form.kind, document
        );
        spawn_generation(
            generator,
            GenerationRequest {
                document,
                kind: self.form.kind,
            },
            self.generation_id,
            cancel.clone(),
            self.tx.clone(),
        );
        self.cancel = Some(cancel);
        self.state = AppState::Generating;
    }

    pub fn on_generation(&mut self, id: u64, event: GenerationEvent) {
        if id != self.generation_id || self.state != AppState::Generating {
            debug!("discarding event from stale generation {id}");
            return;
        }

        match event {
            GenerationEvent::Item(_) => self.streamed += 1,
            GenerationEvent::Finished(Ok(artifact)) => {
                self.cancel = None;
                if let Some(path) = &self.save_path {
                    match write_artifact(path, &artifact) {
                        Ok(()) => info!("saved {} to {}", artifact.kind(), path.display()),
                        Err(e) => warn!("could not save artifact: {e}"),
                    }
                }
                let title = self.title.clone();
                self.practice(artifact, title);
            }
            GenerationEvent::Finished(Err(e)) => {
                self.cancel = None;
                self.fail(e);
            }
        }
    }

    /// Switch to practising `artifact`, replacing any current session
    pub fn practice(&mut self, artifact: Artifact, title: impl Into<String>) {
        self.teardown_session();
        self.title = title.into();
        self.form.kind = artifact.kind();
        info!("practising {} {} items", artifact.len(), artifact.kind());
        self.session = Some(Session::from_artifact(artifact));
        self.cursor = 0;
        self.state = AppState::Practice;
    }

    /// Reset progress on the current session, keeping its content
    pub fn restart(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.restart();
            self.cursor = 0;
        }
    }

    /// Drop the current session or request and go back to the upload form
    pub fn try_another(&mut self) {
        self.cancel_generation();
        self.teardown_session();
        self.streamed = 0;
        self.last_error = None;
        self.state = AppState::Upload;
    }

    pub fn shutdown(&mut self) {
        self.cancel_generation();
        self.teardown_session();
    }

    fn fail(&mut self, error: GenerationError) {
        warn!("generation failed: {error}");
        self.last_error = Some(error.to_string());
        self.state = AppState::Failed;
    }

    fn cancel_generation(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            info!("cancelling generation {}", self.generation_id);
            cancel.cancel();
        }
    }

    fn teardown_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.teardown();
        }
        self.cursor = 0;
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn generation_id(&self) -> u64 {
        self.generation_id
    }

    pub fn streamed(&self) -> usize {
        self.streamed
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

fn answer_for(c: char) -> Option<AnswerKey> {
    match c.to_ascii_lowercase() {
        'a' | '1' => Some(AnswerKey::A),
        'b' | '2' => Some(AnswerKey::B),
        'c' | '3' => Some(AnswerKey::C),
        'd' | '4' => Some(AnswerKey::D),
        _ => None,
    }
}

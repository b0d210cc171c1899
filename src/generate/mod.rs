//! Turning a document into a validated study artifact.
//!
//! Generation is two-staged: a [`Generator`] streams raw model text, which a
//! [`StreamAssembler`] splits into partial items for progress display; once
//! the stream ends the whole collection is validated in one go.

mod document;
pub mod gemini;
pub mod prompts;
mod stream;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{info, warn};
use serde_json::Value;

pub use document::{Document, MAX_INLINE_BYTES};
pub use gemini::GeminiClient;
pub use stream::StreamAssembler;

use crate::error::GenerationError;
use crate::runtime::AppEvent;
use crate::schema::{Artifact, ArtifactKind};

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub document: Document,
    pub kind: ArtifactKind,
}

/// Backend producing raw model text for a request
pub trait Generator: Send + Sync {
    /// Feed each text fragment to `on_text` as it arrives. When `on_text`
    /// returns false the stream is abandoned with [`GenerationError::Cancelled`].
    fn stream(
        &self,
        request: &GenerationRequest,
        on_text: &mut dyn FnMut(&str) -> bool,
    ) -> Result<(), GenerationError>;
}

/// Shared flag telling a running request to stop
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub enum GenerationEvent {
    /// A complete but not yet validated item
    Item(Value),
    Finished(Result<Artifact, GenerationError>),
}

/// Run `request` to completion, reporting partial items through `on_item`
pub fn generate(
    generator: &dyn Generator,
    request: &GenerationRequest,
    cancel: &CancelToken,
    mut on_item: impl FnMut(Value),
) -> Result<Artifact, GenerationError> {
    let mut assembler = StreamAssembler::new();
    generator.stream(request, &mut |text: &str| {
        if cancel.is_cancelled() {
            return false;
        }
        for item in assembler.push(text) {
            on_item(item);
        }
        true
    })?;

    if cancel.is_cancelled() {
        return Err(GenerationError::Cancelled);
    }
    info!(
        "stream for {} finished after {} bytes, {} items",
        request.kind,
        assembler.text().len(),
        assembler.emitted()
    );
    assembler.finish(request.kind)
}

/// Run a request on its own thread, forwarding progress as [`AppEvent`]s
/// tagged with `id`. Nothing is sent once `cancel` is set.
pub fn spawn_generation(
    generator: Arc<dyn Generator>,
    request: GenerationRequest,
    id: u64,
    cancel: CancelToken,
    tx: Sender<AppEvent>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let item_tx = tx.clone();
        let item_cancel = cancel.clone();
        let result = generate(generator.as_ref(), &request, &cancel, |item| {
            if !item_cancel.is_cancelled() {
                let _ = item_tx.send(AppEvent::Generation {
                    id,
                    event: GenerationEvent::Item(item),
                });
            }
        });

        if cancel.is_cancelled() {
            info!("generation {id} cancelled, dropping its result");
            return;
        }
        if let Err(e) = &result {
            warn!("generation {id} failed: {e}");
        }
        let _ = tx.send(AppEvent::Generation {
            id,
            event: GenerationEvent::Finished(result),
        });
    })
}

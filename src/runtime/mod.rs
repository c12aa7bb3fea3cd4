//! Runtime wiring for a TabbiMate session
//!
//! One runtime task owns the view state; the UI talks to it over an
//! event channel and listens on a broadcast channel.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::SessionRuntime;
pub use traits::*;

use crate::chat::{AssistantStub, PartnerChannel};
use crate::directory::{ProfileDirectory, StaticDirectory};
use crate::matching::MatchEngine;
use crate::state_machine::{Event, Notice, SessionContext, View, ViewKind};
use crate::store::{KvStore, LanguageRequest};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};

/// Events pushed to the UI
#[derive(Debug, Clone)]
pub enum UiEvent {
    /// The view state changed; carries a full snapshot
    ViewChanged { view: View },
    /// A cross-fade finished: the view is now interactive
    ViewSettled { view: ViewKind },
    /// Which markers to show: None means all of them
    MarkersVisible { language: Option<String> },
    /// A modal notice to surface
    Notice { notice: Notice },
    /// Favorite status of the current partner changed (or was primed)
    FavoriteChanged { status: FavoriteStatus },
    /// A language request was persisted
    RequestSaved { request: LanguageRequest },
}

/// Handle to interact with a running session
#[derive(Clone)]
pub struct SessionHandle {
    pub event_tx: mpsc::Sender<Event>,
    pub broadcast_tx: broadcast::Sender<UiEvent>,
}

impl SessionHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.broadcast_tx.subscribe()
    }

    pub async fn send(&self, event: Event) {
        if let Err(e) = self.event_tx.send(event).await {
            tracing::error!(error = %e, "Session runtime is gone");
        }
    }
}

/// Start the production runtime: static directory, rusqlite-backed
/// persistence, stub chat transports.
pub fn launch(kv: KvStore) -> SessionHandle {
    let context = SessionContext::default();
    let directory: Arc<dyn ProfileDirectory> = Arc::new(StaticDirectory::seeded());
    let engine = MatchEngine::new(directory, context.current_user.clone());
    let persistence = StorePersistence::new(kv);

    let (event_tx, event_rx) = mpsc::channel(32);
    let (broadcast_tx, _) = broadcast::channel(256);

    let runtime = SessionRuntime::new(
        context,
        View::default(),
        engine,
        persistence,
        Arc::new(AssistantStub),
        Arc::new(PartnerChannel),
        event_rx,
        event_tx.clone(),
        broadcast_tx.clone(),
    );

    tokio::spawn(runtime.run());

    SessionHandle {
        event_tx,
        broadcast_tx,
    }
}

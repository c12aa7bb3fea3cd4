//! Session runtime executor
//!
//! Owns the view state and drives it: events come in over a channel,
//! the pure transition function decides what changes, and the effects
//! it returns are executed here against the trait-abstracted
//! collaborators. Scheduled work (countdown, cross-fade, chat replies)
//! runs on spawned tasks that feed events back into the same channel.

use super::traits::Persistence;
use super::UiEvent;
use crate::chat::ChatTransport;
use crate::matching::MatchEngine;
use crate::state_machine::{transition, Effect, Event, Notice, Panel, SessionContext, View};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

pub struct SessionRuntime<P>
where
    P: Persistence + 'static,
{
    context: SessionContext,
    state: View,
    engine: MatchEngine,
    persistence: P,
    assistant: Arc<dyn ChatTransport>,
    partner: Arc<dyn ChatTransport>,
    event_rx: mpsc::Receiver<Event>,
    event_tx: mpsc::Sender<Event>,
    broadcast_tx: broadcast::Sender<UiEvent>,
    /// Token to cancel the running countdown task
    countdown_cancel: Option<CancellationToken>,
}

impl<P> SessionRuntime<P>
where
    P: Persistence + 'static,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        context: SessionContext,
        state: View,
        engine: MatchEngine,
        persistence: P,
        assistant: Arc<dyn ChatTransport>,
        partner: Arc<dyn ChatTransport>,
        event_rx: mpsc::Receiver<Event>,
        event_tx: mpsc::Sender<Event>,
        broadcast_tx: broadcast::Sender<UiEvent>,
    ) -> Self {
        Self {
            context,
            state,
            engine,
            persistence,
            assistant,
            partner,
            event_rx,
            event_tx,
            broadcast_tx,
            countdown_cancel: None,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(user = %self.context.current_user, "Starting session runtime");

        // Process events in a loop - no recursion
        loop {
            tokio::select! {
                Some(event) = self.event_rx.recv() => {
                    if let Err(e) = self.process_event(event).await {
                        tracing::error!(error = %e, "Error handling event");
                    }
                }
                else => break,
            }
        }

        if let Some(token) = self.countdown_cancel.take() {
            token.cancel();
        }
        tracing::info!("Session runtime stopped");
    }

    async fn process_event(&mut self, event: Event) -> Result<(), String> {
        if let Event::ReportSubmitted { reason } = &event {
            tracing::info!(reason = %reason, "Partner reported");
        }

        // Effects can generate follow-up events (e.g. a resolved match);
        // process them in a loop.
        let mut events_to_process = vec![event];

        while let Some(current_event) = events_to_process.pop() {
            let result = match transition(&self.state, &self.context, current_event) {
                Ok(r) => r,
                Err(e) => {
                    // The host surface is assumed well-formed; anything it
                    // sends out of turn is dropped.
                    tracing::warn!(error = %e, "Ignoring event");
                    continue;
                }
            };

            self.state = result.new_state.clone();
            tracing::debug!(
                view = ?self.state.kind(),
                language = ?self.state.selected_language(),
                "View updated"
            );
            let _ = self.broadcast_tx.send(UiEvent::ViewChanged {
                view: result.new_state,
            });

            for effect in result.effects {
                if let Some(generated_event) = self.execute_effect(effect).await? {
                    events_to_process.push(generated_event);
                }
            }
        }

        Ok(())
    }

    fn transport(&self, panel: Panel) -> Arc<dyn ChatTransport> {
        match panel {
            Panel::Assistant => self.assistant.clone(),
            Panel::Messages => self.partner.clone(),
        }
    }

    async fn execute_effect(&mut self, effect: Effect) -> Result<Option<Event>, String> {
        match effect {
            Effect::FilterMarkers { language } => {
                let _ = self.broadcast_tx.send(UiEvent::MarkersVisible {
                    language: Some(language),
                });
                Ok(None)
            }

            Effect::ShowAllMarkers => {
                let _ = self
                    .broadcast_tx
                    .send(UiEvent::MarkersVisible { language: None });
                Ok(None)
            }

            Effect::BeginFade { into } => {
                let event_tx = self.event_tx.clone();
                let fade = self.context.fade;
                tokio::spawn(async move {
                    tokio::time::sleep(fade).await;
                    let _ = event_tx.send(Event::FadeSettled { into }).await;
                });
                Ok(None)
            }

            Effect::ShowView { view } => {
                let _ = self.broadcast_tx.send(UiEvent::ViewSettled { view });
                Ok(None)
            }

            Effect::FindMatch { language, level } => {
                let matched = self.engine.find_match(&language, level);
                match matched {
                    Some(profile) => {
                        tracing::info!(partner = %profile.name, %language, "Matched");
                        Ok(Some(Event::MatchFound { profile }))
                    }
                    None => {
                        tracing::info!(%language, ?level, "No match available");
                        Ok(Some(Event::MatchFailed))
                    }
                }
            }

            Effect::StartCountdown => {
                if let Some(token) = self.countdown_cancel.take() {
                    token.cancel();
                }
                let token = CancellationToken::new();
                self.countdown_cancel = Some(token.clone());

                let event_tx = self.event_tx.clone();
                tokio::spawn(async move {
                    // The first tick fires immediately, then once per second.
                    let mut interval = tokio::time::interval(Duration::from_secs(1));
                    loop {
                        tokio::select! {
                            _ = token.cancelled() => break,
                            _ = interval.tick() => {
                                if event_tx.send(Event::CountdownTick).await.is_err() {
                                    break;
                                }
                            }
                        }
                    }
                });
                Ok(None)
            }

            Effect::StopCountdown => {
                if let Some(token) = self.countdown_cancel.take() {
                    token.cancel();
                }
                Ok(None)
            }

            Effect::ToggleFavorite { username } => {
                match self.persistence.toggle(&username).await {
                    Ok(status) => {
                        let notice = if status.favorited {
                            Notice::favorite_added(&username)
                        } else {
                            Notice::favorite_removed(&username)
                        };
                        let _ = self
                            .broadcast_tx
                            .send(UiEvent::FavoriteChanged { status });
                        let _ = self.broadcast_tx.send(UiEvent::Notice { notice });
                    }
                    Err(e) => {
                        tracing::error!(error = %e, %username, "Favorite toggle failed");
                        let _ = self.broadcast_tx.send(UiEvent::Notice {
                            notice: Notice::save_failed("favorites"),
                        });
                    }
                }
                Ok(None)
            }

            Effect::RecordMatchedUser { username } => {
                if let Err(e) = self
                    .persistence
                    .record_matched_user(username.as_deref())
                    .await
                {
                    tracing::warn!(error = %e, "Could not record matched user");
                }
                // Entering a call: prime the favorite display for the partner
                if let Some(name) = username {
                    let status = self.persistence.status(&name).await;
                    let _ = self
                        .broadcast_tx
                        .send(UiEvent::FavoriteChanged { status });
                }
                Ok(None)
            }

            Effect::SendChat { panel, text } => {
                let transport = self.transport(panel);
                let event_tx = self.event_tx.clone();
                tokio::spawn(async move {
                    if let Some(line) = transport.send(&text).await {
                        let _ = event_tx.send(Event::ChatReply { panel, line }).await;
                    }
                });
                Ok(None)
            }

            Effect::FetchGreeting { panel } => {
                Ok(self
                    .transport(panel)
                    .opening_line()
                    .map(|line| Event::ChatReply { panel, line }))
            }

            Effect::AppendRequest {
                language,
                email,
                notes,
            } => {
                match self.persistence.append(&language, &email, &notes).await {
                    Ok(request) => {
                        tracing::info!(language = %request.language, id = %request.id, "Language request saved");
                        let _ = self.broadcast_tx.send(UiEvent::RequestSaved { request });
                        let _ = self.broadcast_tx.send(UiEvent::Notice {
                            notice: Notice::request_submitted(&language),
                        });
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Could not save language request");
                        let _ = self.broadcast_tx.send(UiEvent::Notice {
                            notice: Notice::save_failed("your request"),
                        });
                    }
                }
                Ok(None)
            }

            Effect::Notify { notice } => {
                let _ = self.broadcast_tx.send(UiEvent::Notice { notice });
                Ok(None)
            }
        }
    }
}

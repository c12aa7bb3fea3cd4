//! Main TUI application
//!
//! Bridges the terminal to the session runtime: key presses become
//! events, runtime broadcasts become render state. The app itself holds
//! no call logic; it renders snapshots and forwards intents.

use super::map::{render_map, visible_profiles};
use super::profile::{ProfileInput, ProfileScreen};
use super::screens::{
    render_call, render_language_card, render_level_card, render_modal, HELP_MENU_ITEMS,
};
use crate::directory::{Profile, ProfileDirectory, StaticDirectory, LANGUAGES};
use crate::runtime::{FavoriteStatus, SessionHandle, UiEvent};
use crate::state_machine::{Event, Notice, Panel, View, SESSION_LEVELS};
use crate::store::ProfileStore;
use crossterm::{
    event::{self, Event as TermEvent, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::collections::VecDeque;
use std::io;
use std::time::Duration;
use tokio::sync::broadcast;

/// Modal dialogs layered over the current view
#[derive(Debug, Clone, PartialEq)]
enum Modal {
    Notice(Notice),
    ConfirmBlock { username: String },
    ReportPrompt { buffer: String },
    ConfirmEndAfterReport,
    RequestForm { fields: [String; 3], field: usize },
}

const REQUEST_FIELDS: [&str; 3] = ["Language", "Email", "Notes"];

pub struct TuiApp {
    handle: SessionHandle,
    events: broadcast::Receiver<UiEvent>,
    profiles: Vec<Profile>,

    view: View,
    /// False while a cross-fade is pending; card input is ignored
    interactive: bool,
    marker_filter: Option<String>,
    focused_marker: Option<usize>,
    favorite: Option<FavoriteStatus>,

    cursor: usize,
    help_menu: Option<usize>,
    chat_input: Option<String>,
    modal: Option<Modal>,
    pending_notices: VecDeque<Notice>,
    profile_screen: Option<ProfileScreen>,
    profile_store: ProfileStore,

    should_quit: bool,
}

impl TuiApp {
    pub fn new(handle: SessionHandle, profile_store: ProfileStore) -> Self {
        let events = handle.subscribe();
        Self {
            handle,
            events,
            profiles: StaticDirectory::seeded().profiles().to_vec(),
            view: View::default(),
            interactive: true,
            marker_filter: None,
            focused_marker: None,
            favorite: None,
            cursor: 0,
            help_menu: None,
            chat_input: None,
            modal: None,
            pending_notices: VecDeque::new(),
            profile_screen: None,
            profile_store,
            should_quit: false,
        }
    }

    /// Run the application, restoring the terminal on exit
    pub async fn run(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.run_app(&mut terminal).await;

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    async fn run_app(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> io::Result<()> {
        loop {
            self.drain_runtime_events();
            terminal.draw(|frame| self.draw(frame))?;

            if event::poll(Duration::from_millis(100))? {
                if let TermEvent::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers).await;
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }
        Ok(())
    }

    fn drain_runtime_events(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(event) => self.apply_ui_event(event),
                Err(broadcast::error::TryRecvError::Empty) => break,
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "UI lagged behind the runtime");
                }
                Err(broadcast::error::TryRecvError::Closed) => {
                    self.should_quit = true;
                    break;
                }
            }
        }
    }

    fn apply_ui_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::ViewChanged { view } => {
                let kind_changed = view.kind() != self.view.kind();
                self.view = view;
                if kind_changed {
                    self.cursor = 0;
                    self.help_menu = None;
                    self.chat_input = None;
                    self.favorite = None;
                }
            }
            UiEvent::ViewSettled { .. } => {
                self.interactive = true;
            }
            UiEvent::MarkersVisible { language } => {
                self.marker_filter = language;
                self.focused_marker = None;
            }
            UiEvent::Notice { notice } => {
                if self.modal.is_none() {
                    self.modal = Some(Modal::Notice(notice));
                } else {
                    self.pending_notices.push_back(notice);
                }
            }
            UiEvent::FavoriteChanged { status } => {
                self.favorite = Some(status);
            }
            UiEvent::RequestSaved { .. } => {}
        }
    }

    fn next_modal(&mut self) {
        self.modal = self.pending_notices.pop_front().map(Modal::Notice);
    }

    async fn send(&self, event: Event) {
        self.handle.send(event).await;
    }

    // ========================================================================
    // Input handling
    // ========================================================================

    async fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if self.modal.is_some() {
            self.handle_modal_key(code).await;
            return;
        }

        if self.profile_screen.is_some() {
            self.handle_profile_key(code);
            return;
        }

        if let Some(buffer) = self.chat_input.as_mut() {
            match code {
                KeyCode::Enter => {
                    let text = std::mem::take(buffer);
                    self.chat_input = None;
                    if let View::InCall { session } = &self.view {
                        if let Some(panel) = session.open_panel {
                            self.send(Event::ChatSubmitted { panel, text }).await;
                        }
                    }
                }
                KeyCode::Esc => self.chat_input = None,
                KeyCode::Backspace => {
                    buffer.pop();
                }
                KeyCode::Char(c) => buffer.push(c),
                _ => {}
            }
            return;
        }

        match self.view.clone() {
            View::LanguageSelection => self.handle_language_key(code).await,
            View::SessionLevels { .. } => self.handle_levels_key(code).await,
            View::InCall { .. } => self.handle_call_key(code).await,
        }
    }

    async fn handle_language_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab => self.focus_next_marker(),
            KeyCode::Char('p') => {
                self.profile_screen = Some(ProfileScreen::new(self.profile_store.clone()));
            }
            KeyCode::Char('r') => {
                self.modal = Some(Modal::RequestForm {
                    fields: [String::new(), String::new(), String::new()],
                    field: 0,
                });
            }
            KeyCode::Up if self.interactive => {
                self.cursor = self.cursor.checked_sub(1).unwrap_or(LANGUAGES.len() - 1);
            }
            KeyCode::Down if self.interactive => {
                self.cursor = (self.cursor + 1) % LANGUAGES.len();
            }
            KeyCode::Enter if self.interactive => {
                self.interactive = false;
                self.send(Event::LanguageSelected {
                    language: LANGUAGES[self.cursor].to_string(),
                })
                .await;
            }
            _ => {}
        }
    }

    async fn handle_levels_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab => self.focus_next_marker(),
            KeyCode::Esc | KeyCode::Char('b') => {
                self.interactive = false;
                self.send(Event::BackRequested).await;
            }
            KeyCode::Up if self.interactive => {
                self.cursor = self.cursor.checked_sub(1).unwrap_or(SESSION_LEVELS.len() - 1);
            }
            KeyCode::Down if self.interactive => {
                self.cursor = (self.cursor + 1) % SESSION_LEVELS.len();
            }
            KeyCode::Enter if self.interactive => {
                let (level, _minutes) = SESSION_LEVELS[self.cursor];
                self.send(Event::LevelSelected { level }).await;
            }
            _ => {}
        }
    }

    async fn handle_call_key(&mut self, code: KeyCode) {
        if let Some(selected) = self.help_menu {
            match code {
                KeyCode::Esc | KeyCode::Char('h') => self.help_menu = None,
                KeyCode::Up => {
                    self.help_menu =
                        Some(selected.checked_sub(1).unwrap_or(HELP_MENU_ITEMS.len() - 1));
                }
                KeyCode::Down => {
                    self.help_menu = Some((selected + 1) % HELP_MENU_ITEMS.len());
                }
                KeyCode::Enter => {
                    self.help_menu = None;
                    match selected {
                        0 => self.modal = Some(Modal::Notice(Notice::guidelines())),
                        1 => {
                            if let View::InCall { session } = &self.view {
                                self.modal = Some(Modal::ConfirmBlock {
                                    username: session.partner.name.clone(),
                                });
                            }
                        }
                        _ => {
                            self.modal = Some(Modal::ReportPrompt {
                                buffer: String::new(),
                            });
                        }
                    }
                }
                _ => {}
            }
            return;
        }

        match code {
            KeyCode::Char('l') => self.send(Event::HangUp).await,
            KeyCode::Char('c') => self.send(Event::CameraToggled).await,
            KeyCode::Char('m') => self.send(Event::MicToggled).await,
            KeyCode::Char('a') => {
                self.send(Event::PanelToggled {
                    panel: Panel::Assistant,
                })
                .await;
            }
            KeyCode::Char('t') => {
                self.send(Event::PanelToggled {
                    panel: Panel::Messages,
                })
                .await;
            }
            KeyCode::Char('s') => self.send(Event::ShareScreenRequested).await,
            KeyCode::Char('f') => self.send(Event::FavoriteToggled).await,
            KeyCode::Char('h') => self.help_menu = Some(0),
            KeyCode::Char('i') => {
                if let View::InCall { session } = &self.view {
                    if session.open_panel.is_some() {
                        self.chat_input = Some(String::new());
                    }
                }
            }
            KeyCode::Esc => {
                if let View::InCall { session } = &self.view {
                    if let Some(panel) = session.open_panel {
                        self.send(Event::PanelClosed { panel }).await;
                    }
                }
            }
            _ => {}
        }
    }

    async fn handle_modal_key(&mut self, code: KeyCode) {
        let Some(modal) = self.modal.clone() else {
            return;
        };
        match modal {
            Modal::Notice(_) => {
                if matches!(code, KeyCode::Enter | KeyCode::Esc) {
                    self.next_modal();
                }
            }
            Modal::ConfirmBlock { .. } => match code {
                KeyCode::Enter => {
                    self.next_modal();
                    self.send(Event::BlockConfirmed).await;
                }
                KeyCode::Esc => self.next_modal(),
                _ => {}
            },
            Modal::ReportPrompt { mut buffer } => match code {
                KeyCode::Enter => {
                    let reason = buffer.trim().to_string();
                    if reason.is_empty() {
                        self.next_modal();
                    } else {
                        self.send(Event::ReportSubmitted { reason }).await;
                        self.modal = Some(Modal::ConfirmEndAfterReport);
                    }
                }
                KeyCode::Esc => self.next_modal(),
                KeyCode::Backspace => {
                    buffer.pop();
                    self.modal = Some(Modal::ReportPrompt { buffer });
                }
                KeyCode::Char(c) => {
                    buffer.push(c);
                    self.modal = Some(Modal::ReportPrompt { buffer });
                }
                _ => {}
            },
            Modal::ConfirmEndAfterReport => match code {
                KeyCode::Enter => {
                    self.next_modal();
                    self.send(Event::HangUp).await;
                }
                KeyCode::Esc => self.next_modal(),
                _ => {}
            },
            Modal::RequestForm { mut fields, field } => match code {
                KeyCode::Esc => self.next_modal(),
                KeyCode::Tab | KeyCode::Down => {
                    self.modal = Some(Modal::RequestForm {
                        fields,
                        field: (field + 1) % REQUEST_FIELDS.len(),
                    });
                }
                KeyCode::Up => {
                    self.modal = Some(Modal::RequestForm {
                        fields,
                        field: field.checked_sub(1).unwrap_or(REQUEST_FIELDS.len() - 1),
                    });
                }
                KeyCode::Enter => {
                    self.next_modal();
                    self.send(Event::LanguageRequested {
                        language: fields[0].trim().to_string(),
                        email: fields[1].trim().to_string(),
                        notes: fields[2].trim().to_string(),
                    })
                    .await;
                }
                KeyCode::Backspace => {
                    fields[field].pop();
                    self.modal = Some(Modal::RequestForm { fields, field });
                }
                KeyCode::Char(c) => {
                    fields[field].push(c);
                    self.modal = Some(Modal::RequestForm { fields, field });
                }
                _ => {}
            },
        }
    }

    fn handle_profile_key(&mut self, code: KeyCode) {
        let Some(screen) = self.profile_screen.as_mut() else {
            return;
        };

        if screen.input.is_some() {
            match code {
                KeyCode::Enter => screen.submit_input(),
                KeyCode::Esc => screen.input = None,
                KeyCode::Backspace => {
                    if let Some(input) = screen.input.as_mut() {
                        input.buffer_mut().pop();
                    }
                }
                KeyCode::Char(c) => {
                    if let Some(input) = screen.input.as_mut() {
                        input.buffer_mut().push(c);
                    }
                }
                _ => {}
            }
            return;
        }

        match code {
            KeyCode::Esc => self.profile_screen = None,
            KeyCode::Up => screen.move_cursor(-1),
            KeyCode::Down => screen.move_cursor(1),
            KeyCode::Char('l') => screen.start_input(ProfileInput::Language(String::new())),
            KeyCode::Char('i') => screen.start_input(ProfileInput::Interest(String::new())),
            KeyCode::Char('c') => screen.start_input(ProfileInput::City(String::new())),
            KeyCode::Char('o') => screen.start_input(ProfileInput::Country(String::new())),
            KeyCode::Char('m') => screen.toggle_match_at_cursor(),
            KeyCode::Char('d') | KeyCode::Delete => screen.remove_at_cursor(),
            _ => {}
        }
    }

    /// The runtime's marker broadcast is authoritative; the view itself
    /// answers the same question before the first broadcast arrives.
    fn current_filter(&self) -> Option<&str> {
        self.marker_filter
            .as_deref()
            .or_else(|| self.view.marker_filter())
    }

    fn focus_next_marker(&mut self) {
        let visible = visible_profiles(&self.profiles, self.current_filter()).len();
        if visible == 0 {
            self.focused_marker = None;
            return;
        }
        self.focused_marker = Some(match self.focused_marker {
            Some(index) if index + 1 < visible => index + 1,
            Some(_) => 0,
            None => 0,
        });
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    fn draw(&mut self, frame: &mut ratatui::Frame) {
        let area = frame.area();

        if let Some(screen) = &self.profile_screen {
            screen.render(frame, area);
        } else {
            match &self.view {
                View::LanguageSelection => {
                    render_map(
                        frame,
                        area,
                        &self.profiles,
                        self.current_filter(),
                        self.focused_marker,
                    );
                    render_language_card(frame, area, self.cursor, self.interactive);
                }
                View::SessionLevels { language } => {
                    render_map(
                        frame,
                        area,
                        &self.profiles,
                        self.current_filter(),
                        self.focused_marker,
                    );
                    render_level_card(frame, area, language, self.cursor, self.interactive);
                }
                View::InCall { session } => {
                    render_call(
                        frame,
                        area,
                        session,
                        self.favorite.as_ref(),
                        self.chat_input.as_deref(),
                        self.help_menu,
                    );
                }
            }
        }

        if let Some(modal) = &self.modal {
            self.render_modal(frame, area, modal);
        }
    }

    fn render_modal(&self, frame: &mut ratatui::Frame, area: ratatui::layout::Rect, modal: &Modal) {
        match modal {
            Modal::Notice(notice) => {
                render_modal(frame, area, &notice.title, &notice.body, "(Enter) OK", None);
            }
            Modal::ConfirmBlock { username } => {
                let body = format!(
                    "Are you sure you want to block {username}?\n\nThis will end the session immediately and you won't be matched with this user again.\n\nThis action cannot be undone."
                );
                render_modal(
                    frame,
                    area,
                    &format!("Block {username}"),
                    &body,
                    "(Enter) Block  (Esc) Cancel",
                    None,
                );
            }
            Modal::ReportPrompt { buffer } => {
                if let View::InCall { session } = &self.view {
                    let name = &session.partner.name;
                    render_modal(
                        frame,
                        area,
                        &format!("Report {name}"),
                        &format!("Please describe why you are reporting {name}."),
                        "(Enter) Submit  (Esc) Cancel",
                        Some(buffer),
                    );
                }
            }
            Modal::ConfirmEndAfterReport => {
                render_modal(
                    frame,
                    area,
                    "End Session",
                    "Would you like to end this session now?",
                    "(Enter) OK  (Esc) Cancel",
                    None,
                );
            }
            Modal::RequestForm { fields, field } => {
                let body = REQUEST_FIELDS
                    .iter()
                    .enumerate()
                    .map(|(index, label)| {
                        let marker = if index == *field { ">" } else { " " };
                        format!("{marker} {label}: {}", fields[index])
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                render_modal(
                    frame,
                    area,
                    "Request a Language",
                    &body,
                    "(Tab) next field  (Enter) Submit  (Esc) Cancel",
                    None,
                );
            }
        }
    }
}

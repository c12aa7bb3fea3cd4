//! Profile editor screen
//!
//! Edits the operator's stored profile: languages (with a per-language
//! matching opt-in), up to three interests, and location. Every change
//! saves immediately.

use crate::store::{ProfileStore, StoredProfile};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

#[derive(Debug, Clone, PartialEq)]
pub enum ProfileInput {
    Language(String),
    Interest(String),
    City(String),
    Country(String),
}

impl ProfileInput {
    pub fn buffer_mut(&mut self) -> &mut String {
        match self {
            ProfileInput::Language(s)
            | ProfileInput::Interest(s)
            | ProfileInput::City(s)
            | ProfileInput::Country(s) => s,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ProfileInput::Language(_) => "Add language",
            ProfileInput::Interest(_) => "Add interest",
            ProfileInput::City(_) => "City",
            ProfileInput::Country(_) => "Country",
        }
    }
}

pub struct ProfileScreen {
    store: ProfileStore,
    profile: StoredProfile,
    pub cursor: usize,
    pub input: Option<ProfileInput>,
    status: Option<String>,
}

impl ProfileScreen {
    pub fn new(store: ProfileStore) -> Self {
        let profile = store.load();
        Self {
            store,
            profile,
            cursor: 0,
            input: None,
            status: None,
        }
    }

    fn reload(&mut self) {
        self.profile = self.store.load();
        let rows = self.row_count();
        if rows > 0 && self.cursor >= rows {
            self.cursor = rows - 1;
        }
    }

    fn row_count(&self) -> usize {
        self.profile.languages.len() + self.profile.interests.len()
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let rows = self.row_count();
        if rows == 0 {
            return;
        }
        let cursor = self.cursor as isize + delta;
        self.cursor = cursor.rem_euclid(rows as isize) as usize;
    }

    /// Remove the language or interest under the cursor
    pub fn remove_at_cursor(&mut self) {
        let languages = self.profile.languages.len();
        let result = if self.cursor < languages {
            let id = self.profile.languages[self.cursor].id.clone();
            self.store.remove_language(&id)
        } else if self.cursor - languages < self.profile.interests.len() {
            self.store.remove_interest(self.cursor - languages)
        } else {
            return;
        };
        self.apply(result.map(|()| "Saved".to_string()));
    }

    /// Toggle the matching opt-in when a language row is selected
    pub fn toggle_match_at_cursor(&mut self) {
        if self.cursor < self.profile.languages.len() {
            let id = self.profile.languages[self.cursor].id.clone();
            let result = self.store.toggle_language_match(&id);
            self.apply(result.map(|()| "Saved".to_string()));
        }
    }

    pub fn start_input(&mut self, input: ProfileInput) {
        let input = match input {
            ProfileInput::City(_) => ProfileInput::City(self.profile.location.city.clone()),
            ProfileInput::Country(_) => ProfileInput::Country(self.profile.location.country.clone()),
            other => other,
        };
        self.input = Some(input);
    }

    /// Commit the active input field
    pub fn submit_input(&mut self) {
        let Some(input) = self.input.take() else {
            return;
        };
        let result = match &input {
            ProfileInput::Language(name) if !name.trim().is_empty() => {
                self.store.add_language(name.trim()).map(|_| ())
            }
            ProfileInput::Interest(name) if !name.trim().is_empty() => {
                self.store.add_interest(name.trim())
            }
            ProfileInput::City(city) => self
                .store
                .set_location(city, &self.profile.location.country),
            ProfileInput::Country(country) => {
                self.store.set_location(&self.profile.location.city, country)
            }
            _ => return,
        };
        self.apply(result.map(|()| "Saved".to_string()));
    }

    fn apply(&mut self, result: Result<String, crate::store::StoreError>) {
        match result {
            Ok(status) => self.status = Some(status),
            Err(e) => self.status = Some(e.to_string()),
        }
        self.reload();
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Your Profile ")
            .border_style(Style::default().fg(Color::LightRed));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(3),
                Constraint::Length(2),
            ])
            .split(inner);

        let location = &self.profile.location;
        let location_line = if location.city.is_empty() && location.country.is_empty() {
            "Location: (not set)".to_string()
        } else {
            format!("Location: {}, {}", location.city, location.country)
        };
        frame.render_widget(
            Paragraph::new(vec![
                Line::raw(location_line),
                Line::styled(
                    format!(
                        "Interests {}/{}",
                        self.profile.interests.len(),
                        crate::store::MAX_INTERESTS
                    ),
                    Style::default().fg(Color::DarkGray),
                ),
            ]),
            chunks[0],
        );

        let mut items: Vec<ListItem> = Vec::new();
        for (index, language) in self.profile.languages.iter().enumerate() {
            let marker = if language.match_enabled { "[x]" } else { "[ ]" };
            let label = format!("  {} {marker} use for matching", language.name);
            items.push(row_item(label, index == self.cursor));
        }
        let offset = self.profile.languages.len();
        for (index, interest) in self.profile.interests.iter().enumerate() {
            let label = format!("  # {interest}");
            items.push(row_item(label, offset + index == self.cursor));
        }
        if items.is_empty() {
            items.push(ListItem::new(Line::styled(
                "  No languages added yet. Add one below!",
                Style::default().fg(Color::DarkGray),
            )));
        }
        frame.render_widget(List::new(items), chunks[1]);

        let footer = match (&self.input, &self.status) {
            (Some(input), _) => {
                let buffer = match input {
                    ProfileInput::Language(s)
                    | ProfileInput::Interest(s)
                    | ProfileInput::City(s)
                    | ProfileInput::Country(s) => s.clone(),
                };
                Line::from(vec![
                    Span::styled(
                        format!("{}: ", input.label()),
                        Style::default().fg(Color::LightRed),
                    ),
                    Span::raw(buffer),
                    Span::styled("▏", Style::default().fg(Color::LightRed)),
                ])
            }
            (None, Some(status)) => Line::styled(
                format!("{status}  |  (l)anguage (i)nterest (c)ity c(o)untry (m)atch (d)elete (Esc) back"),
                Style::default().fg(Color::DarkGray),
            ),
            (None, None) => Line::styled(
                "(l)anguage (i)nterest (c)ity c(o)untry (m)atch toggle (d)elete (Esc) back",
                Style::default().fg(Color::DarkGray),
            ),
        };
        frame.render_widget(Paragraph::new(footer), chunks[2]);
    }
}

fn row_item(label: String, selected: bool) -> ListItem<'static> {
    let style = if selected {
        Style::default()
            .fg(Color::LightRed)
            .add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    };
    ListItem::new(Line::styled(label, style))
}

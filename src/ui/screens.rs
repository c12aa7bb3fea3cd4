//! Card and call-surface rendering

use crate::chat::{ChatLine, ChatRole};
use crate::directory::LANGUAGES;
use crate::runtime::FavoriteStatus;
use crate::state_machine::{CallSession, Panel, SESSION_LEVELS};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

fn accent() -> Style {
    Style::default().fg(Color::LightRed)
}

fn dim() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// A centered overlay of the given size, clamped to the frame
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn card_block(title: String) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(format!(" {title} "))
        .border_style(accent())
}

/// The language card shown over the map
pub fn render_language_card(frame: &mut Frame, area: Rect, selected: usize, interactive: bool) {
    let height = LANGUAGES.len() as u16 + 6;
    let card = centered_rect(area, 44, height);
    frame.render_widget(Clear, card);

    let block = card_block("Which language would you like to practice?".to_string());
    let inner = block.inner(card);
    frame.render_widget(block, card);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(2)])
        .split(inner);

    let items: Vec<ListItem> = LANGUAGES
        .iter()
        .enumerate()
        .map(|(index, language)| {
            let style = if index == selected && interactive {
                accent().add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                Style::default()
            };
            ListItem::new(Line::styled(format!("  {language}"), style))
        })
        .collect();
    frame.render_widget(List::new(items), chunks[0]);

    let footer = Paragraph::new(vec![
        Line::styled("Don't see your language? Request it (r)", dim()),
        Line::styled("(Tab) browse partners  (p) profile  (q) quit", dim()),
    ]);
    frame.render_widget(footer, chunks[1]);
}

/// The level card for a chosen language
pub fn render_level_card(
    frame: &mut Frame,
    area: Rect,
    language: &str,
    selected: usize,
    interactive: bool,
) {
    let height = SESSION_LEVELS.len() as u16 + 6;
    let card = centered_rect(area, 44, height);
    frame.render_widget(Clear, card);

    let block = card_block(format!("Practice {language}"));
    let inner = block.inner(card);
    frame.render_widget(block, card);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(2)])
        .split(inner);

    let items: Vec<ListItem> = SESSION_LEVELS
        .iter()
        .enumerate()
        .map(|(index, (level, minutes))| {
            let label = if *level == crate::directory::Proficiency::Native {
                format!("  Talk with Native ({minutes} min)")
            } else {
                format!("  {level} ({minutes} min)")
            };
            let style = if index == selected && interactive {
                accent().add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                Style::default()
            };
            ListItem::new(Line::styled(label, style))
        })
        .collect();
    frame.render_widget(List::new(items), chunks[0]);

    let footer = Paragraph::new(Line::styled("(Esc) back to languages", dim()));
    frame.render_widget(footer, chunks[1]);
}

/// The mock call surface: video placeholders, controls, side panel
pub fn render_call(
    frame: &mut Frame,
    area: Rect,
    session: &CallSession,
    favorite: Option<&FavoriteStatus>,
    chat_input: Option<&str>,
    help_menu: Option<usize>,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(area);

    render_call_header(frame, rows[0], session, favorite);

    // Video area, with the open panel docked on the right
    let video_area = if session.open_panel.is_some() {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(20), Constraint::Length(38)])
            .split(rows[1]);
        render_panel(frame, cols[1], session, chat_input);
        cols[0]
    } else {
        rows[1]
    };
    render_video(frame, video_area, session);

    render_controls(frame, rows[2], session);

    if let Some(selected) = help_menu {
        render_help_menu(frame, area, selected);
    }
}

fn render_call_header(
    frame: &mut Frame,
    area: Rect,
    session: &CallSession,
    favorite: Option<&FavoriteStatus>,
) {
    let star = match favorite {
        Some(status) if status.favorited => Span::styled("★", accent()),
        _ => Span::styled("☆", dim()),
    };
    let sessions = favorite.map_or(1, |status| status.session_count);
    let plural = if sessions == 1 { "session" } else { "sessions" };

    let header = Line::from(vec![
        Span::styled(
            session.partner.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("  {sessions} {plural}  ")),
        star,
        Span::raw("  "),
        Span::styled(session.timer_label(), accent()),
    ]);
    frame.render_widget(Paragraph::new(header), area);
}

fn render_video(frame: &mut Frame, area: Rect, session: &CallSession) {
    let remote_name = session.partner.name.to_lowercase();
    let camera = if session.camera_on { "" } else { " (camera off)" };
    let remote = Paragraph::new(format!("\n{remote_name}{camera}"))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(dim())
                .title(" video "),
        );
    frame.render_widget(remote, area);

    // Self view tucked into the lower-right corner
    if area.width > 22 && area.height > 7 {
        let self_area = Rect {
            x: area.right().saturating_sub(18),
            y: area.bottom().saturating_sub(5),
            width: 16,
            height: 4,
        };
        let label = if session.mic_on { "you" } else { "you (muted)" };
        let self_view = Paragraph::new(label)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).border_style(dim()));
        frame.render_widget(Clear, self_area);
        frame.render_widget(self_view, self_area);
    }
}

fn chat_line_item(line: &ChatLine) -> ListItem<'static> {
    let (prefix, style) = match line.role {
        ChatRole::User => ("you: ", accent()),
        ChatRole::Assistant => ("ai: ", Style::default().fg(Color::LightBlue)),
        ChatRole::Partner => ("them: ", Style::default()),
        ChatRole::System => ("", dim()),
    };
    ListItem::new(Line::from(vec![
        Span::styled(prefix.to_string(), style),
        Span::raw(line.text.clone()),
    ]))
}

fn render_panel(frame: &mut Frame, area: Rect, session: &CallSession, chat_input: Option<&str>) {
    let Some(panel) = session.open_panel else {
        return;
    };
    let title = match panel {
        Panel::Assistant => " AI Assistant ",
        Panel::Messages => " Messages ",
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(accent());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let log = session.log(panel);
    // Keep the tail of the conversation in view
    let visible = chunks[0].height as usize;
    let skip = log.len().saturating_sub(visible);
    let items: Vec<ListItem> = log.iter().skip(skip).map(chat_line_item).collect();
    frame.render_widget(List::new(items), chunks[0]);

    let input_line = match chat_input {
        Some(buffer) => Line::from(vec![
            Span::styled("> ", accent()),
            Span::raw(buffer.to_string()),
            Span::styled("▏", accent()),
        ]),
        None => Line::styled("(i) type a message", dim()),
    };
    frame.render_widget(Paragraph::new(input_line), chunks[1]);
}

fn render_controls(frame: &mut Frame, area: Rect, session: &CallSession) {
    let toggle = |label: &str, on: bool| -> Span<'static> {
        if on {
            Span::styled(format!(" {label} "), accent().add_modifier(Modifier::BOLD))
        } else {
            Span::styled(format!(" {label} "), dim())
        }
    };

    let line = Line::from(vec![
        toggle("(c)amera", session.camera_on),
        toggle("(m)ic", session.mic_on),
        toggle("(a)i", session.open_panel == Some(Panel::Assistant)),
        toggle("cha(t)", session.open_panel == Some(Panel::Messages)),
        Span::styled(" (s)hare ", dim()),
        Span::styled(" (f)avorite ", dim()),
        Span::styled(" (h)elp ", dim()),
        Span::styled(" (l)eave ", Style::default().fg(Color::Red)),
    ]);

    let controls = Paragraph::new(line)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(dim()));
    frame.render_widget(controls, area);
}

pub const HELP_MENU_ITEMS: &[&str] = &["Session Guidelines", "Block User", "Report User"];

fn render_help_menu(frame: &mut Frame, area: Rect, selected: usize) {
    let menu = centered_rect(area, 30, HELP_MENU_ITEMS.len() as u16 + 2);
    frame.render_widget(Clear, menu);

    let items: Vec<ListItem> = HELP_MENU_ITEMS
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let style = if index == selected {
                accent().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            ListItem::new(Line::styled(format!(" {item}"), style))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Help ")
            .border_style(accent()),
    );
    frame.render_widget(list, menu);
}

/// A modal dialog over everything else
pub fn render_modal(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    body: &str,
    footer: &str,
    input: Option<&str>,
) {
    let body_width = 52u16.min(area.width.saturating_sub(4));
    let wrap_width = body_width.saturating_sub(4).max(1) as usize;
    let body_lines: u16 = body
        .lines()
        .map(|l| (l.chars().count().max(1)).div_ceil(wrap_width) as u16)
        .sum();
    let input_lines = u16::from(input.is_some()) * 2;
    let modal = centered_rect(area, body_width, body_lines + input_lines + 4);
    frame.render_widget(Clear, modal);

    let block = card_block(title.to_string());
    let inner = block.inner(modal);
    frame.render_widget(block, modal);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(input_lines),
            Constraint::Length(1),
        ])
        .split(inner);

    frame.render_widget(Paragraph::new(body).wrap(Wrap { trim: false }), chunks[0]);

    if let Some(buffer) = input {
        let line = Line::from(vec![
            Span::styled("> ", accent()),
            Span::raw(buffer.to_string()),
            Span::styled("▏", accent()),
        ]);
        frame.render_widget(Paragraph::new(line), chunks[1]);
    }

    frame.render_widget(
        Paragraph::new(Line::styled(footer, dim())).alignment(Alignment::Right),
        chunks[2],
    );
}

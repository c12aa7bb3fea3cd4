//! World map with user markers
//!
//! Markers sit at percentage coordinates of the map surface (display
//! positions, not geography). Focusing a marker reveals its tooltip.

use crate::directory::Profile;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const MARKER: &str = "●";
const FOCUSED_MARKER: &str = "◉";

/// Profiles whose markers are visible under the given filter
pub fn visible_profiles<'a>(profiles: &'a [Profile], filter: Option<&str>) -> Vec<&'a Profile> {
    profiles
        .iter()
        .filter(|profile| match filter {
            Some(language) => profile.speaks(language),
            None => true,
        })
        .collect()
}

fn marker_position(profile: &Profile, area: Rect) -> (u16, u16) {
    let inner_w = area.width.saturating_sub(2).max(1);
    let inner_h = area.height.saturating_sub(2).max(1);
    let x = area.x + 1 + (profile.location.left / 100.0 * f64::from(inner_w - 1)) as u16;
    let y = area.y + 1 + (profile.location.top / 100.0 * f64::from(inner_h - 1)) as u16;
    (x.min(area.right().saturating_sub(2)), y.min(area.bottom().saturating_sub(2)))
}

pub fn render_map(
    frame: &mut Frame,
    area: Rect,
    profiles: &[Profile],
    filter: Option<&str>,
    focused: Option<usize>,
) {
    if area.width < 4 || area.height < 4 {
        return;
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" TabbiMate ")
        .border_style(Style::default().fg(Color::DarkGray));
    frame.render_widget(block, area);

    let visible = visible_profiles(profiles, filter);
    for (index, profile) in visible.iter().enumerate() {
        let (x, y) = marker_position(profile, area);
        let is_focused = focused == Some(index);
        let (symbol, style) = if is_focused {
            (
                FOCUSED_MARKER,
                Style::default()
                    .fg(Color::LightRed)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            (MARKER, Style::default().fg(Color::Red))
        };
        frame
            .buffer_mut()
            .set_string(x, y, symbol, style);
    }

    if let Some(index) = focused {
        if let Some(profile) = visible.get(index) {
            render_tooltip(frame, area, profile);
        }
    }
}

/// Tooltip with name, languages and interests, placed beside the
/// marker and kept inside the map area
fn render_tooltip(frame: &mut Frame, area: Rect, profile: &Profile) {
    let (x, y) = marker_position(profile, area);

    let lines = vec![
        Line::styled(
            profile.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Line::raw(profile.languages_line()),
        Line::raw(format!("Interests: {}", profile.interests_line())),
    ];

    let width = lines
        .iter()
        .map(Line::width)
        .max()
        .unwrap_or(0)
        .min(46) as u16
        + 4;
    let height = lines.len() as u16 + 2;

    // Prefer the right side of the marker, flip left near the edge
    let mut left = x + 2;
    if left + width > area.right() {
        left = x.saturating_sub(width + 1).max(area.x + 1);
    }
    let mut top = y.saturating_sub(1).max(area.y + 1);
    if top + height > area.bottom() {
        top = area.bottom().saturating_sub(height + 1);
    }

    let tooltip_area = Rect {
        x: left,
        y: top,
        width: width.min(area.width.saturating_sub(2)),
        height: height.min(area.height.saturating_sub(2)),
    };

    let tooltip = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::LightRed)),
    );
    frame.render_widget(Clear, tooltip_area);
    frame.render_widget(tooltip, tooltip_area);
}

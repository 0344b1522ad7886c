//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock, time::Duration};

use crate::app::{App, Focus, PlaySource};
use crate::audio::{PlaybackInfo, PlaybackStatus};

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("j/k", "up/down");
    map.insert("enter", "play");
    map.insert("space", "pause/resume");
    map.insert("s", "stop");
    map.insert("0-9", "seek to n/10");
    map.insert("/", "filter");
    map.insert("tab", "songs/playlist");
    map.insert("a", "add to playlist");
    map.insert("d", "remove from playlist");
    map.insert("D", "delete playlist");
    map.insert("C", "clear playlist");
    map.insert("u", "reload playlist");
    map.insert("n/p", "playlist next/prev");
    map.insert("x", "shuffle playlist");
    map.insert("w", "save playlist");
    map.insert("c", "cycle playlists");
    map.insert("r", "rescan");
    map.insert("q", "quit");
    map
});

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    let order = [
        "j/k", "enter", "space", "s", "H/L", "0-9", "/", "tab", "a", "d", "D", "n/p", "x", "C",
        "w", "u", "c", "r", "q",
    ];
    order
        .iter()
        .filter_map(|k| {
            if *k == "H/L" {
                Some(format!("[H/L] scrub -/+{scrub_seconds}s"))
            } else {
                CONTROLS_MAP.get(k).map(|v| format!("[{k}] {v}"))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format a `Duration` as `m:ss`.
pub fn format_mss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Like [`format_mss`], but empty when the length is unknown or zero.
pub fn format_optional(d: Option<Duration>) -> String {
    d.filter(|d| d.as_secs() > 0)
        .map(format_mss)
        .unwrap_or_default()
}

fn padded(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding {
            left: 1,
            right: 0,
            top: 0,
            bottom: 0,
        })
}

/// Scroll window `(start, end, selected_in_window)` that keeps `sel_pos` centered.
fn window(total: usize, height: usize, sel_pos: usize) -> (usize, usize, usize) {
    if total <= height || height == 0 {
        return (0, total, sel_pos);
    }
    let half = height / 2;
    let mut start = sel_pos.saturating_sub(half);
    if start + height > total {
        start = total - height;
    }
    (start, start + height, sel_pos - start)
}

fn now_playing_label(app: &App, info: &PlaybackInfo) -> String {
    let Some(path) = info.path.as_deref() else {
        return "Stopped".to_string();
    };
    let title = app
        .entries
        .iter()
        .find(|e| e.path() == path)
        .map(|e| e.title().to_string())
        .unwrap_or_else(|| path.display().to_string());

    let state = if info.completed {
        "Finished"
    } else {
        match info.status {
            PlaybackStatus::Playing => "Playing",
            PlaybackStatus::Paused => "Paused",
            PlaybackStatus::Idle => "Stopped",
        }
    };
    let source = match app.play_source {
        PlaySource::Playlist => " (playlist)",
        PlaySource::Library => "",
    };

    let total = format_optional(info.duration);
    match info.remaining() {
        Some(left) if !total.is_empty() => format!(
            "{state}{source}: {title} [{} / {total}, -{}]",
            format_mss(info.elapsed),
            format_mss(left)
        ),
        _ => format!("{state}{source}: {title} [{}]", format_mss(info.elapsed)),
    }
}

fn details_text(app: &App) -> String {
    let Some(entry) = app.selected_entry() else {
        if !app.has_entries() && !app.scanning {
            return format!("No songs found in {}", app.songs_dir.display());
        }
        return "No song selected".to_string();
    };
    let meta = app.selected_metadata().unwrap_or_default();
    let background = match app.selected_background() {
        Some(p) => p.display().to_string(),
        None if app.background_wanted().is_some() => "…".to_string(),
        None => "-".to_string(),
    };

    format!(
        "Title: {}\nArtist: {}\nAlbum: {}\nDuration: {}\nPath: {}\nBackground: {}",
        meta.title.as_deref().unwrap_or(entry.title()),
        meta.artist.as_deref().unwrap_or("-"),
        meta.album.as_deref().unwrap_or("-"),
        format_optional(meta.duration_secs.map(Duration::from_secs)),
        entry.path().display(),
        background,
    )
}

fn focus_style(active: bool) -> Style {
    if active {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

fn draw_songs(frame: &mut Frame, app: &App, area: Rect) {
    let display = app.display_indices();
    let total = display.len();
    let height = area.height.saturating_sub(2) as usize;
    let sel_pos = display.iter().position(|&i| i == app.selected).unwrap_or(0);
    let (start, end, selected_in_window) = window(total, height, sel_pos);

    let items: Vec<ListItem> = display[start..end]
        .iter()
        .map(|&i| ListItem::new(app.entries[i].title()))
        .collect();

    let mut title = format!(" songs ({total}) ");
    if app.scanning {
        title = format!(" songs ({total}, scanning…) ");
    }
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(focus_style(app.focus == Focus::Library)),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if total > 0 {
        state.select(Some(selected_in_window));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_playlist(frame: &mut Frame, app: &App, area: Rect) {
    let (title, songs) = match app.playlists.current_playlist() {
        Some(p) => (format!(" playlist: {} ({}) ", p.name(), p.len()), p.songs()),
        None => (" playlist: none (a adds to default) ".to_string(), &[][..]),
    };
    let height = area.height.saturating_sub(2) as usize;
    let sel_pos = app.playlist_selected.min(songs.len().saturating_sub(1));
    let (start, end, selected_in_window) = window(songs.len(), height, sel_pos);
    let cursor = app.playlists.cursor();

    let items: Vec<ListItem> = songs[start..end]
        .iter()
        .enumerate()
        .map(|(offset, song)| {
            let marker = if start + offset == cursor { "♪ " } else { "  " };
            ListItem::new(format!("{marker}{}", song.title()))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(focus_style(app.focus == Focus::Playlist)),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut state = ListState::default();
    if app.focus == Focus::Playlist && !songs.is_empty() {
        state.select(Some(selected_in_window));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

/// Render the entire UI into the provided `frame`.
pub fn draw(frame: &mut Frame, app: &App, scrub_seconds: u64) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let mut header_text = format!("Songs: {}", app.songs_dir.display());
    let q = app.filter_query.trim();
    if app.filter_mode || !q.is_empty() {
        header_text.push_str(&format!("  •  FILTER: {q}"));
        if app.filter_mode {
            header_text.push('_');
        }
    }
    let header = Paragraph::new(header_text)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" osu! song browser ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let info = app.playback();
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" now playing "))
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(info.fraction().unwrap_or(0.0))
        .label(now_playing_label(app, &info));
    frame.render_widget(gauge, chunks[1]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[2]);
    draw_songs(frame, app, columns[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(3)])
        .split(columns[1]);
    let details = Paragraph::new(details_text(app))
        .block(padded(" details "))
        .wrap(Wrap { trim: true });
    frame.render_widget(details, right[0]);
    draw_playlist(frame, app, right[1]);

    let status = info
        .error
        .as_deref()
        .map(|e| format!(" error: {e}"))
        .or_else(|| app.status.as_ref().map(|s| format!(" {s}")))
        .unwrap_or_default();
    frame.render_widget(Paragraph::new(status), chunks[3]);

    let footer = Paragraph::new(controls_text(scrub_seconds))
        .block(padded(" controls "))
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[4]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_format_as_minutes_and_seconds() {
        assert_eq!(format_mss(Duration::from_secs(0)), "0:00");
        assert_eq!(format_mss(Duration::from_millis(65_900)), "1:05");
        assert_eq!(format_mss(Duration::from_secs(3_600)), "60:00");
        assert_eq!(format_optional(None), "");
        assert_eq!(format_optional(Some(Duration::ZERO)), "");
        assert_eq!(format_optional(Some(Duration::from_secs(9))), "0:09");
    }

    #[test]
    fn window_keeps_selection_centered() {
        assert_eq!(window(5, 10, 3), (0, 5, 3));
        assert_eq!(window(100, 10, 50), (45, 55, 5));
        assert_eq!(window(100, 10, 98), (90, 100, 8));
        assert_eq!(window(100, 10, 2), (0, 10, 2));
    }

    #[test]
    fn controls_mention_scrub_step() {
        let text = controls_text(7);
        assert!(text.contains("[H/L] scrub -/+7s"));
        assert!(text.contains("[q] quit"));
    }
}

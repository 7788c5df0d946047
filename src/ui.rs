//! UI rendering helpers for the terminal user interface.
//!
//! Drawing only reads the app model and a playback snapshot; every state
//! change goes through `app` or the playback session.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::Line,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph, Tabs, Wrap},
};

use crate::app::{App, LoginField, OpenPlaylist, Picker, PlaylistView, SearchView, Tab};
use crate::config::{ControlsSettings, UiSettings};
use crate::playback::PlaybackState;
use crate::track::{Track, decode_html_entities, format_seconds};


const LEFT_PAD: Padding = Padding {
    left: 1,
    right: 0,
    top: 0,
    bottom: 0,
};

/// Help line for the active tab, incorporating scrub seconds.
fn controls_text(app: &App, scrub_seconds: u64) -> String {
    if app.capturing_text() {
        let keys: &[&str] = match app.tab {
            _ if app.picker.is_some() => &["[enter] create", "[esc] cancel"],
            Tab::Login => &["[tab] field", "[enter] log in", "[ctrl-c] quit"],
            _ => &["[enter] search", "[esc] done"],
        };
        return keys.join(" | ");
    }
    let mut keys: Vec<String> = vec!["[tab/1-3] switch".to_string()];
    if app.picker.is_some() {
        keys.extend(
            ["[j/k] select", "[enter] add", "[n] new playlist", "[esc] close"]
                .map(String::from),
        );
        return keys.join(" | ");
    }
    match app.tab {
        Tab::Search => {
            keys.extend(
                ["[/] query", "[enter] play", "[m] more", "[a] add to playlist", "[R] retry"]
                    .map(String::from),
            );
        }
        Tab::Playlists => {
            keys.extend(
                ["[enter] open/play", "[d] delete mode", "[space] mark", "[D] delete marked", "[esc] back", "[R] retry"]
                    .map(String::from),
            );
        }
        Tab::Login => {}
    }
    keys.push("[space/p] pause".to_string());
    keys.push("[h/l] prev/next".to_string());
    keys.push(format!("[H/L] scrub -/+{scrub_seconds}s"));
    keys.push("[+/-] volume".to_string());
    keys.push("[s] shuffle".to_string());
    if app.logged_in {
        keys.push("[o] logout".to_string());
    }
    keys.push("[q] quit".to_string());
    keys.join(" | ")
}

fn track_line(track: &Track) -> String {
    let title = decode_html_entities(&track.title);
    let secs = track.duration_seconds();
    match track.channel_title.as_deref() {
        Some(channel) => format!("{title} · {channel} ({})", format_seconds(secs)),
        None => format!("{title} ({})", format_seconds(secs)),
    }
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn render_list(frame: &mut Frame, area: Rect, title: String, items: Vec<ListItem>, selected: usize) {
    let empty = items.is_empty();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if !empty {
        state.select(Some(selected));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_message(frame: &mut Frame, area: Rect, title: &str, text: String) {
    let par = Paragraph::new(text)
        .block(Block::bordered().padding(LEFT_PAD).title(title))
        .wrap(Wrap { trim: true });
    frame.render_widget(par, area);
}

/// Render the entire UI into `frame`.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    playback: &PlaybackState,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(4),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let titles: Vec<Line> = Tab::ALL
        .iter()
        .map(|t| Line::from(format!(" {} ", t.title(app.logged_in))))
        .collect();
    let tabs = Tabs::new(titles)
        .select(app.tab.index())
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", ui_settings.header_text))
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(tabs, chunks[0]);

    if app.body_visible() {
        match app.tab {
            Tab::Login => draw_login(frame, app, chunks[1]),
            Tab::Search => draw_search(frame, &app.search, chunks[1]),
            Tab::Playlists => draw_playlists(frame, &app.playlists, chunks[1]),
        }
        if let Some(picker) = &app.picker {
            draw_picker(frame, picker, chunks[1]);
        }
    } else {
        render_message(frame, chunks[1], " ... ", "Checking session...".to_string());
    }

    draw_player(frame, playback, chunks[2]);

    let mut footer = String::new();
    if let Some(notice) = app.notice_text() {
        footer.push_str(notice);
        footer.push('\n');
    }
    footer.push_str(&controls_text(app, controls_settings.scrub_seconds));
    let footer = Paragraph::new(footer)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(LEFT_PAD),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[3]);
}

fn draw_login(frame: &mut Frame, app: &App, area: Rect) {
    if app.logged_in {
        render_message(
            frame,
            area,
            " account ",
            "You are logged in. Press o to log out.".to_string(),
        );
        return;
    }
    let form = &app.login;
    let marker = |field: LoginField| if form.focus == field { "> " } else { "  " };
    let mut text = format!(
        "{}Username: {}\n{}Password: {}",
        marker(LoginField::Username),
        form.username,
        marker(LoginField::Password),
        form.masked_password(),
    );
    if form.submitting {
        text.push_str("\n\nLogging in...");
    }
    render_message(frame, area, " login ", text);
}

fn draw_search(frame: &mut Frame, view: &SearchView, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let cursor = if view.editing { "_" } else { "" };
    let query = Paragraph::new(format!("{}{cursor}", view.query))
        .block(Block::bordered().padding(LEFT_PAD).title(" query (/) "));
    frame.render_widget(query, rows[0]);

    if let Some(err) = &view.error {
        render_message(frame, rows[1], " results ", format!("{err} Press R to retry."));
        return;
    }

    let items: Vec<ListItem> = view
        .results
        .iter()
        .map(|t| ListItem::new(track_line(t)))
        .collect();
    let mut title = format!(" results {}/{} ", view.results.len(), view.total_results);
    if view.loading {
        title.push_str("(loading) ");
    } else if view.has_more {
        title.push_str("(m for more) ");
    }
    render_list(frame, rows[1], title, items, view.selected);
}

fn draw_playlists(frame: &mut Frame, view: &PlaylistView, area: Rect) {
    if let Some(open) = &view.open {
        draw_open_playlist(frame, open, area);
        return;
    }
    if let Some(err) = &view.error {
        render_message(frame, area, " playlists ", format!("{err} Press R to retry."));
        return;
    }
    if view.loading && view.lists.is_empty() {
        render_message(frame, area, " playlists ", "Loading...".to_string());
        return;
    }
    let items: Vec<ListItem> = view
        .lists
        .iter()
        .map(|p| {
            ListItem::new(format!(
                "{} ({} tracks, {})",
                p.name,
                p.items.len(),
                format_seconds(p.total_seconds())
            ))
        })
        .collect();
    render_list(frame, area, " playlists ".to_string(), items, view.selected);
}

fn draw_open_playlist(frame: &mut Frame, open: &OpenPlaylist, area: Rect) {
    let items: Vec<ListItem> = open
        .queue
        .snapshot()
        .iter()
        .map(|t| {
            let line = track_line(t);
            if !open.delete_mode {
                ListItem::new(line)
            } else if open.marked.contains(&t.id) {
                ListItem::new(format!("[x] {line}"))
            } else {
                ListItem::new(format!("[ ] {line}"))
            }
        })
        .collect();
    let title = if open.delete_mode {
        format!(" {} (delete: {} marked) ", open.name, open.marked.len())
    } else {
        format!(" {} ", open.name)
    };
    render_list(frame, area, title, items, open.selected);
}

fn draw_picker(frame: &mut Frame, picker: &Picker, area: Rect) {
    let popup = centered_rect_sized(60, 12, area);
    frame.render_widget(Clear, popup);
    let title = format!(" add \"{}\" ", decode_html_entities(&picker.track.title));

    if let Some(name) = &picker.naming {
        render_message(frame, popup, &title, format!("New playlist name: {name}_"));
        return;
    }
    if let Some(err) = &picker.error {
        render_message(frame, popup, &title, err.clone());
        return;
    }
    if picker.loading {
        render_message(frame, popup, &title, "Loading...".to_string());
        return;
    }
    let items: Vec<ListItem> = picker
        .lists
        .iter()
        .map(|p| ListItem::new(p.name.clone()))
        .collect();
    render_list(frame, popup, title, items, picker.selected);
}

fn volume_label(playback: &PlaybackState) -> String {
    if playback.volume_control {
        format!("{}%", (playback.volume * 100.0).round() as u32)
    } else {
        "n/a".to_string()
    }
}

fn draw_player(frame: &mut Frame, playback: &PlaybackState, area: Rect) {
    let text = match playback.display_track() {
        Some(track) => {
            let state = if playback.pending_track.is_some() {
                "Loading"
            } else if playback.is_playing {
                "Playing"
            } else if playback.ended {
                "Finished"
            } else {
                "Paused"
            };
            let channel = track.channel_title.as_deref().unwrap_or("-");
            format!(
                "{} · {}\n{} • {} / {} • Shuffle: {} • Volume: {}",
                decode_html_entities(&track.title),
                channel,
                state,
                format_seconds(playback.position_ms / 1000),
                format_seconds(playback.duration_ms / 1000),
                if playback.shuffle { "ON" } else { "OFF" },
                volume_label(playback),
            )
        }
        None => format!(
            "Stopped\nShuffle: {} • Volume: {}",
            if playback.shuffle { "ON" } else { "OFF" },
            volume_label(playback),
        ),
    };
    let par = Paragraph::new(text)
        .bold()
        .block(Block::bordered().padding(LEFT_PAD).title(" now playing "))
        .wrap(Wrap { trim: true });
    frame.render_widget(par, area);
}

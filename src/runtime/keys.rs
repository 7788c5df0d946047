use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, SearchRequest, Tab};
use crate::auth::Route;
use crate::config::ControlsSettings;
use crate::playback::Queue;
use crate::track::Track;

/// Work a key press asks the event loop to do.
///
/// Pure view edits (typing, moving the selection) are applied to the app
/// directly and produce no action.
#[derive(Debug, Clone)]
pub enum Action {
    Quit,
    Navigate(Route),
    SubmitLogin,
    Logout,
    Search(SearchRequest),
    LoadPlaylists,
    Play { track: Track, queue: Option<Queue> },
    TogglePause,
    Next,
    Previous,
    ToggleShuffle,
    SeekBy(i64),
    VolumeBy(f32),
    OpenPicker(Track),
    ReloadPicker,
    AppendTo { playlist_id: i64, name: String, track: Track },
    CreatePlaylist(String),
    DeleteItems { playlist_id: i64, ids: Vec<String> },
}

/// Translate one key press. Returns the action the event loop should run.
pub fn handle_key_event(key: KeyEvent, app: &mut App, controls: &ControlsSettings) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }
    if app.picker.is_some() {
        return picker_key(key, app);
    }
    if app.capturing_text() {
        return text_key(key, app);
    }
    if app.body_visible() {
        let local = match app.tab {
            Tab::Search => search_key(key, app),
            Tab::Playlists => playlists_key(key, app),
            Tab::Login => Handled::No,
        };
        match local {
            Handled::Yes(action) => return action,
            Handled::No => {}
        }
    }
    global_key(key, app, controls)
}

enum Handled {
    Yes(Option<Action>),
    No,
}

fn select_tab(tab: Tab, app: &App) -> Option<Action> {
    if tab == Tab::Login && app.logged_in {
        return Some(Action::Logout);
    }
    if tab == app.tab && app.body_visible() {
        return None;
    }
    Some(Action::Navigate(tab.route()))
}

/// Step through tabs; the logout tab is skipped so cycling never logs out.
fn cycle(app: &App, step: fn(Tab) -> Tab) -> Tab {
    let tab = step(app.tab);
    if tab == Tab::Login && app.logged_in {
        step(tab)
    } else {
        tab
    }
}

fn global_key(key: KeyEvent, app: &App, controls: &ControlsSettings) -> Option<Action> {
    let scrub_ms = i64::try_from(controls.scrub_seconds.saturating_mul(1000)).unwrap_or(i64::MAX);
    match key.code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Tab => select_tab(cycle(app, Tab::next), app),
        KeyCode::BackTab => select_tab(cycle(app, Tab::prev), app),
        KeyCode::Char(c @ '1'..='3') => {
            let idx = (c as usize) - ('1' as usize);
            select_tab(Tab::ALL[idx], app)
        }
        KeyCode::Char('o') if app.logged_in => Some(Action::Logout),
        KeyCode::Char('p') | KeyCode::Char(' ') => Some(Action::TogglePause),
        KeyCode::Char('l') => Some(Action::Next),
        KeyCode::Char('h') => Some(Action::Previous),
        KeyCode::Char('s') => Some(Action::ToggleShuffle),
        KeyCode::Char('H') => Some(Action::SeekBy(-scrub_ms)),
        KeyCode::Char('L') => Some(Action::SeekBy(scrub_ms)),
        KeyCode::Char('+') | KeyCode::Char('=') => Some(Action::VolumeBy(controls.volume_step)),
        KeyCode::Char('-') => Some(Action::VolumeBy(-controls.volume_step)),
        _ => None,
    }
}

fn text_key(key: KeyEvent, app: &mut App) -> Option<Action> {
    match app.tab {
        Tab::Search => {
            let search = &mut app.search;
            match key.code {
                KeyCode::Char(c) => search.query.push(c),
                KeyCode::Backspace => {
                    search.query.pop();
                }
                KeyCode::Esc => search.editing = false,
                KeyCode::Enter => return search.begin_search().map(Action::Search),
                _ => {}
            }
            None
        }
        Tab::Login => {
            let form = &mut app.login;
            if form.submitting {
                return None;
            }
            match key.code {
                KeyCode::Char(c) => form.push_char(c),
                KeyCode::Backspace => form.pop_char(),
                KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                    form.toggle_focus()
                }
                KeyCode::Enter => return Some(Action::SubmitLogin),
                _ => {}
            }
            None
        }
        Tab::Playlists => None,
    }
}

fn search_key(key: KeyEvent, app: &mut App) -> Handled {
    let search = &mut app.search;
    let action = match key.code {
        KeyCode::Char('/') => {
            search.editing = true;
            None
        }
        KeyCode::Char('j') | KeyCode::Down => {
            search.select_next();
            None
        }
        KeyCode::Char('k') | KeyCode::Up => {
            search.select_prev();
            None
        }
        KeyCode::Enter => search.selected_track().map(|t| Action::Play {
            track: t.clone(),
            queue: None,
        }),
        KeyCode::Char('m') => search.begin_more().map(Action::Search),
        KeyCode::Char('a') => search.selected_track().cloned().map(Action::OpenPicker),
        KeyCode::Char('R') => search.retry().map(Action::Search),
        _ => return Handled::No,
    };
    Handled::Yes(action)
}

fn playlists_key(key: KeyEvent, app: &mut App) -> Handled {
    let view = &mut app.playlists;
    let action = match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            view.select_next();
            None
        }
        KeyCode::Char('k') | KeyCode::Up => {
            view.select_prev();
            None
        }
        KeyCode::Esc => {
            view.back();
            None
        }
        KeyCode::Char('R') => {
            if view.error.is_some() && view.begin_load() {
                Some(Action::LoadPlaylists)
            } else {
                None
            }
        }
        KeyCode::Enter => match &view.open {
            Some(open) => open.selected_track().map(|track| Action::Play {
                track,
                queue: Some(open.queue.clone()),
            }),
            None => {
                view.open_selected();
                None
            }
        },
        KeyCode::Char('d') => match &mut view.open {
            Some(open) => {
                open.toggle_delete_mode();
                None
            }
            None => return Handled::No,
        },
        KeyCode::Char(' ') => match &mut view.open {
            Some(open) if open.delete_mode => {
                open.toggle_mark();
                None
            }
            _ => return Handled::No,
        },
        KeyCode::Char('D') => match &view.open {
            Some(open) if open.delete_mode && !open.marked.is_empty() => {
                Some(Action::DeleteItems {
                    playlist_id: open.id,
                    ids: open.marked_ids(),
                })
            }
            _ => None,
        },
        _ => return Handled::No,
    };
    Handled::Yes(action)
}

fn picker_key(key: KeyEvent, app: &mut App) -> Option<Action> {
    let picker = app.picker.as_mut()?;
    if let Some(name) = &mut picker.naming {
        match key.code {
            KeyCode::Char(c) => name.push(c),
            KeyCode::Backspace => {
                name.pop();
            }
            KeyCode::Esc => picker.naming = None,
            KeyCode::Enter => return picker.take_name().map(Action::CreatePlaylist),
            _ => {}
        }
        return None;
    }
    match key.code {
        KeyCode::Esc => {
            app.picker = None;
            None
        }
        KeyCode::Char('j') | KeyCode::Down => {
            picker.select_next();
            None
        }
        KeyCode::Char('k') | KeyCode::Up => {
            picker.select_prev();
            None
        }
        KeyCode::Char('n') => {
            picker.start_naming();
            None
        }
        KeyCode::Char('R') if picker.error.is_some() => {
            picker.loading = true;
            picker.error = None;
            Some(Action::ReloadPicker)
        }
        KeyCode::Enter if !picker.loading => {
            let playlist = picker.selected_playlist()?;
            Some(Action::AppendTo {
                playlist_id: playlist.id,
                name: playlist.name.clone(),
                track: picker.track.clone(),
            })
        }
        _ => None,
    }
}

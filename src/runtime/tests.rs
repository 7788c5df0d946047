use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::keys::{Action, handle_key_event};
use crate::app::{App, Picker, Tab};
use crate::auth::{GuardDecision, Route};
use crate::config::ControlsSettings;
use crate::track::{Playlist, SearchPage, Track};

fn t(id: &str) -> Track {
    Track {
        id: id.into(),
        title: id.into(),
        thumbnail_url: String::new(),
        channel_title: None,
        duration_iso8601: None,
    }
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn press(app: &mut App, code: KeyCode) -> Option<Action> {
    handle_key_event(key(code), app, &ControlsSettings::default())
}

fn typed(app: &mut App, text: &str) {
    for c in text.chars() {
        assert!(press(app, KeyCode::Char(c)).is_none());
    }
}

fn app_on(route: Route, logged_in: bool) -> App {
    let mut app = App::new("vibe", Duration::from_millis(2500));
    app.logged_in = logged_in;
    app.begin_navigation(route.clone());
    app.apply_decision(&route, GuardDecision::Render);
    app
}

#[test]
fn ctrl_c_always_quits() {
    let mut app = app_on(Route::Login, false);
    let ev = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
    assert!(matches!(
        handle_key_event(ev, &mut app, &ControlsSettings::default()),
        Some(Action::Quit)
    ));
}

#[test]
fn login_form_captures_text_and_submits() {
    let mut app = app_on(Route::Login, false);
    typed(&mut app, "qa");
    press(&mut app, KeyCode::Tab);
    typed(&mut app, "pw");
    assert_eq!(app.login.username, "qa");
    assert_eq!(app.login.password, "pw");
    assert!(matches!(press(&mut app, KeyCode::Enter), Some(Action::SubmitLogin)));

    app.login.submitting = true;
    assert!(press(&mut app, KeyCode::Char('x')).is_none());
    assert_eq!(app.login.password, "pw");
}

#[test]
fn tab_keys_navigate_and_login_tab_logs_out() {
    let mut app = app_on(Route::Search, true);
    assert!(matches!(
        press(&mut app, KeyCode::Tab),
        Some(Action::Navigate(Route::Playlist))
    ));
    assert!(matches!(press(&mut app, KeyCode::Char('1')), None));
    // Cycling past the last tab skips logout.
    let mut on_playlists = app_on(Route::Playlist, true);
    assert!(matches!(
        press(&mut on_playlists, KeyCode::Tab),
        Some(Action::Navigate(Route::Search))
    ));
    assert!(matches!(
        press(&mut app, KeyCode::BackTab),
        Some(Action::Navigate(Route::Playlist))
    ));
    assert!(matches!(press(&mut app, KeyCode::Char('3')), Some(Action::Logout)));
    assert!(matches!(press(&mut app, KeyCode::Char('o')), Some(Action::Logout)));
}

#[test]
fn search_typing_then_enter_requests_page_one() {
    let mut app = app_on(Route::Search, true);
    assert!(press(&mut app, KeyCode::Char('/')).is_none());
    assert!(app.search.editing);
    // Command keys are plain text while editing.
    typed(&mut app, "lofi q");
    match press(&mut app, KeyCode::Enter) {
        Some(Action::Search(req)) => {
            assert_eq!(req.query, "lofi q");
            assert_eq!(req.page, 1);
        }
        other => panic!("expected search, got {other:?}"),
    }
    assert!(!app.search.editing);
}

#[test]
fn search_results_play_without_queue_and_page() {
    let mut app = app_on(Route::Search, true);
    app.search.query = "x".into();
    let req = app.search.begin_search().unwrap();
    app.search.apply_page(
        &req,
        SearchPage {
            items: vec![t("a"), t("b")],
            has_more: true,
            total_results: 4,
        },
    );

    press(&mut app, KeyCode::Char('j'));
    match press(&mut app, KeyCode::Enter) {
        Some(Action::Play { track, queue }) => {
            assert_eq!(track.id, "b");
            assert!(queue.is_none());
        }
        other => panic!("expected play, got {other:?}"),
    }
    assert!(matches!(
        press(&mut app, KeyCode::Char('m')),
        Some(Action::Search(r)) if r.page == 2
    ));
    assert!(matches!(
        press(&mut app, KeyCode::Char('a')),
        Some(Action::OpenPicker(track)) if track.id == "b"
    ));
}

#[test]
fn playlist_keys_open_play_and_delete() {
    let mut app = app_on(Route::Playlist, true);
    app.playlists.apply_lists(vec![Playlist {
        id: 9,
        name: "Mix".into(),
        items: vec![t("a"), t("b")],
    }]);

    assert!(press(&mut app, KeyCode::Enter).is_none());
    assert!(app.playlists.open.is_some());

    let queue = app.playlists.open.as_ref().unwrap().queue.clone();
    match press(&mut app, KeyCode::Enter) {
        Some(Action::Play {
            track,
            queue: Some(q),
        }) => {
            assert_eq!(track.id, "a");
            assert!(q.same_as(&queue));
        }
        other => panic!("expected play with queue, got {other:?}"),
    }

    // Space pauses outside delete mode and marks inside it.
    assert!(matches!(press(&mut app, KeyCode::Char(' ')), Some(Action::TogglePause)));
    press(&mut app, KeyCode::Char('d'));
    assert!(press(&mut app, KeyCode::Char(' ')).is_none());
    match press(&mut app, KeyCode::Char('D')) {
        Some(Action::DeleteItems { playlist_id, ids }) => {
            assert_eq!(playlist_id, 9);
            assert_eq!(ids, ["a"]);
        }
        other => panic!("expected delete, got {other:?}"),
    }

    press(&mut app, KeyCode::Esc);
    press(&mut app, KeyCode::Esc);
    assert!(app.playlists.open.is_none());
}

#[test]
fn retry_reloads_failed_playlists_only() {
    let mut app = app_on(Route::Playlist, true);
    assert!(press(&mut app, KeyCode::Char('R')).is_none());
    app.playlists.fail("Could not load playlists.".into());
    assert!(matches!(press(&mut app, KeyCode::Char('R')), Some(Action::LoadPlaylists)));
    assert!(app.playlists.loading);
}

#[test]
fn global_controls_use_configured_steps() {
    let mut app = app_on(Route::Search, true);
    let controls = ControlsSettings {
        scrub_seconds: 7,
        volume_step: 0.1,
    };
    let mut hit = |c| handle_key_event(key(KeyCode::Char(c)), &mut app, &controls);
    assert!(matches!(hit('L'), Some(Action::SeekBy(7000))));
    assert!(matches!(hit('H'), Some(Action::SeekBy(-7000))));
    assert!(matches!(hit('+'), Some(Action::VolumeBy(v)) if (v - 0.1).abs() < f32::EPSILON));
    assert!(matches!(hit('-'), Some(Action::VolumeBy(v)) if (v + 0.1).abs() < f32::EPSILON));
    assert!(matches!(hit('l'), Some(Action::Next)));
    assert!(matches!(hit('h'), Some(Action::Previous)));
    assert!(matches!(hit('s'), Some(Action::ToggleShuffle)));
    assert!(matches!(hit('p'), Some(Action::TogglePause)));
    assert!(matches!(hit('q'), Some(Action::Quit)));
}

#[test]
fn picker_appends_or_creates() {
    let mut app = app_on(Route::Search, true);
    let mut picker = Picker::new(t("a"));
    picker.apply_lists(vec![Playlist {
        id: 3,
        name: "Mix".into(),
        items: vec![],
    }]);
    app.picker = Some(picker);

    match press(&mut app, KeyCode::Enter) {
        Some(Action::AppendTo {
            playlist_id,
            name,
            track,
        }) => {
            assert_eq!((playlist_id, name.as_str(), track.id.as_str()), (3, "Mix", "a"));
        }
        other => panic!("expected append, got {other:?}"),
    }

    press(&mut app, KeyCode::Char('n'));
    typed(&mut app, "New");
    assert!(matches!(
        press(&mut app, KeyCode::Enter),
        Some(Action::CreatePlaylist(name)) if name == "New"
    ));

    press(&mut app, KeyCode::Esc);
    assert!(app.picker.is_none());
    assert_eq!(app.tab, Tab::Search);
}

#[test]
fn body_keys_wait_for_guard() {
    let mut app = App::new("vibe", Duration::from_millis(2500));
    app.begin_navigation(Route::Search);
    assert!(press(&mut app, KeyCode::Char('/')).is_none());
    assert!(!app.search.editing);
}

use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, info, warn};

use crate::api::DataError;
use crate::app::{App, Picker, SearchRequest, Tab};
use crate::audio::StatusEvent;
use crate::auth::{AuthError, Evaluation, Notice, Route};
use crate::config;
use crate::playback::PlaybackError;
use crate::secret::load_token;
use crate::track::{Playlist, SearchPage, Track};
use crate::ui;

use super::keys::{Action, handle_key_event};
use super::startup::Services;

const TICK: Duration = Duration::from_millis(250);

/// Results reported back by locally spawned tasks.
pub enum AppEvent {
    Guard(Evaluation),
    LoggedIn(Result<(), AuthError>),
    Searched(SearchRequest, Result<SearchPage, DataError>),
    PlaylistsLoaded(Result<Vec<Playlist>, DataError>),
    PickerLoaded(Result<Vec<Playlist>, DataError>),
    Appended(String, Result<(), DataError>),
    Created(String, Result<(), DataError>),
    Deleted {
        playlist_id: i64,
        ids: Vec<String>,
        result: Result<(), DataError>,
    },
    Playback(Result<Option<Track>, PlaybackError>),
}

/// Event-loop wiring: the app model, the services and the event channel.
pub struct EventLoopState<'a> {
    pub app: App,
    services: Services,
    settings: &'a config::Settings,
    events: UnboundedSender<AppEvent>,
}

impl<'a> EventLoopState<'a> {
    pub fn new(
        app: App,
        services: Services,
        settings: &'a config::Settings,
    ) -> (Self, UnboundedReceiver<AppEvent>) {
        let (events, rx) = unbounded_channel();
        (
            Self {
                app,
                services,
                settings,
                events,
            },
            rx,
        )
    }

    /// Run `fut` on the local set and post its result as an `AppEvent`.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = AppEvent> + 'static,
    {
        let events = self.events.clone();
        tokio::task::spawn_local(async move {
            // The loop is gone on shutdown; nothing left to report to.
            let _ = events.send(fut.await);
        });
    }

    fn token(&self) -> Result<String, DataError> {
        load_token(self.services.store.as_ref()).ok_or(DataError::NoToken)
    }

    /// Leave the current screen: tear playback down and ask the guard about
    /// `route`. The body stays hidden until the guard answers.
    pub fn navigate(&mut self, route: Route) {
        info!(%route, "navigating");
        self.app.begin_navigation(route.clone());

        let session = self.services.session.clone();
        tokio::task::spawn_local(async move { session.teardown().await });

        let guard = self.services.guard.clone();
        self.spawn(async move { AppEvent::Guard(guard.evaluate(&route).await) });
    }

    fn on_screen_entered(&mut self) {
        self.app.logged_in = self.services.guard.is_logged_in();
        if self.app.tab == Tab::Playlists && self.app.playlists.begin_load() {
            self.load_playlists();
        }
    }

    fn load_playlists(&self) {
        let api = self.services.api.clone();
        let token = self.token();
        self.spawn(async move {
            let result = match token {
                Ok(token) => api.playlists(&token).await,
                Err(e) => Err(e),
            };
            AppEvent::PlaylistsLoaded(result)
        });
    }

    fn load_picker(&self) {
        let api = self.services.api.clone();
        let token = self.token();
        self.spawn(async move {
            let result = match token {
                Ok(token) => api.playlists(&token).await,
                Err(e) => Err(e),
            };
            AppEvent::PickerLoaded(result)
        });
    }

    fn logout(&mut self) {
        self.services.guard.logout();
        self.app.logged_in = false;
        self.app.search = Default::default();
        self.app.playlists = Default::default();
        self.app.notify(Notice::LoggedOut);
        self.navigate(Route::Login);
    }

    /// Execute one action. Returns true when the loop should stop.
    pub fn dispatch(&mut self, action: Action) -> bool {
        debug!(?action, "dispatch");
        match action {
            Action::Quit => {
                self.app.should_quit = true;
                return true;
            }
            Action::Navigate(route) => self.navigate(route),
            Action::Logout => self.logout(),
            Action::SubmitLogin => {
                let form = &mut self.app.login;
                form.submitting = true;
                let (username, password) = (form.username.clone(), form.password.clone());
                let guard = self.services.guard.clone();
                self.spawn(async move {
                    AppEvent::LoggedIn(guard.login(&username, &password).await)
                });
            }
            Action::Search(req) => {
                let api = self.services.api.clone();
                let token = self.token();
                let page_size = self.settings.search.page_size;
                self.spawn(async move {
                    let result = match token {
                        Ok(token) => api.search(&token, &req.query, req.page, page_size).await,
                        Err(e) => Err(e),
                    };
                    AppEvent::Searched(req, result)
                });
            }
            Action::LoadPlaylists => self.load_playlists(),
            Action::OpenPicker(track) => {
                self.app.picker = Some(Picker::new(track));
                self.load_picker();
            }
            Action::ReloadPicker => self.load_picker(),
            Action::AppendTo {
                playlist_id,
                name,
                track,
            } => {
                let api = self.services.api.clone();
                let token = self.token();
                self.spawn(async move {
                    let result = match token {
                        Ok(token) => api.append_to_playlist(&token, playlist_id, &track).await,
                        Err(e) => Err(e),
                    };
                    AppEvent::Appended(name, result)
                });
            }
            Action::CreatePlaylist(name) => {
                let api = self.services.api.clone();
                let token = self.token();
                self.spawn(async move {
                    let result = match token {
                        Ok(token) => api.create_playlist(&token, &name).await,
                        Err(e) => Err(e),
                    };
                    AppEvent::Created(name, result)
                });
            }
            Action::DeleteItems { playlist_id, ids } => {
                let api = self.services.api.clone();
                let token = self.token();
                self.spawn(async move {
                    let result = match token {
                        Ok(token) => api.delete_playlist_items(&token, playlist_id, &ids).await,
                        Err(e) => Err(e),
                    };
                    AppEvent::Deleted {
                        playlist_id,
                        ids,
                        result,
                    }
                });
            }
            Action::Play { track, queue } => {
                let session = self.services.session.clone();
                self.spawn(async move {
                    AppEvent::Playback(session.play(track, queue).await.map(|_| None))
                });
            }
            Action::Next => {
                let session = self.services.session.clone();
                self.spawn(async move { AppEvent::Playback(session.next().await) });
            }
            Action::Previous => {
                let session = self.services.session.clone();
                self.spawn(async move { AppEvent::Playback(session.previous().await) });
            }
            Action::TogglePause => {
                let session = self.services.session.clone();
                tokio::task::spawn_local(async move { session.toggle_pause().await });
            }
            Action::ToggleShuffle => {
                let on = self.services.session.toggle_shuffle();
                self.app
                    .notify(if on { "Shuffle on." } else { "Shuffle off." });
            }
            Action::SeekBy(delta_ms) => {
                let session = self.services.session.clone();
                tokio::task::spawn_local(async move { session.seek_by(delta_ms).await });
            }
            Action::VolumeBy(delta) => {
                let session = self.services.session.clone();
                let target = session.snapshot().volume + delta;
                tokio::task::spawn_local(async move { session.set_volume(target).await });
            }
        }
        false
    }

    /// Fold one task result into the app model.
    pub fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::Guard(Evaluation::Superseded) => {}
            AppEvent::Guard(Evaluation::Decided {
                route, decision, ..
            }) => {
                self.app.logged_in = self.services.guard.is_logged_in();
                match self.app.apply_decision(&route, decision) {
                    Some(to) => self.navigate(to),
                    None if self.app.route == route && self.app.body_visible() => {
                        self.on_screen_entered()
                    }
                    None => {}
                }
            }
            AppEvent::LoggedIn(result) => {
                self.app.login.finish(result.is_ok());
                match result {
                    Ok(()) => {
                        self.app.logged_in = true;
                        self.app.notify(Notice::LoggedIn);
                        self.navigate(Route::DEFAULT_PROTECTED);
                    }
                    Err(e) => {
                        warn!(error = %e, "login failed");
                        self.app.notify(e.notice());
                    }
                }
            }
            AppEvent::Searched(req, result) => match result {
                Ok(page) => {
                    self.app.search.apply_page(&req, page);
                }
                Err(e) => {
                    warn!(error = %e, query = %req.query, "search failed");
                    self.app.search.fail(&req, e.user_message());
                }
            },
            AppEvent::PlaylistsLoaded(result) => match result {
                Ok(lists) => self.app.playlists.apply_lists(lists),
                Err(e) => {
                    warn!(error = %e, "loading playlists failed");
                    self.app.playlists.fail(e.user_message());
                }
            },
            AppEvent::PickerLoaded(result) => {
                if let Some(picker) = &mut self.app.picker {
                    match result {
                        Ok(lists) => picker.apply_lists(lists),
                        Err(e) => picker.fail(format!("{} Press R to retry.", e.user_message())),
                    }
                }
            }
            AppEvent::Appended(name, result) => match result {
                Ok(()) => {
                    self.app.picker = None;
                    self.app.notify(format!("Added to {name}."));
                }
                Err(e) => {
                    warn!(error = %e, playlist = %name, "append failed");
                    self.app.notify(e.user_message());
                }
            },
            AppEvent::Created(name, result) => match result {
                Ok(()) => {
                    self.app.notify(format!("Created {name}."));
                    if let Some(picker) = &mut self.app.picker {
                        picker.loading = true;
                        self.load_picker();
                    }
                }
                Err(e) => {
                    warn!(error = %e, playlist = %name, "create failed");
                    self.app.notify(e.user_message());
                }
            },
            AppEvent::Deleted {
                playlist_id,
                ids,
                result,
            } => match result {
                Ok(()) => {
                    self.app.playlists.apply_deleted(playlist_id, &ids);
                    self.app.notify(format!("Removed {} track(s).", ids.len()));
                }
                Err(e) => {
                    warn!(error = %e, playlist_id, "delete failed");
                    self.app.notify(e.user_message());
                }
            },
            AppEvent::Playback(result) => match result {
                Ok(Some(track)) => {
                    debug!(track = %track.id, "advanced");
                }
                Ok(None) => {}
                Err(e) => self.app.notify(e.user_message()),
            },
        }
    }

    fn on_status(&self, event: StatusEvent) {
        let session = self.services.session.clone();
        self.spawn(async move { AppEvent::Playback(session.handle_status(event).await) });
    }

    fn draw(
        &self,
        terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    ) -> std::io::Result<()> {
        let playback = self.services.session.snapshot();
        terminal.draw(|f| {
            ui::draw(
                f,
                &self.app,
                &playback,
                &self.settings.ui,
                &self.settings.controls,
            )
        })?;
        Ok(())
    }
}

/// Forward terminal input from a blocking reader thread.
pub fn spawn_input_thread(tx: UnboundedSender<Event>) {
    std::thread::spawn(move || {
        loop {
            match crossterm::event::read() {
                Ok(ev) => {
                    if tx.send(ev).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "terminal input failed");
                    break;
                }
            }
        }
    });
}

/// Main terminal event loop: input, task results, audio status and a redraw
/// tick. Returns `Ok(())` when shutdown is requested.
pub async fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut EventLoopState<'_>,
    mut events: UnboundedReceiver<AppEvent>,
    mut status: UnboundedReceiver<StatusEvent>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (input_tx, mut input) = unbounded_channel();
    spawn_input_thread(input_tx);

    let mut tick = tokio::time::interval(TICK);
    state.navigate(Route::Root);

    loop {
        state.app.expire_notice(Instant::now());
        state.draw(terminal)?;

        tokio::select! {
            Some(ev) = input.recv() => {
                let Event::Key(key) = ev else { continue };
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if let Some(action) = handle_key_event(key, &mut state.app, &state.settings.controls) {
                    if state.dispatch(action) {
                        break;
                    }
                }
            }
            Some(ev) = events.recv() => state.apply(ev),
            Some(ev) = status.recv() => state.on_status(ev),
            _ = tick.tick() => {}
        }
    }

    state.services.session.teardown().await;
    info!("shutting down");
    Ok(())
}

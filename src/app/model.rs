//! Application model: the current route and tab, guard status, notices
//! and the per-screen views.

use std::time::{Duration, Instant};

use crate::auth::{GuardDecision, Notice, Route};

use super::views::{LoginForm, Picker, PlaylistView, SearchView};

/// Top-level tabs, in display order.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Tab {
    Search,
    Playlists,
    Login,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Search, Tab::Playlists, Tab::Login];

    pub fn route(self) -> Route {
        match self {
            Tab::Search => Route::Search,
            Tab::Playlists => Route::Playlist,
            Tab::Login => Route::Login,
        }
    }

    pub fn for_route(route: &Route) -> Option<Tab> {
        match route {
            Route::Search => Some(Tab::Search),
            Route::Playlist => Some(Tab::Playlists),
            Route::Login => Some(Tab::Login),
            Route::Root | Route::Unknown(_) => None,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Tab::Search => 0,
            Tab::Playlists => 1,
            Tab::Login => 2,
        }
    }

    pub fn next(self) -> Tab {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    pub fn prev(self) -> Tab {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }

    /// The login tab doubles as logout while a session is valid.
    pub fn title(self, logged_in: bool) -> &'static str {
        match self {
            Tab::Search => "Search",
            Tab::Playlists => "Playlists",
            Tab::Login if logged_in => "Logout",
            Tab::Login => "Login",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveNotice {
    pub text: String,
    pub until: Instant,
}

/// The main application model.
pub struct App {
    pub route: Route,
    pub tab: Tab,
    /// A guard evaluation for `route` is outstanding; the body is withheld.
    pub guard_pending: bool,
    pub logged_in: bool,
    pub login: LoginForm,
    pub search: SearchView,
    pub playlists: PlaylistView,
    pub picker: Option<Picker>,
    pub notice: Option<ActiveNotice>,
    pub header_text: String,
    pub should_quit: bool,
    notice_ttl: Duration,
}

impl App {
    pub fn new(header_text: impl Into<String>, notice_ttl: Duration) -> Self {
        Self {
            route: Route::Root,
            tab: Tab::Login,
            guard_pending: true,
            logged_in: false,
            login: LoginForm::default(),
            search: SearchView::default(),
            playlists: PlaylistView::default(),
            picker: None,
            notice: None,
            header_text: header_text.into(),
            should_quit: false,
            notice_ttl,
        }
    }

    /// Start navigating to `route`. Rendering waits for the guard.
    pub fn begin_navigation(&mut self, route: Route) {
        if let Some(tab) = Tab::for_route(&route) {
            self.tab = tab;
        }
        self.route = route;
        self.guard_pending = true;
        self.picker = None;
        self.search.editing = false;
    }

    /// Apply a guard decision. Returns the route to navigate to on redirect.
    pub fn apply_decision(&mut self, route: &Route, decision: GuardDecision) -> Option<Route> {
        if *route != self.route {
            return None;
        }
        match decision {
            GuardDecision::Render => {
                self.guard_pending = false;
                if let Some(tab) = Tab::for_route(route) {
                    self.tab = tab;
                }
                None
            }
            GuardDecision::Redirect { to, notice } => {
                if let Some(notice) = notice {
                    self.notify(notice);
                }
                Some(to)
            }
        }
    }

    /// Whether the screen body may be drawn.
    pub fn body_visible(&self) -> bool {
        !self.guard_pending
    }

    pub fn notify(&mut self, notice: impl Into<NoticeText>) {
        self.notify_at(notice, Instant::now());
    }

    pub fn notify_at(&mut self, notice: impl Into<NoticeText>, now: Instant) {
        self.notice = Some(ActiveNotice {
            text: notice.into().0,
            until: now + self.notice_ttl,
        });
    }

    /// Drop the notice once its time is up.
    pub fn expire_notice(&mut self, now: Instant) {
        if self.notice.as_ref().is_some_and(|n| now >= n.until) {
            self.notice = None;
        }
    }

    pub fn notice_text(&self) -> Option<&str> {
        self.notice.as_ref().map(|n| n.text.as_str())
    }

    /// True while keystrokes go into a text field rather than commands.
    pub fn capturing_text(&self) -> bool {
        if let Some(picker) = &self.picker {
            return picker.naming.is_some();
        }
        match self.tab {
            Tab::Login => !self.logged_in && self.body_visible(),
            Tab::Search => self.search.editing,
            Tab::Playlists => false,
        }
    }
}

/// Anything that can be shown in the status line.
pub struct NoticeText(pub String);

impl From<Notice> for NoticeText {
    fn from(n: Notice) -> Self {
        NoticeText(n.text().to_string())
    }
}

impl From<&str> for NoticeText {
    fn from(s: &str) -> Self {
        NoticeText(s.to_string())
    }
}

impl From<String> for NoticeText {
    fn from(s: String) -> Self {
        NoticeText(s)
    }
}

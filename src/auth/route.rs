use std::fmt;

/// Navigable screens.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Root,
    Login,
    Search,
    Playlist,
    Unknown(String),
}

impl Route {
    /// Where a successful login lands.
    pub const DEFAULT_PROTECTED: Route = Route::Search;

    pub fn parse(path: &str) -> Route {
        match path.trim().trim_end_matches('/') {
            "" => Route::Root,
            "/login" | "/auth" => Route::Login,
            "/search" => Route::Search,
            "/playlist" => Route::Playlist,
            other => Route::Unknown(other.to_string()),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Route::Root => "/",
            Route::Login => "/login",
            Route::Search => "/search",
            Route::Playlist => "/playlist",
            Route::Unknown(p) => p,
        }
    }

    pub fn is_protected(&self) -> bool {
        matches!(self, Route::Search | Route::Playlist)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Transient message shown after a redirect or an auth action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    LoginRequired,
    SessionExpired,
    AlreadyLoggedIn,
    LoggedIn,
    LoggedOut,
    Message(String),
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Notice::LoginRequired => "Please log in to continue.",
            Notice::SessionExpired => "Your session has expired. Please log in again.",
            Notice::AlreadyLoggedIn => "You are already logged in.",
            Notice::LoggedIn => "Logged in.",
            Notice::LoggedOut => "Logged out.",
            Notice::Message(m) => m,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

use std::collections::BTreeSet;

use crate::playback::Queue;
use crate::track::{Playlist, SearchPage, Track};

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum LoginField {
    #[default]
    Username,
    Password,
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub focus: LoginField,
    pub submitting: bool,
}

impl LoginForm {
    fn field_mut(&mut self) -> &mut String {
        match self.focus {
            LoginField::Username => &mut self.username,
            LoginField::Password => &mut self.password,
        }
    }

    pub fn push_char(&mut self, c: char) {
        self.field_mut().push(c);
    }

    pub fn pop_char(&mut self) {
        self.field_mut().pop();
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            LoginField::Username => LoginField::Password,
            LoginField::Password => LoginField::Username,
        };
    }

    pub fn masked_password(&self) -> String {
        "*".repeat(self.password.chars().count())
    }

    /// Forget the password after a submit; the username stays for retries.
    pub fn finish(&mut self, succeeded: bool) {
        self.submitting = false;
        self.password.clear();
        if succeeded {
            self.username.clear();
            self.focus = LoginField::Username;
        }
    }
}

/// One page request, kept so late answers for older queries can be dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub page: u32,
}

#[derive(Debug, Clone, Default)]
pub struct SearchView {
    pub query: String,
    pub editing: bool,
    pub results: Vec<Track>,
    pub page: u32,
    pub has_more: bool,
    pub total_results: u64,
    pub loading: bool,
    pub error: Option<String>,
    pub selected: usize,
    in_flight: Option<SearchRequest>,
    failed: Option<SearchRequest>,
}

impl SearchView {
    /// Start a fresh search for the typed query (page 1).
    pub fn begin_search(&mut self) -> Option<SearchRequest> {
        let query = self.query.trim().to_string();
        self.editing = false;
        if query.is_empty() {
            return None;
        }
        self.results.clear();
        self.selected = 0;
        self.page = 0;
        self.has_more = false;
        self.total_results = 0;
        Some(self.issue(SearchRequest { query, page: 1 }))
    }

    /// Request the next page of the last search, if there is one.
    pub fn begin_more(&mut self) -> Option<SearchRequest> {
        if !self.has_more || self.loading {
            return None;
        }
        let query = self.last_query()?.to_string();
        let page = self.page + 1;
        Some(self.issue(SearchRequest { query, page }))
    }

    /// Repeat the request that last failed.
    pub fn retry(&mut self) -> Option<SearchRequest> {
        if self.loading {
            return None;
        }
        let req = self.failed.take()?;
        Some(self.issue(req))
    }

    fn issue(&mut self, req: SearchRequest) -> SearchRequest {
        self.loading = true;
        self.error = None;
        self.failed = None;
        self.in_flight = Some(req.clone());
        req
    }

    fn last_query(&self) -> Option<&str> {
        self.in_flight
            .as_ref()
            .map(|r| r.query.as_str())
            .filter(|q| !q.is_empty())
    }

    fn is_awaited(&self, req: &SearchRequest) -> bool {
        self.loading && self.in_flight.as_ref() == Some(req)
    }

    /// Page 1 replaces the list; later pages append unseen tracks.
    pub fn apply_page(&mut self, req: &SearchRequest, page: SearchPage) -> bool {
        if !self.is_awaited(req) {
            return false;
        }
        self.loading = false;
        if req.page <= 1 {
            self.results = page.items;
            self.selected = 0;
        } else {
            for track in page.items {
                if !self.results.iter().any(|t| t.id == track.id) {
                    self.results.push(track);
                }
            }
        }
        self.page = req.page;
        self.has_more = page.has_more;
        self.total_results = page.total_results;
        true
    }

    pub fn fail(&mut self, req: &SearchRequest, message: String) -> bool {
        if !self.is_awaited(req) {
            return false;
        }
        self.loading = false;
        self.error = Some(message);
        self.failed = Some(req.clone());
        true
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.results.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_track(&self) -> Option<&Track> {
        self.results.get(self.selected)
    }
}

/// A playlist opened from the list, shared with playback as its queue.
#[derive(Debug, Clone)]
pub struct OpenPlaylist {
    pub id: i64,
    pub name: String,
    pub queue: Queue,
    pub selected: usize,
    pub delete_mode: bool,
    pub marked: BTreeSet<String>,
}

impl OpenPlaylist {
    pub fn new(playlist: &Playlist) -> Self {
        Self {
            id: playlist.id,
            name: playlist.name.clone(),
            queue: Queue::new(playlist.items.clone()),
            selected: 0,
            delete_mode: false,
            marked: BTreeSet::new(),
        }
    }

    pub fn selected_track(&self) -> Option<Track> {
        self.queue.snapshot().into_iter().nth(self.selected)
    }

    pub fn toggle_delete_mode(&mut self) {
        self.delete_mode = !self.delete_mode;
        self.marked.clear();
    }

    pub fn toggle_mark(&mut self) {
        if !self.delete_mode {
            return;
        }
        let Some(track) = self.selected_track() else {
            return;
        };
        if !self.marked.remove(&track.id) {
            self.marked.insert(track.id);
        }
    }

    pub fn marked_ids(&self) -> Vec<String> {
        self.marked.iter().cloned().collect()
    }

    /// Drop deleted items from the queue; playback sees the change too.
    pub fn apply_deleted(&mut self, ids: &[String]) {
        self.queue.remove_ids(ids);
        self.marked.retain(|id| !ids.contains(id));
        if self.marked.is_empty() {
            self.delete_mode = false;
        }
        let len = self.queue.len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlaylistView {
    pub lists: Vec<Playlist>,
    pub loading: bool,
    pub error: Option<String>,
    pub selected: usize,
    pub open: Option<OpenPlaylist>,
}

impl PlaylistView {
    pub fn begin_load(&mut self) -> bool {
        if self.loading {
            return false;
        }
        self.loading = true;
        self.error = None;
        true
    }

    /// Install freshly fetched lists. An open playlist keeps its queue
    /// identity and only has its contents refreshed.
    pub fn apply_lists(&mut self, lists: Vec<Playlist>) {
        self.loading = false;
        if let Some(open) = &mut self.open {
            match lists.iter().find(|p| p.id == open.id) {
                Some(fresh) => {
                    open.queue.replace(fresh.items.clone());
                    open.name = fresh.name.clone();
                    let len = open.queue.len();
                    if open.selected >= len {
                        open.selected = len.saturating_sub(1);
                    }
                }
                None => self.open = None,
            }
        }
        self.lists = lists;
        if self.selected >= self.lists.len() {
            self.selected = self.lists.len().saturating_sub(1);
        }
    }

    pub fn fail(&mut self, message: String) {
        self.loading = false;
        self.error = Some(message);
    }

    pub fn open_selected(&mut self) -> bool {
        match self.lists.get(self.selected) {
            Some(playlist) => {
                self.open = Some(OpenPlaylist::new(playlist));
                true
            }
            None => false,
        }
    }

    /// Leave delete mode, then the open playlist. False when nothing to undo.
    pub fn back(&mut self) -> bool {
        match &mut self.open {
            Some(open) if open.delete_mode => {
                open.toggle_delete_mode();
                true
            }
            Some(_) => {
                self.open = None;
                true
            }
            None => false,
        }
    }

    /// Mirror a server-side deletion into the cached list and the open queue.
    pub fn apply_deleted(&mut self, playlist_id: i64, ids: &[String]) {
        if let Some(list) = self.lists.iter_mut().find(|p| p.id == playlist_id) {
            list.items.retain(|t| !ids.contains(&t.id));
        }
        if let Some(open) = self.open.as_mut().filter(|o| o.id == playlist_id) {
            open.apply_deleted(ids);
        }
    }

    pub fn select_next(&mut self) {
        match &mut self.open {
            Some(open) => {
                if open.selected + 1 < open.queue.len() {
                    open.selected += 1;
                }
            }
            None => {
                if self.selected + 1 < self.lists.len() {
                    self.selected += 1;
                }
            }
        }
    }

    pub fn select_prev(&mut self) {
        match &mut self.open {
            Some(open) => open.selected = open.selected.saturating_sub(1),
            None => self.selected = self.selected.saturating_sub(1),
        }
    }
}

/// Modal for appending a track to one of the user's playlists.
#[derive(Debug, Clone)]
pub struct Picker {
    pub track: Track,
    pub lists: Vec<Playlist>,
    pub loading: bool,
    pub error: Option<String>,
    pub selected: usize,
    /// Name being typed for a new playlist.
    pub naming: Option<String>,
}

impl Picker {
    pub fn new(track: Track) -> Self {
        Self {
            track,
            lists: Vec::new(),
            loading: true,
            error: None,
            selected: 0,
            naming: None,
        }
    }

    pub fn apply_lists(&mut self, lists: Vec<Playlist>) {
        self.loading = false;
        self.error = None;
        self.lists = lists;
        if self.selected >= self.lists.len() {
            self.selected = self.lists.len().saturating_sub(1);
        }
    }

    pub fn fail(&mut self, message: String) {
        self.loading = false;
        self.error = Some(message);
    }

    pub fn selected_playlist(&self) -> Option<&Playlist> {
        self.lists.get(self.selected)
    }

    pub fn start_naming(&mut self) {
        self.naming = Some(String::new());
    }

    /// The trimmed name, or None when blank. Leaves naming mode either way.
    pub fn take_name(&mut self) -> Option<String> {
        let name = self.naming.take()?;
        let name = name.trim();
        (!name.is_empty()).then(|| name.to_string())
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.lists.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}

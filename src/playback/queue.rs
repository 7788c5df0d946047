use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::track::Track;

/// Ordered tracks, unique by id, shared with the screen that loaded them.
///
/// Cloning shares the list: edits made through one clone (for example a
/// playlist deletion) are seen by every other clone.
#[derive(Debug, Clone, Default)]
pub struct Queue(Rc<RefCell<Vec<Track>>>);

impl Queue {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self(Rc::new(RefCell::new(dedup(tracks))))
    }

    pub fn snapshot(&self) -> Vec<Track> {
        self.0.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn position(&self, track_id: &str) -> Option<usize> {
        self.0.borrow().iter().position(|t| t.id == track_id)
    }

    pub fn remove_ids(&self, ids: &[String]) {
        self.0.borrow_mut().retain(|t| !ids.contains(&t.id));
    }

    pub fn replace(&self, tracks: Vec<Track>) {
        *self.0.borrow_mut() = dedup(tracks);
    }

    pub fn same_as(&self, other: &Queue) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

fn dedup(tracks: Vec<Track>) -> Vec<Track> {
    let mut seen = HashSet::new();
    tracks
        .into_iter()
        .filter(|t| seen.insert(t.id.clone()))
        .collect()
}

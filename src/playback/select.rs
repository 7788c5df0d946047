use rand::Rng;
use rand::seq::SliceRandom;

use crate::track::Track;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Index of the track to play after `anchor_id`, or `None` for a no-op.
///
/// In order, boundaries do not wrap. Shuffled, any entry other than the
/// anchor is equally likely. An anchor missing from the queue selects
/// nothing either way.
pub fn select_successor<R: Rng + ?Sized>(
    queue: &[Track],
    anchor_id: &str,
    direction: Direction,
    shuffle: bool,
    rng: &mut R,
) -> Option<usize> {
    let pos = queue.iter().position(|t| t.id == anchor_id)?;

    if shuffle {
        let candidates: Vec<usize> = (0..queue.len()).filter(|&i| i != pos).collect();
        return candidates.choose(rng).copied();
    }

    match direction {
        Direction::Next => (pos + 1 < queue.len()).then_some(pos + 1),
        Direction::Previous => pos.checked_sub(1),
    }
}

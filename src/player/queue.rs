//! The ordered play queue the transport navigates over.
//!
//! Track identity is the listing id: enqueueing is idempotent per id and
//! every cursor fixup keeps the current id current.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::catalog::Track;

#[derive(Debug, Default)]
pub(super) struct TrackQueue {
    tracks: Vec<Track>,
    current: usize,
}

impl TrackQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.tracks.get(self.current)
    }

    /// Append `track` unless a queued entry already carries its id.
    pub fn enqueue(&mut self, track: &Track) -> bool {
        if self.tracks.iter().any(|t| t.id == track.id) {
            return false;
        }
        self.tracks.push(track.clone());
        true
    }

    /// Point the cursor at the queued entry with `id`.
    pub fn jump_to_id(&mut self, id: &str) -> bool {
        match self.tracks.iter().position(|t| t.id == id) {
            Some(pos) => {
                self.current = pos;
                true
            }
            None => false,
        }
    }

    /// Remove the entry at `index`.
    ///
    /// Removing before the cursor shifts it down so it keeps pointing at
    /// the same track; removing the current entry promotes
    /// `min(index, new_len - 1)`; removals after the cursor leave it alone.
    pub fn remove(&mut self, index: usize) -> Option<Track> {
        if index >= self.tracks.len() {
            return None;
        }
        let removed = self.tracks.remove(index);
        if self.tracks.is_empty() {
            self.current = 0;
        } else if index < self.current {
            self.current -= 1;
        } else if index == self.current {
            self.current = index.min(self.tracks.len() - 1);
        }
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
        self.current = 0;
    }

    /// Randomly permute the queue; the current track (by id) stays current.
    pub fn shuffle(&mut self, rng: &mut impl Rng) {
        let current_id = self.current_track().map(|t| t.id.clone());
        self.tracks.shuffle(rng);
        if let Some(id) = current_id {
            if let Some(pos) = self.tracks.iter().position(|t| t.id == id) {
                self.current = pos;
            }
        }
    }

    /// Advance with wraparound and return the new current track.
    pub fn next(&mut self) -> Option<&Track> {
        if self.tracks.is_empty() {
            return None;
        }
        self.current = (self.current + 1) % self.tracks.len();
        self.tracks.get(self.current)
    }

    /// Step back with wraparound and return the new current track.
    pub fn previous(&mut self) -> Option<&Track> {
        if self.tracks.is_empty() {
            return None;
        }
        self.current = if self.current == 0 {
            self.tracks.len() - 1
        } else {
            self.current - 1
        };
        self.tracks.get(self.current)
    }

    /// True when the cursor sits on the last queued entry.
    pub fn on_last(&self) -> bool {
        !self.tracks.is_empty() && self.current + 1 == self.tracks.len()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn track(id: &str) -> Track {
        Track {
            id: id.into(),
            title: format!("Track {id}"),
            artist: String::new(),
            audio_source: String::new(),
            cover_image: None,
            kind: Default::default(),
            purchase_link: None,
            duration_hint: None,
        }
    }

    fn queue_of(ids: &[&str]) -> TrackQueue {
        let mut queue = TrackQueue::new();
        for id in ids {
            queue.enqueue(&track(id));
        }
        queue
    }

    #[test]
    fn enqueue_is_idempotent_per_id() {
        let mut queue = TrackQueue::new();
        assert!(queue.enqueue(&track("a")));
        assert!(!queue.enqueue(&track("a")));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn titles_may_collide_ids_may_not() {
        let mut queue = TrackQueue::new();
        let mut one = track("a");
        let mut two = track("b");
        one.title = "Same Title".into();
        two.title = "Same Title".into();
        assert!(queue.enqueue(&one));
        assert!(queue.enqueue(&two));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn next_wraps_from_last_to_first() {
        let mut queue = queue_of(&["a", "b", "c"]);
        queue.jump_to_id("c");
        assert_eq!(queue.next().unwrap().id, "a");
        assert_eq!(queue.current_index(), 0);
    }

    #[test]
    fn previous_wraps_from_first_to_last() {
        let mut queue = queue_of(&["a", "b", "c"]);
        queue.jump_to_id("a");
        assert_eq!(queue.previous().unwrap().id, "c");
        assert_eq!(queue.current_index(), 2);
    }

    #[test]
    fn next_and_previous_on_empty_queue_are_noops() {
        let mut queue = TrackQueue::new();
        assert!(queue.next().is_none());
        assert!(queue.previous().is_none());
    }

    #[test]
    fn remove_before_cursor_decrements_it() {
        let mut queue = queue_of(&["a", "b", "c"]);
        queue.jump_to_id("c");
        queue.remove(0);
        assert_eq!(queue.current_index(), 1);
        assert_eq!(queue.current_track().unwrap().id, "c");
    }

    #[test]
    fn remove_at_cursor_promotes_successor() {
        let mut queue = queue_of(&["a", "b", "c"]);
        queue.jump_to_id("b");
        let removed = queue.remove(1).unwrap();
        assert_eq!(removed.id, "b");
        assert_eq!(queue.current_index(), 1);
        assert_eq!(queue.current_track().unwrap().id, "c");
    }

    #[test]
    fn remove_at_cursor_on_last_entry_steps_back() {
        let mut queue = queue_of(&["a", "b", "c"]);
        queue.jump_to_id("c");
        queue.remove(2);
        assert_eq!(queue.current_index(), 1);
        assert_eq!(queue.current_track().unwrap().id, "b");
    }

    #[test]
    fn remove_after_cursor_leaves_it_alone() {
        let mut queue = queue_of(&["a", "b", "c"]);
        queue.jump_to_id("a");
        queue.remove(2);
        assert_eq!(queue.current_index(), 0);
        assert_eq!(queue.current_track().unwrap().id, "a");
    }

    #[test]
    fn remove_out_of_range_is_a_noop() {
        let mut queue = queue_of(&["a"]);
        assert!(queue.remove(5).is_none());
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn shuffle_keeps_current_id_current() {
        let mut queue = queue_of(&["a", "b", "c", "d", "e", "f", "g", "h"]);
        queue.jump_to_id("d");

        let mut rng = StdRng::seed_from_u64(7);
        queue.shuffle(&mut rng);

        assert_eq!(queue.len(), 8);
        assert_eq!(queue.current_track().unwrap().id, "d");

        let mut ids: Vec<&str> = queue.tracks().iter().map(|t| t.id.as_str()).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec!["a", "b", "c", "d", "e", "f", "g", "h"]);
    }

    #[test]
    fn clear_resets_cursor() {
        let mut queue = queue_of(&["a", "b"]);
        queue.jump_to_id("b");
        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.current_index(), 0);
        assert!(queue.current_track().is_none());
    }

    #[test]
    fn on_last_tracks_the_cursor() {
        let mut queue = queue_of(&["a", "b"]);
        queue.jump_to_id("a");
        assert!(!queue.on_last());
        queue.jump_to_id("b");
        assert!(queue.on_last());
        assert!(!TrackQueue::new().on_last());
    }
}

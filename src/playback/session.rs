use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::api::stream_url;
use crate::audio::{AudioResourceAdapter, ResourceHandle, StatusEvent, StatusKind};
use crate::secret::{SecretStore, load_token};
use crate::track::Track;

use super::error::PlaybackError;
use super::queue::Queue;
use super::select::{Direction, select_successor};
use super::state::PlaybackState;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    Started(ResourceHandle),
    /// A newer play or a teardown took over before this one finished.
    Superseded,
}

/// Owns the playback state and the single live audio resource.
///
/// Every `play` bumps a generation counter; work that resumes after an await
/// checks the counter and backs off when it is stale. Resource release and
/// creation are serialized through `lane`, a FIFO async mutex, so the old
/// resource is always gone before the next one is opened.
pub struct PlaybackSession<A> {
    adapter: A,
    store: Rc<dyn SecretStore>,
    base_url: String,
    state: RefCell<PlaybackState>,
    generation: Cell<u64>,
    installed_generation: Cell<u64>,
    lane: Mutex<()>,
    rng: RefCell<StdRng>,
}

impl<A: AudioResourceAdapter> PlaybackSession<A> {
    pub fn new(
        adapter: A,
        store: Rc<dyn SecretStore>,
        base_url: &str,
        volume: f32,
        shuffle: bool,
    ) -> Self {
        Self::with_rng(adapter, store, base_url, volume, shuffle, StdRng::from_entropy())
    }

    pub fn with_rng(
        adapter: A,
        store: Rc<dyn SecretStore>,
        base_url: &str,
        volume: f32,
        shuffle: bool,
        rng: StdRng,
    ) -> Self {
        let mut state = PlaybackState::new(volume.clamp(0.0, 1.0), shuffle);
        state.volume_control = adapter.capabilities().volume;
        Self {
            adapter,
            store,
            base_url: base_url.to_string(),
            state: RefCell::new(state),
            generation: Cell::new(0),
            installed_generation: Cell::new(0),
            lane: Mutex::new(()),
            rng: RefCell::new(rng),
        }
    }

    pub fn snapshot(&self) -> PlaybackState {
        self.state.borrow().clone()
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    fn bump(&self) -> u64 {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        generation
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.get() == generation
    }

    /// Whether `handle` is the installed resource and no play started since.
    fn is_live(&self, handle: ResourceHandle) -> bool {
        self.state.borrow().audio_handle == Some(handle)
            && self.installed_generation.get() == self.generation.get()
    }

    /// Start `track`, replacing whatever is playing.
    ///
    /// `queue` becomes the list next / previous walk through; `None` makes
    /// them no-ops.
    pub async fn play(&self, track: Track, queue: Option<Queue>) -> Result<PlayOutcome, PlaybackError> {
        let generation = self.bump();
        {
            let mut st = self.state.borrow_mut();
            st.pending_track = Some(track.clone());
            st.queue = queue;
        }
        debug!(generation, track = %track.id, "play requested");

        let _lane = self.lane.lock().await;

        let old = {
            let mut st = self.state.borrow_mut();
            let old = st.audio_handle.take();
            st.clear_track();
            old
        };
        if let Some(old) = old {
            if let Err(e) = self.adapter.release(old).await {
                warn!(handle = %old, error = %e, "release failed");
            }
        }

        if !self.is_current(generation) {
            return Ok(PlayOutcome::Superseded);
        }

        let Some(token) = load_token(self.store.as_ref()) else {
            return self.fail(generation, PlaybackError::StreamUnavailable("not logged in".into()));
        };
        let url = stream_url(&self.base_url, &track.id);

        let handle = match self.adapter.open(&url, &token).await {
            Ok(h) => h,
            Err(e) => return self.fail(generation, e.into()),
        };

        if !self.is_current(generation) {
            debug!(%handle, "discarding stale resource");
            if let Err(e) = self.adapter.release(handle).await {
                warn!(%handle, error = %e, "release failed");
            }
            return Ok(PlayOutcome::Superseded);
        }

        let volume = {
            let mut st = self.state.borrow_mut();
            st.duration_ms = track.duration_seconds() * 1000;
            st.position_ms = 0;
            st.current_track = Some(track.clone());
            st.audio_handle = Some(handle);
            st.pending_track = None;
            st.is_playing = true;
            st.volume
        };
        self.installed_generation.set(generation);

        if let Err(e) = self.adapter.set_volume(handle, volume).await {
            warn!(%handle, error = %e, "could not apply volume");
        }
        if !self.is_current(generation) {
            return Ok(PlayOutcome::Superseded);
        }
        if let Err(e) = self.adapter.play(handle).await {
            {
                let mut st = self.state.borrow_mut();
                if st.audio_handle == Some(handle) {
                    st.clear_track();
                }
            }
            if let Err(e) = self.adapter.release(handle).await {
                warn!(%handle, error = %e, "release failed");
            }
            return self.fail(generation, e.into());
        }

        info!(%handle, track = %track.id, "playing");
        Ok(PlayOutcome::Started(handle))
    }

    fn fail(&self, generation: u64, err: PlaybackError) -> Result<PlayOutcome, PlaybackError> {
        if !self.is_current(generation) {
            debug!(error = %err, "stale play failed");
            return Ok(PlayOutcome::Superseded);
        }
        warn!(error = %err, "playback failed");
        let mut st = self.state.borrow_mut();
        st.clear_track();
        st.pending_track = None;
        Err(err)
    }

    pub async fn pause(&self) {
        let _lane = self.lane.lock().await;
        let Some(handle) = self.state.borrow().audio_handle else {
            return;
        };
        match self.adapter.pause(handle).await {
            Ok(()) => self.state.borrow_mut().is_playing = false,
            Err(e) => warn!(%handle, error = %e, "pause failed"),
        }
    }

    /// Continue the installed resource. One that already played to its end
    /// starts again from the beginning.
    pub async fn resume(&self) {
        let _lane = self.lane.lock().await;
        let Some(handle) = self.state.borrow().audio_handle else {
            return;
        };
        match self.adapter.play(handle).await {
            Ok(()) => {
                let mut st = self.state.borrow_mut();
                if st.ended {
                    debug!(%handle, "restarting finished track");
                    st.ended = false;
                    st.position_ms = 0;
                }
                st.is_playing = true;
            }
            Err(e) => warn!(%handle, error = %e, "resume failed"),
        }
    }

    pub async fn toggle_pause(&self) {
        if self.state.borrow().is_playing {
            self.pause().await;
        } else {
            self.resume().await;
        }
    }

    pub async fn next(&self) -> Result<Option<Track>, PlaybackError> {
        self.step(Direction::Next).await
    }

    pub async fn previous(&self) -> Result<Option<Track>, PlaybackError> {
        self.step(Direction::Previous).await
    }

    async fn step(&self, direction: Direction) -> Result<Option<Track>, PlaybackError> {
        let (target, queue) = {
            let st = self.state.borrow();
            let (Some(anchor), Some(queue)) = (st.anchor(), st.queue.as_ref()) else {
                return Ok(None);
            };
            let tracks = queue.snapshot();
            let picked = select_successor(
                &tracks,
                &anchor.id,
                direction,
                st.shuffle,
                &mut *self.rng.borrow_mut(),
            );
            match picked {
                Some(i) => (tracks[i].clone(), queue.clone()),
                None => return Ok(None),
            }
        };

        debug!(?direction, track = %target.id, "stepping");
        self.play(target.clone(), Some(queue)).await?;
        Ok(Some(target))
    }

    /// Flip shuffle; the current resource is untouched.
    pub fn toggle_shuffle(&self) -> bool {
        let mut st = self.state.borrow_mut();
        st.shuffle = !st.shuffle;
        st.shuffle
    }

    /// Jump to `position_ms`, clamped to the known duration.
    pub async fn seek(&self, position_ms: u64) {
        let _lane = self.lane.lock().await;
        let (handle, target) = {
            let st = self.state.borrow();
            let Some(handle) = st.audio_handle else {
                return;
            };
            let target = if st.duration_ms > 0 {
                position_ms.min(st.duration_ms)
            } else {
                position_ms
            };
            (handle, target)
        };
        if !self.adapter.capabilities().seek {
            debug!("seek not supported by this backend");
            return;
        }
        match self.adapter.seek(handle, target).await {
            Ok(()) => {
                let mut st = self.state.borrow_mut();
                if st.audio_handle == Some(handle) {
                    st.position_ms = target;
                    st.ended = false;
                }
            }
            Err(e) => warn!(%handle, error = %e, "seek failed"),
        }
    }

    /// Move the position by `delta_ms` (negative rewinds).
    pub async fn seek_by(&self, delta_ms: i64) {
        let current = self.state.borrow().position_ms;
        let target = current.saturating_add_signed(delta_ms);
        self.seek(target).await;
    }

    /// Set the volume in [0, 1]. Non-finite input is ignored.
    pub async fn set_volume(&self, volume: f32) {
        if !volume.is_finite() {
            return;
        }
        let volume = volume.clamp(0.0, 1.0);
        let handle = {
            let mut st = self.state.borrow_mut();
            st.volume = volume;
            st.audio_handle
        };
        let Some(handle) = handle else {
            return;
        };
        let _lane = self.lane.lock().await;
        if self.state.borrow().audio_handle != Some(handle) {
            return;
        }
        if let Err(e) = self.adapter.set_volume(handle, volume).await {
            warn!(%handle, error = %e, "volume change failed");
        }
    }

    /// Auto-advance after `handle` finished.
    ///
    /// Ignored unless `handle` is installed and no newer play has started.
    /// At the end of the queue playback simply stops and the finished
    /// resource stays current.
    pub async fn on_track_ended(&self, handle: ResourceHandle) -> Result<Option<Track>, PlaybackError> {
        if !self.is_live(handle) {
            debug!(%handle, "ignoring end of superseded resource");
            return Ok(None);
        }
        {
            let mut st = self.state.borrow_mut();
            st.is_playing = false;
            st.ended = true;
            st.position_ms = st.duration_ms;
        }
        let advanced = self.next().await?;
        if advanced.is_none() {
            debug!(%handle, "queue finished");
        }
        Ok(advanced)
    }

    /// Apply one status event from the adapter.
    pub async fn handle_status(&self, event: StatusEvent) -> Result<Option<Track>, PlaybackError> {
        if event.kind == StatusKind::Ended {
            return self.on_track_ended(event.handle).await;
        }

        let mut st = self.state.borrow_mut();
        if st.audio_handle != Some(event.handle) {
            return Ok(None);
        }
        match event.kind {
            StatusKind::Position(ms) => st.position_ms = ms,
            StatusKind::Duration(ms) if ms > 0 => st.duration_ms = ms,
            StatusKind::Duration(_) => {}
            StatusKind::Playing(playing) => st.is_playing = playing,
            StatusKind::Ended => {}
        }
        Ok(None)
    }

    /// Drop the current track and release its resource.
    ///
    /// In-flight plays become stale. Spawn this on its own task so the
    /// release finishes even when the caller goes away.
    pub async fn teardown(&self) {
        self.bump();
        let handle = {
            let mut st = self.state.borrow_mut();
            let handle = st.audio_handle;
            st.clear_track();
            st.pending_track = None;
            st.queue = None;
            handle
        };

        let _lane = self.lane.lock().await;
        if let Some(handle) = handle {
            if let Err(e) = self.adapter.release(handle).await {
                warn!(%handle, error = %e, "release on teardown failed");
            }
            debug!(%handle, "torn down");
        }
    }
}

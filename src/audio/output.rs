//! Dedicated thread owning the rodio output stream.
//!
//! Commands arrive over a std channel; replies go back over oneshot channels
//! and status events over the adapter's tokio channel. The loop wakes every
//! 200 ms to publish positions and detect drained sinks.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use bytes::Bytes;
use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tokio::sync::oneshot;
use tracing::{debug, error, warn};

use super::sink::create_sink_at;
use super::types::{AdapterError, ResourceHandle, StatusEvent, StatusKind, StatusSender};

const TICK: Duration = Duration::from_millis(200);
const POSITION_EVERY: Duration = Duration::from_millis(500);

/// Which status events a voice publishes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(super) enum Reporting {
    /// Position, duration, playing flag and end.
    Full,
    /// Playing flag and end only, like a media element.
    PlaybackOnly,
}

pub(super) enum OutputCmd {
    Load {
        handle: ResourceHandle,
        bytes: Bytes,
        reporting: Reporting,
        volume: f32,
        reply: oneshot::Sender<Result<Option<Duration>, String>>,
    },
    Play(ResourceHandle),
    Pause(ResourceHandle),
    Seek {
        handle: ResourceHandle,
        position: Duration,
    },
    SetVolume {
        handle: ResourceHandle,
        volume: f32,
    },
    Release {
        handle: ResourceHandle,
        reply: oneshot::Sender<()>,
    },
}

/// Cloneable sender side of the output thread.
#[derive(Debug, Clone)]
pub struct OutputHandle {
    tx: Sender<OutputCmd>,
}

impl OutputHandle {
    /// Start the output thread. The device is opened on first load, so a
    /// machine without audio only fails the opens.
    pub fn spawn(events: StatusSender) -> Self {
        let (tx, rx) = mpsc::channel::<OutputCmd>();
        thread::Builder::new()
            .name("vibe-audio".into())
            .spawn(move || run_output(rx, events))
            .map(|_| ())
            .unwrap_or_else(|e| error!(error = %e, "failed to spawn audio thread"));
        Self { tx }
    }

    /// A handle whose commands land on the returned receiver.
    #[cfg(test)]
    pub(super) fn detached() -> (Self, Receiver<OutputCmd>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }

    fn send(&self, cmd: OutputCmd) -> Result<(), AdapterError> {
        self.tx
            .send(cmd)
            .map_err(|_| AdapterError::Output("audio thread stopped".into()))
    }

    pub(super) async fn load(
        &self,
        handle: ResourceHandle,
        bytes: Bytes,
        reporting: Reporting,
        volume: f32,
    ) -> Result<Option<Duration>, AdapterError> {
        let (reply, rx) = oneshot::channel();
        self.send(OutputCmd::Load {
            handle,
            bytes,
            reporting,
            volume,
            reply,
        })?;
        rx.await
            .map_err(|_| AdapterError::Output("audio thread stopped".into()))?
            .map_err(AdapterError::Decode)
    }

    pub(super) fn play(&self, handle: ResourceHandle) -> Result<(), AdapterError> {
        self.send(OutputCmd::Play(handle))
    }

    pub(super) fn pause(&self, handle: ResourceHandle) -> Result<(), AdapterError> {
        self.send(OutputCmd::Pause(handle))
    }

    pub(super) fn seek(&self, handle: ResourceHandle, position: Duration) -> Result<(), AdapterError> {
        self.send(OutputCmd::Seek { handle, position })
    }

    pub(super) fn set_volume(&self, handle: ResourceHandle, volume: f32) -> Result<(), AdapterError> {
        self.send(OutputCmd::SetVolume { handle, volume })
    }

    /// Stop and drop the sink; resolves once the thread has done so.
    pub(super) async fn release(&self, handle: ResourceHandle) -> Result<(), AdapterError> {
        let (reply, rx) = oneshot::channel();
        self.send(OutputCmd::Release { handle, reply })?;
        rx.await
            .map_err(|_| AdapterError::Output("audio thread stopped".into()))
    }
}

struct Voice {
    sink: Sink,
    bytes: Bytes,
    reporting: Reporting,
    volume: f32,
    paused: bool,
    ended: bool,
    // Track start time and accumulated elapsed when paused.
    started_at: Option<Instant>,
    accumulated: Duration,
    last_report: Instant,
}

impl Voice {
    fn elapsed(&self) -> Duration {
        self.accumulated + self.started_at.map_or(Duration::ZERO, |st| st.elapsed())
    }

    fn resume(&mut self) {
        if self.paused {
            self.sink.play();
            self.started_at = Some(Instant::now());
            self.paused = false;
        }
    }

    fn suspend(&mut self) {
        if !self.paused {
            self.sink.pause();
            if let Some(st) = self.started_at.take() {
                self.accumulated += st.elapsed();
            }
            self.paused = true;
        }
    }
}

struct Output {
    stream: Option<OutputStream>,
    voices: HashMap<ResourceHandle, Voice>,
    events: StatusSender,
}

impl Output {
    fn emit(&self, handle: ResourceHandle, kind: StatusKind) {
        // The receiver only goes away on shutdown.
        let _ = self.events.send(StatusEvent::new(handle, kind));
    }

    fn stream(&mut self) -> Result<&OutputStream, String> {
        if self.stream.is_none() {
            let mut stream = OutputStreamBuilder::open_default_stream().map_err(|e| e.to_string())?;
            // rodio logs to stderr when OutputStream is dropped, which is
            // noisy for a TUI app.
            stream.log_on_drop(false);
            self.stream = Some(stream);
        }
        self.stream
            .as_ref()
            .ok_or_else(|| "no output stream".to_string())
    }

    fn load(
        &mut self,
        handle: ResourceHandle,
        bytes: Bytes,
        reporting: Reporting,
        volume: f32,
    ) -> Result<Option<Duration>, String> {
        let stream = self.stream()?;
        let (sink, total) = create_sink_at(stream, &bytes, Duration::ZERO)?;
        sink.set_volume(volume);
        self.voices.insert(
            handle,
            Voice {
                sink,
                bytes,
                reporting,
                volume,
                paused: true,
                ended: false,
                started_at: None,
                accumulated: Duration::ZERO,
                last_report: Instant::now(),
            },
        );
        if reporting == Reporting::Full {
            if let Some(total) = total {
                self.emit(handle, StatusKind::Duration(total.as_millis() as u64));
            }
        }
        debug!(%handle, ?total, "loaded voice");
        Ok(total)
    }

    fn play(&mut self, handle: ResourceHandle) {
        let Some(voice) = self.voices.get_mut(&handle) else {
            return;
        };
        // A drained sink has nothing left; start the voice over.
        let restarted = voice.ended;
        if restarted {
            let Some(stream) = self.stream.as_ref() else {
                return;
            };
            if let Err(e) = rebuild(stream, voice, Duration::ZERO) {
                warn!(%handle, error = %e, "restart failed");
                return;
            }
        }
        voice.resume();
        if restarted && voice.reporting == Reporting::Full {
            self.emit(handle, StatusKind::Position(0));
        }
        self.emit(handle, StatusKind::Playing(true));
    }

    fn pause(&mut self, handle: ResourceHandle) {
        let Some(voice) = self.voices.get_mut(&handle) else {
            return;
        };
        voice.suspend();
        self.emit(handle, StatusKind::Playing(false));
    }

    fn seek(&mut self, handle: ResourceHandle, position: Duration) {
        let Some(stream) = self.stream.as_ref() else {
            return;
        };
        let Some(voice) = self.voices.get_mut(&handle) else {
            return;
        };
        if let Err(e) = rebuild(stream, voice, position) {
            warn!(%handle, error = %e, "seek failed");
            return;
        }
        if !voice.paused {
            voice.sink.play();
            voice.started_at = Some(Instant::now());
        }
        if voice.reporting == Reporting::Full {
            let ms = position.as_millis() as u64;
            self.emit(handle, StatusKind::Position(ms));
        }
    }

    fn set_volume(&mut self, handle: ResourceHandle, volume: f32) {
        if let Some(voice) = self.voices.get_mut(&handle) {
            voice.volume = volume;
            voice.sink.set_volume(volume);
        }
    }

    fn release(&mut self, handle: ResourceHandle) {
        if let Some(voice) = self.voices.remove(&handle) {
            voice.sink.stop();
            debug!(%handle, "released voice");
        }
    }

    /// Periodic check for drained sinks and position reports.
    fn tick(&mut self) {
        let mut out = Vec::new();
        for (handle, voice) in self.voices.iter_mut() {
            if voice.paused || voice.ended {
                continue;
            }
            if voice.sink.empty() {
                voice.suspend();
                voice.ended = true;
                if voice.reporting == Reporting::Full {
                    out.push((*handle, StatusKind::Position(voice.elapsed().as_millis() as u64)));
                }
                out.push((*handle, StatusKind::Playing(false)));
                out.push((*handle, StatusKind::Ended));
                continue;
            }
            if voice.reporting == Reporting::Full && voice.last_report.elapsed() >= POSITION_EVERY {
                voice.last_report = Instant::now();
                out.push((*handle, StatusKind::Position(voice.elapsed().as_millis() as u64)));
            }
        }
        for (handle, kind) in out {
            self.emit(handle, kind);
        }
    }
}

/// Swap in a fresh paused sink starting at `position`.
///
/// Scrubbing and restarting both rebuild the sink and skip into the stream.
fn rebuild(stream: &OutputStream, voice: &mut Voice, position: Duration) -> Result<(), String> {
    let (sink, _) = create_sink_at(stream, &voice.bytes, position)?;
    voice.sink.stop();
    sink.set_volume(voice.volume);
    voice.sink = sink;
    voice.accumulated = position;
    voice.started_at = None;
    voice.ended = false;
    Ok(())
}

fn run_output(rx: Receiver<OutputCmd>, events: StatusSender) {
    let mut output = Output {
        stream: None,
        voices: HashMap::new(),
        events,
    };

    loop {
        match rx.recv_timeout(TICK) {
            Ok(cmd) => match cmd {
                OutputCmd::Load {
                    handle,
                    bytes,
                    reporting,
                    volume,
                    reply,
                } => {
                    let res = output.load(handle, bytes, reporting, volume);
                    if let Err(e) = &res {
                        warn!(%handle, error = %e, "failed to load audio");
                    }
                    let _ = reply.send(res);
                }
                OutputCmd::Play(handle) => output.play(handle),
                OutputCmd::Pause(handle) => output.pause(handle),
                OutputCmd::Seek { handle, position } => output.seek(handle, position),
                OutputCmd::SetVolume { handle, volume } => output.set_volume(handle, volume),
                OutputCmd::Release { handle, reply } => {
                    output.release(handle);
                    let _ = reply.send(());
                }
            },
            Err(RecvTimeoutError::Timeout) => output.tick(),
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    for (_, voice) in output.voices.drain() {
        voice.sink.stop();
    }
}

//! Building `rodio` sinks from fetched audio bytes.
//!
//! Bytes are decoded from memory and the sink is returned paused at the
//! requested start position, so callers decide when it becomes audible.

use std::io::Cursor;
use std::time::Duration;

use bytes::Bytes;
use rodio::{Decoder, OutputStream, Sink, Source};

/// Create a paused `Sink` over `bytes` starting at `start_at`, plus the
/// decoder's total duration when the container exposes one.
pub(super) fn create_sink_at(
    stream: &OutputStream,
    bytes: &Bytes,
    start_at: Duration,
) -> Result<(Sink, Option<Duration>), String> {
    let decoder = Decoder::new(Cursor::new(bytes.clone())).map_err(|e| e.to_string())?;
    let total = decoder.total_duration();
    // `skip_duration` is the seeking primitive; Duration::ZERO is fine.
    let source = decoder.skip_duration(start_at);

    let sink = Sink::connect_new(stream.mixer());
    sink.append(source);
    sink.pause();
    Ok((sink, total))
}

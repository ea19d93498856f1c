/// Stream engine backed by rodio
///
/// Each stream gets its own `Sink` on the shared output device, so streams
/// can be paused, stopped and adjusted independently.
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sample, Sink, Source};

use super::stream::{StreamAttribute, StreamEngine, StreamFlags, StreamHandle, StreamStatus};
use crate::error::EngineError;

/// File could not be opened
pub const ERROR_FILE_OPEN: i32 = 2;

/// No usable output device
pub const ERROR_DEVICE: i32 = 23;

/// File format not supported by any decoder
pub const ERROR_FORMAT: i32 = 41;

/// Engine playing through the default output device
pub struct RodioEngine {
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
}

impl RodioEngine {
    /// Open the default output device
    pub fn new() -> Result<Self, EngineError> {
        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| EngineError::new(ERROR_DEVICE, e.to_string()))?;
        tracing::info!("Opened default audio output device");

        Ok(Self {
            _stream: stream,
            stream_handle,
        })
    }
}

impl StreamEngine for RodioEngine {
    fn create(&self, path: &Path, flags: StreamFlags) -> Result<Box<dyn StreamHandle>, EngineError> {
        let file = File::open(path).map_err(|e| EngineError::new(ERROR_FILE_OPEN, e.to_string()))?;
        let reader = BufReader::new(file);

        // Each decoder is a different type, so we use dynamic dispatch
        let source: Box<dyn Source<Item = i16> + Send> = if flags.looping {
            Box::new(
                Decoder::new_looped(reader)
                    .map_err(|e| EngineError::new(ERROR_FORMAT, e.to_string()))?,
            )
        } else {
            Box::new(Decoder::new(reader).map_err(|e| EngineError::new(ERROR_FORMAT, e.to_string()))?)
        };

        let pan = Arc::new(AtomicU32::new(0.0f32.to_bits()));
        let sink = Sink::try_new(&self.stream_handle)
            .map_err(|e| EngineError::new(ERROR_DEVICE, e.to_string()))?;

        // Created paused, `play` starts it
        sink.pause();
        sink.append(Panned::new(source, Arc::clone(&pan)));

        tracing::debug!(
            "Created rodio stream for {} (looping={}, auto_free={})",
            path.display(),
            flags.looping,
            flags.auto_free
        );

        Ok(Box::new(RodioStream { sink, pan }))
    }
}

/// One sink per stream
struct RodioStream {
    sink: Sink,
    pan: Arc<AtomicU32>,
}

impl StreamHandle for RodioStream {
    fn play(&self) {
        self.sink.play();
    }

    fn pause(&self) {
        self.sink.pause();
    }

    fn stop(&self) {
        self.sink.stop();
    }

    fn free(self: Box<Self>) {
        // Dropping the sink releases the decoder
        drop(self);
    }

    fn set_attribute(&self, attribute: StreamAttribute, value: f32) {
        match attribute {
            StreamAttribute::Volume => self.sink.set_volume(value.clamp(0.0, 1.0)),
            StreamAttribute::Pan => self
                .pan
                .store(value.clamp(-1.0, 1.0).to_bits(), Ordering::Relaxed),
        }
    }

    fn status(&self) -> Option<StreamStatus> {
        // rodio has no notion of a stalled stream
        Some(if self.sink.empty() {
            StreamStatus::Stopped
        } else if self.sink.is_paused() {
            StreamStatus::Paused
        } else {
            StreamStatus::Active
        })
    }
}

/// Stereo balance applied while samples are pulled
///
/// The pan value is shared with the handle so it can change mid-playback.
/// Mono and multichannel sources pass through untouched.
struct Panned<S> {
    inner: S,
    pan: Arc<AtomicU32>,
    channel: u16,
}

impl<S> Panned<S> {
    fn new(inner: S, pan: Arc<AtomicU32>) -> Self {
        Self {
            inner,
            pan,
            channel: 0,
        }
    }
}

fn channel_gain(pan: f32, channel: u16) -> f32 {
    if channel == 0 {
        (1.0 - pan).min(1.0)
    } else {
        (1.0 + pan).min(1.0)
    }
}

impl<S> Iterator for Panned<S>
where
    S: Source,
    S::Item: Sample,
{
    type Item = S::Item;

    fn next(&mut self) -> Option<S::Item> {
        let sample = self.inner.next()?;
        let channels = self.inner.channels().max(1);
        let channel = self.channel;
        self.channel = (self.channel + 1) % channels;

        if channels != 2 {
            return Some(sample);
        }
        let pan = f32::from_bits(self.pan.load(Ordering::Relaxed));
        Some(sample.amplify(channel_gain(pan, channel)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<S> Source for Panned<S>
where
    S: Source,
    S::Item: Sample,
{
    fn current_frame_len(&self) -> Option<usize> {
        self.inner.current_frame_len()
    }

    fn channels(&self) -> u16 {
        self.inner.channels()
    }

    fn sample_rate(&self) -> u32 {
        self.inner.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        self.inner.total_duration()
    }
}

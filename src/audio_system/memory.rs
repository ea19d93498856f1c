/// In-memory stream engine
///
/// Simulates streams without an output device. Every call made on a handle
/// is recorded, which makes it suitable for dry runs and for asserting
/// release ordering.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use super::stream::{StreamAttribute, StreamEngine, StreamFlags, StreamHandle, StreamStatus};
use crate::error::EngineError;

/// Identifier of a simulated stream, in creation order
pub type StreamId = u64;

/// Call made on a simulated handle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StreamCall {
    Play,
    Pause,
    Stop,
    Free,
    SetAttribute(StreamAttribute, f32),
}

/// Snapshot of a simulated stream
#[derive(Debug, Clone, PartialEq)]
pub struct StreamRecord {
    pub path: PathBuf,
    pub flags: StreamFlags,
    /// `None` once the handle is invalid
    pub status: Option<StreamStatus>,
    pub volume: f32,
    pub pan: f32,
    pub calls: Vec<StreamCall>,
}

impl StreamRecord {
    /// Check whether `free` was called
    pub fn is_freed(&self) -> bool {
        self.calls.contains(&StreamCall::Free)
    }

    /// Number of times `call` was recorded
    pub fn count(&self, call: StreamCall) -> usize {
        self.calls.iter().filter(|c| **c == call).count()
    }

    /// Check that a stop was recorded before the free
    pub fn stopped_before_free(&self) -> bool {
        let stop = self.calls.iter().position(|c| *c == StreamCall::Stop);
        let free = self.calls.iter().position(|c| *c == StreamCall::Free);
        matches!((stop, free), (Some(s), Some(f)) if s < f)
    }
}

#[derive(Default)]
struct MemoryState {
    next_id: StreamId,
    streams: BTreeMap<StreamId, StreamRecord>,
    fail_next: Option<EngineError>,
}

/// Engine that keeps every stream in memory
///
/// Clones share state, so a host can keep one clone for inspection while
/// the audio system owns another.
#[derive(Clone, Default)]
pub struct MemoryEngine {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryEngine {
    /// Create an engine with no streams
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `create` call fail with `code`
    pub fn fail_next_create(&self, code: i32) {
        self.state.lock().fail_next = Some(EngineError::new(code, "simulated failure"));
    }

    /// Snapshot of one stream
    pub fn record(&self, id: StreamId) -> Option<StreamRecord> {
        self.state.lock().streams.get(&id).cloned()
    }

    /// Ids of every stream ever created, oldest first
    pub fn ids(&self) -> Vec<StreamId> {
        self.state.lock().streams.keys().copied().collect()
    }

    /// Ids of streams created from a file with the given name
    pub fn ids_for(&self, file_name: &str) -> Vec<StreamId> {
        self.state
            .lock()
            .streams
            .iter()
            .filter(|(_, r)| r.path.file_name().is_some_and(|n| n == file_name))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Most recently created stream
    pub fn last_id(&self) -> Option<StreamId> {
        self.state.lock().streams.keys().next_back().copied()
    }

    /// Number of streams created so far
    pub fn created_count(&self) -> usize {
        self.state.lock().streams.len()
    }

    /// Number of streams not yet freed
    pub fn live_count(&self) -> usize {
        self.state
            .lock()
            .streams
            .values()
            .filter(|r| !r.is_freed())
            .count()
    }

    /// Simulate the end of playback
    pub fn finish(&self, id: StreamId) {
        self.set_status(id, Some(StreamStatus::Stopped));
    }

    /// Simulate a buffer underrun
    pub fn stall(&self, id: StreamId) {
        self.set_status(id, Some(StreamStatus::Stalled));
    }

    /// Simulate a handle the engine invalidated on its own
    pub fn invalidate(&self, id: StreamId) {
        self.set_status(id, None);
    }

    fn set_status(&self, id: StreamId, status: Option<StreamStatus>) {
        if let Some(record) = self.state.lock().streams.get_mut(&id) {
            record.status = status;
        }
    }
}

impl StreamEngine for MemoryEngine {
    fn create(&self, path: &Path, flags: StreamFlags) -> Result<Box<dyn StreamHandle>, EngineError> {
        let mut state = self.state.lock();
        if let Some(err) = state.fail_next.take() {
            return Err(err);
        }

        state.next_id += 1;
        let id = state.next_id;
        state.streams.insert(
            id,
            StreamRecord {
                path: path.to_path_buf(),
                flags,
                status: Some(StreamStatus::Stopped),
                volume: 1.0,
                pan: 0.0,
                calls: Vec::new(),
            },
        );
        tracing::trace!("memory engine created stream {} for {}", id, path.display());

        Ok(Box::new(MemoryStream {
            id,
            state: Arc::clone(&self.state),
        }))
    }
}

/// Handle to a simulated stream
struct MemoryStream {
    id: StreamId,
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStream {
    fn with_record(&self, call: StreamCall, apply: impl FnOnce(&mut StreamRecord)) {
        let mut state = self.state.lock();
        if let Some(record) = state.streams.get_mut(&self.id) {
            record.calls.push(call);
            apply(record);
        }
    }
}

impl StreamHandle for MemoryStream {
    fn play(&self) {
        self.with_record(StreamCall::Play, |r| {
            if r.status.is_some() {
                r.status = Some(StreamStatus::Active);
            }
        });
    }

    fn pause(&self) {
        self.with_record(StreamCall::Pause, |r| {
            if matches!(r.status, Some(StreamStatus::Active | StreamStatus::Stalled)) {
                r.status = Some(StreamStatus::Paused);
            }
        });
    }

    fn stop(&self) {
        self.with_record(StreamCall::Stop, |r| {
            if r.status.is_some() {
                r.status = Some(StreamStatus::Stopped);
            }
        });
    }

    fn free(self: Box<Self>) {
        self.with_record(StreamCall::Free, |r| r.status = None);
    }

    fn set_attribute(&self, attribute: StreamAttribute, value: f32) {
        self.with_record(StreamCall::SetAttribute(attribute, value), |r| match attribute {
            StreamAttribute::Volume => r.volume = value,
            StreamAttribute::Pan => r.pan = value,
        });
    }

    fn status(&self) -> Option<StreamStatus> {
        self.state.lock().streams.get(&self.id).and_then(|r| r.status)
    }
}

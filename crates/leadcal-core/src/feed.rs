//! Live feed bookkeeping
//!
//! Tracks connection state and the last accepted update, and turns raw
//! transport frames into [`LiveUpdate`]s.

use crate::error::EngineResult;
use chrono::{DateTime, Utc};
use futures::channel::mpsc;
use leadcal_model::LiveUpdate;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Snapshot of the live feed state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedStatus {
    /// A feed is currently being consumed
    pub connected: bool,
    /// Last update id fed into the signature, 0 when none
    pub last_update_id: u64,
    pub last_update_at: Option<DateTime<Utc>>,
    /// An update arrived within the configured window
    pub has_recent_updates: bool,
}

/// Counters for one [`run_live_feed`](crate::engine::CalendarEngine::run_live_feed) call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedSummary {
    pub frames: u64,
    /// Frames that failed to decode
    pub rejected: u64,
    pub patched: u64,
    pub resyncs: u64,
}

#[derive(Debug, Default)]
pub(crate) struct FeedTracker {
    connected: AtomicBool,
    last: Mutex<Option<(u64, DateTime<Utc>)>>,
}

impl FeedTracker {
    pub(crate) fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Release);
    }

    /// Record an accepted update and return the id used for the signature
    ///
    /// Ids never go backwards: a missing or repeated id is replaced by the
    /// next one after the last recorded.
    pub(crate) fn record(&self, update_id: u64, at: DateTime<Utc>) -> u64 {
        let mut last = self.last.lock();
        let previous = last.map_or(0, |(id, _)| id);
        let id = if update_id > previous {
            update_id
        } else {
            previous + 1
        };
        *last = Some((id, at));
        id
    }

    pub(crate) fn last_update_id(&self) -> u64 {
        self.last.lock().map_or(0, |(id, _)| id)
    }

    pub(crate) fn status(&self, now: DateTime<Utc>, window: Duration) -> FeedStatus {
        let last = *self.last.lock();
        let recent = last.is_some_and(|(_, at)| {
            now.signed_duration_since(at)
                .to_std()
                .map_or(true, |age| age <= window)
        });
        FeedStatus {
            connected: self.connected.load(Ordering::Acquire),
            last_update_id: last.map_or(0, |(id, _)| id),
            last_update_at: last.map(|(_, at)| at),
            has_recent_updates: recent,
        }
    }
}

/// Decode one transport frame
///
/// # Errors
/// Returns [`EngineError::Frame`](crate::error::EngineError::Frame) when the
/// frame is not a valid live message
pub fn decode_frame(frame: &str) -> EngineResult<LiveUpdate> {
    Ok(LiveUpdate::from_json(frame)?)
}

/// Bounded frame channel between a transport task and the engine
#[must_use]
pub fn frame_channel(capacity: usize) -> (mpsc::Sender<String>, mpsc::Receiver<String>) {
    mpsc::channel(capacity.max(1))
}

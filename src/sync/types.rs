//! Sync controller type definitions
//!
//! This module defines the notifications sent to rendering surfaces and the listener
//! interface they subscribe through.

use crate::layout::Layout;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

/// Playback state of the controller
///
/// `Seeking` is transient: a seek enters it from any state and returns to that state
/// before `seek` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing,
    Paused,
    Seeking,
}

/// The note to highlight
///
/// # Fields
/// - `measure_index`: measure holding the note (0-indexed)
/// - `note_index`: index into the song's note sequence
/// - `progress_within_note`: `[0, 1)` while the note sounds, `1` at the end of the song
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    pub measure_index: usize,
    pub note_index: usize,
    pub progress_within_note: f64,
}

/// Notification sent to subscribers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum SyncEvent {
    /// A new layout (full measure list) to draw
    LayoutReady { layout: Arc<Layout> },
    StateChanged { state: PlaybackState },
    /// The highlighted note moved into another measure
    #[serde(rename_all = "camelCase")]
    MeasureChanged { measure_index: usize },
    Highlight(Highlight),
    /// Nothing is highlighted any more
    Cleared,
}

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);

/// Receiver of sync notifications
pub trait SyncListener {
    fn notify(&mut self, event: &SyncEvent);
}

impl<F> SyncListener for F
where
    F: FnMut(&SyncEvent),
{
    fn notify(&mut self, event: &SyncEvent) {
        self(event)
    }
}

/// Listener that records every event, for hosts that drain notifications once per frame.
///
/// Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<SyncEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SyncEvent> {
        self.events.borrow().clone()
    }

    /// Remove and return everything recorded so far.
    pub fn drain(&self) -> Vec<SyncEvent> {
        self.events.borrow_mut().drain(..).collect()
    }

    pub fn highlights(&self) -> Vec<Highlight> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                SyncEvent::Highlight(h) => Some(*h),
                _ => None,
            })
            .collect()
    }
}

impl SyncListener for EventLog {
    fn notify(&mut self, event: &SyncEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

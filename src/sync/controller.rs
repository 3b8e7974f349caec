//! Sync controller state machine
//!
//! Reacts to transport events and tells subscribers which note to highlight.

use super::types::{Highlight, PlaybackState, SubscriptionId, SyncEvent, SyncListener};
use crate::layout::Layout;
use crate::note::Tempo;
use crate::resolver::{resolve, Position};
use crate::transport::Transport;
use log::debug;
use std::fmt;
use std::sync::Arc;

/// Drives highlighting from transport events
///
/// # State Machine
/// ```text
/// Idle ──play──► Playing ◄──play── Paused
///   ▲               │                ▲
///   │               └─────pause──────┘
///   └──────reset (from any state)
///
/// seek: any state ──► Seeking ──► same state
/// ```
///
/// # Notification Rules
/// - `tick` notifies only when the highlighted note changes
/// - `seek` always notifies, even when the note is unchanged
/// - a change of measure is announced before the highlight
/// - moving back to pre-roll sends `Cleared`
/// - an empty layout never highlights anything and `play` leaves the controller `Idle`
pub struct SyncController {
    layout: Arc<Layout>,
    state: PlaybackState,
    last_index: Option<usize>,
    last_measure: Option<usize>,
    current: Position,
    listeners: Vec<(SubscriptionId, Box<dyn SyncListener>)>,
    next_id: u64,
}

impl fmt::Debug for SyncController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncController")
            .field("state", &self.state)
            .field("last_index", &self.last_index)
            .field("last_measure", &self.last_measure)
            .field("current", &self.current)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl SyncController {
    pub fn new(layout: impl Into<Arc<Layout>>) -> Self {
        Self {
            layout: layout.into(),
            state: PlaybackState::Idle,
            last_index: None,
            last_measure: None,
            current: Position::PreRoll,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    /// Register a listener. It immediately receives the current layout.
    pub fn subscribe(&mut self, listener: impl SyncListener + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;

        let mut listener: Box<dyn SyncListener> = Box::new(listener);
        listener.notify(&SyncEvent::LayoutReady {
            layout: Arc::clone(&self.layout),
        });
        self.listeners.push((id, listener));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(i, _)| *i != id);
        self.listeners.len() != before
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn layout(&self) -> &Arc<Layout> {
        &self.layout
    }

    /// Latest resolved position, including progress updates that were not notified
    pub fn current(&self) -> Position {
        self.current
    }

    /// The note last announced to subscribers
    pub fn last_index(&self) -> Option<usize> {
        self.last_index
    }

    /// Whether the host should keep delivering ticks
    pub fn wants_ticks(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Replace the song layout. Playback goes back to `Idle`.
    pub fn load(&mut self, layout: impl Into<Arc<Layout>>) {
        self.reset();
        self.layout = layout.into();
        self.emit(SyncEvent::LayoutReady {
            layout: Arc::clone(&self.layout),
        });
    }

    /// Rebuild the timeline for a new tempo. Measures and playback state are kept. A
    /// shown highlight is cleared; the next tick or seek notifies again.
    pub fn set_tempo(&mut self, tempo: Tempo) {
        self.layout = Arc::new(self.layout.with_tempo(tempo));
        self.last_measure = None;
        self.current = Position::PreRoll;
        if self.last_index.take().is_some() {
            self.emit(SyncEvent::Cleared);
        }
        self.emit(SyncEvent::LayoutReady {
            layout: Arc::clone(&self.layout),
        });
    }

    pub fn play(&mut self) {
        if self.layout.timeline().is_empty() {
            debug!("play ignored: nothing to play");
            return;
        }
        match self.state {
            PlaybackState::Idle | PlaybackState::Paused => self.set_state(PlaybackState::Playing),
            PlaybackState::Playing | PlaybackState::Seeking => {}
        }
    }

    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.set_state(PlaybackState::Paused);
        }
    }

    /// Jump to `seconds` and notify immediately, whatever the previous highlight was.
    pub fn seek(&mut self, seconds: f64) {
        let position = match resolve(self.layout.timeline(), seconds) {
            Ok(position) => position,
            Err(_) => return,
        };

        let resume = self.state;
        self.set_state(PlaybackState::Seeking);
        self.current = position;
        self.announce(position);
        self.set_state(resume);
    }

    /// Advance to the transport time `seconds`. Ignored unless playing.
    pub fn tick(&mut self, seconds: f64) {
        if self.state != PlaybackState::Playing {
            return;
        }
        let Ok(position) = resolve(self.layout.timeline(), seconds) else {
            return;
        };

        self.current = position;
        if position.index() != self.last_index {
            self.announce(position);
        }
    }

    /// Tick with the transport's clock.
    pub fn poll<T: Transport + ?Sized>(&mut self, transport: &T) {
        self.tick(transport.current_seconds());
    }

    /// Back to `Idle` with nothing highlighted.
    pub fn reset(&mut self) {
        self.set_state(PlaybackState::Idle);
        self.current = Position::PreRoll;
        self.last_measure = None;
        if self.last_index.take().is_some() {
            self.emit(SyncEvent::Cleared);
        }
    }

    fn announce(&mut self, position: Position) {
        match position {
            Position::PreRoll => {
                self.last_index = None;
                self.last_measure = None;
                self.emit(SyncEvent::Cleared);
            }
            Position::Note {
                index,
                measure_index,
                progress,
            } => {
                if self.last_measure != Some(measure_index) {
                    self.last_measure = Some(measure_index);
                    self.emit(SyncEvent::MeasureChanged { measure_index });
                }
                self.last_index = Some(index);
                self.emit(SyncEvent::Highlight(Highlight {
                    measure_index,
                    note_index: index,
                    progress_within_note: progress,
                }));
            }
        }
    }

    fn set_state(&mut self, state: PlaybackState) {
        if self.state == state {
            return;
        }
        debug!("playback {:?} -> {:?}", self.state, state);
        self.state = state;
        self.emit(SyncEvent::StateChanged { state });
    }

    fn emit(&mut self, event: SyncEvent) {
        for (_, listener) in &mut self.listeners {
            listener.notify(&event);
        }
    }
}

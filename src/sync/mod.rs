//! # Sync Module
//!
//! Keep the rendered notation in step with audio playback.
//!
//! ## Purpose
//! The host owns the audio transport and the rendering surface. This module sits between
//! them:
//! 1. **Transport events** - `play`, `pause`, `seek`, `reset` and a `tick` per animation
//!    frame carrying the transport time
//! 2. **Resolution** - each event is resolved against the cached timeline
//! 3. **Notifications** - subscribers hear about layouts, state changes, measure changes
//!    and the highlighted note
//!
//! ## Sub-modules
//! - `types` - PlaybackState, Highlight, SyncEvent, SyncListener, EventLog
//! - `controller` - the SyncController state machine
//!
//! ## Example
//! ```rust
//! use jianpu::sync::{EventLog, SyncController, SyncEvent};
//! use jianpu::{Layout, Song};
//!
//! let song = Song::from_yaml(r#"
//! tempo: 60
//! notes:
//!   - { pitch: "1", duration: 1 }
//!   - { pitch: "2", duration: 1 }
//! "#).unwrap();
//!
//! let log = EventLog::new();
//! let mut controller = SyncController::new(Layout::from_song(&song));
//! controller.subscribe(log.clone());
//!
//! controller.play();
//! controller.tick(0.2);
//! controller.tick(0.7); // same note, no notification
//! controller.tick(1.1);
//!
//! let highlighted: Vec<usize> = log.highlights().iter().map(|h| h.note_index).collect();
//! assert_eq!(highlighted, vec![0, 1]);
//! ```
//!
//! ## Threading
//! Everything runs on the host's event loop. The layout is shared read-only through an
//! `Arc`; the controller's last-index is its only mutable state.

mod controller;
mod types;

#[cfg(test)]
mod tests;

pub use controller::SyncController;
pub use types::{EventLog, Highlight, PlaybackState, SubscriptionId, SyncEvent, SyncListener};

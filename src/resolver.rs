//! # Playback Position Resolver
//!
//! Maps a transport time to the note that should be highlighted.
//!
//! ## Resolution Rules
//! - Empty timeline: [`JianpuError::EmptyTimeline`] (nothing can ever be highlighted)
//! - Before the first note (or a NaN time): [`Position::PreRoll`], index -1
//! - Inside `[start, end)` of a note: that note, `progress` in `[0, 1)`
//! - At or after the end of the last note: the last note with `progress == 1`
//!
//! The lookup is a binary search over the timeline, so a tick costs O(log n) no matter how
//! long the song is. The resolver keeps no state; the same time against the same timeline
//! always yields the same position.
//!
//! ## Example
//! ```rust
//! use jianpu::{resolve, Layout, Note, Pitch, Position, Tempo, TimeSignature};
//!
//! let five = Pitch::parse("5").unwrap();
//! let notes = vec![Note::new(five, 1.0).unwrap(), Note::new(five, 1.0).unwrap()];
//! let layout = Layout::new(notes, TimeSignature::default(), Tempo::new(60.0).unwrap());
//!
//! let position = resolve(layout.timeline(), 1.25).unwrap();
//! assert_eq!(position.index(), Some(1));
//! assert_eq!(position.progress(), 0.25);
//! assert_eq!(resolve(layout.timeline(), -1.0).unwrap(), Position::PreRoll);
//! ```

use crate::error::JianpuError;
use crate::timeline::Timeline;
use serde::Serialize;

/// Largest progress reported for a note that is still sounding
const MAX_SOUNDING_PROGRESS: f64 = 1.0 - f64::EPSILON;

/// Where playback is relative to the notes
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Position {
    /// Before the first note; nothing is highlighted
    PreRoll,
    /// Inside (or past the end of) a note
    #[serde(rename_all = "camelCase")]
    Note {
        index: usize,
        measure_index: usize,
        progress: f64,
    },
}

impl Position {
    pub fn index(&self) -> Option<usize> {
        match self {
            Position::PreRoll => None,
            Position::Note { index, .. } => Some(*index),
        }
    }

    /// Note index with pre-roll as -1
    pub fn signed_index(&self) -> isize {
        self.index().map_or(-1, |i| i as isize)
    }

    pub fn measure_index(&self) -> Option<usize> {
        match self {
            Position::PreRoll => None,
            Position::Note { measure_index, .. } => Some(*measure_index),
        }
    }

    /// Progress through the current note, 0 in pre-roll
    pub fn progress(&self) -> f64 {
        match self {
            Position::PreRoll => 0.0,
            Position::Note { progress, .. } => *progress,
        }
    }

    /// Playback has reached the end of the last note
    pub fn is_finished(&self) -> bool {
        matches!(self, Position::Note { progress, .. } if *progress >= 1.0)
    }
}

/// Resolve `seconds` against `timeline`.
pub fn resolve(timeline: &Timeline, seconds: f64) -> Result<Position, JianpuError> {
    let entries = timeline.entries();
    let (first, last) = match (entries.first(), entries.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(JianpuError::EmptyTimeline),
    };

    if seconds.is_nan() || seconds < first.start_seconds {
        return Ok(Position::PreRoll);
    }

    if seconds >= last.end_seconds {
        return Ok(Position::Note {
            index: last.note_index,
            measure_index: last.measure_index,
            progress: 1.0,
        });
    }

    // Entries starting at or before `seconds`; at least one, the first
    let idx = entries.partition_point(|e| e.start_seconds <= seconds) - 1;
    let entry = &entries[idx];
    let progress = ((seconds - entry.start_seconds) / entry.duration_seconds())
        .clamp(0.0, MAX_SOUNDING_PROGRESS);

    Ok(Position::Note {
        index: entry.note_index,
        measure_index: entry.measure_index,
        progress,
    })
}

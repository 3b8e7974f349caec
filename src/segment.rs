//! # Measure Segmentation
//!
//! Groups a flat note sequence into measures under a fixed time signature.
//!
//! ## Rules
//!
//! ### Filling
//! - Notes accumulate into the current measure while the running total stays within
//!   `beats_per_measure`
//! - A measure is closed as soon as it is exactly full
//! - Output order matches input order, every note lands in exactly one measure
//!
//! ### Overflow (fail-soft)
//! - A note that does not fit closes the current measure at its current total and opens
//!   the next one. Notes are never split across a bar line
//! - A note longer than a whole measure gets a measure of its own that exceeds capacity.
//!   It is reported as [`JianpuError::OversizedMeasure`] but not rejected
//!
//! ### Ties
//! Ties play no part in segmentation; a tie may cross a bar line.
//!
//! ## Example
//! ```rust
//! use jianpu::{segment, Note, Pitch, TimeSignature};
//!
//! let five = Pitch::parse("5").unwrap();
//! let notes = vec![
//!     Note::new(five, 2.0).unwrap(),
//!     Note::new(five, 2.0).unwrap(),
//!     Note::new(five, 1.0).unwrap(),
//! ];
//! let measures = segment(&notes, &TimeSignature::default());
//!
//! assert_eq!(measures.len(), 2);
//! assert_eq!(measures[0].notes, 0..2);
//! assert_eq!(measures[1].notes, 2..3);
//! ```

use crate::error::JianpuError;
use crate::note::{Note, TimeSignature, BEAT_EPSILON};
use log::{debug, warn};
use serde::Serialize;
use std::ops::Range;

/// A measure: a contiguous run of notes of the song
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Measure {
    /// Position of this measure in the song (0-indexed)
    pub index: usize,
    /// Indices into the song's note sequence
    pub notes: Range<usize>,
    /// Beat offset of the first note from the start of the song
    pub start_beat: f64,
    /// Sum of the contained notes' durations
    pub total_beats: f64,
    pub capacity_beats: f64,
}

impl Measure {
    /// The notes of this measure, borrowed from the song's note sequence.
    pub fn notes_in<'a>(&self, notes: &'a [Note]) -> &'a [Note] {
        &notes[self.notes.clone()]
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn contains_note(&self, note_index: usize) -> bool {
        self.notes.contains(&note_index)
    }

    pub fn is_full(&self) -> bool {
        (self.total_beats - self.capacity_beats).abs() <= BEAT_EPSILON
    }

    pub fn is_oversized(&self) -> bool {
        self.total_beats > self.capacity_beats + BEAT_EPSILON
    }

    pub fn end_beat(&self) -> f64 {
        self.start_beat + self.total_beats
    }
}

/// Split `notes` into measures of `time_signature.beats_per_measure()` beats.
pub fn segment(notes: &[Note], time_signature: &TimeSignature) -> Vec<Measure> {
    let capacity = time_signature.capacity_beats();
    let mut measures = Vec::new();
    let mut first = 0;
    let mut total = 0.0;
    let mut start_beat = 0.0;
    // Summed note by note, the same way the timeline walks the song
    let mut cursor = 0.0;

    for (i, note) in notes.iter().enumerate() {
        let duration = note.duration_beats();

        // Doesn't fit: close the partial measure, the note opens the next one
        if i > first && total + duration > capacity + BEAT_EPSILON {
            debug!(
                "measure {} closed at {} of {} beats",
                measures.len() + 1,
                total,
                capacity
            );
            measures.push(close_measure(measures.len(), first..i, start_beat, total, capacity));
            start_beat = cursor;
            first = i;
            total = 0.0;
        }

        total += duration;
        cursor += duration;

        if total >= capacity - BEAT_EPSILON {
            measures.push(close_measure(measures.len(), first..i + 1, start_beat, total, capacity));
            start_beat = cursor;
            first = i + 1;
            total = 0.0;
        }
    }

    if first < notes.len() {
        measures.push(close_measure(measures.len(), first..notes.len(), start_beat, total, capacity));
    }

    measures
}

fn close_measure(
    index: usize,
    notes: Range<usize>,
    start_beat: f64,
    total_beats: f64,
    capacity_beats: f64,
) -> Measure {
    let measure = Measure {
        index,
        notes,
        start_beat,
        total_beats,
        capacity_beats,
    };
    if measure.is_oversized() {
        warn!(
            "measure {} holds a single {}-beat note, longer than the {}-beat measure",
            index + 1,
            total_beats,
            capacity_beats
        );
    }
    measure
}

/// Collect the warnings for a segmented song (oversized measures).
///
/// Measure numbers in the warnings are 1-indexed, as printed on a score.
pub fn measure_warnings(measures: &[Measure], time_signature: &TimeSignature) -> Vec<JianpuError> {
    measures
        .iter()
        .filter(|m| m.is_oversized())
        .map(|m| JianpuError::OversizedMeasure {
            measure: m.index + 1,
            beats: m.total_beats,
            capacity: time_signature.beats_per_measure(),
        })
        .collect()
}

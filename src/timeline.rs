//! # Timeline Builder
//!
//! Assigns every note an absolute start and end time in seconds.
//!
//! ## Timing
//! - One beat lasts `60 / bpm` seconds
//! - A beat cursor walks the measures in order; each note starts at
//!   `cursor * seconds_per_beat` and ends at `(cursor + duration) * seconds_per_beat`
//! - Entries are therefore sorted and never overlap: `entry[i].end == entry[i + 1].start`
//!
//! The timeline is a pure function of (notes, measures, tempo). A tempo change rebuilds the
//! timeline; the measures stay as they are.
//!
//! ## Ties
//! Tied notes keep one timeline entry each, so highlighting moves from the first note to
//! the second. For audio, [`Timeline::audio_events`] merges a run of tied notes of the
//! same pitch into one trigger, so only the first note of the run sounds.

use crate::note::{Key, Note, Tempo};
use crate::segment::Measure;
use serde::Serialize;
use std::ops::Range;

/// A note's resolved position on the clock
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub note_index: usize,
    pub measure_index: usize,
    pub start_beat: f64,
    pub duration_beats: f64,
    pub start_seconds: f64,
    pub end_seconds: f64,
}

impl TimelineEntry {
    pub fn duration_seconds(&self) -> f64 {
        self.end_seconds - self.start_seconds
    }

    /// Half-open interval test: `[start, end)`
    pub fn contains(&self, seconds: f64) -> bool {
        self.start_seconds <= seconds && seconds < self.end_seconds
    }
}

/// A sounding note for the audio transport
///
/// # Fields
/// - `midi_note`: pitch in the song's key
/// - `start_seconds`/`duration_seconds`: the whole tied run
/// - `note_indices`: the notes merged into this trigger (one, or a tied run)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioEvent {
    pub midi_note: u8,
    pub start_seconds: f64,
    pub duration_seconds: f64,
    pub note_indices: Range<usize>,
}

/// Ordered timeline entries, 1:1 with the song's notes
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
    seconds_per_beat: f64,
}

impl Timeline {
    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&TimelineEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn seconds_per_beat(&self) -> f64 {
        self.seconds_per_beat
    }

    /// End of the last note, 0 for an empty timeline
    pub fn total_seconds(&self) -> f64 {
        self.entries.last().map_or(0.0, |e| e.end_seconds)
    }

    /// Audio triggers with tied runs merged.
    ///
    /// A run continues while a note is tied to the next one and the next one has the same
    /// pitch. A tie into a different pitch is played as two triggers. Rests produce nothing.
    pub fn audio_events(&self, notes: &[Note], key: Key) -> Vec<AudioEvent> {
        let mut events: Vec<AudioEvent> = Vec::new();
        let mut pending_tie: Option<usize> = None; // index into events

        for entry in &self.entries {
            let note = &notes[entry.note_index];
            let Some(midi_note) = note.pitch().midi_note(key) else {
                pending_tie = None;
                continue;
            };

            let continued = match pending_tie {
                Some(event_idx) if events[event_idx].midi_note == midi_note => {
                    let event = &mut events[event_idx];
                    event.duration_seconds = entry.end_seconds - event.start_seconds;
                    event.note_indices.end = entry.note_index + 1;
                    Some(event_idx)
                }
                _ => None,
            };

            let event_idx = continued.unwrap_or_else(|| {
                events.push(AudioEvent {
                    midi_note,
                    start_seconds: entry.start_seconds,
                    duration_seconds: entry.duration_seconds(),
                    note_indices: entry.note_index..entry.note_index + 1,
                });
                events.len() - 1
            });

            pending_tie = note.tied_to_next().then_some(event_idx);
        }

        events
    }
}

/// Build the timeline for segmented measures at a tempo.
///
/// `measures` must come from segmenting `notes`.
pub fn build(measures: &[Measure], notes: &[Note], tempo: Tempo) -> Timeline {
    let seconds_per_beat = tempo.seconds_per_beat();
    let mut entries = Vec::with_capacity(notes.len());
    let mut cursor = 0.0;

    for measure in measures {
        for note_index in measure.notes.clone() {
            let duration = notes[note_index].duration_beats();
            let end = cursor + duration;
            entries.push(TimelineEntry {
                note_index,
                measure_index: measure.index,
                start_beat: cursor,
                duration_beats: duration,
                start_seconds: cursor * seconds_per_beat,
                end_seconds: end * seconds_per_beat,
            });
            cursor = end;
        }
    }

    Timeline {
        entries,
        seconds_per_beat,
    }
}

//! # Layout
//!
//! The derived data of one song, built and replaced as a unit.
//!
//! ```text
//! notes + time signature ──segment──► measures ──build(tempo)──► timeline
//! ```
//!
//! A `Layout` never changes after construction. Any change to the song, time signature or
//! tempo produces a new `Layout`; [`Layout::with_tempo`] reuses the measures because
//! segmentation does not depend on tempo.

use crate::error::JianpuError;
use crate::note::{Note, Tempo, TimeSignature};
use crate::segment::{measure_warnings, segment, Measure};
use crate::song::Song;
use crate::timeline::{build, Timeline};
use log::debug;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    notes: Vec<Note>,
    time_signature: TimeSignature,
    tempo: Tempo,
    measures: Vec<Measure>,
    timeline: Timeline,
    #[serde(skip)]
    warnings: Vec<JianpuError>,
}

impl Layout {
    pub fn new(notes: Vec<Note>, time_signature: TimeSignature, tempo: Tempo) -> Self {
        let measures = segment(&notes, &time_signature);
        let warnings = measure_warnings(&measures, &time_signature);
        let timeline = build(&measures, &notes, tempo);
        debug!(
            "laid out {} notes in {} measures ({} s at {} BPM)",
            notes.len(),
            measures.len(),
            timeline.total_seconds(),
            tempo.bpm()
        );

        Self {
            notes,
            time_signature,
            tempo,
            measures,
            timeline,
            warnings,
        }
    }

    pub fn from_song(song: &Song) -> Self {
        Self::new(song.notes().to_vec(), song.time_signature(), song.tempo())
    }

    /// Same notes and measures, timeline rebuilt for `tempo`.
    pub fn with_tempo(&self, tempo: Tempo) -> Self {
        Self {
            notes: self.notes.clone(),
            time_signature: self.time_signature,
            tempo,
            measures: self.measures.clone(),
            timeline: build(&self.measures, &self.notes, tempo),
            warnings: self.warnings.clone(),
        }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn time_signature(&self) -> TimeSignature {
        self.time_signature
    }

    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    pub fn measures(&self) -> &[Measure] {
        &self.measures
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Oversized measure warnings collected during segmentation
    pub fn warnings(&self) -> &[JianpuError] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// The notes of measure `measure_index`
    pub fn measure_notes(&self, measure_index: usize) -> Option<&[Note]> {
        self.measures
            .get(measure_index)
            .map(|m| m.notes_in(&self.notes))
    }

    /// Index of the measure holding note `note_index`
    pub fn measure_of(&self, note_index: usize) -> Option<usize> {
        self.timeline.get(note_index).map(|e| e.measure_index)
    }
}

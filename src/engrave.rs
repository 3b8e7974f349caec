//! # Jianpu Engraving
//!
//! Marks drawn around each number and the beams that join sub-beat notes.
//!
//! ## Duration Marks
//! | beats | marks                    | text      |
//! |-------|--------------------------|-----------|
//! | 4     | three extension dashes   | `5 - - -` |
//! | 2     | one extension dash       | `5 -`     |
//! | 1.75  | two augmentation dots    | `5··`     |
//! | 1.5   | augmentation dot         | `5·`      |
//! | 1     | none                     | `5`       |
//! | 0.875 | one underline + two dots | `5··_`    |
//! | 0.75  | one underline + dot      | `5·_`     |
//! | 0.5   | one underline            | `5_`      |
//! | 0.25  | two underlines           | `5__`     |
//!
//! Rests are lengthened with more rests instead of dashes (`0 0` is a two-beat rest).
//! Durations that fit none of these shapes get the nearest underline or dash count.
//!
//! ## Octave Marks
//! Dots above the number for higher octaves, below for lower ones. The text rendering
//! keeps the input notation (`1^`, `6.`).
//!
//! ## Beams
//! Consecutive sub-beat notes that lie inside the same beat share their underline
//! (`6_ 5_` inside one beat is drawn as one joined pair). A lone eighth next to a dotted
//! quarter is not joined to anything.

use crate::layout::Layout;
use crate::note::{Note, BEAT_EPSILON};
use serde::Serialize;
use std::ops::Range;

/// Deepest subdivision drawn (64th notes)
const MAX_UNDERLINES: u8 = 4;

/// Marks for one note
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Glyph {
    pub degree: u8,
    pub octave_dots_above: u8,
    pub octave_dots_below: u8,
    pub underlines: u8,
    pub dashes: u8,
    pub augmentation_dots: u8,
}

impl Glyph {
    pub fn for_note(note: &Note) -> Self {
        let pitch = note.pitch();
        let (underlines, dashes, augmentation_dots) = duration_marks(note.duration_beats());
        Self {
            degree: pitch.degree(),
            octave_dots_above: pitch.octave().max(0) as u8,
            octave_dots_below: pitch.octave().min(0).unsigned_abs(),
            underlines,
            dashes,
            augmentation_dots,
        }
    }

    pub fn is_rest(&self) -> bool {
        self.degree == 0
    }

    /// Plain-text form, e.g. `5·`, `6._`, `1^ - - -`, `0 0`.
    pub fn to_text(&self) -> String {
        let mut text = self.degree.to_string();
        text.push_str(&"^".repeat(self.octave_dots_above as usize));
        text.push_str(&".".repeat(self.octave_dots_below as usize));
        text.push_str(&"·".repeat(self.augmentation_dots as usize));
        text.push_str(&"_".repeat(self.underlines as usize));
        let extension = if self.is_rest() { " 0" } else { " -" };
        text.push_str(&extension.repeat(self.dashes as usize));
        text
    }
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() <= BEAT_EPSILON
}

/// (underlines, dashes, augmentation dots) for a duration in beats
fn duration_marks(beats: f64) -> (u8, u8, u8) {
    if beats >= 1.0 - BEAT_EPSILON {
        let whole = (beats + BEAT_EPSILON).floor();
        let dashes = (whole as u32).saturating_sub(1).min(u8::MAX as u32) as u8;
        let remainder = beats - whole;
        let dots = if approx(remainder, 0.75) {
            2
        } else if approx(remainder, 0.5) {
            1
        } else {
            0
        };
        return (0, dashes, dots);
    }

    let mut value = 0.5;
    for underlines in 1..=MAX_UNDERLINES {
        if approx(beats, value) {
            return (underlines, 0, 0);
        }
        if approx(beats, value * 1.5) {
            return (underlines, 0, 1);
        }
        if approx(beats, value * 1.75) {
            return (underlines, 0, 2);
        }
        value /= 2.0;
    }

    let nearest = (-beats.log2()).ceil().clamp(1.0, MAX_UNDERLINES as f64);
    (nearest as u8, 0, 0)
}

/// Beam groups of a measure as global note index ranges, each at least two notes long.
pub fn beam_groups(layout: &Layout, measure_index: usize) -> Vec<Range<usize>> {
    let Some(measure) = layout.measures().get(measure_index) else {
        return Vec::new();
    };

    let mut groups = Vec::new();
    let mut current: Option<(Range<usize>, f64)> = None; // (notes, beat)
    let mut offset = 0.0;

    for note_index in measure.notes.clone() {
        let duration = layout.notes()[note_index].duration_beats();
        let beat = (offset + BEAT_EPSILON).floor();
        let sub_beat = duration < 1.0 - BEAT_EPSILON && offset + duration <= beat + 1.0 + BEAT_EPSILON;

        current = match current.take() {
            Some((range, current_beat)) if sub_beat && current_beat == beat => {
                Some((range.start..note_index + 1, current_beat))
            }
            previous => {
                if let Some((range, _)) = previous {
                    if range.len() >= 2 {
                        groups.push(range);
                    }
                }
                sub_beat.then_some((note_index..note_index + 1, beat))
            }
        };

        offset += duration;
    }

    if let Some((range, _)) = current {
        if range.len() >= 2 {
            groups.push(range);
        }
    }

    groups
}

/// Render a laid-out song as text, `measures_per_line` bars per line.
///
/// ```text
/// | 5 6_ 5_ 3 0 | 1 - 0 0 |
/// | 5· 6_ 5 3 | 1 - - - ||
/// ```
pub fn render_text(layout: &Layout, measures_per_line: usize) -> String {
    let measures_per_line = measures_per_line.max(1);
    let count = layout.measures().len();
    let mut out = String::new();

    for (i, measure) in layout.measures().iter().enumerate() {
        if i % measures_per_line == 0 {
            if i > 0 {
                out.push('\n');
            }
            out.push('|');
        }
        let glyphs: Vec<String> = measure
            .notes_in(layout.notes())
            .iter()
            .map(|n| Glyph::for_note(n).to_text())
            .collect();
        out.push(' ');
        out.push_str(&glyphs.join(" "));
        out.push_str(if i + 1 == count { " ||" } else { " |" });
    }

    out
}

/// Lyrics of a measure, rests and unset lyrics skipped
pub fn measure_lyrics(layout: &Layout, measure_index: usize) -> Vec<&str> {
    layout
        .measure_notes(measure_index)
        .map(|notes| notes.iter().filter_map(|n| n.lyric()).collect())
        .unwrap_or_default()
}

//! # Note Model
//!
//! Value types for one song: notes, pitches, time signature, tempo and key.
//!
//! ## Type Hierarchy
//! ```text
//! Note
//!   ├── pitch: Pitch
//!   │     ├── degree: 0-7 (0 = rest, 1-7 = scale degree)
//!   │     └── octave: i8 (`^` = +1, `.` = -1, markers stack)
//!   ├── duration_beats: f64 (beat = time signature beat unit)
//!   ├── lyric: Option<String>
//!   └── tied_to_next: bool
//!
//! TimeSignature { beats_per_measure, beat_unit }
//! Tempo { bpm }
//! Key { tonic semitones above C }
//! ```
//!
//! ### Pitch Notation
//! - `5` - degree 5 in the middle octave
//! - `6.` - degree 6 one octave lower (`6..` two octaves lower)
//! - `1^` - degree 1 one octave higher (`1^^` two octaves higher)
//! - `0` - rest, never carries octave markers
//!
//! ### Duration Convention
//! Durations count beats of the time signature's beat unit. In x/4 time a quarter note
//! is 1.0, an eighth 0.5, a dotted quarter 1.5. Tempo counts the same beats per minute,
//! so one beat lasts `60 / bpm` seconds.
//!
//! ### Invariants
//! - `duration_beats > 0` and finite
//! - a rest never carries a lyric
//!
//! Both are checked by the constructors, so every `Note` in circulation is valid.

use crate::error::JianpuError;
use serde::{Serialize, Serializer};
use std::fmt;

/// Tolerance for comparing accumulated beat sums
pub const BEAT_EPSILON: f64 = 1e-9;

/// Semitone offsets of the major scale degrees 1-7
const MAJOR_SCALE: [i16; 7] = [0, 2, 4, 5, 7, 9, 11];

/// Jianpu pitch: a scale degree plus an octave offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Pitch {
    degree: u8,
    octave: i8,
}

impl Pitch {
    pub const REST: Pitch = Pitch { degree: 0, octave: 0 };

    /// Create a pitch from a degree (1-7) and an octave offset.
    pub fn new(degree: u8, octave: i8) -> Option<Self> {
        if (1..=7).contains(&degree) {
            Some(Self { degree, octave })
        } else {
            None
        }
    }

    /// Parse a pitch string like "5", "6.", "1^", "3^^" or "0".
    ///
    /// Returns `None` for unknown characters, a rest with octave markers, or a pitch mixing
    /// `.` and `^`.
    pub fn parse(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();

        let degree = chars.next()?.to_digit(10)?;
        if degree > 7 {
            return None;
        }

        let mut up = 0i8;
        let mut down = 0i8;
        for c in chars {
            match c {
                '^' => up = up.checked_add(1)?,
                '.' => down = down.checked_add(1)?,
                _ => return None,
            }
        }

        if up > 0 && down > 0 {
            return None;
        }
        if degree == 0 {
            return if up == 0 && down == 0 { Some(Self::REST) } else { None };
        }

        Some(Self {
            degree: degree as u8,
            octave: up - down,
        })
    }

    pub fn degree(&self) -> u8 {
        self.degree
    }

    pub fn octave(&self) -> i8 {
        self.octave
    }

    pub fn is_rest(&self) -> bool {
        self.degree == 0
    }

    /// MIDI note number with degree 1 of the middle octave at the key's tonic above C4 (60).
    /// Rests have no MIDI note.
    pub fn midi_note(&self, key: Key) -> Option<u8> {
        if self.is_rest() {
            return None;
        }
        let scale = MAJOR_SCALE[(self.degree - 1) as usize];
        let total = 60 + key.semitones() as i16 + scale + self.octave as i16 * 12;
        Some(total.clamp(0, 127) as u8)
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.degree)?;
        let marker = if self.octave > 0 { '^' } else { '.' };
        for _ in 0..self.octave.unsigned_abs() {
            write!(f, "{}", marker)?;
        }
        Ok(())
    }
}

impl Serialize for Pitch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A single note or rest
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pitch: Pitch,
    duration_beats: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    lyric: Option<String>,
    tied_to_next: bool,
}

impl Note {
    /// Create a note, rejecting non-positive or non-finite durations.
    pub fn new(pitch: Pitch, duration_beats: f64) -> Result<Self, JianpuError> {
        if !duration_beats.is_finite() || duration_beats <= 0.0 {
            return Err(JianpuError::InvalidDuration {
                index: 0,
                duration: duration_beats,
            });
        }
        Ok(Self {
            pitch,
            duration_beats,
            lyric: None,
            tied_to_next: false,
        })
    }

    pub fn rest(duration_beats: f64) -> Result<Self, JianpuError> {
        Self::new(Pitch::REST, duration_beats)
    }

    /// Attach a lyric. Rests reject lyrics.
    pub fn with_lyric(mut self, lyric: impl Into<String>) -> Result<Self, JianpuError> {
        if self.pitch.is_rest() {
            return Err(JianpuError::RestWithLyric { index: 0 });
        }
        self.lyric = Some(lyric.into());
        Ok(self)
    }

    /// Mark this note as tied to the following one.
    pub fn tied(mut self) -> Self {
        self.tied_to_next = true;
        self
    }

    pub fn pitch(&self) -> Pitch {
        self.pitch
    }

    pub fn duration_beats(&self) -> f64 {
        self.duration_beats
    }

    pub fn lyric(&self) -> Option<&str> {
        self.lyric.as_deref()
    }

    pub fn tied_to_next(&self) -> bool {
        self.tied_to_next
    }

    pub fn is_rest(&self) -> bool {
        self.pitch.is_rest()
    }
}

/// Time signature (e.g., 4/4, 3/4, 6/8), fixed for a whole song
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSignature {
    beats_per_measure: u8,
    beat_unit: u8,
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self {
            beats_per_measure: 4,
            beat_unit: 4,
        }
    }
}

impl TimeSignature {
    /// Beats must be positive and the beat unit a power of two up to 64.
    pub fn new(beats_per_measure: u8, beat_unit: u8) -> Result<Self, JianpuError> {
        if beats_per_measure == 0 || !beat_unit.is_power_of_two() || beat_unit > 64 {
            return Err(JianpuError::InvalidTimeSignature(format!(
                "{}/{}",
                beats_per_measure, beat_unit
            )));
        }
        Ok(Self {
            beats_per_measure,
            beat_unit,
        })
    }

    /// Parse a time signature string like "3/4".
    pub fn parse(s: &str) -> Result<Self, JianpuError> {
        let invalid = || JianpuError::InvalidTimeSignature(s.to_string());
        let (beats, unit) = s.trim().split_once('/').ok_or_else(invalid)?;
        let beats = beats.trim().parse().map_err(|_| invalid())?;
        let unit = unit.trim().parse().map_err(|_| invalid())?;
        Self::new(beats, unit)
    }

    pub fn beats_per_measure(&self) -> u8 {
        self.beats_per_measure
    }

    pub fn beat_unit(&self) -> u8 {
        self.beat_unit
    }

    /// Measure capacity in beats
    pub fn capacity_beats(&self) -> f64 {
        self.beats_per_measure as f64
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.beats_per_measure, self.beat_unit)
    }
}

/// Tempo in beats (of the time signature's beat unit) per minute
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tempo {
    bpm: f64,
}

impl Default for Tempo {
    fn default() -> Self {
        Self { bpm: 120.0 }
    }
}

impl Tempo {
    pub fn new(bpm: f64) -> Result<Self, JianpuError> {
        if !bpm.is_finite() || bpm <= 0.0 {
            return Err(JianpuError::InvalidTempo(bpm));
        }
        Ok(Self { bpm })
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    pub fn seconds_per_beat(&self) -> f64 {
        60.0 / self.bpm
    }

    /// Quarter-note BPM, for transports that schedule in quarter notes.
    /// In 6/8 at 120 eighth-note BPM the quarter-note BPM is 60.
    pub fn quarter_note_bpm(&self, time_signature: &TimeSignature) -> f64 {
        self.bpm * 4.0 / time_signature.beat_unit() as f64
    }
}

/// Major key that jianpu degree 1 refers to ("1=D")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Key {
    semitones: u8,
}

impl Key {
    /// Parse a key like "C", "D", "Bb", "F#", "1=Eb" or "D调".
    pub fn parse(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        let trimmed = trimmed.strip_prefix("1=").unwrap_or(trimmed);
        let trimmed = trimmed.strip_suffix('调').unwrap_or(trimmed).trim();

        let mut chars = trimmed.chars();
        let natural: i8 = match chars.next()?.to_ascii_uppercase() {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            'B' => 11,
            _ => return None,
        };
        let accidental: i8 = match chars.as_str() {
            "" => 0,
            "#" | "s" => 1,
            "b" | "f" => -1,
            _ => return None,
        };

        Some(Self {
            semitones: (natural + accidental).rem_euclid(12) as u8,
        })
    }

    /// Tonic in semitones above C (0-11)
    pub fn semitones(&self) -> u8 {
        self.semitones
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_pitch() {
        let pitch = Pitch::parse("5").unwrap();
        assert_eq!(pitch.degree(), 5);
        assert_eq!(pitch.octave(), 0);
        assert!(!pitch.is_rest());
    }

    #[test]
    fn test_parse_octave_markers() {
        assert_eq!(Pitch::parse("6.").unwrap().octave(), -1);
        assert_eq!(Pitch::parse("6..").unwrap().octave(), -2);
        assert_eq!(Pitch::parse("1^").unwrap().octave(), 1);
        assert_eq!(Pitch::parse("1^^").unwrap().octave(), 2);
    }

    #[test]
    fn test_parse_rest() {
        assert!(Pitch::parse("0").unwrap().is_rest());
        assert_eq!(Pitch::parse("0^"), None);
    }

    #[test]
    fn test_parse_invalid_pitch() {
        assert_eq!(Pitch::parse(""), None);
        assert_eq!(Pitch::parse("8"), None);
        assert_eq!(Pitch::parse("C"), None);
        assert_eq!(Pitch::parse("5^."), None);
        assert_eq!(Pitch::parse("5#"), None);
    }

    #[test]
    fn test_pitch_display_matches_notation() {
        for s in ["0", "5", "6.", "7..", "1^", "2^^"] {
            assert_eq!(Pitch::parse(s).unwrap().to_string(), s);
        }
    }

    #[test]
    fn test_note_rejects_non_positive_duration() {
        let pitch = Pitch::parse("5").unwrap();
        assert!(Note::new(pitch, 0.0).is_err());
        assert!(Note::new(pitch, -0.5).is_err());
        assert!(Note::new(pitch, f64::NAN).is_err());
        assert!(Note::new(pitch, f64::INFINITY).is_err());
        assert!(Note::new(pitch, 0.25).is_ok());
    }

    #[test]
    fn test_rest_rejects_lyric() {
        let rest = Note::rest(1.0).unwrap();
        assert_eq!(
            rest.with_lyric("la"),
            Err(JianpuError::RestWithLyric { index: 0 })
        );
    }

    #[test]
    fn test_note_carries_lyric_and_tie() {
        let note = Note::new(Pitch::parse("3").unwrap(), 1.0)
            .unwrap()
            .with_lyric("春")
            .unwrap()
            .tied();
        assert_eq!(note.lyric(), Some("春"));
        assert!(note.tied_to_next());
    }

    #[test]
    fn test_time_signature_parse() {
        let ts = TimeSignature::parse("3/4").unwrap();
        assert_eq!(ts.beats_per_measure(), 3);
        assert_eq!(ts.beat_unit(), 4);
        assert_eq!(ts.to_string(), "3/4");
        assert!(TimeSignature::parse("6/8").is_ok());
        assert!(TimeSignature::parse("0/4").is_err());
        assert!(TimeSignature::parse("4/3").is_err());
        assert!(TimeSignature::parse("four/4").is_err());
        assert!(TimeSignature::parse("4").is_err());
    }

    #[test]
    fn test_tempo_validation() {
        assert!(Tempo::new(0.0).is_err());
        assert!(Tempo::new(-60.0).is_err());
        assert!(Tempo::new(f64::NAN).is_err());
        assert_eq!(Tempo::new(60.0).unwrap().seconds_per_beat(), 1.0);
        assert_eq!(Tempo::default().bpm(), 120.0);
    }

    #[test]
    fn test_quarter_note_bpm() {
        let six_eight = TimeSignature::parse("6/8").unwrap();
        let tempo = Tempo::new(120.0).unwrap();
        assert_eq!(tempo.quarter_note_bpm(&six_eight), 60.0);
        assert_eq!(tempo.quarter_note_bpm(&TimeSignature::default()), 120.0);
    }

    #[test]
    fn test_key_parse() {
        assert_eq!(Key::parse("C").unwrap().semitones(), 0);
        assert_eq!(Key::parse("D调").unwrap().semitones(), 2);
        assert_eq!(Key::parse("1=Eb").unwrap().semitones(), 3);
        assert_eq!(Key::parse("F#").unwrap().semitones(), 6);
        assert_eq!(Key::parse("Cb").unwrap().semitones(), 11);
        assert_eq!(Key::parse("H"), None);
        assert_eq!(Key::parse("D##"), None);
    }

    #[test]
    fn test_midi_note_in_key() {
        let c = Key::default();
        let d = Key::parse("D").unwrap();
        assert_eq!(Pitch::parse("1").unwrap().midi_note(c), Some(60));
        assert_eq!(Pitch::parse("5").unwrap().midi_note(c), Some(67));
        assert_eq!(Pitch::parse("6.").unwrap().midi_note(c), Some(57));
        assert_eq!(Pitch::parse("1^").unwrap().midi_note(d), Some(74));
        assert_eq!(Pitch::REST.midi_note(d), None);
    }
}

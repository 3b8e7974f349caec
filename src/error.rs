//! # Error Types
//!
//! This module defines all error types for the jianpu engine.
//!
//! Errors fall into two groups:
//! - **Data-validity errors** (`InvalidDuration`, `InvalidPitch`, `RestWithLyric`,
//!   `InvalidTimeSignature`, `InvalidTempo`, `InvalidKey`, `Metadata`) are returned when a
//!   song is loaded. The song is rejected as a whole.
//! - **Runtime conditions** (`EmptyTimeline`, `OversizedMeasure`) never abort playback.
//!   `EmptyTimeline` means "nothing to highlight" and `OversizedMeasure` is collected as a
//!   warning on the [`Layout`](crate::Layout).
//!
//! ## Usage
//! ```rust
//! use jianpu::{JianpuError, Song};
//!
//! let source = r#"
//! title: Broken
//! notes:
//!   - { pitch: "5", duration: 0 }
//! "#;
//!
//! match Song::from_yaml(source) {
//!     Err(JianpuError::InvalidDuration { index, .. }) => assert_eq!(index, 0),
//!     other => panic!("unexpected result: {:?}", other),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum JianpuError {
    /// A note with a zero, negative or non-finite duration.
    ///
    /// # Example
    /// ```
    /// # use jianpu::JianpuError;
    /// let err = JianpuError::InvalidDuration { index: 3, duration: -1.0 };
    /// assert_eq!(err.to_string(), "Invalid duration at note 3: -1 beats (must be positive)");
    /// ```
    #[error("Invalid duration at note {index}: {duration} beats (must be positive)")]
    InvalidDuration { index: usize, duration: f64 },

    /// A pitch string that is not a jianpu degree with octave markers.
    #[error("Invalid pitch at note {index}: '{pitch}'")]
    InvalidPitch { index: usize, pitch: String },

    /// Rests never carry lyrics.
    #[error("Rest at note {index} carries a lyric")]
    RestWithLyric { index: usize },

    #[error("Invalid time signature: {0}")]
    InvalidTimeSignature(String),

    #[error("Invalid tempo: {0} BPM (must be positive)")]
    InvalidTempo(f64),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Invalid song document (YAML syntax, unknown field, wrong type).
    #[error("Invalid song document: {0}")]
    Metadata(String),

    #[error("Unknown song: {0}")]
    UnknownSong(String),

    /// The timeline holds no entries, so no position can be resolved.
    #[error("Timeline is empty")]
    EmptyTimeline,

    /// A single note longer than one measure. Accepted, reported as a warning.
    ///
    /// # Example
    /// ```
    /// # use jianpu::JianpuError;
    /// let err = JianpuError::OversizedMeasure { measure: 2, beats: 6.0, capacity: 4 };
    /// assert_eq!(err.to_string(), "Measure 2 holds 6 beats (capacity 4)");
    /// ```
    #[error("Measure {measure} holds {beats} beats (capacity {capacity})")]
    OversizedMeasure {
        measure: usize,
        beats: f64,
        capacity: u8,
    },
}

impl JianpuError {
    /// Attach a note position to note-level errors raised by the `Note` constructors.
    pub fn at_note(self, note_index: usize) -> Self {
        match self {
            JianpuError::InvalidDuration { duration, .. } => JianpuError::InvalidDuration {
                index: note_index,
                duration,
            },
            JianpuError::InvalidPitch { pitch, .. } => JianpuError::InvalidPitch {
                index: note_index,
                pitch,
            },
            JianpuError::RestWithLyric { .. } => JianpuError::RestWithLyric { index: note_index },
            other => other,
        }
    }

    /// Warnings never stop a song from loading or playing.
    pub fn is_warning(&self) -> bool {
        matches!(self, JianpuError::OversizedMeasure { .. })
    }
}

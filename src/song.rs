//! # Song Documents
//!
//! A song is catalog metadata plus the note data the engine lays out.
//!
//! ## Document Format
//! Songs are YAML documents with kebab-case keys:
//!
//! ```yaml
//! title: Song of Peace
//! artist: Anonymous
//! difficulty: beginner      # beginner | intermediate | advanced
//! key: C                    # degree 1 = C ("1=D", "D调" also accepted)
//! time-signature: 4/4       # default 4/4
//! tempo: 96                 # beats per minute, default 120
//! notes:
//!   - { pitch: "1", duration: 1, lyric: "和" }
//!   - { pitch: "6.", duration: 0.5 }
//!   - { pitch: "5", duration: 2, tie: true }
//! ```
//!
//! Pitches with octave markers must be quoted (`"6."` would otherwise be read as a number).
//!
//! ## Validation
//! Loading goes through a raw deserialization struct and then validates every value.
//! The first invalid value rejects the whole song:
//! - YAML errors and unknown keys → `Metadata`
//! - time signature → `InvalidTimeSignature`, tempo → `InvalidTempo`, key → `InvalidKey`
//! - per note: `InvalidPitch`, `InvalidDuration`, `RestWithLyric` (with the note index)

use crate::error::JianpuError;
use crate::note::{Key, Note, Pitch, Tempo, TimeSignature};
use log::info;
use serde::{Deserialize, Serialize};

/// Difficulty grade shown in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    #[serde(alias = "初级")]
    Beginner,
    #[serde(alias = "中级")]
    Intermediate,
    #[serde(alias = "高级")]
    Advanced,
}

/// Catalog metadata, carried through unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SongMetadata {
    pub id: Option<u32>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub difficulty: Difficulty,
    /// Key as written in the document ("D调", "1=D", "D")
    pub key: Option<String>,
    /// Display length, e.g. "5:30"
    pub duration: Option<String>,
    pub description: Option<String>,
}

/// Raw document for YAML deserialization
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawSong {
    id: Option<u32>,
    title: Option<String>,
    artist: Option<String>,
    difficulty: Option<Difficulty>,
    key: Option<String>,
    duration: Option<String>,
    description: Option<String>,
    time_signature: Option<String>,
    tempo: Option<f64>,
    #[serde(default)]
    notes: Vec<RawNote>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawNote {
    pitch: RawPitch,
    duration: f64,
    lyric: Option<String>,
    #[serde(default, alias = "tied-to-next")]
    tie: bool,
}

/// `pitch: 5` and `pitch: "5^"` are both accepted
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum RawPitch {
    Degree(u8),
    Text(String),
}

impl RawPitch {
    fn text(&self) -> String {
        match self {
            RawPitch::Degree(d) => d.to_string(),
            RawPitch::Text(s) => s.clone(),
        }
    }
}

impl RawNote {
    fn into_note(self) -> Result<Note, JianpuError> {
        let text = self.pitch.text();
        let pitch = Pitch::parse(&text).ok_or(JianpuError::InvalidPitch {
            index: 0,
            pitch: text,
        })?;
        let mut note = Note::new(pitch, self.duration)?;
        if let Some(lyric) = self.lyric {
            note = note.with_lyric(lyric)?;
        }
        if self.tie {
            note = note.tied();
        }
        Ok(note)
    }
}

/// A validated song
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    metadata: SongMetadata,
    key: Key,
    time_signature: TimeSignature,
    tempo: Tempo,
    notes: Vec<Note>,
}

impl Song {
    /// A song in C with the given notes and no catalog metadata.
    pub fn new(notes: Vec<Note>, time_signature: TimeSignature, tempo: Tempo) -> Self {
        Self {
            metadata: SongMetadata::default(),
            key: Key::default(),
            time_signature,
            tempo,
            notes,
        }
    }

    pub fn with_metadata(mut self, metadata: SongMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_key(mut self, key: Key) -> Self {
        self.key = key;
        self
    }

    /// Load and validate a YAML song document.
    pub fn from_yaml(source: &str) -> Result<Self, JianpuError> {
        let raw: RawSong =
            serde_yaml::from_str(source).map_err(|e| JianpuError::Metadata(e.to_string()))?;

        let time_signature = match &raw.time_signature {
            Some(ts) => TimeSignature::parse(ts)?,
            None => TimeSignature::default(),
        };

        let tempo = match raw.tempo {
            Some(bpm) => Tempo::new(bpm)?,
            None => Tempo::default(),
        };

        let key = match &raw.key {
            Some(k) => Key::parse(k).ok_or_else(|| JianpuError::InvalidKey(k.clone()))?,
            None => Key::default(),
        };

        let notes = raw
            .notes
            .into_iter()
            .enumerate()
            .map(|(i, n)| n.into_note().map_err(|e| e.at_note(i)))
            .collect::<Result<Vec<_>, _>>()?;

        let song = Self {
            metadata: SongMetadata {
                id: raw.id,
                title: raw.title,
                artist: raw.artist,
                difficulty: raw.difficulty.unwrap_or_default(),
                key: raw.key,
                duration: raw.duration,
                description: raw.description,
            },
            key,
            time_signature,
            tempo,
            notes,
        };
        info!(
            "loaded song '{}' ({} notes, {}, {} BPM)",
            song.title(),
            song.notes.len(),
            song.time_signature,
            song.tempo.bpm()
        );
        Ok(song)
    }

    pub fn metadata(&self) -> &SongMetadata {
        &self.metadata
    }

    /// Title, or "Untitled"
    pub fn title(&self) -> &str {
        self.metadata.title.as_deref().unwrap_or("Untitled")
    }

    pub fn key(&self) -> Key {
        self.key
    }

    pub fn time_signature(&self) -> TimeSignature {
        self.time_signature
    }

    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }
}

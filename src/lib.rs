pub mod engrave;
pub mod error;
pub mod layout;
pub mod note;
pub mod resolver;
pub mod segment;
pub mod song;
pub mod sync;
pub mod timeline;
pub mod transport;

pub use error::*;
pub use layout::Layout;
pub use note::{Key, Note, Pitch, Tempo, TimeSignature};
pub use resolver::{resolve, Position};
pub use segment::{segment, Measure};
pub use song::{Difficulty, Song, SongMetadata};
pub use sync::{Highlight, PlaybackState, SyncController, SyncEvent, SyncListener};
pub use timeline::{build, AudioEvent, Timeline, TimelineEntry};
pub use transport::{SimulatedTransport, Transport};

/// Load a YAML song document and lay it out.
/// This is the main entry point for the library.
pub fn load(source: &str) -> Result<Layout, JianpuError> {
    let song = Song::from_yaml(source)?;
    Ok(Layout::from_song(&song))
}

/// Load a song and lay it out at a different tempo.
pub fn load_with_tempo(source: &str, bpm: f64) -> Result<Layout, JianpuError> {
    let song = Song::from_yaml(source)?;
    let tempo = Tempo::new(bpm)?;
    Ok(Layout::new(song.notes().to_vec(), song.time_signature(), tempo))
}

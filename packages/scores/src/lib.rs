include!(concat!(env!("OUT_DIR"), "/songs.rs"));

/// An embedded song document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SongSource {
    /// File name without the `.yaml` extension
    pub name: &'static str,
    pub yaml: &'static str,
}

/// Get all embedded songs, sorted by name
pub fn all_songs() -> Vec<SongSource> {
    SONGS
        .iter()
        .map(|&(name, yaml)| SongSource { name, yaml })
        .collect()
}

/// Get a song by name
pub fn get_song(name: &str) -> Option<SongSource> {
    SONGS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|&(name, yaml)| SongSource { name, yaml })
}

/// List all song names
pub fn list_songs() -> Vec<&'static str> {
    SONGS.iter().map(|(name, _)| *name).collect()
}

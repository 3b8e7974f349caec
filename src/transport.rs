//! Audio transport interface consumed by the sync controller, plus a simulated clock.

/// The host's audio transport
///
/// The engine only reads the clock; the control methods are what the host's buttons call
/// alongside the matching [`SyncController`](crate::SyncController) methods.
pub trait Transport {
    /// Elapsed playback time in seconds
    fn current_seconds(&self) -> f64;
    fn play(&mut self);
    fn pause(&mut self);
    fn seek(&mut self, seconds: f64);
    fn reset(&mut self);
}

/// A transport whose clock only moves when [`advance`](SimulatedTransport::advance) is
/// called. Used by the CLI and by tests.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SimulatedTransport {
    position: f64,
    playing: bool,
}

impl SimulatedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Move the clock forward by `seconds` if playing.
    pub fn advance(&mut self, seconds: f64) {
        if self.playing && seconds > 0.0 {
            self.position += seconds;
        }
    }
}

impl Transport for SimulatedTransport {
    fn current_seconds(&self) -> f64 {
        self.position
    }

    fn play(&mut self) {
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn seek(&mut self, seconds: f64) {
        self.position = seconds.max(0.0);
    }

    fn reset(&mut self) {
        self.playing = false;
        self.position = 0.0;
    }
}

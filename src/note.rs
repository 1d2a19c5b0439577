use serde::{Deserialize, Serialize};

/// A sounding note: when it starts, when it stops, and its pitch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoteInterval {
    /// Seconds from the start of the file.
    pub start: f64,
    /// Seconds from the start of the file, never before `start`.
    pub end: f64,
    /// MIDI note number, 0-127.
    pub code: u8,
}

impl NoteInterval {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

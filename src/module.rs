// The decoded song: metadata + samples + ordered patterns. Pure data, no
// playback behavior; a Track wraps one of these together with a device.

use std::path::Path;
use std::sync::Arc;

use crate::error::ModuleError;
use crate::format;
use crate::pattern::Pattern;
use crate::sample::Sample;

#[derive(Clone, Debug, PartialEq)]
pub struct Module {
    /// Up to 25 characters, padding already trimmed.
    pub title: String,
    /// Up to 25 characters, padding already trimmed.
    pub author: String,
    /// Beats per minute, non-zero.
    pub tempo: u8,
    /// Ticks per row, non-zero.
    pub speed: u8,
    pub samples: Vec<Arc<Sample>>,
    pub patterns: Vec<Pattern>,
}

impl Module {
    /// Read and decode a `.ctra` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModuleError> {
        let bytes = std::fs::read(path)?;
        format::decode(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ModuleError> {
        format::decode(bytes)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        format::encode(self)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ModuleError> {
        std::fs::write(path, self.to_bytes())?;
        Ok(())
    }

    /// Milliseconds between sequencer ticks: floor(2500 / tempo) * speed.
    pub fn interval_ms(&self) -> u64 {
        (2500 / self.tempo as u64) * self.speed as u64
    }

    /// Widest channel count across all patterns; the silence-everything path
    /// stops every channel below this.
    pub fn max_channels(&self) -> usize {
        self.patterns.iter().map(|p| p.channels()).max().unwrap_or(0)
    }
}

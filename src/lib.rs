// CTRA tracker playback: decode a deflate-compressed module file into
// samples + pattern grids, then drive an audio output device from a
// dedicated timer thread. The sequencer only emits commands; mixing lives
// behind the AudioDevice trait (src/device is the cpal-backed reference).

pub mod builder;
pub mod device;
pub mod device_api;
pub mod error;
pub mod format;
pub mod module;
pub mod note;
pub mod pattern;
pub mod pitch;
pub mod sample;
mod sequencer;
pub mod track;

pub use device_api::AudioDevice;
pub use error::ModuleError;
pub use module::Module;
pub use track::{Track, load_module};

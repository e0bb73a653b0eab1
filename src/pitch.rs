// Pure note -> playback parameter conversion. No state, no side effects;
// the sequencer filters out the None/NoteOff sentinels before calling in.

use crate::note::{Octave, PianoKey};

/// Headroom multiplier applied to every normalized volume.
pub const REF_VOLUME_SCALE: f32 = 1.0;

// Pitch ratio 1.0 sits at C-4.
const REF_OCTAVE: i32 = Octave::Four as i32;

/// Convert a pitched key + octave + raw volume into the pitch ratio and
/// normalized volume handed to the audio device.
///
/// Equal temperament: each semitone is a factor of 2^(1/12), so a key one
/// octave above the reference comes out as exactly 2.0.
pub fn translate(key: PianoKey, octave: Octave, volume: u8) -> (f32, f32) {
    let semis = key.semitone_from_c().unwrap_or(0);
    let steps = semis + 12 * (octave.index() - REF_OCTAVE);
    let ratio = (steps as f32 / 12.0).exp2();
    let vol = (volume as f32 / 255.0 * REF_VOLUME_SCALE).clamp(0.0, 1.0);
    (ratio, vol)
}

use std::sync::Arc;

use crate::sample::Sample;

/// The surface the sequencer drives. One voice per channel; a `play_sound`
/// on a channel that is already sounding replaces the old voice.
///
/// Implementations must be callable from both the timer thread and whoever
/// owns the Track, hence `Send + Sync`. The engine never retries or inspects
/// device behavior; a bad command is the device's problem.
pub trait AudioDevice: Send + Sync {
    /// Start `sample` on `channel` at the given pitch ratio (1.0 = the
    /// sample's own rate) and volume in `[0, 1]`.
    fn play_sound(&self, channel: usize, sample: Arc<Sample>, pitch: f32, volume: f32);

    /// Cut whatever is sounding on `channel`.
    fn stop(&self, channel: usize);

    /// Adjust the volume of the currently sounding voice on `channel`.
    fn set_volume(&self, channel: usize, volume: f32);
}

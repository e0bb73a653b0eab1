use super::DeviceCommand;
use super::frame::StereoFrame;
use super::voice::Voice;

// Tracker channels, not speaker channels. Fixed cap so the audio callback
// never allocates once the engine exists.
pub const MAX_CHANNELS: usize = 64;

/// Runs inside the audio callback: applies queued commands, then mixes the
/// per-channel voices into the output block. Channels are monophonic, so a
/// new note simply replaces whatever slot was sounding.
pub struct Engine {
    sample_rate: u32,
    voices: Vec<Option<Voice>>,
}

impl Engine {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            voices: (0..MAX_CHANNELS).map(|_| None).collect(),
        }
    }

    pub fn handle_cmd(&mut self, cmd: DeviceCommand) {
        match cmd {
            DeviceCommand::Play { channel, sample, pitch, volume } => {
                let Some(slot) = self.voices.get_mut(channel) else {
                    return;
                };
                *slot = match Voice::new(sample, pitch, volume, self.sample_rate) {
                    Some(voice) => Some(voice),
                    None => {
                        eprintln!("ctra: dropping note with unsupported pcm layout");
                        None
                    }
                };
            }
            DeviceCommand::Stop { channel } => {
                if let Some(slot) = self.voices.get_mut(channel) {
                    *slot = None;
                }
            }
            DeviceCommand::SetVolume { channel, volume } => {
                if let Some(Some(voice)) = self.voices.get_mut(channel) {
                    voice.set_gain(volume);
                }
            }
        }
    }

    /// Mix every live voice into `out`. Expects `out` already zeroed.
    pub fn render_block(&mut self, out: &mut [StereoFrame]) {
        for slot in &mut self.voices {
            if let Some(voice) = slot {
                voice.render_into(out);
                if !voice.active() {
                    *slot = None;
                }
            }
        }
    }
}

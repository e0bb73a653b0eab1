// The public playback handle: a decoded module, the device it plays into,
// and the timer thread that drives the sequencer. The thread is owned here
// and torn down on drop, so a tick can never fire after the Track is gone.

use std::path::Path;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Sender, bounded, select, tick};

use crate::device_api::AudioDevice;
use crate::error::ModuleError;
use crate::module::Module;
use crate::sequencer::Sequencer;

pub struct Track {
    seq: Arc<Sequencer>,
    quit: Sender<()>,
    timer: Option<JoinHandle<()>>,
}

/// Decode a `.ctra` file and wrap it in a playable Track. `track_volume`
/// scales every volume the sequencer emits; 1.0 plays the module as-is.
pub fn load_module(
    device: Arc<dyn AudioDevice>,
    path: impl AsRef<Path>,
    track_volume: f32,
) -> Result<Track, ModuleError> {
    let module = Module::load(path)?;
    Ok(Track::new(device, module, track_volume))
}

impl Track {
    pub fn new(device: Arc<dyn AudioDevice>, module: Module, track_volume: f32) -> Self {
        let interval = Duration::from_millis(module.interval_ms());
        let seq = Arc::new(Sequencer::new(device, module, track_volume));

        // The ticker runs for the track's whole lifetime; whether a tick
        // does anything is decided under the sequencer's lock, which is
        // what keeps pause/stop atomic with respect to tick delivery.
        let (quit_tx, quit_rx) = bounded::<()>(1);
        let ticker = tick(interval);
        let tick_seq = Arc::clone(&seq);
        let timer = std::thread::spawn(move || {
            loop {
                select! {
                    recv(quit_rx) -> _ => break,
                    recv(ticker) -> _ => tick_seq.tick(),
                }
            }
        });

        Self {
            seq,
            quit: quit_tx,
            timer: Some(timer),
        }
    }

    /// Start playback, or resume it where pause left off.
    pub fn play(&self) {
        self.seq.play();
    }

    /// Halt playback keeping the cursor; all channels are silenced.
    pub fn pause(&self) {
        self.seq.pause();
    }

    /// Halt playback and rewind to the top; all channels are silenced.
    pub fn stop(&self) {
        self.seq.stop();
    }

    pub fn title(&self) -> &str {
        &self.seq.module().title
    }

    pub fn author(&self) -> &str {
        &self.seq.module().author
    }

    pub fn tempo(&self) -> u8 {
        self.seq.module().tempo
    }

    pub fn speed(&self) -> u8 {
        self.seq.module().speed
    }
}

impl Drop for Track {
    fn drop(&mut self) {
        let _ = self.quit.send(());
        if let Some(handle) = self.timer.take() {
            let _ = handle.join();
        }
    }
}

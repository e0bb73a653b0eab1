// The reference audio output device: a cpal stream whose callback drains a
// bounded command channel into the mixing engine. The sequencer only ever
// sees the `AudioDevice` trait; this module is what makes the crate usable
// as an actual player.

use std::sync::Arc;

use anyhow::Context;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender, bounded};

use crate::device_api::AudioDevice;
use crate::sample::Sample;

mod engine;
mod frame;
mod voice;

pub use frame::StereoFrame;

use engine::Engine;

pub(crate) enum DeviceCommand {
    Play {
        channel: usize,
        sample: Arc<Sample>,
        pitch: f32,
        volume: f32,
    },
    Stop {
        channel: usize,
    },
    SetVolume {
        channel: usize,
        volume: f32,
    },
}

/// Handle to the running output. Commands go over the channel; the stream
/// itself lives on a dedicated thread because cpal streams can't move
/// between threads, while this handle has to be shared freely.
pub struct Output {
    tx: Sender<DeviceCommand>,
    // dropping this side unparks the stream thread and ends it
    _quit: Sender<()>,
}

pub fn start() -> anyhow::Result<Output> {
    let (tx, rx) = bounded::<DeviceCommand>(1024);
    let (quit_tx, quit_rx) = bounded::<()>(1);
    let (ready_tx, ready_rx) = bounded::<anyhow::Result<()>>(1);

    // detached on purpose; the quit channel ends it
    let _ = std::thread::spawn(move || match build_output_stream(rx) {
        Ok(stream) => {
            let _ = ready_tx.send(Ok(()));
            // park until the Output handle goes away, then drop the stream
            let _ = quit_rx.recv();
            drop(stream);
        }
        Err(e) => {
            let _ = ready_tx.send(Err(e));
        }
    });

    ready_rx
        .recv()
        .context("audio thread died during startup")??;
    Ok(Output { tx, _quit: quit_tx })
}

impl AudioDevice for Output {
    fn play_sound(&self, channel: usize, sample: Arc<Sample>, pitch: f32, volume: f32) {
        let _ = self.tx.try_send(DeviceCommand::Play {
            channel,
            sample,
            pitch,
            volume,
        });
    }

    fn stop(&self, channel: usize) {
        let _ = self.tx.try_send(DeviceCommand::Stop { channel });
    }

    fn set_volume(&self, channel: usize, volume: f32) {
        let _ = self.tx.try_send(DeviceCommand::SetVolume { channel, volume });
    }
}

fn build_output_stream(rx: Receiver<DeviceCommand>) -> anyhow::Result<cpal::Stream> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .context("no default output device")?;
    let config = device
        .default_output_config()
        .context("no default output config")?;

    if config.sample_format() != cpal::SampleFormat::F32 {
        anyhow::bail!("unsupported sample format (only f32 supported for now)");
    }

    let sample_rate = config.sample_rate();
    let channels = config.channels() as usize;

    let mut engine = Engine::new(sample_rate);
    let mut scratch: Vec<StereoFrame> = Vec::new();

    let err_fn = |err| eprintln!("audio output stream error: {err}");

    let stream = device.build_output_stream(
        &config.into(),
        move |data: &mut [f32], _info| {
            while let Ok(cmd) = rx.try_recv() {
                engine.handle_cmd(cmd);
            }

            let n_frames = data.len() / channels;
            scratch.clear();
            scratch.resize(n_frames, StereoFrame::zero());
            engine.render_block(&mut scratch);

            // fold stereo into however many hardware channels we got
            for (frame, out) in scratch.iter().zip(data.chunks_mut(channels)) {
                out[0] = frame.left;
                if channels > 1 {
                    out[1] = frame.right;
                }
                for extra in out.iter_mut().skip(2) {
                    *extra = 0.0;
                }
            }
        },
        err_fn,
        None,
    )?;

    stream.play().context("failed to play output stream")?;
    Ok(stream)
}

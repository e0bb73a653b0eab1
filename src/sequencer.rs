// The playback state machine. All cursor access, whether from the timer
// thread's tick or from play/pause/stop on the caller's thread, goes
// through one mutex, so a control call can never observe (or create) a
// half-finished tick.

use std::sync::{Arc, Mutex};

use crate::device_api::AudioDevice;
use crate::module::Module;
use crate::note::{Effect, PianoKey};
use crate::pitch::{self, REF_VOLUME_SCALE};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Playback {
    Stopped,
    Playing,
    Paused,
}

#[derive(Clone, Copy, Debug)]
struct Cursor {
    pattern: usize,
    row: usize,
    state: Playback,
}

pub(crate) struct Sequencer {
    module: Module,
    device: Arc<dyn AudioDevice>,
    track_volume: f32,
    max_channels: usize,
    cursor: Mutex<Cursor>,
}

impl Sequencer {
    pub fn new(device: Arc<dyn AudioDevice>, module: Module, track_volume: f32) -> Self {
        let max_channels = module.max_channels();
        Self {
            module,
            device,
            track_volume,
            max_channels,
            cursor: Mutex::new(Cursor {
                pattern: 0,
                row: 0,
                state: Playback::Stopped,
            }),
        }
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn play(&self) {
        let mut cur = self.cursor.lock().unwrap();
        // resuming from Paused keeps the cursor where it was
        cur.state = Playback::Playing;
    }

    pub fn pause(&self) {
        let mut cur = self.cursor.lock().unwrap();
        cur.state = Playback::Paused;
        self.silence_all();
    }

    pub fn stop(&self) {
        let mut cur = self.cursor.lock().unwrap();
        cur.state = Playback::Stopped;
        cur.pattern = 0;
        cur.row = 0;
        self.silence_all();
    }

    /// One timer tick. A no-op unless we're playing.
    pub fn tick(&self) {
        let mut cur = self.cursor.lock().unwrap();
        if cur.state != Playback::Playing {
            return;
        }
        self.run_row(&mut cur);
    }

    #[cfg(test)]
    pub fn position(&self) -> (usize, usize) {
        let cur = self.cursor.lock().unwrap();
        (cur.pattern, cur.row)
    }

    fn run_row(&self, cur: &mut Cursor) {
        let pattern = &self.module.patterns[cur.pattern];
        let mut jumped = false;
        for channel in 0..pattern.channels() {
            // once a jump lands, cur.row is 0, so the remaining channels of
            // this tick read row 0 of the pattern we came from. That is the
            // format's playback semantics, not an off-by-one.
            let Some(note) = pattern.cell(channel, cur.row) else {
                continue;
            };
            match note.key {
                PianoKey::None => {
                    let vol =
                        note.volume as f32 / 255.0 * self.track_volume * REF_VOLUME_SCALE;
                    self.device.set_volume(channel, vol);
                    if note.effect == Effect::PositionJump {
                        cur.pattern = note.effect_param as usize;
                        cur.row = 0;
                        jumped = true;
                    }
                }
                PianoKey::NoteOff => self.device.stop(channel),
                _ => {
                    let (ratio, vol) = pitch::translate(note.key, note.octave, note.volume);
                    let sample = Arc::clone(&self.module.samples[note.sample_index as usize]);
                    self.device
                        .play_sound(channel, sample, ratio, vol * self.track_volume);
                }
            }
        }

        if jumped {
            // the jump already placed the cursor; skip the advance
            return;
        }
        cur.row += 1;
        if cur.row >= pattern.rows() {
            cur.row = 0;
            cur.pattern = (cur.pattern + 1) % self.module.patterns.len();
        }
    }

    fn silence_all(&self) {
        for channel in 0..self.max_channels {
            self.device.stop(channel);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::note::{Note, Octave};
    use crate::pattern::Pattern;
    use crate::sample::Sample;

    #[derive(Debug, PartialEq)]
    enum Ev {
        Play { channel: usize, pitch: f32, volume: f32 },
        Stop(usize),
        Volume(usize, f32),
    }

    #[derive(Default)]
    struct MockDevice {
        events: Mutex<Vec<Ev>>,
    }

    impl MockDevice {
        fn drain(&self) -> Vec<Ev> {
            std::mem::take(&mut *self.events.lock().unwrap())
        }
    }

    impl AudioDevice for MockDevice {
        fn play_sound(&self, channel: usize, _sample: Arc<Sample>, pitch: f32, volume: f32) {
            self.events.lock().unwrap().push(Ev::Play { channel, pitch, volume });
        }
        fn stop(&self, channel: usize) {
            self.events.lock().unwrap().push(Ev::Stop(channel));
        }
        fn set_volume(&self, channel: usize, volume: f32) {
            self.events.lock().unwrap().push(Ev::Volume(channel, volume));
        }
    }

    fn sample() -> Arc<Sample> {
        Arc::new(Sample {
            data: vec![0; 64],
            channels: 1,
            sample_rate: 22050,
            bits_per_sample: 16,
            loop_region: None,
        })
    }

    fn note(key: PianoKey) -> Note {
        Note {
            key,
            octave: Octave::Four,
            sample_index: 0,
            volume: 255,
            effect: Effect::None,
            effect_param: 0,
        }
    }

    fn module(patterns: Vec<Pattern>) -> Module {
        Module {
            title: String::new(),
            author: String::new(),
            tempo: 125,
            speed: 6,
            samples: vec![sample()],
            patterns,
        }
    }

    fn sequencer(patterns: Vec<Pattern>) -> (Arc<MockDevice>, Sequencer) {
        let device = Arc::new(MockDevice::default());
        let seq = Sequencer::new(device.clone(), module(patterns), 1.0);
        (device, seq)
    }

    #[test]
    fn ticks_do_nothing_while_stopped_or_paused() {
        let mut p = Pattern::new(1, 4);
        p.set(0, 0, note(PianoKey::C));
        let (device, seq) = sequencer(vec![p]);

        seq.tick();
        assert!(device.drain().is_empty());
        assert_eq!(seq.position(), (0, 0));

        seq.play();
        seq.pause();
        device.drain(); // discard the pause silencing
        seq.tick();
        assert!(device.drain().is_empty());
    }

    #[test]
    fn empty_cells_never_emit_commands() {
        let (device, seq) = sequencer(vec![Pattern::new(4, 4)]);
        seq.play();
        for _ in 0..8 {
            seq.tick();
        }
        assert!(device.drain().is_empty());
    }

    #[test]
    fn nine_ticks_wrap_two_patterns_of_four_rows() {
        let (_, seq) = sequencer(vec![Pattern::new(2, 4), Pattern::new(2, 4)]);
        seq.play();
        let mut visited = Vec::new();
        for _ in 0..9 {
            visited.push(seq.position());
            seq.tick();
        }
        assert_eq!(
            visited,
            vec![
                (0, 0), (0, 1), (0, 2), (0, 3),
                (1, 0), (1, 1), (1, 2), (1, 3),
                (0, 0),
            ]
        );
        assert_eq!(seq.position(), (0, 1));
    }

    #[test]
    fn pitched_cell_issues_note_on_with_translated_pitch() {
        let mut p = Pattern::new(2, 2);
        p.set(1, 0, Note { volume: 128, ..note(PianoKey::C) });
        let (device, seq) = sequencer(vec![p]);
        seq.play();
        seq.tick();
        let events = device.drain();
        assert_eq!(events.len(), 1);
        match &events[0] {
            Ev::Play { channel, pitch, volume } => {
                assert_eq!(*channel, 1);
                assert_eq!(*pitch, 1.0);
                assert!((volume - 128.0 / 255.0).abs() < 1e-6);
            }
            other => panic!("expected note-on, got {other:?}"),
        }
    }

    #[test]
    fn track_volume_scales_note_on() {
        let mut p = Pattern::new(1, 1);
        p.set(0, 0, note(PianoKey::C));
        let device = Arc::new(MockDevice::default());
        let seq = Sequencer::new(device.clone(), module(vec![p]), 0.5);
        seq.play();
        seq.tick();
        match &device.drain()[0] {
            Ev::Play { volume, .. } => assert!((volume - 0.5).abs() < 1e-6),
            other => panic!("expected note-on, got {other:?}"),
        }
    }

    #[test]
    fn note_off_stops_exactly_one_channel() {
        let mut p = Pattern::new(3, 2);
        p.set(1, 0, note(PianoKey::NoteOff));
        let (device, seq) = sequencer(vec![p]);
        seq.play();
        seq.tick();
        assert_eq!(device.drain(), vec![Ev::Stop(1)]);
    }

    #[test]
    fn volume_only_row_adjusts_without_retriggering() {
        let mut p = Pattern::new(1, 2);
        p.set(0, 0, Note { volume: 64, ..note(PianoKey::None) });
        let (device, seq) = sequencer(vec![p]);
        seq.play();
        seq.tick();
        let events = device.drain();
        assert_eq!(events.len(), 1);
        match &events[0] {
            Ev::Volume(0, v) => assert!((v - 64.0 / 255.0).abs() < 1e-6),
            other => panic!("expected volume change, got {other:?}"),
        }
    }

    #[test]
    fn position_jump_moves_cursor_and_skips_the_advance() {
        let mut p0 = Pattern::new(1, 4);
        p0.set(0, 2, Note {
            effect: Effect::PositionJump,
            effect_param: 1,
            ..note(PianoKey::None)
        });
        let patterns = vec![p0, Pattern::new(1, 4)];
        let (_, seq) = sequencer(patterns);
        seq.play();
        seq.tick(); // (0,0) -> (0,1)
        seq.tick(); // (0,1) -> (0,2)
        assert_eq!(seq.position(), (0, 2));
        seq.tick(); // jump tick
        assert_eq!(seq.position(), (1, 0));
        seq.tick();
        assert_eq!(seq.position(), (1, 1));
    }

    #[test]
    fn channels_after_a_jump_read_row_zero_of_the_old_pattern() {
        // channel 0 jumps; channel 1 has notes at row 0 and row 2. The jump
        // resets the row before the channel loop finishes, so channel 1
        // plays its row-0 note on the jump tick.
        let mut p0 = Pattern::new(2, 4);
        p0.set(0, 2, Note {
            effect: Effect::PositionJump,
            effect_param: 1,
            ..note(PianoKey::None)
        });
        p0.set(1, 0, Note { volume: 10, ..note(PianoKey::C) });
        p0.set(1, 2, Note { volume: 20, ..note(PianoKey::D) });
        let (device, seq) = sequencer(vec![p0, Pattern::new(2, 4)]);
        seq.play();
        seq.tick();
        seq.tick();
        device.drain();
        seq.tick(); // the jump tick
        let events = device.drain();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], Ev::Volume(0, _)));
        match &events[1] {
            Ev::Play { channel: 1, volume, .. } => {
                assert!((volume - 10.0 / 255.0).abs() < 1e-6)
            }
            other => panic!("expected channel 1 row-0 note, got {other:?}"),
        }
    }

    #[test]
    fn reserved_effects_are_inert() {
        let mut p = Pattern::new(1, 2);
        p.set(0, 0, Note {
            effect: Effect::Reserved(42),
            effect_param: 7,
            ..note(PianoKey::None)
        });
        let (device, seq) = sequencer(vec![p]);
        seq.play();
        seq.tick();
        // volume still applies, but no jump happened
        assert_eq!(device.drain().len(), 1);
        assert_eq!(seq.position(), (0, 1));
    }

    #[test]
    fn stop_resets_cursor_and_silences_every_channel() {
        let patterns = vec![Pattern::new(2, 4), Pattern::new(5, 4)];
        let (device, seq) = sequencer(patterns);
        seq.play();
        for _ in 0..6 {
            seq.tick();
        }
        assert_eq!(seq.position(), (1, 2));
        seq.stop();
        assert_eq!(seq.position(), (0, 0));
        // max channel count across patterns is 5
        assert_eq!(
            device.drain(),
            vec![Ev::Stop(0), Ev::Stop(1), Ev::Stop(2), Ev::Stop(3), Ev::Stop(4)]
        );
    }

    #[test]
    fn pause_keeps_cursor_and_resume_continues() {
        let (device, seq) = sequencer(vec![Pattern::new(2, 8)]);
        seq.play();
        seq.tick();
        seq.tick();
        seq.pause();
        assert_eq!(device.drain(), vec![Ev::Stop(0), Ev::Stop(1)]);
        assert_eq!(seq.position(), (0, 2));
        seq.play();
        seq.tick();
        assert_eq!(seq.position(), (0, 3));
    }
}

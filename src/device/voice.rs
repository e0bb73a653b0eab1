use std::sync::Arc;

use crate::sample::Sample;

use super::frame::StereoFrame;

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// One sounding sample instance. Reads straight out of the module's PCM
/// with linear interpolation; `step` is how many source frames we move per
/// output frame, which is where the pitch ratio ends up.
pub struct Voice {
    sample: Arc<Sample>,
    pos: f64,
    step: f64,
    gain: f32,
    frames: usize,
    loop_region: Option<(f64, f64)>,
    active: bool,
}

impl Voice {
    /// `None` if the PCM layout isn't something we can play (only 8/16-bit
    /// mono/stereo); the engine drops the note rather than erroring.
    pub fn new(sample: Arc<Sample>, pitch: f32, gain: f32, out_rate: u32) -> Option<Self> {
        if !matches!(sample.bits_per_sample, 8 | 16) || !matches!(sample.channels, 1 | 2) {
            return None;
        }
        let frames = sample.frames();
        if frames == 0 || out_rate == 0 {
            return None;
        }
        let step = pitch as f64 * sample.sample_rate as f64 / out_rate as f64;
        // clamp the loop to the data we actually have
        let loop_region = sample.loop_region.and_then(|r| {
            let start = (r.start as f64).min(frames as f64);
            let end = (r.end as f64).min(frames as f64);
            (end > start).then_some((start, end))
        });
        Some(Self {
            sample,
            pos: 0.0,
            step,
            gain,
            frames,
            loop_region,
            active: true,
        })
    }

    pub fn set_gain(&mut self, gain: f32) {
        self.gain = gain;
    }

    pub fn active(&self) -> bool {
        self.active
    }

    pub fn render_into(&mut self, out: &mut [StereoFrame]) {
        for frame in out.iter_mut() {
            if !self.active {
                break;
            }
            let i = self.pos as usize;
            if i >= self.frames {
                self.active = false;
                break;
            }
            let frac = (self.pos - i as f64) as f32;
            let (l0, r0) = self.frame_at(i);
            let (l1, r1) = if i + 1 < self.frames {
                self.frame_at(i + 1)
            } else {
                (l0, r0)
            };
            frame.left += lerp(l0, l1, frac) * self.gain;
            frame.right += lerp(r0, r1, frac) * self.gain;

            self.pos += self.step;
            if let Some((start, end)) = self.loop_region {
                while self.pos >= end {
                    self.pos -= end - start;
                }
            } else if self.pos >= self.frames as f64 {
                self.active = false;
            }
        }
    }

    fn frame_at(&self, i: usize) -> (f32, f32) {
        let base = i * self.sample.bytes_per_frame();
        let data = &self.sample.data;
        match (self.sample.bits_per_sample, self.sample.channels) {
            (8, 1) => {
                let v = u8_to_f32(data[base]);
                (v, v)
            }
            (8, 2) => (u8_to_f32(data[base]), u8_to_f32(data[base + 1])),
            (16, 1) => {
                let v = i16_to_f32(data, base);
                (v, v)
            }
            (16, 2) => (i16_to_f32(data, base), i16_to_f32(data, base + 2)),
            // unreachable: filtered in new()
            _ => (0.0, 0.0),
        }
    }
}

fn u8_to_f32(b: u8) -> f32 {
    (b as f32 - 128.0) / 128.0
}

fn i16_to_f32(data: &[u8], at: usize) -> f32 {
    i16::from_le_bytes([data[at], data[at + 1]]) as f32 / 32768.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::LoopRegion;

    fn mono16(samples: &[i16], rate: u32, loop_region: Option<LoopRegion>) -> Arc<Sample> {
        Arc::new(Sample {
            data: samples.iter().flat_map(|s| s.to_le_bytes()).collect(),
            channels: 1,
            sample_rate: rate,
            bits_per_sample: 16,
            loop_region,
        })
    }

    #[test]
    fn unsupported_layouts_are_refused() {
        let odd = Arc::new(Sample {
            data: vec![0; 12],
            channels: 4,
            sample_rate: 44100,
            bits_per_sample: 16,
            loop_region: None,
        });
        assert!(Voice::new(odd, 1.0, 1.0, 44100).is_none());

        let empty = mono16(&[], 44100, None);
        assert!(Voice::new(empty, 1.0, 1.0, 44100).is_none());
    }

    #[test]
    fn renders_samples_at_unity_and_goes_inactive_at_the_end() {
        let sample = mono16(&[16384, -16384, 0, 8192], 48000, None);
        let mut voice = Voice::new(sample, 1.0, 1.0, 48000).unwrap();
        let mut out = [StereoFrame::zero(); 6];
        voice.render_into(&mut out);
        assert!((out[0].left - 0.5).abs() < 1e-4);
        assert!((out[1].left + 0.5).abs() < 1e-4);
        assert_eq!(out[0].left, out[0].right);
        assert!(!voice.active());
        // frames past the end stay silent
        assert_eq!(out[5].left, 0.0);
    }

    #[test]
    fn gain_scales_output() {
        let sample = mono16(&[16384, 16384], 48000, None);
        let mut voice = Voice::new(sample, 1.0, 0.5, 48000).unwrap();
        let mut out = [StereoFrame::zero(); 1];
        voice.render_into(&mut out);
        assert!((out[0].left - 0.25).abs() < 1e-4);
    }

    #[test]
    fn looped_voice_keeps_playing() {
        let sample = mono16(
            &[1000, 2000, 3000, 4000],
            48000,
            Some(LoopRegion { start: 1, end: 3 }),
        );
        let mut voice = Voice::new(sample, 1.0, 1.0, 48000).unwrap();
        let mut out = [StereoFrame::zero(); 64];
        voice.render_into(&mut out);
        assert!(voice.active());
        assert!(out.iter().all(|f| f.left != 0.0));
    }

    #[test]
    fn pitch_ratio_doubles_the_step() {
        let sample = mono16(&[100; 100], 48000, None);
        let mut unity = Voice::new(sample.clone(), 1.0, 1.0, 48000).unwrap();
        let mut double = Voice::new(sample, 2.0, 1.0, 48000).unwrap();
        let mut out = [StereoFrame::zero(); 60];
        unity.render_into(&mut out);
        assert!(unity.active()); // 60 of 100 frames consumed
        let mut out = [StereoFrame::zero(); 60];
        double.render_into(&mut out);
        assert!(!double.active()); // 120 of 100 frames consumed
    }
}

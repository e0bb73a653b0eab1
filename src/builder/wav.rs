// WAV import for the packer. Everything becomes 16-bit PCM at the file's
// own rate and channel count; the module format stores it verbatim.

use std::path::Path;

use anyhow::{Context, bail};

use crate::sample::Sample;

pub fn load(path: &Path) -> anyhow::Result<Sample> {
    let mut reader =
        hound::WavReader::open(path).with_context(|| format!("open {}", path.display()))?;
    let spec = reader.spec();
    if spec.channels == 0 || spec.channels > 2 {
        bail!(
            "{}: only mono/stereo WAVs supported (got {} channels)",
            path.display(),
            spec.channels
        );
    }

    let samples: Vec<i16> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map(|x| (x.clamp(-1.0, 1.0) * i16::MAX as f32) as i16))
            .collect::<Result<_, _>>()?,
        hound::SampleFormat::Int => reader
            .samples::<i32>()
            .map(|s| s.map(|x| scale_to_i16(x, spec.bits_per_sample)))
            .collect::<Result<_, _>>()?,
    };

    Ok(Sample {
        data: samples.iter().flat_map(|s| s.to_le_bytes()).collect(),
        channels: spec.channels as u8,
        sample_rate: spec.sample_rate,
        bits_per_sample: 16,
        loop_region: None,
    })
}

fn scale_to_i16(v: i32, bits: u16) -> i16 {
    if bits >= 16 {
        (v >> (bits - 16)) as i16
    } else {
        (v << (16 - bits)) as i16
    }
}

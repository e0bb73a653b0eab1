// Decoding half of the CTRA container. Fails fast on the first bad byte;
// a caller either gets a fully validated Module or an error, never both.

use std::io::Read;
use std::sync::Arc;

use flate2::read::DeflateDecoder;

use crate::error::ModuleError;
use crate::module::Module;
use crate::note::{Effect, Note, Octave, PianoKey};
use crate::pattern::Pattern;
use crate::sample::{LoopRegion, Sample};

use super::{MAGIC, PATTERNS_TAG, SAMPLES_TAG, TEXT_LEN, VERSION};

/// Decode a compressed `.ctra` byte stream into a Module.
pub fn decode(bytes: &[u8]) -> Result<Module, ModuleError> {
    let mut raw = Vec::new();
    DeflateDecoder::new(bytes)
        .read_to_end(&mut raw)
        .map_err(|e| ModuleError::Corrupt(format!("deflate stream: {e}")))?;
    parse(&raw)
}

/// Parse the decompressed payload.
pub(crate) fn parse(raw: &[u8]) -> Result<Module, ModuleError> {
    let mut r = Reader::new(raw);

    if r.take(MAGIC.len())? != MAGIC {
        return Err(ModuleError::BadMagic);
    }
    let version = r.u32()?;
    if version != VERSION {
        return Err(ModuleError::UnsupportedVersion(version));
    }

    let title = r.text(TEXT_LEN)?;
    let author = r.text(TEXT_LEN)?;

    let tempo = r.u8()?;
    let speed = r.u8()?;
    if tempo == 0 {
        return Err(ModuleError::InvalidConfig("tempo is zero".into()));
    }
    if speed == 0 {
        return Err(ModuleError::InvalidConfig("speed is zero".into()));
    }

    if r.take(SAMPLES_TAG.len())? != SAMPLES_TAG {
        return Err(ModuleError::Corrupt("missing SAMPLES section".into()));
    }
    let num_samples = r.u8()?;
    let mut samples = Vec::with_capacity(num_samples as usize);
    for _ in 0..num_samples {
        samples.push(Arc::new(read_sample(&mut r)?));
    }

    if r.take(PATTERNS_TAG.len())? != PATTERNS_TAG {
        return Err(ModuleError::Corrupt("missing PATTERNS section".into()));
    }
    let num_patterns = r.u8()?;
    if num_patterns == 0 {
        return Err(ModuleError::Corrupt("module has no patterns".into()));
    }
    let mut patterns = Vec::with_capacity(num_patterns as usize);
    for _ in 0..num_patterns {
        patterns.push(read_pattern(&mut r)?);
    }

    validate_references(&patterns, samples.len(), num_patterns)?;

    Ok(Module {
        title,
        author,
        tempo,
        speed,
        samples,
        patterns,
    })
}

fn read_sample(r: &mut Reader) -> Result<Sample, ModuleError> {
    r.u8()?; // reserved
    let sample_rate = r.u32()?;
    let bits_per_sample = r.u8()?;
    let channels = r.u8()?;
    let loop_region = if r.bool()? {
        Some(LoopRegion {
            start: r.u32()?,
            end: r.u32()?,
        })
    } else {
        None
    };
    let data_len = r.u32()? as usize;
    let data = r.take(data_len)?.to_vec();
    Ok(Sample {
        data,
        channels,
        sample_rate,
        bits_per_sample,
        loop_region,
    })
}

fn read_pattern(r: &mut Reader) -> Result<Pattern, ModuleError> {
    r.u8()?; // reserved
    let rows = r.u8()?;
    let channels = r.u8()?;
    if rows == 0 || channels == 0 {
        return Err(ModuleError::Corrupt("pattern with zero dimension".into()));
    }
    let mut pattern = Pattern::new(channels, rows);
    for channel in 0..channels as usize {
        for row in 0..rows as usize {
            if !r.bool()? {
                continue;
            }
            pattern.set(channel, row, read_note(r)?);
        }
    }
    Ok(pattern)
}

fn read_note(r: &mut Reader) -> Result<Note, ModuleError> {
    let key_byte = r.u8()?;
    let key = PianoKey::from_byte(key_byte)
        .ok_or_else(|| ModuleError::Corrupt(format!("invalid key byte {key_byte}")))?;
    let octave_byte = r.u8()?;
    let octave = Octave::from_byte(octave_byte)
        .ok_or_else(|| ModuleError::Corrupt(format!("invalid octave byte {octave_byte}")))?;
    let sample_index = r.u8()?;
    let volume = r.u8()?;
    let effect = Effect::from_byte(r.u8()?);
    let effect_param = r.u8()?;
    Ok(Note {
        key,
        octave,
        sample_index,
        volume,
        effect,
        effect_param,
    })
}

// Cross-cell invariants the sequencer relies on: every pitched cell points
// at a real sample, every jump points at a real pattern. Checking here means
// playback can index without re-validating.
fn validate_references(
    patterns: &[Pattern],
    num_samples: usize,
    num_patterns: u8,
) -> Result<(), ModuleError> {
    for pattern in patterns {
        for channel in 0..pattern.channels() {
            for row in 0..pattern.rows() {
                let Some(note) = pattern.cell(channel, row) else {
                    continue;
                };
                if note.key.semitone_from_c().is_some() && note.sample_index as usize >= num_samples
                {
                    return Err(ModuleError::Corrupt(format!(
                        "note references sample {} but only {} exist",
                        note.sample_index, num_samples
                    )));
                }
                if note.effect == Effect::PositionJump && note.effect_param >= num_patterns {
                    return Err(ModuleError::Corrupt(format!(
                        "jump to pattern {} but only {} exist",
                        note.effect_param, num_patterns
                    )));
                }
            }
        }
    }
    Ok(())
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], ModuleError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.buf.len())
            .ok_or_else(|| ModuleError::Corrupt("unexpected end of stream".into()))?;
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, ModuleError> {
        Ok(self.take(1)?[0])
    }

    fn bool(&mut self) -> Result<bool, ModuleError> {
        Ok(self.u8()? != 0)
    }

    fn u32(&mut self) -> Result<u32, ModuleError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    // Fixed-width text field; trailing nul/space padding is trimmed here so
    // nobody downstream has to care.
    fn text(&mut self, width: usize) -> Result<String, ModuleError> {
        let field = self.take(width)?;
        let s = String::from_utf8_lossy(field);
        Ok(s.trim_end_matches(['\0', ' ']).to_string())
    }
}

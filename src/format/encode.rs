// Encoding half of the container: the exact inverse of decode. Used by the
// builder to write `.ctra` files and by the round-trip tests.

use std::io::Write;

use flate2::Compression;
use flate2::write::DeflateEncoder;

use crate::module::Module;
use crate::note::Note;
use crate::pattern::Pattern;
use crate::sample::Sample;

use super::{MAGIC, PATTERNS_TAG, SAMPLES_TAG, TEXT_LEN, VERSION};

/// Encode a Module into compressed `.ctra` bytes.
pub fn encode(module: &Module) -> Vec<u8> {
    let raw = write_raw(module);
    let mut enc = DeflateEncoder::new(Vec::new(), Compression::default());
    // writing to a Vec cannot fail
    enc.write_all(&raw).expect("deflate into Vec");
    enc.finish().expect("deflate into Vec")
}

/// The uncompressed payload.
pub(crate) fn write_raw(module: &Module) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&VERSION.to_le_bytes());
    push_text(&mut out, &module.title);
    push_text(&mut out, &module.author);
    out.push(module.tempo);
    out.push(module.speed);

    out.extend_from_slice(SAMPLES_TAG);
    out.push(module.samples.len() as u8);
    for sample in &module.samples {
        write_sample(&mut out, sample);
    }

    out.extend_from_slice(PATTERNS_TAG);
    out.push(module.patterns.len() as u8);
    for pattern in &module.patterns {
        write_pattern(&mut out, pattern);
    }
    out
}

fn write_sample(out: &mut Vec<u8>, sample: &Sample) {
    out.push(0); // reserved
    out.extend_from_slice(&sample.sample_rate.to_le_bytes());
    out.push(sample.bits_per_sample);
    out.push(sample.channels);
    match sample.loop_region {
        Some(region) => {
            out.push(1);
            out.extend_from_slice(&region.start.to_le_bytes());
            out.extend_from_slice(&region.end.to_le_bytes());
        }
        None => out.push(0),
    }
    out.extend_from_slice(&(sample.data.len() as u32).to_le_bytes());
    out.extend_from_slice(&sample.data);
}

fn write_pattern(out: &mut Vec<u8>, pattern: &Pattern) {
    out.push(0); // reserved
    out.push(pattern.rows() as u8);
    out.push(pattern.channels() as u8);
    for channel in 0..pattern.channels() {
        for row in 0..pattern.rows() {
            match pattern.cell(channel, row) {
                Some(note) => {
                    out.push(1);
                    write_note(out, &note);
                }
                None => out.push(0),
            }
        }
    }
}

fn write_note(out: &mut Vec<u8>, note: &Note) {
    out.push(note.key.to_byte());
    out.push(note.octave.to_byte());
    out.push(note.sample_index);
    out.push(note.volume);
    out.push(note.effect.to_byte());
    out.push(note.effect_param);
}

// Fixed-width field: truncated to width, padded with nuls. Truncation snaps
// to a char boundary so we never emit broken UTF-8.
fn push_text(out: &mut Vec<u8>, s: &str) {
    let mut end = s.len().min(TEXT_LEN);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    let bytes = &s.as_bytes()[..end];
    out.extend_from_slice(bytes);
    out.resize(out.len() + (TEXT_LEN - bytes.len()), 0);
}

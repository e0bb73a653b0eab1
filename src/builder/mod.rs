// Assembles a Module from a JSON manifest + WAV files on disk. This is the
// authoring path; playback never goes through here.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, bail};

use crate::module::Module;
use crate::note::{Effect, Note, PianoKey};
use crate::pattern::Pattern;
use crate::sample::LoopRegion;

pub mod manifest;
mod wav;

pub use manifest::SongManifest;

pub fn load_manifest(path: &Path) -> anyhow::Result<SongManifest> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("read manifest {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("parse manifest {}", path.display()))
}

/// Build a Module; sample paths resolve relative to `base_dir` (normally
/// the manifest's directory). Validates everything the decoder would, so a
/// packed file always loads back.
pub fn build(base_dir: &Path, song: &SongManifest) -> anyhow::Result<Module> {
    if song.tempo == 0 || song.speed == 0 {
        bail!("tempo and speed must be non-zero");
    }
    if song.patterns.is_empty() {
        bail!("at least one pattern is required");
    }
    if song.samples.len() > u8::MAX as usize || song.patterns.len() > u8::MAX as usize {
        bail!("at most 255 samples and 255 patterns fit the format");
    }

    let mut samples = Vec::with_capacity(song.samples.len());
    for entry in &song.samples {
        let mut sample = wav::load(&base_dir.join(&entry.path))?;
        if let Some((start, end)) = entry.loop_frames {
            if start >= end || end as usize > sample.frames() {
                bail!("{}: loop [{start}, {end}) out of range", entry.path);
            }
            sample.loop_region = Some(LoopRegion { start, end });
        }
        samples.push(Arc::new(sample));
    }

    let mut patterns = Vec::with_capacity(song.patterns.len());
    for (pi, entry) in song.patterns.iter().enumerate() {
        if entry.rows == 0 || entry.channels == 0 {
            bail!("pattern {pi}: zero rows or channels");
        }
        let mut pattern = Pattern::new(entry.channels, entry.rows);
        for cell in &entry.notes {
            if cell.channel >= entry.channels || cell.row >= entry.rows {
                bail!(
                    "pattern {pi}: cell ({}, {}) outside the {}x{} grid",
                    cell.channel, cell.row, entry.channels, entry.rows
                );
            }
            let (key, octave) = manifest::parse_key(&cell.key)?;
            if key.semitone_from_c().is_some() && cell.sample as usize >= samples.len() {
                bail!(
                    "pattern {pi}: cell ({}, {}) references sample {} but only {} exist",
                    cell.channel, cell.row, cell.sample, samples.len()
                );
            }
            let (effect, effect_param) = match cell.jump {
                Some(target) => {
                    if target as usize >= song.patterns.len() {
                        bail!("pattern {pi}: jump to pattern {target} which doesn't exist");
                    }
                    (Effect::PositionJump, target)
                }
                None => (Effect::None, 0),
            };
            if cell.jump.is_some() && key != PianoKey::None {
                bail!("pattern {pi}: jumps only work on \"---\" cells");
            }
            pattern.set(
                cell.channel as usize,
                cell.row as usize,
                Note {
                    key,
                    octave,
                    sample_index: cell.sample,
                    volume: cell.volume,
                    effect,
                    effect_param,
                },
            );
        }
        patterns.push(pattern);
    }

    Ok(Module {
        title: song.title.clone(),
        author: song.author.clone(),
        tempo: song.tempo,
        speed: song.speed,
        samples,
        patterns,
    })
}

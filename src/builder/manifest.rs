// The JSON song description `ctra pack` consumes. Deliberately close to the
// wire model: samples are WAV paths, patterns are sparse lists of cells.

use anyhow::bail;
use serde::{Deserialize, Serialize};

use crate::note::{Octave, PianoKey};

#[derive(Debug, Serialize, Deserialize)]
pub struct SongManifest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    pub tempo: u8,
    pub speed: u8,
    pub samples: Vec<SampleEntry>,
    pub patterns: Vec<PatternEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SampleEntry {
    /// WAV path, relative to the manifest file.
    pub path: String,
    /// Loop region in frames, `[start, end)`.
    #[serde(default, rename = "loop")]
    pub loop_frames: Option<(u32, u32)>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PatternEntry {
    pub rows: u8,
    pub channels: u8,
    #[serde(default)]
    pub notes: Vec<NoteEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NoteEntry {
    pub channel: u8,
    pub row: u8,
    /// `"C-4"` / `"A#3"` for a pitched note, `"off"` to cut the channel,
    /// `"---"` for a volume/effect-only cell.
    pub key: String,
    #[serde(default)]
    pub sample: u8,
    #[serde(default = "default_volume")]
    pub volume: u8,
    /// Pattern index to jump to (PositionJump); only meaningful on `"---"`
    /// cells, like in the format itself.
    #[serde(default)]
    pub jump: Option<u8>,
}

fn default_volume() -> u8 {
    255
}

/// Parse a manifest key string into the wire enums.
pub fn parse_key(s: &str) -> anyhow::Result<(PianoKey, Octave)> {
    match s {
        "off" => return Ok((PianoKey::NoteOff, Octave::Zero)),
        "---" | "" => return Ok((PianoKey::None, Octave::Zero)),
        _ => {}
    }

    let chars: Vec<char> = s.chars().collect();
    let (letter, sharp, octave_char) = match chars.as_slice() {
        [l, o] => (*l, false, *o),
        [l, '#', o] => (*l, true, *o),
        [l, '-', o] => (*l, false, *o),
        _ => bail!("bad key '{s}' (want e.g. \"C-4\", \"A#3\", \"off\", \"---\")"),
    };

    let key = match (letter.to_ascii_uppercase(), sharp) {
        ('C', false) => PianoKey::C,
        ('C', true) => PianoKey::CSharp,
        ('D', false) => PianoKey::D,
        ('D', true) => PianoKey::DSharp,
        ('E', false) => PianoKey::E,
        ('F', false) => PianoKey::F,
        ('F', true) => PianoKey::FSharp,
        ('G', false) => PianoKey::G,
        ('G', true) => PianoKey::GSharp,
        ('A', false) => PianoKey::A,
        ('A', true) => PianoKey::ASharp,
        ('B', false) => PianoKey::B,
        _ => bail!("bad key letter in '{s}'"),
    };

    let octave = octave_char
        .to_digit(10)
        .and_then(|d| Octave::from_byte(d as u8))
        .ok_or_else(|| anyhow::anyhow!("bad octave in '{s}' (0-8)"))?;

    Ok((key, octave))
}

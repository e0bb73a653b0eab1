// The per-cell note data and the little enums that live on the wire.

/// One key on the piano, or one of the two control sentinels.
///
/// `None` marks a cell that carries only volume/effect data; `NoteOff` cuts
/// whatever voice is sounding on the channel. Neither goes through the pitch
/// translator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PianoKey {
    None,
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
    NoteOff,
}

impl PianoKey {
    pub fn from_byte(b: u8) -> Option<Self> {
        Some(match b {
            0 => PianoKey::None,
            1 => PianoKey::C,
            2 => PianoKey::CSharp,
            3 => PianoKey::D,
            4 => PianoKey::DSharp,
            5 => PianoKey::E,
            6 => PianoKey::F,
            7 => PianoKey::FSharp,
            8 => PianoKey::G,
            9 => PianoKey::GSharp,
            10 => PianoKey::A,
            11 => PianoKey::ASharp,
            12 => PianoKey::B,
            13 => PianoKey::NoteOff,
            _ => return None,
        })
    }

    pub fn to_byte(self) -> u8 {
        match self {
            PianoKey::None => 0,
            PianoKey::C => 1,
            PianoKey::CSharp => 2,
            PianoKey::D => 3,
            PianoKey::DSharp => 4,
            PianoKey::E => 5,
            PianoKey::F => 6,
            PianoKey::FSharp => 7,
            PianoKey::G => 8,
            PianoKey::GSharp => 9,
            PianoKey::A => 10,
            PianoKey::ASharp => 11,
            PianoKey::B => 12,
            PianoKey::NoteOff => 13,
        }
    }

    /// Semitones above C within the octave, for pitched keys only.
    pub fn semitone_from_c(self) -> Option<i32> {
        match self {
            PianoKey::None | PianoKey::NoteOff => None,
            pitched => Some(pitched.to_byte() as i32 - 1),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Octave {
    Zero,
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
}

impl Octave {
    pub fn from_byte(b: u8) -> Option<Self> {
        Some(match b {
            0 => Octave::Zero,
            1 => Octave::One,
            2 => Octave::Two,
            3 => Octave::Three,
            4 => Octave::Four,
            5 => Octave::Five,
            6 => Octave::Six,
            7 => Octave::Seven,
            8 => Octave::Eight,
            _ => return None,
        })
    }

    pub fn to_byte(self) -> u8 {
        self as u8
    }

    pub fn index(self) -> i32 {
        self as i32
    }
}

/// Per-cell effect. The format reserves the whole byte range, so unknown
/// values decode to `Reserved` and stay inert instead of failing the load;
/// modules written for a newer revision still play, minus the new effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    None,
    PositionJump,
    Reserved(u8),
}

impl Effect {
    pub fn from_byte(b: u8) -> Self {
        match b {
            0 => Effect::None,
            1 => Effect::PositionJump,
            other => Effect::Reserved(other),
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            Effect::None => 0,
            Effect::PositionJump => 1,
            Effect::Reserved(b) => b,
        }
    }
}

/// One filled-in cell of a pattern grid. Empty cells are `None` at the
/// pattern level and never reach playback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Note {
    pub key: PianoKey,
    pub octave: Octave,
    pub sample_index: u8,
    pub volume: u8,
    pub effect: Effect,
    pub effect_param: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_bytes_round_trip() {
        for b in 0..=13u8 {
            let key = PianoKey::from_byte(b).unwrap();
            assert_eq!(key.to_byte(), b);
        }
        assert_eq!(PianoKey::from_byte(14), None);
        assert_eq!(PianoKey::from_byte(255), None);
    }

    #[test]
    fn semitones_start_at_c() {
        assert_eq!(PianoKey::C.semitone_from_c(), Some(0));
        assert_eq!(PianoKey::A.semitone_from_c(), Some(9));
        assert_eq!(PianoKey::B.semitone_from_c(), Some(11));
        assert_eq!(PianoKey::None.semitone_from_c(), None);
        assert_eq!(PianoKey::NoteOff.semitone_from_c(), None);
    }

    #[test]
    fn unknown_effect_bytes_are_reserved_not_errors() {
        assert_eq!(Effect::from_byte(0), Effect::None);
        assert_eq!(Effect::from_byte(1), Effect::PositionJump);
        assert_eq!(Effect::from_byte(7), Effect::Reserved(7));
        assert_eq!(Effect::from_byte(7).to_byte(), 7);
    }

    #[test]
    fn octave_bytes_round_trip() {
        for b in 0..=8u8 {
            assert_eq!(Octave::from_byte(b).unwrap().to_byte(), b);
        }
        assert_eq!(Octave::from_byte(9), None);
    }
}

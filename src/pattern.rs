use crate::note::Note;

/// A fixed channels x rows grid of note cells. Dimensions are set at
/// construction and never change; empty cells stay `None` and are skipped
/// entirely by the sequencer.
#[derive(Clone, Debug, PartialEq)]
pub struct Pattern {
    channels: u8,
    rows: u8,
    // channel-major, same order as the wire format
    cells: Vec<Option<Note>>,
}

impl Pattern {
    pub fn new(channels: u8, rows: u8) -> Self {
        Self {
            channels,
            rows,
            cells: vec![None; channels as usize * rows as usize],
        }
    }

    pub fn channels(&self) -> usize {
        self.channels as usize
    }

    /// Number of rows (ticks) in this pattern.
    pub fn rows(&self) -> usize {
        self.rows as usize
    }

    pub fn cell(&self, channel: usize, row: usize) -> Option<Note> {
        self.cells[self.index(channel, row)]
    }

    pub fn set(&mut self, channel: usize, row: usize, note: Note) {
        let i = self.index(channel, row);
        self.cells[i] = Some(note);
    }

    fn index(&self, channel: usize, row: usize) -> usize {
        debug_assert!(channel < self.channels as usize && row < self.rows as usize);
        channel * self.rows as usize + row
    }
}

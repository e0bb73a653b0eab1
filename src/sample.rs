// A decoded PCM sample. Immutable once the module is loaded; the device
// side holds these through an Arc so a voice can outlive a borrow.

/// Loop region in frames, half-open: playback wraps back to `start` when it
/// reaches `end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoopRegion {
    pub start: u32,
    pub end: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    /// Raw interleaved PCM, exactly as stored in the module.
    pub data: Vec<u8>,
    pub channels: u8,
    pub sample_rate: u32,
    pub bits_per_sample: u8,
    pub loop_region: Option<LoopRegion>,
}

impl Sample {
    pub fn bytes_per_frame(&self) -> usize {
        (self.bits_per_sample as usize / 8) * self.channels as usize
    }

    /// Number of whole frames in the PCM data.
    pub fn frames(&self) -> usize {
        let bpf = self.bytes_per_frame();
        if bpf == 0 { 0 } else { self.data.len() / bpf }
    }
}

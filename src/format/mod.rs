// The CTRA container format: a deflate-compressed payload holding song
// metadata, raw PCM sample blocks, and the pattern grids.

mod decode;
mod encode;

pub use decode::decode;
pub use encode::encode;

pub(crate) const MAGIC: &[u8; 10] = b"CUBICTRACK";
pub(crate) const VERSION: u32 = 1;
pub(crate) const SAMPLES_TAG: &[u8; 7] = b"SAMPLES";
pub(crate) const PATTERNS_TAG: &[u8; 8] = b"PATTERNS";

/// Fixed width of the title and author fields.
pub(crate) const TEXT_LEN: usize = 25;

//! Pluggable compression dispatch table.
//!
//! A fixed table, indexed by [`CodecId`], of (compress, decompress,
//! max-compressed-size, suggested-decompressed-size) operations. The
//! reference implementation distinguishes a recoverable "output buffer
//! too small" outcome from unrecoverable corruption via two integer
//! sentinels per codec; here that distinction is a first-class enum
//! variant on [`CodecError`] instead; no sentinel comparison appears
//! anywhere in the engine.
//!
//! The dispatch table itself is realized as [`CodecId`] (a small tagged
//! enumeration) plus [`CodecId::codec`], which hands back a `&'static
//! dyn Codec` for the matching implementation. The table is immutable
//! after process start: every implementation is a zero-sized unit
//! struct living in a `static`.

mod bz2;
mod lz4;
mod lzma;
mod lzo;
mod none;

use crate::config::CodecConfig;

/// The five codecs the container format supports, in the order the
/// reference scans file-header flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodecId {
    None,
    Lzo,
    Bz2,
    Lz4,
    Lzma,
}

impl CodecId {
    pub const ALL: [CodecId; 5] = [
        CodecId::None,
        CodecId::Lzo,
        CodecId::Bz2,
        CodecId::Lz4,
        CodecId::Lzma,
    ];

    /// The file-header flag bit this codec occupies when it is the
    /// file's chosen compression. `None` has no dedicated bit.
    pub fn flag_bit(self) -> u32 {
        match self {
            CodecId::None => 0x0,
            CodecId::Lzo => 0x1,
            CodecId::Bz2 => 0x8,
            CodecId::Lz4 => 0x10,
            CodecId::Lzma => 0x20,
        }
    }

    /// All compression flag bits a file header might carry, used to
    /// clear every one of them before the writer sets the chosen bit.
    pub fn all_flag_bits() -> u32 {
        CodecId::ALL.iter().fold(0, |acc, c| acc | c.flag_bit())
    }

    /// Resolves a codec from a file header's flags, scanning in the
    /// fixed priority order the reference uses: LZO, BZ2, LZ4, LZMA.
    pub fn from_flags(flags: u32) -> CodecId {
        const PRIORITY: [CodecId; 4] = [CodecId::Lzo, CodecId::Bz2, CodecId::Lz4, CodecId::Lzma];
        for candidate in PRIORITY {
            if flags & candidate.flag_bit() != 0 {
                return candidate;
            }
        }
        CodecId::None
    }

    /// Human-readable name, used by the info tool.
    pub fn name(self) -> &'static str {
        match self {
            CodecId::None => "None",
            CodecId::Lzo => "LZO",
            CodecId::Bz2 => "BZ2",
            CodecId::Lz4 => "LZ4",
            CodecId::Lzma => "LZMA",
        }
    }

    /// Hands back the codec implementation for this id.
    pub fn codec(self) -> &'static dyn Codec {
        match self {
            CodecId::None => &none::None_,
            CodecId::Lzo => &lzo::Lzo,
            CodecId::Bz2 => &bz2::Bz2,
            CodecId::Lz4 => &lz4::Lz4,
            CodecId::Lzma => &lzma::Lzma,
        }
    }
}

/// Outcome of a codec call that isn't plain success.
#[derive(Debug, Clone)]
pub enum CodecError {
    /// The destination buffer was too small to hold the result. The
    /// compression engine is the only caller allowed to react to this
    /// by growing the buffer and retrying; everything else is fatal.
    BufferTooSmall,
    /// Any other failure: malformed input, allocation failure inside
    /// the codec, or an error the codec can't attribute to buffer size.
    Failed(String),
}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecError::BufferTooSmall => write!(f, "destination buffer too small"),
            CodecError::Failed(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for CodecError {}

/// One entry of the codec registry.
pub trait Codec: Sync {
    fn id(&self) -> CodecId;

    /// Upper bound on compressed output size for a given input length.
    /// Sized generously enough that `compress` never needs to retry.
    fn max_compressed_size(&self, uncompressed_len: usize) -> usize;

    /// A starting guess for decompressed output size; too small is
    /// recoverable, the caller doubles and retries.
    fn suggested_decompressed_size(&self, compressed_len: usize) -> usize;

    /// Compresses `src` into `dst`, which is at least
    /// `max_compressed_size(src.len())` bytes. Returns the number of
    /// bytes written.
    fn compress(&self, src: &[u8], dst: &mut [u8], cfg: &CodecConfig) -> Result<usize, CodecError>;

    /// Decompresses `src` into `dst`. Returns the number of bytes
    /// written, or `CodecError::BufferTooSmall` if `dst` did not hold
    /// the whole result.
    fn decompress(&self, src: &[u8], dst: &mut [u8]) -> Result<usize, CodecError>;
}

//! Compile-time format constants and runtime codec tuning.
//!
//! Migrated from `types.h` (layout constants) and `compress.h`/`compress.c`
//! (the two codec presets, originally mutable process globals). The
//! presets are grouped here into a single struct built once and passed
//! by value into compression calls instead of read from statics.

/// `file_header_s.magic` — identifies the format and its endianness.
pub const MAGIC: u16 = 0xA50C;

/// Layout versions accepted on read.
pub const SUPPORTED_VERSIONS: [u16; 2] = [1, 2];

/// Layout version written by `File::save_as`.
pub const WRITE_VERSION: u16 = 2;

/// On-disk size of `FileHeader`, in bytes.
pub const FILE_HEADER_SIZE: usize = 144;

/// On-disk size of `StatsRecord`, in bytes.
pub const STATS_RECORD_SIZE: usize = 136;

/// On-disk size of `BlockHeader`, in bytes.
pub const BLOCK_HEADER_SIZE: usize = 12;

/// Length of the null-padded `ident` field in `FileHeader`.
pub const IDENT_LEN: usize = 128;

/// Load-bomb guard: decompression gives up once its output buffer would
/// have to grow past this multiple of the compressed input size.
pub const MAX_GROWTH_FACTOR: u32 = 64;

/// Default bzip2 block-size multiplier (`DEFAULT_BZ2_PRESET` in the
/// reference `compress.h`).
pub const DEFAULT_BZ2_PRESET: u32 = 9;

/// Default xz/lzma preset level (`DEFAULT_LZMA_PRESET` in the reference
/// `compress.h`).
pub const DEFAULT_LZMA_PRESET: u32 = 6;

/// Process-wide codec tuning, built once and shared by reference across
/// the worker pool. Replaces the reference implementation's two mutable
/// globals `bz2_preset` / `lzma_preset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    pub bz2_preset: u32,
    pub lzma_preset: u32,
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig {
            bz2_preset: DEFAULT_BZ2_PRESET,
            lzma_preset: DEFAULT_LZMA_PRESET,
        }
    }
}

use super::{Codec, CodecError, CodecId};
use crate::config::CodecConfig;

/// Raw-block LZ4, via `lz4_flex`. Mirrors `compress_lz4`/`decompress_lz4`
/// in the reference `compress.c`, which call `LZ4_compress_default`/
/// `LZ4_decompress_safe` directly (no frame format, no embedded size).
///
/// LZ4's reference dispatch entry uses a single sentinel (`-1`) for
/// every decompression failure — unlike the other three codecs it has
/// no way to tell "destination too small" apart from "corrupt input".
/// The retry loop therefore treats every failure as recoverable until
/// the growth cap is hit. This crate preserves that behavior exactly:
/// any error from `decompress_into` below the cap is reported as
/// `BufferTooSmall` rather than as a distinct corruption variant.
pub struct Lz4;

impl Codec for Lz4 {
    fn id(&self) -> CodecId {
        CodecId::Lz4
    }

    fn max_compressed_size(&self, uncompressed_len: usize) -> usize {
        lz4_flex::block::get_maximum_output_size(uncompressed_len)
    }

    fn suggested_decompressed_size(&self, compressed_len: usize) -> usize {
        4 * compressed_len
    }

    fn compress(&self, src: &[u8], dst: &mut [u8], _cfg: &CodecConfig) -> Result<usize, CodecError> {
        lz4_flex::block::compress_into(src, dst)
            .map_err(|e| CodecError::Failed(format!("lz4 compress: {e}")))
    }

    fn decompress(&self, src: &[u8], dst: &mut [u8]) -> Result<usize, CodecError> {
        lz4_flex::block::decompress_into(src, dst).map_err(|_| CodecError::BufferTooSmall)
    }
}

use super::{Codec, CodecError, CodecId};
use crate::config::CodecConfig;

/// LZO1X, via `lzokay-native`. Mirrors `compress_lzo`/`decompress_lzo`
/// in the reference `compress.c`, which wrap `lzo1x_1_compress` and the
/// bounded `lzo1x_decompress_safe`. Both the reference and this crate's
/// backing implementation distinguish an output-overrun from any other
/// failure, so `BufferTooSmall` here is a genuine detection, not a
/// conflation of every error.
pub struct Lzo;

impl Codec for Lzo {
    fn id(&self) -> CodecId {
        CodecId::Lzo
    }

    fn max_compressed_size(&self, uncompressed_len: usize) -> usize {
        uncompressed_len + uncompressed_len / 16 + 64 + 3
    }

    fn suggested_decompressed_size(&self, compressed_len: usize) -> usize {
        4 * compressed_len
    }

    fn compress(&self, src: &[u8], dst: &mut [u8], _cfg: &CodecConfig) -> Result<usize, CodecError> {
        lzokay_native::compress(src, dst)
            .map_err(|e| CodecError::Failed(format!("lzo compress: {e:?}")))
    }

    fn decompress(&self, src: &[u8], dst: &mut [u8]) -> Result<usize, CodecError> {
        match lzokay_native::decompress(src, dst) {
            Ok(n) => Ok(n),
            Err(lzokay_native::Error::OutputOverrun) => Err(CodecError::BufferTooSmall),
            Err(e) => Err(CodecError::Failed(format!("lzo decompress: {e:?}"))),
        }
    }
}

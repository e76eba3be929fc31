use super::{Codec, CodecError, CodecId};
use crate::config::CodecConfig;

/// The identity codec: a bounded copy, saturating at the smaller of
/// source and destination length, matching `compress_none`/
/// `decompress_none` in the reference `compress.c`.
pub struct None_;

impl Codec for None_ {
    fn id(&self) -> CodecId {
        CodecId::None
    }

    fn max_compressed_size(&self, uncompressed_len: usize) -> usize {
        uncompressed_len
    }

    fn suggested_decompressed_size(&self, compressed_len: usize) -> usize {
        compressed_len
    }

    fn compress(&self, src: &[u8], dst: &mut [u8], _cfg: &CodecConfig) -> Result<usize, CodecError> {
        let len = src.len().min(dst.len());
        dst[..len].copy_from_slice(&src[..len]);
        Ok(len)
    }

    fn decompress(&self, src: &[u8], dst: &mut [u8]) -> Result<usize, CodecError> {
        if src.len() > dst.len() {
            return Err(CodecError::BufferTooSmall);
        }
        let len = src.len().min(dst.len());
        dst[..len].copy_from_slice(&src[..len]);
        Ok(len)
    }
}

use std::io::Read;

use bzip2::read::BzDecoder;
use bzip2::write::BzEncoder;
use bzip2::Compression;
use std::io::Write;

use super::{Codec, CodecError, CodecId};
use crate::config::CodecConfig;

/// bzip2, via the `bzip2` crate. Mirrors `compress_bz2`/`decompress_bz2`
/// in the reference `compress.c`, which call
/// `BZ2_bzBuffToBuffCompress`/`Decompress` with the process-wide
/// `bz2_preset` as the block-size multiplier.
///
/// `bzip2`'s one-shot buffer API isn't exposed directly by this crate
/// version, so compression goes through `BzEncoder<Vec<u8>>` and
/// decompression is bounded by reading one byte past the candidate
/// capacity through `BzDecoder`: if that extra byte exists, the
/// destination was too small.
pub struct Bz2;

impl Codec for Bz2 {
    fn id(&self) -> CodecId {
        CodecId::Bz2
    }

    fn max_compressed_size(&self, uncompressed_len: usize) -> usize {
        101 * uncompressed_len / 100 + 600
    }

    fn suggested_decompressed_size(&self, compressed_len: usize) -> usize {
        8 * compressed_len
    }

    fn compress(&self, src: &[u8], dst: &mut [u8], cfg: &CodecConfig) -> Result<usize, CodecError> {
        let level = Compression::new(cfg.bz2_preset.clamp(1, 9));
        let mut encoder = BzEncoder::new(Vec::with_capacity(dst.len()), level);
        encoder
            .write_all(src)
            .map_err(|e| CodecError::Failed(format!("bz2 compress: {e}")))?;
        let out = encoder
            .finish()
            .map_err(|e| CodecError::Failed(format!("bz2 compress finish: {e}")))?;
        if out.len() > dst.len() {
            return Err(CodecError::BufferTooSmall);
        }
        dst[..out.len()].copy_from_slice(&out);
        Ok(out.len())
    }

    fn decompress(&self, src: &[u8], dst: &mut [u8]) -> Result<usize, CodecError> {
        let mut decoder = BzDecoder::new(src);
        let mut probe = vec![0u8; dst.len() + 1];
        let mut total = 0usize;
        loop {
            match decoder.read(&mut probe[total..]) {
                Ok(0) => break,
                Ok(n) => {
                    total += n;
                    if total > dst.len() {
                        return Err(CodecError::BufferTooSmall);
                    }
                }
                Err(e) => return Err(CodecError::Failed(format!("bz2 decompress: {e}"))),
            }
        }
        dst[..total].copy_from_slice(&probe[..total]);
        Ok(total)
    }
}

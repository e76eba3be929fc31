use std::io::{Read, Write};

use xz2::read::XzDecoder;
use xz2::write::XzEncoder;

use super::{Codec, CodecError, CodecId};
use crate::config::CodecConfig;

/// LZMA/xz, via the `xz2` crate (liblzma bindings). Mirrors
/// `compress_lzma`/`decompress_lzma` in the reference `compress.c`,
/// which call `lzma_easy_buffer_encode`/`lzma_stream_buffer_decode`
/// with the process-wide `lzma_preset`.
///
/// Like bz2, decompression is bounded by probing one byte past the
/// candidate capacity through the streaming `XzDecoder`.
pub struct Lzma;

impl Codec for Lzma {
    fn id(&self) -> CodecId {
        CodecId::Lzma
    }

    fn max_compressed_size(&self, uncompressed_len: usize) -> usize {
        // liblzma's stream_buffer_bound grows roughly linearly with a
        // fixed overhead; this mirrors that without binding the exact
        // C entry point.
        uncompressed_len + uncompressed_len / 3 + 256
    }

    fn suggested_decompressed_size(&self, compressed_len: usize) -> usize {
        8 * compressed_len
    }

    fn compress(&self, src: &[u8], dst: &mut [u8], cfg: &CodecConfig) -> Result<usize, CodecError> {
        let mut encoder = XzEncoder::new(Vec::with_capacity(dst.len()), cfg.lzma_preset);
        encoder
            .write_all(src)
            .map_err(|e| CodecError::Failed(format!("lzma compress: {e}")))?;
        let out = encoder
            .finish()
            .map_err(|e| CodecError::Failed(format!("lzma compress finish: {e}")))?;
        if out.len() > dst.len() {
            return Err(CodecError::BufferTooSmall);
        }
        dst[..out.len()].copy_from_slice(&out);
        Ok(out.len())
    }

    fn decompress(&self, src: &[u8], dst: &mut [u8]) -> Result<usize, CodecError> {
        let mut decoder = XzDecoder::new(src);
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
                Err(e) => return Err(CodecError::Failed(format!("lzma decompress: {e}"))),
            }
        }
        dst[..total].copy_from_slice(&probe[..total]);
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let c = Lzma;
        let src = vec![b'w'; 20_000];
        let mut dst = vec![0u8; c.max_compressed_size(src.len())];
        let n = c.compress(&src, &mut dst, &CodecConfig::default()).unwrap();
        let mut out = vec![0u8; c.suggested_decompressed_size(n)];
        let m = c.decompress(&dst[..n], &mut out).unwrap();
        assert_eq!(&out[..m], &src[..]);
    }

    #[test]
    fn undersized_destination_reports_buffer_too_small() {
        let c = Lzma;
        let src = vec![b'v'; 20_000];
        let mut dst = vec![0u8; c.max_compressed_size(src.len())];
        let n = c.compress(&src, &mut dst, &CodecConfig::default()).unwrap();
        let mut tiny = vec![0u8; 8];
        match c.decompress(&dst[..n], &mut tiny) {
            Err(CodecError::BufferTooSmall) => {}
            other => panic!("expected BufferTooSmall, got {other:?}"),
        }
    }
}

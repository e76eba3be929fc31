//! In-memory representation of one data block and the compression
//! engine that applies or reverses a codec over it.

use log::{debug, error};

use crate::codec::{CodecId, CodecError};
use crate::config::{CodecConfig, MAX_GROWTH_FACTOR};
use crate::error::{NfdumpError, Result};

/// Block id values from the on-disk `BlockHeader`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    DataType1,
    DataType2,
    Large,
    Catalog,
    /// Preserves any value the format doesn't name yet rather than
    /// rejecting it outright; the core only special-cases `Catalog`.
    Other(u16),
}

impl BlockType {
    pub fn from_id(id: u16) -> BlockType {
        match id {
            1 => BlockType::DataType1,
            2 => BlockType::DataType2,
            3 => BlockType::Large,
            4 => BlockType::Catalog,
            other => BlockType::Other(other),
        }
    }

    pub fn id(self) -> u16 {
        match self {
            BlockType::DataType1 => 1,
            BlockType::DataType2 => 2,
            BlockType::Large => 3,
            BlockType::Catalog => 4,
            BlockType::Other(id) => id,
        }
    }

    pub fn is_catalog(self) -> bool {
        matches!(self, BlockType::Catalog)
    }
}

/// On-disk block envelope, `BLOCK_HEADER_SIZE` bytes, little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub num_records: u32,
    pub size: u32,
    pub id: u16,
    pub flags: u16,
}

/// One data block: envelope, status, compression state, and payload.
#[derive(Debug, Clone)]
pub struct Block {
    pub header: BlockHeader,
    /// 0 = ok, negative = faulted. Written by handlers dispatched
    /// through `for_each_block`.
    pub status: i32,
    /// Current in-memory compression state.
    pub compression: CodecId,
    /// Compression state as found on disk, preserved for reporting
    /// even after the payload has been decompressed in memory.
    pub file_compression: CodecId,
    pub compressed_size: usize,
    pub uncompressed_size: usize,
    pub payload: Vec<u8>,
}

impl Block {
    /// A block with a zeroed header, status ok, no compression, and an
    /// empty payload.
    pub fn new_empty() -> Block {
        Block {
            header: BlockHeader {
                num_records: 0,
                size: 0,
                id: 0,
                flags: 0,
            },
            status: 0,
            compression: CodecId::None,
            file_compression: CodecId::None,
            compressed_size: 0,
            uncompressed_size: 0,
            payload: Vec::new(),
        }
    }

    pub fn block_type(&self) -> BlockType {
        BlockType::from_id(self.header.id)
    }

    /// Applies `codec` to the block's payload.
    ///
    /// Catalog blocks and the `None` codec are no-ops by contract: the
    /// call succeeds without touching the payload. Compression is
    /// deterministic over an adequately sized buffer, so unlike
    /// decompression there is no retry.
    pub fn compress(&mut self, codec: CodecId, cfg: &CodecConfig) -> Result<()> {
        if self.payload.is_empty() && self.header.size != 0 {
            return Err(NfdumpError::NoPayload);
        }
        if self.compression != CodecId::None {
            return Err(NfdumpError::AlreadyCompressed);
        }
        if codec == CodecId::None || self.block_type().is_catalog() {
            return Ok(());
        }

        let impl_ = codec.codec();
        let bound = impl_.max_compressed_size(self.payload.len());
        let mut buf = vec![0u8; bound];
        let written = match impl_.compress(&self.payload, &mut buf, cfg) {
            Ok(n) => n,
            Err(e) => {
                error!("{} compression error: {e}", codec.name());
                return Err(NfdumpError::CodecCompress {
                    codec,
                    status: status_code(&e),
                });
            }
        };
        buf.truncate(written);
        self.payload = buf;
        self.header.size = written as u32;
        self.compressed_size = written;
        self.compression = codec;
        Ok(())
    }

    /// Reverses whatever compression is currently applied, growing the
    /// decompression buffer on an undersized-output outcome up to
    /// `MAX_GROWTH_FACTOR` times the compressed size.
    pub fn decompress(&mut self) -> Result<()> {
        if self.payload.is_empty() && self.header.size != 0 {
            return Err(NfdumpError::NoPayload);
        }
        let codec = self.compression;
        if codec == CodecId::None {
            return Ok(());
        }

        let impl_ = codec.codec();
        let compressed_len = self.header.size as usize;
        let cap = MAX_GROWTH_FACTOR as usize * compressed_len.max(1);
        let mut buf_size = impl_.suggested_decompressed_size(compressed_len).max(1);

        loop {
            let mut buf = vec![0u8; buf_size];
            match impl_.decompress(&self.payload, &mut buf) {
                Ok(written) => {
                    buf.truncate(written);
                    self.payload = buf;
                    self.header.size = written as u32;
                    self.uncompressed_size = written;
                    self.compression = CodecId::None;
                    return Ok(());
                }
                Err(CodecError::BufferTooSmall) if buf_size < cap => {
                    debug!(
                        "{} decompression buffer too small at {buf_size} bytes, growing",
                        codec.name()
                    );
                    buf_size *= 2;
                    continue;
                }
                Err(CodecError::BufferTooSmall) => {
                    error!(
                        "{} decompression exceeded {MAX_GROWTH_FACTOR}x retry cap",
                        codec.name()
                    );
                    return Err(NfdumpError::RetryCapExceeded {
                        codec,
                        factor: MAX_GROWTH_FACTOR,
                    });
                }
                Err(e) => {
                    error!("{} decompression error: {e}", codec.name());
                    return Err(NfdumpError::CodecDecompress {
                        codec,
                        status: status_code(&e),
                    });
                }
            }
        }
    }
}

/// A stable, purely cosmetic numeric stand-in for a `CodecError`, used
/// only so `NfdumpError`'s display line carries a number the way the
/// reference's integer statuses did; the enum variant is what callers
/// actually branch on.
fn status_code(e: &CodecError) -> i32 {
    match e {
        CodecError::BufferTooSmall => -2,
        CodecError::Failed(_) => -1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_block(payload: &[u8]) -> Block {
        let mut b = Block::new_empty();
        b.header.id = BlockType::DataType1.id();
        b.header.size = payload.len() as u32;
        b.payload = payload.to_vec();
        b.compressed_size = payload.len();
        b.uncompressed_size = payload.len();
        b
    }

    #[test]
    fn compress_then_decompress_round_trips_for_every_codec() {
        let cfg = CodecConfig::default();
        for codec in [CodecId::Lzo, CodecId::Bz2, CodecId::Lz4, CodecId::Lzma] {
            let original = b"the quick brown fox jumps over the lazy dog ".repeat(200);
            let mut block = data_block(&original);
            block.compress(codec, &cfg).unwrap();
            assert_eq!(block.compression, codec);
            assert_ne!(block.payload, original, "codec {codec:?} did not transform payload");
            block.decompress().unwrap();
            assert_eq!(block.compression, CodecId::None);
            assert_eq!(block.payload, original);
            assert_eq!(block.header.size as usize, original.len());
        }
    }

    #[test]
    fn catalog_blocks_are_never_compressed() {
        let cfg = CodecConfig::default();
        let mut block = data_block(b"catalog metadata");
        block.header.id = BlockType::Catalog.id();
        let before = block.payload.clone();
        block.compress(CodecId::Bz2, &cfg).unwrap();
        assert_eq!(block.compression, CodecId::None);
        assert_eq!(block.payload, before);
    }

    #[test]
    fn compress_with_none_codec_is_a_no_op() {
        let cfg = CodecConfig::default();
        let mut block = data_block(b"unchanged");
        let before = block.payload.clone();
        block.compress(CodecId::None, &cfg).unwrap();
        assert_eq!(block.payload, before);
        assert_eq!(block.compression, CodecId::None);
    }

    #[test]
    fn decompress_of_uncompressed_block_is_idempotent() {
        let mut block = data_block(b"plain data");
        let before = block.payload.clone();
        block.decompress().unwrap();
        assert_eq!(block.payload, before);
    }

    #[test]
    fn decompress_retries_until_cap_then_fails() {
        // Fabricate a block claiming LZ4 compression whose payload is
        // not valid LZ4 data at all: the reference's single conflated
        // sentinel means this exercises the retry loop up to the cap
        // before giving up, exactly as it would for a corrupt or
        // wildly undersized real payload.
        let mut block = data_block(&vec![0xFFu8; 100]);
        block.compression = CodecId::Lz4;
        block.file_compression = CodecId::Lz4;
        let err = block.decompress().unwrap_err();
        match err {
            NfdumpError::RetryCapExceeded { codec, factor } => {
                assert_eq!(codec, CodecId::Lz4);
                assert_eq!(factor, MAX_GROWTH_FACTOR);
            }
            other => panic!("expected RetryCapExceeded, got {other:?}"),
        }
    }
}

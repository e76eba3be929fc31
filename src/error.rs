//! Typed error surface for the container codec engine.
//!
//! Mirrors the five error kinds the engine distinguishes internally: IO,
//! Format, Codec, Resource and Precondition violations. Every fallible
//! public operation returns `Result<T, NfdumpError>`; callers that only
//! want a flattened top-level error (the CLI binaries) convert via `?`
//! into `anyhow::Error`.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::codec::CodecId;

#[derive(Debug, Error)]
pub enum NfdumpError {
    #[error("failed to open {path}: {source}")]
    Open { path: PathBuf, source: io::Error },

    #[error("short read at {what} of {path}: expected {expected} bytes, got {actual}")]
    ShortRead {
        path: PathBuf,
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("short write at {what} of {path}: expected {expected} bytes, got {actual}")]
    ShortWrite {
        path: PathBuf,
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("io error on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("bad magic in {path}: expected 0x{expected:04X}, found 0x{found:04X}")]
    BadMagic {
        path: PathBuf,
        expected: u16,
        found: u16,
    },

    #[error("unsupported layout version {version} in {path}")]
    UnsupportedVersion { path: PathBuf, version: u16 },

    #[error("file {path} declared {declared} blocks but only {found} were read")]
    MissingBlocks {
        path: PathBuf,
        declared: u32,
        found: u32,
    },

    #[error("unrecognized compression value {0}")]
    UnknownCompression(u32),

    #[error("{codec:?} compression failed with status {status}")]
    CodecCompress { codec: CodecId, status: i32 },

    #[error("{codec:?} decompression failed with status {status}")]
    CodecDecompress { codec: CodecId, status: i32 },

    #[error("{codec:?} decompression exceeded the {factor}x retry cap")]
    RetryCapExceeded { codec: CodecId, factor: u32 },

    #[error("failed to allocate {0} bytes")]
    Allocation(usize),

    #[error("block is already compressed")]
    AlreadyCompressed,

    #[error("block has no payload")]
    NoPayload,

    #[error("refusing to save an empty file")]
    EmptyFile,

    #[error("block {index} has a non-zero status ({status}); refusing to save")]
    BlockFaulted { index: usize, status: i32 },
}

pub type Result<T> = std::result::Result<T, NfdumpError>;

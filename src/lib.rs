//! Container codec engine for the legacy `nfdump` NetFlow capture
//! format: binary layout fidelity, a pluggable compression dispatch
//! table, grow-on-undersize retry discipline, and a parallel
//! block-processing pipeline with catalog-block exceptions and error
//! aggregation.
//!
//! Flow-record interpretation beyond a block's envelope, authoring new
//! captures from live data, and command-line parsing for the front-end
//! tools are all out of scope here; see the `cli` module for the thin
//! layer the three binaries share.

pub mod block;
pub mod cli;
pub mod codec;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod file;
pub mod log;

// ─────────────────────────────────────────────────────────────────────────
// Top-level re-exports for the most common entry points.
// ─────────────────────────────────────────────────────────────────────────

pub use block::{Block, BlockHeader, BlockType};
pub use codec::{Codec, CodecError, CodecId};
pub use config::CodecConfig;
pub use dispatch::for_each_block;
pub use error::{NfdumpError, Result};
pub use file::{File, FileHeader, StatsRecord};

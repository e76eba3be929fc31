//! Thin command-line front-ends over the container codec engine.
//!
//! Argument parsing is deliberately minimal — the engine only commits
//! to the contract in the format's external interfaces, not to any
//! particular flag-parsing library — but `clap`'s derive macros are the
//! obvious, low-ceremony way to satisfy that contract, so each tool's
//! arguments are a small `#[derive(Parser)]` struct here.

pub mod decompress;
pub mod info;
pub mod recompress;

pub use decompress::{run as run_decompress, DecompressArgs};
pub use info::{run as run_info, InfoArgs};
pub use recompress::{run as run_recompress, RecompressArgs};

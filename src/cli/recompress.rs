//! `nfdump-recompress` — rewrite each file in place at a chosen
//! compression. Grounded in the reference `nfrecompress.c`.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use log::{debug, error};

use crate::block::Block;
use crate::codec::CodecId;
use crate::config::CodecConfig;
use crate::file::File;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Codec {
    None,
    Lzo,
    Bz2,
    Lz4,
    Lzma,
}

impl From<Codec> for CodecId {
    fn from(c: Codec) -> CodecId {
        match c {
            Codec::None => CodecId::None,
            Codec::Lzo => CodecId::Lzo,
            Codec::Bz2 => CodecId::Bz2,
            Codec::Lz4 => CodecId::Lz4,
            Codec::Lzma => CodecId::Lzma,
        }
    }
}

#[derive(Parser, Debug)]
#[command(about = "Rewrite nfdump files in place at a chosen compression")]
pub struct RecompressArgs {
    /// Target compression method.
    #[arg(short = 'c', long = "compression", value_enum)]
    pub compression: Codec,

    /// Compression level for bz2/lzma (default 9 for bz2, 6 for lzma).
    #[arg(short = 'l', long = "level")]
    pub level: Option<u32>,

    /// One or more nfdump capture files, rewritten in place.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

pub fn run(args: RecompressArgs) -> anyhow::Result<()> {
    let target: CodecId = args.compression.into();
    let mut cfg = CodecConfig::default();
    if let Some(level) = args.level {
        match target {
            CodecId::Bz2 => cfg.bz2_preset = level,
            CodecId::Lzma => cfg.lzma_preset = level,
            _ => {}
        }
    }

    let mut had_error = false;

    for path in &args.files {
        if let Err(e) = recompress_one(path, target, &cfg) {
            error!("{e}");
            had_error = true;
        }
    }

    debug!("Done");
    if had_error {
        bail!("one or more files failed to recompress");
    }
    Ok(())
}

fn recompress_one(path: &PathBuf, target: CodecId, cfg: &CodecConfig) -> anyhow::Result<()> {
    let mut file = File::load::<fn(usize, &mut Block)>(path, None)
        .with_context(|| format!("failed to load file: {}", path.display()))?;

    file.for_each_block(|_, block| {
        if block.compression != CodecId::None {
            if let Err(e) = block.decompress() {
                error!("{e}");
                block.status = -1;
            }
        }
    });

    if target != CodecId::None {
        file.for_each_block(|_, block| {
            if let Err(e) = block.compress(target, cfg) {
                error!("{e}");
                block.status = -1;
            }
        });
    }

    if file.blocks_status() < 0 {
        bail!("one or more blocks have an invalid status");
    }

    file.save_as(path)
        .with_context(|| format!("failed to save file: {}", path.display()))?;
    Ok(())
}

//! `nfdump-decompress` — write concatenated decompressed block
//! payloads to standard output. Grounded in the reference
//! `nfdecompress.c`: load, decompress every block, then emit block
//! `j`'s payload in iteration `j` (the reference's single-variable
//! indexing slip in that loop is not reproduced here).

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use log::{debug, error};

use crate::codec::CodecId;
use crate::file::File;

#[derive(Parser, Debug)]
#[command(about = "Write concatenated decompressed nfdump block payloads to stdout")]
pub struct DecompressArgs {
    /// One or more nfdump capture files.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

pub fn run(args: DecompressArgs) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for path in &args.files {
        let mut file = File::load::<fn(usize, &mut crate::block::Block)>(path, None)
            .with_context(|| format!("failed to load file: {}", path.display()))?;

        file.for_each_block(|_, block| {
            if block.compression != CodecId::None {
                if let Err(e) = block.decompress() {
                    error!("{e}");
                    block.status = -1;
                }
            }
        });

        if file.blocks_status() < 0 {
            bail!("one or more blocks have an invalid status");
        }

        for j in 0..file.blocks.len() {
            out.write_all(&file.blocks[j].payload)
                .with_context(|| format!("failed to write output for {}", path.display()))?;
        }
    }

    debug!("Done");
    Ok(())
}

//! `nfdump-info` — print per-file and per-block metadata plus totals.
//! Grounded in the reference `nffileinfo.c`, including its running
//! totals and `=`/`-` section separators.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use log::debug;

use crate::codec::CodecId;
use crate::file::File;

#[derive(Parser, Debug)]
#[command(about = "Print nfdump file and block metadata")]
pub struct InfoArgs {
    /// One or more nfdump capture files.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

fn sep(c: char) {
    println!("{}", c.to_string().repeat(41));
}

pub fn run(args: InfoArgs) -> anyhow::Result<()> {
    let mut total_size: u64 = 0;
    let mut total_flows: u64 = 0;

    sep('=');
    println!("Number of files : {}", args.files.len());
    sep('=');

    for path in &args.files {
        sep('=');
        println!("File name        : {}", path.display());

        let mut file = File::load::<fn(usize, &mut crate::block::Block)>(path, None)
            .with_context(|| format!("failed to load file: {}", path.display()))?;

        println!("File size        : {}", file.size);
        total_size += file.size;
        println!("Number of blocks : {}", file.header.num_blocks);
        sep('=');

        file.for_each_block(|_, block| {
            if block.compression != CodecId::None {
                if block.decompress().is_err() {
                    block.status = -1;
                }
            }
        });
        if file.blocks_status() < 0 {
            bail!("one or more blocks have an invalid status");
        }

        for (i, block) in file.blocks.iter().enumerate() {
            println!("Block no          : {i}");
            println!("Block id          : {}", block.header.id);
            println!("Number of records : {}", block.header.num_records);
            total_flows += block.header.num_records as u64;
            println!("Compression       : {}", block.file_compression.name());
            println!("Uncompressed size : {}", block.uncompressed_size);
            println!("Compressed size   : {}", block.compressed_size);
            sep('-');
        }
    }

    sep('=');
    println!("Total number of records : {total_flows}");
    println!("Total size              : {total_size}");
    sep('=');
    debug!("Done");
    Ok(())
}

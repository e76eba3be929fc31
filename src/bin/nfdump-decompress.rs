use clap::Parser;
use nfdump_codec::cli::DecompressArgs;

fn main() {
    nfdump_codec::log::init();
    let args = DecompressArgs::parse();
    if let Err(e) = nfdump_codec::cli::run_decompress(args) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

use clap::Parser;
use nfdump_codec::cli::RecompressArgs;

fn main() {
    nfdump_codec::log::init();
    let args = RecompressArgs::parse();
    if let Err(e) = nfdump_codec::cli::run_recompress(args) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

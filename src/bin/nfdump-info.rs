use clap::Parser;
use nfdump_codec::cli::InfoArgs;

fn main() {
    nfdump_codec::log::init();
    let args = InfoArgs::parse();
    if let Err(e) = nfdump_codec::cli::run_info(args) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

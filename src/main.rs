mod args;
mod dash;

use clap::Parser;
use log::{info, LevelFilter};
use snafu::ErrorCompat;

use crate::args::Args;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if args.verbose {
        logger.filter_level(LevelFilter::Debug);
    }
    logger.init();
    info!("args: {:?}", args);

    if let Err(e) = dash::run(&args).await {
        eprintln!("An error occured: {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}

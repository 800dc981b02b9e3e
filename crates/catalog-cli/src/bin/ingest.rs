use std::process::ExitCode;

use clap::Parser;

use catalog_cli::cli::IngestArgs;
use catalog_cli::exit::{block_on, interrupted, load_config};
use catalog_cli::ingest::run_ingest_until;
use catalog_cli::logging::init_tracing;

fn main() -> ExitCode {
    let args = IngestArgs::parse();
    init_tracing(args.verbose);

    let config = match load_config() {
        Ok(config) => config,
        Err(code) => return code,
    };
    let opts = args.options();
    tracing::debug!(?config, ?opts, "starting ingest");

    block_on(async move {
        let mut stdout = std::io::stdout();
        run_ingest_until(&config, &opts, args.verbose, &mut stdout, interrupted()).await
    })
}

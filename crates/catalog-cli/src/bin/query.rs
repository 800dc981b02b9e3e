use std::process::ExitCode;

use clap::{CommandFactory, Parser};

use catalog_cli::cli::QueryArgs;
use catalog_cli::exit::{block_on, interrupted, load_config};
use catalog_cli::logging::init_tracing;
use catalog_cli::query::run_query;

fn main() -> ExitCode {
    let args = QueryArgs::parse();
    init_tracing(args.verbose);

    let Some(opts) = args.options() else {
        let _ = QueryArgs::command().print_help();
        println!("\nPlease provide a query using --query or use --interactive mode");
        return ExitCode::FAILURE;
    };

    let config = match load_config() {
        Ok(config) => config,
        Err(code) => return code,
    };
    tracing::debug!(?config, ?opts, "starting query");

    block_on(async move {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let mut stdout = std::io::stdout();
        run_query(config, &opts, stdin, &mut stdout, interrupted()).await
    })
}

use std::future::Future;
use std::io::Write;
use std::process::ExitCode;

use catalog_rag::{RagConfig, RagError};

pub const INTERRUPTED: u8 = 130;

/// Run `fut` to completion on a single-threaded runtime.
///
/// The runtime is shut down without waiting on blocking tasks, so a pending
/// stdin read cannot keep the process alive.
pub fn block_on<F: Future<Output = ExitCode>>(fut: F) -> ExitCode {
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };
    let code = rt.block_on(fut);
    rt.shutdown_background();
    code
}

/// Resolve the configuration, printing setup instructions when no key is found.
pub fn load_config() -> Result<RagConfig, ExitCode> {
    match RagConfig::load() {
        Ok(config) => Ok(config),
        Err(RagError::MissingApiKey) => {
            for line in missing_key_help() {
                println!("{line}");
            }
            Err(ExitCode::FAILURE)
        }
        Err(e) => {
            println!("Error: {e}");
            Err(ExitCode::FAILURE)
        }
    }
}

fn missing_key_help() -> [&'static str; 5] {
    [
        "Error: OpenAI API key not found.",
        "Either:",
        "1. Create a config.toml file with: openai_api_key = \"sk-your-api-key-here\"",
        "2. Set environment variable: export OPENAI_API_KEY='sk-your-api-key-here'",
        "Get your API key from: https://platform.openai.com/api-keys",
    ]
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
pub async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

pub fn interrupted_exit<W: Write>(label: &str, out: &mut W) -> ExitCode {
    let _ = writeln!(out, "\n⚠️  {label} interrupted by user");
    let _ = out.flush();
    ExitCode::from(INTERRUPTED)
}

/// Print the final failure line with the full cause chain on one line.
pub fn report_failure<W: Write>(
    label: &str,
    err: &anyhow::Error,
    verbose: bool,
    out: &mut W,
) -> ExitCode {
    let _ = writeln!(out, "💥 {label} failed: {err:#}");
    let _ = out.flush();
    if verbose {
        eprintln!("{err:?}");
    }
    ExitCode::FAILURE
}

use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use catalog_rag::{IngestStats, OpenAiClient, RagConfig, VectorIndex, index_exists, load_documents};

use crate::exit::{interrupted_exit, report_failure};

const LABEL: &str = "Ingestion";

/// Where to read documents from and write the index to.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub data_dir: PathBuf,
    pub persist_dir: PathBuf,
    pub force: bool,
}

pub enum IngestOutcome {
    /// An index was already present and `force` was not set.
    Skipped,
    Built(IngestStats),
}

/// Load, build and persist, printing progress to `out`.
pub async fn run_ingest<W: Write>(
    config: &RagConfig,
    opts: &IngestOptions,
    out: &mut W,
) -> anyhow::Result<IngestOutcome> {
    writeln!(out, "🚀 Starting data ingestion process...")?;
    writeln!(out, "Data directory: {}", opts.data_dir.display())?;
    writeln!(out, "Index will be saved to: {}", opts.persist_dir.display())?;

    if same_dir(&opts.data_dir, &opts.persist_dir) {
        writeln!(out, "✗ The index directory must differ from the data directory")?;
        anyhow::bail!(
            "index directory {} is the data directory",
            opts.persist_dir.display()
        );
    }

    if index_exists(&opts.persist_dir) && !opts.force {
        writeln!(out, "⚠️  Index already exists in {}", opts.persist_dir.display())?;
        writeln!(out, "Use --force to rebuild the index")?;
        return Ok(IngestOutcome::Skipped);
    }

    writeln!(
        out,
        "✓ Using LLM {} and embeddings {}",
        config.llm_model, config.embed_model
    )?;

    writeln!(out, "Loading documents from {}...", opts.data_dir.display())?;
    let documents = match load_documents(&opts.data_dir) {
        Ok(docs) => docs,
        Err(e) => {
            writeln!(out, "✗ Error loading documents: {e}")?;
            return Err(e).context("loading documents");
        }
    };
    writeln!(out, "✓ Loaded {} documents", documents.len())?;

    writeln!(out, "Building vector index...")?;
    writeln!(out, "This may take a few minutes depending on the amount of data...")?;
    let client = OpenAiClient::new(config);
    let built = async {
        let index = VectorIndex::from_documents(&client, config, &documents).await?;
        index.persist(&opts.persist_dir).await?;
        Ok::<_, catalog_rag::RagError>(index.len())
    }
    .await;
    let nodes = match built {
        Ok(n) => n,
        Err(e) => {
            writeln!(out, "✗ Error building index: {e}")?;
            return Err(e).context("building index");
        }
    };
    writeln!(out, "✓ Index built and saved to {}", opts.persist_dir.display())?;

    writeln!(out, "🎉 Data ingestion completed successfully!")?;
    writeln!(out, "You can now run queries using: query --query 'your question'")?;
    Ok(IngestOutcome::Built(IngestStats {
        documents: documents.len(),
        nodes,
    }))
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Run the ingestion until it finishes or `interrupt` resolves, and map the
/// outcome to the process exit code.
pub async fn run_ingest_until<W, S>(
    config: &RagConfig,
    opts: &IngestOptions,
    verbose: bool,
    out: &mut W,
    interrupt: S,
) -> ExitCode
where
    W: Write,
    S: Future<Output = ()>,
{
    let result = tokio::select! {
        biased;
        _ = interrupt => None,
        r = run_ingest(config, opts, &mut *out) => Some(r),
    };
    match result {
        None => interrupted_exit(LABEL, out),
        Some(Ok(_)) => ExitCode::SUCCESS,
        Some(Err(e)) => report_failure(LABEL, &e, verbose, out),
    }
}

use std::future::Future;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use catalog_rag::{OpenAiClient, QueryEngine, RagConfig, RagError, Response, StoredIndex};
use tokio::io::AsyncBufRead;

use crate::exit::{interrupted_exit, report_failure};
use crate::interactive::{SessionEnd, run_interactive};
use crate::render::render_response;

const LABEL: &str = "Query";

#[derive(Debug, Clone, PartialEq)]
pub enum QueryMode {
    Single(String),
    Interactive,
}

#[derive(Debug, Clone)]
pub struct QueryOptions {
    pub mode: QueryMode,
    pub persist_dir: PathBuf,
    pub similarity_top_k: usize,
    pub show_sources: bool,
    pub verbose: bool,
}

/// Anything that can answer a question with a [`Response`].
#[allow(async_fn_in_trait)]
pub trait Responder {
    async fn respond(&self, question: &str) -> Result<Response, RagError>;
}

impl Responder for QueryEngine {
    async fn respond(&self, question: &str) -> Result<Response, RagError> {
        self.query(question).await
    }
}

/// Load the persisted index and wrap it in a query engine.
pub async fn open_engine<W: Write>(
    config: RagConfig,
    opts: &QueryOptions,
    out: &mut W,
) -> anyhow::Result<QueryEngine> {
    writeln!(out, "Loading index from {}...", opts.persist_dir.display())?;
    let index = match StoredIndex::load(&opts.persist_dir).await {
        Ok(index) => index,
        Err(e) => {
            writeln!(out, "✗ Error loading index: {e}")?;
            return Err(e).context("loading index");
        }
    };
    writeln!(out, "✓ Index loaded successfully")?;

    let client = OpenAiClient::new(&config);
    let engine = QueryEngine::new(index, client, config, opts.similarity_top_k)
        .with_verbose(opts.verbose);
    writeln!(
        out,
        "✓ Query engine created (retrieving top {} relevant documents)",
        engine.similarity_top_k()
    )?;
    Ok(engine)
}

/// Answer one question and print the response.
pub async fn execute_query<R: Responder, W: Write>(
    engine: &R,
    question: &str,
    show_sources: bool,
    out: &mut W,
) -> anyhow::Result<Response> {
    writeln!(out, "\n🔍 Query: {question}")?;
    writeln!(out, "Searching and generating response...")?;
    out.flush()?;

    let response = match engine.respond(question).await {
        Ok(r) => r,
        Err(e) => {
            writeln!(out, "✗ Error executing query: {e}")?;
            return Err(e).context("executing query");
        }
    };

    for line in render_response(&response, show_sources) {
        writeln!(out, "{line}")?;
    }
    Ok(response)
}

/// Open the index and answer in the requested mode until done or `interrupt`
/// resolves. Interactive questions are read from `input`.
pub async fn run_query<R, W, S>(
    config: RagConfig,
    opts: &QueryOptions,
    input: R,
    out: &mut W,
    interrupt: S,
) -> ExitCode
where
    R: AsyncBufRead + Unpin,
    W: Write,
    S: Future<Output = ()>,
{
    let _ = writeln!(out, "🚀 Starting catalog Q&A system...");
    tokio::pin!(interrupt);

    let opened = tokio::select! {
        biased;
        _ = &mut interrupt => None,
        r = open_engine(config, opts, &mut *out) => Some(r),
    };
    let engine = match opened {
        None => return interrupted_exit(LABEL, out),
        Some(Err(e)) => return report_failure(LABEL, &e, opts.verbose, out),
        Some(Ok(engine)) => engine,
    };

    match &opts.mode {
        QueryMode::Single(question) => {
            let answered = tokio::select! {
                biased;
                _ = &mut interrupt => None,
                r = execute_query(&engine, question, opts.show_sources, &mut *out) => Some(r),
            };
            match answered {
                None => interrupted_exit(LABEL, out),
                Some(Ok(_)) => ExitCode::SUCCESS,
                Some(Err(e)) => report_failure(LABEL, &e, opts.verbose, out),
            }
        }
        // The session handles the interrupt itself: at the prompt it ends gracefully
        QueryMode::Interactive => {
            let session =
                run_interactive(&engine, input, &mut *out, opts.show_sources, &mut interrupt).await;
            match session {
                Ok(SessionEnd::Finished) => ExitCode::SUCCESS,
                Ok(SessionEnd::Interrupted) => interrupted_exit(LABEL, out),
                Err(e) => report_failure(LABEL, &anyhow::Error::from(e), opts.verbose, out),
            }
        }
    }
}

pub mod cli;
pub mod exit;
pub mod ingest;
pub mod interactive;
pub mod logging;
pub mod query;
pub mod render;

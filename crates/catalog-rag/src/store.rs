use lancedb::{Connection, Table};
use std::path::{Path, PathBuf};

use crate::error::RagError;
use crate::ingest::index_exists;
use crate::schema::NODES_TABLE;

/// A persisted index reopened from disk.
pub struct StoredIndex {
    pub(crate) path: PathBuf,
    pub(crate) db: Connection,
    pub(crate) nodes: Table,
}

impl StoredIndex {
    /// Open the index persisted at `dir`.
    ///
    /// A missing or empty directory is reported before LanceDB is touched, so
    /// the caller gets "run ingest first" rather than a storage error.
    pub async fn load(dir: &Path) -> Result<Self, RagError> {
        if !dir.exists() {
            return Err(RagError::IndexNotFound(dir.to_path_buf()));
        }
        if !index_exists(dir) {
            return Err(RagError::IndexEmpty(dir.to_path_buf()));
        }

        let db = lancedb::connect(&dir.to_string_lossy()).execute().await?;
        let nodes = db.open_table(NODES_TABLE).execute().await?;
        Ok(Self {
            path: dir.to_path_buf(),
            db,
            nodes,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn table_names(&self) -> Result<Vec<String>, RagError> {
        self.db.table_names().execute().await.map_err(Into::into)
    }

    pub async fn node_count(&self) -> Result<usize, RagError> {
        self.nodes.count_rows(None).await.map_err(Into::into)
    }
}

use std::path::{Path, PathBuf};

use crate::error::RagError;
use crate::types::{Document, Metadata};

/// Load every supported file in `dir` (non-recursive, in file-name order).
///
/// CSV files yield one document per non-empty data row; `.txt`, `.md` and
/// `.json` files yield one document each.
pub fn load_documents(dir: &Path) -> Result<Vec<Document>, RagError> {
    if !dir.is_dir() {
        return Err(RagError::DataDirNotFound(dir.to_path_buf()));
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && !is_hidden(p))
        .collect();
    paths.sort();

    let mut documents = Vec::new();
    for path in &paths {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => documents.extend(load_csv(path)?),
            "txt" | "md" | "json" => documents.extend(load_text(path)?),
            _ => tracing::debug!(path = %path.display(), "skipping unsupported file"),
        }
    }

    if documents.is_empty() {
        return Err(RagError::NoDocuments(dir.to_path_buf()));
    }
    tracing::debug!(count = documents.len(), dir = %dir.display(), "loaded documents");
    Ok(documents)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn base_metadata(path: &Path) -> Metadata {
    let mut meta = Metadata::new();
    meta.insert("file_path".into(), path.to_string_lossy().into_owned());
    meta.insert("file_name".into(), file_name(path));
    meta
}

fn load_csv(path: &Path) -> Result<Vec<Document>, RagError> {
    let csv_err = |source| RagError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_err)?;
    let headers = reader.headers().map_err(csv_err)?.clone();
    let name = file_name(path);

    let mut documents = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(csv_err)?;
        let row = i + 1;
        let text = record
            .iter()
            .enumerate()
            .filter(|(_, value)| !value.is_empty())
            .map(|(col, value)| match headers.get(col) {
                Some(h) if !h.is_empty() => format!("{h}: {value}"),
                _ => format!("column_{}: {value}", col + 1),
            })
            .collect::<Vec<_>>()
            .join("\n");
        if text.is_empty() {
            continue;
        }

        let mut metadata = base_metadata(path);
        metadata.insert("row".into(), row.to_string());
        documents.push(Document {
            doc_id: format!("{name}:{row}"),
            text,
            metadata,
        });
    }
    Ok(documents)
}

fn load_text(path: &Path) -> Result<Vec<Document>, RagError> {
    let text = std::fs::read_to_string(path)?;
    if text.trim().is_empty() {
        return Ok(vec![]);
    }
    Ok(vec![Document {
        doc_id: file_name(path),
        text,
        metadata: base_metadata(path),
    }])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const PHONES_CSV: &str = "\
name,brand,price,battery_mah
Galaxy M34,Samsung,16999,6000
Redmi 12,Xiaomi,,5000
,,,
Nord CE 3,OnePlus,24999,5000
";

    #[test]
    fn missing_dir_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = load_documents(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, RagError::DataDirNotFound(_)));
    }

    #[test]
    fn empty_dir_has_no_documents() {
        let dir = TempDir::new().unwrap();
        let err = load_documents(dir.path()).unwrap_err();
        assert!(matches!(err, RagError::NoDocuments(_)));
    }

    #[test]
    fn unsupported_files_only_has_no_documents() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("image.png"), [0u8, 1, 2]).unwrap();
        fs::write(dir.path().join(".hidden.csv"), "a\n1\n").unwrap();
        let err = load_documents(dir.path()).unwrap_err();
        assert!(matches!(err, RagError::NoDocuments(_)));
    }

    #[test]
    fn csv_rows_become_documents() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("phones.csv"), PHONES_CSV).unwrap();

        let docs = load_documents(dir.path()).unwrap();
        // The all-empty row is skipped
        assert_eq!(docs.len(), 3);

        assert_eq!(docs[0].doc_id, "phones.csv:1");
        assert_eq!(
            docs[0].text,
            "name: Galaxy M34\nbrand: Samsung\nprice: 16999\nbattery_mah: 6000"
        );
        assert_eq!(docs[0].metadata["file_name"], "phones.csv");
        assert_eq!(docs[0].metadata["row"], "1");

        // Empty price is dropped, not rendered as "price: "
        assert!(!docs[1].text.contains("price"));
        assert_eq!(docs[2].metadata["row"], "4");
    }

    #[test]
    fn csv_extra_columns_get_positional_names() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("x.CSV"), "name\nWidget,blue\n").unwrap();
        let docs = load_documents(dir.path()).unwrap();
        assert_eq!(docs[0].text, "name: Widget\ncolumn_2: blue");
    }

    #[test]
    fn text_files_are_whole_documents_in_name_order() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.md"), "# Returns\nThirty days.").unwrap();
        fs::write(dir.path().join("a.txt"), "Shipping is free.").unwrap();
        fs::write(dir.path().join("c.txt"), "   \n").unwrap();

        let docs = load_documents(dir.path()).unwrap();
        let ids: Vec<&str> = docs.iter().map(|d| d.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["a.txt", "b.md"]);
        assert!(docs[0].metadata.get("row").is_none());
    }

    #[test]
    fn subdirectories_are_not_walked() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("a.txt"), "hi").unwrap();
        let err = load_documents(dir.path()).unwrap_err();
        assert!(matches!(err, RagError::NoDocuments(_)));
    }
}

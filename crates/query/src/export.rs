//! `query export {json|csv} PATH`: dump every canonical to disk
//! as either a JSON array or a flat CSV table.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use index::{CanonicalDocument, CanonicalId, Store};
use quality::Completeness;
use serde::{Deserialize, Serialize};

use crate::error::QueryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

/// One flattened row per canonical, the shape both export formats emit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportRow {
    pub canonical_id: CanonicalId,
    pub title: Option<String>,
    pub date: Option<String>,
    pub document_type: String,
    pub ocr_quality: f64,
    pub has_redactions: bool,
    pub completeness: String,
    pub page_count: u32,
    pub source_count: usize,
    pub primary_source: String,
}

impl From<&CanonicalDocument> for ExportRow {
    fn from(doc: &CanonicalDocument) -> Self {
        ExportRow {
            canonical_id: doc.canonical_id.clone(),
            title: doc.title.clone(),
            date: doc.date.clone(),
            document_type: format!("{:?}", doc.document_type),
            ocr_quality: doc.ocr_quality,
            has_redactions: doc.has_redactions,
            completeness: completeness_label(doc.completeness),
            page_count: doc.page_count,
            source_count: doc.sources.len(),
            primary_source: doc.primary_source.clone(),
        }
    }
}

fn completeness_label(completeness: Completeness) -> String {
    match completeness {
        Completeness::Complete => "complete".to_string(),
        Completeness::Partial => "partial".to_string(),
        Completeness::Fragment => "fragment".to_string(),
    }
}

pub fn export(store: &Store, format: ExportFormat, path: &Path) -> Result<usize, QueryError> {
    let canonicals = store.scan_canonicals()?;
    let rows: Vec<ExportRow> = canonicals.iter().map(ExportRow::from).collect();

    match format {
        ExportFormat::Json => export_json(&rows, path)?,
        ExportFormat::Csv => export_csv(&rows, path)?,
    }

    Ok(rows.len())
}

fn export_json(rows: &[ExportRow], path: &Path) -> Result<(), QueryError> {
    let file = File::create(path).map_err(|source| QueryError::ExportWrite {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, rows)
        .map_err(|e| QueryError::ExportEncode(e.to_string()))?;
    writer
        .flush()
        .map_err(|source| QueryError::ExportWrite {
            path: path.to_path_buf(),
            source,
        })
}

fn export_csv(rows: &[ExportRow], path: &Path) -> Result<(), QueryError> {
    let file = File::create(path).map_err(|source| QueryError::ExportWrite {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(BufWriter::new(file));
    writer
        .write_record([
            "canonical_id",
            "title",
            "date",
            "document_type",
            "ocr_quality",
            "has_redactions",
            "completeness",
            "page_count",
            "source_count",
            "primary_source",
        ])
        .map_err(|e| QueryError::ExportEncode(e.to_string()))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| QueryError::ExportEncode(e.to_string()))?;
    }
    writer
        .flush()
        .map_err(|source| QueryError::ExportWrite {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn empty_store_writes_an_empty_json_array() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("index.redb")).unwrap();
        let out = dir.path().join("export.json");
        let count = export(&store, ExportFormat::Json, &out).unwrap();
        assert_eq!(count, 0);
        let contents = std::fs::read_to_string(&out).unwrap();
        assert_eq!(contents.trim(), "[]");
    }

    #[test]
    fn empty_store_writes_a_header_only_csv() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("index.redb")).unwrap();
        let out = dir.path().join("export.csv");
        export(&store, ExportFormat::Csv, &out).unwrap();
        let contents = std::fs::read_to_string(&out).unwrap();
        assert!(contents.contains("canonical_id"));
    }
}

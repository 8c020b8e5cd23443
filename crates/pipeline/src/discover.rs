//! Directory walk and format detection for one ingest run.
//!
//! No dependency on `walkdir` here: `std::fs` plus an explicit work-stack
//! is enough for a bounded, deterministic walk.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use index::SourceFormat;

/// Guess a [`SourceFormat`] from a file's extension. Anything unrecognized
/// is [`SourceFormat::Other`] rather than an error — format only affects
/// how text is recovered (see `crate::ingest::extract_text`) and storage
/// layout, never whether a file is eligible for ingestion.
pub fn detect_format(path: &Path) -> SourceFormat {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("pdf") => SourceFormat::Pdf,
        Some("txt") => SourceFormat::Txt,
        Some("md") | Some("markdown") => SourceFormat::Markdown,
        Some("docx") => SourceFormat::Docx,
        _ => SourceFormat::Other,
    }
}

/// Recursively list every regular file under `root`, in a deterministic
/// (lexicographic) order so two runs over the same tree enumerate files
/// identically regardless of the host filesystem's native directory
/// order.
///
/// A `.txt` file is dropped from the result when it sits next to a
/// non-`.txt` file with the same stem (e.g. `memo.pdf` + `memo.txt`): that
/// sibling is treated as externally-produced OCR text for `memo.pdf`
/// rather than as a standalone document (see `crate::ingest::extract_text`),
/// and ingesting it a second time on its own would double-count the same
/// logical document under two file paths.
pub fn discover_files(root: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut all = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                stack.push(path);
            } else if file_type.is_file() {
                all.push(path);
            }
        }
    }
    all.sort();

    let consumed_sidecars: HashSet<PathBuf> = all
        .iter()
        .filter(|path| detect_format(path) != SourceFormat::Txt)
        .filter_map(|path| sidecar_text_path(path))
        .filter(|sidecar| all.contains(sidecar))
        .collect();

    Ok(all
        .into_iter()
        .filter(|path| !consumed_sidecars.contains(path))
        .collect())
}

/// The sibling `.txt` path that would supply OCR text for `path`, e.g.
/// `reports/memo.pdf` -> `reports/memo.txt`.
pub fn sidecar_text_path(path: &Path) -> Option<PathBuf> {
    Some(path.with_extension("txt"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn detects_format_by_extension() {
        assert_eq!(detect_format(Path::new("a/b.PDF")), SourceFormat::Pdf);
        assert_eq!(detect_format(Path::new("a/b.txt")), SourceFormat::Txt);
        assert_eq!(detect_format(Path::new("a/b.md")), SourceFormat::Markdown);
        assert_eq!(detect_format(Path::new("a/b.docx")), SourceFormat::Docx);
        assert_eq!(detect_format(Path::new("a/b.xyz")), SourceFormat::Other);
    }

    #[test]
    fn walk_is_sorted_and_recursive() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();
        fs::write(dir.path().join("sub/a.txt"), "a").unwrap();

        let files = discover_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0] < files[1]);
    }

    #[test]
    fn txt_sidecar_of_a_pdf_is_excluded_from_the_walk() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("memo.pdf"), b"%PDF-1.4 fake").unwrap();
        fs::write(dir.path().join("memo.txt"), "ocr text").unwrap();
        fs::write(dir.path().join("standalone.txt"), "own document").unwrap();

        let files = discover_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert!(names.contains(&"memo.pdf"));
        assert!(names.contains(&"standalone.txt"));
        assert!(!names.contains(&"memo.txt"));
    }
}

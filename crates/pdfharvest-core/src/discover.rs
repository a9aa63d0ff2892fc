use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

use crate::SourceFile;

/// Fatal enumeration failure: no partial batch is attempted.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("input directory not found: {0}")]
    NotFound(PathBuf),
    #[error("input path is not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("failed to read input directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Enumerate PDF files under `dir`, recursively.
///
/// Filters to the `.pdf` extension (case-insensitive); other entries are
/// silently excluded. The returned sequence is in lexical path order so a
/// fixed directory snapshot always enumerates identically.
pub fn discover_pdfs(dir: &Path) -> Result<Vec<SourceFile>, DiscoveryError> {
    if !dir.exists() {
        return Err(DiscoveryError::NotFound(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(DiscoveryError::NotADirectory(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = entry.map_err(|e| DiscoveryError::Io {
            path: dir.to_path_buf(),
            source: e.into(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if has_pdf_extension(entry.path()) {
            files.push(SourceFile::new(entry.into_path()));
        } else {
            tracing::debug!(path = %entry.path().display(), "skipping non-PDF entry");
        }
    }

    files.sort();
    tracing::info!(count = files.len(), dir = %dir.display(), "discovered PDF files");
    Ok(files)
}

fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::write(path, b"%PDF-1.4").unwrap();
    }

    #[test]
    fn filters_to_pdf_extension_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.pdf"));
        touch(&dir.path().join("b.PDF"));
        touch(&dir.path().join("notes.txt"));
        touch(&dir.path().join("no_extension"));

        let files = discover_pdfs(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.pdf", "b.PDF"]);
    }

    #[test]
    fn recurses_into_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        touch(&dir.path().join("top.pdf"));
        touch(&dir.path().join("sub").join("nested.pdf"));

        let files = discover_pdfs(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn order_is_lexical_and_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["c.pdf", "a.pdf", "b.pdf"] {
            touch(&dir.path().join(name));
        }

        let first = discover_pdfs(dir.path()).unwrap();
        let second = discover_pdfs(dir.path()).unwrap();
        assert_eq!(first, second);

        let names: Vec<_> = first
            .iter()
            .map(|f| f.path.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.pdf", "b.pdf", "c.pdf"]);
    }

    #[test]
    fn empty_directory_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let files = discover_pdfs(dir.path()).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn missing_directory_is_a_discovery_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let err = discover_pdfs(&missing).unwrap_err();
        assert!(matches!(err, DiscoveryError::NotFound(_)));
    }

    #[test]
    fn file_as_input_is_a_discovery_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("single.pdf");
        touch(&file);
        let err = discover_pdfs(&file).unwrap_err();
        assert!(matches!(err, DiscoveryError::NotADirectory(_)));
    }
}

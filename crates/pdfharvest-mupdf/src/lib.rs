use std::path::Path;

use mupdf::{Document, MetadataName, TextPageFlags};

use pdfharvest_core::{DocumentMetadata, ExtractError, ExtractErrorKind, TextExtractor};

/// MuPDF-based implementation of [`TextExtractor`].
///
/// This crate is the sole AGPL island — it isolates the mupdf dependency
/// (which is AGPL-3.0) so that the pipeline core and its tests do not
/// transitively depend on it.
///
/// Each call opens its own [`Document`], so concurrent invocations from the
/// worker pool share no mutable state.
#[derive(Debug, Default)]
pub struct MupdfExtractor;

impl MupdfExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for MupdfExtractor {
    fn extract_text(&self, path: &Path) -> Result<String, ExtractError> {
        if !path.exists() {
            return Err(ExtractError::new(
                ExtractErrorKind::NotFound,
                format!("no such file: {}", path.display()),
            ));
        }

        let path_str = path.to_str().ok_or_else(|| {
            ExtractError::new(
                ExtractErrorKind::Unsupported,
                "path is not valid UTF-8".to_string(),
            )
        })?;

        let document = Document::open(path_str).map_err(|e| classify_open_error(&e))?;

        if document
            .needs_password()
            .map_err(|e| corrupted("failed to inspect document", &e))?
        {
            return Err(ExtractError::new(
                ExtractErrorKind::PasswordProtected,
                "document requires a password to read",
            ));
        }

        let mut pages_text = Vec::new();
        for page_result in document
            .pages()
            .map_err(|e| corrupted("failed to enumerate pages", &e))?
        {
            let page = page_result.map_err(|e| corrupted("failed to load page", &e))?;
            let text_page = page
                .to_text_page(TextPageFlags::empty())
                .map_err(|e| corrupted("failed to extract page text", &e))?;

            let mut page_text = String::new();
            for block in text_page.blocks() {
                for line in block.lines() {
                    let line_text: String = line
                        .chars()
                        .map(|c| c.char().unwrap_or('\u{FFFD}'))
                        .collect();
                    page_text.push_str(&line_text);
                    page_text.push('\n');
                }
            }
            pages_text.push(page_text);
        }

        Ok(pages_text.join("\n"))
    }

    fn metadata(&self, path: &Path) -> DocumentMetadata {
        // Best-effort by contract: anything unreadable is simply absent.
        let Some(path_str) = path.to_str() else {
            return DocumentMetadata::default();
        };
        let Ok(document) = Document::open(path_str) else {
            return DocumentMetadata::default();
        };
        DocumentMetadata {
            title: metadata_field(&document, MetadataName::Title),
            author: metadata_field(&document, MetadataName::Author),
            created: metadata_field(&document, MetadataName::CreationDate),
        }
    }
}

fn metadata_field(document: &Document, name: MetadataName) -> Option<String> {
    document
        .metadata(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Map a mupdf open failure onto the pipeline's error taxonomy by message.
/// mupdf reports everything as one error type, so this is best-effort:
/// password wording → PasswordProtected, format-recognition wording →
/// Unsupported, everything else → Corrupted.
fn classify_open_error(err: &mupdf::Error) -> ExtractError {
    let message = err.to_string();
    let lowered = message.to_ascii_lowercase();
    let kind = if lowered.contains("password") {
        ExtractErrorKind::PasswordProtected
    } else if lowered.contains("recognize") || lowered.contains("unknown format") {
        ExtractErrorKind::Unsupported
    } else {
        ExtractErrorKind::Corrupted
    };
    ExtractError::new(kind, format!("failed to open document: {message}"))
}

fn corrupted(context: &str, err: &mupdf::Error) -> ExtractError {
    ExtractError::new(ExtractErrorKind::Corrupted, format!("{context}: {err}"))
}

//! End-to-end tests for [`extract_directory`]: real temp directories, fake
//! extractor backends.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use pdfharvest_core::{
    BatchError, BatchOptions, DocumentMetadata, ExtractError, ExtractErrorKind, ExtractionOutcome,
    ProgressEvent, TextExtractor, extract_directory,
};

struct FnExtractor<F>(F);

impl<F> TextExtractor for FnExtractor<F>
where
    F: Fn(&Path) -> Result<String, ExtractError> + Send + Sync,
{
    fn extract_text(&self, path: &Path) -> Result<String, ExtractError> {
        (self.0)(path)
    }
}

fn touch(path: &Path) {
    fs::write(path, b"%PDF-1.4").unwrap();
}

#[tokio::test]
async fn three_file_scenario() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["a.pdf", "b.pdf", "c.pdf"] {
        touch(&dir.path().join(name));
    }

    let extractor: Arc<dyn TextExtractor> = Arc::new(FnExtractor(|path: &Path| {
        match path.file_name().and_then(|n| n.to_str()) {
            Some("a.pdf") => Ok("hello".to_string()),
            Some("b.pdf") => Err(ExtractError::new(
                ExtractErrorKind::Corrupted,
                "corrupt bytes",
            )),
            Some("c.pdf") => Ok("world".to_string()),
            other => panic!("unexpected file {other:?}"),
        }
    }));

    let report = extract_directory(
        dir.path(),
        extractor,
        BatchOptions {
            max_workers: 2,
            ..BatchOptions::default()
        },
        |_| {},
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 1);

    match report.outcome(dir.path().join("a.pdf")).unwrap() {
        ExtractionOutcome::Success { text, .. } => assert_eq!(text, "hello"),
        other => panic!("expected success for a.pdf, got {other:?}"),
    }
    assert_eq!(
        report
            .outcome(dir.path().join("b.pdf"))
            .unwrap()
            .error_kind(),
        Some(ExtractErrorKind::Corrupted)
    );
    match report.outcome(dir.path().join("c.pdf")).unwrap() {
        ExtractionOutcome::Success { text, .. } => assert_eq!(text, "world"),
        other => panic!("expected success for c.pdf, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_directory_yields_empty_report() {
    let dir = tempfile::tempdir().unwrap();

    let extractor: Arc<dyn TextExtractor> =
        Arc::new(FnExtractor(|_: &Path| Ok("unused".to_string())));
    let report = extract_directory(
        dir.path(),
        extractor,
        BatchOptions::default(),
        |_| {},
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert!(report.outcomes.is_empty());
    assert_eq!(report.total, 0);
    assert_eq!(report.succeeded, 0);
    assert_eq!(report.failed, 0);
}

#[tokio::test]
async fn report_covers_every_discovered_file() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..10 {
        touch(&dir.path().join(format!("doc{i}.pdf")));
    }
    // Distractors that must not appear in the report
    fs::write(dir.path().join("readme.txt"), b"not a pdf").unwrap();

    let extractor: Arc<dyn TextExtractor> =
        Arc::new(FnExtractor(|_: &Path| Ok("content".to_string())));
    let report = extract_directory(
        dir.path(),
        extractor,
        BatchOptions {
            max_workers: 4,
            ..BatchOptions::default()
        },
        |_| {},
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.outcomes.len(), 10);
    assert!(
        report
            .outcomes
            .keys()
            .all(|p| p.extension().is_some_and(|e| e == "pdf"))
    );
}

#[tokio::test]
async fn successful_text_is_whitespace_normalized() {
    let dir = tempfile::tempdir().unwrap();
    touch(&dir.path().join("a.pdf"));

    let extractor: Arc<dyn TextExtractor> =
        Arc::new(FnExtractor(|_: &Path| Ok("  hello\n\n  world \t".to_string())));
    let report = extract_directory(
        dir.path(),
        extractor,
        BatchOptions::default(),
        |_| {},
        CancellationToken::new(),
    )
    .await
    .unwrap();

    match report.outcome(dir.path().join("a.pdf")).unwrap() {
        ExtractionOutcome::Success { text, .. } => assert_eq!(text, "hello world"),
        other => panic!("expected success, got {other:?}"),
    }
}

struct TaggingExtractor;

impl TextExtractor for TaggingExtractor {
    fn extract_text(&self, _path: &Path) -> Result<String, ExtractError> {
        Ok("body".to_string())
    }

    fn metadata(&self, path: &Path) -> DocumentMetadata {
        DocumentMetadata {
            title: path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string),
            author: Some("an author".to_string()),
            created: None,
        }
    }
}

#[tokio::test]
async fn document_metadata_is_carried_into_the_report() {
    let dir = tempfile::tempdir().unwrap();
    touch(&dir.path().join("report.pdf"));

    let report = extract_directory(
        dir.path(),
        Arc::new(TaggingExtractor),
        BatchOptions::default(),
        |_| {},
        CancellationToken::new(),
    )
    .await
    .unwrap();

    match report.outcome(dir.path().join("report.pdf")).unwrap() {
        ExtractionOutcome::Success { metadata, .. } => {
            assert_eq!(metadata.title.as_deref(), Some("report"));
            assert_eq!(metadata.author.as_deref(), Some("an author"));
            assert_eq!(metadata.created, None);
        }
        other => panic!("expected success, got {other:?}"),
    }
}

#[tokio::test]
async fn progress_events_carry_the_same_text_as_the_report() {
    let dir = tempfile::tempdir().unwrap();
    touch(&dir.path().join("a.pdf"));

    let extractor: Arc<dyn TextExtractor> = Arc::new(FnExtractor(|_: &Path| {
        Ok("  caf\u{e9}   dirty \n text ".to_string())
    }));

    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let report = extract_directory(
        dir.path(),
        extractor,
        BatchOptions::default(),
        move |event| {
            if let ProgressEvent::Outcome { outcome, .. } = event {
                sink.lock().unwrap().push(*outcome);
            }
        },
        CancellationToken::new(),
    )
    .await
    .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(Some(&seen[0]), report.outcome(dir.path().join("a.pdf")));
    match &seen[0] {
        ExtractionOutcome::Success { text, .. } => assert_eq!(text, "caf dirty text"),
        other => panic!("expected success, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_input_directory_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");

    let extractor: Arc<dyn TextExtractor> =
        Arc::new(FnExtractor(|_: &Path| Ok("unused".to_string())));
    let err = extract_directory(
        &missing,
        extractor,
        BatchOptions::default(),
        |_| {},
        CancellationToken::new(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, BatchError::Discovery(_)));
}

#[tokio::test]
async fn cancelled_batch_accounts_for_every_file() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..5 {
        touch(&dir.path().join(format!("doc{i}.pdf")));
    }

    let cancel = CancellationToken::new();
    cancel.cancel();

    let extractor: Arc<dyn TextExtractor> =
        Arc::new(FnExtractor(|_: &Path| Ok("unused".to_string())));
    let report = extract_directory(
        dir.path(),
        extractor,
        BatchOptions::default(),
        |_| {},
        cancel,
    )
    .await
    .unwrap();

    assert_eq!(report.total, 5);
    assert_eq!(report.failed, 5);
    assert!(
        report
            .outcomes
            .values()
            .all(|o| o.error_kind() == Some(ExtractErrorKind::Cancelled))
    );
}

#[tokio::test]
async fn sequential_execution_is_behavior_equivalent() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["a.pdf", "b.pdf", "c.pdf"] {
        touch(&dir.path().join(name));
    }

    let make_extractor = || -> Arc<dyn TextExtractor> {
        Arc::new(FnExtractor(|path: &Path| {
            if path.file_name().is_some_and(|n| n == "b.pdf") {
                Err(ExtractError::new(ExtractErrorKind::Corrupted, "bad"))
            } else {
                Ok("ok".to_string())
            }
        }))
    };

    let sequential = extract_directory(
        dir.path(),
        make_extractor(),
        BatchOptions {
            max_workers: 1,
            ..BatchOptions::default()
        },
        |_| {},
        CancellationToken::new(),
    )
    .await
    .unwrap();

    let parallel = extract_directory(
        dir.path(),
        make_extractor(),
        BatchOptions {
            max_workers: 4,
            ..BatchOptions::default()
        },
        |_| {},
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(sequential, parallel);
}

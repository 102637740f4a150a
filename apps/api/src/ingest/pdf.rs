//! PDF text extraction, one page at a time.
//!
//! Parsing runs on the blocking pool; page progress flows back to the caller's
//! task over a channel so the sink is always invoked from the caller side.

use std::panic::{catch_unwind, AssertUnwindSafe};

use bytes::Bytes;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::ingest::error::IngestError;
use crate::ingest::progress::{ProgressReporter, PDF_OPENED};

/// Page-addressable text source. Pages are numbered from 1.
pub trait PageSource {
    fn page_count(&self) -> usize;
    fn page_text(&self, page: usize) -> Result<String, String>;
}

/// `lopdf`-backed source over an in-memory document.
pub struct LopdfSource {
    doc: lopdf::Document,
    pages: Vec<u32>,
}

impl LopdfSource {
    pub fn open(bytes: &[u8]) -> Result<Self, IngestError> {
        if bytes.is_empty() {
            return Err(IngestError::EmptyDocument);
        }

        let mut doc = lopdf::Document::load_mem(bytes).map_err(|e| classify_load_error(&e))?;

        if doc.is_encrypted() && doc.decrypt("").is_err() {
            return Err(IngestError::EncryptedDocument);
        }
        doc.decompress();

        let mut pages: Vec<u32> = doc.get_pages().keys().copied().collect();
        pages.sort_unstable();

        Ok(Self { doc, pages })
    }
}

impl PageSource for LopdfSource {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, page: usize) -> Result<String, String> {
        let number = self
            .pages
            .get(page.wrapping_sub(1))
            .copied()
            .ok_or_else(|| format!("page {page} out of range"))?;
        self.doc.extract_text(&[number]).map_err(|e| e.to_string())
    }
}

fn classify_load_error(err: &lopdf::Error) -> IngestError {
    let message = err.to_string();
    let lower = message.to_lowercase();
    if lower.contains("encrypt") || lower.contains("decrypt") || lower.contains("password") {
        IngestError::EncryptedDocument
    } else {
        IngestError::CorruptDocument(message)
    }
}

/// Collapses one page's raw text: blank items dropped, survivors joined by a
/// single space.
fn join_items(raw: &str) -> String {
    raw.lines()
        .map(|item| item.trim_end_matches('\r'))
        .filter(|item| !item.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Walks every page in order. A page that errors or panics is logged and
/// skipped; the rest of the document still counts.
pub fn extract_pages<S, F>(source: &S, mut on_page: F) -> Result<String, IngestError>
where
    S: PageSource + ?Sized,
    F: FnMut(usize, usize),
{
    let total = source.page_count();
    if total == 0 {
        return Err(IngestError::EmptyDocument);
    }

    let mut text = String::new();
    let mut skipped = 0usize;

    for page in 1..=total {
        match catch_unwind(AssertUnwindSafe(|| source.page_text(page))) {
            Ok(Ok(raw)) => {
                text.push_str(&join_items(&raw));
                text.push('\n');
            }
            Ok(Err(reason)) => {
                skipped += 1;
                warn!(page, %reason, "Skipping PDF page that failed to extract");
            }
            Err(_) => {
                skipped += 1;
                warn!(page, "Skipping PDF page whose extraction panicked");
            }
        }
        on_page(page, total);
    }

    debug!(pages = total, skipped, chars = text.len(), "PDF pages processed");

    if text.trim().is_empty() {
        return Err(IngestError::NoExtractableText);
    }
    Ok(text)
}

enum PdfEvent {
    Opened,
    Page { done: usize, total: usize },
}

/// Extracts the text of a PDF held in memory.
pub async fn extract_pdf(
    content: Bytes,
    progress: &mut ProgressReporter<'_>,
) -> Result<String, IngestError> {
    extract_on_worker(move || LopdfSource::open(&content), progress).await
}

async fn extract_on_worker<S, O>(
    open: O,
    progress: &mut ProgressReporter<'_>,
) -> Result<String, IngestError>
where
    S: PageSource,
    O: FnOnce() -> Result<S, IngestError> + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel();

    let worker = tokio::task::spawn_blocking(move || {
        let source = open()?;
        let _ = tx.send(PdfEvent::Opened);
        extract_pages(&source, |done, total| {
            let _ = tx.send(PdfEvent::Page { done, total });
        })
    });

    while let Some(event) = rx.recv().await {
        match event {
            PdfEvent::Opened => progress.report(PDF_OPENED),
            PdfEvent::Page { done, total } => progress.report_page(done, total),
        }
    }

    worker
        .await
        .map_err(|e| IngestError::WorkerUnavailable(format!("PDF worker failed: {e}")))?
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::error::ErrorClass;
    use fixtures::{password_protected_pdf, pdf_with_pages};

    enum FakePage {
        Text(&'static str),
        Fails,
        Panics,
    }

    struct FakeSource(Vec<FakePage>);

    impl PageSource for FakeSource {
        fn page_count(&self) -> usize {
            self.0.len()
        }

        fn page_text(&self, page: usize) -> Result<String, String> {
            match &self.0[page - 1] {
                FakePage::Text(t) => Ok(t.to_string()),
                FakePage::Fails => Err("bad content stream".to_string()),
                FakePage::Panics => panic!("malformed page"),
            }
        }
    }

    /// Page enumeration itself blows up, outside the per-page guard.
    struct UncountableSource;

    impl PageSource for UncountableSource {
        fn page_count(&self) -> usize {
            panic!("page tree is cyclic")
        }

        fn page_text(&self, _page: usize) -> Result<String, String> {
            Ok(String::new())
        }
    }

    #[test]
    fn test_join_items_drops_blank_items() {
        assert_eq!(join_items("Jane Doe\n   \nEngineer\r\n\n"), "Jane Doe Engineer");
        assert_eq!(join_items(""), "");
    }

    #[test]
    fn test_one_failing_page_does_not_lose_the_others() {
        let source = FakeSource(vec![
            FakePage::Text("Page one"),
            FakePage::Fails,
            FakePage::Text("Page three"),
        ]);
        let text = extract_pages(&source, |_, _| {}).unwrap();
        assert_eq!(text, "Page one\nPage three\n");
    }

    #[test]
    fn test_panicking_page_is_isolated() {
        let source = FakeSource(vec![FakePage::Panics, FakePage::Text("Survivor")]);
        let text = extract_pages(&source, |_, _| {}).unwrap();
        assert!(text.contains("Survivor"));
    }

    #[test]
    fn test_every_page_reports_progress() {
        let source = FakeSource(vec![
            FakePage::Text("a"),
            FakePage::Fails,
            FakePage::Text("c"),
        ]);
        let mut calls = Vec::new();
        extract_pages(&source, |done, total| calls.push((done, total))).unwrap();
        assert_eq!(calls, vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[test]
    fn test_zero_pages_is_empty_document() {
        let source = FakeSource(vec![]);
        assert_eq!(
            extract_pages(&source, |_, _| {}),
            Err(IngestError::EmptyDocument)
        );
    }

    #[test]
    fn test_whitespace_only_pages_yield_no_extractable_text() {
        let source = FakeSource(vec![FakePage::Text("  \n "), FakePage::Fails]);
        assert_eq!(
            extract_pages(&source, |_, _| {}),
            Err(IngestError::NoExtractableText)
        );
    }

    #[test]
    fn test_open_rejects_empty_and_garbage_bytes() {
        assert!(matches!(LopdfSource::open(b""), Err(IngestError::EmptyDocument)));
        assert!(matches!(
            LopdfSource::open(b"definitely not a pdf"),
            Err(IngestError::CorruptDocument(_))
        ));
    }

    #[test]
    fn test_password_protected_pdf_is_encrypted_document() {
        let bytes = password_protected_pdf();
        assert!(matches!(
            LopdfSource::open(&bytes),
            Err(IngestError::EncryptedDocument)
        ));
    }

    #[test]
    fn test_lopdf_source_reads_pages_in_order() {
        let bytes = pdf_with_pages(&[&["First page text"], &["Second page text"]]);
        let source = LopdfSource::open(&bytes).unwrap();
        assert_eq!(source.page_count(), 2);

        let text = extract_pages(&source, |_, _| {}).unwrap();
        let first = text.find("First").unwrap();
        let second = text.find("Second").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_page_out_of_range_is_an_error() {
        let bytes = pdf_with_pages(&[&["Only page"]]);
        let source = LopdfSource::open(&bytes).unwrap();
        assert!(source.page_text(0).is_err());
        assert!(source.page_text(2).is_err());
    }

    #[test]
    fn test_document_without_pages_is_empty() {
        let bytes = pdf_with_pages(&[]);
        let source = LopdfSource::open(&bytes).unwrap();
        assert_eq!(
            extract_pages(&source, |_, _| {}),
            Err(IngestError::EmptyDocument)
        );
    }

    #[test]
    fn test_graphics_only_pdf_has_no_extractable_text() {
        let bytes = pdf_with_pages(&[&[], &[]]);
        let source = LopdfSource::open(&bytes).unwrap();
        assert_eq!(
            extract_pages(&source, |_, _| {}),
            Err(IngestError::NoExtractableText)
        );
    }

    #[tokio::test]
    async fn test_extract_pdf_reports_open_then_pages() {
        let bytes = pdf_with_pages(&[&["Alpha"], &["Beta"]]);
        let mut seen = Vec::new();
        let mut sink = |p: f32| seen.push(p);
        let text = {
            let mut reporter = ProgressReporter::new(Some(&mut sink));
            extract_pdf(Bytes::from(bytes), &mut reporter).await.unwrap()
        };

        assert!(text.contains("Alpha"));
        assert!(text.contains("Beta"));
        assert_eq!(seen, vec![50.0, 70.0, 90.0]);
    }

    #[tokio::test]
    async fn test_extract_pdf_surfaces_typed_open_errors() {
        let mut reporter = ProgressReporter::silent();
        let err = extract_pdf(Bytes::from_static(b"definitely not a pdf"), &mut reporter)
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::CorruptDocument(_)));
        assert_eq!(reporter.last(), 0.0);
    }

    #[tokio::test]
    async fn test_crashed_worker_is_an_environment_error() {
        let mut reporter = ProgressReporter::silent();
        let err = extract_on_worker(|| Ok(UncountableSource), &mut reporter)
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::WorkerUnavailable(_)));
        assert_eq!(err.class(), ErrorClass::Environment);
        assert_eq!(reporter.last(), PDF_OPENED);
    }
}

//! Word document text extraction (`.docx`, and `.doc` when it is really OOXML).

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use bytes::Bytes;
use docx_rs::{
    DocumentChild, Docx, Paragraph, ParagraphChild, RunChild, Table, TableCellContent, TableChild,
    TableRowChild,
};
use tracing::debug;

use crate::ingest::error::IngestError;
use crate::ingest::progress::{ProgressReporter, WORD_READ};

/// OLE2 compound file signature used by the binary `.doc` format.
const OLE_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Reads the raw paragraph text out of a Word document. Paragraphs are
/// separated by a blank line.
pub fn read_word_text(bytes: &[u8]) -> Result<String, IngestError> {
    if bytes.is_empty() {
        return Err(IngestError::EmptyDocument);
    }
    if bytes.starts_with(&OLE_MAGIC) {
        return Err(IngestError::CorruptDocument(
            "legacy binary .doc files are not supported; save the file as .docx".to_string(),
        ));
    }

    let docx = open_docx(bytes)?;

    let mut paragraphs = Vec::new();
    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(p) => paragraphs.push(paragraph_text(p)),
            DocumentChild::Table(t) => collect_table(t, &mut paragraphs),
            _ => {}
        }
    }

    paragraphs.retain(|p| !p.trim().is_empty());
    debug!(paragraphs = paragraphs.len(), "Word document read");
    Ok(paragraphs.join("\n\n"))
}

/// The zip layer under `read_docx` panics on some damaged archives (bad
/// checksums, truncated entries); both failure paths mean a corrupt file.
fn open_docx(bytes: &[u8]) -> Result<Docx, IngestError> {
    match catch_unwind(AssertUnwindSafe(|| docx_rs::read_docx(bytes))) {
        Ok(Ok(docx)) => Ok(docx),
        Ok(Err(e)) => Err(IngestError::CorruptDocument(e.to_string())),
        Err(payload) => Err(IngestError::CorruptDocument(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "Word reader aborted".to_string()
    }
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut out = String::new();
    push_children(&paragraph.children, &mut out);
    out
}

fn push_children(children: &[ParagraphChild], out: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                for rc in &run.children {
                    match rc {
                        RunChild::Text(t) => out.push_str(&t.text),
                        RunChild::Tab(_) => out.push('\t'),
                        RunChild::Break(_) => out.push('\n'),
                        _ => {}
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => push_children(&link.children, out),
            _ => {}
        }
    }
}

#[allow(irrefutable_let_patterns)]
fn collect_table(table: &Table, paragraphs: &mut Vec<String>) {
    for row in &table.rows {
        let TableChild::TableRow(row) = row else { continue };
        for cell in &row.cells {
            let TableRowChild::TableCell(cell) = cell else { continue };
            for content in &cell.children {
                match content {
                    TableCellContent::Paragraph(p) => paragraphs.push(paragraph_text(p)),
                    TableCellContent::Table(t) => collect_table(t, paragraphs),
                    _ => {}
                }
            }
        }
    }
}

/// Extracts the text of a Word document held in memory.
pub async fn extract_word(
    content: Bytes,
    progress: &mut ProgressReporter<'_>,
) -> Result<String, IngestError> {
    let text = tokio::task::spawn_blocking(move || read_word_text(&content))
        .await
        .map_err(|e| IngestError::WorkerUnavailable(format!("Word reader failed: {e}")))??;
    progress.report(WORD_READ);
    Ok(text)
}

//! Text extraction: PDF → one string, pages joined by `\n`.
//!
//! Parsing goes through the [`DocumentReader`] trait so the pipeline can be
//! driven by a stub in tests. [`PdfiumReader`] is the real implementation;
//! pdfium is not async-safe, so callers run it inside `spawn_blocking`.
//!
//! A page whose text layer cannot be read contributes an empty string at its
//! position. A document that cannot be opened at all is a fatal error.

use crate::error::SemFitError;
use crate::output::DocumentMetadata;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info, warn};

/// Page texts and metadata of one opened document.
#[derive(Debug, Clone, Default)]
pub struct ExtractedDocument {
    /// Text of each page, in page order.
    pub pages: Vec<String>,
    pub metadata: DocumentMetadata,
}

impl ExtractedDocument {
    /// The full source text: every page in order, separated by a newline.
    pub fn source_text(&self) -> String {
        self.pages.join("\n")
    }
}

/// Opens a paginated document and returns its text.
pub trait DocumentReader: Send + Sync {
    fn read(&self, path: &Path, password: Option<&str>) -> Result<ExtractedDocument, SemFitError>;

    /// Metadata only. The default reads the whole document.
    fn read_metadata(
        &self,
        path: &Path,
        password: Option<&str>,
    ) -> Result<DocumentMetadata, SemFitError> {
        self.read(path, password).map(|doc| doc.metadata)
    }
}

/// First `max_chars` characters of `text` (not bytes).
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

// ── pdfium ───────────────────────────────────────────────────────────────

/// [`DocumentReader`] backed by the pdfium library.
///
/// Binds to `PDFIUM_LIB_PATH` when set, otherwise to the system library.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfiumReader;

impl PdfiumReader {
    fn bind() -> Result<Pdfium, SemFitError> {
        let lib_path = std::env::var("PDFIUM_LIB_PATH").ok();
        Self::bind_to(lib_path.as_deref())
    }

    /// Bind to the library at `lib_path`, or the system library when `None`
    /// or empty.
    fn bind_to(lib_path: Option<&str>) -> Result<Pdfium, SemFitError> {
        let bindings = match lib_path {
            Some(path) if !path.is_empty() => {
                debug!("Binding pdfium from {}", path);
                Pdfium::bind_to_library(path)
            }
            _ => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| SemFitError::PdfiumBindingFailed(format!("{:?}", e)))?;
        Ok(Pdfium::new(bindings))
    }
}

impl DocumentReader for PdfiumReader {
    fn read(&self, path: &Path, password: Option<&str>) -> Result<ExtractedDocument, SemFitError> {
        let pdfium = Self::bind()?;
        let document = open_document(&pdfium, path, password)?;

        let mut pages = Vec::new();
        for (idx, page) in document.pages().iter().enumerate() {
            let text = match page.text() {
                Ok(text) => text.all(),
                Err(e) => {
                    warn!("Page {}: no extractable text ({:?})", idx + 1, e);
                    String::new()
                }
            };
            debug!("Page {}: {} chars", idx + 1, text.chars().count());
            pages.push(text);
        }
        info!("PDF loaded: {} pages", pages.len());

        let metadata = collect_metadata(&document);
        Ok(ExtractedDocument { pages, metadata })
    }

    fn read_metadata(
        &self,
        path: &Path,
        password: Option<&str>,
    ) -> Result<DocumentMetadata, SemFitError> {
        let pdfium = Self::bind()?;
        let document = open_document(&pdfium, path, password)?;
        Ok(collect_metadata(&document))
    }
}

fn open_document<'a>(
    pdfium: &'a Pdfium,
    path: &Path,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, SemFitError> {
    pdfium.load_pdf_from_file(path, password).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                SemFitError::WrongPassword {
                    path: path.to_path_buf(),
                }
            } else {
                SemFitError::PasswordRequired {
                    path: path.to_path_buf(),
                }
            }
        } else {
            SemFitError::CorruptPdf {
                path: path.to_path_buf(),
                detail: err_str,
            }
        }
    })
}

fn collect_metadata(document: &PdfDocument<'_>) -> DocumentMetadata {
    let metadata = document.metadata();

    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata.get(tag).and_then(|t| {
            let v = t.value().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        })
    };

    DocumentMetadata {
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
        subject: get_meta(PdfDocumentMetadataTagType::Subject),
        creator: get_meta(PdfDocumentMetadataTagType::Creator),
        producer: get_meta(PdfDocumentMetadataTagType::Producer),
        page_count: document.pages().len() as usize,
        pdf_version: format!("{:?}", document.version()),
    }
}

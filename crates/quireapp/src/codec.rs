//! # Document Codec
//!
//! Converts a [`Document`] to and from its persisted bytes.
//!
//! ## Two-Phase Encoding
//!
//! Exporting a page's markup is asynchronous (it belongs to the rendering
//! toolkit), while laying out the document structure is not. Encoding is
//! therefore split:
//!
//! 1. [`MarkupCodec::export_all`] gathers one blob per page, concurrently,
//!    in page order.
//! 2. [`MarkupCodec::encode`] takes those blobs as a required argument and
//!    writes the structure synchronously. A blob count that does not match
//!    the page count is an [`QuireError::Encode`].
//!
//! [`MarkupCodec::encode_document`] runs both phases for callers that just
//! want bytes.
//!
//! ## Persisted Schema
//!
//! ```text
//! {
//!   "formatVersion": 1,
//!   "currentPageIndex": 0,
//!   "pages": [
//!     { "id": "<uuid>", "markupBlob": "<base64>", "background": { "type": "plain", ... } }
//!   ]
//! }
//! ```
//!
//! Decoding fails with [`QuireError::Decode`] on malformed JSON, a missing or
//! unknown field, an unknown background tag, an unsupported format version,
//! an empty page list, or a blob the markup format cannot import.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::background::Background;
use crate::error::{QuireError, Result};
use crate::markup::{BinaryMarkupFormat, MarkupFormat};
use crate::model::{Document, Page, PageId};

pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct DocumentRecord {
    format_version: u32,
    current_page_index: usize,
    pages: Vec<PageRecord>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct PageRecord {
    id: Uuid,
    markup_blob: String,
    background: Background,
}

pub struct MarkupCodec<F: MarkupFormat = BinaryMarkupFormat> {
    format: F,
}

impl Default for MarkupCodec<BinaryMarkupFormat> {
    fn default() -> Self {
        Self::new(BinaryMarkupFormat)
    }
}

impl<F: MarkupFormat> MarkupCodec<F> {
    pub fn new(format: F) -> Self {
        Self { format }
    }

    pub fn format(&self) -> &F {
        &self.format
    }

    /// Export every page's markup, preserving page order.
    pub async fn export_all(&self, document: &Document) -> Result<Vec<Vec<u8>>> {
        let exports = document
            .pages()
            .iter()
            .map(|page| self.format.export(&page.markup));
        try_join_all(exports).await
    }

    /// Write the document structure around precomputed, order-aligned blobs.
    pub fn encode(&self, document: &Document, blobs: &[Vec<u8>]) -> Result<Vec<u8>> {
        if blobs.len() != document.len() {
            return Err(QuireError::Encode {
                expected: document.len(),
                actual: blobs.len(),
            });
        }

        if let Some(index) = document.pages().iter().position(|p| !p.background.is_finite()) {
            return Err(QuireError::Invalid(format!(
                "page {index}: background has a non-finite value"
            )));
        }

        let pages = document
            .pages()
            .iter()
            .zip(blobs)
            .map(|(page, blob)| PageRecord {
                id: *page.id().as_uuid(),
                markup_blob: BASE64.encode(blob),
                background: page.background,
            })
            .collect();

        let record = DocumentRecord {
            format_version: FORMAT_VERSION,
            current_page_index: document.current_page_index(),
            pages,
        };

        serde_json::to_vec_pretty(&record)
            .map_err(|e| QuireError::Store(format!("failed to serialize document: {e}")))
    }

    pub async fn encode_document(&self, document: &Document) -> Result<Vec<u8>> {
        let blobs = self.export_all(document).await?;
        self.encode(document, &blobs)
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<Document> {
        let record: DocumentRecord =
            serde_json::from_slice(bytes).map_err(|e| QuireError::Decode(e.to_string()))?;

        if record.format_version != FORMAT_VERSION {
            return Err(QuireError::Decode(format!(
                "unsupported format version {}",
                record.format_version
            )));
        }

        let pages = record
            .pages
            .into_iter()
            .enumerate()
            .map(|(index, page)| {
                let blob = BASE64.decode(page.markup_blob.as_bytes()).map_err(|e| {
                    QuireError::Decode(format!("page {index}: bad markup blob encoding: {e}"))
                })?;
                let markup = self.format.import(&blob).map_err(|e| match e {
                    QuireError::Decode(msg) => QuireError::Decode(format!("page {index}: {msg}")),
                    other => other,
                })?;
                Ok(Page::with_id(
                    PageId::from_uuid(page.id),
                    markup,
                    page.background,
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        Document::from_pages(pages, record.current_page_index)
            .ok_or_else(|| QuireError::Decode("document has no pages".to_string()))
    }
}

//! # Markup Payloads
//!
//! A page's drawing content is owned by an external rendering toolkit. This
//! crate never looks inside it: a [`Markup`] is an opaque byte payload plus
//! the two things the editor core does need, its rectangular bounds and the
//! accumulated uniform content scale applied by resizes.
//!
//! Turning a markup into bytes is asynchronous in real toolkits, so the seam
//! is the [`MarkupFormat`] trait: `export` returns a future, `import` is
//! synchronous. [`BinaryMarkupFormat`] is the built-in implementation.
//!
//! ## Blob Layout (version 1)
//!
//! ```text
//! offset  size  field
//! 0       4     magic "QMK\0"
//! 4       1     version (1)
//! 5       8     bounds width   (f64, LE)
//! 13      8     bounds height  (f64, LE)
//! 21      8     content scale  (f64, LE)
//! 29      4     payload length (u32, LE)
//! 33      n     payload
//! ```

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::error::{QuireError, Result};
use crate::geometry::Size;

const BLOB_MAGIC: &[u8; 4] = b"QMK\0";
const BLOB_VERSION: u8 = 1;
const HEADER_LEN: usize = 4 + 1 + 8 + 8 + 8 + 4;

#[derive(Debug, Clone, PartialEq)]
pub struct Markup {
    bounds: Size,
    content_scale: f64,
    payload: Vec<u8>,
}

impl Markup {
    /// Empty markup covering `bounds`.
    pub fn new(bounds: Size) -> Self {
        Self {
            bounds,
            content_scale: 1.0,
            payload: Vec::new(),
        }
    }

    pub fn with_payload(bounds: Size, payload: Vec<u8>) -> Self {
        Self {
            bounds,
            content_scale: 1.0,
            payload,
        }
    }

    pub fn bounds(&self) -> Size {
        self.bounds
    }

    pub fn content_scale(&self) -> f64 {
        self.content_scale
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn set_payload(&mut self, payload: Vec<u8>) {
        self.payload = payload;
    }

    /// Content-preserving resize: scales everything drawn by `factor` and
    /// adopts `new_bounds`. The payload itself is untouched.
    /// A non-positive or non-finite factor, or empty bounds, leave the
    /// markup untouched.
    pub fn transform_content(&mut self, factor: f64, new_bounds: Size) {
        if !(factor.is_finite() && factor > 0.0) || new_bounds.aspect_ratio().is_none() {
            return;
        }
        self.content_scale *= factor;
        self.bounds = new_bounds;
    }
}

/// Bridge to the rendering toolkit's own serialization.
pub trait MarkupFormat: Send + Sync {
    /// Export one page's markup. May suspend.
    fn export(&self, markup: &Markup) -> BoxFuture<'static, Result<Vec<u8>>>;

    /// Rebuild a markup from a blob produced by [`MarkupFormat::export`].
    fn import(&self, blob: &[u8]) -> Result<Markup>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryMarkupFormat;

impl BinaryMarkupFormat {
    fn write_blob(markup: &Markup) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + markup.payload.len());
        out.extend_from_slice(BLOB_MAGIC);
        out.push(BLOB_VERSION);
        out.extend_from_slice(&markup.bounds.width.to_le_bytes());
        out.extend_from_slice(&markup.bounds.height.to_le_bytes());
        out.extend_from_slice(&markup.content_scale.to_le_bytes());
        out.extend_from_slice(&(markup.payload.len() as u32).to_le_bytes());
        out.extend_from_slice(&markup.payload);
        out
    }
}

impl MarkupFormat for BinaryMarkupFormat {
    fn export(&self, markup: &Markup) -> BoxFuture<'static, Result<Vec<u8>>> {
        if markup.payload.len() > u32::MAX as usize {
            let len = markup.payload.len();
            return async move {
                Err(QuireError::Store(format!(
                    "markup payload too large to export ({len} bytes)"
                )))
            }
            .boxed();
        }
        let markup = markup.clone();
        async move { Ok(Self::write_blob(&markup)) }.boxed()
    }

    fn import(&self, blob: &[u8]) -> Result<Markup> {
        if blob.len() < HEADER_LEN {
            return Err(QuireError::Decode(format!(
                "markup blob truncated: {} bytes, header needs {}",
                blob.len(),
                HEADER_LEN
            )));
        }
        if &blob[0..4] != BLOB_MAGIC {
            return Err(QuireError::Decode("markup blob has bad magic".to_string()));
        }
        if blob[4] != BLOB_VERSION {
            return Err(QuireError::Decode(format!(
                "unsupported markup blob version {}",
                blob[4]
            )));
        }

        let mut cursor = 5;
        let mut next_f64 = || {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(&blob[cursor..cursor + 8]);
            cursor += 8;
            f64::from_le_bytes(bytes)
        };
        let width = next_f64();
        let height = next_f64();
        let content_scale = next_f64();

        let mut len_bytes = [0u8; 4];
        len_bytes.copy_from_slice(&blob[29..33]);
        let len = u32::from_le_bytes(len_bytes) as usize;

        let payload = &blob[HEADER_LEN..];
        if payload.len() != len {
            return Err(QuireError::Decode(format!(
                "markup blob truncated: payload declares {} bytes, found {}",
                len,
                payload.len()
            )));
        }

        Ok(Markup {
            bounds: Size::new(width, height),
            content_scale,
            payload: payload.to_vec(),
        })
    }
}

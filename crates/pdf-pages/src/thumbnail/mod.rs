//! Page previews
//!
//! A [`ThumbnailProvider`] turns document bytes into one RGBA image per page,
//! in source page order. Rendering may fail as a whole; callers fall back to
//! numbered placeholders instead of blocking the tool.

#[cfg(feature = "pdfium")]
mod pdfium;

#[cfg(feature = "pdfium")]
pub use pdfium::{PdfiumThumbnails, init_pdfium};

use crate::progress::ProgressSink;
use crate::types::*;

/// Raw RGBA preview of a single page
#[derive(Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
}

impl std::fmt::Debug for Thumbnail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Thumbnail")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

pub trait ThumbnailProvider: Send + Sync + 'static {
    fn render(&self, bytes: &[u8], scale: f32, progress: &dyn ProgressSink)
    -> Result<Vec<Thumbnail>>;
}

/// Provider for builds without a renderer. Always fails, so every page is
/// shown as a placeholder.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoThumbnails;

impl ThumbnailProvider for NoThumbnails {
    fn render(
        &self,
        _bytes: &[u8],
        _scale: f32,
        _progress: &dyn ProgressSink,
    ) -> Result<Vec<Thumbnail>> {
        Err(PagesError::Thumbnail(
            "no page renderer available in this build".to_string(),
        ))
    }
}

/// The provider this build can offer: pdfium when compiled in, otherwise
/// placeholders only.
pub fn default_provider() -> std::sync::Arc<dyn ThumbnailProvider> {
    #[cfg(feature = "pdfium")]
    {
        std::sync::Arc::new(PdfiumThumbnails::default())
    }
    #[cfg(not(feature = "pdfium"))]
    {
        std::sync::Arc::new(NoThumbnails)
    }
}

/// What a rendered set belongs to: one load session at one scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThumbnailKey {
    pub document: u64,
    pub scale: f32,
}

/// Rendered previews for one document, looked up by original page index
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailSet {
    key: ThumbnailKey,
    images: Vec<Thumbnail>,
}

impl ThumbnailSet {
    pub fn new(key: ThumbnailKey, images: Vec<Thumbnail>) -> Self {
        Self { key, images }
    }

    pub fn key(&self) -> ThumbnailKey {
        self.key
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Preview for the page that was at `original_index` (1-based) in the
    /// source, wherever it sits in the grid now
    pub fn get(&self, original_index: u32) -> Option<&Thumbnail> {
        let slot = (original_index as usize).checked_sub(1)?;
        self.images.get(slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &Thumbnail)> {
        self.images
            .iter()
            .enumerate()
            .map(|(i, thumb)| (i as u32 + 1, thumb))
    }
}

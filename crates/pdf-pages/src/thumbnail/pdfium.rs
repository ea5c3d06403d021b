use pdfium_render::prelude::*;

use super::{Thumbnail, ThumbnailProvider};
use crate::progress::{Progress, ProgressSink};
use crate::types::*;

/// Initialize Pdfium, trying the vendored library first, then falling back to system
pub fn init_pdfium() -> std::result::Result<Pdfium, PdfiumError> {
    // When running from cargo, the working directory is the workspace root
    let vendor_path = std::env::current_dir().ok().and_then(|mut p| {
        p.push("vendor/pdfium/lib");
        if p.exists() { Some(p) } else { None }
    });

    if let Some(vendor_path) = vendor_path {
        if let Ok(binding) =
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&vendor_path))
        {
            return Ok(Pdfium::new(binding));
        }
    }

    Pdfium::bind_to_system_library().map(Pdfium::new)
}

/// Renders previews with pdfium
#[derive(Debug, Clone, Default)]
pub struct PdfiumThumbnails;

impl ThumbnailProvider for PdfiumThumbnails {
    fn render(
        &self,
        bytes: &[u8],
        scale: f32,
        progress: &dyn ProgressSink,
    ) -> Result<Vec<Thumbnail>> {
        let failed = |e: PdfiumError| PagesError::Thumbnail(e.to_string());

        let pdfium = init_pdfium().map_err(failed)?;
        let document = pdfium.load_pdf_from_byte_slice(bytes, None).map_err(failed)?;
        let pages = document.pages();
        let total = pages.len() as usize;
        let config = PdfRenderConfig::new().scale_page_by_factor(scale);

        let mut thumbnails = Vec::with_capacity(total);
        for (index, page) in pages.iter().enumerate() {
            progress.report(Progress::new(
                index + 1,
                total,
                format!("Rendering page {}...", index + 1),
            ));
            let bitmap = page.render_with_config(&config).map_err(failed)?;
            thumbnails.push(Thumbnail {
                width: bitmap.width() as usize,
                height: bitmap.height() as usize,
                rgba: bitmap.as_rgba_bytes().to_vec(),
            });
        }

        log::debug!("Rendered {} thumbnails at scale {}", thumbnails.len(), scale);
        Ok(thumbnails)
    }
}

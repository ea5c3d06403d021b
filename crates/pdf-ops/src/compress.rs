use crate::document::{load, save};
use crate::options::CompressionLevel;
use crate::types::*;
use lopdf::{Document, ObjectId};
use pdf_pages::{Progress, SharedProgress, output_file_name};

/// Size before and after compression
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompressionReport {
    pub original_size: usize,
    pub compressed_size: usize,
    /// Negative when the rewritten file came out larger
    pub savings_percent: f64,
}

impl CompressionReport {
    pub fn new(original_size: usize, compressed_size: usize) -> Self {
        let savings_percent = if original_size == 0 {
            0.0
        } else {
            let raw = (original_size as f64 - compressed_size as f64) / original_size as f64 * 100.0;
            (raw * 10.0).round() / 10.0
        };
        Self {
            original_size,
            compressed_size,
            savings_percent,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompressedOutput {
    pub output: NamedOutput,
    pub report: CompressionReport,
}

pub async fn compress(
    source: SourceFile,
    level: CompressionLevel,
    progress: SharedProgress,
) -> Result<CompressedOutput> {
    tokio::task::spawn_blocking(move || compress_sync(&source, level, progress)).await?
}

fn compress_sync(
    source: &SourceFile,
    level: CompressionLevel,
    progress: SharedProgress,
) -> Result<CompressedOutput> {
    progress.report(Progress::new(1, 2, "Loading PDF..."));
    let mut doc = load(&source.bytes)?;

    progress.report(Progress::new(2, 2, "Compressing..."));
    match level {
        CompressionLevel::Low => {}
        CompressionLevel::Medium => {
            doc.prune_objects();
            doc.compress();
        }
        CompressionLevel::High => {
            strip_editor_data(&mut doc)?;
            doc.prune_objects();
            doc.delete_zero_length_streams();
            doc.renumber_objects();
            doc.compress();
        }
    }
    let bytes = save(&mut doc)?;

    let report = CompressionReport::new(source.size(), bytes.len());
    log::info!(
        "Compressed {} at level {level}: {} -> {} bytes ({}%)",
        source.name,
        report.original_size,
        report.compressed_size,
        report.savings_percent
    );

    Ok(CompressedOutput {
        output: NamedOutput::new(output_file_name(&source.name, "_compressed"), bytes),
        report,
    })
}

/// Drop XMP metadata, application private data and embedded page thumbnails
fn strip_editor_data(doc: &mut Document) -> Result<()> {
    let catalog_id = doc.trailer.get(b"Root")?.as_reference()?;
    let catalog = doc.get_dictionary_mut(catalog_id)?;
    catalog.remove(b"Metadata");
    catalog.remove(b"PieceInfo");

    let page_ids: Vec<ObjectId> = doc.get_pages().values().copied().collect();
    for page_id in page_ids {
        let page = doc.get_dictionary_mut(page_id)?;
        page.remove(b"PieceInfo");
        page.remove(b"Thumb");
        page.remove(b"Metadata");
    }
    Ok(())
}

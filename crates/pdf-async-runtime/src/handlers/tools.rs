//! Batch tools: read inputs, run one operation, write the results

use std::path::{Path, PathBuf};
use std::sync::Arc;

use pdf_ops::{
    CompressionLevel, ImageExportOptions, NamedOutput, OpsError, Result, WatermarkOptions,
    add_watermark, base_name, compress, constants::SPLIT_ARCHIVE_NAME, images_to_pdf, merge,
    pdf_to_images, read_source, read_sources, rotate_all, split_pages, split_ranges,
    write_output, zip_outputs,
};
use pdf_pages::{LopdfCodec, ThumbnailProvider};
use tokio::sync::mpsc;

use super::{progress_sender, send_error};
use crate::{PdfUpdate, SplitMode, Tool};

async fn write_all(outputs: &[NamedOutput], dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::with_capacity(outputs.len());
    for output in outputs {
        paths.push(write_output(output, dir).await?);
    }
    Ok(paths)
}

fn report(
    tool: Tool,
    result: Result<(Vec<PathBuf>, String)>,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
) {
    match result {
        Ok((paths, summary)) => {
            log::info!("{}: {summary}", tool.title());
            let _ = update_tx.send(PdfUpdate::Completed {
                tool,
                paths,
                summary,
            });
        }
        Err(e) => send_error(Some(tool), format!("{} failed: {e}", tool.title()), update_tx),
    }
}

pub async fn handle_merge(
    codec: Arc<LopdfCodec>,
    inputs: Vec<PathBuf>,
    output_dir: PathBuf,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
) {
    let progress = progress_sender(Tool::Merge, update_tx);
    let result = async {
        let sources = read_sources(&inputs).await?;
        let count = sources.len();
        let merged = merge(codec, sources, progress).await?;
        let paths = write_all(std::slice::from_ref(&merged), &output_dir).await?;
        Ok::<_, OpsError>((paths, format!("Merged {count} PDFs into {}", merged.name)))
    }
    .await;
    report(Tool::Merge, result, update_tx);
}

pub async fn handle_split(
    codec: Arc<LopdfCodec>,
    input: PathBuf,
    mode: SplitMode,
    zip: bool,
    output_dir: PathBuf,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
) {
    let progress = progress_sender(Tool::Split, update_tx);
    let result = async {
        let source = read_source(&input).await?;
        let outputs = match mode {
            SplitMode::EveryPage => split_pages(codec, source, progress.clone()).await?,
            SplitMode::Ranges(ranges) => {
                split_ranges(codec, source, ranges, progress.clone()).await?
            }
        };
        let count = outputs.len();
        let outputs = if zip {
            vec![zip_outputs(outputs, SPLIT_ARCHIVE_NAME.to_string(), progress).await?]
        } else {
            outputs
        };
        let paths = write_all(&outputs, &output_dir).await?;
        Ok::<_, OpsError>((paths, format!("Split into {count} files")))
    }
    .await;
    report(Tool::Split, result, update_tx);
}

pub async fn handle_rotate(
    input: PathBuf,
    degrees: i32,
    output_dir: PathBuf,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
) {
    let progress = progress_sender(Tool::Rotate, update_tx);
    let result = async {
        let source = read_source(&input).await?;
        let rotated = rotate_all(source, degrees, progress).await?;
        let paths = write_all(std::slice::from_ref(&rotated), &output_dir).await?;
        Ok::<_, OpsError>((paths, format!("Rotated all pages by {degrees} degrees")))
    }
    .await;
    report(Tool::Rotate, result, update_tx);
}

pub async fn handle_watermark(
    input: PathBuf,
    text: String,
    options: WatermarkOptions,
    output_dir: PathBuf,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
) {
    let progress = progress_sender(Tool::Watermark, update_tx);
    let result = async {
        let source = read_source(&input).await?;
        let marked = add_watermark(source, text, options, progress).await?;
        let paths = write_all(std::slice::from_ref(&marked), &output_dir).await?;
        Ok::<_, OpsError>((paths, format!("Watermark added to {}", marked.name)))
    }
    .await;
    report(Tool::Watermark, result, update_tx);
}

pub async fn handle_compress(
    input: PathBuf,
    level: CompressionLevel,
    output_dir: PathBuf,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
) {
    let progress = progress_sender(Tool::Compress, update_tx);
    let result = async {
        let source = read_source(&input).await?;
        let compressed = compress(source, level, progress).await?;
        let path = write_output(&compressed.output, &output_dir).await?;
        Ok::<_, OpsError>((path, compressed.report))
    }
    .await;

    match result {
        Ok((path, report)) => {
            log::info!(
                "Compressed {} at {level} level, saved {}%",
                path.display(),
                report.savings_percent
            );
            let _ = update_tx.send(PdfUpdate::Compressed { path, report });
        }
        Err(e) => send_error(
            Some(Tool::Compress),
            format!("Compression failed: {e}"),
            update_tx,
        ),
    }
}

pub async fn handle_images_to_pdf(
    inputs: Vec<PathBuf>,
    output_dir: PathBuf,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
) {
    let progress = progress_sender(Tool::ImagesToPdf, update_tx);
    let result = async {
        let images = read_sources(&inputs).await?;
        let count = images.len();
        let pdf = images_to_pdf(images, progress).await?;
        let paths = write_all(std::slice::from_ref(&pdf), &output_dir).await?;
        Ok::<_, OpsError>((paths, format!("Converted {count} images to PDF")))
    }
    .await;
    report(Tool::ImagesToPdf, result, update_tx);
}

pub async fn handle_pdf_to_images(
    provider: Arc<dyn ThumbnailProvider>,
    input: PathBuf,
    options: ImageExportOptions,
    output_dir: PathBuf,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
) {
    let progress = progress_sender(Tool::PdfToImages, update_tx);
    let result = async {
        let source = read_source(&input).await?;
        let archive_name = format!("{}_images.zip", base_name(&source.name));
        let images = pdf_to_images(provider, source, options, progress.clone()).await?;
        let count = images.len();
        let archive = zip_outputs(images, archive_name, progress).await?;
        let paths = write_all(std::slice::from_ref(&archive), &output_dir).await?;
        Ok::<_, OpsError>((paths, format!("Exported {count} pages as images")))
    }
    .await;
    report(Tool::PdfToImages, result, update_tx);
}

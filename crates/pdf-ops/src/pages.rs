//! Tools that rebuild a document from whole pages: merge, split, extract,
//! remove. All of them go through the [`DocumentCodec`] seam.

use std::sync::Arc;

use crate::constants::MERGED_FILE_NAME;
use crate::types::*;
use pdf_pages::{
    CommitPlan, DocumentCodec, PageRange, Progress, SharedProgress, assemble, base_name,
    output_file_name,
};

/// Concatenate every page of every source, in the order given
pub async fn merge<C: DocumentCodec>(
    codec: Arc<C>,
    sources: Vec<SourceFile>,
    progress: SharedProgress,
) -> Result<NamedOutput> {
    tokio::task::spawn_blocking(move || merge_sync(codec.as_ref(), &sources, progress)).await?
}

fn merge_sync<C: DocumentCodec>(
    codec: &C,
    sources: &[SourceFile],
    progress: SharedProgress,
) -> Result<NamedOutput> {
    if sources.len() < 2 {
        return Err(OpsError::Config(
            "Select at least two PDF files to merge".to_string(),
        ));
    }

    let mut merged = codec.create_document()?;
    let mut page_total = 0;
    for (i, source) in sources.iter().enumerate() {
        progress.report(Progress::new(
            i + 1,
            sources.len(),
            format!("Processing {}...", source.name),
        ));
        let document = codec.load_document(&source.bytes)?;
        let all: Vec<u32> = (1..=codec.page_count(&document) as u32).collect();
        for page in codec.copy_pages(&mut merged, &document, &all)? {
            codec.add_page(&mut merged, page)?;
        }
        page_total += all.len();
    }

    if page_total == 0 {
        return Err(pdf_pages::PagesError::NoPages.into());
    }

    let bytes = codec.serialize(&mut merged)?;
    log::info!("Merged {} files into {page_total} pages", sources.len());
    Ok(NamedOutput::new(MERGED_FILE_NAME, bytes))
}

/// One output per inclusive range. Pages past the end of the document are
/// dropped; a range left with no pages is an error.
pub async fn split_ranges<C: DocumentCodec>(
    codec: Arc<C>,
    source: SourceFile,
    ranges: Vec<PageRange>,
    progress: SharedProgress,
) -> Result<Vec<NamedOutput>> {
    tokio::task::spawn_blocking(move || {
        split_ranges_sync(codec.as_ref(), &source, &ranges, progress)
    })
    .await?
}

fn split_ranges_sync<C: DocumentCodec>(
    codec: &C,
    source: &SourceFile,
    ranges: &[PageRange],
    progress: SharedProgress,
) -> Result<Vec<NamedOutput>> {
    if ranges.is_empty() {
        return Err(OpsError::InvalidRange("No ranges given".to_string()));
    }

    let document = codec.load_document(&source.bytes)?;
    let page_count = codec.page_count(&document);
    let base = base_name(&source.name);

    let mut outputs = Vec::with_capacity(ranges.len());
    for (i, range) in ranges.iter().enumerate() {
        progress.report(Progress::new(
            i + 1,
            ranges.len(),
            format!("Creating split {}...", i + 1),
        ));
        let plan = range.clamp_to(page_count);
        if plan.is_empty() {
            return Err(OpsError::InvalidRange(format!(
                "{}-{} has no pages in a {page_count}-page document",
                range.start, range.end
            )));
        }
        let bytes = assemble(codec, &document, plan.pages())?;
        outputs.push(NamedOutput::new(
            format!("{base}_pages_{}-{}.pdf", range.start, range.end),
            bytes,
        ));
    }
    Ok(outputs)
}

/// One single-page document per source page
pub async fn split_pages<C: DocumentCodec>(
    codec: Arc<C>,
    source: SourceFile,
    progress: SharedProgress,
) -> Result<Vec<NamedOutput>> {
    tokio::task::spawn_blocking(move || split_pages_sync(codec.as_ref(), &source, progress))
        .await?
}

fn split_pages_sync<C: DocumentCodec>(
    codec: &C,
    source: &SourceFile,
    progress: SharedProgress,
) -> Result<Vec<NamedOutput>> {
    let document = codec.load_document(&source.bytes)?;
    let page_count = codec.page_count(&document);
    let base = base_name(&source.name);

    (1..=page_count as u32)
        .map(|page| {
            progress.report(Progress::new(
                page as usize,
                page_count,
                format!("Extracting page {page}..."),
            ));
            let bytes = assemble(codec, &document, &[page])?;
            Ok(NamedOutput::new(format!("{base}_page_{page}.pdf"), bytes))
        })
        .collect()
}

/// Keep `page_numbers` (1-based) in the order given. Numbers outside the
/// document are ignored.
pub async fn extract_pages<C: DocumentCodec>(
    codec: Arc<C>,
    source: SourceFile,
    page_numbers: Vec<u32>,
    progress: SharedProgress,
) -> Result<NamedOutput> {
    tokio::task::spawn_blocking(move || {
        progress.report(Progress::new(1, 1, "Extracting pages..."));
        let document = codec.load_document(&source.bytes)?;
        let plan = CommitPlan::from_page_numbers(&page_numbers, codec.page_count(&document));
        build_from_plan(codec.as_ref(), &document, &plan, &source.name, "_extracted")
    })
    .await?
}

/// Drop `page_numbers` (1-based) and keep the rest in source order
pub async fn remove_pages<C: DocumentCodec>(
    codec: Arc<C>,
    source: SourceFile,
    page_numbers: Vec<u32>,
    progress: SharedProgress,
) -> Result<NamedOutput> {
    tokio::task::spawn_blocking(move || {
        progress.report(Progress::new(1, 1, "Removing pages..."));
        let document = codec.load_document(&source.bytes)?;
        let plan = CommitPlan::keeping_all_except(&page_numbers, codec.page_count(&document));
        build_from_plan(codec.as_ref(), &document, &plan, &source.name, "_edited")
    })
    .await?
}

fn build_from_plan<C: DocumentCodec>(
    codec: &C,
    document: &C::Document,
    plan: &CommitPlan,
    input_name: &str,
    suffix: &str,
) -> Result<NamedOutput> {
    plan.ensure_not_empty()?;
    let bytes = assemble(codec, document, plan.pages())?;
    log::info!("Built {} pages {plan} from {input_name}", plan.len());
    Ok(NamedOutput::new(output_file_name(input_name, suffix), bytes))
}

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use pdf_async_runtime::ToolkitConfig;
use pdf_ops::{
    CompressionLevel, NamedOutput, SourceFile, WatermarkOptions, constants::SPLIT_ARCHIVE_NAME,
    format_file_size, output_file_name,
};
use pdf_pages::{
    LopdfCodec, NoThumbnails, PageController, PageId, PageRange, PageSelection, Progress,
    SharedProgress, ToolKind, ToolSession,
};

#[derive(Parser)]
#[command(name = "pdft", about = "PDF tools CLI", version)]
struct Cli {
    /// JSON settings file (see `ToolkitConfig`)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for output files (defaults to the input's folder)
    #[arg(short, long, global = true)]
    output_dir: Option<PathBuf>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show page count and metadata
    Info {
        input: PathBuf,
    },

    /// Keep only the listed pages, in the order listed
    Extract {
        input: PathBuf,

        /// Pages to keep, e.g. "3,1-2"
        #[arg(short, long)]
        pages: PageSelection,
    },

    /// Drop the listed pages
    Remove {
        input: PathBuf,

        /// Pages to drop, e.g. "2,4-5"
        #[arg(short, long)]
        pages: PageSelection,
    },

    /// Put pages in a new order; unlisted pages are left out
    Reorder {
        input: PathBuf,

        /// New page order, e.g. "3,1,2"
        #[arg(long)]
        order: PageSelection,
    },

    /// Combine PDF files into merged.pdf
    Merge {
        #[arg(required = true, num_args = 2..)]
        inputs: Vec<PathBuf>,
    },

    /// Split into one file per page or per range
    Split {
        input: PathBuf,

        /// Comma-separated inclusive ranges, e.g. "1-3,4-6"
        #[arg(long, value_delimiter = ',')]
        ranges: Vec<PageRange>,

        /// Package the pieces as a single zip archive
        #[arg(long)]
        zip: bool,
    },

    /// Rotate every page
    Rotate {
        input: PathBuf,

        /// Multiple of 90; negative turns counter-clockwise
        #[arg(long, allow_hyphen_values = true)]
        degrees: Option<i32>,
    },

    /// Stamp diagonal text on every page
    Watermark {
        input: PathBuf,

        #[arg(long)]
        text: Option<String>,

        #[arg(long)]
        font_size: Option<f32>,

        /// Fill opacity, 0.0 to 1.0
        #[arg(long)]
        opacity: Option<f32>,
    },

    /// Rewrite the file to make it smaller
    Compress {
        input: PathBuf,

        #[arg(long, value_enum)]
        level: Option<LevelArg>,
    },

    /// Build a PDF with one page per image
    ImagesToPdf {
        #[arg(required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,
    },

    /// Render every page to an image, packaged as a zip archive
    #[cfg(feature = "render")]
    PdfToImages {
        input: PathBuf,

        #[arg(long, value_enum)]
        format: Option<FormatArg>,

        /// Render scale (1.0 = 72 dpi)
        #[arg(long)]
        scale: Option<f32>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum LevelArg {
    Low,
    Medium,
    High,
}

impl From<LevelArg> for CompressionLevel {
    fn from(arg: LevelArg) -> Self {
        match arg {
            LevelArg::Low => Self::Low,
            LevelArg::Medium => Self::Medium,
            LevelArg::High => Self::High,
        }
    }
}

#[cfg(feature = "render")]
#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Png,
    Jpeg,
}

#[cfg(feature = "render")]
impl From<FormatArg> for pdf_ops::ImageFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Png => Self::Png,
            FormatArg::Jpeg => Self::Jpeg,
        }
    }
}

fn log_progress() -> SharedProgress {
    Arc::new(|progress: Progress| {
        log::info!(
            "[{}/{}] {}",
            progress.current,
            progress.total,
            progress.message
        );
    })
}

async fn write_outputs(outputs: &[NamedOutput], dir: &Path) -> Result<()> {
    for output in outputs {
        let path = pdf_ops::write_output(output, dir).await?;
        println!(
            "  {} ({})",
            path.display(),
            format_file_size(output.bytes.len() as u64)
        );
    }
    Ok(())
}

/// Drive a page session to put `order` first and leave the rest out
async fn reorder(
    source: SourceFile,
    order: &PageSelection,
    config: &ToolkitConfig,
) -> Result<NamedOutput> {
    let controller = PageController::new(LopdfCodec, Arc::new(NoThumbnails));
    let mut session = ToolSession::new(ToolKind::ExtractPages);
    let name = source.name.clone();
    controller
        .run_load(
            &mut session,
            name.as_str(),
            source.bytes,
            config.thumbnail_scale(ToolKind::ExtractPages),
            log_progress(),
        )
        .await?;

    let order = order.resolve(session.counts().total())?;
    let mut seen = Vec::with_capacity(order.len());
    for (target, &page) in order.iter().enumerate() {
        if seen.contains(&page) {
            bail!("Page {page} is listed twice");
        }
        seen.push(page);
        let position = session
            .registry()
            .and_then(|registry| registry.position_of(PageId(page)))
            .with_context(|| format!("Page {page} is not in {name}"))?;
        session.reorder(position, target)?;
    }

    let unlisted: Vec<PageId> = session
        .registry()
        .map(|registry| {
            registry.pages()[seen.len()..]
                .iter()
                .map(|page| page.id)
                .collect()
        })
        .unwrap_or_default();
    for id in unlisted {
        session.set_included(id, false)?;
    }

    let output = controller
        .run_commit(&mut session, log_progress().as_ref())
        .await?;
    Ok(NamedOutput::new(
        output_file_name(&name, "_reordered"),
        output.bytes,
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut config = match &cli.config {
        Some(path) => ToolkitConfig::load(path)
            .await
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ToolkitConfig::default(),
    };
    if cli.output_dir.is_some() {
        config.output_dir = cli.output_dir.clone();
    }

    let codec = Arc::new(LopdfCodec);

    match cli.command {
        Commands::Info { input } => {
            let source = pdf_ops::read_source(&input).await?;
            let info = pdf_ops::document_info(&source).await?;
            println!("{}", info.name);
            println!("  Pages: {}", info.page_count);
            println!("  Size: {}", format_file_size(info.size as u64));
            println!("  PDF version: {}", info.version);
            if let Some(title) = &info.title {
                println!("  Title: {title}");
            }
            if let Some(author) = &info.author {
                println!("  Author: {author}");
            }
            if let Some(producer) = &info.producer {
                println!("  Producer: {producer}");
            }
            if info.encrypted {
                println!("  Encrypted: yes");
            }
        }

        Commands::Extract { input, pages } => {
            let source = pdf_ops::read_source(&input).await?;
            let selected = pages.resolve(pdf_ops::document_info(&source).await?.page_count)?;
            let output =
                pdf_ops::extract_pages(codec, source, selected, log_progress()).await?;
            println!("Extracted pages {pages}:");
            write_outputs(&[output], &config.output_dir_for(&input)).await?;
        }

        Commands::Remove { input, pages } => {
            let source = pdf_ops::read_source(&input).await?;
            let removed = pages.resolve(pdf_ops::document_info(&source).await?.page_count)?;
            let removed_count = removed.len();
            let output = pdf_ops::remove_pages(codec, source, removed, log_progress()).await?;
            println!("Removed {removed_count} pages:");
            write_outputs(&[output], &config.output_dir_for(&input)).await?;
        }

        Commands::Reorder { input, order } => {
            let source = pdf_ops::read_source(&input).await?;
            let output = reorder(source, &order, &config).await?;
            println!("Reordered pages:");
            write_outputs(&[output], &config.output_dir_for(&input)).await?;
        }

        Commands::Merge { inputs } => {
            let sources = pdf_ops::read_sources(&inputs).await?;
            let count = sources.len();
            let output = pdf_ops::merge(codec, sources, log_progress()).await?;
            println!("Merged {count} files:");
            write_outputs(&[output], &config.output_dir_for(&inputs[0])).await?;
        }

        Commands::Split { input, ranges, zip } => {
            let source = pdf_ops::read_source(&input).await?;
            let outputs = if ranges.is_empty() {
                pdf_ops::split_pages(codec, source, log_progress()).await?
            } else {
                pdf_ops::split_ranges(codec, source, ranges, log_progress()).await?
            };
            println!("Split into {} files:", outputs.len());
            let outputs = if zip {
                vec![
                    pdf_ops::zip_outputs(outputs, SPLIT_ARCHIVE_NAME.to_string(), log_progress())
                        .await?,
                ]
            } else {
                outputs
            };
            write_outputs(&outputs, &config.output_dir_for(&input)).await?;
        }

        Commands::Rotate { input, degrees } => {
            let degrees = degrees.unwrap_or(config.rotation_degrees);
            let source = pdf_ops::read_source(&input).await?;
            let output = pdf_ops::rotate_all(source, degrees, log_progress()).await?;
            println!("Rotated by {degrees} degrees:");
            write_outputs(&[output], &config.output_dir_for(&input)).await?;
        }

        Commands::Watermark {
            input,
            text,
            font_size,
            opacity,
        } => {
            let options = WatermarkOptions {
                font_size: font_size.unwrap_or(config.watermark.font_size),
                opacity: opacity.unwrap_or(config.watermark.opacity),
                ..config.watermark.clone()
            };
            let text = text.unwrap_or_else(|| config.watermark_text.clone());
            let source = pdf_ops::read_source(&input).await?;
            let output = pdf_ops::add_watermark(source, text, options, log_progress()).await?;
            println!("Watermarked:");
            write_outputs(&[output], &config.output_dir_for(&input)).await?;
        }

        Commands::Compress { input, level } => {
            let level = level.map(CompressionLevel::from).unwrap_or(config.compression);
            let source = pdf_ops::read_source(&input).await?;
            let compressed = pdf_ops::compress(source, level, log_progress()).await?;
            let report = compressed.report;
            println!(
                "Compressed ({level}): {} -> {} ({}% smaller)",
                format_file_size(report.original_size as u64),
                format_file_size(report.compressed_size as u64),
                report.savings_percent
            );
            write_outputs(&[compressed.output], &config.output_dir_for(&input)).await?;
        }

        Commands::ImagesToPdf { inputs } => {
            let images = pdf_ops::read_sources(&inputs).await?;
            let count = images.len();
            let output = pdf_ops::images_to_pdf(images, log_progress()).await?;
            println!("Converted {count} images:");
            write_outputs(&[output], &config.output_dir_for(&inputs[0])).await?;
        }

        #[cfg(feature = "render")]
        Commands::PdfToImages {
            input,
            format,
            scale,
        } => {
            let options = pdf_ops::ImageExportOptions {
                format: format.map(Into::into).unwrap_or(config.image_export.format),
                scale: scale.unwrap_or(config.image_export.scale),
            };
            let source = pdf_ops::read_source(&input).await?;
            let archive_name = format!("{}_images.zip", pdf_ops::base_name(&source.name));
            let images = pdf_ops::pdf_to_images(
                pdf_pages::thumbnail::default_provider(),
                source,
                options,
                log_progress(),
            )
            .await?;
            println!("Rendered {} pages:", images.len());
            let archive = pdf_ops::zip_outputs(images, archive_name, log_progress()).await?;
            write_outputs(&[archive], &config.output_dir_for(&input)).await?;
        }
    }

    Ok(())
}

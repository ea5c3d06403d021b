use std::path::PathBuf;

mod config;
mod handlers;
mod worker;

pub use config::ToolkitConfig;
pub use worker::worker_task;

// Re-export types from library crates
pub use pdf_ops::{
    CompressionLevel, CompressionReport, ImageExportOptions, ImageFormat, PdfInfo,
    WatermarkOptions,
};
pub use pdf_pages::{
    CommitRequest, CommitTicket, LoadTicket, LoadedDocument, PageRange, ToolKind,
};

/// Every tool the front ends offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tool {
    #[default]
    ExtractPages,
    RemovePages,
    Merge,
    Split,
    Rotate,
    Watermark,
    Compress,
    ImagesToPdf,
    PdfToImages,
}

impl Tool {
    pub const ALL: [Tool; 9] = [
        Tool::ExtractPages,
        Tool::RemovePages,
        Tool::Merge,
        Tool::Split,
        Tool::Rotate,
        Tool::Watermark,
        Tool::Compress,
        Tool::ImagesToPdf,
        Tool::PdfToImages,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Tool::ExtractPages => "Extract Pages",
            Tool::RemovePages => "Remove Pages",
            Tool::Merge => "Merge PDF",
            Tool::Split => "Split PDF",
            Tool::Rotate => "Rotate PDF",
            Tool::Watermark => "Add Watermark",
            Tool::Compress => "Compress PDF",
            Tool::ImagesToPdf => "Images to PDF",
            Tool::PdfToImages => "PDF to Images",
        }
    }

    /// The page-grid session behind this tool, if it has one
    pub fn page_tool(&self) -> Option<ToolKind> {
        match self {
            Tool::ExtractPages => Some(ToolKind::ExtractPages),
            Tool::RemovePages => Some(ToolKind::RemovePages),
            _ => None,
        }
    }
}

impl From<ToolKind> for Tool {
    fn from(kind: ToolKind) -> Self {
        match kind {
            ToolKind::ExtractPages => Tool::ExtractPages,
            ToolKind::RemovePages => Tool::RemovePages,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitMode {
    /// One file per page
    EveryPage,
    /// One file per inclusive range
    Ranges(Vec<PageRange>),
}

/// Commands sent from UI to worker
#[derive(Debug)]
pub enum PdfCommand {
    /// Read a file for a page tool: page count plus thumbnails
    PagesLoad {
        tool: ToolKind,
        ticket: LoadTicket,
        path: PathBuf,
        scale: f32,
    },
    /// Assemble the frozen plan of a page tool
    PagesCommit {
        tool: ToolKind,
        request: CommitRequest,
    },
    /// Page count and metadata for a picked file
    Inspect {
        tool: Tool,
        path: PathBuf,
    },
    /// Write produced bytes to disk
    SaveOutput {
        tool: Tool,
        name: String,
        bytes: Vec<u8>,
        output_dir: PathBuf,
        summary: String,
    },
    Merge {
        inputs: Vec<PathBuf>,
        output_dir: PathBuf,
    },
    Split {
        input: PathBuf,
        mode: SplitMode,
        zip: bool,
        output_dir: PathBuf,
    },
    Rotate {
        input: PathBuf,
        degrees: i32,
        output_dir: PathBuf,
    },
    Watermark {
        input: PathBuf,
        text: String,
        options: WatermarkOptions,
        output_dir: PathBuf,
    },
    Compress {
        input: PathBuf,
        level: CompressionLevel,
        output_dir: PathBuf,
    },
    ImagesToPdf {
        inputs: Vec<PathBuf>,
        output_dir: PathBuf,
    },
    PdfToImages {
        input: PathBuf,
        options: ImageExportOptions,
        output_dir: PathBuf,
    },
    LoadConfig {
        path: PathBuf,
    },
    SaveConfig {
        path: PathBuf,
        config: ToolkitConfig,
    },
}

/// Updates sent from worker to UI
#[derive(Debug)]
pub enum PdfUpdate {
    Progress {
        tool: Tool,
        current: usize,
        total: usize,
        message: String,
    },
    PagesLoaded {
        tool: ToolKind,
        ticket: LoadTicket,
        result: pdf_pages::Result<LoadedDocument>,
    },
    PagesCommitted {
        tool: ToolKind,
        ticket: CommitTicket,
        result: pdf_pages::Result<Vec<u8>>,
    },
    Inspected {
        tool: Tool,
        info: PdfInfo,
    },
    /// Files were written; `summary` is the user-facing success message
    Completed {
        tool: Tool,
        paths: Vec<PathBuf>,
        summary: String,
    },
    Compressed {
        path: PathBuf,
        report: CompressionReport,
    },
    ConfigLoaded {
        config: ToolkitConfig,
    },
    ConfigSaved {
        path: PathBuf,
    },
    Error {
        tool: Option<Tool>,
        message: String,
    },
}

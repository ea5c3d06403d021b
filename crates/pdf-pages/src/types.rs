use thiserror::Error;

use crate::session::SessionState;

#[derive(Error, Debug)]
pub enum PagesError {
    #[error("Failed to load PDF: {0}")]
    LoadParse(String),
    #[error("Failed to generate thumbnails: {0}")]
    Thumbnail(String),
    #[error("No pages selected")]
    EmptyPlan,
    #[error("Document operation failed: {0}")]
    Codec(String),
    #[error("Document has no pages")]
    NoPages,
    #[error("Document has too many pages ({0})")]
    TooManyPages(usize),
    #[error("Position {position} is out of range ({len} pages)")]
    InvalidPosition { position: usize, len: usize },
    #[error("Page {page} does not exist (document has {page_count} pages)")]
    PageOutOfRange { page: u32, page_count: usize },
    #[error("Not allowed while the tool is {0}")]
    InvalidState(SessionState),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, PagesError>;

/// Identity of a page within one load session.
///
/// Ids are assigned once at load time and never reused while the registry
/// lives; they are independent of the page's display position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageId(pub u32);

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "page-{}", self.0)
    }
}

/// Included/excluded totals derived from a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageCounts {
    pub included: usize,
    pub excluded: usize,
}

impl PageCounts {
    pub fn total(&self) -> usize {
        self.included + self.excluded
    }
}

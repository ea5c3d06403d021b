pub mod config;
pub mod pages;
pub mod tools;

use std::sync::Arc;

use pdf_pages::{Progress, SharedProgress};
use tokio::sync::mpsc;

use crate::{PdfUpdate, Tool};

/// Forward progress ticks of `tool` to the UI channel
pub fn progress_sender(tool: Tool, update_tx: &mpsc::UnboundedSender<PdfUpdate>) -> SharedProgress {
    let update_tx = update_tx.clone();
    Arc::new(move |progress: Progress| {
        let _ = update_tx.send(PdfUpdate::Progress {
            tool,
            current: progress.current,
            total: progress.total,
            message: progress.message,
        });
    })
}

pub fn send_error(
    tool: Option<Tool>,
    message: String,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
) {
    log::error!("{message}");
    let _ = update_tx.send(PdfUpdate::Error { tool, message });
}

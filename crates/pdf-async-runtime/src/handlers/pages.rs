use std::path::PathBuf;
use std::sync::Arc;

use pdf_ops::{NamedOutput, document_info, read_source, write_output};
use pdf_pages::{CommitRequest, LoadTicket, LopdfCodec, PageController, PagesError, ToolKind};
use tokio::sync::mpsc;

use super::{progress_sender, send_error};
use crate::{PdfUpdate, Tool};

/// Read the file, count pages and render previews. The result always goes
/// back tagged with `ticket` so the session can drop it if it is stale.
pub async fn handle_load(
    tool: ToolKind,
    ticket: LoadTicket,
    path: PathBuf,
    scale: f32,
    controller: &PageController<LopdfCodec>,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
) {
    let result = match tokio::fs::read(&path).await {
        Ok(bytes) => {
            let progress = progress_sender(tool.into(), update_tx);
            controller
                .load(ticket, Arc::new(bytes), scale, progress)
                .await
        }
        Err(e) => Err(PagesError::Io(e)),
    };

    if let Err(e) = &result {
        log::warn!("Loading {} failed: {e}", path.display());
    }
    let _ = update_tx.send(PdfUpdate::PagesLoaded {
        tool,
        ticket,
        result,
    });
}

pub async fn handle_commit(
    tool: ToolKind,
    request: CommitRequest,
    controller: &PageController<LopdfCodec>,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
) {
    let progress = progress_sender(tool.into(), update_tx);
    let result = controller
        .commit(request.source, &request.plan, progress.as_ref())
        .await;
    let _ = update_tx.send(PdfUpdate::PagesCommitted {
        tool,
        ticket: request.ticket,
        result,
    });
}

pub async fn handle_inspect(
    tool: Tool,
    path: PathBuf,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
) {
    let info = match read_source(&path).await {
        Ok(source) => document_info(&source).await,
        Err(e) => Err(e),
    };
    match info {
        Ok(info) => {
            let _ = update_tx.send(PdfUpdate::Inspected { tool, info });
        }
        Err(e) => send_error(
            Some(tool),
            format!("Failed to read {}: {e}", path.display()),
            update_tx,
        ),
    }
}

pub async fn handle_save_output(
    tool: Tool,
    name: String,
    bytes: Vec<u8>,
    output_dir: PathBuf,
    summary: String,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
) {
    let output = NamedOutput::new(name, bytes);
    match write_output(&output, &output_dir).await {
        Ok(path) => {
            let _ = update_tx.send(PdfUpdate::Completed {
                tool,
                paths: vec![path],
                summary,
            });
        }
        Err(e) => send_error(
            Some(tool),
            format!("Failed to save {}: {e}", output.name),
            update_tx,
        ),
    }
}

use std::sync::Arc;

use pdf_pages::{LopdfCodec, PageController, ThumbnailProvider};
use tokio::sync::mpsc;

use crate::handlers;
use crate::{PdfCommand, PdfUpdate};

struct WorkerState {
    codec: Arc<LopdfCodec>,
    pages: PageController<LopdfCodec>,
    thumbnails: Arc<dyn ThumbnailProvider>,
}

/// Async worker task that processes PDF commands and sends updates
pub async fn worker_task(
    mut command_rx: mpsc::UnboundedReceiver<PdfCommand>,
    update_tx: mpsc::UnboundedSender<PdfUpdate>,
    thumbnails: Arc<dyn ThumbnailProvider>,
) {
    let state = WorkerState {
        codec: Arc::new(LopdfCodec),
        pages: PageController::new(LopdfCodec, Arc::clone(&thumbnails)),
        thumbnails,
    };

    while let Some(cmd) = command_rx.recv().await {
        process_command(cmd, &state, &mut command_rx, &update_tx).await;
    }
    log::debug!("Command channel closed, worker exiting");
}

async fn process_command(
    cmd: PdfCommand,
    state: &WorkerState,
    command_rx: &mut mpsc::UnboundedReceiver<PdfCommand>,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
) {
    match cmd {
        PdfCommand::PagesLoad {
            tool,
            mut ticket,
            mut path,
            mut scale,
        } => {
            // A newer pick for the same tool supersedes this one; its session
            // would reject our result anyway
            while let Ok(next_cmd) = command_rx.try_recv() {
                match next_cmd {
                    PdfCommand::PagesLoad {
                        tool: next_tool,
                        ticket: next_ticket,
                        path: next_path,
                        scale: next_scale,
                    } if next_tool == tool => {
                        log::debug!("Discarding queued load of {}, using newer request", path.display());
                        ticket = next_ticket;
                        path = next_path;
                        scale = next_scale;
                    }
                    other => {
                        Box::pin(process_command(other, state, command_rx, update_tx)).await;
                    }
                }
            }

            handlers::pages::handle_load(tool, ticket, path, scale, &state.pages, update_tx).await;
        }
        PdfCommand::PagesCommit { tool, request } => {
            handlers::pages::handle_commit(tool, request, &state.pages, update_tx).await;
        }
        PdfCommand::Inspect { tool, path } => {
            handlers::pages::handle_inspect(tool, path, update_tx).await;
        }
        PdfCommand::SaveOutput {
            tool,
            name,
            bytes,
            output_dir,
            summary,
        } => {
            handlers::pages::handle_save_output(tool, name, bytes, output_dir, summary, update_tx)
                .await;
        }
        PdfCommand::Merge { inputs, output_dir } => {
            handlers::tools::handle_merge(Arc::clone(&state.codec), inputs, output_dir, update_tx)
                .await;
        }
        PdfCommand::Split {
            input,
            mode,
            zip,
            output_dir,
        } => {
            handlers::tools::handle_split(
                Arc::clone(&state.codec),
                input,
                mode,
                zip,
                output_dir,
                update_tx,
            )
            .await;
        }
        PdfCommand::Rotate {
            input,
            degrees,
            output_dir,
        } => {
            handlers::tools::handle_rotate(input, degrees, output_dir, update_tx).await;
        }
        PdfCommand::Watermark {
            input,
            text,
            options,
            output_dir,
        } => {
            handlers::tools::handle_watermark(input, text, options, output_dir, update_tx).await;
        }
        PdfCommand::Compress {
            input,
            level,
            output_dir,
        } => {
            handlers::tools::handle_compress(input, level, output_dir, update_tx).await;
        }
        PdfCommand::ImagesToPdf { inputs, output_dir } => {
            handlers::tools::handle_images_to_pdf(inputs, output_dir, update_tx).await;
        }
        PdfCommand::PdfToImages {
            input,
            options,
            output_dir,
        } => {
            handlers::tools::handle_pdf_to_images(
                Arc::clone(&state.thumbnails),
                input,
                options,
                output_dir,
                update_tx,
            )
            .await;
        }
        PdfCommand::LoadConfig { path } => {
            handlers::config::handle_load_config(path, update_tx).await;
        }
        PdfCommand::SaveConfig { path, config } => {
            handlers::config::handle_save_config(path, config, update_tx).await;
        }
    }
}

use std::path::PathBuf;

use tokio::sync::mpsc;

use super::send_error;
use crate::{PdfUpdate, ToolkitConfig};

pub async fn handle_load_config(path: PathBuf, update_tx: &mpsc::UnboundedSender<PdfUpdate>) {
    match ToolkitConfig::load(&path).await {
        Ok(config) => {
            log::info!("Loaded configuration from {}", path.display());
            let _ = update_tx.send(PdfUpdate::ConfigLoaded { config });
        }
        Err(e) => send_error(None, format!("Failed to load config: {e}"), update_tx),
    }
}

pub async fn handle_save_config(
    path: PathBuf,
    config: ToolkitConfig,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
) {
    if let Err(e) = config.validate() {
        send_error(None, format!("Invalid config: {e}"), update_tx);
        return;
    }
    match config.save(&path).await {
        Ok(()) => {
            let _ = update_tx.send(PdfUpdate::ConfigSaved { path });
        }
        Err(e) => send_error(None, format!("Failed to save config: {e}"), update_tx),
    }
}

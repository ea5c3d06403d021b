#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use anyhow::Context;
use eframe::egui;

mod app;
mod logger;
mod ui_components;
mod views;

fn main() -> anyhow::Result<()> {
    let logger = logger::AppLogger::new(200);
    logger
        .clone()
        .init(log::LevelFilter::Info)
        .context("Failed to install logger")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let handle = runtime.handle().clone();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 800.0])
            .with_title("PDF Tools"),
        ..Default::default()
    };

    eframe::run_native(
        "PDF Tools",
        options,
        Box::new(move |cc| Ok(Box::new(app::PdfToolsApp::new(cc, handle, logger)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}

use std::time::{Duration, Instant};

use eframe::egui;
use pdf_async_runtime::{PdfCommand, PdfUpdate, Tool, ToolKind, ToolkitConfig};
use pdf_ops::format_file_size;
use pdf_pages::{NotificationHub, Subscription, ToastRequest};
use tokio::sync::mpsc;

use crate::logger::AppLogger;
use crate::views::{PagesView, ToolPanels, show_pages, show_toasts, show_tool};

struct ProgressState {
    tool: Tool,
    message: String,
    current: usize,
    total: usize,
}

pub struct PdfToolsApp {
    mode: Tool,
    config: ToolkitConfig,
    extract: PagesView,
    remove: PagesView,
    panels: ToolPanels,

    // Async infrastructure
    command_tx: mpsc::UnboundedSender<PdfCommand>,
    update_rx: mpsc::UnboundedReceiver<PdfUpdate>,

    progress: Option<ProgressState>,
    toasts: NotificationHub,
    _toast_repaint: Subscription,
    logger: AppLogger,
    show_activity: bool,

    _tokio_handle: tokio::runtime::Handle,
}

impl PdfToolsApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        tokio_handle: tokio::runtime::Handle,
        logger: AppLogger,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        tokio_handle.spawn(pdf_async_runtime::worker_task(
            command_rx,
            update_tx,
            pdf_pages::thumbnail::default_provider(),
        ));

        let toasts = NotificationHub::global().clone();
        let ctx = cc.egui_ctx.clone();
        let toast_repaint = toasts.subscribe(move |_| ctx.request_repaint());

        Self {
            mode: Tool::default(),
            config: ToolkitConfig::default(),
            extract: PagesView::new(ToolKind::ExtractPages),
            remove: PagesView::new(ToolKind::RemovePages),
            panels: ToolPanels::default(),
            command_tx,
            update_rx,
            progress: None,
            toasts,
            _toast_repaint: toast_repaint,
            logger,
            show_activity: false,
            _tokio_handle: tokio_handle,
        }
    }

    fn pages_view(&mut self, tool: ToolKind) -> &mut PagesView {
        match tool {
            ToolKind::ExtractPages => &mut self.extract,
            ToolKind::RemovePages => &mut self.remove,
        }
    }

    fn toast(&self, request: ToastRequest) {
        self.toasts
            .toast(request.with_duration(Some(self.config.toast_duration())));
    }

    fn finish_progress(&mut self, tool: Tool) {
        if self.progress.as_ref().is_some_and(|p| p.tool == tool) {
            self.progress = None;
        }
    }

    fn handle_update(&mut self, update: PdfUpdate) {
        match update {
            PdfUpdate::Progress {
                tool,
                current,
                total,
                message,
            } => {
                self.progress = Some(ProgressState {
                    tool,
                    message,
                    current,
                    total,
                });
            }
            PdfUpdate::PagesLoaded {
                tool,
                ticket,
                result,
            } => {
                self.finish_progress(tool.into());
                if let Some(toast) = self.pages_view(tool).apply_load(ticket, result) {
                    self.toast(toast);
                }
            }
            PdfUpdate::PagesCommitted {
                tool,
                ticket,
                result,
            } => {
                self.finish_progress(tool.into());
                let config = self.config.clone();
                let command_tx = self.command_tx.clone();
                if let Some(toast) =
                    self.pages_view(tool)
                        .apply_commit(ticket, result, &config, &command_tx)
                {
                    self.toast(toast);
                }
            }
            PdfUpdate::Inspected { tool, info } => {
                if let Some(input) = self.panels.single_input(tool) {
                    // Only keep info for the file still selected
                    let current = input
                        .path
                        .as_ref()
                        .and_then(|p| p.file_name())
                        .is_some_and(|name| name.to_string_lossy() == info.name);
                    if current {
                        input.info = Some(info);
                    }
                }
            }
            PdfUpdate::Completed {
                tool,
                paths,
                summary,
            } => {
                self.finish_progress(tool);
                let description = match paths.as_slice() {
                    [path] => format!("{summary}\n{}", path.display()),
                    _ => summary,
                };
                self.toast(ToastRequest::success(description));
            }
            PdfUpdate::Compressed { path, report } => {
                self.finish_progress(Tool::Compress);
                self.panels.last_compression = Some(report);
                self.toast(ToastRequest::success(format!(
                    "Reduced {} to {} ({}% smaller)\n{}",
                    format_file_size(report.original_size as u64),
                    format_file_size(report.compressed_size as u64),
                    report.savings_percent,
                    path.display()
                )));
            }
            PdfUpdate::ConfigLoaded { config } => {
                self.config = config;
                self.toast(ToastRequest::success("Settings loaded"));
            }
            PdfUpdate::ConfigSaved { path } => {
                self.toast(ToastRequest::success(format!(
                    "Settings saved to {}",
                    path.display()
                )));
            }
            PdfUpdate::Error { tool, message } => {
                if let Some(tool) = tool {
                    self.finish_progress(tool);
                } else {
                    self.progress = None;
                }
                self.toast(ToastRequest::error(message));
            }
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped: Vec<_> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|file| file.path.clone())
                .collect()
        });

        for path in dropped {
            match self.mode.page_tool() {
                Some(kind) => {
                    let is_pdf = path
                        .extension()
                        .and_then(|s| s.to_str())
                        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
                    if is_pdf {
                        let config = self.config.clone();
                        let command_tx = self.command_tx.clone();
                        self.pages_view(kind).load(path, &config, &command_tx);
                    }
                }
                None => self.panels.accept_dropped(self.mode, path, &self.command_tx),
            }
        }
    }

    fn settings_menu(&mut self, ui: &mut egui::Ui) {
        ui.menu_button("⚙ Settings", |ui| {
            if ui.button("Load settings...").clicked() {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("JSON", &["json"])
                    .pick_file()
                {
                    let _ = self.command_tx.send(PdfCommand::LoadConfig { path });
                }
                ui.close();
            }
            if ui.button("Save settings...").clicked() {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("JSON", &["json"])
                    .set_file_name("pdf-tools.json")
                    .save_file()
                {
                    let _ = self.command_tx.send(PdfCommand::SaveConfig {
                        path,
                        config: self.config.clone(),
                    });
                }
                ui.close();
            }
            ui.separator();
            if ui.button("Choose output folder...").clicked() {
                if let Some(dir) = rfd::FileDialog::new().pick_folder() {
                    self.config.output_dir = Some(dir);
                }
                ui.close();
            }
            if self.config.output_dir.is_some() && ui.button("Save next to input").clicked() {
                self.config.output_dir = None;
                ui.close();
            }
        });
    }
}

impl eframe::App for PdfToolsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);

        // Process all pending updates from worker
        while let Ok(update) = self.update_rx.try_recv() {
            self.handle_update(update);
            ctx.request_repaint();
        }

        if self.toasts.expire(Instant::now()) > 0 || !self.toasts.active().is_empty() {
            ctx.request_repaint_after(Duration::from_millis(250));
        }

        egui::TopBottomPanel::top("menu").show(ctx, |ui| {
            ui.horizontal_wrapped(|ui| {
                for tool in Tool::ALL {
                    ui.selectable_value(&mut self.mode, tool, tool.title());
                }
                ui.separator();
                self.settings_menu(ui);
                ui.toggle_value(&mut self.show_activity, "📜 Activity");
            });
        });

        if self.show_activity {
            egui::TopBottomPanel::bottom("activity")
                .resizable(true)
                .default_height(140.0)
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        ui.strong("Activity");
                        if ui.small_button("Clear").clicked() {
                            self.logger.clear();
                        }
                    });
                    egui::ScrollArea::vertical()
                        .stick_to_bottom(true)
                        .show(ui, |ui| {
                            for entry in self.logger.recent(100) {
                                ui.label(format!(
                                    "{} {:<5} {}",
                                    entry.timestamp.format("%H:%M:%S"),
                                    entry.level,
                                    entry.message
                                ));
                            }
                        });
                });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(progress) = &self.progress {
                ui.label(&progress.message);
                ui.add(
                    egui::ProgressBar::new(progress.current as f32 / progress.total.max(1) as f32)
                        .show_percentage(),
                );
                ui.separator();
                ctx.request_repaint(); // Keep updating during operations
            }

            match self.mode.page_tool() {
                Some(ToolKind::ExtractPages) => {
                    show_pages(ui, &mut self.extract, &self.config, &self.command_tx, &self.toasts)
                }
                Some(ToolKind::RemovePages) => {
                    show_pages(ui, &mut self.remove, &self.config, &self.command_tx, &self.toasts)
                }
                None => {
                    let busy = self.progress.as_ref().is_some_and(|p| p.tool == self.mode);
                    if let Some(toast) = show_tool(
                        ui,
                        self.mode,
                        &mut self.panels,
                        &mut self.config,
                        busy,
                        &self.command_tx,
                    ) {
                        self.toast(toast);
                    }
                }
            }
        });

        show_toasts(ctx, &self.toasts);
    }
}

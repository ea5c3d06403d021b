//! Page grid for the extract and remove tools

use std::collections::HashMap;
use std::path::PathBuf;

use eframe::egui;
use pdf_async_runtime::{PdfCommand, Tool, ToolkitConfig};
use pdf_pages::{
    CommitResolution, DragState, LoadResolution, LoadTicket, LoadedDocument, NotificationHub,
    PageId, SessionState, ThumbnailKey, ToastRequest, ToolKind, ToolSession,
};
use tokio::sync::mpsc;

use crate::ui_components::{PDF_FILTER, pick_file};

/// Payload carried while a page card is dragged: its display position
#[derive(Clone, Copy)]
struct DraggedPage(usize);

pub struct PagesView {
    pub session: ToolSession,
    input: Option<PathBuf>,
    drag: DragState,
    textures: HashMap<u32, egui::TextureHandle>,
    texture_key: Option<ThumbnailKey>,
}

impl PagesView {
    pub fn new(tool: ToolKind) -> Self {
        Self {
            session: ToolSession::new(tool),
            input: None,
            drag: DragState::new(),
            textures: HashMap::new(),
            texture_key: None,
        }
    }

    pub fn tool(&self) -> ToolKind {
        self.session.tool()
    }

    /// Start loading `path`, superseding anything loaded or in flight
    pub fn load(
        &mut self,
        path: PathBuf,
        config: &ToolkitConfig,
        command_tx: &mpsc::UnboundedSender<PdfCommand>,
    ) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());
        let ticket = self.session.begin_load(name);
        self.reset_view();
        self.input = Some(path.clone());

        let tool = self.tool();
        let _ = command_tx.send(PdfCommand::PagesLoad {
            tool,
            ticket,
            path,
            scale: config.thumbnail_scale(tool),
        });
    }

    pub fn clear(&mut self) {
        self.session.clear();
        self.reset_view();
        self.input = None;
    }

    fn reset_view(&mut self) {
        self.drag.cancel();
        self.textures.clear();
        self.texture_key = None;
    }

    /// Feed a worker load result into the session
    pub fn apply_load(
        &mut self,
        ticket: LoadTicket,
        result: pdf_pages::Result<LoadedDocument>,
    ) -> Option<ToastRequest> {
        match self.session.resolve_load(ticket, result) {
            Ok(LoadResolution::Stale) => None,
            Ok(LoadResolution::Ready { thumbnails, .. }) => {
                if !thumbnails {
                    log::warn!(
                        "{}: no previews, showing page numbers instead",
                        self.tool()
                    );
                }
                None
            }
            Err(e) => {
                self.input = None;
                Some(ToastRequest::error(e.to_string()))
            }
        }
    }

    /// Feed a worker commit result into the session and queue the save
    pub fn apply_commit(
        &mut self,
        ticket: pdf_pages::CommitTicket,
        result: pdf_pages::Result<Vec<u8>>,
        config: &ToolkitConfig,
        command_tx: &mpsc::UnboundedSender<PdfCommand>,
    ) -> Option<ToastRequest> {
        match self.session.finish_commit(ticket, result) {
            Ok(CommitResolution::Stale) => None,
            Ok(CommitResolution::Completed(output)) => {
                let output_dir = self
                    .input
                    .as_deref()
                    .map(|input| config.output_dir_for(input))
                    .unwrap_or_else(|| PathBuf::from("."));
                let summary = match self.tool() {
                    ToolKind::ExtractPages => {
                        format!("Extracted {} pages to {}", output.page_count, output.file_name)
                    }
                    ToolKind::RemovePages => {
                        format!("Saved {} with {} pages", output.file_name, output.page_count)
                    }
                };
                let _ = command_tx.send(PdfCommand::SaveOutput {
                    tool: Tool::from(self.tool()),
                    name: output.file_name,
                    bytes: output.bytes,
                    output_dir,
                    summary,
                });
                None
            }
            Err(e) => Some(ToastRequest::error(e.to_string())),
        }
    }

    fn sync_textures(&mut self, ctx: &egui::Context) {
        let key = self.session.thumbnails().map(|set| set.key());
        if key == self.texture_key {
            return;
        }
        self.textures.clear();
        self.texture_key = key;

        if let Some(set) = self.session.thumbnails() {
            for (original_index, thumb) in set.iter() {
                let image = egui::ColorImage::from_rgba_unmultiplied(
                    [thumb.width, thumb.height],
                    &thumb.rgba,
                );
                let name = format!("{}-{}-{original_index}", self.tool(), set.key().document);
                let texture = ctx.load_texture(name, image, egui::TextureOptions::LINEAR);
                self.textures.insert(original_index, texture);
            }
        }
    }
}

fn card_size(tool: ToolKind) -> egui::Vec2 {
    match tool {
        ToolKind::ExtractPages => egui::vec2(150.0, 194.0),
        ToolKind::RemovePages => egui::vec2(100.0, 130.0),
    }
}

pub fn show_pages(
    ui: &mut egui::Ui,
    view: &mut PagesView,
    config: &ToolkitConfig,
    command_tx: &mpsc::UnboundedSender<PdfCommand>,
    toasts: &NotificationHub,
) {
    let tool = view.tool();
    ui.heading(tool.title());
    ui.separator();

    ui.horizontal(|ui| {
        // A new pick supersedes any load or commit still in flight
        if ui.button("📂 Choose PDF...").clicked() {
            if let Some(path) = pick_file(PDF_FILTER) {
                view.load(path, config, command_tx);
            }
        }

        if let Some(name) = view.session.file_name() {
            ui.label(name);
            if ui.button("✖ Clear").clicked() {
                view.clear();
            }
        }
    });

    match view.session.state() {
        SessionState::Empty => {
            ui.vertical_centered(|ui| {
                ui.add_space(60.0);
                ui.label("Choose a PDF or drop one on the window");
            });
            return;
        }
        SessionState::Loading => {
            ui.vertical_centered(|ui| {
                ui.add_space(60.0);
                ui.spinner();
                ui.label("Loading pages...");
            });
            return;
        }
        _ => {}
    }

    view.sync_textures(ui.ctx());

    let counts = view.session.counts();
    let interactive = view.session.is_interactive();
    ui.horizontal(|ui| {
        ui.add_enabled_ui(interactive, |ui| {
            if ui.button("Select All").clicked() {
                let _ = view.session.select_all();
            }
            if ui.button("Deselect All").clicked() {
                let _ = view.session.deselect_all();
            }
        });

        ui.separator();
        match tool {
            ToolKind::ExtractPages => ui.label(format!(
                "{} of {} pages selected",
                counts.included,
                counts.total()
            )),
            ToolKind::RemovePages => ui.label(format!(
                "{} pages to remove, {} will remain",
                counts.excluded, counts.included
            )),
        };

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let label = match tool {
                ToolKind::ExtractPages => format!("Extract {} Pages", counts.included),
                ToolKind::RemovePages => "Save PDF".to_string(),
            };
            let ready = interactive && counts.included > 0;
            if ui.add_enabled(ready, egui::Button::new(label)).clicked() {
                match view.session.begin_commit() {
                    Ok(request) => {
                        let _ = command_tx.send(PdfCommand::PagesCommit { tool, request });
                    }
                    Err(e) => {
                        toasts.toast(
                            ToastRequest::error(e.to_string())
                                .with_duration(Some(config.toast_duration())),
                        );
                    }
                }
            }
            if view.session.state() == SessionState::Committing {
                ui.spinner();
            }
        });
    });

    if let Some(error) = view.session.thumbnail_error() {
        ui.weak(format!("Previews unavailable: {error}"));
    }
    if let Some(error) = view.session.last_error() {
        ui.colored_label(ui.visuals().error_fg_color, error);
    }
    ui.separator();

    egui::ScrollArea::vertical().show(ui, |ui| {
        ui.add_enabled_ui(interactive, |ui| {
            show_grid(ui, view);
        });
    });
}

fn show_grid(ui: &mut egui::Ui, view: &mut PagesView) {
    let tool = view.tool();
    let size = card_size(tool);
    let pages: Vec<_> = match view.session.registry() {
        Some(registry) => registry.pages().to_vec(),
        None => return,
    };

    // The drag ended outside any card
    if view.drag.is_dragging() && egui::DragAndDrop::payload::<DraggedPage>(ui.ctx()).is_none() {
        view.drag.cancel();
    }

    let mut toggled: Option<PageId> = None;
    let mut pending_move = None;

    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing = egui::vec2(12.0, 12.0);

        for (position, page) in pages.iter().enumerate() {
            let hovered = view.drag.hover_target() == Some(position);
            let frame = egui::Frame::group(ui.style()).stroke(if hovered {
                ui.visuals().selection.stroke
            } else {
                ui.visuals().widgets.noninteractive.bg_stroke
            });

            let card = frame.show(ui, |ui| {
                ui.vertical(|ui| {
                    let id = egui::Id::new((tool, "page", page.id));
                    let source = ui.dnd_drag_source(id, DraggedPage(position), |ui| {
                        page_image(ui, view.textures.get(&page.original_index), page.original_index, page.included, size);
                    });
                    if source.response.dragged() && !view.drag.is_dragging() {
                        view.drag.start(position);
                    }

                    let label = match tool {
                        ToolKind::ExtractPages => format!("Page {}", page.original_index),
                        ToolKind::RemovePages => {
                            if page.included {
                                format!("✖ Page {}", page.original_index)
                            } else {
                                format!("↺ Page {}", page.original_index)
                            }
                        }
                    };
                    let toggle = match tool {
                        ToolKind::ExtractPages => {
                            let mut included = page.included;
                            ui.checkbox(&mut included, label).changed()
                        }
                        ToolKind::RemovePages => ui
                            .small_button(label)
                            .on_hover_text(if page.included { "Remove" } else { "Keep" })
                            .clicked(),
                    };
                    if toggle {
                        toggled = Some(page.id);
                    }
                })
            });

            let response = card.response;
            if response.dnd_hover_payload::<DraggedPage>().is_some() {
                view.drag.hover(position);
            }
            if let Some(payload) = response.dnd_release_payload::<DraggedPage>() {
                if !view.drag.is_dragging() {
                    view.drag.start(payload.0);
                }
                pending_move = view.drag.drop_on(position);
            }
        }
    });

    if let Some(id) = toggled {
        let _ = view.session.toggle(id);
    }
    if let Some((source, target)) = pending_move {
        if let Err(e) = view.session.reorder(source, target) {
            log::warn!("Ignoring page move: {e}");
        }
    }
}

fn page_image(
    ui: &mut egui::Ui,
    texture: Option<&egui::TextureHandle>,
    original_index: u32,
    included: bool,
    size: egui::Vec2,
) {
    let tint = if included {
        egui::Color32::WHITE
    } else {
        egui::Color32::from_white_alpha(70)
    };

    match texture {
        Some(texture) => {
            ui.add(
                egui::Image::new((texture.id(), texture.size_vec2()))
                    .fit_to_exact_size(size)
                    .maintain_aspect_ratio(true)
                    .tint(tint),
            );
        }
        None => {
            let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
            let painter = ui.painter();
            let fill = if included {
                ui.visuals().extreme_bg_color
            } else {
                ui.visuals().faint_bg_color
            };
            painter.rect_filled(rect, 4.0, fill);
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                original_index.to_string(),
                egui::FontId::proportional(28.0),
                ui.visuals().weak_text_color(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdf_pages::PagesError;
    use std::sync::Arc;

    fn loaded(page_count: usize) -> pdf_pages::Result<LoadedDocument> {
        Ok(LoadedDocument {
            bytes: Arc::new(b"%PDF".to_vec()),
            page_count,
            thumbnails: Err(PagesError::Thumbnail("no renderer".to_string())),
        })
    }

    #[test]
    fn test_load_sends_command_with_tool_scale() {
        let (command_tx, mut command_rx) = mpsc::unbounded_channel();
        let mut view = PagesView::new(ToolKind::RemovePages);

        view.load(PathBuf::from("/docs/a.pdf"), &ToolkitConfig::default(), &command_tx);

        assert_eq!(view.session.state(), SessionState::Loading);
        let Ok(PdfCommand::PagesLoad { tool, scale, .. }) = command_rx.try_recv() else {
            panic!("expected PagesLoad");
        };
        assert_eq!(tool, ToolKind::RemovePages);
        assert_eq!(scale, 0.5);
    }

    #[test]
    fn test_superseded_load_is_ignored() {
        let (command_tx, _command_rx) = mpsc::unbounded_channel();
        let config = ToolkitConfig::default();
        let mut view = PagesView::new(ToolKind::ExtractPages);

        view.load(PathBuf::from("a.pdf"), &config, &command_tx);
        let first = view.session.pending_load().unwrap();
        view.load(PathBuf::from("b.pdf"), &config, &command_tx);
        let second = view.session.pending_load().unwrap();

        assert!(view.apply_load(first, loaded(9)).is_none());
        assert_eq!(view.session.state(), SessionState::Loading);
        assert!(view.apply_load(second, loaded(2)).is_none());
        assert_eq!(view.session.counts().total(), 2);
        assert_eq!(view.session.file_name(), Some("b.pdf"));
    }

    #[test]
    fn test_failed_load_returns_error_toast() {
        let (command_tx, _command_rx) = mpsc::unbounded_channel();
        let mut view = PagesView::new(ToolKind::ExtractPages);
        view.load(PathBuf::from("a.pdf"), &ToolkitConfig::default(), &command_tx);
        let ticket = view.session.pending_load().unwrap();

        let toast = view
            .apply_load(ticket, Err(PagesError::LoadParse("bad xref".to_string())))
            .unwrap();
        assert_eq!(toast.title, "Error");
        assert_eq!(view.session.state(), SessionState::Empty);
    }

    #[test]
    fn test_commit_queues_save_next_to_input() {
        let (command_tx, mut command_rx) = mpsc::unbounded_channel();
        let config = ToolkitConfig::default();
        let mut view = PagesView::new(ToolKind::ExtractPages);
        view.load(PathBuf::from("/docs/report.pdf"), &config, &command_tx);
        let _ = command_rx.try_recv();
        let ticket = view.session.pending_load().unwrap();
        view.apply_load(ticket, loaded(3));

        view.session.toggle(PageId(2)).unwrap();
        let request = view.session.begin_commit().unwrap();
        assert!(
            view.apply_commit(request.ticket, Ok(b"out".to_vec()), &config, &command_tx)
                .is_none()
        );

        let Ok(PdfCommand::SaveOutput {
            tool,
            name,
            output_dir,
            summary,
            ..
        }) = command_rx.try_recv()
        else {
            panic!("expected SaveOutput");
        };
        assert_eq!(tool, Tool::ExtractPages);
        assert_eq!(name, "report_extracted.pdf");
        assert_eq!(output_dir, PathBuf::from("/docs"));
        assert_eq!(summary, "Extracted 2 pages to report_extracted.pdf");
        assert_eq!(view.session.state(), SessionState::Ready);
    }

    #[test]
    fn test_load_during_commit_drops_commit_result() {
        let (command_tx, mut command_rx) = mpsc::unbounded_channel();
        let config = ToolkitConfig::default();
        let mut view = PagesView::new(ToolKind::RemovePages);
        view.load(PathBuf::from("/docs/old.pdf"), &config, &command_tx);
        let ticket = view.session.pending_load().unwrap();
        view.apply_load(ticket, loaded(4));
        let request = view.session.begin_commit().unwrap();
        assert_eq!(view.session.state(), SessionState::Committing);

        view.load(PathBuf::from("/docs/new.pdf"), &config, &command_tx);
        assert_eq!(view.session.state(), SessionState::Loading);
        while command_rx.try_recv().is_ok() {}

        assert!(
            view.apply_commit(request.ticket, Ok(b"out".to_vec()), &config, &command_tx)
                .is_none()
        );
        assert!(command_rx.try_recv().is_err());
        assert_eq!(view.session.state(), SessionState::Loading);

        let ticket = view.session.pending_load().unwrap();
        view.apply_load(ticket, loaded(2));
        assert_eq!(view.session.file_name(), Some("new.pdf"));
        assert_eq!(view.session.counts().total(), 2);
    }

    #[test]
    fn test_clear_during_load_drops_load_result() {
        let (command_tx, _command_rx) = mpsc::unbounded_channel();
        let mut view = PagesView::new(ToolKind::ExtractPages);
        view.load(PathBuf::from("a.pdf"), &ToolkitConfig::default(), &command_tx);
        let ticket = view.session.pending_load().unwrap();

        view.clear();
        assert!(view.apply_load(ticket, loaded(3)).is_none());
        assert_eq!(view.session.state(), SessionState::Empty);
    }
}

//! Panels for the single- and multi-file tools

use std::path::{Path, PathBuf};

use eframe::egui;
use pdf_async_runtime::{
    CompressionLevel, CompressionReport, ImageFormat, PdfCommand, PdfInfo, SplitMode, Tool,
    ToolkitConfig,
};
use pdf_ops::format_file_size;
use pdf_pages::{PageRange, ToastRequest};
use tokio::sync::mpsc;

use crate::ui_components::{
    FileListEditor, IMAGE_FILTER, PDF_FILTER, SliderBuilder, button_group, pick_file, pick_files,
};

/// One picked input PDF plus what the worker reported about it
#[derive(Default)]
pub struct SingleInput {
    pub path: Option<PathBuf>,
    pub info: Option<PdfInfo>,
}

impl SingleInput {
    fn set(&mut self, tool: Tool, path: PathBuf, command_tx: &mpsc::UnboundedSender<PdfCommand>) {
        self.info = None;
        self.path = Some(path.clone());
        let _ = command_tx.send(PdfCommand::Inspect { tool, path });
    }
}

pub struct ToolPanels {
    pub merge_inputs: Vec<PathBuf>,
    pub image_inputs: Vec<PathBuf>,
    pub split: SingleInput,
    pub split_every_page: bool,
    pub split_ranges: String,
    pub split_zip: bool,
    pub rotate: SingleInput,
    pub watermark: SingleInput,
    pub compress: SingleInput,
    pub last_compression: Option<CompressionReport>,
    pub export: SingleInput,
}

impl Default for ToolPanels {
    fn default() -> Self {
        Self {
            merge_inputs: Vec::new(),
            image_inputs: Vec::new(),
            split: SingleInput::default(),
            split_every_page: true,
            split_ranges: String::new(),
            split_zip: true,
            rotate: SingleInput::default(),
            watermark: SingleInput::default(),
            compress: SingleInput::default(),
            last_compression: None,
            export: SingleInput::default(),
        }
    }
}

impl ToolPanels {
    pub fn single_input(&mut self, tool: Tool) -> Option<&mut SingleInput> {
        match tool {
            Tool::Split => Some(&mut self.split),
            Tool::Rotate => Some(&mut self.rotate),
            Tool::Watermark => Some(&mut self.watermark),
            Tool::Compress => Some(&mut self.compress),
            Tool::PdfToImages => Some(&mut self.export),
            _ => None,
        }
    }

    /// Route a file dropped on the window to `tool`
    pub fn accept_dropped(
        &mut self,
        tool: Tool,
        path: PathBuf,
        command_tx: &mpsc::UnboundedSender<PdfCommand>,
    ) {
        match tool {
            Tool::Merge => push_unique(&mut self.merge_inputs, path),
            Tool::ImagesToPdf => push_unique(&mut self.image_inputs, path),
            _ => {
                if let Some(input) = self.single_input(tool) {
                    input.set(tool, path, command_tx);
                }
            }
        }
    }
}

fn push_unique(files: &mut Vec<PathBuf>, path: PathBuf) {
    if !files.contains(&path) {
        files.push(path);
    }
}

/// Parse "1-3, 4-6" into ranges
pub fn parse_ranges(text: &str) -> Result<Vec<PageRange>, String> {
    let ranges = text
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::parse::<PageRange>)
        .collect::<Result<Vec<_>, _>>()?;
    if ranges.is_empty() {
        return Err("Enter at least one page range".to_string());
    }
    Ok(ranges)
}

fn output_dir(config: &ToolkitConfig, input: &Path) -> PathBuf {
    config.output_dir_for(input)
}

fn input_section(
    ui: &mut egui::Ui,
    tool: Tool,
    input: &mut SingleInput,
    command_tx: &mpsc::UnboundedSender<PdfCommand>,
) {
    ui.horizontal(|ui| {
        if ui.button("📂 Choose PDF...").clicked() {
            if let Some(path) = pick_file(PDF_FILTER) {
                input.set(tool, path, command_tx);
            }
        }
        match (&input.path, &input.info) {
            (Some(_), Some(info)) => {
                ui.label(format!(
                    "{} ({} pages, {})",
                    info.name,
                    info.page_count,
                    format_file_size(info.size as u64)
                ));
            }
            (Some(path), None) => {
                ui.label(path.display().to_string());
            }
            (None, _) => {
                ui.weak("No file selected");
            }
        }
    });
}

fn action_button(ui: &mut egui::Ui, enabled: bool, text: &str) -> bool {
    ui.add_space(10.0);
    ui.add_enabled(enabled, egui::Button::new(text)).clicked()
}

pub fn show_tool(
    ui: &mut egui::Ui,
    tool: Tool,
    panels: &mut ToolPanels,
    config: &mut ToolkitConfig,
    busy: bool,
    command_tx: &mpsc::UnboundedSender<PdfCommand>,
) -> Option<ToastRequest> {
    ui.heading(tool.title());
    ui.separator();

    match tool {
        Tool::Merge => {
            if ui.button("➕ Add PDF Files").clicked() {
                for path in pick_files(PDF_FILTER) {
                    push_unique(&mut panels.merge_inputs, path);
                }
            }
            ui.add_space(5.0);
            FileListEditor::new(&mut panels.merge_inputs)
                .empty_text("Add at least two PDFs to merge")
                .show(ui);

            let ready = !busy && panels.merge_inputs.len() >= 2;
            if action_button(ui, ready, "Merge PDFs") {
                let _ = command_tx.send(PdfCommand::Merge {
                    inputs: panels.merge_inputs.clone(),
                    output_dir: output_dir(config, &panels.merge_inputs[0]),
                });
            }
        }

        Tool::ImagesToPdf => {
            if ui.button("➕ Add Images").clicked() {
                for path in pick_files(IMAGE_FILTER) {
                    push_unique(&mut panels.image_inputs, path);
                }
            }
            ui.add_space(5.0);
            FileListEditor::new(&mut panels.image_inputs)
                .empty_text("Each image becomes one page")
                .show(ui);

            let ready = !busy && !panels.image_inputs.is_empty();
            if action_button(ui, ready, "Convert to PDF") {
                let _ = command_tx.send(PdfCommand::ImagesToPdf {
                    inputs: panels.image_inputs.clone(),
                    output_dir: output_dir(config, &panels.image_inputs[0]),
                });
            }
        }

        Tool::Split => {
            input_section(ui, tool, &mut panels.split, command_tx);
            ui.radio_value(&mut panels.split_every_page, true, "One file per page");
            ui.horizontal(|ui| {
                ui.radio_value(&mut panels.split_every_page, false, "Page ranges:");
                ui.add_enabled(
                    !panels.split_every_page,
                    egui::TextEdit::singleline(&mut panels.split_ranges).hint_text("1-3, 4-6"),
                );
            });
            ui.checkbox(&mut panels.split_zip, "Package as a zip archive");

            if let Some(input) = panels.split.path.clone() {
                if action_button(ui, !busy, "Split PDF") {
                    let mode = if panels.split_every_page {
                        SplitMode::EveryPage
                    } else {
                        match parse_ranges(&panels.split_ranges) {
                            Ok(ranges) => SplitMode::Ranges(ranges),
                            Err(e) => return Some(ToastRequest::error(e)),
                        }
                    };
                    let _ = command_tx.send(PdfCommand::Split {
                        output_dir: output_dir(config, &input),
                        input,
                        mode,
                        zip: panels.split_zip,
                    });
                }
            }
        }

        Tool::Rotate => {
            input_section(ui, tool, &mut panels.rotate, command_tx);
            button_group(
                ui,
                &mut config.rotation_degrees,
                &[
                    (90, "↻ 90°"),
                    (180, "180°"),
                    (270, "↺ 90°"),
                ],
            );

            if let Some(input) = panels.rotate.path.clone() {
                if action_button(ui, !busy, "Rotate All Pages") {
                    let _ = command_tx.send(PdfCommand::Rotate {
                        output_dir: output_dir(config, &input),
                        input,
                        degrees: config.rotation_degrees,
                    });
                }
            }
        }

        Tool::Watermark => {
            input_section(ui, tool, &mut panels.watermark, command_tx);
            ui.horizontal(|ui| {
                ui.label("Text:");
                ui.text_edit_singleline(&mut config.watermark_text);
            });
            SliderBuilder::new(&mut config.watermark.font_size, 8.0..=200.0)
                .text("Font size")
                .suffix(" pt")
                .show(ui);
            SliderBuilder::new(&mut config.watermark.opacity, 0.05..=1.0)
                .text("Opacity")
                .show(ui);
            SliderBuilder::new(&mut config.watermark.rotation, -90.0..=90.0)
                .text("Angle")
                .suffix("°")
                .show(ui);

            let has_text = !config.watermark_text.trim().is_empty();
            if let Some(input) = panels.watermark.path.clone() {
                if action_button(ui, !busy && has_text, "Add Watermark") {
                    let _ = command_tx.send(PdfCommand::Watermark {
                        output_dir: output_dir(config, &input),
                        input,
                        text: config.watermark_text.clone(),
                        options: config.watermark.clone(),
                    });
                }
            }
        }

        Tool::Compress => {
            input_section(ui, tool, &mut panels.compress, command_tx);
            button_group(
                ui,
                &mut config.compression,
                &[
                    (CompressionLevel::Low, "Low"),
                    (CompressionLevel::Medium, "Medium"),
                    (CompressionLevel::High, "High"),
                ],
            );

            if let Some(input) = panels.compress.path.clone() {
                if action_button(ui, !busy, "Compress PDF") {
                    panels.last_compression = None;
                    let _ = command_tx.send(PdfCommand::Compress {
                        output_dir: output_dir(config, &input),
                        input,
                        level: config.compression,
                    });
                }
            }

            if let Some(report) = &panels.last_compression {
                ui.add_space(10.0);
                ui.label(format!(
                    "{} → {} ({}% smaller)",
                    format_file_size(report.original_size as u64),
                    format_file_size(report.compressed_size as u64),
                    report.savings_percent
                ));
            }
        }

        Tool::PdfToImages => {
            input_section(ui, tool, &mut panels.export, command_tx);
            button_group(
                ui,
                &mut config.image_export.format,
                &[(ImageFormat::Png, "PNG"), (ImageFormat::Jpeg, "JPEG")],
            );
            SliderBuilder::new(&mut config.image_export.scale, 0.5..=4.0)
                .text("Scale")
                .suffix("×")
                .show(ui);

            if let Some(input) = panels.export.path.clone() {
                if action_button(ui, !busy, "Export Images") {
                    let _ = command_tx.send(PdfCommand::PdfToImages {
                        output_dir: output_dir(config, &input),
                        input,
                        options: config.image_export,
                    });
                }
            }
        }

        Tool::ExtractPages | Tool::RemovePages => {}
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ranges() {
        assert_eq!(
            parse_ranges("1-3, 5 ,7-8").unwrap(),
            vec![
                PageRange::new(1, 3),
                PageRange::new(5, 5),
                PageRange::new(7, 8)
            ]
        );
        assert!(parse_ranges(" , ").is_err());
        assert!(parse_ranges("3-1").is_err());
    }

    #[test]
    fn test_dropped_files_go_to_current_tool() {
        let (command_tx, mut command_rx) = mpsc::unbounded_channel();
        let mut panels = ToolPanels::default();

        panels.accept_dropped(Tool::Merge, "a.pdf".into(), &command_tx);
        panels.accept_dropped(Tool::Merge, "a.pdf".into(), &command_tx);
        assert_eq!(panels.merge_inputs, vec![PathBuf::from("a.pdf")]);
        assert!(command_rx.try_recv().is_err());

        panels.accept_dropped(Tool::Compress, "b.pdf".into(), &command_tx);
        assert_eq!(panels.compress.path, Some(PathBuf::from("b.pdf")));
        assert!(matches!(
            command_rx.try_recv(),
            Ok(PdfCommand::Inspect {
                tool: Tool::Compress,
                ..
            })
        ));
    }
}

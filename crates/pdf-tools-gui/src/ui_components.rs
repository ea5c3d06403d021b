use eframe::egui;
use std::path::PathBuf;

pub const PDF_FILTER: (&str, &[&str]) = ("PDF", &["pdf"]);
pub const IMAGE_FILTER: (&str, &[&str]) = ("Images", &["png", "jpg", "jpeg", "gif", "bmp", "webp"]);

/// Builder for sliders that report whether the value changed
pub struct SliderBuilder<'a, T> {
    value: &'a mut T,
    range: std::ops::RangeInclusive<T>,
    text: String,
    suffix: Option<String>,
}

impl<'a, T> SliderBuilder<'a, T>
where
    T: egui::emath::Numeric,
{
    pub fn new(value: &'a mut T, range: std::ops::RangeInclusive<T>) -> Self {
        Self {
            value,
            range,
            text: String::new(),
            suffix: None,
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    pub fn show(self, ui: &mut egui::Ui) -> bool {
        let mut slider = egui::Slider::new(self.value, self.range);

        if !self.text.is_empty() {
            slider = slider.text(self.text);
        }

        if let Some(suffix) = self.suffix {
            slider = slider.suffix(suffix);
        }

        ui.add(slider).changed()
    }
}

/// Horizontal button group for enum selection
pub fn button_group<T>(ui: &mut egui::Ui, value: &mut T, options: &[(T, &str)]) -> bool
where
    T: PartialEq + Clone,
{
    let mut changed = false;
    ui.horizontal(|ui| {
        for (option_value, option_text) in options {
            if ui
                .selectable_value(value, option_value.clone(), *option_text)
                .changed()
            {
                changed = true;
            }
        }
    });
    changed
}

/// Open a native picker for one file
pub fn pick_file(filter: (&str, &[&str])) -> Option<PathBuf> {
    rfd::FileDialog::new()
        .add_filter(filter.0, filter.1)
        .pick_file()
}

/// Open a native picker for several files
pub fn pick_files(filter: (&str, &[&str])) -> Vec<PathBuf> {
    rfd::FileDialog::new()
        .add_filter(filter.0, filter.1)
        .pick_files()
        .unwrap_or_default()
}

/// File list editor with reordering and removal
pub struct FileListEditor<'a> {
    files: &'a mut Vec<PathBuf>,
    empty_text: &'a str,
}

impl<'a> FileListEditor<'a> {
    pub fn new(files: &'a mut Vec<PathBuf>) -> Self {
        Self {
            files,
            empty_text: "No files selected",
        }
    }

    pub fn empty_text(mut self, text: &'a str) -> Self {
        self.empty_text = text;
        self
    }

    pub fn show(self, ui: &mut egui::Ui) -> bool {
        if self.files.is_empty() {
            ui.weak(self.empty_text);
            return false;
        }

        let mut to_remove = None;
        let mut to_move_up = None;
        let mut to_move_down = None;

        for (idx, path) in self.files.iter().enumerate() {
            ui.horizontal(|ui| {
                if idx > 0 && ui.small_button("▲").clicked() {
                    to_move_up = Some(idx);
                }
                if idx < self.files.len() - 1 && ui.small_button("▼").clicked() {
                    to_move_down = Some(idx);
                }

                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                ui.label(format!("{}. {name}", idx + 1))
                    .on_hover_text(path.display().to_string());

                if ui.small_button("✖").clicked() {
                    to_remove = Some(idx);
                }
            });
        }

        let mut changed = false;
        if let Some(idx) = to_move_up {
            self.files.swap(idx, idx - 1);
            changed = true;
        }
        if let Some(idx) = to_move_down {
            self.files.swap(idx, idx + 1);
            changed = true;
        }
        if let Some(idx) = to_remove {
            self.files.remove(idx);
            changed = true;
        }
        changed
    }
}

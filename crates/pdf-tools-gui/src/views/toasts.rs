use eframe::egui;
use pdf_pages::{NotificationHub, ToastVariant};

/// Stack of open toasts in the bottom-right corner
pub fn show_toasts(ctx: &egui::Context, hub: &NotificationHub) {
    let toasts = hub.active();
    if toasts.is_empty() {
        return;
    }

    egui::Area::new(egui::Id::new("toasts"))
        .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-12.0, -12.0))
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            ui.set_max_width(320.0);
            for toast in toasts.iter().rev() {
                let fill = match toast.variant {
                    ToastVariant::Default => ui.visuals().window_fill,
                    ToastVariant::Destructive => ui.visuals().error_fg_color.gamma_multiply(0.25),
                };
                egui::Frame::popup(ui.style()).fill(fill).show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.vertical(|ui| {
                            ui.strong(&toast.title);
                            if !toast.description.is_empty() {
                                ui.label(&toast.description);
                            }
                        });
                        if ui.small_button("✖").clicked() {
                            hub.dismiss(toast.id);
                        }
                    });
                });
                ui.add_space(6.0);
            }
        });
}

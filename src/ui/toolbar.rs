use crate::app::GanttApp;
use crate::ui::theme;
use egui::{menu, RichText, Ui};

/// Render the top menu bar.
pub fn show_toolbar(app: &mut GanttApp, ui: &mut Ui) {
    menu::bar(ui, |ui| {
        ui.menu_button(RichText::new("  Task  ").font(theme::font_menu()), |ui| {
            if ui.button("  Add Task...").clicked() {
                app.show_add_task = true;
                ui.close_menu();
            }
            let has_selection = app.selected_task.is_some();
            if ui
                .add_enabled(has_selection, egui::Button::new("  Clear Selection"))
                .clicked()
            {
                app.selected_task = None;
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  View  ").font(theme::font_menu()), |ui| {
            if ui.button("  Zoom In        Ctrl+Scroll ↑").clicked() {
                app.engine.zoom_in();
                ui.close_menu();
            }
            if ui.button("  Zoom Out      Ctrl+Scroll ↓").clicked() {
                app.engine.zoom_out();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Reset Zoom").clicked() {
                app.engine.reset_zoom();
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  Help  ").font(theme::font_menu()), |ui| {
            if ui.button("About").clicked() {
                app.show_about = true;
                ui.close_menu();
            }
        });

        // Right-aligned audit trail of the latest recurring series
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if let Some(entry) = app.engine.sink().audit_log.last() {
                ui.label(RichText::new(entry).size(11.0).weak());
            }
        });
    });
}

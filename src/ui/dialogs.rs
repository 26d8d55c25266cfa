use crate::app::GanttApp;
use crate::ui::theme;
use egui::{Color32, Context, RichText, Window};
use gantt_scheduler::recurrence::Frequency;
use gantt_scheduler::{TaskPriority, TaskStatus};

/// Render the "Add Task" dialog, including the optional recurrence section.
pub fn show_add_task_dialog(app: &mut GanttApp, ctx: &Context) {
    let mut should_create = false;
    let mut cancelled = false;
    let users = app.engine.users().to_vec();
    let parents: Vec<_> = app
        .engine
        .tasks()
        .iter()
        .map(|t| (t.id, t.name.clone()))
        .collect();
    let form = &mut app.new_task;

    Window::new(RichText::new("Add Task").strong().size(14.0))
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([360.0, 0.0])
        .show(ctx, |ui| {
            ui.visuals_mut().extreme_bg_color = theme::BG_FIELD;
            ui.add_space(4.0);

            egui::Grid::new("add_task_grid")
                .num_columns(2)
                .striped(false)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    ui.label(RichText::new("Name").color(theme::TEXT_SECONDARY));
                    ui.add_sized(
                        [220.0, 24.0],
                        egui::TextEdit::singleline(&mut form.name)
                            .hint_text("Task name...")
                            .text_color(theme::TEXT_PRIMARY),
                    );
                    ui.end_row();

                    ui.label(RichText::new("Start").color(theme::TEXT_SECONDARY));
                    ui.add(egui_extras::DatePickerButton::new(&mut form.start).id_salt("dlg_dp_start"));
                    ui.end_row();

                    ui.label(RichText::new("End").color(theme::TEXT_SECONDARY));
                    ui.add(egui_extras::DatePickerButton::new(&mut form.end).id_salt("dlg_dp_end"));
                    ui.end_row();

                    ui.label(RichText::new("Priority").color(theme::TEXT_SECONDARY));
                    egui::ComboBox::from_id_salt("dlg_priority")
                        .selected_text(form.priority.label())
                        .show_ui(ui, |ui| {
                            for p in TaskPriority::all() {
                                ui.selectable_value(&mut form.priority, *p, p.label());
                            }
                        });
                    ui.end_row();

                    ui.label(RichText::new("Status").color(theme::TEXT_SECONDARY));
                    egui::ComboBox::from_id_salt("dlg_status")
                        .selected_text(form.status.label())
                        .show_ui(ui, |ui| {
                            for s in TaskStatus::all() {
                                ui.selectable_value(&mut form.status, *s, s.label());
                            }
                        });
                    ui.end_row();

                    ui.label(RichText::new("Assignee").color(theme::TEXT_SECONDARY));
                    let assignee_label = form
                        .assignee
                        .and_then(|id| users.iter().find(|u| u.id == id))
                        .map(|u| u.name.clone())
                        .unwrap_or_else(|| "Unassigned".to_string());
                    egui::ComboBox::from_id_salt("dlg_assignee")
                        .selected_text(assignee_label)
                        .show_ui(ui, |ui| {
                            ui.selectable_value(&mut form.assignee, None, "Unassigned");
                            for u in &users {
                                ui.selectable_value(&mut form.assignee, Some(u.id), u.name.as_str());
                            }
                        });
                    ui.end_row();

                    ui.label(RichText::new("Parent").color(theme::TEXT_SECONDARY));
                    let parent_label = form
                        .parent
                        .and_then(|id| parents.iter().find(|(pid, _)| *pid == id))
                        .map(|(_, name)| name.clone())
                        .unwrap_or_else(|| "— None —".to_string());
                    egui::ComboBox::from_id_salt("dlg_parent")
                        .selected_text(parent_label)
                        .show_ui(ui, |ui| {
                            ui.selectable_value(&mut form.parent, None, "— None —");
                            for (id, name) in &parents {
                                ui.selectable_value(&mut form.parent, Some(*id), name.as_str());
                            }
                        });
                    ui.end_row();

                    ui.label("");
                    ui.checkbox(&mut form.recurring, "Repeat");
                    ui.end_row();

                    if form.recurring {
                        ui.label(RichText::new("Every").color(theme::TEXT_SECONDARY));
                        ui.horizontal(|ui| {
                            for f in Frequency::all() {
                                ui.radio_value(&mut form.frequency, *f, f.label());
                            }
                        });
                        ui.end_row();

                        ui.label(RichText::new("Until").color(theme::TEXT_SECONDARY));
                        ui.add(
                            egui_extras::DatePickerButton::new(&mut form.repeat_until)
                                .id_salt("dlg_dp_until"),
                        );
                        ui.end_row();
                    }
                });

            if form.end < form.start {
                ui.label(
                    RichText::new("End date is before start date")
                        .size(10.0)
                        .color(theme::TODAY_LINE),
                );
            } else if form.recurring && form.repeat_until < form.end {
                ui.label(
                    RichText::new("Repeat-until date is before the task ends")
                        .size(10.0)
                        .color(theme::TODAY_LINE),
                );
            }

            ui.add_space(6.0);
            ui.separator();
            ui.add_space(4.0);

            ui.horizontal(|ui| {
                let create_btn = egui::Button::new(RichText::new("Create").color(Color32::WHITE))
                    .fill(theme::ACCENT)
                    .rounding(egui::Rounding::same(4.0));
                if ui.add_sized([80.0, 28.0], create_btn).clicked() {
                    should_create = true;
                }
                if ui.add_sized([80.0, 28.0], egui::Button::new("Cancel")).clicked() {
                    cancelled = true;
                }
            });
            ui.add_space(2.0);
        });

    if should_create && app.create_task_from_dialog() {
        app.show_add_task = false;
    }
    if cancelled || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.new_task.reset();
        app.show_add_task = false;
    }
}

/// Render the "About" dialog.
pub fn show_about_dialog(app: &mut GanttApp, ctx: &Context) {
    let mut should_close = false;
    Window::new("About")
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([300.0, 180.0])
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(12.0);
                ui.heading(RichText::new("Gantt Scheduler").strong());
                ui.add_space(2.0);
                ui.label(
                    RichText::new(format!("Version {}", env!("CARGO_PKG_VERSION")))
                        .color(theme::TEXT_SECONDARY),
                );
                ui.add_space(10.0);
                ui.label("Drag bars to move · drag edges to resize");
                ui.label("Drag a bar's dot onto another bar to link");
                ui.add_space(14.0);
                if ui.add_sized([100.0, 28.0], egui::Button::new("Close")).clicked() {
                    should_close = true;
                }
            });
        });
    if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.show_about = false;
    }
}

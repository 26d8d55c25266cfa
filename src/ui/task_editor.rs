use chrono::NaiveDate;
use egui::{Color32, RichText, Ui};
use gantt_scheduler::{Task, TaskPatch, TaskPriority, TaskStatus, User};
use uuid::Uuid;

use crate::ui::theme;

fn field_label(ui: &mut Ui, text: &str) {
    ui.label(RichText::new(text).size(10.0).color(theme::TEXT_DIM).strong());
}

/// Render an inline editor for the selected task.
///
/// Edits are returned as a patch instead of being written in place, so the
/// engine can validate and commit them as one update.
pub fn show_task_editor(
    task: &Task,
    all_tasks: &[Task],
    descendants: &[Uuid],
    users: &[User],
    ui: &mut Ui,
) -> Option<TaskPatch> {
    let mut patch = TaskPatch::default();
    let task_id = task.id;

    ui.add_space(6.0);
    ui.label(
        RichText::new("Edit Task")
            .strong()
            .size(13.0)
            .color(theme::TEXT_PRIMARY),
    );
    ui.add_space(4.0);

    let frame = egui::Frame {
        fill: theme::BG_DARK,
        rounding: egui::Rounding::same(4.0),
        inner_margin: egui::Margin::same(8.0),
        outer_margin: egui::Margin::ZERO,
        stroke: egui::Stroke::new(1.0, theme::BORDER_SUBTLE),
        shadow: egui::epaint::Shadow::NONE,
    };

    frame.show(ui, |ui| {
        ui.spacing_mut().item_spacing.y = 6.0;
        ui.visuals_mut().extreme_bg_color = theme::BG_FIELD;

        // ── Name ──────────────────────────────────────────────────────
        field_label(ui, "Name");
        let mut name = task.name.clone();
        if ui
            .add_sized(
                [ui.available_width(), 24.0],
                egui::TextEdit::singleline(&mut name).text_color(theme::TEXT_PRIMARY),
            )
            .changed()
        {
            patch.name = Some(name);
        }

        // ── Status / Priority ─────────────────────────────────────────
        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                field_label(ui, "Status");
                egui::ComboBox::from_id_salt(("status_combo", task_id))
                    .selected_text(task.status.label())
                    .show_ui(ui, |ui| {
                        for s in TaskStatus::all() {
                            if ui.selectable_label(task.status == *s, s.label()).clicked() {
                                patch.status = Some(*s);
                            }
                        }
                    });
            });
            ui.vertical(|ui| {
                field_label(ui, "Priority");
                egui::ComboBox::from_id_salt(("priority_combo", task_id))
                    .selected_text(
                        RichText::new(task.priority.label())
                            .color(theme::priority_color(task.priority)),
                    )
                    .show_ui(ui, |ui| {
                        for p in TaskPriority::all() {
                            if ui.selectable_label(task.priority == *p, p.label()).clicked() {
                                patch.priority = Some(*p);
                            }
                        }
                    });
            });
        });

        // ── Assignee ──────────────────────────────────────────────────
        field_label(ui, "Assignee");
        let assignee_label = task
            .assignee_id
            .and_then(|id| users.iter().find(|u| u.id == id))
            .map(|u| u.name.clone())
            .unwrap_or_else(|| "Unassigned".to_string());
        egui::ComboBox::from_id_salt(("assignee_combo", task_id))
            .selected_text(assignee_label)
            .width(ui.available_width())
            .show_ui(ui, |ui| {
                if ui
                    .selectable_label(task.assignee_id.is_none(), "Unassigned")
                    .clicked()
                {
                    patch.assignee_id = Some(None);
                }
                for u in users {
                    if ui
                        .selectable_label(task.assignee_id == Some(u.id), u.name.as_str())
                        .clicked()
                    {
                        patch.assignee_id = Some(Some(u.id));
                    }
                }
            });

        // ── Parent ────────────────────────────────────────────────────
        // Candidates exclude the task itself and its own subtree.
        field_label(ui, "Parent");
        let parent_label = task
            .parent_id
            .and_then(|pid| all_tasks.iter().find(|t| t.id == pid))
            .map(|t| t.name.clone())
            .unwrap_or_else(|| "— None —".to_string());
        egui::ComboBox::from_id_salt(("parent_combo", task_id))
            .selected_text(parent_label)
            .width(ui.available_width())
            .show_ui(ui, |ui| {
                if ui
                    .selectable_label(task.parent_id.is_none(), "— None —")
                    .clicked()
                {
                    patch.parent_id = Some(None);
                }
                for t in all_tasks
                    .iter()
                    .filter(|t| t.id != task_id && !descendants.contains(&t.id))
                {
                    if ui
                        .selectable_label(task.parent_id == Some(t.id), t.name.as_str())
                        .clicked()
                    {
                        patch.parent_id = Some(Some(t.id));
                    }
                }
            });

        // ── Dates ─────────────────────────────────────────────────────
        // An inverted range is submitted as-is and rejected on commit.
        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                field_label(ui, "Start");
                let mut start: NaiveDate = task.start;
                if ui
                    .add(egui_extras::DatePickerButton::new(&mut start).id_salt("dp_start"))
                    .changed()
                {
                    patch.start = Some(start);
                }
            });
            ui.add_space(8.0);
            ui.vertical(|ui| {
                field_label(ui, "End");
                let mut end: NaiveDate = task.end;
                if ui
                    .add(egui_extras::DatePickerButton::new(&mut end).id_salt("dp_end"))
                    .changed()
                {
                    patch.end = Some(end);
                }
            });
        });

        // ── Notes ─────────────────────────────────────────────────────
        field_label(ui, "Notes");
        let mut description = task.description.clone();
        if ui
            .add_sized(
                [ui.available_width(), 60.0],
                egui::TextEdit::multiline(&mut description)
                    .text_color(theme::TEXT_SECONDARY)
                    .hint_text("Add notes or description..."),
            )
            .changed()
        {
            patch.description = Some(description);
        }

        // ── Dependencies ──────────────────────────────────────────────
        ui.separator();
        field_label(ui, "Depends on");
        if task.dependencies.is_empty() {
            ui.label(
                RichText::new("Drag from a bar's dot onto another bar to link")
                    .size(9.5)
                    .color(theme::TEXT_DIM),
            );
        }
        for dep_id in &task.dependencies {
            let dep_name = all_tasks
                .iter()
                .find(|t| t.id == *dep_id)
                .map(|t| t.name.clone())
                .unwrap_or_else(|| "(missing task)".to_string());
            ui.horizontal(|ui| {
                ui.label(
                    RichText::new(format!("{} {}", egui_phosphor::regular::ARROW_LEFT, dep_name))
                        .size(11.0)
                        .color(theme::TEXT_SECONDARY),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let del = ui.add(
                        egui::Button::new(
                            RichText::new(egui_phosphor::regular::X)
                                .size(9.0)
                                .color(Color32::GRAY),
                        )
                        .frame(false),
                    );
                    if del.on_hover_text("Remove dependency").clicked() {
                        let remaining = task
                            .dependencies
                            .iter()
                            .copied()
                            .filter(|d| d != dep_id)
                            .collect();
                        patch.dependencies = Some(remaining);
                    }
                });
            });
        }
    });

    if patch.is_empty() {
        None
    } else {
        Some(patch)
    }
}

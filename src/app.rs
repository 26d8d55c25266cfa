use chrono::{Duration, NaiveDate};
use gantt_scheduler::config::Settings;
use gantt_scheduler::recurrence::{Frequency, RecurrenceRule};
use gantt_scheduler::{Task, TaskPriority, TaskSink, TaskStatus, TimelineEngine, User};
use gantt_scheduler::model::TimelineViewport;
use tracing::{info, warn};
use uuid::Uuid;

use crate::ui;

/// In-memory store the engine reports committed changes to.
///
/// Mirrors the engine's task table so the rest of the application can
/// observe what was created or changed, and keeps the audit trail for
/// recurring series.
#[derive(Debug, Default)]
pub struct TaskStore {
    pub tasks: Vec<Task>,
    pub audit_log: Vec<String>,
    pub last_change: Option<String>,
}

impl TaskStore {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            ..Default::default()
        }
    }

    /// Take the most recent change summary, if any.
    pub fn take_last_change(&mut self) -> Option<String> {
        self.last_change.take()
    }
}

impl TaskSink for TaskStore {
    fn create_tasks(&mut self, tasks: &[Task], audit: Option<&str>) {
        self.tasks.extend_from_slice(tasks);
        if let Some(entry) = audit {
            self.audit_log.push(entry.to_string());
        }
        self.last_change = Some(match (audit, tasks) {
            (Some(entry), _) => entry.to_string(),
            (None, [task]) => format!("Task '{}' added", task.name),
            (None, _) => format!("{} tasks added", tasks.len()),
        });
    }

    fn commit_updates(&mut self, tasks: &[Task]) {
        for updated in tasks {
            match self.tasks.iter_mut().find(|t| t.id == updated.id) {
                Some(slot) => *slot = updated.clone(),
                None => warn!(task = %updated.id, "update for task missing from store"),
            }
        }
        self.last_change = Some(match tasks {
            [task] => format!(
                "Updated '{}' ({} → {})",
                task.name,
                task.start.format("%Y-%m-%d"),
                task.end.format("%Y-%m-%d")
            ),
            _ => format!("Updated {} tasks", tasks.len()),
        });
    }
}

/// State of the "Add Task" dialog.
pub struct NewTaskForm {
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub assignee: Option<Uuid>,
    pub parent: Option<Uuid>,
    pub recurring: bool,
    pub frequency: Frequency,
    pub repeat_until: NaiveDate,
}

impl Default for NewTaskForm {
    fn default() -> Self {
        let today = chrono::Local::now().date_naive();
        Self {
            name: String::new(),
            start: today,
            end: today + Duration::days(7),
            priority: TaskPriority::default(),
            status: TaskStatus::default(),
            assignee: None,
            parent: None,
            recurring: false,
            frequency: Frequency::Weekly,
            repeat_until: today + Duration::days(35),
        }
    }
}

impl NewTaskForm {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Hand the form to the engine. A single task's id is returned so it
    /// can be selected; a recurring series yields `None`.
    pub fn submit(&self, engine: &mut TimelineEngine<TaskStore>) -> Result<Option<Uuid>, String> {
        let template = self.to_task();
        if template.end < template.start {
            return Err("End date is before start date".to_string());
        }

        if self.recurring {
            let rule = RecurrenceRule::new(self.frequency, self.repeat_until);
            if engine.create_recurring(&template, &rule) == 0 {
                return Err("Recurrence ends before the task does".to_string());
            }
            Ok(None)
        } else {
            let id = template.id;
            engine
                .create_task(template)
                .map_err(|e| format!("Could not add task: {e}"))?;
            Ok(Some(id))
        }
    }

    fn to_task(&self) -> Task {
        let name = if self.name.trim().is_empty() {
            "New Task".to_string()
        } else {
            self.name.trim().to_string()
        };
        let mut task = Task::new(name, self.start, self.end);
        task.priority = self.priority;
        task.status = self.status;
        task.assignee_id = self.assignee;
        task.parent_id = self.parent;
        task
    }
}

/// Main application state.
pub struct GanttApp {
    pub engine: TimelineEngine<TaskStore>,
    pub selected_task: Option<Uuid>,

    // Dialog state
    pub show_add_task: bool,
    pub show_about: bool,
    pub new_task: NewTaskForm,

    pub status_message: String,
}

impl GanttApp {
    pub fn new(cc: &eframe::CreationContext<'_>, settings: &Settings) -> Self {
        // Register Phosphor icon font as a fallback so icons render inline with text
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        let today = chrono::Local::now().date_naive();
        let (tasks, users) = sample_schedule(today);
        info!(tasks = tasks.len(), users = users.len(), "loaded sample schedule");

        let engine = TimelineEngine::new(
            tasks.clone(),
            users,
            settings.layout_metrics(),
            TimelineViewport::default(),
            TaskStore::new(tasks),
        );

        Self {
            engine,
            selected_task: None,
            show_add_task: false,
            show_about: false,
            new_task: NewTaskForm::default(),
            status_message: "Ready".to_string(),
        }
    }

    /// Create the task (or series) described by the dialog form.
    /// Returns whether anything was created; on failure the form is kept
    /// and the reason shown in the status bar.
    pub fn create_task_from_dialog(&mut self) -> bool {
        match self.new_task.submit(&mut self.engine) {
            Ok(created) => {
                if created.is_some() {
                    self.selected_task = created;
                }
                self.take_store_message();
                self.new_task.reset();
                true
            }
            Err(reason) => {
                self.status_message = reason;
                false
            }
        }
    }

    fn take_store_message(&mut self) {
        if let Some(msg) = self.engine.sink_mut().take_last_change() {
            self.status_message = msg;
        }
    }
}

/// Demonstration data: a small compliance programme with two phases.
///
/// Linked tasks keep a free day between them so every dependency curve
/// is drawn.
fn sample_schedule(today: NaiveDate) -> (Vec<Task>, Vec<User>) {
    let users = vec![
        User::new("Alice Moreau"),
        User::new("Ben Okafor"),
        User::new("Chen Wei"),
    ];
    let d = |days: i64| today + Duration::days(days);

    let mut audit = Task::new("Annual Compliance Audit", d(-5), d(24));
    audit.priority = TaskPriority::High;
    audit.status = TaskStatus::InProgress;
    audit.assignee_id = Some(users[0].id);

    let mut scoping = Task::new("Scope Controls", d(-5), d(-1))
        .with_parent(audit.id)
        .with_assignee(users[0].id);
    scoping.status = TaskStatus::Completed;

    let mut evidence = Task::new("Collect Evidence", d(1), d(9))
        .with_parent(audit.id)
        .with_dependency(scoping.id)
        .with_assignee(users[1].id);
    evidence.status = TaskStatus::InProgress;
    evidence.description = "Access reviews, change tickets, backup logs".to_string();

    let review = Task::new("Review Findings", d(11), d(16))
        .with_parent(audit.id)
        .with_dependency(evidence.id)
        .with_assignee(users[2].id);

    let mut report = Task::new("Draft Report", d(18), d(24))
        .with_parent(audit.id)
        .with_dependency(review.id)
        .with_assignee(users[0].id);
    report.priority = TaskPriority::High;

    let mut training = Task::new("Policy Training", d(3), d(20));
    training.priority = TaskPriority::Low;

    let session = Task::new("Onboarding Session", d(3), d(4))
        .with_parent(training.id)
        .with_assignee(users[2].id);

    let quiz = Task::new("Policy Quiz", d(12), d(20))
        .with_parent(training.id)
        .with_dependency(session.id);

    let tasks = vec![
        audit, scoping, evidence, review, report, training, session, quiz,
    ];
    (tasks, users)
}

impl eframe::App for GanttApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ui::theme::apply_theme(ctx);

        // Top panel: toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::toolbar::show_toolbar(self, ui);
        });

        // Bottom panel: status bar
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(24.0)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_HEADER)
                    .inner_margin(egui::Margin::symmetric(10.0, 0.0)),
            )
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new(&self.status_message)
                            .size(11.0)
                            .color(ui::theme::TEXT_SECONDARY),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            egui::RichText::new(format!("Tasks: {}", self.engine.tasks().len()))
                                .size(10.5)
                                .color(ui::theme::TEXT_DIM),
                        );
                        ui.label(egui::RichText::new(" · ").size(10.5).color(ui::theme::TEXT_DIM));
                        ui.label(
                            egui::RichText::new(format!(
                                "Zoom: {:.0}%",
                                self.engine.viewport().zoom * 100.0
                            ))
                            .size(10.5)
                            .color(ui::theme::TEXT_DIM),
                        );
                    });
                });
            });

        // Left panel: editor + task table
        let mut task_action = ui::task_table::TaskTableAction::None;
        let mut edit: Option<(Uuid, gantt_scheduler::TaskPatch)> = None;
        egui::SidePanel::left("task_panel")
            .default_width(320.0)
            .min_width(240.0)
            .max_width(640.0)
            .resizable(true)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_PANEL)
                    .inner_margin(egui::Margin::same(8.0))
                    .stroke(egui::Stroke::new(1.0, ui::theme::BORDER_SUBTLE)),
            )
            .show(ctx, |ui| {
                if let Some(task) = self.selected_task.and_then(|id| self.engine.task(id)) {
                    let descendants = self.engine.descendants(task.id);
                    if let Some(patch) = ui::task_editor::show_task_editor(
                        task,
                        self.engine.tasks(),
                        &descendants,
                        self.engine.users(),
                        ui,
                    ) {
                        edit = Some((task.id, patch));
                    }
                    ui.add_space(4.0);
                    ui.separator();
                    ui.add_space(2.0);
                }

                task_action =
                    ui::task_table::show_task_table(&self.engine, self.selected_task, ui);
            });

        if let Some((id, patch)) = edit {
            if self.engine.apply_edit(id, patch) {
                self.take_store_message();
            } else {
                self.status_message = "Edit rejected".to_string();
            }
        }

        match task_action {
            ui::task_table::TaskTableAction::Select(id) => self.selected_task = Some(id),
            ui::task_table::TaskTableAction::Add => self.show_add_task = true,
            ui::task_table::TaskTableAction::None => {}
        }

        // Central panel: Gantt chart
        let chart_frame = egui::Frame::default()
            .fill(ui::theme::BG_DARK)
            .inner_margin(egui::Margin::ZERO);
        egui::CentralPanel::default().frame(chart_frame).show(ctx, |ui| {
            let chart =
                ui::gantt_chart::show_gantt_chart(&mut self.engine, &mut self.selected_task, ui);
            if chart.changed {
                self.take_store_message();
            }
        });

        // Dialogs
        if self.show_add_task {
            ui::dialogs::show_add_task_dialog(self, ctx);
        }
        if self.show_about {
            ui::dialogs::show_about_dialog(self, ctx);
        }
    }
}

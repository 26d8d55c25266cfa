//! The scheduling engine: owns the task graph, the derived projection, and
//! the active gesture, and reports every committed change to a collaborator.

use chrono::NaiveDate;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::interaction::{GesturePreview, InteractionState};
use crate::layout::{self, LayoutMetrics, Point, TimelineProjection};
use crate::model::{Task, TaskGraph, TaskPatch, TimelineViewport, User};
use crate::paths::{dependency_paths, DependencyPath};
use crate::recurrence::{self, RecurrenceRule};

/// Receiver for changes the engine commits. Implemented by the surrounding
/// application's state store.
pub trait TaskSink {
    /// New tasks were created. `audit` describes a recurrence batch.
    fn create_tasks(&mut self, tasks: &[Task], audit: Option<&str>);

    /// Existing tasks were changed by a gesture or a direct edit.
    fn commit_updates(&mut self, tasks: &[Task]);
}

pub struct TimelineEngine<S: TaskSink> {
    graph: TaskGraph,
    users: Vec<User>,
    viewport: TimelineViewport,
    metrics: LayoutMetrics,
    today: NaiveDate,
    projection: TimelineProjection,
    paths: Vec<DependencyPath>,
    interaction: InteractionState,
    sink: S,
}

impl<S: TaskSink> TimelineEngine<S> {
    pub fn new(
        tasks: Vec<Task>,
        users: Vec<User>,
        metrics: LayoutMetrics,
        viewport: TimelineViewport,
        sink: S,
    ) -> Self {
        let today = chrono::Local::now().date_naive();
        let graph = TaskGraph::new(tasks);
        let projection = layout::layout_on(graph.tasks(), &viewport, &metrics, today);
        let paths = dependency_paths(graph.tasks(), &projection);
        Self {
            graph,
            users,
            viewport,
            metrics,
            today,
            projection,
            paths,
            interaction: InteractionState::Idle,
            sink,
        }
    }

    // ── Read access ─────────────────────────────────────────────

    pub fn tasks(&self) -> &[Task] {
        self.graph.tasks()
    }

    pub fn task(&self, id: Uuid) -> Option<&Task> {
        self.graph.get(id)
    }

    pub fn graph(&self) -> &TaskGraph {
        &self.graph
    }

    pub fn descendants(&self, id: Uuid) -> Vec<Uuid> {
        self.graph.descendants(id)
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn user(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Display name of a task's assignee, or "Unassigned".
    pub fn assignee_name(&self, task: &Task) -> &str {
        task.assignee_id
            .and_then(|id| self.user(id))
            .map(|u| u.name.as_str())
            .unwrap_or("Unassigned")
    }

    pub fn projection(&self) -> &TimelineProjection {
        &self.projection
    }

    pub fn paths(&self) -> &[DependencyPath] {
        &self.paths
    }

    pub fn viewport(&self) -> &TimelineViewport {
        &self.viewport
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn preview(&self) -> Option<GesturePreview> {
        self.interaction.preview(self.projection.day_width)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Tasks in the same top-to-bottom order as the timeline rows.
    pub fn display_tasks(&self) -> Vec<(&Task, usize)> {
        self.projection
            .rows
            .iter()
            .filter_map(|g| self.graph.get(g.id).map(|t| (t, g.level)))
            .collect()
    }

    // ── Viewport ────────────────────────────────────────────────

    pub fn set_viewport_width(&mut self, width: f32) {
        if (self.viewport.width - width).abs() > f32::EPSILON {
            self.viewport.width = width;
            self.relayout();
        }
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
        self.relayout();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
        self.relayout();
    }

    pub fn reset_zoom(&mut self) {
        self.viewport.reset_zoom();
        self.relayout();
    }

    /// Pin the date used for the today marker.
    pub fn set_today(&mut self, today: NaiveDate) {
        if self.today != today {
            self.today = today;
            self.relayout();
        }
    }

    // ── External data ───────────────────────────────────────────

    /// Replace the task and user lists from the application store.
    /// Any gesture in flight is abandoned.
    pub fn replace_data(&mut self, tasks: Vec<Task>, users: Vec<User>) {
        self.interaction.cancel();
        self.graph = TaskGraph::new(tasks);
        self.users = users;
        self.relayout();
    }

    // ── Gestures ────────────────────────────────────────────────

    /// Returns whether a gesture started.
    pub fn pointer_down(&mut self, pointer: Point) -> bool {
        self.interaction
            .pointer_down(pointer, &self.graph, &self.projection)
    }

    pub fn pointer_move(&mut self, pointer: Point) {
        self.interaction.pointer_move(pointer);
    }

    /// Finish the active gesture, committing its change if it is valid.
    /// Returns whether the model changed.
    pub fn pointer_up(&mut self, pointer: Point) -> bool {
        let plan = self
            .interaction
            .pointer_up(pointer, &self.graph, &self.projection);
        if plan.is_empty() {
            return false;
        }
        let linked = plan.iter().any(|(_, p)| p.dependencies.is_some());
        let changed = self.commit(&plan);
        if changed && linked {
            if let Some(cycle) = self.graph.find_dependency_cycle() {
                warn!(len = cycle.len(), "dependency cycle detected after link");
            }
        }
        changed
    }

    pub fn cancel_gesture(&mut self) {
        self.interaction.cancel();
    }

    // ── Direct edits and creation ───────────────────────────────

    /// Apply a form edit to one task. Invalid edits are dropped silently.
    pub fn apply_edit(&mut self, id: Uuid, patch: TaskPatch) -> bool {
        if patch.is_empty() {
            return false;
        }
        self.commit(&[(id, patch)])
    }

    /// Apply several edits as one unit.
    pub fn apply_updates(&mut self, updates: &[(Uuid, TaskPatch)]) -> bool {
        self.commit(updates)
    }

    pub fn create_task(&mut self, task: Task) -> Result<()> {
        self.graph.insert(task.clone())?;
        info!(task = %task.id, name = %task.name, "task created");
        self.sink.create_tasks(std::slice::from_ref(&task), None);
        self.relayout();
        Ok(())
    }

    /// Expand `template` by `rule` and create the whole series at once.
    ///
    /// A rule ending before the template's own end date is rejected and
    /// nothing is created. Returns the number of instances created.
    pub fn create_recurring(&mut self, template: &Task, rule: &RecurrenceRule) -> usize {
        if rule.end_date < template.end {
            debug!(end = %rule.end_date, "recurrence rejected: ends before template");
            return 0;
        }
        let instances = recurrence::expand(template, rule);
        if instances.is_empty() {
            return 0;
        }

        let mut staged = self.graph.clone();
        for instance in &instances {
            if let Err(e) = staged.insert(instance.clone()) {
                debug!("recurrence rejected: {e}");
                return 0;
            }
        }
        self.graph = staged;

        let audit = recurrence::describe(template, rule, instances.len());
        info!("{audit}");
        self.sink.create_tasks(&instances, Some(&audit));
        self.relayout();
        instances.len()
    }

    fn commit(&mut self, updates: &[(Uuid, TaskPatch)]) -> bool {
        match self.graph.batch_update(updates) {
            Ok(updated) => {
                debug!(count = updated.len(), "committed task updates");
                self.sink.commit_updates(&updated);
                self.relayout();
                true
            }
            Err(e) => {
                debug!("update discarded: {e}");
                false
            }
        }
    }

    fn relayout(&mut self) {
        self.projection =
            layout::layout_on(self.graph.tasks(), &self.viewport, &self.metrics, self.today);
        self.paths = dependency_paths(self.graph.tasks(), &self.projection);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        created: Vec<Task>,
        audits: Vec<String>,
        committed: Vec<Vec<Task>>,
    }

    impl TaskSink for Recorder {
        fn create_tasks(&mut self, tasks: &[Task], audit: Option<&str>) {
            self.created.extend_from_slice(tasks);
            self.audits.extend(audit.map(str::to_string));
        }

        fn commit_updates(&mut self, tasks: &[Task]) {
            self.committed.push(tasks.to_vec());
        }
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn engine(tasks: Vec<Task>) -> TimelineEngine<Recorder> {
        let mut e = TimelineEngine::new(
            tasks,
            Vec::new(),
            LayoutMetrics::default(),
            TimelineViewport::new(0.0),
            Recorder::default(),
        );
        e.set_today(d("2024-08-01"));
        e
    }

    #[test]
    fn invalid_edit_is_silently_dropped() {
        let a = Task::new("A", d("2024-08-01"), d("2024-08-05"));
        let id = a.id;
        let mut e = engine(vec![a]);
        assert!(!e.apply_edit(id, TaskPatch::end(d("2024-07-01"))));
        assert_eq!(e.task(id).unwrap().end, d("2024-08-05"));
        assert!(e.sink().committed.is_empty());
    }

    #[test]
    fn edit_relayouts_and_notifies() {
        let a = Task::new("A", d("2024-08-01"), d("2024-08-05"));
        let id = a.id;
        let mut e = engine(vec![a]);
        assert!(e.apply_edit(id, TaskPatch::end(d("2024-08-09"))));
        assert_eq!(e.projection().geometry(id).unwrap().duration_days, 9);
        assert_eq!(e.sink().committed.len(), 1);
    }

    #[test]
    fn recurrence_reports_batch_with_audit_line() {
        let mut e = engine(Vec::new());
        let template = Task::new("Fire drill", d("2024-08-01"), d("2024-08-01"));
        let rule = RecurrenceRule::new(recurrence::Frequency::Weekly, d("2024-08-22"));
        assert_eq!(e.create_recurring(&template, &rule), 4);
        assert_eq!(e.tasks().len(), 4);
        assert_eq!(e.sink().created.len(), 4);
        assert_eq!(e.sink().audits.len(), 1);
        assert_eq!(e.projection().rows.len(), 4);
    }

    #[test]
    fn recurrence_ending_before_template_end_is_rejected() {
        let mut e = engine(Vec::new());
        let template = Task::new("Audit", d("2024-08-01"), d("2024-08-10"));
        let rule = RecurrenceRule::new(recurrence::Frequency::Daily, d("2024-08-05"));
        assert_eq!(e.create_recurring(&template, &rule), 0);
        assert!(e.tasks().is_empty());
        assert!(e.sink().created.is_empty());
    }

    #[test]
    fn assignee_falls_back_when_user_unknown() {
        let user = User::new("Dana");
        let a = Task::new("A", d("2024-08-01"), d("2024-08-02")).with_assignee(user.id);
        let b = Task::new("B", d("2024-08-01"), d("2024-08-02")).with_assignee(Uuid::new_v4());
        let mut e = engine(vec![a.clone(), b.clone()]);
        e.replace_data(vec![a.clone(), b.clone()], vec![user]);
        assert_eq!(e.assignee_name(&a), "Dana");
        assert_eq!(e.assignee_name(&b), "Unassigned");
    }
}

//! Pointer gesture state machine.
//!
//! At most one gesture is in flight. While it is active, pointer moves only
//! change the preview; the task graph is untouched until release, when the
//! gesture produces a batch of patches (possibly empty) to commit.

use chrono::{Duration, NaiveDate};
use tracing::debug;
use uuid::Uuid;

use crate::layout::{Affordance, Hit, Point, TimelineProjection};
use crate::model::{TaskGraph, TaskPatch};

/// Dates of one task captured when a gesture starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateSnapshot {
    pub id: Uuid,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    /// Whole-bar drag. `members[0]` is the grabbed task, followed by every
    /// descendant captured at gesture start.
    Move {
        origin: Point,
        current: Point,
        members: Vec<DateSnapshot>,
    },
    ResizeStart {
        origin: Point,
        current: Point,
        task: DateSnapshot,
    },
    ResizeEnd {
        origin: Point,
        current: Point,
        task: DateSnapshot,
    },
    Link {
        source: Uuid,
        anchor: Point,
        current: Point,
    },
}

/// Proposed dates for one bar during a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewBar {
    pub id: Uuid,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// False when the proposal would be discarded on release.
    pub valid: bool,
}

/// Overlay drawn on top of the committed projection while a gesture runs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GesturePreview {
    pub day_delta: i64,
    pub bars: Vec<PreviewBar>,
    /// Rubber-band line from the source connector to the pointer.
    pub link: Option<(Point, Point)>,
}

impl GesturePreview {
    pub fn bar(&self, id: Uuid) -> Option<&PreviewBar> {
        self.bars.iter().find(|b| b.id == id)
    }
}

impl Gesture {
    /// Start a gesture for the affordance under the pointer.
    pub fn begin(
        hit: Hit,
        pointer: Point,
        graph: &TaskGraph,
        projection: &TimelineProjection,
    ) -> Option<Self> {
        let task = graph.get(hit.task_id)?;
        let snapshot = DateSnapshot {
            id: task.id,
            start: task.start,
            end: task.end,
        };
        let gesture = match hit.affordance {
            Affordance::Body => {
                let mut members = vec![snapshot];
                members.extend(graph.descendants(task.id).into_iter().filter_map(|id| {
                    graph.get(id).map(|t| DateSnapshot {
                        id,
                        start: t.start,
                        end: t.end,
                    })
                }));
                Gesture::Move {
                    origin: pointer,
                    current: pointer,
                    members,
                }
            }
            Affordance::LeftHandle => Gesture::ResizeStart {
                origin: pointer,
                current: pointer,
                task: snapshot,
            },
            Affordance::RightHandle => Gesture::ResizeEnd {
                origin: pointer,
                current: pointer,
                task: snapshot,
            },
            Affordance::Connector => {
                let bar = projection.geometry(task.id)?.bar;
                Gesture::Link {
                    source: task.id,
                    anchor: projection.connector_center(&bar),
                    current: pointer,
                }
            }
        };
        Some(gesture)
    }

    pub fn task_id(&self) -> Uuid {
        match self {
            Gesture::Move { members, .. } => members[0].id,
            Gesture::ResizeStart { task, .. } | Gesture::ResizeEnd { task, .. } => task.id,
            Gesture::Link { source, .. } => *source,
        }
    }

    pub fn update(&mut self, pointer: Point) {
        match self {
            Gesture::Move { current, .. }
            | Gesture::ResizeStart { current, .. }
            | Gesture::ResizeEnd { current, .. }
            | Gesture::Link { current, .. } => *current = pointer,
        }
    }

    /// Whole-day offset of the pointer since the gesture began.
    pub fn day_delta(&self, day_width: f32) -> i64 {
        let (origin, current) = match self {
            Gesture::Move {
                origin, current, ..
            }
            | Gesture::ResizeStart {
                origin, current, ..
            }
            | Gesture::ResizeEnd {
                origin, current, ..
            } => (origin, current),
            Gesture::Link { .. } => return 0,
        };
        if day_width <= 0.0 {
            return 0;
        }
        ((current.x - origin.x) / day_width).round() as i64
    }

    /// Pure preview of the gesture at its current pointer position.
    pub fn preview(&self, day_width: f32) -> GesturePreview {
        let delta = self.day_delta(day_width);
        let shift = Duration::days(delta);
        match self {
            Gesture::Move { members, .. } => GesturePreview {
                day_delta: delta,
                bars: members
                    .iter()
                    .map(|m| PreviewBar {
                        id: m.id,
                        start: m.start + shift,
                        end: m.end + shift,
                        valid: true,
                    })
                    .collect(),
                link: None,
            },
            Gesture::ResizeStart { task, .. } => {
                let start = task.start + shift;
                GesturePreview {
                    day_delta: delta,
                    bars: vec![PreviewBar {
                        id: task.id,
                        start,
                        end: task.end,
                        valid: start <= task.end,
                    }],
                    link: None,
                }
            }
            Gesture::ResizeEnd { task, .. } => {
                let end = task.end + shift;
                GesturePreview {
                    day_delta: delta,
                    bars: vec![PreviewBar {
                        id: task.id,
                        start: task.start,
                        end,
                        valid: end >= task.start,
                    }],
                    link: None,
                }
            }
            Gesture::Link {
                anchor, current, ..
            } => GesturePreview {
                day_delta: 0,
                bars: Vec::new(),
                link: Some((*anchor, *current)),
            },
        }
    }

    /// Patches to commit when the pointer is released over `target`.
    ///
    /// Invalid resizes and degenerate links produce an empty batch.
    pub fn commit_plan(
        &self,
        target: Option<Uuid>,
        graph: &TaskGraph,
        day_width: f32,
    ) -> Vec<(Uuid, TaskPatch)> {
        let delta = self.day_delta(day_width);
        let shift = Duration::days(delta);
        match self {
            Gesture::Move { members, .. } => {
                if delta == 0 {
                    return Vec::new();
                }
                members
                    .iter()
                    .map(|m| (m.id, TaskPatch::dates(m.start + shift, m.end + shift)))
                    .collect()
            }
            Gesture::ResizeStart { task, .. } => {
                let start = task.start + shift;
                if delta == 0 || start > task.end {
                    debug!(task = %task.id, %start, "discarding resize: start after end");
                    return Vec::new();
                }
                vec![(task.id, TaskPatch::start(start))]
            }
            Gesture::ResizeEnd { task, .. } => {
                let end = task.end + shift;
                if delta == 0 || end < task.start {
                    debug!(task = %task.id, %end, "discarding resize: end before start");
                    return Vec::new();
                }
                vec![(task.id, TaskPatch::end(end))]
            }
            Gesture::Link { source, .. } => {
                let Some(target_id) = target.filter(|t| t != source) else {
                    debug!(%source, "discarding link: no target or self-link");
                    return Vec::new();
                };
                let Some(target_task) = graph.get(target_id) else {
                    return Vec::new();
                };
                if target_task.depends_on(*source) {
                    debug!(%source, target = %target_id, "discarding link: already present");
                    return Vec::new();
                }
                let mut deps = target_task.dependencies.clone();
                deps.push(*source);
                vec![(target_id, TaskPatch::dependencies(deps))]
            }
        }
    }
}

/// Idle, or exactly one active gesture.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Active(Gesture),
}

impl InteractionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionState::Idle)
    }

    pub fn gesture(&self) -> Option<&Gesture> {
        match self {
            InteractionState::Idle => None,
            InteractionState::Active(g) => Some(g),
        }
    }

    /// Begin a gesture if idle and the pointer is over a task affordance.
    /// Returns whether a gesture started.
    pub fn pointer_down(
        &mut self,
        pointer: Point,
        graph: &TaskGraph,
        projection: &TimelineProjection,
    ) -> bool {
        if !self.is_idle() {
            debug!("pointer down ignored: gesture already active");
            return false;
        }
        let Some(hit) = projection.hit_test(pointer) else {
            return false;
        };
        match Gesture::begin(hit, pointer, graph, projection) {
            Some(gesture) => {
                debug!(task = %hit.task_id, affordance = ?hit.affordance, "gesture started");
                *self = InteractionState::Active(gesture);
                true
            }
            None => false,
        }
    }

    pub fn pointer_move(&mut self, pointer: Point) {
        if let InteractionState::Active(gesture) = self {
            gesture.update(pointer);
        }
    }

    /// End the gesture and return the patches it proposes. Always leaves the
    /// state idle.
    pub fn pointer_up(
        &mut self,
        pointer: Point,
        graph: &TaskGraph,
        projection: &TimelineProjection,
    ) -> Vec<(Uuid, TaskPatch)> {
        let InteractionState::Active(mut gesture) = std::mem::take(self) else {
            return Vec::new();
        };
        gesture.update(pointer);
        let target = projection.hit_test(pointer).map(|h| h.task_id);
        gesture.commit_plan(target, graph, projection.day_width)
    }

    /// Abandon the gesture, discarding any pending change.
    pub fn cancel(&mut self) {
        if let InteractionState::Active(g) = std::mem::take(self) {
            debug!(task = %g.task_id(), "gesture cancelled");
        }
    }

    pub fn preview(&self, day_width: f32) -> Option<GesturePreview> {
        self.gesture().map(|g| g.preview(day_width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{layout_on, LayoutMetrics};
    use crate::model::{Task, TimelineViewport};

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    struct Fixture {
        graph: TaskGraph,
        projection: TimelineProjection,
        a: Uuid,
        b: Uuid,
    }

    fn fixture() -> Fixture {
        let a = Task::new("A", d("2024-08-01"), d("2024-08-05"));
        let b = Task::new("B", d("2024-08-02"), d("2024-08-03")).with_parent(a.id);
        let (a_id, b_id) = (a.id, b.id);
        let graph = TaskGraph::new(vec![a, b]);
        let projection = layout_on(
            graph.tasks(),
            &TimelineViewport::new(0.0),
            &LayoutMetrics::default(),
            d("2024-08-01"),
        );
        Fixture {
            graph,
            projection,
            a: a_id,
            b: b_id,
        }
    }

    fn body_of(f: &Fixture, id: Uuid) -> Point {
        let bar = f.projection.geometry(id).unwrap().bar;
        Point::new(bar.left() + bar.width / 2.0, bar.center_y())
    }

    #[test]
    fn move_preview_does_not_touch_model() {
        let f = fixture();
        let mut state = InteractionState::default();
        let start = body_of(&f, f.a);
        assert!(state.pointer_down(start, &f.graph, &f.projection));
        state.pointer_move(Point::new(start.x + 3.0 * f.projection.day_width, start.y));

        let preview = state.preview(f.projection.day_width).unwrap();
        assert_eq!(preview.day_delta, 3);
        assert_eq!(preview.bar(f.b).unwrap().start, d("2024-08-05"));
        assert_eq!(f.graph.get(f.a).unwrap().start, d("2024-08-01"));
    }

    #[test]
    fn move_commits_parent_and_children_together() {
        let f = fixture();
        let mut state = InteractionState::default();
        let start = body_of(&f, f.a);
        state.pointer_down(start, &f.graph, &f.projection);
        let release = Point::new(start.x + 3.0 * f.projection.day_width, start.y);
        let plan = state.pointer_up(release, &f.graph, &f.projection);

        assert!(state.is_idle());
        assert_eq!(
            plan,
            vec![
                (f.a, TaskPatch::dates(d("2024-08-04"), d("2024-08-08"))),
                (f.b, TaskPatch::dates(d("2024-08-05"), d("2024-08-06"))),
            ]
        );
    }

    #[test]
    fn sub_half_day_drag_rounds_to_nothing() {
        let f = fixture();
        let mut state = InteractionState::default();
        let start = body_of(&f, f.a);
        state.pointer_down(start, &f.graph, &f.projection);
        let release = Point::new(start.x + 0.4 * f.projection.day_width, start.y);
        assert!(state.pointer_up(release, &f.graph, &f.projection).is_empty());
    }

    #[test]
    fn inverted_resize_is_previewed_invalid_and_discarded() {
        let f = fixture();
        let bar = f.projection.geometry(f.b).unwrap().bar;
        let grab = Point::new(bar.right() - 1.0, bar.center_y());
        let mut state = InteractionState::default();
        assert!(state.pointer_down(grab, &f.graph, &f.projection));
        assert!(matches!(state.gesture(), Some(Gesture::ResizeEnd { .. })));

        let dw = f.projection.day_width;
        state.pointer_move(Point::new(grab.x - 4.0 * dw, grab.y));
        assert!(!state.preview(dw).unwrap().bars[0].valid);
        let plan = state.pointer_up(Point::new(grab.x - 4.0 * dw, grab.y), &f.graph, &f.projection);
        assert!(plan.is_empty());
    }

    #[test]
    fn resize_start_changes_only_start() {
        let f = fixture();
        let bar = f.projection.geometry(f.a).unwrap().bar;
        let grab = Point::new(bar.left() + 1.0, bar.center_y());
        let mut state = InteractionState::default();
        state.pointer_down(grab, &f.graph, &f.projection);
        let dw = f.projection.day_width;
        let plan = state.pointer_up(Point::new(grab.x - 2.0 * dw, grab.y), &f.graph, &f.projection);
        assert_eq!(plan, vec![(f.a, TaskPatch::start(d("2024-07-30")))]);
    }

    #[test]
    fn link_adds_source_to_target_dependencies() {
        let f = fixture();
        let bar = f.projection.geometry(f.a).unwrap().bar;
        let dot = f.projection.connector_center(&bar);
        let mut state = InteractionState::default();
        assert!(state.pointer_down(dot, &f.graph, &f.projection));

        let plan = state.pointer_up(body_of(&f, f.b), &f.graph, &f.projection);
        assert_eq!(plan, vec![(f.b, TaskPatch::dependencies(vec![f.a]))]);
    }

    #[test]
    fn link_to_self_or_empty_space_is_a_no_op() {
        let f = fixture();
        let bar = f.projection.geometry(f.a).unwrap().bar;
        let dot = f.projection.connector_center(&bar);

        let mut state = InteractionState::default();
        state.pointer_down(dot, &f.graph, &f.projection);
        assert!(state.pointer_up(body_of(&f, f.a), &f.graph, &f.projection).is_empty());

        state.pointer_down(dot, &f.graph, &f.projection);
        let nowhere = Point::new(dot.x, 10_000.0);
        assert!(state.pointer_up(nowhere, &f.graph, &f.projection).is_empty());
    }

    #[test]
    fn second_gesture_is_refused_while_one_is_active() {
        let f = fixture();
        let mut state = InteractionState::default();
        assert!(state.pointer_down(body_of(&f, f.a), &f.graph, &f.projection));
        assert!(!state.pointer_down(body_of(&f, f.b), &f.graph, &f.projection));
        assert_eq!(state.gesture().unwrap().task_id(), f.a);
    }

    #[test]
    fn cancel_discards_pending_delta() {
        let f = fixture();
        let mut state = InteractionState::default();
        let start = body_of(&f, f.a);
        state.pointer_down(start, &f.graph, &f.projection);
        state.pointer_move(Point::new(start.x + 200.0, start.y));
        state.cancel();
        assert!(state.is_idle());
        assert!(state
            .pointer_up(Point::new(start.x + 200.0, start.y), &f.graph, &f.projection)
            .is_empty());
    }
}

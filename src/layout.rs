//! Timeline layout: derives the shared date axis and per-task bar geometry.
//!
//! The projection is a pure function of the task set and the viewport. It is
//! rebuilt after every committed change and never mutated in place.

use std::collections::{HashMap, HashSet};

use chrono::{Datelike, Duration, NaiveDate};
use uuid::Uuid;

use crate::model::{Task, TimelineViewport};

/// A position in chart pixel space (origin at the top-left of the grid).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in chart pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BarRect {
    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }
}

/// Pixel constants shared by layout, hit testing, and path anchoring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutMetrics {
    pub min_day_width: f32,
    pub row_height: f32,
    pub bar_inset: f32,
    pub handle_width: f32,
    pub connector_radius: f32,
    pub grid_lead_days: i64,
    pub grid_trail_days: i64,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        crate::config::Settings::default().layout_metrics()
    }
}

/// Which part of a task bar the pointer is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affordance {
    Body,
    LeftHandle,
    RightHandle,
    Connector,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub task_id: Uuid,
    pub affordance: Affordance,
}

/// Geometry of one task row.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskGeometry {
    pub id: Uuid,
    /// Top-to-bottom display position.
    pub row: usize,
    /// Indentation depth; 0 for tasks without a (resolvable) parent.
    pub level: usize,
    pub offset_days: i64,
    pub duration_days: i64,
    pub bar: BarRect,
}

/// Read-only projection of the task set onto a date grid.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineProjection {
    pub grid_start: NaiveDate,
    pub total_days: i64,
    pub day_width: f32,
    pub metrics: LayoutMetrics,
    /// Rows in display order.
    pub rows: Vec<TaskGeometry>,
    /// Offset of today's column when it falls inside the grid.
    pub today_offset_days: Option<i64>,
    index: HashMap<Uuid, usize>,
}

impl TimelineProjection {
    pub fn geometry(&self, id: Uuid) -> Option<&TaskGeometry> {
        self.index.get(&id).map(|&i| &self.rows[i])
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.index.contains_key(&id)
    }

    pub fn grid_end(&self) -> NaiveDate {
        self.grid_start + Duration::days(self.total_days - 1)
    }

    /// Total chart width in pixels.
    pub fn width(&self) -> f32 {
        self.total_days as f32 * self.day_width
    }

    /// Total chart height in pixels.
    pub fn height(&self) -> f32 {
        self.rows.len() as f32 * self.metrics.row_height
    }

    /// Convert a date to the x-pixel of its column's left edge.
    pub fn date_to_x(&self, date: NaiveDate) -> f32 {
        days_between(self.grid_start, date) as f32 * self.day_width
    }

    /// Convert an x-pixel to the date whose column contains it.
    pub fn x_to_date(&self, x: f32) -> NaiveDate {
        self.grid_start + Duration::days((x / self.day_width).floor() as i64)
    }

    /// Bar rectangle for an arbitrary date range on a given row.
    pub fn bar_for(&self, row: usize, start: NaiveDate, end: NaiveDate) -> BarRect {
        let m = &self.metrics;
        let duration = days_between(start, end) + 1;
        BarRect {
            x: self.date_to_x(start),
            y: row as f32 * m.row_height + m.bar_inset,
            width: duration.max(1) as f32 * self.day_width,
            height: m.row_height - m.bar_inset * 2.0,
        }
    }

    pub fn left_handle(&self, bar: &BarRect) -> BarRect {
        let hw = self.metrics.handle_width;
        BarRect {
            x: bar.left() - hw / 2.0,
            y: bar.top(),
            width: hw,
            height: bar.height,
        }
    }

    pub fn right_handle(&self, bar: &BarRect) -> BarRect {
        let hw = self.metrics.handle_width;
        BarRect {
            x: bar.right() - hw / 2.0,
            y: bar.top(),
            width: hw,
            height: bar.height,
        }
    }

    /// Center of the link connector dot drawn just past the bar's right edge.
    pub fn connector_center(&self, bar: &BarRect) -> Point {
        Point::new(
            bar.right() + self.metrics.handle_width / 2.0 + self.metrics.connector_radius,
            bar.center_y(),
        )
    }

    /// Resolve a pointer position to the task affordance under it.
    ///
    /// Priority: connector dot, then edge handles, then bar body.
    pub fn hit_test(&self, p: Point) -> Option<Hit> {
        let row_height = self.metrics.row_height;
        if p.y < 0.0 || row_height <= 0.0 {
            return None;
        }
        let row = (p.y / row_height).floor() as usize;
        let geom = self.rows.get(row)?;
        let bar = &geom.bar;

        let c = self.connector_center(bar);
        let r = self.metrics.connector_radius + 2.0;
        let (dx, dy) = (p.x - c.x, p.y - c.y);
        let affordance = if dx * dx + dy * dy <= r * r {
            Affordance::Connector
        } else if self.left_handle(bar).contains(p) {
            Affordance::LeftHandle
        } else if self.right_handle(bar).contains(p) {
            Affordance::RightHandle
        } else if bar.contains(p) {
            Affordance::Body
        } else {
            return None;
        };
        Some(Hit {
            task_id: geom.id,
            affordance,
        })
    }
}

/// Signed whole days from `from` to `to`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Lay out `tasks` for `viewport`, using the local date for the today marker.
pub fn layout(
    tasks: &[Task],
    viewport: &TimelineViewport,
    metrics: &LayoutMetrics,
) -> TimelineProjection {
    layout_on(tasks, viewport, metrics, chrono::Local::now().date_naive())
}

/// Lay out `tasks` as seen on `today`.
pub fn layout_on(
    tasks: &[Task],
    viewport: &TimelineViewport,
    metrics: &LayoutMetrics,
    today: NaiveDate,
) -> TimelineProjection {
    let (grid_start, total_days) = grid_window(tasks, metrics, today);
    let fitted = viewport.width / total_days as f32;
    let day_width = fitted.max(metrics.min_day_width) * viewport.zoom;

    let mut projection = TimelineProjection {
        grid_start,
        total_days,
        day_width,
        metrics: *metrics,
        rows: Vec::with_capacity(tasks.len()),
        today_offset_days: None,
        index: HashMap::with_capacity(tasks.len()),
    };

    for (row, (idx, level)) in display_order(tasks).into_iter().enumerate() {
        let task = &tasks[idx];
        let bar = projection.bar_for(row, task.start, task.end);
        projection.index.insert(task.id, row);
        projection.rows.push(TaskGeometry {
            id: task.id,
            row,
            level,
            offset_days: days_between(grid_start, task.start),
            duration_days: days_between(task.start, task.end) + 1,
            bar,
        });
    }

    let today_offset = days_between(grid_start, today);
    if (0..total_days).contains(&today_offset) {
        projection.today_offset_days = Some(today_offset);
    }
    projection
}

/// Grid start and inclusive day count. Falls back to today's month when
/// there are no tasks.
fn grid_window(tasks: &[Task], metrics: &LayoutMetrics, today: NaiveDate) -> (NaiveDate, i64) {
    let earliest = tasks.iter().map(|t| t.start).min();
    let latest = tasks.iter().map(|t| t.end.max(t.start)).max();
    match (earliest, latest) {
        (Some(first), Some(last)) => {
            let start = first - Duration::days(metrics.grid_lead_days);
            let end = last + Duration::days(metrics.grid_trail_days);
            (start, days_between(start, end).max(0) + 1)
        }
        _ => {
            let month_start = today.with_day(1).unwrap_or(today);
            let next_month = month_start
                .checked_add_months(chrono::Months::new(1))
                .unwrap_or(month_start + Duration::days(31));
            (month_start, days_between(month_start, next_month))
        }
    }
}

/// Top-to-bottom order as `(index into tasks, level)`.
///
/// Roots sorted by start, each followed by its start-sorted subtree,
/// recursively. A task whose parent is missing is treated as a root; tasks
/// caught in a parent loop are appended as roots so every task appears once.
pub fn display_order(tasks: &[Task]) -> Vec<(usize, usize)> {
    let present: HashSet<Uuid> = tasks.iter().map(|t| t.id).collect();
    let mut children: HashMap<Uuid, Vec<usize>> = HashMap::new();
    let mut roots: Vec<usize> = Vec::new();

    for (i, t) in tasks.iter().enumerate() {
        match t.parent_id {
            Some(p) if p != t.id && present.contains(&p) => children.entry(p).or_default().push(i),
            _ => roots.push(i),
        }
    }
    for list in children.values_mut() {
        list.sort_by_key(|&i| tasks[i].start);
    }
    roots.sort_by_key(|&i| tasks[i].start);

    let mut order = Vec::with_capacity(tasks.len());
    let mut visited = vec![false; tasks.len()];
    for &root in &roots {
        visit(tasks, &children, root, &mut visited, &mut order);
    }

    if order.len() < tasks.len() {
        let mut stranded: Vec<usize> = (0..tasks.len()).filter(|&i| !visited[i]).collect();
        stranded.sort_by_key(|&i| tasks[i].start);
        for i in stranded {
            visit(tasks, &children, i, &mut visited, &mut order);
        }
    }
    order
}

fn visit(
    tasks: &[Task],
    children: &HashMap<Uuid, Vec<usize>>,
    root: usize,
    visited: &mut [bool],
    order: &mut Vec<(usize, usize)>,
) {
    let mut stack = vec![(root, 0usize)];
    while let Some((i, level)) = stack.pop() {
        if visited[i] {
            continue;
        }
        visited[i] = true;
        order.push((i, level));
        if let Some(kids) = children.get(&tasks[i].id) {
            // Reverse so the earliest child is popped first.
            for &k in kids.iter().rev() {
                stack.push((k, level + 1));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn project(tasks: &[Task]) -> TimelineProjection {
        layout_on(
            tasks,
            &TimelineViewport::new(0.0),
            &LayoutMetrics::default(),
            d("2024-08-03"),
        )
    }

    #[test]
    fn grid_is_padded_around_tasks() {
        let a = Task::new("A", d("2024-08-01"), d("2024-08-05"));
        let p = project(&[a.clone()]);
        assert_eq!(p.grid_start, d("2024-07-27"));
        assert_eq!(p.grid_end(), d("2024-08-15"));
        assert_eq!(p.total_days, 20);

        let g = p.geometry(a.id).unwrap();
        assert_eq!(g.offset_days, 5);
        assert_eq!(g.duration_days, 5);
        assert_eq!(p.today_offset_days, Some(7));

        let x = p.date_to_x(d("2024-08-04"));
        assert_eq!(p.x_to_date(x + p.day_width * 0.9), d("2024-08-04"));
    }

    #[test]
    fn empty_task_set_spans_current_month() {
        let p = project(&[]);
        assert_eq!(p.grid_start, d("2024-08-01"));
        assert_eq!(p.total_days, 31);
        assert!(p.rows.is_empty());
        assert_eq!(p.today_offset_days, Some(2));
        assert!(p.day_width.is_finite() && p.day_width > 0.0);
    }

    #[test]
    fn day_width_tracks_viewport_but_offsets_do_not() {
        let a = Task::new("A", d("2024-08-01"), d("2024-08-05"));
        let metrics = LayoutMetrics::default();
        let narrow = layout_on(&[a.clone()], &TimelineViewport::new(200.0), &metrics, d("2024-08-01"));
        let wide = layout_on(&[a.clone()], &TimelineViewport::new(2000.0), &metrics, d("2024-08-01"));
        assert_eq!(narrow.day_width, metrics.min_day_width);
        assert_eq!(wide.day_width, 100.0);
        assert_eq!(
            narrow.geometry(a.id).unwrap().offset_days,
            wide.geometry(a.id).unwrap().offset_days
        );
        assert_eq!(wide.geometry(a.id).unwrap().bar.width, 500.0);
    }

    #[test]
    fn children_follow_parents_and_siblings_are_chronological() {
        let late_root = Task::new("Late", d("2024-09-01"), d("2024-09-02"));
        let root = Task::new("Root", d("2024-08-01"), d("2024-08-20"));
        let second = Task::new("Second", d("2024-08-10"), d("2024-08-12")).with_parent(root.id);
        let first = Task::new("First", d("2024-08-02"), d("2024-08-03")).with_parent(root.id);
        let grandchild = Task::new("Grand", d("2024-08-11"), d("2024-08-11")).with_parent(second.id);
        let tasks = vec![late_root.clone(), grandchild.clone(), second.clone(), root.clone(), first.clone()];

        let p = project(&tasks);
        let names: Vec<_> = p
            .rows
            .iter()
            .map(|g| (tasks.iter().find(|t| t.id == g.id).unwrap().name.as_str(), g.level))
            .collect();
        assert_eq!(
            names,
            vec![("Root", 0), ("First", 1), ("Second", 1), ("Grand", 2), ("Late", 0)]
        );
    }

    #[test]
    fn dangling_parent_and_parent_loops_still_render() {
        let orphan = Task::new("Orphan", d("2024-08-05"), d("2024-08-06")).with_parent(Uuid::new_v4());
        let mut x = Task::new("X", d("2024-08-01"), d("2024-08-02"));
        let y = Task::new("Y", d("2024-08-03"), d("2024-08-04")).with_parent(x.id);
        x.parent_id = Some(y.id);
        let p = project(&[orphan.clone(), x.clone(), y.clone()]);
        assert_eq!(p.rows.len(), 3);
        assert_eq!(p.geometry(orphan.id).unwrap().level, 0);
        assert!(p.contains(x.id) && p.contains(y.id));
    }

    #[test]
    fn hit_test_prefers_connector_then_handles() {
        let a = Task::new("A", d("2024-08-01"), d("2024-08-05"));
        let p = project(&[a.clone()]);
        let bar = p.geometry(a.id).unwrap().bar;
        let y = bar.center_y();

        let body = p.hit_test(Point::new(bar.left() + bar.width / 2.0, y)).unwrap();
        assert_eq!(body.affordance, Affordance::Body);
        let left = p.hit_test(Point::new(bar.left() + 1.0, y)).unwrap();
        assert_eq!(left.affordance, Affordance::LeftHandle);
        let right = p.hit_test(Point::new(bar.right() - 1.0, y)).unwrap();
        assert_eq!(right.affordance, Affordance::RightHandle);
        let dot = p.hit_test(p.connector_center(&bar)).unwrap();
        assert_eq!(dot.affordance, Affordance::Connector);

        assert!(p.hit_test(Point::new(bar.right() + 200.0, y)).is_none());
        assert!(p.hit_test(Point::new(bar.left(), y + 500.0)).is_none());
    }
}

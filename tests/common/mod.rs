#![allow(dead_code)]

use std::sync::Once;

use chrono::NaiveDate;
use gantt_scheduler::layout::{LayoutMetrics, Point};
use gantt_scheduler::model::TimelineViewport;
use gantt_scheduler::{Task, TaskSink, TimelineEngine};
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

static INIT: Once = Once::new();

/// Initialise tracing for tests. Output is only shown for failing tests
/// unless run with `--nocapture`; levels come from `RUST_LOG`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

pub fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Sink that records every notification the engine sends.
#[derive(Debug, Default)]
pub struct Recorder {
    pub created: Vec<Task>,
    pub audits: Vec<String>,
    pub committed: Vec<Vec<Task>>,
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

/// Engine with default metrics and a zero-width viewport, so every day is
/// exactly `min_day_width` pixels wide.
pub fn engine(tasks: Vec<Task>) -> TimelineEngine<Recorder> {
    init_tracing();
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

pub fn day_width(e: &TimelineEngine<Recorder>) -> f32 {
    e.projection().day_width
}

pub fn body_center(e: &TimelineEngine<Recorder>, id: Uuid) -> Point {
    let bar = e.projection().geometry(id).unwrap().bar;
    Point::new(bar.left() + bar.width / 2.0, bar.center_y())
}

pub fn left_edge(e: &TimelineEngine<Recorder>, id: Uuid) -> Point {
    let bar = e.projection().geometry(id).unwrap().bar;
    Point::new(bar.left(), bar.center_y())
}

pub fn right_edge(e: &TimelineEngine<Recorder>, id: Uuid) -> Point {
    let bar = e.projection().geometry(id).unwrap().bar;
    Point::new(bar.right(), bar.center_y())
}

pub fn connector(e: &TimelineEngine<Recorder>, id: Uuid) -> Point {
    let bar = e.projection().geometry(id).unwrap().bar;
    e.projection().connector_center(&bar)
}

/// Press at `from`, drag horizontally by `days` whole days, release.
pub fn drag_days(e: &mut TimelineEngine<Recorder>, from: Point, days: i64) -> bool {
    let to = Point::new(from.x + days as f32 * day_width(e), from.y);
    assert!(e.pointer_down(from), "no affordance under {from:?}");
    e.pointer_move(to);
    e.pointer_up(to)
}

/// Press on the source connector, release at `to`.
pub fn drag_link(e: &mut TimelineEngine<Recorder>, source: Uuid, to: Point) -> bool {
    let from = connector(e, source);
    assert!(e.pointer_down(from), "connector not hit");
    e.pointer_move(to);
    e.pointer_up(to)
}

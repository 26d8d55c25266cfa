//! Dependency curves between task bars, derived from the current projection.

use uuid::Uuid;

use crate::layout::{Point, TimelineProjection};
use crate::model::Task;

/// A cubic Bézier from a prerequisite's right edge to a dependent's left edge.
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyPath {
    pub prerequisite: Uuid,
    pub dependent: Uuid,
    pub from: Point,
    pub ctrl1: Point,
    pub ctrl2: Point,
    pub to: Point,
}

impl DependencyPath {
    fn between(prerequisite: Uuid, dependent: Uuid, from: Point, to: Point) -> Self {
        let bend = (to.x - from.x) / 2.0;
        Self {
            prerequisite,
            dependent,
            from,
            ctrl1: Point::new(from.x + bend, from.y),
            ctrl2: Point::new(to.x - bend, to.y),
            to,
        }
    }

    /// Point on the curve at `t` in `[0, 1]`.
    pub fn point_at(&self, t: f32) -> Point {
        let u = 1.0 - t;
        let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
        Point::new(
            a * self.from.x + b * self.ctrl1.x + c * self.ctrl2.x + d * self.to.x,
            a * self.from.y + b * self.ctrl1.y + c * self.ctrl2.y + d * self.to.y,
        )
    }
}

/// Compute one path per drawable dependency edge.
///
/// Edges whose endpoint is missing from the projection are skipped, as are
/// edges where the dependent does not start strictly right of where the
/// prerequisite ends.
pub fn dependency_paths(tasks: &[Task], projection: &TimelineProjection) -> Vec<DependencyPath> {
    let mut paths = Vec::new();
    for task in tasks.iter().filter(|t| !t.dependencies.is_empty()) {
        let Some(dependent) = projection.geometry(task.id) else {
            continue;
        };
        for &dep_id in &task.dependencies {
            let Some(prereq) = projection.geometry(dep_id) else {
                continue;
            };
            let from = Point::new(prereq.bar.right(), prereq.bar.center_y());
            let to = Point::new(dependent.bar.left(), dependent.bar.center_y());
            // Back-to-back days share an edge, so only tasks with at least
            // one free day between them get a curve.
            if to.x <= from.x {
                continue;
            }
            paths.push(DependencyPath::between(dep_id, task.id, from, to));
        }
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{layout_on, LayoutMetrics};
    use crate::model::TimelineViewport;
    use chrono::NaiveDate;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn project(tasks: &[Task]) -> TimelineProjection {
        layout_on(
            tasks,
            &TimelineViewport::new(0.0),
            &LayoutMetrics::default(),
            d("2024-08-01"),
        )
    }

    #[test]
    fn path_runs_from_right_edge_to_left_edge() {
        let a = Task::new("A", d("2024-08-01"), d("2024-08-02"));
        let b = Task::new("B", d("2024-08-05"), d("2024-08-06")).with_dependency(a.id);
        let tasks = vec![a.clone(), b.clone()];
        let p = project(&tasks);
        let paths = dependency_paths(&tasks, &p);

        assert_eq!(paths.len(), 1);
        let path = &paths[0];
        let (ga, gb) = (p.geometry(a.id).unwrap(), p.geometry(b.id).unwrap());
        assert_eq!(path.from, Point::new(ga.bar.right(), ga.bar.center_y()));
        assert_eq!(path.to, Point::new(gb.bar.left(), gb.bar.center_y()));
        assert_eq!(path.point_at(0.0), path.from);
        assert_eq!(path.point_at(1.0), path.to);
    }

    #[test]
    fn overlapping_or_inverted_edges_are_skipped() {
        let a = Task::new("A", d("2024-08-01"), d("2024-08-05"));
        let touching = Task::new("Touch", d("2024-08-06"), d("2024-08-07")).with_dependency(a.id);
        let overlap = Task::new("Overlap", d("2024-08-03"), d("2024-08-09")).with_dependency(a.id);
        let tasks = vec![a, touching, overlap];
        let paths = dependency_paths(&tasks, &project(&tasks));
        assert!(paths.is_empty());
    }

    #[test]
    fn dangling_dependency_is_skipped() {
        let b = Task::new("B", d("2024-08-05"), d("2024-08-06")).with_dependency(Uuid::new_v4());
        let tasks = vec![b];
        assert!(dependency_paths(&tasks, &project(&tasks)).is_empty());
    }
}

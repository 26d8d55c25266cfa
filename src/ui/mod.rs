pub mod dialogs;
pub mod gantt_chart;
pub mod task_editor;
pub mod task_table;
pub mod theme;
pub mod toolbar;

use gantt_scheduler::Point;

/// Convert an egui screen position into chart space given the grid origin.
pub fn to_chart(pos: egui::Pos2, origin: egui::Pos2) -> Point {
    Point::new(pos.x - origin.x, pos.y - origin.y)
}

/// Convert a chart-space point back into screen space.
pub fn to_screen(p: Point, origin: egui::Pos2) -> egui::Pos2 {
    egui::Pos2::new(origin.x + p.x, origin.y + p.y)
}

use chrono::{Datelike, Duration};
use egui::epaint::CubicBezierShape;
use egui::{Color32, Pos2, Rect, Rounding, Sense, Stroke, Ui, Vec2};
use gantt_scheduler::layout::{Affordance, BarRect, TimelineProjection};
use gantt_scheduler::TimelineEngine;
use uuid::Uuid;

use crate::app::TaskStore;
use crate::ui::{theme, to_chart, to_screen};

const HEADER_HEIGHT: f32 = theme::HEADER_HEIGHT;

/// Result details from interactions in the Gantt chart.
#[derive(Debug, Clone, Default)]
pub struct ChartInteraction {
    pub changed: bool,
}

/// Render the timeline (right panel) and route pointer input to the engine.
pub fn show_gantt_chart(
    engine: &mut TimelineEngine<TaskStore>,
    selected_task: &mut Option<Uuid>,
    ui: &mut Ui,
) -> ChartInteraction {
    let mut interaction = ChartInteraction::default();
    let available = ui.available_size();
    engine.set_viewport_width(available.x);

    // Zoom with Ctrl+scroll
    let scroll_delta = ui.input(|i| i.smooth_scroll_delta);
    if ui.rect_contains_pointer(ui.max_rect()) && ui.input(|i| i.modifiers.ctrl) {
        if scroll_delta.y > 0.0 {
            engine.zoom_in();
        } else if scroll_delta.y < 0.0 {
            engine.zoom_out();
        }
    }

    egui::ScrollArea::both()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            let projection = engine.projection();
            let chart_width = projection.width().max(available.x);
            let chart_height = HEADER_HEIGHT + projection.height() + 40.0;
            let (response, painter) = ui.allocate_painter(
                Vec2::new(chart_width, chart_height.max(available.y)),
                Sense::click_and_drag(),
            );
            let origin = response.rect.min + Vec2::new(0.0, HEADER_HEIGHT);

            // ── Input ───────────────────────────────────────────────
            if response.drag_started() {
                let press = ui
                    .input(|i| i.pointer.press_origin())
                    .or_else(|| response.interact_pointer_pos());
                if let Some(pos) = press {
                    let point = to_chart(pos, origin);
                    if engine.pointer_down(point) {
                        if let Some(hit) = engine.projection().hit_test(point) {
                            *selected_task = Some(hit.task_id);
                        }
                    }
                }
            }
            // Leaving the visible chart abandons the gesture.
            let surface = ui.clip_rect().intersect(response.rect);
            if response.dragged() {
                match release_point(surface, response.interact_pointer_pos()) {
                    Some(pos) => engine.pointer_move(to_chart(pos, origin)),
                    None => engine.cancel_gesture(),
                }
            }
            if response.drag_stopped() {
                let pos = response
                    .interact_pointer_pos()
                    .or_else(|| ui.input(|i| i.pointer.latest_pos()));
                match release_point(surface, pos) {
                    Some(pos) => interaction.changed |= engine.pointer_up(to_chart(pos, origin)),
                    None => engine.cancel_gesture(),
                }
            } else if !engine.interaction().is_idle()
                && (ui.input(|i| i.key_pressed(egui::Key::Escape))
                    || !ui.input(|i| i.pointer.any_down()))
            {
                // Escape, or the button was released somewhere we never saw.
                engine.cancel_gesture();
            }

            if response.clicked() {
                *selected_task = response
                    .interact_pointer_pos()
                    .and_then(|pos| engine.projection().hit_test(to_chart(pos, origin)))
                    .map(|hit| hit.task_id);
            }

            let hovered_hit = response
                .hover_pos()
                .and_then(|pos| engine.projection().hit_test(to_chart(pos, origin)));
            if let Some(hit) = hovered_hit {
                let icon = match hit.affordance {
                    Affordance::LeftHandle | Affordance::RightHandle => {
                        egui::CursorIcon::ResizeHorizontal
                    }
                    Affordance::Connector => egui::CursorIcon::Crosshair,
                    Affordance::Body => egui::CursorIcon::Grab,
                };
                ui.ctx().set_cursor_icon(icon);
            }

            // ── Drawing ─────────────────────────────────────────────
            let engine = &*engine;
            let projection = engine.projection();
            let preview = engine.preview();

            painter.rect_filled(response.rect, 0.0, theme::BG_DARK);
            draw_timeline_header(&painter, response.rect.min, projection, chart_width);
            draw_rows(&painter, origin, projection, chart_width);
            draw_today_line(&painter, origin, projection, chart_height);
            draw_dependency_paths(&painter, origin, engine);

            for geom in &projection.rows {
                let Some(task) = engine.task(geom.id) else {
                    continue;
                };
                let preview_bar = preview.as_ref().and_then(|p| p.bar(geom.id));
                let (bar, valid) = match preview_bar {
                    Some(pb) => (projection.bar_for(geom.row, pb.start, pb.end), pb.valid),
                    None => (geom.bar, true),
                };
                let is_selected = *selected_task == Some(task.id);
                let fill = if valid {
                    theme::status_color(task.status)
                } else {
                    theme::INVALID_PREVIEW
                };
                let rect = draw_task_bar(&painter, origin, &bar, fill, &task.name, is_selected);
                draw_affordances(&painter, origin, projection, &bar, is_selected);

                if response.hovered() && preview.is_none() {
                    if let Some(pos) = response.hover_pos() {
                        if rect.contains(pos) {
                            egui::show_tooltip_at_pointer(
                                ui.ctx(),
                                ui.layer_id(),
                                egui::Id::new(("task-tip", task.id)),
                                |ui| {
                                    ui.strong(&task.name);
                                    ui.label(format!(
                                        "{} → {}",
                                        task.start.format("%d/%m/%Y"),
                                        task.end.format("%d/%m/%Y"),
                                    ));
                                    ui.label(format!(
                                        "{} · {} priority",
                                        task.status.label(),
                                        task.priority.label()
                                    ));
                                    ui.label(engine.assignee_name(task));
                                },
                            );
                        }
                    }
                }
            }

            if let Some((from, to)) = preview.as_ref().and_then(|p| p.link) {
                painter.line_segment(
                    [to_screen(from, origin), to_screen(to, origin)],
                    Stroke::new(2.0, theme::LINK_PREVIEW),
                );
                painter.circle_filled(to_screen(to, origin), 3.0, theme::LINK_PREVIEW);
            }
        });

    interaction
}

/// Pointer position usable for a gesture, or `None` when it is off the
/// visible chart surface.
fn release_point(surface: Rect, pos: Option<Pos2>) -> Option<Pos2> {
    pos.filter(|p| surface.contains(*p))
}

fn screen_rect(bar: &BarRect, origin: Pos2) -> Rect {
    Rect::from_min_size(
        Pos2::new(origin.x + bar.x, origin.y + bar.y),
        Vec2::new(bar.width, bar.height),
    )
}

fn draw_timeline_header(
    painter: &egui::Painter,
    top_left: Pos2,
    projection: &TimelineProjection,
    width: f32,
) {
    painter.rect_filled(
        Rect::from_min_size(top_left, Vec2::new(width, HEADER_HEIGHT)),
        0.0,
        theme::BG_HEADER,
    );
    painter.line_segment(
        [
            Pos2::new(top_left.x, top_left.y + HEADER_HEIGHT),
            Pos2::new(top_left.x + width, top_left.y + HEADER_HEIGHT),
        ],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );

    let grid_bottom = top_left.y + HEADER_HEIGHT + projection.height();
    for offset in 0..projection.total_days {
        let date = projection.grid_start + Duration::days(offset);
        let x = top_left.x + projection.date_to_x(date);

        painter.line_segment(
            [
                Pos2::new(x, top_left.y + HEADER_HEIGHT),
                Pos2::new(x, grid_bottom),
            ],
            Stroke::new(0.5, theme::GRID_LINE),
        );

        if projection.day_width >= 20.0 {
            let is_weekend = date.weekday().num_days_from_monday() >= 5;
            let day_color = if is_weekend {
                theme::TEXT_DIM
            } else {
                theme::TEXT_SECONDARY
            };
            painter.text(
                Pos2::new(x + 3.0, top_left.y + 28.0),
                egui::Align2::LEFT_CENTER,
                date.format("%d").to_string(),
                theme::font_sub(),
                day_color,
            );
        }

        if date.day() == 1 || offset == 0 {
            painter.text(
                Pos2::new(x + 3.0, top_left.y + 12.0),
                egui::Align2::LEFT_CENTER,
                date.format("%b %Y").to_string(),
                theme::font_header(),
                theme::TEXT_PRIMARY,
            );
        }
    }
}

fn draw_rows(painter: &egui::Painter, origin: Pos2, projection: &TimelineProjection, width: f32) {
    let row_height = projection.metrics.row_height;
    for i in 0..projection.rows.len() {
        let y = origin.y + i as f32 * row_height;
        let row_bg = if i % 2 == 0 {
            theme::BG_PANEL
        } else {
            theme::BG_DARK
        };
        painter.rect_filled(
            Rect::from_min_size(Pos2::new(origin.x, y), Vec2::new(width, row_height)),
            0.0,
            row_bg,
        );
        painter.line_segment(
            [
                Pos2::new(origin.x, y + row_height),
                Pos2::new(origin.x + width, y + row_height),
            ],
            Stroke::new(0.5, theme::BORDER_SUBTLE),
        );
    }
}

fn draw_today_line(
    painter: &egui::Painter,
    origin: Pos2,
    projection: &TimelineProjection,
    height: f32,
) {
    let Some(offset) = projection.today_offset_days else {
        return;
    };
    // Center of today's column.
    let x = origin.x + (offset as f32 + 0.5) * projection.day_width;

    painter.line_segment(
        [Pos2::new(x, origin.y), Pos2::new(x, origin.y + height)],
        Stroke::new(1.5, theme::TODAY_LINE),
    );

    let badge_w = 42.0;
    let badge_rect = Rect::from_min_size(
        Pos2::new(x - badge_w / 2.0, origin.y - 1.0),
        Vec2::new(badge_w, 14.0),
    );
    painter.rect_filled(badge_rect, Rounding::same(3.0), theme::TODAY_LINE);
    painter.text(
        badge_rect.center(),
        egui::Align2::CENTER_CENTER,
        "Today",
        theme::font_small(),
        Color32::WHITE,
    );
}

fn draw_dependency_paths(
    painter: &egui::Painter,
    origin: Pos2,
    engine: &TimelineEngine<TaskStore>,
) {
    let stroke = Stroke::new(1.5, theme::DEPENDENCY_LINE);
    for path in engine.paths() {
        let points = [
            to_screen(path.from, origin),
            to_screen(path.ctrl1, origin),
            to_screen(path.ctrl2, origin),
            to_screen(path.to, origin),
        ];
        painter.add(CubicBezierShape::from_points_stroke(
            points,
            false,
            Color32::TRANSPARENT,
            stroke,
        ));

        // Arrow head pointing into the dependent bar.
        let tip = points[3];
        painter.add(egui::Shape::convex_polygon(
            vec![
                tip,
                Pos2::new(tip.x - 6.0, tip.y - 4.0),
                Pos2::new(tip.x - 6.0, tip.y + 4.0),
            ],
            theme::DEPENDENCY_LINE,
            Stroke::NONE,
        ));
    }
}

fn draw_task_bar(
    painter: &egui::Painter,
    origin: Pos2,
    bar: &BarRect,
    fill: Color32,
    name: &str,
    is_selected: bool,
) -> Rect {
    let bar_rect = screen_rect(bar, origin);
    let rounding = Rounding::same(theme::BAR_ROUNDING);

    // Soft shadow
    painter.rect_filled(
        bar_rect.translate(Vec2::new(1.0, 2.0)),
        rounding,
        Color32::from_black_alpha(35),
    );
    painter.rect_filled(bar_rect, rounding, fill);
    // Lighter top highlight
    let highlight_rect = Rect::from_min_size(
        bar_rect.min,
        Vec2::new(bar_rect.width(), (bar_rect.height() * 0.45).max(4.0)),
    );
    painter.rect_filled(
        highlight_rect,
        Rounding {
            nw: theme::BAR_ROUNDING,
            ne: theme::BAR_ROUNDING,
            sw: 0.0,
            se: 0.0,
        },
        Color32::from_white_alpha(25),
    );

    if is_selected {
        painter.rect_stroke(
            bar_rect.expand(1.5),
            Rounding::same(theme::BAR_ROUNDING + 1.5),
            Stroke::new(2.0, theme::BORDER_ACCENT),
        );
    }

    // Task name on bar (single line, clipped to bar bounds)
    if bar_rect.width() > 30.0 {
        let galley = painter.layout_no_wrap(name.to_string(), theme::font_bar(), theme::TEXT_ON_BAR);
        let clipped = painter.with_clip_rect(bar_rect);
        let text_y = bar_rect.top() + (bar_rect.height() - galley.size().y) / 2.0;
        clipped.galley(
            Pos2::new(bar_rect.left() + 6.0, text_y),
            galley,
            Color32::TRANSPARENT,
        );
    }

    bar_rect
}

fn draw_affordances(
    painter: &egui::Painter,
    origin: Pos2,
    projection: &TimelineProjection,
    bar: &BarRect,
    is_selected: bool,
) {
    if is_selected {
        // Rounded pill handles
        for handle in [projection.left_handle(bar), projection.right_handle(bar)] {
            let r = screen_rect(&handle, origin);
            let pill = Rect::from_center_size(r.center(), Vec2::new(4.0, r.height() * 0.55));
            painter.rect_filled(pill, Rounding::same(2.0), theme::HANDLE_COLOR);
        }
    }
    let dot = to_screen(projection.connector_center(bar), origin);
    painter.circle(
        dot,
        projection.metrics.connector_radius,
        theme::BG_HEADER,
        Stroke::new(1.5, theme::DEPENDENCY_LINE),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_outside_the_surface_is_abandoned() {
        let surface = Rect::from_min_size(Pos2::new(300.0, 40.0), Vec2::new(800.0, 600.0));
        assert_eq!(
            release_point(surface, Some(Pos2::new(500.0, 200.0))),
            Some(Pos2::new(500.0, 200.0))
        );
        // Released over the side panel, left of the chart.
        assert_eq!(release_point(surface, Some(Pos2::new(120.0, 200.0))), None);
        assert_eq!(release_point(surface, Some(Pos2::new(500.0, 900.0))), None);
        assert_eq!(release_point(surface, None), None);
    }
}

use eframe::egui::{self, Pos2, RichText, TextStyle, Ui};
use egui_plot::{Corner, Legend, Line, LineStyle, Plot, PlotPoints, VLine};

use crate::color;
use crate::state::AppState;

use super::hover::LineId;

pub const TITLE: &str = "Pupil Size Over Time with Event Markers";

// ---------------------------------------------------------------------------
// Pupil plot (central panel)
// ---------------------------------------------------------------------------

/// Render the pupil time series with marker lines and hover annotation.
pub fn pupil_plot(ui: &mut Ui, state: &AppState) {
    let session = &state.session;

    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(TITLE);
    });

    let response = Plot::new("pupil_plot")
        .legend(
            Legend::default()
                .position(Corner::RightTop)
                .text_style(TextStyle::Small),
        )
        .x_axis_label("Time (s)")
        .y_axis_label("Pupil Size")
        .show_grid(true)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(series(&session.time, &session.left))
                    .name("Left Pupil")
                    .color(color::left_pupil())
                    .width(1.5),
            );
            if let Some(right) = &session.right {
                plot_ui.line(
                    Line::new(series(&session.time, right))
                        .name("Right Pupil")
                        .color(color::right_pupil())
                        .width(1.5),
                );
            }

            // Unnamed, so marker lines stay out of the legend.
            for (_, x) in state.marker_lines.positions() {
                plot_ui.vline(
                    VLine::new(x)
                        .color(color::marker_line())
                        .style(LineStyle::dashed_loose())
                        .width(1.0),
                );
            }
        });

    let Some(pointer) = response.response.hover_pos() else {
        return;
    };
    let transform = response.transform;
    let hovered = state.marker_lines.hit_test(
        pointer.x,
        |x| transform.position_from_point_x(x),
        state.hover_radius,
    );
    if let Some(id) = hovered {
        marker_annotation(ui, state, id, pointer);
    }
}

fn series(time: &[f64], values: &[f64]) -> PlotPoints<'static> {
    time.iter()
        .zip(values.iter())
        .map(|(&t, &v)| [t, v])
        .collect()
}

/// Label box next to the pointer for the hovered marker line.
fn marker_annotation(ui: &Ui, state: &AppState, id: LineId, pointer: Pos2) {
    let Some(label) = state.marker_lines.label(id) else {
        return;
    };
    egui::Area::new(egui::Id::new("marker_annotation"))
        .order(egui::Order::Tooltip)
        .fixed_pos(pointer + egui::vec2(12.0, -28.0))
        .interactable(false)
        .show(ui.ctx(), |ui: &mut Ui| {
            egui::Frame::popup(ui.style())
                .fill(color::annotation_fill())
                .show(ui, |ui: &mut Ui| {
                    ui.label(RichText::new(label).color(color::annotation_text()));
                });
        });
}

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::color;
use crate::state::{AppState, StreamRole, StreamSummary};

// ---------------------------------------------------------------------------
// Left side panel – discovered streams
// ---------------------------------------------------------------------------

/// Render the stream list with the role each stream plays in the plot.
pub fn stream_panel(ui: &mut Ui, state: &AppState) {
    ui.heading("Streams");
    ui.separator();

    if let Some(version) = &state.header.version {
        ui.label(format!("XDF version {version}"));
    }
    if let Some(datetime) = &state.header.datetime {
        ui.label(format!("Recorded {datetime}"));
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (i, stream) in state.streams.iter().enumerate() {
                egui::CollapsingHeader::new(stream_title(stream))
                    .id_salt(("stream", i))
                    .default_open(stream.role.is_some())
                    .show(ui, |ui: &mut Ui| {
                        stream_details(ui, stream);
                    });
            }
        });
}

fn stream_title(stream: &StreamSummary) -> RichText {
    let name = if stream.name.is_empty() {
        "<unnamed>"
    } else {
        stream.name.as_str()
    };
    match stream.role {
        Some(StreamRole::Pupil) => RichText::new(format!("{name}  (pupil)"))
            .strong()
            .color(color::left_pupil()),
        Some(StreamRole::Markers) => RichText::new(format!("{name}  (markers)")).strong(),
        None => RichText::new(name),
    }
}

fn stream_details(ui: &mut Ui, stream: &StreamSummary) {
    egui::Grid::new(("stream_details", &stream.name))
        .num_columns(2)
        .show(ui, |ui: &mut Ui| {
            ui.label("Type");
            ui.label(stream.stream_type.as_str());
            ui.end_row();

            ui.label("Channels");
            ui.label(format!("{} × {}", stream.channel_count, stream.channel_format));
            ui.end_row();

            ui.label("Rate");
            if stream.nominal_srate > 0.0 {
                ui.label(format!("{} Hz", stream.nominal_srate));
            } else {
                ui.label("irregular");
            }
            ui.end_row();

            ui.label("Samples");
            ui.label(stream.samples.to_string());
            ui.end_row();
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top summary bar.
pub fn top_bar(ui: &mut Ui, state: &AppState) {
    let session = &state.session;
    ui.horizontal(|ui: &mut Ui| {
        ui.strong(state.file_name());
        ui.separator();

        ui.label(format!(
            "{} pupil samples ({})",
            session.left.len(),
            if session.right.is_some() {
                "left + right"
            } else {
                "left only"
            }
        ));
        ui.separator();

        match &session.marker_stream {
            Some(name) => ui.label(format!("{} markers from {name}", session.markers.len())),
            None => ui.label(RichText::new("no marker stream").color(Color32::DARK_RED)),
        };
        ui.separator();

        match session.start_time {
            Some(start) => ui.label(format!("t = 0 at {start:.3} s")),
            None => ui.label("raw timestamps"),
        };
    });
}

//! Pupil-size viewer for XDF (Lab Streaming Layer) recordings.
//!
//! Loads a recording, picks the stream whose name contains "pupil" and the
//! one whose name contains "marker" or "event", and plots left/right pupil
//! size over time with a dashed line per marker. Hovering a marker line
//! shows its label.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod state;
pub mod ui;

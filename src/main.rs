use anyhow::Result;
use clap::Parser;

use pupil_marker_viewer::app;
use pupil_marker_viewer::config::Args;
use pupil_marker_viewer::data::{extract, loader};
use pupil_marker_viewer::state::AppState;
use pupil_marker_viewer::ui::dialog;

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let path = match &args.file {
        Some(path) => path.clone(),
        None => dialog::select_xdf_file()?,
    };

    let recording = loader::load_file(&path, &args.load_options())?;

    println!("Found Streams:");
    for name in extract::stream_names(&recording) {
        println!("- {name}");
    }

    let session = extract::extract_session(&recording, &args.extract_options())?;
    let state = AppState::new(path, &recording, session, args.hover_radius);
    app::run(state)?;
    Ok(())
}

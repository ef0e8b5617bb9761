use std::path::PathBuf;

use clap::Parser;

use crate::data::extract::ExtractOptions;
use crate::data::loader::LoadOptions;

/// Plot pupil size from an XDF recording with hoverable event markers.
#[derive(Debug, Clone, Parser)]
#[command(name = "pupil-marker-viewer", version, about)]
pub struct Args {
    /// XDF recording to open. A file dialog is shown when omitted.
    pub file: Option<PathBuf>,

    /// Keep timestamps on each stream's own clock.
    #[arg(long)]
    pub no_clock_sync: bool,

    /// Keep the recorded timestamps of regularly sampled streams.
    #[arg(long)]
    pub no_dejitter: bool,

    /// Start the time axis at the first pupil sample even without markers.
    #[arg(long)]
    pub always_rebase: bool,

    /// Pointer distance to a marker line that shows its label.
    #[arg(long, value_name = "PX", default_value_t = 6.0, value_parser = parse_radius)]
    pub hover_radius: f32,
}

fn parse_radius(s: &str) -> Result<f32, String> {
    let radius: f32 = s.parse().map_err(|e| format!("{e}"))?;
    if radius.is_finite() && radius > 0.0 {
        Ok(radius)
    } else {
        Err(format!("{s} is not a positive pixel distance"))
    }
}

impl Args {
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            synchronize_clocks: !self.no_clock_sync,
            dejitter: !self.no_dejitter,
        }
    }

    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            always_rebase: self.always_rebase,
        }
    }
}

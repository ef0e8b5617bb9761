use std::path::Path;

use anyhow::{Context, Result};

use pupil_marker_viewer::data::model::{
    ChannelFormat, ClockOffset, FileHeader, Recording, Stream, StreamInfo,
};
use pupil_marker_viewer::data::writer;

const START: f64 = 5321.0;
const DURATION: f64 = 120.0;
const PUPIL_RATE: f64 = 60.0;
const EEG_RATE: f64 = 128.0;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Task-evoked dilation: a smooth bump peaking ~1 s after the stimulus.
fn dilation(t: f64, onset: f64, amplitude: f64) -> f64 {
    let dt = t - onset;
    if dt <= 0.0 {
        return 0.0;
    }
    amplitude * dt * (1.0 - dt).exp()
}

fn markers() -> Vec<(f64, String)> {
    let mut events = vec![(1.0, "Start".to_string())];
    let mut t = 5.0;
    let mut i = 0;
    while t < DURATION - 5.0 {
        let label = if i % 2 == 0 {
            "Stimulus_A"
        } else {
            "Stimulus_B"
        };
        events.push((t, label.to_string()));
        t += 7.5;
        i += 1;
    }
    events.push((DURATION - 1.0, "Stop".to_string()));
    events
}

fn pupil_stream(rng: &mut SimpleRng, events: &[(f64, String)]) -> Option<Stream> {
    let n = (DURATION * PUPIL_RATE) as usize;
    let mut rows = Vec::with_capacity(n);
    let mut stamps = Vec::with_capacity(n);

    for i in 0..n {
        let t = i as f64 / PUPIL_RATE;
        let drift = 0.15 * (2.0 * std::f64::consts::PI * t / 45.0).sin();
        let evoked: f64 = events
            .iter()
            .map(|(onset, label)| match label.as_str() {
                "Stimulus_A" => dilation(t, *onset, 0.35),
                "Stimulus_B" => dilation(t, *onset, 0.2),
                _ => 0.0,
            })
            .sum();
        let base = 3.6 + drift + evoked;
        rows.push(vec![
            base + rng.gauss(0.0, 0.02),
            base + 0.08 + rng.gauss(0.0, 0.02),
        ]);
        // Acquisition jitter, removed again by dejittering on load.
        stamps.push(START + t + rng.gauss(0.0, 0.002));
    }

    let info = StreamInfo::new("EyeTracker_Pupil", 2, ChannelFormat::Float32)
        .with_type("Gaze")
        .with_srate(PUPIL_RATE);
    let mut stream = Stream::numeric(info, rows, stamps)?;
    for k in 0..4 {
        stream.clock_offsets.push(ClockOffset {
            collection_time: START + k as f64 * 30.0,
            offset: -0.012,
        });
    }
    Some(stream)
}

fn marker_stream(events: &[(f64, String)]) -> Option<Stream> {
    let info = StreamInfo::new("ExperimentMarkers", 1, ChannelFormat::String)
        .with_type("Markers");
    let rows = events.iter().map(|(_, label)| vec![label.clone()]).collect();
    let stamps = events.iter().map(|(t, _)| START + t).collect();
    Stream::text(info, rows, stamps)
}

fn eeg_stream(rng: &mut SimpleRng) -> Option<Stream> {
    let n = (DURATION * EEG_RATE) as usize;
    let rows = (0..n)
        .map(|_| (0..4).map(|_| rng.gauss(0.0, 10.0)).collect())
        .collect();
    let stamps = (0..n).map(|i| START + i as f64 / EEG_RATE).collect();
    let info = StreamInfo::new("EEG", 4, ChannelFormat::Float32)
        .with_type("EEG")
        .with_srate(EEG_RATE);
    Stream::numeric(info, rows, stamps)
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let events = markers();

    let streams = vec![
        eeg_stream(&mut rng).context("building EEG stream")?,
        pupil_stream(&mut rng, &events).context("building pupil stream")?,
        marker_stream(&events).context("building marker stream")?,
    ];
    let recording = Recording {
        header: FileHeader {
            version: Some("1.0".to_string()),
            datetime: Some("2024-03-14T10:00:00+00:00".to_string()),
        },
        streams,
    };

    let output_path = Path::new("sample_session.xdf");
    writer::write_file(output_path, &recording)
        .with_context(|| format!("writing {}", output_path.display()))?;

    println!(
        "Wrote {} streams with {} markers to {}",
        recording.len(),
        events.len(),
        output_path.display()
    );
    Ok(())
}

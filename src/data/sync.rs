use super::model::Stream;

/// Gaps longer than this (seconds) always split a dejitter segment.
const BREAK_THRESHOLD_SECONDS: f64 = 1.0;
/// Gaps longer than this many nominal sample intervals split a segment.
const BREAK_THRESHOLD_SAMPLES: f64 = 500.0;

/// Map stream timestamps onto the recording host clock.
///
/// The clock offsets are fitted with a straight line over their
/// collection times and the fitted offset is added to every timestamp.
/// A single offset is applied as a constant; no offsets leaves the
/// stream untouched.
pub fn synchronize_clocks(stream: &mut Stream) {
    let times: Vec<f64> = stream
        .clock_offsets
        .iter()
        .map(|c| c.collection_time)
        .collect();
    let offsets: Vec<f64> = stream.clock_offsets.iter().map(|c| c.offset).collect();

    let Some((intercept, slope)) = linear_fit(&times, &offsets) else {
        return;
    };
    for t in &mut stream.time_stamps {
        *t += intercept + slope * *t;
    }
}

/// Replace the timestamps of a regularly sampled stream with a
/// least-squares line over sample index, segment by segment.
///
/// Irregular streams (nominal rate 0) are left alone.
pub fn dejitter(stream: &mut Stream) {
    if !stream.info.is_regular() || stream.len() < 2 {
        return;
    }
    let interval = 1.0 / stream.info.nominal_srate;
    let threshold = BREAK_THRESHOLD_SECONDS.max(BREAK_THRESHOLD_SAMPLES * interval);

    let stamps = &mut stream.time_stamps;
    let mut start = 0;
    for end in 1..=stamps.len() {
        let is_break = end == stamps.len() || {
            stamps[end] - stamps[end - 1] > threshold
        };
        if is_break {
            fit_segment(&mut stamps[start..end]);
            start = end;
        }
    }
}

fn fit_segment(segment: &mut [f64]) {
    if segment.len() < 2 {
        return;
    }
    let index: Vec<f64> = (0..segment.len()).map(|i| i as f64).collect();
    if let Some((intercept, slope)) = linear_fit(&index, segment) {
        for (i, t) in segment.iter_mut().enumerate() {
            *t = intercept + slope * i as f64;
        }
    }
}

/// Ordinary least squares `y = intercept + slope * x`.
///
/// Returns `None` for empty input; a flat fit at the mean when `x` has no
/// spread.
fn linear_fit(x: &[f64], y: &[f64]) -> Option<(f64, f64)> {
    let n = x.len().min(y.len());
    if n == 0 {
        return None;
    }
    let mean_x = x[..n].iter().sum::<f64>() / n as f64;
    let mean_y = y[..n].iter().sum::<f64>() / n as f64;

    let (sxx, sxy) = x[..n]
        .iter()
        .zip(&y[..n])
        .fold((0.0, 0.0), |(sxx, sxy), (&xi, &yi)| {
            let dx = xi - mean_x;
            (sxx + dx * dx, sxy + dx * (yi - mean_y))
        });

    if sxx <= f64::EPSILON {
        return Some((mean_y, 0.0));
    }
    let slope = sxy / sxx;
    Some((mean_y - slope * mean_x, slope))
}

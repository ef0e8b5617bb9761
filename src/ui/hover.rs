use std::collections::BTreeMap;

use crate::data::extract::Marker;

// ---------------------------------------------------------------------------
// Marker lines and their hover labels
// ---------------------------------------------------------------------------

/// Identifies one drawn marker line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineId(usize);

/// Marker line positions plus the label shown when each is hovered.
///
/// Lines keep marker arrival order; duplicates stay distinct.
#[derive(Debug, Clone, Default)]
pub struct MarkerLines {
    lines: Vec<(LineId, f64)>,
    labels: BTreeMap<LineId, String>,
}

impl MarkerLines {
    pub fn from_markers(markers: &[Marker]) -> Self {
        let mut lines = Vec::with_capacity(markers.len());
        let mut labels = BTreeMap::new();
        for (i, marker) in markers.iter().enumerate() {
            let id = LineId(i);
            lines.push((id, marker.time));
            labels.insert(id, marker.label.clone());
        }
        MarkerLines { lines, labels }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// `(id, x)` of every line in draw order.
    pub fn positions(&self) -> impl Iterator<Item = (LineId, f64)> + '_ {
        self.lines.iter().copied()
    }

    pub fn label(&self, id: LineId) -> Option<&str> {
        self.labels.get(&id).map(String::as_str)
    }

    /// Line nearest to `pointer_x` (screen pixels) within `radius` pixels.
    ///
    /// `to_screen` maps a plot x value to a screen x coordinate. Ties go to
    /// the earlier line.
    pub fn hit_test(
        &self,
        pointer_x: f32,
        to_screen: impl Fn(f64) -> f32,
        radius: f32,
    ) -> Option<LineId> {
        let mut best: Option<(LineId, f32)> = None;
        for &(id, x) in &self.lines {
            let distance = (to_screen(x) - pointer_x).abs();
            if distance > radius {
                continue;
            }
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((id, distance));
            }
        }
        best.map(|(id, _)| id)
    }
}

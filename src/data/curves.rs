//! Curves shown on the chart, one per data series.

use egui::Color32;

/// How many curves a table with `columns` columns should show.
///
/// Producers write value/metadata pairs after the timestamp column, so only
/// every other column is plotted. An even column count therefore leaves the
/// last column without a curve.
pub fn curve_count_for(columns: usize) -> usize {
    columns.saturating_sub(1) / 2
}

/// A single rendered line. Curve `i` (0-based) draws data column `i + 1`.
#[derive(Debug, Clone)]
pub struct Curve {
    pub index: usize,
    pub color: Color32,
    pub width: f32,
    /// Full `(timestamp, value)` series as of the last tick.
    pub points: Vec<[f64; 2]>,
}

impl Curve {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            color: Self::alloc_color(index),
            width: 1.5,
            points: Vec::new(),
        }
    }

    /// Data column this curve reads from.
    pub fn column(&self) -> usize {
        self.index + 1
    }

    pub fn name(&self) -> String {
        format!("Column {}", self.column())
    }

    /// Deterministic, distinct color for the curve at `index`.
    pub fn alloc_color(index: usize) -> Color32 {
        const PALETTE: [Color32; 10] = [
            Color32::from_rgb(31, 119, 180),
            Color32::from_rgb(255, 127, 14),
            Color32::from_rgb(44, 160, 44),
            Color32::from_rgb(214, 39, 40),
            Color32::from_rgb(148, 103, 189),
            Color32::from_rgb(140, 86, 75),
            Color32::from_rgb(227, 119, 194),
            Color32::from_rgb(127, 127, 127),
            Color32::from_rgb(188, 189, 34),
            Color32::from_rgb(23, 190, 207),
        ];
        PALETTE[index % PALETTE.len()]
    }
}

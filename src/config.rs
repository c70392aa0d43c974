//! Configuration for the plotter window and the ingestion loop.

use std::time::Duration;

use eframe::egui;

/// Top-level configuration.
///
/// | Field            | Default      |
/// |------------------|--------------|
/// | `title`          | `"Pressure"` |
/// | `window_size`    | 1000 × 600   |
/// | `refresh_period` | 500 ms       |
/// | `crosshair`      | off          |
/// | `wait_for_data`  | off          |
/// | `wait_timeout`   | none         |
/// | `retention`      | unbounded    |
/// | `fit_samples`    | 200          |
#[derive(Clone, Debug)]
pub struct PlotterConfig {
    /// Native window title.
    pub title: String,
    /// Initial inner window size in points.
    pub window_size: [f32; 2],
    /// Period of the ingest-and-redraw tick.
    pub refresh_period: Duration,
    /// Show guide lines and a coordinate readout that follow the pointer.
    pub crosshair: bool,
    /// Hold the window back until the first row has arrived.
    pub wait_for_data: bool,
    /// Give up waiting for the first row after this long. `None` waits until
    /// data arrives or the input closes.
    pub wait_timeout: Option<Duration>,
    /// Keep only the newest N samples per column. `None` keeps everything.
    pub retention: Option<usize>,
    /// Number of grid points the fitted curve is evaluated at.
    pub fit_samples: usize,
}

impl Default for PlotterConfig {
    fn default() -> Self {
        Self {
            title: "Pressure".to_string(),
            window_size: [1000.0, 600.0],
            refresh_period: Duration::from_millis(500),
            crosshair: false,
            wait_for_data: false,
            wait_timeout: None,
            retention: None,
            fit_samples: 200,
        }
    }
}

impl PlotterConfig {
    /// Poll slice used while waiting for the first row.
    pub const WAIT_POLL: Duration = Duration::from_millis(100);

    pub fn native_options(&self) -> eframe::NativeOptions {
        eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_title(self.title.clone())
                .with_inner_size(egui::vec2(self.window_size[0], self.window_size[1])),
            ..Default::default()
        }
    }
}

//! Entry point for running the plotter as a native window.

use crate::config::PlotterConfig;

use super::ChartController;

/// Open the chart window and run the event loop until it is closed.
///
/// Fails only if the native window cannot be created (e.g. no display).
pub fn run_plotter(controller: ChartController, cfg: &PlotterConfig) -> eframe::Result<()> {
    let opts = cfg.native_options();
    eframe::run_native(
        &cfg.title,
        opts,
        Box::new(move |_cc| Ok(Box::new(controller))),
    )
}

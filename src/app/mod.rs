//! Chart controller: ties the ingestor to the plot window.
//!
//! | Sub-module   | Responsibility |
//! | ------------ | -------------- |
//! | [`update`]   | Per-frame egui rendering and pointer/context-menu handling |
//! | [`run`]      | [`run_plotter()`] entry point opening the native window |
//!
//! All state transitions live on [`ChartController`] itself and do not need a
//! GUI context, so they can be driven directly from tests.

mod run;
mod update;

pub use run::run_plotter;

use std::time::{Duration, Instant};

use crate::config::PlotterConfig;
use crate::data::curves::{curve_count_for, Curve};
use crate::data::fit::FitOverlay;
use crate::data::ingest::{DrainSummary, Ingestor};
use crate::data::view::ViewRect;
use crate::data::x_formatter::format_timestamp;
use crate::error::{FitError, IngestError};

pub struct ChartController {
    ingestor: Ingestor,
    curves: Vec<Curve>,
    crosshair: bool,
    cursor: Option<[f64; 2]>,
    view: ViewRect,
    fit: Option<FitOverlay>,
    fit_samples: usize,
    /// Set when auto-ranging must stop on the next frame.
    freeze_view: bool,
    /// Control point currently being dragged.
    dragging: Option<usize>,
    refresh_period: Duration,
    last_tick: Option<Instant>,
}

impl ChartController {
    pub fn new(ingestor: Ingestor, cfg: &PlotterConfig) -> Self {
        Self {
            ingestor,
            curves: Vec::new(),
            crosshair: cfg.crosshair,
            cursor: None,
            view: ViewRect::default(),
            fit: None,
            fit_samples: cfg.fit_samples,
            freeze_view: false,
            dragging: None,
            refresh_period: cfg.refresh_period,
            last_tick: None,
        }
    }

    /// Build the controller, first waiting for data if `cfg.wait_for_data`
    /// is set so the plot never opens on an undefined time range.
    pub fn initialize(mut ingestor: Ingestor, cfg: &PlotterConfig) -> Result<Self, IngestError> {
        if cfg.wait_for_data {
            tracing::info!("waiting for first row of data");
            ingestor.await_first_row(PlotterConfig::WAIT_POLL, cfg.wait_timeout)?;
        }
        let mut ctrl = Self::new(ingestor, cfg);
        ctrl.sync_curves();
        Ok(ctrl)
    }

    pub fn ingestor(&self) -> &Ingestor {
        &self.ingestor
    }

    pub fn curves(&self) -> &[Curve] {
        &self.curves
    }

    pub fn crosshair_enabled(&self) -> bool {
        self.crosshair
    }

    pub fn cursor(&self) -> Option<[f64; 2]> {
        self.cursor
    }

    pub fn view(&self) -> ViewRect {
        self.view
    }

    pub fn set_view(&mut self, view: ViewRect) {
        self.view = view;
    }

    /// One refresh: pull new lines, grow the curve set, replace every curve's
    /// series with the current table contents.
    pub fn on_timer_tick(&mut self) -> DrainSummary {
        let summary = self.ingestor.drain();
        self.sync_curves();
        summary
    }

    /// Run [`on_timer_tick`](Self::on_timer_tick) if a full period has passed
    /// since the previous one. Returns whether a tick ran.
    pub fn tick_if_due(&mut self, now: Instant) -> bool {
        let due = self
            .last_tick
            .map_or(true, |t| now.duration_since(t) >= self.refresh_period);
        if due {
            self.on_timer_tick();
            self.last_tick = Some(now);
        }
        due
    }

    pub fn time_until_next_tick(&self, now: Instant) -> Duration {
        self.last_tick.map_or(Duration::ZERO, |t| {
            self.refresh_period.saturating_sub(now.duration_since(t))
        })
    }

    fn sync_curves(&mut self) {
        let target = curve_count_for(self.ingestor.column_count());
        while self.curves.len() < target {
            tracing::debug!("Adding a curve");
            self.curves.push(Curve::new(self.curves.len()));
        }
        let table = self.ingestor.table();
        for curve in &mut self.curves {
            curve.points = table.series(curve.column());
        }
    }

    /// Record the pointer position (data coordinates). Positions outside the
    /// current view are ignored.
    pub fn on_pointer_move(&mut self, pos: [f64; 2]) {
        if self.view.contains(pos) {
            self.cursor = Some(pos);
        }
    }

    /// `"<local time>, <y>"` for the crosshair readout.
    pub fn crosshair_label(&self) -> Option<String> {
        if !self.crosshair {
            return None;
        }
        self.cursor
            .map(|[x, y]| format!("{}, {}", format_timestamp(x), y))
    }

    pub fn fit_active(&self) -> bool {
        self.fit.is_some()
    }

    pub fn fit_overlay(&self) -> Option<&FitOverlay> {
        self.fit.as_ref()
    }

    /// Switch the fit overlay on or off. Turning it on stops auto-ranging and
    /// anchors a two-point region at the cursor (or the view center).
    pub fn on_fit_toggle(&mut self, enabled: bool) {
        match (enabled, self.fit.is_some()) {
            (true, false) => {
                self.freeze_view = true;
                let anchor = self.cursor.unwrap_or_else(|| self.view.center());
                self.fit = Some(FitOverlay::anchored_at(anchor, &self.view));
                self.on_fit_region_changed();
            }
            (false, true) => {
                self.fit = None;
                self.dragging = None;
            }
            _ => {}
        }
    }

    /// Refit after the region changed. Failures keep the previous curve.
    pub fn on_fit_region_changed(&mut self) -> Option<FitError> {
        let fit = self.fit.as_mut()?;
        match fit.recompute(self.view.x, self.fit_samples) {
            Ok(()) => None,
            Err(e) => {
                tracing::debug!("fit update ignored: {e}");
                Some(e)
            }
        }
    }

    pub fn move_fit_point(&mut self, index: usize, to: [f64; 2]) {
        let moved = self.fit.as_mut().is_some_and(|f| f.move_point(index, to));
        if moved {
            self.on_fit_region_changed();
        }
    }

    pub fn insert_fit_point(&mut self, p: [f64; 2]) -> Option<usize> {
        let index = self.fit.as_mut()?.insert_point(p);
        self.on_fit_region_changed();
        Some(index)
    }

    /// Whether auto-ranging was just disabled; clears the request.
    pub fn take_freeze_view_request(&mut self) -> bool {
        std::mem::take(&mut self.freeze_view)
    }
}

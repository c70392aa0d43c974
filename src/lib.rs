//! Live time-series plotter for tab-separated sensor readings.
//!
//! Rows arrive as `timestamp<TAB>value<TAB>value...` lines (typically
//! `ssh host tail -f data.csv | pressureplot`) and are drawn as one curve per
//! value/metadata column pair, refreshed on a fixed period.
//!
//! - `source`: line sources and the stdin reader thread
//! - `data`: sample table, ingestion, curves, log-quadratic fit, time labels
//! - `app`: chart controller and the eframe window
//! - `config`: window and refresh configuration

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod source;

pub use app::{run_plotter, ChartController};
pub use config::PlotterConfig;
pub use data::ingest::{DrainSummary, Ingestor};
pub use data::table::SampleTable;
pub use error::{FitError, IngestError, RowError};
pub use source::{line_channel, spawn_reader, ChannelSource, LinePoll, LineSink, LineSource};

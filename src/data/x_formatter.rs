//! Timestamp formatting for the horizontal axis and the crosshair readout.
//!
//! X values are Unix timestamps in seconds and are rendered in local time as
//! `YYYY-MM-DD HH:MM:SS`, with milliseconds appended once ticks are closer
//! together than one second.

use chrono::TimeZone;

/// Base layout of every rendered timestamp.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Granularity of the sub-second portion of a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimeResolution {
    /// `YYYY-MM-DD HH:MM:SS`
    Seconds,
    /// `YYYY-MM-DD HH:MM:SS.mmm`
    Milliseconds,
}

/// Formatter for the time axis.
#[derive(Debug, Clone)]
pub struct TimeFormatter {
    /// Tick spacing (seconds) below which milliseconds are shown.
    ///
    /// Default: `1.0`.
    pub milliseconds_threshold: f64,
    /// Never show sub-second digits when `false`.
    pub allow_milliseconds: bool,
}

impl Default for TimeFormatter {
    fn default() -> Self {
        Self {
            milliseconds_threshold: 1.0,
            allow_milliseconds: true,
        }
    }
}

impl TimeFormatter {
    /// Pick the resolution for ticks spaced `step_secs` apart.
    pub fn determine_resolution(&self, step_secs: f64) -> TimeResolution {
        let step = step_secs.abs();
        if self.allow_milliseconds && step.is_finite() && step > 0.0 && step < self.milliseconds_threshold {
            TimeResolution::Milliseconds
        } else {
            TimeResolution::Seconds
        }
    }

    /// Label for a tick at `value` when neighbouring ticks are `step_secs` apart.
    pub fn format_tick(&self, value: f64, step_secs: f64) -> String {
        format_with_resolution(value, self.determine_resolution(step_secs))
    }
}

/// Full-second local date-time string for a timestamp.
pub fn format_timestamp(secs: f64) -> String {
    format_with_resolution(secs, TimeResolution::Seconds)
}

fn format_with_resolution(secs: f64, resolution: TimeResolution) -> String {
    let dt = secs_to_local(secs);
    let base = dt.format(DATE_TIME_FORMAT).to_string();
    match resolution {
        TimeResolution::Seconds => base,
        TimeResolution::Milliseconds => {
            format!("{}.{:03}", base, dt.timestamp_subsec_millis())
        }
    }
}

/// Convert seconds-since-epoch to local time. Non-finite or out-of-range
/// values fall back to the UNIX epoch.
pub fn secs_to_local(secs: f64) -> chrono::DateTime<chrono::Local> {
    let epoch = chrono::DateTime::<chrono::Utc>::UNIX_EPOCH.with_timezone(&chrono::Local);
    if !secs.is_finite() {
        return epoch;
    }
    let s = secs.floor();
    if s < i64::MIN as f64 || s > i64::MAX as f64 {
        return epoch;
    }
    let s = s as i64;
    let ns_frac = ((secs - s as f64) * 1e9).round().clamp(0.0, 999_999_999.0) as u32;
    chrono::Local
        .timestamp_opt(s, ns_frac)
        .single()
        .unwrap_or(epoch)
}

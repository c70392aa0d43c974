use pressureplot::data::x_formatter::*;

// Helper: build a LOCAL timestamp as seconds
fn local_secs(year: i32, month: u32, day: u32, h: u32, m: u32, s: u32) -> f64 {
    use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
    let ndt = NaiveDateTime::new(
        NaiveDate::from_ymd_opt(year, month, day).unwrap(),
        NaiveTime::from_hms_opt(h, m, s).unwrap(),
    );
    Local
        .from_local_datetime(&ndt)
        .earliest()
        .map(|dt| dt.timestamp() as f64)
        .unwrap_or(0.0)
}

#[test]
fn timestamp_renders_as_local_date_time() {
    let t = local_secs(2024, 1, 15, 13, 45, 30);
    assert_eq!(format_timestamp(t), "2024-01-15 13:45:30");
}

#[test]
fn fractional_seconds_are_dropped_for_readout() {
    let t = local_secs(2024, 1, 15, 13, 45, 30) + 0.75;
    assert_eq!(format_timestamp(t), "2024-01-15 13:45:30");
}

#[test]
fn wide_tick_spacing_uses_seconds() {
    let tf = TimeFormatter::default();
    assert_eq!(tf.determine_resolution(60.0), TimeResolution::Seconds);
    assert_eq!(tf.determine_resolution(1.0), TimeResolution::Seconds);
}

#[test]
fn sub_second_ticks_show_milliseconds() {
    let tf = TimeFormatter::default();
    let t = local_secs(2024, 6, 1, 8, 0, 0) + 0.25;
    assert_eq!(tf.determine_resolution(0.1), TimeResolution::Milliseconds);
    assert_eq!(tf.format_tick(t, 0.1), "2024-06-01 08:00:00.250");
}

#[test]
fn milliseconds_can_be_disabled() {
    let tf = TimeFormatter {
        allow_milliseconds: false,
        ..TimeFormatter::default()
    };
    assert_eq!(tf.determine_resolution(0.001), TimeResolution::Seconds);
}

#[test]
fn non_finite_values_fall_back_to_epoch() {
    let epoch = format_timestamp(0.0);
    assert_eq!(format_timestamp(f64::NAN), epoch);
    assert_eq!(format_timestamp(f64::INFINITY), epoch);
    assert_eq!(format_timestamp(1e300), epoch);
}

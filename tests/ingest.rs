use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pressureplot::data::ingest::{parse_number, parse_row};
use pressureplot::{line_channel, spawn_reader, IngestError, Ingestor, LinePoll, LineSink, LineSource, RowError, SampleTable};

// Helper: ingestor fed by a channel; the sink is returned so the stream stays open
fn open_ingestor() -> (LineSink, Ingestor) {
    let (sink, source) = line_channel();
    (sink, Ingestor::new(Box::new(source)))
}

fn snapshot(ing: &Ingestor) -> Vec<Vec<f64>> {
    (0..ing.column_count())
        .map(|i| ing.table().column(i).to_vec())
        .collect()
}

#[test]
fn two_rows_fill_three_columns() {
    let (sink, mut ing) = open_ingestor();
    sink.send_line("1000\t1.0\t2.0").unwrap();
    sink.send_line("1001\t1.5\t2.5").unwrap();

    let summary = ing.drain();
    assert_eq!(summary.accepted, 2);
    assert!(summary.rejected.is_empty());
    assert!(!summary.closed);
    assert_eq!(ing.table().column(0), &[1000.0, 1001.0]);
    assert_eq!(ing.table().column(1), &[1.0, 1.5]);
    assert_eq!(ing.table().column(2), &[2.0, 2.5]);
    assert_eq!(ing.row_count(), 2);
    assert_eq!(ing.column_count(), 3);
}

#[test]
fn valid_row_grows_only_its_columns() {
    let (sink, mut ing) = open_ingestor();
    sink.send_line("1\t2\t3\t4\t5").unwrap();
    ing.drain();
    sink.send_line("2\t7\t8").unwrap();
    ing.drain();

    let lens: Vec<usize> = (0..5).map(|i| ing.table().column(i).len()).collect();
    assert_eq!(lens, vec![2, 2, 2, 1, 1]);
}

#[test]
fn short_row_does_not_shift_later_values_onto_its_timestamp() {
    let (sink, mut ing) = open_ingestor();
    for line in ["100\t1\t10\t0", "200\t2", "300\t3\t30\t0", "400\t4\t40\t0"] {
        sink.send_line(line).unwrap();
    }
    ing.drain();

    assert_eq!(ing.table().column(2), &[10.0, 30.0, 40.0]);
    assert_eq!(
        ing.table().series(2),
        vec![[100.0, 10.0], [300.0, 30.0], [400.0, 40.0]]
    );
    assert_eq!(ing.table().series(1).len(), 4);
}

#[test]
fn null_byte_row_is_rejected_atomically() {
    let (sink, mut ing) = open_ingestor();
    sink.send_line("99\t1.0\t2.0").unwrap();
    ing.drain();
    let before = snapshot(&ing);

    sink.send_line("100\t5.0\u{0}3.0").unwrap();
    let summary = ing.drain();

    assert_eq!(summary.accepted, 0);
    assert!(matches!(summary.rejected[..], [RowError::NullByte { .. }]));
    assert_eq!(snapshot(&ing), before);
}

#[test]
fn non_numeric_field_rejects_whole_row_and_names_it() {
    let (sink, mut ing) = open_ingestor();
    sink.send_line("100\tabc\t3.0").unwrap();
    let summary = ing.drain();

    assert_eq!(ing.column_count(), 0);
    assert_eq!(summary.rejected.len(), 1);
    let err = &summary.rejected[0];
    assert_eq!(err.row(), "100\tabc\t3.0");
    assert!(err.to_string().contains("abc"), "got: {err}");
    assert!(matches!(err, RowError::InvalidNumber { column: 1, .. }));
}

// Writer that appends formatted log lines to a shared buffer
#[derive(Clone, Default)]
struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn rejected_row_is_logged_with_its_text() {
    let logs = LogCapture::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    let (sink, mut ing) = open_ingestor();
    sink.send_line("100\tabc\t3.0").unwrap();
    tracing::subscriber::with_default(subscriber, || {
        ing.drain();
    });

    let out = logs.contents();
    assert!(out.contains("WARN"), "got: {out}");
    assert!(out.contains(r#""100\tabc\t3.0""#), "got: {out}");
    assert!(out.contains("Parsing: 100\tabc\t3.0"), "got: {out}");
}

#[test]
fn short_rows_are_skipped() {
    let (sink, mut ing) = open_ingestor();
    sink.send_line("1000").unwrap();
    sink.send_line("").unwrap();
    let summary = ing.drain();

    assert_eq!(summary.accepted, 0);
    assert_eq!(summary.rejected.len(), 2);
    assert!(summary
        .rejected
        .iter()
        .all(|e| matches!(e, RowError::TooFewFields { .. })));
    assert!(ing.table().is_empty());
}

#[test]
fn bad_row_does_not_stop_later_rows() {
    let (sink, mut ing) = open_ingestor();
    sink.send_line("1\tx").unwrap();
    sink.send_line("2\t3").unwrap();
    let summary = ing.drain();
    assert_eq!(summary.accepted, 1);
    assert_eq!(summary.rejected.len(), 1);
    assert_eq!(ing.table().column(1), &[3.0]);
}

#[test]
fn drain_on_idle_stream_returns_immediately() {
    let (_sink, mut ing) = open_ingestor();
    let summary = ing.drain();
    assert_eq!(summary.accepted, 0);
    assert!(!summary.closed);
    assert!(!ing.is_closed());
}

#[test]
fn drain_reports_closed_stream_after_buffered_lines() {
    let (sink, mut ing) = open_ingestor();
    sink.send_line("1\t2").unwrap();
    drop(sink);
    let summary = ing.drain();
    assert_eq!(summary.accepted, 1);
    assert!(summary.closed);
    assert!(ing.is_closed());
}

#[test]
fn numeric_literal_grammar() {
    for ok in ["0", "-3", "+4", "1.5", ".5", "5.", "1e3", "-2.5E-3", " 7 "] {
        assert!(parse_number(ok).is_some(), "{ok:?} should parse");
    }
    for bad in ["", ".", "-", "abc", "1e", "e5", "0x10", "inf", "NaN", "1,5", "__import__('os')", "1e400"] {
        assert!(parse_number(bad).is_none(), "{bad:?} should be refused");
    }
}

#[test]
fn parse_row_tolerates_crlf() {
    assert_eq!(parse_row("5\t6\r").unwrap(), vec![5.0, 6.0]);
}

#[test]
fn await_first_row_returns_once_data_exists() {
    let (sink, mut ing) = open_ingestor();
    let feeder = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(30));
        sink.send_line("not a row").unwrap();
        sink.send_line("1\t2\t3").unwrap();
        sink
    });
    ing.await_first_row(Duration::from_millis(5), Some(Duration::from_secs(10)))
        .unwrap();
    assert_eq!(ing.row_count(), 1);
    drop(feeder.join().unwrap());
}

#[test]
fn await_first_row_fails_when_stream_closes_empty() {
    let (sink, mut ing) = open_ingestor();
    sink.send_line("garbage").unwrap();
    drop(sink);
    let err = ing
        .await_first_row(Duration::from_millis(5), None)
        .unwrap_err();
    assert_eq!(err, IngestError::StreamClosed);
}

#[test]
fn await_first_row_times_out() {
    let (_sink, mut ing) = open_ingestor();
    let err = ing
        .await_first_row(Duration::from_millis(5), Some(Duration::from_millis(40)))
        .unwrap_err();
    assert!(matches!(err, IngestError::TimedOut { .. }));
}

#[test]
fn retention_keeps_newest_samples() {
    let (sink, source) = line_channel();
    let mut ing = Ingestor::with_table(Box::new(source), SampleTable::with_retention(2));
    for t in 0..5 {
        sink.send_line(format!("{t}\t{}", t * 10)).unwrap();
    }
    ing.drain();
    assert_eq!(ing.table().column(0), &[3.0, 4.0]);
    assert_eq!(ing.table().column(1), &[30.0, 40.0]);
}

#[test]
fn reader_thread_forwards_lines_and_closes() {
    let input = std::io::Cursor::new(b"1\t2\r\n3\t\xff\n5\t6".to_vec());
    let (sink, mut source) = line_channel();
    spawn_reader(input, sink).join().unwrap();

    assert_eq!(source.try_next_line(), LinePoll::Line("1\t2".to_string()));
    match source.try_next_line() {
        LinePoll::Line(l) => assert!(parse_row(&l).is_err()),
        other => panic!("expected a line, got {other:?}"),
    }
    assert_eq!(source.try_next_line(), LinePoll::Line("5\t6".to_string()));
    assert_eq!(source.try_next_line(), LinePoll::Closed);
}

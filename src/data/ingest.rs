//! Parsing of tab-separated rows and non-blocking ingestion into the table.

use std::time::{Duration, Instant};

use crate::data::table::SampleTable;
use crate::error::{IngestError, RowError};
use crate::source::{LinePoll, LineSource};

/// Parse one input line into its numeric fields.
///
/// The row is accepted only if it has at least two tab-separated fields and
/// every field is a plain numeric literal (see [`parse_number`]).
pub fn parse_row(line: &str) -> Result<Vec<f64>, RowError> {
    if line.contains('\0') {
        return Err(RowError::NullByte {
            row: line.to_string(),
        });
    }
    let row = line.trim_end();
    let fields: Vec<&str> = row.split('\t').collect();
    if fields.len() < 2 {
        return Err(RowError::TooFewFields {
            row: row.to_string(),
        });
    }
    fields
        .iter()
        .enumerate()
        .map(|(column, field)| {
            parse_number(field).ok_or_else(|| RowError::InvalidNumber {
                row: row.to_string(),
                field: field.to_string(),
                column,
            })
        })
        .collect()
}

/// Strict numeric literal: optional sign, digits with an optional fraction,
/// optional exponent. `inf`, `nan`, hex and anything else are refused.
pub fn parse_number(field: &str) -> Option<f64> {
    let s = field.trim();
    let body = s.strip_prefix(['+', '-']).unwrap_or(s);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(pos) => (&body[..pos], Some(&body[pos + 1..])),
        None => (body, None),
    };

    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((i, f)) => (i, f),
        None => (mantissa, ""),
    };
    let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !all_digits(int_part) || !all_digits(frac_part) {
        return None;
    }
    if let Some(exp) = exponent {
        let digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
        if digits.is_empty() || !all_digits(digits) {
            return None;
        }
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// What a single [`Ingestor::drain`] call did.
#[derive(Debug, Default)]
pub struct DrainSummary {
    pub accepted: usize,
    pub rejected: Vec<RowError>,
    /// The source reported end of stream during this drain.
    pub closed: bool,
}

/// Owns the sample table and the line source feeding it.
pub struct Ingestor {
    table: SampleTable,
    source: Box<dyn LineSource>,
    closed: bool,
}

impl Ingestor {
    pub fn new(source: Box<dyn LineSource>) -> Self {
        Self::with_table(source, SampleTable::new())
    }

    pub fn with_table(source: Box<dyn LineSource>, table: SampleTable) -> Self {
        Self {
            table,
            source,
            closed: false,
        }
    }

    pub fn table(&self) -> &SampleTable {
        &self.table
    }

    pub fn row_count(&self) -> usize {
        self.table.row_count()
    }

    pub fn column_count(&self) -> usize {
        self.table.column_count()
    }

    /// `true` once the source has reported end of stream.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Parse `line` and append it, or leave the table untouched and report why.
    pub fn ingest_line(&mut self, line: &str) -> Result<(), RowError> {
        tracing::debug!("Parsing: {line}");
        match parse_row(line) {
            Ok(values) => {
                self.table.push_row(&values);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("{e}");
                Err(e)
            }
        }
    }

    /// Consume every line available right now. Never blocks; an empty or
    /// finished stream just means nothing new this time.
    pub fn drain(&mut self) -> DrainSummary {
        let mut summary = DrainSummary::default();
        loop {
            match self.source.try_next_line() {
                LinePoll::Line(line) => self.record(&line, &mut summary),
                LinePoll::Empty => break,
                LinePoll::Closed => {
                    if !self.closed {
                        tracing::info!("input stream closed");
                    }
                    self.closed = true;
                    summary.closed = true;
                    break;
                }
            }
        }
        self.table.prune();
        summary
    }

    /// Block until the table holds at least one row.
    ///
    /// Waits on the source in slices of `poll` so no CPU is burnt while idle.
    /// Gives up with [`IngestError::StreamClosed`] if the input ends first, or
    /// with [`IngestError::TimedOut`] once `timeout` (if any) has elapsed.
    pub fn await_first_row(
        &mut self,
        poll: Duration,
        timeout: Option<Duration>,
    ) -> Result<(), IngestError> {
        let started = Instant::now();
        loop {
            self.drain();
            if !self.table.is_empty() {
                return Ok(());
            }
            if self.closed {
                return Err(IngestError::StreamClosed);
            }
            let slice = match timeout {
                Some(limit) => {
                    let waited = started.elapsed();
                    if waited >= limit {
                        return Err(IngestError::TimedOut { waited });
                    }
                    poll.min(limit - waited)
                }
                None => poll,
            };
            match self.source.wait_next_line(slice) {
                LinePoll::Line(line) => {
                    let mut summary = DrainSummary::default();
                    self.record(&line, &mut summary);
                }
                LinePoll::Empty => {}
                LinePoll::Closed => self.closed = true,
            }
        }
    }

    fn record(&mut self, line: &str, summary: &mut DrainSummary) {
        match self.ingest_line(line) {
            Ok(()) => summary.accepted += 1,
            Err(e) => summary.rejected.push(e),
        }
    }
}

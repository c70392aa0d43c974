//! Column-oriented store of parsed samples.

/// One column's values plus the sequence number of the row each value came
/// from, so sparse columns can be matched back to their timestamps.
#[derive(Debug, Clone, Default)]
struct Column {
    rows: Vec<u64>,
    values: Vec<f64>,
}

impl Column {
    fn push(&mut self, row: u64, v: f64) {
        self.rows.push(row);
        self.values.push(v);
    }

    fn keep_newest(&mut self, max: usize) {
        if self.values.len() > max {
            let excess = self.values.len() - max;
            self.rows.drain(..excess);
            self.values.drain(..excess);
        }
    }
}

/// Append-only table keyed by column index. Column 0 holds Unix timestamps
/// in seconds, the remaining columns hold sensor values.
#[derive(Debug, Clone, Default)]
pub struct SampleTable {
    columns: Vec<Column>,
    next_row: u64,
    retention: Option<usize>,
}

impl SampleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A table that keeps at most `max_samples` values per column once
    /// [`prune`](Self::prune) runs.
    pub fn with_retention(max_samples: usize) -> Self {
        Self {
            retention: Some(max_samples),
            ..Self::default()
        }
    }

    pub fn retention(&self) -> Option<usize> {
        self.retention
    }

    /// Append one already-validated row. Column `i` gets `values[i]`; columns
    /// beyond `values.len()` are left alone.
    pub fn push_row(&mut self, values: &[f64]) {
        if self.columns.len() < values.len() {
            self.columns.resize_with(values.len(), Column::default);
        }
        let row = self.next_row;
        self.next_row += 1;
        for (col, &v) in self.columns.iter_mut().zip(values) {
            col.push(row, v);
        }
    }

    /// Number of distinct columns observed so far.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of accepted rows still held (length of the timestamp column).
    pub fn row_count(&self) -> usize {
        self.column(0).len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.iter().all(|c| c.values.is_empty())
    }

    /// Values of column `index`; empty if the column was never seen.
    pub fn column(&self, index: usize) -> &[f64] {
        self.columns.get(index).map_or(&[], |c| c.values.as_slice())
    }

    /// `(timestamp, value)` pairs for column `index`. Each value is paired
    /// with the timestamp of the row it arrived in; values whose timestamp
    /// has already been pruned are left out.
    pub fn series(&self, index: usize) -> Vec<[f64; 2]> {
        let (Some(stamps), Some(col)) = (self.columns.first(), self.columns.get(index)) else {
            return Vec::new();
        };
        // every row has a timestamp, so column 0 holds a contiguous run of rows
        let Some(&first_row) = stamps.rows.first() else {
            return Vec::new();
        };
        col.rows
            .iter()
            .zip(&col.values)
            .filter_map(|(&row, &v)| {
                let at = usize::try_from(row.checked_sub(first_row)?).ok()?;
                stamps.values.get(at).map(|&t| [t, v])
            })
            .collect()
    }

    /// Drop the oldest values of each column beyond the retention limit.
    pub fn prune(&mut self) {
        let Some(max) = self.retention else {
            return;
        };
        for col in &mut self.columns {
            col.keep_newest(max);
        }
    }
}

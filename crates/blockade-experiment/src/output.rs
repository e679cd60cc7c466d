//! Result rows and their CSV / JSON-lines encodings.

use std::io::Write;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::config::OutputFormat;
use crate::error::Result;

/// Strategies compared in every row, in column order.
pub const STRATEGIES: [&str; 3] = ["no_block", "cbh", "degree"];

/// Sample-averaged per-state counts for one (network, threshold, seed size,
/// budget) combination.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentRow {
    pub network_name: String,
    pub threshold: u32,
    pub seed_size: usize,
    pub budget_total: usize,
    /// Per-strategy averages, indexed like [`STRATEGIES`], each by state.
    pub averages: [[f64; 4]; 3],
}

impl ExperimentRow {
    /// Column names, in output order.
    pub fn columns() -> Vec<String> {
        let mut columns: Vec<String> = ["network_name", "threshold", "seed_size", "budget_total"]
            .into_iter()
            .map(String::from)
            .collect();
        for strategy in STRATEGIES {
            columns.extend((0..4).map(|state| format!("{state}_{strategy}")));
        }
        columns
    }

    fn averages_flat(&self) -> impl Iterator<Item = f64> + '_ {
        self.averages.iter().flatten().copied()
    }
}

impl Serialize for ExperimentRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let columns = Self::columns();
        let mut map = serializer.serialize_map(Some(columns.len()))?;
        map.serialize_entry(&columns[0], &self.network_name)?;
        map.serialize_entry(&columns[1], &self.threshold)?;
        map.serialize_entry(&columns[2], &self.seed_size)?;
        map.serialize_entry(&columns[3], &self.budget_total)?;
        for (column, value) in columns[4..].iter().zip(self.averages_flat()) {
            map.serialize_entry(column, &value)?;
        }
        map.end()
    }
}

/// Writes rows to a sink in the configured format.
///
/// CSV output starts with the header line even when no rows follow.
#[derive(Debug)]
pub struct RowWriter<W: Write> {
    inner: W,
    format: OutputFormat,
}

impl<W: Write> RowWriter<W> {
    pub fn new(mut inner: W, format: OutputFormat) -> Result<Self> {
        if format == OutputFormat::Csv {
            writeln!(inner, "{}", ExperimentRow::columns().join(","))?;
        }
        Ok(Self { inner, format })
    }

    pub fn write_row(&mut self, row: &ExperimentRow) -> Result<()> {
        match self.format {
            OutputFormat::Csv => {
                let mut fields = vec![
                    csv_field(&row.network_name),
                    row.threshold.to_string(),
                    row.seed_size.to_string(),
                    row.budget_total.to_string(),
                ];
                fields.extend(row.averages_flat().map(|v| v.to_string()));
                writeln!(self.inner, "{}", fields.join(","))?;
            }
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.inner, row)?;
                writeln!(self.inner)?;
            }
        }
        Ok(())
    }

    /// Flush and hand back the sink.
    pub fn finish(mut self) -> Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Quote a field if it would break the row.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

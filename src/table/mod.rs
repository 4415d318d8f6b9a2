// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The merged per-exposure table.
//!
//! [`munge`] outer-joins the inventory, FVC-header and coefficient tables on
//! exposure id and applies the quality gate. The result is a pair of
//! [`QcTable`]s: the exposure parameters alone, and the full merged table with
//! every coefficient term.

mod error;
#[cfg(test)]
mod tests;

pub use error::TableError;

use std::{
    fmt,
    path::{Path, PathBuf},
};

use indexmap::{IndexMap, IndexSet};
use log::{debug, info};

use crate::{
    constants::{DEFAULT_MAX_POS_RMS, DEFAULT_MIN_NUM_FIDUCIALS, FOCUS_ELEMENTS},
    fvc::FvcHeader,
    inventory::{Inventory, InventoryRow},
    zth::{TermKey, ZthTerms},
};

/// A single cell of a [`QcTable`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Float(f64),
    Int(i64),
    Bool(bool),
    Text(String),
    Missing,
}

impl Value {
    /// Interpret the cell as a number if at all possible. Text cells parse
    /// lazily; this is how tables read back from disk stay plottable.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Text(s) => s.parse().ok(),
            Value::Missing => None,
        }
    }

    fn from_opt_f64(v: Option<f64>) -> Value {
        match v {
            Some(v) => Value::Float(v),
            None => Value::Missing,
        }
    }

    fn from_opt_text(v: Option<&str>) -> Value {
        match v {
            Some(v) => Value::Text(v.to_string()),
            None => Value::Missing,
        }
    }
}

impl fmt::Display for Value {
    /// The cell's file representation; missing cells are empty fields.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Float(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Text(v) => write!(f, "{v}"),
            Value::Missing => Ok(()),
        }
    }
}

/// A table of per-exposure values with named columns.
///
/// Rows are keyed by exposure id; unseen column names extend the table as rows
/// are pushed, so pushing rows with different column sets performs an outer
/// join. Cell lookups beyond a row's recorded cells are [`Value::Missing`].
#[derive(Debug, Clone, Default)]
pub struct QcTable {
    columns: IndexSet<String>,
    expids: Vec<u32>,
    rows: Vec<Vec<Value>>,
}

impl QcTable {
    pub fn new() -> QcTable {
        QcTable::default()
    }

    /// Append a row. Column names not seen before are added after all
    /// existing columns.
    pub fn push_row(&mut self, expid: u32, cells: impl IntoIterator<Item = (String, Value)>) {
        let mut row = vec![Value::Missing; self.columns.len()];
        for (name, value) in cells {
            let (i, _) = self.columns.insert_full(name);
            if i >= row.len() {
                row.resize(i + 1, Value::Missing);
            }
            row[i] = value;
        }
        self.expids.push(expid);
        self.rows.push(row);
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.as_str())
    }

    pub fn expids(&self) -> &[u32] {
        &self.expids
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, expid: u32, column: &str) -> &Value {
        let cell = self
            .columns
            .get_index_of(column)
            .zip(self.expids.iter().position(|&e| e == expid))
            .and_then(|(i_col, i_row)| self.rows[i_row].get(i_col));
        cell.unwrap_or(&Value::Missing)
    }

    /// A whole column interpreted as numbers, aligned with [`QcTable::expids`].
    pub fn numeric_column(&self, column: &str) -> Result<Vec<Option<f64>>, TableError> {
        let i = self
            .columns
            .get_index_of(column)
            .ok_or_else(|| TableError::MissingColumn(column.to_string()))?;
        Ok(self
            .rows
            .iter()
            .map(|row| row.get(i).and_then(Value::as_f64))
            .collect())
    }

    /// Write the table as tab-separated values with a header line.
    pub fn write_tsv(&self, file: &Path) -> Result<(), TableError> {
        debug!("Writing {}", file.display());
        let mut wtr = csv::WriterBuilder::new().delimiter(b'\t').from_path(file)?;
        wtr.write_record(self.columns.iter())?;
        for row in &self.rows {
            let record = (0..self.columns.len())
                .map(|i| row.get(i).unwrap_or(&Value::Missing).to_string());
            wtr.write_record(record)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Read a table written by [`QcTable::write_tsv`]. All cells come back as
    /// text ([`Value::as_f64`] reinterprets them on demand); the `expid`
    /// column must be present and integral.
    pub fn read_tsv(file: &Path) -> Result<QcTable, TableError> {
        debug!("Reading {}", file.display());
        let mut rdr = csv::ReaderBuilder::new().delimiter(b'\t').from_path(file)?;

        let columns: IndexSet<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
        let expid_col = columns
            .get_index_of("expid")
            .ok_or_else(|| TableError::MissingColumn("expid".to_string()))?;

        let mut expids = vec![];
        let mut rows = vec![];
        for (i, record) in rdr.records().enumerate() {
            let record = record?;
            let expid_str = record.get(expid_col).unwrap_or("");
            let expid = expid_str.parse().map_err(|_| TableError::ParseExpid {
                file: file.to_path_buf().into_boxed_path(),
                // Line 1 is the header.
                line_num: i as u32 + 2,
                string: expid_str.to_string(),
            })?;
            expids.push(expid);
            rows.push(
                record
                    .iter()
                    .map(|field| {
                        if field.is_empty() {
                            Value::Missing
                        } else {
                            Value::Text(field.to_string())
                        }
                    })
                    .collect(),
            );
        }

        Ok(QcTable {
            columns,
            expids,
            rows,
        })
    }
}

/// The files a table stem expands to: exposure parameters and the full merged
/// table.
pub fn table_paths(stem: &Path) -> (PathBuf, PathBuf) {
    let base = stem.to_string_lossy();
    (
        PathBuf::from(format!("{base}_exp_params.tsv")),
        PathBuf::from(format!("{base}_fids.tsv")),
    )
}

/// The pass/fail thresholds applied to each exposure.
#[derive(Debug, Clone, Copy)]
pub struct QualityGate {
    pub min_num_fiducials: u32,
    pub max_pos_rms: f64,
}

impl Default for QualityGate {
    fn default() -> QualityGate {
        QualityGate {
            min_num_fiducials: DEFAULT_MIN_NUM_FIDUCIALS,
            max_pos_rms: DEFAULT_MAX_POS_RMS,
        }
    }
}

impl QualityGate {
    /// An exposure passes when enough fiducials were detected and the fit
    /// residuals are small on both axes. A missing RMS term fails the gate.
    pub fn evaluate(&self, num_fiducials: u32, terms: &IndexMap<TermKey, f64>) -> bool {
        let rms_ok = |name: &str| {
            terms
                .get(&TermKey::Short(name.to_string()))
                .map_or(false, |&rms| rms <= self.max_pos_rms)
        };
        num_fiducials >= self.min_num_fiducials && rms_ok("xrms") && rms_ok("yrms")
    }
}

/// Outer-join the three per-exposure data sources and apply the quality gate.
///
/// Returns `(exp_params, fids)`: the exposure parameters of every exposure
/// with coefficient data, and the full merged table over all inventory
/// exposures. Exposures missing from a source simply have missing cells.
pub fn munge(
    inventory: &Inventory,
    headers: &IndexMap<u32, FvcHeader>,
    zths: &IndexMap<u32, ZthTerms>,
    fiducial_counts: &IndexMap<u32, u32>,
    gate: QualityGate,
) -> (QcTable, QcTable) {
    let mut exp_params = QcTable::new();
    let mut fids = QcTable::new();
    let mut num_passed = 0usize;

    for row in inventory.iter() {
        let expid = row.expid;
        let exp_cells = exp_param_cells(row, headers.get(&expid));

        let mut fid_cells = exp_cells.clone();
        match zths.get(&expid) {
            Some(zth) => {
                let num_fiducials = fiducial_counts.get(&expid).copied().unwrap_or(0);
                let successful = gate.evaluate(num_fiducials, &zth.terms);
                num_passed += successful as usize;

                for (key, &value) in &zth.terms {
                    fid_cells.push((key.to_string(), Value::Float(value)));
                }
                fid_cells.push(("num_fiducials".to_string(), Value::Int(num_fiducials as i64)));
                fid_cells.push(("successful".to_string(), Value::Bool(successful)));

                let mut exp_cells = exp_cells;
                exp_cells.push(("successful".to_string(), Value::Bool(successful)));
                exp_params.push_row(expid, exp_cells);
            }
            // No coefficient data: the exposure stays in the merged table
            // with missing term cells, but has no exposure-parameters row.
            None => {
                fid_cells.push(("num_fiducials".to_string(), Value::Missing));
                fid_cells.push(("successful".to_string(), Value::Missing));
            }
        }
        fids.push_row(expid, fid_cells);
    }

    info!(
        "{} of {} exposures with coefficient data pass the quality gate",
        num_passed,
        exp_params.num_rows()
    );
    (exp_params, fids)
}

/// The inventory and header cells of one exposure. Header columns are always
/// emitted so the column set doesn't depend on which exposure comes first.
fn exp_param_cells(row: &InventoryRow, header: Option<&FvcHeader>) -> Vec<(String, Value)> {
    let mut cells = vec![
        (
            "night".to_string(),
            Value::Text(row.night.format("%Y-%m-%d").to_string()),
        ),
        ("expid".to_string(), Value::Int(row.expid as i64)),
        ("ra".to_string(), Value::from_opt_f64(row.ra)),
        ("dec".to_string(), Value::from_opt_f64(row.dec)),
        ("ut".to_string(), Value::Text(row.ut.clone())),
        ("ha".to_string(), Value::from_opt_f64(row.ha)),
        ("adc1".to_string(), Value::from_opt_f64(row.adc1)),
        ("adc2".to_string(), Value::from_opt_f64(row.adc2)),
        ("seq".to_string(), Value::from_opt_text(row.seq.as_deref())),
        (
            "program".to_string(),
            Value::from_opt_text(row.program.as_deref()),
        ),
        ("mjd".to_string(), Value::from_opt_f64(row.mjd)),
    ];

    let header_cells = [
        ("airmass", header.map(|h| h.airmass)),
        ("az", header.map(|h| h.az)),
        ("el", header.map(|h| h.el)),
        ("zd", header.map(|h| h.zd)),
        ("q", header.map(|h| h.q)),
        ("humidity", header.map(|h| h.humidity)),
        ("pressure", header.map(|h| h.pressure)),
    ];
    for (name, value) in header_cells {
        cells.push((name.to_string(), Value::from_opt_f64(value)));
    }
    for (i, elem) in FOCUS_ELEMENTS.iter().enumerate() {
        cells.push((
            format!("focus_{elem}"),
            Value::from_opt_f64(header.map(|h| h.focus[i])),
        ));
    }

    cells
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Parsing of "qcinv" inventory files.
//!
//! A qcinv file is a whitespace-delimited log with one exposure per line:
//! night, exposure id, RA, Dec, UT, hour angle, two ADC angles, a sequence tag
//! and a program name. Only rows whose UT field is exactly `HH:MM` describe
//! real exposures; everything else (headers, aborted sequences) is dropped.

mod error;

pub use error::InventoryError;

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use chrono::{Datelike, NaiveDate};
use hifitime::Epoch;
use indexmap::IndexMap;
use log::{debug, warn};

/// One usable row of a qcinv file, plus the derived MJD.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryRow {
    pub night: NaiveDate,
    pub expid: u32,
    pub ra: Option<f64>,
    pub dec: Option<f64>,
    /// UT of the exposure as `HH:MM`.
    pub ut: String,
    pub ha: Option<f64>,
    pub adc1: Option<f64>,
    pub adc2: Option<f64>,
    pub seq: Option<String>,
    pub program: Option<String>,
    /// Modified Julian Date of `night` + `ut`. `None` if the UT digits don't
    /// form a valid time.
    pub mjd: Option<f64>,
}

/// The inventory table, keyed by exposure id in file order.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    rows: IndexMap<u32, InventoryRow>,
}

impl Inventory {
    /// Read an inventory table from a qcinv file.
    pub fn load(file: &Path) -> Result<Inventory, InventoryError> {
        debug!("Reading {}", file.display());
        let mut buf = BufReader::new(File::open(file)?);
        parse_inventory(&mut buf)
    }

    pub fn get(&self, expid: u32) -> Option<&InventoryRow> {
        self.rows.get(&expid)
    }

    /// Exposure ids in file order.
    pub fn expids(&self) -> impl Iterator<Item = u32> + '_ {
        self.rows.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InventoryRow> {
        self.rows.values()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Parse a buffer containing qcinv text into an [`Inventory`].
pub(crate) fn parse_inventory<T: BufRead>(buf: &mut T) -> Result<Inventory, InventoryError> {
    let mut line = String::new();
    let mut line_num: u32 = 0;
    let mut rows = IndexMap::new();

    while buf.read_line(&mut line)? > 0 {
        line_num += 1;

        // Some program names contain a space; fuse them into one token before
        // splitting on whitespace.
        let fused = line.replace("everywhere script", "everywhere_script");
        let fields: Vec<&str> = fused.split_whitespace().collect();
        line.clear();

        if fields.is_empty() {
            continue;
        }
        if fields.len() > 10 {
            return Err(InventoryError::TooManyFields {
                line_num,
                num_fields: fields.len(),
            });
        }

        // Only rows with a HH:MM UT describe exposures.
        let ut = match fields.get(4) {
            Some(ut) if ut.len() == 5 => ut.to_string(),
            _ => {
                debug!("Inventory line {line_num} has no usable UT; skipping it");
                continue;
            }
        };

        let night = parse_night(fields[0]).ok_or_else(|| InventoryError::ParseNight {
            line_num,
            string: fields[0].to_string(),
        })?;
        let expid: u32 = fields[1].parse().map_err(|_| InventoryError::ParseExpid {
            line_num,
            string: fields[1].to_string(),
        })?;

        let mjd = ut_to_mjd(night, &ut);
        if mjd.is_none() {
            warn!("Inventory line {line_num}: UT \"{ut}\" isn't a valid time; no MJD for exposure {expid}");
        }

        let float = |i: usize| -> Option<f64> { fields.get(i).and_then(|f| f.parse().ok()) };
        let row = InventoryRow {
            night,
            expid,
            ra: float(2),
            dec: float(3),
            ut,
            ha: float(5),
            adc1: float(6),
            adc2: float(7),
            seq: fields.get(8).map(|f| f.to_string()),
            program: fields.get(9).map(|f| f.to_string()),
            mjd,
        };
        if rows.insert(expid, row).is_some() {
            warn!("Exposure {expid} appears more than once in the inventory; keeping the last row");
        }
    }

    Ok(Inventory { rows })
}

/// Nights are written either as `YYYYMMDD` or `YYYY-MM-DD`.
fn parse_night(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .ok()
}

/// Combine a night and a `HH:MM` UT into a Modified Julian Date.
fn ut_to_mjd(night: NaiveDate, ut: &str) -> Option<f64> {
    let (h, m) = ut.split_once(':')?;
    let h: u8 = h.parse().ok()?;
    let m: u8 = m.parse().ok()?;
    if h > 23 || m > 59 {
        return None;
    }
    let epoch = Epoch::from_gregorian_utc(
        night.year(),
        night.month() as u8,
        night.day() as u8,
        h,
        m,
        0,
        0,
    );
    Some(epoch.to_mjd_utc_days())
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Parsing of polynomial-coefficient ("zth") .par files.
//!
//! Each exposure carries two files, `xzth-<expid>.0.par` and
//! `yzth-<expid>.0.par`. The files mix two line shapes: "short" terms
//! (`name,value`, e.g. the per-axis RMS of the fit) and "long" terms
//! (`order,term,value`), which describe a coefficient of the named polynomial.
//! A literal `None` stands in for the polynomial's own name, and a `,sig`
//! suffix marks a term's uncertainty.

mod error;
#[cfg(test)]
mod tests;

pub use error::ZthError;

use std::{fmt, path::Path};

use indexmap::IndexMap;
use log::{debug, warn};
use strum_macros::{Display, EnumIter, EnumString};

/// The two fitted polynomials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
pub enum Poly {
    #[strum(serialize = "xzth")]
    X,
    #[strum(serialize = "yzth")]
    Y,
}

/// Identifies one column of the pivoted coefficient table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TermKey {
    /// A short term, keyed by name alone (e.g. `xrms`).
    Short(String),
    /// A polynomial coefficient, keyed by polynomial, order and term name.
    Long { poly: Poly, order: u8, term: String },
}

impl fmt::Display for TermKey {
    /// The flattened column name, e.g. `xrms` or `xzth,2,xpetal`.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TermKey::Short(name) => write!(f, "{name}"),
            TermKey::Long { poly, order, term } => write!(f, "{poly},{order},{term}"),
        }
    }
}

/// All coefficient terms of one exposure, pivoted into a wide record.
#[derive(Debug, Clone)]
pub struct ZthTerms {
    pub expid: u32,
    /// Term values in first-seen order.
    pub terms: IndexMap<TermKey, f64>,
}

/// Read the coefficient terms for one exposure from both of its .par files.
pub fn read_zth(zth_dir: &Path, expid: u32) -> Result<ZthTerms, ZthError> {
    use strum::IntoEnumIterator;

    let mut terms = IndexMap::new();
    for poly in Poly::iter() {
        let file = zth_dir
            .join(expid.to_string())
            .join(format!("{poly}-{expid}.0.par"));
        debug!("Reading {}", file.display());
        let contents = std::fs::read_to_string(&file)?;
        parse_par(poly, &contents, &mut terms)?;
    }
    Ok(ZthTerms { expid, terms })
}

/// Read coefficient terms for many exposures, skipping (with a warning) any
/// exposure whose files can't be read.
pub fn read_zths(
    zth_dir: &Path,
    expids: impl IntoIterator<Item = u32>,
) -> IndexMap<u32, ZthTerms> {
    let mut zths = IndexMap::new();
    for expid in expids {
        match read_zth(zth_dir, expid) {
            Ok(z) => {
                zths.insert(expid, z);
            }
            Err(e) => warn!("Couldn't read coefficients for exposure {expid}: {e}"),
        }
    }
    zths
}

/// Parse the contents of a single .par file, adding its terms to `terms`.
///
/// Later duplicates of a term overwrite earlier ones.
pub(crate) fn parse_par(
    poly: Poly,
    contents: &str,
    terms: &mut IndexMap<TermKey, f64>,
) -> Result<(), ZthError> {
    // `None` stands in for the polynomial name and `,sig` binds to the
    // preceding term name; the remaining commas are just field separators.
    let normalised = contents
        .replace("None", &poly.to_string())
        .replace(",sig", "_sig")
        .replace(',', "\t");

    for (i, line) in normalised.lines().enumerate() {
        let line_num = i as u32 + 1;
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.as_slice() {
            [name, value] => {
                terms.insert(
                    TermKey::Short(name.to_string()),
                    parse_float(value, line_num)?,
                );
            }
            [order, term, value] => {
                let order = order.parse().map_err(|_| ZthError::ParseOrder {
                    line_num,
                    string: order.to_string(),
                })?;
                terms.insert(
                    TermKey::Long {
                        poly,
                        order,
                        term: term.to_string(),
                    },
                    parse_float(value, line_num)?,
                );
            }
            // Anything else (blank lines, banners) carries no terms.
            _ => (),
        }
    }

    Ok(())
}

fn parse_float(string: &str, line_num: u32) -> Result<f64, ZthError> {
    string.parse().map_err(|_| ZthError::ParseFloat {
        line_num,
        string: string.to_string(),
    })
}

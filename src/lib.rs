// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Quality-control munging and trend plotting for the calibration outputs of a
fiber-positioner instrument.

Three independently-formatted data sources are aligned by exposure id: a
whitespace-delimited inventory log ("qcinv"), FVC image FITS headers, and
per-exposure polynomial-coefficient files ("zth" .par files). The merged
tables carry a pass/fail flag derived from fiducial-detection counts and
positional RMS thresholds, and can be plotted as calibration-term trends
against any exposure parameter.
 */

pub mod cli;
pub(crate) mod constants;
pub mod fvc;
pub mod inventory;
pub(crate) mod io;
pub mod plot;
pub mod table;
pub mod zth;

// Re-exports.
pub use cli::{Fvcqc, FvcqcError};
pub use table::{QcTable, QualityGate};

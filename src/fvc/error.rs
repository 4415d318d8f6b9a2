// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with reading FVC products.

use std::path::Path;

use thiserror::Error;

use crate::io::fits::FitsError;

#[derive(Error, Debug)]
pub enum FvcError {
    #[error("FOCUS keyword of {file}: expected 6 comma-separated values, found {num}")]
    FocusFormat { file: Box<Path>, num: usize },

    #[error("FOCUS keyword of {file}: couldn't parse \"{string}\" as a number")]
    FocusParse { file: Box<Path>, string: String },

    #[error(transparent)]
    Fits(#[from] FitsError),
}

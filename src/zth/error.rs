// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with reading .par coefficient files.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ZthError {
    #[error("Line {line_num}: couldn't parse \"{string}\" as a number")]
    ParseFloat { line_num: u32, string: String },

    #[error("Line {line_num}: couldn't parse polynomial order from \"{string}\"")]
    ParseOrder { line_num: u32, string: String },

    #[error(transparent)]
    IO(#[from] std::io::Error),
}

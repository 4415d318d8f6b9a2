// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with merged tables and their files.

use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("Column \"{0}\" isn't in the table")]
    MissingColumn(String),

    #[error("Line {line_num} of {file}: couldn't parse exposure id from \"{string}\"")]
    ParseExpid {
        file: Box<Path>,
        line_num: u32,
        string: String,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}

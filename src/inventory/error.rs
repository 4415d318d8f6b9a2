// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with reading qcinv inventory files.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("Inventory line {line_num}: expected at most 10 fields, found {num_fields}")]
    TooManyFields { line_num: u32, num_fields: usize },

    #[error("Inventory line {line_num}: couldn't parse night from \"{string}\"")]
    ParseNight { line_num: u32, string: String },

    #[error("Inventory line {line_num}: couldn't parse exposure id from \"{string}\"")]
    ParseExpid { line_num: u32, string: String },

    #[error(transparent)]
    IO(#[from] std::io::Error),
}

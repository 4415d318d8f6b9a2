// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all fvcqc-related errors. This should be the *only* error
//! enum that is publicly visible.

use thiserror::Error;

use crate::{inventory::InventoryError, plot::PlotError, table::TableError};

/// The *only* publicly visible error from fvcqc.
#[derive(Error, Debug)]
pub enum FvcqcError {
    /// An error related to the inventory file.
    #[error("{0}")]
    Inventory(String),

    /// An error related to a merged table or its files.
    #[error("{0}")]
    Table(String),

    /// An error related to plotting.
    #[error("{0}")]
    Plot(String),

    /// An error related to argument files.
    #[error("{0}")]
    ArgFile(String),

    /// A generic error.
    #[error("{0}")]
    Generic(String),
}

impl From<InventoryError> for FvcqcError {
    fn from(e: InventoryError) -> Self {
        let s = e.to_string();
        match e {
            InventoryError::IO(_) => Self::Generic(s),
            _ => Self::Inventory(s),
        }
    }
}

impl From<TableError> for FvcqcError {
    fn from(e: TableError) -> Self {
        let s = e.to_string();
        match e {
            TableError::Csv(_) | TableError::IO(_) => Self::Generic(s),
            _ => Self::Table(s),
        }
    }
}

impl From<PlotError> for FvcqcError {
    fn from(e: PlotError) -> Self {
        let s = e.to_string();
        match e {
            PlotError::Table(e) => Self::from(e),
            _ => Self::Plot(s),
        }
    }
}

impl From<std::io::Error> for FvcqcError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}

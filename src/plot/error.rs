// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::table::TableError;

#[derive(Error, Debug)]
pub(crate) enum PlotError {
    #[cfg(not(feature = "plotting"))]
    #[error("fvcqc was not compiled with the \"plotting\" feature.\nYou need to compile fvcqc from source with this feature to plot trends.")]
    NoPlottingFeature,

    #[cfg(feature = "plotting")]
    #[error("Unknown plot page {0}; expected 1 or 2")]
    UnknownPage(u8),

    #[cfg(feature = "plotting")]
    #[error("Error from the plotters library: {0}")]
    Draw(#[from] super::plotting::DrawError),

    #[error(transparent)]
    Table(#[from] TableError),
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Constants shared across the crate.

/// The fewest fiducial detections an exposure may have and still pass the
/// quality gate.
pub(crate) const DEFAULT_MIN_NUM_FIDUCIALS: u32 = 100;

/// The largest positional RMS (in either axis) an exposure may have and still
/// pass the quality gate \[mm\].
pub(crate) const DEFAULT_MAX_POS_RMS: f64 = 0.05;

/// The six hexapod degrees of freedom packed into the FOCUS header keyword, in
/// order.
pub(crate) const FOCUS_ELEMENTS: [&str; 6] =
    ["xtrans", "ytrans", "ztrans", "xtilt", "ytilt", "ztilt"];

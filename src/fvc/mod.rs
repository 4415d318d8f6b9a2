// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Reading fiber-view-camera (FVC) products: per-exposure image headers and
//! fiducial-detection tables.

mod error;

pub use error::FvcError;

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::{debug, warn};

use crate::io::fits::{fits_get_required_key, fits_open, fits_open_hdu};

/// The observing conditions and hexapod state recorded in an FVC image's
/// primary header.
#[derive(Debug, Clone, PartialEq)]
pub struct FvcHeader {
    pub expid: u32,
    pub airmass: f64,
    /// Mount azimuth \[degrees\].
    pub az: f64,
    /// Mount elevation \[degrees\].
    pub el: f64,
    /// Zenith distance \[degrees\].
    pub zd: f64,
    /// Parallactic angle \[degrees\].
    pub q: f64,
    pub humidity: f64,
    pub pressure: f64,
    /// Hexapod state, in [`FOCUS_ELEMENTS`](crate::constants::FOCUS_ELEMENTS)
    /// order.
    pub focus: [f64; 6],
}

/// The FVC image file associated with an exposure.
pub(crate) fn fvc_path(fits_dir: &Path, expid: u32) -> PathBuf {
    fits_dir
        .join(expid.to_string())
        .join(format!("fvc-{expid:08}.fits.fz"))
}

/// Read the header parameters of one exposure's FVC image.
pub fn read_header(fits_dir: &Path, expid: u32) -> Result<FvcHeader, FvcError> {
    let file = fvc_path(fits_dir, expid);
    debug!("Reading {}", file.display());
    let mut fptr = fits_open(&file)?;
    let hdu = fits_open_hdu(&mut fptr, 0)?;

    let focus_str: String = fits_get_required_key(&mut fptr, &hdu, "FOCUS")?;
    Ok(FvcHeader {
        expid,
        airmass: fits_get_required_key(&mut fptr, &hdu, "AIRMASS")?,
        az: fits_get_required_key(&mut fptr, &hdu, "MOUNTAZ")?,
        el: fits_get_required_key(&mut fptr, &hdu, "MOUNTEL")?,
        zd: fits_get_required_key(&mut fptr, &hdu, "ZD")?,
        q: fits_get_required_key(&mut fptr, &hdu, "PARALLAC")?,
        humidity: fits_get_required_key(&mut fptr, &hdu, "HUMIDITY")?,
        pressure: fits_get_required_key(&mut fptr, &hdu, "PRESSURE")?,
        focus: parse_focus(&file, &focus_str)?,
    })
}

/// Read header parameters for many exposures, skipping (with a warning) any
/// exposure whose image can't be read.
pub fn read_headers(
    fits_dir: &Path,
    expids: impl IntoIterator<Item = u32>,
) -> IndexMap<u32, FvcHeader> {
    let mut headers = IndexMap::new();
    for expid in expids {
        match read_header(fits_dir, expid) {
            Ok(h) => {
                headers.insert(expid, h);
            }
            Err(e) => warn!("Couldn't read the FVC header for exposure {expid}: {e}"),
        }
    }
    headers
}

/// The FOCUS keyword packs the six hexapod degrees of freedom into one
/// comma-separated string.
fn parse_focus(file: &Path, focus: &str) -> Result<[f64; 6], FvcError> {
    let mut values = [0.0; 6];
    let mut num_parsed = 0;
    for (value, elem) in focus.split(',').zip(values.iter_mut()) {
        *elem = value
            .trim()
            .parse()
            .map_err(|_| FvcError::FocusParse {
                file: file.to_path_buf().into_boxed_path(),
                string: value.trim().to_string(),
            })?;
        num_parsed += 1;
    }
    if num_parsed < 6 {
        return Err(FvcError::FocusFormat {
            file: file.to_path_buf().into_boxed_path(),
            num: num_parsed,
        });
    }
    Ok(values)
}

/// Count the fiducial detections recorded for an exposure.
///
/// The merged-detections table is usually `fvcMerge-<expid>.dat`, sometimes
/// `fvcMerge-<expid>.0.dat`. The first line of either is a column header. An
/// exposure with no readable table counts as having no detections.
pub fn count_fiducials(data_dir: &Path, expid: u32) -> u32 {
    for fname in [
        format!("fvcMerge-{expid}.dat"),
        format!("fvcMerge-{expid}.0.dat"),
    ] {
        let file = data_dir.join(expid.to_string()).join(&fname);
        debug!("Reading {}", file.display());
        match std::fs::read_to_string(&file) {
            Ok(contents) => {
                let num_lines = contents.lines().filter(|l| !l.trim().is_empty()).count();
                if num_lines == 0 {
                    continue;
                }
                return num_lines as u32 - 1;
            }
            Err(_) => continue,
        }
    }
    warn!("Couldn't read a fiducials table for exposure {expid}; counting none");
    0
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Merge all calibration-output sources into a pair of tables keyed by
//! exposure id.


use std::path::PathBuf;

use clap::Parser;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::common::ARG_FILE_HELP;
use crate::{
    constants::{DEFAULT_MAX_POS_RMS, DEFAULT_MIN_NUM_FIDUCIALS},
    fvc,
    inventory::Inventory,
    table::{munge, table_paths, QualityGate},
    zth, FvcqcError,
};

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct MungeArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    pub(super) args_file: Option<PathBuf>,

    /// Path to the qcinv inventory file.
    #[clap(short, long, parse(from_os_str), help_heading = "INPUT FILES")]
    pub(super) qcinv: Option<PathBuf>,

    /// The directory containing one subdirectory per exposure, each holding
    /// the FVC image, .par coefficient files and fvcMerge tables.
    #[clap(short, long, parse(from_os_str), help_heading = "INPUT FILES")]
    pub(super) data_dir: Option<PathBuf>,

    /// Stem of the tables to write; "<stem>_exp_params.tsv" and
    /// "<stem>_fids.tsv" are derived from it.
    #[clap(short, long, parse(from_os_str), help_heading = "OUTPUT FILES")]
    pub(super) outputs: Option<PathBuf>,

    /// Write the exposure-parameters table here instead of next to the stem.
    #[clap(long, parse(from_os_str), help_heading = "OUTPUT FILES")]
    pub(super) exp_params: Option<PathBuf>,

    /// Write the merged table here instead of next to the stem.
    #[clap(long, parse(from_os_str), help_heading = "OUTPUT FILES")]
    pub(super) fids: Option<PathBuf>,

    /// The fewest fiducial detections an exposure may have and still pass the
    /// quality gate.
    #[clap(long, help_heading = "QUALITY GATE")]
    pub(super) min_fiducials: Option<u32>,

    /// The largest positional RMS (in either axis) an exposure may have and
    /// still pass the quality gate [mm].
    #[clap(long, help_heading = "QUALITY GATE")]
    pub(super) max_pos_rms: Option<f64>,
}

impl MungeArgs {
    /// Combine arguments from the command line and an argument file,
    /// preferring CLI parameters when both are set.
    pub(super) fn merge(self) -> Result<MungeArgs, FvcqcError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            // Ensure all of the file args are accounted for by pattern
            // matching.
            let MungeArgs {
                args_file: _,
                qcinv,
                data_dir,
                outputs,
                exp_params,
                fids,
                min_fiducials,
                max_pos_rms,
            } = unpack_arg_file!(arg_file);

            Ok(MungeArgs {
                args_file: None,
                qcinv: cli_args.qcinv.or(qcinv),
                data_dir: cli_args.data_dir.or(data_dir),
                outputs: cli_args.outputs.or(outputs),
                exp_params: cli_args.exp_params.or(exp_params),
                fids: cli_args.fids.or(fids),
                min_fiducials: cli_args.min_fiducials.or(min_fiducials),
                max_pos_rms: cli_args.max_pos_rms.or(max_pos_rms),
            })
        } else {
            Ok(cli_args)
        }
    }

    pub(super) fn run(self, dry_run: bool) -> Result<(), FvcqcError> {
        let MungeArgs {
            args_file: _,
            qcinv,
            data_dir,
            outputs,
            exp_params,
            fids,
            min_fiducials,
            max_pos_rms,
        } = self;

        let qcinv =
            qcinv.ok_or_else(|| FvcqcError::Generic("No inventory file supplied".to_string()))?;
        let data_dir =
            data_dir.ok_or_else(|| FvcqcError::Generic("No data directory supplied".to_string()))?;
        let outputs =
            outputs.ok_or_else(|| FvcqcError::Generic("No output stem supplied".to_string()))?;
        let (exp_params_file, fids_file) = {
            let (default_exp, default_fids) = table_paths(&outputs);
            (
                exp_params.unwrap_or(default_exp),
                fids.unwrap_or(default_fids),
            )
        };
        let gate = QualityGate {
            min_num_fiducials: min_fiducials.unwrap_or(DEFAULT_MIN_NUM_FIDUCIALS),
            max_pos_rms: max_pos_rms.unwrap_or(DEFAULT_MAX_POS_RMS),
        };

        let inventory = Inventory::load(&qcinv)?;
        info!(
            "{} usable exposures in {}",
            inventory.len(),
            qcinv.display()
        );

        if dry_run {
            info!(
                "Would write {} and {}",
                exp_params_file.display(),
                fids_file.display()
            );
            info!("Dry run -- exiting now.");
            return Ok(());
        }

        let headers = fvc::read_headers(&data_dir, inventory.expids());
        info!(
            "Read FVC headers for {} of {} exposures",
            headers.len(),
            inventory.len()
        );

        let zths = zth::read_zths(&data_dir, inventory.expids());
        info!(
            "Read coefficients for {} of {} exposures",
            zths.len(),
            inventory.len()
        );

        let fiducial_counts = zths
            .keys()
            .map(|&expid| (expid, fvc::count_fiducials(&data_dir, expid)))
            .collect();

        let (exp_params_table, fids_table) =
            munge(&inventory, &headers, &zths, &fiducial_counts, gate);

        exp_params_table.write_tsv(&exp_params_file)?;
        info!("Wrote {}", exp_params_file.display());
        fids_table.write_tsv(&fids_file)?;
        info!("Wrote {}", fids_file.display());

        Ok(())
    }
}

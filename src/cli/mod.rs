// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Command-line interface.

#[macro_use]
mod common;
mod error;
mod munge;

pub use error::FvcqcError;

use std::path::PathBuf;

use clap::{AppSettings, Args, Parser, Subcommand};
use log::info;

use crate::plot::{PlotDistortionsArgs, PlotPetalsArgs};

// Add build-time information from the "built" crate.
include!(concat!(env!("OUT_DIR"), "/built.rs"));

#[derive(Parser)]
#[clap(name = "fvcqc", version, about)]
#[clap(global_setting(AppSettings::ArgRequiredElseHelp))]
#[clap(global_setting(AppSettings::DeriveDisplayOrder))]
#[clap(global_setting(AppSettings::DisableHelpSubcommand))]
#[clap(global_setting(AppSettings::InferLongArgs))]
#[clap(global_setting(AppSettings::InferSubcommands))]
#[clap(global_setting(AppSettings::PropagateVersion))]
pub struct Fvcqc {
    #[clap(subcommand)]
    command: Command,

    #[clap(flatten)]
    global_opts: GlobalArgs,
}

#[derive(Args)]
struct GlobalArgs {
    /// The verbosity of the program. Increase by specifying multiple times
    /// (e.g. -vv).
    #[clap(short, long, parse(from_occurrences), global = true)]
    verbosity: u8,

    /// Parse the inputs, report what would be done, then exit without doing
    /// any of the work.
    #[clap(long, global = true)]
    dry_run: bool,

    /// Don't run the subcommand; write the merged arguments to the specified
    /// toml file and exit.
    #[clap(long, global = true, parse(from_os_str))]
    save_toml: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Align the qcinv inventory, FVC image headers and zth coefficient files
    /// by exposure id, apply the quality gate, and write the merged tables.
    Munge(munge::MungeArgs),

    /// Plot per-petal calibration terms against an exposure parameter, one
    /// panel per petal.
    PlotPetals(PlotPetalsArgs),

    /// Plot field-distortion terms against an exposure parameter, one panel
    /// per term.
    PlotDistortions(PlotDistortionsArgs),
}

impl Fvcqc {
    pub fn run(self) -> Result<(), FvcqcError> {
        let Self {
            command,
            global_opts:
                GlobalArgs {
                    verbosity,
                    dry_run,
                    save_toml,
                },
        } = self;

        setup_logging(verbosity).expect("Failed to initialise logging.");

        // Print the version of fvcqc and its build-time information.
        info!(
            "fvcqc {} {}",
            match command {
                Command::Munge(_) => "munge",
                Command::PlotPetals(_) => "plot-petals",
                Command::PlotDistortions(_) => "plot-distortions",
            },
            env!("CARGO_PKG_VERSION")
        );
        display_build_info();

        // Merge an argument file (if any) into the subcommand's arguments,
        // then either save the merged set or do the work.
        macro_rules! merge_save_run {
            ($args:expr) => {{
                let merged = $args.merge()?;
                if let Some(toml_file) = save_toml {
                    let toml_str = toml::to_string(&merged)
                        .map_err(|e| FvcqcError::ArgFile(e.to_string()))?;
                    std::fs::write(&toml_file, toml_str)?;
                    info!("Wrote merged arguments to {}", toml_file.display());
                } else {
                    merged.run(dry_run)?;
                }
            }};
        }

        match command {
            Command::Munge(args) => merge_save_run!(args),
            Command::PlotPetals(args) => args.run()?,
            Command::PlotDistortions(args) => args.run()?,
        }

        Ok(())
    }
}

/// Activate the logger. The verbosity is supplied by the "level" argument,
/// where 0 is "info", 1 is "debug" and 2 (or more) is "trace". The maximum
/// verbosity also prepends the file and line number of each log call.
fn setup_logging(level: u8) -> Result<(), log::SetLoggerError> {
    let mut builder = env_logger::Builder::from_default_env();
    builder.target(env_logger::Target::Stdout);
    builder.format_target(false);
    match level {
        0 => builder.filter_level(log::LevelFilter::Info),
        1 => builder.filter_level(log::LevelFilter::Debug),
        2 => builder.filter_level(log::LevelFilter::Trace),
        _ => {
            builder.filter_level(log::LevelFilter::Trace);
            builder.format(|buf, record| {
                use std::io::Write;

                let timestamp = buf.timestamp_millis();
                writeln!(
                    buf,
                    "[{} {} {}:{}] {}",
                    timestamp,
                    record.level(),
                    record.file().unwrap_or("<unknown>"),
                    record.line().unwrap_or(0),
                    record.args()
                )
            })
        }
    };
    builder.try_init()
}

/// Write many info-level log lines describing how the program was compiled.
fn display_build_info() {
    match GIT_COMMIT_HASH_SHORT {
        Some(hash) => {
            let dirty = match GIT_DIRTY {
                Some(true) => " (dirty)",
                _ => "",
            };
            info!("Compiled on git commit hash: {hash}{dirty}");
        }
        None => info!("<no git info>"),
    }
    if let Some(head_ref) = GIT_HEAD_REF {
        info!("            git head ref: {head_ref}");
    }
    info!("            {BUILT_TIME_UTC}");
    info!("         with compiler {RUSTC_VERSION}");
    info!("");
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Trend plots of calibration terms against exposure parameters.

mod error;
#[cfg(all(test, feature = "plotting"))]
mod tests;

pub(crate) use error::PlotError;

use std::path::PathBuf;

use clap::Parser;

use crate::FvcqcError;

/// The default plot size in pixels.
const DEFAULT_WIDTH: u32 = 750;
const DEFAULT_HEIGHT: u32 = 1000;

#[derive(Parser, Debug)]
pub struct PlotPetalsArgs {
    /// Stem of the munged tables, as given to `fvcqc munge`.
    #[clap(name = "TABLE_STEM", parse(from_os_str))]
    stem: PathBuf,

    /// The exposure-parameter column to plot terms against (e.g. mjd,
    /// airmass, q).
    #[clap(name = "X_PARAM")]
    xparam: String,

    /// Which page of plots to produce (1: petals 2-6, 2: petals 7-11).
    #[clap(name = "PAGE")]
    page: u8,

    /// The PNG file to write.
    #[clap(name = "OUT_FILE", parse(from_os_str))]
    output: PathBuf,

    /// The width of the plot in pixels.
    #[clap(long, default_value_t = DEFAULT_WIDTH)]
    width: u32,

    /// The height of the plot in pixels.
    #[clap(long, default_value_t = DEFAULT_HEIGHT)]
    height: u32,
}

#[derive(Parser, Debug)]
pub struct PlotDistortionsArgs {
    /// Stem of the munged tables, as given to `fvcqc munge`.
    #[clap(name = "TABLE_STEM", parse(from_os_str))]
    stem: PathBuf,

    /// The exposure-parameter column to plot terms against (e.g. mjd,
    /// airmass, q).
    #[clap(name = "X_PARAM")]
    xparam: String,

    /// Which page of plots to produce (1: xzth orders 1-4, 2: xzth order 5
    /// and yzth orders 1-3).
    #[clap(name = "PAGE")]
    page: u8,

    /// The PNG file to write.
    #[clap(name = "OUT_FILE", parse(from_os_str))]
    output: PathBuf,

    /// The width of the plot in pixels.
    #[clap(long, default_value_t = DEFAULT_WIDTH)]
    width: u32,

    /// The height of the plot in pixels.
    #[clap(long, default_value_t = DEFAULT_HEIGHT)]
    height: u32,
}

impl PlotPetalsArgs {
    #[cfg(not(feature = "plotting"))]
    pub fn run(self) -> Result<(), FvcqcError> {
        // Plotting is an optional feature, so that the C dependencies needed
        // for drawing aren't mandatory.
        Err(FvcqcError::from(PlotError::NoPlottingFeature))
    }

    #[cfg(feature = "plotting")]
    pub fn run(self) -> Result<(), FvcqcError> {
        plotting::plot_petal_page(self)?;
        Ok(())
    }
}

impl PlotDistortionsArgs {
    #[cfg(not(feature = "plotting"))]
    pub fn run(self) -> Result<(), FvcqcError> {
        Err(FvcqcError::from(PlotError::NoPlottingFeature))
    }

    #[cfg(feature = "plotting")]
    pub fn run(self) -> Result<(), FvcqcError> {
        plotting::plot_distortion_page(self)?;
        Ok(())
    }
}

#[cfg(feature = "plotting")]
mod plotting {
    use std::path::Path;

    use indexmap::IndexMap;
    use log::{debug, info, warn};
    use plotters::{coord::Shift, prelude::*};
    use thiserror::Error;

    use super::*;
    use crate::{
        table::{table_paths, QcTable},
        zth::Poly,
    };

    /// Point and error-bar colours.
    const POINT_COLOUR: RGBColor = RGBColor(0x00, 0x28, 0x55);
    const ERROR_COLOUR: RGBColor = RGBColor(0x41, 0xB6, 0xE6);

    /// The petal terms plotted per column, and the polynomial each comes
    /// from.
    const PETAL_TERMS: [(&str, Poly); 3] =
        [("xpetal", Poly::X), ("ypetal", Poly::Y), ("rot", Poly::Y)];

    /// The distortion terms plotted per column, with their human-readable
    /// titles.
    const DISTORTION_TERMS: [(&str, &str); 3] = [("offset", "offset"), ("s", "sin"), ("c", "cos")];

    pub(super) fn plot_petal_page(args: PlotPetalsArgs) -> Result<(), PlotError> {
        let petals = petal_page(args.page)?;
        let (exp_params, fids) = load_tables(&args.stem)?;
        let xs = x_values(&exp_params, &args.xparam)?;

        // Row-major cell specifications: rows are petals, columns are terms.
        let mut cells = vec![];
        for petal in &petals {
            for (term, poly) in PETAL_TERMS {
                debug!("Plotting petal {petal}, {term} term vs. {}", args.xparam);
                cells.push(CellSpec {
                    ycol: format!("{poly},{petal},{term}"),
                    yerr_col: format!("{poly},{petal},{term}_sig"),
                    title: term.to_string(),
                    ylabel: format!("{poly}, {petal}, {term}"),
                });
            }
        }

        draw_page(
            &args.output,
            (args.width, args.height),
            &super_title(&args.xparam),
            &args.xparam,
            &xs,
            &fids,
            &cells,
            (petals.len(), PETAL_TERMS.len()),
        )?;
        info!("Wrote {}", args.output.display());
        Ok(())
    }

    pub(super) fn plot_distortion_page(args: PlotDistortionsArgs) -> Result<(), PlotError> {
        let distorts = distortion_page(args.page)?;
        let (exp_params, fids) = load_tables(&args.stem)?;
        let xs = x_values(&exp_params, &args.xparam)?;

        let mut cells = vec![];
        for (poly, order) in &distorts {
            for (term, title) in DISTORTION_TERMS {
                debug!(
                    "Plotting {poly} order {order}, {term} term vs. {}",
                    args.xparam
                );
                cells.push(CellSpec {
                    ycol: format!("{poly},{order},{term}"),
                    yerr_col: format!("{poly},{order},{term}_sig"),
                    title: title.to_string(),
                    ylabel: format!("{poly}, {order}, {term}"),
                });
            }
        }

        draw_page(
            &args.output,
            (args.width, args.height),
            &super_title(&args.xparam),
            &args.xparam,
            &xs,
            &fids,
            &cells,
            (distorts.len(), DISTORTION_TERMS.len()),
        )?;
        info!("Wrote {}", args.output.display());
        Ok(())
    }

    /// The petal ids on a page.
    pub(super) fn petal_page(page: u8) -> Result<Vec<u8>, PlotError> {
        match page {
            1 => Ok((2..7).collect()),
            2 => Ok((7..12).collect()),
            _ => Err(PlotError::UnknownPage(page)),
        }
    }

    /// The distortion modes on a page.
    pub(super) fn distortion_page(page: u8) -> Result<Vec<(Poly, u8)>, PlotError> {
        match page {
            1 => Ok((1..5).map(|order| (Poly::X, order)).collect()),
            2 => Ok(std::iter::once((Poly::X, 5))
                .chain((1..4).map(|order| (Poly::Y, order)))
                .collect()),
            _ => Err(PlotError::UnknownPage(page)),
        }
    }

    pub(super) fn super_title(xparam: &str) -> String {
        if xparam == "q" {
            "parallactic angle".to_string()
        } else {
            xparam.to_string()
        }
    }

    fn load_tables(stem: &Path) -> Result<(QcTable, QcTable), PlotError> {
        let (exp_params_file, fids_file) = table_paths(stem);
        debug!("Reading exposure parameters from {}", exp_params_file.display());
        let exp_params = QcTable::read_tsv(&exp_params_file)?;
        debug!("Reading the merged table from {}", fids_file.display());
        let fids = QcTable::read_tsv(&fids_file)?;
        Ok((exp_params, fids))
    }

    /// The x-axis value of each exposure that has one.
    pub(super) fn x_values(
        exp_params: &QcTable,
        xparam: &str,
    ) -> Result<IndexMap<u32, f64>, PlotError> {
        let column = exp_params.numeric_column(xparam)?;
        Ok(exp_params
            .expids()
            .iter()
            .zip(column)
            .filter_map(|(&expid, x)| x.filter(|x| x.is_finite()).map(|x| (expid, x)))
            .collect())
    }

    /// `(x, y, y_err)` triples for one cell, joined on exposure id. A missing
    /// error column means error bars of zero; a missing value column means an
    /// empty cell.
    pub(super) fn join_series(
        xs: &IndexMap<u32, f64>,
        fids: &QcTable,
        ycol: &str,
        yerr_col: &str,
    ) -> Vec<(f64, f64, f64)> {
        let ys = match fids.numeric_column(ycol) {
            Ok(ys) => ys,
            Err(_) => {
                warn!("The merged table has no \"{ycol}\" column; leaving its cell empty");
                return vec![];
            }
        };
        let yerrs = fids.numeric_column(yerr_col).ok();

        fids.expids()
            .iter()
            .enumerate()
            .filter_map(|(i, expid)| {
                let x = *xs.get(expid)?;
                let y = ys[i].filter(|y| y.is_finite())?;
                let e = yerrs
                    .as_ref()
                    .and_then(|errs| errs[i])
                    .filter(|e| e.is_finite())
                    .unwrap_or(0.0);
                Some((x, y, e))
            })
            .collect()
    }

    struct CellSpec {
        ycol: String,
        yerr_col: String,
        title: String,
        ylabel: String,
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_page(
        output: &Path,
        (width, height): (u32, u32),
        super_title: &str,
        xparam: &str,
        xs: &IndexMap<u32, f64>,
        fids: &QcTable,
        cells: &[CellSpec],
        (num_rows, num_cols): (usize, usize),
    ) -> Result<(), DrawError> {
        let root = BitMapBackend::new(output, (width, height)).into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| DrawError::Plotters(Box::new(e)))?;
        let root = root
            .titled(super_title, ("sans-serif", 24).into_font())
            .map_err(|e| DrawError::Plotters(Box::new(e)))?;

        let areas = root.split_evenly((num_rows, num_cols));
        for (i, (spec, area)) in cells.iter().zip(areas.iter()).enumerate() {
            let plot_row = i / num_cols;
            let series = join_series(xs, fids, &spec.ycol, &spec.yerr_col);
            draw_cell(
                area,
                &series,
                (plot_row == 0).then(|| spec.title.as_str()),
                (plot_row == num_rows - 1).then(|| xparam),
                &spec.ylabel,
            )?;
        }

        root.present()
            .map_err(|e| DrawError::Plotters(Box::new(e)))?;
        Ok(())
    }

    /// Draw one error-bar scatter cell of the grid.
    fn draw_cell<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        series: &[(f64, f64, f64)],
        title: Option<&str>,
        x_label: Option<&str>,
        y_label: &str,
    ) -> Result<(), DrawError> {
        let err = |e: DrawingAreaErrorKind<DB::ErrorType>| DrawError::Cell(e.to_string());

        if series.is_empty() {
            area.fill(&RGBColor(220, 220, 220)).map_err(err)?;
            return Ok(());
        }

        let (x_range, y_range) = series_ranges(series);

        let mut builder = ChartBuilder::on(area);
        builder
            .margin(5)
            .x_label_area_size(if x_label.is_some() { 28 } else { 12 })
            .y_label_area_size(50);
        if let Some(title) = title {
            builder.caption(title, ("sans-serif", 16));
        }
        let mut cc = builder.build_cartesian_2d(x_range, y_range).map_err(err)?;

        let mut mesh = cc.configure_mesh();
        mesh.light_line_style(&WHITE)
            .label_style(("sans-serif", 11))
            .y_desc(y_label);
        if let Some(x_label) = x_label {
            mesh.x_desc(x_label);
        }
        mesh.draw().map_err(err)?;

        cc.draw_series(
            series
                .iter()
                .filter(|(_, _, e)| *e > 0.0)
                .map(|&(x, y, e)| {
                    ErrorBar::new_vertical(x, y - e, y, y + e, ERROR_COLOUR.stroke_width(1), 2)
                }),
        )
        .map_err(err)?;
        cc.draw_series(PointSeries::of_element(
            series.iter().map(|&(x, y, _)| (x, y)),
            1,
            POINT_COLOUR.filled(),
            &|coord, size, style| EmptyElement::at(coord) + Circle::new((0, 0), size, style),
        ))
        .map_err(err)?;

        Ok(())
    }

    /// The axis ranges covering all points and their error bars, slightly
    /// padded so points never sit on the frame.
    pub(super) fn series_ranges(
        series: &[(f64, f64, f64)],
    ) -> (std::ops::Range<f64>, std::ops::Range<f64>) {
        let (x_min, x_max, y_min, y_max) = series.iter().fold(
            (
                f64::INFINITY,
                f64::NEG_INFINITY,
                f64::INFINITY,
                f64::NEG_INFINITY,
            ),
            |(x_min, x_max, y_min, y_max), &(x, y, e)| {
                (
                    x_min.min(x),
                    x_max.max(x),
                    y_min.min(y - e),
                    y_max.max(y + e),
                )
            },
        );

        let pad = |min: f64, max: f64| {
            let span = max - min;
            let pad = if span > 0.0 { 0.05 * span } else { 0.5 };
            (min - pad)..(max + pad)
        };
        (pad(x_min, x_max), pad(y_min, y_max))
    }

    #[derive(Error, Debug)]
    pub enum DrawError {
        #[error("While plotting a cell: {0}")]
        Cell(String),

        #[error("Error from the plotters library: {0}")]
        Plotters(Box<dyn std::error::Error>),
    }
}

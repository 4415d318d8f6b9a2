// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;

use super::plotting::*;
use super::*;
use crate::{
    table::{QcTable, Value},
    zth::Poly,
};

fn test_tables() -> (QcTable, QcTable) {
    let mut exp_params = QcTable::new();
    let mut fids = QcTable::new();
    for (expid, mjd, y, e) in [
        (1, 59199.1, 0.5, 0.1),
        (2, 59199.2, 0.6, 0.2),
        (3, 59199.3, 0.7, 0.3),
    ] {
        exp_params.push_row(
            expid,
            [
                ("expid".to_string(), Value::Int(expid as i64)),
                ("mjd".to_string(), Value::Float(mjd)),
            ],
        );
        fids.push_row(
            expid,
            [
                ("expid".to_string(), Value::Int(expid as i64)),
                ("xzth,2,xpetal".to_string(), Value::Float(y)),
                ("xzth,2,xpetal_sig".to_string(), Value::Float(e)),
            ],
        );
    }
    (exp_params, fids)
}

#[test]
fn pages_are_fixed() {
    assert_eq!(petal_page(1).unwrap(), vec![2, 3, 4, 5, 6]);
    assert_eq!(petal_page(2).unwrap(), vec![7, 8, 9, 10, 11]);
    assert!(matches!(petal_page(3), Err(PlotError::UnknownPage(3))));

    assert_eq!(
        distortion_page(1).unwrap(),
        vec![
            (Poly::X, 1),
            (Poly::X, 2),
            (Poly::X, 3),
            (Poly::X, 4)
        ]
    );
    assert_eq!(
        distortion_page(2).unwrap(),
        vec![
            (Poly::X, 5),
            (Poly::Y, 1),
            (Poly::Y, 2),
            (Poly::Y, 3)
        ]
    );
}

#[test]
fn parallactic_angle_gets_a_human_title() {
    assert_eq!(super_title("q"), "parallactic angle");
    assert_eq!(super_title("mjd"), "mjd");
}

#[test]
fn series_join_on_expid() {
    let (exp_params, fids) = test_tables();
    let xs = x_values(&exp_params, "mjd").unwrap();
    assert_eq!(xs.len(), 3);

    let series = join_series(&xs, &fids, "xzth,2,xpetal", "xzth,2,xpetal_sig");
    assert_eq!(series.len(), 3);
    assert_abs_diff_eq!(series[0].0, 59199.1);
    assert_abs_diff_eq!(series[0].1, 0.5);
    assert_abs_diff_eq!(series[0].2, 0.1);
}

#[test]
fn missing_error_column_means_zero_errors() {
    let (exp_params, fids) = test_tables();
    let xs = x_values(&exp_params, "mjd").unwrap();
    let series = join_series(&xs, &fids, "xzth,2,xpetal", "xzth,2,rot_sig");
    assert!(series.iter().all(|&(_, _, e)| e == 0.0));
}

#[test]
fn missing_value_column_means_no_series() {
    let (exp_params, fids) = test_tables();
    let xs = x_values(&exp_params, "mjd").unwrap();
    assert!(join_series(&xs, &fids, "yzth,2,ypetal", "yzth,2,ypetal_sig").is_empty());
}

#[test]
fn unknown_xparam_is_an_error() {
    let (exp_params, _) = test_tables();
    assert!(matches!(
        x_values(&exp_params, "bogus"),
        Err(PlotError::Table(_))
    ));
}

#[test]
fn ranges_cover_the_error_bars() {
    let (x_range, y_range) = series_ranges(&[(0.0, 1.0, 0.5), (10.0, 2.0, 0.5)]);
    assert!(x_range.start < 0.0 && x_range.end > 10.0);
    assert!(y_range.start < 0.5 && y_range.end > 2.5);

    // A single point still gets a non-degenerate range.
    let (x_range, _) = series_ranges(&[(1.0, 1.0, 0.0)]);
    assert!(x_range.start < x_range.end);
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::io::Cursor;

use approx::assert_abs_diff_eq;
use indoc::indoc;

use super::*;
use crate::{inventory::parse_inventory, zth::Poly};

fn test_inventory() -> Inventory {
    let text = indoc! {"
        20201216 1 150.0 2.0 07:31 -0.24 61.1 241.1 1 dither
        20201216 2 150.0 2.0 07:36 -0.16 61.3 241.3 2 dither
        20201216 3 150.0 2.0 07:41 -0.08 61.5 241.5 3 dither
    "};
    parse_inventory(&mut Cursor::new(text)).unwrap()
}

fn test_header(expid: u32, airmass: f64) -> FvcHeader {
    FvcHeader {
        expid,
        airmass,
        az: 181.5,
        el: 60.0,
        zd: 30.0,
        q: -54.2,
        humidity: 23.0,
        pressure: 794.0,
        focus: [0.1, 0.2, 0.3, -0.1, -0.2, -0.3],
    }
}

fn test_zth(expid: u32, xrms: f64, yrms: f64) -> ZthTerms {
    let mut terms = IndexMap::new();
    terms.insert(TermKey::Short("xrms".to_string()), xrms);
    terms.insert(TermKey::Short("yrms".to_string()), yrms);
    terms.insert(
        TermKey::Long {
            poly: Poly::X,
            order: 2,
            term: "xpetal".to_string(),
        },
        0.125,
    );
    ZthTerms { expid, terms }
}

#[test]
fn push_row_outer_joins_columns() {
    let mut table = QcTable::new();
    table.push_row(1, [("a".to_string(), Value::Int(1))]);
    table.push_row(
        2,
        [
            ("b".to_string(), Value::Int(2)),
            ("a".to_string(), Value::Int(3)),
        ],
    );

    assert_eq!(table.columns().collect::<Vec<_>>(), vec!["a", "b"]);
    assert_eq!(*table.cell(1, "a"), Value::Int(1));
    assert_eq!(*table.cell(1, "b"), Value::Missing);
    assert_eq!(*table.cell(2, "a"), Value::Int(3));
    assert_eq!(*table.cell(99, "a"), Value::Missing);
}

#[test]
fn numeric_column_interprets_cells() {
    let mut table = QcTable::new();
    table.push_row(1, [("x".to_string(), Value::Float(1.5))]);
    table.push_row(2, [("x".to_string(), Value::Text("2.5".to_string()))]);
    table.push_row(3, [("x".to_string(), Value::Text("n/a".to_string()))]);
    table.push_row(4, []);

    let col = table.numeric_column("x").unwrap();
    assert_eq!(col, vec![Some(1.5), Some(2.5), None, None]);
    assert!(matches!(
        table.numeric_column("y"),
        Err(TableError::MissingColumn(_))
    ));
}

#[test]
fn quality_gate_thresholds() {
    let gate = QualityGate::default();
    let good = test_zth(1, 0.05, 0.02).terms;

    assert!(gate.evaluate(100, &good));
    // One fewer fiducial than required.
    assert!(!gate.evaluate(99, &good));
    // RMS just over the limit on one axis.
    assert!(!gate.evaluate(100, &test_zth(1, 0.02, 0.0501).terms));
    // Missing RMS terms fail.
    assert!(!gate.evaluate(100, &IndexMap::new()));
}

#[test]
fn munge_merges_and_gates() {
    let inventory = test_inventory();
    let mut headers = IndexMap::new();
    headers.insert(1, test_header(1, 1.2));
    headers.insert(2, test_header(2, 1.3));
    // Exposure 3 has no readable image.

    let mut zths = IndexMap::new();
    zths.insert(1, test_zth(1, 0.01, 0.01));
    zths.insert(2, test_zth(2, 0.2, 0.01));
    // Exposure 3 has no coefficients either.

    let mut counts = IndexMap::new();
    counts.insert(1, 120);
    counts.insert(2, 120);

    let (exp_params, fids) = munge(
        &inventory,
        &headers,
        &zths,
        &counts,
        QualityGate::default(),
    );

    // Only exposures with coefficient data get exposure-parameter rows.
    assert_eq!(exp_params.expids(), &[1, 2]);
    assert_eq!(*exp_params.cell(1, "successful"), Value::Bool(true));
    assert_eq!(*exp_params.cell(2, "successful"), Value::Bool(false));

    // The merged table keeps every inventory exposure.
    assert_eq!(fids.expids(), &[1, 2, 3]);
    assert_eq!(*fids.cell(1, "num_fiducials"), Value::Int(120));
    assert_eq!(*fids.cell(1, "xzth,2,xpetal"), Value::Float(0.125));
    assert_eq!(*fids.cell(3, "successful"), Value::Missing);
    assert_eq!(*fids.cell(3, "airmass"), Value::Missing);

    // Header columns exist even for headerless exposures.
    assert!(fids.columns().any(|c| c == "focus_ztilt"));
    let airmass = fids.numeric_column("airmass").unwrap();
    assert_eq!(airmass, vec![Some(1.2), Some(1.3), None]);
}

#[test]
fn tsv_round_trip() {
    let inventory = test_inventory();
    let mut headers = IndexMap::new();
    headers.insert(1, test_header(1, 1.2));
    let mut zths = IndexMap::new();
    zths.insert(1, test_zth(1, 0.01, 0.01));
    let mut counts = IndexMap::new();
    counts.insert(1, 120);

    let (exp_params, fids) = munge(
        &inventory,
        &headers,
        &zths,
        &counts,
        QualityGate::default(),
    );

    let dir = tempfile::tempdir().unwrap();
    let (exp_file, fids_file) = table_paths(&dir.path().join("qc"));
    exp_params.write_tsv(&exp_file).unwrap();
    fids.write_tsv(&fids_file).unwrap();

    let exp_back = QcTable::read_tsv(&exp_file).unwrap();
    assert_eq!(exp_back.expids(), exp_params.expids());
    assert_eq!(
        exp_back.columns().collect::<Vec<_>>(),
        exp_params.columns().collect::<Vec<_>>()
    );
    assert_abs_diff_eq!(
        exp_back.numeric_column("airmass").unwrap()[0].unwrap(),
        1.2
    );

    let fids_back = QcTable::read_tsv(&fids_file).unwrap();
    assert_eq!(fids_back.expids(), &[1, 2, 3]);
    // Missing cells survive the round trip as missing.
    assert_eq!(fids_back.numeric_column("xrms").unwrap()[1], None);
    assert_abs_diff_eq!(
        fids_back.numeric_column("xzth,2,xpetal").unwrap()[0].unwrap(),
        0.125
    );
}

#[test]
fn read_tsv_requires_an_expid_column() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("bad.tsv");
    std::fs::write(&file, "a\tb\n1\t2\n").unwrap();
    assert!(matches!(
        QcTable::read_tsv(&file),
        Err(TableError::MissingColumn(_))
    ));
}

#[test]
fn read_tsv_rejects_bad_expids() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("bad.tsv");
    std::fs::write(&file, "expid\tx\nnope\t2\n").unwrap();
    assert!(matches!(
        QcTable::read_tsv(&file),
        Err(TableError::ParseExpid { line_num: 2, .. })
    ));
}

#[test]
fn table_paths_derive_both_files() {
    let (exp, fids) = table_paths(Path::new("out/qc"));
    assert_eq!(exp, PathBuf::from("out/qc_exp_params.tsv"));
    assert_eq!(fids, PathBuf::from("out/qc_fids.tsv"));
}

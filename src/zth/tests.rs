// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::fs;

use approx::assert_abs_diff_eq;
use indoc::indoc;

use super::*;

#[test]
fn parse_short_and_long_terms() {
    let contents = indoc! {"
        xrms,0.032
        2,xpetal,0.125
        2,xpetal,sig,0.01
        3,xpetal,-0.4
    "};
    let mut terms = IndexMap::new();
    parse_par(Poly::X, contents, &mut terms).unwrap();

    assert_eq!(terms.len(), 4);
    assert_abs_diff_eq!(terms[&TermKey::Short("xrms".to_string())], 0.032);
    assert_abs_diff_eq!(
        terms[&TermKey::Long {
            poly: Poly::X,
            order: 2,
            term: "xpetal".to_string()
        }],
        0.125
    );
    // ",sig" binds to the term name rather than becoming a fourth field.
    assert_abs_diff_eq!(
        terms[&TermKey::Long {
            poly: Poly::X,
            order: 2,
            term: "xpetal_sig".to_string()
        }],
        0.01
    );
}

#[test]
fn none_takes_the_polynomial_name() {
    let mut terms = IndexMap::new();
    parse_par(Poly::Y, "None,0.7\n", &mut terms).unwrap();
    assert_abs_diff_eq!(terms[&TermKey::Short("yzth".to_string())], 0.7);
}

#[test]
fn unparseable_order_is_an_error() {
    let mut terms = IndexMap::new();
    let result = parse_par(Poly::X, "two,xpetal,0.125\n", &mut terms);
    assert!(matches!(
        result,
        Err(ZthError::ParseOrder { line_num: 1, .. })
    ));
}

#[test]
fn unparseable_value_is_an_error() {
    let mut terms = IndexMap::new();
    let result = parse_par(Poly::X, "xrms,lots\n", &mut terms);
    assert!(matches!(
        result,
        Err(ZthError::ParseFloat { line_num: 1, .. })
    ));
}

#[test]
fn irrelevant_lines_are_ignored() {
    let contents = indoc! {"

        a b c d e
        xrms,0.032
    "};
    let mut terms = IndexMap::new();
    parse_par(Poly::X, contents, &mut terms).unwrap();
    assert_eq!(terms.len(), 1);
}

#[test]
fn term_keys_flatten_to_column_names() {
    assert_eq!(TermKey::Short("xrms".to_string()).to_string(), "xrms");
    assert_eq!(
        TermKey::Long {
            poly: Poly::X,
            order: 2,
            term: "xpetal".to_string()
        }
        .to_string(),
        "xzth,2,xpetal"
    );
}

#[test]
fn read_zth_combines_both_par_files() {
    let dir = tempfile::tempdir().unwrap();
    let exp_dir = dir.path().join("68592");
    fs::create_dir(&exp_dir).unwrap();
    fs::write(
        exp_dir.join("xzth-68592.0.par"),
        "xrms,0.02\n2,xpetal,0.125\n",
    )
    .unwrap();
    fs::write(
        exp_dir.join("yzth-68592.0.par"),
        "yrms,0.03\n2,ypetal,-0.5\n2,rot,0.001\n",
    )
    .unwrap();

    let zth = read_zth(dir.path(), 68592).unwrap();
    assert_eq!(zth.expid, 68592);
    assert_eq!(zth.terms.len(), 5);
    assert_abs_diff_eq!(zth.terms[&TermKey::Short("yrms".to_string())], 0.03);
    assert_abs_diff_eq!(
        zth.terms[&TermKey::Long {
            poly: Poly::Y,
            order: 2,
            term: "rot".to_string()
        }],
        0.001
    );
}

#[test]
fn read_zths_skips_missing_exposures() {
    let dir = tempfile::tempdir().unwrap();
    let exp_dir = dir.path().join("1");
    fs::create_dir(&exp_dir).unwrap();
    fs::write(exp_dir.join("xzth-1.0.par"), "xrms,0.02\n").unwrap();
    fs::write(exp_dir.join("yzth-1.0.par"), "yrms,0.01\n").unwrap();

    let zths = read_zths(dir.path(), [1, 2]);
    assert_eq!(zths.keys().copied().collect::<Vec<_>>(), vec![1]);
}

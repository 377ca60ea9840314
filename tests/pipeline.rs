mod common;

use approx::assert_relative_eq;
use chrono::NaiveDate;

use common::{
    FixtureBand, NODATA, read_values, utm_wkt, wgs84_wkt, write_fixture, write_fixture_in,
};
use s1burn::S1Error;
use s1burn::acq_date::TemporalGroup;
use s1burn::average::{AverageOptions, run_average};
use s1burn::bands::Polarization;
use s1burn::burn_ratio::{BurnRatioOptions, run_burn_ratio};
use s1burn::config::Config;
use s1burn::readers::GeoTiffReader;

fn config() -> Config {
    Config::default().with_threshold_date(NaiveDate::from_ymd_opt(2023, 7, 18).unwrap())
}

#[test]
fn average_splits_before_and_after() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(
        &dir.path().join("before_20230101.tif"),
        4,
        4,
        (500000.0, 4000000.0),
        &[FixtureBand::described("VV", vec![2.0; 16])],
    );
    write_fixture(
        &dir.path().join("after_20230801.tif"),
        4,
        4,
        (500000.0, 4000000.0),
        &[FixtureBand::described("VV", vec![2.0; 16])],
    );

    let options = AverageOptions {
        folder: dir.path().to_path_buf(),
        recursive: false,
        outdir: None,
    };
    let written = run_average(&options, &config()).unwrap();

    assert_eq!(written.len(), 2);
    for (average, group) in written.iter().zip([TemporalGroup::Before, TemporalGroup::After]) {
        assert_eq!(average.group, group);
        assert_eq!(average.polarization, Polarization::VV);
        assert_eq!(average.contributing_files, 1);
        assert_eq!(average.valid_pixels, 16);
    }

    let averages = dir.path().join("averages");
    assert_eq!(read_values(&averages.join("VV_before.tiff")), vec![2.0; 16]);
    assert_eq!(read_values(&averages.join("VV_after.tiff")), vec![2.0; 16]);
    assert!(!averages.join("VH_before.tiff").exists());
    assert!(!averages.join("VH_after.tiff").exists());

    let reader = GeoTiffReader::open(averages.join("VV_before.tiff")).unwrap();
    assert_eq!(
        reader.grid().geo_transform,
        [500000.0, 1.0, 0.0, 4000000.0, 0.0, -1.0]
    );
}

#[test]
fn average_resamples_onto_first_grid_and_skips_undated() {
    let dir = tempfile::tempdir().unwrap();
    let mut first = vec![2.0; 16];
    first[15] = NODATA as f32;
    write_fixture(
        &dir.path().join("a_20230101_VV.tif"),
        4,
        4,
        (0.0, 4.0),
        &[FixtureBand::plain(first)],
    );
    // shifted one pixel east of the reference grid
    write_fixture(
        &dir.path().join("b_20230102_VV.tif"),
        4,
        4,
        (1.0, 4.0),
        &[FixtureBand::plain(vec![4.0; 16])],
    );
    write_fixture(
        &dir.path().join("no_date_here_VV.tif"),
        4,
        4,
        (0.0, 4.0),
        &[FixtureBand::plain(vec![100.0; 16])],
    );

    let outdir = dir.path().join("out");
    let options = AverageOptions {
        folder: dir.path().to_path_buf(),
        recursive: false,
        outdir: Some(outdir.clone()),
    };
    let written = run_average(&options, &config()).unwrap();
    assert_eq!(written.len(), 1);
    assert_eq!(written[0].contributing_files, 2);

    let values = read_values(&outdir.join("VV_before.tiff"));
    for row in 0..4 {
        // column 0 lies outside the shifted raster
        assert_eq!(values[row * 4], 2.0);
        for col in 1..4 {
            let i = row * 4 + col;
            let expected = if i == 15 { 4.0 } else { 3.0 };
            assert_relative_eq!(values[i], expected, epsilon = 1e-6);
        }
    }
}

#[test]
fn average_recursive_search() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("2023").join("08");
    std::fs::create_dir_all(&nested).unwrap();
    write_fixture(
        &nested.join("S1A_IW_GRDH_20230805T052311_stack.tif"),
        2,
        2,
        (0.0, 2.0),
        &[
            FixtureBand::plain(vec![1.0; 4]),
            FixtureBand::plain(vec![0.5; 4]),
        ],
    );

    let flat = AverageOptions {
        folder: dir.path().to_path_buf(),
        recursive: false,
        outdir: None,
    };
    assert!(run_average(&flat, &config()).unwrap().is_empty());

    let recursive = AverageOptions {
        recursive: true,
        ..flat
    };
    let written = run_average(&recursive, &config()).unwrap();
    let names: Vec<_> = written
        .iter()
        .map(|w| w.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["VV_after.tiff", "VH_after.tiff"]);
    assert_eq!(
        read_values(&dir.path().join("averages").join("VH_after.tiff")),
        vec![0.5; 4]
    );
}

#[test]
fn burn_ratio_of_common_polarizations() {
    let dir = tempfile::tempdir().unwrap();
    let before = dir.path().join("VV_before.tiff");
    let after = dir.path().join("post").join("VV_after.tiff");
    std::fs::create_dir_all(after.parent().unwrap()).unwrap();

    write_fixture(
        &before,
        3,
        3,
        (0.0, 3.0),
        &[
            FixtureBand::described("VV", vec![1.0; 9]),
            FixtureBand::described("VH", vec![2.0; 9]),
        ],
    );
    let mut after_values = vec![3.0; 9];
    after_values[4] = NODATA as f32;
    write_fixture(&after, 3, 3, (0.0, 3.0), &[FixtureBand::plain(after_values)]);

    let options = BurnRatioOptions {
        before,
        after: after.clone(),
        inputs_in_db: false,
        outdir: None,
    };
    let written = run_burn_ratio(&options, &config()).unwrap();
    assert_eq!(written.len(), 1);
    assert_eq!(written[0].polarization, Polarization::VV);

    let summary = written[0].summary.unwrap();
    assert_eq!(summary.count, 8);
    assert_relative_eq!(summary.median, 0.5, epsilon = 1e-6);

    let rbr = dir.path().join("post").join("RBR_VV.tiff");
    let values = read_values(&rbr);
    assert_eq!(values[4], NODATA as f32);
    for (_, v) in values.iter().enumerate().filter(|(i, _)| *i != 4) {
        assert_relative_eq!(*v, 0.5, epsilon = 1e-6);
    }
    assert!(!dir.path().join("post").join("RBR_VH.tiff").exists());
}

#[test]
fn burn_ratio_from_db_inputs() {
    let dir = tempfile::tempdir().unwrap();
    let before = dir.path().join("before_VH.tif");
    let after = dir.path().join("after_VH.tif");
    write_fixture(&before, 2, 2, (0.0, 2.0), &[FixtureBand::plain(vec![0.0; 4])]);
    let three_db = 10.0 * 3f32.log10();
    write_fixture(&after, 2, 2, (0.0, 2.0), &[FixtureBand::plain(vec![three_db; 4])]);

    let outdir = dir.path().join("rbr");
    let options = BurnRatioOptions {
        before,
        after,
        inputs_in_db: true,
        outdir: Some(outdir.clone()),
    };
    let written = run_burn_ratio(&options, &config()).unwrap();
    assert_eq!(written[0].polarization, Polarization::VH);
    for v in read_values(&outdir.join("RBR_VH.tiff")) {
        assert_relative_eq!(v, 0.5, epsilon = 1e-5);
    }
}

#[test]
fn burn_ratio_without_common_polarization_fails() {
    let dir = tempfile::tempdir().unwrap();
    let before = dir.path().join("before.tif");
    let after = dir.path().join("after.tif");
    write_fixture(&before, 2, 2, (0.0, 2.0), &[FixtureBand::described("VV", vec![1.0; 4])]);
    write_fixture(&after, 2, 2, (0.0, 2.0), &[FixtureBand::described("VH", vec![1.0; 4])]);

    let options = BurnRatioOptions {
        before,
        after,
        inputs_in_db: false,
        outdir: None,
    };
    assert!(matches!(
        run_burn_ratio(&options, &config()),
        Err(S1Error::NoCommonPolarization)
    ));
}

// BEFORE is a 4x4 UTM 33N tile of 100 m pixels near 15E 36.1N.
fn write_utm_before(path: &std::path::Path) {
    write_fixture_in(
        path,
        4,
        4,
        [500000.0, 100.0, 0.0, 4000000.0, 0.0, -100.0],
        &utm_wkt(),
        &[FixtureBand::described("VV", vec![1.0; 16])],
    );
}

#[test]
fn burn_ratio_reprojects_geographic_after() {
    let dir = tempfile::tempdir().unwrap();
    let before = dir.path().join("before.tif");
    let after = dir.path().join("after.tif");
    write_utm_before(&before);
    // 0.4 degree square in lon/lat around the BEFORE footprint.
    write_fixture_in(
        &after,
        40,
        40,
        [14.9, 0.01, 0.0, 36.3, 0.0, -0.01],
        &wgs84_wkt(),
        &[FixtureBand::described("VV", vec![3.0; 1600])],
    );

    let options = BurnRatioOptions {
        before,
        after,
        inputs_in_db: false,
        outdir: None,
    };
    let written = run_burn_ratio(&options, &config()).unwrap();
    assert_eq!(written.len(), 1);
    assert_eq!(written[0].summary.unwrap().count, 16);

    let rbr = dir.path().join("RBR_VV.tiff");
    let values = read_values(&rbr);
    assert_eq!(values.len(), 16);
    for v in values {
        assert_relative_eq!(v, 0.5, epsilon = 1e-5);
    }
    let reader = GeoTiffReader::open(&rbr).unwrap();
    assert_eq!(reader.grid().shape(), (4, 4));
    assert_eq!(reader.grid().geo_transform[1], 100.0);
}

#[test]
fn burn_ratio_with_disjoint_footprints_is_all_nodata() {
    let dir = tempfile::tempdir().unwrap();
    let before = dir.path().join("before.tif");
    let after = dir.path().join("after.tif");
    write_utm_before(&before);
    write_fixture_in(
        &after,
        40,
        40,
        [20.0, 0.01, 0.0, 36.3, 0.0, -0.01],
        &wgs84_wkt(),
        &[FixtureBand::described("VV", vec![3.0; 1600])],
    );

    let options = BurnRatioOptions {
        before,
        after,
        inputs_in_db: false,
        outdir: None,
    };
    let written = run_burn_ratio(&options, &config()).unwrap();
    assert!(written[0].summary.is_none());
    assert_eq!(read_values(&dir.path().join("RBR_VV.tiff")), vec![NODATA as f32; 16]);
}

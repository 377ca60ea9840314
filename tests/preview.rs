mod common;

use common::{FixtureBand, NODATA, write_fixture};
use s1burn::preview::{Colormap, PreviewOptions, SingleOptions, run_batch, run_single};

#[test]
fn batch_writes_one_png_per_polarization() {
    let dir = tempfile::tempdir().unwrap();
    let linear: Vec<f32> = (1..=16).map(|v| v as f32 * 0.01).collect();
    write_fixture(
        &dir.path().join("S1A_20230712T013245_stack.tif"),
        4,
        4,
        (0.0, 4.0),
        &[
            FixtureBand::described("VV", linear.clone()),
            FixtureBand::described("VH", linear),
        ],
    );

    let mut options = PreviewOptions::new(dir.path());
    options.dpi = 40;
    options.colormap = "magma".parse::<Colormap>().unwrap();
    let written = run_batch(&options).unwrap();

    let stem_dir = dir.path().join("png").join("S1A_20230712T013245_stack");
    assert_eq!(
        written,
        vec![
            stem_dir.join("S1A_20230712T013245_stack_VV_dB.png"),
            stem_dir.join("S1A_20230712T013245_stack_VH_dB.png"),
        ]
    );
    let img = image::open(&written[0]).unwrap();
    assert_eq!((img.width(), img.height()), (320, 240));
}

#[test]
fn batch_skips_bands_without_valid_data() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(
        &dir.path().join("empty_VV.tif"),
        3,
        3,
        (0.0, 3.0),
        &[FixtureBand::plain(vec![NODATA as f32; 9])],
    );
    // zero and negative linear power have no dB value
    write_fixture(
        &dir.path().join("dark_VH.tif"),
        3,
        3,
        (0.0, 3.0),
        &[FixtureBand::plain(vec![0.0; 9])],
    );

    let mut options = PreviewOptions::new(dir.path());
    options.dpi = 30;
    assert!(run_batch(&options).unwrap().is_empty());
}

#[test]
fn batch_fixed_range_needs_no_valid_data() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(
        &dir.path().join("scene_VV.tif"),
        3,
        3,
        (0.0, 3.0),
        &[FixtureBand::plain(vec![-12.0; 9])],
    );

    let mut options = PreviewOptions::new(dir.path());
    options.dpi = 30;
    options.already_db = true;
    options.fixed_range = Some((-25.0, 0.0));
    options.outdir = Some(dir.path().join("previews"));
    let written = run_batch(&options).unwrap();
    assert_eq!(
        written,
        vec![dir.path().join("previews").join("scene_VV").join("scene_VV_VV_dB.png")]
    );
}

#[test]
fn single_defaults_next_to_input() {
    let dir = tempfile::tempdir().unwrap();
    let tif = dir.path().join("RBR_VV.tiff");
    let values: Vec<f32> = (0..25).map(|v| v as f32 / 25.0 - 0.5).collect();
    write_fixture(&tif, 5, 5, (0.0, 5.0), &[FixtureBand::plain(values)]);

    let mut options = SingleOptions::new(&tif);
    options.dpi = 30;
    options.colormap = "viridis_r".parse().unwrap();
    let out = run_single(&options).unwrap();

    assert_eq!(out, Some(dir.path().join("RBR_VV.png")));
    let img = image::open(dir.path().join("RBR_VV.png")).unwrap();
    assert_eq!((img.width(), img.height()), (240, 180));
}

#[test]
fn single_without_valid_data_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let tif = dir.path().join("blank.tif");
    write_fixture(&tif, 2, 2, (0.0, 2.0), &[FixtureBand::plain(vec![NODATA as f32; 4])]);

    let mut options = SingleOptions::new(&tif);
    options.db = true;
    assert_eq!(run_single(&options).unwrap(), None);
    assert!(!dir.path().join("blank.png").exists());
}

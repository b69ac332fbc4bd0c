//! Profile store → height map → compensation, the way the CLI strings them together

use levelkit::heightmap::ProfileStore;
use levelkit::{CompensationOptions, Compensator, LevelingConfig, MachineLimits, MachineProfile, Point3};
use tempfile::TempDir;

const SLOPED: &str = r#"[
    {"x":0,"y":0,"z":0},{"x":10,"y":0,"z":"0.1"},
    {"x":0,"y":10,"z":0},{"x":10,"y":10,"z":0.1}
]"#;

#[test]
fn test_stored_profile_drives_compensation() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("machines.json");

    let mut store = ProfileStore::open(&path).unwrap();
    let profile = MachineProfile::new("Router", MachineLimits::xy(0.0, 20.0, 0.0, 10.0));
    let id = profile.id.clone();
    store.upsert(profile).unwrap();
    store.update_height_info(&id, SLOPED).unwrap();

    let reopened = ProfileStore::open(&path).unwrap();
    let determined = reopened
        .get(&id)
        .unwrap()
        .determined_height_info()
        .unwrap()
        .expect("samples were stored");
    assert!(determined.calculated_height_info.is_some());

    let compensator =
        Compensator::from_height_info(determined.effective(), Point3::default()).unwrap();
    let out = compensator
        .apply("G0 X20 Y5 Z-1", &CompensationOptions::default())
        .unwrap();
    assert_eq!(out.gcode, "G0 X20.000 Y5.000 Z-0.800 (Z-1.000)");
}

#[test]
fn test_config_options_reach_the_compensator() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[compensation]\narc_mode = \"interpolate\"\narc_segments = 8\n").unwrap();

    let config = LevelingConfig::load_from_file(&path).unwrap();
    let options = config.compensation.options();

    let determined = levelkit::DeterminedHeightInfo::determine(SLOPED, None).unwrap();
    let compensator =
        Compensator::from_height_info(determined.effective(), Point3::default()).unwrap();
    let out = compensator
        .apply("G0 X10 Y0 Z0\nG2 X0 Y0 I-5 J0", &options)
        .unwrap();

    // Start point plus at least eight chords of the half circle
    assert!(out.report.segments >= 1 + 8);
}

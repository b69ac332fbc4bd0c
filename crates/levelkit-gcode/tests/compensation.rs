use levelkit_core::Point3;
use levelkit_gcode::{
    ArcMode, CompensationOptions, Compensator, SampleProgram, ORIGINAL_TAG, RELATIVE_TAG,
};
use levelkit_heightmap::{DeterminedHeightInfo, MachineLimits};
use proptest::prelude::*;

const FLAT: &str = r#"[
    {"x":0,"y":0,"z":0},{"x":10,"y":0,"z":0},{"x":20,"y":0,"z":0},
    {"x":0,"y":10,"z":0},{"x":10,"y":10,"z":0},{"x":20,"y":10,"z":0}
]"#;

const TILTED: &str = r#"[
    {"x":0,"y":0,"z":0},{"x":50,"y":0,"z":0.5},
    {"x":0,"y":50,"z":0},{"x":50,"y":50,"z":0.5}
]"#;

fn compensator(samples: &str) -> Compensator {
    let determined = DeterminedHeightInfo::determine(samples, None).unwrap();
    Compensator::from_height_info(determined.effective(), Point3::default()).unwrap()
}

#[test]
fn test_flat_grid_compensated_line_keeps_zero() {
    let out = compensator(FLAT)
        .apply("G90\nG21\nG1 X10 Y0 Z0 F100", &CompensationOptions::default())
        .unwrap();
    let lines: Vec<&str> = out.gcode.lines().collect();

    let last = lines.last().unwrap();
    assert!(last.contains("X10.000 Y0.000 Z0.000"));
    assert!(last.ends_with("(Z0.000)"));
    assert!(!last.contains(ORIGINAL_TAG));
    assert_eq!(out.report.compensated_lines, 1);
}

#[test]
fn test_relative_program_passes_through() {
    let out = compensator(FLAT)
        .apply("G91\nG1 X10 Y0 Z0", &CompensationOptions::default())
        .unwrap();
    let lines: Vec<&str> = out.gcode.lines().collect();
    assert_eq!(lines[1], format!("G1 X10 Y0 Z0 {}", RELATIVE_TAG));
}

#[test]
fn test_relative_section_then_back_to_absolute() {
    let out = compensator(FLAT)
        .apply(
            "G91\nG0 Z5\nG90\nG0 X0 Y0 Z1",
            &CompensationOptions::default(),
        )
        .unwrap();
    let lines: Vec<&str> = out.gcode.lines().collect();
    assert_eq!(lines[1], "G0 Z5 (RELATIVE)");
    assert_eq!(lines[2], "G90 (ORIGINAL)");
    assert_eq!(lines[3], "G0 X0.000 Y0.000 Z1.000 (Z1.000)");
}

#[test]
fn test_tilted_surface_lifts_far_end() {
    let out = compensator(TILTED)
        .apply("G0 X50 Y25 Z-1", &CompensationOptions::default())
        .unwrap();
    assert_eq!(out.gcode, "G0 X50.000 Y25.000 Z-0.500 (Z-1.000)");
}

#[test]
fn test_inch_program_uses_inch_spacing() {
    // Half of 50 mm is ~0.984 in: a 2 in move yields 0, 0.984, 1.969 and 2.
    let out = compensator(TILTED)
        .apply("G20\nG0 X0 Y0 Z0\nG1 X2 Y0", &CompensationOptions::default())
        .unwrap();
    assert_eq!(out.report.segments, 1 + 4);
    assert!(out.gcode.lines().nth(3).unwrap().starts_with("G1 X0.984 Y0.000"));
}

#[test]
fn test_comments_are_dropped() {
    let out = compensator(FLAT)
        .apply("G0 X1 Y1 Z1 (rapid) ; to start", &CompensationOptions::default())
        .unwrap();
    assert_eq!(out.gcode, "G0 X1.000 Y1.000 Z1.000 (Z1.000)");
}

#[test]
fn test_decorative_sample_runs_in_both_arc_modes() {
    let compensator = compensator(FLAT);
    let legacy = compensator
        .apply(
            "",
            &CompensationOptions {
                sample_program: Some(SampleProgram::Decorative),
                ..Default::default()
            },
        )
        .unwrap();
    let interpolated = compensator
        .apply(
            "",
            &CompensationOptions {
                sample_program: Some(SampleProgram::Decorative),
                arc_mode: ArcMode::Interpolate,
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(
        legacy.report.compensated_lines,
        interpolated.report.compensated_lines
    );
    assert!(interpolated.report.segments > legacy.report.segments);
    assert_eq!(
        legacy.report.total_lines(),
        SampleProgram::Decorative.gcode().split('\n').count()
    );
}

#[test]
fn test_extrapolated_grid_covers_program_area() {
    let limits = MachineLimits::xy(-50.0, 100.0, 0.0, 50.0);
    let determined = DeterminedHeightInfo::determine(TILTED, Some(&limits)).unwrap();
    let compensator =
        Compensator::from_height_info(determined.effective(), Point3::default()).unwrap();
    let out = compensator
        .apply("G0 X100 Y0 Z0", &CompensationOptions::default())
        .unwrap();
    assert_eq!(out.gcode, "G0 X100.000 Y0.000 Z1.000 (Z0.000)");
}

#[test]
fn test_raised_reference_cell_compensates_to_zero() {
    let raised = r#"[
        {"x":0,"y":0,"z":0.5},{"x":10,"y":0,"z":0.5},
        {"x":0,"y":10,"z":0.5},{"x":10,"y":10,"z":0.5}
    ]"#;
    let out = compensator(raised)
        .apply("G90\nG0 X0 Y0 Z0", &CompensationOptions::default())
        .unwrap();
    assert_eq!(out.gcode.lines().nth(1), Some("G0 X0.000 Y0.000 Z0.000 (Z0.000)"));
}

#[test]
fn test_message_text_does_not_break_parsing() {
    let out = compensator(FLAT)
        .apply(
            "G90\nM117 Leveling done.\nG0 X5 Y5 Z1",
            &CompensationOptions::default(),
        )
        .unwrap();
    let lines: Vec<&str> = out.gcode.lines().collect();
    assert_eq!(lines[1], format!("M117 Leveling done. {}", ORIGINAL_TAG));
    assert_eq!(lines[2], "G0 X5.000 Y5.000 Z1.000 (Z1.000)");
}

#[test]
fn test_report_serializes() {
    let out = compensator(FLAT)
        .apply("G0 X1 Y1 Z1", &CompensationOptions::default())
        .unwrap();
    let json = serde_json::to_value(out.report).unwrap();
    assert_eq!(json["compensatedLines"], 1);
    assert_eq!(json["degeneratePlanes"], 0);
}

proptest! {
    #[test]
    fn prop_rapid_moves_map_one_to_one(
        moves in prop::collection::vec((0.0f64..20.0, 0.0f64..10.0, -2.0f64..2.0), 1..40)
    ) {
        let program: Vec<String> = moves
            .iter()
            .map(|(x, y, z)| format!("G0 X{:.3} Y{:.3} Z{:.3}", x, y, z))
            .collect();
        let out = compensator(FLAT)
            .apply(&program.join("\n"), &CompensationOptions::default())
            .unwrap();
        prop_assert_eq!(out.gcode.lines().count(), moves.len());
        prop_assert_eq!(out.report.compensated_lines, moves.len());
    }
}

//! Built-in sample programs for trying compensation without a loaded file

use serde::{Deserialize, Serialize};
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleProgram {
    /// Plunges on a 50 mm grid, handy for checking a fresh height map
    ProbeGrid,
    /// A short 2.5D profiling job with arcs
    Decorative,
}

const DECORATIVE: &str = include_str!("../assets/decorative.nc");

impl SampleProgram {
    pub fn gcode(&self) -> String {
        match self {
            Self::ProbeGrid => probe_grid_program(),
            Self::Decorative => DECORATIVE.to_string(),
        }
    }
}

fn probe_grid_program() -> String {
    let mut out = String::from(
        "G0 X0 Y0 Z3 F100\nG0 X0 Y0 Z0 F50\nG0 X4 Y4 Z3 F100\nG0 X4 Y4 Z0 F50\n",
    );
    for y in (100..=300).step_by(50) {
        for x in (0..=200).step_by(50) {
            let _ = writeln!(out, "G0 X{x} Y{y} Z3 F100");
            let _ = writeln!(out, "G1 X{x} Y{y} Z-1 F10");
            let _ = writeln!(out, "G1 X{x} Y{y} Z3 F10");
        }
    }
    out.truncate(out.trim_end().len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_grid_layout() {
        let program = SampleProgram::ProbeGrid.gcode();
        let lines: Vec<&str> = program.lines().collect();
        assert_eq!(lines.len(), 4 + 5 * 5 * 3);
        assert_eq!(lines[4], "G0 X0 Y100 Z3 F100");
        assert_eq!(lines[5], "G1 X0 Y100 Z-1 F10");
        assert_eq!(lines.last(), Some(&"G1 X200 Y300 Z3 F10"));
    }

    #[test]
    fn test_decorative_program() {
        let program = SampleProgram::Decorative.gcode();
        assert!(program.starts_with('%'));
        assert!(program.contains("G3 X37.032 Y187.722 I75.334 J12.072 F87.6"));
        assert!(program.trim_end().ends_with("M30"));
    }
}

//! Modal state tracked across a compensation pass

use crate::line::ParsedLine;
use levelkit_core::Units;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DistanceMode {
    /// G90
    #[default]
    Absolute,
    /// G91
    Relative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MotionMode {
    /// G0
    #[default]
    Rapid,
    /// G1
    Linear,
    /// G2
    ArcClockwise,
    /// G3
    ArcCounterClockwise,
}

impl MotionMode {
    pub fn is_arc(&self) -> bool {
        matches!(self, Self::ArcClockwise | Self::ArcCounterClockwise)
    }
}

/// Distance mode, units and motion mode
///
/// A fresh state (absolute, millimeters, rapid) is created for every pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModalState {
    pub distance_mode: DistanceMode,
    pub units: Units,
    pub motion_mode: MotionMode,
}

impl ModalState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply every modal G word on the line, left to right
    pub fn apply(&mut self, line: &ParsedLine) {
        for code in line.g_codes() {
            // Only whole numbers are modal here; G38.2 and friends are not G3.
            if code.fract() != 0.0 {
                continue;
            }
            match code as u32 {
                0 => self.motion_mode = MotionMode::Rapid,
                1 => self.motion_mode = MotionMode::Linear,
                2 => self.motion_mode = MotionMode::ArcClockwise,
                3 => self.motion_mode = MotionMode::ArcCounterClockwise,
                20 => self.units = Units::Inches,
                21 => self.units = Units::Millimeters,
                90 => self.distance_mode = DistanceMode::Absolute,
                91 => self.distance_mode = DistanceMode::Relative,
                _ => {}
            }
        }
    }

    pub fn is_absolute(&self) -> bool {
        self.distance_mode == DistanceMode::Absolute
    }
}

/// Lines left alone by compensation: dwell, cutter/tool-length offsets,
/// splines, work coordinate selection, G10 offset setting, probing and G92
pub fn is_pass_through(line: &ParsedLine) -> bool {
    line.g_codes().any(|code| {
        matches!(
            code.trunc() as u32,
            4 | 5 | 10 | 38 | 92 | 40..=59
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> ParsedLine {
        ParsedLine::parse(text, 1).unwrap()
    }

    #[test]
    fn test_defaults() {
        let state = ModalState::new();
        assert!(state.is_absolute());
        assert_eq!(state.units, Units::Millimeters);
        assert_eq!(state.motion_mode, MotionMode::Rapid);
    }

    #[test]
    fn test_multiple_words_on_one_line() {
        let mut state = ModalState::new();
        state.apply(&parse("G20 G91 G2"));
        assert_eq!(state.units, Units::Inches);
        assert_eq!(state.distance_mode, DistanceMode::Relative);
        assert_eq!(state.motion_mode, MotionMode::ArcClockwise);

        state.apply(&parse("G21G90G01"));
        assert_eq!(state.units, Units::Millimeters);
        assert!(state.is_absolute());
        assert_eq!(state.motion_mode, MotionMode::Linear);
    }

    #[test]
    fn test_probe_word_is_not_an_arc() {
        let mut state = ModalState::new();
        state.apply(&parse("G38.2 Z-5 F100"));
        assert_eq!(state.motion_mode, MotionMode::Rapid);
    }

    #[test]
    fn test_pass_through_families() {
        for text in ["G4 P1", "G10 L20 X0", "G38.2 Z-1", "G92 X0", "G92.1", "G54", "G43 H1", "G5.1 X1"] {
            assert!(is_pass_through(&parse(text)), "{text}");
        }
        for text in ["G0 X1", "G1 Z2", "G3 X1 Y1 I1 J0", "G17", "M3 S1000"] {
            assert!(!is_pass_through(&parse(text)), "{text}");
        }
    }
}

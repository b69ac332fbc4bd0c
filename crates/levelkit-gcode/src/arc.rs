//! Arc handling for G2/G3 moves
//!
//! Legacy mode only emits the arc endpoint. Interpolate mode walks the arc
//! from the I/J center in short chords so each chord gets its own Z.

use levelkit_core::{GcodeError, Point3};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::line::ParsedLine;

/// How G2/G3 moves are turned into segment points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArcMode {
    /// Endpoint only
    #[default]
    Legacy,
    /// Chords along the true arc
    Interpolate,
}

/// Arc expansion configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcExpanderConfig {
    /// Maximum chord length; zero falls back to the caller's limit
    pub segment_length: f64,
    /// Minimum number of chords per arc
    pub num_segments: usize,
}

impl Default for ArcExpanderConfig {
    fn default() -> Self {
        Self {
            segment_length: 0.0,
            num_segments: 4,
        }
    }
}

/// Converts arcs to chord endpoints
#[derive(Debug, Clone, Default)]
pub struct ArcExpander {
    config: ArcExpanderConfig,
}

impl ArcExpander {
    pub fn new(config: ArcExpanderConfig) -> Self {
        Self { config }
    }

    /// Chord endpoints from `start` (exclusive) to `end` (inclusive)
    ///
    /// Z is interpolated linearly along the sweep, so helical moves keep
    /// their pitch. Equal start and end points describe a full circle.
    pub fn expand_arc(
        &self,
        start: Point3,
        end: Point3,
        center: (f64, f64),
        is_clockwise: bool,
        fallback_length: f64,
    ) -> Vec<Point3> {
        let (cx, cy) = center;
        let radius_x = start.x - cx;
        let radius_y = start.y - cy;
        let radius = (radius_x * radius_x + radius_y * radius_y).sqrt();
        if radius < 1e-10 {
            return vec![end];
        }

        let start_angle = radius_y.atan2(radius_x);
        let end_angle = (end.y - cy).atan2(end.x - cx);

        let mut sweep = end_angle - start_angle;
        if is_clockwise && sweep >= 0.0 {
            sweep -= 2.0 * PI;
        } else if !is_clockwise && sweep <= 0.0 {
            sweep += 2.0 * PI;
        }

        let segment_count = self.segment_count(radius * sweep.abs(), fallback_length);

        let mut points = Vec::with_capacity(segment_count);
        for i in 1..segment_count {
            let fraction = i as f64 / segment_count as f64;
            let angle = start_angle + sweep * fraction;
            points.push(Point3::new(
                cx + radius * angle.cos(),
                cy + radius * angle.sin(),
                start.z + (end.z - start.z) * fraction,
            ));
        }
        points.push(end);
        points
    }

    fn segment_count(&self, arc_length: f64, fallback_length: f64) -> usize {
        let limit = if self.config.segment_length > 0.0 {
            self.config.segment_length
        } else {
            fallback_length
        };
        let by_length = if limit > 0.0 && limit.is_finite() {
            (arc_length / limit).ceil() as usize
        } else {
            0
        };
        by_length.max(self.config.num_segments).max(1)
    }
}

/// Center as the legacy path builds it: I present takes the X value,
/// J present takes the Y value, anything absent stays at zero
///
/// A line with I but no X (or J but no Y) fails.
pub fn legacy_center(line: &ParsedLine, line_number: usize) -> Result<(f64, f64), GcodeError> {
    let mut center = (0.0, 0.0);
    if line.has('I') {
        center.0 = line.value('X').ok_or(GcodeError::MissingArcAxis {
            line_number,
            axis: 'X',
        })?;
    }
    if line.has('J') {
        center.1 = line.value('Y').ok_or(GcodeError::MissingArcAxis {
            line_number,
            axis: 'Y',
        })?;
    }
    Ok(center)
}

/// Center from I/J offsets relative to the arc start
pub fn offset_center(line: &ParsedLine, start: Point3) -> (f64, f64) {
    (
        start.x + line.value('I').unwrap_or(0.0),
        start.y + line.value('J').unwrap_or(0.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_quarter_circle_ccw() {
        let expander = ArcExpander::new(ArcExpanderConfig {
            segment_length: 0.0,
            num_segments: 2,
        });
        let points = expander.expand_arc(
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(0.0, 10.0, -1.0),
            (0.0, 0.0),
            false,
            0.0,
        );
        assert_eq!(points.len(), 2);
        let mid = 10.0 * (PI / 4.0).cos();
        assert!(approx(points[0].x, mid));
        assert!(approx(points[0].y, mid));
        assert!(approx(points[0].z, -0.5));
        assert_eq!(points[1], Point3::new(0.0, 10.0, -1.0));
    }

    #[test]
    fn test_clockwise_goes_the_long_way_when_needed() {
        let expander = ArcExpander::new(ArcExpanderConfig {
            segment_length: 0.0,
            num_segments: 3,
        });
        let points = expander.expand_arc(
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(0.0, 10.0, 0.0),
            (0.0, 0.0),
            true,
            0.0,
        );
        // Three quarters of a turn clockwise: (0,-10), (-10,0), then the end.
        assert_eq!(points.len(), 3);
        assert!(approx(points[0].x, 0.0) && approx(points[0].y, -10.0));
        assert!(approx(points[1].x, -10.0) && approx(points[1].y, 0.0));
    }

    #[test]
    fn test_chord_count_follows_length() {
        let expander = ArcExpander::default();
        let points = expander.expand_arc(
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(-10.0, 0.0, 0.0),
            (0.0, 0.0),
            false,
            1.0,
        );
        // Half circle of radius 10 is ~31.4 long.
        assert_eq!(points.len(), 32);
    }

    #[test]
    fn test_legacy_center_reads_xy() {
        let line = ParsedLine::parse("G3 X37.032 Y187.722 I75.334 J12.072", 1).unwrap();
        assert_eq!(legacy_center(&line, 1).unwrap(), (37.032, 187.722));

        let missing = ParsedLine::parse("G2 Y5 I3 J1", 4).unwrap();
        assert!(matches!(
            legacy_center(&missing, 4),
            Err(GcodeError::MissingArcAxis { line_number: 4, axis: 'X' })
        ));
    }

    #[test]
    fn test_offset_center() {
        let line = ParsedLine::parse("G2 X10 Y0 I5 J-2", 1).unwrap();
        assert_eq!(offset_center(&line, Point3::new(1.0, 1.0, 0.0)), (6.0, -1.0));
    }
}

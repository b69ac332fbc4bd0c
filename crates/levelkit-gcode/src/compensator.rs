//! Z compensation of a G-code program against a height grid
//!
//! A single forward pass over the program. Every absolute motion line with a
//! coordinate word is rewritten into one or more lines whose Z follows the
//! plane through the three nearest height samples. Any failure aborts the
//! whole pass; no partial program is returned.

use std::borrow::Cow;
use std::sync::atomic::{AtomicBool, Ordering};

use levelkit_core::{
    cross_product, distance_squared_2d, is_colinear, GcodeError, Point3, Units,
};
use levelkit_heightmap::{HeightGrid, HeightInfo};
use serde::{Deserialize, Serialize};

use crate::arc::{legacy_center, offset_center, ArcExpander, ArcExpanderConfig, ArcMode};
use crate::line::{strip_comments, ParsedLine};
use crate::modal::{is_pass_through, ModalState, MotionMode};
use crate::samples::SampleProgram;
use crate::segments::split_linear;

pub const ORIGINAL_TAG: &str = "(ORIGINAL)";
pub const RELATIVE_TAG: &str = "(RELATIVE)";

/// Options for one compensation pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompensationOptions {
    pub arc_mode: ArcMode,
    pub arc: ArcExpanderConfig,
    /// Program to use when the supplied text is empty
    pub sample_program: Option<SampleProgram>,
}

/// How a source line ended up in the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineKind {
    Compensated,
    Original,
    Relative,
    Untouched,
}

/// Per-kind line counts for a finished pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompensationReport {
    pub compensated_lines: usize,
    pub original_lines: usize,
    pub relative_lines: usize,
    pub untouched_lines: usize,
    /// Output lines emitted for compensated source lines
    pub segments: usize,
    /// Points whose plane had no Z component and kept their Z
    pub degenerate_planes: usize,
}

impl CompensationReport {
    fn record(&mut self, kind: LineKind) {
        match kind {
            LineKind::Compensated => self.compensated_lines += 1,
            LineKind::Original => self.original_lines += 1,
            LineKind::Relative => self.relative_lines += 1,
            LineKind::Untouched => self.untouched_lines += 1,
        }
    }

    pub fn total_lines(&self) -> usize {
        self.compensated_lines + self.original_lines + self.relative_lines + self.untouched_lines
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompensatedProgram {
    pub gcode: String,
    pub report: CompensationReport,
}

/// Result of compensating a single point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompensatedPoint {
    /// The point in the caller's units with Z adjusted
    pub point: Point3,
    /// True when no usable plane was found and Z was left as is
    pub degenerate: bool,
}

/// Rewrites programs against a fixed set of height samples
#[derive(Debug, Clone)]
pub struct Compensator {
    /// Samples in millimeters, shifted into program coordinates
    points: Vec<Point3>,
    /// Grid spacing along X in millimeters
    delta: f64,
}

impl Compensator {
    /// Use `grid` with spacing `delta_x`, shifting samples by the work offset
    ///
    /// Probe samples are taken relative to the probe origin; adding the work
    /// position X/Y moves them into the program's coordinate frame.
    pub fn new(grid: &HeightGrid, delta_x: f64, work_offset: Point3) -> Result<Self, GcodeError> {
        let points: Vec<Point3> = grid
            .translated(work_offset.x, work_offset.y)
            .points()
            .map(|p| p.position())
            .collect();
        if points.len() < 3 {
            return Err(GcodeError::NoHeightData);
        }
        Ok(Self {
            points,
            delta: delta_x,
        })
    }

    /// Use the grid relative to the reference cell, which compensates to zero
    pub fn from_height_info(info: &HeightInfo, work_offset: Point3) -> Result<Self, GcodeError> {
        Self::new(&info.relative_coordinates, info.stats.delta_x, work_offset)
    }

    /// Compensate `program`
    pub fn apply(
        &self,
        program: &str,
        options: &CompensationOptions,
    ) -> Result<CompensatedProgram, GcodeError> {
        self.run(program, options, None)
    }

    /// Like [`apply`](Self::apply), checking `cancel` before every line
    pub fn apply_cancellable(
        &self,
        program: &str,
        options: &CompensationOptions,
        cancel: &AtomicBool,
    ) -> Result<CompensatedProgram, GcodeError> {
        self.run(program, options, Some(cancel))
    }

    fn run(
        &self,
        program: &str,
        options: &CompensationOptions,
        cancel: Option<&AtomicBool>,
    ) -> Result<CompensatedProgram, GcodeError> {
        let source: Cow<'_, str> = if program.trim().is_empty() {
            match options.sample_program {
                Some(sample) => {
                    tracing::info!("Program is empty, using {:?} sample program", sample);
                    Cow::Owned(sample.gcode())
                }
                None => return Err(GcodeError::EmptyProgram),
            }
        } else {
            Cow::Borrowed(program)
        };

        tracing::info!(
            "Applying compensation over {} lines ({} height samples)",
            source.lines().count(),
            self.points.len()
        );

        let expander = ArcExpander::new(options.arc);
        let mut modal = ModalState::new();
        let mut p0 = Point3::default();
        let mut pt = p0;
        let mut output: Vec<String> = Vec::new();
        let mut report = CompensationReport::default();

        for (index, raw) in source.split('\n').enumerate() {
            let line_number = index + 1;
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                tracing::warn!("Compensation cancelled at line {}", line_number);
                return Err(GcodeError::Cancelled { line_number });
            }

            let cleaned = strip_comments(raw);
            let line = ParsedLine::parse(&cleaned, line_number)?;
            modal.apply(&line);

            if is_pass_through(&line) {
                tracing::debug!("Skipped: ({})", cleaned);
                output.push(annotate(&cleaned, RELATIVE_TAG));
                report.record(LineKind::Untouched);
                continue;
            }

            if !modal.is_absolute() {
                tracing::debug!("Relative mode: ({})", cleaned);
                output.push(annotate(&cleaned, RELATIVE_TAG));
                report.record(LineKind::Relative);
                continue;
            }

            let (x, y, z) = (line.value('X'), line.value('Y'), line.value('Z'));
            if x.is_none() && y.is_none() && z.is_none() {
                tracing::debug!("Not changed: ({})", cleaned);
                output.push(annotate(&cleaned, ORIGINAL_TAG));
                report.record(LineKind::Original);
                continue;
            }

            if let Some(x) = x {
                pt.x = x;
            }
            if let Some(y) = y {
                pt.y = y;
            }
            if let Some(z) = z {
                pt.z = z;
            }

            let max_length = modal.units.from_mm(self.delta) / 2.0;
            let segments = match modal.motion_mode {
                MotionMode::Rapid => vec![pt],
                MotionMode::Linear if x.is_some() || y.is_some() => {
                    split_linear(p0, pt, max_length)
                }
                MotionMode::Linear => vec![pt],
                MotionMode::ArcClockwise | MotionMode::ArcCounterClockwise => {
                    let clockwise = modal.motion_mode == MotionMode::ArcClockwise;
                    match options.arc_mode {
                        ArcMode::Legacy => {
                            let center = legacy_center(&line, line_number)?;
                            tracing::debug!("Arc center {:?} (endpoint only)", center);
                            vec![pt]
                        }
                        ArcMode::Interpolate => {
                            let center = offset_center(&line, p0);
                            expander.expand_arc(p0, pt, center, clockwise, max_length)
                        }
                    }
                }
            };

            let rest = line.without_coordinates();
            for segment in &segments {
                let compensated = self.compensate_z(*segment, modal.units);
                if compensated.degenerate {
                    report.degenerate_planes += 1;
                }
                output.push(format_segment(&rest, compensated.point, segment.z));
            }
            tracing::debug!("Processed: ({}) -> ({})", cleaned, segments.len());

            report.segments += segments.len();
            report.record(LineKind::Compensated);
            p0 = pt;
        }

        tracing::info!(
            "Leveling applied: {} compensated, {} original, {} relative, {} untouched, {} segments",
            report.compensated_lines,
            report.original_lines,
            report.relative_lines,
            report.untouched_lines,
            report.segments
        );
        if report.degenerate_planes > 0 {
            tracing::warn!(
                "{} points kept their Z because no plane could be fitted",
                report.degenerate_planes
            );
        }

        Ok(CompensatedProgram {
            gcode: output.join("\n"),
            report,
        })
    }

    /// Shift `point.z` by the height of the local plane under it
    ///
    /// `point` is in `units`; the result is in the same units.
    pub fn compensate_z(&self, point: Point3, units: Units) -> CompensatedPoint {
        let mm = Point3::new(units.to_mm(point.x), units.to_mm(point.y), units.to_mm(point.z));

        let Some([a, b, c]) = self.three_closest(mm) else {
            tracing::warn!("Cannot find 3 usable points near ({:.3}, {:.3})", mm.x, mm.y);
            return CompensatedPoint {
                point,
                degenerate: true,
            };
        };

        let normal = cross_product(b - a, c - a);
        if normal.z == 0.0 {
            tracing::warn!(
                "Plane normal has no Z component at ({:.3}, {:.3}), keeping Z",
                mm.x,
                mm.y
            );
            return CompensatedPoint {
                point,
                degenerate: true,
            };
        }

        let plane_z = a.z - (normal.x * (mm.x - a.x) + normal.y * (mm.y - a.y)) / normal.z;
        CompensatedPoint {
            point: Point3::new(point.x, point.y, units.from_mm(mm.z + plane_z)),
            degenerate: false,
        }
    }

    /// Nearest three samples by XY distance, skipping a third candidate
    /// colinear with the first two
    fn three_closest(&self, target: Point3) -> Option<[Point3; 3]> {
        let mut sorted: Vec<&Point3> = self.points.iter().collect();
        sorted.sort_by(|a, b| {
            distance_squared_2d(**a, target).total_cmp(&distance_squared_2d(**b, target))
        });

        let mut chosen: Vec<Point3> = Vec::with_capacity(3);
        for candidate in sorted {
            if chosen.len() == 2 && is_colinear(chosen[1] - chosen[0], *candidate - chosen[0]) {
                continue;
            }
            chosen.push(*candidate);
            if chosen.len() == 3 {
                return Some([chosen[0], chosen[1], chosen[2]]);
            }
        }
        None
    }
}

fn annotate(text: &str, tag: &str) -> String {
    if text.is_empty() {
        tag.to_string()
    } else {
        format!("{} {}", text, tag)
    }
}

fn format_segment(rest: &str, point: Point3, original_z: f64) -> String {
    let coordinates = format!(
        "X{} Y{} Z{} (Z{})",
        fixed(point.x),
        fixed(point.y),
        fixed(point.z),
        fixed(original_z)
    );
    if rest.is_empty() {
        coordinates
    } else {
        format!("{} {}", rest, coordinates)
    }
}

/// Three decimals, never "-0.000"
fn fixed(value: f64) -> String {
    let text = format!("{:.3}", value);
    if text == "-0.000" {
        "0.000".to_string()
    } else {
        text
    }
}

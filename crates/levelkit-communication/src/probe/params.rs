//! Probe job parameters and the grid they describe

use levelkit_core::ProbeError;
use serde::{Deserialize, Serialize};

/// Scalar configuration of a probing run, all in millimeters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProbeParameters {
    /// How far below the current Z each probe may travel
    pub probe_depth: f64,
    /// Probe feedrate in mm/min
    pub probe_feedrate: f64,
    /// Thickness of the touch plate used for the datum probe
    pub touch_plate_height: f64,
    /// Lift between probe points
    pub retraction_distance: f64,
    pub probe_start_x: f64,
    pub probe_start_y: f64,
    pub probe_delta_x: f64,
    pub probe_delta_y: f64,
    /// Bed length to cover along X
    pub probe_bed_x_length: f64,
    /// Bed length to cover along Y
    pub probe_bed_y_length: f64,
}

impl Default for ProbeParameters {
    fn default() -> Self {
        Self {
            probe_depth: 5.0,
            probe_feedrate: 100.0,
            touch_plate_height: 0.0,
            retraction_distance: 3.0,
            probe_start_x: 0.0,
            probe_start_y: 0.0,
            probe_delta_x: 10.0,
            probe_delta_y: 10.0,
            probe_bed_x_length: 100.0,
            probe_bed_y_length: 100.0,
        }
    }
}

/// Grid derived from [`ProbeParameters`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeGridInfo {
    pub count_x: usize,
    pub count_y: usize,
    pub total: usize,
    pub end_x: f64,
    pub end_y: f64,
    pub margin_x: f64,
    pub margin_y: f64,
    /// Covered bed area in mm²
    pub area: f64,
}

fn invalid(name: &str, reason: impl Into<String>) -> ProbeError {
    ProbeError::InvalidParameter {
        name: name.to_string(),
        reason: reason.into(),
    }
}

impl ProbeParameters {
    /// Reject non-finite values and values that would produce no grid
    pub fn validate(&self) -> Result<(), ProbeError> {
        let fields = [
            ("probeDepth", self.probe_depth),
            ("probeFeedrate", self.probe_feedrate),
            ("touchPlateHeight", self.touch_plate_height),
            ("retractionDistance", self.retraction_distance),
            ("probeStartX", self.probe_start_x),
            ("probeStartY", self.probe_start_y),
            ("probeDeltaX", self.probe_delta_x),
            ("probeDeltaY", self.probe_delta_y),
            ("probeBedXLength", self.probe_bed_x_length),
            ("probeBedYLength", self.probe_bed_y_length),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(invalid(name, format!("{} is not a finite number", value)));
            }
        }

        let positive = [
            ("probeDepth", self.probe_depth),
            ("probeFeedrate", self.probe_feedrate),
            ("probeDeltaX", self.probe_delta_x),
            ("probeDeltaY", self.probe_delta_y),
            ("probeBedXLength", self.probe_bed_x_length),
            ("probeBedYLength", self.probe_bed_y_length),
        ];
        for (name, value) in positive {
            if value <= 0.0 {
                return Err(invalid(name, format!("must be greater than 0, got {}", value)));
            }
        }

        if self.touch_plate_height < 0.0 {
            return Err(invalid("touchPlateHeight", "must not be negative"));
        }
        if self.retraction_distance < 0.0 {
            return Err(invalid("retractionDistance", "must not be negative"));
        }

        Ok(())
    }

    /// Probe counts and extents for these parameters
    pub fn grid(&self) -> ProbeGridInfo {
        let count_x = (self.probe_bed_x_length / self.probe_delta_x).ceil() as usize;
        let count_y = (self.probe_bed_y_length / self.probe_delta_y).ceil() as usize;
        ProbeGridInfo {
            count_x,
            count_y,
            total: count_x * count_y,
            end_x: self.probe_start_x + self.probe_delta_x * count_x as f64,
            end_y: self.probe_start_y + self.probe_delta_y * count_y as f64,
            margin_x: 0.0,
            margin_y: 0.0,
            area: self.probe_bed_x_length * self.probe_bed_y_length,
        }
    }

    /// Height the probe returns to after touching off
    pub fn safe_height(&self) -> f64 {
        self.retraction_distance + self.touch_plate_height
    }

    /// Log the run summary at info level
    pub fn log_summary(&self, free_move_feedrate: f64) {
        let grid = self.grid();
        tracing::info!(
            "Probe Start: X: {}mm, Y: {}mm",
            self.probe_start_x,
            self.probe_start_y
        );
        tracing::info!("Probe End: X: {}mm, Y: {}mm", grid.end_x, grid.end_y);
        tracing::info!(
            "Delta: X: {}mm, Y: {}mm",
            self.probe_delta_x,
            self.probe_delta_y
        );
        tracing::info!("Margin: X: {}mm, Y: {}mm", grid.margin_x, grid.margin_y);
        tracing::info!(
            "Probe Numbers: X: {}, Y: {}, Total: {}",
            grid.count_x,
            grid.count_y,
            grid.total
        );
        tracing::info!("Free Move Feedrate: {}mm/min", free_move_feedrate);
        tracing::info!("Probe Area: {}mm^2", grid.area);
        tracing::info!(
            "Probe Depth: {}mm, Probe Feed Rate: {}mm/min",
            self.probe_depth,
            self.probe_feedrate
        );
        tracing::info!(
            "Touch Plate Height: {}mm, Retraction Distance: {}mm",
            self.touch_plate_height,
            self.retraction_distance
        );
    }
}

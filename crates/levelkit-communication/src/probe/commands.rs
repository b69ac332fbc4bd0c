//! Probe command list

use super::params::ProbeParameters;

/// Number of commands issued before the first grid point
pub const PREAMBLE_LEN: usize = 6;

/// Commands issued for each grid point (retract, rapid, probe)
pub const COMMANDS_PER_POINT: usize = 3;

/// Build the full ordered command list for a probing run
///
/// The preamble sets millimeters and absolute mode, zeroes X/Y at the machine
/// origin, moves to the probe start and touches off the Z datum on the plate.
/// Each grid point then retracts, rapids over the point and probes down.
/// Points are visited row by row, X varying fastest.
pub fn build_commands(params: &ProbeParameters, free_move_feedrate: f64) -> Vec<String> {
    let grid = params.grid();
    let safe_height = params.safe_height();
    let mut commands = Vec::with_capacity(PREAMBLE_LEN + grid.total * COMMANDS_PER_POINT);

    commands.push("G21 G90".to_string());
    commands.push(format!("G0 X0 Y0 F{}", free_move_feedrate));
    commands.push("G10 L20 X0 Y0".to_string());
    commands.push(format!(
        "G0 X{} Y{} F{}",
        params.probe_start_x, params.probe_start_y, free_move_feedrate
    ));
    commands.push(format!(
        "G38.2 Z-{} F{}",
        params.probe_depth + 1.0,
        params.probe_feedrate / 2.0
    ));
    commands.push(format!("G10 L20 Z{}", params.touch_plate_height));

    for iy in 0..grid.count_y {
        for ix in 0..grid.count_x {
            let x = params.probe_start_x + ix as f64 * params.probe_delta_x;
            let y = params.probe_start_y + iy as f64 * params.probe_delta_y;
            commands.push(format!("G0 Z{} F{}", safe_height, params.probe_feedrate));
            commands.push(format!("G0 X{} Y{} F{}", x, y, free_move_feedrate));
            commands.push(format!(
                "G38.2 Z-{} F{}",
                params.probe_depth, params.probe_feedrate
            ));
        }
    }

    commands
}

/// Lift off the surface after the last point
///
/// Sent once the results are resolved and not counted in the command list.
pub fn final_retract(params: &ProbeParameters) -> String {
    format!("G0 Z{} F{}", params.safe_height(), params.probe_feedrate)
}

//! Probe sequencing state machine
//!
//! Pure and synchronous: the driver feeds it parsed controller responses and
//! performs whatever [`Step`] it returns. One command is outstanding at a
//! time; `ok` advances the cursor and probe reports are collected, except the
//! first one, which belongs to the datum probe.

use levelkit_core::{Point3, ProbeError};

use crate::firmware::grbl::GrblResponse;

/// What the driver must do next
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Write this command to the controller
    Send(String),
    /// Keep waiting for the current command's acknowledgment
    Continue,
    /// Every command was acknowledged
    Done,
}

#[derive(Debug, Clone)]
pub struct ProbeSequencer {
    commands: Vec<String>,
    cursor: usize,
    datum_probed: bool,
    results: Vec<Point3>,
}

impl ProbeSequencer {
    pub fn new(commands: Vec<String>) -> Self {
        Self {
            commands,
            cursor: 0,
            datum_probed: false,
            results: Vec::new(),
        }
    }

    /// First step of the run
    pub fn start(&self) -> Step {
        self.step()
    }

    fn step(&self) -> Step {
        match self.commands.get(self.cursor) {
            Some(command) => Step::Send(command.clone()),
            None => Step::Done,
        }
    }

    /// Command currently awaiting acknowledgment
    pub fn current_command(&self) -> Option<&str> {
        self.commands.get(self.cursor).map(String::as_str)
    }

    /// Advance on one controller response
    ///
    /// `error:n` and `ALARM:n` end the run; the command list is never resumed
    /// after a rejected command.
    pub fn handle(&mut self, response: &GrblResponse) -> Result<Step, ProbeError> {
        match response {
            GrblResponse::Ok => {
                self.cursor += 1;
                Ok(self.step())
            }
            GrblResponse::Probe(report) => {
                if !report.success {
                    tracing::warn!(
                        "Probe did not make contact at X{} Y{}",
                        report.x,
                        report.y
                    );
                }
                if self.datum_probed {
                    self.results
                        .push(Point3::new(report.x, report.y, report.z));
                } else {
                    tracing::debug!("Datum probe at Z{}", report.z);
                    self.datum_probed = true;
                }
                Ok(Step::Continue)
            }
            GrblResponse::Error(code) => Err(ProbeError::ControllerError {
                command: self.current_command().unwrap_or_default().to_string(),
                code: *code,
            }),
            GrblResponse::Alarm(code) => Err(ProbeError::Alarm { code: *code }),
            other => {
                tracing::debug!("Ignoring controller response {}", other);
                Ok(Step::Continue)
            }
        }
    }

    /// Commands acknowledged so far
    pub fn acknowledged(&self) -> usize {
        self.cursor.min(self.commands.len())
    }

    pub fn total(&self) -> usize {
        self.commands.len()
    }

    /// Grid points captured so far
    pub fn captured(&self) -> usize {
        self.results.len()
    }

    pub fn is_done(&self) -> bool {
        self.cursor >= self.commands.len()
    }

    pub fn into_results(self) -> Vec<Point3> {
        self.results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::firmware::grbl::ProbeReport;

    fn report(x: f64, y: f64, z: f64) -> GrblResponse {
        GrblResponse::Probe(ProbeReport {
            x,
            y,
            z,
            a: None,
            success: true,
        })
    }

    #[test]
    fn test_ok_advances_until_done() {
        let mut seq = ProbeSequencer::new(vec!["G21 G90".into(), "G38.2 Z-5 F100".into()]);
        assert_eq!(seq.start(), Step::Send("G21 G90".into()));
        assert_eq!(
            seq.handle(&GrblResponse::Ok).unwrap(),
            Step::Send("G38.2 Z-5 F100".into())
        );
        assert_eq!(seq.handle(&GrblResponse::Ok).unwrap(), Step::Done);
        assert!(seq.is_done());
    }

    #[test]
    fn test_first_probe_report_is_datum() {
        let mut seq = ProbeSequencer::new(vec!["a".into(), "b".into(), "c".into()]);
        assert_eq!(seq.handle(&report(0.0, 0.0, -1.0)).unwrap(), Step::Continue);
        seq.handle(&report(10.0, 0.0, 0.2)).unwrap();
        seq.handle(&report(20.0, 0.0, 0.4)).unwrap();
        assert_eq!(seq.captured(), 2);
        assert_eq!(
            seq.into_results(),
            vec![Point3::new(10.0, 0.0, 0.2), Point3::new(20.0, 0.0, 0.4)]
        );
    }

    #[test]
    fn test_error_names_current_command() {
        let mut seq = ProbeSequencer::new(vec!["G21 G90".into(), "G10 L20 X0 Y0".into()]);
        seq.handle(&GrblResponse::Ok).unwrap();
        match seq.handle(&GrblResponse::Error(9)) {
            Err(ProbeError::ControllerError { command, code }) => {
                assert_eq!(command, "G10 L20 X0 Y0");
                assert_eq!(code, 9);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_messages_are_ignored() {
        let mut seq = ProbeSequencer::new(vec!["G21 G90".into()]);
        let step = seq
            .handle(&GrblResponse::Message("[MSG:Pgm End]".into()))
            .unwrap();
        assert_eq!(step, Step::Continue);
        assert_eq!(seq.acknowledged(), 0);
    }

    #[test]
    fn test_empty_list_is_done_immediately() {
        let seq = ProbeSequencer::new(Vec::new());
        assert_eq!(seq.start(), Step::Done);
    }
}

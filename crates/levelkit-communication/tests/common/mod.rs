//! In-memory GRBL controller for driver tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use levelkit_communication::ControllerChannel;
use levelkit_core::ProbeError;
use parking_lot::Mutex;

/// What the fake does when it receives a scripted command
#[derive(Debug, Clone, Copy)]
pub enum Fault {
    /// Never answer
    Silence,
    /// Answer `error:n`
    Error(u8),
    /// Answer `ALARM:n`
    Alarm(u8),
    /// Close the stream
    Disconnect,
}

/// Replies `ok` to everything, prefixed by a `[PRB:...]` report for `G38.2`
///
/// The probed Z follows a plane `z = 0.01 x + 0.001 y` over the last rapid
/// position; the datum probe reports `-6.000`.
pub struct FakeGrbl {
    pending: VecDeque<String>,
    sent: Arc<Mutex<Vec<String>>>,
    free_move_feedrate: Option<f64>,
    fault: Option<(usize, Fault)>,
    closed: bool,
    x: f64,
    y: f64,
    probes: usize,
}

impl FakeGrbl {
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            sent: Arc::new(Mutex::new(Vec::new())),
            free_move_feedrate: Some(500.0),
            fault: None,
            closed: false,
            x: 0.0,
            y: 0.0,
            probes: 0,
        }
    }

    /// Apply `fault` when the command at `index` (0-based) arrives
    pub fn with_fault(mut self, index: usize, fault: Fault) -> Self {
        self.fault = Some((index, fault));
        self
    }

    pub fn without_free_move_feedrate(mut self) -> Self {
        self.free_move_feedrate = None;
        self
    }

    /// Log of commands written, shared with the test
    pub fn sent_log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.sent)
    }

    fn track_position(&mut self, line: &str) {
        for word in line.split_whitespace() {
            let (letter, value) = word.split_at(1);
            let Ok(value) = value.parse::<f64>() else {
                continue;
            };
            match letter {
                "X" => self.x = value,
                "Y" => self.y = value,
                _ => {}
            }
        }
    }
}

#[async_trait]
impl ControllerChannel for FakeGrbl {
    async fn send_line(&mut self, line: &str) -> Result<(), ProbeError> {
        if self.closed {
            return Err(ProbeError::ConnectionLost);
        }
        let index = {
            let mut sent = self.sent.lock();
            sent.push(line.to_string());
            sent.len() - 1
        };

        if let Some((at, fault)) = self.fault {
            if at == index {
                match fault {
                    Fault::Silence => {}
                    Fault::Error(code) => self.pending.push_back(format!("error:{}", code)),
                    Fault::Alarm(code) => self.pending.push_back(format!("ALARM:{}", code)),
                    Fault::Disconnect => self.closed = true,
                }
                return Ok(());
            }
        }

        if line == "$$" {
            self.pending.push_back("$100=250.000".to_string());
            self.pending.push_back("$110=800.000".to_string());
            self.pending.push_back("ok".to_string());
            return Ok(());
        }

        if line.starts_with("G0") {
            self.track_position(line);
        }
        if line.starts_with("G38.2") {
            let z = if self.probes == 0 {
                -6.0
            } else {
                0.01 * self.x + 0.001 * self.y
            };
            self.probes += 1;
            self.pending.push_back(format!(
                "[PRB:{:.3},{:.3},{:.3}:1]",
                self.x, self.y, z
            ));
        }
        self.pending.push_back("ok".to_string());
        Ok(())
    }

    async fn next_line(&mut self) -> Option<String> {
        if let Some(line) = self.pending.pop_front() {
            return Some(line);
        }
        if self.closed {
            return None;
        }
        std::future::pending::<Option<String>>().await
    }

    fn free_move_feedrate(&self) -> Option<f64> {
        self.free_move_feedrate
    }
}

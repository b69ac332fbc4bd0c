//! Async probe driver
//!
//! Runs a [`ProbeSequencer`] against a [`ControllerChannel`]. A driver owns
//! one channel and allows one run at a time; a second concurrent call fails
//! with [`ProbeError::AlreadyRunning`]. Each command has its own deadline and
//! the caller may cancel through [`ProbeDriver::cancel`]. A failed run never
//! yields partial results. A completed run ends with a retract that is not
//! part of the counted command list.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use levelkit_core::{Point3, ProbeError};
use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tokio::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use super::commands::{build_commands, final_retract};
use super::params::ProbeParameters;
use super::sequencer::{ProbeSequencer, Step};
use crate::communication::ControllerChannel;
use crate::firmware::grbl::{GrblResponse, GrblResponseParser};

/// Default per-command deadline
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(60);

/// Lifecycle of the most recent run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeState {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
    Cancelled,
}

/// Snapshot of a run's progress
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeProgress {
    pub run_id: Option<Uuid>,
    pub state: ProbeState,
    /// Commands written to the controller
    pub sent: usize,
    /// Commands in the run
    pub total: usize,
    /// Grid points captured
    pub captured: usize,
}

/// Result of a completed run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeOutcome {
    pub run_id: Uuid,
    /// Probed points in probe order, datum excluded
    pub points: Vec<Point3>,
}

impl ProbeOutcome {
    /// Points as a JSON array of `{x, y, z}`
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.points)
    }
}

pub struct ProbeDriver<C: ControllerChannel> {
    channel: Mutex<C>,
    /// Generation handed to the most recent call
    generation: AtomicU64,
    /// Runs with a generation at or below this value are cancelled
    cancel: watch::Sender<u64>,
    progress: Arc<RwLock<ProbeProgress>>,
    command_timeout: Duration,
    free_move_feedrate: Option<f64>,
}

impl<C: ControllerChannel> ProbeDriver<C> {
    pub fn new(channel: C) -> Self {
        let (cancel, _) = watch::channel(0);
        Self {
            channel: Mutex::new(channel),
            generation: AtomicU64::new(0),
            cancel,
            progress: Arc::new(RwLock::new(ProbeProgress::default())),
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            free_move_feedrate: None,
        }
    }

    /// Set the per-command deadline
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Override the controller's free-move feedrate
    pub fn with_free_move_feedrate(mut self, feedrate: Option<f64>) -> Self {
        self.free_move_feedrate = feedrate;
        self
    }

    /// Abort every run requested so far, including one not yet polled
    ///
    /// Calls made after this returns are not affected.
    pub fn cancel(&self) {
        self.cancel.send_replace(self.generation.load(Ordering::SeqCst));
    }

    /// Current progress snapshot
    pub fn progress(&self) -> ProbeProgress {
        self.progress.read().clone()
    }

    /// Shared handle to the progress snapshot
    pub fn progress_handle(&self) -> Arc<RwLock<ProbeProgress>> {
        Arc::clone(&self.progress)
    }

    pub fn into_inner(self) -> C {
        self.channel.into_inner()
    }

    /// Probe the bed and return the grid points in probe order
    ///
    /// The run is registered when this is called, so a [`cancel`](Self::cancel)
    /// issued before the returned future is first polled still applies.
    pub fn probe_bed_level<'a>(
        &'a self,
        params: &'a ProbeParameters,
    ) -> impl Future<Output = Result<ProbeOutcome, ProbeError>> + 'a {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let cancel = self.cancel.subscribe();
        self.probe_generation(params, generation, cancel)
    }

    async fn probe_generation(
        &self,
        params: &ProbeParameters,
        generation: u64,
        cancel: watch::Receiver<u64>,
    ) -> Result<ProbeOutcome, ProbeError> {
        let mut channel = self
            .channel
            .try_lock()
            .map_err(|_| ProbeError::AlreadyRunning)?;

        params.validate()?;
        let free_move_feedrate = self
            .free_move_feedrate
            .or_else(|| channel.free_move_feedrate())
            .ok_or_else(|| ProbeError::InvalidParameter {
                name: "freeMoveFeedrate".to_string(),
                reason: "controller does not report $110 and no override is configured"
                    .to_string(),
            })?;
        if !(free_move_feedrate.is_finite() && free_move_feedrate > 0.0) {
            return Err(ProbeError::InvalidParameter {
                name: "freeMoveFeedrate".to_string(),
                reason: format!("must be greater than 0, got {}", free_move_feedrate),
            });
        }

        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("probe_run", run_id = %run_id, generation);

        async {
            params.log_summary(free_move_feedrate);
            let sequencer = ProbeSequencer::new(build_commands(params, free_move_feedrate));
            *self.progress.write() = ProbeProgress {
                run_id: Some(run_id),
                state: ProbeState::Running,
                sent: 0,
                total: sequencer.total(),
                captured: 0,
            };

            let mut run = Run {
                cancel,
                generation,
            };
            let result = match self.run(&mut *channel, sequencer, &mut run).await {
                Ok(points) => self
                    .retract(&mut *channel, &final_retract(params), &mut run)
                    .await
                    .map(|_| points),
                Err(e) => Err(e),
            };

            let state = match &result {
                Ok(_) => ProbeState::Completed,
                Err(ProbeError::Cancelled) => ProbeState::Cancelled,
                Err(_) => ProbeState::Failed,
            };
            self.progress.write().state = state;

            match result {
                Ok(points) => {
                    tracing::info!("Probing completed with {} points", points.len());
                    Ok(ProbeOutcome { run_id, points })
                }
                Err(e) => {
                    tracing::error!("Probing aborted: {}", e);
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        channel: &mut C,
        mut sequencer: ProbeSequencer,
        run: &mut Run,
    ) -> Result<Vec<Point3>, ProbeError> {
        let parser = GrblResponseParser::new();
        let timeout_ms = self.command_timeout.as_millis() as u64;
        let mut step = sequencer.start();
        let mut deadline = Instant::now() + self.command_timeout;

        loop {
            match step {
                Step::Done => break,
                Step::Send(command) => {
                    if run.is_cancelled() {
                        return Err(ProbeError::Cancelled);
                    }
                    tracing::debug!("Sending {}", command);
                    channel.send_line(&command).await?;
                    deadline = Instant::now() + self.command_timeout;
                    self.progress.write().sent += 1;
                }
                Step::Continue => {}
            }

            let line = tokio::select! {
                biased;
                _ = run.cancelled() => return Err(ProbeError::Cancelled),
                read = tokio::time::timeout_at(deadline, channel.next_line()) => match read {
                    Err(_) => {
                        return Err(ProbeError::Timeout {
                            command: sequencer.current_command().unwrap_or_default().to_string(),
                            timeout_ms,
                        })
                    }
                    Ok(None) => return Err(ProbeError::ConnectionLost),
                    Ok(Some(line)) => line,
                },
            };

            step = match parser.parse(&line) {
                Some(response) => sequencer.handle(&response)?,
                None => Step::Continue,
            };
            self.progress.write().captured = sequencer.captured();
        }

        Ok(sequencer.into_results())
    }

    async fn retract(
        &self,
        channel: &mut C,
        command: &str,
        run: &mut Run,
    ) -> Result<(), ProbeError> {
        let parser = GrblResponseParser::new();
        if run.is_cancelled() {
            return Err(ProbeError::Cancelled);
        }
        tracing::debug!("Sending {}", command);
        channel.send_line(command).await?;
        let deadline = Instant::now() + self.command_timeout;

        loop {
            let line = tokio::select! {
                biased;
                _ = run.cancelled() => return Err(ProbeError::Cancelled),
                read = tokio::time::timeout_at(deadline, channel.next_line()) => match read {
                    Err(_) => {
                        return Err(ProbeError::Timeout {
                            command: command.to_string(),
                            timeout_ms: self.command_timeout.as_millis() as u64,
                        })
                    }
                    Ok(None) => return Err(ProbeError::ConnectionLost),
                    Ok(Some(line)) => line,
                },
            };

            match parser.parse(&line) {
                Some(GrblResponse::Ok) => return Ok(()),
                Some(GrblResponse::Error(code)) => {
                    return Err(ProbeError::ControllerError {
                        command: command.to_string(),
                        code,
                    })
                }
                Some(GrblResponse::Alarm(code)) => return Err(ProbeError::Alarm { code }),
                _ => {}
            }
        }
    }
}

/// Cancellation view of a single run
struct Run {
    cancel: watch::Receiver<u64>,
    generation: u64,
}

impl Run {
    fn is_cancelled(&self) -> bool {
        *self.cancel.borrow() >= self.generation
    }

    async fn cancelled(&mut self) {
        let generation = self.generation;
        if self
            .cancel
            .wait_for(|cancelled| *cancelled >= generation)
            .await
            .is_err()
        {
            std::future::pending::<()>().await;
        }
    }
}

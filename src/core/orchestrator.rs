//! One scheduled invocation, from the opening rotation to the closing one.
//!
//! ```text
//! Idle -> Rotating -> Skipped ------------------------------> Terminated
//!                  -> Running -> Draining -> Rotated -> Terminated
//! ```
//!
//! An interrupt is an early end of the budget: Draining and Rotated still run,
//! so the file always closes with a RUN END marker.

use crate::config::Settings;
use crate::core::journal::Journal;
use crate::core::pipeline::{self, PipelineStats, blocking};
use crate::core::rotation::Rotator;
use crate::core::scheduler::RunWindow;
use crate::errors::AppResult;
use crate::models::{LogLayout, RunMarker};
use crate::transport::{EventSource, SessionState};
use crate::utils::Clock;
use chrono::DateTime;
use chrono_tz::Tz;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Rotating,
    Skipped,
    Running,
    Draining,
    Rotated,
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Budget was zero; nothing was started.
    Skipped,
    BudgetExpired,
    Interrupted,
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub reason: StopReason,
    pub window: RunWindow,
    pub stats: PipelineStats,
    pub session: SessionState,
}

impl RunOutcome {
    pub fn skipped(&self) -> bool {
        self.reason == StopReason::Skipped
    }
}

pub struct Orchestrator {
    journal: Arc<Journal>,
    clock: Arc<dyn Clock>,
    alignment_minute: u32,
    safety_margin_secs: u64,
    channel_capacity: usize,
    phase: RunPhase,
}

impl Orchestrator {
    pub fn new(
        journal: Arc<Journal>,
        clock: Arc<dyn Clock>,
        alignment_minute: u32,
        safety_margin_secs: u64,
        channel_capacity: usize,
    ) -> Self {
        Self {
            journal,
            clock,
            alignment_minute,
            safety_margin_secs,
            channel_capacity: channel_capacity.max(1),
            phase: RunPhase::Idle,
        }
    }

    pub fn from_settings(settings: &Settings, clock: Arc<dyn Clock>) -> AppResult<Self> {
        let journal = journal_for(settings)?;
        Ok(Self::new(
            Arc::new(journal),
            clock,
            settings.alignment_minute,
            settings.safety_margin_secs,
            settings.channel_capacity,
        ))
    }

    pub fn journal(&self) -> &Arc<Journal> {
        &self.journal
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Drive one invocation. `shutdown` resolving ends the run early.
    ///
    /// Only the opening rotation can fail the run; once Running, every error is
    /// logged and the closing marker and rotation still happen.
    pub async fn run<S, F>(&mut self, source: S, shutdown: F) -> AppResult<RunOutcome>
    where
        S: EventSource,
        F: Future<Output = ()>,
    {
        self.enter(RunPhase::Rotating);
        let now = self.clock.now();
        self.reconcile(now).await?;

        let window = RunWindow::compute(now, self.alignment_minute, self.safety_margin_secs);
        if window.is_empty() {
            self.enter(RunPhase::Skipped);
            log::info!(
                "No run budget left before minute {:02} (margin {}s); skipping",
                self.alignment_minute,
                self.safety_margin_secs
            );
            self.enter(RunPhase::Terminated);
            return Ok(RunOutcome {
                reason: StopReason::Skipped,
                window,
                stats: PipelineStats::default(),
                session: SessionState::default(),
            });
        }

        self.enter(RunPhase::Running);
        log::info!("Running for {}s, until {}", window.seconds(), window.deadline);
        if let Err(e) = self.mark(RunMarker::start(now)).await {
            log::error!("Failed to write RUN START marker: {}", e);
        }

        let (tx, rx) = mpsc::channel(self.channel_capacity);
        let cancel = CancellationToken::new();
        let mut session = SessionState::default();

        let pipeline = tokio::spawn(pipeline::drain(
            rx,
            Arc::clone(&self.journal),
            Arc::clone(&self.clock),
        ));

        let timer_cancel = cancel.clone();
        let timer = async move {
            let reason = tokio::select! {
                _ = tokio::time::sleep(window.as_std()) => StopReason::BudgetExpired,
                _ = shutdown => StopReason::Interrupted,
            };
            timer_cancel.cancel();
            reason
        };

        let (reason, transport) = tokio::join!(timer, source.run(&mut session, tx, cancel));
        if let Err(e) = transport {
            log::error!("Event source stopped with an error: {}", e);
        }
        if reason == StopReason::Interrupted {
            log::info!("Interrupted; closing the run early");
        }

        self.enter(RunPhase::Draining);
        let stats = match pipeline.await {
            Ok(s) => s,
            Err(e) => {
                log::error!("Event pipeline task failed: {}", e);
                PipelineStats::default()
            }
        };

        // Stamped after the queue is empty so RUN END is the newest row.
        let now = self.clock.now();
        let ended = self.journal.last_written().map_or(now, |t| t.max(now));

        if let Err(e) = self.mark(RunMarker::end(ended)).await {
            log::error!("Failed to write RUN END marker: {}", e);
        }
        let closing = self.clock.now();
        if let Err(e) = self.reconcile(closing).await {
            log::error!("Closing rotation failed: {}", e);
        }
        self.enter(RunPhase::Rotated);

        log::info!(
            "Run finished ({:?}): {} accepted, {} rejected, {} failed, {} delivered",
            reason,
            stats.accepted,
            stats.rejected,
            stats.failed,
            session.delivered
        );
        self.enter(RunPhase::Terminated);

        Ok(RunOutcome {
            reason,
            window,
            stats,
            session,
        })
    }

    async fn reconcile(&self, now: DateTime<Tz>) -> AppResult<()> {
        let journal = Arc::clone(&self.journal);
        let report = blocking(move || journal.reconcile(now)).await?;
        if !report.is_noop() {
            log::debug!("Rotation: {:?}", report);
        }
        Ok(())
    }

    async fn mark(&self, marker: RunMarker) -> AppResult<()> {
        let journal = Arc::clone(&self.journal);
        blocking(move || journal.mark(&marker)).await
    }

    fn enter(&mut self, next: RunPhase) {
        log::debug!("Run phase {:?} -> {:?}", self.phase, next);
        self.phase = next;
    }
}

/// Journal over the configured directory and retention.
pub fn journal_for(settings: &Settings) -> AppResult<Journal> {
    let layout = LogLayout::new(&settings.log_dir, &settings.file_stem)?;
    let rotator = Rotator::new(
        layout,
        settings.timezone,
        settings.retention_days,
        settings.retention_policy,
    );
    Ok(Journal::new(rotator))
}

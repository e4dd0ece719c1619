mod common;
use common::{at, journal, rows};
use statelog::core::orchestrator::{Orchestrator, RunPhase, StopReason};
use statelog::core::rotation::RetentionPolicy;
use statelog::errors::{AppError, AppResult};
use statelog::transport::{EventSource, InboundMessage, SessionState};
use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use statelog::utils::{Clock, ManualClock};
use std::fs;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

/// Delivers a fixed script, reports completion, then idles until cancelled.
struct ScriptedSource {
    messages: Vec<InboundMessage>,
    done: Option<oneshot::Sender<()>>,
}

impl ScriptedSource {
    fn new(messages: Vec<InboundMessage>) -> (Self, oneshot::Receiver<()>) {
        let (done, rx) = oneshot::channel();
        (
            Self {
                messages,
                done: Some(done),
            },
            rx,
        )
    }
}

impl EventSource for ScriptedSource {
    async fn run(
        mut self,
        session: &mut SessionState,
        tx: mpsc::Sender<InboundMessage>,
        cancel: CancellationToken,
    ) -> AppResult<()> {
        if session.on_connect(false) {
            session.on_subscribed();
        }
        for m in self.messages.drain(..) {
            session.delivered += 1;
            tx.send(m).await.expect("pipeline alive");
        }
        if let Some(done) = self.done.take() {
            let _ = done.send(());
        }
        cancel.cancelled().await;
        Ok(())
    }
}

/// Fails before delivering anything.
struct BrokenSource;

impl EventSource for BrokenSource {
    async fn run(
        self,
        _session: &mut SessionState,
        _tx: mpsc::Sender<InboundMessage>,
        _cancel: CancellationToken,
    ) -> AppResult<()> {
        Err(AppError::Transport("connection refused".into()))
    }
}

/// Moves one second forward every time it is read, like a busy wall clock.
struct SteppingClock {
    next: Mutex<DateTime<Tz>>,
}

impl SteppingClock {
    fn starting_at(t: DateTime<Tz>) -> Arc<dyn Clock> {
        Arc::new(Self {
            next: Mutex::new(t),
        })
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Tz> {
        let mut next = self.next.lock().unwrap();
        let t = *next;
        *next += Duration::seconds(1);
        t
    }
}

fn live_messages(n: usize) -> Vec<InboundMessage> {
    (0..n)
        .map(|i| InboundMessage::live("home/door", if i % 2 == 0 { "1" } else { "0" }))
        .collect()
}

fn assert_time_ordered(data: &[[String; 3]]) {
    for pair in data.windows(2) {
        assert!(
            pair[0][0] <= pair[1][0],
            "rows out of order: {:?} before {:?}",
            pair[0],
            pair[1]
        );
    }
}

fn orchestrator(dir: &std::path::Path, clock: Arc<ManualClock>) -> Orchestrator {
    let clock: Arc<dyn Clock> = clock;
    Orchestrator::new(
        Arc::new(journal(dir, 2, RetentionPolicy::Daily)),
        clock,
        0,
        60,
        8,
    )
}

#[tokio::test]
async fn interrupted_run_still_closes_with_run_end() {
    let dir = tempfile::tempdir().expect("tempdir");
    let clock = Arc::new(ManualClock::new(at("2024-03-10 10:00:00")));
    let mut orch = orchestrator(dir.path(), Arc::clone(&clock));

    let (source, delivered) = ScriptedSource::new(vec![
        InboundMessage::retained("home/door", "0"),
        InboundMessage::live("home/door", "1"),
        InboundMessage::live("home/door", "on"),
        InboundMessage::live("home/door", "0"),
    ]);
    let interrupt_clock = Arc::clone(&clock);
    let shutdown = async move {
        let _ = delivered.await;
        interrupt_clock.set(at("2024-03-10 10:05:00"));
    };

    let outcome = orch.run(source, shutdown).await.expect("run");

    assert_eq!(outcome.reason, StopReason::Interrupted);
    assert_eq!(outcome.stats.accepted, 2);
    assert_eq!(outcome.stats.rejected, 2);
    assert_eq!(outcome.session.delivered, 4);
    assert!(outcome.session.subscribed);
    assert_eq!(orch.phase(), RunPhase::Terminated);

    let data = rows(&dir.path().join("mqtt_log.csv"));
    let values: Vec<&str> = data.iter().map(|r| r[2].as_str()).collect();
    assert_eq!(values, vec!["RUN START", "1", "0", "RUN END"]);
    assert_eq!(data[0][0], "2024-03-10 10:00:00");
    assert_eq!(data[0][1], "");
    assert_eq!(data[3][0], "2024-03-10 10:05:00");
    assert_eq!(data[3][1], "");
}

#[tokio::test]
async fn zero_budget_skips_without_connecting() {
    let dir = tempfile::tempdir().expect("tempdir");
    // 30 s before the top of the hour, inside the 60 s margin.
    let clock = Arc::new(ManualClock::new(at("2024-03-10 10:59:30")));
    let mut orch = orchestrator(dir.path(), clock);

    let outcome = orch
        .run(BrokenSource, std::future::pending::<()>())
        .await
        .expect("run");

    assert!(outcome.skipped());
    assert_eq!(outcome.session.connects, 0);
    assert_eq!(orch.phase(), RunPhase::Terminated);

    let path = dir.path().join("mqtt_log.csv");
    assert_eq!(fs::read_to_string(path).unwrap(), "time;topic;value\n");
}

#[tokio::test]
async fn budget_expiry_ends_the_run() {
    let dir = tempfile::tempdir().expect("tempdir");
    // 61 s to the top of the hour minus 60 s margin: a one second budget.
    let clock = Arc::new(ManualClock::new(at("2024-03-10 10:58:59")));
    let mut orch = orchestrator(dir.path(), clock);

    let (source, _delivered) = ScriptedSource::new(vec![InboundMessage::live("home/door", "1")]);
    let outcome = orch
        .run(source, std::future::pending::<()>())
        .await
        .expect("run");

    assert_eq!(outcome.reason, StopReason::BudgetExpired);
    assert_eq!(outcome.window.seconds(), 1);

    let values: Vec<String> = rows(&dir.path().join("mqtt_log.csv"))
        .into_iter()
        .map(|r| r[2].clone())
        .collect();
    assert_eq!(values, vec!["RUN START", "1", "RUN END"]);
}

#[tokio::test]
async fn failing_source_still_completes_the_budget() {
    let dir = tempfile::tempdir().expect("tempdir");
    let clock = Arc::new(ManualClock::new(at("2024-03-10 10:58:59")));
    let mut orch = orchestrator(dir.path(), clock);

    let outcome = orch
        .run(BrokenSource, std::future::pending::<()>())
        .await
        .expect("transport failure is not fatal");

    assert_eq!(outcome.reason, StopReason::BudgetExpired);
    assert_eq!(outcome.stats.accepted, 0);

    let values: Vec<String> = rows(&dir.path().join("mqtt_log.csv"))
        .into_iter()
        .map(|r| r[2].clone())
        .collect();
    assert_eq!(values, vec!["RUN START", "RUN END"]);
}

#[tokio::test]
async fn opening_rotation_archives_yesterdays_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let clock = Arc::new(ManualClock::new(at("2024-03-09 22:00:00")));

    // Previous evening's run left an active file behind.
    {
        let j = journal(dir.path(), 2, RetentionPolicy::Daily);
        j.reconcile(clock.now()).unwrap();
    }

    clock.set(at("2024-03-10 10:59:30"));
    let mut orch = orchestrator(dir.path(), clock);
    let outcome = orch
        .run(BrokenSource, std::future::pending::<()>())
        .await
        .expect("run");

    assert!(outcome.skipped());
    assert!(dir.path().join("mqtt_log_2024-03-09.csv").exists());
    assert!(dir.path().join("mqtt_log.csv").exists());
}

#[tokio::test]
async fn run_end_is_the_newest_row() {
    let dir = tempfile::tempdir().expect("tempdir");
    let clock = SteppingClock::starting_at(at("2024-03-10 10:10:00"));
    let mut orch = Orchestrator::new(
        Arc::new(journal(dir.path(), 2, RetentionPolicy::Daily)),
        clock,
        0,
        60,
        16,
    );

    let (source, delivered) = ScriptedSource::new(live_messages(8));
    let shutdown = async move {
        let _ = delivered.await;
    };
    let outcome = orch.run(source, shutdown).await.expect("run");
    assert_eq!(outcome.stats.accepted, 8);

    let data = rows(&dir.path().join("mqtt_log.csv"));
    assert_eq!(data.len(), 10);
    assert_time_ordered(&data);

    let last = data.last().unwrap();
    assert_eq!(last[2], "RUN END");
    assert!(data.iter().all(|r| r[0] <= last[0]));
}

#[tokio::test]
async fn records_queued_across_midnight_are_all_kept() {
    let dir = tempfile::tempdir().expect("tempdir");
    let clock = SteppingClock::starting_at(at("2024-03-10 23:59:55"));
    // Aligned to half past, no margin: the run spans midnight.
    let mut orch = Orchestrator::new(
        Arc::new(journal(dir.path(), 2, RetentionPolicy::Daily)),
        clock,
        30,
        0,
        16,
    );

    let (source, delivered) = ScriptedSource::new(live_messages(8));
    let shutdown = async move {
        let _ = delivered.await;
    };
    let outcome = orch.run(source, shutdown).await.expect("run");
    assert_eq!(outcome.stats.accepted, 8);
    assert_eq!(outcome.stats.failed, 0);

    let archived = rows(&dir.path().join("mqtt_log_2024-03-10.csv"));
    let active = rows(&dir.path().join("mqtt_log.csv"));
    assert_time_ordered(&archived);
    assert_time_ordered(&active);
    assert!(archived.iter().all(|r| r[0].starts_with("2024-03-10")));
    assert!(active.iter().all(|r| r[0].starts_with("2024-03-11")));

    let records = archived
        .iter()
        .chain(active.iter())
        .filter(|r| !r[1].is_empty())
        .count();
    assert_eq!(records, 8);
    assert_eq!(archived.first().map(|r| r[2].as_str()), Some("RUN START"));
    assert_eq!(active.last().map(|r| r[2].as_str()), Some("RUN END"));
}

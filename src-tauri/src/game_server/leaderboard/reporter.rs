//! Reporter - Drives the session/name/submit/fetch sequence off-thread
//!
//! Each job runs on its own worker thread and reports progress over a
//! channel. The game calls `poll` once per tick; nothing blocks the
//! simulation. Steps run strictly in order and the first failure aborts
//! the rest of the job.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::{
    Leaderboard, LeaderboardBackend, LeaderboardConfig, LeaderboardEntry, LeaderboardError,
    ReportOrder, Session,
};
use crate::game_server::events::GameEvent;

/// Step of an in-flight job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStep {
    Connecting,
    SettingName,
    Submitting,
    Fetching,
}

/// Reporter status (fire-and-poll pattern)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum ReportStatus {
    Idle,
    Working(ReportStep),
    /// The last report finished and the board is up to date
    Done,
    Failed(String),
}

enum JobMessage {
    Step(ReportStep),
    Connected(Session),
    Board(Vec<LeaderboardEntry>),
    Finished(Result<(), LeaderboardError>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobKind {
    Connect,
    Report,
}

struct Job {
    kind: JobKind,
    rx: Receiver<JobMessage>,
    deadline: Instant,
}

/// What a report job has to do
#[derive(Debug, Clone)]
struct ReportPlan {
    needs_session: bool,
    name: String,
    score: i32,
    leaderboard: String,
    top_count: u32,
    order: ReportOrder,
}

/// Score and session reporter
pub struct ScoreReporter {
    backend: Arc<dyn LeaderboardBackend>,
    config: LeaderboardConfig,
    session: Option<Session>,
    job: Option<Job>,
    queued_score: Option<i32>,
    status: ReportStatus,
    board: Option<Leaderboard>,
}

impl ScoreReporter {
    pub fn new(backend: Arc<dyn LeaderboardBackend>, config: LeaderboardConfig) -> Self {
        Self {
            backend,
            config,
            session: None,
            job: None,
            queued_score: None,
            status: ReportStatus::Idle,
            board: None,
        }
    }

    /// Establish a guest session in the background
    pub fn connect(&mut self) {
        if self.session.is_some() || self.job.is_some() {
            return;
        }

        let backend = Arc::clone(&self.backend);
        self.spawn(JobKind::Connect, move |tx| {
            let _ = tx.send(JobMessage::Step(ReportStep::Connecting));
            let session = backend.start_guest_session()?;
            let _ = tx.send(JobMessage::Connected(session));
            Ok(())
        });
    }

    /// Submit a final score and refresh the board. If another job is in
    /// flight the report starts once it settles.
    pub fn report(&mut self, score: i32) {
        if self.job.is_some() {
            log::debug!("Leaderboard busy; queueing score {}", score);
            self.queued_score = Some(score);
            return;
        }

        let plan = ReportPlan {
            needs_session: self.session.is_none(),
            name: self.config.player_name.clone(),
            score,
            leaderboard: self.config.leaderboard_key.clone(),
            top_count: self.config.top_count,
            order: self.config.order,
        };
        let backend = Arc::clone(&self.backend);
        self.spawn(JobKind::Report, move |tx| run_report(backend.as_ref(), &plan, tx));
    }

    fn spawn<F>(&mut self, kind: JobKind, work: F)
    where
        F: FnOnce(&Sender<JobMessage>) -> Result<(), LeaderboardError> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let spawned = thread::Builder::new()
            .name("leaderboard".to_string())
            .spawn(move || {
                let result = work(&tx);
                // The receiver is gone if the job already timed out
                let _ = tx.send(JobMessage::Finished(result));
            });

        match spawned {
            Ok(_) => {
                self.job = Some(Job {
                    kind,
                    rx,
                    deadline: Instant::now() + Duration::from_millis(self.config.job_timeout_ms),
                });
            }
            Err(e) => {
                log::error!("Failed to start leaderboard worker: {}", e);
                self.status = ReportStatus::Failed(e.to_string());
            }
        }
    }

    /// Collect progress from the worker. Call once per tick.
    pub fn poll(&mut self) -> Vec<GameEvent> {
        self.poll_at(Instant::now())
    }

    pub fn poll_at(&mut self, now: Instant) -> Vec<GameEvent> {
        let mut events = Vec::new();

        while let Some(job) = &self.job {
            let kind = job.kind;
            match job.rx.try_recv() {
                Ok(JobMessage::Step(step)) => {
                    log::debug!("Leaderboard step: {:?}", step);
                    self.status = ReportStatus::Working(step);
                }
                Ok(JobMessage::Connected(session)) => {
                    log::info!("Leaderboard session started for player {}", session.player_id);
                    self.session = Some(session);
                    events.push(GameEvent::PlayerConnected);
                }
                Ok(JobMessage::Board(entries)) => {
                    let board = Leaderboard::from_entries(&entries);
                    events.push(GameEvent::LeaderboardReady(board.clone()));
                    self.board = Some(board);
                }
                Ok(JobMessage::Finished(result)) => {
                    self.job = None;
                    self.settle(kind, result, &mut events);
                }
                Err(TryRecvError::Empty) => {
                    if now >= job.deadline {
                        self.job = None;
                        self.settle(kind, Err(LeaderboardError::TimedOut), &mut events);
                    }
                    break;
                }
                Err(TryRecvError::Disconnected) => {
                    self.job = None;
                    self.settle(kind, Err(LeaderboardError::Disconnected), &mut events);
                }
            }
        }

        if self.job.is_none() {
            if let Some(score) = self.queued_score.take() {
                self.report(score);
            }
        }

        events
    }

    fn settle(&mut self, kind: JobKind, result: Result<(), LeaderboardError>, events: &mut Vec<GameEvent>) {
        match (kind, result) {
            (JobKind::Connect, Ok(())) => self.status = ReportStatus::Idle,
            (JobKind::Report, Ok(())) => self.status = ReportStatus::Done,
            (kind, Err(e)) => {
                log::error!("Leaderboard {:?} failed: {}", kind, e);
                self.status = ReportStatus::Failed(e.to_string());
                events.push(GameEvent::ReportFailed(e.to_string()));
            }
        }
    }

    /// Forget the previous run's board; the session is kept. A report
    /// still in flight is abandoned, a connect carries on.
    pub fn reset(&mut self) {
        if self.job.as_ref().is_some_and(|job| job.kind == JobKind::Report) {
            log::debug!("Abandoning report from the previous run");
            self.job = None;
        }
        self.board = None;
        self.queued_score = None;
        if self.job.is_none() {
            self.status = ReportStatus::Idle;
        }
    }

    pub fn set_player_name(&mut self, name: &str) {
        self.config.player_name = name.to_string();
    }

    pub fn status(&self) -> &ReportStatus {
        &self.status
    }

    pub fn board(&self) -> Option<&Leaderboard> {
        self.board.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_busy(&self) -> bool {
        self.job.is_some()
    }
}

fn run_report(
    backend: &dyn LeaderboardBackend,
    plan: &ReportPlan,
    tx: &Sender<JobMessage>,
) -> Result<(), LeaderboardError> {
    if plan.needs_session {
        let _ = tx.send(JobMessage::Step(ReportStep::Connecting));
        let session = backend.start_guest_session()?;
        let _ = tx.send(JobMessage::Connected(session));
    }

    let _ = tx.send(JobMessage::Step(ReportStep::SettingName));
    backend.set_player_name(&plan.name)?;

    match plan.order {
        ReportOrder::SubmitThenFetch => {
            submit(backend, plan, tx)?;
            fetch(backend, plan, tx)?;
        }
        ReportOrder::FetchThenSubmit => {
            fetch(backend, plan, tx)?;
            submit(backend, plan, tx)?;
        }
    }
    Ok(())
}

fn submit(backend: &dyn LeaderboardBackend, plan: &ReportPlan, tx: &Sender<JobMessage>) -> Result<(), LeaderboardError> {
    let _ = tx.send(JobMessage::Step(ReportStep::Submitting));
    backend.submit_score(&plan.name, plan.score, &plan.leaderboard)
}

fn fetch(backend: &dyn LeaderboardBackend, plan: &ReportPlan, tx: &Sender<JobMessage>) -> Result<(), LeaderboardError> {
    let _ = tx.send(JobMessage::Step(ReportStep::Fetching));
    let entries = backend.get_score_list(&plan.leaderboard, plan.top_count)?;
    let _ = tx.send(JobMessage::Board(entries));
    Ok(())
}

//! Foreground-window polling and session lifecycle
//!
//! Each tick asks the [`WindowSource`] for the focused window, classifies it,
//! and emits `programming_started` / `programming_ended` on transitions. An
//! idle time above the threshold closes an open session with
//! `programming_idle` instead; that check wins over a start or end seen in
//! the same tick.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::watch;

use super::{
    ActivitySettings, Classifier, DailyStats, IdleSource, Session, SessionLog, WindowError,
    WindowSource,
};
use crate::bus::{EventHandler, EventPublisher, HandlerRegistry, HandlerResult};
use crate::events::{Event, EventKind};

/// Whether the user is currently programming
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Classification {
    /// Not programming
    #[default]
    Idle,
    /// Programming
    Programming,
}

/// What one tick did
#[derive(Clone, Debug, PartialEq)]
pub enum SampleOutcome {
    /// No transition
    Unchanged,
    /// A session opened
    Started,
    /// A session closed because focus moved away
    Ended {
        /// Session length in seconds
        duration: f64,
    },
    /// A session closed because the user went idle
    WentIdle {
        /// Seconds since the last input
        idle_time: f64,
        /// Session length in seconds
        duration: f64,
    },
    /// A start was seen while the user is idle and was not opened
    StartSuppressed,
    /// The window query failed
    Failed(WindowError),
}

#[derive(Debug)]
struct SamplerState {
    classification: Classification,
    current_app: String,
    current_title: String,
    last_activity: DateTime<Utc>,
    log: SessionLog,
}

impl SamplerState {
    fn reopen_target(&self) -> Option<(String, String)> {
        (self.classification == Classification::Programming)
            .then(|| (self.current_app.clone(), self.current_title.clone()))
    }
}

/// Shared read/reset access to the sampler's state
///
/// Also the `keypress` subscriber that refreshes the last-activity time.
#[derive(Clone, Debug)]
pub struct SamplerHandle {
    state: Arc<Mutex<SamplerState>>,
}

impl SamplerHandle {
    /// Current classification
    pub fn classification(&self) -> Classification {
        self.state.lock().classification
    }

    /// Time of the last observed keypress (or sampler start)
    pub fn last_activity(&self) -> DateTime<Utc> {
        self.state.lock().last_activity
    }

    /// Record user activity at `at`
    pub fn record_activity(&self, at: DateTime<Utc>) {
        self.state.lock().last_activity = at;
    }

    /// Copy of today's sessions
    pub fn sessions(&self) -> Vec<Session> {
        self.state.lock().log.sessions().to_vec()
    }

    /// Today's totals, counting an open session up to now
    pub fn daily_stats(&self) -> DailyStats {
        self.daily_stats_at(Utc::now())
    }

    /// Today's totals, counting an open session up to `now`
    pub fn daily_stats_at(&self, now: DateTime<Utc>) -> DailyStats {
        self.state.lock().log.daily_stats(now)
    }

    /// Clear today's totals without changing classification
    pub fn reset_daily_stats(&self) {
        self.reset_daily_stats_at(Utc::now());
    }

    /// Clear today's totals at `now`; reopens a session if programming
    pub fn reset_daily_stats_at(&self, now: DateTime<Utc>) {
        let mut state = self.state.lock();
        let reopen = state.reopen_target();
        state
            .log
            .reset(reopen.as_ref().map(|(a, t)| (a.as_str(), t.as_str())), now);
        tracing::info!(programming = reopen.is_some(), "Daily activity statistics reset");
    }

    /// Subscribe this handle to `keypress`
    pub fn attach(&self, registry: &HandlerRegistry) -> Arc<dyn EventHandler> {
        let handler: Arc<dyn EventHandler> = Arc::new(self.clone());
        registry.register(EventKind::Keypress, Arc::clone(&handler));
        handler
    }
}

impl EventHandler for SamplerHandle {
    fn name(&self) -> &str {
        "activity-sampler"
    }

    fn handle(&self, event: &Event) -> HandlerResult {
        if let Event::Keypress { .. } = event {
            self.record_activity(Utc::now());
        }
        Ok(())
    }
}

/// Polls the foreground window and emits session events
pub struct ActivitySampler<W, I> {
    window: W,
    idle: I,
    classifier: Classifier,
    publisher: EventPublisher,
    interval: Duration,
    idle_threshold_secs: f64,
    state: Arc<Mutex<SamplerState>>,
}

impl<W, I> ActivitySampler<W, I>
where
    W: WindowSource,
    I: IdleSource,
{
    /// Create a sampler in the Idle classification
    pub fn new(window: W, idle: I, settings: &ActivitySettings, publisher: EventPublisher) -> Self {
        Self {
            window,
            idle,
            classifier: Classifier::from_settings(settings),
            publisher,
            interval: settings.sample_interval,
            idle_threshold_secs: settings.idle_threshold_secs,
            state: Arc::new(Mutex::new(SamplerState {
                classification: Classification::Idle,
                current_app: String::new(),
                current_title: String::new(),
                last_activity: Utc::now(),
                log: SessionLog::new(),
            })),
        }
    }

    /// Shared handle for stats, resets and keypress tracking
    pub fn handle(&self) -> SamplerHandle {
        SamplerHandle {
            state: Arc::clone(&self.state),
        }
    }

    /// Normal cadence
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Delay before the next tick; a failed tick waits twice as long
    pub fn delay_after(&self, outcome: &SampleOutcome) -> Duration {
        match outcome {
            SampleOutcome::Failed(_) => self.interval * 2,
            _ => self.interval,
        }
    }

    /// One tick at the current time
    pub async fn sample(&mut self) -> SampleOutcome {
        self.sample_at(Utc::now()).await
    }

    /// One tick, timestamping session changes with `now`
    pub async fn sample_at(&mut self, now: DateTime<Utc>) -> SampleOutcome {
        let sample = match self.window.foreground_window().await {
            Ok(sample) => sample,
            Err(error) => {
                tracing::warn!(error = %error, "Foreground window query failed");
                return SampleOutcome::Failed(error);
            }
        };
        let idle_time = self.idle.idle_seconds();
        let programming = self
            .classifier
            .is_programming(&sample.process_name, &sample.window_title);
        let idle_exceeded = idle_time > self.idle_threshold_secs;

        let mut state = self.state.lock();
        let was_programming = state.classification == Classification::Programming;

        let (event, outcome) = match (was_programming, programming) {
            (true, _) if idle_exceeded => {
                let duration = state.log.close(now).unwrap_or(0.0);
                state.classification = Classification::Idle;
                tracing::info!(idle_secs = idle_time, duration_secs = duration, "Programming idle");
                (
                    Some(Event::ProgrammingIdle {
                        idle_time,
                        duration,
                    }),
                    SampleOutcome::WentIdle {
                        idle_time,
                        duration,
                    },
                )
            }
            (false, true) if idle_exceeded => {
                tracing::debug!(
                    app = sample.process_name.as_str(),
                    idle_secs = idle_time,
                    "Programming window focused while idle, not starting a session"
                );
                (None, SampleOutcome::StartSuppressed)
            }
            (false, true) => {
                state
                    .log
                    .open(&sample.process_name, &sample.window_title, now);
                state.classification = Classification::Programming;
                tracing::info!(app = sample.process_name.as_str(), "Programming started");
                (
                    Some(Event::ProgrammingStarted {
                        app: sample.process_name.clone(),
                        title: sample.window_title.clone(),
                    }),
                    SampleOutcome::Started,
                )
            }
            (true, false) => {
                let duration = state.log.close(now).unwrap_or(0.0);
                let (app, title) = state
                    .log
                    .sessions()
                    .last()
                    .map(|s| (s.app.clone(), s.title.clone()))
                    .unwrap_or_default();
                state.classification = Classification::Idle;
                tracing::info!(app = app.as_str(), duration_secs = duration, "Programming ended");
                (
                    Some(Event::ProgrammingEnded {
                        app,
                        title,
                        duration,
                    }),
                    SampleOutcome::Ended { duration },
                )
            }
            _ => (None, SampleOutcome::Unchanged),
        };

        state.current_app = sample.process_name;
        state.current_title = sample.window_title;
        drop(state);

        if let Some(event) = event {
            self.publisher.emit(event);
        }
        outcome
    }

    /// Sample until `shutdown` turns true or its sender is dropped
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(interval = ?self.interval, "Activity sampler started");
        while !*shutdown.borrow() {
            let outcome = self.sample().await;
            let delay = self.delay_after(&outcome);
            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
        tracing::info!("Activity sampler stopped");
    }
}

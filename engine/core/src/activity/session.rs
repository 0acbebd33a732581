//! Programming sessions and daily totals

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One stretch of programming in a single app
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// When the sampler saw programming begin
    pub start_time: DateTime<Utc>,
    /// When the session closed; `None` while open
    pub end_time: Option<DateTime<Utc>>,
    /// Process name at session start
    pub app: String,
    /// Window title at session start
    pub title: String,
    /// Length in seconds; 0 while open
    pub duration: f64,
}

impl Session {
    /// Whether the session is still open
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }
}

/// Summary returned by [`SessionLog::daily_stats`]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyStats {
    /// Programming seconds in closed sessions
    pub total_seconds: f64,
    /// Same, in hours
    pub total_hours: f64,
    /// Sessions recorded today, including an open one
    pub session_count: usize,
    /// Seconds per app across closed sessions
    pub app_breakdown: BTreeMap<String, f64>,
}

/// Sessions for the current day
#[derive(Clone, Debug, Default)]
pub struct SessionLog {
    sessions: Vec<Session>,
    total_seconds: f64,
}

fn seconds_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    // Millisecond precision is plenty for session accounting.
    #[allow(clippy::cast_precision_loss)]
    let ms = (end - start).num_milliseconds().max(0) as f64;
    ms / 1000.0
}

impl SessionLog {
    /// Empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session at `now`
    ///
    /// An already-open session is closed first.
    pub fn open(&mut self, app: &str, title: &str, now: DateTime<Utc>) {
        if self.current().is_some() {
            self.close(now);
        }
        self.sessions.push(Session {
            start_time: now,
            end_time: None,
            app: app.to_string(),
            title: title.to_string(),
            duration: 0.0,
        });
    }

    /// Close the open session at `now`; returns its duration
    ///
    /// Returns `None` when nothing is open.
    pub fn close(&mut self, now: DateTime<Utc>) -> Option<f64> {
        let session = self.sessions.last_mut().filter(|s| s.is_open())?;
        session.end_time = Some(now);
        session.duration = seconds_between(session.start_time, now);
        self.total_seconds += session.duration;
        Some(session.duration)
    }

    /// The open session, if any
    #[must_use]
    pub fn current(&self) -> Option<&Session> {
        self.sessions.last().filter(|s| s.is_open())
    }

    /// All sessions, oldest first
    #[must_use]
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// Programming seconds in closed sessions
    #[must_use]
    pub fn total_seconds(&self) -> f64 {
        self.total_seconds
    }

    /// Totals for the day
    ///
    /// An open session is closed and immediately reopened at `now` so its
    /// time so far is counted.
    pub fn daily_stats(&mut self, now: DateTime<Utc>) -> DailyStats {
        if let Some((app, title)) = self.current().map(|s| (s.app.clone(), s.title.clone())) {
            self.close(now);
            self.open(&app, &title, now);
        }

        let mut app_breakdown = BTreeMap::new();
        for session in self.sessions.iter().filter(|s| !s.is_open()) {
            *app_breakdown.entry(session.app.clone()).or_insert(0.0) += session.duration;
        }

        DailyStats {
            total_seconds: self.total_seconds,
            total_hours: self.total_seconds / 3600.0,
            session_count: self.sessions.len(),
            app_breakdown,
        }
    }

    /// Clear totals and sessions
    ///
    /// When `reopen` is given (classification is programming), a fresh
    /// session is opened for it at `now`.
    pub fn reset(&mut self, reopen: Option<(&str, &str)>, now: DateTime<Utc>) {
        self.sessions.clear();
        self.total_seconds = 0.0;
        if let Some((app, title)) = reopen {
            self.open(app, title, now);
        }
    }
}

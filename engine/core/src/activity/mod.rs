//! Activity Detection
//!
//! Turns raw foreground-window samples and keystrokes into programming
//! session events on the bus.
//!
//! # Design Philosophy
//!
//! The operating system is an external collaborator. This module only sees
//! it through two small seams, [`WindowSource`] and [`IdleSource`], so the
//! same sampler runs against a real desktop, a console simulation or a test
//! script. Both producers here (the sampler task and the keystroke gate) talk
//! to the rest of the engine exclusively through an
//! [`EventPublisher`](crate::bus::EventPublisher).
//!
//! # Module Structure
//!
//! - [`classify`]: allow-list and browser/site matching
//! - [`session`]: session log and daily statistics
//! - [`sampler`]: the polling loop
//! - [`keys`]: keystroke gate and key statistics

pub mod classify;
pub mod keys;
pub mod sampler;
pub mod session;

pub use classify::Classifier;
pub use keys::{KeyActivityGate, KeyStats};
pub use sampler::{ActivitySampler, Classification, SampleOutcome, SamplerHandle};
pub use session::{DailyStats, Session, SessionLog};

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the foreground-window collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    /// Nothing has focus (locked screen, desktop)
    #[error("no foreground window")]
    NoForegroundWindow,

    /// The owning process could not be inspected
    #[error("access denied to process {0}")]
    AccessDenied(String),

    /// Any other platform failure
    #[error("window query failed: {0}")]
    Query(String),
}

/// One foreground-window observation
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WindowSample {
    /// Executable name, e.g. `code.exe`
    pub process_name: String,
    /// Window title
    pub window_title: String,
}

impl WindowSample {
    /// Build a sample
    pub fn new(process_name: impl Into<String>, window_title: impl Into<String>) -> Self {
        Self {
            process_name: process_name.into(),
            window_title: window_title.into(),
        }
    }
}

/// Foreground-window query
#[async_trait]
pub trait WindowSource: Send {
    /// The window that currently has focus
    async fn foreground_window(&mut self) -> Result<WindowSample, WindowError>;
}

/// System idle-time query
pub trait IdleSource: Send + Sync {
    /// Seconds since the last user input
    fn idle_seconds(&self) -> f64;
}

impl<F> IdleSource for F
where
    F: Fn() -> f64 + Send + Sync,
{
    fn idle_seconds(&self) -> f64 {
        self()
    }
}

/// Default editors and terminals that count as programming
pub const DEFAULT_PROGRAMMING_APPS: [&str; 9] = [
    "code.exe",
    "pycharm64.exe",
    "idea64.exe",
    "sublime_text.exe",
    "atom.exe",
    "eclipse.exe",
    "powershell.exe",
    "cmd.exe",
    "WindowsTerminal.exe",
];

/// Default browsers whose titles are checked for programming sites
pub const DEFAULT_BROWSERS: [&str; 3] = ["chrome", "msedge", "firefox"];

/// Default title keywords that mark a browser tab as programming
pub const DEFAULT_PROGRAMMING_SITES: [&str; 6] = [
    "github",
    "stackoverflow",
    "gitlab",
    "bitbucket",
    "docs.python",
    "developer.mozilla",
];

/// Tunables for activity detection
#[derive(Clone, Debug, PartialEq)]
pub struct ActivitySettings {
    /// Cadence of the window poll
    pub sample_interval: Duration,
    /// Seconds without input before a session is closed as idle
    pub idle_threshold_secs: f64,
    /// Process names (or fragments) that count as programming
    pub programming_apps: Vec<String>,
    /// Browser process names
    pub browsers: Vec<String>,
    /// Title keywords that make a browser tab count as programming
    pub programming_sites: Vec<String>,
}

impl Default for ActivitySettings {
    fn default() -> Self {
        let owned = |items: &[&str]| -> Vec<String> { items.iter().map(|s| (*s).to_string()).collect() };
        Self {
            sample_interval: Duration::from_secs(1),
            idle_threshold_secs: 300.0,
            programming_apps: owned(&DEFAULT_PROGRAMMING_APPS),
            browsers: owned(&DEFAULT_BROWSERS),
            programming_sites: owned(&DEFAULT_PROGRAMMING_SITES),
        }
    }
}

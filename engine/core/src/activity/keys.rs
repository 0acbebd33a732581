//! Keystroke gate
//!
//! The keylogger itself lives outside the engine and calls
//! [`KeyActivityGate::record_key`] from whatever thread it runs on. Presses
//! only count (and only reach the bus) while a programming session is open.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Local, Timelike};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::bus::{EventHandler, EventPublisher, HandlerRegistry, HandlerResult};
use crate::events::{Event, EventKind};

/// Number of keys reported by [`KeyStats::top_keys`]
pub const TOP_KEYS: usize = 10;

/// Key statistics for the day
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyStats {
    /// Presses recorded while programming
    pub total: u64,
    /// Most pressed keys, highest count first
    pub top_keys: Vec<(String, u64)>,
    /// Presses per local hour of day
    pub hourly: [u64; 24],
}

#[derive(Debug, Default)]
struct KeyCounters {
    total: u64,
    per_key: HashMap<String, u64>,
    hourly: [u64; 24],
}

/// Forwards key presses to the bus while programming
#[derive(Clone, Debug)]
pub struct KeyActivityGate {
    enabled: Arc<AtomicBool>,
    counters: Arc<Mutex<KeyCounters>>,
    publisher: EventPublisher,
}

impl KeyActivityGate {
    /// Disabled gate publishing on `publisher`
    pub fn new(publisher: EventPublisher) -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(false)),
            counters: Arc::new(Mutex::new(KeyCounters::default())),
            publisher,
        }
    }

    /// Turn recording on or off
    pub fn set_enabled(&self, enabled: bool) {
        let was = self.enabled.swap(enabled, Ordering::SeqCst);
        if was != enabled {
            tracing::debug!(enabled, "Keystroke recording toggled");
        }
    }

    /// Whether presses are currently recorded
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Record a press now; returns the running count when recorded
    pub fn record_key(&self, key: &str) -> Option<u64> {
        self.record_key_at(key, Local::now())
    }

    /// Record a press at `at`; returns the running count when recorded
    pub fn record_key_at(&self, key: &str, at: DateTime<Local>) -> Option<u64> {
        if !self.is_enabled() {
            return None;
        }

        let count = {
            let mut counters = self.counters.lock();
            counters.total += 1;
            *counters.per_key.entry(key.to_string()).or_insert(0) += 1;
            counters.hourly[at.hour() as usize % 24] += 1;
            counters.total
        };

        #[allow(clippy::cast_precision_loss)]
        let timestamp = at.timestamp_millis() as f64 / 1000.0;
        self.publisher.emit(Event::Keypress {
            key: key.to_string(),
            count,
            timestamp,
        });
        Some(count)
    }

    /// Totals, top keys and hourly breakdown
    #[must_use]
    pub fn key_stats(&self) -> KeyStats {
        let counters = self.counters.lock();
        let mut top_keys: Vec<(String, u64)> = counters
            .per_key
            .iter()
            .map(|(key, count)| (key.clone(), *count))
            .collect();
        top_keys.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_keys.truncate(TOP_KEYS);

        KeyStats {
            total: counters.total,
            top_keys,
            hourly: counters.hourly,
        }
    }

    /// Zero all counters
    pub fn reset_daily_stats(&self) {
        *self.counters.lock() = KeyCounters::default();
        tracing::info!("Key statistics reset");
    }

    /// Subscribe the gate to the programming lifecycle events
    pub fn attach(&self, registry: &HandlerRegistry) -> Arc<dyn EventHandler> {
        let handler: Arc<dyn EventHandler> = Arc::new(self.clone());
        registry.register_all(&EventKind::PROGRAMMING, &handler);
        handler
    }
}

impl EventHandler for KeyActivityGate {
    fn name(&self) -> &str {
        "key-activity-gate"
    }

    fn handle(&self, event: &Event) -> HandlerResult {
        match event.kind() {
            EventKind::ProgrammingStarted => self.set_enabled(true),
            EventKind::ProgrammingEnded | EventKind::ProgrammingIdle => self.set_enabled(false),
            _ => {}
        }
        Ok(())
    }
}

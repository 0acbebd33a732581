//! Headless stand-in for the renderer
//!
//! [`LogSink`] reports frames through tracing; [`StatusBoard`] subscribes to
//! the pet's outbound events and keeps the latest snapshot for the console.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use codepet_core::{
    message_for, Action, Event, EventHandler, EventKind, FrameHandle, FrameSink, HandlerRegistry,
    HandlerResult, MessageContext, Mood, PetSnapshot,
};

/// Logs every frame change at debug level
#[derive(Debug, Default)]
pub struct LogSink {
    last: Option<(Action, Mood)>,
}

impl FrameSink for LogSink {
    fn show_frame(&mut self, action: Action, mood: Mood, frame: Option<&FrameHandle>) {
        let changed = self.last != Some((action, mood));
        self.last = Some((action, mood));
        match frame {
            Some(frame) if changed => info!(action = %action, mood = %mood, frame = %frame, "Now playing"),
            Some(frame) => debug!(frame = %frame, "Frame"),
            None if changed => warn!(action = %action, mood = %mood, "No frames to show"),
            None => {}
        }
    }
}

/// Latest pet status as seen on the bus
#[derive(Clone, Debug)]
pub struct StatusBoard {
    personality: String,
    latest: Arc<Mutex<Option<PetSnapshot>>>,
}

impl StatusBoard {
    pub const EVENTS: [EventKind; 4] = [
        EventKind::PetStatsUpdated,
        EventKind::PetStateChanged,
        EventKind::PetAlert,
        EventKind::ProgrammingIdle,
    ];

    pub fn new(personality: impl Into<String>) -> Self {
        Self {
            personality: personality.into(),
            latest: Arc::new(Mutex::new(None)),
        }
    }

    pub fn attach(&self, registry: &HandlerRegistry) -> Arc<dyn EventHandler> {
        let handler: Arc<dyn EventHandler> = Arc::new(self.clone());
        registry.register_all(&Self::EVENTS, &handler);
        handler
    }

    pub fn latest(&self) -> Option<PetSnapshot> {
        self.latest.lock().clone()
    }

    /// A line in the pet's voice for its last known mood
    pub fn say(&self, context: MessageContext) -> String {
        let mood = self.latest().map_or(Mood::Normal, |pet| pet.mood);
        let line = message_for(&self.personality, context, mood, &mut rand::thread_rng());
        match self.latest() {
            Some(pet) => format!("{}: {line}", pet.name),
            None => line.to_string(),
        }
    }
}

impl EventHandler for StatusBoard {
    fn name(&self) -> &str {
        "status-board"
    }

    fn handle(&self, event: &Event) -> HandlerResult {
        match event {
            Event::PetStatsUpdated(snapshot) => {
                *self.latest.lock() = Some(snapshot.clone());
            }
            Event::PetStateChanged { previous, current } => {
                info!(previous = %previous, current = %current, "Pet state");
            }
            Event::PetAlert { kind, message } => {
                println!("[{kind}] {message}");
            }
            Event::ProgrammingIdle { idle_time, .. } => {
                debug!(idle_secs = idle_time, "Session closed by idle");
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use codepet_core::{EventBus, PetModel, PetState};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_board_keeps_latest_snapshot() {
        let bus = EventBus::new();
        let board = StatusBoard::new("shy");
        board.attach(&bus.registry());
        assert_eq!(board.latest(), None);

        let snapshot = PetModel::new("Pipi", "cat", "shy").snapshot();
        bus.dispatch(&Event::PetStatsUpdated(snapshot.clone()));
        assert_eq!(board.latest(), Some(snapshot));
        assert_eq!(board.latest().map(|p| p.state), Some(PetState::Idle));
        assert!(board.say(MessageContext::Greeting).starts_with("Pipi: "));
    }

    #[test]
    fn test_sink_tracks_changes() {
        let mut sink = LogSink::default();
        let frame = FrameHandle::new("idle0");
        sink.show_frame(Action::Idle, Mood::Normal, Some(&frame));
        sink.show_frame(Action::Eat, Mood::Happy, None);
        assert_eq!(sink.last, Some((Action::Eat, Mood::Happy)));
    }
}

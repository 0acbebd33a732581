//! Frame sequencing for the active animation

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;

use super::{AnimationCatalog, FrameHandle};
use crate::bus::{EventHandler, HandlerRegistry, HandlerResult};
use crate::events::{Event, EventKind};
use crate::pet::{Action, Mood};

/// Result of [`AnimationPlayer::play`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlayOutcome {
    /// A sequence is active
    Playing {
        /// Where the frames come from after fallback
        source: (Action, Mood),
        /// Frame interval of the sequence
        interval: Duration,
        /// Whether the caller must re-arm its frame tick
        interval_changed: bool,
        /// Length of the sequence
        frame_count: usize,
    },
    /// The fallback chain found nothing; playback stopped
    NoFrames,
}

#[derive(Clone, Debug)]
struct ActiveSequence {
    requested: (Action, Mood),
    source: (Action, Mood),
    frames: Vec<FrameHandle>,
    index: usize,
    interval: Duration,
}

/// Loops over the frames of the current `(action, mood)`
#[derive(Clone, Debug)]
pub struct AnimationPlayer {
    catalog: Arc<AnimationCatalog>,
    active: Option<ActiveSequence>,
    last_interval: Option<Duration>,
}

impl AnimationPlayer {
    /// Player over a shared catalog
    pub fn new(catalog: Arc<AnimationCatalog>) -> Self {
        Self {
            catalog,
            active: None,
            last_interval: None,
        }
    }

    /// Start the sequence for `(action, mood)` from frame 0
    pub fn play(&mut self, action: Action, mood: Mood) -> PlayOutcome {
        let Some(resolved) = self.catalog.resolve(action, mood) else {
            tracing::warn!(action = %action, mood = %mood, "No frames for animation");
            self.active = None;
            self.last_interval = None;
            return PlayOutcome::NoFrames;
        };

        if resolved.is_fallback() {
            tracing::debug!(
                requested = %format_key(resolved.requested),
                source = %format_key(resolved.source),
                "Animation fallback"
            );
        }

        let interval_changed = self.last_interval != Some(resolved.interval);
        self.last_interval = Some(resolved.interval);
        let outcome = PlayOutcome::Playing {
            source: resolved.source,
            interval: resolved.interval,
            interval_changed,
            frame_count: resolved.frames.len(),
        };
        self.active = Some(ActiveSequence {
            requested: resolved.requested,
            source: resolved.source,
            frames: resolved.frames.to_vec(),
            index: 0,
            interval: resolved.interval,
        });
        outcome
    }

    /// Advance one frame (wrapping) and return it
    pub fn next_frame(&mut self) -> Option<&FrameHandle> {
        let active = self.active.as_mut()?;
        active.index = (active.index + 1) % active.frames.len();
        active.frames.get(active.index)
    }

    /// Current frame without advancing
    #[must_use]
    pub fn current_frame(&self) -> Option<&FrameHandle> {
        self.active.as_ref().and_then(|a| a.frames.get(a.index))
    }

    /// Index of the current frame
    #[must_use]
    pub fn frame_index(&self) -> Option<usize> {
        self.active.as_ref().map(|a| a.index)
    }

    /// The `(action, mood)` last passed to [`play`](Self::play)
    #[must_use]
    pub fn now_playing(&self) -> Option<(Action, Mood)> {
        self.active.as_ref().map(|a| a.requested)
    }

    /// The `(action, mood)` the frames actually come from
    #[must_use]
    pub fn source(&self) -> Option<(Action, Mood)> {
        self.active.as_ref().map(|a| a.source)
    }

    /// Frame interval of the active sequence
    #[must_use]
    pub fn interval(&self) -> Option<Duration> {
        self.active.as_ref().map(|a| a.interval)
    }

    /// Stop playback
    pub fn stop(&mut self) {
        self.active = None;
        self.last_interval = None;
    }
}

fn format_key((action, mood): (Action, Mood)) -> String {
    format!("{action}/{mood}")
}

/// Plays `ui_play_animation` requests for one character
///
/// Publishes the new frame interval (or `None` when nothing is playing) on a
/// watch channel so the runtime can re-arm its frame tick.
pub struct PlayerHandler {
    player: Arc<Mutex<AnimationPlayer>>,
    character: String,
    interval_tx: watch::Sender<Option<Duration>>,
}

impl PlayerHandler {
    /// Register a handler for `character` on `ui_play_animation`
    pub fn attach(
        registry: &HandlerRegistry,
        player: Arc<Mutex<AnimationPlayer>>,
        character: impl Into<String>,
        interval_tx: watch::Sender<Option<Duration>>,
    ) -> Arc<dyn EventHandler> {
        let handler: Arc<dyn EventHandler> = Arc::new(Self {
            player,
            character: character.into(),
            interval_tx,
        });
        registry.register(EventKind::UiPlayAnimation, Arc::clone(&handler));
        handler
    }
}

impl EventHandler for PlayerHandler {
    fn name(&self) -> &str {
        "animation-player"
    }

    fn handle(&self, event: &Event) -> HandlerResult {
        let Event::UiPlayAnimation {
            character_name,
            action_name,
            mood_name,
        } = event
        else {
            return Ok(());
        };
        if *character_name != self.character {
            tracing::debug!(character = character_name.as_str(), "Animation for another character");
            return Ok(());
        }

        match self.player.lock().play(*action_name, *mood_name) {
            PlayOutcome::Playing {
                interval,
                interval_changed: true,
                ..
            } => {
                self.interval_tx.send_replace(Some(interval));
            }
            PlayOutcome::Playing { .. } => {}
            PlayOutcome::NoFrames => {
                self.interval_tx.send_replace(None);
            }
        }
        Ok(())
    }
}

//! Pet Runtime
//!
//! The single consumer task. It owns the bus receiver and drives everything
//! that must happen on one logical thread: event dispatch, the controller's
//! periodic tick, and frame advancement for the active animation.
//!
//! # Architecture
//!
//! ```text
//!   sampler task ──┐
//!   keystrokes ────┼──▶ EventPublisher ──▶ ┌──────────────────────────┐
//!   renderer ──────┘                       │        PetRuntime        │
//!                                          │  select! {               │
//!                                          │    shutdown              │
//!                                          │    bus.next_event ─▶ dispatch
//!                                          │    tick ─▶ controller.tick
//!                                          │    frame interval changed│
//!                                          │    frame ─▶ FrameSink    │
//!                                          │  }                       │
//!                                          └──────────────────────────┘
//! ```
//!
//! The controller and the player are shared with their bus handlers through
//! `Arc<Mutex<_>>`; both handlers run inside `dispatch`, on this task.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::{Interval, MissedTickBehavior};

use crate::animation::{AnimationCatalog, AnimationPlayer, FrameHandle, PlayerHandler};
use crate::bus::{EventBus, EventPublisher, HandlerRegistry};
use crate::controller::{BehaviorController, ControllerHandler};
use crate::events::Event;
use crate::pet::{Action, Mood, PetSnapshot};

/// Output side of the animation player
pub trait FrameSink: Send {
    /// Show `frame` for the requested `(action, mood)`
    ///
    /// `frame` is `None` when no sequence could be resolved.
    fn show_frame(&mut self, action: Action, mood: Mood, frame: Option<&FrameHandle>);
}

/// Owns the bus consumer and runs the engine until shutdown
pub struct PetRuntime<S> {
    bus: EventBus,
    controller: Arc<Mutex<BehaviorController>>,
    player: Arc<Mutex<AnimationPlayer>>,
    sink: S,
    character: String,
    tick_interval: Duration,
    interval_rx: watch::Receiver<Option<Duration>>,
}

impl<S: FrameSink> PetRuntime<S> {
    /// Wire the controller and an animation player onto `bus`
    ///
    /// The player follows the pet's species as its character.
    pub fn new(
        bus: EventBus,
        controller: BehaviorController,
        catalog: Arc<AnimationCatalog>,
        sink: S,
    ) -> Self {
        let tick_interval = controller.settings().tick_interval;
        let character = controller.model().species().to_string();
        let registry = bus.registry();

        let controller = Arc::new(Mutex::new(controller));
        ControllerHandler::attach(&registry, Arc::clone(&controller));

        let player = Arc::new(Mutex::new(AnimationPlayer::new(catalog)));
        let (interval_tx, interval_rx) = watch::channel(None);
        PlayerHandler::attach(&registry, Arc::clone(&player), character.clone(), interval_tx);

        Self {
            bus,
            controller,
            player,
            sink,
            character,
            tick_interval,
            interval_rx,
        }
    }

    /// Handler table, for additional subscribers
    pub fn registry(&self) -> HandlerRegistry {
        self.bus.registry()
    }

    /// Producer handle onto the bus
    pub fn publisher(&self) -> EventPublisher {
        self.bus.publisher()
    }

    /// The shared controller
    pub fn controller(&self) -> Arc<Mutex<BehaviorController>> {
        Arc::clone(&self.controller)
    }

    /// The shared player
    pub fn player(&self) -> Arc<Mutex<AnimationPlayer>> {
        Arc::clone(&self.player)
    }

    /// Character whose animations are played
    pub fn character(&self) -> &str {
        &self.character
    }

    /// Run until `shutdown` turns true or its sender is dropped
    ///
    /// On exit, events still queued are dispatched, the controller is shut
    /// down and the final snapshot is returned.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> PetSnapshot {
        tracing::info!(
            character = self.character.as_str(),
            tick = ?self.tick_interval,
            "Pet runtime started"
        );
        self.controller.lock().announce();

        let mut tick = tokio::time::interval(self.tick_interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut frames: Option<Interval> = None;
        let mut interval_open = true;

        while !*shutdown.borrow() {
            tokio::select! {
                biased;

                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }

                Some(event) = self.bus.next_event() => {
                    self.bus.dispatch(&event);
                    self.after_dispatch(&event);
                }

                _ = tick.tick() => {
                    self.controller.lock().tick(Instant::now());
                }

                changed = self.interval_rx.changed(), if interval_open => {
                    if changed.is_err() {
                        interval_open = false;
                        continue;
                    }
                    let period = *self.interval_rx.borrow_and_update();
                    frames = period.map(frame_interval);
                    tracing::debug!(interval = ?period, "Frame interval re-armed");
                }

                () = next_frame_tick(&mut frames) => {
                    self.advance_frame();
                }
            }
        }

        let drained = self.bus.dispatch_pending();
        let snapshot = {
            let mut controller = self.controller.lock();
            controller.shutdown();
            controller.snapshot()
        };
        self.player.lock().stop();
        tracing::info!(drained, "Pet runtime stopped");
        snapshot
    }

    fn after_dispatch(&mut self, event: &Event) {
        let Event::UiPlayAnimation {
            character_name,
            action_name,
            mood_name,
        } = event
        else {
            return;
        };
        if *character_name != self.character {
            return;
        }
        let frame = self.player.lock().current_frame().cloned();
        self.sink.show_frame(*action_name, *mood_name, frame.as_ref());
    }

    fn advance_frame(&mut self) {
        let (playing, frame) = {
            let mut player = self.player.lock();
            let frame = player.next_frame().cloned();
            (player.now_playing(), frame)
        };
        if let Some((action, mood)) = playing {
            self.sink.show_frame(action, mood, frame.as_ref());
        }
    }
}

fn frame_interval(period: Duration) -> Interval {
    let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

async fn next_frame_tick(frames: &mut Option<Interval>) {
    match frames {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;
    use crate::controller::BehaviorSettings;
    use crate::pet::{PetModel, PetState};

    type Shown = (Action, Mood, Option<String>);

    struct ChannelSink(mpsc::UnboundedSender<Shown>);

    impl FrameSink for ChannelSink {
        fn show_frame(&mut self, action: Action, mood: Mood, frame: Option<&FrameHandle>) {
            let _ = self.0.send((action, mood, frame.map(ToString::to_string)));
        }
    }

    fn catalog() -> Arc<AnimationCatalog> {
        let mut catalog = AnimationCatalog::new(Duration::from_millis(10));
        let seq = |prefix: &str| -> Vec<FrameHandle> {
            (0..2).map(|i| FrameHandle::new(format!("{prefix}{i}"))).collect()
        };
        catalog.insert(Action::Idle, Mood::Normal, seq("idle")).unwrap();
        catalog.insert(Action::Work, Mood::Normal, seq("work")).unwrap();
        Arc::new(catalog)
    }

    fn runtime() -> (PetRuntime<ChannelSink>, mpsc::UnboundedReceiver<Shown>) {
        let bus = EventBus::new();
        let settings = BehaviorSettings {
            tick_interval: Duration::from_millis(5),
            encourage_probability: 0.0,
            ..BehaviorSettings::default()
        };
        let controller = BehaviorController::new(
            PetModel::new("Pipi", "cat", "cheerful"),
            settings,
            bus.publisher(),
            Instant::now(),
        )
        .with_seed(7);
        let (tx, rx) = mpsc::unbounded_channel();
        (PetRuntime::new(bus, controller, catalog(), ChannelSink(tx)), rx)
    }

    async fn wait_for<F>(rx: &mut mpsc::UnboundedReceiver<Shown>, mut pred: F) -> Shown
    where
        F: FnMut(&Shown) -> bool,
    {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let shown = rx.recv().await.expect("sink closed");
                if pred(&shown) {
                    return shown;
                }
            }
        })
        .await
        .expect("frame not shown in time")
    }

    #[tokio::test]
    async fn test_announces_and_cycles_frames() {
        let (runtime, mut rx) = runtime();
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(runtime.run(stop_rx));

        let first = wait_for(&mut rx, |_| true).await;
        assert_eq!(first, (Action::Idle, Mood::Normal, Some("idle0".to_string())));
        wait_for(&mut rx, |s| s.2.as_deref() == Some("idle1")).await;
        wait_for(&mut rx, |s| s.2.as_deref() == Some("idle0")).await;

        stop_tx.send_replace(true);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_events_reach_controller_and_player() {
        let (runtime, mut rx) = runtime();
        let publisher = runtime.publisher();
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(runtime.run(stop_rx));

        publisher.emit(Event::ProgrammingStarted {
            app: "code.exe".to_string(),
            title: String::new(),
        });

        let shown = wait_for(&mut rx, |s| s.0 == Action::Work).await;
        assert_eq!(shown, (Action::Work, Mood::Happy, Some("work0".to_string())));

        stop_tx.send_replace(true);
        let snapshot = task.await.unwrap();
        assert_eq!(snapshot.state, PetState::Working);
        assert_eq!(snapshot.action, Action::Work);
    }

    #[tokio::test]
    async fn test_unknown_sequence_falls_back_to_idle_frames() {
        let (runtime, mut rx) = runtime();
        let publisher = runtime.publisher();
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(runtime.run(stop_rx));

        publisher.emit(Event::interaction(crate::events::InteractionKind::Feed, None));
        let shown = wait_for(&mut rx, |s| s.0 == Action::Eat).await;
        // no Eat frames; the chain ends at (Idle, Normal)
        assert_eq!(shown.2.as_deref(), Some("idle0"));

        stop_tx.send_replace(true);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_stops_when_shutdown_sender_dropped() {
        let (runtime, _rx) = runtime();
        let controller = runtime.controller();
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(runtime.run(stop_rx));
        drop(stop_tx);

        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("runtime did not stop")
            .unwrap();
        assert!(controller.lock().is_shut_down());
        assert!(controller.lock().model().temporary().is_none());
    }
}

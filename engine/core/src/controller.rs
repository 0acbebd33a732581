//! Behavior Controller
//!
//! State machine that turns bus events into changes on the [`PetModel`] and
//! announces every change back onto the bus.
//!
//! # Design Philosophy
//!
//! The controller is the only writer of the pet model. It never blocks and
//! owns no timers: temporary actions are recorded with a deadline in the model
//! and one consolidated [`BehaviorController::tick`] (driven by the runtime)
//! checks expiry first and then, at a slower cadence, updates vitals.
//!
//! Every setter is change-detecting. A set that does not change anything
//! emits nothing; a set that does emits its `pet_*_changed` event and, for
//! mood and action, a `ui_play_animation` for the renderer.
//!
//! Randomness (encouragement pulses, keypress reactions, click moods, speech
//! lines) comes from a seedable [`StdRng`] so behavior is reproducible in
//! tests.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::bus::{EventHandler, EventPublisher, HandlerRegistry, HandlerResult};
use crate::events::{Event, EventKind, InteractionKind};
use crate::pet::{message_for, Action, MessageContext, Mood, PetModel, PetSnapshot, PetState};

/// Alert kind emitted when energy runs low while working
pub const LOW_ENERGY_ALERT: &str = "low_energy";

/// Keypress counts that are multiples of this get a surprised reaction
pub const KEYPRESS_SURPRISE_EVERY: u64 = 500;

/// Keypress counts that are multiples of this get a happy reaction
pub const KEYPRESS_HAPPY_EVERY: u64 = 300;

// =============================================================================
// Settings
// =============================================================================

/// How long each timed action lasts
#[derive(Clone, Debug, PartialEq)]
pub struct ActionDurations {
    /// Encouragement pulse when programming starts
    pub encourage: Duration,
    /// Tired slump after a long session
    pub tired: Duration,
    /// Happy bounce after a medium session
    pub happy: Duration,
    /// Rest after a short idle
    pub rest: Duration,
    /// Play when entering Idle with high vitals
    pub play: Duration,
    /// Reaction to a click
    pub react: Duration,
    /// Eating after a feed
    pub eat: Duration,
    /// Happy response to petting
    pub pet: Duration,
    /// Celebration for an achievement
    pub achievement: Duration,
    /// Celebration for a goal
    pub goal: Duration,
    /// Reaction to a keypress milestone
    pub keypress_reaction: Duration,
    /// Low-energy alert
    pub alert: Duration,
}

impl Default for ActionDurations {
    fn default() -> Self {
        Self {
            encourage: Duration::from_secs(3),
            tired: Duration::from_secs(5),
            happy: Duration::from_secs(5),
            rest: Duration::from_secs(10),
            play: Duration::from_secs(5),
            react: Duration::from_secs(1),
            eat: Duration::from_secs(3),
            pet: Duration::from_secs(2),
            achievement: Duration::from_secs(5),
            goal: Duration::from_secs(3),
            keypress_reaction: Duration::from_secs(2),
            alert: Duration::from_secs(5),
        }
    }
}

/// Tunables for the behavior state machine
#[derive(Clone, Debug, PartialEq)]
pub struct BehaviorSettings {
    /// Cadence of the expiry check
    pub tick_interval: Duration,
    /// Cadence of the vitals update
    pub vitals_interval: Duration,

    /// Above this energy a working pet is happy and an idle pet may play
    pub high_energy_threshold: f32,
    /// Below this energy a working pet is tired and an idle pet rests
    pub low_energy_threshold: f32,
    /// Below this energy a working pet raises an alert
    pub alert_energy_threshold: f32,
    /// Vitals recomputation: below this energy the mood is Tired
    pub tired_mood_threshold: f32,
    /// Vitals recomputation: below this happiness the mood is Sad
    pub sad_mood_threshold: f32,
    /// Vitals recomputation: above this the mood turns Happy or Playful
    pub cheerful_threshold: f32,
    /// Happiness needed (with high energy) to play when entering Idle
    pub playful_threshold: f32,

    /// Sessions longer than this end tired (seconds)
    pub long_session_secs: f64,
    /// Sessions longer than this end happy (seconds)
    pub medium_session_secs: f64,
    /// Idle longer than this puts the pet to sleep (seconds)
    pub deep_idle_secs: f64,

    /// Energy lost per vitals tick while working
    pub energy_decay_working: f32,
    /// Energy regained per vitals tick while idle
    pub energy_regen_idle: f32,
    /// Energy regained per vitals tick while sleeping
    pub energy_regen_sleeping: f32,
    /// Happiness lost per vitals tick while working
    pub happiness_decay_working: f32,
    /// Happiness lost per vitals tick while idle and not playful
    pub happiness_decay_bored: f32,
    /// Happiness regained per vitals tick while idle and playful
    pub happiness_regen_playful: f32,
    /// Happiness regained per vitals tick while sleeping
    pub happiness_regen_sleeping: f32,

    /// Chance of an encouragement pulse when programming starts
    pub encourage_probability: f64,
    /// Keypress counts are considered for a reaction every this many presses
    pub keypress_reaction_interval: u64,
    /// Chance of reacting at a considered keypress count
    pub keypress_reaction_probability: f64,

    /// Happiness gained from a click
    pub click_happiness_gain: f32,
    /// Energy gained from a feed
    pub feed_energy_gain: f32,
    /// Happiness gained from a feed
    pub feed_happiness_gain: f32,
    /// Energy gained from petting
    pub pet_energy_gain: f32,
    /// Happiness gained from petting
    pub pet_happiness_gain: f32,

    /// Timed action lengths
    pub durations: ActionDurations,
}

impl Default for BehaviorSettings {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(200),
            vitals_interval: Duration::from_secs(10),
            high_energy_threshold: 70.0,
            low_energy_threshold: 30.0,
            alert_energy_threshold: 20.0,
            tired_mood_threshold: 20.0,
            sad_mood_threshold: 20.0,
            cheerful_threshold: 80.0,
            playful_threshold: 70.0,
            long_session_secs: 3600.0,
            medium_session_secs: 1800.0,
            deep_idle_secs: 1800.0,
            energy_decay_working: 2.0,
            energy_regen_idle: 1.0,
            energy_regen_sleeping: 3.0,
            happiness_decay_working: 1.0,
            happiness_decay_bored: 0.5,
            happiness_regen_playful: 1.0,
            happiness_regen_sleeping: 0.5,
            encourage_probability: 0.3,
            keypress_reaction_interval: 100,
            keypress_reaction_probability: 0.3,
            click_happiness_gain: 2.0,
            feed_energy_gain: 20.0,
            feed_happiness_gain: 10.0,
            pet_energy_gain: 5.0,
            pet_happiness_gain: 5.0,
            durations: ActionDurations::default(),
        }
    }
}

// =============================================================================
// Controller
// =============================================================================

/// The behavior state machine
pub struct BehaviorController {
    model: PetModel,
    settings: BehaviorSettings,
    publisher: EventPublisher,
    rng: StdRng,
    last_vitals_tick: Instant,
    shut_down: bool,
}

impl BehaviorController {
    /// Create a controller; `now` starts the vitals clock
    pub fn new(
        model: PetModel,
        settings: BehaviorSettings,
        publisher: EventPublisher,
        now: Instant,
    ) -> Self {
        tracing::info!(
            name = model.name(),
            species = model.species(),
            personality = model.personality(),
            "Behavior controller created"
        );
        Self {
            model,
            settings,
            publisher,
            rng: StdRng::from_entropy(),
            last_vitals_tick: now,
            shut_down: false,
        }
    }

    /// Use a fixed seed for every random decision
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// The pet
    pub fn model(&self) -> &PetModel {
        &self.model
    }

    /// Active tunables
    pub fn settings(&self) -> &BehaviorSettings {
        &self.settings
    }

    /// Snapshot of the pet
    pub fn snapshot(&self) -> PetSnapshot {
        self.model.snapshot()
    }

    /// Whether [`shutdown`](Self::shutdown) has run
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    // =========================================================================
    // Setters
    // =========================================================================

    /// Change the state; emits `pet_state_changed` on change
    pub fn set_state(&mut self, state: PetState) -> bool {
        let Some(previous) = self.model.set_state(state) else {
            return false;
        };
        tracing::info!(previous = %previous, current = %state, "Pet state changed");
        self.publisher.emit(Event::PetStateChanged {
            previous,
            current: state,
        });
        true
    }

    /// Change the mood; emits `pet_mood_changed` and `ui_play_animation` on change
    pub fn set_mood(&mut self, mood: Mood) -> bool {
        let Some(previous) = self.model.set_mood(mood) else {
            return false;
        };
        tracing::debug!(previous = %previous, current = %mood, "Pet mood changed");
        self.publisher.emit(Event::PetMoodChanged {
            previous,
            current: mood,
        });
        self.play_animation();
        true
    }

    /// Change the action, timed when `duration` is given
    ///
    /// Any outstanding temporary record is replaced, even when the action
    /// itself does not change. Emits `pet_action_changed` and
    /// `ui_play_animation` on change.
    pub fn set_action(&mut self, action: Action, duration: Option<Duration>, now: Instant) -> bool {
        let expires_at = duration.map(|d| now + d);
        let Some(previous) = self.model.set_action(action, expires_at) else {
            return false;
        };
        tracing::debug!(
            previous = %previous,
            current = %action,
            timed = ?duration,
            "Pet action changed"
        );
        self.publisher.emit(Event::PetActionChanged {
            previous,
            current: action,
        });
        self.play_animation();
        true
    }

    /// Change the state and apply that state's default mood and action
    pub fn enter_state(&mut self, state: PetState, now: Instant) {
        self.set_state(state);
        match state {
            PetState::Working => {
                self.set_mood(self.working_mood());
                self.set_action(Action::Work, None, now);
            }
            PetState::Idle => {
                self.set_mood(self.idle_mood());
                self.apply_idle_action(now);
            }
            PetState::Sleeping => {
                self.set_mood(Mood::Sleepy);
                self.set_action(Action::Sleep, None, now);
            }
        }
    }

    /// Announce the current appearance and vitals (startup)
    pub fn announce(&self) {
        self.play_animation();
        self.publish_stats();
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// React to one bus event
    pub fn handle_event(&mut self, event: &Event, now: Instant) {
        if self.shut_down {
            tracing::debug!(event = event.name(), "Controller shut down, ignoring event");
            return;
        }

        match event {
            Event::ProgrammingStarted { app, .. } => self.on_programming_started(app, now),
            Event::ProgrammingEnded { duration, .. } => self.on_programming_ended(*duration, now),
            Event::ProgrammingIdle { idle_time, .. } => self.on_programming_idle(*idle_time, now),
            Event::Keypress { count, .. } => self.on_keypress(*count, now),
            Event::PetInteraction { kind, .. } => self.on_interaction(kind, now),
            Event::AchievementUnlocked { name } => {
                tracing::info!(achievement = ?name, "Achievement unlocked");
                self.set_mood(Mood::Excited);
                self.set_action(Action::Celebrate, Some(self.settings.durations.achievement), now);
            }
            Event::GoalReached { name } => {
                tracing::info!(goal = ?name, "Goal reached");
                self.set_mood(Mood::Happy);
                self.set_action(Action::Celebrate, Some(self.settings.durations.goal), now);
            }
            other => tracing::trace!(event = other.name(), "Not a controller event"),
        }
    }

    fn on_programming_started(&mut self, app: &str, now: Instant) {
        tracing::info!(app, "Programming started");
        self.set_state(PetState::Working);
        self.set_mood(self.working_mood());
        self.set_action(Action::Work, None, now);

        if self.roll(self.settings.encourage_probability) {
            self.set_action(Action::Encourage, Some(self.settings.durations.encourage), now);
        }
    }

    fn on_programming_ended(&mut self, duration: f64, now: Instant) {
        tracing::info!(duration_secs = duration, "Programming ended");
        self.set_state(PetState::Idle);

        if duration > self.settings.long_session_secs {
            self.set_mood(Mood::Tired);
            self.set_action(Action::Tired, Some(self.settings.durations.tired), now);
        } else if duration > self.settings.medium_session_secs {
            self.set_mood(Mood::Happy);
            self.set_action(Action::Happy, Some(self.settings.durations.happy), now);
        } else {
            self.set_mood(self.idle_mood());
            self.apply_idle_action(now);
        }
    }

    fn on_programming_idle(&mut self, idle_time: f64, now: Instant) {
        if idle_time > self.settings.deep_idle_secs {
            tracing::info!(idle_secs = idle_time, "User away, pet falls asleep");
            self.enter_state(PetState::Sleeping, now);
        } else if self.model.state() == PetState::Working {
            tracing::info!(idle_secs = idle_time, "User idle, pet rests");
            self.set_state(PetState::Idle);
            self.set_mood(Mood::Relaxed);
            self.set_action(Action::Rest, Some(self.settings.durations.rest), now);
        } else {
            tracing::debug!(
                idle_secs = idle_time,
                state = %self.model.state(),
                "Short idle outside a session, ignoring"
            );
        }
    }

    fn on_keypress(&mut self, count: u64, now: Instant) {
        if self.model.state() != PetState::Working {
            return;
        }
        let every = self.settings.keypress_reaction_interval;
        if every == 0 || count == 0 || count % every != 0 {
            return;
        }
        if !self.roll(self.settings.keypress_reaction_probability) {
            return;
        }

        let reaction = if count % KEYPRESS_SURPRISE_EVERY == 0 {
            Action::Surprised
        } else if count % KEYPRESS_HAPPY_EVERY == 0 {
            Action::Happy
        } else {
            Action::Encourage
        };
        tracing::debug!(count, reaction = %reaction, "Keypress milestone");
        self.set_action(reaction, Some(self.settings.durations.keypress_reaction), now);
    }

    fn on_interaction(&mut self, kind: &InteractionKind, now: Instant) {
        let sleeping = self.model.state() == PetState::Sleeping;
        match kind {
            InteractionKind::Click if sleeping => {
                tracing::info!("Pet woken up by a click");
                self.set_state(PetState::Idle);
                self.apply_idle_action(now);
            }
            InteractionKind::Click => {
                let mood = if self.rng.gen_bool(0.5) {
                    Mood::Excited
                } else {
                    Mood::Playful
                };
                self.set_mood(mood);
                self.set_action(Action::React, Some(self.settings.durations.react), now);
                self.model.adjust_happiness(self.settings.click_happiness_gain);
                self.publish_stats();
            }
            InteractionKind::Feed | InteractionKind::Pet if sleeping => {
                tracing::debug!(interaction = kind.as_str(), "Pet is asleep, ignoring");
            }
            InteractionKind::Feed => {
                self.set_mood(Mood::Happy);
                self.set_action(Action::Eat, Some(self.settings.durations.eat), now);
                self.model.adjust_energy(self.settings.feed_energy_gain);
                self.model.adjust_happiness(self.settings.feed_happiness_gain);
                self.publish_stats();
            }
            InteractionKind::Pet => {
                self.set_mood(Mood::Happy);
                self.set_action(Action::Happy, Some(self.settings.durations.pet), now);
                self.model.adjust_energy(self.settings.pet_energy_gain);
                self.model.adjust_happiness(self.settings.pet_happiness_gain);
                self.publish_stats();
            }
            InteractionKind::Other(name) => {
                tracing::warn!(interaction = name.as_str(), "Unknown interaction type, ignoring");
            }
        }
    }

    // =========================================================================
    // Periodic work
    // =========================================================================

    /// Expiry check, then vitals if their interval has elapsed
    pub fn tick(&mut self, now: Instant) {
        if self.shut_down {
            return;
        }
        self.check_expiry(now);

        if now.saturating_duration_since(self.last_vitals_tick) >= self.settings.vitals_interval {
            self.last_vitals_tick = now;
            self.update_vitals(now);
        }
    }

    /// Clear a lapsed temporary record; revert to Idle if it is still current
    pub fn check_expiry(&mut self, now: Instant) -> bool {
        let Some(expired) = self.model.take_expired(now) else {
            return false;
        };
        if self.model.action() != expired.action {
            tracing::debug!(
                expired = %expired.action,
                current = %self.model.action(),
                "Stale temporary record dropped"
            );
            return false;
        }
        tracing::debug!(action = %expired.action, "Temporary action expired");
        self.set_action(Action::Idle, None, now)
    }

    /// Decay or regenerate vitals, recompute mood, maybe alert
    pub fn update_vitals(&mut self, now: Instant) {
        let s = &self.settings;
        let (energy_delta, happiness_delta) = match self.model.state() {
            PetState::Working => (-s.energy_decay_working, -s.happiness_decay_working),
            PetState::Idle if self.model.mood() == Mood::Playful => {
                (s.energy_regen_idle, s.happiness_regen_playful)
            }
            PetState::Idle => (s.energy_regen_idle, -s.happiness_decay_bored),
            PetState::Sleeping => (s.energy_regen_sleeping, s.happiness_regen_sleeping),
        };
        let energy = self.model.adjust_energy(energy_delta);
        let happiness = self.model.adjust_happiness(happiness_delta);
        tracing::trace!(energy, happiness, "Vitals updated");

        if let Some(mood) = self.derived_mood() {
            self.set_mood(mood);
        }

        if self.model.state() == PetState::Working
            && energy < self.settings.alert_energy_threshold
            && self.model.action() != Action::Alert
        {
            self.raise_low_energy_alert(now);
        }

        self.publish_stats();
    }

    /// Stop reacting; clears any pending temporary record
    pub fn shutdown(&mut self) {
        if let Some(record) = self.model.clear_temporary() {
            tracing::debug!(action = %record.action, "Cleared pending temporary action");
        }
        self.shut_down = true;
        tracing::info!(
            energy = self.model.energy(),
            happiness = self.model.happiness(),
            mood = %self.model.mood(),
            "Behavior controller stopped"
        );
    }

    /// A speech line for `context` in the pet's personality and mood
    pub fn message(&mut self, context: MessageContext) -> &'static str {
        message_for(self.model.personality(), context, self.model.mood(), &mut self.rng)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn raise_low_energy_alert(&mut self, now: Instant) {
        self.set_action(Action::Alert, Some(self.settings.durations.alert), now);
        let message = self.message(MessageContext::Rest).to_string();
        tracing::info!(energy = self.model.energy(), "Low energy alert");
        self.publisher.emit(Event::PetAlert {
            kind: LOW_ENERGY_ALERT.to_string(),
            message,
        });
    }

    fn working_mood(&self) -> Mood {
        let energy = self.model.energy();
        if energy > self.settings.high_energy_threshold {
            Mood::Happy
        } else if energy < self.settings.low_energy_threshold {
            Mood::Tired
        } else {
            Mood::Normal
        }
    }

    fn is_lively(&self) -> bool {
        self.model.energy() > self.settings.high_energy_threshold
            && self.model.happiness() > self.settings.playful_threshold
    }

    fn idle_mood(&self) -> Mood {
        if self.is_lively() {
            Mood::Playful
        } else if self.model.energy() < self.settings.low_energy_threshold {
            Mood::Tired
        } else {
            Mood::Relaxed
        }
    }

    fn apply_idle_action(&mut self, now: Instant) {
        if self.is_lively() {
            self.set_action(Action::Play, Some(self.settings.durations.play), now);
        } else if self.model.energy() < self.settings.low_energy_threshold {
            self.set_action(Action::Rest, None, now);
        } else {
            self.set_action(Action::Idle, None, now);
        }
    }

    /// Mood implied by vitals; `None` keeps the current mood
    fn derived_mood(&self) -> Option<Mood> {
        let energy = self.model.energy();
        let happiness = self.model.happiness();
        let s = &self.settings;

        if energy < s.tired_mood_threshold {
            Some(Mood::Tired)
        } else if happiness < s.sad_mood_threshold {
            Some(Mood::Sad)
        } else if self.model.state() == PetState::Sleeping {
            Some(Mood::Sleepy)
        } else if energy > s.cheerful_threshold {
            Some(match self.model.state() {
                PetState::Working => Mood::Happy,
                _ => Mood::Playful,
            })
        } else if happiness > s.cheerful_threshold {
            Some(Mood::Happy)
        } else if self.model.mood().is_negative() {
            None
        } else {
            Some(Mood::Normal)
        }
    }

    fn roll(&mut self, probability: f64) -> bool {
        probability > 0.0 && self.rng.gen_bool(probability.min(1.0))
    }

    fn play_animation(&self) {
        self.publisher.emit(Event::UiPlayAnimation {
            character_name: self.model.species().to_string(),
            action_name: self.model.action(),
            mood_name: self.model.mood(),
        });
    }

    fn publish_stats(&self) {
        self.publisher.emit(Event::PetStatsUpdated(self.model.snapshot()));
    }
}

// =============================================================================
// Bus adapter
// =============================================================================

/// Routes controller events from the bus into a shared controller
pub struct ControllerHandler {
    controller: Arc<Mutex<BehaviorController>>,
}

impl ControllerHandler {
    /// Events the controller consumes
    pub const EVENTS: [EventKind; 7] = [
        EventKind::ProgrammingStarted,
        EventKind::ProgrammingEnded,
        EventKind::ProgrammingIdle,
        EventKind::Keypress,
        EventKind::PetInteraction,
        EventKind::AchievementUnlocked,
        EventKind::GoalReached,
    ];

    /// Register a handler for `controller` on every consumed event
    pub fn attach(
        registry: &HandlerRegistry,
        controller: Arc<Mutex<BehaviorController>>,
    ) -> Arc<dyn EventHandler> {
        let handler: Arc<dyn EventHandler> = Arc::new(Self { controller });
        registry.register_all(&Self::EVENTS, &handler);
        handler
    }
}

impl EventHandler for ControllerHandler {
    fn name(&self) -> &str {
        "behavior-controller"
    }

    fn handle(&self, event: &Event) -> HandlerResult {
        self.controller.lock().handle_event(event, Instant::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::bus::EventBus;

    fn quiet_settings() -> BehaviorSettings {
        BehaviorSettings {
            encourage_probability: 0.0,
            keypress_reaction_probability: 0.0,
            ..BehaviorSettings::default()
        }
    }

    fn setup(energy: f32, happiness: f32) -> (BehaviorController, EventBus, Instant) {
        setup_with(energy, happiness, quiet_settings())
    }

    fn setup_with(
        energy: f32,
        happiness: f32,
        settings: BehaviorSettings,
    ) -> (BehaviorController, EventBus, Instant) {
        let bus = EventBus::new();
        let t0 = Instant::now();
        let model = PetModel::new("Pipi", "cat", "cheerful").with_vitals(energy, happiness);
        let controller = BehaviorController::new(model, settings, bus.publisher(), t0).with_seed(7);
        (controller, bus, t0)
    }

    fn drain(bus: &mut EventBus) -> Vec<Event> {
        std::iter::from_fn(|| bus.try_next_event()).collect()
    }

    fn started() -> Event {
        Event::ProgrammingStarted {
            app: "code.exe".to_string(),
            title: "main.rs".to_string(),
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_programming_started_with_full_energy() {
        let (mut c, mut bus, t0) = setup(100.0, 60.0);
        c.handle_event(&started(), t0);

        assert_eq!(c.model().state(), PetState::Working);
        assert_eq!(c.model().mood(), Mood::Happy);
        assert_eq!(c.model().action(), Action::Work);
        assert_eq!(c.model().temporary(), None);

        let events = drain(&mut bus);
        assert!(events.contains(&Event::PetStateChanged {
            previous: PetState::Idle,
            current: PetState::Working,
        }));
        assert!(events.contains(&Event::UiPlayAnimation {
            character_name: "cat".to_string(),
            action_name: Action::Work,
            mood_name: Mood::Happy,
        }));
    }

    #[test]
    fn test_programming_started_low_energy_is_tired() {
        let (mut c, _bus, t0) = setup(25.0, 60.0);
        c.handle_event(&started(), t0);
        assert_eq!(c.model().mood(), Mood::Tired);
    }

    #[test]
    fn test_encourage_pulse_when_probability_is_one() {
        let settings = BehaviorSettings {
            encourage_probability: 1.0,
            ..quiet_settings()
        };
        let (mut c, _bus, t0) = setup_with(50.0, 50.0, settings);
        c.handle_event(&started(), t0);

        assert_eq!(c.model().state(), PetState::Working);
        assert_eq!(c.model().action(), Action::Encourage);
        let record = c.model().temporary().unwrap();
        assert_eq!(record.expires_at, t0 + Duration::from_secs(3));
    }

    #[test]
    fn test_same_mood_twice_emits_once() {
        let (mut c, mut bus, _t0) = setup(50.0, 50.0);
        assert!(c.set_mood(Mood::Happy));
        assert!(!c.set_mood(Mood::Happy));

        let mood_changes = drain(&mut bus)
            .into_iter()
            .filter(|e| e.kind() == EventKind::PetMoodChanged)
            .count();
        assert_eq!(mood_changes, 1);
    }

    #[test]
    fn test_noop_set_emits_nothing() {
        let (mut c, mut bus, t0) = setup(50.0, 50.0);
        assert!(!c.set_state(PetState::Idle));
        assert!(!c.set_action(Action::Idle, None, t0));
        assert!(drain(&mut bus).is_empty());
    }

    #[test]
    fn test_temporary_work_reverts_to_idle_after_ticks() {
        let (mut c, _bus, t0) = setup(50.0, 50.0);
        c.set_action(Action::Work, Some(Duration::from_secs(3)), t0);

        for step in 1..15 {
            c.tick(t0 + ms(200) * step);
            assert_eq!(c.model().action(), Action::Work);
        }
        c.tick(t0 + ms(200) * 15);
        assert_eq!(c.model().action(), Action::Idle);
        assert_eq!(c.model().temporary(), None);
    }

    #[test]
    fn test_late_expiry_never_overrides_newer_action() {
        let (mut c, _bus, t0) = setup(50.0, 50.0);
        c.set_action(Action::Eat, Some(Duration::from_secs(3)), t0);
        c.set_action(Action::Work, None, t0 + Duration::from_secs(1));

        c.tick(t0 + Duration::from_secs(4));
        assert_eq!(c.model().action(), Action::Work);

        c.set_action(Action::Eat, Some(Duration::from_secs(3)), t0);
        c.set_action(Action::React, Some(Duration::from_secs(5)), t0 + Duration::from_secs(1));
        c.tick(t0 + Duration::from_secs(3));
        assert_eq!(c.model().action(), Action::React);
        c.tick(t0 + Duration::from_secs(6));
        assert_eq!(c.model().action(), Action::Idle);
    }

    #[test]
    fn test_long_session_ends_tired_then_idle() {
        let (mut c, _bus, t0) = setup(100.0, 60.0);
        c.handle_event(&started(), t0);
        c.handle_event(
            &Event::ProgrammingEnded {
                app: "code.exe".to_string(),
                title: String::new(),
                duration: 4000.0,
            },
            t0,
        );

        assert_eq!(c.model().state(), PetState::Idle);
        assert_eq!(c.model().mood(), Mood::Tired);
        assert_eq!(c.model().action(), Action::Tired);
        assert!(c.model().temporary().is_some());

        c.tick(t0 + Duration::from_secs(5));
        assert_eq!(c.model().action(), Action::Idle);
    }

    #[test]
    fn test_medium_session_ends_happy() {
        let (mut c, _bus, t0) = setup(60.0, 60.0);
        c.handle_event(&started(), t0);
        c.handle_event(
            &Event::ProgrammingEnded {
                app: String::new(),
                title: String::new(),
                duration: 2000.0,
            },
            t0,
        );
        assert_eq!(c.model().mood(), Mood::Happy);
        assert_eq!(c.model().action(), Action::Happy);
    }

    #[test]
    fn test_short_session_applies_idle_defaults() {
        let (mut c, _bus, t0) = setup(90.0, 90.0);
        c.handle_event(&started(), t0);
        c.handle_event(
            &Event::ProgrammingEnded {
                app: String::new(),
                title: String::new(),
                duration: 60.0,
            },
            t0,
        );
        assert_eq!(c.model().state(), PetState::Idle);
        assert_eq!(c.model().mood(), Mood::Playful);
        assert_eq!(c.model().action(), Action::Play);
    }

    #[test]
    fn test_deep_idle_always_sleeps() {
        for energy in [5.0, 50.0, 100.0] {
            let (mut c, _bus, t0) = setup(energy, 50.0);
            c.handle_event(&started(), t0);
            c.set_mood(Mood::Excited);
            c.handle_event(
                &Event::ProgrammingIdle {
                    idle_time: 1801.0,
                    duration: 120.0,
                },
                t0,
            );
            assert_eq!(c.model().state(), PetState::Sleeping);
            assert_eq!(c.model().mood(), Mood::Sleepy);
            assert_eq!(c.model().action(), Action::Sleep);
        }
    }

    #[test]
    fn test_short_idle_while_working_rests() {
        let (mut c, _bus, t0) = setup(50.0, 50.0);
        c.handle_event(&started(), t0);
        c.handle_event(
            &Event::ProgrammingIdle {
                idle_time: 400.0,
                duration: 120.0,
            },
            t0,
        );
        assert_eq!(c.model().state(), PetState::Idle);
        assert_eq!(c.model().mood(), Mood::Relaxed);
        assert_eq!(c.model().action(), Action::Rest);
        assert!(c.model().temporary().is_some());
    }

    #[test]
    fn test_short_idle_outside_session_is_ignored() {
        let (mut c, mut bus, t0) = setup(50.0, 50.0);
        c.handle_event(
            &Event::ProgrammingIdle {
                idle_time: 400.0,
                duration: 0.0,
            },
            t0,
        );
        assert_eq!(c.model().state(), PetState::Idle);
        assert!(drain(&mut bus).is_empty());
    }

    #[test]
    fn test_click_wakes_sleeping_pet_without_touching_mood() {
        let (mut c, _bus, t0) = setup(50.0, 50.0);
        c.enter_state(PetState::Sleeping, t0);
        c.handle_event(&Event::interaction(InteractionKind::Click, None), t0);

        assert_eq!(c.model().state(), PetState::Idle);
        assert_eq!(c.model().mood(), Mood::Sleepy);
        assert_eq!(c.model().action(), Action::Idle);
    }

    #[test]
    fn test_click_reacts_when_awake() {
        let (mut c, _bus, t0) = setup(50.0, 50.0);
        c.handle_event(&Event::interaction(InteractionKind::Click, None), t0);

        assert_eq!(c.model().action(), Action::React);
        assert!(matches!(c.model().mood(), Mood::Excited | Mood::Playful));
        assert_eq!(c.model().happiness(), 52.0);
    }

    #[test]
    fn test_feed_ignored_while_sleeping() {
        let (mut c, _bus, t0) = setup(50.0, 50.0);
        c.enter_state(PetState::Sleeping, t0);
        c.handle_event(&Event::interaction(InteractionKind::Feed, None), t0);
        assert_eq!(c.model().action(), Action::Sleep);
        assert_eq!(c.model().energy(), 50.0);
    }

    #[test]
    fn test_feed_clamps_vitals() {
        let (mut c, mut bus, t0) = setup(90.0, 95.0);
        c.handle_event(&Event::interaction(InteractionKind::Feed, None), t0);

        assert_eq!(c.model().action(), Action::Eat);
        assert_eq!(c.model().mood(), Mood::Happy);
        assert_eq!(c.model().energy(), 100.0);
        assert_eq!(c.model().happiness(), 100.0);
        assert!(drain(&mut bus)
            .iter()
            .any(|e| matches!(e, Event::PetStatsUpdated(s) if s.energy == 100.0)));
    }

    #[test]
    fn test_petting_makes_pet_happy() {
        let (mut c, _bus, t0) = setup(50.0, 50.0);
        c.handle_event(&Event::interaction(InteractionKind::Pet, None), t0);
        assert_eq!(c.model().action(), Action::Happy);
        assert_eq!(c.model().energy(), 55.0);
        assert_eq!(c.model().happiness(), 55.0);
    }

    #[test]
    fn test_unknown_interaction_is_ignored() {
        let (mut c, mut bus, t0) = setup(50.0, 50.0);
        c.handle_event(
            &Event::interaction(InteractionKind::Other("tickle".to_string()), None),
            t0,
        );
        assert!(drain(&mut bus).is_empty());
    }

    #[test]
    fn test_achievement_and_goal_celebrate() {
        let (mut c, _bus, t0) = setup(50.0, 50.0);
        c.handle_event(&Event::AchievementUnlocked { name: None }, t0);
        assert_eq!(c.model().mood(), Mood::Excited);
        assert_eq!(c.model().action(), Action::Celebrate);
        assert_eq!(
            c.model().temporary().map(|r| r.expires_at),
            Some(t0 + Duration::from_secs(5))
        );

        c.handle_event(&Event::GoalReached { name: None }, t0);
        assert_eq!(c.model().mood(), Mood::Happy);
        assert_eq!(
            c.model().temporary().map(|r| r.expires_at),
            Some(t0 + Duration::from_secs(3))
        );
    }

    #[test]
    fn test_keypress_milestones() {
        let settings = BehaviorSettings {
            keypress_reaction_probability: 1.0,
            ..quiet_settings()
        };
        let (mut c, _bus, t0) = setup_with(50.0, 50.0, settings);
        let key = |count| Event::Keypress {
            key: "a".to_string(),
            count,
            timestamp: 0.0,
        };

        c.handle_event(&key(100), t0);
        assert_eq!(c.model().action(), Action::Idle);

        c.handle_event(&started(), t0);
        c.handle_event(&key(150), t0);
        assert_eq!(c.model().action(), Action::Work);

        c.handle_event(&key(100), t0);
        assert_eq!(c.model().action(), Action::Encourage);
        c.handle_event(&key(300), t0);
        assert_eq!(c.model().action(), Action::Happy);
        c.handle_event(&key(500), t0);
        assert_eq!(c.model().action(), Action::Surprised);
    }

    #[test]
    fn test_vitals_tick_decays_while_working() {
        let (mut c, _bus, t0) = setup(50.0, 50.0);
        c.handle_event(&started(), t0);

        c.tick(t0 + Duration::from_secs(5));
        assert_eq!(c.model().energy(), 50.0);

        c.tick(t0 + Duration::from_secs(10));
        assert_eq!(c.model().energy(), 48.0);
        assert_eq!(c.model().happiness(), 49.0);
    }

    #[test]
    fn test_low_energy_alert_fires_once() {
        let (mut c, mut bus, t0) = setup(21.0, 50.0);
        c.handle_event(&started(), t0);
        drain(&mut bus);

        c.tick(t0 + Duration::from_secs(10));
        assert_eq!(c.model().action(), Action::Alert);
        assert_eq!(c.model().mood(), Mood::Tired);
        let alerts: Vec<_> = drain(&mut bus)
            .into_iter()
            .filter(|e| matches!(e, Event::PetAlert { kind, .. } if kind == LOW_ENERGY_ALERT))
            .collect();
        assert_eq!(alerts.len(), 1);

        c.tick(t0 + Duration::from_secs(12));
        assert!(!drain(&mut bus)
            .iter()
            .any(|e| e.kind() == EventKind::PetAlert));
    }

    #[test]
    fn test_negative_mood_survives_neutral_vitals() {
        let (mut c, _bus, t0) = setup(50.0, 50.0);
        c.set_mood(Mood::Sad);
        c.tick(t0 + Duration::from_secs(10));
        assert_eq!(c.model().mood(), Mood::Sad);

        c.set_mood(Mood::Relaxed);
        c.tick(t0 + Duration::from_secs(20));
        assert_eq!(c.model().mood(), Mood::Normal);
    }

    #[test]
    fn test_sleeping_regenerates_fastest() {
        let (mut c, _bus, t0) = setup(40.0, 40.0);
        c.enter_state(PetState::Sleeping, t0);
        c.tick(t0 + Duration::from_secs(10));
        assert_eq!(c.model().energy(), 43.0);
        assert_eq!(c.model().mood(), Mood::Sleepy);
    }

    #[test]
    fn test_shutdown_clears_temporary_and_stops_ticks() {
        let (mut c, _bus, t0) = setup(50.0, 50.0);
        c.set_action(Action::Eat, Some(Duration::from_secs(1)), t0);
        c.shutdown();

        assert!(c.is_shut_down());
        assert_eq!(c.model().temporary(), None);
        c.tick(t0 + Duration::from_secs(30));
        assert_eq!(c.model().action(), Action::Eat);
        assert_eq!(c.model().energy(), 50.0);
    }

    #[test]
    fn test_handler_routes_bus_events() {
        let mut bus = EventBus::new();
        let controller = Arc::new(Mutex::new(BehaviorController::new(
            PetModel::new("Pipi", "cat", "cheerful"),
            quiet_settings(),
            bus.publisher(),
            Instant::now(),
        )));
        ControllerHandler::attach(&bus.registry(), Arc::clone(&controller));

        bus.emit(started());
        bus.dispatch_pending();
        assert_eq!(controller.lock().model().state(), PetState::Working);
    }
}

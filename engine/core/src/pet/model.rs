//! The Pet Model
//!
//! Plain data plus invariants. The controller is the only writer; every other
//! component sees the pet through [`PetSnapshot`]s carried on the bus.
//!
//! Invariants held here:
//! - `energy` and `happiness` stay within [`VITAL_MIN`]..=[`VITAL_MAX`]
//! - at most one [`TemporaryAction`] is outstanding
//! - any action change clears the outstanding record before a new one is
//!   installed, so a recorded action always equals the current action when
//!   it is created

use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::{Action, Mood, PetState};

/// Lower bound for energy and happiness
pub const VITAL_MIN: f32 = 0.0;
/// Upper bound for energy and happiness
pub const VITAL_MAX: f32 = 100.0;

fn clamp_vital(value: f32) -> f32 {
    if value.is_nan() {
        VITAL_MIN
    } else {
        value.clamp(VITAL_MIN, VITAL_MAX)
    }
}

/// A timed action waiting for the expiry tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TemporaryAction {
    /// Action that was set with a duration
    pub action: Action,
    /// When the expiry tick may revert it
    pub expires_at: Instant,
}

impl TemporaryAction {
    /// Whether the record has lapsed at `now`
    #[must_use]
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Full behavioral state of one pet
#[derive(Clone, Debug)]
pub struct PetModel {
    name: String,
    species: String,
    personality: String,
    state: PetState,
    mood: Mood,
    action: Action,
    energy: f32,
    happiness: f32,
    temporary: Option<TemporaryAction>,
}

impl PetModel {
    /// Create a pet with full energy and moderate happiness
    pub fn new(
        name: impl Into<String>,
        species: impl Into<String>,
        personality: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            species: species.into(),
            personality: personality.into(),
            state: PetState::Idle,
            mood: Mood::Normal,
            action: Action::Idle,
            energy: VITAL_MAX,
            happiness: 60.0,
            temporary: None,
        }
    }

    /// Set both vitals at construction time
    #[must_use]
    pub fn with_vitals(mut self, energy: f32, happiness: f32) -> Self {
        self.energy = clamp_vital(energy);
        self.happiness = clamp_vital(happiness);
        self
    }

    /// Set the starting mood and action at construction time
    #[must_use]
    pub fn with_appearance(mut self, mood: Mood, action: Action) -> Self {
        self.mood = mood;
        self.action = action;
        self
    }

    /// Pet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Character/species; also the asset directory name
    pub fn species(&self) -> &str {
        &self.species
    }

    /// Personality key used for message selection
    pub fn personality(&self) -> &str {
        &self.personality
    }

    /// Current coarse state
    pub fn state(&self) -> PetState {
        self.state
    }

    /// Current mood
    pub fn mood(&self) -> Mood {
        self.mood
    }

    /// Current action
    pub fn action(&self) -> Action {
        self.action
    }

    /// Current energy
    pub fn energy(&self) -> f32 {
        self.energy
    }

    /// Current happiness
    pub fn happiness(&self) -> f32 {
        self.happiness
    }

    /// Outstanding temporary record, if any
    pub fn temporary(&self) -> Option<TemporaryAction> {
        self.temporary
    }

    /// Set the state; returns the previous one if it changed
    pub fn set_state(&mut self, state: PetState) -> Option<PetState> {
        (self.state != state).then(|| std::mem::replace(&mut self.state, state))
    }

    /// Set the mood; returns the previous one if it changed
    pub fn set_mood(&mut self, mood: Mood) -> Option<Mood> {
        (self.mood != mood).then(|| std::mem::replace(&mut self.mood, mood))
    }

    /// Set the action, optionally timed
    ///
    /// Clears any outstanding temporary record first, then installs a new
    /// one when `expires_at` is given. The record is replaced even when the
    /// action itself is unchanged, which restarts its timer. Returns the
    /// previous action if it changed.
    pub fn set_action(&mut self, action: Action, expires_at: Option<Instant>) -> Option<Action> {
        self.temporary = None;
        let previous = (self.action != action).then(|| std::mem::replace(&mut self.action, action));
        self.temporary = expires_at.map(|expires_at| TemporaryAction { action, expires_at });
        previous
    }

    /// Remove and return the temporary record if it has lapsed at `now`
    pub fn take_expired(&mut self, now: Instant) -> Option<TemporaryAction> {
        match self.temporary {
            Some(record) if record.is_expired(now) => self.temporary.take(),
            _ => None,
        }
    }

    /// Drop the temporary record without touching the action
    pub fn clear_temporary(&mut self) -> Option<TemporaryAction> {
        self.temporary.take()
    }

    /// Add `delta` to energy, clamped; returns the new value
    pub fn adjust_energy(&mut self, delta: f32) -> f32 {
        self.energy = clamp_vital(self.energy + delta);
        self.energy
    }

    /// Add `delta` to happiness, clamped; returns the new value
    pub fn adjust_happiness(&mut self, delta: f32) -> f32 {
        self.happiness = clamp_vital(self.happiness + delta);
        self.happiness
    }

    /// Serializable view of the pet
    #[must_use]
    pub fn snapshot(&self) -> PetSnapshot {
        PetSnapshot {
            name: self.name.clone(),
            species: self.species.clone(),
            personality: self.personality.clone(),
            state: self.state,
            mood: self.mood,
            action: self.action,
            energy: self.energy,
            happiness: self.happiness,
        }
    }

    /// Rebuild a pet from a loosely-typed record
    ///
    /// Unknown state, mood or action names fall back to their defaults and
    /// vitals are clamped. Temporary records are never restored.
    #[must_use]
    pub fn from_record(record: &PetRecord) -> Self {
        let mut model = Self::new(
            record.name.clone(),
            record.species.clone(),
            record.personality.clone(),
        )
        .with_vitals(record.energy, record.happiness);
        model.state = PetState::parse_or_default(&record.state);
        model.mood = Mood::parse_or_default(&record.mood);
        model.action = Action::parse_or_default(&record.action);
        model
    }
}

/// Typed, serializable view of a [`PetModel`]
///
/// Payload of `pet_stats_updated`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PetSnapshot {
    /// Pet name
    pub name: String,
    /// Character/species
    pub species: String,
    /// Personality key
    pub personality: String,
    /// Current state
    pub state: PetState,
    /// Current mood
    pub mood: Mood,
    /// Current action
    pub action: Action,
    /// Energy, 0..=100
    pub energy: f32,
    /// Happiness, 0..=100
    pub happiness: f32,
}

/// Loosely-typed pet data as it arrives from outside (saved files, UIs)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PetRecord {
    /// Pet name
    pub name: String,
    /// Character/species
    pub species: String,
    /// Personality key
    pub personality: String,
    /// State name
    pub state: String,
    /// Mood name
    pub mood: String,
    /// Action name
    pub action: String,
    /// Energy
    pub energy: f32,
    /// Happiness
    pub happiness: f32,
}

impl Default for PetRecord {
    fn default() -> Self {
        Self {
            name: "Pipi".to_string(),
            species: "cat".to_string(),
            personality: "cheerful".to_string(),
            state: PetState::Idle.as_str().to_string(),
            mood: Mood::Normal.as_str().to_string(),
            action: Action::Idle.as_str().to_string(),
            energy: VITAL_MAX,
            happiness: 60.0,
        }
    }
}

impl From<&PetSnapshot> for PetRecord {
    fn from(snapshot: &PetSnapshot) -> Self {
        Self {
            name: snapshot.name.clone(),
            species: snapshot.species.clone(),
            personality: snapshot.personality.clone(),
            state: snapshot.state.as_str().to_string(),
            mood: snapshot.mood.as_str().to_string(),
            action: snapshot.action.as_str().to_string(),
            energy: snapshot.energy,
            happiness: snapshot.happiness,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;

    fn pet() -> PetModel {
        PetModel::new("Pipi", "cat", "cheerful")
    }

    #[test]
    fn test_vitals_clamp_on_every_mutation() {
        let mut pet = pet().with_vitals(150.0, -20.0);
        assert_eq!(pet.energy(), VITAL_MAX);
        assert_eq!(pet.happiness(), VITAL_MIN);

        assert_eq!(pet.adjust_energy(-250.0), VITAL_MIN);
        assert_eq!(pet.adjust_happiness(500.0), VITAL_MAX);
        assert_eq!(pet.adjust_energy(f32::NAN), VITAL_MIN);
    }

    #[test]
    fn test_same_value_set_reports_no_change() {
        let mut pet = pet();
        assert_eq!(pet.set_mood(Mood::Happy), Some(Mood::Normal));
        assert_eq!(pet.set_mood(Mood::Happy), None);
        assert_eq!(pet.set_state(PetState::Idle), None);
    }

    #[test]
    fn test_new_action_replaces_temporary_record() {
        let t0 = Instant::now();
        let mut pet = pet();

        pet.set_action(Action::Encourage, Some(t0 + Duration::from_secs(3)));
        let record = pet.temporary().unwrap();
        assert_eq!(record.action, pet.action());

        pet.set_action(Action::Work, None);
        assert_eq!(pet.temporary(), None);

        pet.set_action(Action::React, Some(t0 + Duration::from_secs(1)));
        pet.set_action(Action::Eat, Some(t0 + Duration::from_secs(5)));
        let record = pet.temporary().unwrap();
        assert_eq!(record.action, Action::Eat);
        assert_eq!(record.expires_at, t0 + Duration::from_secs(5));
    }

    #[test]
    fn test_same_action_restarts_timer() {
        let t0 = Instant::now();
        let mut pet = pet();
        pet.set_action(Action::Happy, Some(t0 + Duration::from_secs(2)));
        let changed = pet.set_action(Action::Happy, Some(t0 + Duration::from_secs(4)));
        assert_eq!(changed, None);
        assert_eq!(
            pet.temporary().map(|r| r.expires_at),
            Some(t0 + Duration::from_secs(4))
        );
    }

    #[test]
    fn test_take_expired_only_after_deadline() {
        let t0 = Instant::now();
        let mut pet = pet();
        pet.set_action(Action::Eat, Some(t0 + Duration::from_secs(3)));

        assert_eq!(pet.take_expired(t0 + Duration::from_secs(2)), None);
        let record = pet.take_expired(t0 + Duration::from_secs(3)).unwrap();
        assert_eq!(record.action, Action::Eat);
        assert_eq!(pet.temporary(), None);
        assert_eq!(pet.take_expired(t0 + Duration::from_secs(10)), None);
    }

    #[test]
    fn test_record_with_invalid_names_coerces() {
        let record = PetRecord {
            state: "hibernating".to_string(),
            mood: "HAPPY".to_string(),
            action: "moonwalk".to_string(),
            energy: 140.0,
            ..PetRecord::default()
        };
        let pet = PetModel::from_record(&record);
        assert_eq!(pet.state(), PetState::Idle);
        assert_eq!(pet.mood(), Mood::Happy);
        assert_eq!(pet.action(), Action::Idle);
        assert_eq!(pet.energy(), VITAL_MAX);
        assert_eq!(pet.temporary(), None);
    }

    #[test]
    fn test_snapshot_round_trips_through_record() {
        let pet = pet()
            .with_vitals(42.0, 17.0)
            .with_appearance(Mood::Sad, Action::Rest);
        let snapshot = pet.snapshot();
        let restored = PetModel::from_record(&PetRecord::from(&snapshot));
        assert_eq!(restored.snapshot(), snapshot);
    }
}

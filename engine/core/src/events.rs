//! Bus Events
//!
//! Everything that travels over the [`EventBus`](crate::bus::EventBus). Each
//! variant has a static wire name (`programming_started`, `pet_alert`, ...)
//! and a typed payload.
//!
//! # Design Philosophy
//!
//! Producers outside the engine speak in `(name, optional JSON data)` pairs.
//! Those pairs are parsed exactly once, at the boundary, by
//! [`Event::from_parts`]: unknown names are rejected there, missing data reads
//! as an empty mapping, and missing payload fields take their defaults. Inside
//! the engine nothing is stringly typed.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pet::{Action, Mood, PetSnapshot, PetState};

/// Error turning a raw `(name, data)` pair into an [`Event`]
#[derive(Debug, Error)]
pub enum EventParseError {
    /// The name is not in the event table
    #[error("unknown event name: {0:?}")]
    UnknownEvent(String),

    /// The payload does not fit the event's shape
    #[error("invalid payload for {name}: {source}")]
    InvalidPayload {
        /// Event name
        name: &'static str,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },
}

/// Registration key: one per event name
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    /// `programming_started`
    ProgrammingStarted,
    /// `programming_ended`
    ProgrammingEnded,
    /// `programming_idle`
    ProgrammingIdle,
    /// `keypress`
    Keypress,
    /// `pet_interaction`
    PetInteraction,
    /// `achievement_unlocked`
    AchievementUnlocked,
    /// `goal_reached`
    GoalReached,
    /// `pet_mood_changed`
    PetMoodChanged,
    /// `pet_action_changed`
    PetActionChanged,
    /// `pet_state_changed`
    PetStateChanged,
    /// `ui_play_animation`
    UiPlayAnimation,
    /// `pet_alert`
    PetAlert,
    /// `pet_stats_updated`
    PetStatsUpdated,
}

impl EventKind {
    /// Every kind, in declaration order
    pub const ALL: [Self; 13] = [
        Self::ProgrammingStarted,
        Self::ProgrammingEnded,
        Self::ProgrammingIdle,
        Self::Keypress,
        Self::PetInteraction,
        Self::AchievementUnlocked,
        Self::GoalReached,
        Self::PetMoodChanged,
        Self::PetActionChanged,
        Self::PetStateChanged,
        Self::UiPlayAnimation,
        Self::PetAlert,
        Self::PetStatsUpdated,
    ];

    /// Kinds produced by the activity layer
    pub const PROGRAMMING: [Self; 3] = [
        Self::ProgrammingStarted,
        Self::ProgrammingEnded,
        Self::ProgrammingIdle,
    ];

    /// Wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProgrammingStarted => "programming_started",
            Self::ProgrammingEnded => "programming_ended",
            Self::ProgrammingIdle => "programming_idle",
            Self::Keypress => "keypress",
            Self::PetInteraction => "pet_interaction",
            Self::AchievementUnlocked => "achievement_unlocked",
            Self::GoalReached => "goal_reached",
            Self::PetMoodChanged => "pet_mood_changed",
            Self::PetActionChanged => "pet_action_changed",
            Self::PetStateChanged => "pet_state_changed",
            Self::UiPlayAnimation => "ui_play_animation",
            Self::PetAlert => "pet_alert",
            Self::PetStatsUpdated => "pet_stats_updated",
        }
    }

    /// Look up a wire name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of `pet_interaction`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InteractionKind {
    /// Single click on the pet
    Click,
    /// Feed from the menu
    Feed,
    /// Stroke the pet
    Pet,
    /// Anything else; logged and ignored by the controller
    Other(String),
}

impl InteractionKind {
    /// Wire name
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Click => "click",
            Self::Feed => "feed",
            Self::Pet => "pet",
            Self::Other(name) => name,
        }
    }
}

impl Default for InteractionKind {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for InteractionKind {
    fn from(name: String) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "click" => Self::Click,
            "feed" => Self::Feed,
            "pet" => Self::Pet,
            _ => Self::Other(name),
        }
    }
}

impl From<InteractionKind> for String {
    fn from(kind: InteractionKind) -> Self {
        kind.as_str().to_string()
    }
}

/// One message on the bus
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum Event {
    // ============================================
    // Activity
    // ============================================
    /// A programming session opened
    ProgrammingStarted {
        /// Foreground process name
        #[serde(default)]
        app: String,
        /// Foreground window title
        #[serde(default)]
        title: String,
    },

    /// A programming session closed because the foreground changed
    ProgrammingEnded {
        /// Process of the closed session
        #[serde(default)]
        app: String,
        /// Title of the closed session
        #[serde(default)]
        title: String,
        /// Session length in seconds
        #[serde(default)]
        duration: f64,
    },

    /// A programming session closed because the user went idle
    ProgrammingIdle {
        /// Seconds since the last input
        #[serde(default)]
        idle_time: f64,
        /// Length of the closed session in seconds
        #[serde(default)]
        duration: f64,
    },

    /// A key was pressed while programming
    Keypress {
        /// Key name
        #[serde(default)]
        key: String,
        /// Running count since the last reset
        #[serde(default)]
        count: u64,
        /// Unix timestamp in seconds
        #[serde(default)]
        timestamp: f64,
    },

    // ============================================
    // Interaction
    // ============================================
    /// The user interacted with the pet
    PetInteraction {
        /// Interaction kind
        #[serde(rename = "type", default)]
        kind: InteractionKind,
        /// Character the interaction targeted
        #[serde(default)]
        character_name: Option<String>,
    },

    /// An achievement was unlocked
    AchievementUnlocked {
        /// Achievement name
        #[serde(default)]
        name: Option<String>,
    },

    /// A goal was reached
    GoalReached {
        /// Goal name
        #[serde(default)]
        name: Option<String>,
    },

    // ============================================
    // Pet changes
    // ============================================
    /// Mood changed
    PetMoodChanged {
        /// Mood before
        previous: Mood,
        /// Mood after
        current: Mood,
    },

    /// Action changed
    PetActionChanged {
        /// Action before
        previous: Action,
        /// Action after
        current: Action,
    },

    /// State changed
    PetStateChanged {
        /// State before
        previous: PetState,
        /// State after
        current: PetState,
    },

    /// The renderer should play the animation for this action and mood
    UiPlayAnimation {
        /// Character (asset set) to animate
        character_name: String,
        /// Action to animate
        action_name: Action,
        /// Mood to animate
        mood_name: Mood,
    },

    /// Something needs the user's attention
    PetAlert {
        /// Alert kind, e.g. `low_energy`
        #[serde(rename = "type")]
        kind: String,
        /// Line to show
        message: String,
    },

    /// Vitals changed; full snapshot
    PetStatsUpdated(PetSnapshot),
}

impl Event {
    /// Registration key for this event
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::ProgrammingStarted { .. } => EventKind::ProgrammingStarted,
            Self::ProgrammingEnded { .. } => EventKind::ProgrammingEnded,
            Self::ProgrammingIdle { .. } => EventKind::ProgrammingIdle,
            Self::Keypress { .. } => EventKind::Keypress,
            Self::PetInteraction { .. } => EventKind::PetInteraction,
            Self::AchievementUnlocked { .. } => EventKind::AchievementUnlocked,
            Self::GoalReached { .. } => EventKind::GoalReached,
            Self::PetMoodChanged { .. } => EventKind::PetMoodChanged,
            Self::PetActionChanged { .. } => EventKind::PetActionChanged,
            Self::PetStateChanged { .. } => EventKind::PetStateChanged,
            Self::UiPlayAnimation { .. } => EventKind::UiPlayAnimation,
            Self::PetAlert { .. } => EventKind::PetAlert,
            Self::PetStatsUpdated(_) => EventKind::PetStatsUpdated,
        }
    }

    /// Wire name
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Parse a raw `(name, data)` pair; missing data reads as `{}`
    ///
    /// # Errors
    ///
    /// Returns [`EventParseError::UnknownEvent`] for names outside the table
    /// and [`EventParseError::InvalidPayload`] when the data has the wrong
    /// shape.
    pub fn from_parts(name: &str, data: Option<serde_json::Value>) -> Result<Self, EventParseError> {
        let kind = EventKind::from_name(name)
            .ok_or_else(|| EventParseError::UnknownEvent(name.to_string()))?;
        let data = data.unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new()));
        let envelope = serde_json::json!({ "event": kind.as_str(), "data": data });
        serde_json::from_value(envelope).map_err(|source| EventParseError::InvalidPayload {
            name: kind.as_str(),
            source,
        })
    }

    /// Convenience constructor for a UI interaction
    #[must_use]
    pub fn interaction(kind: InteractionKind, character_name: Option<String>) -> Self {
        Self::PetInteraction {
            kind,
            character_name,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

//! Pet State, Mood and Action Axes
//!
//! The three enumerated axes that describe what the pet is doing, plus the
//! [`PetModel`] that carries them together with the decaying vitals.
//!
//! # Design Philosophy
//!
//! The engine owns the pet's *state* (which axis values are current, how much
//! energy is left), while surfaces render that state however they want. All
//! string input (config files, collaborator payloads, saved snapshots) goes
//! through one static name table per axis, validated once at the boundary.
//! Anything unrecognized is coerced to the axis default with a warning, never
//! rejected.
//!
//! # Module Structure
//!
//! - [`model`]: the [`PetModel`] and its snapshot form
//! - [`messages`]: personality-flavored speech lines

pub mod messages;
pub mod model;

pub use messages::{message_for, MessageContext, Personality};
pub use model::{PetModel, PetRecord, PetSnapshot, TemporaryAction, VITAL_MAX, VITAL_MIN};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error for a name that is not a member of one of the pet axes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {axis} name: {name:?}")]
pub struct UnknownName {
    /// Axis the name was parsed for (`state`, `mood`, `action`)
    pub axis: &'static str,
    /// The rejected input
    pub name: String,
}

/// Coarse behavioral state of the pet
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PetState {
    /// Hanging around, not tied to any user activity
    #[default]
    Idle,
    /// The user is programming
    Working,
    /// The user has been away long enough for the pet to doze off
    Sleeping,
}

impl PetState {
    /// Every state, in declaration order
    pub const ALL: [Self; 3] = [Self::Idle, Self::Working, Self::Sleeping];

    /// Wire and asset name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Working => "working",
            Self::Sleeping => "sleeping",
        }
    }

    /// Parse a name, falling back to [`PetState::Idle`] with a warning
    #[must_use]
    pub fn parse_or_default(name: &str) -> Self {
        coerce(name)
    }
}

/// Emotional tone of the pet
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    /// Neutral baseline
    #[default]
    Normal,
    /// Content
    Happy,
    /// Low on energy
    Tired,
    /// Full of energy and wants to play
    Playful,
    /// Winding down
    Relaxed,
    /// Thrilled, e.g. after an achievement
    Excited,
    /// Low on happiness
    Sad,
    /// Asleep or about to be
    Sleepy,
}

impl Mood {
    /// Every mood, in declaration order
    pub const ALL: [Self; 8] = [
        Self::Normal,
        Self::Happy,
        Self::Tired,
        Self::Playful,
        Self::Relaxed,
        Self::Excited,
        Self::Sad,
        Self::Sleepy,
    ];

    /// Wire and asset name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Happy => "happy",
            Self::Tired => "tired",
            Self::Playful => "playful",
            Self::Relaxed => "relaxed",
            Self::Excited => "excited",
            Self::Sad => "sad",
            Self::Sleepy => "sleepy",
        }
    }

    /// Moods the vitals recomputation will not replace with a neutral default
    #[must_use]
    pub const fn is_negative(self) -> bool {
        matches!(self, Self::Tired | Self::Sad | Self::Sleepy)
    }

    /// Parse a name, falling back to [`Mood::Normal`] with a warning
    #[must_use]
    pub fn parse_or_default(name: &str) -> Self {
        coerce(name)
    }
}

/// What the pet is visibly doing; selects the animation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Standing around
    #[default]
    Idle,
    /// Typing along with the user
    Work,
    /// Resting
    Rest,
    /// Asleep
    Sleep,
    /// Eating
    Eat,
    /// Playing
    Play,
    /// Waving for attention (low energy)
    Alert,
    /// Showing joy
    Happy,
    /// Celebrating a milestone
    Celebrate,
    /// Cheering the user on
    Encourage,
    /// Visibly worn out
    Tired,
    /// Startled
    Surprised,
    /// Reacting to a click
    React,
}

impl Action {
    /// Every action, in declaration order
    pub const ALL: [Self; 13] = [
        Self::Idle,
        Self::Work,
        Self::Rest,
        Self::Sleep,
        Self::Eat,
        Self::Play,
        Self::Alert,
        Self::Happy,
        Self::Celebrate,
        Self::Encourage,
        Self::Tired,
        Self::Surprised,
        Self::React,
    ];

    /// Wire and asset name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Work => "work",
            Self::Rest => "rest",
            Self::Sleep => "sleep",
            Self::Eat => "eat",
            Self::Play => "play",
            Self::Alert => "alert",
            Self::Happy => "happy",
            Self::Celebrate => "celebrate",
            Self::Encourage => "encourage",
            Self::Tired => "tired",
            Self::Surprised => "surprised",
            Self::React => "react",
        }
    }

    /// Parse a name, falling back to [`Action::Idle`] with a warning
    #[must_use]
    pub fn parse_or_default(name: &str) -> Self {
        coerce(name)
    }
}

/// Shared name table behavior for the three axes
trait NamedAxis: Copy + Default + 'static {
    const AXIS: &'static str;
    fn members() -> &'static [Self];
    fn name(self) -> &'static str;

    fn lookup(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::members()
            .iter()
            .copied()
            .find(|m| m.name().eq_ignore_ascii_case(name))
    }
}

impl NamedAxis for PetState {
    const AXIS: &'static str = "state";
    fn members() -> &'static [Self] {
        &Self::ALL
    }
    fn name(self) -> &'static str {
        self.as_str()
    }
}

impl NamedAxis for Mood {
    const AXIS: &'static str = "mood";
    fn members() -> &'static [Self] {
        &Self::ALL
    }
    fn name(self) -> &'static str {
        self.as_str()
    }
}

impl NamedAxis for Action {
    const AXIS: &'static str = "action";
    fn members() -> &'static [Self] {
        &Self::ALL
    }
    fn name(self) -> &'static str {
        self.as_str()
    }
}

fn coerce<T: NamedAxis>(name: &str) -> T {
    T::lookup(name).unwrap_or_else(|| {
        let fallback = T::default();
        tracing::warn!(
            axis = T::AXIS,
            input = name,
            fallback = fallback.name(),
            "Unknown name, using default"
        );
        fallback
    })
}

fn strict<T: NamedAxis>(name: &str) -> Result<T, UnknownName> {
    T::lookup(name).ok_or_else(|| UnknownName {
        axis: T::AXIS,
        name: name.to_string(),
    })
}

impl FromStr for PetState {
    type Err = UnknownName;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        strict(s)
    }
}

impl FromStr for Mood {
    type Err = UnknownName;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        strict(s)
    }
}

impl FromStr for Action {
    type Err = UnknownName;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        strict(s)
    }
}

impl fmt::Display for PetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! CodePet Core - Behavior Engine for a Programming Companion
//!
//! This crate turns what a developer is doing (which window has focus, how
//! long they have been idle, how fast they type, when they click or feed the
//! pet) into the pet's state, mood and animation. It has no renderer and no
//! platform code; both sit behind small traits and bus events.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        Collaborators                             │
//! │  ┌──────────────┐  ┌──────────────┐  ┌────────────────────────┐  │
//! │  │ WindowSource │  │  Keylogger   │  │ Renderer / FrameSink   │  │
//! │  │ IdleSource   │  │              │  │                        │  │
//! │  └──────┬───────┘  └──────┬───────┘  └───────────▲────────────┘  │
//! └─────────┼─────────────────┼──────────────────────┼───────────────┘
//!           │                 │                      │
//! ┌─────────┼─────────────────┼──────────────────────┼───────────────┐
//! │         ▼                 ▼                      │    CORE       │
//! │  ActivitySampler   KeyActivityGate               │               │
//! │         │                 │                      │               │
//! │         └───────┬─────────┘                      │               │
//! │                 ▼                                │               │
//! │   EventBus (queue + handler table) ───────▶ AnimationPlayer      │
//! │                 │                                ▲               │
//! │                 ▼                                │               │
//! │        BehaviorController ──▶ PetModel ── ui_play_animation      │
//! │                                                                  │
//! │                PetRuntime drives dispatch and ticks              │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`EventBus`]: typed publish/subscribe with a single consumer
//! - [`BehaviorController`]: the state machine; only writer of [`PetModel`]
//! - [`ActivitySampler`]: foreground-window polling and session tracking
//! - [`AnimationCatalog`] / [`AnimationPlayer`]: frame lookup with fallback
//! - [`PetRuntime`]: the consumer loop tying it all together
//! - [`PetConfig`]: layered TOML/env/CLI configuration
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Instant;
//! use codepet_core::{
//!     load_config, AnimationCatalog, BehaviorController, EventBus, PetRuntime,
//! };
//! use tokio::sync::watch;
//!
//! let config = load_config()?;
//! config.validate()?;
//! let bus = EventBus::new();
//! let controller = BehaviorController::new(
//!     config.pet.build_model(),
//!     config.behavior.clone(),
//!     bus.publisher(),
//!     Instant::now(),
//! );
//! let runtime = PetRuntime::new(bus, controller, Arc::new(AnimationCatalog::default()), sink);
//! let (stop_tx, stop_rx) = watch::channel(false);
//! let final_state = runtime.run(stop_rx).await;
//! ```
//!
//! # Module Overview
//!
//! - [`activity`]: window classification, sessions, keystrokes
//! - [`animation`]: frame catalog and player
//! - [`bus`]: handler registry, publisher, dispatch
//! - [`config`]: configuration loading and validation
//! - [`controller`]: behavior rules
//! - [`events`]: the event vocabulary
//! - [`pet`]: pet model, enums, speech lines
//! - [`runtime`]: the consumer loop

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod activity;
pub mod animation;
pub mod bus;
pub mod config;
pub mod controller;
pub mod events;
pub mod pet;
pub mod runtime;

// Pet exports
pub use pet::{
    message_for, Action, MessageContext, Mood, PetModel, PetRecord, PetSnapshot, PetState,
    Personality,
};

// Event exports
pub use bus::{
    handler_fn, DispatchReport, EventBus, EventHandler, EventPublisher, HandlerError,
    HandlerRegistry, HandlerResult,
};
pub use events::{Event, EventKind, EventParseError, InteractionKind};

// Behavior exports
pub use controller::{ActionDurations, BehaviorController, BehaviorSettings, ControllerHandler};

// Activity exports
pub use activity::{
    ActivitySampler, ActivitySettings, Classification, Classifier, DailyStats, IdleSource,
    KeyActivityGate, KeyStats, SampleOutcome, SamplerHandle, WindowError, WindowSample,
    WindowSource,
};

// Animation exports
pub use animation::{
    AnimationCatalog, AnimationPlayer, AnimationSettings, CatalogError, FrameHandle, PlayOutcome,
    PlayerHandler,
};

// Runtime exports
pub use runtime::{FrameSink, PetRuntime};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, load_config_with_env, CodepetToml,
    ConfigError, ConfigOverrides, ConfigSource, PetConfig, PetSettings, Settings,
};

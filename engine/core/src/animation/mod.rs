//! Animation Selection and Playback
//!
//! Turns the pet's current `(action, mood)` into a looping sequence of frames
//! and a per-action playback interval. Rendering stays with the surface; this
//! module only decides *which* frame is current.
//!
//! # Design Philosophy
//!
//! - **Timer-free**: the player owns no clock. It reports the interval of the
//!   active sequence and whether it changed; the caller re-arms its tick.
//! - **Never empty**: missing art resolves through a fixed fallback chain
//!   before "no frames" is reported.
//! - **Built once**: the [`AnimationCatalog`] is loaded at startup and shared
//!   read-only.
//!
//! # Architecture
//!
//! ```text
//! ui_play_animation ──→ PlayerHandler ──→ AnimationPlayer::play
//!                                            │
//!                                            ├─→ interval changed? re-arm frame tick
//!                                            └─→ frame tick: next_frame() ──→ FrameSink
//! ```

mod catalog;
mod player;

pub use catalog::{AnimationCatalog, CatalogError, ResolvedSequence, ANIMATION_CONFIG_FILE};
pub use player::{AnimationPlayer, PlayOutcome, PlayerHandler};

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Interval used for actions without their own `speed_ms`
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(100);

/// Opaque reference to one frame image
///
/// Cheap to clone. For directory-loaded catalogs this is the image path.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(Arc<str>);

impl FrameHandle {
    /// Wrap an identifier
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// The identifier
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FrameHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where frames come from and how fast they play by default
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationSettings {
    /// Root holding `<character>/<action>/<mood>/frame*` trees
    pub assets_dir: Option<PathBuf>,
    /// Interval for actions without their own `speed_ms`
    pub default_interval: Duration,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            assets_dir: None,
            default_interval: DEFAULT_FRAME_INTERVAL,
        }
    }
}

impl AnimationSettings {
    /// Asset directory for one character, if an assets root is configured
    #[must_use]
    pub fn character_dir(&self, character: &str) -> Option<PathBuf> {
        self.assets_dir.as_ref().map(|root| root.join(character))
    }
}

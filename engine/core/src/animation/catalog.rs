//! Frame catalog: `(action, mood)` → frames, plus per-action intervals

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use super::FrameHandle;
use crate::pet::{Action, Mood};

/// Per-action playback settings file inside an action directory
pub const ANIMATION_CONFIG_FILE: &str = "animation_config.json";

const FRAME_PREFIX: &str = "frame";
const FRAME_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "gif"];

/// Errors building a catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Sequences must hold at least one frame
    #[error("empty frame sequence for {action}/{mood}")]
    EmptySequence {
        /// Action of the rejected sequence
        action: Action,
        /// Mood of the rejected sequence
        mood: Mood,
    },

    /// Intervals must be positive
    #[error("frame interval for {0} must be positive")]
    ZeroInterval(Action),

    /// The asset root is missing or not a directory
    #[error("asset root {0} is not a directory")]
    NotADirectory(PathBuf),

    /// A directory could not be listed
    #[error("failed to read asset directory {path}: {source}")]
    ReadDir {
        /// Directory that failed
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },
}

/// A lookup result after the fallback chain
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedSequence<'a> {
    /// What was asked for
    pub requested: (Action, Mood),
    /// Where the frames actually come from
    pub source: (Action, Mood),
    /// The frames, never empty
    pub frames: &'a [FrameHandle],
    /// Interval of the source action
    pub interval: Duration,
}

impl ResolvedSequence<'_> {
    /// Whether a fallback was used
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.requested != self.source
    }
}

#[derive(Debug, Deserialize)]
struct AnimationConfigFile {
    speed_ms: Option<serde_json::Value>,
}

/// Read-only table of frame sequences
#[derive(Clone, Debug)]
pub struct AnimationCatalog {
    sequences: HashMap<(Action, Mood), Vec<FrameHandle>>,
    intervals: HashMap<Action, Duration>,
    default_interval: Duration,
}

impl Default for AnimationCatalog {
    fn default() -> Self {
        Self::new(super::DEFAULT_FRAME_INTERVAL)
    }
}

impl AnimationCatalog {
    /// Empty catalog
    pub fn new(default_interval: Duration) -> Self {
        Self {
            sequences: HashMap::new(),
            intervals: HashMap::new(),
            default_interval,
        }
    }

    /// Add or replace a sequence
    ///
    /// # Errors
    ///
    /// Rejects empty sequences.
    pub fn insert(
        &mut self,
        action: Action,
        mood: Mood,
        frames: Vec<FrameHandle>,
    ) -> Result<(), CatalogError> {
        if frames.is_empty() {
            return Err(CatalogError::EmptySequence { action, mood });
        }
        self.sequences.insert((action, mood), frames);
        Ok(())
    }

    /// Set the playback interval for one action
    ///
    /// # Errors
    ///
    /// Rejects a zero interval.
    pub fn set_interval(&mut self, action: Action, interval: Duration) -> Result<(), CatalogError> {
        if interval.is_zero() {
            return Err(CatalogError::ZeroInterval(action));
        }
        self.intervals.insert(action, interval);
        Ok(())
    }

    /// Interval for `action`, or the default
    #[must_use]
    pub fn interval_for(&self, action: Action) -> Duration {
        self.intervals
            .get(&action)
            .copied()
            .unwrap_or(self.default_interval)
    }

    /// Default interval
    #[must_use]
    pub fn default_interval(&self) -> Duration {
        self.default_interval
    }

    /// Number of sequences
    #[must_use]
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    /// Whether the catalog has no sequences at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Whether an exact `(action, mood)` sequence exists
    #[must_use]
    pub fn contains(&self, action: Action, mood: Mood) -> bool {
        self.sequences.contains_key(&(action, mood))
    }

    /// Find frames for `(action, mood)`
    ///
    /// Tries `(action, mood)`, `(action, Normal)`, `(Idle, mood)` and
    /// `(Idle, Normal)` in that order.
    #[must_use]
    pub fn resolve(&self, action: Action, mood: Mood) -> Option<ResolvedSequence<'_>> {
        let chain = [
            (action, mood),
            (action, Mood::Normal),
            (Action::Idle, mood),
            (Action::Idle, Mood::Normal),
        ];
        chain.into_iter().find_map(|source| {
            self.sequences.get(&source).map(|frames| ResolvedSequence {
                requested: (action, mood),
                source,
                frames,
                interval: self.interval_for(source.0),
            })
        })
    }

    /// Load a character's asset tree
    ///
    /// Layout: `<root>/<action>/<mood>/frame*.<ext>`, or
    /// `<root>/<action>/frame*.<ext>` for mood `normal`. An optional
    /// `<root>/<action>/animation_config.json` with a positive integer
    /// `speed_ms` sets that action's interval. Unknown action or mood
    /// directories are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Fails if `root` is not a directory or a directory cannot be listed.
    pub fn load_dir(root: &Path, default_interval: Duration) -> Result<Self, CatalogError> {
        if !root.is_dir() {
            return Err(CatalogError::NotADirectory(root.to_path_buf()));
        }
        let mut catalog = Self::new(default_interval);

        for action_dir in subdirectories(root)? {
            let Some(action) = dir_name(&action_dir).and_then(|n| n.parse::<Action>().ok()) else {
                tracing::warn!(path = %action_dir.display(), "Unknown action directory, skipping");
                continue;
            };

            if let Some(interval) = read_speed(&action_dir) {
                catalog.intervals.insert(action, interval);
            }

            let flat = frame_files(&action_dir)?;
            if !flat.is_empty() {
                catalog.sequences.insert((action, Mood::Normal), flat);
            }

            for mood_dir in subdirectories(&action_dir)? {
                let Some(mood) = dir_name(&mood_dir).and_then(|n| n.parse::<Mood>().ok()) else {
                    tracing::warn!(path = %mood_dir.display(), "Unknown mood directory, skipping");
                    continue;
                };
                let frames = frame_files(&mood_dir)?;
                if frames.is_empty() {
                    tracing::debug!(path = %mood_dir.display(), "No frames in mood directory");
                    continue;
                }
                catalog.sequences.insert((action, mood), frames);
            }
        }

        tracing::info!(
            root = %root.display(),
            sequences = catalog.len(),
            "Loaded animation catalog"
        );
        Ok(catalog)
    }
}

fn dir_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

fn list(dir: &Path) -> Result<Vec<PathBuf>, CatalogError> {
    let entries = fs::read_dir(dir).map_err(|source| CatalogError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut paths: Vec<PathBuf> = entries.filter_map(|e| e.ok().map(|e| e.path())).collect();
    paths.sort();
    Ok(paths)
}

fn subdirectories(dir: &Path) -> Result<Vec<PathBuf>, CatalogError> {
    Ok(list(dir)?.into_iter().filter(|p| p.is_dir()).collect())
}

fn is_frame_file(path: &Path) -> bool {
    let stem_ok = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.to_ascii_lowercase().starts_with(FRAME_PREFIX));
    let ext_ok = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| FRAME_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
    path.is_file() && stem_ok && ext_ok
}

fn frame_files(dir: &Path) -> Result<Vec<FrameHandle>, CatalogError> {
    Ok(list(dir)?
        .into_iter()
        .filter(|p| is_frame_file(p))
        .map(|p| FrameHandle::new(p.to_string_lossy()))
        .collect())
}

fn read_speed(action_dir: &Path) -> Option<Duration> {
    let path = action_dir.join(ANIMATION_CONFIG_FILE);
    if !path.is_file() {
        return None;
    }
    let parsed = fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|s| serde_json::from_str::<AnimationConfigFile>(&s).map_err(|e| e.to_string()));

    match parsed {
        Ok(AnimationConfigFile {
            speed_ms: Some(value),
        }) => match value.as_u64().filter(|&ms| ms > 0) {
            Some(ms) => Some(Duration::from_millis(ms)),
            None => {
                tracing::warn!(path = %path.display(), speed_ms = %value, "Invalid speed_ms, using default");
                None
            }
        },
        Ok(AnimationConfigFile { speed_ms: None }) => None,
        Err(error) => {
            tracing::warn!(path = %path.display(), error = %error, "Unreadable animation config, using default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn frames(names: &[&str]) -> Vec<FrameHandle> {
        names.iter().map(FrameHandle::new).collect()
    }

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"img").unwrap();
    }

    #[test]
    fn test_fallback_to_action_normal() {
        let mut catalog = AnimationCatalog::default();
        catalog
            .insert(Action::Eat, Mood::Normal, frames(&["eat0", "eat1"]))
            .unwrap();

        let resolved = catalog.resolve(Action::Eat, Mood::Excited).unwrap();
        assert_eq!(resolved.source, (Action::Eat, Mood::Normal));
        assert_eq!(resolved.frames, frames(&["eat0", "eat1"]).as_slice());
        assert!(resolved.is_fallback());
    }

    #[test]
    fn test_full_fallback_chain() {
        let mut catalog = AnimationCatalog::default();
        catalog
            .insert(Action::Idle, Mood::Normal, frames(&["idle"]))
            .unwrap();
        catalog
            .insert(Action::Idle, Mood::Tired, frames(&["idle-tired"]))
            .unwrap();
        catalog
            .insert(Action::Work, Mood::Happy, frames(&["work-happy"]))
            .unwrap();

        let source = |a, m| catalog.resolve(a, m).map(|r| r.source);
        assert_eq!(source(Action::Work, Mood::Happy), Some((Action::Work, Mood::Happy)));
        assert_eq!(source(Action::Sleep, Mood::Tired), Some((Action::Idle, Mood::Tired)));
        assert_eq!(source(Action::Sleep, Mood::Sad), Some((Action::Idle, Mood::Normal)));
    }

    #[test]
    fn test_exhausted_chain_reports_nothing() {
        let mut catalog = AnimationCatalog::default();
        catalog
            .insert(Action::Work, Mood::Happy, frames(&["w"]))
            .unwrap();
        assert!(catalog.resolve(Action::Eat, Mood::Normal).is_none());
    }

    #[test]
    fn test_empty_sequence_rejected() {
        let mut catalog = AnimationCatalog::default();
        let err = catalog.insert(Action::Eat, Mood::Normal, Vec::new()).unwrap_err();
        assert!(matches!(err, CatalogError::EmptySequence { action: Action::Eat, .. }));
        assert!(catalog.set_interval(Action::Eat, Duration::ZERO).is_err());
    }

    #[test]
    fn test_interval_defaults_per_action() {
        let mut catalog = AnimationCatalog::new(Duration::from_millis(120));
        catalog
            .set_interval(Action::Sleep, Duration::from_millis(400))
            .unwrap();
        assert_eq!(catalog.interval_for(Action::Sleep), Duration::from_millis(400));
        assert_eq!(catalog.interval_for(Action::Work), Duration::from_millis(120));
    }

    #[test]
    fn test_load_dir_layout() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(&root.join("idle/frame_002.png"));
        touch(&root.join("idle/frame_001.png"));
        touch(&root.join("idle/notes.txt"));
        touch(&root.join("work/happy/frame1.jpg"));
        touch(&root.join("work/grumpy/frame1.png"));
        touch(&root.join("dance/frame1.png"));
        fs::write(root.join("idle").join(ANIMATION_CONFIG_FILE), r#"{"speed_ms": 250}"#).unwrap();
        fs::write(root.join("work").join(ANIMATION_CONFIG_FILE), r#"{"speed_ms": -5}"#).unwrap();

        let catalog = AnimationCatalog::load_dir(root, Duration::from_millis(100)).unwrap();

        assert_eq!(catalog.len(), 2);
        let idle = catalog.resolve(Action::Idle, Mood::Normal).unwrap();
        assert_eq!(idle.frames.len(), 2);
        assert!(idle.frames[0].as_str().ends_with("frame_001.png"));
        assert_eq!(idle.interval, Duration::from_millis(250));

        assert!(catalog.contains(Action::Work, Mood::Happy));
        assert_eq!(catalog.interval_for(Action::Work), Duration::from_millis(100));
    }

    #[test]
    fn test_load_dir_requires_directory() {
        let dir = TempDir::new().unwrap();
        let err = AnimationCatalog::load_dir(&dir.path().join("missing"), Duration::from_millis(100))
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotADirectory(_)));
    }
}

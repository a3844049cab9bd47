//! Error types for oopviz.
//!
//! All errors are strongly typed using thiserror. Configuration problems are
//! fatal at load time; derivation problems indicate a scene-authoring bug and
//! are propagated rather than masked, so the presentation layer can show a
//! diagnostic instead of a plausible-but-wrong visualization.

use thiserror::Error;

/// Configuration errors detected while building the scene script or source
/// map, or when a caller hands an out-of-range scene index to the engine or
/// cache directly.
///
/// These are load-time failures: the system refuses to initialize with a
/// partial script rather than render a broken timeline.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Scene tag '{tag}' does not resolve to any source span")]
    UnresolvedTag {
        tag: String,
    },

    #[error("Source marker '{tag}' has no matching {expected} marker")]
    UnpairedTag {
        tag: String,
        expected: &'static str,
    },

    #[error("Source marker '{tag}' appears more than once")]
    DuplicateTag {
        tag: String,
    },

    #[error("Scene tag '{tag}' spans no source lines")]
    EmptySpan {
        tag: String,
    },

    #[error("Scene script contains no scenes")]
    EmptyScript,

    #[error("Explanation hover links line {line}, but the source has {line_count} lines")]
    HoverLineOutOfRange {
        line: usize,
        line_count: usize,
    },

    #[error("Scene index {index} is out of range [0, {scene_count})")]
    SceneIndexOutOfRange {
        index: usize,
        scene_count: usize,
    },
}

/// Errors raised by a scene transition itself.
///
/// Transitions are meant to be pure and total over valid inputs, so any of
/// these indicates an authoring bug in the scene script.
#[derive(Debug, Error)]
pub enum DerivationError {
    #[error("Scene '{scene}' touched instance '{instance}' before its creation scene")]
    MissingInstance {
        scene: &'static str,
        instance: &'static str,
    },
}

/// Errors from the navigation event runtime.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Navigation queue is full (capacity {capacity})")]
    QueueFull {
        capacity: usize,
    },

    #[error("Navigation worker is disconnected")]
    Disconnected,
}

/// Top-level error type for oopviz.
#[derive(Debug, Error)]
pub enum VizError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("State derivation error: {0}")]
    Derivation(#[from] DerivationError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl VizError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns true if this is a state derivation error.
    #[must_use]
    pub const fn is_derivation(&self) -> bool {
        matches!(self, Self::Derivation(_))
    }

    /// Returns true if this is a dispatch error.
    #[must_use]
    pub const fn is_dispatch(&self) -> bool {
        matches!(self, Self::Dispatch(_))
    }

    /// Returns true if this is an internal error.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }
}

/// Result type alias for oopviz operations.
pub type VizResult<T> = Result<T, VizError>;

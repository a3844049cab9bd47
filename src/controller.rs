//! The navigation controller.
//!
//! The public-facing API of the core: advance, retreat, jump, reset. The
//! controller exclusively owns the live [`ProgramState`] and delegates
//! derivation to the cache and engine. Requests beyond the timeline edges
//! are reported as boundary conditions, never errors; `goto` clamps.

use std::sync::Arc;

use crate::cache::SceneCache;
use crate::engine::SceneEngine;
use crate::error::VizResult;
use crate::frame::ViewFrame;
use crate::scene::SceneDescriptor;
use crate::script::SceneScript;
use crate::state::ProgramState;

/// What a navigation operation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavOutcome {
    /// The current scene changed (or was re-resolved in place by `goto`).
    Moved,
    /// The request hit a timeline edge; nothing changed.
    Boundary,
}

impl NavOutcome {
    /// True when the operation changed (or re-resolved) the current scene.
    #[must_use]
    pub const fn moved(self) -> bool {
        matches!(self, Self::Moved)
    }
}

/// Owns the live state and drives it through the scene timeline.
#[derive(Debug)]
pub struct Navigator {
    engine: SceneEngine,
    cache: SceneCache,
    state: ProgramState,
}

impl Navigator {
    /// Creates a navigator over the built-in script.
    ///
    /// # Errors
    ///
    /// Returns the script's [`crate::error::ConfigError`] if the embedded
    /// scene data fails validation; a navigator never exists over a
    /// partially built script.
    pub fn new() -> VizResult<Self> {
        Ok(Self::with_script(Arc::new(SceneScript::load()?)))
    }

    /// Creates a navigator over an already validated script.
    #[must_use]
    pub fn with_script(script: Arc<SceneScript>) -> Self {
        Self {
            engine: SceneEngine::new(script),
            cache: SceneCache::new(),
            state: ProgramState::initial(),
        }
    }

    /// Index of the active scene.
    #[must_use]
    pub const fn scene_index(&self) -> usize {
        self.state.scene_index
    }

    /// Total number of scenes.
    #[must_use]
    pub fn scene_count(&self) -> usize {
        self.engine.script().len()
    }

    /// The live state. Read-only; navigation operations are the only
    /// mutators.
    #[must_use]
    pub const fn state(&self) -> &ProgramState {
        &self.state
    }

    /// The active scene descriptor.
    ///
    /// # Errors
    ///
    /// Only if the stamped scene index were invalid, which the navigation
    /// operations never produce.
    pub fn current_scene(&self) -> VizResult<&SceneDescriptor> {
        Ok(self.engine.script().scene(self.state.scene_index)?)
    }

    /// Advances one scene. At the last scene this is a reported no-op.
    ///
    /// # Errors
    ///
    /// Propagates derivation failures from the scene script.
    pub fn next(&mut self) -> VizResult<NavOutcome> {
        if self.state.scene_index >= self.engine.script().last_index() {
            return Ok(NavOutcome::Boundary);
        }
        let target = self.state.scene_index + 1;
        self.state = self.cache.state_at(&self.engine, target)?;
        Ok(NavOutcome::Moved)
    }

    /// Retreats one scene. At scene 0 this is a reported no-op.
    ///
    /// # Errors
    ///
    /// Propagates derivation failures from the scene script.
    pub fn previous(&mut self) -> VizResult<NavOutcome> {
        if self.state.scene_index == 0 {
            return Ok(NavOutcome::Boundary);
        }
        let target = self.state.scene_index - 1;
        self.state = self.cache.state_at(&self.engine, target)?;
        Ok(NavOutcome::Moved)
    }

    /// Jumps to a scene, clamping into the valid range. Resolves
    /// unconditionally, so a jump to the current index re-derives the
    /// frame for explicit re-render requests.
    ///
    /// # Errors
    ///
    /// Propagates derivation failures from the scene script.
    pub fn goto(&mut self, index: usize) -> VizResult<NavOutcome> {
        let target = index.min(self.engine.script().last_index());
        self.state = self.cache.state_at(&self.engine, target)?;
        Ok(NavOutcome::Moved)
    }

    /// Returns to the index-0 initial snapshot and drops every cached
    /// derivation.
    pub fn reset(&mut self) {
        self.cache.invalidate_all();
        self.state = ProgramState::initial();
    }

    /// Composes the presentation snapshot for the active scene.
    ///
    /// # Errors
    ///
    /// See [`Navigator::current_scene`].
    pub fn frame(&self) -> VizResult<ViewFrame> {
        let scene = self.current_scene()?;
        Ok(ViewFrame::compose(scene, &self.state, self.scene_count()))
    }
}

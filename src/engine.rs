//! The transition engine.
//!
//! A thin, pure executor: look up a scene, apply its transition to a
//! defensive deep copy of the input state, stamp the resulting scene index.
//! The engine does not clamp; an out-of-range index is a caller contract
//! violation and fails with a configuration error.

use std::sync::Arc;

use crate::error::VizResult;
use crate::script::SceneScript;
use crate::state::ProgramState;

/// Applies scene transitions against an immutable script.
#[derive(Debug, Clone)]
pub struct SceneEngine {
    script: Arc<SceneScript>,
}

impl SceneEngine {
    /// Creates an engine over the given script.
    #[must_use]
    pub fn new(script: Arc<SceneScript>) -> Self {
        Self { script }
    }

    /// The script this engine executes.
    #[must_use]
    pub fn script(&self) -> &SceneScript {
        &self.script
    }

    /// Derives the state after `index` from the state before it.
    ///
    /// The input is cloned before the transition runs, so the caller's
    /// snapshot is never mutated and the result shares no storage with it.
    ///
    /// # Errors
    ///
    /// [`crate::error::ConfigError::SceneIndexOutOfRange`] when `index` is
    /// not a valid scene; [`crate::error::DerivationError`] when the scene's
    /// transition itself fails, which indicates a script-authoring bug and
    /// is propagated untouched.
    pub fn apply(&self, state: &ProgramState, index: usize) -> VizResult<ProgramState> {
        let scene = self.script.scene(index)?;
        let mut next = (scene.transition)(state.clone())?;
        next.scene_index = index;
        Ok(next)
    }
}

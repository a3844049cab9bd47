//! ViewFrame, the read-only snapshot handed to the presentation layer.
//!
//! After every navigation operation the controller can compose a frame:
//! everything a renderer needs for one scene (highlight span, diagram
//! names, explanation, computed output and the full state), with no way
//! back into the controller's mutable internals.

use serde::{Deserialize, Serialize};

use crate::scene::{Explanation, SceneDescriptor};
use crate::source::LineRange;
use crate::state::ProgramState;

/// One rendered step of the timeline, ready for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewFrame {
    /// Index of the active scene.
    pub scene_index: usize,
    /// Total number of scenes, for progress display.
    pub scene_count: usize,
    /// The active scene's title.
    pub title: String,
    /// The active scene's symbolic tag.
    pub tag: String,
    /// Resolved source span to highlight.
    pub span: LineRange,
    /// Names to call out in the diagrams.
    pub highlighted_names: Vec<String>,
    /// Structured explanation for the explanation panel.
    pub explanation: Explanation,
    /// Output panel text, computed from the state at composition time.
    pub output: String,
    /// Deep copy of the full simulated state.
    pub state: ProgramState,
    /// Hex-encoded stable digest of `state`.
    pub fingerprint: String,
}

impl ViewFrame {
    /// Composes a frame from the active scene and the current state.
    #[must_use]
    pub fn compose(scene: &SceneDescriptor, state: &ProgramState, scene_count: usize) -> Self {
        let output = (scene.render_output)(state);
        let fingerprint = blake3::Hash::from(state.fingerprint()).to_hex().to_string();
        Self {
            scene_index: state.scene_index,
            scene_count,
            title: scene.title.to_string(),
            tag: scene.tag.to_string(),
            span: scene.span,
            highlighted_names: scene
                .highlighted_names
                .iter()
                .map(|n| (*n).to_string())
                .collect(),
            explanation: scene.explanation.clone(),
            output,
            state: state.clone(),
            fingerprint,
        }
    }

    /// True at scene 0.
    #[must_use]
    pub const fn is_first(&self) -> bool {
        self.scene_index == 0
    }

    /// True at the final scene.
    #[must_use]
    pub const fn is_last(&self) -> bool {
        self.scene_index + 1 == self.scene_count
    }

    /// Completion ratio in `[0, 1]`, for progress display.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.scene_count == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        {
            (self.scene_index + 1) as f32 / self.scene_count as f32
        }
    }
}

//! Scene descriptors.
//!
//! A scene is one step of the visualized timeline: the source span it
//! highlights, the names it calls out in the diagrams, a structured
//! explanation, an output-rendering function and a state-transition
//! function. Descriptors are static data; the script in [`crate::script`]
//! builds the full ordered table.

use serde::{Deserialize, Serialize};

use crate::error::DerivationError;
use crate::source::LineRange;
use crate::state::ProgramState;

/// Renders a scene's output panel text from the current state.
///
/// Attribute reads happen here, through the resolution fallback chain, so
/// shadowing is evaluated at read time rather than baked into the state.
pub type RenderFn = fn(&ProgramState) -> String;

/// Advances the state by exactly one scene.
///
/// Receives an owned deep copy of the previous state (the engine clones
/// before calling) and must derive the next state from its argument alone.
pub type TransitionFn = fn(ProgramState) -> Result<ProgramState, DerivationError>;

/// What a hover segment links to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoverLink {
    /// A 1-based line of the visualized source.
    Line(usize),
    /// A named symbol (variable, class, or method) in the source.
    Symbol(String),
}

/// One piece of a structured explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment {
    /// Plain prose.
    Text {
        text: String,
    },
    /// A span the presentation layer can make hoverable.
    Hover {
        text: String,
        link: HoverLink,
    },
}

impl Segment {
    /// The visible text of the segment.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Text { text } | Self::Hover { text, .. } => text,
        }
    }
}

/// Structured rich text shown in the explanation panel.
///
/// Plain `Display` rendering concatenates the segment texts, which keeps
/// explanations assertable in tests without a presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    /// Ordered segments.
    pub segments: Vec<Segment>,
}

impl Explanation {
    /// Starts an empty explanation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a prose segment.
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.segments.push(Segment::Text { text: text.into() });
        self
    }

    /// Appends a hover segment linked to a symbol name.
    #[must_use]
    pub fn symbol(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        let link = HoverLink::Symbol(text.clone());
        self.segments.push(Segment::Hover { text, link });
        self
    }

    /// Appends a hover segment linked to a source line.
    #[must_use]
    pub fn line(mut self, text: impl Into<String>, line: usize) -> Self {
        self.segments.push(Segment::Hover {
            text: text.into(),
            link: HoverLink::Line(line),
        });
        self
    }

    /// True when the explanation has no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl std::fmt::Display for Explanation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for segment in &self.segments {
            f.write_str(segment.text())?;
        }
        Ok(())
    }
}

/// Static record describing one step of the timeline.
#[derive(Debug, Clone)]
pub struct SceneDescriptor {
    /// Short human-readable title.
    pub title: &'static str,
    /// Symbolic source tag; resolved against the source map at load time.
    pub tag: &'static str,
    /// The resolved source span.
    pub span: LineRange,
    /// Names to call out in the class/instance diagrams.
    pub highlighted_names: &'static [&'static str],
    /// Structured explanation shown alongside the scene.
    pub explanation: Explanation,
    /// Output panel renderer.
    pub render_output: RenderFn,
    /// State transition applied when entering this scene.
    pub transition: TransitionFn,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explanation_display_concatenates_segments() {
        let explanation = Explanation::new()
            .text("Defines the ")
            .symbol("Device")
            .text(" class.");
        assert_eq!(explanation.to_string(), "Defines the Device class.");
        assert_eq!(explanation.segments.len(), 3);
    }

    #[test]
    fn test_hover_segment_links() {
        let explanation = Explanation::new().line("self", 12).symbol("shared_log");
        let Segment::Hover { link, .. } = &explanation.segments[0] else {
            panic!("expected hover segment");
        };
        assert_eq!(*link, HoverLink::Line(12));
        let Segment::Hover { link, .. } = &explanation.segments[1] else {
            panic!("expected hover segment");
        };
        assert_eq!(*link, HoverLink::Symbol("shared_log".to_string()));
    }

    #[test]
    fn test_explanation_serialization() {
        let explanation = Explanation::new().text("a ").symbol("b");
        let json = serde_json::to_string(&explanation).unwrap();
        assert!(json.contains("\"kind\":\"text\""));
        assert!(json.contains("\"kind\":\"hover\""));
        let back: Explanation = serde_json::from_str(&json).unwrap();
        assert_eq!(explanation, back);
    }
}

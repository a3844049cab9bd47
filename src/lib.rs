//! # oopviz - Scene-driven state engine for a Python OOP visualizer
//!
//! oopviz is the core of an interactive step-through visualizer: a fixed
//! Python program demonstrating class variables, instance variables,
//! inheritance, shadowing and mutable shared state is walked scene by
//! scene, and each scene deterministically transforms a simulated
//! [`ProgramState`]. Presentation layers render diagrams, source
//! highlighting and explanations from the [`ViewFrame`] the core exposes,
//! and feed navigation events back in.
//!
//! ## Core Concepts
//!
//! - **ProgramState**: the full simulated class/instance snapshot at one
//!   point of the timeline
//! - **SceneScript**: the ordered, immutable table of scene descriptors,
//!   validated against the source listing at load time
//! - **SceneCache**: memoized snapshots with nearest-ancestor replay, so
//!   random-access navigation never re-derives from scratch
//! - **Navigator**: the public API: `next`, `previous`, `goto`, `reset`
//!
//! ## Usage
//!
//! ```rust
//! use oopviz::{NavOutcome, Navigator};
//!
//! let mut nav = Navigator::new()?;
//! assert_eq!(nav.next()?, NavOutcome::Moved);
//!
//! let frame = nav.frame()?;
//! assert_eq!(frame.scene_index, 1);
//!
//! nav.goto(9)?;
//! assert_eq!(nav.state().resolved_status_of(oopviz::InstanceName::D1), Some("Online"));
//! # Ok::<(), oopviz::VizError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Domain model and scene data
pub mod error;
pub mod scene;
pub mod script;
pub mod source;
pub mod state;

// Derivation and navigation
pub mod cache;
pub mod controller;
pub mod engine;
pub mod frame;

// Presentation-facing collaborators
pub mod analysis;
pub mod dispatch;

// Re-export primary types at crate root for convenience
pub use analysis::{SymbolIndex, SymbolLocation};
pub use cache::SceneCache;
pub use controller::{NavOutcome, Navigator};
pub use dispatch::{NavHandle, NavRequest, NavResponse, NavRuntime, NavRuntimeConfig};
pub use engine::SceneEngine;
pub use error::{ConfigError, DerivationError, DispatchError, VizError, VizResult};
pub use frame::ViewFrame;
pub use scene::{Explanation, HoverLink, RenderFn, SceneDescriptor, Segment, TransitionFn};
pub use script::SceneScript;
pub use source::{DisplayListing, LineRange, SourceMap, PYTHON_SOURCE};
pub use state::{
    ClassLine, ClassRecord, InstanceName, InstanceRecord, ProgramState, SubclassRecord,
};

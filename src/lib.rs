//! `CellScene` - Retained-mode scene engine for terminal UIs
//!
//! A cell-grid scene graph with flexbox layout coordination, pointer and
//! keyboard routing, text selection, and a cooperative frame scheduler.
//! Widgets paint into cell buffers; the engine owns the tree, the hit
//! grid, and the tick loop.

// Crate-level lint configuration
#![warn(unsafe_code)]
#![allow(dead_code)] // Public API functions not yet used internally
#![allow(clippy::cast_possible_truncation)] // Intentional coordinate casts
#![allow(clippy::cast_sign_loss)] // Intentional coordinate conversions
#![allow(clippy::cast_precision_loss)] // Intentional for layout math
#![allow(clippy::cast_possible_wrap)] // Intentional coordinate conversions
#![allow(clippy::module_name_repetitions)] // Allow SceneTree::NodeOptions etc
#![allow(clippy::struct_excessive_bools)] // Node and event state need multiple flags
#![allow(clippy::missing_errors_doc)] // Docs WIP
#![allow(clippy::missing_panics_doc)] // Docs WIP
#![allow(clippy::missing_const_for_fn)] // Many functions could be const, not critical
#![allow(clippy::doc_markdown)] // Allow technical names without backticks
#![allow(clippy::use_self)] // Allow explicit type names in impl blocks
#![allow(clippy::needless_pass_by_value)] // Allow pass by value for small Copy types
#![allow(clippy::collapsible_if)] // Sometimes nested ifs are clearer
#![allow(clippy::cast_lossless)] // as casts are fine for primitive widening
#![allow(clippy::items_after_statements)] // Common pattern in tests
#![allow(clippy::redundant_clone)] // Clones in tests for clarity are fine
#![allow(clippy::semicolon_if_nothing_returned)] // Style preference

pub mod buffer;
pub mod cell;
pub mod color;
pub mod error;
pub mod geometry;
pub mod hitgrid;
pub mod input;
pub mod layout;
pub mod log;
pub mod render;
pub mod router;
pub mod scene;
pub mod selection;
pub mod style;
pub mod viewport;
pub mod widget;

// Re-export core types at crate root
pub use buffer::CellBuffer;
pub use cell::Cell;
pub use color::Rgba;
pub use error::{Error, Result};
pub use log::{LogLevel, emit_log, set_log_callback};
pub use style::{Style, TextAttributes};

// Re-export scene and layout types
pub use geometry::{Dimension, Edge, Offsets, PositionMode, Rect};
pub use layout::{ComputedLayout, LayoutEngine, LayoutId, TaffyEngine};
pub use scene::{MAX_BUFFER_CELLS, Node, NodeId, NodeOptions, SceneTree};
pub use widget::Widget;

// Re-export input and routing types
pub use hitgrid::HitGrid;
pub use input::{InputEvent, InputParser, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseInput};
pub use router::{KeyRouter, PointerEvent, PointerKind, PointerRouter, Propagation};
pub use selection::SelectionEngine;

// Re-export engine types
pub use render::{Engine, EngineOptions, FrameStats, NullSink, PresentSink, StopHandle};
pub use viewport::{RESIZE_DEBOUNCE, Viewport};

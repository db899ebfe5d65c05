#![warn(missing_docs)]
//! Playground Core - headless live-compiling playground for dataflow DSLs
//!
//! # Overview
//!
//! `playground-core` keeps an interactive compiler playground consistent while three processes
//! run at their own pace on a single event loop:
//!
//! - keystroke-driven recompilation through an external compiler module,
//! - projection of compiler diagnostics onto editor markers,
//! - asynchronous rendering of the dataflow graph.
//!
//! It does not draw anything. The host (a web page, a TUI, a test) forwards edits and toggle
//! flips, spawns the returned render jobs, and reads back markers and visible output.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Playground page (many surfaces, config)    │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Surface (source, toggles, view, notify)    │  ← State management
//! ├──────────────────────┬──────────────────────┤
//! │  Compile orchestrator│  Graph render        │  ← Tickets / tokens
//! │  (sync, tickets)     │  pipeline (async)    │
//! ├──────────────────────┴──────────────────────┤
//! │  Diagnostic mapper · Toggle schema          │  ← Pure data
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Staleness
//!
//! Nothing is cancelled. Every compile request carries a [`CompileTicket`] and every render
//! request a [`RenderToken`]; a result is applied only if its tag is still the latest one issued
//! for its surface, so a slow, older result can never overwrite a newer one.
//!
//! # Module Description
//!
//! - [`source`] - immutable source snapshots (rope-backed)
//! - [`diagnostics`] - compiler diagnostic model
//! - [`markers`] - diagnostic → editor marker projection
//! - [`toggles`] - ordered compiler toggles
//! - [`compile`] - compile orchestration and request tickets
//! - [`render`] - graph render state machine and panel
//! - [`templates`] - example program catalog
//! - [`surface`] - one playground instance
//! - [`playground`] - a page of surfaces
//! - [`config`] - YAML page configuration

pub mod compile;
pub mod config;
pub mod diagnostics;
pub mod markers;
pub mod playground;
pub mod render;
pub mod source;
pub mod surface;
pub mod templates;
pub mod toggles;

pub use compile::{
    Compilation, CompileOrchestrator, CompileResult, CompileSequencer, CompileTicket,
    CompiledOutput, Compiler, Dsl, ModuleStatus, PendingCompile, RawCompileOutput,
};
pub use config::{ConfigError, PlaygroundConfig, SurfaceConfig};
pub use diagnostics::{Diagnostic, DiagnosticSeverity, LineColumn, Span};
pub use markers::{ColumnUnits, Marker, MarkerOptions, MarkerSeverity, to_markers, to_markers_in};
pub use playground::{Playground, PlaygroundError};
pub use render::{
    DisplayedGraph, GRAPH_PLACEHOLDER, GraphPanel, GraphRenderer, GraphSnapshot, RenderCallback,
    RenderError, RenderJob, RenderOutcome, RenderPhase, RenderState, RenderToken, SurfaceId,
    SvgMarkup,
};
pub use source::SourceText;
pub use surface::{
    OutputView, PlaygroundSurface, SurfaceChange, SurfaceChangeCallback, SurfaceChangeType,
    SurfaceError, VisibleOutput,
};
pub use templates::{Template, TemplateCatalog};
pub use toggles::{ConfigState, ConfigToggle, ToggleError, ToggleSchema, WRITE_CONFIG_TOGGLES};

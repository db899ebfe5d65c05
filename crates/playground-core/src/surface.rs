//! Playground surfaces.
//!
//! A [`PlaygroundSurface`] is one editor + output panel instance. It ties the other modules
//! together with a unidirectional flow:
//!
//! 1. the host reports an edit ([`set_source`](PlaygroundSurface::set_source)), a toggle flip
//!    ([`toggle`](PlaygroundSurface::toggle)) or a template pick;
//! 2. the surface issues exactly one compile request, tagged with a ticket;
//! 3. if the ticket is still current, markers are replaced wholesale and, on success, a graph
//!    render is requested; the returned [`RenderJob`] is spawned by the host on its event loop;
//! 4. subscribers are notified and the host re-reads [`visible_output`](PlaygroundSurface::visible_output).
//!
//! # Example
//!
//! ```rust
//! use playground_core::{
//!     Compiler, CompiledOutput, Dsl, GraphRenderer, PlaygroundSurface, RawCompileOutput,
//!     RenderError, SurfaceId, SvgMarkup, ToggleSchema, VisibleOutput,
//! };
//! use futures::future::{FutureExt, LocalBoxFuture};
//! use std::rc::Rc;
//!
//! struct Echo;
//! impl Compiler for Echo {
//!     fn compile(&self, _dsl: Dsl, source: &str, _options: &[bool]) -> RawCompileOutput {
//!         RawCompileOutput {
//!             output: Some(CompiledOutput {
//!                 compiled: source.to_string(),
//!                 mermaid: format!("flowchart TD\n{}", source.len()),
//!             }),
//!             diagnostics: Vec::new(),
//!         }
//!     }
//! }
//!
//! struct Inline;
//! impl GraphRenderer for Inline {
//!     fn render(&self, _surface: &SurfaceId, source: &str)
//!         -> LocalBoxFuture<'static, Result<SvgMarkup, RenderError>> {
//!         let svg = SvgMarkup::new(format!("<svg>{source}</svg>"));
//!         async move { Ok(svg) }.boxed_local()
//!     }
//! }
//!
//! let mut surface = PlaygroundSurface::new(
//!     SurfaceId::new("demo"),
//!     Dsl::Dataflow,
//!     Rc::new(Echo),
//!     Rc::new(Inline),
//!     Rc::new(ToggleSchema::write_config()),
//! );
//! let job = surface.set_source("source_iter(0..3) -> null();").expect("render job");
//! futures::executor::block_on(job);
//!
//! match surface.visible_output() {
//!     VisibleOutput::Graph(graph) => assert!(graph.markup.starts_with("<svg>")),
//!     other => panic!("unexpected output: {other:?}"),
//! }
//! ```

use crate::compile::{
    Compilation, CompileOrchestrator, CompileResult, Compiler, Dsl, PendingCompile,
};
use crate::diagnostics::Diagnostic;
use crate::markers::{Marker, MarkerOptions, to_markers_in};
use crate::render::{GraphPanel, GraphRenderer, GraphSnapshot, RenderJob, SurfaceId};
use crate::source::SourceText;
use crate::templates::TemplateCatalog;
use crate::toggles::{ConfigState, ToggleError, ToggleSchema};
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use thiserror::Error;
use tracing::debug;

/// Errors produced by surface operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    /// Toggle update failed.
    #[error(transparent)]
    Toggle(#[from] ToggleError),
    /// The template name is not in the surface's catalog.
    #[error("unknown template `{0}`")]
    UnknownTemplate(String),
    /// A toggle state built on a different schema than the surface's.
    #[error("toggle state does not match the surface's toggle schema")]
    SchemaMismatch,
}

/// Which output tab is selected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputView {
    /// The rendered dataflow graph.
    #[default]
    Graph,
    /// The generated program text.
    CompiledText,
}

/// What the output panel should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisibleOutput<'a> {
    /// Nothing has been compiled yet.
    Pending,
    /// The graph tab of a successful compile.
    Graph(GraphSnapshot),
    /// The compiled-text tab of a successful compile.
    CompiledText(&'a str),
    /// Compilation failed; list these diagnostics instead of output.
    Failure(&'a [Diagnostic]),
    /// The compiler is unavailable; show this explanation instead of output.
    Unavailable(&'a str),
}

/// Surface change type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceChangeType {
    /// The source text was replaced.
    SourceChanged,
    /// A toggle value changed.
    TogglesChanged,
    /// A compile result was applied.
    CompileApplied,
    /// The marker set changed.
    MarkersChanged,
    /// The selected output tab changed.
    ViewChanged,
}

/// Surface change record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceChange {
    /// Change type.
    pub change_type: SurfaceChangeType,
    /// Old version number.
    pub old_version: u64,
    /// New version number.
    pub new_version: u64,
}

/// Surface change callback.
pub type SurfaceChangeCallback = Box<dyn FnMut(&SurfaceChange)>;

/// One playground instance: editor state, toggles, compile output and graph panel.
pub struct PlaygroundSurface {
    id: SurfaceId,
    source: SourceText,
    config: ConfigState,
    orchestrator: CompileOrchestrator,
    templates: TemplateCatalog,
    marker_options: MarkerOptions,
    compilation: Option<Compilation>,
    markers: Vec<Marker>,
    view: OutputView,
    graph: GraphPanel,
    version: u64,
    callbacks: Vec<SurfaceChangeCallback>,
}

impl PlaygroundSurface {
    /// Create a surface seeded with the first built-in template for `dsl`.
    ///
    /// Nothing is compiled until the first edit or an explicit [`Self::recompile`].
    pub fn new(
        id: SurfaceId,
        dsl: Dsl,
        compiler: Rc<dyn Compiler>,
        renderer: Rc<dyn GraphRenderer>,
        schema: Rc<ToggleSchema>,
    ) -> Self {
        let templates = TemplateCatalog::for_dsl(dsl);
        let source = templates
            .first()
            .map(|t| SourceText::new(&t.source))
            .unwrap_or_default();
        Self {
            graph: GraphPanel::new(id.clone(), renderer),
            id,
            source,
            config: ConfigState::new(schema),
            orchestrator: CompileOrchestrator::new(compiler, dsl),
            templates,
            marker_options: MarkerOptions::default(),
            compilation: None,
            markers: Vec::new(),
            view: OutputView::default(),
            version: 0,
            callbacks: Vec::new(),
        }
    }

    /// Replace the template catalog. The source is reseeded from its first template.
    pub fn with_templates(mut self, templates: TemplateCatalog) -> Self {
        if let Some(first) = templates.first() {
            self.source = SourceText::new(&first.source);
        }
        self.templates = templates;
        self
    }

    /// Start from `source` instead of the first template.
    pub fn with_source(mut self, source: impl Into<SourceText>) -> Self {
        self.source = source.into();
        self
    }

    /// Start from the given toggle values.
    ///
    /// The state's schema must be this surface's schema (or an equal one); otherwise the
    /// positional option vector would no longer line up with the compiler's toggles.
    pub fn with_config(mut self, config: ConfigState) -> Result<Self, SurfaceError> {
        let ours = self.config.schema();
        let theirs = config.schema();
        if !Rc::ptr_eq(ours, theirs) && ours != theirs {
            return Err(SurfaceError::SchemaMismatch);
        }
        self.config = config;
        Ok(self)
    }

    /// Set marker projection options.
    pub fn with_marker_options(mut self, options: MarkerOptions) -> Self {
        self.marker_options = options;
        self
    }

    /// Select the initial output tab.
    pub fn with_view(mut self, view: OutputView) -> Self {
        self.view = view;
        self
    }

    /// Surface id.
    pub fn id(&self) -> &SurfaceId {
        &self.id
    }

    /// DSL compiled by this surface.
    pub fn dsl(&self) -> Dsl {
        self.orchestrator.dsl()
    }

    /// Current source snapshot.
    pub fn source(&self) -> &SourceText {
        &self.source
    }

    /// Current toggle values.
    pub fn config(&self) -> &ConfigState {
        &self.config
    }

    /// Template catalog.
    pub fn templates(&self) -> &TemplateCatalog {
        &self.templates
    }

    /// The last applied compilation.
    pub fn compilation(&self) -> Option<&Compilation> {
        self.compilation.as_ref()
    }

    /// Markers for the editor (replace the editor's whole marker set with these).
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Selected output tab.
    pub fn view(&self) -> OutputView {
        self.view
    }

    /// The graph panel.
    pub fn graph(&self) -> &GraphPanel {
        &self.graph
    }

    /// Surface version (incremented on every change notification).
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Subscribe to surface changes.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&SurfaceChange) + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Replace the source text and recompile.
    pub fn set_source(&mut self, source: impl Into<SourceText>) -> Option<RenderJob> {
        self.source = source.into();
        self.mark_changed(SurfaceChangeType::SourceChanged);
        self.recompile()
    }

    /// Replace the source with the named template and recompile.
    pub fn select_template(&mut self, name: &str) -> Result<Option<RenderJob>, SurfaceError> {
        let source = self
            .templates
            .get(name)
            .map(|t| SourceText::new(&t.source))
            .ok_or_else(|| SurfaceError::UnknownTemplate(name.to_string()))?;
        Ok(self.set_source(source))
    }

    /// Flip a toggle and recompile.
    pub fn toggle(&mut self, name: &str) -> Result<Option<RenderJob>, SurfaceError> {
        self.config.toggle(name)?;
        self.mark_changed(SurfaceChangeType::TogglesChanged);
        Ok(self.recompile())
    }

    /// Set a toggle; recompiles only if the value changed.
    pub fn set_toggle(
        &mut self,
        name: &str,
        value: bool,
    ) -> Result<Option<RenderJob>, SurfaceError> {
        if !self.config.set(name, value)? {
            return Ok(None);
        }
        self.mark_changed(SurfaceChangeType::TogglesChanged);
        Ok(self.recompile())
    }

    /// Select the output tab.
    pub fn set_view(&mut self, view: OutputView) {
        if self.view != view {
            self.view = view;
            self.mark_changed(SurfaceChangeType::ViewChanged);
        }
    }

    /// Compile the current source and apply the result immediately.
    pub fn recompile(&mut self) -> Option<RenderJob> {
        let pending = self.begin_compile();
        self.apply_compile(pending)
    }

    /// Compile the current source without applying it.
    ///
    /// Issuing this supersedes every earlier pending compile of this surface.
    pub fn begin_compile(&mut self) -> PendingCompile {
        let source = self.source.as_text();
        self.orchestrator.request(&source, self.config.values())
    }

    /// Apply a compile result if it is still the latest request.
    ///
    /// Stale results are dropped without any visible change. Returns the graph render job when
    /// the compile succeeded and the graph description differs from what the panel shows or is
    /// rendering.
    pub fn apply_compile(&mut self, pending: PendingCompile) -> Option<RenderJob> {
        if !self.orchestrator.accept(&pending) {
            return None;
        }

        let compilation = pending.compilation;
        let markers = to_markers_in(&compilation.diagnostics, &self.source, self.marker_options);
        let job = match &compilation.result {
            CompileResult::Success { graph_source, .. } => {
                self.graph.request_if_changed(graph_source)
            }
            CompileResult::Failure | CompileResult::Unavailable { .. } => {
                self.graph.invalidate();
                None
            }
        };
        debug!(
            surface = %self.id,
            ticket = pending.ticket.get(),
            markers = markers.len(),
            "compile applied"
        );

        self.compilation = Some(compilation);
        self.mark_changed(SurfaceChangeType::CompileApplied);
        if markers != self.markers {
            self.markers = markers;
            self.mark_changed(SurfaceChangeType::MarkersChanged);
        }
        job
    }

    /// What the output panel should show now.
    pub fn visible_output(&self) -> VisibleOutput<'_> {
        let Some(compilation) = &self.compilation else {
            return VisibleOutput::Pending;
        };
        match &compilation.result {
            CompileResult::Success { compiled_text, .. } => match self.view {
                OutputView::Graph => VisibleOutput::Graph(self.graph.snapshot()),
                OutputView::CompiledText => VisibleOutput::CompiledText(compiled_text),
            },
            CompileResult::Failure => VisibleOutput::Failure(&compilation.diagnostics),
            CompileResult::Unavailable { reason } => VisibleOutput::Unavailable(reason),
        }
    }

    /// One line per diagnostic, as the failure list shows them.
    pub fn failure_lines(&self) -> Vec<String> {
        self.compilation
            .iter()
            .flat_map(|c| c.diagnostics.iter())
            .map(Diagnostic::to_string)
            .collect()
    }

    fn mark_changed(&mut self, change_type: SurfaceChangeType) {
        let old_version = self.version;
        self.version = self.version.saturating_add(1);
        let change = SurfaceChange {
            change_type,
            old_version,
            new_version: self.version,
        };
        for callback in &mut self.callbacks {
            callback(&change);
        }
    }
}

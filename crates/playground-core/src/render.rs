//! Graph render pipeline.
//!
//! Rendering a graph description into SVG is the only operation in the playground that
//! suspends: it completes on a later turn of the event loop, and a newer request may be issued
//! before an older one finishes. Staleness is handled with [`RenderToken`]s rather than
//! cancellation:
//!
//! ```text
//!            begin(source)                complete(latest token, Ok)
//!   Idle ──────────────────▶ Rendering ──────────────────────────────▶ Displayed (markup replaced)
//!                               │
//!                               ├── complete(older token, _) ───────▶ Superseded (ignored)
//!                               └── complete(latest token, Err) ────▶ Failed (last markup kept,
//!                                                                      inline notice set)
//! ```
//!
//! [`RenderState`] is the explicit per-surface state object; it is only mutated through
//! [`RenderState::begin`], [`RenderState::complete`] and [`RenderState::invalidate`], so the
//! protocol works the same with callbacks, futures, or channels. [`GraphPanel`] drives it with
//! futures on a single-threaded executor.

use futures::future::{FutureExt, LocalBoxFuture};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, warn};

/// Markup shown before the first render completes.
pub const GRAPH_PLACEHOLDER: &str = "Loading graph...";

/// Stable identifier of one playground surface.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurfaceId(String);

impl SurfaceId {
    /// Create a surface id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SurfaceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Inline SVG markup produced by the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SvgMarkup(String);

impl SvgMarkup {
    /// Wrap rendered markup.
    pub fn new(markup: impl Into<String>) -> Self {
        Self(markup.into())
    }

    /// The markup text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unwrap into the markup text.
    pub fn into_string(self) -> String {
        self.0
    }
}

/// Render failures. These never become compile diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The graph description could not be parsed by the renderer.
    #[error("malformed graph description: {0}")]
    MalformedGraph(String),
    /// The renderer returned something other than SVG markup.
    #[error("unexpected renderer response: {0}")]
    UnexpectedResponse(String),
    /// Any other rendering-engine failure.
    #[error("rendering engine error: {0}")]
    Engine(String),
}

/// The external graph renderer.
pub trait GraphRenderer {
    /// Render `source` for `surface`. The returned future may complete on a later turn.
    fn render(
        &self,
        surface: &SurfaceId,
        source: &str,
    ) -> LocalBoxFuture<'static, Result<SvgMarkup, RenderError>>;
}

/// Tag identifying one render request of one surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RenderToken(u64);

impl RenderToken {
    /// Raw sequence number.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Whether a render is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderPhase {
    /// No pending render.
    Idle,
    /// The latest request is in flight.
    Rendering {
        /// Token of the in-flight request.
        token: RenderToken,
        /// Graph description being rendered.
        source: String,
    },
}

/// What happened when a render completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The markup was swapped into the panel.
    Displayed(RenderToken),
    /// A newer request was issued first; the result was dropped.
    Superseded(RenderToken),
    /// The latest request failed; the previous markup stays visible.
    Failed {
        /// Token of the failed request.
        token: RenderToken,
        /// Renderer error.
        error: RenderError,
    },
}

/// The graph currently shown on a surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayedGraph {
    /// Rendered markup.
    pub markup: SvgMarkup,
    /// Graph description the markup was rendered from.
    pub source: String,
    /// Token of the render that produced it.
    pub token: RenderToken,
}

/// Per-surface render state: `{ latest token, displayed markup }` plus the in-flight phase.
#[derive(Debug, Clone)]
pub struct RenderState {
    surface: SurfaceId,
    latest: u64,
    phase: RenderPhase,
    displayed: Option<DisplayedGraph>,
    notice: Option<String>,
}

impl RenderState {
    /// Create an idle state for `surface`.
    pub fn new(surface: SurfaceId) -> Self {
        Self {
            surface,
            latest: 0,
            phase: RenderPhase::Idle,
            displayed: None,
            notice: None,
        }
    }

    /// Surface this state belongs to.
    pub fn surface(&self) -> &SurfaceId {
        &self.surface
    }

    /// Mint a token for a new render of `source`, superseding anything in flight.
    pub fn begin(&mut self, source: &str) -> RenderToken {
        let token = self.mint();
        self.phase = RenderPhase::Rendering {
            token,
            source: source.to_string(),
        };
        token
    }

    /// Supersede any in-flight render without starting a new one.
    pub fn invalidate(&mut self) -> RenderToken {
        let token = self.mint();
        self.phase = RenderPhase::Idle;
        token
    }

    /// Apply the completion of the render tagged `token`.
    pub fn complete(
        &mut self,
        token: RenderToken,
        result: Result<SvgMarkup, RenderError>,
    ) -> RenderOutcome {
        if token.0 != self.latest {
            debug!(
                surface = %self.surface,
                token = token.0,
                latest = self.latest,
                "discarding superseded render"
            );
            return RenderOutcome::Superseded(token);
        }

        let source = match std::mem::replace(&mut self.phase, RenderPhase::Idle) {
            RenderPhase::Rendering { source, .. } => source,
            // Already completed, or minted by `invalidate`.
            RenderPhase::Idle => return RenderOutcome::Superseded(token),
        };

        match result {
            Ok(markup) => {
                debug!(surface = %self.surface, token = token.0, "graph displayed");
                self.displayed = Some(DisplayedGraph {
                    markup,
                    source,
                    token,
                });
                self.notice = None;
                RenderOutcome::Displayed(token)
            }
            Err(error) => {
                warn!(surface = %self.surface, token = token.0, %error, "graph render failed");
                self.notice = Some(format!("Graph rendering failed: {error}"));
                RenderOutcome::Failed { token, error }
            }
        }
    }

    /// Current phase.
    pub fn phase(&self) -> &RenderPhase {
        &self.phase
    }

    /// Most recently issued token, if any.
    pub fn latest_token(&self) -> Option<RenderToken> {
        (self.latest > 0).then_some(RenderToken(self.latest))
    }

    /// The graph currently shown, if any render has completed.
    pub fn displayed(&self) -> Option<&DisplayedGraph> {
        self.displayed.as_ref()
    }

    /// Markup to show: the displayed graph, or [`GRAPH_PLACEHOLDER`].
    pub fn markup_or_placeholder(&self) -> &str {
        self.displayed
            .as_ref()
            .map(|graph| graph.markup.as_str())
            .unwrap_or(GRAPH_PLACEHOLDER)
    }

    /// Inline notice left by the last failed render.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    fn mint(&mut self) -> RenderToken {
        self.latest = self.latest.saturating_add(1);
        RenderToken(self.latest)
    }
}

/// A render in flight. Spawn it on the event loop; it resolves to the applied outcome.
pub type RenderJob = LocalBoxFuture<'static, RenderOutcome>;

/// Callback invoked after a render changes what the panel shows.
pub type RenderCallback = Box<dyn FnMut(&RenderOutcome)>;

struct PanelShared {
    state: RenderState,
    callbacks: Vec<RenderCallback>,
}

/// The graph panel of one surface.
pub struct GraphPanel {
    surface: SurfaceId,
    renderer: Rc<dyn GraphRenderer>,
    shared: Rc<RefCell<PanelShared>>,
}

impl GraphPanel {
    /// Create a panel for `surface` backed by `renderer`.
    pub fn new(surface: SurfaceId, renderer: Rc<dyn GraphRenderer>) -> Self {
        let state = RenderState::new(surface.clone());
        Self {
            surface,
            renderer,
            shared: Rc::new(RefCell::new(PanelShared {
                state,
                callbacks: Vec::new(),
            })),
        }
    }

    /// Surface id.
    pub fn surface(&self) -> &SurfaceId {
        &self.surface
    }

    /// Request a render of `source`.
    ///
    /// The token is minted now, so request order decides which result wins regardless of the
    /// order in which the returned jobs are polled or complete.
    pub fn request(&self, source: &str) -> RenderJob {
        let token = self.shared.borrow_mut().state.begin(source);
        debug!(surface = %self.surface, token = token.0, "render requested");
        let pending = self.renderer.render(&self.surface, source);
        let shared = Rc::clone(&self.shared);

        async move {
            let result = pending.await;
            let outcome = shared.borrow_mut().state.complete(token, result);
            if !matches!(outcome, RenderOutcome::Superseded(_)) {
                notify(&shared, &outcome);
            }
            outcome
        }
        .boxed_local()
    }

    /// Request a render only if `source` differs from what the panel is rendering or showing.
    pub fn request_if_changed(&self, source: &str) -> Option<RenderJob> {
        {
            let mut shared = self.shared.borrow_mut();
            let state = &mut shared.state;
            let unchanged = match state.phase() {
                RenderPhase::Rendering {
                    source: in_flight, ..
                } => in_flight == source,
                RenderPhase::Idle => state.displayed().is_some_and(|graph| graph.source == source),
            };
            if unchanged {
                if matches!(state.phase(), RenderPhase::Idle) {
                    state.notice = None;
                }
                debug!(surface = %self.surface, "graph description unchanged, not re-rendering");
                return None;
            }
        }
        Some(self.request(source))
    }

    /// Supersede any in-flight render (used when the current source no longer compiles).
    pub fn invalidate(&self) {
        self.shared.borrow_mut().state.invalidate();
    }

    /// Subscribe to displayed/failed render outcomes.
    pub fn subscribe<F>(&self, callback: F)
    where
        F: FnMut(&RenderOutcome) + 'static,
    {
        self.shared.borrow_mut().callbacks.push(Box::new(callback));
    }

    /// Snapshot of what the panel shows.
    pub fn snapshot(&self) -> GraphSnapshot {
        let shared = self.shared.borrow();
        let state = &shared.state;
        GraphSnapshot {
            markup: state.markup_or_placeholder().to_string(),
            source: state.displayed().map(|graph| graph.source.clone()),
            is_placeholder: state.displayed().is_none(),
            is_rendering: matches!(state.phase(), RenderPhase::Rendering { .. }),
            notice: state.notice().map(str::to_string),
        }
    }

    /// Read the render state.
    pub fn with_state<R>(&self, f: impl FnOnce(&RenderState) -> R) -> R {
        f(&self.shared.borrow().state)
    }
}

fn notify(shared: &Rc<RefCell<PanelShared>>, outcome: &RenderOutcome) {
    // Callbacks may read the panel, so they run without the borrow held.
    let mut callbacks = std::mem::take(&mut shared.borrow_mut().callbacks);
    for callback in callbacks.iter_mut() {
        callback(outcome);
    }
    let mut guard = shared.borrow_mut();
    let added = std::mem::replace(&mut guard.callbacks, callbacks);
    guard.callbacks.extend(added);
}

/// What a graph panel shows at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphSnapshot {
    /// Markup (or the placeholder).
    pub markup: String,
    /// Graph description the markup was rendered from.
    pub source: Option<String>,
    /// Whether `markup` is the placeholder.
    pub is_placeholder: bool,
    /// Whether a render is in flight.
    pub is_rendering: bool,
    /// Inline notice from the last failed render.
    pub notice: Option<String>,
}

//! Compile orchestration.
//!
//! The external compiler module is a pure function from `(source, ordered toggles)` to a result
//! value. [`CompileOrchestrator`] is a direct call-through to it that:
//!
//! - decides success vs. failure once, as a tagged [`CompileResult`], so callers match instead of
//!   null-checking the output;
//! - refuses to call a module that has not finished loading and reports
//!   [`CompileResult::Unavailable`] instead;
//! - tags every request with a [`CompileTicket`] so that a result is applied only if no newer
//!   request has been issued since (last request wins).
//!
//! The orchestrator never validates the source and has no failure mode of its own.

use crate::diagnostics::{Diagnostic, Span};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use tracing::{debug, warn};

/// The DSL surfaces exposed by the compiler module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dsl {
    /// The dataflow surface syntax.
    #[default]
    Dataflow,
    /// The Datalog-like sublanguage.
    Datalog,
}

impl Dsl {
    /// Name of the module entry point compiling this DSL.
    pub fn entry_point(self) -> &'static str {
        match self {
            Self::Dataflow => "compile_hydroflow",
            Self::Datalog => "compile_datalog",
        }
    }
}

impl fmt::Display for Dsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dataflow => f.write_str("dataflow"),
            Self::Datalog => f.write_str("datalog"),
        }
    }
}

/// Load state of the compiler module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleStatus {
    /// The module is still being fetched/instantiated.
    Loading,
    /// The module can be called.
    Ready,
    /// The module could not be loaded at all.
    Failed(String),
}

/// Successful output in the compiler's wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledOutput {
    /// Generated program text.
    pub compiled: String,
    /// Graph description (mermaid).
    pub mermaid: String,
}

/// A compiler result in the wire shape: output is `None` when compilation failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCompileOutput {
    /// Output, present only on success.
    pub output: Option<CompiledOutput>,
    /// Diagnostics (advisory on success, explaining the failure otherwise).
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

/// The external compiler module.
///
/// Implementations must be stateless per call: overlapping calls from several surfaces share one
/// instance without locking.
pub trait Compiler {
    /// Current load state. Compilation is attempted only when this is [`ModuleStatus::Ready`].
    fn status(&self) -> ModuleStatus {
        ModuleStatus::Ready
    }

    /// Compile `source` for `dsl` with the toggle values in schema order.
    fn compile(&self, dsl: Dsl, source: &str, options: &[bool]) -> RawCompileOutput;
}

/// Tagged outcome of one compile call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileResult {
    /// Compiled text and graph description are both available.
    Success {
        /// Generated program text.
        compiled_text: String,
        /// Graph description for the render pipeline.
        graph_source: String,
    },
    /// No output; the diagnostics explain why.
    Failure,
    /// The compiler module is not loaded; no call was made.
    Unavailable {
        /// Explanation shown in place of output.
        reason: String,
    },
}

/// A compile result paired with its diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compilation {
    /// Tagged result.
    pub result: CompileResult,
    /// Diagnostics for this call (never empty unless the result is a success).
    pub diagnostics: Vec<Diagnostic>,
}

impl Compilation {
    /// Whether output is available.
    pub fn is_success(&self) -> bool {
        matches!(self.result, CompileResult::Success { .. })
    }

    /// Graph description, when the compile succeeded.
    pub fn graph_source(&self) -> Option<&str> {
        match &self.result {
            CompileResult::Success { graph_source, .. } => Some(graph_source),
            _ => None,
        }
    }

    /// Generated program text, when the compile succeeded.
    pub fn compiled_text(&self) -> Option<&str> {
        match &self.result {
            CompileResult::Success { compiled_text, .. } => Some(compiled_text),
            _ => None,
        }
    }

    fn unavailable(reason: String) -> Self {
        let diagnostic = Diagnostic::warning(Span::call_site(), reason.clone());
        Self {
            result: CompileResult::Unavailable { reason },
            diagnostics: vec![diagnostic],
        }
    }
}

impl From<RawCompileOutput> for Compilation {
    fn from(raw: RawCompileOutput) -> Self {
        let RawCompileOutput {
            output,
            mut diagnostics,
        } = raw;
        let result = match output {
            Some(CompiledOutput { compiled, mermaid }) => CompileResult::Success {
                compiled_text: compiled,
                graph_source: mermaid,
            },
            None => {
                if diagnostics.is_empty() {
                    diagnostics.push(Diagnostic::error(
                        Span::call_site(),
                        "compilation failed without diagnostics",
                    ));
                }
                CompileResult::Failure
            }
        };
        Self {
            result,
            diagnostics,
        }
    }
}

/// Request-sequence tag attached to a compile call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompileTicket(u64);

impl CompileTicket {
    /// Raw sequence number.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Mints [`CompileTicket`]s and tracks which one is current.
#[derive(Debug, Clone, Default)]
pub struct CompileSequencer {
    latest: u64,
}

impl CompileSequencer {
    /// Create a sequencer with no tickets issued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new ticket, superseding all earlier ones.
    pub fn issue(&mut self) -> CompileTicket {
        self.latest = self.latest.saturating_add(1);
        CompileTicket(self.latest)
    }

    /// Whether `ticket` is the most recently issued one.
    pub fn is_current(&self, ticket: CompileTicket) -> bool {
        ticket.0 == self.latest
    }

    /// The most recently issued ticket, if any.
    pub fn latest(&self) -> Option<CompileTicket> {
        (self.latest > 0).then_some(CompileTicket(self.latest))
    }
}

/// A compile whose effects have not been applied yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCompile {
    /// Sequence tag of the request.
    pub ticket: CompileTicket,
    /// The compile outcome.
    pub compilation: Compilation,
}

/// Call-through to the shared compiler module for one DSL surface.
pub struct CompileOrchestrator {
    compiler: Rc<dyn Compiler>,
    dsl: Dsl,
    sequencer: CompileSequencer,
}

impl CompileOrchestrator {
    /// Create an orchestrator over a shared compiler module.
    pub fn new(compiler: Rc<dyn Compiler>, dsl: Dsl) -> Self {
        Self {
            compiler,
            dsl,
            sequencer: CompileSequencer::new(),
        }
    }

    /// DSL compiled by this orchestrator.
    pub fn dsl(&self) -> Dsl {
        self.dsl
    }

    /// The shared compiler module.
    pub fn compiler(&self) -> &Rc<dyn Compiler> {
        &self.compiler
    }

    /// Compile `source` with toggle values in schema order.
    ///
    /// Any string is accepted, including empty or invalid input.
    pub fn compile(&self, source: &str, options: &[bool]) -> Compilation {
        match self.compiler.status() {
            ModuleStatus::Ready => {}
            ModuleStatus::Loading => {
                debug!(dsl = %self.dsl, "compiler not loaded yet, skipping compile");
                return Compilation::unavailable("compiler is still loading".to_string());
            }
            ModuleStatus::Failed(reason) => {
                warn!(dsl = %self.dsl, %reason, "compiler failed to load");
                return Compilation::unavailable(format!("compiler failed to load: {reason}"));
            }
        }

        let compilation = Compilation::from(self.compiler.compile(self.dsl, source, options));
        debug!(
            dsl = %self.dsl,
            success = compilation.is_success(),
            diagnostics = compilation.diagnostics.len(),
            "compiled"
        );
        compilation
    }

    /// Issue a ticket and compile; the caller applies the result later via [`Self::accept`].
    pub fn request(&mut self, source: &str, options: &[bool]) -> PendingCompile {
        let ticket = self.sequencer.issue();
        let compilation = self.compile(source, options);
        PendingCompile {
            ticket,
            compilation,
        }
    }

    /// Whether `pending` may still be applied (no newer request was issued).
    pub fn accept(&self, pending: &PendingCompile) -> bool {
        let current = self.sequencer.is_current(pending.ticket);
        if !current {
            debug!(
                dsl = %self.dsl,
                ticket = pending.ticket.get(),
                "discarding stale compile result"
            );
        }
        current
    }

    /// The ticket sequencer.
    pub fn sequencer(&self) -> &CompileSequencer {
        &self.sequencer
    }
}

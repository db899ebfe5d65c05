#![allow(dead_code)]

use futures::channel::oneshot;
use futures::future::{FutureExt, LocalBoxFuture};
use playground_core::{
    CompiledOutput, Compiler, Diagnostic, Dsl, GraphRenderer, LineColumn, ModuleStatus,
    RawCompileOutput, RenderError, Span, SurfaceId, SvgMarkup,
};
use std::cell::{Cell, RefCell};

pub const HELLO: &str = "source_iter(0..10) -> for_each(|n| println!(\"Hello {}\", n));";

/// Deterministic stand-in for the compiler module.
///
/// - blank input fails with a call-site error;
/// - the word `error` fails with an error spanning that word;
/// - the word `warn` succeeds with a warning spanning that word;
/// - anything else succeeds; the graph description embeds the toggle values.
pub struct FakeCompiler {
    status: RefCell<ModuleStatus>,
    calls: Cell<usize>,
    last_options: RefCell<Vec<bool>>,
}

impl FakeCompiler {
    pub fn new() -> Self {
        Self::with_status(ModuleStatus::Ready)
    }

    pub fn with_status(status: ModuleStatus) -> Self {
        Self {
            status: RefCell::new(status),
            calls: Cell::new(0),
            last_options: RefCell::new(Vec::new()),
        }
    }

    pub fn set_status(&self, status: ModuleStatus) {
        *self.status.borrow_mut() = status;
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    pub fn last_options(&self) -> Vec<bool> {
        self.last_options.borrow().clone()
    }
}

fn find_word(source: &str, word: &str) -> Option<Span> {
    for (idx, line) in source.split('\n').enumerate() {
        if let Some(byte) = line.find(word) {
            let column = line[..byte].chars().count();
            let start = LineColumn::new(idx + 1, column);
            let end = LineColumn::new(idx + 1, column + word.chars().count());
            return Some(Span::new(start, end));
        }
    }
    None
}

impl Compiler for FakeCompiler {
    fn status(&self) -> ModuleStatus {
        self.status.borrow().clone()
    }

    fn compile(&self, dsl: Dsl, source: &str, options: &[bool]) -> RawCompileOutput {
        self.calls.set(self.calls.get() + 1);
        *self.last_options.borrow_mut() = options.to_vec();

        if source.trim().is_empty() {
            return RawCompileOutput {
                output: None,
                diagnostics: vec![Diagnostic::error(
                    Span::call_site(),
                    "unexpected end of input",
                )],
            };
        }
        if let Some(span) = find_word(source, "error") {
            return RawCompileOutput {
                output: None,
                diagnostics: vec![Diagnostic::error(span, "cannot find operator `error`")],
            };
        }

        let diagnostics = find_word(source, "warn")
            .map(|span| vec![Diagnostic::warning(span, "unused variable `warn`")])
            .unwrap_or_default();
        let flags: Vec<&str> = options
            .iter()
            .map(|on| if *on { "1" } else { "0" })
            .collect();
        RawCompileOutput {
            output: Some(CompiledOutput {
                compiled: format!("fn main() {{\n    // {dsl}\n    {}\n}}\n", source.trim()),
                mermaid: format!(
                    "%% options {}\nflowchart TD\n{}",
                    flags.join(""),
                    source.lines().count()
                ),
            }),
            diagnostics,
        }
    }
}

/// Renders immediately; graph descriptions containing `malformed` are rejected.
pub struct InlineRenderer;

impl GraphRenderer for InlineRenderer {
    fn render(
        &self,
        surface: &SurfaceId,
        source: &str,
    ) -> LocalBoxFuture<'static, Result<SvgMarkup, RenderError>> {
        let result = if source.contains("malformed") {
            Err(RenderError::MalformedGraph("parse error on line 1".to_string()))
        } else {
            Ok(svg_for(surface, source))
        };
        async move { result }.boxed_local()
    }
}

pub fn svg_for(surface: &SurfaceId, source: &str) -> SvgMarkup {
    SvgMarkup::new(format!("<svg id=\"{surface}\">{source}</svg>"))
}

/// A render request waiting for the test to resolve it.
pub struct PendingRender {
    pub surface: SurfaceId,
    pub source: String,
    sender: Option<oneshot::Sender<Result<SvgMarkup, RenderError>>>,
}

/// Renders only when the test says so, in whatever order the test chooses.
#[derive(Default)]
pub struct ManualRenderer {
    pending: RefCell<Vec<PendingRender>>,
}

impl ManualRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_count(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn source_of(&self, index: usize) -> String {
        self.pending.borrow()[index].source.clone()
    }

    /// Resolve request `index` with markup derived from its source.
    pub fn succeed(&self, index: usize) {
        let mut pending = self.pending.borrow_mut();
        let request = &mut pending[index];
        let svg = svg_for(&request.surface, &request.source);
        if let Some(sender) = request.sender.take() {
            let _ = sender.send(Ok(svg));
        }
    }

    /// Reject request `index`.
    pub fn fail(&self, index: usize, error: RenderError) {
        let mut pending = self.pending.borrow_mut();
        if let Some(sender) = pending[index].sender.take() {
            let _ = sender.send(Err(error));
        }
    }
}

impl GraphRenderer for ManualRenderer {
    fn render(
        &self,
        surface: &SurfaceId,
        source: &str,
    ) -> LocalBoxFuture<'static, Result<SvgMarkup, RenderError>> {
        let (sender, receiver) = oneshot::channel();
        self.pending.borrow_mut().push(PendingRender {
            surface: surface.clone(),
            source: source.to_string(),
            sender: Some(sender),
        });
        async move {
            receiver
                .await
                .unwrap_or_else(|_| Err(RenderError::Engine("render dropped".to_string())))
        }
        .boxed_local()
    }
}

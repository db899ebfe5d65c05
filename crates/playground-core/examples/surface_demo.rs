//! Surface demo
//!
//! Drives one playground surface with a toy compiler and a delayed renderer, showing that a
//! slow render issued first never overwrites a newer graph.
//!
//! Run with `RUST_LOG=playground_core=debug` to see tickets and tokens.

use futures::channel::oneshot;
use futures::executor::LocalPool;
use futures::future::{FutureExt, LocalBoxFuture};
use futures::task::LocalSpawnExt;
use playground_core::{
    CompiledOutput, Compiler, Diagnostic, Dsl, GraphRenderer, LineColumn, PlaygroundSurface,
    RawCompileOutput, RenderError, Span, SurfaceId, SvgMarkup, ToggleSchema, VisibleOutput,
};
use std::cell::RefCell;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

/// Accepts anything with balanced parentheses.
struct ParenCompiler;

impl Compiler for ParenCompiler {
    fn compile(&self, _dsl: Dsl, source: &str, options: &[bool]) -> RawCompileOutput {
        let mut depth = 0i64;
        for (idx, line) in source.split('\n').enumerate() {
            for (column, ch) in line.chars().enumerate() {
                depth += match ch {
                    '(' => 1,
                    ')' => -1,
                    _ => 0,
                };
                if depth < 0 {
                    let at = LineColumn::new(idx + 1, column);
                    return RawCompileOutput {
                        output: None,
                        diagnostics: vec![Diagnostic::error(
                            Span::new(at, LineColumn::new(idx + 1, column + 1)),
                            "unexpected `)`",
                        )],
                    };
                }
            }
        }
        if depth > 0 {
            return RawCompileOutput {
                output: None,
                diagnostics: vec![Diagnostic::error(Span::call_site(), "unclosed `(`")],
            };
        }

        let subgraphs = if options.first().copied().unwrap_or(false) {
            "flat"
        } else {
            "nested"
        };
        RawCompileOutput {
            output: Some(CompiledOutput {
                compiled: format!("// generated\n{source}\n"),
                mermaid: format!("flowchart TD\n%% {subgraphs}\n%% {} chars", source.len()),
            }),
            diagnostics: Vec::new(),
        }
    }
}

type Pending = Vec<(String, oneshot::Sender<Result<SvgMarkup, RenderError>>)>;

/// Holds renders until `flush` is called, newest first.
#[derive(Default)]
struct DelayedRenderer {
    pending: RefCell<Pending>,
}

impl DelayedRenderer {
    fn flush_newest_first(&self) {
        let mut pending = std::mem::take(&mut *self.pending.borrow_mut());
        while let Some((source, sender)) = pending.pop() {
            let markup = SvgMarkup::new(format!("<svg><!-- {} --></svg>", source.replace('\n', " ")));
            let _ = sender.send(Ok(markup));
        }
    }
}

impl GraphRenderer for DelayedRenderer {
    fn render(
        &self,
        _surface: &SurfaceId,
        source: &str,
    ) -> LocalBoxFuture<'static, Result<SvgMarkup, RenderError>> {
        let (sender, receiver) = oneshot::channel();
        self.pending.borrow_mut().push((source.to_string(), sender));
        async move {
            receiver
                .await
                .unwrap_or_else(|_| Err(RenderError::Engine("renderer went away".to_string())))
        }
        .boxed_local()
    }
}

fn describe(surface: &PlaygroundSurface) {
    match surface.visible_output() {
        VisibleOutput::Pending => println!("  output: (not compiled yet)"),
        VisibleOutput::Graph(graph) => println!(
            "  graph: {} (rendering: {})",
            graph.markup, graph.is_rendering
        ),
        VisibleOutput::CompiledText(text) => println!("  compiled: {text}"),
        VisibleOutput::Failure(_) => {
            for line in surface.failure_lines() {
                println!("  {line}");
            }
        }
        VisibleOutput::Unavailable(reason) => println!("  unavailable: {reason}"),
    }
    for marker in surface.markers() {
        println!(
            "  marker {}:{}-{}:{} {:?} {}",
            marker.start_line_number,
            marker.start_column,
            marker.end_line_number,
            marker.end_column,
            marker.severity,
            marker.message
        );
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let renderer = Rc::new(DelayedRenderer::default());
    let mut surface = PlaygroundSurface::new(
        SurfaceId::new("demo"),
        Dsl::Dataflow,
        Rc::new(ParenCompiler),
        renderer.clone(),
        Rc::new(ToggleSchema::write_config()),
    );
    surface.subscribe(|change| {
        println!(
            "  change {:?} (version {} -> {})",
            change.change_type, change.old_version, change.new_version
        );
    });

    let mut pool = LocalPool::new();
    let spawner = pool.spawner();

    println!("1. two edits in a row:");
    for source in ["source_iter(0..3) -> null()", "source_iter(0..30) -> null()"] {
        if let Some(job) = surface.set_source(source) {
            let _ = spawner.spawn_local(async move {
                job.await;
            });
        }
    }
    pool.run_until_stalled();
    describe(&surface);

    println!("\n2. renders resolve newest first:");
    renderer.flush_newest_first();
    pool.run_until_stalled();
    describe(&surface);

    println!("\n3. a broken edit:");
    let _ = surface.set_source("source_iter(0..3))\n  -> null()");
    describe(&surface);

    println!("\n4. flatten subgraphs:");
    let _ = surface.set_source("source_iter(0..3) -> null()");
    if let Ok(Some(job)) = surface.toggle("no_subgraphs") {
        let _ = spawner.spawn_local(async move {
            job.await;
        });
    }
    renderer.flush_newest_first();
    pool.run_until_stalled();
    describe(&surface);
}

use futures::executor::block_on;
use futures::future::FutureExt;
use playground_bridge::{JsonGraphRenderer, ModuleExports, ModuleSlot};
use playground_core::{
    CompileOrchestrator, CompileResult, Compiler, Dsl, GraphRenderer, ModuleStatus,
    PlaygroundSurface, RenderError, SurfaceId, SvgMarkup, ToggleSchema, VisibleOutput,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::rc::Rc;

fn hydroflow_entry(source: &str, options: &[bool]) -> Value {
    if source.contains("?") {
        return json!({
            "output": null,
            "diagnostics": [{
                "span": {"start": {"line": 1, "column": 3}, "end": {"line": 1, "column": 4}},
                "message": "expected one of `->`, `;`",
                "is_error": true,
            }],
        });
    }
    json!({
        "output": {
            "compiled": format!("fn main() {{ {source} }}"),
            "mermaid": format!("flowchart TD\n%% {options:?}"),
        },
        "diagnostics": [],
    })
}

fn exports() -> ModuleExports {
    ModuleExports::new().with_entry(Dsl::Dataflow, hydroflow_entry)
}

#[test]
fn test_slot_transitions_from_loading_to_ready() {
    let slot = Rc::new(ModuleSlot::new());
    let orchestrator = CompileOrchestrator::new(slot.clone(), Dsl::Dataflow);

    assert_eq!(slot.status(), ModuleStatus::Loading);
    assert!(matches!(
        orchestrator.compile("x", &[]).result,
        CompileResult::Unavailable { .. }
    ));

    slot.install(exports());

    assert_eq!(slot.status(), ModuleStatus::Ready);
    let compilation = orchestrator.compile("source_iter(0..1) -> null()", &[true, false]);
    assert_eq!(
        compilation.graph_source(),
        Some("flowchart TD\n%% [true, false]")
    );
}

#[test]
fn test_slot_failure_is_reported() {
    let slot = ModuleSlot::new();
    slot.fail("network error");

    assert_eq!(
        slot.status(),
        ModuleStatus::Failed("network error".to_string())
    );
    let raw = slot.compile(Dsl::Dataflow, "x", &[]);
    assert!(raw.output.is_none());
    assert_eq!(
        raw.diagnostics[0].message,
        "compiler failed to load: network error"
    );
}

#[test]
fn test_entry_point_may_reinstall_its_slot() {
    let slot = Rc::new(ModuleSlot::new());
    let weak = Rc::downgrade(&slot);
    slot.install(ModuleExports::new().with_entry(Dsl::Dataflow, move |source, options| {
        if let Some(slot) = weak.upgrade() {
            slot.install(exports());
        }
        hydroflow_entry(source, options)
    }));

    let first = slot.compile(Dsl::Dataflow, "source_iter(0..1)", &[false]);
    let second = slot.compile(Dsl::Dataflow, "source_iter(0..1)", &[true]);

    assert!(first.output.is_some());
    assert!(second.output.is_some());
    assert_eq!(slot.status(), ModuleStatus::Ready);
}

#[test]
fn test_entry_point_may_fail_its_slot() {
    let slot = Rc::new(ModuleSlot::new());
    let weak = Rc::downgrade(&slot);
    slot.install(ModuleExports::new().with_entry(Dsl::Dataflow, move |source, options| {
        if let Some(slot) = weak.upgrade() {
            slot.fail("module trapped");
        }
        hydroflow_entry(source, options)
    }));

    let raw = slot.compile(Dsl::Dataflow, "x", &[]);

    assert!(raw.output.is_some());
    assert_eq!(
        slot.status(),
        ModuleStatus::Failed("module trapped".to_string())
    );
}

#[test]
fn test_compiler_diagnostics_are_decoded() {
    let slot = ModuleSlot::ready(exports());

    let raw = slot.compile(Dsl::Dataflow, "a ? b", &[]);

    assert!(raw.output.is_none());
    assert_eq!(raw.diagnostics.len(), 1);
    assert_eq!(raw.diagnostics[0].span.start.column, 3);
    assert!(raw.diagnostics[0].is_error);
}

#[test]
fn test_call_site_span_decodes_to_open_end() {
    let slot = ModuleSlot::ready(ModuleExports::new().with_entry(Dsl::Datalog, |_, _| {
        json!({
            "output": null,
            "diagnostics": [{
                "span": {"start": {"line": 0, "column": 0}, "end": null},
                "message": "Failed to parse input",
                "is_error": true,
            }],
        })
    }));

    let raw = slot.compile(Dsl::Datalog, "edge(x, y)", &[]);

    assert_eq!(raw.diagnostics[0].span.end, None);
    assert_eq!(raw.diagnostics[0].span.start.line, 0);
}

#[test]
fn test_malformed_result_becomes_failure() {
    let slot = ModuleSlot::ready(
        ModuleExports::new().with_entry(Dsl::Dataflow, |_, _| json!("not an object")),
    );

    let raw = slot.compile(Dsl::Dataflow, "x", &[]);

    assert!(raw.output.is_none());
    assert_eq!(raw.diagnostics.len(), 1);
    assert!(
        raw.diagnostics[0]
            .message
            .starts_with("malformed compiler result")
    );
}

#[test]
fn test_missing_entry_point_becomes_failure() {
    let slot = ModuleSlot::ready(exports());

    let raw = slot.compile(Dsl::Datalog, "edge(x, y)", &[]);

    assert_eq!(
        raw.diagnostics[0].message,
        "compiler module does not export `compile_datalog`"
    );
}

#[test]
fn test_json_renderer_decodes_svg() {
    let renderer = JsonGraphRenderer::immediate(|surface, source| {
        Ok(json!({ "svg": format!("<svg id=\"{surface}\">{}</svg>", source.len()) }))
    });

    let markup = block_on(renderer.render(&SurfaceId::new("mermaid-hydroflow"), "abc")).unwrap();

    assert_eq!(
        markup,
        SvgMarkup::new("<svg id=\"mermaid-hydroflow\">3</svg>")
    );
}

#[test]
fn test_json_renderer_maps_errors() {
    let rejecting =
        JsonGraphRenderer::immediate(|_, _| Err("Parse error on line 2".to_string()));
    let garbled = JsonGraphRenderer::new(|_, _| async { Ok(json!({ "html": "" })) }.boxed_local());
    let id = SurfaceId::new("s");

    assert_eq!(
        block_on(rejecting.render(&id, "flowchart")),
        Err(RenderError::MalformedGraph(
            "Parse error on line 2".to_string()
        ))
    );
    assert!(matches!(
        block_on(garbled.render(&id, "flowchart")),
        Err(RenderError::UnexpectedResponse(_))
    ));
}

#[test]
fn test_surface_over_bridge() {
    let slot = Rc::new(ModuleSlot::new());
    let renderer = Rc::new(JsonGraphRenderer::immediate(|_, source| {
        Ok(json!({ "svg": format!("<svg>{}</svg>", source.lines().count()) }))
    }));
    let mut surface = PlaygroundSurface::new(
        SurfaceId::new("mermaid-hydroflow"),
        Dsl::Dataflow,
        slot.clone(),
        renderer,
        Rc::new(ToggleSchema::write_config()),
    );

    assert!(surface.recompile().is_none());
    assert!(matches!(
        surface.visible_output(),
        VisibleOutput::Unavailable(_)
    ));

    slot.install(exports());
    let job = surface.recompile().unwrap();
    block_on(job);

    match surface.visible_output() {
        VisibleOutput::Graph(graph) => assert_eq!(graph.markup, "<svg>2</svg>"),
        other => panic!("unexpected output: {other:?}"),
    }

    let _ = surface.set_source("a ? b");
    assert_eq!(surface.markers().len(), 1);
    assert_eq!(surface.markers()[0].start_column, 4);
}

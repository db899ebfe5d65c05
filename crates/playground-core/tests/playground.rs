mod common;

use common::{FakeCompiler, HELLO, InlineRenderer, ManualRenderer};
use futures::executor::{LocalPool, block_on};
use futures::task::LocalSpawnExt;
use playground_core::{
    ColumnUnits, ConfigError, Dsl, ModuleStatus, OutputView, Playground, PlaygroundConfig,
    PlaygroundError, SurfaceConfig, SurfaceId, TemplateCatalog, ToggleError, ToggleSchema,
    VisibleOutput,
};
use pretty_assertions::assert_eq;
use std::rc::Rc;

#[test]
fn test_default_config_has_dataflow_and_datalog_surfaces() {
    let config = PlaygroundConfig::default();

    assert_eq!(config.surfaces.len(), 2);
    assert_eq!(config.surfaces[0].id, SurfaceId::new("mermaid-hydroflow"));
    assert_eq!(config.surfaces[1].dsl, Dsl::Datalog);
    assert_eq!(config.toggle_schema().unwrap(), ToggleSchema::write_config());
    assert!(config.validate().is_ok());
}

#[test]
fn test_parse_yaml_config() {
    let yaml = r#"
column_units: utf16
surfaces:
  - id: left
    dsl: dataflow
    template: Chat Server
    toggles:
      no_subgraphs: true
  - id: right
    dsl: datalog
    view: compiled_text
"#;

    let config = PlaygroundConfig::from_yaml_str(yaml).unwrap();

    assert_eq!(config.column_units, ColumnUnits::Utf16);
    assert_eq!(config.surfaces[0].template.as_deref(), Some("Chat Server"));
    assert_eq!(config.surfaces[0].toggles.get("no_subgraphs"), Some(&true));
    assert_eq!(config.surfaces[1].view, OutputView::CompiledText);
}

#[test]
fn test_empty_yaml_uses_defaults() {
    assert_eq!(
        PlaygroundConfig::from_yaml_str("{}").unwrap(),
        PlaygroundConfig::default()
    );
}

#[test]
fn test_yaml_round_trip_preserves_config() {
    let mut config = PlaygroundConfig::default();
    config.surfaces[0].source = Some(HELLO.to_string());
    config.surfaces[1].view = OutputView::CompiledText;
    let mut third = SurfaceConfig::new("third", Dsl::Datalog);
    third.toggles.insert("no_handoffs".to_string(), true);
    config.surfaces.push(third);

    let yaml = config.to_yaml_string().unwrap();

    assert_eq!(PlaygroundConfig::from_yaml_str(&yaml).unwrap(), config);
}

#[test]
fn test_invalid_configs_are_rejected() {
    let duplicate = "surfaces:\n  - id: a\n  - id: a\n";
    assert!(matches!(
        PlaygroundConfig::from_yaml_str(duplicate),
        Err(ConfigError::DuplicateSurface(id)) if id.as_str() == "a"
    ));

    let empty_id = "surfaces:\n  - id: ''\n";
    assert!(matches!(
        PlaygroundConfig::from_yaml_str(empty_id),
        Err(ConfigError::EmptySurfaceId)
    ));

    let bad_template = "surfaces:\n  - id: a\n    dsl: datalog\n    template: Chat Server\n";
    assert!(matches!(
        PlaygroundConfig::from_yaml_str(bad_template),
        Err(ConfigError::UnknownTemplate { template, .. }) if template == "Chat Server"
    ));

    let bad_toggle = "surfaces:\n  - id: a\n    toggles:\n      noSubgraphs: true\n";
    assert!(matches!(
        PlaygroundConfig::from_yaml_str(bad_toggle),
        Err(ConfigError::Toggle {
            source: ToggleError::UnknownToggle(_),
            ..
        })
    ));

    let duplicate_toggle = "toggles: [a, a]\n";
    assert!(matches!(
        PlaygroundConfig::from_yaml_str(duplicate_toggle),
        Err(ConfigError::Toggle {
            source: ToggleError::DuplicateToggle(_),
            ..
        })
    ));

    assert!(matches!(
        PlaygroundConfig::from_yaml_str("surfaces: 3"),
        Err(ConfigError::Yaml(_))
    ));

    let misspelled_surface_key = "surfaces:\n  - id: a\n    toggle:\n      no_subgraphs: true\n";
    let err = PlaygroundConfig::from_yaml_str(misspelled_surface_key).unwrap_err();
    assert!(matches!(err, ConfigError::Yaml(_)));
    assert!(err.to_string().contains("unknown field `toggle`"));

    assert!(matches!(
        PlaygroundConfig::from_yaml_str("templates: [Chat Server]\n"),
        Err(ConfigError::Yaml(_))
    ));
}

#[test]
fn test_missing_config_file_reports_path() {
    let err = PlaygroundConfig::from_path("/nonexistent/playground.yaml").unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("/nonexistent/playground.yaml"));
}

#[test]
fn test_playground_from_config() {
    let mut config = PlaygroundConfig::default();
    config.surfaces[0].template = Some("Graph Neighbors".to_string());
    config.surfaces[0].toggles.insert("op_short_text".to_string(), true);

    let playground = Playground::from_config(
        &config,
        Rc::new(FakeCompiler::new()),
        Rc::new(InlineRenderer),
    )
    .unwrap();

    let left = playground
        .surface(&SurfaceId::new("mermaid-hydroflow"))
        .unwrap();
    assert_eq!(
        left.source().as_text(),
        TemplateCatalog::dataflow()
            .get("Graph Neighbors")
            .unwrap()
            .source
    );
    assert_eq!(left.config().get("op_short_text"), Some(true));

    let right = playground.surface(&SurfaceId::new("mermaid-datalog")).unwrap();
    assert_eq!(right.dsl(), Dsl::Datalog);
    assert_eq!(
        right.source().as_text(),
        TemplateCatalog::datalog().first().unwrap().source
    );
}

#[test]
fn test_add_surface_rejects_duplicates() {
    let mut playground = Playground::new(
        Rc::new(FakeCompiler::new()),
        Rc::new(InlineRenderer),
        ToggleSchema::write_config(),
    );

    playground.add_surface("one", Dsl::Dataflow).unwrap();
    let err = playground.add_surface("one", Dsl::Datalog).err().unwrap();

    assert!(matches!(err, PlaygroundError::DuplicateSurface(id) if id.as_str() == "one"));
    assert_eq!(playground.surfaces().len(), 1);
}

#[test]
fn test_surfaces_share_compiler_but_not_state() {
    let compiler = Rc::new(FakeCompiler::new());
    let renderer = Rc::new(ManualRenderer::new());
    let mut playground = Playground::new(
        compiler.clone(),
        renderer.clone(),
        ToggleSchema::write_config(),
    );
    playground.add_surface("a", Dsl::Dataflow).unwrap();
    playground.add_surface("b", Dsl::Dataflow).unwrap();
    let a = SurfaceId::new("a");
    let b = SurfaceId::new("b");

    let mut pool = LocalPool::new();
    let job_a = playground.surface_mut(&a).unwrap().set_source(HELLO).unwrap();
    let job_b = playground.surface_mut(&b).unwrap().set_source("error");
    assert!(job_b.is_none());
    pool.spawner()
        .spawn_local(async move {
            job_a.await;
        })
        .unwrap();
    renderer.succeed(0);
    pool.run_until_stalled();

    assert_eq!(compiler.calls(), 2);
    let a = playground.surface(&a).unwrap();
    let b = playground.surface(&b).unwrap();
    assert!(matches!(a.visible_output(), VisibleOutput::Graph(graph) if !graph.is_placeholder));
    assert!(matches!(b.visible_output(), VisibleOutput::Failure(_)));
    assert!(a.markers().is_empty());
    assert_eq!(b.markers().len(), 1);
}

#[test]
fn test_compile_all_after_compiler_loads() {
    let compiler = Rc::new(FakeCompiler::with_status(ModuleStatus::Loading));
    let mut playground = Playground::from_config(
        &PlaygroundConfig::default(),
        compiler.clone(),
        Rc::new(InlineRenderer),
    )
    .unwrap();

    assert!(playground.compile_all().is_empty());
    assert_eq!(playground.compiler_status(), ModuleStatus::Loading);
    assert!(
        playground
            .surfaces()
            .iter()
            .all(|s| matches!(s.visible_output(), VisibleOutput::Unavailable(_)))
    );

    compiler.set_status(ModuleStatus::Ready);
    let jobs = playground.compile_all();
    assert_eq!(jobs.len(), 2);
    for job in jobs {
        block_on(job);
    }
    assert!(
        playground
            .surfaces()
            .iter()
            .all(|s| s.compilation().is_some_and(|c| c.is_success()))
    );
}

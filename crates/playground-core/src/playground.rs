//! A page of independent playground surfaces.
//!
//! All surfaces share one compiler module instance (it is stateless per call) and one graph
//! renderer, but each owns its own render state, compile tickets and markers, so surfaces never
//! interfere with each other.

use crate::compile::{Compiler, Dsl, ModuleStatus};
use crate::config::{ConfigError, PlaygroundConfig};
use crate::markers::MarkerOptions;
use crate::render::{GraphRenderer, RenderJob, SurfaceId};
use crate::surface::{PlaygroundSurface, SurfaceError};
use crate::templates::TemplateCatalog;
use crate::toggles::ToggleSchema;
use std::rc::Rc;
use thiserror::Error;
use tracing::info;

/// Playground page errors.
#[derive(Debug, Error)]
pub enum PlaygroundError {
    /// A surface with this id already exists.
    #[error("duplicate surface id `{0}`")]
    DuplicateSurface(SurfaceId),
    /// The configuration was invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A surface rejected its initial settings.
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// Multiple surfaces sharing one compiler module.
pub struct Playground {
    compiler: Rc<dyn Compiler>,
    renderer: Rc<dyn GraphRenderer>,
    schema: Rc<ToggleSchema>,
    marker_options: MarkerOptions,
    surfaces: Vec<PlaygroundSurface>,
}

impl Playground {
    /// Create an empty page.
    pub fn new(
        compiler: Rc<dyn Compiler>,
        renderer: Rc<dyn GraphRenderer>,
        schema: ToggleSchema,
    ) -> Self {
        Self {
            compiler,
            renderer,
            schema: Rc::new(schema),
            marker_options: MarkerOptions::default(),
            surfaces: Vec::new(),
        }
    }

    /// Build a page from configuration.
    pub fn from_config(
        config: &PlaygroundConfig,
        compiler: Rc<dyn Compiler>,
        renderer: Rc<dyn GraphRenderer>,
    ) -> Result<Self, PlaygroundError> {
        config.validate()?;
        let mut playground = Self::new(compiler, renderer, config.toggle_schema()?);
        playground.marker_options = MarkerOptions {
            column_units: config.column_units,
        };

        for surface_config in &config.surfaces {
            let catalog = TemplateCatalog::for_dsl(surface_config.dsl);
            let source = surface_config.initial_source(&catalog)?;
            let state = surface_config.config_state(Rc::clone(&playground.schema))?;
            let surface = playground
                .new_surface(surface_config.id.clone(), surface_config.dsl)
                .with_source(source)
                .with_config(state)?
                .with_view(surface_config.view);
            playground.insert(surface)?;
        }
        info!(surfaces = playground.surfaces.len(), "playground configured");
        Ok(playground)
    }

    /// Create a surface wired to this page's compiler, renderer and schema without adding it.
    pub fn new_surface(&self, id: SurfaceId, dsl: Dsl) -> PlaygroundSurface {
        PlaygroundSurface::new(
            id,
            dsl,
            Rc::clone(&self.compiler),
            Rc::clone(&self.renderer),
            Rc::clone(&self.schema),
        )
        .with_marker_options(self.marker_options)
    }

    /// Create and add a surface.
    pub fn add_surface(
        &mut self,
        id: impl Into<String>,
        dsl: Dsl,
    ) -> Result<&mut PlaygroundSurface, PlaygroundError> {
        let surface = self.new_surface(SurfaceId::new(id), dsl);
        self.insert(surface)?;
        let last = self.surfaces.len() - 1;
        Ok(&mut self.surfaces[last])
    }

    /// Add a prepared surface. Ids must be unique on the page.
    pub fn insert(&mut self, surface: PlaygroundSurface) -> Result<(), PlaygroundError> {
        if self.surface(surface.id()).is_some() {
            return Err(PlaygroundError::DuplicateSurface(surface.id().clone()));
        }
        self.surfaces.push(surface);
        Ok(())
    }

    /// Look up a surface.
    pub fn surface(&self, id: &SurfaceId) -> Option<&PlaygroundSurface> {
        self.surfaces.iter().find(|s| s.id() == id)
    }

    /// Look up a surface mutably.
    pub fn surface_mut(&mut self, id: &SurfaceId) -> Option<&mut PlaygroundSurface> {
        self.surfaces.iter_mut().find(|s| s.id() == id)
    }

    /// Surfaces in page order.
    pub fn surfaces(&self) -> &[PlaygroundSurface] {
        &self.surfaces
    }

    /// The shared toggle schema.
    pub fn schema(&self) -> &Rc<ToggleSchema> {
        &self.schema
    }

    /// Load state of the shared compiler module.
    pub fn compiler_status(&self) -> ModuleStatus {
        self.compiler.status()
    }

    /// Compile every surface (page load, or once the compiler module finished loading).
    pub fn compile_all(&mut self) -> Vec<RenderJob> {
        self.surfaces
            .iter_mut()
            .filter_map(PlaygroundSurface::recompile)
            .collect()
    }
}

//! YAML configuration for a playground page.
//!
//! ```yaml
//! column_units: utf16
//! surfaces:
//!   - id: mermaid-hydroflow
//!     dsl: dataflow
//!     template: Simple
//!     toggles:
//!       no_subgraphs: true
//!   - id: mermaid-datalog
//!     dsl: datalog
//!     view: compiled_text
//! ```
//!
//! Every section is optional. Without `surfaces`, the page gets one dataflow and one Datalog
//! surface; without `toggles` at the top level, the standard graph-writer toggles are used.

use crate::compile::Dsl;
use crate::markers::ColumnUnits;
use crate::render::SurfaceId;
use crate::surface::OutputView;
use crate::templates::TemplateCatalog;
use crate::toggles::{ConfigState, ToggleError, ToggleSchema};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;
use tracing::debug;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The YAML could not be parsed.
    #[error("invalid playground configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// A surface id was empty.
    #[error("surface ids must not be empty")]
    EmptySurfaceId,
    /// Two surfaces share an id.
    #[error("duplicate surface id `{0}`")]
    DuplicateSurface(SurfaceId),
    /// A surface names a template its DSL catalog does not have.
    #[error("surface `{surface}`: unknown template `{template}`")]
    UnknownTemplate {
        /// Surface id.
        surface: SurfaceId,
        /// Template name.
        template: String,
    },
    /// The toggle schema or a surface's toggle values are invalid.
    #[error("{context}: {source}")]
    Toggle {
        /// Where the toggle error occurred.
        context: String,
        /// Underlying toggle error.
        #[source]
        source: ToggleError,
    },
}

/// Configuration of a playground page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlaygroundConfig {
    /// Column units the editor expects for markers.
    pub column_units: ColumnUnits,
    /// Toggle names in compiler order (`None` = standard graph-writer toggles).
    pub toggles: Option<Vec<String>>,
    /// Surfaces on the page, in display order.
    pub surfaces: Vec<SurfaceConfig>,
}

/// Configuration of one surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SurfaceConfig {
    /// Unique surface id.
    pub id: SurfaceId,
    /// DSL compiled by the surface.
    #[serde(default)]
    pub dsl: Dsl,
    /// Template to start from (defaults to the first of the DSL's catalog).
    #[serde(default)]
    pub template: Option<String>,
    /// Explicit initial source; takes precedence over `template`.
    #[serde(default)]
    pub source: Option<String>,
    /// Initial toggle values (unlisted toggles are disabled).
    #[serde(default)]
    pub toggles: BTreeMap<String, bool>,
    /// Initially selected output tab.
    #[serde(default)]
    pub view: OutputView,
}

impl SurfaceConfig {
    /// A surface with default settings.
    pub fn new(id: impl Into<String>, dsl: Dsl) -> Self {
        Self {
            id: SurfaceId::new(id),
            dsl,
            template: None,
            source: None,
            toggles: BTreeMap::new(),
            view: OutputView::default(),
        }
    }

    /// The initial source text this surface starts from.
    pub fn initial_source(&self, catalog: &TemplateCatalog) -> Result<String, ConfigError> {
        if let Some(source) = &self.source {
            return Ok(source.clone());
        }
        match &self.template {
            Some(name) => catalog
                .get(name)
                .map(|t| t.source.clone())
                .ok_or_else(|| ConfigError::UnknownTemplate {
                    surface: self.id.clone(),
                    template: name.clone(),
                }),
            None => Ok(catalog
                .first()
                .map(|t| t.source.clone())
                .unwrap_or_default()),
        }
    }

    /// Initial toggle values for this surface under `schema`.
    pub fn config_state(&self, schema: Rc<ToggleSchema>) -> Result<ConfigState, ConfigError> {
        ConfigState::from_pairs(
            schema,
            self.toggles.iter().map(|(name, value)| (name.as_str(), *value)),
        )
        .map_err(|source| ConfigError::Toggle {
            context: format!("surface `{}`", self.id),
            source,
        })
    }
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            column_units: ColumnUnits::default(),
            toggles: None,
            surfaces: vec![
                SurfaceConfig::new("mermaid-hydroflow", Dsl::Dataflow),
                SurfaceConfig::new("mermaid-datalog", Dsl::Datalog),
            ],
        }
    }
}

impl PlaygroundConfig {
    /// Parse configuration from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a YAML configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loading playground configuration");
        Self::from_yaml_str(&yaml)
    }

    /// Serialize to YAML.
    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// The toggle schema shared by every surface of the page.
    pub fn toggle_schema(&self) -> Result<ToggleSchema, ConfigError> {
        match &self.toggles {
            Some(names) => {
                ToggleSchema::new(names.iter().cloned()).map_err(|source| ConfigError::Toggle {
                    context: "toggles".to_string(),
                    source,
                })
            }
            None => Ok(ToggleSchema::write_config()),
        }
    }

    /// Check ids, templates and toggle names.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let schema = Rc::new(self.toggle_schema()?);
        let mut seen = HashSet::new();
        for surface in &self.surfaces {
            if surface.id.as_str().is_empty() {
                return Err(ConfigError::EmptySurfaceId);
            }
            if !seen.insert(surface.id.clone()) {
                return Err(ConfigError::DuplicateSurface(surface.id.clone()));
            }
            surface.initial_source(&TemplateCatalog::for_dsl(surface.dsl))?;
            surface.config_state(Rc::clone(&schema))?;
        }
        Ok(())
    }
}

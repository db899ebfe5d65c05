//! Ordered compiler toggles.
//!
//! The compiler module consumes its boolean options positionally, so the toggle order is part
//! of the contract. [`ToggleSchema`] fixes the names and their positions once; every
//! [`ConfigState`] built from the same schema (and every compile call fed from it) uses that
//! order. Toggles cannot be added or removed after construction.

use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;

/// Toggle names understood by the graph writer, in the order the compiler expects them.
pub const WRITE_CONFIG_TOGGLES: [&str; 6] = [
    "no_subgraphs",
    "no_varnames",
    "no_pull_push",
    "no_handoffs",
    "no_references",
    "op_short_text",
];

/// Errors produced while building or updating toggles.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToggleError {
    /// The name is not part of the schema.
    #[error("unknown toggle `{0}`")]
    UnknownToggle(String),
    /// The same name appears twice in a schema.
    #[error("duplicate toggle `{0}`")]
    DuplicateToggle(String),
    /// Toggle names must be non-empty.
    #[error("toggle names must not be empty")]
    EmptyName,
}

/// An explicit `name → position` schema, constructed once and shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleSchema {
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl ToggleSchema {
    /// Build a schema from names in compiler order.
    pub fn new<I, S>(names: I) -> Result<Self, ToggleError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ordered = Vec::new();
        let mut positions = HashMap::new();
        for name in names {
            let name = name.into();
            if name.is_empty() {
                return Err(ToggleError::EmptyName);
            }
            if positions.insert(name.clone(), ordered.len()).is_some() {
                return Err(ToggleError::DuplicateToggle(name));
            }
            ordered.push(name);
        }
        Ok(Self {
            names: ordered,
            positions,
        })
    }

    /// The standard graph-writer toggles ([`WRITE_CONFIG_TOGGLES`]).
    pub fn write_config() -> Self {
        let names: Vec<String> = WRITE_CONFIG_TOGGLES.iter().map(|s| s.to_string()).collect();
        let positions = names
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.clone(), idx))
            .collect();
        Self { names, positions }
    }

    /// Position of `name` in the compiler's parameter list.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    /// Names in compiler order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of toggles.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the schema has no toggles.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// A single named toggle value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigToggle<'a> {
    /// Toggle name.
    pub name: &'a str,
    /// Current value.
    pub enabled: bool,
}

/// Current toggle values for one surface, ordered by a shared [`ToggleSchema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigState {
    schema: Rc<ToggleSchema>,
    values: Vec<bool>,
}

impl ConfigState {
    /// All toggles start disabled.
    pub fn new(schema: Rc<ToggleSchema>) -> Self {
        let values = vec![false; schema.len()];
        Self { schema, values }
    }

    /// Start from the given `(name, value)` pairs; unspecified toggles are disabled.
    pub fn from_pairs<'a, I>(schema: Rc<ToggleSchema>, pairs: I) -> Result<Self, ToggleError>
    where
        I: IntoIterator<Item = (&'a str, bool)>,
    {
        let mut state = Self::new(schema);
        for (name, value) in pairs {
            state.set(name, value)?;
        }
        Ok(state)
    }

    /// The shared schema.
    pub fn schema(&self) -> &Rc<ToggleSchema> {
        &self.schema
    }

    /// Values in compiler order.
    pub fn values(&self) -> &[bool] {
        &self.values
    }

    /// Current value of `name`.
    pub fn get(&self, name: &str) -> Option<bool> {
        self.schema.position(name).map(|idx| self.values[idx])
    }

    /// Flip `name` and return the new ordered values.
    pub fn toggle(&mut self, name: &str) -> Result<&[bool], ToggleError> {
        let idx = self.index_of(name)?;
        self.values[idx] = !self.values[idx];
        Ok(&self.values)
    }

    /// Set `name` to `value`. Returns whether the value changed.
    pub fn set(&mut self, name: &str, value: bool) -> Result<bool, ToggleError> {
        let idx = self.index_of(name)?;
        let changed = self.values[idx] != value;
        self.values[idx] = value;
        Ok(changed)
    }

    /// Iterate toggles in compiler order.
    pub fn iter(&self) -> impl Iterator<Item = ConfigToggle<'_>> + '_ {
        self.schema
            .names()
            .iter()
            .zip(self.values.iter())
            .map(|(name, enabled)| ConfigToggle {
                name,
                enabled: *enabled,
            })
    }

    fn index_of(&self, name: &str) -> Result<usize, ToggleError> {
        self.schema
            .position(name)
            .ok_or_else(|| ToggleError::UnknownToggle(name.to_string()))
    }
}

//! Compiler module load slot.
//!
//! The compiler module is fetched and instantiated asynchronously. Until then every surface still
//! needs a [`Compiler`]; [`ModuleSlot`] is that compiler. It reports [`ModuleStatus::Loading`]
//! until the host calls [`ModuleSlot::install`] (or [`ModuleSlot::fail`]), after which the host
//! recompiles every surface.

use crate::BridgeError;
use crate::decode::decode_compile_output;
use playground_core::{Compiler, Diagnostic, Dsl, ModuleStatus, RawCompileOutput, Span};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use tracing::{info, warn};

/// One exported compile function: `(program, toggles in schema order) -> result JSON`.
pub type EntryPoint = Rc<dyn Fn(&str, &[bool]) -> Value>;

/// The entry points exported by a loaded compiler module, keyed by DSL.
#[derive(Default)]
pub struct ModuleExports {
    entries: HashMap<Dsl, EntryPoint>,
}

impl ModuleExports {
    /// No entry points.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the entry point for `dsl` (exported as [`Dsl::entry_point`]).
    pub fn with_entry<F>(mut self, dsl: Dsl, entry: F) -> Self
    where
        F: Fn(&str, &[bool]) -> Value + 'static,
    {
        self.entries.insert(dsl, Rc::new(entry));
        self
    }

    /// Whether `dsl` has an entry point.
    pub fn exports(&self, dsl: Dsl) -> bool {
        self.entries.contains_key(&dsl)
    }

    /// The entry point for `dsl`.
    pub fn entry(&self, dsl: Dsl) -> Result<EntryPoint, BridgeError> {
        self.entries
            .get(&dsl)
            .cloned()
            .ok_or(BridgeError::MissingEntryPoint(dsl.entry_point()))
    }

    /// Call the entry point for `dsl` and decode its result.
    pub fn call(
        &self,
        dsl: Dsl,
        source: &str,
        options: &[bool],
    ) -> Result<RawCompileOutput, BridgeError> {
        let entry = self.entry(dsl)?;
        decode_compile_output(entry(source, options))
    }
}

impl fmt::Debug for ModuleExports {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.entries.keys().map(|dsl| dsl.entry_point()).collect();
        names.sort_unstable();
        f.debug_struct("ModuleExports")
            .field("entries", &names)
            .finish()
    }
}

enum SlotState {
    Loading,
    Ready(ModuleExports),
    Failed(String),
}

/// A compiler module that may not be loaded yet.
pub struct ModuleSlot {
    state: RefCell<SlotState>,
}

impl Default for ModuleSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleSlot {
    /// An empty slot, still loading.
    pub fn new() -> Self {
        Self {
            state: RefCell::new(SlotState::Loading),
        }
    }

    /// A slot with `exports` already installed.
    pub fn ready(exports: ModuleExports) -> Self {
        Self {
            state: RefCell::new(SlotState::Ready(exports)),
        }
    }

    /// Install the loaded module.
    pub fn install(&self, exports: ModuleExports) {
        info!(?exports, "compiler module loaded");
        *self.state.borrow_mut() = SlotState::Ready(exports);
    }

    /// Record that the module could not be loaded.
    pub fn fail(&self, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(%reason, "compiler module failed to load");
        *self.state.borrow_mut() = SlotState::Failed(reason);
    }
}

impl Compiler for ModuleSlot {
    fn status(&self) -> ModuleStatus {
        match &*self.state.borrow() {
            SlotState::Loading => ModuleStatus::Loading,
            SlotState::Ready(_) => ModuleStatus::Ready,
            SlotState::Failed(reason) => ModuleStatus::Failed(reason.clone()),
        }
    }

    fn compile(&self, dsl: Dsl, source: &str, options: &[bool]) -> RawCompileOutput {
        // The state borrow ends before the entry point runs, so it may install or fail the slot.
        let entry = match &*self.state.borrow() {
            SlotState::Ready(exports) => exports.entry(dsl),
            // The orchestrator checks `status` first; this only guards direct callers.
            SlotState::Loading => return failed("compiler is still loading".to_string()),
            SlotState::Failed(reason) => {
                return failed(format!("compiler failed to load: {reason}"));
            }
        };
        let result = entry.and_then(|entry| decode_compile_output(entry(source, options)));
        result.unwrap_or_else(|err| {
            warn!(%dsl, error = %err, "compiler result rejected");
            failed(err.to_string())
        })
    }
}

fn failed(message: String) -> RawCompileOutput {
    RawCompileOutput {
        output: None,
        diagnostics: vec![Diagnostic::error(Span::call_site(), message)],
    }
}

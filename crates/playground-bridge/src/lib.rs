#![warn(missing_docs)]
//! Playground Bridge - boundary adapters for `playground-core`.
//!
//! The playground core talks to two external components through traits:
//! [`playground_core::Compiler`] and [`playground_core::GraphRenderer`]. In a browser both live on
//! the far side of a JS/Wasm boundary and exchange loosely-typed JSON values. This crate adapts
//! that boundary:
//!
//! - [`ModuleSlot`] holds the compiler module while it loads, then calls its per-DSL entry
//!   points and decodes their JSON results into the core's compile output;
//! - [`JsonGraphRenderer`] wraps a render function returning `{"svg": "..."}` (or a rejection).
//!
//! Decoding never panics: a result that does not match the expected shape becomes a failed
//! compile with a single error diagnostic, or a [`playground_core::RenderError`].

mod decode;
mod renderer;
mod slot;

pub use decode::{decode_compile_output, decode_render_response};
pub use renderer::{JsonGraphRenderer, RenderFn};
pub use slot::{EntryPoint, ModuleExports, ModuleSlot};

use thiserror::Error;

/// Errors raised while decoding values crossing the module boundary.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The compiler returned a value that is not a compile result.
    #[error("malformed compiler result: {0}")]
    MalformedResult(#[source] serde_json::Error),
    /// The module does not export an entry point for the requested DSL.
    #[error("compiler module does not export `{0}`")]
    MissingEntryPoint(&'static str),
    /// The renderer resolved with something other than `{"svg": "..."}`.
    #[error("malformed render response: {0}")]
    MalformedRenderResponse(#[source] serde_json::Error),
}

//! JSON decoding for values returned across the module boundary.

use crate::BridgeError;
use playground_core::{RawCompileOutput, SvgMarkup};
use serde::Deserialize;
use serde_json::Value;

/// Decode a compiler entry point's return value.
///
/// Expected shape:
///
/// ```json
/// {
///   "output": { "compiled": "...", "mermaid": "..." } | null,
///   "diagnostics": [
///     { "span": { "start": { "line": 1, "column": 0 }, "end": null },
///       "message": "...", "is_error": true }
///   ]
/// }
/// ```
pub fn decode_compile_output(value: Value) -> Result<RawCompileOutput, BridgeError> {
    serde_json::from_value(value).map_err(BridgeError::MalformedResult)
}

#[derive(Deserialize)]
struct RenderResponse {
    svg: String,
}

/// Decode a renderer's resolved value (`{"svg": "..."}`).
pub fn decode_render_response(value: Value) -> Result<SvgMarkup, BridgeError> {
    let response: RenderResponse =
        serde_json::from_value(value).map_err(BridgeError::MalformedRenderResponse)?;
    Ok(SvgMarkup::new(response.svg))
}

//! JSON render-boundary adapter.

use crate::decode::decode_render_response;
use futures::future::{FutureExt, LocalBoxFuture};
use playground_core::{GraphRenderer, RenderError, SurfaceId, SvgMarkup};
use serde_json::Value;

/// A render function: resolves with `{"svg": "..."}` or rejects with the engine's message.
pub type RenderFn =
    Box<dyn Fn(&SurfaceId, &str) -> LocalBoxFuture<'static, Result<Value, String>>>;

/// [`GraphRenderer`] over a JSON-returning render function.
pub struct JsonGraphRenderer {
    render: RenderFn,
}

impl JsonGraphRenderer {
    /// Wrap an asynchronous render function.
    pub fn new<F>(render: F) -> Self
    where
        F: Fn(&SurfaceId, &str) -> LocalBoxFuture<'static, Result<Value, String>> + 'static,
    {
        Self {
            render: Box::new(render),
        }
    }

    /// Wrap a render function that answers synchronously.
    pub fn immediate<F>(render: F) -> Self
    where
        F: Fn(&SurfaceId, &str) -> Result<Value, String> + 'static,
    {
        Self::new(move |surface, source| {
            let result = render(surface, source);
            async move { result }.boxed_local()
        })
    }
}

impl GraphRenderer for JsonGraphRenderer {
    fn render(
        &self,
        surface: &SurfaceId,
        source: &str,
    ) -> LocalBoxFuture<'static, Result<SvgMarkup, RenderError>> {
        let pending = (self.render)(surface, source);
        async move {
            match pending.await {
                Ok(value) => decode_render_response(value)
                    .map_err(|err| RenderError::UnexpectedResponse(err.to_string())),
                Err(message) => Err(RenderError::MalformedGraph(message)),
            }
        }
        .boxed_local()
    }
}

use thiserror::Error;

/// Everything that can stop the graph from showing up.
#[derive(Debug, Error)]
pub enum WidgetError {
	/// A DOM lookup or mutation failed.
	#[error("dom: {0}")]
	Dom(String),
	/// The graph data URL could not be built.
	#[error("invalid graph url: {0}")]
	Url(#[from] url::ParseError),
	/// The request never produced a response.
	#[error("fetch failed: {0}")]
	Fetch(String),
	/// The server answered with a non-success status.
	#[error("HTTP {0}")]
	Http(u16),
	/// The body is not a graph document.
	#[error("malformed graph document: {0}")]
	Parse(#[from] serde_json::Error),
}

impl WidgetError {
	pub(crate) fn js(context: &str, value: wasm_bindgen::JsValue) -> Self {
		Self::Fetch(format!("{context}: {value:?}"))
	}
}

use url::Url;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use super::config::WidgetConfig;
use super::error::WidgetError;
use crate::components::force_graph::GraphDocument;

/// Where the widget's own script was served from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScriptLocation {
	/// `src` of a `<script data-graph-widget>` element.
	pub marked_src: Option<String>,
	/// Directory of the generated JS glue module.
	pub module_dir: Option<String>,
}

/// URL of the graph document.
///
/// An explicit `data_url` is resolved against the page. Otherwise the file
/// sits one level above the loader script path (`<src>/../graph.json`), i.e.
/// next to the script, wherever the site is deployed. Without a marked script
/// the glue module's directory stands in; the page URL is the last resort.
pub fn resolve_data_url(
	config: &WidgetConfig,
	script: &ScriptLocation,
	document_url: &str,
) -> Result<Url, WidgetError> {
	if let Some(explicit) = &config.data_url {
		return Ok(Url::parse(document_url)?.join(explicit)?);
	}
	let non_empty = |s: &Option<String>| s.clone().filter(|s| !s.is_empty());
	if let Some(src) = non_empty(&script.marked_src) {
		return Ok(Url::parse(&format!("{}/../{}", src, config.data_file))?);
	}
	if let Some(dir) = non_empty(&script.module_dir) {
		return Ok(Url::parse(&dir)?.join(&config.data_file)?);
	}
	Ok(Url::parse(document_url)?.join(&config.data_file)?)
}

/// GET and parse the graph document. No timeout and no retry.
pub async fn fetch_document(url: &Url) -> Result<GraphDocument, WidgetError> {
	let opts = RequestInit::new();
	opts.set_method("GET");
	opts.set_mode(RequestMode::Cors);

	let request = Request::new_with_str_and_init(url.as_str(), &opts)
		.map_err(|e| WidgetError::js("request", e))?;
	let window = web_sys::window().ok_or_else(|| WidgetError::Dom("no window".into()))?;

	let resp: Response = JsFuture::from(window.fetch_with_request(&request))
		.await
		.map_err(|e| WidgetError::js("fetch", e))?
		.dyn_into()
		.map_err(|_| WidgetError::Fetch("response is not a Response".into()))?;
	if !resp.ok() {
		return Err(WidgetError::Http(resp.status()));
	}

	let text = JsFuture::from(resp.text().map_err(|e| WidgetError::js("body", e))?)
		.await
		.map_err(|e| WidgetError::js("body", e))?
		.as_string()
		.ok_or_else(|| WidgetError::Fetch("body is not text".into()))?;

	Ok(GraphDocument::from_json(&text)?)
}

#[cfg(test)]
mod tests {
	use super::*;

	const PAGE: &str = "https://example.org/site/notes/page/";

	fn marked(src: &str) -> ScriptLocation {
		ScriptLocation {
			marked_src: Some(src.into()),
			module_dir: None,
		}
	}

	#[test]
	fn data_sits_next_to_the_script() {
		let url = resolve_data_url(
			&WidgetConfig::default(),
			&marked("https://example.org/site/assets/javascripts/graph.js"),
			PAGE,
		)
		.unwrap();
		assert_eq!(url.as_str(), "https://example.org/site/assets/javascripts/graph.json");
	}

	#[test]
	fn explicit_url_is_page_relative() {
		let config = WidgetConfig {
			data_url: Some("../../assets/graph.json".into()),
			..WidgetConfig::default()
		};
		let url = resolve_data_url(&config, &marked("https://cdn.example.org/x.js"), PAGE).unwrap();
		assert_eq!(url.as_str(), "https://example.org/site/assets/graph.json");
	}

	#[test]
	fn unmarked_loader_uses_glue_module_directory() {
		let script = ScriptLocation {
			marked_src: None,
			module_dir: Some("https://docs.example.org/assets/javascripts/".into()),
		};
		let url = resolve_data_url(
			&WidgetConfig::default(),
			&script,
			"https://docs.example.org/guide/install/",
		)
		.unwrap();
		assert_eq!(url.as_str(), "https://docs.example.org/assets/javascripts/graph.json");
	}

	#[test]
	fn marked_script_wins_over_glue_module() {
		let script = ScriptLocation {
			marked_src: Some("https://example.org/site/assets/javascripts/graph.js".into()),
			module_dir: Some("https://cdn.example.org/pkg/".into()),
		};
		let url = resolve_data_url(&WidgetConfig::default(), &script, PAGE).unwrap();
		assert_eq!(url.as_str(), "https://example.org/site/assets/javascripts/graph.json");
	}

	#[test]
	fn without_script_falls_back_to_page() {
		let url = resolve_data_url(&WidgetConfig::default(), &ScriptLocation::default(), PAGE).unwrap();
		assert_eq!(url.as_str(), "https://example.org/site/notes/page/graph.json");
	}

	#[test]
	fn garbage_base_is_an_error() {
		let err = resolve_data_url(&WidgetConfig::default(), &marked("not a url"), PAGE).unwrap_err();
		assert!(matches!(err, WidgetError::Url(_)));
	}
}

use log::{Level, warn};

/// Where the widget goes and how it reads its data.
///
/// Defaults target a Material for MkDocs page; every field can be overridden
/// with a `data-*` attribute on the loader script (see [`WidgetConfig::from_attributes`]).
#[derive(Clone, Debug, PartialEq)]
pub struct WidgetConfig {
	/// Elements that receive a graph container.
	pub sidebar_selector: String,
	/// Id of the injected container.
	pub container_id: String,
	/// CSS height of the injected container.
	pub container_height: String,
	/// Explicit data URL, resolved against the document URL.
	pub data_url: Option<String>,
	/// Data file next to the loader script's directory.
	pub data_file: String,
	/// Theme toggles whose `change` event re-reads the background.
	pub palette_toggle_ids: Vec<String>,
	/// Added to every node's `symbolSize`.
	pub symbol_size_boost: f64,
	/// Label text from this separator onward is dropped.
	pub label_separator: String,
	/// Console log level.
	pub log_level: Level,
}

impl Default for WidgetConfig {
	fn default() -> Self {
		Self {
			sidebar_selector: ".md-sidebar--secondary".into(),
			container_id: "graph".into(),
			container_height: "300px".into(),
			data_url: None,
			data_file: "graph.json".into(),
			palette_toggle_ids: vec!["__palette_0".into(), "__palette_1".into()],
			symbol_size_boost: 5.0,
			label_separator: " •".into(),
			log_level: Level::Info,
		}
	}
}

impl WidgetConfig {
	/// Defaults overridden by whatever `attr` returns for each `data-*` name.
	pub fn from_attributes(attr: impl Fn(&str) -> Option<String>) -> Self {
		let mut config = Self::default();
		let text = |name: &str| attr(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

		if let Some(v) = text("data-sidebar") {
			config.sidebar_selector = v;
		}
		if let Some(v) = text("data-container-id") {
			config.container_id = v;
		}
		if let Some(v) = text("data-height") {
			config.container_height = v;
		}
		config.data_url = text("data-graph-url");
		if let Some(v) = text("data-palette-toggles") {
			config.palette_toggle_ids = v
				.split(',')
				.map(str::trim)
				.filter(|id| !id.is_empty())
				.map(String::from)
				.collect();
		}
		if let Some(v) = text("data-symbol-boost") {
			match v.parse::<f64>() {
				Ok(boost) if boost.is_finite() => config.symbol_size_boost = boost,
				_ => warn!("ignoring data-symbol-boost={v:?}"),
			}
		}
		// The separator keeps its leading space, so it is not trimmed
		if let Some(v) = attr("data-separator").filter(|v| !v.is_empty()) {
			config.label_separator = v;
		}
		if let Some(v) = text("data-log-level") {
			match v.parse::<Level>() {
				Ok(level) => config.log_level = level,
				Err(_) => warn!("ignoring data-log-level={v:?}"),
			}
		}
		config
	}

	/// Inline style of the injected container.
	pub fn container_style(&self) -> String {
		format!("height:{}; width: 100%;", self.container_height)
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use super::*;

	fn from(pairs: &[(&str, &str)]) -> WidgetConfig {
		let attrs: HashMap<String, String> = pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();
		WidgetConfig::from_attributes(|name| attrs.get(name).cloned())
	}

	#[test]
	fn defaults_target_material_sidebar() {
		let config = WidgetConfig::default();
		assert_eq!(config.sidebar_selector, ".md-sidebar--secondary");
		assert_eq!(config.container_style(), "height:300px; width: 100%;");
		assert_eq!(config.palette_toggle_ids, vec!["__palette_0", "__palette_1"]);
		assert_eq!(config.symbol_size_boost, 5.0);
		assert_eq!(config.label_separator, " •");
		assert_eq!(from(&[]), config);
	}

	#[test]
	fn attributes_override_defaults() {
		let config = from(&[
			("data-sidebar", ".sidebar"),
			("data-height", "420px"),
			("data-graph-url", "/assets/graph.json"),
			("data-palette-toggles", "dark, light ,"),
			("data-symbol-boost", "2.5"),
			("data-separator", " |"),
			("data-log-level", "debug"),
		]);
		assert_eq!(config.sidebar_selector, ".sidebar");
		assert_eq!(config.container_height, "420px");
		assert_eq!(config.data_url.as_deref(), Some("/assets/graph.json"));
		assert_eq!(config.palette_toggle_ids, vec!["dark", "light"]);
		assert_eq!(config.symbol_size_boost, 2.5);
		assert_eq!(config.label_separator, " |");
		assert_eq!(config.log_level, Level::Debug);
	}

	#[test]
	fn bad_values_fall_back() {
		let config = from(&[
			("data-symbol-boost", "lots"),
			("data-log-level", "loud"),
			("data-container-id", "  "),
		]);
		assert_eq!(config.symbol_size_boost, 5.0);
		assert_eq!(config.log_level, Level::Info);
		assert_eq!(config.container_id, "graph");
	}
}

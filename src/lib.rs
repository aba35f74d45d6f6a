//! Force-directed page graph for a documentation site's secondary sidebar.
//!
//! Built as a WASM module: on start it injects a canvas into the sidebar,
//! loads `graph.json` from next to the loader script and draws it, keeping the
//! background in step with the site's palette toggles.

use log::{Level, info, warn};
use wasm_bindgen::prelude::*;

// Modules
mod components;
mod widget;

pub use components::force_graph::{
	Category, ChartHandle, ClickEvent, DarkMode, DataType, Emphasis, EmphasisLabel, Focus,
	ForceGraphCanvas, GraphDocument, GraphLink, GraphNode, GraphSeries, InitOptions, Label,
	LabelLayout, LabelPosition, Legend, LineColor, LineStyle, RenderOptions, Renderer,
	ScaleLimit, Tooltip, resolve_endpoint, unresolved_links,
};
pub use widget::{
	GraphWidget, PageHooks, ScriptLocation, WidgetConfig, WidgetError, WidgetPhase,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging(level: Level) {
	let _ = console_log::init_with_level(level);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// Module entry point: read the loader's configuration and install the widget.
#[wasm_bindgen(start)]
pub fn start() {
	let (config, script) = widget::page_config();
	init_logging(config.log_level);

	match GraphWidget::install(config, script) {
		Ok(Some(_)) => info!("sidebar graph installed"),
		Ok(None) => {}
		Err(e) => warn!("sidebar graph not installed: {e}"),
	}
}

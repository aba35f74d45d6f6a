//! The sidebar graph: container injection, data load, theme sync and
//! navigation around one [`ChartHandle`].

mod config;
mod dom;
mod error;
mod loader;
mod transform;

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, info, warn};
use url::Url;

pub use config::WidgetConfig;
pub use error::WidgetError;
pub use loader::ScriptLocation;
use transform::prepare_document;

use crate::components::force_graph::{
	ChartHandle, DataType, ForceGraphCanvas, GraphDocument, InitOptions, RenderOptions,
	unresolved_links,
};

/// Configuration from the loader script's `data-*` attributes, plus where the
/// script was served from. Defaults when the page has no marked script.
pub fn page_config() -> (WidgetConfig, ScriptLocation) {
	let script = dom::document()
		.ok()
		.and_then(|document| dom::loader_script(&document));
	let config = WidgetConfig::from_attributes(|name| script.as_ref()?.get_attribute(name));
	let location = ScriptLocation {
		marked_src: script.as_ref().and_then(dom::script_src),
		module_dir: dom::glue_module_dir(),
	};
	(config, location)
}

/// Observable lifecycle. The only transition is `AwaitingData -> Rendered`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WidgetPhase {
	/// Chart exists, data not (yet) loaded.
	AwaitingData,
	/// Data transformed and handed to the chart.
	Rendered,
}

/// What the widget reads from and does to the page around it.
#[derive(Clone)]
pub struct PageHooks {
	/// Current page background colour.
	pub background: Rc<dyn Fn() -> String>,
	/// Top-level navigation.
	pub navigate: Rc<dyn Fn(&str)>,
}

impl PageHooks {
	/// Hooks backed by the browser: body computed style and `window.location`.
	pub fn browser() -> Self {
		Self {
			background: Rc::new(dom::body_background_color),
			navigate: Rc::new(dom::navigate),
		}
	}
}

struct WidgetState {
	config: WidgetConfig,
	chart: ChartHandle,
	hooks: PageHooks,
	options: Option<RenderOptions>,
	phase: WidgetPhase,
}

/// Shared widget handle; clones are cheap and refer to the same widget.
#[derive(Clone)]
pub struct GraphWidget {
	inner: Rc<RefCell<WidgetState>>,
}

impl GraphWidget {
	/// A widget driving `chart`, not yet loaded.
	pub fn new(config: WidgetConfig, chart: ChartHandle, hooks: PageHooks) -> Self {
		Self {
			inner: Rc::new(RefCell::new(WidgetState {
				config,
				chart,
				hooks,
				options: None,
				phase: WidgetPhase::AwaitingData,
			})),
		}
	}

	/// Inject the container, mount the chart, wire listeners and start loading.
	///
	/// Returns `Ok(None)` when the page has no sidebar to host the graph.
	pub fn install(
		config: WidgetConfig,
		script: ScriptLocation,
	) -> Result<Option<Self>, WidgetError> {
		let window = dom::window()?;
		let document = dom::document()?;

		let injected = dom::inject_containers(&document, &config)?;
		let Some(container) = dom::container(&document, &config.container_id) else {
			debug!(
				"no element matches {:?}; graph not shown",
				config.sidebar_selector
			);
			return Ok(None);
		};
		debug!("injected {injected} graph container(s)");

		let document_url = document
			.url()
			.map_err(|e| WidgetError::Dom(format!("document url: {e:?}")))?;
		let data_url = loader::resolve_data_url(&config, &script, &document_url)?;

		let chart = ChartHandle::init(InitOptions::default());
		let widget = Self::new(config.clone(), chart.clone(), PageHooks::browser());
		leptos::mount::mount_to(container, move || view! { <ForceGraphCanvas chart=chart /> })
			.forget();

		widget.load(data_url);
		// No-op until the data arrives
		widget.apply_options();

		let on_resize = widget.clone();
		dom::on_window_resize(&window, move || on_resize.resize());
		let on_palette = widget.clone();
		dom::on_change(&document, &config.palette_toggle_ids, move || {
			on_palette.refresh_background()
		});

		Ok(Some(widget))
	}

	/// Current lifecycle phase.
	pub fn phase(&self) -> WidgetPhase {
		self.inner.borrow().phase
	}

	/// The configuration last built from loaded data, if any.
	pub fn options(&self) -> Option<RenderOptions> {
		self.inner.borrow().options.clone()
	}

	/// Handle to the chart this widget drives.
	pub fn chart(&self) -> ChartHandle {
		self.inner.borrow().chart.clone()
	}

	/// Push the current configuration to the chart if there is a usable one.
	pub fn apply_options(&self) -> bool {
		let (chart, options) = {
			let state = self.inner.borrow();
			(state.chart.clone(), state.options.clone())
		};
		match options.filter(RenderOptions::is_well_formed) {
			Some(options) => {
				chart.set_option(options);
				true
			}
			None => false,
		}
	}

	fn load(&self, url: Url) {
		info!("loading graph from {url}");
		let widget = self.clone();
		wasm_bindgen_futures::spawn_local(async move {
			let result = loader::fetch_document(&url).await;
			widget.finish_load(result);
		});
	}

	/// Continuation of the data fetch. Failures leave the widget waiting.
	pub fn finish_load(&self, result: Result<GraphDocument, WidgetError>) {
		let document = match result {
			Ok(document) => document,
			Err(e) => {
				warn!("graph data unavailable: {e}");
				return;
			}
		};

		let chart = self.chart();
		chart.hide_loading();

		let (boost, separator, hooks) = {
			let state = self.inner.borrow();
			(
				state.config.symbol_size_boost,
				state.config.label_separator.clone(),
				state.hooks.clone(),
			)
		};
		let document = prepare_document(document, boost, &separator);
		let unresolved = unresolved_links(&document.nodes, &document.links).len();
		if unresolved > 0 {
			warn!("{unresolved} link(s) reference unknown pages");
		}
		let (nodes, links) = (document.nodes.len(), document.links.len());

		let options = RenderOptions::for_document(document, (hooks.background)());
		{
			let mut state = self.inner.borrow_mut();
			state.options = Some(options);
			state.phase = WidgetPhase::Rendered;
		}
		self.apply_options();

		let navigate = hooks.navigate.clone();
		chart.on_click(move |event| {
			if event.data_type == DataType::Node {
				navigate(&event.value);
			}
		});
		info!("graph rendered: {nodes} pages, {links} links");
	}

	/// Re-read the page background and re-apply. No-op before data arrives.
	pub fn refresh_background(&self) {
		{
			let mut state = self.inner.borrow_mut();
			let background = (state.hooks.background)();
			let Some(options) = state.options.as_mut() else {
				debug!("palette changed before graph data arrived");
				return;
			};
			options.background_color = background;
		}
		self.apply_options();
	}

	/// Fit the chart to its container.
	pub fn resize(&self) {
		self.chart().resize();
	}
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;

	use super::*;

	struct Page {
		background: Rc<RefCell<String>>,
		visited: Rc<RefCell<Vec<String>>>,
		reads: Rc<Cell<u32>>,
	}

	fn widget() -> (GraphWidget, Page) {
		let page = Page {
			background: Rc::new(RefCell::new("white".to_string())),
			visited: Rc::default(),
			reads: Rc::default(),
		};
		let (bg, visited, reads) = (
			page.background.clone(),
			page.visited.clone(),
			page.reads.clone(),
		);
		let hooks = PageHooks {
			background: Rc::new(move || {
				reads.set(reads.get() + 1);
				bg.borrow().clone()
			}),
			navigate: Rc::new(move |target: &str| visited.borrow_mut().push(target.to_string())),
		};
		let chart = ChartHandle::init(InitOptions::default());
		(GraphWidget::new(WidgetConfig::default(), chart, hooks), page)
	}

	fn doc(json: &str) -> GraphDocument {
		GraphDocument::from_json(json).unwrap()
	}

	const PAGES: &str = r#"{
		"nodes": [
			{"name": "A • foo", "value": "/a", "symbolSize": 10},
			{"name": "B", "value": "/b", "symbolSize": 20}
		],
		"links": [{"source": "A • x", "target": "B • y"}]
	}"#;

	fn screen_pos(chart: &ChartHandle, name: &str) -> (f64, f64) {
		chart.with_state(|s| {
			let mut pos = None;
			s.graph.visit_nodes(|n| {
				if n.data.user_data.name == name {
					pos = Some((
						n.x() as f64 * s.transform.k + s.transform.x,
						n.y() as f64 * s.transform.k + s.transform.y,
					));
				}
			});
			pos.unwrap()
		})
	}

	#[test]
	fn optimistic_apply_before_data_is_a_no_op() {
		let (widget, _) = widget();
		assert!(!widget.apply_options());
		assert_eq!(widget.phase(), WidgetPhase::AwaitingData);
		assert!(widget.chart().with_state(|s| s.options.is_none() && s.loading));
	}

	#[test]
	fn load_transforms_and_renders() {
		let (widget, page) = widget();
		widget.finish_load(Ok(doc(PAGES)));

		assert_eq!(widget.phase(), WidgetPhase::Rendered);
		let options = widget.options().unwrap();
		assert_eq!(options.background_color, "white");
		assert!(options.legend.is_empty());
		assert!(!options.tooltip.show);

		let series = &options.series[0];
		assert_eq!(series.data[0].name, "A");
		assert_eq!(series.data[0].symbol_size, 15.0);
		assert_eq!(series.data[1].symbol_size, 25.0);
		assert_eq!((series.links[0].source.as_str(), series.links[0].target.as_str()), ("A", "B"));

		let chart = widget.chart();
		assert!(chart.with_state(|s| !s.loading && s.node_count() == 2 && s.edges().len() == 1));
		assert_eq!(page.reads.get(), 1);
	}

	#[test]
	fn palette_toggle_only_changes_background() {
		let (widget, page) = widget();
		widget.finish_load(Ok(doc(PAGES)));
		let before = widget.options().unwrap();

		*page.background.borrow_mut() = "black".into();
		widget.refresh_background();

		let after = widget.options().unwrap();
		assert_eq!(after.background_color, "black");
		assert_eq!(after.series, before.series);
		assert_eq!(
			widget
				.chart()
				.with_state(|s| s.options.as_ref().unwrap().background_color.clone()),
			"black"
		);
	}

	#[test]
	fn palette_toggle_before_data_does_nothing() {
		let (widget, _) = widget();
		widget.refresh_background();
		assert!(widget.options().is_none());
		assert_eq!(widget.phase(), WidgetPhase::AwaitingData);
	}

	#[test]
	fn reapplying_is_idempotent() {
		let (widget, _) = widget();
		widget.finish_load(Ok(doc(PAGES)));
		let chart = widget.chart();
		let snapshot = |c: &ChartHandle| {
			c.with_state(|s| {
				let mut nodes = Vec::new();
				s.graph.visit_nodes(|n| nodes.push((n.data.user_data.name.clone(), n.x(), n.y())));
				(nodes, s.transform.k, s.options.clone())
			})
		};
		let once = snapshot(&chart);
		assert!(widget.apply_options());
		assert_eq!(snapshot(&chart), once);
	}

	#[test]
	fn failed_fetch_leaves_chart_waiting() {
		let (widget, page) = widget();
		widget.finish_load(Err(WidgetError::Http(404)));
		widget.finish_load(Err(WidgetError::Fetch("offline".into())));

		assert_eq!(widget.phase(), WidgetPhase::AwaitingData);
		assert!(widget.options().is_none());
		assert!(widget.chart().with_state(|s| s.loading && s.node_count() == 0));
		assert_eq!(page.reads.get(), 0);
	}

	#[test]
	fn clicking_a_node_navigates() {
		let (widget, page) = widget();
		widget.finish_load(Ok(doc(PAGES)));
		let chart = widget.chart();

		let (x, y) = screen_pos(&chart, "B");
		chart.dispatch_click(x, y);
		chart.dispatch_click(-1000.0, -1000.0);

		assert_eq!(*page.visited.borrow(), vec!["/b".to_string()]);
	}

	#[test]
	fn clicking_a_link_does_not_navigate() {
		let (widget, page) = widget();
		widget.finish_load(Ok(doc(PAGES)));
		let chart = widget.chart();

		let (ax, ay) = screen_pos(&chart, "A");
		let (bx, by) = screen_pos(&chart, "B");
		chart.dispatch_click((ax + bx) / 2.0, (ay + by) / 2.0);

		assert!(page.visited.borrow().is_empty());
	}

	#[test]
	fn resize_before_mount_is_safe() {
		let (widget, _) = widget();
		widget.resize();
		assert_eq!(widget.phase(), WidgetPhase::AwaitingData);
	}
}

#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
	use wasm_bindgen_test::*;
	use web_sys::Event;

	use super::*;

	wasm_bindgen_test_configure!(run_in_browser);

	#[wasm_bindgen_test]
	fn palette_change_event_restyles_the_graph() {
		let document = dom::document().unwrap();
		let body = document.body().unwrap();
		let toggle = document.create_element("input").unwrap();
		toggle.set_id("test-scheme-toggle");
		body.append_child(&toggle).unwrap();

		let config = WidgetConfig {
			palette_toggle_ids: vec!["test-scheme-toggle".into()],
			..WidgetConfig::default()
		};
		let hooks = PageHooks {
			background: Rc::new(dom::body_background_color),
			navigate: Rc::new(|_: &str| {}),
		};
		let widget = GraphWidget::new(
			config.clone(),
			ChartHandle::init(InitOptions::default()),
			hooks,
		);
		widget.finish_load(Ok(GraphDocument::from_json(
			r#"{"nodes": [{"name": "A", "value": "/a"}], "links": []}"#,
		)
		.unwrap()));

		let on_palette = widget.clone();
		dom::on_change(&document, &config.palette_toggle_ids, move || {
			on_palette.refresh_background()
		});

		body.style()
			.set_property("background-color", "rgb(1, 2, 3)")
			.unwrap();
		toggle.dispatch_event(&Event::new("change").unwrap()).unwrap();

		assert_eq!(widget.options().unwrap().background_color, "rgb(1, 2, 3)");
		assert_eq!(
			widget
				.chart()
				.with_state(|s| s.options.as_ref().unwrap().background_color.clone()),
			"rgb(1, 2, 3)"
		);

		body.style().remove_property("background-color").unwrap();
		toggle.remove();
	}
}

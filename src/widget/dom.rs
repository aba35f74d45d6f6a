//! Page lookups and mutations.

use log::debug;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, HtmlScriptElement, Window};

use super::config::WidgetConfig;
use super::error::WidgetError;

pub fn window() -> Result<Window, WidgetError> {
	web_sys::window().ok_or_else(|| WidgetError::Dom("no window".into()))
}

pub fn document() -> Result<Document, WidgetError> {
	window()?
		.document()
		.ok_or_else(|| WidgetError::Dom("no document".into()))
}

// Snippets land in `<pkg>/snippets/<crate>/inline0.js`, two levels below the glue module.
#[wasm_bindgen(inline_js = "export function module_dir() { return new URL('../../', import.meta.url).href; }")]
extern "C" {
	fn module_dir() -> String;
}

/// Directory holding the generated JS glue module, with a trailing slash.
pub fn glue_module_dir() -> Option<String> {
	Some(module_dir()).filter(|dir| !dir.is_empty())
}

/// The `<script data-graph-widget>` element that loaded us, if marked.
pub fn loader_script(document: &Document) -> Option<Element> {
	document
		.query_selector("script[data-graph-widget]")
		.ok()
		.flatten()
}

/// Absolute URL of a script element's source.
pub fn script_src(script: &Element) -> Option<String> {
	script
		.dyn_ref::<HtmlScriptElement>()
		.map(|s| s.src())
		.filter(|src| !src.is_empty())
}

/// Append a graph container to every sidebar. Returns how many were added.
pub fn inject_containers(document: &Document, config: &WidgetConfig) -> Result<u32, WidgetError> {
	let sidebars = document
		.query_selector_all(&config.sidebar_selector)
		.map_err(|e| WidgetError::Dom(format!("bad selector {:?}: {e:?}", config.sidebar_selector)))?;

	for i in 0..sidebars.length() {
		let Some(sidebar) = sidebars.item(i) else {
			continue;
		};
		let container = document
			.create_element("div")
			.map_err(|e| WidgetError::Dom(format!("create div: {e:?}")))?;
		container.set_id(&config.container_id);
		container
			.set_attribute("style", &config.container_style())
			.map_err(|e| WidgetError::Dom(format!("style: {e:?}")))?;
		sidebar
			.append_child(&container)
			.map_err(|e| WidgetError::Dom(format!("append: {e:?}")))?;
	}
	Ok(sidebars.length())
}

pub fn container(document: &Document, id: &str) -> Option<HtmlElement> {
	document
		.get_element_by_id(id)
		.and_then(|el| el.dyn_into::<HtmlElement>().ok())
}

/// The body's computed `background-color`, as the browser reports it.
pub fn body_background_color() -> String {
	let read = || -> Option<String> {
		let window = web_sys::window()?;
		let body = window.document()?.body()?;
		window
			.get_computed_style(&body)
			.ok()
			.flatten()?
			.get_property_value("background-color")
			.ok()
	};
	read().unwrap_or_default()
}

/// Attach a `change` listener to each element id that exists. The listeners
/// live as long as the page.
pub fn on_change(document: &Document, ids: &[String], handler: impl Fn() + Clone + 'static) {
	for id in ids {
		let Some(el) = document.get_element_by_id(id) else {
			debug!("no #{id} on this page; palette changes will not restyle the graph");
			continue;
		};
		let handler = handler.clone();
		let cb = Closure::<dyn FnMut()>::new(move || handler());
		let _ = el.add_event_listener_with_callback("change", cb.as_ref().unchecked_ref());
		cb.forget();
	}
}

pub fn on_window_resize(window: &Window, handler: impl Fn() + 'static) {
	let cb = Closure::<dyn FnMut()>::new(handler);
	let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
	cb.forget();
}

/// Full top-level navigation to `target`.
pub fn navigate(target: &str) {
	let Ok(window) = window() else {
		return;
	};
	if let Err(e) = window.location().set_href(target) {
		log::warn!("navigation to {target:?} failed: {e:?}");
	}
}

#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
	use std::cell::Cell;
	use std::rc::Rc;

	use wasm_bindgen_test::*;
	use web_sys::Event;

	use super::*;

	wasm_bindgen_test_configure!(run_in_browser);

	fn append_div(document: &Document, class: &str) -> Element {
		let el = document.create_element("div").unwrap();
		el.set_class_name(class);
		document.body().unwrap().append_child(&el).unwrap();
		el
	}

	#[wasm_bindgen_test]
	fn every_sidebar_gets_a_container() {
		let document = document().unwrap();
		let sidebars = [
			append_div(&document, "test-sidebar"),
			append_div(&document, "test-sidebar"),
		];
		let config = WidgetConfig {
			sidebar_selector: ".test-sidebar".into(),
			container_id: "test-graph".into(),
			..WidgetConfig::default()
		};

		assert_eq!(inject_containers(&document, &config).unwrap(), 2);
		for sidebar in &sidebars {
			let child = sidebar.last_element_child().unwrap();
			assert_eq!(child.id(), "test-graph");
			assert_eq!(
				child.get_attribute("style").as_deref(),
				Some("height:300px; width: 100%;")
			);
		}
		assert!(container(&document, "test-graph").is_some());

		for sidebar in sidebars {
			sidebar.remove();
		}
	}

	#[wasm_bindgen_test]
	fn no_sidebar_injects_nothing() {
		let document = document().unwrap();
		let config = WidgetConfig {
			sidebar_selector: ".absent-sidebar".into(),
			..WidgetConfig::default()
		};
		assert_eq!(inject_containers(&document, &config).unwrap(), 0);
	}

	#[wasm_bindgen_test]
	fn change_listener_skips_missing_ids() {
		let document = document().unwrap();
		let toggle = document.create_element("input").unwrap();
		toggle.set_id("test-palette-toggle");
		document.body().unwrap().append_child(&toggle).unwrap();

		let fired = Rc::new(Cell::new(0));
		let count = fired.clone();
		on_change(
			&document,
			&["test-missing-toggle".to_string(), "test-palette-toggle".to_string()],
			move || count.set(count.get() + 1),
		);
		assert_eq!(fired.get(), 0);

		toggle.dispatch_event(&Event::new("change").unwrap()).unwrap();
		assert_eq!(fired.get(), 1);

		toggle.remove();
	}

	#[wasm_bindgen_test]
	fn background_follows_body_style() {
		let body = document().unwrap().body().unwrap();
		body.style()
			.set_property("background-color", "rgb(10, 20, 30)")
			.unwrap();
		assert_eq!(body_background_color(), "rgb(10, 20, 30)");

		body.style().remove_property("background-color").unwrap();
	}
}

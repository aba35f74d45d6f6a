use std::cell::RefCell;
use std::rc::Rc;

use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::options::{InitOptions, RenderOptions};
use super::render;
use super::state::{ChartState, ClickEvent};

type ClickHandler = Rc<dyn Fn(&ClickEvent)>;

struct Surface {
	canvas: HtmlCanvasElement,
	ctx: CanvasRenderingContext2d,
}

struct Chart {
	state: ChartState,
	surface: Option<Surface>,
	on_click: Option<ClickHandler>,
}

/// Shared handle to one chart instance.
///
/// Clones refer to the same chart. The handle works without a canvas
/// attached; drawing starts once [`ForceGraphCanvas`](super::ForceGraphCanvas)
/// mounts.
#[derive(Clone)]
pub struct ChartHandle {
	inner: Rc<RefCell<Chart>>,
}

impl ChartHandle {
	/// A chart with no data, in its loading state.
	pub fn init(init: InitOptions) -> Self {
		Self {
			inner: Rc::new(RefCell::new(Chart {
				state: ChartState::new(init, 0.0, 0.0),
				surface: None,
				on_click: None,
			})),
		}
	}

	/// Replace the configuration. Re-applying the same data keeps the layout.
	pub fn set_option(&self, options: RenderOptions) {
		self.inner.borrow_mut().state.set_option(options);
	}

	/// Leave the loading state; data becomes visible and clickable.
	pub fn hide_loading(&self) {
		self.inner.borrow_mut().state.hide_loading();
	}

	/// Fit the canvas to its container. No-op until a canvas is attached.
	pub fn resize(&self) {
		let mut chart = self.inner.borrow_mut();
		let Chart { state, surface, .. } = &mut *chart;
		let Some(surface) = surface else {
			return;
		};
		let Some((w, h)) = container_size(&surface.canvas) else {
			return;
		};
		surface.canvas.set_width(w as u32);
		surface.canvas.set_height(h as u32);
		state.resize(w, h);
	}

	/// Register the click handler, replacing any previous one.
	pub fn on_click(&self, handler: impl Fn(&ClickEvent) + 'static) {
		self.inner.borrow_mut().on_click = Some(Rc::new(handler));
	}

	/// Run `f` against the chart state.
	pub fn with_state<R>(&self, f: impl FnOnce(&mut ChartState) -> R) -> R {
		f(&mut self.inner.borrow_mut().state)
	}

	pub(super) fn attach(&self, canvas: HtmlCanvasElement, ctx: CanvasRenderingContext2d) {
		self.inner.borrow_mut().surface = Some(Surface { canvas, ctx });
		self.resize();
	}

	pub(super) fn is_attached(&self) -> bool {
		self.inner.borrow().surface.is_some()
	}

	/// Advance the simulation and redraw if anything changed.
	pub(super) fn frame(&self, dt: f32) {
		let mut chart = self.inner.borrow_mut();
		let Chart { state, surface, .. } = &mut *chart;
		state.tick(dt);
		let Some(surface) = surface else {
			return;
		};
		if state.needs_redraw() {
			render::render(state, &surface.ctx);
			state.mark_clean();
		}
	}

	/// Resolve a click and hand it to the handler with no borrow held, so the
	/// handler may call back into the chart.
	pub(crate) fn dispatch_click(&self, x: f64, y: f64) {
		let (event, handler) = {
			let chart = self.inner.borrow();
			(chart.state.click_at(x, y), chart.on_click.clone())
		};
		if let (Some(event), Some(handler)) = (event, handler) {
			handler(&event);
		}
	}
}

fn container_size(canvas: &HtmlCanvasElement) -> Option<(f64, f64)> {
	let parent = canvas.parent_element()?;
	let (w, h) = (parent.client_width() as f64, parent.client_height() as f64);
	(w > 0.0 && h > 0.0).then_some((w, h))
}

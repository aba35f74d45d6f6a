use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::chart::ChartHandle;

/// Canvas surface for a [`ChartHandle`]: runs the animation loop and forwards
/// pointer input to the chart.
#[component]
pub fn ForceGraphCanvas(chart: ChartHandle) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (chart_init, animate_init) = (chart.clone(), animate.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if chart_init.is_attached() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			log::warn!("2d canvas context unavailable; graph will not render");
			return;
		};
		chart_init.attach(canvas, ctx);

		let (chart_anim, animate_inner) = (chart_init.clone(), animate_init.clone());
		let mut last = js_sys::Date::now();
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let now = js_sys::Date::now();
			// Clamp so a backgrounded tab does not fling the layout
			let dt = ((now - last) / 1000.0).clamp(0.0, 0.05) as f32;
			last = now;
			chart_anim.frame(dt);
			if let (Some(window), Some(cb)) = (web_sys::window(), animate_inner.borrow().as_ref()) {
				let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let (Some(window), Some(cb)) = (web_sys::window(), animate_init.borrow().as_ref()) {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let local_pos = move |ev: &MouseEvent| -> Option<(f64, f64)> {
		let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
		let rect = canvas.get_bounding_client_rect();
		Some((
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		))
	};

	let chart_md = chart.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if let Some((x, y)) = local_pos(&ev) {
			chart_md.with_state(|s| s.pointer_down(x, y));
		}
	};

	let chart_mm = chart.clone();
	let on_mousemove = move |ev: MouseEvent| {
		if let Some((x, y)) = local_pos(&ev) {
			chart_mm.with_state(|s| s.pointer_move(x, y));
		}
	};

	let chart_mu = chart.clone();
	let on_mouseup = move |_: MouseEvent| {
		chart_mu.with_state(|s| s.pointer_up());
	};

	let chart_ml = chart.clone();
	let on_mouseleave = move |_: MouseEvent| {
		chart_ml.with_state(|s| s.pointer_leave());
	};

	let chart_click = chart.clone();
	let on_click = move |ev: MouseEvent| {
		if let Some((x, y)) = local_pos(&ev) {
			chart_click.dispatch_click(x, y);
		}
	};

	let chart_wh = chart.clone();
	let on_wheel = move |ev: WheelEvent| {
		let mouse: &MouseEvent = &ev;
		let Some((x, y)) = local_pos(mouse) else {
			return;
		};
		let roam = chart_wh.with_state(|s| s.series().is_some_and(|series| series.roam));
		if roam {
			ev.prevent_default();
			chart_wh.with_state(|s| s.zoom_at(x, y, ev.delta_y()));
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:click=on_click
			on:wheel=on_wheel
			style="display: block; cursor: pointer;"
		/>
	}
}

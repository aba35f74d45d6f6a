use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::color;
use super::options::{GraphSeries, LabelPosition, LineColor, format_template, strip_markup};
use super::state::ChartState;

const FONT_SIZE: f64 = 12.0;
const LABEL_GAP: f64 = 5.0;

struct Palette {
	text: &'static str,
	tooltip_bg: &'static str,
}

const LIGHT: Palette = Palette {
	text: "#333",
	tooltip_bg: "rgba(255, 255, 255, 0.9)",
};

const DARK: Palette = Palette {
	text: "#eee",
	tooltip_bg: "rgba(40, 40, 40, 0.9)",
};

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

pub fn render(state: &ChartState, ctx: &CanvasRenderingContext2d) {
	let (background, dark_mode) = match &state.options {
		Some(o) => (o.background_color.as_str(), o.dark_mode),
		None => ("", super::options::DarkMode::Auto),
	};
	ctx.clear_rect(0.0, 0.0, state.width, state.height);
	if !color::is_transparent(background) {
		ctx.set_fill_style_str(background);
		ctx.fill_rect(0.0, 0.0, state.width, state.height);
	}

	let Some(series) = state.series().filter(|_| !state.loading) else {
		return;
	};
	let palette = if color::is_dark(dark_mode, background) {
		&DARK
	} else {
		&LIGHT
	};

	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, series, ctx);
	draw_nodes(state, series, palette, ctx);
	ctx.restore();

	draw_tooltip(state, palette, ctx);
}

fn draw_edges(state: &ChartState, series: &GraphSeries, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let t = ease_out_cubic(state.hover.highlight_t);
	let has_highlight = state.has_active_highlight();
	let curveness = series.line_style.curveness;

	state.graph.visit_edges(|n1, n2, _| {
		let (x1, y1, x2, y2) = (n1.x() as f64, n1.y() as f64, n2.x() as f64, n2.y() as f64);
		let (dx, dy) = (x2 - x1, y2 - y1);
		if (dx * dx + dy * dy).sqrt() < 0.001 {
			return;
		}

		let is_highlighted = state.is_highlighted(n1.index()) && state.is_highlighted(n2.index());
		let alpha = match (has_highlight, is_highlighted) {
			(false, _) => 0.5,
			(true, true) => 0.5 + 0.4 * t,
			(true, false) => 0.5 - 0.4 * t,
		};
		let stroke = match &series.line_style.color {
			LineColor::Source => n1.data.user_data.color.as_str(),
			LineColor::Target => n2.data.user_data.color.as_str(),
			LineColor::Fixed(c) => c.as_str(),
		};

		ctx.set_global_alpha(alpha);
		ctx.set_stroke_style_str(stroke);
		ctx.set_line_width(1.0 / k);
		ctx.begin_path();
		ctx.move_to(x1, y1);
		if curveness.abs() > f64::EPSILON {
			// Control point off the midpoint, perpendicular to the edge
			let (cx, cy) = ((x1 + x2) / 2.0 - dy * curveness, (y1 + y2) / 2.0 + dx * curveness);
			ctx.quadratic_curve_to(cx, cy, x2, y2);
		} else {
			ctx.line_to(x2, y2);
		}
		ctx.stroke();
	});
	ctx.set_global_alpha(1.0);
}

fn label_origin(position: LabelPosition, x: f64, y: f64, radius: f64, width: f64) -> (f64, f64) {
	match position {
		LabelPosition::Right => (x + radius + LABEL_GAP, y),
		LabelPosition::Left => (x - radius - LABEL_GAP - width, y),
		LabelPosition::Top => (x - width / 2.0, y - radius - LABEL_GAP - FONT_SIZE / 2.0),
		LabelPosition::Bottom => (x - width / 2.0, y + radius + LABEL_GAP + FONT_SIZE / 2.0),
	}
}

fn draw_nodes(
	state: &ChartState,
	series: &GraphSeries,
	palette: &Palette,
	ctx: &CanvasRenderingContext2d,
) {
	let (has_highlight, t, k) = (
		state.has_active_highlight(),
		ease_out_cubic(state.hover.highlight_t),
		state.transform.k,
	);
	let font_size = FONT_SIZE / k;
	let mut placed: Vec<(f64, f64, f64, f64)> = Vec::new();
	ctx.set_text_baseline("middle");

	// Dimmed nodes first so the emphasised ones end up on top
	for pass_highlighted in [false, true] {
		state.graph.visit_nodes(|node| {
			let idx = node.index();
			let highlighted = has_highlight && state.is_highlighted(idx);
			if highlighted != pass_highlighted {
				return;
			}
			let info = &node.data.user_data;
			let (x, y) = (node.x() as f64, node.y() as f64);
			let alpha = if has_highlight && !highlighted {
				1.0 - 0.8 * t
			} else {
				1.0
			};

			ctx.set_global_alpha(alpha);
			ctx.begin_path();
			let _ = ctx.arc(x, y, info.radius, 0.0, 2.0 * PI);
			ctx.set_fill_style_str(&info.color);
			ctx.fill();

			if !series.label.show {
				ctx.set_global_alpha(1.0);
				return;
			}
			let weight = if highlighted && t > 0.5 {
				series.emphasis.label.font_weight.as_str()
			} else {
				"normal"
			};
			ctx.set_font(&format!("{} {}px sans-serif", weight, font_size));
			let text = format_template(&series.label.formatter, &info.name);
			let width = ctx.measure_text(&text).map(|m| m.width()).unwrap_or(0.0);
			let (lx, ly) = label_origin(series.label.position, x, y, info.radius, width);

			let rect = (lx, ly - font_size / 2.0, width, font_size);
			if series.label_layout.hide_overlap && placed.iter().any(|r| overlaps(*r, rect)) {
				ctx.set_global_alpha(1.0);
				return;
			}
			placed.push(rect);
			ctx.set_fill_style_str(palette.text);
			let _ = ctx.fill_text(&text, lx, ly);
			ctx.set_global_alpha(1.0);
		});
	}
}

fn overlaps(a: (f64, f64, f64, f64), b: (f64, f64, f64, f64)) -> bool {
	a.0 < b.0 + b.2 && b.0 < a.0 + a.2 && a.1 < b.1 + b.3 && b.1 < a.1 + a.3
}

fn draw_tooltip(state: &ChartState, palette: &Palette, ctx: &CanvasRenderingContext2d) {
	let Some(options) = state.options.as_ref().filter(|o| o.tooltip.show) else {
		return;
	};
	let Some(idx) = state.hover.node else {
		return;
	};
	let mut name = None;
	state.graph.visit_nodes(|node| {
		if node.index() == idx {
			name = Some(node.data.user_data.name.clone());
		}
	});
	let Some(name) = name else {
		return;
	};

	let text = strip_markup(&format_template(&options.tooltip.formatter, &name));
	let (px, py) = state.hover.pointer;
	ctx.set_font(&format!("bold {}px sans-serif", FONT_SIZE));
	let width = ctx.measure_text(&text).map(|m| m.width()).unwrap_or(0.0);
	let (x, y) = (
		(px + 12.0).min(state.width - width - 12.0).max(0.0),
		(py + 12.0).min(state.height - FONT_SIZE - 8.0).max(0.0),
	);
	ctx.set_fill_style_str(palette.tooltip_bg);
	ctx.fill_rect(x, y, width + 12.0, FONT_SIZE + 8.0);
	ctx.set_fill_style_str(palette.text);
	let _ = ctx.fill_text(&text, x + 6.0, y + (FONT_SIZE + 8.0) / 2.0);
}

//! Render configuration accepted by [`ChartHandle::set_option`](super::ChartHandle::set_option).
//!
//! The shape serialises to the camelCase JSON layout charting libraries use for
//! graph series, so a configuration can be logged or compared verbatim.

use serde::Serialize;

use super::types::{Category, GraphDocument, GraphLink, GraphNode};

/// Engine construction options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InitOptions {
	/// Drawing backend.
	pub renderer: Renderer,
	/// Only redraw when the scene changed since the last frame.
	pub use_dirty_rect: bool,
}

impl Default for InitOptions {
	fn default() -> Self {
		Self {
			renderer: Renderer::Canvas,
			use_dirty_rect: true,
		}
	}
}

/// Drawing backends. Only a 2d canvas is supported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Renderer {
	/// `CanvasRenderingContext2d`.
	Canvas,
}

/// Full chart configuration.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
	/// Hover tooltip.
	pub tooltip: Tooltip,
	/// Legend entries. Always empty for the sidebar graph.
	pub legend: Vec<Legend>,
	/// Light/dark text selection.
	pub dark_mode: DarkMode,
	/// CSS colour painted behind the graph.
	pub background_color: String,
	/// Only the first series is drawn.
	pub series: Vec<GraphSeries>,
}

/// Tooltip settings; `{b0}` in the formatter is the hovered node's name.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Tooltip {
	/// Whether the tooltip is drawn at all.
	pub show: bool,
	/// Template; markup is stripped before drawing.
	pub formatter: String,
}

/// A legend block.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Legend {
	/// Category names listed in the legend.
	pub data: Vec<String>,
}

/// How label colours follow the background.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DarkMode {
	/// Derive from the background luminance.
	Auto,
	/// Always dark.
	Dark,
	/// Always light.
	Light,
}

/// A force-directed graph series.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSeries {
	/// Series name.
	pub name: String,
	/// Always `"graph"`.
	#[serde(rename = "type")]
	pub kind: String,
	/// Always `"force"`.
	pub layout: String,
	/// Nodes.
	pub data: Vec<GraphNode>,
	/// Edges, matched to nodes by id, name or index.
	pub links: Vec<GraphLink>,
	/// Categories shown on the legend; empty.
	pub categories: Vec<Category>,
	/// Initial scale.
	pub zoom: f64,
	/// Pan and wheel zoom.
	pub roam: bool,
	/// Node dragging.
	pub draggable: bool,
	/// Node labels.
	pub label: Label,
	/// Hover emphasis.
	pub emphasis: Emphasis,
	/// Label placement.
	pub label_layout: LabelLayout,
	/// Bounds for the roam scale.
	pub scale_limit: ScaleLimit,
	/// Edge style.
	pub line_style: LineStyle,
}

/// Node label settings; `{b}` in the formatter is the node name.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Label {
	/// Draw labels.
	pub show: bool,
	/// Side of the node the label sits on.
	pub position: LabelPosition,
	/// Template.
	pub formatter: String,
}

/// Label side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelPosition {
	/// Right of the node.
	Right,
	/// Left of the node.
	Left,
	/// Above the node.
	Top,
	/// Below the node.
	Bottom,
}

/// Emphasis settings.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Emphasis {
	/// Which nodes stay lit while hovering.
	pub focus: Focus,
	/// Label style while emphasised.
	pub label: EmphasisLabel,
}

/// Hover focus.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Focus {
	/// Only the hovered node.
	#[serde(rename = "self")]
	Node,
	/// The hovered node and its neighbours.
	Adjacency,
}

/// Emphasised label style.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmphasisLabel {
	/// CSS font weight.
	pub font_weight: String,
}

/// Label overlap handling.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelLayout {
	/// Skip labels overlapping an already drawn one.
	pub hide_overlap: bool,
}

/// Scale bounds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ScaleLimit {
	/// Smallest scale.
	pub min: f64,
	/// Largest scale.
	pub max: f64,
}

impl ScaleLimit {
	/// Clamp a scale into the bounds.
	pub fn clamp(&self, k: f64) -> f64 {
		k.clamp(self.min, self.max)
	}
}

/// Edge style.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LineStyle {
	/// Edge colour source.
	pub color: LineColor,
	/// 0 draws straight lines.
	pub curveness: f64,
}

/// Where an edge takes its colour from.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineColor {
	/// The source node's colour.
	Source,
	/// The target node's colour.
	Target,
	/// A literal CSS colour.
	#[serde(untagged)]
	Fixed(String),
}

impl RenderOptions {
	/// Configuration for a transformed document drawn over `background_color`.
	pub fn for_document(document: GraphDocument, background_color: impl Into<String>) -> Self {
		Self {
			tooltip: Tooltip {
				show: false,
				formatter: "<b>{b0}</b>".into(),
			},
			legend: Vec::new(),
			dark_mode: DarkMode::Auto,
			background_color: background_color.into(),
			series: vec![GraphSeries {
				name: "pages".into(),
				kind: "graph".into(),
				layout: "force".into(),
				data: document.nodes,
				links: document.links,
				categories: Vec::new(),
				zoom: 2.0,
				roam: true,
				draggable: false,
				label: Label {
					show: true,
					position: LabelPosition::Right,
					formatter: "{b}".into(),
				},
				emphasis: Emphasis {
					focus: Focus::Adjacency,
					label: EmphasisLabel {
						font_weight: "bold".into(),
					},
				},
				label_layout: LabelLayout {
					hide_overlap: false,
				},
				scale_limit: ScaleLimit { min: 0.5, max: 5.0 },
				line_style: LineStyle {
					color: LineColor::Source,
					curveness: 0.0,
				},
			}],
		}
	}

	/// Whether the engine can draw this configuration.
	pub fn is_well_formed(&self) -> bool {
		self.series.first().is_some_and(|s| {
			s.zoom > 0.0 && s.scale_limit.min > 0.0 && s.scale_limit.min <= s.scale_limit.max
		})
	}

	/// The series that gets drawn.
	pub fn primary_series(&self) -> Option<&GraphSeries> {
		self.series.first()
	}
}

impl GraphSeries {
	/// Same nodes and links, ignoring style.
	pub fn same_data(&self, other: &GraphSeries) -> bool {
		self.data == other.data && self.links == other.links
	}
}

/// Expand `{b}` / `{b0}` with `name`.
pub fn format_template(template: &str, name: &str) -> String {
	template.replace("{b0}", name).replace("{b}", name)
}

/// Drop markup tags from a formatted tooltip so it can be drawn as text.
pub fn strip_markup(text: &str) -> String {
	let mut out = String::with_capacity(text.len());
	let mut in_tag = false;
	for c in text.chars() {
		match c {
			'<' => in_tag = true,
			'>' if in_tag => in_tag = false,
			_ if !in_tag => out.push(c),
			_ => {}
		}
	}
	out
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn sample() -> RenderOptions {
		let document = GraphDocument::from_json(
			r#"{"nodes": [{"name": "A", "value": "/a", "symbolSize": 15}], "links": []}"#,
		)
		.unwrap();
		RenderOptions::for_document(document, "rgb(255, 255, 255)")
	}

	#[test]
	fn serialises_to_graph_series_contract() {
		let value = serde_json::to_value(sample()).unwrap();

		assert_eq!(value["tooltip"], json!({"show": false, "formatter": "<b>{b0}</b>"}));
		assert_eq!(value["legend"], json!([]));
		assert_eq!(value["darkMode"], json!("auto"));
		assert_eq!(value["backgroundColor"], json!("rgb(255, 255, 255)"));

		let series = &value["series"][0];
		assert_eq!(series["type"], json!("graph"));
		assert_eq!(series["layout"], json!("force"));
		assert_eq!(series["zoom"], json!(2.0));
		assert_eq!(series["roam"], json!(true));
		assert_eq!(series["draggable"], json!(false));
		assert_eq!(series["categories"], json!([]));
		assert_eq!(
			series["label"],
			json!({"show": true, "position": "right", "formatter": "{b}"})
		);
		assert_eq!(
			series["emphasis"],
			json!({"focus": "adjacency", "label": {"fontWeight": "bold"}})
		);
		assert_eq!(series["labelLayout"], json!({"hideOverlap": false}));
		assert_eq!(series["scaleLimit"], json!({"min": 0.5, "max": 5.0}));
		assert_eq!(series["lineStyle"], json!({"color": "source", "curveness": 0.0}));
		assert_eq!(series["data"][0]["symbolSize"], json!(15.0));
	}

	#[test]
	fn fixed_line_colour_serialises_as_plain_string() {
		let style = LineStyle {
			color: LineColor::Fixed("#aaa".into()),
			curveness: 0.3,
		};
		assert_eq!(
			serde_json::to_value(style).unwrap(),
			json!({"color": "#aaa", "curveness": 0.3})
		);
	}

	#[test]
	fn well_formedness() {
		let mut options = sample();
		assert!(options.is_well_formed());

		options.series[0].scale_limit = ScaleLimit { min: 3.0, max: 1.0 };
		assert!(!options.is_well_formed());

		options.series.clear();
		assert!(!options.is_well_formed());
	}

	#[test]
	fn templates() {
		assert_eq!(format_template("{b}", "Home"), "Home");
		assert_eq!(strip_markup(&format_template("<b>{b0}</b>", "Home")), "Home");
		assert_eq!(strip_markup("a < b"), "a ");
	}
}

use std::collections::HashSet;
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::{debug, warn};

use super::options::{Focus, GraphSeries, InitOptions, RenderOptions};
use super::types::{GraphLink, GraphNode};

pub const NODE_COLOR: &str = "#5470c6";
/// Extra screen-space slop around nodes and edges for hit testing.
pub const HIT_SLOP: f64 = 4.0;
/// Pointer travel (px) after which a press is a pan, not a click.
pub const CLICK_TOLERANCE: f64 = 3.0;
/// Seconds the layout keeps running after new data.
pub const SETTLE_SECONDS: f64 = 6.0;

#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	pub name: String,
	pub value: String,
	pub radius: f64,
	pub color: String,
}

/// Kind of element a click landed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataType {
	/// A page.
	Node,
	/// A link between pages.
	Edge,
}

/// Payload handed to the click handler.
#[derive(Clone, Debug, PartialEq)]
pub struct ClickEvent {
	/// What was hit.
	pub data_type: DataType,
	/// Node name, or `"source > target"` for edges.
	pub name: String,
	/// Node navigation target; empty for edges.
	pub value: String,
}

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
	/// Set once the pointer travelled past [`CLICK_TOLERANCE`].
	pub moved: bool,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<DefaultNodeIdx>,
	pub neighbors: HashSet<DefaultNodeIdx>,
	pub highlight_t: f64,
	pub prev_node: Option<DefaultNodeIdx>,
	pub prev_neighbors: HashSet<DefaultNodeIdx>,
	pub pointer: (f64, f64),
	delay_t: f64,
}

pub struct ChartState {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub options: Option<RenderOptions>,
	pub init: InitOptions,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub width: f64,
	pub height: f64,
	pub loading: bool,
	settle_t: f64,
	dirty: bool,
	edges: Vec<(DefaultNodeIdx, DefaultNodeIdx)>,
}

fn new_graph() -> ForceGraph<NodeInfo, ()> {
	ForceGraph::new(SimulationParameters {
		force_charge: 150.0,
		force_spring: 0.05,
		force_max: 100.0,
		node_speed: 3000.0,
		damping_factor: 0.9,
	})
}

/// Index of the node a link endpoint refers to: id first, then name, then
/// position in the node list.
pub fn resolve_endpoint(nodes: &[GraphNode], endpoint: &str) -> Option<usize> {
	nodes
		.iter()
		.position(|n| n.id.as_deref() == Some(endpoint))
		.or_else(|| nodes.iter().position(|n| n.name == endpoint))
		.or_else(|| endpoint.parse::<usize>().ok().filter(|&i| i < nodes.len()))
}

/// Links whose endpoints do not resolve to any node.
pub fn unresolved_links<'a>(nodes: &[GraphNode], links: &'a [GraphLink]) -> Vec<&'a GraphLink> {
	links
		.iter()
		.filter(|l| {
			resolve_endpoint(nodes, &l.source).is_none()
				|| resolve_endpoint(nodes, &l.target).is_none()
		})
		.collect()
}

impl ChartState {
	pub fn new(init: InitOptions, width: f64, height: f64) -> Self {
		Self {
			graph: new_graph(),
			options: None,
			init,
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			width,
			height,
			loading: true,
			settle_t: 0.0,
			dirty: true,
			edges: Vec::new(),
		}
	}

	/// Apply a configuration. Style-only changes keep the current layout.
	pub fn set_option(&mut self, options: RenderOptions) {
		let same_data = match (
			self.options.as_ref().and_then(|o| o.primary_series()),
			options.primary_series(),
		) {
			(Some(old), Some(new)) => old.same_data(new),
			(None, None) => true,
			_ => false,
		};
		if !same_data {
			match options.primary_series() {
				Some(series) => self.rebuild(series),
				None => self.clear(),
			}
		}
		if let Some(series) = options.primary_series() {
			self.transform.k = if same_data {
				series.scale_limit.clamp(self.transform.k)
			} else {
				series.scale_limit.clamp(series.zoom)
			};
		}
		self.options = Some(options);
		self.dirty = true;
	}

	fn clear(&mut self) {
		self.graph = new_graph();
		self.edges.clear();
		self.hover = HoverState::default();
		self.drag = DragState::default();
	}

	fn rebuild(&mut self, series: &GraphSeries) {
		self.clear();
		let count = series.data.len().max(1) as f64;
		let mut indices = Vec::with_capacity(series.data.len());
		let mut seen = HashSet::new();

		for (i, node) in series.data.iter().enumerate() {
			if !seen.insert(node.name.as_str()) {
				warn!("duplicate node name {:?}; links resolve to the first", node.name);
			}
			let angle = (i as f64) * 2.0 * PI / count;
			let spread = 40.0 + 4.0 * count.sqrt();
			let idx = self.graph.add_node(NodeData {
				x: (spread * angle.cos()) as f32,
				y: (spread * angle.sin()) as f32,
				mass: 10.0,
				is_anchor: false,
				user_data: NodeInfo {
					name: node.name.clone(),
					value: node.value.clone(),
					radius: (node.symbol_size / 2.0).max(0.5),
					color: NODE_COLOR.into(),
				},
			});
			indices.push(idx);
		}

		let mut connected = HashSet::new();
		for link in &series.links {
			let (Some(src), Some(tgt)) = (
				resolve_endpoint(&series.data, &link.source),
				resolve_endpoint(&series.data, &link.target),
			) else {
				warn!("skipping link {:?} -> {:?}: unknown node", link.source, link.target);
				continue;
			};
			// The simulation takes one spring per pair.
			if src != tgt && connected.insert((src.min(tgt), src.max(tgt))) {
				self.graph
					.add_edge(indices[src], indices[tgt], EdgeData::default());
			}
			self.edges.push((indices[src], indices[tgt]));
		}

		debug!(
			"graph rebuilt: {} nodes, {} links",
			series.data.len(),
			self.edges.len()
		);
		self.settle_t = SETTLE_SECONDS;
	}

	pub fn series(&self) -> Option<&GraphSeries> {
		self.options.as_ref().and_then(|o| o.primary_series())
	}

	pub fn edges(&self) -> &[(DefaultNodeIdx, DefaultNodeIdx)] {
		&self.edges
	}

	pub fn node_count(&self) -> usize {
		let mut n = 0;
		self.graph.visit_nodes(|_| n += 1);
		n
	}

	pub fn hide_loading(&mut self) {
		self.loading = false;
		self.dirty = true;
	}

	pub fn is_animating(&self) -> bool {
		self.settle_t > 0.0
			|| self.drag.active
			|| (self.hover.node.is_some() && self.hover.highlight_t < 1.0)
			|| (self.hover.node.is_none() && self.hover.highlight_t > 0.0)
	}

	pub fn needs_redraw(&self) -> bool {
		!self.init.use_dirty_rect || self.dirty || self.is_animating()
	}

	pub fn mark_clean(&mut self) {
		self.dirty = false;
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let slop = HIT_SLOP / self.transform.k;
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			if (dx * dx + dy * dy).sqrt() < node.data.user_data.radius + slop {
				found = Some(node.index());
			}
		});
		found
	}

	/// Edge under the cursor as (source name, target name).
	pub fn edge_at_position(&self, sx: f64, sy: f64) -> Option<(String, String)> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let slop = HIT_SLOP / self.transform.k;
		let mut found = None;
		self.graph.visit_edges(|n1, n2, _| {
			let (x1, y1, x2, y2) = (n1.x() as f64, n1.y() as f64, n2.x() as f64, n2.y() as f64);
			let (dx, dy) = (x2 - x1, y2 - y1);
			let len2 = dx * dx + dy * dy;
			if len2 < 1e-6 {
				return;
			}
			let t = (((gx - x1) * dx + (gy - y1) * dy) / len2).clamp(0.0, 1.0);
			let (px, py) = (x1 + t * dx - gx, y1 + t * dy - gy);
			if (px * px + py * py).sqrt() < slop {
				found = Some((
					n1.data.user_data.name.clone(),
					n2.data.user_data.name.clone(),
				));
			}
		});
		found
	}

	/// Resolve a click at screen coordinates. Nothing fires before data is
	/// shown or at the end of a pan gesture.
	pub fn click_at(&self, sx: f64, sy: f64) -> Option<ClickEvent> {
		if self.loading || self.pan.moved {
			return None;
		}
		if let Some(idx) = self.node_at_position(sx, sy) {
			let mut event = None;
			self.graph.visit_nodes(|node| {
				if node.index() == idx {
					event = Some(ClickEvent {
						data_type: DataType::Node,
						name: node.data.user_data.name.clone(),
						value: node.data.user_data.value.clone(),
					});
				}
			});
			return event;
		}
		self.edge_at_position(sx, sy)
			.map(|(source, target)| ClickEvent {
				data_type: DataType::Edge,
				name: format!("{} > {}", source, target),
				value: String::new(),
			})
	}

	pub fn set_hover(&mut self, node: Option<DefaultNodeIdx>) {
		if self.hover.node == node {
			return;
		}
		let was_hovering = self.hover.node.is_some();

		// Keep the previous highlight around while it fades out
		if was_hovering && node.is_none() {
			self.hover.prev_node = self.hover.node.take();
			self.hover.prev_neighbors = std::mem::take(&mut self.hover.neighbors);
		} else {
			self.hover.prev_node = None;
			self.hover.prev_neighbors.clear();
		}

		self.hover.node = node;
		self.hover.neighbors.clear();
		self.dirty = true;

		let adjacency = self
			.series()
			.is_some_and(|s| s.emphasis.focus == Focus::Adjacency);
		if let Some(idx) = node {
			if !was_hovering {
				self.hover.delay_t = 0.0;
			}
			if adjacency {
				for &(src, tgt) in &self.edges {
					if src == idx {
						self.hover.neighbors.insert(tgt);
					} else if tgt == idx {
						self.hover.neighbors.insert(src);
					}
				}
			}
		}
	}

	pub fn is_highlighted(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx)
			|| self.hover.neighbors.contains(&idx)
			|| self.hover.prev_node == Some(idx)
			|| self.hover.prev_neighbors.contains(&idx)
	}

	pub fn is_hovered(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx) || self.hover.prev_node == Some(idx)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some() || self.hover.prev_node.is_some()
	}

	pub fn pointer_move(&mut self, x: f64, y: f64) {
		let tooltip = self.options.as_ref().is_some_and(|o| o.tooltip.show);
		if tooltip && self.hover.pointer != (x, y) {
			self.dirty = true;
		}
		self.hover.pointer = (x, y);
		if !self.drag.active && !self.loading {
			let hovered = self.node_at_position(x, y);
			self.set_hover(hovered);
		}

		if self.drag.active {
			if let Some(idx) = self.drag.node_idx {
				let (dx, dy) = (
					(x - self.drag.start_x) / self.transform.k,
					(y - self.drag.start_y) / self.transform.k,
				);
				let (nx, ny) = (
					self.drag.node_start_x + dx as f32,
					self.drag.node_start_y + dy as f32,
				);
				self.graph.visit_nodes_mut(|node| {
					if node.index() == idx {
						node.data.x = nx;
						node.data.y = ny;
						node.data.is_anchor = true;
					}
				});
				self.dirty = true;
			}
		} else if self.pan.active {
			let (dx, dy) = (x - self.pan.start_x, y - self.pan.start_y);
			if (dx * dx + dy * dy).sqrt() > CLICK_TOLERANCE {
				self.pan.moved = true;
			}
			self.transform.x = self.pan.transform_start_x + dx;
			self.transform.y = self.pan.transform_start_y + dy;
			self.dirty = true;
		}
	}

	pub fn pointer_down(&mut self, x: f64, y: f64) {
		let Some(series) = self.series() else {
			return;
		};
		let (draggable, roam) = (series.draggable, series.roam);
		self.pan.moved = false;

		if let Some(idx) = self.node_at_position(x, y).filter(|_| draggable) {
			self.drag.active = true;
			self.drag.node_idx = Some(idx);
			self.drag.start_x = x;
			self.drag.start_y = y;
			let mut start = (0.0, 0.0);
			self.graph.visit_nodes(|node| {
				if node.index() == idx {
					start = (node.x(), node.y());
				}
			});
			(self.drag.node_start_x, self.drag.node_start_y) = start;
			self.settle_t = self.settle_t.max(1.0);
		} else if roam {
			self.pan.active = true;
			self.pan.start_x = x;
			self.pan.start_y = y;
			self.pan.transform_start_x = self.transform.x;
			self.pan.transform_start_y = self.transform.y;
		}
	}

	pub fn pointer_up(&mut self) {
		self.drag.active = false;
		self.drag.node_idx = None;
		self.pan.active = false;
	}

	pub fn pointer_leave(&mut self) {
		self.pointer_up();
		self.pan.moved = false;
		self.set_hover(None);
	}

	/// Wheel zoom around the cursor, within the series' scale limit.
	pub fn zoom_at(&mut self, x: f64, y: f64, delta_y: f64) {
		let Some(series) = self.series() else {
			return;
		};
		if !series.roam {
			return;
		}
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = series.scale_limit.clamp(self.transform.k * factor);
		let ratio = new_k / self.transform.k;
		self.transform.x = x - (x - self.transform.x) * ratio;
		self.transform.y = y - (y - self.transform.y) * ratio;
		self.transform.k = new_k;
		self.dirty = true;
	}

	pub fn tick(&mut self, dt: f32) {
		if self.settle_t > 0.0 || self.drag.active {
			self.graph.update(dt);
			self.settle_t = (self.settle_t - dt as f64).max(0.0);
		}

		let (target, delay, speed) = if self.hover.node.is_some() {
			(1.0, 0.08, 1.8)
		} else {
			(0.0, 0.0, 1.26)
		};

		if self.hover.node.is_some() {
			self.hover.delay_t = (self.hover.delay_t + dt as f64).min(delay);
			if self.hover.delay_t >= delay {
				self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
				if self.hover.highlight_t > 0.99 {
					self.hover.highlight_t = 1.0;
				}
			}
		} else {
			self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			if self.hover.highlight_t < 0.01 {
				self.hover.highlight_t = 0.0;
				self.hover.prev_node = None;
				self.hover.prev_neighbors.clear();
			}
		}
	}

	/// Keep the graph centred in the new viewport.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.transform.x += (width - self.width) / 2.0;
		self.transform.y += (height - self.height) / 2.0;
		self.width = width;
		self.height = height;
		self.dirty = true;
	}
}

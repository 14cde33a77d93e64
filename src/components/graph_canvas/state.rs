use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use crate::graph::model::Graph;

/// Extra world-space padding around a node for pointer hit tests.
pub const HIT_PADDING: f64 = 6.0;
/// Pointer movement below this many pixels counts as a click, not a drag.
pub const CLICK_SLOP: f64 = 4.0;

/// Per-node visual payload carried inside the force simulation.
#[derive(Clone, Debug, Default)]
pub struct NodeVisual {
	pub id: String,
	pub label: String,
	pub color: String,
	pub radius: f64,
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
	/// Set once the pointer leaves the click slop; suppresses click handling.
	pub moved: bool,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
	pub moved: bool,
}

/// Force-layout state behind the canvas. Owns the simulation, the view
/// transform and the pointer interaction state; the logical graph stays in
/// the explorer and is pushed in through [`CanvasState::set_graph`].
pub struct CanvasState {
	pub graph: ForceGraph<NodeVisual, ()>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: Option<DefaultNodeIdx>,
	pub width: f64,
	pub height: f64,
	pub animation_running: bool,
	pub flow_time: f64,
	/// Eased 0..1 blend for the audit-trail highlight.
	pub highlight_t: f64,
	trail_active: bool,
	id_to_idx: HashMap<String, DefaultNodeIdx>,
}

fn simulation_parameters() -> SimulationParameters {
	SimulationParameters {
		force_charge: 150.0,
		force_spring: 0.05,
		force_max: 100.0,
		node_speed: 3000.0,
		damping_factor: 0.9,
	}
}

impl CanvasState {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			graph: ForceGraph::new(simulation_parameters()),
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			hover: None,
			width,
			height,
			animation_running: true,
			flow_time: 0.0,
			highlight_t: 0.0,
			trail_active: false,
			id_to_idx: HashMap::new(),
		}
	}

	/// Replace the simulated graph with a new visible graph. Nodes that
	/// survive the change keep their simulated position and anchor flag so
	/// filter toggles don't scatter the layout; new nodes start on a circle.
	pub fn set_graph(&mut self, data: &Graph) {
		let mut previous: HashMap<String, (f32, f32, bool)> = HashMap::new();
		self.graph.visit_nodes(|node| {
			previous.insert(
				node.data.user_data.id.clone(),
				(node.x(), node.y(), node.data.is_anchor),
			);
		});

		self.graph = ForceGraph::new(simulation_parameters());
		self.id_to_idx.clear();
		self.drag = DragState::default();
		self.hover = None;

		let count = data.nodes.len().max(1);
		for (i, node) in data.nodes.iter().enumerate() {
			let (x, y, is_anchor) = previous.get(&node.id).copied().unwrap_or_else(|| {
				let angle = (i as f64) * 2.0 * PI / count as f64;
				(
					(self.width / 2.0 + 100.0 * angle.cos()) as f32,
					(self.height / 2.0 + 100.0 * angle.sin()) as f32,
					false,
				)
			});

			let idx = self.graph.add_node(NodeData {
				x,
				y,
				mass: 10.0,
				is_anchor,
				user_data: NodeVisual {
					id: node.id.clone(),
					label: node.label.clone(),
					color: node.color.clone(),
					radius: node.size,
				},
			});
			self.id_to_idx.insert(node.id.clone(), idx);
		}

		for edge in &data.edges {
			if let (Some(&src), Some(&tgt)) = (
				self.id_to_idx.get(&edge.source),
				self.id_to_idx.get(&edge.target),
			) {
				self.graph.add_edge(src, tgt, EdgeData::default());
			}
		}
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			// Hit radius is in world-space, scales with zoom like nodes
			if (dx * dx + dy * dy).sqrt() < node.data.user_data.radius + HIT_PADDING {
				found = Some(node.index());
			}
		});
		found
	}

	pub fn node_id(&self, idx: DefaultNodeIdx) -> Option<String> {
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				found = Some(node.data.user_data.id.clone());
			}
		});
		found
	}

	/// Center the view on a node and zoom in enough to read its label.
	pub fn center_on(&mut self, id: &str) {
		let Some(&idx) = self.id_to_idx.get(id) else {
			return;
		};
		let mut position = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				position = Some((node.x() as f64, node.y() as f64));
			}
		});
		if let Some((gx, gy)) = position {
			let k = self.transform.k.max(1.5);
			self.transform.k = k;
			self.transform.x = self.width / 2.0 - gx * k;
			self.transform.y = self.height / 2.0 - gy * k;
		}
	}

	/// Drive the highlight blend toward 1 while a trail is shown.
	pub fn set_trail_active(&mut self, active: bool) {
		self.trail_active = active;
	}

	pub fn tick(&mut self, dt: f32) {
		self.graph.update(dt);
		self.flow_time += dt as f64;

		let (target, speed) = if self.trail_active { (1.0, 1.8) } else { (0.0, 1.26) };
		self.highlight_t += (target - self.highlight_t) * speed * dt as f64;
		if !self.trail_active && self.highlight_t < 0.01 {
			self.highlight_t = 0.0;
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

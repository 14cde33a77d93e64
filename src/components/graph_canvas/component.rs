use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::render::{self, FrameInput};
use super::state::{CanvasState, CLICK_SLOP};
use crate::graph::conflict;
use crate::graph::model::{Conflict, Graph};
use crate::graph::trace::TraceResult;

/// One-shot request to center the view on a node. The sequence number makes
/// repeated searches for the same node re-trigger the move.
#[derive(Clone, Debug, PartialEq)]
pub struct FocusRequest {
	pub seq: u64,
	pub node_id: String,
}

/// Interactive force-directed canvas for the visible graph. Pointer events
/// are resolved to node/background clicks and reported through callbacks;
/// drag, pan and zoom are handled internally.
#[component]
pub fn GraphCanvas(
	#[prop(into)] data: Signal<Graph>,
	#[prop(into)] trail: Signal<Option<TraceResult>>,
	#[prop(into)] conflicts: Signal<Vec<Conflict>>,
	#[prop(into)] selected: Signal<Option<String>>,
	#[prop(into)] focus: Signal<Option<FocusRequest>>,
	on_node_click: Callback<String>,
	on_background_click: Callback<()>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Rc<RefCell<Option<CanvasState>>> = Rc::new(RefCell::new(None));
	let frame: Rc<RefCell<FrameInput>> = Rc::new(RefCell::new(FrameInput::default()));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (state_init, frame_init, animate_init, resize_cb_init) = (
		state.clone(),
		frame.clone(),
		animate.clone(),
		resize_cb.clone(),
	);

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if state_init.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let window: Window = web_sys::window().unwrap();

		let parent_size = |canvas: &HtmlCanvasElement| {
			(
				canvas
					.parent_element()
					.map(|p| p.client_width() as f64)
					.unwrap_or(800.0),
				canvas
					.parent_element()
					.map(|p| p.client_height() as f64)
					.unwrap_or(600.0),
			)
		};
		let (w, h) = parent_size(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")
			.unwrap()
			.unwrap()
			.dyn_into()
			.unwrap();

		let mut initial = CanvasState::new(w, h);
		initial.set_graph(&data.get_untracked());
		*state_init.borrow_mut() = Some(initial);

		let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let (nw, nh) = (
				canvas_resize
					.parent_element()
					.map(|p| p.client_width() as f64)
					.unwrap_or(800.0),
				canvas_resize
					.parent_element()
					.map(|p| p.client_height() as f64)
					.unwrap_or(600.0),
			);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			if let Some(ref mut s) = *state_resize.borrow_mut() {
				s.resize(nw, nh);
			}
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (state_anim, frame_anim, animate_inner) =
			(state_init.clone(), frame_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				if s.animation_running {
					s.tick(0.016);
				}
				render::render(s, &ctx, &frame_anim.borrow());
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				let _ = web_sys::window()
					.unwrap()
					.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	// Push the visible graph into the simulation whenever filters change it.
	let state_data = state.clone();
	Effect::new(move |_| {
		let graph = data.get();
		if let Some(ref mut s) = *state_data.borrow_mut() {
			s.set_graph(&graph);
		}
	});

	// Snapshot highlight inputs for the animation loop.
	let (state_frame, frame_update) = (state.clone(), frame.clone());
	Effect::new(move |_| {
		let trail = trail.get();
		let conflict_keys: HashSet<_> = conflict::conflict_keys(&conflicts.get());
		let selected = selected.get();
		if let Some(ref mut s) = *state_frame.borrow_mut() {
			s.set_trail_active(trail.is_some());
		}
		*frame_update.borrow_mut() = FrameInput {
			trail,
			conflicts: conflict_keys,
			selected,
		};
	});

	// Apply center requests exactly once per sequence number.
	let state_focus = state.clone();
	Effect::new(move |last: Option<u64>| {
		let last = last.unwrap_or(0);
		let Some(request) = focus.get() else {
			return last;
		};
		if request.seq == last {
			return last;
		}
		if let Some(ref mut s) = *state_focus.borrow_mut() {
			s.center_on(&request.node_id);
		}
		request.seq
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		let (x, y) = (
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);

		if let Some(ref mut s) = *state_md.borrow_mut() {
			if let Some(idx) = s.node_at_position(x, y) {
				s.drag.active = true;
				s.drag.moved = false;
				s.drag.node_idx = Some(idx);
				s.drag.start_x = x;
				s.drag.start_y = y;
				s.graph.visit_nodes(|node| {
					if node.index() == idx {
						s.drag.node_start_x = node.x();
						s.drag.node_start_y = node.y();
					}
				});
			} else {
				s.pan.active = true;
				s.pan.moved = false;
				s.pan.start_x = x;
				s.pan.start_y = y;
				s.pan.transform_start_x = s.transform.x;
				s.pan.transform_start_y = s.transform.y;
			}
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		let (x, y) = (
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);

		if let Some(ref mut s) = *state_mm.borrow_mut() {
			if !s.drag.active && !s.pan.active {
				s.hover = s.node_at_position(x, y);
			}

			if s.drag.active {
				let (dx, dy) = (x - s.drag.start_x, y - s.drag.start_y);
				if (dx * dx + dy * dy).sqrt() > CLICK_SLOP {
					s.drag.moved = true;
				}
				if let Some(idx) = s.drag.node_idx {
					let (gdx, gdy) = (dx / s.transform.k, dy / s.transform.k);
					let (nx, ny) = (
						s.drag.node_start_x + gdx as f32,
						s.drag.node_start_y + gdy as f32,
					);
					s.graph.visit_nodes_mut(|node| {
						if node.index() == idx {
							node.data.x = nx;
							node.data.y = ny;
							node.data.is_anchor = true;
						}
					});
				}
			} else if s.pan.active {
				let (dx, dy) = (x - s.pan.start_x, y - s.pan.start_y);
				if (dx * dx + dy * dy).sqrt() > CLICK_SLOP {
					s.pan.moved = true;
				}
				s.transform.x = s.pan.transform_start_x + dx;
				s.transform.y = s.pan.transform_start_y + dy;
			}
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		let mut node_click = None;
		let mut background_click = false;

		if let Some(ref mut s) = *state_mu.borrow_mut() {
			if s.drag.active {
				if let Some(idx) = s.drag.node_idx {
					if s.drag.moved {
						s.graph.visit_nodes_mut(|node| {
							if node.index() == idx {
								node.data.is_anchor = true;
							}
						});
					} else {
						node_click = s.node_id(idx);
					}
				}
			} else if s.pan.active && !s.pan.moved {
				background_click = true;
			}
			s.drag.active = false;
			s.drag.node_idx = None;
			s.pan.active = false;
		}

		// Callbacks run outside the borrow; a handler may update signals that
		// feed straight back into the canvas effects.
		if let Some(id) = node_click {
			on_node_click.run(id);
		} else if background_click {
			on_background_click.run(());
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.drag.active = false;
			s.drag.node_idx = None;
			s.pan.active = false;
			s.hover = None;
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		let (x, y) = (
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);

		if let Some(ref mut s) = *state_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			let new_k = (s.transform.k * factor).clamp(0.1, 10.0);
			let ratio = new_k / s.transform.k;
			s.transform.x = x - (x - s.transform.x) * ratio;
			s.transform.y = y - (y - s.transform.y) * ratio;
			s.transform.k = new_k;
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}

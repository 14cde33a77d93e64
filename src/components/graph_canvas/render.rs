use std::collections::HashSet;
use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::CanvasState;
use crate::graph::conflict;
use crate::graph::model::EdgeKey;
use crate::graph::trace::TraceResult;

/// Highlight inputs for one frame, snapshotted from the explorer signals so
/// the animation loop never touches reactive state.
#[derive(Clone, Debug, Default)]
pub struct FrameInput {
	pub trail: Option<TraceResult>,
	pub conflicts: HashSet<EdgeKey>,
	pub selected: Option<String>,
}

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

pub fn render(state: &CanvasState, ctx: &CanvasRenderingContext2d, input: &FrameInput) {
	ctx.set_fill_style_str("#1a1a2e");
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, ctx, input);
	draw_nodes(state, ctx, input);
	ctx.restore();
}

fn draw_edges(state: &CanvasState, ctx: &CanvasRenderingContext2d, input: &FrameInput) {
	let k = state.transform.k;
	let arrow_size = 8.0 / k;
	let t = ease_out_cubic(state.highlight_t);

	state.graph.visit_edges(|n1, n2, _| {
		let (x1, y1, x2, y2) = (n1.x() as f64, n1.y() as f64, n2.x() as f64, n2.y() as f64);
		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			return;
		}

		let (va, vb) = (&n1.data.user_data, &n2.data.user_data);
		let key = EdgeKey::new(&va.id, &vb.id);
		let style = conflict::style_for_key(&key, &input.conflicts, input.trail.as_ref());
		let emphasized = style.dash.is_some()
			|| input.trail.as_ref().is_some_and(|trail| trail.contains_edge(&key));

		// While a trail is shown, everything outside it fades back.
		let alpha = if emphasized { 1.0 } else { 1.0 - 0.7 * t };
		ctx.set_global_alpha(alpha);
		ctx.set_stroke_style_str(&style.color);
		ctx.set_line_width(style.width / k);
		if let Some([dash, gap]) = style.dash {
			let (dash, gap) = (dash / k, gap / k);
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(dash),
				&JsValue::from_f64(gap),
			));
			ctx.set_line_dash_offset(-(state.flow_time * 30.0) % (dash + gap));
		}

		let (ux, uy) = (dx / dist, dy / dist);
		let (r1, r2) = (va.radius, vb.radius);
		ctx.begin_path();
		ctx.move_to(x1 + ux * r1, y1 + uy * r1);
		ctx.line_to(x2 - ux * (r2 + arrow_size), y2 - uy * (r2 + arrow_size));
		ctx.stroke();
		let _ = ctx.set_line_dash(&js_sys::Array::new());

		ctx.set_fill_style_str(&style.color);
		let (tip_x, tip_y) = (x2 - ux * r2, y2 - uy * r2);
		let (back_x, back_y) = (tip_x - ux * arrow_size, tip_y - uy * arrow_size);
		let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();
		ctx.set_global_alpha(1.0);
	});
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_nodes(state: &CanvasState, ctx: &CanvasRenderingContext2d, input: &FrameInput) {
	let k = state.transform.k;
	let t = ease_out_cubic(state.highlight_t);

	state.graph.visit_nodes(|node| {
		let visual = &node.data.user_data;
		let (x, y) = (node.x() as f64, node.y() as f64);
		let in_trail = input
			.trail
			.as_ref()
			.is_some_and(|trail| trail.contains_node(&visual.id));
		let is_selected = input.selected.as_deref() == Some(visual.id.as_str());
		let is_hovered = state.hover == Some(node.index());
		let emphasized = in_trail || is_selected;

		let alpha = if emphasized { 1.0 } else { 1.0 - 0.7 * t };
		let radius = if in_trail {
			visual.radius * (1.0 + 0.2 * t)
		} else {
			visual.radius
		};

		if is_selected && let Ok(gradient) =
			ctx.create_radial_gradient(x, y, radius * 0.3, x, y, radius * 2.2)
		{
			let _ = gradient.add_color_stop(0.0, "rgba(255, 255, 255, 0.35)");
			let _ = gradient.add_color_stop(1.0, "rgba(255, 255, 255, 0)");
			ctx.begin_path();
			let _ = ctx.arc(x, y, radius * 2.2, 0.0, 2.0 * PI);
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
			ctx.fill();
		}

		ctx.set_global_alpha(alpha);
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&visual.color);
		ctx.fill();
		ctx.set_stroke_style_str("rgba(255, 255, 255, 0.8)");
		ctx.set_line_width(1.0 / k);
		ctx.stroke();

		if is_selected {
			ctx.begin_path();
			let _ = ctx.arc(x, y, radius + 3.0 / k, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str("rgba(255, 255, 255, 0.9)");
			ctx.set_line_width(1.5 / k);
			ctx.stroke();
		}

		draw_label(ctx, visual.label.as_str(), x, y + radius, k, is_hovered || emphasized);
		ctx.set_global_alpha(1.0);
	});
}

/// Label below the node on a contrast backing.
fn draw_label(
	ctx: &CanvasRenderingContext2d,
	label: &str,
	x: f64,
	bottom_y: f64,
	k: f64,
	emphasized: bool,
) {
	let font_size = 10.0 / k.max(0.5);
	ctx.set_font(&format!("{font_size}px sans-serif"));
	let text_width = ctx
		.measure_text(label)
		.map(|m| m.width())
		.unwrap_or_default();
	let pad = font_size * 0.2;
	let y = bottom_y + font_size;

	ctx.set_fill_style_str("rgba(26, 26, 46, 0.85)");
	ctx.fill_rect(
		x - text_width / 2.0 - pad,
		y - font_size / 2.0 - pad,
		text_width + pad * 2.0,
		font_size + pad * 2.0,
	);

	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	let color = if emphasized {
		"rgba(255, 255, 255, 0.95)"
	} else {
		"rgba(255, 255, 255, 0.7)"
	};
	ctx.set_fill_style_str(color);
	let _ = ctx.fill_text(label, x, y);
}

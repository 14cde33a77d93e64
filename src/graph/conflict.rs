//! Conflict overlay: maps backend-reported node-pair conflicts onto edge
//! styling. Conflict styling beats trail highlighting, which beats the
//! default line style.

use std::collections::HashSet;

use super::model::{Conflict, Edge, EdgeKey};
use super::trace::TraceResult;

/// Resolved line style for one edge, in logical pixels. The canvas divides
/// widths by the zoom factor when drawing.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeStyle {
	/// Canvas stroke/fill style.
	pub color: String,
	/// Line width before zoom compensation.
	pub width: f64,
	/// Dash/gap pattern, if any.
	pub dash: Option<[f64; 2]>,
}

const DEFAULT_COLOR: &str = "rgba(100, 180, 255, 0.6)";
const TRAIL_COLOR: &str = "rgba(255, 214, 10, 0.9)";
const CONFLICT_COLOR: &str = "rgba(255, 69, 58, 0.95)";

impl EdgeStyle {
	fn default_style() -> Self {
		EdgeStyle {
			color: DEFAULT_COLOR.into(),
			width: 1.5,
			dash: None,
		}
	}

	fn trail() -> Self {
		EdgeStyle {
			color: TRAIL_COLOR.into(),
			width: 2.5,
			dash: None,
		}
	}

	fn conflict() -> Self {
		EdgeStyle {
			color: CONFLICT_COLOR.into(),
			width: 3.0,
			dash: Some([6.0, 3.0]),
		}
	}
}

/// True when the edge's unordered endpoint pair matches any reported
/// conflict pair.
pub fn is_conflicted(edge: &Edge, conflicts: &[Conflict]) -> bool {
	let key = edge.key();
	conflicts.iter().any(|c| c.key() == key)
}

/// Canonical key set for a conflict list, for repeated lookups during a
/// render pass.
pub fn conflict_keys(conflicts: &[Conflict]) -> HashSet<EdgeKey> {
	conflicts.iter().map(Conflict::key).collect()
}

/// Style for an edge given the active conflicts and the current trace
/// highlight, applying the conflict > trail > default precedence.
pub fn style_for(edge: &Edge, conflicts: &[Conflict], trail: Option<&TraceResult>) -> EdgeStyle {
	style_for_key(&edge.key(), &conflict_keys(conflicts), trail)
}

/// Key-based variant of [`style_for`] for callers that already resolved the
/// edge to its unordered endpoint pair.
pub fn style_for_key(
	key: &EdgeKey,
	conflicts: &HashSet<EdgeKey>,
	trail: Option<&TraceResult>,
) -> EdgeStyle {
	if conflicts.contains(key) {
		return EdgeStyle::conflict();
	}
	if let Some(trail) = trail
		&& trail.contains_edge(key)
	{
		return EdgeStyle::trail();
	}
	EdgeStyle::default_style()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn edge(a: &str, b: &str) -> Edge {
		Edge {
			source: a.into(),
			target: b.into(),
			relation: "RELATES".into(),
		}
	}

	fn conflict(a: &str, b: &str) -> Conflict {
		Conflict {
			source_id: a.into(),
			target_id: b.into(),
			description: "amounts disagree".into(),
			severity: Some("high".into()),
		}
	}

	#[test]
	fn conflicted_edge_gets_dashed_emphasis() {
		let conflicts = vec![conflict("A", "B")];
		let style = style_for(&edge("A", "B"), &conflicts, None);
		assert_eq!(style.dash, Some([6.0, 3.0]));
		assert!(style.width > EdgeStyle::default_style().width);
	}

	#[test]
	fn conflict_match_is_unordered() {
		let conflicts = vec![conflict("A", "B")];
		assert!(is_conflicted(&edge("B", "A"), &conflicts));
		assert!(!is_conflicted(&edge("B", "C"), &conflicts));
	}

	#[test]
	fn conflict_beats_trail() {
		let conflicts = vec![conflict("A", "B")];
		let mut trail = TraceResult::default();
		trail.visited_edges.insert(EdgeKey::new("A", "B"));
		let style = style_for(&edge("A", "B"), &conflicts, Some(&trail));
		assert_eq!(style, EdgeStyle::conflict());
	}

	#[test]
	fn trail_beats_default() {
		let mut trail = TraceResult::default();
		trail.visited_edges.insert(EdgeKey::new("B", "C"));
		let style = style_for(&edge("C", "B"), &[], Some(&trail));
		assert_eq!(style, EdgeStyle::trail());
	}

	#[test]
	fn unrelated_edge_keeps_default_style() {
		let conflicts = vec![conflict("A", "B")];
		let style = style_for(&edge("B", "C"), &conflicts, None);
		assert_eq!(style, EdgeStyle::default_style());
		assert!(style.dash.is_none());
	}
}

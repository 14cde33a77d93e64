use std::collections::HashMap;

use serde::Deserialize;

/// A property value attached to a node. The backend sends an open key/value
/// map per entity; scalar values keep their type, anything else is flattened
/// to display text on ingestion.
#[derive(Clone, Debug, PartialEq)]
pub enum PropValue {
	/// Explicit null from the backend.
	Null,
	/// Boolean scalar.
	Bool(bool),
	/// Numeric scalar.
	Number(f64),
	/// String scalar, or the flattened form of a non-scalar.
	Text(String),
}

impl PropValue {
	/// Display text used for filtering and detail rendering. `None` for null.
	pub fn as_text(&self) -> Option<String> {
		match self {
			PropValue::Null => None,
			PropValue::Bool(b) => Some(b.to_string()),
			PropValue::Number(n) => Some(trim_float(*n)),
			PropValue::Text(s) => Some(s.clone()),
		}
	}
}

impl From<&serde_json::Value> for PropValue {
	fn from(value: &serde_json::Value) -> Self {
		match value {
			serde_json::Value::Null => PropValue::Null,
			serde_json::Value::Bool(b) => PropValue::Bool(*b),
			serde_json::Value::Number(n) => PropValue::Number(n.as_f64().unwrap_or(0.0)),
			serde_json::Value::String(s) => PropValue::Text(s.clone()),
			// Arrays/objects are not part of the property contract; keep them
			// displayable rather than dropping the key.
			other => PropValue::Text(other.to_string()),
		}
	}
}

fn trim_float(n: f64) -> String {
	if n.fract() == 0.0 && n.abs() < 1e15 {
		format!("{}", n as i64)
	} else {
		format!("{n}")
	}
}

/// One entity in the knowledge graph. The full node set is replaced on every
/// fetch; `color` and `size` are assigned once at ingestion and never change.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	/// Globally unique, stable across rebuilds for a given backend entity.
	pub id: String,
	/// Display string, not unique.
	pub label: String,
	/// Category, lowercased on ingestion (`document`, `person`, ...).
	pub kind: String,
	/// Open entity-specific attributes; no fixed schema.
	pub properties: HashMap<String, PropValue>,
	/// Radius hint derived from the type policy.
	pub size: f64,
	/// Fill style derived from the type hash.
	pub color: String,
}

impl Node {
	/// Read a named property as display text.
	pub fn property_text(&self, key: &str) -> Option<String> {
		self.properties.get(key).and_then(PropValue::as_text)
	}
}

/// A relationship between two nodes. Edges refer to nodes by id only; the
/// canvas may resolve ids to layout indices internally but the canonical
/// graph never stores resolved references.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
	/// Id of the node this edge starts at.
	pub source: String,
	/// Id of the node this edge points to.
	pub target: String,
	/// Free-text relation name from the backend (`ISSUED_BY`, `MENTIONS`, ...).
	pub relation: String,
}

impl Edge {
	/// Canonical unordered endpoint pair for this edge.
	pub fn key(&self) -> EdgeKey {
		EdgeKey::new(&self.source, &self.target)
	}
}

/// Canonical unordered pair of node ids. Tracing and conflict matching treat
/// edges as undirected, so `(a, b)` and `(b, a)` collapse to the same key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey(String, String);

impl EdgeKey {
	/// Build the canonical key for an endpoint pair, in either order.
	pub fn new(a: &str, b: &str) -> Self {
		if a <= b {
			EdgeKey(a.to_string(), b.to_string())
		} else {
			EdgeKey(b.to_string(), a.to_string())
		}
	}
}

/// Node set plus edge set. Two copies live in the explorer: the source graph
/// (everything fetched) and the visible graph derived from it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Graph {
	/// Node set; ids are unique.
	pub nodes: Vec<Node>,
	/// Edge set; endpoints refer to `nodes` by id.
	pub edges: Vec<Edge>,
}

impl Graph {
	/// Look up a node by id.
	pub fn node(&self, id: &str) -> Option<&Node> {
		self.nodes.iter().find(|n| n.id == id)
	}

	/// All node ids, in graph order.
	pub fn node_ids(&self) -> Vec<String> {
		self.nodes.iter().map(|n| n.id.clone()).collect()
	}
}

/// One clause of the advanced filter. Rules combine with AND semantics in
/// list order; an empty list applies no additional filtering.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryRule {
	/// Unique within the rule list.
	pub id: String,
	/// Field to match: `label`, `type`, or a property key such as `summary`.
	pub field: String,
	/// How to compare the field against `value`.
	pub operator: Operator,
	/// Comparison operand, matched case-insensitively.
	pub value: String,
}

/// Comparison operator for a query rule, matched case-insensitively.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
	/// Field contains the value as a substring.
	Contains,
	/// Field equals the value exactly.
	Equals,
	/// Field starts with the value.
	StartsWith,
	/// Field ends with the value.
	EndsWith,
}

impl Operator {
	/// Every operator, in picker order.
	pub const ALL: [Operator; 4] = [
		Operator::Contains,
		Operator::Equals,
		Operator::StartsWith,
		Operator::EndsWith,
	];

	/// Stable identifier, matching the wire names used by the query builder.
	pub fn id(self) -> &'static str {
		match self {
			Operator::Contains => "contains",
			Operator::Equals => "equals",
			Operator::StartsWith => "starts_with",
			Operator::EndsWith => "ends_with",
		}
	}

	/// Human label for the operator picker.
	pub fn label(self) -> &'static str {
		match self {
			Operator::Contains => "contains",
			Operator::Equals => "is exactly",
			Operator::StartsWith => "starts with",
			Operator::EndsWith => "ends with",
		}
	}

	/// Inverse of [`Operator::id`].
	pub fn from_id(id: &str) -> Option<Operator> {
		Operator::ALL.into_iter().find(|op| op.id() == id)
	}
}

/// A backend-flagged suspicious relationship between two nodes. Opaque to the
/// client; used only to pick edge styling.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Conflict {
	/// First node of the suspicious pair.
	pub source_id: String,
	/// Second node of the suspicious pair.
	pub target_id: String,
	/// One-sentence explanation from the analyzer.
	pub description: String,
	/// `high`, `medium` or `low` where the analyzer provides it.
	#[serde(default)]
	pub severity: Option<String>,
}

impl Conflict {
	/// Canonical unordered endpoint pair for this conflict.
	pub fn key(&self) -> EdgeKey {
		EdgeKey::new(&self.source_id, &self.target_id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn edge_key_ignores_direction() {
		assert_eq!(EdgeKey::new("a", "b"), EdgeKey::new("b", "a"));
		assert_ne!(EdgeKey::new("a", "b"), EdgeKey::new("a", "c"));
	}

	#[test]
	fn prop_value_text_forms() {
		assert_eq!(PropValue::Null.as_text(), None);
		assert_eq!(PropValue::Number(3.0).as_text().as_deref(), Some("3"));
		assert_eq!(PropValue::Number(0.5).as_text().as_deref(), Some("0.5"));
		assert_eq!(
			PropValue::Text("net 30".into()).as_text().as_deref(),
			Some("net 30")
		);
	}

	#[test]
	fn prop_value_flattens_non_scalars() {
		let v: serde_json::Value = serde_json::json!({ "nested": true });
		match PropValue::from(&v) {
			PropValue::Text(s) => assert!(s.contains("nested")),
			other => panic!("expected text, got {other:?}"),
		}
	}
}

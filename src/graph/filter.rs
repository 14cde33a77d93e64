//! Derivation of the visible subgraph.
//!
//! The visible graph is always recomputed from the source graph, the hidden
//! type set and the rule list; it is never mutated independently.

use std::collections::{BTreeSet, HashSet};

use super::model::{Graph, Node, Operator, QueryRule};

/// Derive the rendered subgraph: nodes whose type is not hidden and which
/// satisfy every rule, plus edges whose both endpoints survive. Node and edge
/// ordering follows the source graph.
pub fn derive_visible(source: &Graph, hidden: &BTreeSet<String>, rules: &[QueryRule]) -> Graph {
	let nodes: Vec<Node> = source
		.nodes
		.iter()
		.filter(|n| !hidden.contains(&n.kind) && rules.iter().all(|r| rule_matches(n, r)))
		.cloned()
		.collect();

	let visible_ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
	let edges = source
		.edges
		.iter()
		.filter(|e| visible_ids.contains(e.source.as_str()) && visible_ids.contains(e.target.as_str()))
		.cloned()
		.collect();

	Graph { nodes, edges }
}

/// Distinct node types present in the source graph, sorted. The legend is
/// built from the source set so a hidden type can always be re-enabled.
pub fn available_types(source: &Graph) -> Vec<String> {
	let set: BTreeSet<&str> = source.nodes.iter().map(|n| n.kind.as_str()).collect();
	set.into_iter().map(str::to_string).collect()
}

fn rule_matches(node: &Node, rule: &QueryRule) -> bool {
	// A field that resolves to nothing (unknown name, or absent/null
	// property) fails the rule instead of erroring out the filter pass.
	let Some(subject) = field_text(node, &rule.field) else {
		return false;
	};
	let subject = subject.to_lowercase();
	let value = rule.value.to_lowercase();
	match rule.operator {
		Operator::Contains => subject.contains(&value),
		Operator::Equals => subject == value,
		Operator::StartsWith => subject.starts_with(&value),
		Operator::EndsWith => subject.ends_with(&value),
	}
}

fn field_text(node: &Node, field: &str) -> Option<String> {
	match field {
		"label" => Some(node.label.clone()),
		"type" => Some(node.kind.clone()),
		other => node.property_text(other),
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use super::*;
	use crate::graph::model::{Edge, PropValue};

	fn node(id: &str, kind: &str) -> Node {
		Node {
			id: id.into(),
			label: id.into(),
			kind: kind.into(),
			properties: HashMap::new(),
			size: 8.0,
			color: String::new(),
		}
	}

	fn edge(a: &str, b: &str) -> Edge {
		Edge {
			source: a.into(),
			target: b.into(),
			relation: "RELATES".into(),
		}
	}

	fn sample() -> Graph {
		Graph {
			nodes: vec![node("A", "document"), node("B", "person"), node("C", "person")],
			edges: vec![edge("A", "B"), edge("B", "C")],
		}
	}

	fn rule(field: &str, op: Operator, value: &str) -> QueryRule {
		QueryRule {
			id: "r1".into(),
			field: field.into(),
			operator: op,
			value: value.into(),
		}
	}

	#[test]
	fn hidden_types_drop_nodes_and_their_edges() {
		let g = sample();
		let hidden: BTreeSet<String> = ["person".to_string()].into();
		let visible = derive_visible(&g, &hidden, &[]);
		assert_eq!(visible.node_ids(), vec!["A"]);
		assert!(visible.edges.is_empty());
	}

	#[test]
	fn no_filters_is_identity() {
		let g = sample();
		let visible = derive_visible(&g, &BTreeSet::new(), &[]);
		assert_eq!(visible, g);
	}

	#[test]
	fn filtering_is_idempotent() {
		let g = sample();
		let hidden: BTreeSet<String> = ["person".to_string()].into();
		let once = derive_visible(&g, &hidden, &[]);
		let twice = derive_visible(&once, &BTreeSet::new(), &[]);
		assert_eq!(once, twice);
	}

	#[test]
	fn no_dangling_edges_in_output() {
		let g = sample();
		let hidden: BTreeSet<String> = ["document".to_string()].into();
		let visible = derive_visible(&g, &hidden, &[]);
		let ids: HashSet<_> = visible.nodes.iter().map(|n| n.id.clone()).collect();
		for e in &visible.edges {
			assert!(ids.contains(&e.source) && ids.contains(&e.target));
		}
		assert_eq!(visible.node_ids(), vec!["B", "C"]);
		assert_eq!(visible.edges.len(), 1);
	}

	#[test]
	fn rules_and_together() {
		let g = sample();
		let rules = vec![
			rule("type", Operator::Equals, "person"),
			rule("label", Operator::Contains, "b"),
		];
		let visible = derive_visible(&g, &BTreeSet::new(), &rules);
		assert_eq!(visible.node_ids(), vec!["B"]);
	}

	#[test]
	fn matching_is_case_insensitive() {
		let mut g = sample();
		g.nodes[0].label = "Quarterly Invoice".into();
		let visible = derive_visible(
			&g,
			&BTreeSet::new(),
			&[rule("label", Operator::StartsWith, "qUARTER")],
		);
		assert_eq!(visible.node_ids(), vec!["A"]);
	}

	#[test]
	fn summary_reads_from_properties() {
		let mut g = sample();
		g.nodes[1]
			.properties
			.insert("summary".into(), PropValue::Text("Signed lease agreement".into()));
		let visible = derive_visible(
			&g,
			&BTreeSet::new(),
			&[rule("summary", Operator::Contains, "lease")],
		);
		assert_eq!(visible.node_ids(), vec!["B"]);
	}

	#[test]
	fn unknown_field_matches_nothing() {
		let g = sample();
		let visible = derive_visible(
			&g,
			&BTreeSet::new(),
			&[rule("no_such_field", Operator::Contains, "")],
		);
		assert!(visible.nodes.is_empty());
		assert!(visible.edges.is_empty());
	}

	#[test]
	fn ends_with_operator() {
		let g = sample();
		let visible = derive_visible(
			&g,
			&BTreeSet::new(),
			&[rule("type", Operator::EndsWith, "ment")],
		);
		assert_eq!(visible.node_ids(), vec!["A"]);
	}

	#[test]
	fn available_types_come_from_source() {
		let g = sample();
		assert_eq!(available_types(&g), vec!["document", "person"]);
		// Hiding a type must not remove it from the legend.
		let hidden: BTreeSet<String> = ["person".to_string()].into();
		let _ = derive_visible(&g, &hidden, &[]);
		assert_eq!(available_types(&g), vec!["document", "person"]);
	}
}

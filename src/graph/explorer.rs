//! Explorer state machine: one owner for every piece of graph UI state.
//!
//! The page shell holds an `Explorer` in a signal and calls transitions in
//! response to events; transitions return [`Command`] values for side effects
//! (dossier fetch, view centering) so the machine stays pure and testable.

use std::collections::BTreeSet;

use super::filter;
use super::model::{Conflict, Graph, QueryRule};
use super::trace::{self, TraceResult};

/// Interaction mode. Browsing opens dossiers on click; audit ("Trace the
/// Trail") highlights the clicked node's connected component instead.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
	/// Default mode: selection opens the entity dossier.
	#[default]
	Browsing,
	/// Trace mode: selection highlights the node's connected component.
	Audit,
}

/// Side effect requested by a transition, executed by the page shell.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
	/// Fetch and open the dossier for this node.
	OpenDossier(String),
	/// Center and zoom the canvas onto this node.
	Center(String),
}

/// All shared graph UI state. Derived structures (the visible graph) are
/// recomputed from here, never mutated in place.
#[derive(Clone, Debug, Default)]
pub struct Explorer {
	source: Graph,
	hidden_types: BTreeSet<String>,
	rules: Vec<QueryRule>,
	mode: Mode,
	selected: Option<String>,
	trail: Option<TraceResult>,
	conflicts: Vec<Conflict>,
}

impl Explorer {
	/// Current interaction mode.
	pub fn mode(&self) -> Mode {
		self.mode
	}

	/// The full fetched graph.
	pub fn source(&self) -> &Graph {
		&self.source
	}

	/// Id of the selected node, if any.
	pub fn selected_id(&self) -> Option<&str> {
		self.selected.as_deref()
	}

	/// The active trail highlight, present only in audit mode.
	pub fn trail(&self) -> Option<&TraceResult> {
		self.trail.as_ref()
	}

	/// Conflicts from the last analysis run.
	pub fn conflicts(&self) -> &[Conflict] {
		&self.conflicts
	}

	/// Number of stored conflicts, for the controls badge.
	pub fn conflict_count(&self) -> usize {
		self.conflicts.len()
	}

	/// Types currently excluded from the visible graph.
	pub fn hidden_types(&self) -> &BTreeSet<String> {
		&self.hidden_types
	}

	/// The rendered subgraph under the current filters and rules.
	pub fn visible(&self) -> Graph {
		filter::derive_visible(&self.source, &self.hidden_types, &self.rules)
	}

	/// Legend entries: every type in the source graph, hidden ones included.
	pub fn available_types(&self) -> Vec<String> {
		filter::available_types(&self.source)
	}

	/// Install a freshly fetched source graph, replacing the previous node
	/// set wholesale. Selection, trail and conflicts refer to the old node
	/// set and are dropped; filters and rules carry over.
	pub fn install_graph(&mut self, graph: Graph) {
		self.source = graph;
		self.selected = None;
		self.trail = None;
		self.conflicts.clear();
	}

	/// Store the result of a conflict analysis. An empty list is a valid
	/// "no conflicts" outcome, not an error.
	pub fn set_conflicts(&mut self, conflicts: Vec<Conflict>) {
		self.conflicts = conflicts;
	}

	/// Flip between browsing and audit mode. Any existing trail highlight is
	/// cleared on every transition, in both directions.
	pub fn toggle_audit(&mut self) {
		self.mode = match self.mode {
			Mode::Browsing => Mode::Audit,
			Mode::Audit => Mode::Browsing,
		};
		self.trail = None;
	}

	/// Select a node. In browsing mode this requests its dossier; in audit
	/// mode it replaces the trail highlight with the node's connected
	/// component (no accumulation across selections).
	pub fn select_node(&mut self, id: &str) -> Option<Command> {
		self.selected = Some(id.to_string());
		match self.mode {
			Mode::Browsing => Some(Command::OpenDossier(id.to_string())),
			Mode::Audit => {
				self.trail = Some(trace::trace(&self.source, id));
				None
			}
		}
	}

	/// Background click: drop selection and highlight, keep the mode.
	pub fn clear_selection(&mut self) {
		self.selected = None;
		self.trail = None;
	}

	/// Find the first node whose label equals the query case-insensitively,
	/// center on it and select it with the current mode's semantics. An
	/// unmatched query is a no-op.
	pub fn search(&mut self, query: &str) -> Vec<Command> {
		let needle = query.trim().to_lowercase();
		if needle.is_empty() {
			return Vec::new();
		}
		let Some(id) = self
			.source
			.nodes
			.iter()
			.find(|n| n.label.to_lowercase() == needle)
			.map(|n| n.id.clone())
		else {
			return Vec::new();
		};

		let mut commands = vec![Command::Center(id.clone())];
		commands.extend(self.select_node(&id));
		commands
	}

	/// Show or hide a node type. The visible graph is re-derived on the next
	/// `visible()` call.
	pub fn set_type_visible(&mut self, kind: &str, visible: bool) {
		if visible {
			self.hidden_types.remove(kind);
		} else {
			self.hidden_types.insert(kind.to_string());
		}
	}

	/// Replace the advanced query rule list.
	pub fn set_rules(&mut self, rules: Vec<QueryRule>) {
		self.rules = rules;
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use super::*;
	use crate::graph::model::{Edge, Node, Operator};

	fn node(id: &str, label: &str, kind: &str) -> Node {
		Node {
			id: id.into(),
			label: label.into(),
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
			nodes: vec![
				node("A", "Invoice 42", "document"),
				node("B", "Dana Cole", "person"),
				node("C", "Acme Corp", "organization"),
			],
			edges: vec![edge("A", "B"), edge("B", "C")],
		}
	}

	fn explorer() -> Explorer {
		let mut ex = Explorer::default();
		ex.install_graph(sample());
		ex
	}

	#[test]
	fn browsing_select_opens_dossier() {
		let mut ex = explorer();
		let cmd = ex.select_node("A");
		assert_eq!(cmd, Some(Command::OpenDossier("A".into())));
		assert_eq!(ex.selected_id(), Some("A"));
		assert!(ex.trail().is_none());
	}

	#[test]
	fn audit_select_traces_component() {
		let mut ex = explorer();
		ex.toggle_audit();
		let cmd = ex.select_node("A");
		assert_eq!(cmd, None);
		let trail = ex.trail().expect("trail after audit select");
		assert_eq!(trail.visited_nodes.len(), 3);
	}

	#[test]
	fn audit_reselect_replaces_trail() {
		let mut ex = explorer();
		let mut graph = sample();
		graph.nodes.push(node("X", "Orphan", "tag"));
		ex.install_graph(graph);
		ex.toggle_audit();
		ex.select_node("A");
		ex.select_node("X");
		let trail = ex.trail().unwrap();
		assert!(trail.contains_node("X"));
		assert!(!trail.contains_node("A"));
	}

	#[test]
	fn toggle_audit_clears_trail_both_ways() {
		let mut ex = explorer();
		ex.toggle_audit();
		ex.select_node("A");
		assert!(ex.trail().is_some());
		ex.toggle_audit();
		assert!(ex.trail().is_none());
		assert_eq!(ex.mode(), Mode::Browsing);
	}

	#[test]
	fn clear_selection_keeps_mode() {
		let mut ex = explorer();
		ex.toggle_audit();
		ex.select_node("B");
		ex.clear_selection();
		assert_eq!(ex.selected_id(), None);
		assert!(ex.trail().is_none());
		assert_eq!(ex.mode(), Mode::Audit);
	}

	#[test]
	fn search_matches_label_case_insensitively() {
		let mut ex = explorer();
		let commands = ex.search("invoice 42");
		assert_eq!(commands[0], Command::Center("A".into()));
		assert_eq!(commands[1], Command::OpenDossier("A".into()));
		assert_eq!(ex.selected_id(), Some("A"));
	}

	#[test]
	fn search_miss_is_a_no_op() {
		let mut ex = explorer();
		ex.select_node("B");
		let commands = ex.search("nonexistent");
		assert!(commands.is_empty());
		assert_eq!(ex.selected_id(), Some("B"));
	}

	#[test]
	fn search_uses_current_mode_semantics() {
		let mut ex = explorer();
		ex.toggle_audit();
		let commands = ex.search("Dana Cole");
		assert_eq!(commands, vec![Command::Center("B".into())]);
		assert!(ex.trail().is_some());
	}

	#[test]
	fn type_toggle_filters_visible_graph() {
		let mut ex = explorer();
		ex.set_type_visible("person", false);
		let visible = ex.visible();
		assert_eq!(visible.node_ids(), vec!["A", "C"]);
		assert!(visible.edges.is_empty());
		ex.set_type_visible("person", true);
		assert_eq!(ex.visible().nodes.len(), 3);
	}

	#[test]
	fn legend_lists_source_types_while_hidden() {
		let mut ex = explorer();
		ex.set_type_visible("person", false);
		assert_eq!(
			ex.available_types(),
			vec!["document", "organization", "person"]
		);
	}

	#[test]
	fn rules_narrow_visible_graph() {
		let mut ex = explorer();
		ex.set_rules(vec![QueryRule {
			id: "r1".into(),
			field: "label".into(),
			operator: Operator::Contains,
			value: "acme".into(),
		}]);
		assert_eq!(ex.visible().node_ids(), vec!["C"]);
	}

	#[test]
	fn install_graph_drops_stale_state() {
		let mut ex = explorer();
		ex.toggle_audit();
		ex.select_node("A");
		ex.set_conflicts(vec![Conflict {
			source_id: "A".into(),
			target_id: "B".into(),
			description: "dates disagree".into(),
			severity: None,
		}]);
		ex.install_graph(sample());
		assert_eq!(ex.selected_id(), None);
		assert!(ex.trail().is_none());
		assert_eq!(ex.conflict_count(), 0);
		// Mode and filters survive the refetch.
		assert_eq!(ex.mode(), Mode::Audit);
	}

	#[test]
	fn empty_conflict_result_is_valid() {
		let mut ex = explorer();
		ex.set_conflicts(Vec::new());
		assert_eq!(ex.conflict_count(), 0);
	}
}

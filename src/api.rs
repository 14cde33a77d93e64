//! Backend graph service client.
//!
//! Thin wrapper over the browser `fetch` API. Decoding and normalization are
//! pure functions over the response text so they can be tested off-browser;
//! only [`http`] touches `web-sys`. Every call fully replaces prior state on
//! success and leaves it untouched on failure.

use std::collections::HashMap;

use serde::Deserialize;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, Response};

use crate::graph::color;
use crate::graph::model::{Conflict, Edge, Graph, Node, PropValue};

/// Transport and decoding failures. Algorithms downstream never see these;
/// the page shell converts them into an error banner and keeps prior state.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
	#[error("network error: {0}")]
	Network(String),
	#[error("unexpected response: {0}")]
	Decode(String),
}

/// Fetch the full source graph from `GET /api/graph/data`.
pub async fn fetch_graph() -> Result<Graph, ApiError> {
	let text = http("GET", "/api/graph/data", None).await?;
	Ok(decode_graph(&text)?)
}

/// Ask the backend to reconstruct the graph via `POST /api/graph/rebuild`.
/// The response body carries no information beyond success.
pub async fn rebuild() -> Result<(), ApiError> {
	http("POST", "/api/graph/rebuild", None).await?;
	Ok(())
}

/// Run conflict analysis over the given node ids. An empty id list asks the
/// backend to analyze its default scope; an empty conflict list back is a
/// valid "nothing suspicious" outcome.
pub async fn analyze(node_ids: &[String]) -> Result<Vec<Conflict>, ApiError> {
	let body = serde_json::json!({ "node_ids": node_ids }).to_string();
	let text = http("POST", "/api/graph/analyze", Some(body)).await?;
	let report: ConflictReport =
		serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))?;
	Ok(report.conflicts)
}

/// Fetch the dossier for one node. The payload is rendered opaquely by the
/// dossier panel.
pub async fn fetch_dossier(node_id: &str) -> Result<Dossier, ApiError> {
	let encoded = String::from(js_sys::encode_uri_component(node_id));
	let text = http("GET", &format!("/api/graph/dossier/{encoded}"), None).await?;
	serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
}

async fn http(method: &str, url: &str, body: Option<String>) -> Result<String, ApiError> {
	let init = RequestInit::new();
	init.set_method(method);
	if let Some(body) = body {
		let headers = Headers::new().map_err(js_error)?;
		headers
			.set("Content-Type", "application/json")
			.map_err(js_error)?;
		init.set_headers(&headers);
		init.set_body(&JsValue::from_str(&body));
	}

	let request = Request::new_with_str_and_init(url, &init).map_err(js_error)?;
	let window = web_sys::window().ok_or_else(|| ApiError::Network("no window".into()))?;
	let response: Response = JsFuture::from(window.fetch_with_request(&request))
		.await
		.map_err(js_error)?
		.dyn_into()
		.map_err(|_| ApiError::Network("fetch returned a non-response".into()))?;

	if !response.ok() {
		return Err(ApiError::Network(format!(
			"{} {} -> {}",
			method,
			url,
			response.status()
		)));
	}

	let text = JsFuture::from(response.text().map_err(js_error)?)
		.await
		.map_err(js_error)?;
	text.as_string()
		.ok_or_else(|| ApiError::Decode("response body is not text".into()))
}

fn js_error(value: JsValue) -> ApiError {
	ApiError::Network(value.as_string().unwrap_or_else(|| format!("{value:?}")))
}

#[derive(Deserialize)]
struct RawGraph {
	nodes: Vec<RawNode>,
	links: Vec<RawLink>,
}

#[derive(Deserialize)]
struct RawNode {
	id: String,
	label: String,
	#[serde(rename = "type", default)]
	kind: Option<String>,
	#[serde(default)]
	properties: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Deserialize)]
struct RawLink {
	source: String,
	target: String,
	#[serde(default)]
	relation: String,
}

/// Decode and normalize a graph payload: types lowercased (missing ones
/// become `uncategorized`), null properties replaced with an empty map,
/// color and size assigned once, dangling edges dropped.
fn decode_graph(text: &str) -> Result<Graph, ApiError> {
	let raw: RawGraph = serde_json::from_str(text).map_err(|e| ApiError::Decode(e.to_string()))?;

	let nodes: Vec<Node> = raw
		.nodes
		.into_iter()
		.map(|n| {
			let kind = n
				.kind
				.filter(|k| !k.is_empty())
				.map(|k| k.to_lowercase())
				.unwrap_or_else(|| "uncategorized".to_string());
			let properties: HashMap<String, PropValue> = n
				.properties
				.unwrap_or_default()
				.iter()
				.map(|(k, v)| (k.clone(), PropValue::from(v)))
				.collect();
			Node {
				size: color::size_for(&kind),
				color: color::color_for(&kind),
				id: n.id,
				label: n.label,
				kind,
				properties,
			}
		})
		.collect();

	let ids: std::collections::HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
	let edges = raw
		.links
		.into_iter()
		.filter(|l| {
			let ok = ids.contains(l.source.as_str()) && ids.contains(l.target.as_str());
			if !ok {
				log::warn!("dropping edge with missing endpoint: {} -> {}", l.source, l.target);
			}
			ok
		})
		.map(|l| Edge {
			source: l.source,
			target: l.target,
			relation: l.relation,
		})
		.collect();

	Ok(Graph { nodes, edges })
}

#[derive(Deserialize)]
struct ConflictReport {
	#[serde(default)]
	conflicts: Vec<Conflict>,
	#[serde(default)]
	#[allow(dead_code)]
	node_ids_analyzed: Vec<String>,
}

/// Aggregated profile for one entity, fetched on demand for the side panel.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Dossier {
	/// Graph node this dossier belongs to.
	pub node_id: String,
	/// Display name of the entity.
	pub label: String,
	/// Entity category.
	#[serde(rename = "type")]
	pub kind: String,
	/// Backend-written abstract, when available.
	#[serde(default)]
	pub summary: Option<String>,
	/// Headline numbers.
	#[serde(default)]
	pub stats: DossierStats,
	/// Documents linked to the entity.
	#[serde(default)]
	pub related_documents: Vec<DocumentSummary>,
	/// Tasks and actions linked to the entity.
	#[serde(default)]
	pub related_actions: Vec<ActionItem>,
}

/// Headline numbers for a dossier.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct DossierStats {
	/// Count of documents mentioning the entity.
	#[serde(default)]
	pub total_documents: u32,
	/// Timestamp of the earliest interaction.
	#[serde(default)]
	pub first_interaction: Option<String>,
	/// Timestamp of the latest interaction.
	#[serde(default)]
	pub last_interaction: Option<String>,
	/// Sum of identified monetary amounts, if any.
	#[serde(default)]
	pub total_value: Option<f64>,
	/// Currency code for `total_value`.
	#[serde(default)]
	pub currency: String,
}

/// One document associated with a dossier entity.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct DocumentSummary {
	/// Document id.
	pub id: String,
	/// Original upload filename.
	pub filename: String,
	/// Upload timestamp.
	#[serde(default)]
	pub created_at: String,
	/// Classified document type, when extraction succeeded.
	#[serde(default)]
	pub doc_type: Option<String>,
	/// Processing status.
	#[serde(default)]
	pub status: String,
}

/// One open or completed action attached to a dossier entity.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ActionItem {
	/// Action id.
	pub id: i64,
	/// What needs doing.
	pub description: String,
	/// `pending` or `completed`.
	#[serde(default)]
	pub status: String,
	/// Creation timestamp.
	#[serde(default)]
	pub created_at: String,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn decode_normalizes_types_and_properties() {
		let text = r#"{
			"nodes": [
				{"id": "A", "label": "Invoice", "type": "Document", "properties": {"summary": "Q3 invoice", "priority": 4}},
				{"id": "B", "label": "Dana", "type": "PERSON", "properties": null},
				{"id": "C", "label": "Misc"}
			],
			"links": [
				{"id": 1, "source": "A", "target": "B", "relation": "MENTIONS"}
			]
		}"#;
		let graph = decode_graph(text).unwrap();
		assert_eq!(graph.nodes[0].kind, "document");
		assert_eq!(graph.nodes[0].size, 15.0);
		assert_eq!(
			graph.nodes[0].property_text("summary").as_deref(),
			Some("Q3 invoice")
		);
		assert_eq!(graph.nodes[0].property_text("priority").as_deref(), Some("4"));
		assert_eq!(graph.nodes[1].kind, "person");
		assert!(graph.nodes[1].properties.is_empty());
		assert_eq!(graph.nodes[2].kind, "uncategorized");
		assert_eq!(graph.edges.len(), 1);
		assert_eq!(graph.edges[0].relation, "MENTIONS");
	}

	#[test]
	fn decode_assigns_deterministic_colors() {
		let text = r#"{"nodes": [{"id": "A", "label": "x", "type": "person"}], "links": []}"#;
		let first = decode_graph(text).unwrap();
		let second = decode_graph(text).unwrap();
		assert_eq!(first.nodes[0].color, second.nodes[0].color);
		assert_eq!(first.nodes[0].color, crate::graph::color::color_for("person"));
	}

	#[test]
	fn decode_drops_dangling_edges() {
		let text = r#"{
			"nodes": [{"id": "A", "label": "x", "type": "document"}],
			"links": [
				{"source": "A", "target": "GONE", "relation": "MENTIONS"},
				{"source": "A", "target": "A", "relation": "SELF"}
			]
		}"#;
		let graph = decode_graph(text).unwrap();
		assert_eq!(graph.edges.len(), 1);
		assert_eq!(graph.edges[0].relation, "SELF");
	}

	#[test]
	fn decode_rejects_missing_sections() {
		assert!(matches!(
			decode_graph(r#"{"nodes": []}"#),
			Err(ApiError::Decode(_))
		));
		assert!(matches!(decode_graph("not json"), Err(ApiError::Decode(_))));
	}

	#[test]
	fn conflict_report_tolerates_missing_metadata() {
		let report: ConflictReport = serde_json::from_str(
			r#"{"conflicts": [{"source_id": "A", "target_id": "B", "description": "dates disagree", "severity": "high"}]}"#,
		)
		.unwrap();
		assert_eq!(report.conflicts.len(), 1);
		assert_eq!(report.conflicts[0].severity.as_deref(), Some("high"));
		assert!(report.node_ids_analyzed.is_empty());
	}

	#[test]
	fn dossier_defaults_optional_sections() {
		let dossier: Dossier = serde_json::from_str(
			r#"{"node_id": "B", "label": "Dana", "type": "person"}"#,
		)
		.unwrap();
		assert_eq!(dossier.kind, "person");
		assert_eq!(dossier.stats.total_documents, 0);
		assert!(dossier.related_documents.is_empty());
		assert!(dossier.related_actions.is_empty());
	}
}

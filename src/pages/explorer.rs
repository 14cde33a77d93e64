use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::{self, Dossier};
use crate::components::{DossierPanel, FocusRequest, GraphCanvas, GraphControls, QueryBuilder};
use crate::graph::explorer::{Command, Explorer, Mode};
use crate::graph::model::QueryRule;

/// Knowledge-graph explorer page. Owns the [`Explorer`] state machine plus
/// the async glue around it: graph fetch, rebuild, conflict analysis and
/// dossier loading. Every failure keeps the prior graph state and surfaces a
/// dismissible error banner.
#[component]
pub fn GraphExplorer() -> impl IntoView {
	let explorer = RwSignal::new(Explorer::default());
	let loading = RwSignal::new(true);
	let rebuilding = RwSignal::new(false);
	let analyzing = RwSignal::new(false);
	let error = RwSignal::new(Option::<String>::None);

	let dossier_open = RwSignal::new(false);
	let dossier_loading = RwSignal::new(false);
	let dossier_data = RwSignal::new(Option::<Dossier>::None);
	// Monotonic sequence for dossier requests: rapid re-selection means a
	// stale response may arrive after a newer request, so only the response
	// matching the latest sequence is applied (last-request-wins).
	let dossier_seq = StoredValue::new(0u64);

	let focus = RwSignal::new(Option::<FocusRequest>::None);
	let focus_seq = StoredValue::new(0u64);

	let visible = Memo::new(move |_| explorer.with(|ex| ex.visible()));
	let source = Memo::new(move |_| explorer.with(|ex| ex.source().clone()));
	let types = Memo::new(move |_| explorer.with(|ex| ex.available_types()));
	let hidden_types = Memo::new(move |_| explorer.with(|ex| ex.hidden_types().clone()));
	let audit_mode = Memo::new(move |_| explorer.with(|ex| ex.mode() == Mode::Audit));
	let trail = Memo::new(move |_| explorer.with(|ex| ex.trail().cloned()));
	let conflicts = Memo::new(move |_| explorer.with(|ex| ex.conflicts().to_vec()));
	let conflict_count = Memo::new(move |_| explorer.with(|ex| ex.conflict_count()));
	let selected = Memo::new(move |_| explorer.with(|ex| ex.selected_id().map(str::to_string)));

	let load_graph = move || {
		loading.set(true);
		spawn_local(async move {
			match api::fetch_graph().await {
				Ok(graph) => explorer.update(|ex| ex.install_graph(graph)),
				Err(e) => {
					log::error!("graph fetch failed: {e}");
					error.set(Some(format!("Failed to load graph: {e}")));
				}
			}
			loading.set(false);
		});
	};
	Effect::new(move |_| load_graph());

	let run_command = move |command: Command| match command {
		Command::OpenDossier(node_id) => {
			let seq = dossier_seq.get_value() + 1;
			dossier_seq.set_value(seq);
			dossier_open.set(true);
			dossier_loading.set(true);
			dossier_data.set(None);
			spawn_local(async move {
				let result = api::fetch_dossier(&node_id).await;
				if dossier_seq.get_value() != seq {
					// A newer request (or a close) superseded this one.
					return;
				}
				match result {
					Ok(dossier) => dossier_data.set(Some(dossier)),
					Err(e) => {
						log::error!("dossier fetch failed for {node_id}: {e}");
						error.set(Some(format!("Failed to load dossier: {e}")));
						dossier_data.set(None);
					}
				}
				dossier_loading.set(false);
			});
		}
		Command::Center(node_id) => {
			let seq = focus_seq.get_value() + 1;
			focus_seq.set_value(seq);
			focus.set(Some(FocusRequest { seq, node_id }));
		}
	};

	let close_dossier = move || {
		// Invalidate any in-flight dossier response as well.
		dossier_seq.set_value(dossier_seq.get_value() + 1);
		dossier_open.set(false);
		dossier_loading.set(false);
		dossier_data.set(None);
	};

	let on_node_click = Callback::new(move |id: String| {
		if let Some(Some(command)) = explorer.try_update(|ex| ex.select_node(&id)) {
			run_command(command);
		}
	});

	let on_background_click = Callback::new(move |_: ()| {
		explorer.update(|ex| ex.clear_selection());
	});

	let on_search = Callback::new(move |query: String| {
		let commands = explorer
			.try_update(|ex| ex.search(&query))
			.unwrap_or_default();
		for command in commands {
			run_command(command);
		}
	});

	let on_filter_change = Callback::new(move |(kind, show): (String, bool)| {
		explorer.update(|ex| ex.set_type_visible(&kind, show));
	});

	let on_toggle_audit = Callback::new(move |_: ()| {
		explorer.update(|ex| ex.toggle_audit());
	});

	let on_query_change = Callback::new(move |rules: Vec<QueryRule>| {
		explorer.update(|ex| ex.set_rules(rules));
	});

	let on_analyze = Callback::new(move |_: ()| {
		if analyzing.get_untracked() {
			return;
		}
		analyzing.set(true);
		let node_ids = explorer.with_untracked(|ex| ex.source().node_ids());
		spawn_local(async move {
			match api::analyze(&node_ids).await {
				Ok(conflicts) => {
					log::info!("conflict analysis returned {} conflicts", conflicts.len());
					explorer.update(|ex| ex.set_conflicts(conflicts));
				}
				Err(e) => {
					log::error!("conflict analysis failed: {e}");
					error.set(Some(format!("Conflict analysis failed: {e}")));
				}
			}
			analyzing.set(false);
		});
	});

	let on_rebuild = Callback::new(move |_: ()| {
		if rebuilding.get_untracked() {
			return;
		}
		rebuilding.set(true);
		spawn_local(async move {
			match api::rebuild().await {
				Ok(()) => match api::fetch_graph().await {
					Ok(graph) => explorer.update(|ex| ex.install_graph(graph)),
					Err(e) => {
						// Keep the previous graph rather than half-updating.
						log::error!("refetch after rebuild failed: {e}");
						error.set(Some(format!("Rebuild finished but reload failed: {e}")));
					}
				},
				Err(e) => {
					log::error!("rebuild failed: {e}");
					error.set(Some(format!("Rebuild failed: {e}")));
				}
			}
			rebuilding.set(false);
		});
	});

	let on_dossier_close = Callback::new(move |_: ()| close_dossier());

	view! {
		<section class="graph-explorer">
			<h1>"Mind Map"</h1>

			<GraphControls
				source=source
				types=types
				hidden_types=hidden_types
				audit_mode=audit_mode
				rebuilding=rebuilding
				analyzing=analyzing
				conflict_count=conflict_count
				on_search=on_search
				on_filter_change=on_filter_change
				on_toggle_audit=on_toggle_audit
				on_analyze=on_analyze
				on_rebuild=on_rebuild
			/>

			<QueryBuilder on_query_change=on_query_change />

			<Show when=move || error.get().is_some()>
				<div class="error-banner">
					<span>{move || error.get().unwrap_or_default()}</span>
					<button on:click=move |_| error.set(None)>"Dismiss"</button>
				</div>
			</Show>

			<div class="graph-surface">
				<Show
					when=move || !loading.get()
					fallback=|| view! { <p class="graph-loading">"Loading knowledge graph..."</p> }
				>
					<GraphCanvas
						data=visible
						trail=trail
						conflicts=conflicts
						selected=selected
						focus=focus
						on_node_click=on_node_click
						on_background_click=on_background_click
					/>
				</Show>
				<Show when=move || audit_mode.get()>
					<p class="graph-mode-hint">
						"Trace mode: click a node to highlight its full trail."
					</p>
				</Show>
			</div>

			<DossierPanel
				open=dossier_open
				loading=dossier_loading
				data=dossier_data
				on_close=on_dossier_close
			/>
		</section>
	}
}

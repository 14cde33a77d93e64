use std::collections::BTreeSet;

use leptos::prelude::*;

use crate::graph::color;
use crate::graph::model::Graph;

/// Search, type filters and the action row (trace, conflicts, rebuild).
///
/// Suggestions come from the source graph so hidden nodes stay findable;
/// committing a search goes through the page-level handler which applies the
/// current mode's selection semantics.
#[component]
pub fn GraphControls(
	#[prop(into)] source: Signal<Graph>,
	#[prop(into)] types: Signal<Vec<String>>,
	#[prop(into)] hidden_types: Signal<BTreeSet<String>>,
	#[prop(into)] audit_mode: Signal<bool>,
	#[prop(into)] rebuilding: Signal<bool>,
	#[prop(into)] analyzing: Signal<bool>,
	#[prop(into)] conflict_count: Signal<usize>,
	on_search: Callback<String>,
	on_filter_change: Callback<(String, bool)>,
	on_toggle_audit: Callback<()>,
	on_analyze: Callback<()>,
	on_rebuild: Callback<()>,
) -> impl IntoView {
	let query = RwSignal::new(String::new());
	let show_filters = RwSignal::new(false);

	// Up to five label-substring matches once the query has two characters.
	let suggestions = Memo::new(move |_| {
		let needle = query.get().trim().to_lowercase();
		if needle.len() < 2 {
			return Vec::new();
		}
		source
			.get()
			.nodes
			.iter()
			.filter(|n| n.label.to_lowercase().contains(&needle))
			.take(5)
			.map(|n| (n.label.clone(), n.kind.clone()))
			.collect::<Vec<_>>()
	});

	let commit_search = move |label: String| {
		query.set(label.clone());
		on_search.run(label);
	};

	view! {
		<div class="graph-controls">
			<div class="graph-controls-search">
				<input
					type="text"
					placeholder="Search entities, docs..."
					prop:value=move || query.get()
					on:input=move |ev| query.set(event_target_value(&ev))
					on:keydown=move |ev| {
						if ev.key() == "Enter" {
							commit_search(query.get_untracked());
						}
					}
				/>
				<Show when=move || !suggestions.get().is_empty()>
					<ul class="search-suggestions">
						{move || {
							suggestions
								.get()
								.into_iter()
								.map(|(label, kind)| {
									let commit_label = label.clone();
									view! {
										<li on:click=move |_| commit_search(commit_label.clone())>
											<span class="suggestion-label">{label.clone()}</span>
											<span class="suggestion-kind">{kind.clone()}</span>
										</li>
									}
								})
								.collect_view()
						}}
					</ul>
				</Show>
			</div>

			<div class="graph-controls-filters">
				<button on:click=move |_| show_filters.update(|v| *v = !*v)>"Filters"</button>
				<Show when=move || show_filters.get()>
					<div class="filter-list">
						{move || {
							types
								.get()
								.into_iter()
								.map(|kind| {
									let toggle_kind = kind.clone();
									let checked_kind = kind.clone();
									view! {
										<label class="filter-entry">
											<input
												type="checkbox"
												prop:checked=move || {
													!hidden_types.get().contains(&checked_kind)
												}
												on:change=move |ev| {
													on_filter_change
														.run((
															toggle_kind.clone(),
															event_target_checked(&ev),
														))
												}
											/>
											<span
												class="legend-swatch"
												style:background-color=color::color_for(&kind)
											></span>
											{kind.clone()}
										</label>
									}
								})
								.collect_view()
						}}
					</div>
				</Show>
			</div>

			<div class="graph-controls-actions">
				<button
					class=move || if audit_mode.get() { "active" } else { "" }
					on:click=move |_| on_toggle_audit.run(())
				>
					{move || if audit_mode.get() { "Exit Trace" } else { "Trace Trail" }}
				</button>
				<button
					prop:disabled=move || analyzing.get()
					on:click=move |_| on_analyze.run(())
				>
					{move || if analyzing.get() { "Analyzing..." } else { "Conflicts" }}
					<Show when=move || conflict_count.get() > 0>
						<span class="conflict-badge">{move || conflict_count.get()}</span>
					</Show>
				</button>
				<button
					title="Rebuild Graph"
					prop:disabled=move || rebuilding.get()
					on:click=move |_| on_rebuild.run(())
				>
					{move || if rebuilding.get() { "Rebuilding..." } else { "Rebuild" }}
				</button>
			</div>
		</div>
	}
}

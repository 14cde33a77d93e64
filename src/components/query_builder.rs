use leptos::prelude::*;

use crate::graph::model::{Operator, QueryRule};

const FIELDS: [(&str, &str); 3] = [
	("label", "Name / Label"),
	("type", "Type"),
	("summary", "Summary"),
];

/// Advanced filter editor: an ordered list of AND-combined rules. The full
/// rule list is pushed to the page on every edit; an empty list means no
/// additional filtering.
#[component]
pub fn QueryBuilder(on_query_change: Callback<Vec<QueryRule>>) -> impl IntoView {
	let rules = RwSignal::new(Vec::<QueryRule>::new());
	// Session-local counter; rule ids only need to be unique within the list.
	let next_id = RwSignal::new(0u64);

	let publish = move || on_query_change.run(rules.get_untracked());

	let add_rule = move |_| {
		let id = next_id.get_untracked();
		next_id.set(id + 1);
		rules.update(|list| {
			list.push(QueryRule {
				id: format!("rule-{id}"),
				field: "label".into(),
				operator: Operator::Contains,
				value: String::new(),
			});
		});
		publish();
	};

	let remove_rule = move |id: String| {
		rules.update(|list| list.retain(|r| r.id != id));
		publish();
	};

	let update_rule = move |id: String, apply: fn(&mut QueryRule, String), value: String| {
		rules.update(|list| {
			if let Some(rule) = list.iter_mut().find(|r| r.id == id) {
				apply(rule, value);
			}
		});
		publish();
	};

	view! {
		<div class="query-builder">
			<div class="query-builder-header">
				<h4>"Advanced Filters"</h4>
				<button on:click=add_rule>"Add Rule"</button>
			</div>

			<Show
				when=move || !rules.get().is_empty()
				fallback=|| {
					view! {
						<p class="query-builder-empty">
							"No active filters. Add a rule to refine results."
						</p>
					}
				}
			>
				<ul class="query-rules">
					{move || {
						rules
							.get()
							.into_iter()
							.enumerate()
							.map(|(idx, rule)| {
								let field_id = rule.id.clone();
								let op_id = rule.id.clone();
								let value_id = rule.id.clone();
								let remove_id = rule.id.clone();
								view! {
									<li class="query-rule">
										<Show when=move || idx > 0>
											<span class="query-rule-and">"AND"</span>
										</Show>
										<select
											prop:value=rule.field.clone()
											on:change=move |ev| update_rule(
												field_id.clone(),
												|r, v| r.field = v,
												event_target_value(&ev),
											)
										>
											{FIELDS
												.iter()
												.map(|(value, label)| {
													view! {
														<option value={*value}>{*label}</option>
													}
												})
												.collect_view()}
										</select>
										<select
											prop:value=rule.operator.id()
											on:change=move |ev| update_rule(
												op_id.clone(),
												|r, v| {
													if let Some(op) = Operator::from_id(&v) {
														r.operator = op;
													}
												},
												event_target_value(&ev),
											)
										>
											{Operator::ALL
												.into_iter()
												.map(|op| {
													view! {
														<option value={op.id()}>{op.label()}</option>
													}
												})
												.collect_view()}
										</select>
										<input
											type="text"
											placeholder="Value..."
											prop:value=rule.value.clone()
											on:input=move |ev| update_rule(
												value_id.clone(),
												|r, v| r.value = v,
												event_target_value(&ev),
											)
										/>
										<button
											class="query-rule-remove"
											on:click=move |_| remove_rule(remove_id.clone())
										>
											"X"
										</button>
									</li>
								}
							})
							.collect_view()
					}}
				</ul>
			</Show>
		</div>
	}
}

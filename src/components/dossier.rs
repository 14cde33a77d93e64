use leptos::prelude::*;

use crate::api::Dossier;

/// Slide-over entity profile, opened by selecting a node while browsing.
/// The payload is rendered as delivered; a failed fetch leaves the panel in
/// its empty state while the page shows the error banner.
#[component]
pub fn DossierPanel(
	#[prop(into)] open: Signal<bool>,
	#[prop(into)] loading: Signal<bool>,
	#[prop(into)] data: Signal<Option<Dossier>>,
	on_close: Callback<()>,
) -> impl IntoView {
	view! {
		<Show when=move || open.get()>
			<div class="dossier-backdrop" on:click=move |_| on_close.run(())></div>
			<aside class="dossier-panel">
				<Show
					when=move || !loading.get()
					fallback=|| view! { <p class="dossier-loading">"Loading dossier..."</p> }
				>
					{move || match data.get() {
						Some(dossier) => {
							view! {
								<div class="dossier-body">
									<header class="dossier-header">
										<div>
											<span class="dossier-kind">{dossier.kind.clone()}</span>
											<h2>{dossier.label.clone()}</h2>
										</div>
										<button on:click=move |_| on_close.run(())>"Close"</button>
									</header>

									{dossier
										.summary
										.clone()
										.map(|summary| {
											view! { <p class="dossier-summary">{summary}</p> }
										})}

									<section class="dossier-stats">
										<div class="dossier-stat">
											<span class="stat-title">"Documents"</span>
											<span class="stat-value">
												{dossier.stats.total_documents}
											</span>
										</div>
										{dossier
											.stats
											.total_value
											.filter(|v| *v > 0.0)
											.map(|value| {
												let currency = dossier.stats.currency.clone();
												view! {
													<div class="dossier-stat">
														<span class="stat-title">
															"Identified Value"
														</span>
														<span class="stat-value">
															{format!("{value:.2} {currency}")}
														</span>
													</div>
												}
											})}
										<div class="dossier-stat">
											<span class="stat-title">"First Interaction"</span>
											<span class="stat-value">
												{dossier
													.stats
													.first_interaction
													.clone()
													.unwrap_or_else(|| "N/A".into())}
											</span>
										</div>
										<div class="dossier-stat">
											<span class="stat-title">"Last Interaction"</span>
											<span class="stat-value">
												{dossier
													.stats
													.last_interaction
													.clone()
													.unwrap_or_else(|| "N/A".into())}
											</span>
										</div>
									</section>

									<section class="dossier-documents">
										<h3>"Associated Documents"</h3>
										<Show
											when={
												let count = dossier.related_documents.len();
												move || count > 0
											}
											fallback=|| {
												view! {
													<p class="dossier-empty">
														"No direct documents found."
													</p>
												}
											}
										>
											<ul>
												{dossier
													.related_documents
													.iter()
													.map(|doc| {
														view! {
															<li class="dossier-document">
																<span class="doc-name">
																	{doc.filename.clone()}
																</span>
																<span class="doc-date">
																	{doc.created_at.clone()}
																</span>
															</li>
														}
													})
													.collect_view()}
											</ul>
										</Show>
									</section>

									<Show when={
										let count = dossier.related_actions.len();
										move || count > 0
									}>
										<section class="dossier-actions">
											<h3>"Tasks & Actions"</h3>
											<ul>
												{dossier
													.related_actions
													.iter()
													.map(|action| {
														view! {
															<li class={format!(
																"dossier-action status-{}",
																action.status,
															)}>
																{action.description.clone()}
															</li>
														}
													})
													.collect_view()}
											</ul>
										</section>
									</Show>
								</div>
							}
								.into_any()
						}
						None => {
							view! {
								<p class="dossier-empty">"No dossier information available."</p>
							}
								.into_any()
						}
					}}
				</Show>
			</aside>
		</Show>
	}
}

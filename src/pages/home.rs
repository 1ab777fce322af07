use std::time::Duration;

use leptos::prelude::*;
use log::{error, info, warn};

use crate::components::inspector::Inspector;
use crate::components::plan_canvas::PlanCanvas;
use crate::components::toast::{ToastStack, Toasts};
use crate::components::toolbar::Toolbar;
use crate::config::EditorConfig;
use crate::persistence::{self, CURRENT_PLAN};
use crate::plan::PlanStore;

/// Restores the last edited plan from local storage.
fn open_store() -> PlanStore {
	let persistence = match persistence::browser() {
		Ok(p) => p,
		Err(e) => {
			warn!("Starting without storage: {}", e);
			return PlanStore::default();
		}
	};
	let config = EditorConfig::load(persistence.store());
	match persistence.load_intervention(CURRENT_PLAN) {
		Ok(Some(doc)) => {
			info!("Restored plan with {} nodes", doc.nodes.len());
			PlanStore::with_document(doc, config)
		}
		Ok(None) => PlanStore::new(config),
		Err(e) => {
			warn!("Discarding unreadable plan: {}", e);
			PlanStore::new(config)
		}
	}
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let store = RwSignal::new(open_store());
	let ttl = store.with_untracked(|s| s.config().toast_millis);
	let toasts = Toasts::new(Duration::from_millis(ttl));
	provide_context(toasts);

	// Autosave after every change.
	Effect::new(move |_| {
		store.with(|s| {
			let saved = persistence::browser()
				.and_then(|p| p.save_intervention(CURRENT_PLAN, s.document()));
			if let Err(e) = saved {
				error!("Autosave failed: {}", e);
			}
		});
	});

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<PlanCanvas store=store toasts=toasts />
				<div class="graph-overlay">
					<h1>"Intervention Planner"</h1>
					<p class="subtitle">
						"Double-click a node to add a child. Shift-click to select several. Drag the background to pan."
					</p>
					<Toolbar store=store toasts=toasts />
				</div>
				<Inspector store=store toasts=toasts />
				<ToastStack />
			</div>
		</ErrorBoundary>
	}
}

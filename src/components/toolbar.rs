use leptos::ev::MouseEvent;
use leptos::prelude::*;
use log::warn;

use super::actions::{self, Action};
use super::plan_canvas::kind_color;
use super::toast::Toasts;
use crate::persistence;
use crate::plan::{NodeKind, PlanStore, Template};

#[component]
pub fn Toolbar(store: RwSignal<PlanStore>, toasts: Toasts) -> impl IntoView {
	let run = move |action: Action| move |_: MouseEvent| actions::dispatch(store, toasts, action);
	let can_undo = move || store.with(|s| s.can_undo());
	let can_redo = move || store.with(|s| s.can_redo());

	let add_buttons = NodeKind::ALL
		.into_iter()
		.map(|kind| {
			let style = format!("border-left: 4px solid {}", kind_color(kind));
			view! {
				<button style=style on:click=run(Action::AddNode(kind))>
					{format!("+ {}", kind.title())}
				</button>
			}
		})
		.collect_view();

	view! {
		<div class="toolbar">
			<div class="toolbar-group">{add_buttons}</div>
			<div class="toolbar-group">
				<button on:click=run(Action::AddChild)>"+ Child"</button>
				<button on:click=run(Action::Connect)>"Connect"</button>
				<button on:click=run(Action::Delete)>"Delete"</button>
				<button on:click=run(Action::MoveUp)>"Move up"</button>
				<button on:click=run(Action::MoveDown)>"Move down"</button>
			</div>
			<div class="toolbar-group">
				<button on:click=run(Action::Copy)>"Copy"</button>
				<button on:click=run(Action::Cut)>"Cut"</button>
				<button on:click=run(Action::Paste)>"Paste"</button>
			</div>
			<div class="toolbar-group">
				<button on:click=run(Action::Undo) disabled=move || !can_undo()>"Undo"</button>
				<button on:click=run(Action::Redo) disabled=move || !can_redo()>"Redo"</button>
				<button on:click=run(Action::AutoLayout)>"Auto layout"</button>
			</div>
			<Templates store=store toasts=toasts />
		</div>
	}
}

#[component]
fn Templates(store: RwSignal<PlanStore>, toasts: Toasts) -> impl IntoView {
	let initial = persistence::browser()
		.and_then(|p| p.load_templates())
		.unwrap_or_else(|e| {
			warn!("Could not load templates: {}", e);
			Vec::new()
		});
	let templates = RwSignal::new(initial);
	let name = RwSignal::new(String::new());

	let save = move |_: MouseEvent| {
		let wanted = name.get_untracked();
		if wanted.trim().is_empty() {
			toasts.error("Template name is required");
			return;
		}
		let result = store
			.with_untracked(|s| s.selection_as_template(wanted.trim()))
			.and_then(|template| {
				persistence::browser()?.save_template(&template)?;
				Ok(template)
			});
		match result {
			Ok(template) => {
				templates.update(|all| {
					all.retain(|t| t.name != template.name);
					all.push(template);
				});
				name.set(String::new());
				toasts.info("Template saved");
			}
			Err(e) => toasts.error(e.to_string()),
		}
	};

	let insert = move |template: Template| {
		move |_: MouseEvent| {
			if let Some(Err(e)) = store.try_update(|s| s.insert_template(&template)) {
				toasts.error(e.to_string());
			}
		}
	};

	view! {
		<div class="toolbar-group">
			<input
				placeholder="Template name"
				prop:value=move || name.get()
				on:input=move |ev| name.set(event_target_value(&ev))
			/>
			<button on:click=save>"Save template"</button>
			{move || {
				templates
					.get()
					.into_iter()
					.map(|t| {
						let label = t.name.clone();
						view! { <button class="template" on:click=insert(t)>{label}</button> }
					})
					.collect_view()
			}}
		</div>
	}
}

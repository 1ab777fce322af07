use leptos::ev::MouseEvent;
use leptos::prelude::*;

use super::toast::Toasts;
use crate::plan::exercises;
use crate::plan::{NodeData, NodeKind, PlanStore};

#[derive(Clone, Copy, PartialEq)]
enum Field {
	Label,
	Date,
	Tags,
}

impl Field {
	fn read(self, data: &NodeData) -> String {
		match self {
			Field::Label => data.label.clone(),
			Field::Date => data.date.clone(),
			Field::Tags => data.tags.clone(),
		}
		.unwrap_or_default()
	}

	fn write(self, data: &mut NodeData, value: String) {
		let value = Some(value).filter(|v| !v.trim().is_empty());
		match self {
			Field::Label => data.label = value,
			Field::Date => data.date = value,
			Field::Tags => data.tags = value,
		}
	}
}

/// Side panel editing the selected node, or tagging several at once.
#[component]
pub fn Inspector(store: RwSignal<PlanStore>, toasts: Toasts) -> impl IntoView {
	let selected = Memo::new(move |_| store.with(|s| s.document().selected_node_ids()));

	let field_input = move |field: Field, label: &'static str| {
		let value = move || {
			store.with(|s| {
				let ids = selected.get();
				match ids.as_slice() {
					[id] => s.document().node(id).map(|n| field.read(&n.data)),
					_ => None,
				}
				.unwrap_or_default()
			})
		};
		let on_change = move |ev: leptos::ev::Event| {
			let text = event_target_value(&ev);
			let ids = selected.get_untracked();
			let result = store.try_update(|s| match ids.as_slice() {
				[id] => s.update_data(id, |d| field.write(d, text)).map(|_| ()),
				_ => s.bulk_update(&ids, |d| field.write(d, text.clone())).map(|_| ()),
			});
			if let Some(Err(e)) = result {
				toasts.error(e.to_string());
			}
		};
		view! {
			<label>
				{label}
				<input prop:value=value on:change=on_change />
			</label>
		}
	};

	let is_session = move || {
		store.with(|s| match selected.get().as_slice() {
			[id] => s
				.document()
				.node(id)
				.is_some_and(|n| n.kind == NodeKind::Session),
			_ => false,
		})
	};

	let add_container = move |_: MouseEvent| {
		let ids = selected.get_untracked();
		let [id] = ids.as_slice() else {
			return;
		};
		let result = store.try_update(|s| {
			s.update_data(id, |d| {
				exercises::add_container(d, "Exercises");
			})
		});
		if let Some(Err(e)) = result {
			toasts.error(e.to_string());
		}
	};

	let containers = move || {
		store.with(|s| match selected.get().as_slice() {
			[id] => s
				.document()
				.node(id)
				.map(|n| {
					n.data
						.exercises
						.iter()
						.map(|(key, c)| {
							format!("{} ({} exercises)", exercises::display_name(key), c.exercises.len())
						})
						.collect::<Vec<_>>()
				})
				.unwrap_or_default(),
			_ => Vec::new(),
		})
	};

	view! {
		<Show when=move || !selected.get().is_empty()>
			<aside class="inspector">
				<h2>
					{move || match selected.get().len() {
						1 => "Node".to_string(),
						n => format!("{} nodes", n),
					}}
				</h2>
				{field_input(Field::Label, "Label")}
				{field_input(Field::Date, "Date")}
				{field_input(Field::Tags, "Tags")}
				<Show when=is_session>
					<button on:click=add_container>"Add exercise group"</button>
					<ul>
						{move || containers().into_iter().map(|c| view! { <li>{c}</li> }).collect_view()}
					</ul>
				</Show>
			</aside>
		</Show>
	}
}

use std::time::Duration;

use leptos::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastLevel {
	Info,
	Error,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
	pub id: u64,
	pub level: ToastLevel,
	pub message: String,
}

/// Transient notifications, shared through context.
#[derive(Clone, Copy)]
pub struct Toasts {
	items: RwSignal<Vec<Toast>>,
	next_id: RwSignal<u64>,
	ttl: StoredValue<Duration>,
}

impl Toasts {
	pub fn new(ttl: Duration) -> Self {
		Self {
			items: RwSignal::new(Vec::new()),
			next_id: RwSignal::new(0),
			ttl: StoredValue::new(ttl),
		}
	}

	pub fn info(&self, message: impl Into<String>) {
		self.push(ToastLevel::Info, message.into());
	}

	pub fn error(&self, message: impl Into<String>) {
		self.push(ToastLevel::Error, message.into());
	}

	fn push(&self, level: ToastLevel, message: String) {
		let id = self.next_id.get_untracked();
		self.next_id.set(id + 1);
		self.items.update(|items| items.push(Toast { id, level, message }));

		let items = self.items;
		set_timeout(
			move || {
				items.try_update(|items| items.retain(|t| t.id != id));
			},
			self.ttl.get_value(),
		);
	}
}

#[component]
pub fn ToastStack() -> impl IntoView {
	let Some(toasts) = use_context::<Toasts>() else {
		return ().into_any();
	};

	view! {
		<div class="toast-stack">
			{move || {
				toasts
					.items
					.get()
					.into_iter()
					.map(|toast| {
						let class = match toast.level {
							ToastLevel::Info => "toast toast-info",
							ToastLevel::Error => "toast toast-error",
						};
						view! { <div class=class>{toast.message}</div> }
					})
					.collect_view()
			}}
		</div>
	}
	.into_any()
}

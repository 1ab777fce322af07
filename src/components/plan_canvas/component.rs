use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent, MouseEvent, WheelEvent, Window};

use super::render;
use super::state::CanvasState;
use crate::components::actions::{self, Action};
use crate::components::toast::Toasts;
use crate::persistence::{self, CURRENT_PLAN};
use crate::plan::PlanStore;

fn window_size(window: &Window) -> (f64, f64) {
	let size = |v: Result<JsValue, JsValue>, fallback| v.ok().and_then(|v| v.as_f64()).unwrap_or(fallback);
	(size(window.inner_width(), 800.0), size(window.inner_height(), 600.0))
}

/// Stores the viewport and selection of the current plan.
fn save_view(state: &CanvasState, store: RwSignal<PlanStore>) {
	let selected = store
		.try_with_untracked(|plan| plan.document().selected_node_ids())
		.unwrap_or_default();
	let saved = persistence::browser()
		.and_then(|p| p.save_editor_state(CURRENT_PLAN, &state.view_state(selected)));
	if let Err(e) = saved {
		log::warn!("Could not save view: {}", e);
	}
}

/// Applies the stored viewport and selection of the current plan, if any.
fn restore_view(state: &mut CanvasState, store: RwSignal<PlanStore>) {
	let saved = persistence::browser()
		.and_then(|p| p.load_editor_states())
		.map(|mut all| all.remove(CURRENT_PLAN));
	match saved {
		Ok(Some(saved)) => {
			state.restore_view(&saved);
			store.update(|plan| plan.select_nodes(&saved.selected));
		}
		Ok(None) => {}
		Err(e) => log::warn!("Ignoring stored view: {}", e),
	}
}

fn local_coords(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

#[component]
pub fn PlanCanvas(store: RwSignal<PlanStore>, toasts: Toasts) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Rc<RefCell<Option<CanvasState>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let key_cb: Rc<RefCell<Option<Closure<dyn FnMut(KeyboardEvent)>>>> = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init, key_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone(), key_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};
		let (w, h) = window_size(&window);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			log::error!("Canvas 2d context unavailable");
			return;
		};
		let mut initial = CanvasState::new(w, h);
		restore_view(&mut initial, store);
		*state_init.borrow_mut() = Some(initial);

		let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let Some(win) = web_sys::window() else {
				return;
			};
			let (nw, nh) = window_size(&win);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			if let Some(ref mut s) = *state_resize.borrow_mut() {
				s.resize(nw, nh);
			}
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		*key_cb_init.borrow_mut() = Some(Closure::new(move |ev: KeyboardEvent| {
			let typing = ev
				.target()
				.and_then(|t| t.dyn_into::<web_sys::Element>().ok())
				.is_some_and(|el| matches!(el.tag_name().as_str(), "INPUT" | "TEXTAREA"));
			if typing {
				return;
			}
			if let Some(action) = Action::from_key(&ev) {
				ev.prevent_default();
				actions::dispatch(store, toasts, action);
			}
		}));
		if let Some(ref cb) = *key_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("keydown", cb.as_ref().unchecked_ref());
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref s) = *state_anim.borrow() {
				store.try_with_untracked(|plan| render::render(s, plan.document(), &ctx));
			}
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = local_coords(canvas_ref, &ev) else {
			return;
		};
		let mut guard = state_md.borrow_mut();
		let Some(s) = guard.as_mut() else {
			return;
		};
		let (node, edge) = store
			.try_with_untracked(|plan| {
				let doc = plan.document();
				let node = s
					.node_at_position(doc, x, y)
					.and_then(|id| doc.node(&id).map(|n| (id, n.position, n.selected)));
				let edge = node.is_none().then(|| s.edge_at_position(doc, x, y)).flatten();
				(node, edge)
			})
			.unwrap_or_default();

		if let Some((id, position, selected)) = node {
			if ev.shift_key() {
				store.update(|plan| plan.toggle_selected(&id));
			} else if !selected {
				store.update(|plan| plan.select_only(&id));
			}
			s.begin_drag(id, x, y, position);
		} else if let Some(edge) = edge {
			store.update(|plan| plan.select_edge(&edge));
		} else {
			if !ev.shift_key() {
				store.update(|plan| plan.clear_selection());
			}
			s.pan.active = true;
			s.pan.start_x = x;
			s.pan.start_y = y;
			s.pan.transform_start_x = s.transform.x;
			s.pan.transform_start_y = s.transform.y;
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_coords(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			if s.drag.node.is_some() {
				s.drag_to(x, y);
			} else if s.pan.active {
				s.transform.x = s.pan.transform_start_x + (x - s.pan.start_x);
				s.transform.y = s.pan.transform_start_y + (y - s.pan.start_y);
			} else {
				let hovered = store
					.try_with_untracked(|plan| s.node_at_position(plan.document(), x, y))
					.flatten();
				s.hover = hovered;
			}
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		let moved = state_mu.borrow_mut().as_mut().and_then(|s| s.end_drag());
		if let Some(ref s) = *state_mu.borrow() {
			save_view(s, store);
		}
		if let Some((id, position)) = moved {
			let result = store.try_update(|plan| plan.move_node(&id, position));
			if let Some(Err(e)) = result {
				log::warn!("Move of {} rejected: {}", id, e);
				toasts.error(e.to_string());
			}
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.drag = Default::default();
			s.pan.active = false;
			s.hover = None;
		}
	};

	let state_dc = state.clone();
	let on_dblclick = move |ev: MouseEvent| {
		let Some((x, y)) = local_coords(canvas_ref, &ev) else {
			return;
		};
		let hit = state_dc.borrow().as_ref().and_then(|s| {
			store
				.try_with_untracked(|plan| s.node_at_position(plan.document(), x, y))
				.flatten()
		});
		if let Some(id) = hit {
			store.update(|plan| plan.select_only(&id));
			actions::dispatch(store, toasts, Action::AddChild);
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_coords(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.zoom_at(x, y, ev.delta_y() < 0.0);
			save_view(s, store);
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="plan-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:dblclick=on_dblclick
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}

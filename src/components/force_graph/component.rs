use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

use leptos::ev;
use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::render;
use super::state::{DRAG_THRESHOLD, ForceGraphState};
use crate::model::{ChangeEvent, Position};
use crate::session::{ConnectState, EditorSession, LivePositions};

const REBUILD_NONE: u8 = 0;
/// Refresh elements but keep simulated positions of surviving nodes.
const REBUILD_KEEP: u8 = 1;
/// Restart every node from its model position.
const REBUILD_RESET: u8 = 2;

/// Frames between two publications of the simulated positions.
const PUBLISH_EVERY: u32 = 10;

fn rebuild_kind(event: &ChangeEvent) -> u8 {
	match event {
		ChangeEvent::Moved(_) | ChangeEvent::Reset => REBUILD_RESET,
		_ => REBUILD_KEEP,
	}
}

fn canvas_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.filter(|(w, h)| *w > 0.0 && *h > 0.0)
		.unwrap_or((800.0, 600.0))
}

fn pointer(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get_untracked()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn publish(live: &LivePositions, state: &ForceGraphState) {
	if let Ok(mut positions) = live.lock() {
		*positions = state.model_positions();
	}
}

/// Canvas view of the session's map: runs the force simulation, draws the
/// elements and turns pointer input into session actions.
#[component]
pub fn ConceptCanvas() -> impl IntoView {
	let session = EditorSession::expect();
	let sim = session.config().simulation;
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Rc<RefCell<Option<ForceGraphState>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));

	let rebuild = Arc::new(AtomicU8::new(REBUILD_NONE));
	// set while the canvas itself writes positions back
	let suppress = Arc::new(AtomicBool::new(false));
	let stopped = Arc::new(AtomicBool::new(false));
	let live: LivePositions = Arc::new(Mutex::new(Vec::new()));
	let resize_handle: Arc<Mutex<Option<WindowListenerHandle>>> = Arc::new(Mutex::new(None));
	session.attach_live_positions(Some(live.clone()));

	let subscription = {
		let (rebuild, suppress) = (rebuild.clone(), suppress.clone());
		session.subscribe(move |event| {
			if !suppress.load(Ordering::Relaxed) {
				rebuild.fetch_max(rebuild_kind(event), Ordering::Relaxed);
			}
		})
	};

	{
		let (stopped, resize_handle) = (stopped.clone(), resize_handle.clone());
		on_cleanup(move || {
			stopped.store(true, Ordering::Relaxed);
			drop(subscription);
			if let Some(handle) = resize_handle.lock().ok().and_then(|mut h| h.take()) {
				handle.remove();
			}
			session.attach_live_positions(None);
			debug!("canvas detached");
		});
	}

	let (state_init, animate_init) = (state.clone(), animate.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = canvas_size(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = match canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into().ok())
		{
			Some(ctx) => ctx,
			None => {
				warn!("canvas has no 2d context");
				return;
			}
		};
		let initial = session.with_graph(|g| ForceGraphState::new(g, &sim, w, h));
		*state_init.borrow_mut() = initial;

		let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
		let handle = window_event_listener(ev::resize, move |_| {
			let (nw, nh) = canvas_size(&canvas_resize);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			if let Some(ref mut s) = *state_resize.borrow_mut() {
				s.resize(nw, nh);
			}
		});
		if let Ok(mut slot) = resize_handle.lock() {
			*slot = Some(handle);
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		let (rebuild, stopped, live) = (rebuild.clone(), stopped.clone(), live.clone());
		let mut frame = 0u32;
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if stopped.load(Ordering::Relaxed) {
				return;
			}
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				let kind = rebuild.swap(REBUILD_NONE, Ordering::Relaxed);
				if kind != REBUILD_NONE {
					session.with_graph(|g| s.sync(g, &sim, kind == REBUILD_KEEP));
					publish(&live, s);
				}

				s.animation_running = session.layout.get_untracked().is_animated();
				s.routing = session.routing.get_untracked();
				s.selected = session.selection.get_untracked();
				s.connect_source = match session.connect.get_untracked() {
					ConnectState::PickTarget(id) => Some(id),
					_ => None,
				};

				s.tick(0.016);
				render::render(s, &ctx);

				let editing = session.editing.with_untracked(|e| e.as_ref().map(|t| t.id.clone()));
				if let Some((x, y)) = editing.and_then(|id| s.screen_anchor(&id)) {
					session.follow_edit(x, y);
				}
				let hovered = s
					.hover_target()
					.and_then(|id| s.screen_anchor(&id).map(|(x, y)| (id, x, y)));
				session.hover_at(hovered);

				frame = frame.wrapping_add(1);
				if s.animation_running && frame % PUBLISH_EVERY == 0 {
					publish(&live, s);
				}
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				if let Some(win) = web_sys::window() {
					let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
				}
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};

		if let Some(ref mut s) = *state_md.borrow_mut() {
			if let Some(idx) = s.node_at_position(x, y) {
				s.drag.active = true;
				s.drag.moved = false;
				s.drag.node_idx = Some(idx);
				s.drag.start_x = x;
				s.drag.start_y = y;
				s.graph.visit_nodes(|node| {
					if node.index() == idx {
						s.drag.node_start_x = node.x();
						s.drag.node_start_y = node.y();
					}
				});
			} else {
				s.pan.active = true;
				s.pan.moved = false;
				s.pan.start_x = x;
				s.pan.start_y = y;
				s.pan.transform_start_x = s.transform.x;
				s.pan.transform_start_y = s.transform.y;
			}
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};

		if let Some(ref mut s) = *state_mm.borrow_mut() {
			// Update hover state when not dragging
			if !s.drag.active {
				let hovered = s.node_at_position(x, y);
				s.set_hover(hovered);
				s.hovered_edge = match hovered {
					None if !s.pan.active => s.edge_at_position(x, y),
					_ => None,
				};
			}

			if s.drag.active {
				let (sx, sy) = (x - s.drag.start_x, y - s.drag.start_y);
				if !s.drag.moved && sx.hypot(sy) < DRAG_THRESHOLD {
					return;
				}
				s.drag.moved = true;
				if let Some(idx) = s.drag.node_idx {
					let (dx, dy) = (sx / s.transform.k, sy / s.transform.k);
					let (nx, ny) = (
						s.drag.node_start_x + dx as f32,
						s.drag.node_start_y + dy as f32,
					);
					s.graph.visit_nodes_mut(|node| {
						if node.index() == idx {
							node.data.x = nx;
							node.data.y = ny;
							node.data.is_anchor = true;
						}
					});
				}
			} else if s.pan.active {
				let (dx, dy) = (x - s.pan.start_x, y - s.pan.start_y);
				if dx.hypot(dy) >= DRAG_THRESHOLD {
					s.pan.moved = true;
				}
				s.transform.x = s.pan.transform_start_x + dx;
				s.transform.y = s.pan.transform_start_y + dy;
			}
		}
	};

	let (state_mu, suppress_mu) = (state.clone(), suppress.clone());
	let on_mouseup = move |ev: MouseEvent| {
		let point = pointer(canvas_ref, &ev);
		// session calls go out after the borrow ends
		let mut clicked_node = None;
		let mut clicked_edge = None;
		let mut clicked_empty = false;
		let mut dropped = None;

		if let Some(ref mut s) = *state_mu.borrow_mut() {
			if s.drag.active {
				if let Some(idx) = s.drag.node_idx {
					if s.drag.moved {
						s.graph.visit_nodes_mut(|node| {
							if node.index() == idx {
								node.data.is_anchor = true;
							}
						});
						dropped = Some(s.model_positions());
					} else {
						clicked_node = s.node_id(idx);
					}
				}
			} else if s.pan.active && !s.pan.moved {
				match point.and_then(|(x, y)| s.edge_at_position(x, y)) {
					Some(id) => clicked_edge = Some(id),
					None => clicked_empty = true,
				}
			}
			s.drag.active = false;
			s.drag.moved = false;
			s.drag.node_idx = None;
			s.pan.active = false;
			s.pan.moved = false;
		}

		if let Some(positions) = dropped {
			suppress_mu.store(true, Ordering::Relaxed);
			session.mutate(|g| g.set_positions(positions));
			suppress_mu.store(false, Ordering::Relaxed);
		}
		if let Some(id) = clicked_node {
			session.node_clicked(id);
		} else if let Some(id) = clicked_edge {
			if session.connect.get_untracked() == ConnectState::Idle {
				session.select(Some(id));
			}
		} else if clicked_empty {
			session.select(None);
		}
	};

	let state_dc = state.clone();
	let on_dblclick = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		// the edit box opens over the node or the edge label, not the pointer
		let target = state_dc.borrow().as_ref().map(|s| {
			let id = s
				.node_at_position(x, y)
				.and_then(|idx| s.node_id(idx))
				.or_else(|| s.edge_at_position(x, y));
			let anchored = id.and_then(|id| s.screen_anchor(&id).map(|point| (id, point)));
			(anchored, s.screen_to_graph(x, y))
		});
		match target {
			Some((Some((id, (sx, sy))), _)) => session.begin_edit(&id, sx, sy),
			Some((None, (gx, gy))) => {
				session.add_node(Position::new(gx, gy));
			}
			None => {}
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.drag.active = false;
			s.drag.node_idx = None;
			s.pan.active = false;
			s.set_hover(None);
			s.hovered_edge = None;
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};

		if let Some(ref mut s) = *state_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			let new_k = (s.transform.k * factor).clamp(0.1, 10.0);
			let ratio = new_k / s.transform.k;
			s.transform.x = x - (x - s.transform.x) * ratio;
			s.transform.y = y - (y - s.transform.y) * ratio;
			s.transform.k = new_k;
		}
	};

	let cursor = move || match session.connect.get() {
		ConnectState::Idle => "display: block; cursor: grab;",
		_ => "display: block; cursor: crosshair;",
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="concept-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:dblclick=on_dblclick
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style=cursor
		/>
	}
}

use leptos::ev::KeyboardEvent;
use leptos::prelude::*;
use leptos_router::components::A;
use log::info;
use wasm_bindgen::JsCast;

use super::library::requested_map;
use crate::components::editor::{InfoBubble, LabelEditor, ProblemsPanel, StylePanel, Toolbar};
use crate::components::force_graph::ConceptCanvas;
use crate::config::EditorConfig;
use crate::session::{ConnectState, EditorSession};

/// Keystrokes aimed at a form field belong to that field.
fn typing_in_field(ev: &KeyboardEvent) -> bool {
	ev.target()
		.and_then(|t| t.dyn_into::<web_sys::Element>().ok())
		.map(|el| matches!(el.tag_name().as_str(), "INPUT" | "TEXTAREA" | "SELECT"))
		.unwrap_or(false)
}

/// Map named by the page's `#open=` fragment, if any.
fn map_from_location() -> Option<String> {
	let hash = web_sys::window()?.location().hash().ok()?;
	let decoded = js_sys::decode_uri_component(&hash).ok()?;
	requested_map(&String::from(decoded))
}

/// The editor page: one session shared by the canvas and its panels.
#[component]
pub fn EditorPage() -> impl IntoView {
	let config = EditorConfig::load();
	let session = EditorSession::provide(config);
	info!("editor session started");
	if let Some(name) = map_from_location() {
		session.load_map(&name);
	}

	let on_keydown = move |ev: KeyboardEvent| {
		if typing_in_field(&ev) {
			return;
		}
		let command = ev.ctrl_key() || ev.meta_key();
		match ev.key().as_str() {
			"Delete" | "Backspace" => {
				ev.prevent_default();
				session.delete_selected();
			}
			"Escape" => {
				session.connect.set(ConnectState::Idle);
				session.select(None);
			}
			"z" | "Z" if command && ev.shift_key() => session.redo(),
			"z" if command => session.undo(),
			"y" if command => session.redo(),
			_ => {}
		}
	};

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
			<div class="editor" tabindex="0" on:keydown=on_keydown>
				<header class="editor-header">
					<h1>
						"Concept Map Studio " <A href="/">"Library"</A>
					</h1>
					<Toolbar />
				</header>
				<main class="editor-main">
					<div class="canvas-wrap">
						<ConceptCanvas />
						<InfoBubble />
						<LabelEditor />
						<p class="hint">
							"Drag nodes to move. Scroll to zoom. Double-click to rename or add a node."
						</p>
					</div>
					<aside class="sidebar">
						<StylePanel />
						<ProblemsPanel />
					</aside>
				</main>
			</div>
		</ErrorBoundary>
	}
}

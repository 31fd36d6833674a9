use leptos::ev::KeyboardEvent;
use leptos::prelude::*;

use crate::session::EditorSession;

/// Inline text box over the canvas for renaming a node or edge.
///
/// Enter or leaving the box commits, Escape cancels.
#[component]
pub fn LabelEditor() -> impl IntoView {
	let session = EditorSession::expect();
	let input_ref = NodeRef::<leptos::html::Input>::new();
	let value = RwSignal::new(String::new());

	// the box follows its element while the view moves; only a new target resets it
	let opened = Memo::new(move |_| {
		session
			.editing
			.with(|e| e.as_ref().map(|t| (t.id.clone(), t.value.clone())))
	});
	Effect::new(move |_| {
		if let Some((_, initial)) = opened.get() {
			value.set(initial);
			if let Some(input) = input_ref.get() {
				let _ = input.focus();
				input.select();
			}
		}
	});

	let on_keydown = move |ev: KeyboardEvent| match ev.key().as_str() {
		"Enter" if !ev.shift_key() => {
			ev.prevent_default();
			session.commit_edit(&value.get_untracked());
		}
		"Escape" => {
			ev.prevent_default();
			session.cancel_edit();
		}
		_ => {}
	};

	let style = move || {
		session
			.editing
			.with(|e| {
				e.as_ref()
					.map(|t| format!("left: {}px; top: {}px;", t.x - 150.0, t.y - 18.0))
			})
			.unwrap_or_else(|| "display: none;".to_string())
	};

	view! {
		<div class="label-editor" style=style>
			<input
				node_ref=input_ref
				type="text"
				placeholder="Edit label"
				prop:value=move || value.get()
				on:input=move |ev| value.set(event_target_value(&ev))
				on:keydown=on_keydown
				on:blur=move |_| session.commit_edit(&value.get_untracked())
				on:mousedown=|ev| ev.stop_propagation()
				on:dblclick=|ev| ev.stop_propagation()
			/>
		</div>
	}
}

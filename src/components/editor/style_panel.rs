use leptos::prelude::*;
use serde_json::Value;

use crate::components::force_graph::{LineStyle, NodeShape};
use crate::model::{ElementKind, attr};
use crate::session::{EditorSession, style_keys};

/// Form value for an attribute: empty clears it, numeric keys store numbers.
fn attr_value(key: &str, raw: &str) -> Value {
	let raw = raw.trim();
	if raw.is_empty() {
		return Value::Null;
	}
	match key {
		attr::FONT_SIZE | attr::TEXT_MAX_WIDTH => raw
			.parse::<f64>()
			.ok()
			.and_then(serde_json::Number::from_f64)
			.map(Value::Number)
			.unwrap_or(Value::Null),
		_ => Value::String(raw.to_string()),
	}
}

fn choices(key: &str) -> Option<Vec<&'static str>> {
	match key {
		attr::SHAPE => Some(NodeShape::ALL.iter().map(|s| s.as_str()).collect()),
		attr::LINE_STYLE => Some(LineStyle::ALL.iter().map(|s| s.as_str()).collect()),
		_ => None,
	}
}

#[component]
fn AttrField(name: &'static str) -> impl IntoView {
	let session = EditorSession::expect();
	let key = name;
	let current = move || session.selected_attr(key).unwrap_or_default();
	let apply = move |raw: String| {
		if let Some(id) = session.selection.get_untracked() {
			session.set_style(&id, key, attr_value(key, &raw));
		}
	};

	let control = match (key, choices(key)) {
		(_, Some(options)) => view! {
			<select on:change=move |ev| apply(event_target_value(&ev))>
				<option value="" selected=move || current().is_empty()>"default"</option>
				{options
					.into_iter()
					.map(|opt| {
						view! {
							<option value=opt selected=move || current() == opt>
								{opt}
							</option>
						}
					})
					.collect_view()}
			</select>
		}
		.into_any(),
		(attr::FILL | attr::LINE_COLOR, None) => view! {
			<input
				type="color"
				prop:value=move || {
					let c = current();
					if c.starts_with('#') { c } else { "#1f77b4".to_string() }
				}
				on:change=move |ev| apply(event_target_value(&ev))
			/>
		}
		.into_any(),
		_ => view! {
			<input
				type="number"
				min="1"
				placeholder="auto"
				prop:value=current
				on:change=move |ev| apply(event_target_value(&ev))
			/>
		}
		.into_any(),
	};

	view! {
		<label class="field">
			<span>{key}</span>
			{control}
		</label>
	}
}

#[component]
pub fn StylePanel() -> impl IntoView {
	let session = EditorSession::expect();

	let fields = move || {
		session.selected_kind().map(|kind| {
			style_keys(kind)
				.iter()
				.map(|&key| view! { <AttrField name=key /> })
				.collect_view()
		})
	};
	let heading = move || match session.selected_kind() {
		Some(ElementKind::Node) => "Node",
		Some(ElementKind::Edge) => "Edge",
		None => "Style",
	};

	view! {
		<section class="panel style-panel">
			<h2>{heading}</h2>
			<Show
				when=move || session.selected_kind().is_some()
				fallback=|| view! { <p class="muted">"Select a node or edge to style it."</p> }
			>
				<label class="field">
					<span>"label"</span>
					<input
						type="text"
						prop:value=move || session.selected_label().unwrap_or_default()
						on:change=move |ev| {
							if let Some(id) = session.selection.get_untracked() {
								session.set_label(&id, event_target_value(&ev).trim());
							}
						}
					/>
				</label>
				{fields}
			</Show>
		</section>
	}
}

use leptos::ev::{Event, MouseEvent};
use leptos::prelude::*;
use log::info;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, HtmlCanvasElement, Url};

use crate::layout::{LayoutKind, Routing};
use crate::model::Position;
use crate::session::{ConnectState, EditorSession};

fn js_error(err: JsValue) -> String {
	err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

fn download(href: &str, filename: &str) -> Result<(), String> {
	let document = web_sys::window()
		.and_then(|w| w.document())
		.ok_or("no document")?;
	let anchor: HtmlAnchorElement = document
		.create_element("a")
		.map_err(js_error)?
		.dyn_into()
		.map_err(|_| "not an anchor".to_string())?;
	anchor.set_href(href);
	anchor.set_download(filename);
	anchor.click();
	Ok(())
}

fn download_json(json: &str, filename: &str) -> Result<(), String> {
	let parts = js_sys::Array::of1(&JsValue::from_str(json));
	let options = BlobPropertyBag::new();
	options.set_type("application/json");
	let blob = Blob::new_with_str_sequence_and_options(&parts, &options).map_err(js_error)?;
	let url = Url::create_object_url_with_blob(&blob).map_err(js_error)?;
	let result = download(&url, filename);
	let _ = Url::revoke_object_url(&url);
	result
}

fn download_png(filename: &str) -> Result<(), String> {
	let canvas: HtmlCanvasElement = web_sys::window()
		.and_then(|w| w.document())
		.and_then(|d| d.query_selector(".concept-canvas").ok().flatten())
		.and_then(|el| el.dyn_into().ok())
		.ok_or("no canvas to export")?;
	let data = canvas.to_data_url().map_err(js_error)?;
	download(&data, filename)
}

#[component]
pub fn Toolbar() -> impl IntoView {
	let session = EditorSession::expect();
	let names = RwSignal::new(session.saved_maps());
	let chosen = RwSignal::new(names.with_untracked(|n| n.first().cloned().unwrap_or_default()));
	let save_name = RwSignal::new(String::from("untitled"));
	let import_text = RwSignal::new(String::new());

	let refresh = move || {
		let list = session.saved_maps();
		if !list.contains(&chosen.get_untracked()) {
			chosen.set(list.first().cloned().unwrap_or_default());
		}
		names.set(list);
	};

	let save = move |_: MouseEvent| {
		let name = save_name.get_untracked();
		if session.save_map(&name) {
			refresh();
			chosen.set(name.trim().to_string());
		}
	};
	let load = move |_: MouseEvent| {
		let name = chosen.get_untracked();
		if !name.is_empty() {
			session.load_map(&name);
			save_name.set(name);
		}
	};
	let delete = move |_: MouseEvent| {
		let name = chosen.get_untracked();
		let confirmed = web_sys::window()
			.and_then(|w| w.confirm_with_message(&format!("Delete \"{name}\"?")).ok())
			.unwrap_or(false);
		if !name.is_empty() && confirmed {
			session.delete_map(&name);
			refresh();
		}
	};

	let export_json = move |_: MouseEvent| {
		if let Some(json) = session.export_json() {
			session.report("Export JSON", download_json(&json, "map.json"));
		}
	};
	let export_png = move |_: MouseEvent| {
		session.report("Export PNG", download_png("map.png"));
	};
	let import = move |_: MouseEvent| {
		session.import_json(&import_text.get_untracked());
		if session.notice.with_untracked(Option::is_none) {
			import_text.set(String::new());
			info!("imported map");
		}
	};

	let on_layout = move |ev: Event| {
		let value = event_target_value(&ev);
		if let Some(kind) = session.report("Layout", value.parse::<LayoutKind>()) {
			session.set_layout(kind);
		}
	};
	let on_routing = move |ev: Event| {
		let value = event_target_value(&ev);
		if let Some(routing) = session.report("Routing", value.parse::<Routing>()) {
			session.set_routing(routing);
		}
	};

	let connect_label = move || match session.connect.get() {
		ConnectState::Idle => "Connect",
		ConnectState::PickSource => "Pick source…",
		ConnectState::PickTarget(_) => "Pick target…",
	};

	view! {
		<div class="toolbar">
			<div class="group">
				<button on:click=move |_| {
					session.add_node(Position::default());
				}>"Add node"</button>
				<button
					class:active=move || session.connect.get() != ConnectState::Idle
					on:click=move |_| session.toggle_connect()
				>
					{connect_label}
				</button>
				<button
					disabled=move || session.selection.get().is_none()
					on:click=move |_| session.delete_selected()
				>
					"Delete"
				</button>
				<button disabled=move || !session.can_undo() on:click=move |_| session.undo()>
					"Undo"
				</button>
				<button disabled=move || !session.can_redo() on:click=move |_| session.redo()>
					"Redo"
				</button>
			</div>

			<div class="group">
				<label>
					"Layout "
					<select on:change=on_layout>
						{LayoutKind::ALL
							.into_iter()
							.map(|kind| {
								view! {
									<option
										value=kind.as_str()
										selected=move || session.layout.get() == kind
									>
										{kind.as_str()}
									</option>
								}
							})
							.collect_view()}
					</select>
				</label>
				<label>
					"Edges "
					<select on:change=on_routing>
						{Routing::ALL
							.into_iter()
							.map(|routing| {
								view! {
									<option
										value=routing.as_str()
										selected=move || session.routing.get() == routing
									>
										{routing.as_str()}
									</option>
								}
							})
							.collect_view()}
					</select>
				</label>
			</div>

			<div class="group">
				<input
					type="text"
					class="map-name"
					prop:value=move || save_name.get()
					on:input=move |ev| save_name.set(event_target_value(&ev))
				/>
				<button on:click=save>"Save"</button>
				<select
					prop:value=move || chosen.get()
					on:change=move |ev| chosen.set(event_target_value(&ev))
				>
					<For
						each=move || names.get()
						key=|name| name.clone()
						children=move |name| {
							let value = name.clone();
							view! { <option value=value>{name}</option> }
						}
					/>
				</select>
				<button disabled=move || names.with(Vec::is_empty) on:click=load>"Load"</button>
				<button disabled=move || names.with(Vec::is_empty) on:click=delete>"Delete"</button>
			</div>

			<div class="group">
				<button on:click=export_json>"Export JSON"</button>
				<button on:click=export_png>"Export PNG"</button>
				<details class="import">
					<summary>"Import"</summary>
					<textarea
						rows="6"
						placeholder="{ \"elements\": [...] }"
						prop:value=move || import_text.get()
						on:input=move |ev| import_text.set(event_target_value(&ev))
					/>
					<button
						disabled=move || import_text.with(|t| t.trim().is_empty())
						on:click=import
					>
						"Load JSON"
					</button>
				</details>
			</div>

			<Show when=move || session.notice.with(Option::is_some)>
				<p class="notice">{move || session.notice.get().unwrap_or_default()}</p>
			</Show>
		</div>
	}
}

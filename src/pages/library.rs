use leptos::prelude::*;
use leptos_router::components::A;
use log::info;

use crate::config::EditorConfig;
use crate::storage::{BrowserStore, Library, StorageResult};

/// Name asked for by an `#open=<name>` fragment, already percent-decoded.
pub fn requested_map(hash: &str) -> Option<String> {
	let name = hash.strip_prefix('#').unwrap_or(hash).strip_prefix("open=")?;
	(!name.trim().is_empty()).then(|| name.to_string())
}

fn open_href(name: &str) -> String {
	format!("/editor#open={}", String::from(js_sys::encode_uri_component(name)))
}

fn library() -> StorageResult<Library<BrowserStore>> {
	Ok(Library::new(BrowserStore::open()?, EditorConfig::load().storage_prefix))
}

/// Saved maps, each with Open and Delete.
#[component]
pub fn LibraryPage() -> impl IntoView {
	let error = RwSignal::new(None::<String>);
	let names = RwSignal::new(Vec::<String>::new());

	let refresh = move || match library().and_then(|lib| lib.list()) {
		Ok(list) => names.set(list),
		Err(err) => error.set(Some(err.to_string())),
	};
	refresh();

	let delete = move |name: String| {
		let confirmed = web_sys::window()
			.and_then(|w| w.confirm_with_message(&format!("Delete \"{name}\"?")).ok())
			.unwrap_or(false);
		if !confirmed {
			return;
		}
		match library().and_then(|mut lib| lib.delete(&name)) {
			Ok(()) => {
				info!("deleted map {name}");
				refresh();
			}
			Err(err) => error.set(Some(err.to_string())),
		}
	};

	view! {
		<div class="library">
			<h1>"Your maps"</h1>
			<p>
				<A href="/editor">"New map"</A>
			</p>
			{move || error.get().map(|e| view! { <p class="notice">{e}</p> })}
			<Show
				when=move || names.with(|n| !n.is_empty())
				fallback=|| view! { <p class="muted">"No saved maps."</p> }
			>
				<ul>
					<For
						each=move || names.get()
						key=|name| name.clone()
						children=move |name| {
							let href = open_href(&name);
							let target = name.clone();
							view! {
								<li>
									<span>{name}</span>
									<span class="actions">
										<A href=href>"Open"</A>
										<button on:click=move |_| delete(target.clone())>"Delete"</button>
									</span>
								</li>
							}
						}
					/>
				</ul>
			</Show>
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn open_fragment_names_a_map() {
		assert_eq!(requested_map("#open=physics notes").as_deref(), Some("physics notes"));
		assert_eq!(requested_map("open=a=b").as_deref(), Some("a=b"));
		assert_eq!(requested_map("#open="), None);
		assert_eq!(requested_map("#open=  "), None);
		assert_eq!(requested_map("#other=x"), None);
		assert_eq!(requested_map(""), None);
	}
}

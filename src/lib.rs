//! Browser concept map editor: a Leptos client-side app over a small graph
//! core with structural validation, one-click repairs and local persistence.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

// Modules
mod components;
mod pages;

pub mod config;
pub mod history;
pub mod layout;
pub mod model;
pub mod session;
pub mod storage;
pub mod validate;

// Top-Level pages
use crate::pages::editor::EditorPage;
use crate::pages::library::LibraryPage;
use crate::pages::not_found::NotFound;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// An app router: the map library at `/`, the editor at `/editor`, and a 404 page
#[component]
pub fn App() -> impl IntoView {
	// Provides context that manages stylesheets, titles, meta tags, etc.
	provide_meta_context();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />

		// sets the document title
		<Title text="Concept Map Studio" />

		// injects metadata in the <head> of the page
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=LibraryPage />
				<Route path=path!("/editor") view=EditorPage />
			</Routes>
		</Router>
	}
}

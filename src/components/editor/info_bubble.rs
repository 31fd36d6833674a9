use leptos::prelude::*;

use crate::session::EditorSession;

/// Headline and detail for the element under the pointer, drawn just below
/// and to the right of it.
#[component]
pub fn InfoBubble() -> impl IntoView {
	let session = EditorSession::expect();

	move || {
		session.hover.get().map(|info| {
			let style = format!("left: {}px; top: {}px;", info.x + 12.0, info.y + 12.0);
			view! {
				<div class="info-bubble" style=style>
					<div class="info-headline">{info.headline}</div>
					{info.detail.map(|d| view! { <div class="info-detail">{d}</div> })}
				</div>
			}
		})
	}
}

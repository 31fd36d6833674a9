use leptos::prelude::*;

use crate::session::EditorSession;
use crate::validate::{Problem, ProblemKind};

/// Row keys for the problem list. Ids are stable but need not be unique
/// (node ids may themselves contain `->`), so the position is part of the key.
fn keyed(problems: Vec<Problem>) -> Vec<((usize, String), Problem)> {
	problems
		.into_iter()
		.enumerate()
		.map(|(i, p)| ((i, p.id.clone()), p))
		.collect()
}

#[component]
pub fn ProblemsPanel() -> impl IntoView {
	let session = EditorSession::expect();
	let has = move |kind: ProblemKind| session.problems.with(|ps| ps.iter().any(|p| p.kind == kind));

	let row = move |problem: Problem| {
		// self-loop problems carry the offending edge id
		let target = (problem.kind == ProblemKind::SelfLoop).then(|| problem.id.clone());
		view! {
			<li
				class=format!("problem problem-{}", problem.severity)
				on:click=move |_| {
					if let Some(id) = target.clone() {
						session.select(Some(id));
					}
				}
			>
				<span class="problem-severity">{problem.severity.to_string()}</span>
				<span class="problem-kind">{problem.kind.as_str()}</span>
				<span class="problem-info">{problem.info.clone()}</span>
			</li>
		}
	};

	view! {
		<section class="panel problems-panel">
			<h2>"Problems"</h2>
			<Show
				when=move || session.problems.with(|ps| !ps.is_empty())
				fallback=|| view! { <p class="muted">"No problems found."</p> }
			>
				<ul class="problem-list">
					<For
						each=move || keyed(session.problems.get())
						key=|(key, _)| key.clone()
						children=move |(_, problem)| row(problem)
					/>
				</ul>
			</Show>
			<div class="repairs">
				<button
					disabled=move || !has(ProblemKind::Parallel)
					on:click=move |_| session.merge_parallel()
				>
					"Merge parallel edges"
				</button>
				<button
					disabled=move || !has(ProblemKind::Components)
					on:click=move |_| session.bridge_components()
				>
					"Bridge components"
				</button>
				<button
					disabled=move || !has(ProblemKind::SelfLoop)
					on:click=move |_| session.drop_self_loops()
				>
					"Drop self-loops"
				</button>
			</div>
		</section>
	}
}

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::{ConceptGraph, EdgeId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProblemKind {
	SelfLoop,
	Parallel,
	Components,
}

impl ProblemKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::SelfLoop => "selfloop",
			Self::Parallel => "parallel",
			Self::Components => "components",
		}
	}
}

impl fmt::Display for ProblemKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
	Error,
	Warn,
}

impl fmt::Display for Severity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Error => "error",
			Self::Warn => "warn",
		})
	}
}

/// A structural condition worth showing to the user.
///
/// `id` is derived from the offending elements only, so detection on an
/// unchanged graph yields the same keys every time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
	pub id: String,
	pub kind: ProblemKind,
	pub severity: Severity,
	pub info: String,
}

/// Edges grouped by ordered `(source, target)`, buckets in first-seen order.
pub fn parallel_buckets(graph: &ConceptGraph) -> IndexMap<(&str, &str), Vec<&EdgeId>> {
	let mut buckets: IndexMap<(&str, &str), Vec<&EdgeId>> = IndexMap::new();
	for edge in graph.edges() {
		buckets.entry(edge.pair_key()).or_default().push(&edge.id);
	}
	buckets
}

/// Scan the graph for self-loops, parallel edges and disconnected components.
pub fn detect(graph: &ConceptGraph) -> Vec<Problem> {
	let mut problems = Vec::new();

	for edge in graph.edges().filter(|e| e.is_self_loop()) {
		problems.push(Problem {
			id: edge.id.clone(),
			kind: ProblemKind::SelfLoop,
			severity: Severity::Error,
			info: format!("Self-loop on {}", edge.source),
		});
	}

	for ((source, target), ids) in parallel_buckets(graph) {
		if ids.len() > 1 {
			let key = format!("{source}->{target}");
			problems.push(Problem {
				id: format!("parallel:{key}"),
				kind: ProblemKind::Parallel,
				severity: Severity::Error,
				info: format!("Parallel edges {key} ({})", ids.len()),
			});
		}
	}

	let components = graph.components().len();
	if components > 1 {
		problems.push(Problem {
			id: format!("components:{components}"),
			kind: ProblemKind::Components,
			severity: Severity::Error,
			info: format!("Graph split into {components} components"),
		});
	}

	problems
}

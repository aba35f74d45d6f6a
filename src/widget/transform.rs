//! Reshapes the fetched document before it reaches the chart.

use crate::components::force_graph::GraphDocument;

/// `name` up to the first `separator`, or all of it.
pub fn strip_label_suffix<'a>(name: &'a str, separator: &str) -> &'a str {
	if separator.is_empty() {
		return name;
	}
	name.split_once(separator).map_or(name, |(head, _)| head)
}

/// Enlarge every node by `boost` and strip decorative suffixes from node names
/// and from both link endpoints, so links keep matching the names they pointed at.
pub fn prepare_document(mut document: GraphDocument, boost: f64, separator: &str) -> GraphDocument {
	for node in &mut document.nodes {
		node.symbol_size += boost;
		node.name = strip_label_suffix(&node.name, separator).to_string();
	}
	for link in &mut document.links {
		link.source = strip_label_suffix(&link.source, separator).to_string();
		link.target = strip_label_suffix(&link.target, separator).to_string();
	}
	document
}

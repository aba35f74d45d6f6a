use serde::{Deserialize, Deserializer, Serialize};

/// One page of the site.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
	/// Optional stable id; links may reference it instead of the name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	/// Display name, possibly carrying a decorative suffix.
	pub name: String,
	/// Navigation target (URL or path).
	#[serde(default)]
	pub value: String,
	/// Node diameter in pixels.
	#[serde(default)]
	pub symbol_size: f64,
	/// Index into [`GraphDocument::categories`].
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub category: Option<usize>,
}

/// A directed reference between two pages.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphLink {
	/// Id, name or index of the linking page.
	#[serde(deserialize_with = "endpoint")]
	pub source: String,
	/// Id, name or index of the linked page.
	#[serde(deserialize_with = "endpoint")]
	pub target: String,
}

/// A node category. Parsed but never surfaced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Category {
	/// Legend label.
	pub name: String,
}

/// The graph artifact as fetched from the site.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
	/// Pages.
	pub nodes: Vec<GraphNode>,
	/// References between pages.
	#[serde(default)]
	pub links: Vec<GraphLink>,
	/// Unused by the sidebar graph.
	#[serde(default)]
	pub categories: Vec<Category>,
}

impl GraphDocument {
	/// Parse the `graph.json` artifact.
	pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(text)
	}
}

// Link endpoints are strings in practice, but numeric indices are valid too.
fn endpoint<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Endpoint {
		Text(String),
		Index(u64),
	}

	Ok(match Endpoint::deserialize(deserializer)? {
		Endpoint::Text(s) => s,
		Endpoint::Index(i) => i.to_string(),
	})
}

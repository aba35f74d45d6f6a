mod chart;
mod color;
mod component;
mod options;
mod render;
mod state;
mod types;

pub use chart::ChartHandle;
pub use component::ForceGraphCanvas;
pub use options::{
	DarkMode, Emphasis, EmphasisLabel, Focus, GraphSeries, InitOptions, Label, LabelLayout,
	LabelPosition, Legend, LineColor, LineStyle, RenderOptions, Renderer, ScaleLimit, Tooltip,
};
pub use state::{ClickEvent, DataType, resolve_endpoint, unresolved_links};
pub use types::{Category, GraphDocument, GraphLink, GraphNode};

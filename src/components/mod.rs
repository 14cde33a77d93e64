mod controls;
mod dossier;
mod graph_canvas;
mod query_builder;

pub use controls::GraphControls;
pub use dossier::DossierPanel;
pub use graph_canvas::{FocusRequest, GraphCanvas};
pub use query_builder::QueryBuilder;

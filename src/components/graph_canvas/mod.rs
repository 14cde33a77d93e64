mod component;
mod render;
mod state;

pub use component::{FocusRequest, GraphCanvas};

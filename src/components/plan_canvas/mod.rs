mod component;
mod render;
mod state;

pub use component::PlanCanvas;
pub use render::kind_color;

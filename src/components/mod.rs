pub mod actions;
pub mod inspector;
pub mod plan_canvas;
pub mod toast;
pub mod toolbar;

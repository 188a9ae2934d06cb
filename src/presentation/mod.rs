// Presentation layer - HTTP surface for the visualization renderer
pub mod app_state;
pub mod handlers;

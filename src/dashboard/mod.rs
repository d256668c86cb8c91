//! Server-rendered dashboard page, split into markup, styling, and the
//! client refresh script.

mod css;
mod js;
pub mod render;

pub use render::render_page;

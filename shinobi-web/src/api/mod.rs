//! HTTP API handlers for shinobi-web

pub mod buildinfo;
pub mod characters;
pub mod health;
pub mod ui;

pub use buildinfo::get_build_info;
pub use characters::{get_character, list_characters};
pub use health::health_routes;
pub use ui::page_routes;

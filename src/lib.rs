pub mod config;
pub mod document;
pub mod error;
pub mod field;
pub mod field_display;
pub mod lists;
pub mod logging;
pub mod output;
pub mod registry;
pub mod render;
pub mod theme;

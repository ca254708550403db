pub mod api;
pub mod config;
pub mod content;
pub mod core;
pub mod error;
pub mod theme;

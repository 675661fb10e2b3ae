pub mod types;
pub mod nl;
pub mod tasks;
pub mod journal;
pub mod quiz;
pub mod config;
pub mod session;
pub mod ui;
pub mod line_editor;

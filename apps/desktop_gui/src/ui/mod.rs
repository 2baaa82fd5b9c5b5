//! UI layer for desktop GUI: app shell and row presentation.

pub mod app;
pub mod rows;

pub use app::{StartupConfig, TodoApp};

//! Match result rendering

pub mod formatter;

pub use formatter::{render_console, render_json, OutputFormat};

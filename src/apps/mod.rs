//! Read-only view of the per-process statistics table

pub mod reader;
pub mod types;

pub use reader::AppEntryReader;
pub use types::{AppEntry, AppFlags};

// NexusHealth - lib.rs
//
// Library entry point. The CLI in `main.rs` is a thin host over this
// surface; integration tests drive it directly.

pub mod app;
pub mod core;
pub mod platform;
pub mod util;

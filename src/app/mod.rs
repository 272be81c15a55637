// NexusHealth - app/mod.rs
//
// Application layer: stateful services, background managers and the shell
// that composes them.
// Dependencies: core and platform layers.

pub mod appearance_watch;
pub mod navigation;
pub mod restore;
pub mod session;
pub mod state;
pub mod theme;

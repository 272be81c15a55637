// NexusHealth - core/mod.rs
//
// Core business logic layer: data model, theme resolution, the access
// table and the navigation catalog.
// Must NOT depend on: app, platform, or any I/O.

pub mod access;
pub mod catalog;
pub mod model;
pub mod theme;

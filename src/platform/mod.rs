// NexusHealth - platform/mod.rs
//
// Platform abstraction layer: config and data directories, durable client
// storage, the auth API client and the OS appearance signal.
// Must NOT depend on: app.

pub mod api;
pub mod appearance;
pub mod config;
pub mod storage;

//! Relief coordination engine.
//!
//! This crate primarily ships a `coordinator` binary, but we expose a small
//! library surface to enable integration testing and reuse.

pub mod alerts;
pub mod api;
pub mod config;
pub mod dispatch;
pub mod geo;
pub mod seed;
pub mod state;
pub mod store;

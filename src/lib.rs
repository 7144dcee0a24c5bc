//! typesmash: a terminal typing-speed trainer with a falling-word arcade mode.
//!
//! Everything below `app` is render-free and driven by explicit instants, so
//! the binary, integration tests and benchmarks share one module tree.

pub mod app;
pub mod arcade;
pub mod bus;
pub mod config;
pub mod effects;
pub mod engine;
pub mod error;
pub mod event;
pub mod generator;
pub mod session;
pub mod store;
pub mod ui;

// Library root: re-exports all modules so integration tests and external
// consumers can access the crate's public API.

pub mod app;
pub mod config;
pub mod draw;
pub mod grouping;
pub mod protocol;
pub mod rng;
pub mod roster;
pub mod tui;

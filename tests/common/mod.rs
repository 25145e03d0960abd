//! Shared helpers for the router tests.

pub mod assertions;
pub mod client;
pub mod fixtures;

pub use assertions::*;
pub use client::*;
pub use fixtures::*;

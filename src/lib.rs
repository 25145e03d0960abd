//! # valet
//!
//! Valet parking service. Customers register vehicles and ask for a car to
//! be parked at a site; drivers pick up park and retrieve runs; managers
//! watch live dashboards.
//!
//! ## Layers
//!
//! - `domain`: records, lifecycles and rules, free of I/O
//! - `application`: commands, workflows, queries and storage ports
//! - `infrastructure`: configuration, Postgres and in-memory adapters
//! - `api`: axum handlers, routes and the JSON envelope

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;

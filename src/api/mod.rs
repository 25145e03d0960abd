//! HTTP API layer.
//!
//! - `dto`: request bodies and response envelopes
//! - `error`: the single error type every handler returns
//! - `handlers`: one function per route
//! - `routes`: the router and its middleware
//! - `server`: listener and graceful shutdown

pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use routes::create_router;
pub use server::Server;

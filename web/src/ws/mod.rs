//! WebSocket HTTP handler for the web layer.
//!
//! This module only adapts axum sockets to the `ws` crate. The registry, hub
//! and wire types live there so CRUD services can broadcast without depending
//! on the web layer.

pub(crate) mod handler;

//! API module for HTTP and WebSocket endpoints
//!
//! This module exposes the WebSocket transport the hub delivers through and
//! the operational HTTP endpoints.

pub mod http;
pub mod websocket;

pub use http::create_router;

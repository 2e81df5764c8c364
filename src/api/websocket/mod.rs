//! WebSocket transport for dashboard sessions
//!
//! Provides the endpoint at `/ws`. Each connection becomes one hub session.
//!
//! ## Frames
//! - Outbound: `{"event": <name>, "data": <payload>}`
//! - Inbound: JSON tagged by `type` (`join-dashboard`, `join`, `leave`,
//!   `request-update`, `ping`)

pub mod events;
pub mod handler;
pub mod state;
pub mod transport;

pub use state::AppState;
pub use transport::WsTransport;

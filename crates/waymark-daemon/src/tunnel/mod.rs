//! Tunnel provider supervision.
//!
//! Makes the local collector reachable from the public internet by spawning
//! external tunnel providers in priority order, scanning their output for
//! the assigned public URL, and publishing it for request handlers.

pub mod config;
pub mod error;
pub mod state;
pub mod supervisor;

pub use config::{Discovery, Provider, TunnelSettings};
pub use error::TunnelError;
pub use state::TunnelState;
pub use supervisor::TunnelSupervisor;

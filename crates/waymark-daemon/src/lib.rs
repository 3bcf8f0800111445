//! Waymark Daemon Library
//!
//! Core functionality for the Waymark collector daemon:
//! - In-memory storage for received location reports
//! - HTTP server for ingestion and the admin views
//! - Tunnel provider supervision for public reachability

pub mod server;
pub mod storage;
pub mod tunnel;

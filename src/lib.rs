//! Spacewar server library
//!
//! Authoritative simulation core for a multiplayer orbital-combat game:
//! fixed-rate physics under a central sun, collision resolution, and
//! WebSocket snapshot broadcasting.

pub mod app;
pub mod config;
pub mod game;
pub mod http;
pub mod util;
pub mod ws;

//! Game simulation modules

pub mod collision;
pub mod physics;
pub mod session;
pub mod snapshot;
pub mod vec2;
pub mod world;

pub use session::{GameSession, SessionCommand, SessionHandle};
pub use world::{AdmissionError, Bullet, PlayerId, Ship, Sun, World};

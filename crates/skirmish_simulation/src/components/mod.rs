//! ECS Components for game entities
//!
//! - actor: faction, life state, stealth marker
//!
//! AI state lives in `ai::Agent`; action state in `actions::ActionPlayer`.

pub mod actor;

// Re-exports for convenient imports
pub use actor::*;

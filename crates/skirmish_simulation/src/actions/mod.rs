//! Action layer: catalog, cooldowns and the per-agent Action Player.

pub mod catalog;
pub mod cooldown;
pub mod id;
pub mod player;
pub mod request;


pub use catalog::*;
pub use cooldown::*;
pub use id::*;
pub use player::*;
pub use request::*;

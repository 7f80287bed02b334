//! Domain layer: commands and events.

pub mod commands;
pub mod events;

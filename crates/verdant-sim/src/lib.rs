//! # Verdant Sim
//!
//! Garden simulation core for Verdant.
//!
//! This crate owns all simulation state and behavior:
//! - Species catalog (costs, growth durations, rewards, level gates)
//! - Garden plots with watering-gated, tick-based growth
//! - Player wallet and level progression
//! - Command facade with a guard-first error taxonomy
//! - Event bus for renderer/UI notifications
//! - Snapshot persistence with versioned binary envelopes
//!
//! Rendering, input capture, and scheduling are external collaborators: a
//! host drives [`GardenSim::tick`] at its own cadence, translates user input
//! into command calls, and drains [`events::EventBus`] to decide what to
//! redraw. The simulation is single-threaded and performs no internal
//! synchronization.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod economy;
pub mod events;
pub mod garden;
pub mod progression;
pub mod sim;
pub mod snapshot;
pub mod species;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::economy::*;
    pub use crate::events::*;
    pub use crate::garden::*;
    pub use crate::progression::*;
    pub use crate::sim::*;
    pub use crate::snapshot::*;
    pub use crate::species::*;
}

pub use prelude::*;

//! Deterministic simulation module
//!
//! All field logic lives here. This module must be pure and deterministic:
//! - One advance per tick, no wall-clock time
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod state;
pub mod tick;

pub use state::{ConfigError, FieldConfig, Orb, OrbField};
pub use tick::{FieldEvent, TickInput, tick};

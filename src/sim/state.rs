//! Field state and core simulation types
//!
//! Everything that changes over a run lives in [`Orb`]; the field owns the
//! orbs plus its immutable configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::tick::FieldEvent;
use crate::{consts, quantize_pos};

/// Invalid field configuration, rejected at construction.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("field needs at least one orb")]
    NoOrbs,
    #[error("orb radius must be positive, got {0}")]
    BadRadius(f32),
    #[error("speed increment must be positive, got {0}")]
    BadSpeed(f32),
    #[error("left edge {left} must be below right edge {right}")]
    BadEdges { left: f32, right: f32 },
    #[error("palette needs at least one color")]
    EmptyPalette,
    #[error("orb row ({row} wide) does not fit between the edges ({span} wide)")]
    RowTooWide { row: f32, span: f32 },
}

/// Immutable per-field configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub orb_count: usize,
    pub orb_radius: f32,
    /// Distance an orb drifts per tick
    pub speed_increment: f32,
    pub left_edge: f32,
    pub right_edge: f32,
    /// Ticks an orb stays halted after a hit
    pub wait_ticks: u32,
    /// Number of colors the orbs cycle through
    pub palette_len: usize,
}

impl Default for FieldConfig {
    fn default() -> Self {
        let row_span = consts::NUM_ORBS as f32 * 2.0 * consts::ORB_RADIUS;
        Self {
            orb_count: consts::NUM_ORBS,
            orb_radius: consts::ORB_RADIUS,
            speed_increment: consts::SPEED_INCREMENT,
            left_edge: -row_span / 2.0,
            right_edge: row_span / 2.0,
            wait_ticks: (row_span / consts::SPEED_INCREMENT).ceil() as u32,
            palette_len: consts::PALETTE.len(),
        }
    }
}

impl FieldConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.orb_count == 0 {
            return Err(ConfigError::NoOrbs);
        }
        if !(self.orb_radius > 0.0) {
            return Err(ConfigError::BadRadius(self.orb_radius));
        }
        if !(self.speed_increment > 0.0) {
            return Err(ConfigError::BadSpeed(self.speed_increment));
        }
        if !(self.left_edge < self.right_edge) {
            return Err(ConfigError::BadEdges {
                left: self.left_edge,
                right: self.right_edge,
            });
        }
        if self.palette_len == 0 {
            return Err(ConfigError::EmptyPalette);
        }
        let row = self.orb_count as f32 * 2.0 * self.orb_radius;
        let span = self.right_edge - self.left_edge;
        if row > span {
            return Err(ConfigError::RowTooWide { row, span });
        }
        Ok(())
    }
}

/// A single moving, colorable, stoppable orb.
///
/// Invariants maintained by [`Orb::advance`] and [`Orb::toggle_stop`]:
/// `wait_ticks > 0` implies `stopped`, and `!stopped` implies
/// `wait_ticks == 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct Orb {
    /// Horizontal position, the only simulated axis. The lift a halted orb
    /// gets toward the viewer is a rendering concern (see `scene`).
    pub position: f32,
    /// Index into the palette, wraps modulo palette size
    pub color_state: usize,
    pub stopped: bool,
    /// Halt countdown, positive only while stopped
    pub wait_ticks: u32,
}

impl Orb {
    pub fn new(position: f32, color_state: usize) -> Self {
        Self {
            position,
            color_state,
            stopped: false,
            wait_ticks: 0,
        }
    }

    /// Advance one tick: count down while halted, otherwise drift right and
    /// wrap at the edge.
    ///
    /// The decrement that empties the countdown resumes the orb within the
    /// same tick, so it also moves that tick. The wrap check runs after the
    /// move with a quarter-increment fuzz band, which keeps positions inside
    /// `[left_edge, right_edge)` without exact-edge float comparisons.
    pub fn advance(&mut self, speed_increment: f32, left_edge: f32, right_edge: f32) {
        if self.stopped {
            if self.wait_ticks > 1 {
                self.wait_ticks -= 1;
                return;
            }
            self.wait_ticks = 0;
            self.stopped = false;
        }
        self.position += speed_increment;
        if self.position >= right_edge - speed_increment / 4.0 {
            self.position = left_edge + speed_increment / 4.0;
        }
    }

    /// Flip between moving and halted. Halting arms the countdown; an early
    /// resume clears it.
    pub fn toggle_stop(&mut self, wait_duration: u32) {
        if self.stopped {
            self.stopped = false;
            self.wait_ticks = 0;
        } else {
            self.stopped = true;
            self.wait_ticks = wait_duration;
        }
    }

    pub fn set_state(&mut self, state: usize) {
        self.color_state = state;
    }

    /// True when both orbs sit on the same 2-decimal-quantized position.
    pub fn coincides_with(&self, other: &Orb) -> bool {
        quantize_pos(self.position) == quantize_pos(other.position)
    }
}

/// The fixed row of orbs plus its configuration.
#[derive(Debug, Clone)]
pub struct OrbField {
    /// Orbs in spawn order (initial left-to-right layout)
    pub orbs: Vec<Orb>,
    /// Tick counter, observability only
    pub ticks: u64,
    config: FieldConfig,
}

impl OrbField {
    /// Build a field with staggered initial positions and alternating
    /// initial color states.
    pub fn new(config: FieldConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let orbs = (0..config.orb_count)
            .map(|i| {
                let x = config.left_edge + config.orb_radius * (2 * i + 1) as f32;
                Orb::new(x, i % config.palette_len)
            })
            .collect();
        Ok(Self {
            orbs,
            ticks: 0,
            config,
        })
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Advance every orb, then cycle the color of every coincident orb.
    /// All advances complete before any coincidence check.
    pub fn tick(&mut self, events: &mut Vec<FieldEvent>) {
        let FieldConfig {
            speed_increment,
            left_edge,
            right_edge,
            ..
        } = self.config;
        for (index, orb) in self.orbs.iter_mut().enumerate() {
            let was_stopped = orb.stopped;
            orb.advance(speed_increment, left_edge, right_edge);
            if was_stopped && !orb.stopped {
                events.push(FieldEvent::OrbResumed { index });
            }
        }
        for index in self.coincident_orbs() {
            let state = self.cycle_color(index);
            events.push(FieldEvent::ColorCycled { index, state });
        }
        self.ticks += 1;
    }

    /// Every orb sharing a quantized position with some *other* halted orb.
    ///
    /// The halted set is checked against the full row, so a moving orb
    /// passing exactly through a halted orb's position qualifies too.
    pub fn coincident_orbs(&self) -> Vec<usize> {
        let halted: Vec<usize> = self
            .orbs
            .iter()
            .enumerate()
            .filter(|(_, o)| o.stopped)
            .map(|(i, _)| i)
            .collect();
        if halted.is_empty() {
            return Vec::new();
        }
        (0..self.orbs.len())
            .filter(|&i| {
                halted
                    .iter()
                    .any(|&h| h != i && self.orbs[h].coincides_with(&self.orbs[i]))
            })
            .collect()
    }

    /// Step the orb at `index` to the next palette color, returning the new
    /// state.
    pub fn cycle_color(&mut self, index: usize) -> usize {
        let state = (self.orbs[index].color_state + 1) % self.config.palette_len;
        self.orbs[index].set_state(state);
        state
    }

    /// Halt the orb at `index` if it is moving. Halted orbs are immune to
    /// further hits until they resume; returns whether the hit landed.
    pub fn hit(&mut self, index: usize) -> bool {
        let orb = &mut self.orbs[index];
        if orb.stopped {
            return false;
        }
        orb.toggle_stop(self.config.wait_ticks);
        true
    }
}

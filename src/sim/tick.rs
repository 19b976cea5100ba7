//! Per-frame tick
//!
//! Applies queued pointer hits, then advances the field. One tick per
//! display-refresh callback.

use super::state::OrbField;

/// Input for a single tick: orb indices picked from pointer/touch events
/// since the last frame. The shell clears the queue after each tick.
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub hits: Vec<usize>,
}

/// Things that happened during a tick. Observability only; the sim does not
/// consume these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldEvent {
    OrbHalted { index: usize },
    OrbResumed { index: usize },
    ColorCycled { index: usize, state: usize },
}

/// Advance the field by one tick.
///
/// Hits land before advancement, while their targets are still in last
/// tick's state. A hit on an orb whose countdown expires this same tick is
/// therefore discarded (halted orbs are immune) and the orb resumes.
pub fn tick(field: &mut OrbField, input: &TickInput, events: &mut Vec<FieldEvent>) {
    for &index in &input.hits {
        if index < field.orbs.len() && field.hit(index) {
            events.push(FieldEvent::OrbHalted { index });
        }
    }
    field.tick(events);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{FieldConfig, Orb, OrbField};
    use proptest::prelude::*;

    fn pair_config() -> FieldConfig {
        FieldConfig {
            orb_count: 2,
            orb_radius: 2.0,
            speed_increment: 0.15,
            left_edge: -20.0,
            right_edge: 20.0,
            wait_ticks: 5,
            palette_len: 2,
        }
    }

    fn hit_input(index: usize) -> TickInput {
        TickInput { hits: vec![index] }
    }

    #[test]
    fn test_hit_halts_and_emits() {
        let mut field = OrbField::new(pair_config()).unwrap();
        let mut events = Vec::new();
        tick(&mut field, &hit_input(1), &mut events);

        assert!(field.orbs[1].stopped);
        assert_eq!(field.orbs[1].wait_ticks, 5);
        assert_eq!(events, vec![FieldEvent::OrbHalted { index: 1 }]);
        // Orb 0 drifted, orb 1 did not
        assert!((field.orbs[0].position - (-18.0 + 0.15)).abs() < 1e-6);
        assert!((field.orbs[1].position - (-14.0)).abs() < 1e-6);
    }

    #[test]
    fn test_repeat_hits_are_idempotent() {
        let mut field = OrbField::new(pair_config()).unwrap();
        let mut events = Vec::new();
        tick(&mut field, &hit_input(0), &mut events);

        events.clear();
        tick(&mut field, &hit_input(0), &mut events);
        assert!(events.is_empty());
        assert_eq!(field.orbs[0].wait_ticks, 3);
    }

    #[test]
    fn test_resume_wins_over_same_tick_hit() {
        let mut field = OrbField::new(pair_config()).unwrap();
        let mut events = Vec::new();
        tick(&mut field, &hit_input(0), &mut events);

        // Run the countdown to its final tick, then hit again on the tick
        // the orb resumes: the hit must be discarded.
        for _ in 0..4 {
            tick(&mut field, &TickInput::default(), &mut events);
        }
        assert!(field.orbs[0].stopped);
        assert_eq!(field.orbs[0].wait_ticks, 1);

        events.clear();
        tick(&mut field, &hit_input(0), &mut events);
        assert!(!field.orbs[0].stopped);
        assert_eq!(events, vec![FieldEvent::OrbResumed { index: 0 }]);
    }

    #[test]
    fn test_coincident_pair_cycles_each_tick() {
        let mut field = OrbField::new(pair_config()).unwrap();
        field.orbs[0].position = 3.0;
        field.orbs[1].position = 3.0;

        let mut events = Vec::new();
        tick(&mut field, &TickInput { hits: vec![0, 1] }, &mut events);
        assert_eq!(
            events,
            vec![
                FieldEvent::OrbHalted { index: 0 },
                FieldEvent::OrbHalted { index: 1 },
                FieldEvent::ColorCycled { index: 0, state: 1 },
                FieldEvent::ColorCycled { index: 1, state: 0 },
            ]
        );

        // Still overlapped next tick: they cycle again
        events.clear();
        tick(&mut field, &TickInput::default(), &mut events);
        assert_eq!(
            events,
            vec![
                FieldEvent::ColorCycled { index: 0, state: 0 },
                FieldEvent::ColorCycled { index: 1, state: 1 },
            ]
        );
    }

    #[test]
    fn test_out_of_range_hit_is_ignored() {
        let mut field = OrbField::new(pair_config()).unwrap();
        let mut events = Vec::new();
        tick(&mut field, &hit_input(99), &mut events);
        assert!(events.is_empty());
    }

    proptest! {
        #[test]
        fn prop_positions_stay_in_bounds(
            speed in 0.01f32..1.0,
            ticks in 1usize..2_000,
            hit_at in 0usize..10,
        ) {
            let config = FieldConfig {
                speed_increment: speed,
                ..FieldConfig::default()
            };
            let mut field = OrbField::new(config).unwrap();
            let mut events = Vec::new();
            tick(&mut field, &hit_input(hit_at), &mut events);
            for _ in 0..ticks {
                tick(&mut field, &TickInput::default(), &mut events);
            }
            let cfg = field.config().clone();
            for orb in &field.orbs {
                prop_assert!(orb.position >= cfg.left_edge);
                prop_assert!(orb.position < cfg.right_edge);
            }
        }

        #[test]
        fn prop_coincidence_is_symmetric(a in -100.0f32..100.0, b in -100.0f32..100.0) {
            let x = Orb::new(a, 0);
            let y = Orb::new(b, 1);
            prop_assert_eq!(x.coincides_with(&y), y.coincides_with(&x));
        }
    }
}

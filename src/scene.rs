//! Maps simulation state to renderable sprites and pointer coordinates to
//! picked orbs.
//!
//! Keeps the sim free of any display knowledge: colors come from the
//! tuning palette here, and the toward-the-viewer lift of a halted orb is
//! computed here rather than stored on the orb.

use glam::Vec2;

use crate::sim::OrbField;
use crate::tuning::Tuning;

/// How much of the world is on screen. The view is centered on
/// `center` and shows `half_height` world units above and below it;
/// horizontal extent follows the aspect ratio.
#[derive(Debug, Clone, Copy)]
pub struct WorldView {
    pub center: Vec2,
    pub half_height: f32,
}

impl WorldView {
    /// Fit the full orb row (plus a margin) into a viewport with the given
    /// aspect ratio (width / height).
    pub fn fit_row(row_half_width: f32, aspect: f32) -> Self {
        let margin = 1.15;
        let half_width = row_half_width * margin;
        Self {
            center: Vec2::ZERO,
            half_height: half_width / aspect.max(0.1),
        }
    }

    pub fn half_width(&self, aspect: f32) -> f32 {
        self.half_height * aspect
    }

    /// Convert canvas pixels (origin top-left, y down) to world coordinates
    /// (origin at view center, y up).
    pub fn screen_to_world(&self, px: Vec2, resolution: Vec2) -> Vec2 {
        let aspect = resolution.x / resolution.y.max(1.0);
        let ndc_x = px.x / resolution.x * 2.0 - 1.0;
        let ndc_y = 1.0 - px.y / resolution.y * 2.0;
        self.center + Vec2::new(ndc_x * self.half_width(aspect), ndc_y * self.half_height)
    }
}

/// A positioned, colored, sphere-like primitive handed to the renderer.
#[derive(Debug, Clone, Copy)]
pub struct OrbSprite {
    pub center: Vec2,
    pub radius: f32,
    pub color: [f32; 3],
    /// 1.0 while the orb is halted; rendered as a pop toward the viewer
    pub lift: f32,
}

/// Build one sprite per orb, in spawn order.
pub fn orb_sprites(field: &OrbField, tuning: &Tuning) -> Vec<OrbSprite> {
    let radius = field.config().orb_radius;
    field
        .orbs
        .iter()
        .map(|orb| OrbSprite {
            center: Vec2::new(orb.position, 0.0),
            radius,
            color: tuning.color(orb.color_state),
            lift: if orb.stopped { 1.0 } else { 0.0 },
        })
        .collect()
}

/// The orb (if any) whose disc contains the world point. When overlapped
/// orbs both contain the point, the nearest center wins.
pub fn pick_orb(world: Vec2, field: &OrbField) -> Option<usize> {
    let radius = field.config().orb_radius;
    field
        .orbs
        .iter()
        .enumerate()
        .filter_map(|(i, orb)| {
            let d = world.distance(Vec2::new(orb.position, 0.0));
            (d <= radius).then_some((i, d))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{FieldConfig, OrbField};
    use crate::tuning::Tuning;

    #[test]
    fn test_screen_to_world_center_and_corners() {
        let view = WorldView {
            center: Vec2::ZERO,
            half_height: 10.0,
        };
        let res = Vec2::new(800.0, 400.0);

        let center = view.screen_to_world(Vec2::new(400.0, 200.0), res);
        assert!(center.abs_diff_eq(Vec2::ZERO, 1e-5));

        // Top-left pixel maps to (-half_width, +half_height)
        let tl = view.screen_to_world(Vec2::ZERO, res);
        assert!(tl.abs_diff_eq(Vec2::new(-20.0, 10.0), 1e-5));
    }

    #[test]
    fn test_fit_row_covers_the_row() {
        let view = WorldView::fit_row(20.0, 2.0);
        assert!(view.half_width(2.0) >= 20.0);
    }

    #[test]
    fn test_pick_orb_hits_and_misses() {
        let field = OrbField::new(FieldConfig::default()).unwrap();
        // Orb 0 sits at -18 with radius 2
        assert_eq!(pick_orb(Vec2::new(-18.0, 0.5), &field), Some(0));
        assert_eq!(pick_orb(Vec2::new(-16.5, 0.0), &field), Some(0));
        // Dead space above the row
        assert_eq!(pick_orb(Vec2::new(-18.0, 5.0), &field), None);
    }

    #[test]
    fn test_sprites_track_halt_and_palette() {
        let tuning = Tuning::default();
        let mut field = OrbField::new(tuning.field_config()).unwrap();
        field.hit(3);

        let sprites = orb_sprites(&field, &tuning);
        assert_eq!(sprites.len(), 10);
        assert_eq!(sprites[3].lift, 1.0);
        assert_eq!(sprites[2].lift, 0.0);
        assert_eq!(sprites[0].color, tuning.color(0));
        assert_eq!(sprites[1].color, tuning.color(1));
    }
}

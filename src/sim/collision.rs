//! Circle overlap tests
//!
//! Every entity is a circle. Hit thresholds are the summed radii scaled by
//! `HITBOX_SCALE` so sprites may visually overlap before they connect.

use glam::Vec2;

use crate::consts::HITBOX_SCALE;

/// Distance below which two circles of the given radii are touching
#[inline]
pub fn hit_threshold(radius_a: f32, radius_b: f32) -> f32 {
    (radius_a + radius_b) * HITBOX_SCALE
}

/// Whether two circles overlap (strictly closer than the hit threshold)
#[inline]
pub fn circles_overlap(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> bool {
    a.distance(b) < hit_threshold(radius_a, radius_b)
}

/// Whether a point lies outside the field expanded by `margin` on every side
#[inline]
pub fn outside_field(pos: Vec2, field: Vec2, margin: f32) -> bool {
    pos.x < -margin || pos.x > field.x + margin || pos.y < -margin || pos.y > field.y + margin
}

/// Clamp a circle's centre so it stays fully inside the field
#[inline]
pub fn clamp_to_field(pos: Vec2, radius: f32, field: Vec2) -> Vec2 {
    Vec2::new(
        pos.x.clamp(radius, (field.x - radius).max(radius)),
        pos.y.clamp(radius, (field.y - radius).max(radius)),
    )
}

/// Nearest candidate to `from` (first wins on ties)
pub fn nearest<I>(from: Vec2, candidates: I) -> Option<usize>
where
    I: IntoIterator<Item = (usize, Vec2)>,
{
    let mut best: Option<(usize, f32)> = None;
    for (index, pos) in candidates {
        let dist = from.distance_squared(pos);
        if best.is_none_or(|(_, d)| dist < d) {
            best = Some((index, dist));
        }
    }
    best.map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hitbox_scaled_overlap() {
        // (48 + 48) * 0.35 = 33.6
        assert!(circles_overlap(Vec2::ZERO, 48.0, Vec2::new(33.0, 0.0), 48.0));
        assert!(!circles_overlap(Vec2::ZERO, 48.0, Vec2::new(34.0, 0.0), 48.0));
    }

    #[test]
    fn test_outside_field_margin() {
        let field = Vec2::new(100.0, 100.0);
        assert!(!outside_field(Vec2::new(-50.0, 50.0), field, 100.0));
        assert!(outside_field(Vec2::new(-101.0, 50.0), field, 100.0));
        assert!(outside_field(Vec2::new(50.0, 201.0), field, 100.0));
    }

    #[test]
    fn test_clamp_to_field() {
        let field = Vec2::new(200.0, 100.0);
        let p = clamp_to_field(Vec2::new(-10.0, 500.0), 10.0, field);
        assert_eq!(p, Vec2::new(10.0, 90.0));
    }

    #[test]
    fn test_nearest_prefers_first_on_tie() {
        let pts = vec![
            (4, Vec2::new(5.0, 0.0)),
            (7, Vec2::new(-5.0, 0.0)),
            (9, Vec2::new(9.0, 0.0)),
        ];
        assert_eq!(nearest(Vec2::ZERO, pts), Some(4));
        assert_eq!(nearest(Vec2::ZERO, Vec::new()), None);
    }
}

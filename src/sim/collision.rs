//! Collision detection between circular bodies
//!
//! Every moving entity is treated as a circle. Pairwise checks are plain
//! distance comparisons; area effects compare squared distances.

use glam::Vec2;

/// Anything with a center and a collision radius
pub trait Body {
    fn center(&self) -> Vec2;
    fn radius(&self) -> f32;
}

/// Check whether two circles overlap (touching does not count)
#[inline]
pub fn circles_overlap(a: Vec2, a_radius: f32, b: Vec2, b_radius: f32) -> bool {
    a.distance(b) < a_radius + b_radius
}

/// Distance-based collision between two bodies. Symmetric in its arguments.
#[inline]
pub fn collides<A: Body + ?Sized, B: Body + ?Sized>(a: &A, b: &B) -> bool {
    circles_overlap(a.center(), a.radius(), b.center(), b.radius())
}

/// Check whether a point lies inside a blast of the given radius (boundary included)
#[inline]
pub fn within_blast(point: Vec2, center: Vec2, radius: f32) -> bool {
    point.distance_squared(center) <= radius * radius
}

/// Move a body that drifted past `margin` beyond an edge back in from the opposite side
///
/// Bodies between the edge and the margin are left alone so they can slide off
/// screen smoothly before re-entering.
pub fn reenter_past_margin(pos: Vec2, radius: f32, width: f32, height: f32) -> Vec2 {
    let margin = radius * 2.0;
    let mut out = pos;

    if pos.x < -margin {
        out.x = width + radius;
    } else if pos.x > width + margin {
        out.x = -radius;
    }

    if pos.y < -margin {
        out.y = height + radius;
    } else if pos.y > height + margin {
        out.y = -radius;
    }

    out
}

//! Collision detection and response
//!
//! Three contacts drive every scenario: a ball against the screen border, a
//! ball contained by a ring, and ball against ball. Each resolves the contact
//! in place (velocity response plus position correction) and reports whether
//! anything was hit so the caller can queue an event.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::ball::Ball;
use super::ring::Ring;
use crate::consts::*;
use crate::{decay_toward_zero, normalize_or, reflect};

/// How the other ball takes part in a ball-ball contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Contact {
    /// Both balls exchange momentum and separate
    #[default]
    Mutual,
    /// The other ball is immovable; only the caller responds
    Static,
}

impl Ball {
    /// Bounce off the rectangle `[0, width] x [0, height]`
    ///
    /// Returns true if either axis bounced. The bounce counter advances once
    /// per call regardless of how many axes were hit.
    pub fn check_collision_with_border(&mut self, width: f64, height: f64) -> bool {
        if self.efficiency < 1.0 && self.resting_on_floor(height) {
            // One frame of gravity into the floor: clamp, don't bounce
            self.vel.y = 0.0;
        }
        let incoming_y = self.vel.y;
        let (x_hit, x) = bounce_axis(self.pos.x, &mut self.vel.x, self.radius, width, self.efficiency);
        let (y_hit, y) = bounce_axis(self.pos.y, &mut self.vel.y, self.radius, height, self.efficiency);
        self.pos = DVec2::new(x, y);

        if self.efficiency < 1.0 {
            if x_hit {
                self.vel.x = settle_after_bounce(self.vel.x, self.friction, BORDER_REST_SPEED);
            }
            if y_hit {
                self.vel.y = settle_after_bounce(self.vel.y, self.friction, BORDER_REST_SPEED);
                // Frame stepping gains up to two frames of gravity per flight
                let falling = self.gravity * incoming_y > 0.0;
                if falling && (1.0 - self.efficiency) * incoming_y.abs() <= GRAVITY_REST_FRAMES * self.gravity {
                    self.vel.y = 0.0;
                }
            }
        }

        let hit = x_hit || y_hit;
        if hit {
            self.bounces += 1;
        }
        hit
    }

    /// Pressed against the wall gravity points at, moving no faster than a
    /// single frame of gravity
    fn resting_on_floor(&self, height: f64) -> bool {
        if self.gravity == 0.0 || self.gravity * self.vel.y < 0.0 || self.vel.y.abs() > self.gravity.abs() {
            return false;
        }
        if self.gravity > 0.0 {
            self.pos.y + self.radius >= height
        } else {
            self.pos.y - self.radius <= 0.0
        }
    }

    /// Keep the ball inside `ring`, reflecting off its inner edge
    ///
    /// Rest threshold is `friction * RING_REST_FACTOR`, not the border's 1.0.
    pub fn check_collision_with_ring(&mut self, ring: &Ring) -> bool {
        let offset = self.pos - ring.center;
        let dist = offset.length();

        if dist + self.radius <= ring.radius() {
            return false;
        }

        // Outward normal; undefined at the exact center
        let normal = normalize_or(offset, DVec2::X);

        // Efficiency scales only the reflected part
        self.vel += (reflect(self.vel, normal) - self.vel) * self.efficiency;

        let overlap = dist + self.radius - ring.radius();
        self.pos -= normal * overlap;
        self.bounces += 1;

        if self.efficiency < 1.0 {
            let rest = self.friction * RING_REST_FACTOR;
            self.vel.x = settle_after_bounce(self.vel.x, self.friction, rest);
            self.vel.y = settle_after_bounce(self.vel.y, self.friction, rest);
        }

        true
    }

    /// Elastic collision with another ball, mass taken from circle area
    ///
    /// The caller's efficiency scales both normal components. Both bounce
    /// counters advance, even for a `Contact::Static` partner.
    pub fn check_collision_with_ball(&mut self, other: &mut Ball, contact: Contact) -> bool {
        let delta = other.pos - self.pos;
        let reach = self.radius + other.radius;
        if delta.length_squared() >= reach * reach {
            return false;
        }

        let mut dist = delta.length();
        if dist == 0.0 {
            dist = COINCIDENT_EPSILON;
        }
        let normal = normalize_or(delta, DVec2::X);
        let tangent = normal.perp();

        let tan1 = self.vel.dot(tangent);
        let tan2 = other.vel.dot(tangent);
        let norm1 = self.vel.dot(normal);
        let norm2 = other.vel.dot(normal);

        let m1 = self.mass();
        let m2 = other.mass();
        let total = m1 + m2;

        let new_norm1 = (norm1 * (m1 - m2) + 2.0 * m2 * norm2) / total * self.efficiency;
        let new_norm2 = (norm2 * (m2 - m1) + 2.0 * m1 * norm1) / total * self.efficiency;

        self.vel = tangent * tan1 + normal * new_norm1;

        let penetration = reach - dist + SEPARATION_MARGIN;
        match contact {
            Contact::Mutual => {
                other.vel = tangent * tan2 + normal * new_norm2;
                self.pos -= normal * (penetration * 0.5);
                other.pos += normal * (penetration * 0.5);
            }
            Contact::Static => {
                self.pos -= normal * penetration;
            }
        }

        self.bounces += 1;
        other.bounces += 1;
        true
    }
}

/// Clamp one axis into `[radius, limit - radius]`, reflecting its velocity
///
/// An axis at rest is clamped silently without counting as a bounce.
fn bounce_axis(pos: f64, vel: &mut f64, radius: f64, limit: f64, efficiency: f64) -> (bool, f64) {
    let high = limit - radius;
    let low = radius;

    if *vel == 0.0 {
        return (false, pos.min(high).max(low));
    }
    if pos + radius >= limit {
        *vel *= -efficiency;
        (true, high)
    } else if pos - radius <= 0.0 {
        *vel *= -efficiency;
        (true, low)
    } else {
        (false, pos)
    }
}

/// Extra friction on a lossy bounce, snapping slow axes to rest
fn settle_after_bounce(vel: f64, friction: f64, rest_speed: f64) -> f64 {
    if vel.abs() > BORDER_REST_SPEED {
        decay_toward_zero(vel, friction)
    } else if vel.abs() < rest_speed {
        0.0
    } else {
        vel
    }
}

/// Mutable references to two distinct elements of a slice
pub fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> Option<(&mut T, &mut T)> {
    if i == j || i >= items.len() || j >= items.len() {
        return None;
    }
    if i < j {
        let (head, tail) = items.split_at_mut(j);
        Some((&mut head[i], &mut tail[0]))
    } else {
        let (head, tail) = items.split_at_mut(i);
        Some((&mut tail[0], &mut head[j]))
    }
}

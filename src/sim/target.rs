//! Target entity
//!
//! A growing circle that can be clicked until it expires.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// A single hit opportunity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub id: u32,
    /// Center in surface-local coordinates
    pub pos: Vec2,
    /// Fully grown radius
    pub radius: f32,
    /// Current animated radius (also the hit radius)
    pub anim_radius: f32,
    /// Spawn time (ms)
    pub created_ms: f64,
    /// Lifespan (ms)
    pub ttl_ms: f64,
}

impl Target {
    pub fn new(id: u32, pos: Vec2, created_ms: f64) -> Self {
        Self {
            id,
            pos,
            radius: TARGET_RADIUS,
            anim_radius: 0.0,
            created_ms,
            ttl_ms: TARGET_TTL_MS,
        }
    }

    /// Age in ms at `now_ms` (never negative)
    #[inline]
    pub fn age(&self, now_ms: f64) -> f64 {
        (now_ms - self.created_ms).max(0.0)
    }

    /// Advance the grow animation. Returns false once the target has expired.
    pub fn update(&mut self, now_ms: f64) -> bool {
        let age = self.age(now_ms);
        let progress = (age / TARGET_GROW_MS).min(1.0) as f32;
        // Never shrink, even if the host clock stutters backwards
        self.anim_radius = (self.radius * progress).max(self.anim_radius);
        age < self.ttl_ms
    }

    /// Point-in-circle test against the radius that is drawn this frame
    pub fn is_hit(&self, point: Vec2) -> bool {
        if !point.is_finite() {
            return false;
        }
        point.distance(self.pos) <= self.anim_radius
    }
}

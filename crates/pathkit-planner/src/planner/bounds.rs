//! Axis-aligned bounds of the sampled toolpath

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Bounding box accumulator used while sampling toolpaths.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new()
    }
}

impl Bounds {
    pub fn new() -> Self {
        Self {
            min_x: f32::MAX,
            max_x: f32::MIN,
            min_y: f32::MAX,
            max_y: f32::MIN,
            min_z: f32::MAX,
            max_z: f32::MIN,
        }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Self {
        let mut bounds = Self::new();
        for point in points {
            bounds.update_point(*point);
        }
        bounds
    }

    pub fn update(&mut self, x: f32, y: f32, z: f32) {
        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
        self.min_y = self.min_y.min(y);
        self.max_y = self.max_y.max(y);
        self.min_z = self.min_z.min(z);
        self.max_z = self.max_z.max(z);
    }

    #[inline]
    pub fn update_point(&mut self, point: Vec3) {
        self.update(point.x, point.y, point.z);
    }

    /// False until at least one point has been added
    pub fn is_valid(&self) -> bool {
        self.min_x.is_finite()
            && self.max_x.is_finite()
            && self.min_y.is_finite()
            && self.max_y.is_finite()
            && self.min_z.is_finite()
            && self.max_z.is_finite()
            && self.min_x <= self.max_x
            && self.min_y <= self.max_y
            && self.min_z <= self.max_z
    }

    pub fn min(&self) -> Vec3 {
        Vec3::new(self.min_x, self.min_y, self.min_z)
    }

    pub fn max(&self) -> Vec3 {
        Vec3::new(self.max_x, self.max_y, self.max_z)
    }

    pub fn size(&self) -> Vec3 {
        if self.is_valid() {
            self.max() - self.min()
        } else {
            Vec3::ZERO
        }
    }

    pub fn center(&self) -> Vec3 {
        if self.is_valid() {
            (self.min() + self.max()) * 0.5
        } else {
            Vec3::ZERO
        }
    }

    /// Radius of the sphere through the box corners, centred on [`Bounds::center`]
    pub fn sphere_radius(&self) -> f32 {
        self.size().length() * 0.5
    }

    /// Grow or shrink the box around its centre
    pub fn scaled(&self, factor: f32) -> Self {
        if !self.is_valid() {
            return *self;
        }
        let center = self.center();
        let half = self.size() * 0.5 * factor;
        let (min, max) = (center - half, center + half);
        Self {
            min_x: min.x,
            max_x: max.x,
            min_y: min.y,
            max_y: max.y,
            min_z: min.z,
            max_z: max.z,
        }
    }

    /// Bounds after the `(x, y, z) -> (x, z, -y)` Y-up remap
    pub fn to_y_up(&self) -> Self {
        if !self.is_valid() {
            return *self;
        }
        Self {
            min_x: self.min_x,
            max_x: self.max_x,
            min_y: self.min_z,
            max_y: self.max_z,
            min_z: -self.max_y,
            max_z: -self.min_y,
        }
    }
}

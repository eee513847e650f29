//! Working planes for arc interpolation

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Selects the two in-plane axes, the normal axis and the centre-offset letters
///
/// `first_coord`, `second_coord` and `last_coord` are always a permutation of
/// `{0, 1, 2}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plane {
    pub first_coord: usize,
    pub second_coord: usize,
    pub last_coord: usize,
    pub first_center_letter: char,
    pub second_center_letter: char,
}

impl Plane {
    /// G17
    pub const XY: Plane = Plane {
        first_coord: 0,
        second_coord: 1,
        last_coord: 2,
        first_center_letter: 'I',
        second_center_letter: 'J',
    };

    /// G19
    pub const YZ: Plane = Plane {
        first_coord: 1,
        second_coord: 2,
        last_coord: 0,
        first_center_letter: 'J',
        second_center_letter: 'K',
    };

    /// G18
    pub const XZ: Plane = Plane {
        first_coord: 2,
        second_coord: 0,
        last_coord: 1,
        first_center_letter: 'K',
        second_center_letter: 'I',
    };

    /// In-plane coordinates of a machine point
    #[inline]
    pub fn project(&self, point: Vec3) -> Vec2 {
        Vec2::new(point[self.first_coord], point[self.second_coord])
    }

    /// Coordinate along the plane normal
    #[inline]
    pub fn normal(&self, point: Vec3) -> f32 {
        point[self.last_coord]
    }

    /// Machine point from in-plane coordinates and a normal coordinate
    #[inline]
    pub fn compose(&self, in_plane: Vec2, normal: f32) -> Vec3 {
        let mut point = Vec3::ZERO;
        point[self.first_coord] = in_plane.x;
        point[self.second_coord] = in_plane.y;
        point[self.last_coord] = normal;
        point
    }

    pub fn name(&self) -> &'static str {
        match (self.first_coord, self.second_coord) {
            (0, 1) => "XY",
            (1, 2) => "YZ",
            _ => "XZ",
        }
    }
}

impl Default for Plane {
    fn default() -> Self {
        Self::XY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coords_are_permutations() {
        for plane in [Plane::XY, Plane::YZ, Plane::XZ] {
            let mut coords = [plane.first_coord, plane.second_coord, plane.last_coord];
            coords.sort_unstable();
            assert_eq!(coords, [0, 1, 2], "{}", plane.name());
        }
    }

    #[test]
    fn test_project_compose_roundtrip() {
        let point = Vec3::new(1.0, 2.0, 3.0);
        for plane in [Plane::XY, Plane::YZ, Plane::XZ] {
            let back = plane.compose(plane.project(point), plane.normal(point));
            assert_eq!(back, point);
        }
        assert_eq!(Plane::XZ.project(point), Vec2::new(3.0, 1.0));
        assert_eq!(Plane::YZ.normal(point), 1.0);
    }
}

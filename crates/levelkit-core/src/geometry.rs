//! Vector helpers for plane fitting

use serde::{Deserialize, Serialize};
use std::ops::Sub;

/// Tolerance on the 2D cross product below which two vectors count as colinear
pub const COLINEAR_EPSILON: f64 = 0.00001;

/// A point or vector in machine space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl Sub for Point3 {
    type Output = Point3;

    fn sub(self, rhs: Point3) -> Point3 {
        Point3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

pub fn distance_squared_3d(a: Point3, b: Point3) -> f64 {
    let d = b - a;
    d.x * d.x + d.y * d.y + d.z * d.z
}

/// Squared distance ignoring Z
pub fn distance_squared_2d(a: Point3, b: Point3) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dx * dx + dy * dy
}

pub fn cross_product(u: Point3, v: Point3) -> Point3 {
    Point3::new(
        u.y * v.z - u.z * v.y,
        -(u.x * v.z - u.z * v.x),
        u.x * v.y - u.y * v.x,
    )
}

/// True when `u` and `v` are parallel in the XY plane
pub fn is_colinear(u: Point3, v: Point3) -> bool {
    (u.x * v.y - u.y * v.x).abs() < COLINEAR_EPSILON
}

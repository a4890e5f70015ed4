use std::ops::{ Add, Sub, Neg, Mul, Div };

use crate::feq;

/// A point or offset on the XZ ground plane.
///
/// The quadtree indexes entities by their X and Z world coordinates only; the
/// second component of a `Tuple2D` is the world Z coordinate, not Y.
#[derive(Debug, Default, Copy, Clone, PartialOrd)]
pub struct Tuple2D {
    pub x: f32,
    pub y: f32,
}

impl PartialEq for Tuple2D {
    fn eq(&self, other: &Tuple2D) -> bool {
        feq(self.x, other.x) && feq(self.y, other.y)
    }
}

impl Tuple2D {
    pub fn new(x: f32, y: f32) -> Tuple2D {
        Tuple2D { x, y }
    }

    pub fn dot(&self, other: &Tuple2D) -> f32 {
        self.x * other.x + self.y * other.y
    }
}

impl Add for Tuple2D {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self { x: self.x + other.x, y: self.y + other.y }
    }
}

impl Sub for Tuple2D {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self { x: self.x - other.x, y: self.y - other.y }
    }
}

impl From<[f32; 2]> for Tuple2D {
    fn from(v: [f32; 2]) -> Tuple2D {
        Tuple2D { x: v[0], y: v[1] }
    }
}

/// A three component vector, used both for points and directions.
///
/// Equality is approximate: components are compared with `feq`.
#[derive(Debug, Default, Copy, Clone, PartialOrd)]
pub struct Tuple3D {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl PartialEq for Tuple3D {
    fn eq(&self, other: &Tuple3D) -> bool {
        feq(self.x, other.x) &&
            feq(self.y, other.y) &&
            feq(self.z, other.z)
    }
}

impl From<[f32; 3]> for Tuple3D {
    fn from(v: [f32; 3]) -> Tuple3D {
        Tuple3D { x: v[0], y: v[1], z: v[2] }
    }
}

impl Tuple3D {
    pub fn new(x: f32, y: f32, z: f32) -> Tuple3D {
        Tuple3D { x, y, z }
    }

    pub fn zero() -> Tuple3D {
        Tuple3D { x: 0.0, y: 0.0, z: 0.0 }
    }

    /// The world up direction, `(0, 1, 0)`.
    pub fn up() -> Tuple3D {
        Tuple3D { x: 0.0, y: 1.0, z: 0.0 }
    }

    pub fn magnitude(&self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Scales the vector to unit length.
    ///
    /// A zero-length vector has no direction; its components come back NaN.
    pub fn normalize(&self) -> Tuple3D {
        let mag = self.magnitude();

        Tuple3D {
            x: self.x * (1.0 / mag),
            y: self.y * (1.0 / mag),
            z: self.z * (1.0 / mag),
        }
    }

    pub fn dot(&self, other: &Tuple3D) -> f32 {
        self.x * other.x
            + self.y * other.y
            + self.z * other.z
    }

    pub fn cross(&self, other: &Tuple3D) -> Tuple3D {
        Tuple3D {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Orthogonal projection onto the XZ ground plane (drops Y).
    pub fn xz(&self) -> Tuple2D {
        Tuple2D { x: self.x, y: self.z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for Tuple3D {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Tuple3D {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Neg for Tuple3D {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

/// Implements scalar right-multiplication for a 3D tuple.
///
/// ```
/// use cull_trace::tuple::Tuple3D;
///
/// let t = Tuple3D::new(1.0, 2.0, 3.0);
///
/// // (notice how the scalar is on the right)
/// assert_eq!(t * 5.0, Tuple3D::new(5.0, 10.0, 15.0));
/// ```
impl Mul<f32> for Tuple3D {
    type Output = Self;

    fn mul(self, other: f32) -> Self {
        Self {
            x: self.x * other,
            y: self.y * other,
            z: self.z * other,
        }
    }
}

/// Implements scalar left-multiplication for a 3D tuple.
///
/// ```
/// use cull_trace::tuple::Tuple3D;
///
/// let t = Tuple3D::new(1.0, 2.0, 3.0);
///
/// // (notice how the scalar is on the left)
/// assert_eq!(5.0 * t, Tuple3D::new(5.0, 10.0, 15.0));
/// ```
impl Mul<Tuple3D> for f32 {
    type Output = Tuple3D;

    fn mul(self, other: Tuple3D) -> Tuple3D {
        Tuple3D {
            x: self * other.x,
            y: self * other.y,
            z: self * other.z,
        }
    }
}

impl Div<f32> for Tuple3D {
    type Output = Self;

    fn div(self, other: f32) -> Self {
        Self {
            x: self.x / other,
            y: self.y / other,
            z: self.z / other,
        }
    }
}

/* Tests */

#[test]
fn add_tuples() {
    let a1 = Tuple3D::new(3.0, -2.0, 5.0);
    let a2 = Tuple3D::new(-2.0, 3.0, 1.0);

    assert_eq!(a1 + a2, Tuple3D::new(1.0, 1.0, 6.0));
}

#[test]
fn sub_tuples() {
    let p1 = Tuple3D::new(3.0, 2.0, 1.0);
    let p2 = Tuple3D::new(5.0, 6.0, 7.0);

    assert_eq!(p1 - p2, Tuple3D::new(-2.0, -4.0, -6.0));
}

#[test]
fn neg_tuple() {
    let a = Tuple3D::new(1.0, -2.0, 3.0);

    assert_eq!(-a, Tuple3D::new(-1.0, 2.0, -3.0));
}

#[test]
fn mul_fraction() {
    let a = Tuple3D::new(1.0, -2.0, 3.0);

    assert_eq!(a * 0.5, Tuple3D::new(0.5, -1.0, 1.5));
}

#[test]
fn magnitude_neg() {
    let v = Tuple3D::new(-1.0, -2.0, -3.0);

    assert!(feq(v.magnitude(), f32::sqrt(14.0)));
}

#[test]
fn normalize_dirty() {
    let v = Tuple3D::new(1.0, 2.0, 3.0);
    let e = Tuple3D::new(
        1.0 / f32::sqrt(14.0),
        2.0 / f32::sqrt(14.0),
        3.0 / f32::sqrt(14.0)
    );

    assert_eq!(v.normalize(), e);
}

#[test]
fn normalize_zero_is_nan() {
    let v = Tuple3D::zero().normalize();

    assert!(!v.is_finite());
}

#[test]
fn cross_vectors() {
    let a = Tuple3D::new(1.0, 2.0, 3.0);
    let b = Tuple3D::new(2.0, 3.0, 4.0);

    assert_eq!(a.cross(&b), Tuple3D::new(-1.0, 2.0, -1.0));
    assert_eq!(b.cross(&a), Tuple3D::new(1.0, -2.0, 1.0));
}

#[test]
fn project_onto_ground_plane() {
    let p = Tuple3D::new(4.0, 9.0, -2.0);

    assert_eq!(p.xz(), Tuple2D::new(4.0, -2.0));
}

#[test]
fn dot_ground_plane() {
    let a = Tuple2D::new(3.0, -1.0);

    assert!(feq(a.dot(&Tuple2D::new(1.0, 0.0)), 3.0));
    assert!(feq(a.dot(&Tuple2D::new(0.0, -1.0)), 1.0));
}

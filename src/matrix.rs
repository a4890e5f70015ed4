use std::ops::{ Index, IndexMut, Mul };

use crate::feq;
use crate::tuple::Tuple3D;

/// A 3x3 matrix.
///
/// Used for orienting camera-local geometry. Elements are stored row-major
/// and indexed as `(row, column)`.
#[derive(Copy, Clone, Debug, Default, PartialOrd)]
pub struct Matrix3D {
    data: [f32; 9],
}

/// A 4x4 matrix.
///
/// These matrices encode the world transform of an entity. Points are
/// multiplied on the right with an implied `w` of `1.0`, so the translation
/// column always applies.
///
/// # Examples
///
/// Placing an entity and reading back where it ended up:
///
/// ```
/// # use cull_trace::tuple::Tuple3D;
/// # use cull_trace::matrix::Matrix4D;
/// let world = Matrix4D::translation(10.0, 1.0, -4.0)
///     * Matrix4D::rotation_y(0.7);
/// assert_eq!(world.translation_part(), Tuple3D::new(10.0, 1.0, -4.0));
/// ```
#[derive(Copy, Clone, Debug, Default, PartialOrd)]
pub struct Matrix4D {
    data: [f32; 16],
}

/// Determines whether two `Matrix3D`s are equal, element-wise and
/// approximately.
impl PartialEq for Matrix3D {
    fn eq(&self, other: &Matrix3D) -> bool {
        self.data.iter().zip(other.data.iter()).all(|(x, y)| feq(*x, *y))
    }
}

impl Matrix3D {
    /// Creates a new `Matrix3D`. All elements are initialized to `0.0`.
    pub fn new() -> Matrix3D {
        Matrix3D { data: [0.0; 9] }
    }

    /// Instantiates a 3x3 identity matrix.
    pub fn identity() -> Matrix3D {
        let mut buf = [0.0; 9];
        buf[0] = 1.0; buf[4] = 1.0; buf[8] = 1.0;

        Matrix3D { data: buf }
    }

    /// Builds a matrix whose columns are the three given vectors.
    ///
    /// Multiplying a local-space vector `(a, b, c)` by this matrix yields
    /// `a * c0 + b * c1 + c * c2`.
    pub fn from_columns(c0: Tuple3D, c1: Tuple3D, c2: Tuple3D) -> Matrix3D {
        Matrix3D {
            data: [
                c0.x, c1.x, c2.x,
                c0.y, c1.y, c2.y,
                c0.z, c1.z, c2.z,
            ]
        }
    }

    /// Builds the orientation of a camera looking along `facing`.
    ///
    /// The columns are `right = normalize(facing x up_world)`,
    /// `up = normalize(right x facing)` and `facing` itself, so camera-local
    /// `+z` maps onto the facing direction. `facing` is expected to be unit
    /// length and not parallel to the world up axis; a vertical facing has
    /// no defined right vector and yields NaN columns.
    pub fn camera_basis(facing: Tuple3D) -> Matrix3D {
        let right = facing.cross(&Tuple3D::up()).normalize();
        let up = right.cross(&facing).normalize();

        Matrix3D::from_columns(right, up, facing)
    }

    /// Returns column `c` as a vector.
    pub fn column(&self, c: usize) -> Tuple3D {
        Tuple3D::new(self[(0, c)], self[(1, c)], self[(2, c)])
    }

    /// Produces the transpose of this matrix.
    ///
    /// For an orthonormal basis this is also its inverse.
    pub fn transposition(&self) -> Matrix3D {
        let mut res = Matrix3D::new();
        for r in 0..3 {
            for c in 0..3 {
                res[(c, r)] = self[(r, c)];
            }
        }

        res
    }
}

impl Index<(usize, usize)> for Matrix3D {
    type Output = f32;

    fn index<'a>(&'a self, index: (usize, usize)) -> &'a f32 {
        &self.data[(index.0 * 3) + index.1]
    }
}

impl IndexMut<(usize, usize)> for Matrix3D {
    fn index_mut<'a>(&'a mut self, index: (usize, usize)) -> &'a mut f32 {
        &mut self.data[(index.0 * 3) + index.1]
    }
}

impl Mul<Tuple3D> for Matrix3D {
    type Output = Tuple3D;

    fn mul(self, other: Tuple3D) -> Tuple3D {
        let mut buf: [f32; 3] = Default::default();

        for r in 0..3 {
            buf[r] = self[(r, 0)] * other.x
                + self[(r, 1)] * other.y
                + self[(r, 2)] * other.z;
        }

        Tuple3D { x: buf[0], y: buf[1], z: buf[2] }
    }
}

/// Determines whether two `Matrix4D`s are equal.
///
/// Matrices are compared element-wise. Note that equality is approximate, as
/// `Matrix4D` elements are floating point numbers.
impl PartialEq for Matrix4D {
    fn eq(&self, other: &Matrix4D) -> bool {
        self.data.iter().zip(other.data.iter()).all(|(x, y)| feq(*x, *y))
    }
}

impl Matrix4D {
    /// Creates a new `Matrix4D`. All elements are initialized to `0.0`.
    pub fn new() -> Matrix4D {
        Matrix4D { data: [0.0; 16] }
    }

    /// Instantiates a 4x4 identity matrix.
    pub fn identity() -> Matrix4D {
        let mut buf = [0.0; 16];
        buf[0] = 1.0; buf[5] = 1.0; buf[10] = 1.0; buf[15] = 1.0;

        Matrix4D { data: buf }
    }

    /// Instantiates a 4x4 translation matrix.
    ///
    /// This matrix offsets a point by `x`, `y` and `z`.
    pub fn translation(x: f32, y: f32, z: f32) -> Matrix4D {
        let mut trans = Self::identity();
        trans[(0, 3)] = x;
        trans[(1, 3)] = y;
        trans[(2, 3)] = z;

        trans
    }

    /// Instantiates a 4x4 rotation matrix, rotating about the Y axis.
    ///
    /// Assumes that parameter `r` is in radians.
    ///
    /// ```
    /// # use cull_trace::tuple::Tuple3D;
    /// # use cull_trace::matrix::Matrix4D;
    /// let m = Matrix4D::rotation_y(std::f32::consts::PI / 2.0);
    /// assert_eq!(m.transform_point(Tuple3D::new(1.0, 0.0, 0.0)),
    ///     Tuple3D::new(0.0, 0.0, -1.0));
    /// ```
    pub fn rotation_y(r: f32) -> Matrix4D {
        let mut rotate = Self::identity();
        rotate[(0, 0)] =  r.cos();
        rotate[(0, 2)] =  r.sin();
        rotate[(2, 0)] = -r.sin();
        rotate[(2, 2)] =  r.cos();

        rotate
    }

    /// The translation column of the matrix: where the local origin lands in
    /// world space.
    pub fn translation_part(&self) -> Tuple3D {
        Tuple3D::new(self[(0, 3)], self[(1, 3)], self[(2, 3)])
    }

    /// Transforms a point (implied `w == 1.0`).
    pub fn transform_point(&self, p: Tuple3D) -> Tuple3D {
        let mut buf: [f32; 3] = Default::default();

        for r in 0..3 {
            buf[r] = self[(r, 0)] * p.x
                + self[(r, 1)] * p.y
                + self[(r, 2)] * p.z
                + self[(r, 3)];
        }

        Tuple3D { x: buf[0], y: buf[1], z: buf[2] }
    }
}

impl Index<(usize, usize)> for Matrix4D {
    type Output = f32;

    fn index<'a>(&'a self, index: (usize, usize)) -> &'a f32 {
        &self.data[(index.0 * 4) + index.1]
    }
}

impl IndexMut<(usize, usize)> for Matrix4D {
    fn index_mut<'a>(&'a mut self, index: (usize, usize)) -> &'a mut f32 {
        &mut self.data[(index.0 * 4) + index.1]
    }
}

/// Multiplication between two matrices.
///
/// Note that matrix multiplication is not commutative; in other words, for
/// matrix `A` and matrix `B`, `A * B` is not necessarily equal to `B * A`.
///
/// ```
/// # use cull_trace::matrix::Matrix4D;
/// let m1 = Matrix4D::translation(2.0, 3.0, 4.0);
/// let m2 = Matrix4D::translation(4.0, 3.0, 2.0);
/// assert_eq!(m1 * m2, Matrix4D::translation(6.0, 6.0, 6.0));
/// ```
impl Mul<Matrix4D> for Matrix4D {
    type Output = Matrix4D;

    fn mul(self, other: Matrix4D) -> Matrix4D {
        let mut res = Matrix4D::new();

        for r in 0..4 {
            for c in 0..4 {
                res[(r, c)] = self[(r, 0)] * other[(0, c)]
                    + self[(r, 1)] * other[(1, c)]
                    + self[(r, 2)] * other[(2, c)]
                    + self[(r, 3)] * other[(3, c)]
            }
        }

        res
    }
}

#[test]
fn identity() {
    let i = Matrix4D::identity();
    let a = Matrix4D::translation(3.0, -2.0, 7.0) * Matrix4D::rotation_y(0.4);

    assert_eq!(a * i, a);
    assert_eq!(i * a, a);
}

#[test]
fn mat4_translation() {
    let t = Matrix4D::translation(5.0, -3.0, 2.0);
    let p = Tuple3D::new(-3.0, 4.0, 5.0);

    assert_eq!(t.transform_point(p), Tuple3D::new(2.0, 1.0, 7.0));
}

#[test]
fn mat4_rotation_does_not_move_origin() {
    let m = Matrix4D::translation(-7.0, 0.0, 12.0)
        * Matrix4D::rotation_y(1.3);

    assert_eq!(m.translation_part(), Tuple3D::new(-7.0, 0.0, 12.0));
}

#[test]
fn chained_transforms() {
    let p = Tuple3D::new(1.0, 0.0, 1.0);
    let a = Matrix4D::rotation_y(std::f32::consts::PI / 2.0);
    let b = Matrix4D::translation(10.0, 5.0, 7.0);

    let t = b * a;
    assert_eq!(t.transform_point(p), Tuple3D::new(11.0, 5.0, 6.0));
}

#[test]
fn mat3_from_columns() {
    let m = Matrix3D::from_columns(
        Tuple3D::new(1.0, 2.0, 3.0),
        Tuple3D::new(4.0, 5.0, 6.0),
        Tuple3D::new(7.0, 8.0, 9.0),
    );

    assert_eq!(m[(0, 1)], 4.0);
    assert_eq!(m[(2, 0)], 3.0);
    assert_eq!(m.column(2), Tuple3D::new(7.0, 8.0, 9.0));
    assert_eq!(m * Tuple3D::new(0.0, 1.0, 0.0), Tuple3D::new(4.0, 5.0, 6.0));
}

#[test]
fn camera_basis_looking_down_negative_z() {
    let m = Matrix3D::camera_basis(Tuple3D::new(0.0, 0.0, -1.0));

    assert_eq!(m.column(0), Tuple3D::new(1.0, 0.0, 0.0));
    assert_eq!(m.column(1), Tuple3D::new(0.0, 1.0, 0.0));
    assert_eq!(m.column(2), Tuple3D::new(0.0, 0.0, -1.0));
}

#[test]
fn camera_basis_is_orthonormal() {
    let facing = Tuple3D::new(0.3, -0.4, 0.8).normalize();
    let m = Matrix3D::camera_basis(facing);

    assert_eq!(m.transposition() * (m * facing), facing);
    assert!(feq(m.column(0).dot(&m.column(1)), 0.0));
    assert!(feq(m.column(0).dot(&m.column(2)), 0.0));
    assert!(feq(m.column(1).dot(&m.column(2)), 0.0));
    assert!(feq(m.column(0).magnitude(), 1.0));
    assert!(feq(m.column(1).magnitude(), 1.0));
}

#[test]
fn transpose_identity() {
    assert_eq!(Matrix3D::identity().transposition(), Matrix3D::identity());
}
